pub mod arena;
pub mod board;
pub mod capture;
pub mod controller;
pub mod game;
pub mod log_init;
pub mod piece;

pub use arena::*;
pub use board::*;
pub use capture::{CaptureKind, Eligibility, Occupancy};
pub use controller::*;
pub use game::*;
pub use piece::*;

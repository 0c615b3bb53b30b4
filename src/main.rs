use clap::{App, Arg};
use log::{LevelFilter, error, info};
use perfecta::log_init;
use perfecta::*;
use std::fs;
use std::process;

fn main() {
    let args = App::new("Perfecta")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::with_name("SCRIPT")
                .index(1)
                .help("JSON match script to play; prints the starting board if omitted"),
        )
        .arg(
            Arg::with_name("WIN")
                .short("w")
                .long("win")
                .takes_value(true)
                .help("Captures needed to win, overrides the script"),
        )
        .arg(
            Arg::with_name("VERBOSE")
                .short("v")
                .help("If specified, board operations are logged as well"),
        )
        .get_matches();

    let level = if args.is_present("VERBOSE") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = log_init::init(level) {
        eprintln!("Could not set up logging: {}", e);
    }

    let path = match args.value_of("SCRIPT") {
        Some(path) => path,
        None => {
            println!("Perfecta - starting position");
            println!("==========================\n");
            println!("{}", Board::new(MatchConfig::default().win_threshold).display_board());
            return;
        }
    };

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            error!("Could not read {}: {}", path, e);
            process::exit(1);
        }
    };
    let mut script = match MatchScript::from_json(&text) {
        Ok(script) => script,
        Err(e) => {
            error!("Invalid match script {}: {}", path, e);
            process::exit(1);
        }
    };

    if let Some(win) = args.value_of("WIN") {
        match win.parse() {
            Ok(win) => script.config.win_threshold = win,
            Err(_) => {
                error!("Win threshold must be a number, got {}", win);
                process::exit(1);
            }
        }
    }

    info!("Playing {}", path);
    let mut game = script.into_match();
    let result = game.play();

    println!("\n==========================");
    println!("Match Result:");
    match result {
        MatchResult::Win {
            winner,
            winner_name,
            turns,
        } => {
            println!("  {} wins as {} in {} turns!", winner_name, winner, turns);
        }
        MatchResult::Draw { turns } => {
            println!("  Draw after {} turns", turns);
        }
        MatchResult::Forfeit { violator, winner } => {
            println!("  {} wins by forfeit (opponent: {})", winner, violator);
        }
    }
    println!("{}", game.board().display_board());
    println!("==========================");
}

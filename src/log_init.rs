use simplelog::*;

/// Route `log` output to the terminal at `level`.
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stdout,
        ColorChoice::Always,
    )])
}

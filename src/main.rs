use clap::Parser;
use dragboard::cli::commands::Cli;
use dragboard::cli::handlers;
use dragboard::io::config_io;
use dragboard::logging;
use dragboard::model::config::EngineConfig;

fn main() {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => match config_io::read_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    if let Err(e) = logging::init_logging(&level) {
        eprintln!("warning: logging disabled: {}", e);
    }

    if let Err(e) = handlers::dispatch(cli, &config) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

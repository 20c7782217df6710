//! spishim - Arduino-style SPI master for Linux
//!
//! A small diagnostic tool around the `SpiBus` facade: it opens a port,
//! runs `begin()`, applies the requested mode, bit order and clock, and
//! then exchanges bytes or runs a loopback self-test.

mod cli;
mod commands;
mod ports;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // -v/-vv pick the default filter; RUST_LOG still wins
    let default_filter = cli.log_level().to_string();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Transfer { bus, data } => {
            let mut bus = ports::open_bus(&bus)?;
            let result = commands::run_transfer(&mut bus, &data);
            bus.end();
            result
        }
        Commands::Loopback { bus, len } => {
            let mut bus = ports::open_bus(&bus)?;
            let result = commands::run_loopback(&mut bus, len);
            bus.end();
            result
        }
        Commands::ListPorts => {
            commands::list_ports();
            Ok(())
        }
    }
}

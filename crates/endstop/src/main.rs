use std::process;
use std::sync::Arc;

use clap::Parser;
use endstop::{EventRegistry, Fault, FAULT_EVENT};
use endstop_utils::{info, init_logging_with_level, LogFormat, LogLevel};

/// Manual driver for the last-resort fault handler.
#[derive(Parser, Debug)]
#[command(name = "endstop")]
#[command(version)]
#[command(about = "Install the last-resort fault handler and poke it", long_about = None)]
struct Cli
{
    /// Install a custom (non-fatal) handler instead of the fatal default
    #[arg(long, default_value_t = false)]
    custom: bool,

    /// Raise a fault with this message after installing
    #[arg(long)]
    raise: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: LogLevel,
}

fn main()
{
    let cli = Cli::parse();

    if let Err(e) = init_logging_with_level(cli.log_level, LogFormat::Pretty) {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(1);
    }

    let _undo = if cli.custom {
        endstop::install_with(Arc::new(|fault: &Fault| {
            println!("custom handler caught: {fault}");
        }))
    } else {
        endstop::install()
    };
    endstop::route_panics();

    info!(event = FAULT_EVENT, "fallback handler armed");

    if let Some(message) = cli.raise {
        // With the default handler this logs to stderr and exits with
        // code 1 before the dispatch count is ever printed.
        let fault = Fault::new(message);
        let handled = endstop::process_registry().emit(FAULT_EVENT, &fault);
        println!("fault dispatched to {handled} listener(s)");
    } else {
        println!("installed; nothing raised, exiting cleanly");
    }
}

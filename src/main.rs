use anyhow::Result;
use clap::Parser;

use adt_cli::cli::{Cli, Command, ConfigAction};
use adt_cli::{commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    let command_name = match &args.command {
        Command::Seed(_) => "seed",
        Command::Config { .. } => "config",
        Command::Version => "version",
    };
    logging::init_subscriber(args.verbose, command_name);
    let log = logging::Logger::new(command_name);

    match args.command {
        Command::Seed(opts) => commands::seed::run(&args.global, &opts, &log),
        Command::Config { action } => match action {
            ConfigAction::Show => {
                let setup = commands::CommandSetup::init(&args.global, &log)?;
                commands::config::show(&setup.config, &log);
                Ok(())
            }
            ConfigAction::Init => commands::config::init(&log),
        },
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}

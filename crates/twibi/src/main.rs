mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use twibi_core::{Coordinator, RouterConfig};

use crate::cli::{Cli, Command, DevicesArgs, DevicesCommand};
use crate::commands::Session;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a router connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "twibi", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to the router
        cmd => {
            let cfg = config::load_config()?;
            let (profile_name, mut router) = config::resolve_router_config(&cli.global, &cfg)?;
            apply_command_overrides(&cmd, &mut router);

            let host = router.host.clone();
            let coordinator = Coordinator::new(router)
                .map_err(|e| CliError::from_core(e, &profile_name, &host))?;

            let store = config::FileDeviceStore::for_profile(&profile_name);
            if let Err(e) = coordinator.attach_device_store(Arc::new(store)) {
                tracing::warn!(error = %e, "known-device tracking disabled");
            }

            tracing::debug!(command = ?cmd, profile = %profile_name, "dispatching command");
            let session = Session::new(coordinator, profile_name);
            commands::dispatch(cmd, &session, &cli.global).await
        }
    }
}

/// Per-command adjustments to the resolved router config.
fn apply_command_overrides(cmd: &Command, router: &mut RouterConfig) {
    match cmd {
        Command::Devices(DevicesArgs {
            command: DevicesCommand::List { include_wired: true },
        }) => router.exclude_wired = false,
        Command::Watch(args) => {
            if let Some(secs) = args.interval {
                router.update_interval = Duration::from_secs(secs.max(1));
            }
        }
        _ => {}
    }
}

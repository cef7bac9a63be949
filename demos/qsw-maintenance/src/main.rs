use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use qsw_controller::api::QswApi;
use qsw_controller::options::ConnectionOptions;

use tracing::{error, info};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Switch URL, for instance `http://192.168.1.200`.
    #[arg(long, env = "QSW_URL")]
    url: String,

    /// User name.
    #[arg(short, long, env = "QSW_USER", default_value = "admin")]
    user: String,

    /// Password.
    #[arg(short, long, env = "QSW_PASS", hide_env_values = true)]
    password: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Saves the switch configuration to a file.
    Backup {
        /// Destination file.
        #[arg(default_value = "qsw.conf")]
        path: PathBuf,
    },
    /// Reboots the switch.
    Reboot,
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = ConnectionOptions::new(cli.url, cli.user, cli.password);
    let mut api = QswApi::new(options)?;

    let board = api.validate().await?;
    info!("System board: {:?}", board.data());

    match cli.command {
        Command::Backup { path } => {
            let config = api.config_backup().await?;
            std::fs::write(&path, &config)?;
            info!("Configuration saved to {}", path.display());
            api.logout().await?;
        }
        Command::Reboot => {
            api.reboot().await?;
            info!("Rebooting the switch");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

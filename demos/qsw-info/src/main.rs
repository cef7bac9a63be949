use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use qsw_controller::api::QswApi;
use qsw_controller::error::Result;
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

    /// Print the raw endpoint replies instead of the collected data.
    #[arg(long)]
    raw: bool,

    /// Number of additional updates.
    #[arg(long, default_value_t = 0)]
    repeat: u32,

    /// Seconds between two updates.
    #[arg(long, default_value_t = 20)]
    interval: u64,
}

fn print(api: &QswApi, raw: bool) -> Result<()> {
    let json = if raw {
        serde_json::to_string_pretty(api.raw_data())?
    } else {
        serde_json::to_string_pretty(&api.data())?
    };
    println!("{json}");
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let options = ConnectionOptions::new(cli.url, cli.user, cli.password);
    let mut api = QswApi::new(options)?;

    let board = api.validate().await?;
    info!("System board: {:?}", board.data());

    api.update().await?;
    print(&api, cli.raw)?;

    // The session is verified and reused by every further update.
    for _ in 0..cli.repeat {
        tokio::time::sleep(Duration::from_secs(cli.interval)).await;
        api.update().await?;
        print(&api, cli.raw)?;
    }

    api.logout().await
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

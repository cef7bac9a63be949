use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use qsw_controller::api::QswApi;
use qsw_controller::error::Result;
use qsw_controller::options::ConnectionOptions;

use tracing::{error, info, warn};

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

    /// Install the newer firmware, if any.
    #[arg(long)]
    install: bool,

    /// Seconds between two progress readings.
    #[arg(long, default_value_t = 5)]
    interval: u64,
}

async fn install(api: &mut QswApi, interval: Duration) -> Result<()> {
    api.live_update().await?;

    loop {
        tokio::time::sleep(interval).await;

        let progress = api.update_progress().await?;
        info!("Firmware download: {progress:.1}%");

        if !api.update_status().await? {
            break;
        }
    }

    info!("Firmware update completed, the switch is going to reboot");
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let options = ConnectionOptions::new(cli.url, cli.user, cli.password);
    let mut api = QswApi::new(options)?;

    let board = api.validate().await?;
    info!("System board: {:?}", board.data());

    api.update().await?;
    if let Some(firmware) = api.firmware_info().and_then(|info| info.firmware()) {
        info!("Installed firmware: {firmware}");
    }

    let check = api.check_firmware().await?;
    println!("{}", serde_json::to_string_pretty(&check.data())?);

    let newer = check.newer() == Some(true);
    if !newer {
        info!("The installed firmware is up to date");
    } else if cli.install {
        install(&mut api, Duration::from_secs(cli.interval)).await?;
        return Ok(());
    } else {
        warn!("A newer firmware is available, use --install to install it");
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

use anyhow::Context;
use evergreen::{
    config::{AppConfig, USAGE},
    logging::init_logging,
    EvergreenApp,
};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env_and_args().context("invalid command line or environment")?;
    if config.show_help {
        println!("{USAGE}");
        return Ok(());
    }

    init_logging(config.logging.clone());
    log::info!("Starting evergreen {}", env!("CARGO_PKG_VERSION"));
    for warning in &config.warnings {
        log::warn!("{warning}");
    }

    let app = EvergreenApp::new(config).context("failed to start the application")?;
    app.run().context("evergreen stopped with an error")?;

    log::info!("Goodbye");
    Ok(())
}

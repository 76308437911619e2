//! The scheduler entry point, invoked by cron every half hour.

use chrono::Local;
use hoopsbot_core::config::{Config, Credentials};
use hoopsbot_core::run::Runner;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hoopsbot_core=info".parse()?),
        )
        .init();

    let config = Config::load_or_default();
    let creds = Credentials::from_env()?;
    let mut runner = Runner::from_parts(config, &creds)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(runner.run_once(Local::now().naive_local()));
    Ok(())
}

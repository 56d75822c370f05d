pub mod config;
pub mod logger;

use anyhow::Result;
use config::Config;
use irq_wait::Handle;
use pcie215::Pcie215;

/// Loads the config and installs the logger.
pub fn setup() -> Result<Config> {
    let config = Config::load()?;
    logger::init(config.level()?)?;
    log::debug!("config: {config:?}");
    Ok(config)
}

pub fn open(config: &Config) -> irq_wait::DriverResult<Handle> {
    Handle::open(&Pcie215::with_lines(config.device.lines), &config.device.path)
}

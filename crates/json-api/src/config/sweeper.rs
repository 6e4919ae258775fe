//! Sweeper Config

use std::time::Duration;

use clap::Args;

/// Discount deactivation sweeper settings.
#[derive(Debug, Args)]
pub struct SweeperConfig {
    /// Run the background discount sweeper
    #[arg(
        long = "sweep-enabled",
        env = "SWEEP_ENABLED",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub enabled: bool,

    /// Seconds between scheduled sweeps
    #[arg(
        long = "sweep-interval-seconds",
        env = "SWEEP_INTERVAL_SECONDS",
        default_value_t = 60_u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_seconds: u64,
}

impl SweeperConfig {
    /// Interval between scheduled sweeps.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

// Command-line configuration and logging setup.
use crate::types::{Horizon, RateUnit};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "telesales-dashboard",
    version,
    about = "Telesales Performance Dashboard: call-center KPIs and answered-call predictions"
)]
pub struct Cli {
    /// Dataset read by the "load file" control.
    #[arg(long, env = "TELESALES_DATA", default_value = "datasets/telesales.csv")]
    pub data: PathBuf,

    /// Start from an uploaded CSV instead of the fixed dataset.
    #[arg(long, value_name = "CSV")]
    pub upload: Option<PathBuf>,

    /// Directory holding telesales_model_{Week,Month,Year}.json.
    #[arg(long, env = "TELESALES_MODELS", default_value = "model")]
    pub models: PathBuf,

    /// How the `Calls Answered Rate` column is stored.
    #[arg(long, value_enum, env = "TELESALES_RATE_UNIT", default_value_t = RateUnit::Fraction)]
    pub rate_unit: RateUnit,

    /// Render the dashboard for this year once and exit.
    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long, value_enum, default_value_t = Horizon::Weekly)]
    pub horizon: Horizon,

    /// Also write the rendered view as JSON.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// -v for info, -vv for debug. RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// Logs go to stderr so they never interleave with the rendered dashboard.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["telesales-dashboard"]).unwrap();
        assert_eq!(cli.models, PathBuf::from("model"));
        assert_eq!(cli.rate_unit, RateUnit::Fraction);
        assert_eq!(cli.horizon, Horizon::Weekly);
        assert_eq!(cli.year, None);
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn one_shot_flags() {
        let cli = Cli::try_parse_from([
            "telesales-dashboard",
            "--upload",
            "mine.csv",
            "--year",
            "2021",
            "--horizon",
            "yearly",
            "--rate-unit",
            "percent",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.upload, Some(PathBuf::from("mine.csv")));
        assert_eq!(cli.year, Some(2021));
        assert_eq!(cli.horizon, Horizon::Yearly);
        assert_eq!(cli.rate_unit, RateUnit::Percent);
        assert_eq!(cli.log_level(), "debug");
    }

    #[test]
    fn unknown_horizon_is_rejected() {
        assert!(Cli::try_parse_from(["telesales-dashboard", "--horizon", "daily"]).is_err());
    }
}

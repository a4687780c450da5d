use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use cdi_calc::calendar::CalendarKind;

pub mod formatters;

#[derive(Parser)]
#[command(name = "cdi-calc")]
#[command(version, about = "CDI-indexed investment projection over Brazilian business days")]
#[command(
    long_about = "Project the future value of a CDI-indexed investment using the daily CDI published by Banco Central (SGS series 12), counting only Brazilian business days, and derive the monthly rate implied by two payment amounts."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Path to config.toml (defaults to the user config directory)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Project the future value of an investment and the implied monthly rate
    Project {
        /// Accumulated amount invested (e.g. 1000.00 or 1.000,00)
        principal: String,

        /// Start date (YYYY-MM-DD)
        start: String,

        /// End date (YYYY-MM-DD)
        end: String,

        /// Payment amount that includes interest
        #[arg(allow_hyphen_values = true)]
        payment_with_interest: String,

        /// Payment amount without interest (paid now)
        #[arg(allow_hyphen_values = true)]
        payment_without_interest: String,

        /// Daily rate in percent (e.g. 0.043739); skips the BCB lookup
        #[arg(long)]
        rate: Option<String>,

        #[command(flatten)]
        calendar: CalendarArgs,
    },

    /// Count business and calendar days between two dates
    BusinessDays {
        /// Start date (YYYY-MM-DD)
        start: String,

        /// End date (YYYY-MM-DD)
        end: String,

        #[command(flatten)]
        calendar: CalendarArgs,
    },

    /// Show the latest daily CDI published by Banco Central
    Rate {
        /// SGS series code (defaults to 12, daily CDI)
        #[arg(long)]
        series: Option<u32>,
    },

    /// List the holidays of a year
    Holidays {
        /// Year (e.g. 2025)
        year: i32,

        /// Holiday calendar to use
        #[arg(long, value_enum)]
        calendar: Option<CalendarKind>,
    },
}

/// Calendar flags shared by commands that count business days
#[derive(Args, Debug, Clone, Default)]
pub struct CalendarArgs {
    /// Holiday calendar to use
    #[arg(long, value_enum)]
    pub calendar: Option<CalendarKind>,

    /// Check each date against its own year's holidays instead of the start year's
    #[arg(long)]
    pub span_years: bool,

    /// Business days per month used for the implied monthly rate
    #[arg(long)]
    pub business_days_per_month: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_project_with_flags() {
        let cli = Cli::try_parse_from([
            "cdi-calc",
            "--json",
            "project",
            "1000",
            "2024-01-01",
            "2024-01-05",
            "110",
            "-100",
            "--rate",
            "0.04",
            "--calendar",
            "anbima",
            "--span-years",
        ])
        .expect("parse failed");

        assert!(cli.json);
        match cli.command {
            Commands::Project {
                principal,
                payment_without_interest,
                rate,
                calendar,
                ..
            } => {
                assert_eq!(principal, "1000");
                assert_eq!(payment_without_interest, "-100");
                assert_eq!(rate.as_deref(), Some("0.04"));
                assert_eq!(calendar.calendar, Some(CalendarKind::Anbima));
                assert!(calendar.span_years);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parse_holidays_weekend_only() {
        let cli = Cli::try_parse_from(["cdi-calc", "holidays", "2025", "--calendar", "weekend-only"])
            .expect("parse failed");
        match cli.command {
            Commands::Holidays { year, calendar } => {
                assert_eq!(year, 2025);
                assert_eq!(calendar, Some(CalendarKind::WeekendOnly));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn missing_arguments_fail() {
        assert!(Cli::try_parse_from(["cdi-calc", "project", "1000"]).is_err());
    }
}

//! Command dispatcher: turns parsed CLI commands into engine calls and
//! prints the formatted output.
//!
//! Every command either prints its full output or returns an error; the
//! caller in `main` is the single error boundary.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::cli::formatters::{
    format_daily_rate, format_day_count, format_holidays, format_projection_json,
    format_projection_table, DayCount,
};
use crate::cli::{CalendarArgs, Commands};
use cdi_calc::calendar::holiday_calendar;
use cdi_calc::config::Config;
use cdi_calc::error::CalcError;
use cdi_calc::projection::{run_projection, HolidayYearPolicy, ProjectionInput, ProjectionOptions};
use cdi_calc::rates::bcb::BcbSgsClient;
use cdi_calc::rates::{
    fetch_daily_rate, FixedRateSource, OfflineSource, RateObservation, RateSource,
};
use cdi_calc::utils::{parse_amount, parse_iso_date};

/// Everything a command needs besides its own arguments
pub struct AppContext {
    pub json: bool,
    pub config: Config,
    pub today: NaiveDate,
}

impl AppContext {
    pub fn new(json: bool, config: Config) -> Self {
        Self {
            json,
            config,
            today: Local::now().date_naive(),
        }
    }
}

/// Rate source picked from flags, environment and config
enum ActiveSource {
    Fixed(FixedRateSource),
    Offline(OfflineSource),
    Bcb(BcbSgsClient),
}

impl RateSource for ActiveSource {
    async fn get_rate(
        &self,
        series_id: u32,
        as_of: NaiveDate,
    ) -> Result<Option<RateObservation>> {
        match self {
            ActiveSource::Fixed(s) => s.get_rate(series_id, as_of).await,
            ActiveSource::Offline(s) => s.get_rate(series_id, as_of).await,
            ActiveSource::Bcb(s) => s.get_rate(series_id, as_of).await,
        }
    }
}

fn is_offline() -> bool {
    std::env::var("CDI_CALC_OFFLINE")
        .map(|v| v != "0")
        .unwrap_or(false)
}

fn select_source(fixed_percent: Option<&str>, ctx: &AppContext) -> Result<ActiveSource> {
    if let Some(raw) = fixed_percent {
        let percent = parse_amount(raw)?;
        info!("Using fixed daily rate of {}%", percent);
        return Ok(ActiveSource::Fixed(FixedRateSource::new(percent)));
    }
    if is_offline() {
        debug!("Offline mode: no rate lookup will be made");
        return Ok(ActiveSource::Offline(OfflineSource));
    }
    let client = BcbSgsClient::new(
        &ctx.config.sgs_base_url,
        ctx.config.request_timeout(),
        ctx.today,
    )?;
    Ok(ActiveSource::Bcb(client))
}

fn build_options(args: &CalendarArgs, config: &Config) -> Result<ProjectionOptions> {
    let mut options = config.projection_options();
    if let Some(kind) = args.calendar {
        options.calendar = kind;
    }
    if args.span_years {
        options.holiday_year_policy = HolidayYearPolicy::EachYear;
    }
    if let Some(n) = args.business_days_per_month {
        if n == 0 {
            return Err(CalcError::InvalidInput(
                "business days per month must be greater than zero".to_string(),
            )
            .into());
        }
        options.business_days_per_month = n;
    }
    Ok(options)
}

/// Route a parsed command to its handler
pub async fn dispatch_command(command: Commands, ctx: &AppContext) -> Result<()> {
    match command {
        Commands::Project {
            principal,
            start,
            end,
            payment_with_interest,
            payment_without_interest,
            rate,
            calendar,
        } => {
            let input = ProjectionInput {
                principal: parse_amount(&principal)?,
                start: parse_iso_date(&start)?,
                end: parse_iso_date(&end)?,
                payment_with_interest: parse_amount(&payment_with_interest)?,
                payment_without_interest: parse_amount(&payment_without_interest)?,
            };
            let options = build_options(&calendar, &ctx.config)?;
            dispatch_project(&input, rate.as_deref(), &options, ctx).await
        }
        Commands::BusinessDays {
            start,
            end,
            calendar,
        } => {
            let start = parse_iso_date(&start)?;
            let end = parse_iso_date(&end)?;
            let options = build_options(&calendar, &ctx.config)?;
            dispatch_business_days(start, end, &options, ctx)
        }
        Commands::Rate { series } => {
            let series_id = series.unwrap_or(ctx.config.series_id);
            dispatch_rate(series_id, ctx).await
        }
        Commands::Holidays { year, calendar } => {
            let kind = calendar.unwrap_or(ctx.config.calendar);
            let calendar = holiday_calendar(year, kind);
            print!("{}", format_holidays(&calendar, ctx.json));
            Ok(())
        }
    }
}

async fn dispatch_project(
    input: &ProjectionInput,
    fixed_rate: Option<&str>,
    options: &ProjectionOptions,
    ctx: &AppContext,
) -> Result<()> {
    info!(
        "Projecting {} from {} to {} ({} calendar)",
        input.principal, input.start, input.end, options.calendar
    );

    let source = select_source(fixed_rate, ctx)?;
    let result = run_projection(input, &source, ctx.today, options)
        .await
        .context("Projection failed")?;

    if ctx.json {
        println!("{}", format_projection_json(input, &result));
    } else {
        print!("{}", format_projection_table(input, &result)?);
    }
    Ok(())
}

fn dispatch_business_days(
    start: NaiveDate,
    end: NaiveDate,
    options: &ProjectionOptions,
    ctx: &AppContext,
) -> Result<()> {
    if start > end {
        return Err(CalcError::InvalidInput(format!(
            "start date {} is after end date {}",
            start, end
        ))
        .into());
    }

    let count = DayCount {
        start,
        end,
        business_days: options.business_days(start, end),
        total_days: cdi_calc::projection::count_total_days(start, end),
    };
    print!("{}", format_day_count(&count, ctx.json));
    if ctx.json {
        println!();
    }
    Ok(())
}

async fn dispatch_rate(series_id: u32, ctx: &AppContext) -> Result<()> {
    let source = select_source(None, ctx)?;
    let rate = fetch_daily_rate(&source, series_id, ctx.today)
        .await
        .context("Rate lookup failed")?;

    print!("{}", format_daily_rate(series_id, &rate, ctx.json)?);
    if ctx.json {
        println!();
    }
    Ok(())
}

//! Rate & date engine
//!
//! Business-day counting, daily compounding and the implied monthly rate
//! derived from two payment observations. Everything here is pure except
//! [`run_projection`], which performs the single rate lookup.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::{holiday_calendar, CalendarKind, HolidayCalendar};
use crate::error::CalcError;
use crate::rates::{fetch_daily_rate, RateSource, CDI_SERIES_ID};

/// Business days per month used to scale a daily rate
pub const DEFAULT_BUSINESS_DAYS_PER_MONTH: u32 = 21;

/// Which year's holidays a date range is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayYearPolicy {
    /// Only the start date's year; later-year holidays are not seen
    #[default]
    StartYear,
    /// Every date is checked against its own year
    EachYear,
}

/// Values supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub principal: Decimal,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub payment_with_interest: Decimal,
    pub payment_without_interest: Decimal,
}

impl ProjectionInput {
    pub fn validate(&self) -> Result<(), CalcError> {
        if self.principal <= Decimal::ZERO {
            return Err(CalcError::InvalidInput(format!(
                "principal must be positive, got {}",
                self.principal
            )));
        }
        if self.start > self.end {
            return Err(CalcError::InvalidInput(format!(
                "start date {} is after end date {}",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

/// Knobs that are not part of the input itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionOptions {
    pub series_id: u32,
    pub calendar: CalendarKind,
    pub holiday_year_policy: HolidayYearPolicy,
    pub business_days_per_month: u32,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            series_id: CDI_SERIES_ID,
            calendar: CalendarKind::National,
            holiday_year_policy: HolidayYearPolicy::StartYear,
            business_days_per_month: DEFAULT_BUSINESS_DAYS_PER_MONTH,
        }
    }
}

impl ProjectionOptions {
    /// Business days in `[start, end]` under these options
    pub fn business_days(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        match self.holiday_year_policy {
            HolidayYearPolicy::StartYear => {
                count_business_days(start, end, start.year(), self.calendar)
            }
            HolidayYearPolicy::EachYear => count_business_days_each_year(start, end, self.calendar),
        }
    }
}

/// Output of a single projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectionResult {
    pub daily_rate: Decimal,
    pub rate_date: Option<NaiveDate>,
    pub used_fallback: bool,
    pub future_value: Decimal,
    pub future_value_after_interest_payment: Decimal,
    pub future_value_after_immediate_payment: Decimal,
    pub implied_monthly_rate: Decimal,
    pub total_days: u32,
    pub business_days: u32,
}

/// Business days in `[start, end]` (inclusive) using the `holiday_year` calendar.
///
/// Dates outside `holiday_year` are still enumerated, but only that year's
/// holidays are excluded.
pub fn count_business_days(
    start: NaiveDate,
    end: NaiveDate,
    holiday_year: i32,
    kind: CalendarKind,
) -> u32 {
    let calendar = holiday_calendar(holiday_year, kind);
    count_business_days_in(start, end, &calendar)
}

/// Business days in `[start, end]` (inclusive) against an explicit calendar
pub fn count_business_days_in(start: NaiveDate, end: NaiveDate, calendar: &HolidayCalendar) -> u32 {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| calendar.is_business_day(*d))
        .count() as u32
}

/// Business days in `[start, end]`, each date checked against its own year
pub fn count_business_days_each_year(start: NaiveDate, end: NaiveDate, kind: CalendarKind) -> u32 {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| holiday_calendar(d.year(), kind).is_business_day(*d))
        .count() as u32
}

/// Calendar days in `[start, end]` (inclusive); 0 for an inverted range
pub fn count_total_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let days = (end - start).num_days();
    if days < 0 {
        0
    } else {
        (days + 1) as u32
    }
}

/// `principal × (1 + daily_rate)^days`
pub fn project_future_value(
    principal: Decimal,
    daily_rate: Decimal,
    days: u32,
) -> Result<Decimal, CalcError> {
    let factor = (Decimal::ONE + daily_rate)
        .checked_powu(u64::from(days))
        .ok_or_else(|| {
            CalcError::InvalidInput(format!(
                "compounding factor overflows for rate {} over {} days",
                daily_rate, days
            ))
        })?;
    principal.checked_mul(factor).ok_or_else(|| {
        CalcError::InvalidInput(format!("future value of {} overflows", principal))
    })
}

/// Monthly rate implied by going from `initial_payment` to `final_payment`
/// over the business days of `[start, end]`.
pub fn implied_monthly_rate(
    initial_payment: Decimal,
    final_payment: Decimal,
    start: NaiveDate,
    end: NaiveDate,
    options: &ProjectionOptions,
) -> Result<Decimal, CalcError> {
    if initial_payment.is_zero() {
        return Err(CalcError::DivisionByZero(
            "initial payment is zero".to_string(),
        ));
    }
    let business_days = options.business_days(start, end);
    if business_days == 0 {
        return Err(CalcError::DivisionByZero(format!(
            "no business days between {} and {}",
            start, end
        )));
    }

    final_payment
        .checked_sub(initial_payment)
        .and_then(|diff| diff.checked_div(initial_payment))
        .and_then(|pct| pct.checked_div(Decimal::from(business_days)))
        .and_then(|daily| daily.checked_mul(Decimal::from(options.business_days_per_month)))
        .ok_or_else(|| {
            CalcError::InvalidInput(format!(
                "implied rate from {} to {} overflows",
                initial_payment, final_payment
            ))
        })
}

fn checked_less(value: Decimal, payment: Decimal, what: &str) -> Result<Decimal, CalcError> {
    value.checked_sub(payment).ok_or_else(|| {
        CalcError::InvalidInput(format!("{} minus payment {} overflows", what, payment))
    })
}

/// Run the projection with an already known daily rate (fraction)
pub fn project_with_rate(
    input: &ProjectionInput,
    daily_rate: Decimal,
    options: &ProjectionOptions,
) -> Result<ProjectionResult, CalcError> {
    input.validate()?;

    let business_days = options.business_days(input.start, input.end);
    let total_days = count_total_days(input.start, input.end);
    debug!(
        "{} business days out of {} between {} and {}",
        business_days, total_days, input.start, input.end
    );

    let future_value = project_future_value(input.principal, daily_rate, business_days)?;
    let future_value_after_interest_payment =
        checked_less(future_value, input.payment_with_interest, "future value")?;
    let future_value_after_immediate_payment = project_future_value(
        checked_less(input.principal, input.payment_without_interest, "principal")?,
        daily_rate,
        business_days,
    )?;
    // (without, with): the no-interest payment is the starting point
    let implied = implied_monthly_rate(
        input.payment_without_interest,
        input.payment_with_interest,
        input.start,
        input.end,
        options,
    )?;

    Ok(ProjectionResult {
        daily_rate,
        rate_date: None,
        used_fallback: false,
        future_value,
        future_value_after_interest_payment,
        future_value_after_immediate_payment,
        implied_monthly_rate: implied,
        total_days,
        business_days,
    })
}

/// Fetch the reference rate as of `today` and run the full projection
pub async fn run_projection<S: RateSource + Sync>(
    input: &ProjectionInput,
    source: &S,
    today: NaiveDate,
    options: &ProjectionOptions,
) -> Result<ProjectionResult, CalcError> {
    input.validate()?;

    let rate = fetch_daily_rate(source, options.series_id, today).await?;
    let mut result = project_with_rate(input, rate.rate, options)?;
    result.rate_date = rate.observation_date;
    result.used_fallback = rate.used_fallback;
    Ok(result)
}

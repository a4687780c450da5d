// Rates module - reference rate lookup (CDI) with same-day fallback

pub mod bcb;

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::future::Future;
use tracing::{info, warn};

use crate::error::CalcError;

/// SGS series code for the daily CDI rate
pub const CDI_SERIES_ID: u32 = 12;

/// How far back the single fallback lookup goes
pub const FALLBACK_DAYS: i64 = 2;

/// One value of a rate series.
///
/// Sources return `rate` as published (a percentage); [`fetch_daily_rate`]
/// converts it into a fraction before handing it to the engine. `date` is
/// the publication date, or `None` for a value not tied to one (a fixed rate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateObservation {
    pub date: Option<NaiveDate>,
    pub rate: Decimal,
}

impl RateObservation {
    fn describe_date(&self) -> String {
        match self.date {
            Some(date) => date.to_string(),
            None => "fixed input".to_string(),
        }
    }
}

/// Source of daily reference rates
pub trait RateSource {
    /// Latest observation of `series_id` published for `as_of`, or `None`
    /// when the source has nothing yet.
    fn get_rate(
        &self,
        series_id: u32,
        as_of: NaiveDate,
    ) -> impl Future<Output = Result<Option<RateObservation>>> + Send;
}

/// Daily rate fetched for a projection, as a fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyRate {
    /// Publication date; `None` when the rate was given rather than fetched
    pub observation_date: Option<NaiveDate>,
    pub rate: Decimal,
    /// True when today's value was missing and the older lookup was used
    pub used_fallback: bool,
}

/// Fetch the daily rate for `today`, falling back once to `today - 2 days`.
pub async fn fetch_daily_rate<S: RateSource + Sync>(
    source: &S,
    series_id: u32,
    today: NaiveDate,
) -> std::result::Result<DailyRate, CalcError> {
    match source.get_rate(series_id, today).await {
        Ok(Some(obs)) => {
            info!(
                "Using series {} value {} from {}",
                series_id,
                obs.rate,
                obs.describe_date()
            );
            return Ok(to_daily_rate(obs, false));
        }
        Ok(None) => warn!("No rate published for {}, trying fallback", today),
        Err(e) => warn!("Rate lookup for {} failed ({:#}), trying fallback", today, e),
    }

    let fallback = today - Duration::days(FALLBACK_DAYS);
    match source.get_rate(series_id, fallback).await {
        Ok(Some(obs)) => {
            info!(
                "Using fallback series {} value {} from {}",
                series_id,
                obs.rate,
                obs.describe_date()
            );
            Ok(to_daily_rate(obs, true))
        }
        Ok(None) => Err(CalcError::RateUnavailable(format!(
            "series {} has no data for {} or {}",
            series_id, today, fallback
        ))),
        Err(e) => Err(CalcError::RateUnavailable(format!(
            "series {} lookup failed: {:#}",
            series_id, e
        ))),
    }
}

fn to_daily_rate(obs: RateObservation, used_fallback: bool) -> DailyRate {
    DailyRate {
        observation_date: obs.date,
        rate: obs.rate / Decimal::ONE_HUNDRED,
        used_fallback,
    }
}

/// Source that always answers with the same percentage, without a
/// publication date
#[derive(Debug, Clone, Copy)]
pub struct FixedRateSource {
    percent: Decimal,
}

impl FixedRateSource {
    pub fn new(percent: Decimal) -> Self {
        Self { percent }
    }
}

impl RateSource for FixedRateSource {
    async fn get_rate(&self, _series_id: u32, _as_of: NaiveDate) -> Result<Option<RateObservation>> {
        Ok(Some(RateObservation {
            date: None,
            rate: self.percent,
        }))
    }
}

/// Source with no data, used when running offline without a fixed rate
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

impl RateSource for OfflineSource {
    async fn get_rate(&self, _series_id: u32, _as_of: NaiveDate) -> Result<Option<RateObservation>> {
        Ok(None)
    }
}

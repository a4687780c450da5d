use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use super::{RateObservation, RateSource};

pub const DEFAULT_SGS_BASE_URL: &str = "https://api.bcb.gov.br/dados/serie";

/// One row of the SGS JSON payload
#[derive(Debug, Deserialize)]
struct SgsRow {
    data: String,
    valor: String,
}

/// Banco Central do Brasil SGS (Sistema Gerenciador de Séries Temporais) client
pub struct BcbSgsClient {
    client: Client,
    base_url: String,
    today: NaiveDate,
}

impl BcbSgsClient {
    /// `today` closes every query window; lookups ask for `[as_of, today]`.
    pub fn new(base_url: &str, timeout: Duration, today: NaiveDate) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; CdiCalc/1.0)")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            today,
        })
    }

    fn series_url(&self, series_id: u32, as_of: NaiveDate) -> String {
        let end = if as_of > self.today { as_of } else { self.today };
        format!(
            "{}/bcdata.sgs.{}/dados?formato=json&dataInicial={}&dataFinal={}",
            self.base_url,
            series_id,
            as_of.format("%d/%m/%Y"),
            end.format("%d/%m/%Y")
        )
    }
}

impl RateSource for BcbSgsClient {
    /// Latest value published in the window `[as_of, today]`.
    ///
    /// The window is open towards `today`, so a row newer than `as_of` is
    /// returned when one exists; rows before `as_of` are never considered.
    /// `None` means nothing was published from `as_of` on.
    async fn get_rate(&self, series_id: u32, as_of: NaiveDate) -> Result<Option<RateObservation>> {
        let url = self.series_url(series_id, as_of);
        info!("Fetching SGS series {} from {}", series_id, as_of);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request to BCB SGS")?;

        // SGS answers 404 when the window has no published values yet
        if response.status() == StatusCode::NOT_FOUND {
            debug!("SGS returned 404 for series {} from {}", series_id, as_of);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow!("BCB SGS returned error status: {}", response.status()));
        }

        let body = response
            .text()
            .await
            .context("Failed to read BCB SGS response")?;
        parse_sgs_response(&body)
    }
}

/// Parse an SGS JSON body and keep the most recent observation
pub fn parse_sgs_response(body: &str) -> Result<Option<RateObservation>> {
    let rows: Vec<SgsRow> =
        serde_json::from_str(body).context("Failed to parse BCB SGS response")?;

    let mut latest: Option<(NaiveDate, Decimal)> = None;
    for row in rows {
        let date = NaiveDate::parse_from_str(row.data.trim(), "%d/%m/%Y")
            .with_context(|| format!("Invalid date in SGS response: {}", row.data))?;
        let rate = Decimal::from_str(row.valor.trim())
            .with_context(|| format!("Invalid value in SGS response: {}", row.valor))?;

        if latest.map_or(true, |(l, _)| date >= l) {
            latest = Some((date, rate));
        }
    }

    Ok(latest.map(|(date, rate)| RateObservation {
        date: Some(date),
        rate,
    }))
}

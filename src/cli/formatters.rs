//! Output formatting module for CLI display
//!
//! Keeps presentation apart from the projection engine: everything here
//! takes finished values and returns strings.

use chrono::NaiveDate;
use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use cdi_calc::calendar::HolidayCalendar;
use cdi_calc::error::ErrorReport;
use cdi_calc::projection::{ProjectionInput, ProjectionResult};
use cdi_calc::rates::DailyRate;
use cdi_calc::error::CalcError;
use cdi_calc::utils::{format_currency, format_percent, format_percent_dp};

fn signed_currency(value: Decimal) -> String {
    let text = format_currency(value);
    if value >= Decimal::ZERO {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

fn rate_line(
    daily_rate: Decimal,
    rate_date: Option<NaiveDate>,
    used_fallback: bool,
) -> Result<String, CalcError> {
    let pct = format_percent_dp(daily_rate, 6)?;
    Ok(match rate_date {
        Some(date) if used_fallback => format!(
            "CDI daily rate: {} (published {}, fallback lookup)",
            pct,
            date.format("%Y-%m-%d")
        ),
        Some(date) => format!(
            "CDI daily rate: {} (published {})",
            pct,
            date.format("%Y-%m-%d")
        ),
        None => format!("CDI daily rate: {} (fixed)", pct),
    })
}

/// Format a projection for terminal output, one metric per row
pub fn format_projection_table(
    input: &ProjectionInput,
    result: &ProjectionResult,
) -> Result<String, CalcError> {
    #[derive(Tabled)]
    struct MetricRow {
        #[tabled(rename = "Metric")]
        metric: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let rows = vec![
        MetricRow {
            metric: "Future value with interest".to_string(),
            value: signed_currency(result.future_value),
        },
        MetricRow {
            metric: format!(
                "Value after paying {} after {} business days",
                format_currency(input.payment_with_interest),
                result.business_days
            ),
            value: signed_currency(result.future_value_after_interest_payment),
        },
        MetricRow {
            metric: format!(
                "Future value after paying {} now",
                format_currency(input.payment_without_interest)
            ),
            value: signed_currency(result.future_value_after_immediate_payment),
        },
        MetricRow {
            metric: "Implied monthly rate".to_string(),
            value: format_percent(result.implied_monthly_rate)?,
        },
        MetricRow {
            metric: "Total days between dates".to_string(),
            value: result.total_days.to_string(),
        },
        MetricRow {
            metric: "Business days between dates".to_string(),
            value: result.business_days.to_string(),
        },
    ];

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());

    let mut output = String::new();
    output.push_str(&format!(
        "\n{} CDI projection {} → {}\n",
        "📈".cyan().bold(),
        input.start.format("%Y-%m-%d"),
        input.end.format("%Y-%m-%d")
    ));
    output.push_str(&format!(
        "{}\n\n",
        rate_line(result.daily_rate, result.rate_date, result.used_fallback)?.bright_black()
    ));
    output.push_str(&table.to_string());
    output.push('\n');
    Ok(output)
}

/// Format a projection for JSON output
pub fn format_projection_json(input: &ProjectionInput, result: &ProjectionResult) -> String {
    #[derive(Serialize)]
    struct JsonProjection<'a> {
        input: &'a ProjectionInput,
        result: &'a ProjectionResult,
    }

    serde_json::to_string_pretty(&JsonProjection { input, result })
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

#[derive(Debug, Serialize)]
pub struct DayCount {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub business_days: u32,
    pub total_days: u32,
}

pub fn format_day_count(count: &DayCount, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(count)
            .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e));
    }

    format!(
        "{:<16} {}\n{:<16} {}\n",
        "Business days:".bold(),
        count.business_days,
        "Total days:".bold(),
        count.total_days
    )
}

pub fn format_daily_rate(
    series_id: u32,
    rate: &DailyRate,
    json: bool,
) -> Result<String, CalcError> {
    if json {
        #[derive(Serialize)]
        struct JsonRate<'a> {
            series_id: u32,
            #[serde(flatten)]
            rate: &'a DailyRate,
        }
        return Ok(serde_json::to_string_pretty(&JsonRate { series_id, rate })
            .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e)));
    }

    Ok(format!(
        "{} SGS series {}\n{}\n",
        "ℹ".blue().bold(),
        series_id,
        rate_line(rate.rate, rate.observation_date, rate.used_fallback)?
    ))
}

pub fn format_holidays(calendar: &HolidayCalendar, json: bool) -> String {
    #[derive(Tabled, Serialize)]
    struct HolidayRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Weekday")]
        weekday: String,
        #[tabled(rename = "Holiday")]
        name: String,
    }

    let rows: Vec<HolidayRow> = calendar
        .iter()
        .map(|(date, name)| HolidayRow {
            date: date.format("%Y-%m-%d").to_string(),
            weekday: date.format("%a").to_string(),
            name: name.to_string(),
        })
        .collect();

    if json {
        return serde_json::to_string_pretty(&rows)
            .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e));
    }

    if rows.is_empty() {
        return format!(
            "{} No holidays in the {} calendar for {}\n",
            "ℹ".blue().bold(),
            calendar.kind(),
            calendar.year()
        );
    }

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    format!(
        "\n{} {} holidays for {}\n\n{}\n",
        "📅".cyan().bold(),
        calendar.kind(),
        calendar.year(),
        table
    )
}

/// Single-line error shown in place of a report
pub fn format_error(report: &ErrorReport, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(report)
            .unwrap_or_else(|_| format!(r#"{{"kind": "{}"}}"#, report.kind));
    }
    format!("{} [{}]: {}", "Error".red().bold(), report.kind, report.message)
}

//! Brazilian holiday calendars
//!
//! A [`HolidayCalendar`] is the set of non-business weekdays for one year.
//! Calendars are immutable once built and are shared through a process-wide
//! cache keyed by `(kind, year)`.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Global per-year calendar cache; entries are never mutated after insertion.
static CALENDARS: Lazy<Mutex<HashMap<(CalendarKind, i32), Arc<HolidayCalendar>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Which holiday list to use
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum CalendarKind {
    /// National public holidays
    #[default]
    National,
    /// Financial market calendar (national + Carnaval + Corpus Christi)
    Anbima,
    /// Weekends only, no holidays
    WeekendOnly,
}

impl CalendarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarKind::National => "national",
            CalendarKind::Anbima => "anbima",
            CalendarKind::WeekendOnly => "weekend_only",
        }
    }
}

impl fmt::Display for CalendarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holidays of a single year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayCalendar {
    kind: CalendarKind,
    year: i32,
    holidays: BTreeMap<NaiveDate, &'static str>,
}

impl HolidayCalendar {
    /// Calendar with no holidays at all
    pub fn empty(year: i32) -> Self {
        Self {
            kind: CalendarKind::WeekendOnly,
            year,
            holidays: BTreeMap::new(),
        }
    }

    /// Build the Brazilian calendar for `year`
    pub fn brazil(year: i32, kind: CalendarKind) -> Self {
        let mut holidays = BTreeMap::new();
        if kind == CalendarKind::WeekendOnly {
            return Self {
                kind,
                year,
                holidays,
            };
        }

        let fixed = [
            (1, 1, "Confraternização Universal"),
            (4, 21, "Tiradentes"),
            (5, 1, "Dia do Trabalhador"),
            (9, 7, "Independência do Brasil"),
            (10, 12, "Nossa Senhora Aparecida"),
            (11, 2, "Finados"),
            (11, 15, "Proclamação da República"),
            (12, 25, "Natal"),
        ];
        for (month, day, name) in fixed {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                holidays.insert(date, name);
            }
        }

        // National holiday since Law 14.759/2023
        if year >= 2024 {
            if let Some(date) = NaiveDate::from_ymd_opt(year, 11, 20) {
                holidays.insert(date, "Dia Nacional de Zumbi e da Consciência Negra");
            }
        }

        if let Some(easter) = easter_sunday(year) {
            holidays.insert(easter - Duration::days(2), "Sexta-feira Santa");
            if kind == CalendarKind::Anbima {
                holidays.insert(easter - Duration::days(48), "Carnaval");
                holidays.insert(easter - Duration::days(47), "Carnaval");
                holidays.insert(easter + Duration::days(60), "Corpus Christi");
            }
        }

        Self {
            kind,
            year,
            holidays,
        }
    }

    /// Arbitrary holiday set, mostly for tests and custom calendars
    pub fn from_dates(year: i32, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            kind: CalendarKind::WeekendOnly,
            year,
            holidays: dates.into_iter().map(|d| (d, "Feriado")).collect(),
        }
    }

    pub fn kind(&self) -> CalendarKind {
        self.kind
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.holidays.contains_key(&date)
    }

    pub fn name_of(&self, date: NaiveDate) -> Option<&'static str> {
        self.holidays.get(&date).copied()
    }

    /// Holidays in chronological order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &'static str)> + '_ {
        self.holidays.iter().map(|(d, n)| (*d, *n))
    }

    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }

    /// Monday–Friday and not a holiday in this calendar
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.contains(date)
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Shared calendar for `(year, kind)`, built on first use
pub fn holiday_calendar(year: i32, kind: CalendarKind) -> Arc<HolidayCalendar> {
    let mut cache = CALENDARS.lock().unwrap_or_else(|e| e.into_inner());
    cache
        .entry((kind, year))
        .or_insert_with(|| {
            debug!("Building {} holiday calendar for {}", kind, year);
            Arc::new(HolidayCalendar::brazil(year, kind))
        })
        .clone()
}

/// Gregorian Easter Sunday (Meeus/Jones/Butcher)
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = ((h + l - 7 * m + 114) % 31) + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

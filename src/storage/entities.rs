use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::utils::time::hh_mm_ser;

pub const DEFAULT_DAILY_WAGE: f64 = 500.;
pub const DEFAULT_PAYDAY_DAY: u32 = 5;
/// Friday and Saturday, counted from Sunday = 0.
pub const DEFAULT_REST_DAYS: [u8; 2] = [5, 6];
/// February gets paid on its last day under [PaydayRule::FifteenthOrLast].
pub const DEFAULT_FIFTEENTH_EXCEPTIONS: [u32; 1] = [2];

/// How the next payday is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum PaydayMode {
    /// Same day of every month.
    #[default]
    FixedDate,
    /// One of [PaydayRule].
    Rule,
}

impl From<String> for PaydayMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "date" | "fixed_date" | "fixedDate" => PaydayMode::FixedDate,
            _ => PaydayMode::Rule,
        }
    }
}

impl From<PaydayMode> for String {
    fn from(value: PaydayMode) -> Self {
        value.to_string()
    }
}

impl Display for PaydayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaydayMode::FixedDate => write!(f, "date"),
            PaydayMode::Rule => write!(f, "rule"),
        }
    }
}

/// Calendar rules for [PaydayMode::Rule]. Names that aren't recognized fall back to
/// [PaydayRule::LastDay].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum PaydayRule {
    FirstDay,
    #[default]
    LastDay,
    /// 15th of the month, or the last day for months listed as exceptions.
    FifteenthOrLast,
    /// Last day of the month that isn't Saturday or Sunday.
    LastWeekday,
}

impl PaydayRule {
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim() {
            "first_day" | "firstDay" => PaydayRule::FirstDay,
            "15th_or_last" | "fifteenth_or_last" | "fifteenthOrLast" => {
                PaydayRule::FifteenthOrLast
            }
            "last_weekday" | "lastWeekday" => PaydayRule::LastWeekday,
            _ => PaydayRule::LastDay,
        }
    }
}

impl FromStr for PaydayRule {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PaydayRule::parse_lenient(s))
    }
}

impl From<String> for PaydayRule {
    fn from(value: String) -> Self {
        PaydayRule::parse_lenient(&value)
    }
}

impl From<PaydayRule> for String {
    fn from(value: PaydayRule) -> Self {
        value.to_string()
    }
}

impl Display for PaydayRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaydayRule::FirstDay => write!(f, "first_day"),
            PaydayRule::LastDay => write!(f, "last_day"),
            PaydayRule::FifteenthOrLast => write!(f, "15th_or_last"),
            PaydayRule::LastWeekday => write!(f, "last_weekday"),
        }
    }
}

/// User settings. Every field falls back to its default on its own when it's missing from the
/// stored blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub daily_wage: f64,
    #[serde(with = "hh_mm_ser")]
    pub work_start: NaiveTime,
    #[serde(with = "hh_mm_ser")]
    pub work_end: NaiveTime,
    pub payday_mode: PaydayMode,
    pub payday_day_of_month: u32,
    pub payday_rule: PaydayRule,
    /// Weekdays counted from Sunday = 0.
    pub rest_days: BTreeSet<u8>,
    /// Months (1 = January) paid on their last day instead of the 15th.
    pub fifteenth_exception_months: BTreeSet<u32>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            daily_wage: DEFAULT_DAILY_WAGE,
            work_start: NaiveTime::from_hms_opt(8, 0, 0).expect("08:00 is a valid time"),
            work_end: NaiveTime::from_hms_opt(17, 0, 0).expect("17:00 is a valid time"),
            payday_mode: PaydayMode::default(),
            payday_day_of_month: DEFAULT_PAYDAY_DAY,
            payday_rule: PaydayRule::default(),
            rest_days: DEFAULT_REST_DAYS.into_iter().collect(),
            fifteenth_exception_months: DEFAULT_FIFTEENTH_EXCEPTIONS.into_iter().collect(),
        }
    }
}

impl Configuration {
    /// Brings values that slipped past parsing back into their domain.
    pub fn normalized(mut self) -> Self {
        if !self.daily_wage.is_finite() || self.daily_wage < 0. {
            self.daily_wage = DEFAULT_DAILY_WAGE;
        }
        self.payday_day_of_month = self.payday_day_of_month.clamp(1, 31);
        self.rest_days = self.rest_days.iter().map(|v| v % 7).collect();
        if self.rest_days.is_empty() {
            self.rest_days = DEFAULT_REST_DAYS.into_iter().collect();
        }
        self.fifteenth_exception_months
            .retain(|v| (1..=12).contains(v));
        self
    }

    pub fn rest_weekdays(&self) -> Vec<Weekday> {
        self.rest_days.iter().map(|v| weekday_from_sunday(*v)).collect()
    }
}

/// Converts `0 = Sunday .. 6 = Saturday` into a [Weekday].
pub fn weekday_from_sunday(value: u8) -> Weekday {
    match value % 7 {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

/// What changes during a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuntimeState {
    pub clocked_in: bool,
    pub clock_in_time: Option<DateTime<Utc>>,
    pub work_days_this_month: u32,
    pub extra_income_today: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockStatus {
    In,
    Out,
}

impl Display for ClockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClockStatus::In => write!(f, "in"),
            ClockStatus::Out => write!(f, "out"),
        }
    }
}

/// One calendar day of attendance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub clock_in_time: Option<DateTime<Utc>>,
    pub status: ClockStatus,
    #[serde(default)]
    pub work_hours: Option<f64>,
    #[serde(default)]
    pub income: Option<f64>,
    #[serde(default)]
    pub extra_income: Option<f64>,
}

/// Partial [AttendanceRecord]. Only fields that are set overwrite the stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendancePatch {
    pub date: NaiveDate,
    pub clock_in_time: Option<DateTime<Utc>>,
    pub status: Option<ClockStatus>,
    pub work_hours: Option<f64>,
    pub income: Option<f64>,
    pub extra_income: Option<f64>,
}

impl AttendancePatch {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            clock_in_time: None,
            status: None,
            work_hours: None,
            income: None,
            extra_income: None,
        }
    }

    pub fn with_clock_in_time(self, clock_in_time: DateTime<Utc>) -> Self {
        Self {
            clock_in_time: Some(clock_in_time),
            ..self
        }
    }

    pub fn with_status(self, status: ClockStatus) -> Self {
        Self {
            status: Some(status),
            ..self
        }
    }

    pub fn with_work_hours(self, work_hours: f64) -> Self {
        Self {
            work_hours: Some(work_hours),
            ..self
        }
    }

    pub fn with_income(self, income: f64) -> Self {
        Self {
            income: Some(income),
            ..self
        }
    }

    pub fn with_extra_income(self, extra_income: f64) -> Self {
        Self {
            extra_income: Some(extra_income),
            ..self
        }
    }

    /// Writes present fields over `record`.
    pub fn apply_to(&self, record: &mut AttendanceRecord) {
        if let Some(v) = self.clock_in_time {
            record.clock_in_time = Some(v);
        }
        if let Some(v) = self.status {
            record.status = v;
        }
        if let Some(v) = self.work_hours {
            record.work_hours = Some(v);
        }
        if let Some(v) = self.income {
            record.income = Some(v);
        }
        if let Some(v) = self.extra_income {
            record.extra_income = Some(v);
        }
    }

    /// A fresh record built only from this patch. Records without a status are considered
    /// clocked out.
    pub fn into_record(self, id: i64) -> AttendanceRecord {
        AttendanceRecord {
            id,
            date: self.date,
            clock_in_time: self.clock_in_time,
            status: self.status.unwrap_or(ClockStatus::Out),
            work_hours: self.work_hours,
            income: self.income,
            extra_income: self.extra_income,
        }
    }
}

use chrono::{Datelike, NaiveDate, NaiveTime};

/// This is the standard way of converting a date to a string in payclock.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Returns `(year, month)` of the month following the given one.
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Last calendar day of a month. Computed as the day before the first of the next month.
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = next_month(year, month);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|v| v.pred_opt())
        .expect("Month arithmetic should stay inside chrono's date range")
}

/// Builds a date in the given month, clamping `day` to the month length.
pub fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let last = last_day_of_month(year, month);
    last.with_day(day.clamp(1, last.day())).unwrap_or(last)
}

/// Fractional hours from `from` to `to`. Negative when `to` comes first.
pub fn hours_between(from: NaiveTime, to: NaiveTime) -> f64 {
    (to - from).num_milliseconds() as f64 / (60. * 60. * 1000.)
}

/// Serde helper storing [NaiveTime] the way people type it, `HH:MM`.
pub mod hh_mm_ser {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_time_of_day(&s).map_err(serde::de::Error::custom)
    }
}

/// Accepts `HH:MM` and `HH:MM:SS`.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, hh_mm_ser::FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
}

//! Calendar rules for paydays and rest days.
//!
//! Everything here works in the user's local calendar. Rule based paydays keep pointing at the
//! current day until [PAYDAY_CUTOFF_HOUR], after which they move on to the next occurrence.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::{
    storage::entities::{weekday_from_sunday, Configuration, PaydayMode, PaydayRule, DEFAULT_REST_DAYS},
    utils::time::{clamped_date, last_day_of_month, next_month},
};

pub const PAYDAY_CUTOFF_HOUR: u32 = 12;

/// Next payday for the configured mode.
pub fn next_payday(now: NaiveDateTime, config: &Configuration) -> NaiveDate {
    match config.payday_mode {
        PaydayMode::FixedDate => fixed_date_payday(now.date(), config.payday_day_of_month),
        PaydayMode::Rule => rule_payday(
            now,
            config.payday_rule,
            &config.fifteenth_exception_months,
        ),
    }
}

/// Payday on the same day of every month. Months that are too short for `day` pay on their
/// last day.
pub fn fixed_date_payday(today: NaiveDate, day: u32) -> NaiveDate {
    let this_month = clamped_date(today.year(), today.month(), day);
    if today < this_month {
        this_month
    } else {
        let (year, month) = next_month(today.year(), today.month());
        clamped_date(year, month, day)
    }
}

/// Next occurrence of `rule`. This month's occurrence counts until noon of that day.
pub fn rule_payday(
    now: NaiveDateTime,
    rule: PaydayRule,
    fifteenth_exceptions: &BTreeSet<u32>,
) -> NaiveDate {
    let today = now.date();
    let candidate = rule_occurrence(rule, today.year(), today.month(), fifteenth_exceptions);

    let passed =
        today > candidate || (today == candidate && now.hour() >= PAYDAY_CUTOFF_HOUR);
    if passed {
        let (year, month) = next_month(today.year(), today.month());
        rule_occurrence(rule, year, month, fifteenth_exceptions)
    } else {
        candidate
    }
}

/// Day of the given month `rule` points at.
pub fn rule_occurrence(
    rule: PaydayRule,
    year: i32,
    month: u32,
    fifteenth_exceptions: &BTreeSet<u32>,
) -> NaiveDate {
    match rule {
        PaydayRule::FirstDay => clamped_date(year, month, 1),
        PaydayRule::LastDay => last_day_of_month(year, month),
        PaydayRule::FifteenthOrLast if fifteenth_exceptions.contains(&month) => {
            last_day_of_month(year, month)
        }
        PaydayRule::FifteenthOrLast => clamped_date(year, month, 15),
        PaydayRule::LastWeekday => last_weekday_of_month(year, month),
    }
}

fn last_weekday_of_month(year: i32, month: u32) -> NaiveDate {
    let mut day = last_day_of_month(year, month);
    while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        day = day
            .pred_opt()
            .expect("Every month has a weekday before its end");
    }
    day
}

/// Calendar days from `today` to `payday`.
pub fn days_until(today: NaiveDate, payday: NaiveDate) -> i64 {
    (payday - today).num_days()
}

/// Days until the closest rest day, `0` when today is one. An empty set uses the default rest
/// days.
pub fn days_until_next_rest_day(today: NaiveDate, rest_days: &[Weekday]) -> u32 {
    let today = today.weekday().num_days_from_sunday();
    let distance = |day: &Weekday| (day.num_days_from_sunday() + 7 - today) % 7;

    if rest_days.is_empty() {
        return DEFAULT_REST_DAYS
            .iter()
            .map(|v| distance(&weekday_from_sunday(*v)))
            .min()
            .unwrap_or(0);
    }
    rest_days.iter().map(distance).min().unwrap_or(0)
}

/// Human readable payday schedule.
pub fn describe_schedule(config: &Configuration) -> String {
    match config.payday_mode {
        PaydayMode::FixedDate => format!("day {} of every month", config.payday_day_of_month),
        PaydayMode::Rule => match config.payday_rule {
            PaydayRule::FirstDay => "first day of every month".into(),
            PaydayRule::LastDay => "last day of every month".into(),
            PaydayRule::FifteenthOrLast => "15th, or the last day in exception months".into(),
            PaydayRule::LastWeekday => "last weekday of every month".into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
    use proptest::prelude::*;

    use crate::storage::entities::{Configuration, PaydayMode, PaydayRule};

    use super::{
        days_until, days_until_next_rest_day, describe_schedule, fixed_date_payday, next_payday,
        rule_payday, PAYDAY_CUTOFF_HOUR,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, hour: u32) -> NaiveDateTime {
        date(y, m, d).and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap())
    }

    fn february() -> BTreeSet<u32> {
        [2].into_iter().collect()
    }

    fn rule_config(rule: PaydayRule) -> Configuration {
        Configuration {
            payday_mode: PaydayMode::Rule,
            payday_rule: rule,
            ..Default::default()
        }
    }

    #[test]
    fn fixed_date_after_payday_moves_to_next_month() {
        let config = Configuration {
            payday_mode: PaydayMode::FixedDate,
            payday_day_of_month: 5,
            ..Default::default()
        };
        assert_eq!(next_payday(at(2025, 3, 10, 9), &config), date(2025, 4, 5));
        assert_eq!(next_payday(at(2025, 3, 4, 9), &config), date(2025, 3, 5));
        assert_eq!(next_payday(at(2025, 3, 5, 9), &config), date(2025, 4, 5));
    }

    #[test]
    fn fixed_date_clamps_short_months() {
        assert_eq!(fixed_date_payday(date(2025, 1, 31), 31), date(2025, 2, 28));
        assert_eq!(fixed_date_payday(date(2024, 1, 31), 30), date(2024, 2, 29));
        assert_eq!(fixed_date_payday(date(2025, 2, 10), 31), date(2025, 2, 28));
    }

    #[test]
    fn fixed_date_on_clamped_payday_moves_on() {
        let config = Configuration {
            payday_day_of_month: 31,
            ..Default::default()
        };
        assert_eq!(next_payday(at(2025, 2, 28, 15), &config), date(2025, 3, 31));
        assert_eq!(next_payday(at(2025, 4, 30, 9), &config), date(2025, 5, 31));
        assert_eq!(fixed_date_payday(date(2024, 2, 29), 30), date(2024, 3, 30));
    }

    #[test]
    fn fixed_date_wraps_year() {
        assert_eq!(fixed_date_payday(date(2025, 12, 10), 5), date(2026, 1, 5));
    }

    #[test]
    fn last_day_in_february() {
        let config = rule_config(PaydayRule::LastDay);
        assert_eq!(next_payday(at(2025, 2, 20, 9), &config), date(2025, 2, 28));
        assert_eq!(next_payday(at(2024, 2, 20, 9), &config), date(2024, 2, 29));
    }

    #[test]
    fn last_day_rolls_over_the_year_after_noon() {
        let config = rule_config(PaydayRule::LastDay);
        assert_eq!(next_payday(at(2025, 12, 31, 13), &config), date(2026, 1, 31));
        assert_eq!(next_payday(at(2025, 12, 31, 9), &config), date(2025, 12, 31));
    }

    #[test]
    fn first_day_is_next_month() {
        let config = rule_config(PaydayRule::FirstDay);
        assert_eq!(next_payday(at(2025, 3, 10, 9), &config), date(2025, 4, 1));
        assert_eq!(next_payday(at(2025, 3, 1, 9), &config), date(2025, 3, 1));
        assert_eq!(
            next_payday(at(2025, 3, 1, PAYDAY_CUTOFF_HOUR), &config),
            date(2025, 4, 1)
        );
        assert_eq!(next_payday(at(2025, 12, 15, 9), &config), date(2026, 1, 1));
    }

    #[test]
    fn fifteenth_or_last() {
        let rule = PaydayRule::FifteenthOrLast;
        assert_eq!(rule_payday(at(2025, 3, 10, 9), rule, &february()), date(2025, 3, 15));
        assert_eq!(rule_payday(at(2025, 3, 15, 11), rule, &february()), date(2025, 3, 15));
        assert_eq!(rule_payday(at(2025, 3, 15, 13), rule, &february()), date(2025, 4, 15));
        assert_eq!(rule_payday(at(2025, 12, 20, 9), rule, &february()), date(2026, 1, 15));
    }

    #[test]
    fn fifteenth_or_last_recomputes_exception_for_next_month() {
        let rule = PaydayRule::FifteenthOrLast;
        assert_eq!(rule_payday(at(2024, 1, 20, 9), rule, &february()), date(2024, 2, 29));
        assert_eq!(rule_payday(at(2025, 2, 20, 9), rule, &february()), date(2025, 2, 28));
        assert_eq!(rule_payday(at(2025, 2, 20, 9), rule, &BTreeSet::new()), date(2025, 3, 15));
    }

    #[test]
    fn last_weekday_skips_weekends() {
        let rule = PaydayRule::LastWeekday;
        // May 31st 2025 is a Saturday
        assert_eq!(rule_payday(at(2025, 5, 10, 9), rule, &february()), date(2025, 5, 30));
        assert_eq!(rule_payday(at(2025, 5, 30, 13), rule, &february()), date(2025, 6, 30));
        // August 31st 2025 is a Sunday, so the payday already passed on the 29th
        assert_eq!(rule_payday(at(2025, 8, 30, 9), rule, &february()), date(2025, 9, 30));
    }

    #[test]
    fn rest_day_countdown() {
        let rest = [Weekday::Fri, Weekday::Sat];
        // 2025-03-10 is a Monday
        assert_eq!(days_until_next_rest_day(date(2025, 3, 10), &rest), 4);
        assert_eq!(days_until_next_rest_day(date(2025, 3, 14), &rest), 0);
        assert_eq!(days_until_next_rest_day(date(2025, 3, 15), &rest), 0);
        assert_eq!(days_until_next_rest_day(date(2025, 3, 16), &rest), 5);
        assert_eq!(days_until_next_rest_day(date(2025, 3, 10), &[Weekday::Sun]), 6);
        assert_eq!(days_until_next_rest_day(date(2025, 3, 10), &[]), 4);
    }

    #[test]
    fn countdown_and_description() {
        assert_eq!(days_until(date(2025, 3, 10), date(2025, 4, 5)), 26);
        assert_eq!(days_until(date(2025, 12, 31), date(2026, 1, 31)), 31);
        assert_eq!(
            describe_schedule(&Configuration::default()),
            "day 5 of every month"
        );
        assert_eq!(
            describe_schedule(&rule_config(PaydayRule::LastWeekday)),
            "last weekday of every month"
        );
    }

    fn any_rule() -> impl Strategy<Value = PaydayRule> {
        prop_oneof![
            Just(PaydayRule::FirstDay),
            Just(PaydayRule::LastDay),
            Just(PaydayRule::FifteenthOrLast),
            Just(PaydayRule::LastWeekday),
        ]
    }

    proptest! {
        #[test]
        fn rule_payday_is_never_in_the_past(
            offset in 0i64..3650,
            hour in 0u32..24,
            rule in any_rule(),
        ) {
            let now = at(2020, 1, 1, hour) + Duration::days(offset);
            let payday = rule_payday(now, rule, &february());

            prop_assert!(payday >= now.date());
            if payday == now.date() {
                prop_assert!(hour < PAYDAY_CUTOFF_HOUR);
            }
            prop_assert!(days_until(now.date(), payday) <= 62);
        }

        #[test]
        fn fixed_payday_is_in_the_future(offset in 0i64..3650, day in 1u32..=31) {
            let today = date(2020, 1, 1) + Duration::days(offset);
            let payday = fixed_date_payday(today, day);

            prop_assert!(payday > today);
            prop_assert!(payday.day() <= day);
            prop_assert!(days_until(today, payday) <= 62);
        }

        #[test]
        fn rest_day_countdown_range(offset in 0i64..14, days in proptest::collection::btree_set(0u8..7, 1..7)) {
            let today = date(2025, 3, 10) + Duration::days(offset);
            let rest = days.iter().map(|v| crate::storage::entities::weekday_from_sunday(*v)).collect::<Vec<_>>();
            let result = days_until_next_rest_day(today, &rest);

            prop_assert!(result <= 6);
            prop_assert_eq!(result == 0, rest.contains(&today.weekday()));
        }
    }
}

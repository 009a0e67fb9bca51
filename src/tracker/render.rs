use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::{
    salary::{
        earnings::{estimate, progress, Mood},
        payday::{days_until, days_until_next_rest_day, describe_schedule, next_payday},
    },
    storage::{
        attendance::{AttendanceLog, MonthlyTotals, RECENT_RECORDS_LIMIT},
        entities::{AttendanceRecord, Configuration, RuntimeState},
    },
    utils::{money::round_to, percentage::Percentage},
};

/// Everything a view needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub now: NaiveDateTime,
    pub earned: f64,
    /// Earnings plus today's extra income, rounded to three decimals.
    pub earned_with_extra: f64,
    pub daily_wage: f64,
    pub progress: Percentage,
    pub mood: Mood,
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
    pub payday: NaiveDate,
    pub days_until_payday: i64,
    pub payday_description: String,
    pub days_until_rest_day: u32,
    pub rest_days: Vec<Weekday>,
    pub monthly: MonthlyTotals,
    pub clocked_in: bool,
    pub work_days_this_month: u32,
    pub extra_income_today: f64,
    pub recent_records: Vec<AttendanceRecord>,
}

pub fn compute_render_state(
    now: NaiveDateTime,
    config: &Configuration,
    state: &RuntimeState,
    attendance: &AttendanceLog,
) -> RenderState {
    let today = now.date();
    let earned = estimate(now.time(), config.work_start, config.work_end, config.daily_wage);
    let payday = next_payday(now, config);
    let rest_days = config.rest_weekdays();

    RenderState {
        now,
        earned,
        earned_with_extra: round_to(earned + state.extra_income_today, 3),
        daily_wage: config.daily_wage,
        progress: progress(earned, config.daily_wage),
        mood: Mood::from_earnings(earned, config.daily_wage),
        work_start: config.work_start,
        work_end: config.work_end,
        payday,
        days_until_payday: days_until(today, payday),
        payday_description: describe_schedule(config),
        days_until_rest_day: days_until_next_rest_day(today, &rest_days),
        rest_days,
        monthly: attendance.monthly_aggregate(today.year(), today.month()),
        clocked_in: state.clocked_in,
        work_days_this_month: state.work_days_this_month,
        extra_income_today: state.extra_income_today,
        recent_records: attendance.recent(RECENT_RECORDS_LIMIT).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    use crate::{
        salary::earnings::Mood,
        storage::{
            attendance::AttendanceLog,
            entities::{AttendancePatch, Configuration, RuntimeState},
        },
    };

    use super::compute_render_state;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, min, 0).unwrap())
    }

    #[test]
    fn default_configuration_frame() {
        let state = RuntimeState {
            extra_income_today: 12.3456,
            ..Default::default()
        };
        let mut attendance = AttendanceLog::default();
        attendance.upsert(
            AttendancePatch::for_date(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap())
                .with_income(500.),
            1,
        );

        // 2025-03-10 is a Monday
        let frame = compute_render_state(
            at(2025, 3, 10, 12, 30),
            &Configuration::default(),
            &state,
            &attendance,
        );

        assert_eq!(frame.earned, 250.);
        assert_eq!(frame.earned_with_extra, 262.346);
        assert_eq!(*frame.progress, 50.);
        assert_eq!(frame.mood, Mood::Going);
        assert_eq!(frame.payday, NaiveDate::from_ymd_opt(2025, 4, 5).unwrap());
        assert_eq!(frame.days_until_payday, 26);
        assert_eq!(frame.days_until_rest_day, 4);
        assert_eq!(frame.monthly.income_total, 500.);
        assert_eq!(frame.recent_records.len(), 1);
    }
}

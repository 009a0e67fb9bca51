use std::fmt::Display;

use chrono::NaiveTime;

use crate::utils::{percentage::Percentage, time::hours_between};

/// Amount earned at `now` for a workday paid `daily_wage` from `work_start` to `work_end`.
///
/// Earnings grow linearly inside the window, are zero before it and the full wage after it. A
/// window that ends before it starts earns nothing.
pub fn estimate(now: NaiveTime, work_start: NaiveTime, work_end: NaiveTime, daily_wage: f64) -> f64 {
    if work_end <= work_start {
        return 0.;
    }
    let total_hours = hours_between(work_start, work_end);

    if now < work_start {
        0.
    } else if now > work_end {
        daily_wage
    } else {
        // Elapsed hours times the hourly rate, divided first.
        hours_between(work_start, now) / total_hours * daily_wage
    }
}

/// Share of the daily wage earned so far.
pub fn progress(earned: f64, daily_wage: f64) -> Percentage {
    Percentage::of(earned, daily_wage)
}

/// Encouragement shown next to the earnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    NotStarted,
    JustStarted,
    Going,
    HalfwayThere,
    AlmostDone,
    Done,
}

impl Mood {
    pub fn from_earnings(earned: f64, daily_wage: f64) -> Self {
        if earned <= 0. {
            Mood::NotStarted
        } else if earned >= daily_wage {
            Mood::Done
        } else if earned < daily_wage * 0.3 {
            Mood::JustStarted
        } else if earned < daily_wage * 0.6 {
            Mood::Going
        } else if earned < daily_wage * 0.9 {
            Mood::HalfwayThere
        } else {
            Mood::AlmostDone
        }
    }
}

impl Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mood::NotStarted => write!(f, "Haven't started earning yet"),
            Mood::JustStarted => write!(f, "Money is coming in, keep going!"),
            Mood::Going => write!(f, "Earned a fair bit already"),
            Mood::HalfwayThere => write!(f, "Earned quite a lot, hang in there!"),
            Mood::AlmostDone => write!(f, "Almost done for today"),
            Mood::Done => write!(f, "Today's work is done!"),
        }
    }
}

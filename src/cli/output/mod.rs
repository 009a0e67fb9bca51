//! Terminal rendering of frames, settings and attendance.

use std::{fmt::Write as _, io::Write};

use ansi_term::{Colour, Style};
use anyhow::Result;

use crate::{
    salary::payday::describe_schedule,
    storage::entities::{AttendanceRecord, Configuration, PaydayMode},
    tracker::{render::RenderState, ticker::TickView},
    utils::money::format_money,
};

const PROGRESS_WIDTH: usize = 30;
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Live view drawing every frame over the previous one.
pub struct TerminalView<W: Write> {
    out: W,
    colored: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, colored: bool) -> Self {
        Self { out, colored }
    }
}

impl<W: Write> TickView for TerminalView<W> {
    fn render(&mut self, state: &RenderState) -> Result<()> {
        write!(self.out, "{CLEAR_SCREEN}{}", format_frame(state, self.colored))?;
        self.out.flush()?;
        Ok(())
    }
}

fn paint(colored: bool, style: Style, text: &str) -> String {
    if colored {
        style.paint(text).to_string()
    } else {
        text.to_string()
    }
}

fn progress_bar(ratio: f64) -> String {
    let filled = ((ratio * PROGRESS_WIDTH as f64).round() as usize).min(PROGRESS_WIDTH);
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled)
    )
}

/// One full frame of the dashboard.
pub fn format_frame(state: &RenderState, colored: bool) -> String {
    let mut out = String::new();
    let title = Colour::Cyan.bold();
    let money = Colour::Green.bold();

    let _ = writeln!(
        out,
        "{}  {}",
        paint(colored, title, "payclock"),
        state.now.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(
        out,
        "Earned today: {}",
        paint(colored, money, &format!("{:.3}", state.earned_with_extra))
    );
    let _ = writeln!(
        out,
        "{} {}  {}-{}",
        progress_bar(state.progress.ratio()),
        state.progress,
        state.work_start.format("%H:%M"),
        state.work_end.format("%H:%M"),
    );
    let _ = writeln!(out, "{}", state.mood);
    let _ = writeln!(out);

    let status = if state.clocked_in {
        paint(colored, Colour::Green.normal(), "clocked in")
    } else {
        paint(colored, Colour::Yellow.normal(), "waiting for clock-in")
    };
    let _ = writeln!(
        out,
        "Status: {status}  Work days this month: {}  Extra today: {}",
        state.work_days_this_month,
        format_money(state.extra_income_today)
    );
    let _ = writeln!(
        out,
        "Payday in {} days ({}, {})",
        state.days_until_payday,
        state.payday.format("%Y-%m-%d"),
        state.payday_description
    );
    let rest_days = state
        .rest_days
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(
        out,
        "Rest day in {} days ({rest_days})",
        state.days_until_rest_day
    );
    let _ = writeln!(
        out,
        "This month: income {}  extra {}  total {}",
        format_money(state.monthly.income_total),
        format_money(state.monthly.extra_total),
        format_money(state.monthly.total())
    );

    if !state.recent_records.is_empty() {
        let _ = writeln!(out);
        out.push_str(&format_records(&state.recent_records));
    }
    out
}

/// Attendance table, one record per line.
pub fn format_records(records: &[AttendanceRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<15}{:<12}{:<10}{:<8}{:<8}{:>12}{:>12}",
        "id", "date", "clock-in", "status", "hours", "income", "extra"
    );
    for record in records {
        let clock_in = record
            .clock_in_time
            .map(|v| {
                v.with_timezone(&chrono::Local)
                    .format("%H:%M:%S")
                    .to_string()
            })
            .unwrap_or_default();
        let hours = record
            .work_hours
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "--".into());
        let _ = writeln!(
            out,
            "{:<15}{:<12}{:<10}{:<8}{:<8}{:>12}{:>12}",
            record.id,
            record.date.format("%Y-%m-%d").to_string(),
            clock_in,
            record.status.to_string(),
            hours,
            format_money(record.income.unwrap_or(0.)),
            format_money(record.extra_income.unwrap_or(0.)),
        );
    }
    out
}

pub fn format_config(config: &Configuration) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Daily wage:    {}", format_money(config.daily_wage));
    let _ = writeln!(
        out,
        "Working hours: {}-{}",
        config.work_start.format("%H:%M"),
        config.work_end.format("%H:%M")
    );
    let _ = writeln!(out, "Payday:        {}", describe_schedule(config));
    match config.payday_mode {
        PaydayMode::FixedDate => {
            let _ = writeln!(out, "Payday mode:   date ({})", config.payday_day_of_month);
        }
        PaydayMode::Rule => {
            let _ = writeln!(out, "Payday mode:   rule ({})", config.payday_rule);
        }
    }
    let rest_days = config
        .rest_weekdays()
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "Rest days:     {rest_days}");
    let months = config
        .fifteenth_exception_months
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let _ = writeln!(out, "15th exceptions (months): {months}");
    out
}

use std::{collections::BTreeSet, path::Path};

use anyhow::Result;
use chrono::NaiveTime;
use clap::{Parser, Subcommand};

use crate::{
    storage::entities::{PaydayMode, PaydayRule},
    tracker::{open_session, session::SettingsPatch},
    utils::{clock::DefaultClock, money::parse_amount_lenient, time::parse_time_of_day},
};

use super::output::format_config;

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    #[command(about = "Print current settings")]
    Show {},
    #[command(about = "Change settings. Options that are not given keep their value")]
    Set {
        #[command(flatten)]
        options: SetOptions,
    },
}

#[derive(Debug, Parser)]
pub struct SetOptions {
    #[arg(long, help = "Daily wage. Values that are not numbers count as 0")]
    daily_wage: Option<String>,
    #[arg(long, value_parser = parse_time_arg, help = "Start of the workday, HH:MM")]
    start: Option<NaiveTime>,
    #[arg(long, value_parser = parse_time_arg, help = "End of the workday, HH:MM")]
    end: Option<NaiveTime>,
    #[arg(long, help = "Payday mode: \"date\" for a fixed day of month, \"rule\" otherwise")]
    mode: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31), help = "Day of month for the date mode")]
    payday_day: Option<u32>,
    #[arg(
        long,
        help = "Rule for the rule mode: first_day, last_day, 15th_or_last or last_weekday"
    )]
    rule: Option<String>,
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = clap::value_parser!(u8).range(0..=6),
        help = "Comma separated rest days, 0 is Sunday"
    )]
    rest_days: Option<Vec<u8>>,
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = clap::value_parser!(u32).range(1..=12),
        help = "Comma separated months paid on their last day under 15th_or_last"
    )]
    exception_months: Option<Vec<u32>>,
}

fn parse_time_arg(value: &str) -> Result<NaiveTime, String> {
    parse_time_of_day(value).map_err(|e| format!("expected HH:MM, {e}"))
}

impl From<SetOptions> for SettingsPatch {
    fn from(value: SetOptions) -> Self {
        SettingsPatch {
            daily_wage: value.daily_wage.as_deref().map(parse_amount_lenient),
            work_start: value.start,
            work_end: value.end,
            payday_mode: value.mode.map(PaydayMode::from),
            payday_day_of_month: value.payday_day,
            payday_rule: value.rule.as_deref().map(PaydayRule::parse_lenient),
            rest_days: value.rest_days.map(BTreeSet::from_iter),
            fifteenth_exception_months: value.exception_months.map(BTreeSet::from_iter),
        }
    }
}

pub async fn process_settings_command(command: SettingsCommand, dir: &Path) -> Result<()> {
    let mut session = open_session(dir, DefaultClock).await?;
    match command {
        SettingsCommand::Show {} => (),
        SettingsCommand::Set { options } => {
            let patch = SettingsPatch::from(options);
            if patch.is_empty() {
                println!("Nothing to change");
            } else {
                session.update_settings(patch).await;
            }
        }
    }
    print!("{}", format_config(session.config()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use clap::Parser;

    use crate::{
        storage::entities::{PaydayMode, PaydayRule},
        tracker::session::SettingsPatch,
    };

    use super::SetOptions;

    fn patch(args: &[&str]) -> SettingsPatch {
        let mut full = vec!["set"];
        full.extend_from_slice(args);
        SetOptions::try_parse_from(full).unwrap().into()
    }

    #[test]
    fn no_options_is_empty() {
        assert!(patch(&[]).is_empty());
    }

    #[test]
    fn options_map_onto_patch() {
        let patch = patch(&[
            "--daily-wage",
            "¥1,200",
            "--start",
            "09:30",
            "--mode",
            "rule",
            "--rule",
            "last_weekday",
            "--rest-days",
            "0,6",
            "--exception-months",
            "2,12",
        ]);

        assert_eq!(patch.daily_wage, Some(1200.));
        assert_eq!(patch.work_start, NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(patch.work_end, None);
        assert_eq!(patch.payday_mode, Some(PaydayMode::Rule));
        assert_eq!(patch.payday_rule, Some(PaydayRule::LastWeekday));
        assert_eq!(patch.rest_days, Some([0, 6].into_iter().collect()));
        assert_eq!(
            patch.fifteenth_exception_months,
            Some([2, 12].into_iter().collect())
        );
    }

    #[test]
    fn unknown_rule_is_last_day_and_bad_wage_is_zero() {
        let patch = patch(&["--rule", "whenever", "--daily-wage", "lots"]);
        assert_eq!(patch.payday_rule, Some(PaydayRule::LastDay));
        assert_eq!(patch.daily_wage, Some(0.));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(SetOptions::try_parse_from(["set", "--rest-days", "7"]).is_err());
        assert!(SetOptions::try_parse_from(["set", "--payday-day", "0"]).is_err());
        assert!(SetOptions::try_parse_from(["set", "--start", "25:00"]).is_err());
    }
}

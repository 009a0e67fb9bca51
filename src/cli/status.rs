use std::{fmt::Display, path::Path};

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    tracker::open_session,
    utils::clock::{Clock, DefaultClock},
};

use super::{output::format_frame, Args};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct StatusCommand {
    #[arg(
        long = "at",
        help = "Moment to show instead of now. Examples are \"17:00\", \"tomorrow 9:00\", \"15/03/2025 12:30\""
    )]
    at: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, help = "Disable colors")]
    plain: bool,
}

/// Command to process `status` command. Prints a single frame of the live view.
pub async fn process_status_command(
    StatusCommand {
        at,
        date_style,
        plain,
    }: StatusCommand,
    dir: &Path,
) -> Result<()> {
    let now = parse_moment(at, date_style, DefaultClock.local_time())?;
    let session = open_session(dir, DefaultClock).await?;
    println!("{}", format_frame(&session.render_state(now), !plain));
    Ok(())
}

/// Resolves `--at` relative to `now`. Without it the frame is for `now`.
fn parse_moment(
    at: Option<String>,
    date_style: DateStyle,
    now: NaiveDateTime,
) -> Result<NaiveDateTime> {
    let Some(at) = at else {
        return Ok(now);
    };
    let base = now
        .and_local_timezone(Local)
        .earliest()
        .unwrap_or_else(Local::now);
    match parse_date_string(&at, base, date_style.into()) {
        Ok(v) => Ok(v.naive_local()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate moment {at}: {e}"),
            )
            .into()),
    }
}

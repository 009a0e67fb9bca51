use std::path::Path;

use anyhow::{bail, Result};
use clap::Subcommand;

use crate::{
    storage::attendance::RECENT_RECORDS_LIMIT,
    tracker::open_session,
    utils::clock::DefaultClock,
};

use super::output::format_records;

#[derive(Debug, Subcommand)]
pub enum RecordsCommand {
    #[command(about = "List attendance records, newest first")]
    List {
        #[arg(long, default_value_t = RECENT_RECORDS_LIMIT, help = "How many records to show")]
        limit: usize,
    },
    #[command(about = "Delete one attendance record")]
    Delete {
        #[arg(help = "Id of the record, as shown by `records list`")]
        id: i64,
    },
}

pub async fn process_records_command(command: RecordsCommand, dir: &Path) -> Result<()> {
    let mut session = open_session(dir, DefaultClock).await?;
    match command {
        RecordsCommand::List { limit } => {
            if session.attendance().is_empty() {
                println!("No attendance records yet");
            } else {
                print!("{}", format_records(session.attendance().recent(limit)));
            }
        }
        RecordsCommand::Delete { id } => {
            if !session.delete_record(id).await {
                bail!("No attendance record with id {id}");
            }
            println!("Deleted record {id}");
        }
    }
    Ok(())
}

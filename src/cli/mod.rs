pub mod output;
pub mod records;
pub mod settings;
pub mod status;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use output::TerminalView;
use records::{process_records_command, RecordsCommand};
use settings::{process_settings_command, SettingsCommand};
use status::{process_status_command, StatusCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    storage::entities::ClockStatus,
    tracker::{
        export::ExportKind,
        open_session, start_watch,
        ticker::{DEFAULT_RELOAD_EVERY, DEFAULT_TICK_INTERVAL},
    },
    utils::{
        clock::{Clock, DefaultClock},
        dir::{create_application_default_path, create_application_path},
        logging::{enable_logging, CLI_PREFIX, WATCH_PREFIX},
        money::format_money,
    },
};

#[derive(Parser, Debug)]
#[command(name = "Payclock", version, long_about = None)]
#[command(about = "Watch your salary grow through the workday", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Print today's earnings, payday and rest day countdowns once")]
    Status {
        #[command(flatten)]
        command: StatusCommand,
    },
    #[command(
        about = "Live view refreshed every interval until Ctrl-C. On unix SIGUSR1 pauses it and SIGUSR2 resumes it"
    )]
    Watch {
        #[arg(
            long,
            default_value_t = DEFAULT_TICK_INTERVAL.as_millis() as u64,
            value_parser = clap::value_parser!(u64).range(10..),
            help = "Milliseconds between frames"
        )]
        interval: u64,
        #[arg(
            long,
            default_value_t = DEFAULT_RELOAD_EVERY,
            help = "Re-read the store every this many frames, 0 never does"
        )]
        reload_every: u32,
        #[arg(long, help = "Disable colors")]
        plain: bool,
    },
    #[command(about = "Clock in, or clock out when already clocked in")]
    Clock {},
    #[command(about = "Set today's extra income. Values that are not numbers count as 0")]
    Extra {
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    #[command(about = "Show or change settings")]
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
    #[command(about = "Inspect attendance records")]
    Records {
        #[command(subcommand)]
        command: RecordsCommand,
    },
    #[command(about = "Export stored data as JSON")]
    Export {
        #[arg(long, help = "Export only attendance records")]
        attendance: bool,
        #[arg(long, help = "Directory to write into. Current directory by default")]
        out: Option<PathBuf>,
    },
    #[command(about = "Forget runtime state and attendance records. Settings are kept")]
    Clear {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => create_application_path(dir)?,
        None => create_application_default_path()?,
    };
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let watching = matches!(args.commands, Commands::Watch { .. });
    let prefix = if watching { WATCH_PREFIX } else { CLI_PREFIX };
    enable_logging(prefix, &dir, logging_level, args.log && !watching)?;

    match args.commands {
        Commands::Status { command } => process_status_command(command, &dir).await,
        Commands::Watch {
            interval,
            reload_every,
            plain,
        } => {
            start_watch(
                dir,
                TerminalView::new(std::io::stdout(), !plain),
                Duration::from_millis(interval),
                reload_every,
            )
            .await
        }
        Commands::Clock {} => {
            let mut session = open_session(&dir, DefaultClock).await?;
            let status = session.toggle_clock().await;
            let time = session.clock().local_time().format("%H:%M:%S");
            match status {
                ClockStatus::In => println!("Clocked in at {time}"),
                ClockStatus::Out => println!("Clocked out at {time}"),
            }
            Ok(())
        }
        Commands::Extra { amount } => {
            let mut session = open_session(&dir, DefaultClock).await?;
            let value = session.set_extra_income(&amount).await;
            println!("Extra income today: {}", format_money(value));
            Ok(())
        }
        Commands::Settings { command } => process_settings_command(command, &dir).await,
        Commands::Records { command } => process_records_command(command, &dir).await,
        Commands::Export { attendance, out } => {
            let session = open_session(&dir, DefaultClock).await?;
            let kind = if attendance {
                ExportKind::Attendance
            } else {
                ExportKind::Full
            };
            let out = out.unwrap_or_else(|| PathBuf::from("."));
            let path = session.export(kind)?.write_into(&out).await?;
            println!("Exported into {}", path.display());
            Ok(())
        }
        Commands::Clear {} => {
            let mut session = open_session(&dir, DefaultClock).await?;
            session.clear().await;
            println!("Cleared runtime state and attendance records");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};

    use super::{Args, Commands};

    #[test]
    fn arguments_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn global_options_after_subcommand() {
        let args = Args::try_parse_from(["payclock", "clock", "--dir", "/tmp/pay", "--log"]).unwrap();
        assert_eq!(args.dir, Some(PathBuf::from("/tmp/pay")));
        assert!(args.log);
        assert!(matches!(args.commands, Commands::Clock {}));
    }

    #[test]
    fn watch_defaults() {
        let args = Args::try_parse_from(["payclock", "watch"]).unwrap();
        let Commands::Watch {
            interval,
            reload_every,
            plain,
        } = args.commands
        else {
            panic!("expected watch");
        };
        assert_eq!(interval, 100);
        assert_eq!(reload_every, 10);
        assert!(!plain);
    }

    #[test]
    fn extra_accepts_negative_amounts() {
        let args = Args::try_parse_from(["payclock", "extra", "-20"]).unwrap();
        assert!(matches!(args.commands, Commands::Extra { amount } if amount == "-20"));
    }

    #[test]
    fn too_short_interval_is_rejected() {
        assert!(Args::try_parse_from(["payclock", "watch", "--interval", "1"]).is_err());
    }
}

use std::collections::BTreeSet;

use anyhow::Result;
use chrono::{NaiveDateTime, NaiveTime};
use tracing::{error, info, instrument, warn};

use crate::{
    salary::earnings::estimate,
    storage::{
        attendance::AttendanceLog,
        entities::{
            AttendancePatch, ClockStatus, Configuration, PaydayMode, PaydayRule, RuntimeState,
        },
        kv_store::{load_or_default, KeyValueStore, ATTENDANCE_KEY, CONFIG_KEY, STATE_KEY},
    },
    utils::{clock::Clock, money::parse_amount_lenient, money::round_to},
};

use super::{
    export::{ExportDocument, ExportKind},
    render::{compute_render_state, RenderState},
};

/// Settings to change. Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub daily_wage: Option<f64>,
    pub work_start: Option<NaiveTime>,
    pub work_end: Option<NaiveTime>,
    pub payday_mode: Option<PaydayMode>,
    pub payday_day_of_month: Option<u32>,
    pub payday_rule: Option<PaydayRule>,
    pub rest_days: Option<BTreeSet<u8>>,
    pub fifteenth_exception_months: Option<BTreeSet<u32>>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }

    fn apply_to(self, config: &mut Configuration) {
        if let Some(v) = self.daily_wage {
            config.daily_wage = v;
        }
        if let Some(v) = self.work_start {
            config.work_start = v;
        }
        if let Some(v) = self.work_end {
            config.work_end = v;
        }
        if let Some(v) = self.payday_mode {
            config.payday_mode = v;
        }
        if let Some(v) = self.payday_day_of_month {
            config.payday_day_of_month = v;
        }
        if let Some(v) = self.payday_rule {
            config.payday_rule = v;
        }
        if let Some(v) = self.rest_days {
            config.rest_days = v;
        }
        if let Some(v) = self.fifteenth_exception_months {
            config.fifteenth_exception_months = v;
        }
    }
}

/// One of the values a session keeps in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    Config,
    State,
    Attendance,
}

impl Slot {
    const ALL: [Slot; 3] = [Slot::Config, Slot::State, Slot::Attendance];

    fn key(&self) -> &'static str {
        match self {
            Slot::Config => CONFIG_KEY,
            Slot::State => STATE_KEY,
            Slot::Attendance => ATTENDANCE_KEY,
        }
    }
}

/// The single owner of the tracker's state. User actions are methods here, every one of them
/// writes the values it touched back into the store. Writes that fail are logged and remembered;
/// [Session::flush] retries them and is the one place that reports failures.
pub struct Session<S: KeyValueStore> {
    store: S,
    clock: Box<dyn Clock>,
    config: Configuration,
    state: RuntimeState,
    attendance: AttendanceLog,
    /// Slots changed by this session that didn't make it into the store yet.
    unsaved: BTreeSet<Slot>,
}

impl<S: KeyValueStore> Session<S> {
    #[instrument(skip_all)]
    pub async fn load(store: S, clock: Box<dyn Clock>) -> Self {
        let mut session = Self {
            store,
            clock,
            config: Configuration::default(),
            state: RuntimeState::default(),
            attendance: AttendanceLog::default(),
            unsaved: BTreeSet::new(),
        };
        session.reload().await;
        session
    }

    /// Re-reads everything from the store, so changes made by other invocations show up. Values
    /// that failed to save are replaced too, and are not retried anymore.
    pub async fn reload(&mut self) {
        self.unsaved.clear();
        self.config = load_or_default::<Configuration>(&self.store, CONFIG_KEY)
            .await
            .normalized();
        self.state = load_or_default(&self.store, STATE_KEY).await;
        self.attendance = load_or_default(&self.store, ATTENDANCE_KEY).await;
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    pub fn attendance(&self) -> &AttendanceLog {
        &self.attendance
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Clocks in when clocked out and the other way around. Returns the new status.
    #[instrument(skip(self))]
    pub async fn toggle_clock(&mut self) -> ClockStatus {
        let now = self.clock.time();
        let local = self.clock.local_time();
        let today = local.date();

        let (status, patch) = if !self.state.clocked_in {
            let counted_today = self
                .attendance
                .find_by_date(today)
                .is_some_and(|v| v.clock_in_time.is_some());
            if !counted_today {
                self.state.work_days_this_month += 1;
            }
            self.state.clocked_in = true;
            self.state.clock_in_time = Some(now);
            info!("Clocked in at {local}");

            (
                ClockStatus::In,
                AttendancePatch::for_date(today)
                    .with_clock_in_time(now)
                    .with_status(ClockStatus::In),
            )
        } else {
            let work_hours = self
                .state
                .clock_in_time
                .map(|start| (now - start).num_seconds() as f64 / 3600.)
                .unwrap_or(0.)
                .max(0.);
            let income = estimate(
                local.time(),
                self.config.work_start,
                self.config.work_end,
                self.config.daily_wage,
            );
            self.state.clocked_in = false;
            self.state.clock_in_time = None;
            info!("Clocked out at {local} after {work_hours:.2}h, earned {income:.2}");

            (
                ClockStatus::Out,
                AttendancePatch::for_date(today)
                    .with_status(ClockStatus::Out)
                    .with_work_hours(round_to(work_hours, 2))
                    .with_income(round_to(income, 2))
                    .with_extra_income(self.state.extra_income_today),
            )
        };

        self.attendance.upsert(patch, now.timestamp_millis());
        self.persist(Slot::State).await;
        self.persist(Slot::Attendance).await;
        status
    }

    /// Sets today's extra income from user input. Input that isn't a number counts as zero.
    #[instrument(skip(self))]
    pub async fn set_extra_income(&mut self, input: &str) -> f64 {
        let value = parse_amount_lenient(input);
        self.state.extra_income_today = value;
        self.persist(Slot::State).await;

        let today = self.clock.local_time().date();
        if self.attendance.find_by_date(today).is_some() {
            self.attendance.upsert(
                AttendancePatch::for_date(today).with_extra_income(value),
                self.clock.time().timestamp_millis(),
            );
            self.persist(Slot::Attendance).await;
        }
        value
    }

    #[instrument(skip(self))]
    pub async fn update_settings(&mut self, patch: SettingsPatch) {
        patch.apply_to(&mut self.config);
        self.config = std::mem::take(&mut self.config).normalized();
        if self.config.work_end <= self.config.work_start {
            warn!(
                "Workday ends at {} before it starts at {}, earnings will stay at zero",
                self.config.work_end, self.config.work_start
            );
        }
        self.persist(Slot::Config).await;
    }

    /// Returns whether a record was removed.
    #[instrument(skip(self))]
    pub async fn delete_record(&mut self, id: i64) -> bool {
        let deleted = self.attendance.delete(id);
        if deleted {
            self.persist(Slot::Attendance).await;
        } else {
            info!("No attendance record with id {id}");
        }
        deleted
    }

    /// Forgets runtime state and attendance. Settings stay.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) {
        self.state = RuntimeState::default();
        self.attendance.clear();
        self.persist(Slot::State).await;
        self.persist(Slot::Attendance).await;
    }

    pub fn render_state(&self, now: NaiveDateTime) -> RenderState {
        compute_render_state(now, &self.config, &self.state, &self.attendance)
    }

    pub fn export(&self, kind: ExportKind) -> Result<ExportDocument> {
        ExportDocument::new(
            kind,
            &self.config,
            &self.state,
            &self.attendance,
            self.clock.time(),
            self.clock.local_time().date(),
        )
    }

    /// Retries writes that failed earlier. Called when the session ends. Values this session never
    /// changed are left alone, so whatever other invocations stored in the meantime stays.
    pub async fn flush(&mut self) -> Result<()> {
        for slot in Slot::ALL {
            if self.unsaved.contains(&slot) {
                self.write(slot).await?;
                self.unsaved.remove(&slot);
            }
        }
        Ok(())
    }

    async fn write(&self, slot: Slot) -> Result<()> {
        let value = match slot {
            Slot::Config => serde_json::to_string(&self.config)?,
            Slot::State => serde_json::to_string(&self.state)?,
            Slot::Attendance => serde_json::to_string(&self.attendance)?,
        };
        self.store.set(slot.key(), value).await
    }

    async fn persist(&mut self, slot: Slot) {
        match self.write(slot).await {
            Ok(()) => {
                self.unsaved.remove(&slot);
            }
            Err(e) => {
                error!("Failed to persist {}: {e:?}", slot.key());
                self.unsaved.insert(slot);
            }
        }
    }
}

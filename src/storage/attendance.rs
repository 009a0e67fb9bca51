use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entities::{AttendancePatch, AttendanceRecord};

/// How many records the views show.
pub const RECENT_RECORDS_LIMIT: usize = 20;

/// Sums of a month of attendance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MonthlyTotals {
    pub income_total: f64,
    pub extra_total: f64,
}

impl MonthlyTotals {
    pub fn total(&self) -> f64 {
        self.income_total + self.extra_total
    }
}

/// Log of attendance, newest first, with at most one record per calendar date.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceLog {
    records: Vec<AttendanceRecord>,
}

impl AttendanceLog {
    pub fn new(records: Vec<AttendanceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find_by_date(&self, date: NaiveDate) -> Option<&AttendanceRecord> {
        self.records.iter().find(|v| v.date == date)
    }

    /// Merges `patch` into the record for its date, or prepends a new one. `now_ms` seeds the id
    /// of a new record; it is bumped past existing ids so ids stay unique.
    pub fn upsert(&mut self, patch: AttendancePatch, now_ms: i64) -> &AttendanceRecord {
        match self.records.iter().position(|v| v.date == patch.date) {
            Some(index) => {
                debug!("Updating attendance record for {}", patch.date);
                patch.apply_to(&mut self.records[index]);
                &self.records[index]
            }
            None => {
                let id = self.next_id(now_ms);
                debug!("Creating attendance record {id} for {}", patch.date);
                self.records.insert(0, patch.into_record(id));
                &self.records[0]
            }
        }
    }

    fn next_id(&self, now_ms: i64) -> i64 {
        match self.records.iter().map(|v| v.id).max() {
            Some(max) if max >= now_ms => max + 1,
            _ => now_ms,
        }
    }

    /// Returns whether anything was removed.
    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.records.len();
        self.records.retain(|v| v.id != id);
        before != self.records.len()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Income and extra income for a month. `month` starts at 1. Missing values count as zero.
    pub fn monthly_aggregate(&self, year: i32, month: u32) -> MonthlyTotals {
        self.records
            .iter()
            .filter(|v| v.date.year() == year && v.date.month() == month)
            .fold(MonthlyTotals::default(), |mut totals, v| {
                totals.income_total += v.income.unwrap_or(0.);
                totals.extra_total += v.extra_income.unwrap_or(0.);
                totals
            })
    }

    /// The newest `limit` records.
    pub fn recent(&self, limit: usize) -> &[AttendanceRecord] {
        &self.records[..self.records.len().min(limit)]
    }
}

//! Report Compiler: joins a provider's shifts with worker identities,
//! timesheets and client notes into a renderer-ready summary.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::guard::require_provider;
use crate::identity::IdentityDirectory;
use crate::models::{Actor, ReportRow, ReportSummary, ReportTotals, Shift, Timesheet};
use crate::store::{Store, Tables};

const TIME_FORMAT: &str = "%H:%M";

/// Builds report summaries for providers.
#[derive(Clone)]
pub struct ReportCompiler {
    store: Arc<Store>,
    config: Arc<EngineConfig>,
    identity: Arc<dyn IdentityDirectory>,
}

impl ReportCompiler {
    /// Creates a compiler reading from `store` and resolving worker names
    /// through `identity`.
    pub fn new(
        store: Arc<Store>,
        config: Arc<EngineConfig>,
        identity: Arc<dyn IdentityDirectory>,
    ) -> Self {
        Self {
            store,
            config,
            identity,
        }
    }

    /// Builds the report for the calling provider's shifts starting between
    /// `start_date` and `end_date`, both inclusive.
    ///
    /// Each shift contributes exactly one row. When a shift has several
    /// timesheets the earliest clock-in is used.
    pub fn build_report(
        &self,
        actor: &Actor,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> EngineResult<ReportSummary> {
        let provider_id = require_provider(actor)?;
        if end_date < start_date {
            return Err(EngineError::validation(
                "end_date",
                format!("end date {} is before start date {}", end_date, start_date),
            ));
        }
        let missing = self.config.payroll().report.missing_value_label.as_str();

        let rows = self.store.read(|tables| {
            let mut shifts: Vec<&Shift> = tables
                .shifts
                .values()
                .filter(|s| s.service_provider_id == provider_id)
                .filter(|s| {
                    let date = s.start_time.date();
                    date >= start_date && date <= end_date
                })
                .collect();
            shifts.sort_by_key(|s| (s.start_time, s.id));

            let first_timesheets = first_timesheet_per_shift(tables);
            let mut seen = HashSet::new();
            let mut names: HashMap<Uuid, String> = HashMap::new();

            let rows = shifts
                .into_iter()
                .filter(|shift| seen.insert(shift.id))
                .map(|shift| {
                    let worker_name = names
                        .entry(shift.support_worker_id)
                        .or_insert_with(|| {
                            self.identity
                                .lookup(shift.support_worker_id)
                                .map(|user| user.name)
                                .unwrap_or_else(|| missing.to_string())
                        })
                        .clone();
                    build_row(
                        shift,
                        worker_name,
                        tables.shift_notes.get(&shift.id).map(|n| n.client_name.clone()),
                        first_timesheets.get(&shift.id).copied(),
                        missing,
                    )
                })
                .collect::<Vec<_>>();
            Ok(rows)
        })?;

        let totals = ReportTotals {
            total_shifts: rows.len(),
            total_hours: rows.iter().map(|r| r.total_hours).sum(),
            unique_workers: rows
                .iter()
                .map(|r| r.worker_name.as_str())
                .collect::<HashSet<_>>()
                .len(),
        };
        debug!(%provider_id, rows = rows.len(), "report rows joined");
        info!(
            %provider_id,
            %start_date,
            %end_date,
            total_shifts = totals.total_shifts,
            total_hours = %totals.total_hours,
            unique_workers = totals.unique_workers,
            "report compiled"
        );

        Ok(ReportSummary {
            provider_id,
            start_date,
            end_date,
            rows,
            totals,
        })
    }
}

fn first_timesheet_per_shift(tables: &Tables) -> HashMap<Uuid, &Timesheet> {
    let mut first: HashMap<Uuid, &Timesheet> = HashMap::new();
    for timesheet in tables.timesheets.values() {
        first
            .entry(timesheet.shift_id)
            .and_modify(|current| {
                if (timesheet.start_time, timesheet.id) < (current.start_time, current.id) {
                    *current = timesheet;
                }
            })
            .or_insert(timesheet);
    }
    first
}

fn build_row(
    shift: &Shift,
    worker_name: String,
    client_name: Option<String>,
    timesheet: Option<&Timesheet>,
    missing: &str,
) -> ReportRow {
    let clock_in = timesheet
        .map(|t| t.start_time.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| missing.to_string());
    let clock_out = timesheet
        .and_then(|t| t.end_time)
        .map(|end| end.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| missing.to_string());

    ReportRow {
        shift_id: shift.id,
        worker_name,
        client_name: client_name.unwrap_or_else(|| missing.to_string()),
        shift_date: shift.start_time.date(),
        scheduled_start: shift.start_time.format(TIME_FORMAT).to_string(),
        scheduled_end: shift.end_time.format(TIME_FORMAT).to_string(),
        clock_in,
        clock_out,
        break_minutes: timesheet.map(|t| t.break_minutes).unwrap_or(0),
        total_hours: timesheet.map(Timesheet::hours_or_zero).unwrap_or(Decimal::ZERO),
    }
}

//! Weekly client-hour aggregation over scheduled shift durations.
//!
//! Totals are built in one grouped pass keyed by
//! `(worker, provider, client, week)`. They use scheduled shift hours, not
//! clocked timesheet hours, and feed display and billing caps only.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::guard::{RelationshipGuard, require_provider};
use crate::models::{Actor, Shift, ShiftNotes};
use crate::store::Store;

/// Hours for one shift and for its client's week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyClientHours {
    /// The shift the query was made for.
    pub shift_id: Uuid,
    /// Scheduled duration of the shift.
    pub shift_hours: Decimal,
    /// The client attached to the shift, if it has notes.
    pub client_id: Option<Uuid>,
    /// First day of the week window.
    pub week_start: NaiveDate,
    /// Scheduled hours of all shifts for the same worker, provider and
    /// client starting in `[week_start, week_start + 7 days)`. `None` when
    /// the shift has no notes.
    pub weekly_client_hours: Option<Decimal>,
}

/// Scheduled hours for one worker and client in one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientWeekTotal {
    /// The worker.
    pub worker_id: Uuid,
    /// The provider.
    pub provider_id: Uuid,
    /// The client.
    pub client_id: Uuid,
    /// Client display name from the most recent notes seen.
    pub client_name: String,
    /// First day of the week.
    pub week_start: NaiveDate,
    /// Sum of scheduled hours.
    pub total_hours: Decimal,
    /// Number of shifts in the sum.
    pub shift_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ClientWeekKey {
    worker_id: Uuid,
    provider_id: Uuid,
    client_id: Uuid,
    week_start: NaiveDate,
}

/// How shift dates are mapped to week windows.
#[derive(Debug, Clone, Copy)]
enum WeekBoundary {
    /// Weeks begin on this weekday.
    Weekday(Weekday),
    /// Weeks are 7-day windows aligned to this date.
    Anchored(NaiveDate),
}

impl WeekBoundary {
    fn week_of(self, date: NaiveDate) -> NaiveDate {
        match self {
            WeekBoundary::Weekday(first) => start_of_week(date, first),
            WeekBoundary::Anchored(anchor) => {
                let weeks = (date - anchor).num_days().div_euclid(7);
                anchor + Duration::days(weeks * 7)
            }
        }
    }
}

/// Returns the first day of the week containing `date`.
///
/// # Examples
///
/// ```
/// use shift_payroll::aggregation::start_of_week;
/// use chrono::{NaiveDate, Weekday};
///
/// let thursday = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let monday = NaiveDate::from_ymd_opt(2026, 1, 12).unwrap();
/// let sunday = NaiveDate::from_ymd_opt(2026, 1, 11).unwrap();
/// assert_eq!(start_of_week(thursday, Weekday::Mon), monday);
/// assert_eq!(start_of_week(thursday, Weekday::Sun), sunday);
/// ```
pub fn start_of_week(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_monday() - first_day.num_days_from_monday()) % 7;
    date - Duration::days(i64::from(offset))
}

#[derive(Debug, Default)]
struct Bucket {
    client_name: String,
    total_hours: Decimal,
    shift_count: usize,
}

/// Groups shifts with notes by `(worker, provider, client, week)`.
/// Shifts without notes are skipped.
fn group_client_weeks<'a>(
    shifts: impl Iterator<Item = &'a Shift>,
    notes: &HashMap<Uuid, ShiftNotes>,
    boundary: WeekBoundary,
) -> HashMap<ClientWeekKey, Bucket> {
    let mut groups: HashMap<ClientWeekKey, Bucket> = HashMap::new();
    for shift in shifts {
        let Some(note) = notes.get(&shift.id) else {
            continue;
        };
        let key = ClientWeekKey {
            worker_id: shift.support_worker_id,
            provider_id: shift.service_provider_id,
            client_id: note.client_id,
            week_start: boundary.week_of(shift.start_time.date()),
        };
        let bucket = groups.entry(key).or_default();
        bucket.client_name.clone_from(&note.client_name);
        bucket.total_hours += shift.scheduled_hours();
        bucket.shift_count += 1;
    }
    groups
}

/// Computes weekly client-hour totals.
#[derive(Clone)]
pub struct WeeklyAggregator {
    store: Arc<Store>,
    config: Arc<EngineConfig>,
}

impl WeeklyAggregator {
    /// Creates an aggregator over the given store.
    pub fn new(store: Arc<Store>, config: Arc<EngineConfig>) -> Self {
        Self { store, config }
    }

    fn first_weekday(&self) -> Weekday {
        self.config.payroll().week_starts_on.into()
    }

    /// Returns a shift's scheduled hours and the scheduled hours of its
    /// worker/provider/client combination for the week.
    ///
    /// Without `week_start`, the week is the one containing the shift's
    /// start date, beginning on the configured weekday.
    pub fn weekly_client_hours(
        &self,
        actor: &Actor,
        shift_id: Uuid,
        week_start: Option<NaiveDate>,
    ) -> EngineResult<WeeklyClientHours> {
        let first_weekday = self.first_weekday();

        self.store.read(|tables| {
            let shift = tables.shift(shift_id)?;
            RelationshipGuard::new(tables).authorize_shift_access(actor, shift)?;

            let week_start =
                week_start.unwrap_or_else(|| start_of_week(shift.start_time.date(), first_weekday));
            let client_id = tables.shift_notes.get(&shift_id).map(|n| n.client_id);

            let weekly_client_hours = client_id.map(|client_id| {
                let same_pair = tables.shifts.values().filter(|s| {
                    s.support_worker_id == shift.support_worker_id
                        && s.service_provider_id == shift.service_provider_id
                });
                let groups = group_client_weeks(
                    same_pair,
                    &tables.shift_notes,
                    WeekBoundary::Anchored(week_start),
                );
                let key = ClientWeekKey {
                    worker_id: shift.support_worker_id,
                    provider_id: shift.service_provider_id,
                    client_id,
                    week_start,
                };
                groups
                    .get(&key)
                    .map(|bucket| bucket.total_hours)
                    .unwrap_or(Decimal::ZERO)
            });

            debug!(
                %shift_id,
                %week_start,
                weekly_client_hours = ?weekly_client_hours,
                "weekly client hours computed"
            );
            Ok(WeeklyClientHours {
                shift_id,
                shift_hours: shift.scheduled_hours(),
                client_id,
                week_start,
                weekly_client_hours,
            })
        })
    }

    /// Returns every `(worker, client, week)` total for the calling provider.
    ///
    /// With `week_start`, only the 7-day window starting that day is
    /// returned; otherwise all weeks, split on the configured weekday.
    pub fn client_week_totals(
        &self,
        actor: &Actor,
        week_start: Option<NaiveDate>,
    ) -> EngineResult<Vec<ClientWeekTotal>> {
        let provider_id = require_provider(actor)?;
        let boundary = match week_start {
            Some(anchor) => WeekBoundary::Anchored(anchor),
            None => WeekBoundary::Weekday(self.first_weekday()),
        };

        self.store.read(|tables| {
            let own_shifts = tables
                .shifts
                .values()
                .filter(|s| s.service_provider_id == provider_id);
            let groups = group_client_weeks(own_shifts, &tables.shift_notes, boundary);

            let mut totals: Vec<ClientWeekTotal> = groups
                .into_iter()
                .filter(|(key, _)| week_start.is_none_or(|w| key.week_start == w))
                .map(|(key, bucket)| ClientWeekTotal {
                    worker_id: key.worker_id,
                    provider_id: key.provider_id,
                    client_id: key.client_id,
                    client_name: bucket.client_name,
                    week_start: key.week_start,
                    total_hours: bucket.total_hours,
                    shift_count: bucket.shift_count,
                })
                .collect();
            totals.sort_by_key(|t| (t.week_start, t.worker_id, t.client_id));
            Ok(totals)
        })
    }
}

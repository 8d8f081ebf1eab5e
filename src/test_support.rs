//! Shared fixtures for unit tests.

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::aggregation::WeeklyAggregator;
use crate::config::EngineConfig;
use crate::identity::IdentityDirectory;
use crate::models::{Actor, Relationship, RelationshipStatus, Shift, Timesheet};
use crate::payslip::PayslipGenerator;
use crate::relationships::RelationshipManager;
use crate::report::ReportCompiler;
use crate::scheduling::{NewShift, NotesInput, ShiftManager};
use crate::store::Store;
use crate::timesheet::{ClockIn, ClockOut, TimesheetEngine};

pub fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// One provider linked to one worker at 30.00/h.
pub struct Fixture {
    pub store: Arc<Store>,
    pub provider_id: Uuid,
    pub worker_id: Uuid,
}

impl Fixture {
    pub fn new() -> Self {
        let fx = Self {
            store: Arc::new(Store::new()),
            provider_id: Uuid::new_v4(),
            worker_id: Uuid::new_v4(),
        };
        RelationshipManager::new(fx.store.clone())
            .link_worker(&fx.provider(), fx.worker_id, Decimal::from_str("30").unwrap())
            .unwrap();
        fx
    }

    pub fn provider(&self) -> Actor {
        Actor::Provider(self.provider_id)
    }

    pub fn worker(&self) -> Actor {
        Actor::Worker(self.worker_id)
    }

    pub fn shift_manager(&self) -> ShiftManager {
        ShiftManager::new(self.store.clone())
    }

    pub fn timesheet_engine(&self) -> TimesheetEngine {
        TimesheetEngine::new(self.store.clone())
    }

    pub fn weekly_aggregator(&self) -> WeeklyAggregator {
        WeeklyAggregator::new(self.store.clone(), Arc::new(EngineConfig::default()))
    }

    pub fn payslip_generator(&self) -> PayslipGenerator {
        PayslipGenerator::new(self.store.clone(), Arc::new(EngineConfig::default()))
    }

    pub fn report_compiler(&self, directory: Arc<dyn IdentityDirectory>) -> ReportCompiler {
        ReportCompiler::new(self.store.clone(), Arc::new(EngineConfig::default()), directory)
    }

    /// Schedules a shift for the fixture worker.
    pub fn schedule(&self, start: &str, end: &str) -> Shift {
        self.shift_manager()
            .create(
                &self.provider(),
                NewShift {
                    support_worker_id: self.worker_id,
                    title: "Community access".to_string(),
                    start_time: dt(start),
                    end_time: dt(end),
                    location: None,
                    hourly_rate: None,
                },
            )
            .unwrap()
    }

    pub fn attach_client(&self, shift_id: Uuid, client_id: Uuid, name: &str) {
        self.shift_manager()
            .set_notes(
                &self.provider(),
                shift_id,
                NotesInput {
                    client_id,
                    client_name: name.to_string(),
                    task_description: None,
                    special_requirements: None,
                },
            )
            .unwrap();
    }

    pub fn set_relationship_status(&self, status: RelationshipStatus) {
        self.store
            .transaction(|tables| {
                let relationship: &mut Relationship = tables
                    .relationships
                    .get_mut(&(self.provider_id, self.worker_id))
                    .unwrap();
                relationship.status = status;
                Ok(())
            })
            .unwrap();
    }

    pub fn clock_in_input(&self, shift_id: Uuid, start: &str) -> ClockIn {
        ClockIn {
            shift_id,
            start_time: dt(start),
            break_minutes: 0,
            notes: None,
        }
    }

    /// Clocks the fixture worker in and out of `shift`.
    pub fn clocked(&self, shift: &Shift, start: &str, end: &str, break_minutes: i32) -> Timesheet {
        let engine = self.timesheet_engine();
        let open = engine
            .clock_in(&self.worker(), self.clock_in_input(shift.id, start))
            .unwrap();
        engine
            .clock_out(
                &self.worker(),
                open.id,
                ClockOut {
                    end_time: dt(end),
                    break_minutes: Some(break_minutes),
                },
            )
            .unwrap()
    }

    /// A clocked timesheet taken through submit and approve.
    pub fn approved(&self, shift: &Shift, start: &str, end: &str, break_minutes: i32) -> Timesheet {
        let engine = self.timesheet_engine();
        let timesheet = self.clocked(shift, start, end, break_minutes);
        engine.submit(&self.worker(), timesheet.id).unwrap();
        engine.approve(&self.provider(), timesheet.id).unwrap()
    }
}

//! Application state for the shift payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::aggregation::WeeklyAggregator;
use crate::config::ConfigLoader;
use crate::identity::InMemoryDirectory;
use crate::payslip::PayslipGenerator;
use crate::relationships::RelationshipManager;
use crate::report::ReportCompiler;
use crate::scheduling::ShiftManager;
use crate::store::Store;
use crate::timesheet::TimesheetEngine;

struct Services {
    directory: Arc<InMemoryDirectory>,
    relationships: RelationshipManager,
    shifts: ShiftManager,
    timesheets: TimesheetEngine,
    aggregator: WeeklyAggregator,
    payslips: PayslipGenerator,
    reports: ReportCompiler,
}

/// Shared application state.
///
/// Every service reads and writes the same [`Store`], so a request handled
/// by one service sees the writes of all others.
#[derive(Clone)]
pub struct AppState {
    services: Arc<Services>,
}

impl AppState {
    /// Creates the services over a fresh store using the loaded configuration.
    pub fn new(config: ConfigLoader) -> Self {
        let config = Arc::new(config.config().clone());
        let store = Arc::new(Store::new());
        let directory = Arc::new(InMemoryDirectory::new());

        Self {
            services: Arc::new(Services {
                relationships: RelationshipManager::new(store.clone()),
                shifts: ShiftManager::new(store.clone()),
                timesheets: TimesheetEngine::new(store.clone()),
                aggregator: WeeklyAggregator::new(store.clone(), config.clone()),
                payslips: PayslipGenerator::new(store.clone(), config.clone()),
                reports: ReportCompiler::new(store, config, directory.clone()),
                directory,
            }),
        }
    }

    /// The identity directory used to name workers in reports.
    pub fn directory(&self) -> &InMemoryDirectory {
        &self.services.directory
    }

    /// Relationship management.
    pub fn relationships(&self) -> &RelationshipManager {
        &self.services.relationships
    }

    /// Shift scheduling.
    pub fn shifts(&self) -> &ShiftManager {
        &self.services.shifts
    }

    /// Timesheet lifecycle.
    pub fn timesheets(&self) -> &TimesheetEngine {
        &self.services.timesheets
    }

    /// Weekly client-hour aggregation.
    pub fn aggregator(&self) -> &WeeklyAggregator {
        &self.services.aggregator
    }

    /// Payslip generation and lifecycle.
    pub fn payslips(&self) -> &PayslipGenerator {
        &self.services.payslips
    }

    /// Report compilation.
    pub fn reports(&self) -> &ReportCompiler {
        &self.services.reports
    }
}

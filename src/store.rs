//! In-process storage for all engine tables.
//!
//! Every table lives behind a single [`RwLock`]. Reads see a consistent
//! snapshot; writes go through [`Store::transaction`], which applies the
//! closure to a staged copy and commits it only on success, so a failed
//! multi-row operation leaves no partial writes behind.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::error;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Payslip, PayslipItem, Relationship, Shift, ShiftAssignment, ShiftNotes, Timesheet,
};

/// All rows owned by the engine.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    /// Shifts by id.
    pub shifts: HashMap<Uuid, Shift>,
    /// Shift assignments by id.
    pub assignments: HashMap<Uuid, ShiftAssignment>,
    /// Shift notes keyed by shift id.
    pub shift_notes: HashMap<Uuid, ShiftNotes>,
    /// Timesheets by id.
    pub timesheets: HashMap<Uuid, Timesheet>,
    /// Relationships keyed by `(provider_id, worker_id)`.
    pub relationships: HashMap<(Uuid, Uuid), Relationship>,
    /// Payslips by id.
    pub payslips: HashMap<Uuid, Payslip>,
    /// Payslip line items in insertion order.
    pub payslip_items: Vec<PayslipItem>,
}

impl Tables {
    /// Looks up a shift or fails with `NotFound`.
    pub fn shift(&self, id: Uuid) -> EngineResult<&Shift> {
        self.shifts
            .get(&id)
            .ok_or_else(|| EngineError::not_found("shift", id))
    }

    /// Looks up a shift mutably or fails with `NotFound`.
    pub fn shift_mut(&mut self, id: Uuid) -> EngineResult<&mut Shift> {
        self.shifts
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("shift", id))
    }

    /// Looks up a timesheet or fails with `NotFound`.
    pub fn timesheet(&self, id: Uuid) -> EngineResult<&Timesheet> {
        self.timesheets
            .get(&id)
            .ok_or_else(|| EngineError::not_found("timesheet", id))
    }

    /// Looks up a timesheet mutably or fails with `NotFound`.
    pub fn timesheet_mut(&mut self, id: Uuid) -> EngineResult<&mut Timesheet> {
        self.timesheets
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("timesheet", id))
    }

    /// Looks up a payslip or fails with `NotFound`.
    pub fn payslip(&self, id: Uuid) -> EngineResult<&Payslip> {
        self.payslips
            .get(&id)
            .ok_or_else(|| EngineError::not_found("payslip", id))
    }

    /// Looks up a payslip mutably or fails with `NotFound`.
    pub fn payslip_mut(&mut self, id: Uuid) -> EngineResult<&mut Payslip> {
        self.payslips
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("payslip", id))
    }

    /// Returns the line items of a payslip in insertion order.
    pub fn items_for_payslip(&self, payslip_id: Uuid) -> Vec<PayslipItem> {
        self.payslip_items
            .iter()
            .filter(|item| item.payslip_id == payslip_id)
            .cloned()
            .collect()
    }
}

/// Thread-safe owner of the engine tables.
#[derive(Debug, Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a read-only query against a consistent snapshot.
    pub fn read<T>(&self, query: impl FnOnce(&Tables) -> EngineResult<T>) -> EngineResult<T> {
        let guard = self.tables.read().map_err(|_| poisoned())?;
        query(&guard)
    }

    /// Runs `work` as one atomic unit.
    ///
    /// The write lock is held for the whole closure, so reads inside it
    /// cannot go stale. Changes are made to a staged copy and become
    /// visible only when `work` returns `Ok`.
    pub fn transaction<T>(
        &self,
        work: impl FnOnce(&mut Tables) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut guard = self.tables.write().map_err(|_| poisoned())?;
        let mut staged = guard.clone();
        let output = work(&mut staged)?;
        *guard = staged;
        Ok(output)
    }
}

fn poisoned() -> EngineError {
    error!("store lock poisoned by a panicking writer");
    EngineError::StorageUnavailable {
        message: "store lock poisoned".to_string(),
    }
}

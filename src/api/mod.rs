//! HTTP API module for the shift payroll engine.
//!
//! This module exposes scheduling, timesheet, payslip and report operations
//! as REST endpoints. The caller identity is taken from the `x-actor-role`
//! and `x-actor-id` headers set by the session layer.

mod extract;
mod handlers;
mod request;
mod response;
mod state;

pub use extract::{Caller, ID_HEADER, ROLE_HEADER};
pub use handlers::create_router;
pub use request::{
    AssignRequest, AssignmentStatusRequest, LinkWorkerRequest, PayslipQuery, RejectRequest,
    ReportQuery, ShiftListQuery, WeekQuery,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;

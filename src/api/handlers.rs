//! HTTP request handlers for the shift payroll API.
//!
//! Handlers are thin: they extract the caller and inputs, call one engine
//! operation and map its result. Every request is tagged with a correlation
//! id in the logs.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::identity::UserIdentity;
use crate::models::Actor;
use crate::payslip::{GeneratePayslip, PayslipUpdate};
use crate::relationships::RelationshipUpdate;
use crate::scheduling::{NewShift, NotesInput, ShiftUpdate};
use crate::timesheet::{ClockIn, ClockOut};

use super::extract::{Caller, json_body, query_params};
use super::request::{
    AssignRequest, AssignmentStatusRequest, LinkWorkerRequest, PayslipQuery, RejectRequest,
    ReportQuery, ShiftListQuery, WeekQuery,
};
use super::response::ApiErrorResponse;
use super::state::AppState;

type ApiResult = Result<Response, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/users", post(register_user))
        .route("/relationships", post(link_worker).get(list_workers))
        .route("/relationships/:worker_id", patch(update_relationship))
        .route("/shifts", post(create_shift).get(list_shifts))
        .route("/shifts/:id", get(get_shift).patch(update_shift).delete(delete_shift))
        .route("/shifts/:id/notes", put(set_notes).get(get_notes))
        .route("/shifts/:id/assignments", get(list_assignments).post(assign_worker))
        .route("/shifts/:id/timesheets", get(list_shift_timesheets))
        .route("/shifts/:id/weekly-client-hours", get(weekly_client_hours))
        .route("/assignments/:id", patch(update_assignment))
        .route("/client-hours", get(client_week_totals))
        .route("/timesheets", post(clock_in))
        .route("/timesheets/:id", get(get_timesheet))
        .route("/timesheets/:id/clock-out", post(clock_out))
        .route("/timesheets/:id/submit", post(submit_timesheet))
        .route("/timesheets/:id/approve", post(approve_timesheet))
        .route("/timesheets/:id/reject", post(reject_timesheet))
        .route("/workers/:id/shifts", get(list_worker_shifts))
        .route("/workers/:id/timesheets", get(list_worker_timesheets))
        .route("/workers/:id/timesheet-summary", get(timesheet_summary))
        .route("/workers/:id/payslips", get(list_worker_payslips))
        .route("/workers/:id/payslip-summary", get(payslip_summary))
        .route("/payslips", post(generate_payslip))
        .route(
            "/payslips/:id",
            get(get_payslip).patch(update_payslip).delete(delete_payslip),
        )
        .route("/payslips/:id/issue", post(issue_payslip))
        .route("/payslips/:id/pay", post(mark_payslip_paid))
        .route("/reports", get(build_report))
        .with_state(state)
}

/// Logs the outcome of an engine call and turns it into a response.
fn respond<T: Serialize>(
    correlation_id: Uuid,
    operation: &'static str,
    status: StatusCode,
    result: EngineResult<T>,
) -> ApiResult {
    match result {
        Ok(body) => {
            info!(
                correlation_id = %correlation_id,
                operation,
                status = status.as_u16(),
                "request completed"
            );
            Ok((status, Json(body)).into_response())
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                operation,
                error = %err,
                kind = err.kind(),
                "request failed"
            );
            Err(err.into())
        }
    }
}

fn begin(operation: &'static str, actor: Option<&Actor>) -> Uuid {
    let correlation_id = Uuid::new_v4();
    match actor {
        Some(actor) => info!(
            correlation_id = %correlation_id,
            operation,
            role = actor.role(),
            actor_id = %actor.id(),
            "processing request"
        ),
        None => info!(correlation_id = %correlation_id, operation, "processing request"),
    }
    correlation_id
}

// =============================================================================
// Identities and relationships
// =============================================================================

async fn register_user(
    State(state): State<AppState>,
    payload: Result<Json<UserIdentity>, JsonRejection>,
) -> ApiResult {
    let correlation_id = begin("register_user", None);
    let user = json_body(correlation_id, payload)?;
    if user.name.trim().is_empty() {
        return respond::<UserIdentity>(
            correlation_id,
            "register_user",
            StatusCode::CREATED,
            Err(EngineError::validation("name", "must not be empty")),
        );
    }
    state.directory().register(user.clone());
    respond(correlation_id, "register_user", StatusCode::CREATED, Ok(user))
}

async fn link_worker(
    State(state): State<AppState>,
    Caller(actor): Caller,
    payload: Result<Json<LinkWorkerRequest>, JsonRejection>,
) -> ApiResult {
    let correlation_id = begin("link_worker", Some(&actor));
    let request = json_body(correlation_id, payload)?;
    let result = state
        .relationships()
        .link_worker(&actor, request.support_worker_id, request.hourly_rate);
    respond(correlation_id, "link_worker", StatusCode::CREATED, result)
}

async fn list_workers(State(state): State<AppState>, Caller(actor): Caller) -> ApiResult {
    let correlation_id = begin("list_workers", Some(&actor));
    let result = state.relationships().list_workers(&actor);
    respond(correlation_id, "list_workers", StatusCode::OK, result)
}

async fn update_relationship(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(worker_id): Path<Uuid>,
    payload: Result<Json<RelationshipUpdate>, JsonRejection>,
) -> ApiResult {
    let correlation_id = begin("update_relationship", Some(&actor));
    let update = json_body(correlation_id, payload)?;
    let result = state.relationships().update(&actor, worker_id, update);
    respond(correlation_id, "update_relationship", StatusCode::OK, result)
}

// =============================================================================
// Shifts
// =============================================================================

async fn create_shift(
    State(state): State<AppState>,
    Caller(actor): Caller,
    payload: Result<Json<NewShift>, JsonRejection>,
) -> ApiResult {
    let correlation_id = begin("create_shift", Some(&actor));
    let input = json_body(correlation_id, payload)?;
    let result = state.shifts().create(&actor, input);
    respond(correlation_id, "create_shift", StatusCode::CREATED, result)
}

/// Providers list their own shifts by date range; workers list their own.
async fn list_shifts(
    State(state): State<AppState>,
    Caller(actor): Caller,
    query: Result<Query<ShiftListQuery>, QueryRejection>,
) -> ApiResult {
    let correlation_id = begin("list_shifts", Some(&actor));
    let query = query_params(correlation_id, query)?;
    let result = match actor {
        Actor::Provider(_) => state.shifts().list_for_provider(&actor, query.from, query.to),
        Actor::Worker(worker_id) => state.shifts().list_for_worker(&actor, worker_id),
    };
    respond(correlation_id, "list_shifts", StatusCode::OK, result)
}

async fn get_shift(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(shift_id): Path<Uuid>,
) -> ApiResult {
    let correlation_id = begin("get_shift", Some(&actor));
    let result = state.shifts().get(&actor, shift_id);
    respond(correlation_id, "get_shift", StatusCode::OK, result)
}

async fn update_shift(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(shift_id): Path<Uuid>,
    payload: Result<Json<ShiftUpdate>, JsonRejection>,
) -> ApiResult {
    let correlation_id = begin("update_shift", Some(&actor));
    let update = json_body(correlation_id, payload)?;
    let result = state.shifts().update(&actor, shift_id, update);
    respond(correlation_id, "update_shift", StatusCode::OK, result)
}

async fn delete_shift(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(shift_id): Path<Uuid>,
) -> ApiResult {
    let correlation_id = begin("delete_shift", Some(&actor));
    let result = state.shifts().delete(&actor, shift_id);
    respond(correlation_id, "delete_shift", StatusCode::OK, result)
        .map(|_| StatusCode::NO_CONTENT.into_response())
}

async fn set_notes(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(shift_id): Path<Uuid>,
    payload: Result<Json<NotesInput>, JsonRejection>,
) -> ApiResult {
    let correlation_id = begin("set_notes", Some(&actor));
    let input = json_body(correlation_id, payload)?;
    let result = state.shifts().set_notes(&actor, shift_id, input);
    respond(correlation_id, "set_notes", StatusCode::OK, result)
}

async fn get_notes(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(shift_id): Path<Uuid>,
) -> ApiResult {
    let correlation_id = begin("get_notes", Some(&actor));
    let result = state.shifts().get_notes(&actor, shift_id);
    respond(correlation_id, "get_notes", StatusCode::OK, result)
}

async fn list_assignments(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(shift_id): Path<Uuid>,
) -> ApiResult {
    let correlation_id = begin("list_assignments", Some(&actor));
    let result = state.shifts().list_assignments(&actor, shift_id);
    respond(correlation_id, "list_assignments", StatusCode::OK, result)
}

async fn assign_worker(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(shift_id): Path<Uuid>,
    payload: Result<Json<AssignRequest>, JsonRejection>,
) -> ApiResult {
    let correlation_id = begin("assign_worker", Some(&actor));
    let request = json_body(correlation_id, payload)?;
    let result = state.shifts().assign(&actor, shift_id, request.support_worker_id);
    respond(correlation_id, "assign_worker", StatusCode::CREATED, result)
}

async fn update_assignment(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(assignment_id): Path<Uuid>,
    payload: Result<Json<AssignmentStatusRequest>, JsonRejection>,
) -> ApiResult {
    let correlation_id = begin("update_assignment", Some(&actor));
    let request = json_body(correlation_id, payload)?;
    let result = state
        .shifts()
        .update_assignment_status(&actor, assignment_id, request.status);
    respond(correlation_id, "update_assignment", StatusCode::OK, result)
}

async fn list_worker_shifts(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(worker_id): Path<Uuid>,
) -> ApiResult {
    let correlation_id = begin("list_worker_shifts", Some(&actor));
    let result = state.shifts().list_for_worker(&actor, worker_id);
    respond(correlation_id, "list_worker_shifts", StatusCode::OK, result)
}

// =============================================================================
// Weekly client hours
// =============================================================================

async fn weekly_client_hours(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(shift_id): Path<Uuid>,
    query: Result<Query<WeekQuery>, QueryRejection>,
) -> ApiResult {
    let correlation_id = begin("weekly_client_hours", Some(&actor));
    let query = query_params(correlation_id, query)?;
    let result = state
        .aggregator()
        .weekly_client_hours(&actor, shift_id, query.week_start);
    respond(correlation_id, "weekly_client_hours", StatusCode::OK, result)
}

async fn client_week_totals(
    State(state): State<AppState>,
    Caller(actor): Caller,
    query: Result<Query<WeekQuery>, QueryRejection>,
) -> ApiResult {
    let correlation_id = begin("client_week_totals", Some(&actor));
    let query = query_params(correlation_id, query)?;
    let result = state.aggregator().client_week_totals(&actor, query.week_start);
    respond(correlation_id, "client_week_totals", StatusCode::OK, result)
}

// =============================================================================
// Timesheets
// =============================================================================

async fn clock_in(
    State(state): State<AppState>,
    Caller(actor): Caller,
    payload: Result<Json<ClockIn>, JsonRejection>,
) -> ApiResult {
    let correlation_id = begin("clock_in", Some(&actor));
    let input = json_body(correlation_id, payload)?;
    let result = state.timesheets().clock_in(&actor, input);
    respond(correlation_id, "clock_in", StatusCode::CREATED, result)
}

async fn get_timesheet(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(timesheet_id): Path<Uuid>,
) -> ApiResult {
    let correlation_id = begin("get_timesheet", Some(&actor));
    let result = state.timesheets().get(&actor, timesheet_id);
    respond(correlation_id, "get_timesheet", StatusCode::OK, result)
}

async fn clock_out(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(timesheet_id): Path<Uuid>,
    payload: Result<Json<ClockOut>, JsonRejection>,
) -> ApiResult {
    let correlation_id = begin("clock_out", Some(&actor));
    let input = json_body(correlation_id, payload)?;
    let result = state.timesheets().clock_out(&actor, timesheet_id, input);
    respond(correlation_id, "clock_out", StatusCode::OK, result)
}

async fn submit_timesheet(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(timesheet_id): Path<Uuid>,
) -> ApiResult {
    let correlation_id = begin("submit_timesheet", Some(&actor));
    let result = state.timesheets().submit(&actor, timesheet_id);
    respond(correlation_id, "submit_timesheet", StatusCode::OK, result)
}

async fn approve_timesheet(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(timesheet_id): Path<Uuid>,
) -> ApiResult {
    let correlation_id = begin("approve_timesheet", Some(&actor));
    let result = state.timesheets().approve(&actor, timesheet_id);
    respond(correlation_id, "approve_timesheet", StatusCode::OK, result)
}

/// The body is optional; an empty body means no reason. A non-empty body
/// must be valid JSON.
async fn reject_timesheet(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(timesheet_id): Path<Uuid>,
    body: Bytes,
) -> ApiResult {
    let correlation_id = begin("reject_timesheet", Some(&actor));
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        RejectRequest::default()
    } else {
        json_body(correlation_id, Json::<RejectRequest>::from_bytes(&body))?
    };
    let result = state
        .timesheets()
        .reject(&actor, timesheet_id, request.reason.as_deref());
    respond(correlation_id, "reject_timesheet", StatusCode::OK, result)
}

async fn list_shift_timesheets(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(shift_id): Path<Uuid>,
) -> ApiResult {
    let correlation_id = begin("list_shift_timesheets", Some(&actor));
    let result = state.timesheets().list_for_shift(&actor, shift_id);
    respond(correlation_id, "list_shift_timesheets", StatusCode::OK, result)
}

async fn list_worker_timesheets(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(worker_id): Path<Uuid>,
) -> ApiResult {
    let correlation_id = begin("list_worker_timesheets", Some(&actor));
    let result = state.timesheets().list_for_worker(&actor, worker_id);
    respond(correlation_id, "list_worker_timesheets", StatusCode::OK, result)
}

async fn timesheet_summary(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(worker_id): Path<Uuid>,
) -> ApiResult {
    let correlation_id = begin("timesheet_summary", Some(&actor));
    let result = state.timesheets().summary(&actor, worker_id);
    respond(correlation_id, "timesheet_summary", StatusCode::OK, result)
}

// =============================================================================
// Payslips
// =============================================================================

async fn generate_payslip(
    State(state): State<AppState>,
    Caller(actor): Caller,
    payload: Result<Json<GeneratePayslip>, JsonRejection>,
) -> ApiResult {
    let correlation_id = begin("generate_payslip", Some(&actor));
    let input = json_body(correlation_id, payload)?;
    let result = state.payslips().generate(&actor, input);
    respond(correlation_id, "generate_payslip", StatusCode::CREATED, result)
}

async fn get_payslip(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(payslip_id): Path<Uuid>,
) -> ApiResult {
    let correlation_id = begin("get_payslip", Some(&actor));
    let result = state.payslips().get(&actor, payslip_id);
    respond(correlation_id, "get_payslip", StatusCode::OK, result)
}

async fn update_payslip(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(payslip_id): Path<Uuid>,
    payload: Result<Json<PayslipUpdate>, JsonRejection>,
) -> ApiResult {
    let correlation_id = begin("update_payslip", Some(&actor));
    let update = json_body(correlation_id, payload)?;
    let result = state.payslips().update(&actor, payslip_id, update);
    respond(correlation_id, "update_payslip", StatusCode::OK, result)
}

async fn issue_payslip(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(payslip_id): Path<Uuid>,
) -> ApiResult {
    let correlation_id = begin("issue_payslip", Some(&actor));
    let result = state.payslips().issue(&actor, payslip_id);
    respond(correlation_id, "issue_payslip", StatusCode::OK, result)
}

async fn mark_payslip_paid(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(payslip_id): Path<Uuid>,
) -> ApiResult {
    let correlation_id = begin("mark_payslip_paid", Some(&actor));
    let result = state.payslips().mark_paid(&actor, payslip_id);
    respond(correlation_id, "mark_payslip_paid", StatusCode::OK, result)
}

async fn delete_payslip(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(payslip_id): Path<Uuid>,
) -> ApiResult {
    let correlation_id = begin("delete_payslip", Some(&actor));
    let result = state.payslips().delete(&actor, payslip_id);
    respond(correlation_id, "delete_payslip", StatusCode::OK, result)
        .map(|_| StatusCode::NO_CONTENT.into_response())
}

/// Providers default to themselves; workers must name the provider.
fn payslip_provider(actor: &Actor, query: &PayslipQuery) -> EngineResult<Uuid> {
    match (actor, query.provider_id) {
        (_, Some(provider_id)) => Ok(provider_id),
        (Actor::Provider(id), None) => Ok(*id),
        (Actor::Worker(_), None) => Err(EngineError::validation(
            "provider_id",
            "required when the caller is a worker",
        )),
    }
}

async fn list_worker_payslips(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(worker_id): Path<Uuid>,
    query: Result<Query<PayslipQuery>, QueryRejection>,
) -> ApiResult {
    let correlation_id = begin("list_worker_payslips", Some(&actor));
    let query = query_params(correlation_id, query)?;
    let result = payslip_provider(&actor, &query)
        .and_then(|provider_id| state.payslips().list_for_worker(&actor, worker_id, provider_id));
    respond(correlation_id, "list_worker_payslips", StatusCode::OK, result)
}

async fn payslip_summary(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(worker_id): Path<Uuid>,
    query: Result<Query<PayslipQuery>, QueryRejection>,
) -> ApiResult {
    let correlation_id = begin("payslip_summary", Some(&actor));
    let query = query_params(correlation_id, query)?;
    let result = payslip_provider(&actor, &query)
        .and_then(|provider_id| state.payslips().summary(&actor, worker_id, provider_id));
    respond(correlation_id, "payslip_summary", StatusCode::OK, result)
}

// =============================================================================
// Reports
// =============================================================================

async fn build_report(
    State(state): State<AppState>,
    Caller(actor): Caller,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult {
    let correlation_id = begin("build_report", Some(&actor));
    let query = query_params(correlation_id, query)?;
    let result = state
        .reports()
        .build_report(&actor, query.start_date, query.end_date);
    respond(correlation_id, "build_report", StatusCode::OK, result)
}

//! Payslip generation and lifecycle.
//!
//! Generation snapshots the worker's approved timesheets on the provider's
//! shifts for the period and writes the payslip with its line items in one
//! store transaction.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::guard::{Requirement, RelationshipGuard, ensure_owner, require_provider};
use crate::models::{
    Actor, Payslip, PayslipDetail, PayslipItem, PayslipItemType, PayslipStatus, PayslipSummary,
    Timesheet, TimesheetStatus, compute_pay,
};
use crate::store::{Store, Tables};

/// Input for generating a payslip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePayslip {
    /// The worker being paid.
    pub support_worker_id: Uuid,
    /// First day of the pay period (inclusive).
    pub pay_period_start_date: NaiveDate,
    /// Last day of the pay period (inclusive).
    pub pay_period_end_date: NaiveDate,
    /// Rate to apply; defaults to the relationship's rate.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// Flat deductions; defaults to the configured amount.
    #[serde(default)]
    pub deductions: Option<Decimal>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Changes allowed on a draft payslip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayslipUpdate {
    /// New hourly rate.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// New deductions.
    #[serde(default)]
    pub deductions: Option<Decimal>,
    /// New notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Turns approved timesheet hours into payslips and manages their lifecycle.
#[derive(Clone)]
pub struct PayslipGenerator {
    store: Arc<Store>,
    config: Arc<EngineConfig>,
}

impl PayslipGenerator {
    /// Creates a generator over the given store.
    pub fn new(store: Arc<Store>, config: Arc<EngineConfig>) -> Self {
        Self { store, config }
    }

    /// Generates a draft payslip from the worker's approved timesheets on the
    /// calling provider's shifts whose clock-in date falls within the pay
    /// period.
    ///
    /// Requires a relationship between the calling provider and the worker;
    /// an inactive relationship is sufficient.
    pub fn generate(&self, actor: &Actor, input: GeneratePayslip) -> EngineResult<PayslipDetail> {
        let provider_id = require_provider(actor)?;
        if input.pay_period_end_date < input.pay_period_start_date {
            return Err(EngineError::validation(
                "pay_period_end_date",
                format!(
                    "period end {} is before period start {}",
                    input.pay_period_end_date, input.pay_period_start_date
                ),
            ));
        }
        let deductions = input
            .deductions
            .unwrap_or(self.config.payroll().payslip.default_deductions);
        validate_non_negative("deductions", deductions)?;
        if let Some(rate) = input.hourly_rate {
            validate_non_negative("hourly_rate", rate)?;
        }

        self.store.transaction(|tables| {
            let relationship = RelationshipGuard::new(tables).authorize(
                provider_id,
                input.support_worker_id,
                Requirement::Exists,
            )?;
            let hourly_rate = input.hourly_rate.unwrap_or(relationship.hourly_rate);

            let selected = select_approved(
                tables,
                provider_id,
                input.support_worker_id,
                input.pay_period_start_date,
                input.pay_period_end_date,
            );
            let total_hours: Decimal = selected.iter().map(|t| t.hours_or_zero()).sum();
            let shift_count = selected
                .iter()
                .map(|t| t.shift_id)
                .collect::<HashSet<_>>()
                .len();
            let timesheet_count = selected.len();
            let (gross_pay, net_pay) = compute_pay(total_hours, hourly_rate, deductions)?;

            let payslip = Payslip {
                id: Uuid::new_v4(),
                support_worker_id: input.support_worker_id,
                service_provider_id: provider_id,
                pay_period_start_date: input.pay_period_start_date,
                pay_period_end_date: input.pay_period_end_date,
                total_hours,
                hourly_rate,
                gross_pay,
                deductions,
                net_pay,
                status: PayslipStatus::Draft,
                issued_date: None,
                paid_date: None,
                notes: input.notes,
                created_at: Utc::now(),
            };

            let mut items = vec![PayslipItem {
                id: Uuid::new_v4(),
                payslip_id: payslip.id,
                item_type: PayslipItemType::ShiftHours,
                description: shift_hours_description(shift_count),
                quantity: total_hours,
                rate: hourly_rate,
                amount: gross_pay,
            }];
            if deductions > Decimal::ZERO {
                items.push(deduction_item(payslip.id, deductions));
            }

            tables.payslips.insert(payslip.id, payslip.clone());
            tables.payslip_items.extend(items.iter().cloned());

            info!(
                payslip_id = %payslip.id,
                %provider_id,
                worker_id = %payslip.support_worker_id,
                period_start = %payslip.pay_period_start_date,
                period_end = %payslip.pay_period_end_date,
                timesheet_count,
                total_hours = %total_hours,
                gross_pay = %gross_pay,
                net_pay = %net_pay,
                "payslip generated"
            );
            Ok(PayslipDetail { payslip, items })
        })
    }

    /// Updates rate, deductions or notes of a draft payslip.
    ///
    /// Pay is recomputed from the stored total hours; timesheets are not
    /// re-selected. Line items are kept in step with the new figures.
    pub fn update(
        &self,
        actor: &Actor,
        payslip_id: Uuid,
        update: PayslipUpdate,
    ) -> EngineResult<PayslipDetail> {
        let provider_id = require_provider(actor)?;
        if let Some(rate) = update.hourly_rate {
            validate_non_negative("hourly_rate", rate)?;
        }
        if let Some(deductions) = update.deductions {
            validate_non_negative("deductions", deductions)?;
        }

        self.store.transaction(|tables| {
            let payslip = tables.payslip_mut(payslip_id)?;
            ensure_owner(provider_id, payslip.service_provider_id, "payslip", payslip_id)?;
            if payslip.status != PayslipStatus::Draft {
                return Err(EngineError::state_conflict(
                    "payslip",
                    payslip_id,
                    format!("cannot update a {} payslip", payslip.status.as_str()),
                ));
            }

            if let Some(rate) = update.hourly_rate {
                payslip.hourly_rate = rate;
            }
            if let Some(deductions) = update.deductions {
                payslip.deductions = deductions;
            }
            if let Some(notes) = update.notes {
                payslip.notes = Some(notes);
            }
            payslip.recompute_pay()?;
            let payslip = payslip.clone();

            sync_items(tables, &payslip);

            info!(
                %payslip_id,
                hourly_rate = %payslip.hourly_rate,
                deductions = %payslip.deductions,
                net_pay = %payslip.net_pay,
                "payslip updated"
            );
            let items = tables.items_for_payslip(payslip_id);
            Ok(PayslipDetail { payslip, items })
        })
    }

    /// Issues a draft payslip.
    pub fn issue(&self, actor: &Actor, payslip_id: Uuid) -> EngineResult<Payslip> {
        self.transition(actor, payslip_id, PayslipStatus::Issued)
    }

    /// Marks an issued payslip as paid.
    pub fn mark_paid(&self, actor: &Actor, payslip_id: Uuid) -> EngineResult<Payslip> {
        self.transition(actor, payslip_id, PayslipStatus::Paid)
    }

    fn transition(
        &self,
        actor: &Actor,
        payslip_id: Uuid,
        next: PayslipStatus,
    ) -> EngineResult<Payslip> {
        let provider_id = require_provider(actor)?;

        self.store.transaction(|tables| {
            let payslip = tables.payslip_mut(payslip_id)?;
            ensure_owner(provider_id, payslip.service_provider_id, "payslip", payslip_id)?;

            let current = payslip.status;
            if !current.can_transition_to(next) {
                warn!(
                    %payslip_id,
                    from = current.as_str(),
                    to = next.as_str(),
                    "illegal payslip transition"
                );
                return Err(EngineError::state_conflict(
                    "payslip",
                    payslip_id,
                    format!("cannot move from {} to {}", current.as_str(), next.as_str()),
                ));
            }

            let now = Utc::now();
            match next {
                PayslipStatus::Issued => payslip.issued_date = Some(now),
                PayslipStatus::Paid => payslip.paid_date = Some(now),
                PayslipStatus::Draft => {}
            }
            payslip.status = next;

            info!(
                %payslip_id,
                from = current.as_str(),
                to = next.as_str(),
                "payslip status changed"
            );
            Ok(payslip.clone())
        })
    }

    /// Deletes a draft payslip and all of its line items.
    pub fn delete(&self, actor: &Actor, payslip_id: Uuid) -> EngineResult<()> {
        let provider_id = require_provider(actor)?;

        self.store.transaction(|tables| {
            let payslip = tables.payslip(payslip_id)?;
            ensure_owner(provider_id, payslip.service_provider_id, "payslip", payslip_id)?;
            if payslip.status != PayslipStatus::Draft {
                return Err(EngineError::state_conflict(
                    "payslip",
                    payslip_id,
                    format!("cannot delete a {} payslip", payslip.status.as_str()),
                ));
            }

            let before = tables.payslip_items.len();
            tables.payslip_items.retain(|item| item.payslip_id != payslip_id);
            let removed_items = before - tables.payslip_items.len();
            tables.payslips.remove(&payslip_id);

            info!(%payslip_id, removed_items, "payslip deleted");
            Ok(())
        })
    }

    /// Returns a payslip with its line items.
    ///
    /// Visible to the owning provider and to the worker being paid.
    pub fn get(&self, actor: &Actor, payslip_id: Uuid) -> EngineResult<PayslipDetail> {
        self.store.read(|tables| {
            let payslip = tables.payslip(payslip_id)?;
            match actor {
                Actor::Provider(id) => {
                    ensure_owner(*id, payslip.service_provider_id, "payslip", payslip_id)?
                }
                Actor::Worker(id) => {
                    ensure_owner(*id, payslip.support_worker_id, "payslip", payslip_id)?
                }
            }
            Ok(PayslipDetail {
                payslip: payslip.clone(),
                items: tables.items_for_payslip(payslip_id),
            })
        })
    }

    /// Lists payslips between a worker and a provider, oldest first.
    pub fn list_for_worker(
        &self,
        actor: &Actor,
        worker_id: Uuid,
        provider_id: Uuid,
    ) -> EngineResult<Vec<Payslip>> {
        self.store.read(|tables| {
            authorize_pair(tables, actor, worker_id, provider_id)?;
            let mut payslips: Vec<Payslip> = payslips_for_pair(tables, worker_id, provider_id)
                .cloned()
                .collect();
            payslips.sort_by_key(|p| (p.created_at, p.id));
            Ok(payslips)
        })
    }

    /// Totals over the payslips between a worker and a provider.
    ///
    /// `last_payslip` is the most recently generated payslip.
    pub fn summary(
        &self,
        actor: &Actor,
        worker_id: Uuid,
        provider_id: Uuid,
    ) -> EngineResult<PayslipSummary> {
        self.store.read(|tables| {
            authorize_pair(tables, actor, worker_id, provider_id)?;
            let payslips: Vec<&Payslip> =
                payslips_for_pair(tables, worker_id, provider_id).collect();

            let net_where = |status: PayslipStatus| -> Decimal {
                payslips
                    .iter()
                    .filter(|p| p.status == status)
                    .map(|p| p.net_pay)
                    .sum()
            };

            Ok(PayslipSummary {
                total_payslips: payslips.len(),
                total_paid: net_where(PayslipStatus::Paid),
                total_pending: net_where(PayslipStatus::Issued),
                last_payslip: payslips
                    .iter()
                    .max_by_key(|p| (p.created_at, p.id))
                    .map(|p| (*p).clone()),
            })
        })
    }
}

/// Approved timesheets of `worker_id` on shifts owned by `provider_id` whose
/// clock-in date is within `[start, end]`, ordered by clock-in.
fn select_approved(
    tables: &Tables,
    provider_id: Uuid,
    worker_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<&Timesheet> {
    let mut selected: Vec<&Timesheet> = tables
        .timesheets
        .values()
        .filter(|t| t.support_worker_id == worker_id)
        .filter(|t| t.status == TimesheetStatus::Approved)
        .filter(|t| {
            tables
                .shifts
                .get(&t.shift_id)
                .is_some_and(|s| s.service_provider_id == provider_id)
        })
        .filter(|t| {
            let date = t.start_time.date();
            date >= start && date <= end
        })
        .collect();
    selected.sort_by_key(|t| (t.start_time, t.id));
    selected
}

fn payslips_for_pair(
    tables: &Tables,
    worker_id: Uuid,
    provider_id: Uuid,
) -> impl Iterator<Item = &Payslip> {
    tables
        .payslips
        .values()
        .filter(move |p| p.support_worker_id == worker_id && p.service_provider_id == provider_id)
}

fn authorize_pair(
    tables: &Tables,
    actor: &Actor,
    worker_id: Uuid,
    provider_id: Uuid,
) -> EngineResult<()> {
    match actor {
        Actor::Provider(id) => {
            ensure_owner(*id, provider_id, "payslip summary", worker_id)?;
            RelationshipGuard::new(tables).authorize(
                provider_id,
                worker_id,
                Requirement::Exists,
            )?;
        }
        Actor::Worker(id) => ensure_owner(*id, worker_id, "payslip summary", worker_id)?,
    }
    Ok(())
}

/// Rewrites the generated line items of a payslip after a draft update.
fn sync_items(tables: &mut Tables, payslip: &Payslip) {
    for item in tables
        .payslip_items
        .iter_mut()
        .filter(|i| {
            i.payslip_id == payslip.id && i.item_type == PayslipItemType::ShiftHours
        })
    {
        item.rate = payslip.hourly_rate;
        item.amount = payslip.gross_pay;
    }

    tables
        .payslip_items
        .retain(|i| {
            !(i.payslip_id == payslip.id && i.item_type == PayslipItemType::Deduction)
        });
    if payslip.deductions > Decimal::ZERO {
        tables
            .payslip_items
            .push(deduction_item(payslip.id, payslip.deductions));
    }
}

fn deduction_item(payslip_id: Uuid, deductions: Decimal) -> PayslipItem {
    PayslipItem {
        id: Uuid::new_v4(),
        payslip_id,
        item_type: PayslipItemType::Deduction,
        description: "Deductions".to_string(),
        quantity: Decimal::ONE,
        rate: deductions,
        amount: deductions,
    }
}

fn shift_hours_description(shift_count: usize) -> String {
    match shift_count {
        1 => "Hours worked across 1 shift".to_string(),
        n => format!("Hours worked across {} shifts", n),
    }
}

fn validate_non_negative(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::validation(field, "must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RelationshipStatus;
    use crate::relationships::RelationshipManager;
    use crate::test_support::Fixture;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(fx: &Fixture, deductions: &str) -> GeneratePayslip {
        GeneratePayslip {
            support_worker_id: fx.worker_id,
            pay_period_start_date: date("2026-01-12"),
            pay_period_end_date: date("2026-01-18"),
            hourly_rate: Some(dec("30")),
            deductions: Some(dec(deductions)),
            notes: None,
        }
    }

    /// Approves 8h, 8h and 4h of work inside the week of 2026-01-12.
    fn approve_week(fx: &Fixture) {
        let monday = fx.schedule("2026-01-12 08:00:00", "2026-01-12 16:00:00");
        let tuesday = fx.schedule("2026-01-13 08:00:00", "2026-01-13 16:00:00");
        let friday = fx.schedule("2026-01-16 08:00:00", "2026-01-16 12:00:00");
        fx.approved(&monday, "2026-01-12 08:00:00", "2026-01-12 16:00:00", 0);
        fx.approved(&tuesday, "2026-01-13 08:00:00", "2026-01-13 16:30:00", 30);
        fx.approved(&friday, "2026-01-16 08:00:00", "2026-01-16 12:00:00", 0);
    }

    #[test]
    fn test_generate_sums_approved_hours() {
        let fx = Fixture::new();
        approve_week(&fx);

        let detail = fx
            .payslip_generator()
            .generate(&fx.provider(), request(&fx, "20"))
            .unwrap();

        assert_eq!(detail.payslip.total_hours, dec("20"));
        assert_eq!(detail.payslip.gross_pay, dec("600"));
        assert_eq!(detail.payslip.net_pay, dec("580"));
        assert_eq!(detail.payslip.status, PayslipStatus::Draft);

        assert_eq!(detail.items.len(), 2);
        let hours = &detail.items[0];
        assert_eq!(hours.item_type, PayslipItemType::ShiftHours);
        assert_eq!(hours.quantity, dec("20"));
        assert_eq!(hours.amount, dec("600"));
        assert_eq!(hours.description, "Hours worked across 3 shifts");
        assert_eq!(detail.items[1].item_type, PayslipItemType::Deduction);
        assert_eq!(detail.items[1].amount, dec("20"));
    }

    #[test]
    fn test_generate_skips_unapproved_and_out_of_period() {
        let fx = Fixture::new();
        let inside = fx.schedule("2026-01-14 09:00:00", "2026-01-14 12:00:00");
        let outside = fx.schedule("2026-01-19 09:00:00", "2026-01-19 12:00:00");
        let pending = fx.schedule("2026-01-15 09:00:00", "2026-01-15 12:00:00");
        fx.approved(&inside, "2026-01-14 09:00:00", "2026-01-14 12:00:00", 0);
        fx.approved(&outside, "2026-01-19 09:00:00", "2026-01-19 12:00:00", 0);
        fx.clocked(&pending, "2026-01-15 09:00:00", "2026-01-15 12:00:00", 0);

        let detail = fx
            .payslip_generator()
            .generate(&fx.provider(), request(&fx, "0"))
            .unwrap();

        assert_eq!(detail.payslip.total_hours, dec("3"));
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].description, "Hours worked across 1 shift");
    }

    #[test]
    fn test_generate_on_period_end_date_is_included() {
        let fx = Fixture::new();
        let sunday = fx.schedule("2026-01-18 20:00:00", "2026-01-18 23:00:00");
        fx.approved(&sunday, "2026-01-18 20:00:00", "2026-01-18 23:00:00", 0);

        let detail = fx
            .payslip_generator()
            .generate(&fx.provider(), request(&fx, "0"))
            .unwrap();

        assert_eq!(detail.payslip.total_hours, dec("3"));
    }

    #[test]
    fn test_generate_empty_period_yields_zero_payslip() {
        let fx = Fixture::new();

        let detail = fx
            .payslip_generator()
            .generate(&fx.provider(), request(&fx, "0"))
            .unwrap();

        assert_eq!(detail.payslip.total_hours, Decimal::ZERO);
        assert_eq!(detail.payslip.gross_pay, Decimal::ZERO);
        assert_eq!(detail.payslip.net_pay, Decimal::ZERO);
    }

    #[test]
    fn test_generate_defaults_to_relationship_rate() {
        let fx = Fixture::new();
        let shift = fx.schedule("2026-01-14 09:00:00", "2026-01-14 11:00:00");
        fx.approved(&shift, "2026-01-14 09:00:00", "2026-01-14 11:00:00", 0);

        let mut input = request(&fx, "0");
        input.hourly_rate = None;
        let detail = fx.payslip_generator().generate(&fx.provider(), input).unwrap();

        assert_eq!(detail.payslip.hourly_rate, dec("30"));
        assert_eq!(detail.payslip.gross_pay, dec("60"));
    }

    #[test]
    fn test_generate_with_inactive_relationship_succeeds() {
        let fx = Fixture::new();
        let shift = fx.schedule("2026-01-14 09:00:00", "2026-01-14 13:00:00");
        fx.approved(&shift, "2026-01-14 09:00:00", "2026-01-14 13:00:00", 0);
        fx.set_relationship_status(RelationshipStatus::Inactive);

        let detail = fx
            .payslip_generator()
            .generate(&fx.provider(), request(&fx, "0"))
            .unwrap();

        assert_eq!(detail.payslip.total_hours, dec("4"));
        assert_eq!(detail.payslip.gross_pay, dec("120"));
    }

    #[test]
    fn test_generate_counts_only_the_calling_providers_shifts() {
        let fx = Fixture::new();
        let other = Fixture {
            store: fx.store.clone(),
            provider_id: Uuid::new_v4(),
            worker_id: fx.worker_id,
        };
        RelationshipManager::new(fx.store.clone())
            .link_worker(&other.provider(), fx.worker_id, dec("45"))
            .unwrap();

        let own = fx.schedule("2026-01-13 09:00:00", "2026-01-13 11:00:00");
        fx.approved(&own, "2026-01-13 09:00:00", "2026-01-13 11:00:00", 0);
        let elsewhere = other.schedule("2026-01-14 08:00:00", "2026-01-14 18:00:00");
        other.approved(&elsewhere, "2026-01-14 08:00:00", "2026-01-14 18:00:00", 0);

        let mine = fx
            .payslip_generator()
            .generate(&fx.provider(), request(&fx, "0"))
            .unwrap();
        assert_eq!(mine.payslip.total_hours, dec("2"));
        assert_eq!(mine.payslip.gross_pay, dec("60"));
        assert_eq!(mine.items[0].description, "Hours worked across 1 shift");

        let mut theirs_request = request(&other, "0");
        theirs_request.hourly_rate = None;
        let theirs = other
            .payslip_generator()
            .generate(&other.provider(), theirs_request)
            .unwrap();
        assert_eq!(theirs.payslip.total_hours, dec("10"));
        assert_eq!(theirs.payslip.gross_pay, dec("450"));
    }

    #[test]
    fn test_generate_rate_overflow_is_rejected_and_store_stays_usable() {
        let fx = Fixture::new();
        let shift = fx.schedule("2026-01-14 09:00:00", "2026-01-14 17:00:00");
        fx.approved(&shift, "2026-01-14 09:00:00", "2026-01-14 17:00:00", 0);
        let generator = fx.payslip_generator();

        let mut huge = request(&fx, "0");
        huge.hourly_rate = Some(Decimal::MAX);
        let result = generator.generate(&fx.provider(), huge);

        assert!(matches!(
            result,
            Err(EngineError::Validation { ref field, .. }) if field == "hourly_rate"
        ));
        let count = fx.store.read(|t| Ok(t.payslips.len())).unwrap();
        assert_eq!(count, 0);

        let detail = generator.generate(&fx.provider(), request(&fx, "0")).unwrap();
        assert_eq!(detail.payslip.gross_pay, dec("240"));
    }

    #[test]
    fn test_generate_without_relationship_is_unauthorized_and_writes_nothing() {
        let fx = Fixture::new();
        let stranger = Actor::Provider(Uuid::new_v4());

        let result = fx.payslip_generator().generate(&stranger, request(&fx, "0"));

        assert!(matches!(result, Err(EngineError::Unauthorized { .. })));
        let count = fx.store.read(|t| Ok(t.payslips.len() + t.payslip_items.len())).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_generate_rejects_inverted_period() {
        let fx = Fixture::new();
        let mut input = request(&fx, "0");
        input.pay_period_end_date = date("2026-01-01");

        let result = fx.payslip_generator().generate(&fx.provider(), input);

        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[test]
    fn test_issue_then_issue_again_conflicts() {
        let fx = Fixture::new();
        approve_week(&fx);
        let generator = fx.payslip_generator();
        let detail = generator.generate(&fx.provider(), request(&fx, "20")).unwrap();

        let issued = generator.issue(&fx.provider(), detail.payslip.id).unwrap();
        assert_eq!(issued.status, PayslipStatus::Issued);
        assert!(issued.issued_date.is_some());

        let again = generator.issue(&fx.provider(), detail.payslip.id);
        assert!(matches!(again, Err(EngineError::StateConflict { .. })));
    }

    #[test]
    fn test_mark_paid_requires_issued() {
        let fx = Fixture::new();
        let generator = fx.payslip_generator();
        let detail = generator.generate(&fx.provider(), request(&fx, "0")).unwrap();

        let early = generator.mark_paid(&fx.provider(), detail.payslip.id);
        assert!(matches!(early, Err(EngineError::StateConflict { .. })));

        generator.issue(&fx.provider(), detail.payslip.id).unwrap();
        let paid = generator.mark_paid(&fx.provider(), detail.payslip.id).unwrap();
        assert_eq!(paid.status, PayslipStatus::Paid);
        assert!(paid.paid_date.is_some());
    }

    #[test]
    fn test_update_draft_recomputes_pay_and_items() {
        let fx = Fixture::new();
        approve_week(&fx);
        let generator = fx.payslip_generator();
        let detail = generator.generate(&fx.provider(), request(&fx, "20")).unwrap();

        let updated = generator
            .update(
                &fx.provider(),
                detail.payslip.id,
                PayslipUpdate {
                    hourly_rate: Some(dec("32.50")),
                    deductions: Some(dec("0")),
                    notes: Some("rate corrected".to_string()),
                },
            )
            .unwrap();

        assert_eq!(updated.payslip.total_hours, dec("20"));
        assert_eq!(updated.payslip.gross_pay, dec("650"));
        assert_eq!(updated.payslip.net_pay, dec("650"));
        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.items[0].amount, dec("650"));
    }

    #[test]
    fn test_update_rate_overflow_keeps_draft_unchanged() {
        let fx = Fixture::new();
        approve_week(&fx);
        let generator = fx.payslip_generator();
        let detail = generator.generate(&fx.provider(), request(&fx, "20")).unwrap();

        let result = generator.update(
            &fx.provider(),
            detail.payslip.id,
            PayslipUpdate {
                hourly_rate: Some(Decimal::MAX),
                ..PayslipUpdate::default()
            },
        );

        assert!(matches!(result, Err(EngineError::Validation { .. })));
        let stored = generator.get(&fx.provider(), detail.payslip.id).unwrap();
        assert_eq!(stored.payslip.hourly_rate, dec("30"));
        assert_eq!(stored.payslip.net_pay, dec("580"));
        assert_eq!(stored.items, detail.items);
    }

    #[test]
    fn test_update_issued_payslip_conflicts() {
        let fx = Fixture::new();
        let generator = fx.payslip_generator();
        let detail = generator.generate(&fx.provider(), request(&fx, "0")).unwrap();
        generator.issue(&fx.provider(), detail.payslip.id).unwrap();

        let result = generator.update(&fx.provider(), detail.payslip.id, PayslipUpdate::default());

        assert!(matches!(result, Err(EngineError::StateConflict { .. })));
    }

    #[test]
    fn test_delete_draft_removes_items() {
        let fx = Fixture::new();
        approve_week(&fx);
        let generator = fx.payslip_generator();
        let detail = generator.generate(&fx.provider(), request(&fx, "20")).unwrap();

        generator.delete(&fx.provider(), detail.payslip.id).unwrap();

        let (payslips, items) = fx
            .store
            .read(|t| Ok((t.payslips.len(), t.payslip_items.len())))
            .unwrap();
        assert_eq!((payslips, items), (0, 0));
        assert!(matches!(
            generator.get(&fx.provider(), detail.payslip.id),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_issued_conflicts() {
        let fx = Fixture::new();
        let generator = fx.payslip_generator();
        let detail = generator.generate(&fx.provider(), request(&fx, "0")).unwrap();
        generator.issue(&fx.provider(), detail.payslip.id).unwrap();

        let result = generator.delete(&fx.provider(), detail.payslip.id);

        assert!(matches!(result, Err(EngineError::StateConflict { .. })));
    }

    #[test]
    fn test_worker_sees_own_payslip_only() {
        let fx = Fixture::new();
        let generator = fx.payslip_generator();
        let detail = generator.generate(&fx.provider(), request(&fx, "0")).unwrap();

        assert!(generator.get(&fx.worker(), detail.payslip.id).is_ok());
        let other = Actor::Worker(Uuid::new_v4());
        assert!(matches!(
            generator.get(&other, detail.payslip.id),
            Err(EngineError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_summary_totals_and_last_payslip() {
        let fx = Fixture::new();
        approve_week(&fx);
        let generator = fx.payslip_generator();

        let first = generator.generate(&fx.provider(), request(&fx, "20")).unwrap();
        generator.issue(&fx.provider(), first.payslip.id).unwrap();
        generator.mark_paid(&fx.provider(), first.payslip.id).unwrap();

        let second = generator.generate(&fx.provider(), request(&fx, "0")).unwrap();
        generator.issue(&fx.provider(), second.payslip.id).unwrap();

        let third = generator.generate(&fx.provider(), request(&fx, "100")).unwrap();

        let summary = generator
            .summary(&fx.worker(), fx.worker_id, fx.provider_id)
            .unwrap();
        assert_eq!(summary.total_payslips, 3);
        assert_eq!(summary.total_paid, dec("580"));
        assert_eq!(summary.total_pending, dec("600"));

        let last = summary.last_payslip.unwrap();
        let newest = [&first, &second, &third]
            .into_iter()
            .max_by_key(|d| (d.payslip.created_at, d.payslip.id))
            .unwrap();
        assert_eq!(last.id, newest.payslip.id);
    }

    #[test]
    fn test_summary_for_unlinked_provider_is_unauthorized() {
        let fx = Fixture::new();
        let stranger = Uuid::new_v4();

        let result = fx
            .payslip_generator()
            .summary(&Actor::Provider(stranger), fx.worker_id, stranger);

        assert!(matches!(result, Err(EngineError::Unauthorized { .. })));
    }
}

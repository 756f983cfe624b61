// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Guarded case transitions.
//!
//! `apply` is the only way a termination case changes state. Every
//! successful application yields the new case plus exactly one audit event,
//! and carries the prior status so the persistence layer can make the write
//! conditional on it (the atomic-claim discipline).

use crate::command::Command;
use crate::error::CoreError;
use crate::progress::ProcessingStep;
use crate::state::{CaseStatus, TerminationCase, TransitionResult};
use solde_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use solde_domain::validate_settlement_request;

/// Applies a command to a case, producing the new case and its audit event.
///
/// The input case is not mutated; persistence writes the returned state
/// conditionally on `prior_status` still holding in the store.
///
/// # Errors
///
/// Returns an error if:
/// - a run is requested while one is in flight (`DuplicateProcessing`)
/// - the command is not valid for the current status (`InvalidTransition`)
/// - a progress update would move backwards (`NonMonotonicProgress`)
/// - completion is requested with missing documents or no result
/// - the stored request fails structural validation on enqueue
pub fn apply(
    case: &TerminationCase,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let before: StateSnapshot = case.to_snapshot();
    let prior_status: CaseStatus = case.status;
    let action_name: &'static str = command.action_name();

    let (new_case, details) = match command {
        Command::RequestProcessing {
            issuer,
            pay_date,
            recompute,
            requested_at,
        } => {
            if case.status.is_in_flight() {
                return Err(CoreError::DuplicateProcessing {
                    status: case.status,
                });
            }
            // Re-validate before any mutation; a request that no longer
            // passes structural validation must not enter the queue.
            validate_settlement_request(&case.request)?;

            let mut new_case: TerminationCase = case.clone();
            new_case.status = CaseStatus::Pending;
            new_case.error_message = None;
            new_case.started_at = None;
            new_case.completed_at = None;
            new_case.progress_percent = ProcessingStep::Queued.percent();
            new_case.current_step = ProcessingStep::Queued.label().to_string();
            new_case.issuer = Some(issuer);
            new_case.pay_date = Some(pay_date);
            new_case.job_handle = Some(format!(
                "job-{}-run-{}",
                case.case_id.unwrap_or(0),
                case.document_version + 1
            ));
            if recompute {
                new_case.result = None;
            }
            let details: String = format!(
                "Run requested at {requested_at} (recompute: {recompute}), handle {}",
                new_case.job_handle.clone().unwrap_or_default()
            );
            (new_case, Some(details))
        }
        Command::ClaimJob { claimed_at } => {
            if case.status != CaseStatus::Pending {
                return Err(CoreError::InvalidTransition {
                    from: case.status,
                    to: CaseStatus::Processing,
                });
            }
            let mut new_case: TerminationCase = case.clone();
            new_case.status = CaseStatus::Processing;
            new_case.started_at = Some(claimed_at.clone());
            new_case.progress_percent = ProcessingStep::Claimed.percent();
            new_case.current_step = ProcessingStep::Claimed.label().to_string();
            (new_case, Some(format!("Claimed at {claimed_at}")))
        }
        Command::RecordProgress { step } => {
            require_processing(case, CaseStatus::Processing)?;
            if step.percent() < case.progress_percent {
                return Err(CoreError::NonMonotonicProgress {
                    current: case.progress_percent,
                    requested: step.percent(),
                });
            }
            let mut new_case: TerminationCase = case.clone();
            new_case.progress_percent = step.percent();
            new_case.current_step = step.label().to_string();
            (
                new_case,
                Some(format!("{} ({}%)", step.label(), step.percent())),
            )
        }
        Command::RecordResult { result } => {
            require_processing(case, CaseStatus::Processing)?;
            let mut new_case: TerminationCase = case.clone();
            let details: String = format!(
                "Settlement frozen: gross {}, net {}",
                result.gross_total, result.net_total
            );
            new_case.result = Some(result);
            (new_case, Some(details))
        }
        Command::AttachDocument { kind, reference } => {
            require_processing(case, CaseStatus::Processing)?;
            let mut new_case: TerminationCase = case.clone();
            new_case.documents.set(kind, reference.clone());
            (new_case, Some(format!("{kind}: {reference}")))
        }
        Command::CompleteCase { completed_at } => {
            require_processing(case, CaseStatus::Completed)?;
            if case.result.is_none() {
                return Err(CoreError::MissingResult);
            }
            let missing = case.documents.missing_kinds();
            if !missing.is_empty() {
                return Err(CoreError::IncompleteDocuments { missing });
            }
            let mut new_case: TerminationCase = case.clone();
            new_case.status = CaseStatus::Completed;
            new_case.progress_percent = ProcessingStep::Completed.percent();
            new_case.current_step = ProcessingStep::Completed.label().to_string();
            new_case.completed_at = Some(completed_at.clone());
            new_case.document_version = case.document_version + 1;
            new_case.error_message = None;
            (
                new_case,
                Some(format!(
                    "Completed at {completed_at}, document version {}",
                    case.document_version + 1
                )),
            )
        }
        Command::FailCase { error } => {
            if !matches!(case.status, CaseStatus::Processing | CaseStatus::Pending) {
                return Err(CoreError::InvalidTransition {
                    from: case.status,
                    to: CaseStatus::Failed,
                });
            }
            // Progress stays at the last successful checkpoint so an
            // operator can see how far the run got.
            let mut new_case: TerminationCase = case.clone();
            new_case.status = CaseStatus::Failed;
            new_case.error_message = Some(error.clone());
            (new_case, Some(error))
        }
    };

    let after: StateSnapshot = new_case.to_snapshot();
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        Action::new(action_name.to_string(), details),
        before,
        after,
    );

    Ok(TransitionResult {
        prior_status,
        new_case,
        audit_event,
    })
}

fn require_processing(case: &TerminationCase, target: CaseStatus) -> Result<(), CoreError> {
    if case.status == CaseStatus::Processing {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            from: case.status,
            to: target,
        })
    }
}

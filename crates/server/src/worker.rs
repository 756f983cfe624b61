// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Background settlement worker.
//!
//! The worker drains a ticket channel of case IDs. For each ticket it
//! claims the case with an atomic conditional transition, runs the stages
//! strictly in order (calculate before documents, since document content
//! depends on the calculated amounts), and finishes the case as
//! `completed` or `failed`. Every stage write is one atomic persisted
//! transition, so polling clients never observe a torn snapshot and a
//! crash resumes from the persisted `pending` queue at startup.
//!
//! Stage errors never escape: they are written into the case's error field
//! with the progress left at the last successful checkpoint.

use solde::{
    CaseStatus, Command, DocumentContext, DocumentError, DocumentGenerator, DocumentKind,
    GeneratedDocument, ProcessingStep, TerminationCase, apply,
};
use solde_audit::{Actor, Cause};
use solde_domain::{SettlementResult, StatutoryDeductions, calculate_settlement};
use solde_persistence::SqlitePersistence;
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::{Iso8601, Rfc3339};
use tokio::sync::{Mutex, mpsc};
use tracing::{error, info, warn};

/// Shared handles the worker needs.
#[derive(Clone)]
pub struct WorkerContext {
    /// The persistence layer.
    pub persistence: Arc<Mutex<SqlitePersistence>>,
    /// The external document renderer.
    pub generator: Arc<dyn DocumentGenerator>,
    /// The external statutory-deduction collaborator.
    pub deductions: Arc<dyn StatutoryDeductions>,
}

/// A stage failure, written into the case's error field.
#[derive(Debug)]
struct StageFailure(String);

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns the current UTC time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

/// Runs the worker loop until the ticket channel closes.
pub async fn run_worker(ctx: WorkerContext, mut tickets: mpsc::Receiver<i64>) {
    info!("Settlement worker started");
    while let Some(case_id) = tickets.recv().await {
        process_case(&ctx, case_id).await;
    }
    info!("Settlement worker stopped");
}

/// Processes one ticket end to end. Never panics, never leaves the case in
/// `processing`.
async fn process_case(ctx: &WorkerContext, case_id: i64) {
    let cause: Cause = {
        let mut persistence = ctx.persistence.lock().await;
        match persistence.get_case(case_id) {
            Ok(case) => Cause::new(
                case.job_handle.unwrap_or_else(|| format!("job-{case_id}")),
                String::from("Background settlement run"),
            ),
            Err(e) => {
                warn!(case_id, error = %e, "Dropping ticket for unknown case");
                return;
            }
        }
    };

    // Claim. Losing the claim is not an error: duplicate delivery is
    // expected and exactly one claimant proceeds.
    let claim = Command::ClaimJob {
        claimed_at: now_rfc3339(),
    };
    let claimed: Option<TerminationCase> =
        match transition(ctx, case_id, claim, &Actor::worker(), &cause).await {
            Ok(case) => case,
            Err(e) => {
                warn!(case_id, error = %e, "Claim failed");
                return;
            }
        };
    if claimed.is_none() {
        info!(case_id, "Job already claimed elsewhere; dropping duplicate ticket");
        return;
    }

    if let Err(failure) = run_stages(ctx, case_id, &cause).await {
        error!(case_id, error = %failure, "Termination case processing failed");
        let fail = Command::FailCase {
            error: failure.to_string(),
        };
        match transition(ctx, case_id, fail, &Actor::worker(), &cause).await {
            Ok(Some(_)) => {}
            Ok(None) => warn!(case_id, "Failure transition lost its status guard"),
            Err(e) => error!(case_id, error = %e, "Could not record case failure"),
        }
    }
}

/// Applies a command to the freshly loaded case and persists it with its
/// audit event. Returns `None` when the conditional status guard lost.
async fn transition(
    ctx: &WorkerContext,
    case_id: i64,
    command: Command,
    actor: &Actor,
    cause: &Cause,
) -> Result<Option<TerminationCase>, StageFailure> {
    let mut persistence = ctx.persistence.lock().await;
    let case: TerminationCase = persistence
        .get_case(case_id)
        .map_err(|e| StageFailure(e.to_string()))?;
    let transition = apply(&case, command, actor.clone(), cause.clone())
        .map_err(|e| StageFailure(e.to_string()))?;
    let written: bool = persistence
        .persist_transition(&transition, &now_rfc3339())
        .map_err(|e| StageFailure(e.to_string()))?;
    drop(persistence);

    Ok(written.then_some(transition.new_case))
}

async fn record_progress(
    ctx: &WorkerContext,
    case_id: i64,
    step: ProcessingStep,
    cause: &Cause,
) -> Result<(), StageFailure> {
    transition(
        ctx,
        case_id,
        Command::RecordProgress { step },
        &Actor::worker(),
        cause,
    )
    .await?
    .map(|_| ())
    .ok_or_else(|| StageFailure(String::from("Progress update lost its status guard")))
}

/// Runs the sequential stages of one claimed run.
async fn run_stages(ctx: &WorkerContext, case_id: i64, cause: &Cause) -> Result<(), StageFailure> {
    record_progress(ctx, case_id, ProcessingStep::ValidatingRequest, cause).await?;

    let case: TerminationCase = {
        let mut persistence = ctx.persistence.lock().await;
        persistence
            .get_case(case_id)
            .map_err(|e| StageFailure(e.to_string()))?
    };

    let profile = {
        let mut persistence = ctx.persistence.lock().await;
        persistence
            .get_employee_profile(&case.tenant_id, &case.employee_id)
            .map_err(|e| StageFailure(e.to_string()))?
            .ok_or_else(|| {
                StageFailure(format!(
                    "Employee '{}' has no recorded profile for tenant '{}'",
                    case.employee_id.value(),
                    case.tenant_id.value()
                ))
            })?
    };

    // Calculate, unless a frozen result survives a non-recompute
    // regeneration.
    record_progress(ctx, case_id, ProcessingStep::CalculatingSettlement, cause).await?;
    let result: SettlementResult = if let Some(existing) = case.result.clone() {
        info!(case_id, "Reusing frozen settlement result for regeneration");
        existing
    } else {
        let computed: SettlementResult = calculate_settlement(
            &case.request,
            &profile,
            ctx.deductions.as_ref(),
            OffsetDateTime::now_utc(),
        )
        .map_err(|e| StageFailure(e.to_string()))?;
        transition(
            ctx,
            case_id,
            Command::RecordResult {
                result: computed.clone(),
            },
            &Actor::worker(),
            cause,
        )
        .await?
        .ok_or_else(|| StageFailure(String::from("Result write lost its status guard")))?;
        computed
    };

    let pay_date: time::Date = case
        .pay_date
        .as_deref()
        .ok_or_else(|| StageFailure(String::from("No pay date recorded for the run")))
        .and_then(|s| {
            time::Date::parse(s, &Iso8601::DEFAULT)
                .map_err(|e| StageFailure(format!("Invalid pay date '{s}': {e}")))
        })?;
    let issuer: String = case.issuer.clone().unwrap_or_else(|| String::from("solde"));
    let version: u32 = case.document_version + 1;

    // Generate every document, collecting failures so a failed case
    // enumerates all failed kinds rather than just the first.
    let mut failures: Vec<DocumentError> = Vec::new();
    for kind in DocumentKind::ALL {
        record_progress(ctx, case_id, ProcessingStep::for_document(kind), cause).await?;

        let current: TerminationCase = {
            let mut persistence = ctx.persistence.lock().await;
            persistence
                .get_case(case_id)
                .map_err(|e| StageFailure(e.to_string()))?
        };
        let generated: Result<GeneratedDocument, DocumentError> = ctx.generator.generate(
            kind,
            &DocumentContext {
                case: &current,
                result: &result,
                issuer: &issuer,
                pay_date,
                version,
            },
        );

        match generated {
            Ok(document) => {
                transition(
                    ctx,
                    case_id,
                    Command::AttachDocument {
                        kind,
                        reference: document.reference.clone(),
                    },
                    &Actor::worker(),
                    cause,
                )
                .await?
                .ok_or_else(|| {
                    StageFailure(String::from("Document write lost its status guard"))
                })?;

                let mut persistence = ctx.persistence.lock().await;
                persistence
                    .record_document_issue(
                        case_id,
                        kind.as_str(),
                        &document.reference,
                        version,
                        &issuer,
                        &pay_date.to_string(),
                        &now_rfc3339(),
                    )
                    .map_err(|e| StageFailure(e.to_string()))?;
            }
            Err(failure) => {
                warn!(case_id, kind = %kind, reason = %failure.reason, "Document generation failed");
                failures.push(failure);
            }
        }
    }

    if !failures.is_empty() {
        let kinds: Vec<&str> = failures.iter().map(|f| f.kind.as_str()).collect();
        return Err(StageFailure(format!(
            "Failed to generate {}",
            kinds.join(", ")
        )));
    }

    record_progress(ctx, case_id, ProcessingStep::PersistingArtifacts, cause).await?;

    transition(
        ctx,
        case_id,
        Command::CompleteCase {
            completed_at: now_rfc3339(),
        },
        &Actor::worker(),
        cause,
    )
    .await?
    .ok_or_else(|| StageFailure(String::from("Completion lost its status guard")))?;

    info!(case_id, version, "Termination case completed");
    Ok(())
}

/// Startup recovery: fails stale `processing` claims, then returns the
/// persisted `pending` queue for re-enqueueing.
///
/// A case stuck in `processing` past the timeout lost its worker (crash,
/// kill); it is transitioned to `failed` with its progress preserved so an
/// operator can see how far it got and retry.
pub async fn recover_persisted_queue(
    ctx: &WorkerContext,
    stale_after: time::Duration,
) -> Vec<i64> {
    let cutoff: String = (OffsetDateTime::now_utc() - stale_after)
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"));

    let stale: Vec<i64> = {
        let mut persistence = ctx.persistence.lock().await;
        persistence
            .list_stale_processing(&cutoff)
            .unwrap_or_default()
    };

    for case_id in stale {
        let cause = Cause::new(
            format!("sweep-{case_id}"),
            format!("Claim older than cutoff {cutoff}"),
        );
        let fail = Command::FailCase {
            error: String::from(
                "Worker claim timed out; the run was abandoned and may be retried",
            ),
        };
        match transition(ctx, case_id, fail, &Actor::scheduler(), &cause).await {
            Ok(Some(_)) => warn!(case_id, "Swept stale processing claim to failed"),
            Ok(None) => {}
            Err(e) => error!(case_id, error = %e, "Could not sweep stale claim"),
        }
    }

    let mut persistence = ctx.persistence.lock().await;
    persistence
        .list_case_ids_with_status(CaseStatus::Pending)
        .unwrap_or_default()
}

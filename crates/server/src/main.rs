// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod worker;

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use solde::{Command, DocumentGenerator, StubDocumentGenerator, TerminationCase, apply};
use solde_api::{
    ApiError, CreateCaseRequest, CreateCaseResponse, PreviewSettlementRequest, ProgressResponse,
    RegenerateRequest, SettlementResultDto, StartProcessingRequest, StartProcessingResponse,
    UpsertEmployeeRequest, is_regenerable, parse_date_field, preview_settlement,
    progress_response, regeneration_cause, require_non_empty, translate_core_error,
};
use solde_audit::{Action, Actor, AuditEvent, Cause};
use solde_domain::{StatutoryDeductions, ZeroDeductions};
use solde_persistence::{PersistenceError, SqlitePersistence};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::{Mutex, mpsc};
use tracing::{error, info, warn};
use worker::{WorkerContext, now_rfc3339, recover_persisted_queue, run_worker};

/// Capacity of the worker ticket channel.
const JOB_CHANNEL_CAPACITY: usize = 100;

/// Solde Server - HTTP server and background worker for the Solde STC Engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Minutes after which a `processing` claim is considered stale and
    /// swept to `failed` at startup
    #[arg(long, default_value_t = 30)]
    stale_claim_minutes: i64,
}

/// Application state shared across handlers and the worker.
#[derive(Clone)]
struct AppState {
    /// The persistence layer for cases, employees, and audit events.
    persistence: Arc<Mutex<SqlitePersistence>>,
    /// Ticket channel feeding the background worker.
    jobs: mpsc::Sender<i64>,
    /// The external document renderer.
    generator: Arc<dyn DocumentGenerator>,
    /// The external statutory-deduction collaborator.
    deductions: Arc<dyn StatutoryDeductions>,
}

impl AppState {
    fn worker_context(&self) -> WorkerContext {
        WorkerContext {
            persistence: Arc::clone(&self.persistence),
            generator: Arc::clone(&self.generator),
            deductions: Arc::clone(&self.deductions),
        }
    }
}

/// Response for an employee upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UpsertEmployeeResponse {
    /// The tenant.
    tenant_id: String,
    /// The employee.
    employee_id: String,
    /// Number of salary months recorded.
    months_recorded: usize,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::DomainRuleViolation { .. } | ApiError::ComputationFailed { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<PersistenceError> for HttpError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::CaseNotFound(_)
            | PersistenceError::EmployeeNotFound { .. }
            | PersistenceError::NotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
            },
            _ => {
                error!(error = %err, "Persistence error");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: format!("Persistence error: {err}"),
                }
            }
        }
    }
}

/// Handler for POST `/employees`.
///
/// Upserts the employee profile and trailing salary history the calculator
/// reads: preview and confirm must see the same persisted inputs.
async fn handle_upsert_employee(
    AxumState(state): AxumState<AppState>,
    Json(req): Json<UpsertEmployeeRequest>,
) -> Result<Json<UpsertEmployeeResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        tenant_id = %req.tenant_id,
        employee_id = %req.employee_id,
        "Handling employee upsert"
    );

    let profile = req.to_profile()?;
    let tenant = solde_domain::TenantId::new(&req.tenant_id);
    let employee = solde_domain::EmployeeId::new(&req.employee_id);

    let mut persistence = state.persistence.lock().await;
    persistence.upsert_employee(&tenant, &employee, &profile, &now_rfc3339())?;
    drop(persistence);

    Ok(Json(UpsertEmployeeResponse {
        tenant_id: req.tenant_id,
        employee_id: req.employee_id,
        months_recorded: profile.monthly_gross_salaries.len(),
    }))
}

/// Handler for POST `/cases`.
///
/// Records a termination and creates its case in `idle`.
async fn handle_create_case(
    AxumState(state): AxumState<AppState>,
    Json(req): Json<CreateCaseRequest>,
) -> Result<Json<CreateCaseResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        tenant_id = %req.tenant_id,
        employee_id = %req.employee_id,
        classification = %req.classification,
        "Handling case creation"
    );

    require_non_empty(&req.actor_id, "actor_id").map_err(ApiError::from)?;
    let request = req.to_settlement_request()?;
    solde_domain::validate_settlement_request(&request)
        .map_err(solde_api::translate_domain_error)?;

    let case: TerminationCase = TerminationCase::new(request);

    let mut persistence = state.persistence.lock().await;
    // The case must reference a known employee before it can be enqueued.
    let known = persistence
        .get_employee_profile(&case.tenant_id, &case.employee_id)?
        .is_some();
    if !known {
        return Err(HttpError::from(PersistenceError::EmployeeNotFound {
            tenant_id: case.tenant_id.value().to_string(),
            employee_id: case.employee_id.value().to_string(),
        }));
    }

    let now: String = now_rfc3339();
    let case_id: i64 = persistence.create_case(&case, &now)?;

    let audit = AuditEvent::new(
        Actor::operator(&req.actor_id),
        Cause::new(format!("create-{case_id}"), String::from("Termination recorded")),
        Action::new(
            String::from("RecordTermination"),
            Some(format!("Classification {}", case.request.classification)),
        ),
        solde_audit::StateSnapshot::new(String::from("case=absent")),
        solde_audit::StateSnapshot::new(format!("case={case_id},status=idle")),
    );
    persistence.record_audit_event(Some(case_id), &audit, &now)?;
    drop(persistence);

    Ok(Json(CreateCaseResponse { case_id }))
}

/// Enqueues a processing run for a case: guarded transition to `pending`
/// plus a ticket for the worker. Shared by first-run and regeneration
/// endpoints.
async fn enqueue_run(
    state: &AppState,
    case_id: i64,
    issuer: String,
    pay_date: String,
    recompute: bool,
    actor: Actor,
    cause: Cause,
) -> Result<StartProcessingResponse, HttpError> {
    require_non_empty(&issuer, "issuer").map_err(ApiError::from)?;
    parse_date_field(&pay_date, "pay_date").map_err(ApiError::from)?;

    let mut persistence = state.persistence.lock().await;
    let case: TerminationCase = persistence.get_case(case_id)?;

    let transition = apply(
        &case,
        Command::RequestProcessing {
            issuer,
            pay_date,
            recompute,
            requested_at: now_rfc3339(),
        },
        actor,
        cause,
    )
    .map_err(translate_core_error)?;

    let written: bool = persistence.persist_transition(&transition, &now_rfc3339())?;
    drop(persistence);
    if !written {
        // The guard lost: another request moved the case first.
        return Err(HttpError::from(ApiError::Conflict {
            message: format!("Case {case_id} was enqueued concurrently by another request"),
        }));
    }

    let job_handle: String = transition
        .new_case
        .job_handle
        .clone()
        .unwrap_or_else(|| format!("job-{case_id}"));

    // Fire-and-forget hand-off; the request does not wait for execution.
    if let Err(e) = state.jobs.send(case_id).await {
        // The persisted pending state survives; startup recovery or a
        // retry will pick the case up.
        warn!(case_id, error = %e, "Worker channel unavailable; case stays pending");
    }

    Ok(StartProcessingResponse {
        accepted: true,
        job_handle,
    })
}

/// Handler for POST `/cases/{case_id}/process`.
async fn handle_start_processing(
    AxumState(state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<StartProcessingRequest>,
) -> Result<Json<StartProcessingResponse>, HttpError> {
    info!(actor_id = %req.actor_id, case_id, "Handling start processing");

    require_non_empty(&req.actor_id, "actor_id").map_err(ApiError::from)?;
    let cause = Cause::new(
        format!("process-{case_id}"),
        String::from("Processing requested"),
    );
    let response = enqueue_run(
        &state,
        case_id,
        req.issuer,
        req.pay_date,
        req.recompute,
        Actor::operator(&req.actor_id),
        cause,
    )
    .await?;
    Ok(Json(response))
}

/// Handler for POST `/cases/{case_id}/regenerate`.
///
/// Requires a finished case and a mandatory non-empty reason; does not
/// recompute the settlement unless explicitly requested.
async fn handle_regenerate(
    AxumState(state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<RegenerateRequest>,
) -> Result<Json<StartProcessingResponse>, HttpError> {
    info!(actor_id = %req.actor_id, case_id, "Handling document regeneration");

    require_non_empty(&req.actor_id, "actor_id").map_err(ApiError::from)?;
    let cause: Cause = regeneration_cause(&format!("regenerate-{case_id}"), &req.reason)?;

    {
        let mut persistence = state.persistence.lock().await;
        let case = persistence.get_case(case_id)?;
        if !is_regenerable(case.status) {
            return Err(HttpError::from(ApiError::Conflict {
                message: format!(
                    "Case {case_id} is {}; documents can only be regenerated after a run finished",
                    case.status
                ),
            }));
        }
    }

    let response = enqueue_run(
        &state,
        case_id,
        req.issuer,
        req.pay_date,
        req.recompute,
        Actor::operator(&req.actor_id),
        cause,
    )
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/cases/{case_id}/progress`.
///
/// Returns one consistent snapshot of the case for polling clients.
async fn handle_get_progress(
    AxumState(state): AxumState<AppState>,
    Path(case_id): Path<i64>,
) -> Result<Json<ProgressResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let case = persistence.get_case(case_id)?;
    drop(persistence);
    Ok(Json(progress_response(&case)))
}

/// Handler for GET `/cases/{case_id}/audit`.
async fn handle_get_audit(
    AxumState(state): AxumState<AppState>,
    Path(case_id): Path<i64>,
) -> Result<Json<Vec<AuditEvent>>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    // Reject unknown cases with 404 rather than an empty timeline.
    persistence.get_case(case_id)?;
    let timeline = persistence.get_audit_timeline(case_id)?;
    drop(persistence);
    Ok(Json(timeline))
}

/// Handler for POST `/settlements/preview`.
///
/// Pure and side-effect-free: repeated calls never touch case state, and
/// the numbers match a later confirmed run over the same salary history.
async fn handle_preview(
    AxumState(state): AxumState<AppState>,
    Json(req): Json<PreviewSettlementRequest>,
) -> Result<Json<SettlementResultDto>, HttpError> {
    let tenant = solde_domain::TenantId::new(&req.tenant_id);
    let employee = solde_domain::EmployeeId::new(&req.employee_id);

    let mut persistence = state.persistence.lock().await;
    let profile = persistence.get_employee_profile(&tenant, &employee)?;
    drop(persistence);

    let Some(profile) = profile else {
        return Err(HttpError::from(PersistenceError::EmployeeNotFound {
            tenant_id: req.tenant_id.clone(),
            employee_id: req.employee_id.clone(),
        }));
    };

    let result = preview_settlement(
        &req,
        &profile,
        state.deductions.as_ref(),
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(result))
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/employees", post(handle_upsert_employee))
        .route("/cases", post(handle_create_case))
        .route("/cases/{case_id}/process", post(handle_start_processing))
        .route("/cases/{case_id}/regenerate", post(handle_regenerate))
        .route("/cases/{case_id}/progress", get(handle_get_progress))
        .route("/cases/{case_id}/audit", get(handle_get_audit))
        .route("/settlements/preview", post(handle_preview))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Solde STC Engine server");

    let persistence: SqlitePersistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        SqlitePersistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        SqlitePersistence::new_in_memory()?
    };

    let (jobs, tickets) = mpsc::channel::<i64>(JOB_CHANNEL_CAPACITY);
    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        jobs: jobs.clone(),
        generator: Arc::new(StubDocumentGenerator),
        deductions: Arc::new(ZeroDeductions),
    };

    let ctx: WorkerContext = app_state.worker_context();
    tokio::spawn(run_worker(ctx.clone(), tickets));

    // Crash resume: sweep stale claims, then re-enqueue persisted pending
    // cases that never reached a worker.
    let pending: Vec<i64> =
        recover_persisted_queue(&ctx, time::Duration::minutes(args.stale_claim_minutes)).await;
    for case_id in pending {
        info!(case_id, "Re-enqueueing persisted pending case");
        if jobs.send(case_id).await.is_err() {
            warn!(case_id, "Worker channel closed during recovery");
        }
    }

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode, header},
    };
    use solde::{DocumentKind, FailingDocumentGenerator};
    use tower::ServiceExt;

    /// Creates test state on in-memory persistence. The returned receiver
    /// feeds `spawn_worker`; tests that must observe a case parked in
    /// `pending` simply never spawn it.
    fn create_test_state(generator: Arc<dyn DocumentGenerator>) -> (AppState, mpsc::Receiver<i64>) {
        let persistence: SqlitePersistence =
            SqlitePersistence::new_in_memory().expect("Failed to create in-memory persistence");
        let (jobs, tickets) = mpsc::channel::<i64>(JOB_CHANNEL_CAPACITY);
        let state = AppState {
            persistence: Arc::new(Mutex::new(persistence)),
            jobs,
            generator,
            deductions: Arc::new(ZeroDeductions),
        };
        (state, tickets)
    }

    fn spawn_worker(state: &AppState, tickets: mpsc::Receiver<i64>) {
        tokio::spawn(run_worker(state.worker_context(), tickets));
    }

    async fn request_json(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (HttpStatusCode, serde_json::Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        let request = match body {
            Some(value) => builder
                .body(Body::from(serde_json::to_vec(&value).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn employee_body() -> serde_json::Value {
        serde_json::json!({
            "actor_id": "ops-1",
            "tenant_id": "acme",
            "employee_id": "emp-1",
            "country": "CI",
            "category": "worker",
            "monthly_gross_minor": vec![300_000; 12],
            "accrued_vacation_days": 14,
            "years_of_service": 6.0,
        })
    }

    fn case_body(fault: &str) -> serde_json::Value {
        serde_json::json!({
            "actor_id": "ops-1",
            "tenant_id": "acme",
            "employee_id": "emp-1",
            "classification": "dismissal",
            "termination_date": "2026-03-31",
            "notice_disposition": "paid_by_employer",
            "fault_category": fault,
        })
    }

    fn process_body() -> serde_json::Value {
        serde_json::json!({
            "actor_id": "ops-1",
            "issuer": "hr-service",
            "pay_date": "2026-04-05",
        })
    }

    async fn setup_case(app: &Router, fault: &str) -> i64 {
        let (status, _) = request_json(app, "POST", "/employees", Some(employee_body())).await;
        assert_eq!(status, HttpStatusCode::OK);

        let (status, body) = request_json(app, "POST", "/cases", Some(case_body(fault))).await;
        assert_eq!(status, HttpStatusCode::OK);
        body["case_id"].as_i64().unwrap()
    }

    async fn poll_until_terminal(app: &Router, case_id: i64) -> ProgressResponse {
        for _ in 0..500 {
            let (status, body) = request_json(
                app,
                "GET",
                &format!("/cases/{case_id}/progress"),
                None,
            )
            .await;
            assert_eq!(status, HttpStatusCode::OK);
            let progress: ProgressResponse = serde_json::from_value(body).unwrap();
            if progress.status == "completed" || progress.status == "failed" {
                return progress;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("case {case_id} never reached a terminal status");
    }

    #[tokio::test]
    async fn test_upsert_employee_and_create_case() {
        let (state, _tickets) = create_test_state(Arc::new(StubDocumentGenerator));
        let app = build_router(state);

        let case_id = setup_case(&app, "economic").await;
        assert_eq!(case_id, 1);

        let (status, body) =
            request_json(&app, "GET", &format!("/cases/{case_id}/progress"), None).await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(body["status"], "idle");
        assert_eq!(body["progress_percent"], 0);
    }

    #[tokio::test]
    async fn test_create_case_for_unknown_employee_is_not_found() {
        let (state, _tickets) = create_test_state(Arc::new(StubDocumentGenerator));
        let app = build_router(state);

        let (status, body) = request_json(&app, "POST", "/cases", Some(case_body("economic"))).await;
        assert_eq!(status, HttpStatusCode::NOT_FOUND);
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_create_case_with_invalid_classification_is_bad_request() {
        let (state, _tickets) = create_test_state(Arc::new(StubDocumentGenerator));
        let app = build_router(state);
        let (status, _) = request_json(&app, "POST", "/employees", Some(employee_body())).await;
        assert_eq!(status, HttpStatusCode::OK);

        let mut body = case_body("economic");
        body["classification"] = serde_json::json!("sabbatical");
        let (status, _) = request_json(&app, "POST", "/cases", Some(body)).await;
        assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_fault_category_outside_dismissal_is_unprocessable() {
        let (state, _tickets) = create_test_state(Arc::new(StubDocumentGenerator));
        let app = build_router(state);
        let (status, _) = request_json(&app, "POST", "/employees", Some(employee_body())).await;
        assert_eq!(status, HttpStatusCode::OK);

        let mut body = case_body("economic");
        body["classification"] = serde_json::json!("retirement");
        let (status, _) = request_json(&app, "POST", "/cases", Some(body)).await;
        assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_duplicate_start_is_rejected_with_conflict() {
        // No worker: the first request parks the case in pending.
        let (state, _tickets) = create_test_state(Arc::new(StubDocumentGenerator));
        let app = build_router(state);
        let case_id = setup_case(&app, "economic").await;

        let (status, body) = request_json(
            &app,
            "POST",
            &format!("/cases/{case_id}/process"),
            Some(process_body()),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(body["accepted"], true);
        assert_eq!(body["job_handle"], format!("job-{case_id}-run-1"));

        let (status, body) = request_json(
            &app,
            "POST",
            &format!("/cases/{case_id}/process"),
            Some(process_body()),
        )
        .await;
        assert_eq!(status, HttpStatusCode::CONFLICT);
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_processing_completes_with_three_documents() {
        let (state, tickets) = create_test_state(Arc::new(StubDocumentGenerator));
        spawn_worker(&state, tickets);
        let app = build_router(state);
        let case_id = setup_case(&app, "economic").await;

        let (status, _) = request_json(
            &app,
            "POST",
            &format!("/cases/{case_id}/process"),
            Some(process_body()),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);

        let progress = poll_until_terminal(&app, case_id).await;
        assert_eq!(progress.status, "completed");
        assert_eq!(progress.progress_percent, 100);
        assert_eq!(progress.document_version, 1);

        let documents = progress.documents.unwrap();
        assert!(documents.work_certificate.is_some());
        assert!(documents.final_payslip.is_some());
        assert!(documents.fund_attestation.is_some());

        // 6 years at 300,000 average: the 6-10 year bracket rate applies.
        let result = progress.result.unwrap();
        assert_eq!(result.severance_minor, 630_000);
        assert!(result.notice_payment_minor > 0);
        assert!(result.vacation_payout_minor > 0);
        assert_eq!(
            result.gross_total_minor,
            result.severance_minor
                + result.vacation_payout_minor
                + result.gratification_minor
                + result.prorated_salary_minor
                + result.notice_payment_minor
        );
    }

    #[tokio::test]
    async fn test_preview_matches_confirmed_run() {
        let (state, tickets) = create_test_state(Arc::new(StubDocumentGenerator));
        spawn_worker(&state, tickets);
        let app = build_router(state);
        let case_id = setup_case(&app, "economic").await;

        let preview_body = serde_json::json!({
            "tenant_id": "acme",
            "employee_id": "emp-1",
            "classification": "dismissal",
            "termination_date": "2026-03-31",
            "notice_disposition": "paid_by_employer",
            "fault_category": "economic",
        });
        let (status, first) =
            request_json(&app, "POST", "/settlements/preview", Some(preview_body.clone())).await;
        assert_eq!(status, HttpStatusCode::OK);
        let (_, second) =
            request_json(&app, "POST", "/settlements/preview", Some(preview_body)).await;

        // Preview is read-only and deterministic over the same history.
        for field in [
            "severance_minor",
            "vacation_payout_minor",
            "gratification_minor",
            "prorated_salary_minor",
            "notice_payment_minor",
            "gross_total_minor",
            "net_total_minor",
        ] {
            assert_eq!(first[field], second[field], "field {field}");
        }

        let (status, _) = request_json(
            &app,
            "POST",
            &format!("/cases/{case_id}/process"),
            Some(process_body()),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        let progress = poll_until_terminal(&app, case_id).await;
        let confirmed = progress.result.unwrap();

        assert_eq!(first["severance_minor"], confirmed.severance_minor);
        assert_eq!(first["gross_total_minor"], confirmed.gross_total_minor);
        assert_eq!(first["net_total_minor"], confirmed.net_total_minor);
    }

    #[tokio::test]
    async fn test_gross_fault_zeroes_severance_but_completes() {
        let (state, tickets) = create_test_state(Arc::new(StubDocumentGenerator));
        spawn_worker(&state, tickets);
        let app = build_router(state);
        let case_id = setup_case(&app, "gross_fault").await;

        let (status, _) = request_json(
            &app,
            "POST",
            &format!("/cases/{case_id}/process"),
            Some(process_body()),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);

        let progress = poll_until_terminal(&app, case_id).await;
        assert_eq!(progress.status, "completed");
        let result = progress.result.unwrap();
        assert_eq!(result.severance_minor, 0);
        // The other line items are unaffected by the forfeiture.
        assert!(result.notice_payment_minor > 0);
        assert!(result.vacation_payout_minor > 0);
        assert!(result.prorated_salary_minor > 0);
    }

    #[tokio::test]
    async fn test_failing_generator_fails_case_enumerating_kinds() {
        let generator = FailingDocumentGenerator::new(vec![
            DocumentKind::FinalPayslip,
            DocumentKind::FundAttestation,
        ]);
        let (state, tickets) = create_test_state(Arc::new(generator));
        spawn_worker(&state, tickets);
        let app = build_router(state);
        let case_id = setup_case(&app, "economic").await;

        let (status, _) = request_json(
            &app,
            "POST",
            &format!("/cases/{case_id}/process"),
            Some(process_body()),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);

        let progress = poll_until_terminal(&app, case_id).await;
        assert_eq!(progress.status, "failed");

        // Both failed kinds are enumerated; partial success is never
        // reported as completed.
        let message = progress.error.unwrap();
        assert!(message.contains("final_payslip"));
        assert!(message.contains("fund_attestation"));

        // Progress stayed at the last reached checkpoint, not zero.
        assert!(progress.progress_percent > 0);
        assert!(progress.progress_percent < 100);

        // The one document that rendered is still recorded.
        let documents = progress.documents.unwrap();
        assert!(documents.work_certificate.is_some());
        assert!(documents.final_payslip.is_none());
    }

    #[tokio::test]
    async fn test_regeneration_requires_a_reason() {
        let (state, tickets) = create_test_state(Arc::new(StubDocumentGenerator));
        spawn_worker(&state, tickets);
        let app = build_router(state);
        let case_id = setup_case(&app, "economic").await;
        request_json(
            &app,
            "POST",
            &format!("/cases/{case_id}/process"),
            Some(process_body()),
        )
        .await;
        poll_until_terminal(&app, case_id).await;

        let body = serde_json::json!({
            "actor_id": "ops-2",
            "issuer": "hr-service",
            "pay_date": "2026-04-10",
            "reason": "   ",
        });
        let (status, _) = request_json(
            &app,
            "POST",
            &format!("/cases/{case_id}/regenerate"),
            Some(body),
        )
        .await;
        assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_regeneration_bumps_version_and_keeps_numbers() {
        let (state, tickets) = create_test_state(Arc::new(StubDocumentGenerator));
        spawn_worker(&state, tickets);
        let app = build_router(state);
        let case_id = setup_case(&app, "economic").await;
        request_json(
            &app,
            "POST",
            &format!("/cases/{case_id}/process"),
            Some(process_body()),
        )
        .await;
        let first = poll_until_terminal(&app, case_id).await;
        assert_eq!(first.document_version, 1);
        let first_result = first.result.unwrap();

        let body = serde_json::json!({
            "actor_id": "ops-2",
            "issuer": "hr-service",
            "pay_date": "2026-04-10",
            "reason": "employee name corrected on certificate",
        });
        let (status, response) = request_json(
            &app,
            "POST",
            &format!("/cases/{case_id}/regenerate"),
            Some(body),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(response["job_handle"], format!("job-{case_id}-run-2"));

        let second = poll_until_terminal(&app, case_id).await;
        assert_eq!(second.status, "completed");
        assert_eq!(second.document_version, 2);
        let documents = second.documents.unwrap();
        assert!(documents.final_payslip.unwrap().ends_with("-v2"));

        // Regeneration without recompute keeps the frozen numbers.
        let second_result = second.result.unwrap();
        assert_eq!(first_result.gross_total_minor, second_result.gross_total_minor);
        assert_eq!(first_result.calculated_at, second_result.calculated_at);
    }

    #[tokio::test]
    async fn test_regenerating_an_idle_case_is_a_conflict() {
        let (state, _tickets) = create_test_state(Arc::new(StubDocumentGenerator));
        let app = build_router(state);
        let case_id = setup_case(&app, "economic").await;

        let body = serde_json::json!({
            "actor_id": "ops-2",
            "issuer": "hr-service",
            "pay_date": "2026-04-10",
            "reason": "nothing to regenerate yet",
        });
        let (status, _) = request_json(
            &app,
            "POST",
            &format!("/cases/{case_id}/regenerate"),
            Some(body),
        )
        .await;
        assert_eq!(status, HttpStatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_case_progress_is_not_found() {
        let (state, _tickets) = create_test_state(Arc::new(StubDocumentGenerator));
        let app = build_router(state);
        let (status, _) = request_json(&app, "GET", "/cases/99/progress", None).await;
        assert_eq!(status, HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_audit_timeline_attributes_actors() {
        let (state, tickets) = create_test_state(Arc::new(StubDocumentGenerator));
        spawn_worker(&state, tickets);
        let app = build_router(state);
        let case_id = setup_case(&app, "economic").await;
        request_json(
            &app,
            "POST",
            &format!("/cases/{case_id}/process"),
            Some(process_body()),
        )
        .await;
        poll_until_terminal(&app, case_id).await;

        let (status, body) =
            request_json(&app, "GET", &format!("/cases/{case_id}/audit"), None).await;
        assert_eq!(status, HttpStatusCode::OK);
        let events = body.as_array().unwrap();

        let names: Vec<&str> = events
            .iter()
            .map(|e| e["action"]["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"RecordTermination"));
        assert!(names.contains(&"RequestProcessing"));
        assert!(names.contains(&"ClaimJob"));
        assert!(names.contains(&"CompleteCase"));

        // The enqueue is operator-attributed, the claim worker-attributed.
        let request_event = events
            .iter()
            .find(|e| e["action"]["name"] == "RequestProcessing")
            .unwrap();
        assert_eq!(request_event["actor"]["actor_type"], "operator");
        let claim_event = events
            .iter()
            .find(|e| e["action"]["name"] == "ClaimJob")
            .unwrap();
        assert_eq!(claim_event["actor"]["actor_type"], "worker");
    }

    #[tokio::test]
    async fn test_startup_recovery_re_enqueues_pending_case() {
        // Enqueue with no worker running, then start a worker fed by the
        // recovered queue, as main does after a restart.
        let (state, tickets) = create_test_state(Arc::new(StubDocumentGenerator));
        let app = build_router(state.clone());
        let case_id = setup_case(&app, "economic").await;
        let (status, _) = request_json(
            &app,
            "POST",
            &format!("/cases/{case_id}/process"),
            Some(process_body()),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);

        let ctx = state.worker_context();
        let pending = recover_persisted_queue(&ctx, time::Duration::minutes(30)).await;
        assert_eq!(pending, vec![case_id]);

        spawn_worker(&state, tickets);
        for id in pending {
            state.jobs.send(id).await.unwrap();
        }

        let progress = poll_until_terminal(&app, case_id).await;
        assert_eq!(progress.status, "completed");
    }
}

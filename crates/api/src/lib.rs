// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the Solde STC Engine.
//!
//! Transport-free operations over the domain and workflow crates: DTO
//! parsing, preview calculation, regeneration validation, and explicit
//! error translation. The HTTP server wires these to routes; nothing here
//! touches persistence or the network.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

mod error;
mod request_response;

pub use error::{ApiError, translate_core_error, translate_domain_error};
pub use request_response::{
    BeneficiaryDto, BeneficiaryShareDto, CreateCaseRequest, CreateCaseResponse, DocumentRefsDto,
    FieldError, PreviewSettlementRequest, ProgressResponse, RegenerateRequest,
    SettlementResultDto, StartProcessingRequest, StartProcessingResponse, UpsertEmployeeRequest,
    build_settlement_request, is_regenerable, parse_date_field, progress_response,
    require_non_empty, settlement_result_to_dto,
};

use solde_audit::Cause;
use solde_domain::{
    EmployeeProfile, SettlementResult, StatutoryDeductions, calculate_settlement,
    validate_settlement_request,
};
use time::OffsetDateTime;
use tracing::debug;

/// Runs the synchronous, side-effect-free settlement preview.
///
/// The preview is the same pure calculation the background worker runs
/// later: identical inputs (request, profile, deductions, `as_of`) produce
/// an identical result, so a client can show numbers before confirming.
///
/// # Errors
///
/// Returns an `ApiError` for malformed input, a missing salary history, or
/// a computation failure.
pub fn preview_settlement(
    request: &PreviewSettlementRequest,
    profile: &EmployeeProfile,
    deductions: &dyn StatutoryDeductions,
    as_of: OffsetDateTime,
) -> Result<SettlementResultDto, ApiError> {
    let settlement_request = request.to_settlement_request()?;
    validate_settlement_request(&settlement_request).map_err(translate_domain_error)?;

    let result: SettlementResult =
        calculate_settlement(&settlement_request, profile, deductions, as_of)
            .map_err(translate_domain_error)?;

    debug!(
        tenant_id = %request.tenant_id,
        employee_id = %request.employee_id,
        gross = result.gross_total.minor(),
        "Settlement preview computed"
    );

    Ok(settlement_result_to_dto(&result))
}

/// Builds the audit cause for a regeneration request.
///
/// The reason is mandatory and non-empty; this is the API-level enforcement
/// of the audit contract.
///
/// # Errors
///
/// Returns `InvalidInput` when the reason is empty or whitespace-only.
pub fn regeneration_cause(request_id: &str, reason: &str) -> Result<Cause, ApiError> {
    Cause::for_regeneration(request_id, reason).map_err(|e| ApiError::InvalidInput {
        field: String::from("reason"),
        message: e.to_string(),
    })
}

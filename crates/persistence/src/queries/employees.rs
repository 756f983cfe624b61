// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Employee and salary-history query operations.

use crate::data_models::EmployeeRow;
use crate::diesel_schema::{employees, salary_history};
use crate::error::PersistenceError;
use diesel::SqliteConnection;
use diesel::prelude::*;
use solde_domain::{EmployeeId, EmployeeProfile, Money, TenantId};

/// Loads an employee profile with its salary history, oldest month first.
///
/// Returns `Ok(None)` when the employee is unknown; an employee without
/// salary rows yields a profile with an empty history, which the calculator
/// rejects downstream.
///
/// # Errors
///
/// Returns an error if a query fails or the row cannot be reconstructed.
pub fn get_employee_profile(
    conn: &mut SqliteConnection,
    tenant_id: &TenantId,
    employee_id: &EmployeeId,
) -> Result<Option<EmployeeProfile>, PersistenceError> {
    let row: Option<EmployeeRow> = employees::table
        .filter(employees::tenant_id.eq(tenant_id.value()))
        .filter(employees::employee_id.eq(employee_id.value()))
        .first::<EmployeeRow>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_employee_profile: {e}")))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let monthly_gross: Vec<Money> = salary_history::table
        .filter(salary_history::tenant_id.eq(tenant_id.value()))
        .filter(salary_history::employee_id.eq(employee_id.value()))
        .order(salary_history::month_offset.asc())
        .select(salary_history::gross_minor)
        .load::<i64>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("get_employee_profile: {e}")))?
        .into_iter()
        .map(Money::from_minor)
        .collect();

    row.into_profile(monthly_gross).map(Some)
}

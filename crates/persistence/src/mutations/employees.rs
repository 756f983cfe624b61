// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Employee and salary-history mutation operations.

use crate::data_models::{EmployeeRow, SalaryRow};
use crate::diesel_schema::{employees, salary_history};
use crate::error::PersistenceError;
use diesel::SqliteConnection;
use diesel::prelude::*;
use solde_domain::{EmployeeId, EmployeeProfile, TenantId};

/// Upserts an employee profile together with its salary history.
///
/// The salary window is replaced wholesale: preview and confirm must read
/// one consistent history, so partial updates are not supported.
///
/// # Errors
///
/// Returns an error if the transaction fails.
pub fn upsert_employee(
    conn: &mut SqliteConnection,
    tenant_id: &TenantId,
    employee_id: &EmployeeId,
    profile: &EmployeeProfile,
    updated_at: &str,
) -> Result<(), PersistenceError> {
    let employee_row = EmployeeRow {
        tenant_id: tenant_id.value().to_string(),
        employee_id: employee_id.value().to_string(),
        country: profile.country.as_str().to_string(),
        category: profile.category.as_str().to_string(),
        years_of_service: profile.years_of_service,
        accrued_vacation_days: i32::from(profile.accrued_vacation_days),
        contractual_gratification_minor: profile.contractual_gratification.map(|m| m.minor()),
        updated_at: updated_at.to_string(),
    };

    let salary_rows: Vec<SalaryRow> = profile
        .monthly_gross_salaries
        .iter()
        .enumerate()
        .map(|(idx, gross)| SalaryRow {
            tenant_id: tenant_id.value().to_string(),
            employee_id: employee_id.value().to_string(),
            month_offset: i32::try_from(idx + 1).unwrap_or(i32::MAX),
            gross_minor: gross.minor(),
        })
        .collect();

    conn.transaction::<(), PersistenceError, _>(|conn| {
        diesel::replace_into(employees::table)
            .values(&employee_row)
            .execute(conn)?;

        diesel::delete(
            salary_history::table
                .filter(salary_history::tenant_id.eq(tenant_id.value()))
                .filter(salary_history::employee_id.eq(employee_id.value())),
        )
        .execute(conn)?;

        diesel::insert_into(salary_history::table)
            .values(&salary_rows)
            .execute(conn)?;

        Ok(())
    })
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Solde STC Engine.
//!
//! This crate persists termination cases, generated-document references,
//! employee salary histories, and audit events on Diesel over `SQLite`.
//!
//! ## Concurrency contract
//!
//! The only shared mutable resource in the system is the termination-case
//! row. Every state change goes through [`SqlitePersistence::persist_transition`],
//! which updates the row conditionally on the status the transition was
//! computed from and inserts the audit event in the same transaction. A
//! guard that matches zero rows writes nothing and reports the lost race,
//! which is what makes the `pending → processing` claim idempotent under
//! duplicate delivery.
//!
//! Each stage update is a single-statement row write, so polling clients
//! always read a consistent snapshot.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod sqlite;

#[cfg(test)]
mod tests;

pub use data_models::CaseDocumentRow;
pub use error::PersistenceError;

use diesel::SqliteConnection;
use solde::{CaseStatus, TerminationCase, TransitionResult};
use solde_audit::AuditEvent;
use solde_domain::{EmployeeId, EmployeeProfile, TenantId};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID, so tests
/// are isolated without time-based collisions.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `SQLite`-backed persistence adapter.
pub struct SqlitePersistence {
    conn: SqliteConnection,
}

impl SqlitePersistence {
    /// Creates a persistence adapter on a unique in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let url: String = format!("file:solde_memdb_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = sqlite::initialize_database(&url)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a persistence adapter on a file database (WAL mode).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = sqlite::initialize_database(path_str)?;
        sqlite::enable_wal_mode(&mut conn)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Upserts an employee profile with its salary history.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_employee(
        &mut self,
        tenant_id: &TenantId,
        employee_id: &EmployeeId,
        profile: &EmployeeProfile,
        updated_at: &str,
    ) -> Result<(), PersistenceError> {
        mutations::employees::upsert_employee(
            &mut self.conn,
            tenant_id,
            employee_id,
            profile,
            updated_at,
        )
    }

    /// Loads an employee profile, if known.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub fn get_employee_profile(
        &mut self,
        tenant_id: &TenantId,
        employee_id: &EmployeeId,
    ) -> Result<Option<EmployeeProfile>, PersistenceError> {
        queries::employees::get_employee_profile(&mut self.conn, tenant_id, employee_id)
    }

    /// Inserts a new termination case and returns its persisted ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn create_case(
        &mut self,
        case: &TerminationCase,
        created_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::cases::insert_case(&mut self.conn, case, created_at)
    }

    /// Loads one termination case.
    ///
    /// # Errors
    ///
    /// Returns `CaseNotFound` if no such case exists.
    pub fn get_case(&mut self, case_id: i64) -> Result<TerminationCase, PersistenceError> {
        queries::cases::get_case(&mut self.conn, case_id)
    }

    /// Persists a case transition atomically with its audit event.
    ///
    /// Returns `false` (nothing written) when the conditional status guard
    /// lost a race with another writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub fn persist_transition(
        &mut self,
        transition: &TransitionResult,
        created_at: &str,
    ) -> Result<bool, PersistenceError> {
        mutations::cases::persist_transition(&mut self.conn, transition, created_at)
    }

    /// Records one generated document in the version history.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    #[allow(clippy::too_many_arguments)]
    pub fn record_document_issue(
        &mut self,
        case_id: i64,
        kind: &str,
        reference: &str,
        version: u32,
        issued_by: &str,
        pay_date: &str,
        generated_at: &str,
    ) -> Result<(), PersistenceError> {
        mutations::cases::insert_document_history(
            &mut self.conn,
            case_id,
            kind,
            reference,
            version,
            issued_by,
            pay_date,
            generated_at,
        )
    }

    /// Lists case IDs currently in the given status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub fn list_case_ids_with_status(
        &mut self,
        status: CaseStatus,
    ) -> Result<Vec<i64>, PersistenceError> {
        queries::cases::list_case_ids_with_status(&mut self.conn, status)
    }

    /// Lists `processing` cases claimed before the cutoff (RFC 3339).
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub fn list_stale_processing(&mut self, cutoff: &str) -> Result<Vec<i64>, PersistenceError> {
        queries::cases::list_stale_processing(&mut self.conn, cutoff)
    }

    /// Lists the generated-document history of a case, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub fn list_document_history(
        &mut self,
        case_id: i64,
    ) -> Result<Vec<CaseDocumentRow>, PersistenceError> {
        queries::cases::list_document_history(&mut self.conn, case_id)
    }

    /// Records a standalone audit event (e.g. case creation).
    ///
    /// Transitions audit themselves through [`Self::persist_transition`];
    /// this is for auditable operations that are not case transitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn record_audit_event(
        &mut self,
        case_id: Option<i64>,
        event: &AuditEvent,
        created_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::audit::insert_audit_event(&mut self.conn, case_id, event, created_at)
    }

    /// Loads the audit timeline of a case, oldest event first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub fn get_audit_timeline(
        &mut self,
        case_id: i64,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::get_audit_timeline(&mut self.conn, case_id)
    }
}

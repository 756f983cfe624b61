// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit-event mutation operations.

use crate::data_models::NewAuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;
use crate::sqlite::get_last_insert_rowid;
use diesel::prelude::*;
use diesel::SqliteConnection;
use solde_audit::AuditEvent;

/// Inserts an audit event and returns its persisted event ID.
///
/// # Errors
///
/// Returns an error if serialization or the insert fails.
pub fn insert_audit_event(
    conn: &mut SqliteConnection,
    case_id: Option<i64>,
    event: &AuditEvent,
    created_at: &str,
) -> Result<i64, PersistenceError> {
    let row = NewAuditEventRow {
        case_id,
        actor_json: serde_json::to_string(&event.actor)?,
        cause_json: serde_json::to_string(&event.cause)?,
        action_json: serde_json::to_string(&event.action)?,
        before_snapshot_json: serde_json::to_string(&event.before)?,
        after_snapshot_json: serde_json::to_string(&event.after)?,
        created_at: created_at.to_string(),
    };

    diesel::insert_into(audit_events::table)
        .values(&row)
        .execute(conn)?;

    get_last_insert_rowid(conn)
}

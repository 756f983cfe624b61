// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit-event query operations.

use crate::data_models::AuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;
use diesel::SqliteConnection;
use diesel::prelude::*;
use solde_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};

/// Loads the audit timeline for a case, oldest event first.
///
/// # Errors
///
/// Returns an error if the query fails or a persisted event fails to
/// deserialize.
pub fn get_audit_timeline(
    conn: &mut SqliteConnection,
    case_id: i64,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let rows: Vec<AuditEventRow> = audit_events::table
        .filter(audit_events::case_id.eq(case_id))
        .order(audit_events::event_id.asc())
        .load::<AuditEventRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("get_audit_timeline: {e}")))?;

    rows.into_iter().map(row_to_event).collect()
}

fn row_to_event(row: AuditEventRow) -> Result<AuditEvent, PersistenceError> {
    let actor: Actor = serde_json::from_str(&row.actor_json)?;
    let cause: Cause = serde_json::from_str(&row.cause_json)?;
    let action: Action = serde_json::from_str(&row.action_json)?;
    let before: StateSnapshot = serde_json::from_str(&row.before_snapshot_json)?;
    let after: StateSnapshot = serde_json::from_str(&row.after_snapshot_json)?;

    Ok(AuditEvent::new(actor, cause, action, before, after).with_event_id(row.event_id))
}

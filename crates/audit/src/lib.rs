// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit types for the termination workflow.
//!
//! Every successful state transition of a termination case produces exactly
//! one audit event, capturing who initiated it, why, what happened, and the
//! case state before and after. Regeneration requests additionally require
//! an operator-supplied reason, enforced at the `Cause` constructor.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use serde::{Deserialize, Serialize};

/// Represents the entity performing an action on a termination case.
///
/// An actor is any identifiable entity that initiates a state change: an
/// operator working a case, the background worker advancing a stage, or the
/// startup scheduler sweeping stale claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g. "operator", "worker", "scheduler").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new operator actor.
    #[must_use]
    pub fn operator(id: &str) -> Self {
        Self {
            id: id.to_string(),
            actor_type: String::from("operator"),
        }
    }

    /// Creates the background-worker actor.
    #[must_use]
    pub fn worker() -> Self {
        Self {
            id: String::from("settlement-worker"),
            actor_type: String::from("worker"),
        }
    }

    /// Creates the maintenance-scheduler actor.
    #[must_use]
    pub fn scheduler() -> Self {
        Self {
            id: String::from("claim-sweeper"),
            actor_type: String::from("scheduler"),
        }
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// A unique identifier for this cause (e.g. request ID, job handle).
    pub id: String,
    /// A description of what triggered the action.
    pub description: String,
}

/// Error returned when a regeneration cause lacks its mandatory reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingReason;

impl std::fmt::Display for MissingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A regeneration request requires a non-empty reason")
    }
}

impl std::error::Error for MissingReason {}

impl Cause {
    /// Creates a new Cause.
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }

    /// Creates the cause for a document-regeneration request.
    ///
    /// The reason is mandatory for auditability: regenerating legal
    /// documents without a recorded reason is not permitted.
    ///
    /// # Errors
    ///
    /// Returns `MissingReason` if the reason is empty or whitespace-only.
    pub fn for_regeneration(request_id: &str, reason: &str) -> Result<Self, MissingReason> {
        if reason.trim().is_empty() {
            return Err(MissingReason);
        }
        Ok(Self {
            id: request_id.to_string(),
            description: format!("Document regeneration: {}", reason.trim()),
        })
    }
}

/// Represents the specific action performed on a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The name of the action (e.g. "`RequestProcessing`", "`CompleteCase`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A snapshot of a termination case at a point in time.
///
/// Snapshots are compact key=value summaries (status, progress, step), not
/// full serializations: they exist so an auditor can follow the lifecycle
/// without replaying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// A string representation of the case state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }
}

/// An immutable audit event representing one case transition.
///
/// Audit events are immutable once created and capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - The case state before the transition (before)
/// - The case state after the transition (after)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// The persisted event ID, if the event has been stored.
    pub event_id: Option<i64>,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The case state before the transition.
    pub before: StateSnapshot,
    /// The case state after the transition.
    pub after: StateSnapshot,
}

impl AuditEvent {
    /// Creates a new, not-yet-persisted `AuditEvent`.
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            event_id: None,
            actor,
            cause,
            action,
            before,
            after,
        }
    }

    /// Returns a copy carrying the persisted event ID.
    #[must_use]
    pub fn with_event_id(mut self, event_id: i64) -> Self {
        self.event_id = Some(event_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_actor() {
        let actor: Actor = Actor::operator("ops-7");
        assert_eq!(actor.id, "ops-7");
        assert_eq!(actor.actor_type, "operator");
    }

    #[test]
    fn test_worker_and_scheduler_actors_are_distinct() {
        assert_ne!(Actor::worker(), Actor::scheduler());
        assert_eq!(Actor::worker().actor_type, "worker");
        assert_eq!(Actor::scheduler().actor_type, "scheduler");
    }

    #[test]
    fn test_regeneration_cause_requires_reason() {
        assert_eq!(
            Cause::for_regeneration("req-1", ""),
            Err(MissingReason)
        );
        assert_eq!(
            Cause::for_regeneration("req-1", "   "),
            Err(MissingReason)
        );
    }

    #[test]
    fn test_regeneration_cause_records_reason() {
        let cause: Cause =
            Cause::for_regeneration("req-1", "payslip template corrected").unwrap();
        assert_eq!(cause.id, "req-1");
        assert_eq!(
            cause.description,
            "Document regeneration: payslip template corrected"
        );
    }

    #[test]
    fn test_audit_event_starts_unpersisted() {
        let event: AuditEvent = AuditEvent::new(
            Actor::worker(),
            Cause::new(String::from("job-1"), String::from("Claimed job")),
            Action::new(String::from("ClaimJob"), None),
            StateSnapshot::new(String::from("status=pending")),
            StateSnapshot::new(String::from("status=processing")),
        );
        assert_eq!(event.event_id, None);
        assert_eq!(event.with_event_id(42).event_id, Some(42));
    }

    #[test]
    fn test_audit_event_equality() {
        let make = || {
            AuditEvent::new(
                Actor::operator("ops-1"),
                Cause::new(String::from("req-9"), String::from("Enqueue")),
                Action::new(String::from("RequestProcessing"), None),
                StateSnapshot::new(String::from("status=idle")),
                StateSnapshot::new(String::from("status=pending")),
            )
        };
        assert_eq!(make(), make());
    }
}

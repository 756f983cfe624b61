// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Atomic-claim behavior under duplicate delivery.

use crate::SqlitePersistence;
use crate::tests::{test_actor, test_case, test_cause, test_employee, test_profile, test_tenant};
use solde::{CaseStatus, Command, TransitionResult, apply};
use solde_audit::Actor;

fn enqueued(persistence: &mut SqlitePersistence) -> (i64, TransitionResult) {
    persistence
        .upsert_employee(
            &test_tenant(),
            &test_employee(),
            &test_profile(),
            "2026-03-01T00:00:00Z",
        )
        .unwrap();
    let mut case = test_case();
    let case_id = persistence
        .create_case(&case, "2026-03-31T12:00:00Z")
        .unwrap();
    case.case_id = Some(case_id);

    let pending = apply(
        &case,
        Command::RequestProcessing {
            issuer: String::from("hr-service"),
            pay_date: String::from("2026-04-05"),
            recompute: false,
            requested_at: String::from("2026-03-31T12:01:00Z"),
        },
        test_actor(),
        test_cause(),
    )
    .unwrap();
    persistence
        .persist_transition(&pending, "2026-03-31T12:01:00Z")
        .unwrap();
    (case_id, pending)
}

#[test]
fn test_only_one_claim_wins_under_duplicate_delivery() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let (case_id, pending) = enqueued(&mut persistence);

    // Two workers compute a claim from the same pending snapshot.
    let claim = |at: &str| {
        apply(
            &pending.new_case,
            Command::ClaimJob {
                claimed_at: at.to_string(),
            },
            Actor::worker(),
            test_cause(),
        )
        .unwrap()
    };
    let first = claim("2026-03-31T12:02:00Z");
    let second = claim("2026-03-31T12:02:00Z");

    assert!(
        persistence
            .persist_transition(&first, "2026-03-31T12:02:00Z")
            .unwrap()
    );
    assert!(
        !persistence
            .persist_transition(&second, "2026-03-31T12:02:00Z")
            .unwrap()
    );

    let loaded = persistence.get_case(case_id).unwrap();
    assert_eq!(loaded.status, CaseStatus::Processing);
    // Exactly one ClaimJob audit event exists.
    let claims = persistence
        .get_audit_timeline(case_id)
        .unwrap()
        .into_iter()
        .filter(|e| e.action.name == "ClaimJob")
        .count();
    assert_eq!(claims, 1);
}

#[test]
fn test_pending_listing_feeds_startup_recovery() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let (case_id, _) = enqueued(&mut persistence);

    assert_eq!(
        persistence
            .list_case_ids_with_status(CaseStatus::Pending)
            .unwrap(),
        vec![case_id]
    );
    assert!(
        persistence
            .list_case_ids_with_status(CaseStatus::Processing)
            .unwrap()
            .is_empty()
    );
}

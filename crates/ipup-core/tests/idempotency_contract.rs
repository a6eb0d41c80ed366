//! Cycle Contract: Idempotency
//!
//! The persisted record suppresses redundant publishes:
//!
//! - an address equal to the stored one never reaches the publisher
//! - a first run (no record) always publishes
//! - after a successful publish the record equals the resolved address
//!
//! If these fail, every scheduled tick would hit the destination, or changed
//! addresses would never be announced.

mod common;

use common::*;
use ipup_core::{CycleController, CycleEvent, CycleOutcome};

#[tokio::test]
async fn unchanged_address_makes_no_publish_call() {
    // State has 203.0.113.5, resolver returns 203.0.113.5 → no publish,
    // state unchanged

    let resolver = ScriptedResolver::returning("203.0.113.5");
    let publisher = MockPublisher::acknowledging();
    let store = MockStateStore::with_record("203.0.113.5");

    let (controller, _events) = CycleController::new(
        Box::new(resolver.clone()),
        Box::new(publisher.clone()),
        Box::new(store.clone()),
        &fast_cycle(3),
    )
    .expect("controller construction succeeds");

    let outcome = controller.run_once().await.expect("cycle reaches DONE");

    assert_eq!(
        outcome,
        CycleOutcome::Unchanged {
            ip: ip("203.0.113.5")
        }
    );
    assert_eq!(resolver.call_count(), 1);
    assert_eq!(publisher.call_count(), 0, "publisher must not be invoked");
    assert_eq!(store.save_count(), 0, "state must not be rewritten");
    assert_eq!(store.last_ip(), Some(ip("203.0.113.5")));
}

#[tokio::test]
async fn first_run_publishes_and_persists() {
    // No prior record, resolver returns 203.0.113.5 → publish once, then
    // persist 203.0.113.5

    let resolver = ScriptedResolver::returning("203.0.113.5");
    let publisher = MockPublisher::acknowledging();
    let store = MockStateStore::empty();

    let (controller, _events) = CycleController::new(
        Box::new(resolver),
        Box::new(publisher.clone()),
        Box::new(store.clone()),
        &fast_cycle(3),
    )
    .expect("controller construction succeeds");

    let outcome = controller.run_once().await.expect("cycle reaches DONE");

    assert_eq!(
        outcome,
        CycleOutcome::Published {
            ip: ip("203.0.113.5"),
            previous_ip: None,
        }
    );
    assert_eq!(publisher.call_count(), 1);
    assert_eq!(publisher.published(), vec![ip("203.0.113.5")]);
    assert_eq!(store.last_ip(), Some(ip("203.0.113.5")));
}

#[tokio::test]
async fn changed_address_publishes_exactly_once_and_updates_record() {
    let resolver = ScriptedResolver::returning("203.0.113.9");
    let publisher = MockPublisher::acknowledging();
    let store = MockStateStore::with_record("203.0.113.5");

    let (controller, _events) = CycleController::new(
        Box::new(resolver),
        Box::new(publisher.clone()),
        Box::new(store.clone()),
        &fast_cycle(3),
    )
    .expect("controller construction succeeds");

    let outcome = controller.run_once().await.expect("cycle reaches DONE");

    assert_eq!(
        outcome,
        CycleOutcome::Published {
            ip: ip("203.0.113.9"),
            previous_ip: Some(ip("203.0.113.5")),
        }
    );
    assert_eq!(publisher.call_count(), 1);
    assert_eq!(store.last_ip(), Some(ip("203.0.113.9")));
}

#[tokio::test]
async fn repeat_cycle_after_success_is_a_no_op() {
    // Two consecutive cycles over the same store: the second must short-circuit

    let store = MockStateStore::empty();

    for (run, expected_publishes) in [(1usize, 1usize), (2, 0)] {
        let publisher = MockPublisher::acknowledging();
        let (controller, _events) = CycleController::new(
            Box::new(ScriptedResolver::returning("198.51.100.7")),
            Box::new(publisher.clone()),
            Box::new(store.clone()),
            &fast_cycle(3),
        )
        .expect("controller construction succeeds");

        controller.run_once().await.expect("cycle reaches DONE");

        assert_eq!(publisher.call_count(), expected_publishes, "run {run}");
    }

    assert_eq!(store.save_count(), 1, "only the first cycle persists");
}

#[tokio::test]
async fn force_publishes_even_when_unchanged() {
    let mut config = fast_cycle(3);
    config.force = true;

    let publisher = MockPublisher::answering(vec![PublishScript::AckWith("req-42")]);
    let store = MockStateStore::with_record("203.0.113.5");

    let (controller, mut events) = CycleController::new(
        Box::new(ScriptedResolver::returning("203.0.113.5")),
        Box::new(publisher.clone()),
        Box::new(store.clone()),
        &config,
    )
    .expect("controller construction succeeds");

    let outcome = controller.run_once().await.expect("cycle reaches DONE");

    assert!(matches!(outcome, CycleOutcome::Published { .. }));
    assert_eq!(publisher.call_count(), 1);

    // The receipt's confirmation travels through the event stream
    let mut saw_confirmation = false;
    while let Ok(event) = events.try_recv() {
        if let CycleEvent::Published { confirmation, .. } = event {
            assert_eq!(confirmation.as_deref(), Some("req-42"));
            saw_confirmation = true;
        }
    }
    assert!(saw_confirmation, "expected a Published event");
}

use std::{sync::Arc, thread};

use serde_json::json;
use shared::domain::{CounterAction, CounterState};

use super::CounterStore;

#[test]
fn snapshot_is_a_copy() {
    let store = CounterStore::default();
    let mut taken = store.snapshot();
    taken.successes = 99;
    assert_eq!(store.snapshot().successes, 0);
}

#[test]
fn replace_is_idempotent() {
    let store = CounterStore::default();
    let next = CounterState {
        successes: 7,
        label: "Wipes:".into(),
        ..CounterState::default()
    };
    store.replace(next.clone());
    let once = store.snapshot();
    store.replace(next);
    assert_eq!(store.snapshot(), once);
}

#[test]
fn replace_overwrites_the_whole_object() {
    let store = CounterStore::default();
    store.apply_action(&CounterAction::SetLabel("Clutches:".into()));
    // the incoming state never saw that label edit; last writer wins
    store.replace(CounterState {
        successes: 3,
        ..CounterState::default()
    });
    let state = store.snapshot();
    assert_eq!(state.successes, 3);
    assert_eq!(state.label, CounterState::default().label);
}

#[test]
fn apply_action_routes_through_the_mutation_engine() {
    let store = CounterStore::default();
    store.apply_action(&CounterAction::IncrementSuccess);
    store.apply_action(&CounterAction::IncrementSuccess);
    store.apply_action(&CounterAction::DecrementAttempt);
    let state = store.snapshot();
    assert_eq!((state.successes, state.attempts), (2, 1));
}

#[test]
fn merge_keeps_unspecified_fields() {
    let store = CounterStore::default();
    store.apply_action(&CounterAction::IncrementSuccess);
    let merged = store.merge(&json!({ "label": "Dodges:" }));
    assert_eq!(merged.label, "Dodges:");
    assert_eq!(merged.successes, 1);
    assert_eq!(store.snapshot(), merged);
}

#[test]
fn concurrent_increments_are_never_lost() {
    let store = Arc::new(CounterStore::default());
    let workers: Vec<_> = (0..2)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..1000 {
                    store.apply_action(&CounterAction::IncrementSuccess);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker");
    }
    let state = store.snapshot();
    assert_eq!(state.successes, 2000);
    // tracking is on by default, so every success also counted an attempt
    assert_eq!(state.attempts, 2000);
}

#[test]
fn merges_interleaved_with_actions_touch_only_their_keys() {
    let store = Arc::new(CounterStore::default());
    let counter = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for _ in 0..500 {
                store.apply_action(&CounterAction::IncrementSuccess);
            }
        })
    };
    let controller = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for pick in 0..500 {
                let label = if pick % 2 == 0 { "Wipes:" } else { "Clutches:" };
                store.merge(&json!({ "label": label }));
            }
        })
    };
    counter.join().expect("counter");
    controller.join().expect("controller");

    let state = store.snapshot();
    assert_eq!(state.successes, 500);
    assert_eq!(state.label, "Clutches:");
}

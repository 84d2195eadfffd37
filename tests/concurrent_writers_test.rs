//! Concurrent hook invocations against one state directory
//!
//! Hooks fire independently, so several processes may record events at the
//! same moment. Each thread here uses its own `StateStore` handle, the same
//! way separate processes would.

mod common;

use common::{create_test_store, t0};
use guardian_core::learning::{AcceptanceStats, FeedbackLedger, RejectionHistory};
use guardian_core::session::{record_event, SessionEvent};
use guardian_core::{SessionMetrics, StateStore};
use std::thread;

#[test]
fn test_concurrent_events_are_all_recorded() {
    let (_temp, store) = create_test_store();
    let dir = store.dir().to_path_buf();

    let handles: Vec<_> = (0..6)
        .map(|worker| {
            let dir = dir.clone();
            thread::spawn(move || {
                let store = StateStore::new(dir);
                for i in 0..20 {
                    let event = match i % 3 {
                        0 => SessionEvent::CodeWritten {
                            file: format!("src/worker_{}.rs", worker),
                            lines: 1,
                        },
                        1 => SessionEvent::Error {
                            message: format!("worker {} failed", worker),
                        },
                        _ => SessionEvent::FileEdit {
                            file: "src/shared.rs".to_string(),
                        },
                    };
                    let outcome = record_event(&store, &event, None, t0());
                    assert!(outcome.event_recorded);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let metrics = store.load::<SessionMetrics>();
    // Per worker: i % 3 == 0 for 7 of 20, == 1 for 7, == 2 for 6
    assert_eq!(metrics.total_lines_written(), 6 * 7);
    assert_eq!(metrics.total_errors(), 6 * 7);
    assert_eq!(metrics.file_edits["src/shared.rs"].count, 6 * 6);
    assert_eq!(metrics.code_written.len(), 6);
}

#[test]
fn test_concurrent_feedback_counts_are_exact() {
    let (_temp, store) = create_test_store();
    let dir = store.dir().to_path_buf();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let dir = dir.clone();
            thread::spawn(move || {
                let ledger = FeedbackLedger::new(StateStore::new(dir));
                for i in 0..25 {
                    let accepted = (worker + i) % 2 == 0;
                    ledger.record_feedback("security", accepted).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = store.load::<AcceptanceStats>();
    assert_eq!(stats.overall.total(), 100);
    assert_eq!(stats.by_category["security"].total(), 100);
    assert_eq!(
        stats.overall.accepted + stats.overall.rejected,
        stats.by_category["security"].accepted + stats.by_category["security"].rejected
    );
}

#[test]
fn test_concurrent_rejections_respect_cap() {
    let (_temp, store) = create_test_store();
    let dir = store.dir().to_path_buf();

    let handles: Vec<_> = (0..5)
        .map(|worker| {
            let dir = dir.clone();
            thread::spawn(move || {
                let ledger = FeedbackLedger::new(StateStore::new(dir));
                for i in 0..30 {
                    ledger
                        .record_rejection(
                            &format!("suggestion {} from {}", i, worker),
                            "not now",
                            "style",
                            t0(),
                        )
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let history = store.load::<RejectionHistory>();
    assert_eq!(history.len(), 100);
}

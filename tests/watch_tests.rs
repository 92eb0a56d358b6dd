use edit_anchor::watch::{
    scheduler::{Coalescer, Interval},
    watcher::{MutationKind, MutationRecord, MutationWatcher, PassTrigger},
};

// =========================================================================
// Timer primitives
// =========================================================================

#[test]
fn bursts_collapse_into_one_run() {
    let mut c = Coalescer::new(500);
    c.schedule(0, "a");
    c.schedule(300, "b");
    assert_eq!(c.poll(700), None);
    assert_eq!(c.due_at(), Some(800));
    assert_eq!(c.poll(800), Some("b"));
    assert_eq!(c.poll(2000), None);
}

#[test]
fn cancel_only_hits_latest_handle() {
    let mut c = Coalescer::new(100);
    let first = c.schedule(0, 1);
    let second = c.schedule(10, 2);
    assert!(!c.cancel(first));
    assert!(c.cancel(second));
    assert!(!c.is_pending());
}

#[test]
fn interval_skips_missed_periods() {
    let mut i = Interval::new(10_000, 0);
    assert!(!i.poll(9_999));
    assert!(i.poll(10_000));
    assert!(!i.poll(15_000));
    assert!(i.poll(45_000));
    assert!(!i.poll(49_999));
    assert!(i.poll(50_000));
}

// =========================================================================
// Mutation watcher
// =========================================================================

#[test]
fn attribute_noise_is_ignored() {
    let mut w = MutationWatcher::default();
    let noise = [
        MutationRecord {
            kind: MutationKind::Attributes,
            added_nodes: 0,
            removed_nodes: 0,
        },
        MutationRecord::child_list(0, 0),
    ];
    assert!(w.observe(0, &noise).is_none());
    assert!(!w.has_pending_mutation_pass());
}

#[test]
fn debounced_pass_fires_after_quiet_window() {
    let mut w = MutationWatcher::new(500, 10_000, 0);
    w.observe(100, &[MutationRecord::child_list(1, 0)]);
    w.observe(400, &[MutationRecord::child_list(0, 2)]);
    assert_eq!(w.due(800, true), None);
    assert_eq!(w.due(900, true), Some(PassTrigger::Mutation));
    assert_eq!(w.due(901, true), None);
}

#[test]
fn cancelled_mutation_pass_never_fires() {
    let mut w = MutationWatcher::new(500, 10_000, 0);
    let handle = w.observe(100, &[MutationRecord::child_list(1, 0)]).unwrap();
    assert!(w.cancel(handle));
    assert_eq!(w.due(5_000, true), None);
}

#[test]
fn periodic_pass_skipped_while_hidden() {
    let mut w = MutationWatcher::new(500, 10_000, 0);
    assert_eq!(w.due(10_000, false), None);
    assert_eq!(w.due(20_000, true), Some(PassTrigger::Periodic));
}

#[test]
fn busy_flag_blocks_overlap() {
    let mut w = MutationWatcher::new(500, 10_000, 0);
    assert!(w.begin_pass());
    assert!(!w.begin_pass());
    w.observe(0, &[MutationRecord::child_list(1, 0)]);
    assert_eq!(w.due(600, true), None);
    w.end_pass();
    assert_eq!(w.due(600, true), Some(PassTrigger::Mutation));
}

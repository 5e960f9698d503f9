//! Tests for termination conditions.

use std::sync::atomic::Ordering;
use std::time::Duration;

use super::*;
use crate::pool::WorkerPool;
use craftforge_test::training;

#[test]
fn test_time_termination() {
    let ctx = training::context();
    let pool = WorkerPool::sequential();
    let scope = SearchScope::new(&ctx, &pool);

    assert!(!TimeTermination::seconds(3600).is_terminated(&scope));
    assert!(TimeTermination::new(Duration::ZERO).is_terminated(&scope));
    assert_eq!(TimeTermination::millis(1500).limit(), Duration::from_millis(1500));
}

#[test]
fn test_node_count_termination() {
    let ctx = training::context();
    let pool = WorkerPool::sequential();
    let scope = SearchScope::new(&ctx, &pool);
    let term = NodeCountTermination::new(10);

    scope.statistics().record_simulated(9);
    assert!(!term.is_terminated(&scope));
    scope.statistics().record_simulated(1);
    assert!(term.is_terminated(&scope));
}

#[test]
fn test_external_termination() {
    let ctx = training::context();
    let pool = WorkerPool::sequential();
    let scope = SearchScope::new(&ctx, &pool);
    let (flag, term) = ExternalTermination::with_new_flag();

    assert!(!term.is_terminated(&scope));
    flag.store(true, Ordering::SeqCst);
    assert!(term.is_terminated(&scope));
}

#[test]
fn test_scope_latches_termination() {
    let ctx = training::context();
    let pool = WorkerPool::sequential();
    let (flag, external) = ExternalTermination::with_new_flag();
    let terminations: Vec<Box<dyn Termination>> = vec![Box::new(external)];
    let scope = SearchScope::new(&ctx, &pool).with_terminations(&terminations);

    assert!(!scope.should_terminate());
    flag.store(true, Ordering::SeqCst);
    assert!(scope.should_terminate());
    flag.store(false, Ordering::SeqCst);
    assert!(scope.should_terminate());
}

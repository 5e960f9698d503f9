//! Tests for the search scope.

use std::sync::Mutex;

use rand::Rng;

use super::*;
use craftforge_core::simulate_sequence;
use craftforge_core::standard::*;
use craftforge_test::training;

fn replay(ctx: &CraftContext, actions: &[ActionId]) -> CraftState {
    simulate_sequence(ctx, actions).unwrap()
}

#[test]
fn test_offer_rejects_incomplete() {
    let ctx = training::context();
    let pool = WorkerPool::sequential();
    let scope = SearchScope::new(&ctx, &pool);

    let partial = [BASIC_TOUCH];
    let outcome = scope.offer(&partial, &replay(&ctx, &partial), 0.5);
    assert_eq!(outcome, OfferOutcome::Rejected);
    assert!(scope.best().is_none());
}

#[test]
fn test_offer_rejects_negative_score() {
    let ctx = training::context();
    let pool = WorkerPool::sequential();
    let scope = SearchScope::new(&ctx, &pool);

    let sequence = training::perfect_sequence();
    let outcome = scope.offer(&sequence, &replay(&ctx, &sequence), -1.0);
    assert!(!outcome.is_valid());
}

#[test]
fn test_offer_keeps_the_best() {
    let ctx = training::context();
    let pool = WorkerPool::sequential();
    let scope = SearchScope::new(&ctx, &pool);

    let plain = [BASIC_SYNTHESIS, BASIC_SYNTHESIS];
    assert!(scope.offer(&plain, &replay(&ctx, &plain), 0.4).is_improvement());
    assert!(!scope.is_perfect_found());

    let perfect = training::perfect_sequence();
    assert!(scope.offer(&perfect, &replay(&ctx, &perfect), 0.9).is_improvement());
    assert!(scope.is_perfect_found());

    assert_eq!(scope.offer(&plain, &replay(&ctx, &plain), 0.4), OfferOutcome::NotBetter);
    assert_eq!(scope.best().unwrap().actions, perfect);
    assert_eq!(scope.statistics().improvements(), 2);
}

#[test]
fn test_ties_prefer_shorter_then_smaller() {
    let ctx = training::context();
    let pool = WorkerPool::sequential();
    let scope = SearchScope::new(&ctx, &pool);

    let long = [BASIC_TOUCH, BASIC_SYNTHESIS, BASIC_SYNTHESIS];
    let short = [BASIC_SYNTHESIS, BASIC_SYNTHESIS];
    scope.offer(&long, &replay(&ctx, &long), 0.5);
    assert!(scope.offer(&short, &replay(&ctx, &short), 0.5).is_improvement());

    let a = ScoredSequence::new(vec![BASIC_SYNTHESIS], replay(&ctx, &short), 0.5);
    let b = ScoredSequence::new(vec![BASIC_TOUCH], replay(&ctx, &short), 0.5);
    assert!(a.beats(&b));
    assert!(!b.beats(&a));
}

#[test]
fn test_improvements_reach_channel_and_sink() {
    let ctx = training::context();
    let pool = WorkerPool::sequential();
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let lines = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&lines);
    let sink: LogSink = Arc::new(move |line: &str| {
        captured.lock().unwrap().push(line.to_string());
    });

    let scope = SearchScope::new(&ctx, &pool)
        .with_sender(Some(&sender))
        .with_sink(Some(&sink));
    let perfect = training::perfect_sequence();
    scope.offer(&perfect, &replay(&ctx, &perfect), 0.9);

    let improvement = receiver.try_recv().unwrap();
    assert_eq!(improvement.actions, perfect);
    assert!(improvement.perfect);
    assert!(receiver.try_recv().is_err());

    let lines = lines.lock().unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("perfect"));
}

#[test]
fn test_rng_streams_are_deterministic() {
    let ctx = training::context();
    let pool = WorkerPool::sequential();
    let scope = SearchScope::new(&ctx, &pool).with_seed(Some(42));
    assert_eq!(scope.seed(), 42);

    let a: u64 = scope.rng(3).random();
    let b: u64 = scope.rng(3).random();
    let c: u64 = scope.rng(4).random();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_scope_without_terminations_runs() {
    let ctx = training::context();
    let pool = WorkerPool::sequential();
    let scope = SearchScope::new(&ctx, &pool);
    assert!(!scope.should_terminate());
}

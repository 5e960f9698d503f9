//! Tests for craft state and its compact key.

use proptest::prelude::*;

use super::*;
use crate::action::ActionId;

fn assert_same_fields(a: &CraftState, b: &CraftState) {
    assert_eq!(a.step, b.step);
    assert_eq!(a.progress, b.progress);
    assert_eq!(a.quality, b.quality);
    assert_eq!(a.durability, b.durability);
    assert_eq!(a.cp, b.cp);
    assert_eq!(a.stacks, b.stacks);
    assert_eq!(a.last_action, b.last_action);
    assert_eq!(a.prev_action, b.prev_action);
    for i in 0..MAX_ACTIONS {
        assert_eq!(a.timers[i].remaining, b.timers[i].remaining, "timer {i}");
    }
}

#[test]
fn test_key_round_trip_fixed_state() {
    let mut state = CraftState::new(150, 55, 321);
    state.step = 7;
    state.progress = 1234;
    state.stacks = 10;
    state.last_action = Some(ActionId(31));
    state.prev_action = Some(ActionId(0));
    state.timers[4].remaining = 15;
    state.timers[16].remaining = 3;
    state.timers[31].remaining = 1;

    let decoded = state.key().decode();
    assert_same_fields(&state, &decoded);
    assert_eq!(decoded.key(), state.key());
}

#[test]
fn test_keys_differ_by_timer() {
    let a = CraftState::new(0, 80, 500);
    let mut b = a.clone();
    b.timers[5].remaining = 2;
    assert_ne!(a.key(), b.key());
}

#[test]
fn test_waste_tally() {
    let mut tally = WasteTally::default();
    assert!(tally.is_empty());
    tally.record(WasteCause::RestoreOverflow);
    tally.record(WasteCause::RestoreOverflow);
    tally.record(WasteCause::QualityOverCap);
    assert_eq!(tally.count(WasteCause::RestoreOverflow), 2);
    assert_eq!(tally.count(WasteCause::FinisherWithoutStacks), 0);
    assert_eq!(tally.total(), 3);
}

#[test]
fn test_active_buffs() {
    let mut state = CraftState::new(0, 80, 500);
    state.timers[3].remaining = 2;
    state.timers[9].remaining = 1;
    let active: Vec<_> = state.active_buffs().collect();
    assert_eq!(active, vec![(ActionId(3), 2), (ActionId(9), 1)]);
}

fn arb_action() -> impl Strategy<Value = Option<ActionId>> {
    prop::option::of((0u8..32).prop_map(ActionId))
}

proptest! {
    #[test]
    fn prop_key_round_trip(
        progress in 0i32..(1 << 24),
        quality in 0i32..(1 << 24),
        durability in 0i32..(1 << 16),
        cp in 0i32..(1 << 16),
        step in 0u32..(1 << 16),
        stacks in 0u8..=MAX_STACKS,
        last in arb_action(),
        prev in arb_action(),
        timers in prop::array::uniform32(0u8..16),
    ) {
        let mut state = CraftState::new(quality, durability, cp);
        state.progress = progress;
        state.step = step;
        state.stacks = stacks;
        state.last_action = last;
        state.prev_action = prev;
        for (slot, remaining) in state.timers.iter_mut().zip(timers) {
            slot.remaining = remaining;
        }

        let decoded = StateKey::encode(&state).decode();
        prop_assert_eq!(decoded.progress, progress);
        prop_assert_eq!(decoded.quality, quality);
        prop_assert_eq!(decoded.durability, durability);
        prop_assert_eq!(decoded.cp, cp);
        prop_assert_eq!(decoded.step, step);
        prop_assert_eq!(decoded.stacks, stacks);
        prop_assert_eq!(decoded.last_action, last);
        prop_assert_eq!(decoded.prev_action, prev);
        for i in 0..MAX_ACTIONS {
            prop_assert_eq!(decoded.timers[i].remaining, timers[i]);
        }
    }
}

//! Built-in action table.
//!
//! Ids are dense and stable; the constants below name them so fixtures and
//! tests can refer to actions without string lookups.

use super::{ActionDescriptor, ActionEffect, ActionId};

pub const BASIC_SYNTHESIS: ActionId = ActionId(0);
pub const BASIC_TOUCH: ActionId = ActionId(1);
pub const MASTERS_MEND: ActionId = ActionId(2);
pub const OBSERVE: ActionId = ActionId(3);
pub const WASTE_NOT: ActionId = ActionId(4);
pub const VENERATION: ActionId = ActionId(5);
pub const STANDARD_TOUCH: ActionId = ActionId(6);
pub const GREAT_STRIDES: ActionId = ActionId(7);
pub const INNOVATION: ActionId = ActionId(8);
pub const WASTE_NOT_II: ActionId = ActionId(9);
pub const BYREGOTS_BLESSING: ActionId = ActionId(10);
pub const MUSCLE_MEMORY: ActionId = ActionId(11);
pub const CAREFUL_SYNTHESIS: ActionId = ActionId(12);
pub const MANIPULATION: ActionId = ActionId(13);
pub const PRUDENT_TOUCH: ActionId = ActionId(14);
pub const FOCUSED_SYNTHESIS: ActionId = ActionId(15);
pub const FOCUSED_TOUCH: ActionId = ActionId(16);
pub const REFLECT: ActionId = ActionId(17);
pub const PREPARATORY_TOUCH: ActionId = ActionId(18);
pub const GROUNDWORK: ActionId = ActionId(19);
pub const DELICATE_SYNTHESIS: ActionId = ActionId(20);
pub const TRAINED_EYE: ActionId = ActionId(21);
pub const ADVANCED_TOUCH: ActionId = ActionId(22);
pub const PRUDENT_SYNTHESIS: ActionId = ActionId(23);
pub const TRAINED_FINESSE: ActionId = ActionId(24);
pub const TRAINED_PERFECTION: ActionId = ActionId(25);

pub(super) fn descriptors() -> Vec<ActionDescriptor> {
    use ActionEffect::*;

    vec![
        ActionDescriptor::new(0, "Basic Synthesis", 1, 0)
            .with_durability(10)
            .with_progress(1.2),
        ActionDescriptor::new(1, "Basic Touch", 5, 18)
            .with_durability(10)
            .with_quality(1.0),
        ActionDescriptor::new(2, "Master's Mend", 7, 88).with_effect(RestoreDurability(30)),
        ActionDescriptor::new(3, "Observe", 13, 7).with_effect(Observe),
        ActionDescriptor::new(4, "Waste Not", 15, 56)
            .count_down(4)
            .with_effect(ConserveDurability),
        ActionDescriptor::new(5, "Veneration", 15, 18)
            .count_down(4)
            .with_effect(ProgressBoost),
        ActionDescriptor::new(6, "Standard Touch", 18, 32)
            .with_durability(10)
            .with_quality(1.25)
            .with_combo(&[BASIC_TOUCH], 18),
        ActionDescriptor::new(7, "Great Strides", 21, 32)
            .count_down(3)
            .with_effect(DoubleQualityNext),
        ActionDescriptor::new(8, "Innovation", 26, 18)
            .count_down(4)
            .with_effect(QualityBoost),
        ActionDescriptor::new(9, "Waste Not II", 47, 98)
            .count_down(8)
            .with_effect(ConserveDurability),
        ActionDescriptor::new(10, "Byregot's Blessing", 50, 24)
            .with_durability(10)
            .with_quality(1.0)
            .with_effect(StackFinisher),
        ActionDescriptor::new(11, "Muscle Memory", 54, 6)
            .with_durability(10)
            .with_progress(3.0)
            .count_down(5)
            .with_effect(DoubleProgressNext)
            .first_turn_only(),
        ActionDescriptor::new(12, "Careful Synthesis", 62, 7)
            .with_durability(10)
            .with_progress(1.8),
        ActionDescriptor::new(13, "Manipulation", 65, 96)
            .count_down(8)
            .with_effect(Regenerate(5))
            .renewable(),
        ActionDescriptor::new(14, "Prudent Touch", 66, 25)
            .with_durability(5)
            .with_quality(1.0)
            .blocked_by_conserve(),
        ActionDescriptor::new(15, "Focused Synthesis", 67, 5)
            .with_durability(10)
            .with_progress(2.0)
            .with_success_rate(0.5)
            .requires_observe(),
        ActionDescriptor::new(16, "Focused Touch", 68, 18)
            .with_durability(10)
            .with_quality(1.5)
            .with_success_rate(0.5)
            .requires_observe(),
        ActionDescriptor::new(17, "Reflect", 69, 6)
            .with_durability(10)
            .with_quality(1.0)
            .with_effect(StackSeed(2))
            .first_turn_only(),
        ActionDescriptor::new(18, "Preparatory Touch", 71, 40)
            .with_durability(20)
            .with_quality(2.0)
            .with_effect(StackBuilder(2)),
        ActionDescriptor::new(19, "Groundwork", 72, 18)
            .with_durability(20)
            .with_progress(3.6)
            .weak_at_low_durability(),
        ActionDescriptor::new(20, "Delicate Synthesis", 76, 32)
            .with_durability(10)
            .with_progress(1.0)
            .with_quality(1.0),
        ActionDescriptor::new(21, "Trained Eye", 80, 250)
            .with_durability(10)
            .with_effect(MaxQuality)
            .first_turn_only()
            .requires_mastery(),
        ActionDescriptor::new(22, "Advanced Touch", 84, 46)
            .with_durability(10)
            .with_quality(1.5)
            .with_combo(&[BASIC_TOUCH, STANDARD_TOUCH], 18),
        ActionDescriptor::new(23, "Prudent Synthesis", 88, 18)
            .with_durability(5)
            .with_progress(1.8)
            .blocked_by_conserve(),
        ActionDescriptor::new(24, "Trained Finesse", 90, 32)
            .with_quality(1.0)
            .with_min_stacks(10),
        ActionDescriptor::new(25, "Trained Perfection", 100, 0)
            .count_down(10)
            .with_effect(NoDurabilityCost),
    ]
}

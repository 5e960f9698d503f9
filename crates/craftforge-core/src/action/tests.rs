//! Tests for action descriptors and catalog validation.

use super::standard::*;
use super::*;
use crate::error::CraftError;

#[test]
fn test_standard_catalog_validates() {
    let actions = standard::descriptors();
    let count = actions.len();
    let catalog = ActionCatalog::new(actions).unwrap();
    assert_eq!(catalog.len(), count);
    assert!(catalog.len() <= MAX_ACTIONS);
}

#[test]
fn test_lookup_by_name_ignores_case_and_punctuation() {
    let catalog = ActionCatalog::standard();
    assert_eq!(catalog.by_name("basic synthesis").unwrap().id, BASIC_SYNTHESIS);
    assert_eq!(catalog.by_name("MastersMend").unwrap().id, MASTERS_MEND);
    assert_eq!(catalog.by_name("byregots_blessing").unwrap().id, BYREGOTS_BLESSING);
    assert!(catalog.by_name("Hasty Touch").is_none());
}

#[test]
fn test_resolve_names_reports_unknown() {
    let catalog = ActionCatalog::standard();
    let err = catalog.resolve_names(&["Observe", "Rapid Synthesis"]).unwrap_err();
    assert_eq!(err, CraftError::UnknownAction("Rapid Synthesis".to_string()));
}

#[test]
fn test_rejects_non_dense_ids() {
    let actions = vec![
        ActionDescriptor::new(0, "A", 1, 0),
        ActionDescriptor::new(2, "B", 1, 0),
    ];
    assert!(matches!(
        ActionCatalog::new(actions),
        Err(CraftError::DuplicateAction { id: 2, expected: 1 })
    ));
}

#[test]
fn test_rejects_zero_length_count_down() {
    let actions = vec![ActionDescriptor::new(0, "Stuck", 1, 0).count_down(0)];
    assert!(matches!(
        ActionCatalog::new(actions),
        Err(CraftError::InvalidTiming { .. })
    ));
}

#[test]
fn test_rejects_overlong_count_down() {
    let actions = vec![ActionDescriptor::new(0, "Forever", 1, 0).count_down(MAX_ACTIVE_TURNS + 1)];
    assert!(ActionCatalog::new(actions).is_err());
}

#[test]
fn test_rejects_combo_on_unknown_action() {
    let actions = vec![ActionDescriptor::new(0, "Follow", 1, 10).with_combo(&[ActionId(7)], 5)];
    assert!(matches!(
        ActionCatalog::new(actions),
        Err(CraftError::InvalidCombo { id: 7, .. })
    ));
}

#[test]
fn test_rejects_oversized_catalog() {
    let actions = (0..=MAX_ACTIONS as u8)
        .map(|i| ActionDescriptor::new(i, format!("A{i}"), 1, 0))
        .collect();
    assert!(matches!(
        ActionCatalog::new(actions),
        Err(CraftError::TooManyActions { .. })
    ));
}

#[test]
fn test_timing_class_parsing() {
    assert_eq!("count-down".parse::<TimingClass>().unwrap(), TimingClass::CountDown);
    assert_eq!("CountUp".parse::<TimingClass>().unwrap(), TimingClass::CountUp);
    assert_eq!("instant".parse::<TimingClass>().unwrap(), TimingClass::Instant);
    assert_eq!(
        "sometimes".parse::<TimingClass>(),
        Err(CraftError::UnknownTimingClass("sometimes".to_string()))
    );
}

#[test]
fn test_combo_cost() {
    let catalog = ActionCatalog::standard();
    let standard = catalog.get(STANDARD_TOUCH).unwrap();
    assert_eq!(standard.cost_after(None, Some(BASIC_TOUCH)), 18);
    assert_eq!(standard.cost_after(None, Some(OBSERVE)), 32);

    let advanced = catalog.get(ADVANCED_TOUCH).unwrap();
    assert_eq!(advanced.cost_after(Some(BASIC_TOUCH), Some(STANDARD_TOUCH)), 18);
    assert_eq!(advanced.cost_after(Some(OBSERVE), Some(STANDARD_TOUCH)), 46);
}

#[test]
fn test_classification() {
    let catalog = ActionCatalog::standard();
    let get = |id| catalog.get(id).unwrap();

    assert!(get(VENERATION).is_buff());
    assert!(get(VENERATION).is_progress_action());
    assert!(!get(MUSCLE_MEMORY).is_buff());
    assert!(get(INNOVATION).is_quality_action());
    assert!(get(TRAINED_EYE).is_quality_action());
    assert!(get(MANIPULATION).is_durability_action());
    assert!(get(MASTERS_MEND).is_durability_action());
    assert!(get(DELICATE_SYNTHESIS).is_progress_action());
    assert!(!get(DELICATE_SYNTHESIS).is_quality_action());
    assert_eq!(get(PREPARATORY_TOUCH).timing, TimingClass::CountUp);
}

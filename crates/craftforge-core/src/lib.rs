//! CraftForge Core
//!
//! This crate provides the data model and the deterministic simulator:
//! - Action descriptors and the closed action catalog
//! - Actor and recipe profiles, bundled into a [`CraftContext`]
//! - [`CraftState`] with explicit buff timers and its compact [`StateKey`]
//! - The single-step simulator and sequence folds

pub mod action;
pub mod context;
pub mod error;
pub mod profile;
pub mod sim;
pub mod state;

pub use action::{
    standard, ActionCatalog, ActionDescriptor, ActionEffect, ActionId, ComboRule, TimingClass,
    MAX_ACTIONS, MAX_ACTIVE_TURNS,
};
pub use context::CraftContext;
pub use error::{CraftError, Result};
pub use profile::{ActorProfile, RecipeTarget};
pub use sim::{
    simulate, simulate_from, simulate_sequence, simulate_to_failure, FailurePoint, IllegalStep,
    SequenceOutcome,
};
pub use state::{BuffTimer, CraftState, StateKey, WasteCause, WasteTally, MAX_STACKS};

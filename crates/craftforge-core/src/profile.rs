//! Actor and recipe descriptions supplied by the caller.

use crate::action::ActionId;

/// The item being produced and its targets.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecipeTarget {
    pub name: String,
    pub level: u32,
    /// Progress required to complete the craft.
    pub difficulty: i32,
    pub start_quality: i32,
    pub max_quality: i32,
    /// Quality that counts as perfect; defaults to `max_quality`.
    pub quality_target: Option<i32>,
    pub start_durability: i32,
    pub max_durability: i32,
    pub progress_divider: f64,
    pub quality_divider: f64,
    pub progress_modifier: f64,
    pub quality_modifier: f64,
    /// Level margin above the recipe at which mastery actions unlock.
    pub mastery_band: u32,
}

impl RecipeTarget {
    /// A recipe with neutral dividers and modifiers.
    pub fn new(name: impl Into<String>, level: u32, difficulty: i32, max_quality: i32) -> Self {
        Self {
            name: name.into(),
            level,
            difficulty,
            start_quality: 0,
            max_quality,
            quality_target: None,
            start_durability: 80,
            max_durability: 80,
            progress_divider: 50.0,
            quality_divider: 30.0,
            progress_modifier: 100.0,
            quality_modifier: 100.0,
            mastery_band: 10,
        }
    }

    pub fn with_durability(mut self, durability: i32) -> Self {
        self.start_durability = durability;
        self.max_durability = durability;
        self
    }

    pub fn with_quality_target(mut self, target: i32) -> Self {
        self.quality_target = Some(target);
        self
    }

    pub fn with_start_quality(mut self, quality: i32) -> Self {
        self.start_quality = quality;
        self
    }

    pub fn with_dividers(mut self, progress: f64, quality: f64) -> Self {
        self.progress_divider = progress;
        self.quality_divider = quality;
        self
    }

    pub fn with_modifiers(mut self, progress: f64, quality: f64) -> Self {
        self.progress_modifier = progress;
        self.quality_modifier = quality;
        self
    }

    /// Effective quality target.
    pub fn target_quality(&self) -> i32 {
        self.quality_target.unwrap_or(self.max_quality)
    }
}

/// The actor performing the craft.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorProfile {
    pub name: String,
    pub level: u32,
    pub craftsmanship: u32,
    pub control: u32,
    /// CP pool capacity.
    pub cp: i32,
    /// Catalog subset this actor may use.
    pub actions: Vec<ActionId>,
}

impl ActorProfile {
    pub fn new(name: impl Into<String>, level: u32, craftsmanship: u32, control: u32, cp: i32) -> Self {
        Self {
            name: name.into(),
            level,
            craftsmanship,
            control,
            cp,
            actions: Vec::new(),
        }
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = ActionId>) -> Self {
        self.actions = actions.into_iter().collect();
        self
    }
}

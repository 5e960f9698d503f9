//! Problem files: the actor and recipe for one craft.
//!
//! ```
//! use std::sync::Arc;
//! use craftforge_config::ProblemConfig;
//! use craftforge_core::ActionCatalog;
//!
//! let problem = ProblemConfig::from_toml_str(r#"
//!     [actor]
//!     level = 90
//!     craftsmanship = 3000
//!     control = 3000
//!     cp = 500
//!     actions = ["Basic Synthesis", "basic_touch", "Veneration"]
//!
//!     [recipe]
//!     level = 90
//!     difficulty = 3000
//!     max_quality = 8000
//!     durability = 70
//! "#).unwrap();
//!
//! let ctx = problem.into_context(Arc::new(ActionCatalog::standard())).unwrap();
//! assert_eq!(ctx.allowed().len(), 3);
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use craftforge_core::{ActionCatalog, ActorProfile, CraftContext, RecipeTarget};

use crate::ConfigError;

/// Actor and recipe sections of a problem file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ProblemConfig {
    pub actor: ActorConfig,
    pub recipe: RecipeConfig,
}

impl ProblemConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Resolves action names against `catalog` and builds the run context.
    ///
    /// An empty action list grants the whole catalog; level and mastery
    /// gates still apply.
    pub fn into_context(self, catalog: Arc<ActionCatalog>) -> Result<CraftContext, ConfigError> {
        let actor = self.actor.resolve(&catalog)?;
        let recipe = self.recipe.into_target();
        Ok(CraftContext::new(catalog, actor, recipe)?)
    }
}

/// `[actor]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ActorConfig {
    #[serde(default = "default_actor_name")]
    pub name: String,
    pub level: u32,
    pub craftsmanship: u32,
    pub control: u32,
    pub cp: i32,
    /// Action names, matched ignoring case, spaces, underscores and apostrophes.
    #[serde(default)]
    pub actions: Vec<String>,
}

fn default_actor_name() -> String {
    "Crafter".to_string()
}

impl ActorConfig {
    pub fn resolve(&self, catalog: &ActionCatalog) -> Result<ActorProfile, ConfigError> {
        let actions = if self.actions.is_empty() {
            catalog.iter().map(|a| a.id).collect()
        } else {
            catalog.resolve_names(&self.actions)?
        };
        Ok(
            ActorProfile::new(&self.name, self.level, self.craftsmanship, self.control, self.cp)
                .with_actions(actions),
        )
    }
}

/// `[recipe]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RecipeConfig {
    #[serde(default = "default_recipe_name")]
    pub name: String,
    pub level: u32,
    pub difficulty: i32,
    pub max_quality: i32,
    /// Starting and maximum durability.
    pub durability: i32,
    #[serde(default)]
    pub start_quality: i32,
    pub quality_target: Option<i32>,
    pub progress_divider: Option<f64>,
    pub quality_divider: Option<f64>,
    pub progress_modifier: Option<f64>,
    pub quality_modifier: Option<f64>,
    pub mastery_band: Option<u32>,
}

fn default_recipe_name() -> String {
    "Recipe".to_string()
}

impl RecipeConfig {
    pub fn into_target(self) -> RecipeTarget {
        let mut recipe = RecipeTarget::new(self.name, self.level, self.difficulty, self.max_quality)
            .with_durability(self.durability)
            .with_start_quality(self.start_quality);
        if let Some(target) = self.quality_target {
            recipe = recipe.with_quality_target(target);
        }
        if let Some(divider) = self.progress_divider {
            recipe.progress_divider = divider;
        }
        if let Some(divider) = self.quality_divider {
            recipe.quality_divider = divider;
        }
        if let Some(modifier) = self.progress_modifier {
            recipe.progress_modifier = modifier;
        }
        if let Some(modifier) = self.quality_modifier {
            recipe.quality_modifier = modifier;
        }
        if let Some(band) = self.mastery_band {
            recipe.mastery_band = band;
        }
        recipe
    }
}

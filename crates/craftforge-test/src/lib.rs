//! Shared test fixtures for CraftForge crates.
//!
//! This crate provides ready-made actors, recipes and contexts for testing.
//! It depends on `craftforge-core` only, so every other crate can use it as
//! a dev-dependency without cycles.
//!
//! - [`training`] - a tiny craft with a known four-step perfect solution
//! - [`veteran`] - a high-level actor with the full catalog and a tight recipe
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! craftforge-test = { workspace = true }
//! ```
//!
//! ```
//! use craftforge_test::training;
//!
//! let ctx = training::context();
//! assert!(ctx.is_perfect(&craftforge_core::simulate_sequence(&ctx, &training::perfect_sequence()).unwrap()));
//! ```

pub mod training;
pub mod veteran;

use std::sync::Arc;

use craftforge_core::ActionCatalog;

/// The built-in catalog behind a shared handle.
pub fn catalog() -> Arc<ActionCatalog> {
    Arc::new(ActionCatalog::standard())
}

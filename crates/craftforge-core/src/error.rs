//! Error types for CraftForge

use thiserror::Error;

/// Fatal errors raised while validating catalogs, profiles and recipes.
///
/// These indicate malformed input data, never a normal search outcome.
/// Illegal steps during simulation are reported separately by
/// [`IllegalStep`](crate::sim::IllegalStep).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CraftError {
    /// Two descriptors share an id, or ids are not dense from zero.
    #[error("Action id {id} is duplicated or out of order (expected {expected})")]
    DuplicateAction { id: u8, expected: u8 },

    /// A name or id does not resolve to a catalog entry.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// A count-down action declares an unusable duration.
    #[error("Action {name} declares invalid timing: {reason}")]
    InvalidTiming { name: String, reason: String },

    /// A timing class string was not recognised.
    #[error("Unknown timing class: {0}")]
    UnknownTimingClass(String),

    /// The catalog exceeds the fixed per-state timer capacity.
    #[error("Catalog holds {count} actions, at most {max} are supported")]
    TooManyActions { count: usize, max: usize },

    /// A profile or recipe value falls outside the encodable range.
    #[error("{field} = {value} is out of range")]
    OutOfRange { field: &'static str, value: i64 },

    /// A combo rule references an action that is not in the catalog.
    #[error("Combo rule on {name} references unknown action id {id}")]
    InvalidCombo { name: String, id: u8 },
}

/// Result type alias for CraftForge validation.
pub type Result<T> = std::result::Result<T, CraftError>;

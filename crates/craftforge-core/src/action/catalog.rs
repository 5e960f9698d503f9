//! Dense, validated table of action descriptors.

use crate::error::{CraftError, Result};

use super::{ActionDescriptor, ActionId, MAX_ACTIONS, MAX_ACTIVE_TURNS};

/// Read-only action table, indexed by [`ActionId`].
///
/// Construction validates the table once; every later lookup by a known id
/// is infallible for ids the catalog itself produced.
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    actions: Vec<ActionDescriptor>,
}

impl ActionCatalog {
    /// Validates and wraps a list of descriptors.
    ///
    /// # Errors
    ///
    /// Fails if ids are not dense from zero, the table is too large for the
    /// state's timer array, a count-down action declares zero or too many
    /// turns, or a combo rule names an unknown predecessor.
    pub fn new(actions: Vec<ActionDescriptor>) -> Result<Self> {
        if actions.len() > MAX_ACTIONS {
            return Err(CraftError::TooManyActions {
                count: actions.len(),
                max: MAX_ACTIONS,
            });
        }

        for (index, action) in actions.iter().enumerate() {
            if action.id.index() != index {
                return Err(CraftError::DuplicateAction {
                    id: action.id.0,
                    expected: index as u8,
                });
            }

            if action.is_count_down()
                && (action.active_turns == 0 || action.active_turns > MAX_ACTIVE_TURNS)
            {
                return Err(CraftError::InvalidTiming {
                    name: action.name.clone(),
                    reason: format!(
                        "count-down duration {} outside 1..={}",
                        action.active_turns, MAX_ACTIVE_TURNS
                    ),
                });
            }

            if !action.is_count_down() && action.active_turns != 0 {
                return Err(CraftError::InvalidTiming {
                    name: action.name.clone(),
                    reason: format!("{} action declares active turns", action.timing),
                });
            }

            if let Some(rule) = &action.combo {
                if let Some(bad) = rule
                    .predecessors
                    .iter()
                    .find(|p| p.index() >= actions.len())
                {
                    return Err(CraftError::InvalidCombo {
                        name: action.name.clone(),
                        id: bad.0,
                    });
                }
            }
        }

        Ok(Self { actions })
    }

    /// The built-in action table.
    pub fn standard() -> Self {
        Self {
            actions: super::standard::descriptors(),
        }
    }

    /// Looks up a descriptor by id.
    #[inline]
    pub fn get(&self, id: ActionId) -> Option<&ActionDescriptor> {
        self.actions.get(id.index())
    }

    /// Looks up a descriptor by id, reporting unknown ids as an error.
    pub fn require(&self, id: ActionId) -> Result<&ActionDescriptor> {
        self.get(id)
            .ok_or_else(|| CraftError::UnknownAction(id.to_string()))
    }

    /// Case-insensitive lookup by name; spaces and underscores are ignored.
    pub fn by_name(&self, name: &str) -> Option<&ActionDescriptor> {
        let wanted = normalize(name);
        self.actions.iter().find(|a| normalize(&a.name) == wanted)
    }

    /// Resolves a list of names into ids.
    pub fn resolve_names<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<ActionId>> {
        names
            .iter()
            .map(|n| {
                self.by_name(n.as_ref())
                    .map(|a| a.id)
                    .ok_or_else(|| CraftError::UnknownAction(n.as_ref().to_string()))
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDescriptor> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Ids of every count-down action.
    pub fn count_down_ids(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.actions
            .iter()
            .filter(|a| a.is_count_down())
            .map(|a| a.id)
    }

    /// Display names for a sequence, unknown ids rendered as `#id`.
    pub fn names(&self, sequence: &[ActionId]) -> Vec<String> {
        sequence
            .iter()
            .map(|id| match self.get(*id) {
                Some(a) => a.name.clone(),
                None => id.to_string(),
            })
            .collect()
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-' | '\''))
        .flat_map(char::to_lowercase)
        .collect()
}

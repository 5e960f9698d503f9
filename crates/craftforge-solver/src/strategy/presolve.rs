//! Presolved action windows.
//!
//! A window is a short run of actions that simulates legally from the
//! sandbox state at full stacks and passes the window audits. Windows are grouped by
//! their first action and kept in lexicographic order, so all windows
//! sharing a prefix sit next to each other.

use smallvec::SmallVec;
use tracing::debug;

use craftforge_core::{simulate, ActionId, CraftContext, CraftState, MAX_ACTIONS, MAX_STACKS};
use craftforge_scoring::AuditChain;

use super::exhaustive::space_size;
use crate::error::{SolveError, SolveResult};

pub type Window = SmallVec<[ActionId; 8]>;

/// Upper bound on raw enumerations before pruning.
const MAX_ENUMERATION: u128 = 50_000_000;

/// Windows of one length indexed by first action.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowTable {
    length: usize,
    groups: Vec<Vec<Window>>,
    count: usize,
}

impl WindowTable {
    /// Enumerates every legal window of `length` over the allowed actions.
    pub fn presolve(ctx: &CraftContext, length: usize) -> SolveResult<Self> {
        if length == 0 {
            return Err(SolveError::Setup("window length must be at least 1".into()));
        }
        let k = ctx.allowed().len();
        if !space_size(k, length).is_some_and(|n| n <= MAX_ENUMERATION) {
            return Err(SolveError::Setup(format!(
                "{k} actions with window length {length} is too many windows to presolve"
            )));
        }

        let sandbox = ctx.sandbox();
        let chain = AuditChain::window();
        let mut table = Self {
            length,
            groups: vec![Vec::new(); MAX_ACTIONS],
            count: 0,
        };
        // Stack gates are checked again when a window lands on a real path.
        let mut start = sandbox.initial_state();
        start.stacks = MAX_STACKS;
        let mut window = Window::new();
        table.extend(&sandbox, &chain, &start, &mut window);

        debug!(event = "presolve", length = length, windows = table.count);
        Ok(table)
    }

    fn extend(
        &mut self,
        sandbox: &CraftContext,
        chain: &AuditChain,
        state: &CraftState,
        window: &mut Window,
    ) {
        if window.len() == self.length {
            if chain.first_failure(&window[..], sandbox).is_none() {
                self.groups[window[0].index()].push(window.clone());
                self.count += 1;
            }
            return;
        }
        for &id in sandbox.allowed() {
            if let Ok(next) = simulate(sandbox, state, id) {
                window.push(id);
                self.extend(sandbox, chain, &next, window);
                window.pop();
            }
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of windows.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Windows starting with `first`, in lexicographic order.
    pub fn group(&self, first: ActionId) -> &[Window] {
        self.groups
            .get(first.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Non-empty groups in action id order.
    pub fn groups(&self) -> impl Iterator<Item = &[Window]> {
        self.groups
            .iter()
            .filter(|g| !g.is_empty())
            .map(Vec::as_slice)
    }
}

/// Index of the first window after `index` that differs within `0..=pos`.
pub(crate) fn skip_shared_prefix(group: &[Window], index: usize, pos: usize) -> usize {
    let prefix = &group[index][..=pos];
    let mut next = index + 1;
    while next < group.len() && group[next][..=pos] == *prefix {
        next += 1;
    }
    next
}

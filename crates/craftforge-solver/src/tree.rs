//! Arena-backed tree of partial action sequences.
//!
//! Each node stores the action that reached it, the resulting state, its
//! parent index and its child list, so a path is recovered by walking up
//! from a leaf. A node stays alive while it has children or holds;
//! releasing the last hold on a leaf frees it and every ancestor that was
//! kept alive only by it. Forgetting a node drops its whole subtree at once.
//! Freed slots are reused by later pushes.

use craftforge_core::{ActionId, CraftState};

/// Index of a node in an [`ActionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Node {
    action: Option<ActionId>,
    parent: Option<NodeId>,
    state: CraftState,
    depth: u32,
    children: Vec<NodeId>,
    holds: u32,
    exhausted: bool,
    live: bool,
}

/// Arena of action nodes with a free list.
#[derive(Debug, Clone)]
pub struct ActionTree {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
}

impl ActionTree {
    /// A tree holding only the root, the empty sequence at `root`.
    pub fn new(root: CraftState) -> Self {
        Self {
            nodes: vec![Node {
                action: None,
                parent: None,
                state: root,
                depth: 0,
                children: Vec::new(),
                holds: 0,
                exhausted: false,
                live: true,
            }],
            free: Vec::new(),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Appends `action` below `parent`; the new node carries one hold.
    pub fn push_child(&mut self, parent: NodeId, action: ActionId, state: CraftState) -> NodeId {
        let depth = self.nodes[parent.index()].depth + 1;
        let node = Node {
            action: Some(action),
            parent: Some(parent),
            state,
            depth,
            children: Vec::new(),
            holds: 1,
            exhausted: false,
            live: true,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId((self.nodes.len() - 1) as u32)
            }
        };
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Appends a run of simulated steps and returns the deepest node.
    ///
    /// Only the returned node is held; intermediate nodes live through it.
    /// An empty run holds `parent` instead.
    pub fn push_path(
        &mut self,
        parent: NodeId,
        steps: impl IntoIterator<Item = (ActionId, CraftState)>,
    ) -> NodeId {
        let mut node = parent;
        for (action, state) in steps {
            let child = self.push_child(node, action, state);
            if node != parent {
                self.nodes[node.index()].holds -= 1;
            }
            node = child;
        }
        if node == parent {
            self.hold(parent);
        }
        node
    }

    pub fn hold(&mut self, id: NodeId) {
        self.nodes[id.index()].holds += 1;
    }

    /// Drops one hold and frees whatever is no longer reachable.
    pub fn release(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.index()];
        if !node.live {
            return;
        }
        node.holds = node.holds.saturating_sub(1);
        self.collect(id);
    }

    /// Detaches `id` and frees its whole subtree regardless of holds.
    ///
    /// Forgetting the root clears its children and keeps the root itself.
    pub fn forget(&mut self, id: NodeId) {
        if !self.is_live(id) {
            return;
        }
        if id == self.root() {
            for child in std::mem::take(&mut self.nodes[id.index()].children) {
                self.free_subtree(child);
            }
            return;
        }
        let parent = self.nodes[id.index()].parent;
        self.free_subtree(id);
        if let Some(p) = parent {
            self.nodes[p.index()].children.retain(|&c| c != id);
            self.collect(p);
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let node = &mut self.nodes[current.index()];
            if !node.live {
                continue;
            }
            node.live = false;
            node.holds = 0;
            pending.append(&mut node.children);
            self.free.push(current);
        }
    }

    /// Frees `id` and its ancestors while nothing keeps them alive.
    fn collect(&mut self, mut id: NodeId) {
        loop {
            let node = &self.nodes[id.index()];
            if id == self.root() || node.holds > 0 || !node.children.is_empty() || !node.live {
                return;
            }
            let parent = node.parent;
            self.nodes[id.index()].live = false;
            self.free.push(id);
            match parent {
                Some(p) => {
                    self.nodes[p.index()].children.retain(|&c| c != id);
                    id = p;
                }
                None => return,
            }
        }
    }

    /// Flags `id` as fully explored.
    pub fn mark_exhausted(&mut self, id: NodeId) {
        self.nodes[id.index()].exhausted = true;
    }

    pub fn is_exhausted(&self, id: NodeId) -> bool {
        self.nodes.get(id.index()).is_some_and(|n| n.live && n.exhausted)
    }

    /// State reached after the path to `id`.
    pub fn state(&self, id: NodeId) -> &CraftState {
        &self.nodes[id.index()].state
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Walks `steps` parents up, stopping at the root.
    pub fn ancestor(&self, mut id: NodeId, steps: usize) -> NodeId {
        for _ in 0..steps {
            match self.nodes[id.index()].parent {
                Some(p) => id = p,
                None => break,
            }
        }
        id
    }

    /// Actions from the root down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<ActionId> {
        let mut path = Vec::with_capacity(self.depth(id));
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current.index()];
            if let Some(action) = node.action {
                path.push(action);
            }
            cursor = node.parent;
        }
        path.reverse();
        path
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.nodes[id.index()].depth as usize
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        self.nodes.get(id.index()).is_some_and(|n| n.live)
    }

    /// Live nodes, root included.
    pub fn live_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Slots ever allocated.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftforge_core::standard::{BASIC_SYNTHESIS, BASIC_TOUCH, OBSERVE};
    use craftforge_core::{simulate, CraftContext};
    use craftforge_test::training;

    /// Simulated steps for `actions` from the start of `ctx`.
    fn steps(ctx: &CraftContext, actions: &[ActionId]) -> Vec<(ActionId, CraftState)> {
        let mut state = ctx.initial_state();
        actions
            .iter()
            .map(|&id| {
                state = simulate(ctx, &state, id).unwrap();
                (id, state.clone())
            })
            .collect()
    }

    fn tree(ctx: &CraftContext) -> ActionTree {
        ActionTree::new(ctx.initial_state())
    }

    #[test]
    fn test_path_reconstruction() {
        let ctx = training::context();
        let mut tree = tree(&ctx);
        let run = steps(&ctx, &[BASIC_TOUCH, OBSERVE, BASIC_SYNTHESIS]);
        let last = run[2].1.clone();
        let leaf = tree.push_path(tree.root(), run);

        assert_eq!(tree.path(leaf), vec![BASIC_TOUCH, OBSERVE, BASIC_SYNTHESIS]);
        assert_eq!(tree.depth(leaf), 3);
        assert_eq!(tree.state(leaf), &last);
        assert_eq!(tree.state(tree.root()), &ctx.initial_state());
        assert_eq!(tree.path(tree.ancestor(leaf, 2)), vec![BASIC_TOUCH]);
        assert_eq!(tree.ancestor(leaf, 10), tree.root());
        assert!(tree.path(tree.root()).is_empty());
    }

    #[test]
    fn test_release_frees_unreferenced_chain() {
        let ctx = training::context();
        let mut tree = tree(&ctx);
        let leaf = tree.push_path(tree.root(), steps(&ctx, &[BASIC_TOUCH, BASIC_TOUCH, BASIC_SYNTHESIS]));
        assert_eq!(tree.live_count(), 4);

        tree.release(leaf);
        assert_eq!(tree.live_count(), 1);
        assert!(!tree.is_live(leaf));
        assert!(tree.is_live(tree.root()));
        assert!(tree.children(tree.root()).is_empty());
    }

    #[test]
    fn test_shared_prefix_survives_sibling_release() {
        let ctx = training::context();
        let mut tree = tree(&ctx);
        let start = ctx.initial_state();
        let a = tree.push_child(tree.root(), BASIC_TOUCH, start.clone());
        let b = tree.push_child(a, BASIC_SYNTHESIS, start.clone());
        let c = tree.push_child(a, OBSERVE, start);
        assert_eq!(tree.children(a), &[b, c]);
        tree.release(a);
        assert!(tree.is_live(a));

        tree.release(b);
        assert!(tree.is_live(a));
        assert_eq!(tree.children(a), &[c]);
        assert_eq!(tree.path(c), vec![BASIC_TOUCH, OBSERVE]);

        tree.release(c);
        assert!(!tree.is_live(a));
        assert_eq!(tree.live_count(), 1);
    }

    #[test]
    fn test_free_list_reuse() {
        let ctx = training::context();
        let mut tree = tree(&ctx);
        let leaf = tree.push_path(tree.root(), steps(&ctx, &[BASIC_TOUCH, BASIC_SYNTHESIS]));
        let allocated = tree.capacity();
        tree.release(leaf);

        let again = tree.push_path(tree.root(), steps(&ctx, &[OBSERVE, BASIC_SYNTHESIS]));
        assert_eq!(tree.capacity(), allocated);
        assert_eq!(tree.path(again), vec![OBSERVE, BASIC_SYNTHESIS]);
    }

    #[test]
    fn test_retreat_keeps_held_ancestor() {
        let ctx = training::context();
        let mut tree = tree(&ctx);
        let leaf = tree.push_path(tree.root(), steps(&ctx, &[BASIC_TOUCH, OBSERVE, BASIC_SYNTHESIS]));
        let kept = tree.ancestor(leaf, 2);
        tree.hold(kept);
        tree.release(leaf);

        assert!(tree.is_live(kept));
        assert_eq!(tree.live_count(), 2);
        assert_eq!(tree.path(kept), vec![BASIC_TOUCH]);
    }

    #[test]
    fn test_empty_path_holds_parent() {
        let ctx = training::context();
        let mut tree = tree(&ctx);
        let a = tree.push_child(tree.root(), BASIC_TOUCH, ctx.initial_state());
        let same = tree.push_path(a, Vec::new());
        assert_eq!(same, a);
        tree.release(a);
        assert!(tree.is_live(a));
        tree.release(a);
        assert!(!tree.is_live(a));
    }

    #[test]
    fn test_forget_drops_held_subtree() {
        let ctx = training::context();
        let mut tree = tree(&ctx);
        let start = ctx.initial_state();
        let a = tree.push_child(tree.root(), BASIC_TOUCH, start.clone());
        let b = tree.push_child(a, OBSERVE, start.clone());
        let deep = tree.push_path(b, steps(&ctx, &[BASIC_SYNTHESIS, BASIC_TOUCH]));
        let sibling = tree.push_child(a, BASIC_SYNTHESIS, start);
        let allocated = tree.capacity();

        tree.forget(b);
        assert!(!tree.is_live(b));
        assert!(!tree.is_live(deep));
        assert!(tree.is_live(a));
        assert_eq!(tree.children(a), &[sibling]);
        assert_eq!(tree.live_count(), 3);

        // The three freed slots come back before the arena grows.
        tree.push_path(sibling, steps(&ctx, &[BASIC_TOUCH, BASIC_TOUCH, BASIC_TOUCH]));
        assert_eq!(tree.capacity(), allocated);
    }

    #[test]
    fn test_forget_last_child_collects_unheld_parent() {
        let ctx = training::context();
        let mut tree = tree(&ctx);
        let a = tree.push_child(tree.root(), BASIC_TOUCH, ctx.initial_state());
        let b = tree.push_child(a, OBSERVE, ctx.initial_state());
        tree.release(a);

        tree.forget(b);
        assert!(!tree.is_live(a));
        assert_eq!(tree.live_count(), 1);
    }

    #[test]
    fn test_forget_root_keeps_root() {
        let ctx = training::context();
        let mut tree = tree(&ctx);
        tree.push_path(tree.root(), steps(&ctx, &[BASIC_TOUCH, OBSERVE]));
        tree.push_child(tree.root(), BASIC_SYNTHESIS, ctx.initial_state());

        tree.forget(tree.root());
        assert!(tree.is_live(tree.root()));
        assert!(tree.children(tree.root()).is_empty());
        assert_eq!(tree.live_count(), 1);
    }

    #[test]
    fn test_exhausted_flag_clears_on_reuse() {
        let ctx = training::context();
        let mut tree = tree(&ctx);
        let a = tree.push_child(tree.root(), BASIC_TOUCH, ctx.initial_state());
        assert!(!tree.is_exhausted(a));
        tree.mark_exhausted(a);
        assert!(tree.is_exhausted(a));

        tree.forget(a);
        assert!(!tree.is_exhausted(a));
        let b = tree.push_child(tree.root(), OBSERVE, ctx.initial_state());
        assert_eq!(a, b);
        assert!(!tree.is_exhausted(b));
    }
}

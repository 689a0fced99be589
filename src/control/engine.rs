use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::plan::{ControllerKind, NodeId, PlanTree};
use crate::sample::SampleResult;

use super::listeners::{IterationEvent, IterationListener};
use super::random_order::permute_slots;

/// Outcome of one [`PlanEngine::next`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Execute this sampler leaf, then call `next` again.
    Work(NodeId),
    /// No more work from the tree for this call. Whether this is a loop
    /// boundary or the end of the plan is answered by
    /// [`PlanEngine::is_done`].
    Exhausted,
}

/// One child position in a controller's working list.
///
/// "Removal" of a permanently finished subtree is a tombstone flag plus
/// cursor-skip logic; the list itself is never edited mid-scan.
pub(super) struct Slot {
    pub(super) node: NodeId,
    pub(super) removed: bool,
}

/// What a single resolution step on one controller decided.
enum Step {
    Work(NodeId),
    Descend(NodeId),
    Exhausted { permanent: bool },
}

struct TxnState {
    started: Instant,
    calls: u64,
    failing: u64,
}

struct ControllerState {
    slots: Vec<Slot>,
    cursor: usize,
    iteration: u64,
    done: bool,
    first: bool,
    txn: Option<TxnState>,
}

impl ControllerState {
    const fn inert() -> Self {
        Self {
            slots: Vec::new(),
            cursor: 0,
            iteration: 0,
            done: false,
            first: true,
            txn: None,
        }
    }
}

/// Traversal state machine over a shared, immutable plan tree.
///
/// One engine per virtual-user task; nothing here is synchronized and
/// nothing here blocks. Traversal is iterative (an explicit descent stack),
/// so arbitrarily deep or wide trees cannot overflow the call stack.
pub struct PlanEngine {
    tree: Arc<PlanTree>,
    states: Vec<ControllerState>,
    listeners: Vec<Vec<Box<dyn IterationListener>>>,
    rng: StdRng,
    emitted: Vec<SampleResult>,
    txn_path: Vec<NodeId>,
}

impl PlanEngine {
    #[must_use]
    pub fn new(tree: Arc<PlanTree>, seed: u64) -> Self {
        let node_count = tree.len();
        let mut states = Vec::with_capacity(node_count);
        states.resize_with(node_count, ControllerState::inert);
        let mut listeners = Vec::with_capacity(node_count);
        listeners.resize_with(node_count, Vec::new);
        let mut engine = Self {
            tree,
            states,
            listeners,
            rng: StdRng::seed_from_u64(seed),
            emitted: Vec::new(),
            txn_path: Vec::new(),
        };
        engine.initialize();
        engine
    }

    /// Reset every controller to its initial state: cursor 0, iteration 0,
    /// not done, first-of-iteration pending. Random-order controllers get a
    /// fresh permutation. Fires no events.
    pub fn initialize(&mut self) {
        self.emitted.clear();
        self.txn_path.clear();
        for id in 0..self.tree.len() {
            let Some(kind) = self.tree.controller_kind(id) else {
                continue;
            };
            let slots: Vec<Slot> = self
                .tree
                .node(id)
                .map(|node| {
                    node.children
                        .iter()
                        .map(|&child| Slot {
                            node: child,
                            removed: false,
                        })
                        .collect()
                })
                .unwrap_or_default();
            let slots = if kind == ControllerKind::RandomOrder {
                permute_slots(slots, &mut self.rng)
            } else {
                slots
            };
            if let Some(state) = self.states.get_mut(id) {
                *state = ControllerState::inert();
                state.slots = slots;
            }
        }
    }

    /// Resolve the next unit of work, or report exhaustion.
    ///
    /// A non-done exhaustion is a loop boundary: the next call starts a
    /// fresh iteration. Once [`PlanEngine::is_done`] reports true the tree
    /// is permanently finished until [`PlanEngine::initialize`].
    pub fn next(&mut self) -> Next {
        let mut stack: Vec<NodeId> = Vec::with_capacity(8);
        stack.push(PlanTree::ROOT);
        loop {
            let Some(&top) = stack.last() else {
                return Next::Exhausted;
            };
            match self.step(top) {
                Step::Work(sampler) => {
                    self.note_leaf_dispatch(&stack);
                    return Next::Work(sampler);
                }
                Step::Descend(child) => stack.push(child),
                Step::Exhausted { permanent } => {
                    stack.pop();
                    let Some(&parent) = stack.last() else {
                        return Next::Exhausted;
                    };
                    self.child_exhausted(parent, permanent);
                }
            }
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.states
            .get(PlanTree::ROOT)
            .is_some_and(|state| state.done)
    }

    /// Completed-iteration count of a controller node.
    #[must_use]
    pub fn iteration_count(&self, id: NodeId) -> u64 {
        self.states.get(id).map_or(0, |state| state.iteration)
    }

    /// Register an iteration listener on a controller node.
    ///
    /// Listeners are prepended, so the most recently registered one
    /// observes each iteration start first.
    pub fn add_iteration_listener(&mut self, id: NodeId, listener: Box<dyn IterationListener>) {
        if let Some(listeners) = self.listeners.get_mut(id) {
            listeners.insert(0, listener);
        }
    }

    /// Attribute a completed leaf result to the transaction controllers it
    /// was dispatched through. Called by the driver after each execution.
    pub fn record_result(&mut self, result: &SampleResult) {
        if result.success {
            return;
        }
        let path = self.txn_path.clone();
        for id in path {
            if let Some(state) = self.states.get_mut(id) {
                if let Some(txn) = state.txn.as_mut() {
                    txn.failing = txn.failing.saturating_add(1);
                }
            }
        }
    }

    /// Drain the synthetic aggregate samples emitted by transaction
    /// controllers since the last call.
    pub fn take_emitted(&mut self) -> Vec<SampleResult> {
        std::mem::take(&mut self.emitted)
    }

    /// One resolution step on a single controller node.
    fn step(&mut self, id: NodeId) -> Step {
        let Some(kind) = self.tree.controller_kind(id) else {
            return Step::Exhausted { permanent: true };
        };

        // First call of this iteration: fire events before anything else,
        // including before the done check, and open the transaction window.
        let fire = match self.states.get_mut(id) {
            Some(state) if state.first => {
                state.first = false;
                true
            }
            Some(_) => false,
            None => return Step::Exhausted { permanent: true },
        };
        if fire {
            self.fire_iteration_start(id);
            if kind == ControllerKind::Transaction {
                self.open_transaction(id);
            }
        }

        if self.states.get(id).is_none_or(|state| state.done) {
            return Step::Exhausted { permanent: true };
        }

        let Some(child) = self.resolve_cursor(id) else {
            return self.subtree_boundary(id, kind);
        };
        if self.tree.is_controller(child) {
            // Cursor stays on this slot; the same child is revisited until
            // it reports exhaustion.
            Step::Descend(child)
        } else {
            if let Some(state) = self.states.get_mut(id) {
                state.cursor = state.cursor.saturating_add(1);
            }
            Step::Work(child)
        }
    }

    /// Advance the cursor past tombstoned slots and return the live child
    /// it lands on, if any.
    fn resolve_cursor(&mut self, id: NodeId) -> Option<NodeId> {
        let state = self.states.get_mut(id)?;
        while let Some(slot) = state.slots.get(state.cursor) {
            if slot.removed {
                state.cursor = state.cursor.saturating_add(1);
            } else {
                return Some(slot.node);
            }
        }
        None
    }

    /// The cursor ran past the child list: either the subtree is empty
    /// (permanently done) or one full iteration just finished (loop reset).
    fn subtree_boundary(&mut self, id: NodeId, kind: ControllerKind) -> Step {
        if kind == ControllerKind::Transaction {
            self.complete_transaction(id);
        }

        let empty = self
            .states
            .get(id)
            .is_none_or(|state| state.slots.iter().all(|slot| slot.removed));
        if empty {
            if let Some(state) = self.states.get_mut(id) {
                state.done = true;
            }
            return Step::Exhausted { permanent: true };
        }

        self.reinitialize(id);

        let permanent = match kind {
            ControllerKind::Loop { loops: Some(limit) } => {
                let reached = self
                    .states
                    .get(id)
                    .is_none_or(|state| state.iteration >= limit);
                if reached {
                    if let Some(state) = self.states.get_mut(id) {
                        state.done = true;
                    }
                }
                reached
            }
            ControllerKind::Loop { loops: None }
            | ControllerKind::Generic
            | ControllerKind::RandomOrder
            | ControllerKind::Transaction => false,
        };
        Step::Exhausted { permanent }
    }

    /// Loop reset: cursor to 0, bump the iteration count, re-arm the
    /// first-of-iteration flag, and re-permute random-order children.
    fn reinitialize(&mut self, id: NodeId) {
        let is_random = self.tree.controller_kind(id) == Some(ControllerKind::RandomOrder);
        let Some(state) = self.states.get_mut(id) else {
            return;
        };
        state.cursor = 0;
        state.iteration = state.iteration.saturating_add(1);
        state.first = true;
        if is_random {
            let slots = std::mem::take(&mut state.slots);
            state.slots = permute_slots(slots, &mut self.rng);
        }
    }

    /// A child controller reported exhaustion: tombstone it if permanently
    /// done, otherwise move on to the following sibling.
    fn child_exhausted(&mut self, parent: NodeId, permanent: bool) {
        let Some(state) = self.states.get_mut(parent) else {
            return;
        };
        if permanent {
            if let Some(slot) = state.slots.get_mut(state.cursor) {
                slot.removed = true;
            }
        } else {
            state.cursor = state.cursor.saturating_add(1);
        }
    }

    fn fire_iteration_start(&mut self, id: NodeId) {
        let iteration = self.states.get(id).map_or(0, |state| state.iteration);
        let Some(node) = self.tree.node(id) else {
            return;
        };
        let event = IterationEvent {
            node: node.name.clone(),
            iteration,
        };
        if let Some(listeners) = self.listeners.get_mut(id) {
            for listener in listeners.iter_mut() {
                listener.iteration_start(&event);
            }
        }
    }

    fn open_transaction(&mut self, id: NodeId) {
        let Some(state) = self.states.get_mut(id) else {
            return;
        };
        if state.txn.is_some() {
            debug!("Transaction window already open for node {}", id);
            return;
        }
        state.txn = Some(TxnState {
            started: Instant::now(),
            calls: 0,
            failing: 0,
        });
    }

    /// Close the transaction window and queue the aggregate sample. A
    /// boundary without a pending window is logged and skipped, so a repeat
    /// call after exhaustion cannot double-emit.
    fn complete_transaction(&mut self, id: NodeId) {
        let name = self
            .tree
            .node(id)
            .map_or_else(String::new, |node| node.name.clone());
        let Some(state) = self.states.get_mut(id) else {
            return;
        };
        let Some(txn) = state.txn.take() else {
            debug!(
                "No pending transaction for '{}'; skipping aggregate emit",
                name
            );
            return;
        };
        let elapsed_ms = u64::try_from(txn.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let message = format!(
            "Number of samples in transaction : {}, number of failing samples : {}",
            txn.calls, txn.failing
        );
        let result = SampleResult::new(name, txn.failing == 0, elapsed_ms).with_message(message);
        self.emitted.push(result);
    }

    /// A leaf is about to be handed to the driver: count it against every
    /// open transaction on the descent path and remember that path so the
    /// result can be attributed back.
    fn note_leaf_dispatch(&mut self, stack: &[NodeId]) {
        self.txn_path.clear();
        for &id in stack {
            if self.tree.controller_kind(id) != Some(ControllerKind::Transaction) {
                continue;
            }
            if let Some(state) = self.states.get_mut(id) {
                if let Some(txn) = state.txn.as_mut() {
                    txn.calls = txn.calls.saturating_add(1);
                    self.txn_path.push(id);
                }
            }
        }
    }
}

//! The root game state.

use serde::Serialize;

use crate::{
    activity::{ActivityLog, Category},
    campus::{self, PlotId},
    chain::Chain,
    clock::Timestamp,
    consensus::ConsensusMode,
    node::{Node, NodeId, NodeKind, NodeStatus, Placement},
    resources::{Amount, Resources},
    rules::{Layout, Rules},
};

/// Why a [`GameState`] cannot be played under a set of [`Rules`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    #[error("{counter} is {value}, outside the range 0.0..={max}")]
    OutOfBounds {
        counter: &'static str,
        value: Amount,
        max: Amount,
    },
    #[error("{counter} is {value} but must be a non-negative number")]
    NegativeCounter { counter: &'static str, value: Amount },
    #[error("node id {0} is used by more than one node")]
    DuplicateNodeId(NodeId),
}

/// Everything the reducer owns. Only [`reduce`](crate::reducer::reduce)
/// produces new states; every other component reads them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Number of ticks processed while not paused.
    pub cycle: u64,
    #[serde(flatten)]
    pub resources: Resources,
    /// Built nodes, in build order.
    pub nodes: Vec<Node>,
    pub chain: Chain,
    pub logs: ActivityLog,
    pub consensus_mode: ConsensusMode,
    pub selected_node_id: Option<NodeId>,
    pub smart_contract_level: u32,
    pub paused: bool,
    #[serde(skip)]
    next_node_id: u64,
}

impl GameState {
    /// Starting resources of a new game.
    pub const GENESIS_RESOURCES: Resources = Resources {
        tokens: 160.0,
        energy: 110.0,
        knowledge: 18.0,
        reputation: 20.0,
        students_inspired: 12.0,
        consensus_health: 55.0,
    };

    /// Creates the opening state: two active nodes, a genesis block and a
    /// welcome message.
    ///
    /// ## Panics
    /// Panics if `rules.log_capacity` is 0. Rules which pass
    /// [`Rules::validate`] never do.
    pub fn genesis(rules: &Rules, now: Timestamp) -> Self {
        let mut logs = ActivityLog::with_capacity(rules.log_capacity);
        logs.push(
            now,
            Category::Education,
            "Welcome! This campus shows how miners, validators and dapps work \
             together. Follow the tutorial to get started.",
        );

        let mut state = GameState {
            cycle: 0,
            resources: Self::GENESIS_RESOURCES,
            nodes: Vec::new(),
            chain: Chain::new(now),
            logs,
            consensus_mode: ConsensusMode::Pow,
            selected_node_id: None,
            smart_contract_level: 0,
            paused: false,
            next_node_id: 0,
        };

        let starters = [
            (
                NodeKind::Miner,
                "Genesis Mining Rig",
                "Produces the first blocks and teaches you about \
                 proof-of-work.",
                PlotId::A1,
            ),
            (
                NodeKind::Validator,
                "Validator College",
                "Students practise stake-based consensus and voting rounds \
                 here.",
                PlotId::A2,
            ),
        ];
        for (index, (kind, name, description, plot)) in
            starters.into_iter().enumerate()
        {
            let placement = match rules.layout {
                Layout::Campus => Placement {
                    plot: Some(plot),
                    position: campus::plot(plot).position,
                },
                Layout::Grid => Placement {
                    plot: None,
                    position: campus::grid_position(index + 1),
                },
            };
            let id = state.allocate_node_id();

            state.nodes.push(Node {
                id,
                kind,
                name: name.into(),
                description: description.into(),
                level: 1,
                status: NodeStatus::Active,
                progress: 1.0,
                placement,
                lore: kind.lore().into(),
            });
        }

        state
    }

    /// Checks that the counters are within the bounds of `rules` and that
    /// every node has its own id.
    pub fn validate(&self, rules: &Rules) -> Result<(), StateError> {
        use StateError::*;

        let res = &self.resources;
        for (counter, value, max) in [
            ("energy", res.energy, rules.energy_max),
            ("consensus health", res.consensus_health, rules.consensus_health_max),
        ] {
            if !(0.0..=max).contains(&value) {
                return Err(OutOfBounds { counter, value, max });
            }
        }

        for (counter, value) in [
            ("tokens", res.tokens),
            ("knowledge", res.knowledge),
            ("reputation", res.reputation),
            ("students inspired", res.students_inspired),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(NegativeCounter { counter, value });
            }
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if self.nodes[..i].iter().any(|other| other.id == node.id) {
                return Err(DuplicateNodeId(node.id));
            }
        }

        Ok(())
    }

    /// Moves the id allocator past every id in use, so states assembled by
    /// hand never hand out an existing id.
    pub(crate) fn resync_node_ids(&mut self) {
        let above_max = self.nodes.iter().map(|n| n.id.0 + 1).max().unwrap_or(0);
        self.next_node_id = self.next_node_id.max(above_max);
    }

    /// Returns a fresh [`NodeId`] which no node in this state uses.
    pub(crate) fn allocate_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        id
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// The node which gets credit for the next block: the highest level node,
    /// preferring earlier nodes on ties.
    pub fn best_node(&self) -> Option<&Node> {
        self.nodes.iter().fold(None, |best: Option<&Node>, node| match best {
            Some(b) if b.level >= node.level => Some(b),
            _ => Some(node),
        })
    }

    #[inline]
    pub fn selected_node(&self) -> Option<&Node> {
        self.selected_node_id.and_then(|id| self.node(id))
    }
}

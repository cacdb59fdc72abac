//! Buildings on the campus and the roles they play in the network.

use serde::{Deserialize, Serialize};

use crate::{campus::PlotId, resources::Amount};

/// Blockchain role represented by a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Miner,
    Validator,
    Dapp,
    Research,
}

impl NodeKind {
    /// All node kinds, in build-menu order.
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Miner,
        NodeKind::Validator,
        NodeKind::Dapp,
        NodeKind::Research,
    ];

    /// Display name used when naming newly built nodes.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Miner => "Mining Rig",
            NodeKind::Validator => "Validator Node",
            NodeKind::Dapp => "Smart Contract Hub",
            NodeKind::Research => "Research Lab",
        }
    }

    /// Short explanation of the role, shown when a node is inspected.
    pub fn lore(&self) -> &'static str {
        match self {
            NodeKind::Miner => {
                "Miners solve cryptographic puzzles and prove they spent \
                 energy to append blocks."
            }
            NodeKind::Validator => {
                "Validators check transactions and vote on blocks. Under \
                 proof-of-stake they lock their own tokens as collateral."
            }
            NodeKind::Dapp => {
                "Decentralized apps run their logic in smart contracts, \
                 without a central operator."
            }
            NodeKind::Research => {
                "Research labs experiment with new protocols and share what \
                 they learn with the network."
            }
        }
    }

    /// Topic unlocked when a node of this kind is upgraded.
    pub fn lesson(&self) -> &'static str {
        match self {
            NodeKind::Miner => "hashing and difficulty",
            NodeKind::Validator => "staking and slashing",
            NodeKind::Dapp => "smart contracts",
            NodeKind::Research => "protocol design",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeKind::Miner => "miner",
            NodeKind::Validator => "validator",
            NodeKind::Dapp => "dapp",
            NodeKind::Research => "research",
        };
        f.write_str(name)
    }
}

/// One value per [`NodeKind`]. Used for cost and production tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KindTable<T> {
    pub miner: T,
    pub validator: T,
    pub dapp: T,
    pub research: T,
}

impl<T> KindTable<T> {
    #[inline]
    pub fn get(&self, kind: NodeKind) -> &T {
        match kind {
            NodeKind::Miner => &self.miner,
            NodeKind::Validator => &self.validator,
            NodeKind::Dapp => &self.dapp,
            NodeKind::Research => &self.research,
        }
    }

    /// Iterates over `(kind, value)` pairs in [`NodeKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeKind, &T)> {
        NodeKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

/// Unique identifier of a [`Node`] within one game.
#[repr(transparent)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        NodeId(value)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Building,
    Active,
}

/// Where a node stands: the campus plot it occupies (if the game uses the
/// campus layout) and its position in the 3D world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub plot: Option<PlotId>,
    pub position: [f64; 3],
}

/// A constructed building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    pub description: String,
    pub level: u32,
    pub status: NodeStatus,
    /// Construction progress in `0.0..=1.0`.
    pub progress: Amount,
    pub placement: Placement,
    pub lore: String,
}

impl Node {
    /// Creates a level 1 node which still has to be constructed.
    pub fn under_construction(
        id: NodeId,
        kind: NodeKind,
        name: String,
        placement: Placement,
    ) -> Self {
        Node {
            id,
            kind,
            name,
            description: format!(
                "Every upgrade boosts production. {}",
                kind.lore()
            ),
            level: 1,
            status: NodeStatus::Building,
            progress: 0.0,
            placement,
            lore: kind.lore().into(),
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == NodeStatus::Active
    }

    /// Production multiplier for this node's level.
    #[inline]
    pub fn multiplier(&self, level_bonus: Amount) -> Amount {
        1.0 + level_bonus * (self.level.saturating_sub(1)) as Amount
    }
}

#[cfg(test)]
mod tests {
    use super::{Node, NodeId, NodeKind, Placement};

    #[test]
    fn multiplier_scales_with_level() {
        let mut node = Node::under_construction(
            NodeId(1),
            NodeKind::Miner,
            "Mining Rig 3".into(),
            Placement { plot: None, position: [0.0, 0.5, 4.0] },
        );
        assert_eq!(node.multiplier(0.35), 1.0);

        node.level = 3;
        assert!((node.multiplier(0.35) - 1.7).abs() < 1e-9);
    }
}

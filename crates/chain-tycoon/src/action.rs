//! Requests dispatched to the reducer and what became of them.

use serde::{Deserialize, Serialize};

use crate::{
    consensus::ConsensusMode,
    node::{NodeId, NodeKind},
    resources::{Amount, Cost},
};

/// An action taken by the player, or by the tick scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Action {
    /// Advance the simulation by one step.
    Tick,
    /// Start construction of a new node.
    Build(NodeKind),
    /// Raise the level of an existing node.
    Upgrade(NodeId),
    /// Focus a node, or clear the focus.
    Select(Option<NodeId>),
    SwitchConsensus(ConsensusMode),
    /// Produce a block under the current consensus mode.
    RunConsensus,
    DeployContract,
    LaunchWorkshop,
    TogglePause,
}

/// Why an action was turned down. The [`Display`](std::fmt::Display) text is
/// what the player sees in the activity log.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error(
        "Not enough resources to build this. Gather more tokens, knowledge or \
         energy first (needs {0})."
    )]
    CannotAffordBuild(Cost),
    #[error("Every unlocked plot on the campus is taken. Unlock a new district first.")]
    NoPlotAvailable,
    #[error(
        "You are missing resources for this upgrade (needs {0}). Consider a \
         workshop to raise knowledge."
    )]
    CannotAffordUpgrade(Cost),
    #[error("{0} is still locked. Build up knowledge and reputation to unlock it.")]
    ConsensusLocked(ConsensusMode),
    #[error(
        "You need at least {required} energy to run the network equipment for \
         a consensus round."
    )]
    LowEnergy { required: Amount, available: Amount },
    #[error(
        "Not enough tokens or knowledge to deploy this smart contract (needs \
         {0}). Run a workshop or let your miners work."
    )]
    CannotAffordContract(Cost),
    #[error(
        "Workshops need at least {0} tokens for materials. Earn more tokens or \
         cut your spending."
    )]
    CannotAffordWorkshop(Amount),
}

/// Result of dispatching an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// The action took full effect.
    Applied,
    /// The action's precondition failed. Only a log entry was added.
    Rejected(Rejection),
    /// The action had nothing to do: a tick while paused, an unknown node,
    /// or a switch to the current mode. State is unchanged.
    Ignored,
}

impl Outcome {
    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    #[inline]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, Rejection};
    use crate::{consensus::ConsensusMode, node::NodeKind};

    #[test]
    fn rejection_messages_name_requirements() {
        let msg = Rejection::LowEnergy { required: 30.0, available: 20.0 }.to_string();
        assert!(msg.contains("30"));

        let msg = Rejection::ConsensusLocked(ConsensusMode::Pbft).to_string();
        assert!(msg.starts_with("PBFT"));
    }

    #[test]
    fn actions_use_tagged_json() {
        let json = serde_json::to_string(&Action::Build(NodeKind::Dapp)).unwrap();
        assert_eq!(json, r#"{"type":"build","payload":"dapp"}"#);

        let action: Action = serde_json::from_str(r#"{"type":"togglePause"}"#).unwrap();
        assert_eq!(action, Action::TogglePause);
    }
}

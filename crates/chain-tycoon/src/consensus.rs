/*!
Consensus modes and the engines which narrate them

Each [`ConsensusMode`] is backed by a [`ConsensusEngine`] implementation. The
engine decides how hard a block is to produce, what the player is told about
the mode, and runs a small election over the active nodes whenever a
consensus round succeeds. Elections are illustrative: they are recorded on
the block but never change the resource effects of a round.

# Examples
An engine which always elects the first candidate.

```
use chain_tycoon::prelude::*;
use rand::RngCore;

#[derive(Debug, Clone)]
struct FirstComeFirstServed;

impl ConsensusEngine for FirstComeFirstServed {
    fn mode(&self) -> ConsensusMode {
        ConsensusMode::Pow
    }

    fn difficulty(&self) -> u32 {
        1
    }

    fn describe(&self) -> String {
        "The first node to show up writes the block.".into()
    }

    fn insight(&self) -> String {
        "Without competition there is nothing to agree on.".into()
    }

    fn elect(
        &self,
        _round: u64,
        candidates: &[Candidate],
        _rng: &mut dyn RngCore,
    ) -> Election {
        Election {
            proposer: candidates.first().map(|c| c.id),
            votes: None,
        }
    }
}

let game = Game::builder()
    .seed(1)
    .engine(FirstComeFirstServed)
    .build()
    .unwrap();
```
*/

use std::fmt::Debug;

use dyn_clone::DynClone;
use rand::{
    distributions::{Distribution, WeightedIndex},
    RngCore,
};
use serde::{Deserialize, Serialize};

use crate::{
    node::{Node, NodeId, NodeKind},
    rules::ConsensusUnlocks,
    state::GameState,
};

pub mod pbft;
pub mod pos;
pub mod pow;

pub use pbft::Pbft;
pub use pos::ProofOfStake;
pub use pow::ProofOfWork;

/// The illustrative consensus algorithms a player can switch between.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusMode {
    #[default]
    Pow,
    Pos,
    Pbft,
}

impl ConsensusMode {
    pub const ALL: [ConsensusMode; 3] =
        [ConsensusMode::Pow, ConsensusMode::Pos, ConsensusMode::Pbft];

    pub fn label(&self) -> &'static str {
        match self {
            ConsensusMode::Pow => "Proof-of-Work",
            ConsensusMode::Pos => "Proof-of-Stake",
            ConsensusMode::Pbft => "PBFT",
        }
    }

    /// Returns true if `state` satisfies the unlock thresholds for this mode.
    /// Proof-of-Work is always unlocked.
    pub fn is_unlocked(
        &self,
        state: &GameState,
        unlocks: &ConsensusUnlocks,
    ) -> bool {
        let res = &state.resources;
        match self {
            ConsensusMode::Pow => true,
            ConsensusMode::Pos => {
                res.knowledge >= unlocks.pos_knowledge
                    || state.smart_contract_level > 0
            }
            ConsensusMode::Pbft => {
                res.reputation >= unlocks.pbft_reputation
                    && res.consensus_health >= unlocks.pbft_consensus_health
            }
        }
    }
}

impl std::fmt::Display for ConsensusMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Returns every mode `state` has unlocked, in [`ConsensusMode::ALL`] order.
pub fn unlocked_modes(
    state: &GameState,
    unlocks: &ConsensusUnlocks,
) -> Vec<ConsensusMode> {
    ConsensusMode::ALL
        .into_iter()
        .filter(|mode| mode.is_unlocked(state, unlocks))
        .collect()
}

/// An active node taking part in an election.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub id: NodeId,
    pub kind: NodeKind,
    pub level: u32,
}

impl Candidate {
    /// Collects every active node in `nodes`, preserving order.
    pub fn from_nodes(nodes: &[Node]) -> Vec<Candidate> {
        nodes
            .iter()
            .filter(|node| node.is_active())
            .map(|node| Candidate {
                id: node.id,
                kind: node.kind,
                level: node.level,
            })
            .collect()
    }
}

/// Votes cast during a voting-based election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub approvals: u32,
    pub total: u32,
}

impl VoteTally {
    /// Returns true if at least two thirds of all voters approved.
    #[inline]
    pub fn has_quorum(&self) -> bool {
        self.total > 0 && self.approvals * 3 >= self.total * 2
    }
}

/// Result of a [`ConsensusEngine::elect`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Election {
    /// The node chosen to propose the block, if any was eligible.
    pub proposer: Option<NodeId>,
    /// Present for voting-based engines.
    pub votes: Option<VoteTally>,
}

/// Defines the behavior of one consensus mode.
pub trait ConsensusEngine: Debug + DynClone + Send + Sync {
    /// The mode this engine implements. An engine registered with
    /// [`Engines::replace`] takes the slot of this mode.
    fn mode(&self) -> ConsensusMode;

    /// Difficulty recorded on blocks produced under this mode.
    fn difficulty(&self) -> u32;

    /// Message logged when the player switches to this mode.
    fn describe(&self) -> String;

    /// Insight text recorded on blocks produced under this mode.
    fn insight(&self) -> String;

    /// Runs an election over `candidates` for the block at index `round`.
    fn elect(
        &self,
        round: u64,
        candidates: &[Candidate],
        rng: &mut dyn RngCore,
    ) -> Election;
}

dyn_clone::clone_trait_object!(ConsensusEngine);

/// Draws one candidate with probability proportional to `weight`. Returns
/// `None` if no candidate has a positive weight.
pub(crate) fn weighted_pick<F>(
    candidates: &[Candidate],
    weight: F,
    rng: &mut dyn RngCore,
) -> Option<NodeId>
where
    F: Fn(&Candidate) -> f64,
{
    let weights: Vec<f64> = candidates.iter().map(weight).collect();
    let dist = WeightedIndex::new(&weights).ok()?;

    Some(candidates[dist.sample(rng)].id)
}

/// The engine registered for each [`ConsensusMode`].
#[derive(Debug, Clone)]
pub struct Engines {
    pow: Box<dyn ConsensusEngine>,
    pos: Box<dyn ConsensusEngine>,
    pbft: Box<dyn ConsensusEngine>,
}

impl Engines {
    #[inline]
    pub fn get(&self, mode: ConsensusMode) -> &dyn ConsensusEngine {
        match mode {
            ConsensusMode::Pow => self.pow.as_ref(),
            ConsensusMode::Pos => self.pos.as_ref(),
            ConsensusMode::Pbft => self.pbft.as_ref(),
        }
    }

    /// Registers `engine` for the mode it reports, returning the engine it
    /// replaced.
    pub fn replace(
        &mut self,
        engine: Box<dyn ConsensusEngine>,
    ) -> Box<dyn ConsensusEngine> {
        let slot = match engine.mode() {
            ConsensusMode::Pow => &mut self.pow,
            ConsensusMode::Pos => &mut self.pos,
            ConsensusMode::Pbft => &mut self.pbft,
        };

        std::mem::replace(slot, engine)
    }
}

impl Default for Engines {
    fn default() -> Self {
        Engines {
            pow: Box::new(ProofOfWork::default()),
            pos: Box::new(ProofOfStake::default()),
            pbft: Box::new(Pbft::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{
        unlocked_modes, weighted_pick, Candidate, ConsensusMode, Engines, Pbft,
        VoteTally,
    };
    use crate::{
        node::{NodeId, NodeKind},
        rules::Rules,
        state::GameState,
    };

    #[test]
    fn quorum_is_two_thirds() {
        assert!(VoteTally { approvals: 2, total: 3 }.has_quorum());
        assert!(!VoteTally { approvals: 1, total: 3 }.has_quorum());
        assert!(!VoteTally { approvals: 0, total: 0 }.has_quorum());
    }

    #[test]
    fn genesis_unlocks_only_pow() {
        let rules = Rules::default();
        let state = GameState::genesis(&rules, Default::default());

        assert_eq!(
            unlocked_modes(&state, &rules.consensus_unlocks),
            vec![ConsensusMode::Pow]
        );
    }

    #[test]
    fn contract_level_unlocks_pos() {
        let rules = Rules::default();
        let mut state = GameState::genesis(&rules, Default::default());
        state.smart_contract_level = 1;

        assert!(ConsensusMode::Pos.is_unlocked(&state, &rules.consensus_unlocks));
        assert!(!ConsensusMode::Pbft.is_unlocked(&state, &rules.consensus_unlocks));
    }

    #[test]
    fn pbft_needs_reputation_and_health() {
        let rules = Rules::default();
        let mut state = GameState::genesis(&rules, Default::default());
        state.resources.reputation = 60.0;
        state.resources.consensus_health = 69.0;
        assert!(!ConsensusMode::Pbft.is_unlocked(&state, &rules.consensus_unlocks));

        state.resources.consensus_health = 70.0;
        assert!(ConsensusMode::Pbft.is_unlocked(&state, &rules.consensus_unlocks));
    }

    #[test]
    fn weighted_pick_skips_zero_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let candidates = [
            Candidate { id: NodeId(1), kind: NodeKind::Miner, level: 1 },
            Candidate { id: NodeId(2), kind: NodeKind::Validator, level: 4 },
        ];

        for _ in 0..20 {
            let pick = weighted_pick(
                &candidates,
                |c| if c.kind == NodeKind::Validator { 1.0 } else { 0.0 },
                &mut rng,
            );
            assert_eq!(pick, Some(NodeId(2)));
        }

        assert_eq!(weighted_pick(&candidates, |_| 0.0, &mut rng), None);
    }

    #[test]
    fn replace_swaps_matching_slot() {
        let mut engines = Engines::default();
        engines.replace(Box::new(Pbft::with_reliability(1.0).with_difficulty(7)));

        assert_eq!(engines.get(ConsensusMode::Pbft).difficulty(), 7);
        assert_eq!(engines.get(ConsensusMode::Pow).difficulty(), 5);
    }
}

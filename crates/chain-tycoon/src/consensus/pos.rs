//! Proof-of-Stake: validators lock tokens and are drawn by lottery,
//! weighted by their stake.

use rand::RngCore;

use crate::node::NodeKind;

use super::{weighted_pick, Candidate, ConsensusEngine, ConsensusMode, Election};

/// Elects a validator with probability proportional to its level, which
/// stands in for the validator's stake.
#[derive(Debug, Clone)]
pub struct ProofOfStake {
    difficulty: u32,
}

impl ProofOfStake {
    pub fn new() -> Self {
        ProofOfStake { difficulty: 3 }
    }

    pub fn with_difficulty(difficulty: u32) -> Self {
        ProofOfStake { difficulty }
    }
}

impl Default for ProofOfStake {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsensusEngine for ProofOfStake {
    fn mode(&self) -> ConsensusMode {
        ConsensusMode::Pos
    }

    fn difficulty(&self) -> u32 {
        self.difficulty
    }

    fn describe(&self) -> String {
        "Proof-of-Stake: validators lock tokens as collateral and vote on \
         blocks."
            .into()
    }

    fn insight(&self) -> String {
        "Proof-of-Stake speeds up finality through economic incentives.".into()
    }

    fn elect(
        &self,
        _round: u64,
        candidates: &[Candidate],
        rng: &mut dyn RngCore,
    ) -> Election {
        let proposer = weighted_pick(
            candidates,
            |c| match c.kind {
                NodeKind::Validator => c.level as f64,
                _ => 0.0,
            },
            rng,
        );

        Election { proposer, votes: None }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::ProofOfStake;
    use crate::{
        consensus::{Candidate, ConsensusEngine},
        node::{NodeId, NodeKind},
    };

    #[test]
    fn higher_stake_wins_more_often() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let candidates = [
            Candidate { id: NodeId(0), kind: NodeKind::Validator, level: 1 },
            Candidate { id: NodeId(1), kind: NodeKind::Validator, level: 9 },
        ];
        let engine = ProofOfStake::new();

        let big_wins = (0..1000)
            .filter(|&r| {
                engine.elect(r, &candidates, &mut rng).proposer == Some(NodeId(1))
            })
            .count();

        assert!(big_wins > 800, "level 9 validator won {big_wins}/1000");
    }
}

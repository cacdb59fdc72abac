//! Proof-of-Work: the miner with the most hashing power is most likely to
//! win the race for the next block.

use rand::RngCore;

use crate::node::NodeKind;

use super::{weighted_pick, Candidate, ConsensusEngine, ConsensusMode, Election};

/// Elects a miner with probability proportional to its level.
#[derive(Debug, Clone)]
pub struct ProofOfWork {
    difficulty: u32,
}

impl ProofOfWork {
    pub fn new() -> Self {
        ProofOfWork { difficulty: 5 }
    }

    pub fn with_difficulty(difficulty: u32) -> Self {
        ProofOfWork { difficulty }
    }
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsensusEngine for ProofOfWork {
    fn mode(&self) -> ConsensusMode {
        ConsensusMode::Pow
    }

    fn difficulty(&self) -> u32 {
        self.difficulty
    }

    fn describe(&self) -> String {
        "Proof-of-Work: miners spend energy to create blocks and are rewarded \
         with tokens."
            .into()
    }

    fn insight(&self) -> String {
        "Proof-of-Work highlights energy use and difficulty adjustments.".into()
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
                NodeKind::Miner => c.level as f64,
                _ => 0.0,
            },
            rng,
        );

        Election { proposer, votes: None }
    }
}

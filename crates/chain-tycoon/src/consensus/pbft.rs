//! PBFT-style voting: a rotating leader proposes, everyone votes, and the
//! block is final once two thirds agree.

use rand::{Rng, RngCore};

use super::{Candidate, ConsensusEngine, ConsensusMode, Election, VoteTally};

/// Rotates the leader by block index and lets every candidate approve
/// independently with probability `reliability`.
#[derive(Debug, Clone)]
pub struct Pbft {
    difficulty: u32,
    reliability: f64,
}

impl Pbft {
    pub fn new() -> Self {
        Pbft { difficulty: 2, reliability: 0.9 }
    }

    /// ## Panics
    /// Panics if `reliability` is not in `0.0..=1.0`.
    pub fn with_reliability(reliability: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&reliability),
            "reliability {reliability} is not in the range 0.0..=1.0"
        );

        Pbft { reliability, ..Self::new() }
    }

    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;

        self
    }

    pub fn reliability(&self) -> f64 {
        self.reliability
    }
}

impl Default for Pbft {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsensusEngine for Pbft {
    fn mode(&self) -> ConsensusMode {
        ConsensusMode::Pbft
    }

    fn difficulty(&self) -> u32 {
        self.difficulty
    }

    fn describe(&self) -> String {
        "PBFT: a voting round with leaders and confirmers for fast finality in \
         small networks."
            .into()
    }

    fn insight(&self) -> String {
        "PBFT uses rounds of votes: ideal for small, trusted networks.".into()
    }

    fn elect(
        &self,
        round: u64,
        candidates: &[Candidate],
        rng: &mut dyn RngCore,
    ) -> Election {
        if candidates.is_empty() {
            return Election {
                proposer: None,
                votes: Some(VoteTally { approvals: 0, total: 0 }),
            };
        }

        let leader = candidates[(round % candidates.len() as u64) as usize].id;
        let approvals = candidates
            .iter()
            .filter(|_| rng.gen_bool(self.reliability))
            .count() as u32;
        let votes = VoteTally { approvals, total: candidates.len() as u32 };

        Election {
            proposer: votes.has_quorum().then_some(leader),
            votes: Some(votes),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::Pbft;
    use crate::{
        consensus::{Candidate, ConsensusEngine, VoteTally},
        node::{NodeId, NodeKind},
    };

    fn candidates(n: u64) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate { id: NodeId(i), kind: NodeKind::Validator, level: 1 })
            .collect()
    }

    #[test]
    fn leader_rotates_with_round() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let engine = Pbft::with_reliability(1.0);
        let nodes = candidates(3);

        for round in 0..6 {
            let election = engine.elect(round, &nodes, &mut rng);
            assert_eq!(election.proposer, Some(NodeId(round % 3)));
            assert_eq!(election.votes, Some(VoteTally { approvals: 3, total: 3 }));
        }
    }

    #[test]
    fn no_quorum_no_proposer() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let election = Pbft::with_reliability(0.0).elect(1, &candidates(4), &mut rng);

        assert_eq!(election.proposer, None);
        assert_eq!(election.votes, Some(VoteTally { approvals: 0, total: 4 }));
    }

    #[test]
    #[should_panic]
    fn reliability_out_of_range() {
        Pbft::with_reliability(1.5);
    }
}

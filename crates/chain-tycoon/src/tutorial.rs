//! Guided steps for new players, and the milestone counters shown next to
//! them.
//!
//! Nothing here is stored. A step is complete when its predicate holds for
//! the state it is checked against, so undoing progress (e.g. switching back
//! to proof-of-work) makes a step incomplete again.

use serde::Serialize;

use crate::{consensus::ConsensusMode, resources::Amount, state::GameState};

/// One step of the tutorial.
#[derive(Clone, Copy)]
pub struct TutorialStep {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub goal: &'static str,
    pub tip: &'static str,
    complete: fn(&GameState) -> bool,
}

impl TutorialStep {
    #[inline]
    pub fn is_complete(&self, state: &GameState) -> bool {
        (self.complete)(state)
    }
}

impl std::fmt::Debug for TutorialStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorialStep")
            .field("id", &self.id)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// The tutorial, in the order it is meant to be followed.
pub static STEPS: [TutorialStep; 5] = [
    TutorialStep {
        id: "intro",
        title: "Welcome to Chain Tycoon",
        description: "Look around the campus and pick a building to find out \
                      which role it plays in the network.",
        goal: "Select an existing node to read its explanation.",
        tip: "Blinking buildings are the ones you can inspect.",
        complete: |s| s.selected_node_id.is_some(),
    },
    TutorialStep {
        id: "build",
        title: "Grow your network",
        description: "The genesis block paid you some tokens. Invest them in \
                      new infrastructure.",
        goal: "Build one more node.",
        tip: "Pick a type that fits your lesson, e.g. a validator to talk \
              about consensus.",
        complete: |s| s.nodes.len() >= 3,
    },
    TutorialStep {
        id: "consensus",
        title: "Reach network consensus",
        description: "Run a consensus round to add a block to the chain and \
                      claim its rewards.",
        goal: "Run one consensus round.",
        tip: "A round needs more than 30 energy.",
        complete: |s| s.chain.len() > 1,
    },
    TutorialStep {
        id: "contract",
        title: "Activate a smart contract",
        description: "Smart contracts enforce rules automatically. Spend \
                      knowledge to deploy one.",
        goal: "Deploy at least one smart contract upgrade.",
        tip: "Deploying costs tokens and knowledge but raises your \
              reputation.",
        complete: |s| s.smart_contract_level > 0,
    },
    TutorialStep {
        id: "governance",
        title: "Experiment with consensus modes",
        description: "Compare proof-of-work, proof-of-stake and PBFT and watch \
                      what happens to network health.",
        goal: "Switch to another consensus mode.",
        tip: "New modes unlock as knowledge and reputation grow.",
        complete: |s| s.consensus_mode != ConsensusMode::Pow,
    },
];

/// A tutorial step together with whether it is currently complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepStatus {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub goal: &'static str,
    pub tip: &'static str,
    pub completed: bool,
}

/// Evaluates every step against `state`.
pub fn status(state: &GameState) -> Vec<StepStatus> {
    STEPS
        .iter()
        .map(|step| StepStatus {
            id: step.id,
            title: step.title,
            description: step.description,
            goal: step.goal,
            tip: step.tip,
            completed: step.is_complete(state),
        })
        .collect()
}

/// The first incomplete step, or the last step once all are done.
pub fn current(state: &GameState) -> &'static TutorialStep {
    let last = &STEPS[STEPS.len() - 1];
    STEPS
        .iter()
        .find(|step| !step.is_complete(state))
        .unwrap_or(last)
}

/// Returns true once every step is complete.
pub fn is_finished(state: &GameState) -> bool {
    STEPS.iter().all(|step| step.is_complete(state))
}

/// How far the player is from the next round numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestones {
    pub nodes_to_build: usize,
    pub rounds_to_run: usize,
    pub next_contract_level: u32,
    pub students_to_inspire: Amount,
}

impl Milestones {
    pub const NODE_TARGET: usize = 4;
    pub const ROUND_TARGET: usize = 3;
    pub const STUDENT_TARGET: Amount = 50.0;

    pub fn from_state(state: &GameState) -> Self {
        // The genesis block is not a round the player ran.
        let rounds_run = state.chain.len().saturating_sub(1);

        Milestones {
            nodes_to_build: Self::NODE_TARGET.saturating_sub(state.nodes.len()),
            rounds_to_run: Self::ROUND_TARGET.saturating_sub(rounds_run),
            next_contract_level: state.smart_contract_level + 1,
            students_to_inspire: (Self::STUDENT_TARGET
                - state.resources.students_inspired)
                .max(0.0),
        }
    }
}

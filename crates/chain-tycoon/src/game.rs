/*!
A single game: state, rules, engines and the sources of time and randomness.

# Examples
Build a seeded game and play a few actions:

```
use chain_tycoon::prelude::*;

let mut game = Game::builder().seed(7).build().unwrap();

assert!(game.dispatch(Action::Build(NodeKind::Research)).is_applied());
for _ in 0..3 {
    game.dispatch(Action::Tick);
}
assert!(game.dispatch(Action::RunConsensus).is_applied());

assert_eq!(game.state().nodes.len(), 3);
assert_eq!(game.state().chain.len(), 2);
```
*/

mod builder;

pub use builder::{GameBuildError, GameBuilder};

use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::debug;

use crate::{
    action::{Action, Outcome},
    campus::{self, PlotState},
    clock::Clock,
    consensus::{self, ConsensusMode, Engines},
    reducer::{reduce, Context},
    rules::Rules,
    state::GameState,
    tutorial::{self, Milestones, StepStatus, TutorialStep},
};

/// Owns a [`GameState`] and everything needed to advance it.
#[derive(Debug, Clone)]
pub struct Game {
    state: GameState,
    rules: Rules,
    engines: Engines,
    rng: ChaCha8Rng,
    clock: Box<dyn Clock>,
}

impl Game {
    /// Returns a [`GameBuilder`] with default rules and engines.
    pub fn builder() -> GameBuilder {
        GameBuilder::new()
    }

    /// Applies `action` and returns what became of it.
    pub fn dispatch(&mut self, action: Action) -> Outcome {
        let mut ctx = Context {
            rules: &self.rules,
            engines: &self.engines,
            rng: &mut self.rng,
            now: self.clock.now(),
        };
        let (next, outcome) = reduce(&self.state, action, &mut ctx);
        self.state = next;

        match outcome {
            Outcome::Rejected(reason) => {
                debug!(?action, %reason, "action rejected");
            }
            _ => {
                debug!(?action, ?outcome, cycle = self.state.cycle, "action dispatched");
            }
        }

        outcome
    }

    #[inline]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[inline]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    #[inline]
    pub fn engines(&self) -> &Engines {
        &self.engines
    }

    pub fn tutorial(&self) -> Vec<StepStatus> {
        tutorial::status(&self.state)
    }

    pub fn current_tutorial(&self) -> &'static TutorialStep {
        tutorial::current(&self.state)
    }

    pub fn plots(&self) -> Vec<PlotState> {
        campus::plot_states(&self.state)
    }

    /// Consensus modes the player may switch to right now.
    pub fn unlocked_consensus(&self) -> Vec<ConsensusMode> {
        consensus::unlocked_modes(&self.state, &self.rules.consensus_unlocks)
    }

    pub fn milestones(&self) -> Milestones {
        Milestones::from_state(&self.state)
    }

    /// Captures the state together with every view derived from it.
    pub fn snapshot(&self) -> Snapshot {
        let tutorial = self.tutorial();
        let current = self.current_tutorial().id;
        let current_tutorial = tutorial
            .iter()
            .position(|step| step.id == current)
            .unwrap_or(tutorial.len().saturating_sub(1));

        Snapshot {
            state: self.state.clone(),
            current_tutorial,
            tutorial,
            plots: self.plots(),
            unlocked_consensus: self.unlocked_consensus(),
            milestones: self.milestones(),
        }
    }
}

/// A read-only view of a game for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub state: GameState,
    pub tutorial: Vec<StepStatus>,
    /// Index into `tutorial` of the step the player should work on.
    pub current_tutorial: usize,
    pub plots: Vec<PlotState>,
    pub unlocked_consensus: Vec<ConsensusMode>,
    pub milestones: Milestones,
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

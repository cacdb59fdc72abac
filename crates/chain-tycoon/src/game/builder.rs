use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::{
    clock::{Clock, SystemClock},
    consensus::{ConsensusEngine, Engines},
    rules::{Rules, RulesError},
    state::{GameState, StateError},
};

use super::Game;

/// Builds a [Game].
#[derive(Debug, Default)]
pub struct GameBuilder {
    pub seed: Option<u64>,
    pub rules: Option<Rules>,
    pub initial_state: Option<GameState>,
    engines: Engines,
    clock: Option<Box<dyn Clock>>,
}

#[derive(Debug, thiserror::Error)]
pub enum GameBuildError {
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(
        "initial state keeps {state} log entries but the rules keep {rules}"
    )]
    LogCapacityMismatch { state: usize, rules: usize },
    #[error("invalid initial state")]
    InvalidInitialState(#[from] StateError),
}

impl GameBuilder {
    /// Creates a new [GameBuilder].
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the random source, making elections and block hashes
    /// reproducible. Games are seeded from OS entropy otherwise.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);

        self
    }

    /// Sets the economy the game runs under ([Rules::default] otherwise).
    pub fn rules(mut self, rules: Rules) -> Self {
        self.rules = Some(rules);

        self
    }

    /// Registers `engine` for the consensus mode it reports, replacing the
    /// built-in engine for that mode.
    pub fn engine<E: ConsensusEngine + 'static>(mut self, engine: E) -> Self {
        self.engines.replace(Box::new(engine));

        self
    }

    /// Sets the time source ([SystemClock] otherwise).
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Box::new(clock));

        self
    }

    /// Starts the game from `state` instead of the genesis state.
    pub fn initial_state(mut self, state: GameState) -> Self {
        self.initial_state = Some(state);

        self
    }

    /// Creates a [Game] from the specified parameters.
    pub fn build(self) -> Result<Game, GameBuildError> {
        use GameBuildError::*;

        let GameBuilder {
            seed,
            rules,
            initial_state,
            engines,
            clock,
        } = self;

        let rules = rules.unwrap_or_default();
        rules.validate()?;

        let clock = clock.unwrap_or_else(|| Box::new(SystemClock));
        let state = match initial_state {
            Some(state) if state.logs.capacity() != rules.log_capacity => {
                return Err(LogCapacityMismatch {
                    state: state.logs.capacity(),
                    rules: rules.log_capacity,
                })
            }
            Some(mut state) => {
                state.validate(&rules)?;
                state.resync_node_ids();
                state
            }
            None => GameState::genesis(&rules, clock.now()),
        };
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        debug!(?seed, layout = ?rules.layout, "game built");

        Ok(Game {
            state,
            rules,
            engines,
            rng,
            clock,
        })
    }
}

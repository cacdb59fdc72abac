/*!
Batch runs of scripted players, for balancing the economy.

# Examples

```
use chain_tycoon::prelude::*;

let group = AutoplayBuilder::new()
    .add_policy(Idle::new())
    .add_policy(Curriculum::new())
    .cycles(40)
    .seeds(0..4)
    .build()
    .unwrap();

let results = group.run_all().unwrap();
assert_eq!(results.runs().len(), 8);

println!("{}", results.format(Format::Csv));
```
*/

mod builder;
pub mod policy;
pub mod results;

pub use builder::{AutoplayBuildError, AutoplayBuilder};
pub use policy::{Curriculum, Greedy, Idle, Policy};
pub use results::{AutoplayResults, Format, PolicySummary, RunOutput};

use std::num::NonZeroUsize;

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::info;

use crate::{
    action::{Action, Outcome},
    clock::{ManualClock, Timestamp},
    game::{Game, GameBuildError},
    rules::Rules,
    session::DEFAULT_TICK_PERIOD,
    tutorial,
};

/// Container for a group of runs which share rules and seeds. Runs should be
/// started with this struct's `run_all` method.
#[derive(Debug, Clone)]
pub struct AutoplayGroup {
    rules: Rules,
    policies: Vec<Box<dyn Policy>>,
    seeds: Vec<u64>,
    cycles: NonZeroUsize,
}

impl AutoplayGroup {
    pub fn builder() -> AutoplayBuilder {
        AutoplayBuilder::new()
    }

    /// Plays every policy once per seed. Runs execute in parallel when the
    /// `rayon` feature is enabled.
    pub fn run_all(self) -> Result<AutoplayResults, GameBuildError> {
        let AutoplayGroup {
            rules,
            policies,
            seeds,
            cycles,
        } = self;

        // Validated by the builder, so never empty.
        let repeated = NonZeroUsize::new(seeds.len()).unwrap_or(NonZeroUsize::MIN);
        let runs: Vec<_> = policies
            .iter()
            .flat_map(|policy| {
                seeds.iter().map(|&seed| Run {
                    rules: rules.clone(),
                    policy: policy.clone(),
                    seed,
                    cycles: cycles.get(),
                })
            })
            .collect();

        info!(runs = runs.len(), cycles = cycles.get(), "autoplay started");

        #[cfg(feature = "rayon")]
        let outputs: Result<Vec<_>, _> = runs.into_par_iter().map(Run::run).collect();
        #[cfg(not(feature = "rayon"))]
        let outputs: Result<Vec<_>, _> = runs.into_iter().map(Run::run).collect();

        Ok(AutoplayResults::new(outputs?, repeated))
    }
}

/// One policy playing one seeded game.
#[derive(Debug, Clone)]
struct Run {
    rules: Rules,
    policy: Box<dyn Policy>,
    seed: u64,
    cycles: usize,
}

impl Run {
    fn run(self) -> Result<RunOutput, GameBuildError> {
        let Run {
            rules,
            mut policy,
            seed,
            cycles,
        } = self;

        let clock = ManualClock::new(Timestamp(0));
        let mut game = Game::builder()
            .seed(seed)
            .rules(rules)
            .clock(clock.clone())
            .build()?;

        let (mut applied, mut rejected, mut ignored) = (0, 0, 0);
        let mut tutorial_finished_at = None;

        for _ in 0..cycles {
            for action in policy.next_actions(&game) {
                match game.dispatch(action) {
                    Outcome::Applied => applied += 1,
                    Outcome::Rejected(_) => rejected += 1,
                    Outcome::Ignored => ignored += 1,
                }
            }

            clock.advance(DEFAULT_TICK_PERIOD);
            game.dispatch(Action::Tick);

            if tutorial_finished_at.is_none() && tutorial::is_finished(game.state())
            {
                tutorial_finished_at = Some(game.state().cycle);
            }
        }

        Ok(RunOutput {
            policy: policy.name(),
            seed,
            cycles,
            final_state: game.state().clone(),
            applied,
            rejected,
            ignored,
            tutorial_finished_at,
        })
    }
}

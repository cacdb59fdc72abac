/*!
Re-export of common values and datatypes used for playing and analyzing
games. Must be imported manually.

```
use chain_tycoon::prelude::*;
```
*/

use crate::{
    action, activity, autoplay, campus, chain, clock, consensus, game, mining,
    node, reducer, resources, rules, session, state, tutorial,
};

pub use action::{Action, Outcome, Rejection};

pub use activity::{ActivityLog, Category, LogEntry};

pub use autoplay::{
    AutoplayBuildError, AutoplayBuilder, AutoplayGroup, AutoplayResults,
    Curriculum, Format, Greedy, Idle, Policy, PolicySummary, RunOutput,
};

pub use campus::{District, PlotId, PlotState};

pub use chain::{Block, BlockHash, Chain};

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};

pub use consensus::{
    Candidate, ConsensusEngine, ConsensusMode, Election, Engines, Pbft,
    ProofOfStake, ProofOfWork, VoteTally,
};

pub use game::{Game, GameBuildError, GameBuilder, Snapshot};

pub use mining::{CancelFlag, NonceSearch, Proof, SearchError};

pub use node::{Node, NodeId, NodeKind, NodeStatus};

pub use reducer::{reduce, Context};

pub use resources::{Amount, Cost, Resources};

pub use rules::{Layout, Rules, RulesError};

pub use session::{Session, SessionError, TickScheduler, DEFAULT_TICK_PERIOD};

pub use state::{GameState, StateError};

pub use tutorial::{Milestones, StepStatus};

//! Scripted players.

use std::fmt::Debug;

use dyn_clone::DynClone;

use crate::{
    action::Action,
    consensus::ConsensusMode,
    game::Game,
    node::NodeKind,
    tutorial,
};

/// Decides what a scripted player does between two ticks.
///
/// Every run gets its own clone of the policy, so a policy may keep state
/// between calls.
pub trait Policy: Debug + DynClone + Send {
    /// Actions to dispatch, in order, before the next tick. Later actions see
    /// the effects of earlier ones.
    fn next_actions(&mut self, game: &Game) -> Vec<Action>;

    /// Returns the name of the policy.
    fn name(&self) -> String {
        "Name not set".into()
    }
}

dyn_clone::clone_trait_object!(Policy);

/// Never does anything. A baseline for what the campus produces on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

impl Idle {
    pub fn new() -> Self {
        Idle
    }
}

impl Policy for Idle {
    fn next_actions(&mut self, _game: &Game) -> Vec<Action> {
        vec![]
    }

    fn name(&self) -> String {
        "Idle".into()
    }
}

/// Spends resources as soon as it has them: runs consensus whenever there is
/// energy, deploys contracts when affordable and otherwise builds the
/// affordable node with the highest token output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl Greedy {
    pub fn new() -> Self {
        Greedy
    }
}

impl Policy for Greedy {
    fn next_actions(&mut self, game: &Game) -> Vec<Action> {
        let state = game.state();
        let rules = game.rules();
        let res = &state.resources;
        let mut actions = vec![];

        if res.energy >= rules.round.min_energy {
            actions.push(Action::RunConsensus);
        }

        if res.can_afford(&rules.contract.cost(state.smart_contract_level)) {
            actions.push(Action::DeployContract);
        } else if let Some(kind) = NodeKind::ALL
            .into_iter()
            .filter(|&kind| res.can_afford(rules.build_cost(kind)))
            .max_by(|a, b| {
                let a = rules.production.get(*a).tokens;
                let b = rules.production.get(*b).tokens;
                a.total_cmp(&b)
            })
        {
            actions.push(Action::Build(kind));
        }

        actions
    }

    fn name(&self) -> String {
        "Greedy".into()
    }
}

/// Works through the tutorial one step at a time, then stops acting.
#[derive(Debug, Clone, Copy, Default)]
pub struct Curriculum;

impl Curriculum {
    pub fn new() -> Self {
        Curriculum
    }
}

impl Policy for Curriculum {
    fn next_actions(&mut self, game: &Game) -> Vec<Action> {
        let state = game.state();
        let rules = game.rules();
        let res = &state.resources;

        if tutorial::is_finished(state) {
            return vec![];
        }

        let action = match game.current_tutorial().id {
            "intro" => Action::Select(state.nodes.first().map(|n| n.id)),
            "build" => Action::Build(NodeKind::Research),
            "consensus" if res.energy >= rules.round.min_energy => {
                Action::RunConsensus
            }
            "consensus" => return vec![],
            "contract" => {
                let cost = rules.contract.cost(state.smart_contract_level);
                if res.can_afford(&cost) {
                    Action::DeployContract
                } else if res.tokens >= cost.tokens + rules.workshop.token_cost
                {
                    Action::LaunchWorkshop
                } else {
                    return vec![];
                }
            }
            _ => match game
                .unlocked_consensus()
                .into_iter()
                .find(|&mode| mode != ConsensusMode::Pow)
            {
                Some(mode) => Action::SwitchConsensus(mode),
                None => Action::LaunchWorkshop,
            },
        };

        vec![action]
    }

    fn name(&self) -> String {
        "Curriculum".into()
    }
}

#[cfg(test)]
mod tests {
    use super::{Curriculum, Greedy, Idle, Policy};
    use crate::{
        action::Action, game::Game, node::NodeKind, rules::Rules,
        state::GameState,
    };

    fn game() -> Game {
        Game::builder().seed(8).build().unwrap()
    }

    #[test]
    fn idle_does_nothing() {
        assert!(Idle.next_actions(&game()).is_empty());
    }

    #[test]
    fn greedy_opens_with_consensus_and_contract() {
        let actions = Greedy.next_actions(&game());

        assert_eq!(actions, vec![Action::RunConsensus, Action::DeployContract]);
    }

    #[test]
    fn greedy_builds_top_earner_without_contract() {
        let mut state = GameState::genesis(&Rules::default(), Default::default());
        // Every node is affordable, a contract needs 14 knowledge.
        state.resources.knowledge = 13.0;
        let game = Game::builder().seed(8).initial_state(state).build().unwrap();

        assert_eq!(
            Greedy.next_actions(&game),
            vec![Action::RunConsensus, Action::Build(NodeKind::Miner)]
        );
    }

    #[test]
    fn greedy_skips_consensus_without_energy() {
        let mut game = game();
        for _ in 0..3 {
            game.dispatch(Action::RunConsensus);
        }

        assert_eq!(Greedy.next_actions(&game), vec![Action::DeployContract]);
    }

    #[test]
    fn greedy_waits_when_broke() {
        let mut game = game();
        game.dispatch(Action::LaunchWorkshop);
        game.dispatch(Action::LaunchWorkshop);
        game.dispatch(Action::DeployContract);

        // 50 tokens cannot pay for any node or the next contract.
        assert_eq!(Greedy.next_actions(&game), vec![Action::RunConsensus]);
    }

    #[test]
    fn curriculum_follows_steps() {
        let mut game = game();
        let mut policy = Curriculum;

        let first = policy.next_actions(&game);
        assert!(matches!(first[..], [Action::Select(Some(_))]));
        game.dispatch(first[0]);

        assert_eq!(policy.next_actions(&game), vec![Action::Build(NodeKind::Research)]);
    }
}

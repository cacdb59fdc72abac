//! The state transition function.
//!
//! [`reduce`] is the only way a [`GameState`] changes. Each action either
//! takes full effect or leaves the state untouched apart from one log entry
//! explaining the rejection. The reducer never panics on bad input: unknown
//! node IDs and redundant actions are ignored.

use rand::RngCore;

use crate::{
    action::{Action, Outcome, Rejection},
    activity::Category,
    campus,
    chain::{BlockDraft, BlockHash},
    clock::Timestamp,
    consensus::{Candidate, ConsensusMode, Engines},
    node::{Node, NodeId, NodeKind, NodeStatus, Placement},
    resources::Resources,
    rules::{Layout, Rules},
    state::GameState,
};

/// Transactions recorded on every block produced by a consensus round.
const ROUND_TRANSACTIONS: [&str; 2] = [
    "Educational token reward for students",
    "Smart contract logging: digital certificates issued",
];

/// Everything besides the state which a transition may consult.
pub struct Context<'a> {
    pub rules: &'a Rules,
    pub engines: &'a Engines,
    /// Source of randomness for elections and block hashes.
    pub rng: &'a mut dyn RngCore,
    /// Time stamped on new log entries and blocks.
    pub now: Timestamp,
}

/// Applies `action` to `state`, returning the next state and what happened.
pub fn reduce(
    state: &GameState,
    action: Action,
    ctx: &mut Context<'_>,
) -> (GameState, Outcome) {
    let mut next = state.clone();

    let outcome = match action {
        Action::Tick => tick(&mut next, ctx),
        Action::Build(kind) => build(&mut next, kind, ctx),
        Action::Upgrade(id) => upgrade(&mut next, id, ctx),
        Action::Select(id) => {
            next.selected_node_id = id;
            Outcome::Applied
        }
        Action::SwitchConsensus(mode) => switch_consensus(&mut next, mode, ctx),
        Action::RunConsensus => run_consensus(&mut next, ctx),
        Action::DeployContract => deploy_contract(&mut next, ctx),
        Action::LaunchWorkshop => launch_workshop(&mut next, ctx),
        Action::TogglePause => {
            next.paused = !next.paused;
            Outcome::Applied
        }
    };

    match outcome {
        Outcome::Applied => (next, outcome),
        Outcome::Ignored => (state.clone(), outcome),
        Outcome::Rejected(reason) => {
            let mut rejected = state.clone();
            rejected
                .logs
                .push(ctx.now, category_of(&reason), reason.to_string());

            (rejected, outcome)
        }
    }
}

fn category_of(reason: &Rejection) -> Category {
    match reason {
        Rejection::ConsensusLocked(_) | Rejection::LowEnergy { .. } => {
            Category::Consensus
        }
        Rejection::CannotAffordContract(_) => Category::Contract,
        Rejection::CannotAffordBuild(_)
        | Rejection::NoPlotAvailable
        | Rejection::CannotAffordUpgrade(_)
        | Rejection::CannotAffordWorkshop(_) => Category::Education,
    }
}

#[inline]
fn clamp_energy(resources: &mut Resources, rules: &Rules) {
    resources.energy = resources.energy.clamp(0.0, rules.energy_max);
}

fn tick(state: &mut GameState, ctx: &mut Context<'_>) -> Outcome {
    if state.paused {
        return Outcome::Ignored;
    }

    let rules = ctx.rules;
    state.cycle += 1;

    for node in state
        .nodes
        .iter_mut()
        .filter(|n| n.status == NodeStatus::Building)
    {
        node.progress = (node.progress + rules.build_step).min(1.0);
        if node.progress >= 1.0 {
            node.status = NodeStatus::Active;
            node.progress = 1.0;
            state.logs.push(
                ctx.now,
                Category::Education,
                format!(
                    "{} is now operational. Discuss with students which role \
                     this building plays.",
                    node.name
                ),
            );
        }
    }

    let mut produced = Resources::default();
    for node in state.nodes.iter().filter(|n| n.is_active()) {
        produced +=
            *rules.production.get(node.kind) * node.multiplier(rules.level_bonus);
    }
    state.resources += produced;
    state
        .resources
        .clamp_bounded(rules.energy_max, rules.consensus_health_max);

    if state.cycle % rules.summary_every == 0 {
        state.logs.push(
            ctx.now,
            Category::Education,
            "Your network produced resources. Check the resource bar to see \
             what each building contributed.",
        );
    }

    Outcome::Applied
}

fn build(state: &mut GameState, kind: NodeKind, ctx: &mut Context<'_>) -> Outcome {
    let rules = ctx.rules;
    let cost = *rules.build_cost(kind);

    if !state.resources.can_afford(&cost) {
        return Outcome::Rejected(Rejection::CannotAffordBuild(cost));
    }

    let placement = match rules.layout {
        Layout::Campus => match campus::first_available(state) {
            Some(plot) => Placement {
                plot: Some(plot.id),
                position: plot.position,
            },
            None => return Outcome::Rejected(Rejection::NoPlotAvailable),
        },
        Layout::Grid => Placement {
            plot: None,
            // Slot 0 is left free; genesis nodes take slots 1 and 2.
            position: campus::grid_position(state.nodes.len() + 1),
        },
    };

    state.resources.pay(&cost);
    clamp_energy(&mut state.resources, rules);

    let id = state.allocate_node_id();
    let name = format!("{} {}", kind.label(), state.nodes.len() + 1);
    state.logs.push(
        ctx.now,
        Category::Tokens,
        format!(
            "Construction started: {name}. It will soon be active and \
             producing resources."
        ),
    );
    state
        .nodes
        .push(Node::under_construction(id, kind, name, placement));
    state.selected_node_id = Some(id);

    Outcome::Applied
}

fn upgrade(state: &mut GameState, id: NodeId, ctx: &mut Context<'_>) -> Outcome {
    let rules = ctx.rules;
    let Some(index) = state.nodes.iter().position(|n| n.id == id) else {
        return Outcome::Ignored;
    };

    let kind = state.nodes[index].kind;
    let cost = *rules.upgrade_cost(kind);
    if !state.resources.can_afford(&cost) {
        return Outcome::Rejected(Rejection::CannotAffordUpgrade(cost));
    }

    state.resources.pay(&cost);
    clamp_energy(&mut state.resources, rules);

    let node = &mut state.nodes[index];
    node.level += 1;
    node.status = NodeStatus::Active;
    node.progress = 1.0;

    let message = format!(
        "{} level {} unlocks new lessons about {}.",
        node.name,
        node.level,
        kind.lesson()
    );
    state.logs.push(ctx.now, Category::Education, message);

    Outcome::Applied
}

fn switch_consensus(
    state: &mut GameState,
    mode: ConsensusMode,
    ctx: &mut Context<'_>,
) -> Outcome {
    let rules = ctx.rules;
    if state.consensus_mode == mode {
        return Outcome::Ignored;
    }
    if rules.enforce_consensus_unlocks
        && !mode.is_unlocked(state, &rules.consensus_unlocks)
    {
        return Outcome::Rejected(Rejection::ConsensusLocked(mode));
    }

    state.consensus_mode = mode;
    state.logs.push(
        ctx.now,
        Category::Consensus,
        ctx.engines.get(mode).describe(),
    );

    Outcome::Applied
}

fn run_consensus(state: &mut GameState, ctx: &mut Context<'_>) -> Outcome {
    let rules = ctx.rules;
    let round = &rules.round;

    if state.resources.energy < round.min_energy {
        return Outcome::Rejected(Rejection::LowEnergy {
            required: round.min_energy,
            available: state.resources.energy,
        });
    }

    let engine = ctx.engines.get(state.consensus_mode);
    let (minted_by, minted_by_name) = match state.best_node() {
        Some(node) => (Some(node.id), node.name.clone()),
        None => (None, "Unknown node".to_string()),
    };
    let candidates = Candidate::from_nodes(&state.nodes);
    let election = engine.elect(state.chain.len() as u64, &candidates, ctx.rng);

    let block = state.chain.extend(BlockDraft {
        hash: BlockHash::random(ctx.rng),
        timestamp: ctx.now,
        minted_by,
        minted_by_name,
        consensus: state.consensus_mode,
        difficulty: engine.difficulty(),
        transactions: ROUND_TRANSACTIONS.iter().map(|t| t.to_string()).collect(),
        insight: engine.insight(),
        election: Some(election),
    });
    let message = format!(
        "New block {} created by {}. {}",
        block.index, block.minted_by_name, block.insight
    );

    let res = &mut state.resources;
    res.tokens += round.token_reward;
    res.reputation += round.reputation_reward;
    res.energy = (res.energy - round.energy_cost).clamp(0.0, rules.energy_max);
    res.consensus_health = (res.consensus_health + round.health_gain)
        .clamp(0.0, rules.consensus_health_max);

    state.logs.push(ctx.now, Category::Consensus, message);

    Outcome::Applied
}

fn deploy_contract(state: &mut GameState, ctx: &mut Context<'_>) -> Outcome {
    let contract = &ctx.rules.contract;
    let cost = contract.cost(state.smart_contract_level);

    if !state.resources.can_afford(&cost) {
        return Outcome::Rejected(Rejection::CannotAffordContract(cost));
    }

    state.smart_contract_level += 1;
    let res = &mut state.resources;
    res.tokens = res.tokens - cost.tokens + contract.token_refund;
    res.knowledge = res.knowledge - cost.knowledge + contract.knowledge_refund;
    res.reputation += contract.reputation_reward;
    res.students_inspired += contract.students_reward;

    state.logs.push(
        ctx.now,
        Category::Contract,
        format!(
            "Smart contract level {} activated: students now claim their \
             certificates automatically through the blockchain!",
            state.smart_contract_level
        ),
    );

    Outcome::Applied
}

fn launch_workshop(state: &mut GameState, ctx: &mut Context<'_>) -> Outcome {
    let workshop = &ctx.rules.workshop;

    if state.resources.tokens < workshop.token_cost {
        return Outcome::Rejected(Rejection::CannotAffordWorkshop(
            workshop.token_cost,
        ));
    }

    let res = &mut state.resources;
    res.tokens -= workshop.token_cost;
    res.knowledge += workshop.knowledge_reward;
    res.reputation += workshop.reputation_reward;
    res.students_inspired += workshop.students_reward;

    state.logs.push(
        ctx.now,
        Category::Education,
        "Workshop held! Students are now learning about smart contracts and \
         governance.",
    );

    Outcome::Applied
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{reduce, Context};
    use crate::{
        action::{Action, Outcome, Rejection},
        campus::PlotId,
        clock::Timestamp,
        consensus::{ConsensusMode, Engines},
        node::{NodeId, NodeKind, NodeStatus},
        rules::{Layout, Rules},
        state::GameState,
    };

    struct Harness {
        rules: Rules,
        engines: Engines,
        rng: ChaCha8Rng,
        state: GameState,
    }

    impl Harness {
        fn new(rules: Rules) -> Self {
            let state = GameState::genesis(&rules, Timestamp(0));
            Harness {
                rules,
                engines: Engines::default(),
                rng: ChaCha8Rng::seed_from_u64(42),
                state,
            }
        }

        fn apply(&mut self, action: Action) -> Outcome {
            let mut ctx = Context {
                rules: &self.rules,
                engines: &self.engines,
                rng: &mut self.rng,
                now: Timestamp(1),
            };
            let (next, outcome) = reduce(&self.state, action, &mut ctx);
            self.state = next;

            outcome
        }
    }

    fn harness() -> Harness {
        Harness::new(Rules::default())
    }

    #[test]
    fn build_deducts_cost_and_selects() {
        let mut h = harness();
        let outcome = h.apply(Action::Build(NodeKind::Miner));

        assert_eq!(outcome, Outcome::Applied);
        let res = &h.state.resources;
        assert_eq!((res.tokens, res.knowledge, res.energy), (100.0, 16.0, 90.0));
        assert_eq!(h.state.nodes.len(), 3);

        let node = h.state.nodes.last().unwrap();
        assert_eq!(node.status, NodeStatus::Building);
        assert_eq!(node.progress, 0.0);
        assert_eq!(node.name, "Mining Rig 3");
        assert_eq!(node.placement.plot, Some(PlotId::B1));
        assert_eq!(h.state.selected_node_id, Some(node.id));
    }

    #[test]
    fn three_ticks_finish_construction() {
        let mut h = harness();
        h.apply(Action::Build(NodeKind::Research));
        let logs_before = h.state.logs.len();

        h.apply(Action::Tick);
        assert!((h.state.nodes[2].progress - 0.35).abs() < 1e-9);
        h.apply(Action::Tick);
        assert!((h.state.nodes[2].progress - 0.70).abs() < 1e-9);
        assert_eq!(h.state.nodes[2].status, NodeStatus::Building);
        h.apply(Action::Tick);
        assert_eq!(h.state.nodes[2].progress, 1.0);
        assert_eq!(h.state.nodes[2].status, NodeStatus::Active);

        let transitions = h
            .state
            .logs
            .iter()
            .filter(|e| e.message.contains("is now operational"))
            .count();
        assert_eq!(transitions, 1);
        // One transition entry plus the third-cycle summary.
        assert_eq!(h.state.logs.len(), logs_before + 2);
    }

    #[test]
    fn tick_applies_level_scaled_production() {
        let mut h = harness();
        h.state.nodes[0].level = 3;
        let before = h.state.resources;

        h.apply(Action::Tick);

        // Miner at level 3 (x1.7) plus validator at level 1.
        let expected_tokens = before.tokens + 14.0 * 1.7 + 8.0;
        assert!((h.state.resources.tokens - expected_tokens).abs() < 1e-9);
        let expected_energy = before.energy - 12.0 * 1.7 - 6.0;
        assert!((h.state.resources.energy - expected_energy).abs() < 1e-9);
        assert_eq!(h.state.cycle, 1);
    }

    #[test]
    fn paused_tick_is_ignored() {
        let mut h = harness();
        h.apply(Action::TogglePause);
        let before = h.state.clone();

        assert_eq!(h.apply(Action::Tick), Outcome::Ignored);
        assert_eq!(h.state, before);
    }

    #[test]
    fn tick_clamps_energy_at_zero() {
        let mut h = harness();
        h.state.resources.energy = 5.0;
        h.apply(Action::Tick);

        assert_eq!(h.state.resources.energy, 0.0);
    }

    #[test]
    fn build_without_plot_is_rejected() {
        let mut h = harness();
        h.state.resources.knowledge = 10.0;
        h.state.resources.tokens = 1000.0;
        let before = h.state.clone();

        let outcome = h.apply(Action::Build(NodeKind::Miner));

        assert_eq!(outcome, Outcome::Rejected(Rejection::NoPlotAvailable));
        assert_eq!(h.state.resources, before.resources);
        assert_eq!(h.state.nodes, before.nodes);
        assert_eq!(h.state.logs.len(), before.logs.len() + 1);
    }

    #[test]
    fn grid_layout_never_runs_out_of_space() {
        let mut h = Harness::new(Rules { layout: Layout::Grid, ..Default::default() });
        h.state.resources.tokens = 10_000.0;
        h.state.resources.knowledge = 10_000.0;

        for _ in 0..10 {
            h.state.resources.energy = 200.0;
            assert!(h.apply(Action::Build(NodeKind::Dapp)).is_applied());
        }

        assert_eq!(h.state.nodes.len(), 12);
        assert_eq!(h.state.nodes[2].placement.position, [6.0, 0.5, -3.0]);
        assert_eq!(h.state.nodes[11].placement.position, [0.0, 0.5, 4.0]);
    }

    #[test]
    fn upgrade_unknown_node_is_ignored() {
        let mut h = harness();
        let before = h.state.clone();

        assert_eq!(h.apply(Action::Upgrade(NodeId(99))), Outcome::Ignored);
        assert_eq!(h.state, before);
    }

    #[test]
    fn upgrade_finishes_construction() {
        let mut h = harness();
        h.apply(Action::Build(NodeKind::Miner));
        let id = h.state.nodes[2].id;

        assert!(h.apply(Action::Upgrade(id)).is_applied());

        let node = h.state.node(id).unwrap();
        assert_eq!(node.level, 2);
        assert_eq!(node.status, NodeStatus::Active);
        assert_eq!(node.progress, 1.0);
        assert_eq!(h.state.resources.tokens, 100.0 - 45.0);
        assert!(h.state.logs.latest().unwrap().message.contains("hashing"));
    }

    #[test]
    fn upgrade_without_resources_logs_once() {
        let mut h = harness();
        h.state.resources.tokens = 10.0;
        let logs = h.state.logs.len();

        let outcome = h.apply(Action::Upgrade(NodeId(0)));

        assert!(outcome.is_rejected());
        assert_eq!(h.state.nodes[0].level, 1);
        assert_eq!(h.state.logs.len(), logs + 1);
    }

    #[test]
    fn consensus_needs_energy() {
        let mut h = harness();
        h.state.resources.energy = 20.0;
        let logs = h.state.logs.len();

        let outcome = h.apply(Action::RunConsensus);

        assert_eq!(
            outcome,
            Outcome::Rejected(Rejection::LowEnergy { required: 30.0, available: 20.0 })
        );
        assert_eq!(h.state.chain.len(), 1);
        assert_eq!(h.state.logs.len(), logs + 1);
    }

    #[test]
    fn consensus_round_appends_linked_block() {
        let mut h = harness();
        h.state.nodes[1].level = 2;
        let before = h.state.resources;

        assert!(h.apply(Action::RunConsensus).is_applied());

        assert_eq!(h.state.chain.len(), 2);
        let block = &h.state.chain[1];
        assert_eq!(block.index, 1);
        assert_eq!(block.previous_hash, h.state.chain[0].hash);
        assert_eq!(block.difficulty, 5);
        assert_eq!(block.minted_by, Some(h.state.nodes[1].id));
        assert_eq!(block.minted_by_name, "Validator College");
        assert!(block.election.is_some());

        let res = &h.state.resources;
        assert_eq!(res.tokens, before.tokens + 45.0);
        assert_eq!(res.reputation, before.reputation + 8.0);
        assert_eq!(res.energy, before.energy - 35.0);
        assert_eq!(res.consensus_health, before.consensus_health + 12.0);
    }

    #[test]
    fn consensus_health_is_capped() {
        let mut h = harness();
        h.state.resources.consensus_health = 115.0;
        h.apply(Action::RunConsensus);

        assert_eq!(h.state.resources.consensus_health, 120.0);
    }

    #[test]
    fn locked_mode_is_rejected() {
        let mut h = harness();
        let outcome = h.apply(Action::SwitchConsensus(ConsensusMode::Pbft));

        assert_eq!(
            outcome,
            Outcome::Rejected(Rejection::ConsensusLocked(ConsensusMode::Pbft))
        );
        assert_eq!(h.state.consensus_mode, ConsensusMode::Pow);
    }

    #[test]
    fn unenforced_unlocks_allow_any_switch() {
        let mut h = Harness::new(Rules {
            enforce_consensus_unlocks: false,
            ..Default::default()
        });

        assert!(h.apply(Action::SwitchConsensus(ConsensusMode::Pbft)).is_applied());
        assert_eq!(h.state.consensus_mode, ConsensusMode::Pbft);
        assert!(h.state.logs.latest().unwrap().message.starts_with("PBFT"));

        assert!(h.apply(Action::RunConsensus).is_applied());
        assert_eq!(h.state.chain[1].difficulty, 2);
    }

    #[test]
    fn switch_to_current_mode_is_ignored() {
        let mut h = harness();
        let before = h.state.clone();

        assert_eq!(
            h.apply(Action::SwitchConsensus(ConsensusMode::Pow)),
            Outcome::Ignored
        );
        assert_eq!(h.state, before);
    }

    #[test]
    fn deploy_contract_nets_refund() {
        let mut h = harness();
        h.state.resources.tokens = 100.0;
        h.state.resources.knowledge = 20.0;

        assert!(h.apply(Action::DeployContract).is_applied());

        assert_eq!(h.state.smart_contract_level, 1);
        assert_eq!(h.state.resources.tokens, 70.0);
        assert_eq!(h.state.resources.knowledge, 18.0);
        assert_eq!(h.state.resources.reputation, 30.0);
        assert_eq!(h.state.resources.students_inspired, 18.0);

        // Level 1 costs 90 tokens, 20 knowledge.
        assert!(h.apply(Action::DeployContract).is_rejected());
        assert_eq!(h.state.smart_contract_level, 1);
    }

    #[test]
    fn workshop_trades_tokens_for_knowledge() {
        let mut h = harness();
        assert!(h.apply(Action::LaunchWorkshop).is_applied());

        let res = &h.state.resources;
        assert_eq!(res.tokens, 120.0);
        assert_eq!(res.knowledge, 36.0);
        assert_eq!(res.reputation, 24.0);
        assert_eq!(res.students_inspired, 22.0);

        h.state.resources.tokens = 39.0;
        assert_eq!(
            h.apply(Action::LaunchWorkshop),
            Outcome::Rejected(Rejection::CannotAffordWorkshop(40.0))
        );
    }

    #[test]
    fn toggle_pause_twice_restores_state() {
        let mut h = harness();
        let before = h.state.clone();

        h.apply(Action::TogglePause);
        assert!(h.state.paused);
        h.apply(Action::TogglePause);

        assert_eq!(h.state, before);
    }

    #[test]
    fn select_is_unconditional() {
        let mut h = harness();
        h.apply(Action::Select(Some(NodeId(1234))));
        assert_eq!(h.state.selected_node_id, Some(NodeId(1234)));

        h.apply(Action::Select(None));
        assert_eq!(h.state.selected_node_id, None);
    }
}

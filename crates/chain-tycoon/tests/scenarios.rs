use chain_tycoon::prelude::*;

fn game() -> Game {
    Game::builder()
        .seed(2024)
        .clock(ManualClock::new(Timestamp(0)))
        .build()
        .expect("default game builds")
}

#[test]
fn scenario_build_miner_from_genesis() {
    let mut game = game();
    let outcome = game.dispatch(Action::Build(NodeKind::Miner));

    assert_eq!(outcome, Outcome::Applied);
    let res = &game.state().resources;
    assert_eq!(res.tokens, 100.0);
    assert_eq!(res.knowledge, 16.0);
    assert_eq!(res.energy, 90.0);

    let node = game.state().nodes.last().unwrap();
    assert_eq!(node.kind, NodeKind::Miner);
    assert_eq!(node.status, NodeStatus::Building);
    assert_eq!(node.progress, 0.0);
    assert_eq!(game.state().selected_node_id, Some(node.id));
}

#[test]
fn scenario_construction_takes_three_ticks() {
    let mut game = game();
    game.dispatch(Action::Build(NodeKind::Validator));
    let id = game.state().selected_node_id.unwrap();

    let mut progress = vec![];
    for _ in 0..3 {
        game.dispatch(Action::Tick);
        progress.push(game.state().node(id).unwrap().progress);
    }

    assert!((progress[0] - 0.35).abs() < 1e-9);
    assert!((progress[1] - 0.70).abs() < 1e-9);
    assert_eq!(progress[2], 1.0);
    assert_eq!(game.state().node(id).unwrap().status, NodeStatus::Active);

    let operational = game
        .state()
        .logs
        .iter()
        .filter(|e| e.message.starts_with("Validator Node 3 is now operational"))
        .count();
    assert_eq!(operational, 1);
}

#[test]
fn scenario_consensus_needs_energy() {
    let mut state = GameState::genesis(&Rules::default(), Timestamp(0));
    state.resources.energy = 20.0;
    let mut game = Game::builder().seed(1).initial_state(state).build().unwrap();
    let logs = game.state().logs.len();

    let outcome = game.dispatch(Action::RunConsensus);

    assert!(matches!(outcome, Outcome::Rejected(Rejection::LowEnergy { .. })));
    assert_eq!(game.state().chain.len(), 1);
    assert_eq!(game.state().logs.len(), logs + 1);
    assert_eq!(game.state().logs.latest().unwrap().category, Category::Consensus);
}

#[test]
fn scenario_first_contract() {
    let mut state = GameState::genesis(&Rules::default(), Timestamp(0));
    state.resources.tokens = 100.0;
    state.resources.knowledge = 20.0;
    let mut game = Game::builder().seed(1).initial_state(state).build().unwrap();

    assert!(game.dispatch(Action::DeployContract).is_applied());

    assert_eq!(game.state().smart_contract_level, 1);
    assert_eq!(game.state().resources.tokens, 70.0);
    assert_eq!(game.state().resources.knowledge, 18.0);
    assert_eq!(game.state().logs.latest().unwrap().category, Category::Contract);
}

#[test]
fn scenario_pause_round_trip() {
    let mut game = game();
    let before = game.state().clone();

    game.dispatch(Action::TogglePause);
    assert!(game.state().paused);
    assert_eq!(game.dispatch(Action::Tick), Outcome::Ignored);
    game.dispatch(Action::TogglePause);

    assert_eq!(game.state(), &before);
}

#[test]
fn proof_of_stake_unlocks_with_contracts() {
    let mut game = game();
    assert_eq!(game.unlocked_consensus(), vec![ConsensusMode::Pow]);
    assert!(game
        .dispatch(Action::SwitchConsensus(ConsensusMode::Pos))
        .is_rejected());

    game.dispatch(Action::DeployContract);
    assert_eq!(
        game.unlocked_consensus(),
        vec![ConsensusMode::Pow, ConsensusMode::Pos]
    );
    assert!(game
        .dispatch(Action::SwitchConsensus(ConsensusMode::Pos))
        .is_applied());

    game.dispatch(Action::RunConsensus);
    let block = game.state().chain.tip().unwrap();
    assert_eq!(block.consensus, ConsensusMode::Pos);
    assert_eq!(block.difficulty, 3);
}

#[test]
fn campus_fills_up_in_plot_order() {
    let rules = Rules::default();
    let mut state = GameState::genesis(&rules, Timestamp(0));
    state.resources.tokens = 10_000.0;
    state.resources.knowledge = 100.0;
    state.resources.students_inspired = 100.0;
    state.resources.reputation = 100.0;
    state.resources.energy = 200.0;
    let mut game = Game::builder().seed(1).initial_state(state).build().unwrap();

    let mut plots = vec![];
    for _ in 0..4 {
        game.dispatch(Action::Tick);
        game.dispatch(Action::Build(NodeKind::Research));
        plots.push(game.state().nodes.last().unwrap().placement.plot);
    }
    assert_eq!(
        plots,
        vec![Some(PlotId::B1), Some(PlotId::B2), Some(PlotId::C1), Some(PlotId::D2)]
    );

    // C2 needs three blocks and D1 a contract.
    let locked: Vec<_> = game
        .plots()
        .into_iter()
        .filter(|p| p.locked)
        .map(|p| p.plot_id)
        .collect();
    assert_eq!(locked, vec![PlotId::C2, PlotId::D1]);
    assert_eq!(
        game.dispatch(Action::Build(NodeKind::Research)),
        Outcome::Rejected(Rejection::NoPlotAvailable)
    );
}

#[test]
fn rules_from_json_drive_the_game() {
    let rules = Rules::from_json(
        r#"{
            "round": { "min_energy": 5.0, "energy_cost": 1.0 },
            "workshop": { "token_cost": 10.0 }
        }"#,
    )
    .unwrap();
    let mut state = GameState::genesis(&rules, Timestamp(0));
    state.resources.energy = 10.0;
    let mut game = Game::builder()
        .seed(1)
        .rules(rules)
        .initial_state(state)
        .build()
        .unwrap();

    assert!(game.dispatch(Action::RunConsensus).is_applied());
    assert_eq!(game.state().resources.energy, 9.0);
    assert!(game.dispatch(Action::LaunchWorkshop).is_applied());
    assert_eq!(game.state().resources.tokens, 160.0 + 45.0 - 10.0);
}

#[test]
fn snapshot_json_reports_progress() {
    let mut game = game();
    game.dispatch(Action::Select(Some(NodeId::from(0))));
    game.dispatch(Action::RunConsensus);

    let json: serde_json::Value =
        serde_json::from_str(&game.snapshot().to_json().unwrap()).unwrap();

    assert_eq!(json["tutorial"][0]["completed"], true);
    assert_eq!(json["tutorial"][1]["completed"], false);
    assert_eq!(json["currentTutorial"], 1);
    assert_eq!(json["milestones"]["roundsToRun"], 2);
    assert_eq!(json["state"]["chain"][1]["previousHash"], "0xGENESIS");
}

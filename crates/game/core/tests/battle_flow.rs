use tactics_core::{
    Attributes, BattleConfig, BattleEvent, BattleOutcome, BattleSession, BattleSetup, Command,
    Effect, EffectKind, Hex, HexMap, PlayerRoster, RosterId, Skill, StaticCatalog, StepOutcome,
    TargetMode, Team, TerrainCosts, TerrainKind, Unit, UnitId, UnitTemplate, parse_spawn_list,
};

fn catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_skill(
            Skill::new(
                "cleave",
                Effect::new(EffectKind::AreaDamage, TargetMode::Area, 1.1).with_area(1),
            )
            .with_costs(8, 110.0)
            .with_range(1)
            .with_cooldown(2),
        )
        .with_skill(
            Skill::new(
                "mend",
                Effect::new(EffectKind::Heal, TargetMode::SingleAlly, 30.0),
            )
            .with_costs(6, 100.0)
            .with_range(3),
        )
        .with_unit(
            UnitTemplate::new("goblin", Attributes::uniform(8))
                .with_skill("cleave")
                .with_gold(5),
        )
        .with_unit(UnitTemplate::new("shaman", Attributes::uniform(7)).with_skill("mend"))
}

fn roster() -> (PlayerRoster, Vec<RosterId>) {
    let mut roster = PlayerRoster::new();
    let knight = Unit::new(UnitId(0), "knight", Team::Player, Attributes::uniform(14));
    let cleric = Unit::new(UnitId(0), "cleric", Team::Player, Attributes::uniform(12)).with_skill(
        Skill::new(
            "mend",
            Effect::new(EffectKind::Heal, TargetMode::SingleAlly, 30.0),
        )
        .with_costs(6, 100.0)
        .with_range(3),
    );
    let ids = vec![roster.recruit(knight), roster.recruit(cleric)];
    (roster, ids)
}

fn field() -> HexMap {
    HexMap::hexagon(5, TerrainCosts::new().with(TerrainKind::Forest, 2))
        .with_terrain(Hex::new(0, 1), TerrainKind::Forest)
        .with_terrain(Hex::new(0, -1), TerrainKind::Wall)
}

fn start(seed: u64) -> (BattleSession, PlayerRoster) {
    let (roster, party) = roster();
    let setup = BattleSetup {
        party,
        enemies: parse_spawn_list("goblin*2, shaman:3:-1").expect("spawn list"),
        seed,
        stage_cleared: false,
    };
    let session = BattleSession::start(
        &setup,
        &roster,
        &catalog(),
        field(),
        BattleConfig::default(),
    )
    .expect("battle starts");
    (session, roster)
}

/// Auto-plays to the end and returns every event in order.
fn auto_play(session: &mut BattleSession) -> Vec<BattleEvent> {
    session.apply(Command::ToggleAutoPlay).expect("toggle");
    let mut events = Vec::new();
    for _ in 0..200_000 {
        let outcome = session.step();
        events.extend(session.drain_events());
        if outcome == StepOutcome::Finished {
            return events;
        }
        assert_ne!(outcome, StepOutcome::AwaitingCommand);
    }
    panic!("battle did not finish");
}

#[test]
fn auto_played_battle_reports_and_commits() {
    let (mut session, mut roster) = start(42);
    assert_eq!(session.state().units.len(), 5);
    assert_eq!(
        session.state().unit(UnitId(2)).map(|u| u.position),
        Some(Hex::new(3, -1))
    );

    let events = auto_play(&mut session);
    assert!(matches!(events.last(), Some(BattleEvent::BattleEnded { .. })));

    let report = session.finish().expect("decided");
    assert_eq!(report.members.len(), 2);
    let snapshot = session.snapshot();
    match report.outcome {
        BattleOutcome::Victory => assert_eq!(snapshot.living_on(Team::Enemy), 0),
        BattleOutcome::Defeat => assert_eq!(snapshot.living_on(Team::Player), 0),
    }

    roster.commit(&report);
    for progress in &report.members {
        let member = roster.get(progress.roster_id).expect("member");
        assert!(member.hp >= 1);
        assert_eq!(member.xp, progress.xp);
        assert_eq!(member.level, progress.level);
    }
}

#[test]
fn same_seed_replays_identically() {
    let (mut first, _) = start(7);
    let (mut second, _) = start(7);
    assert_eq!(auto_play(&mut first), auto_play(&mut second));
    assert_eq!(first.snapshot(), second.snapshot());
}

#[test]
fn pools_stay_in_bounds_throughout() {
    let (mut session, _) = start(3);
    session.apply(Command::ToggleAutoPlay).expect("toggle");
    while session.step() != StepOutcome::Finished {
        let state = session.state();
        for unit in &state.units {
            let stats = unit.stats();
            assert!((0..=stats.hp_max).contains(&unit.hp), "{} hp {}", unit.id, unit.hp);
            assert!((0..=stats.mp_max).contains(&unit.mp), "{} mp {}", unit.id, unit.mp);
        }
        let mut occupied: Vec<Hex> = state.living().map(|u| u.position).collect();
        occupied.sort();
        let before = occupied.len();
        occupied.dedup();
        assert_eq!(before, occupied.len(), "two living units share a hex");
    }
}

#[test]
fn player_commands_drive_the_turn() {
    let (mut session, _) = start(11);
    let mut outcome = session.step();
    while outcome != StepOutcome::AwaitingCommand {
        assert_ne!(outcome, StepOutcome::Finished);
        outcome = session.step();
    }
    let actor = session.state().current_actor().expect("player turn");
    assert_eq!(
        session.state().unit(actor).map(|u| u.team),
        Some(Team::Player)
    );

    let options = session.movement_options();
    let dest = *options.first().expect("somewhere to go");
    session.apply(Command::Move { to: dest }).expect("move");
    assert!(session.movement_options().is_empty());
    assert!(session.apply(Command::Move { to: dest }).is_err());

    session.apply(Command::EndTurn).expect("end turn");
    session.step();
    assert_ne!(session.state().current_actor(), Some(actor));
}

use std::time::Duration;

use tactics_core::{
    Attributes, BattleConfig, BattleEvent, BattleSession, BattleSetup, Command, CommandError,
    Effect, EffectKind, Hex, HexMap, PlayerRoster, Skill, StaticCatalog, TargetMode, Team,
    TerrainCosts, Unit, UnitId, UnitTemplate, parse_spawn_list,
};
use tactics_runtime::{Event, EventBus, Runtime, RuntimeError, SessionEvent, Topic};
use tokio::time::timeout;

const PATIENCE: Duration = Duration::from_secs(10);

fn battle(seed: u64) -> (BattleSession, PlayerRoster) {
    let catalog = StaticCatalog::new()
        .with_skill(
            Skill::new(
                "cleave",
                Effect::new(EffectKind::AreaDamage, TargetMode::Area, 1.1).with_area(1),
            )
            .with_costs(8, 110.0)
            .with_range(1),
        )
        .with_unit(
            UnitTemplate::new("goblin", Attributes::uniform(8))
                .with_skill("cleave")
                .with_gold(5),
        );

    let mut roster = PlayerRoster::new();
    let party = vec![
        roster.recruit(Unit::new(
            UnitId(0),
            "knight",
            Team::Player,
            Attributes::uniform(14),
        )),
        roster.recruit(Unit::new(
            UnitId(0),
            "archer",
            Team::Player,
            Attributes::uniform(11),
        )),
    ];
    let setup = BattleSetup {
        party,
        enemies: parse_spawn_list("goblin*2").expect("spawn list"),
        seed,
        stage_cleared: false,
    };
    let session = BattleSession::start(
        &setup,
        &roster,
        &catalog,
        HexMap::hexagon(5, TerrainCosts::new()),
        BattleConfig::default(),
    )
    .expect("battle starts");
    (session, roster)
}

#[tokio::test]
async fn auto_played_battle_streams_events_and_commits() {
    let (session, roster) = battle(5);
    let bus = EventBus::with_capacity(1 << 16);
    let mut battle_rx = bus.subscribe(Topic::Battle);

    let runtime = Runtime::builder()
        .session(session)
        .roster(roster)
        .event_bus(bus)
        .auto_play(true)
        .build()
        .await
        .expect("runtime builds");

    let summary = timeout(PATIENCE, runtime.run_to_end())
        .await
        .expect("battle ends in time")
        .expect("runtime shuts down");

    let report = summary.report.expect("decided");
    let roster = summary.roster.expect("roster returned");
    for progress in &report.members {
        let member = roster.get(progress.roster_id).expect("member");
        assert_eq!(member.xp, progress.xp);
        assert!(member.hp >= 1);
    }

    let mut saw_start = false;
    let mut saw_end = false;
    while let Ok(event) = battle_rx.try_recv() {
        match event {
            Event::Battle(BattleEvent::BattleStarted { units, .. }) => {
                assert_eq!(units, 4);
                saw_start = true;
            }
            Event::Battle(BattleEvent::BattleEnded { .. }) => saw_end = true,
            _ => {}
        }
    }
    assert!(saw_start && saw_end);
}

#[tokio::test]
async fn player_commands_go_through_the_handle() {
    let (session, _) = battle(9);
    let bus = EventBus::new();
    let mut session_rx = bus.subscribe(Topic::Session);

    let runtime = Runtime::builder()
        .session(session)
        .event_bus(bus)
        .build()
        .await
        .expect("runtime builds");
    let handle = runtime.handle();

    let actor = timeout(PATIENCE, async {
        loop {
            match session_rx.recv().await.expect("session stream") {
                Event::Session(SessionEvent::AwaitingCommand { actor }) => return actor,
                Event::Session(SessionEvent::BattleFinished { .. }) => {
                    panic!("battle ended before the player acted")
                }
                _ => {}
            }
        }
    })
    .await
    .expect("player turn in time");

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.current_actor, Some(actor));
    assert_eq!(snapshot.unit(actor).map(|u| u.team), Some(Team::Player));

    let rejected = handle
        .apply(Command::Move {
            to: Hex::new(9, 9),
        })
        .await;
    match rejected {
        Err(RuntimeError::Rejected(CommandError::Unreachable(hex))) => {
            assert_eq!(hex, Hex::new(9, 9))
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
    assert_eq!(
        handle
            .apply(Command::Move {
                to: Hex::new(9, 9)
            })
            .await
            .err()
            .and_then(|e| e.command_code().map(str::to_owned)),
        Some("UNREACHABLE".to_owned())
    );

    handle.apply(Command::EndTurn).await.expect("end turn");
    assert_eq!(handle.report().await.expect("report"), None);

    let summary = runtime.shutdown().await.expect("shutdown");
    assert_eq!(summary.report, None);
    assert_eq!(summary.roster, None);
}

#[tokio::test]
async fn handle_fails_cleanly_after_shutdown() {
    let (session, _) = battle(1);
    let runtime = Runtime::builder()
        .session(session)
        .build()
        .await
        .expect("runtime builds");
    let handle = runtime.handle();
    runtime.shutdown().await.expect("shutdown");

    assert!(matches!(
        handle.snapshot().await,
        Err(RuntimeError::CommandChannelClosed)
    ));
}

#[tokio::test]
async fn building_without_a_session_fails() {
    assert!(matches!(
        Runtime::builder().build().await,
        Err(RuntimeError::MissingSession)
    ));
}

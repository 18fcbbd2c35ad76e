//! Auto-play a scenario through the async runtime.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tactics_core::{BattleEvent, BattleSession, parse_spawn_list};
use tactics_runtime::{Event, EventBus, Runtime, RuntimeConfig, Topic};
use tokio::sync::broadcast;

use super::ContentArgs;

/// Auto-play the scenario from a content directory
#[derive(Parser, Debug)]
pub struct Play {
    #[command(flatten)]
    pub content: ContentArgs,

    /// Override the scenario seed
    #[arg(long, env = "TACTICS_SEED")]
    pub seed: Option<u64>,

    /// Override the enemy spawn list, e.g. "goblin*2, shaman:3:-1"
    #[arg(long)]
    pub enemies: Option<String>,

    /// Print battle events to stdout as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Delay in milliseconds after each resolved action
    #[arg(long, default_value = "0")]
    pub pacing_ms: u64,
}

impl Play {
    pub async fn execute(self) -> Result<()> {
        let mut content = self.content.load()?;
        if let Some(seed) = self.seed {
            content.battle.scenario.seed = seed;
        }
        if let Some(enemies) = &self.enemies {
            parse_spawn_list(enemies).with_context(|| format!("invalid --enemies `{enemies}`"))?;
            content.battle.scenario.enemies = enemies.clone();
        }

        let (roster, setup) = content.battle.scenario.recruit(&content.catalog)?;
        let session = BattleSession::start(
            &setup,
            &roster,
            &content.catalog,
            content.map,
            content.battle.config,
        )
        .context("failed to deploy the scenario")?;
        tracing::info!(seed = setup.seed, "starting battle");

        let config = RuntimeConfig {
            pacing: (self.pacing_ms > 0).then(|| Duration::from_millis(self.pacing_ms)),
            ..RuntimeConfig::default()
        };
        let bus = EventBus::with_capacity(config.event_buffer_size);
        let printer = tokio::spawn(print_events(bus.subscribe(Topic::Battle), self.json));

        let runtime = Runtime::builder()
            .config(config)
            .session(session)
            .roster(roster)
            .event_bus(bus)
            .auto_play(true)
            .build()
            .await?;
        let summary = runtime.run_to_end().await?;
        printer.await.context("event printer panicked")??;

        let report = summary.report.context("battle stopped undecided")?;
        if self.json {
            println!("{}", serde_json::to_string(&report)?);
            return Ok(());
        }

        println!("outcome: {}", report.outcome);
        println!("loot: {} gold", report.loot_gold);
        if let Some(roster) = &summary.roster {
            for progress in &report.members {
                if let Some(member) = roster.get(progress.roster_id) {
                    println!(
                        "  {:<10} lv {:>2}  xp {:>5}  hp {:>4}",
                        member.name, member.level, member.xp, member.hp
                    );
                }
            }
        }
        Ok(())
    }
}

/// Streams battle events until the battle ends or the worker goes away.
async fn print_events(mut rx: broadcast::Receiver<Event>, json: bool) -> Result<()> {
    loop {
        let event = match rx.recv().await {
            Ok(Event::Battle(event)) => event,
            Ok(Event::Session(_)) => continue,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event printer fell behind");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return Ok(()),
        };

        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else if !matches!(event, BattleEvent::Log { .. }) {
            // Log events are already mirrored into tracing by the core.
            tracing::info!(?event);
        }

        if matches!(event, BattleEvent::BattleEnded { .. }) {
            return Ok(());
        }
    }
}

//! Validate a content directory.

use anyhow::Result;
use clap::Parser;
use tactics_core::BattleSession;

use super::ContentArgs;

/// Load and cross-check a content directory without fighting
#[derive(Parser, Debug)]
pub struct Check {
    #[command(flatten)]
    pub content: ContentArgs,
}

impl Check {
    pub fn execute(self) -> Result<()> {
        let content = self.content.load()?;
        let (roster, setup) = content.battle.scenario.recruit(&content.catalog)?;
        let session = BattleSession::start(
            &setup,
            &roster,
            &content.catalog,
            content.map.clone(),
            content.battle.config.clone(),
        )?;

        println!(
            "content ok: {} unit templates, {} party members, {} units deployed",
            content.catalog.unit_keys().count(),
            roster.len(),
            session.state().units.len()
        );
        Ok(())
    }
}

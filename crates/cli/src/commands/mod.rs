mod check;
mod play;

pub use check::Check;
pub use play::Play;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tactics_content::{Content, ContentFactory};

/// Where battle content lives.
#[derive(Args, Debug, Clone)]
pub struct ContentArgs {
    /// Directory holding units.ron, skills.ron, map.ron, battle.toml, ...
    #[arg(long, env = "TACTICS_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,
}

impl ContentArgs {
    pub fn load(&self) -> Result<Content> {
        ContentFactory::new(&self.data_dir)
            .load()
            .with_context(|| format!("failed to load content from {}", self.data_dir.display()))
    }
}

use anyhow::Context;
use rigbalance::{engine::settings::AdvisorSettings, MemoryCatalog};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::debug;

use crate::{
    common::{Advisor, Run},
    modules::{
        categories::Categories,
        pairing::{Analyze, Power, Profile},
        performance::Estimate,
        recommend::Recommend,
    },
    run_impl_enum,
};

#[derive(StructOpt)]
#[structopt(name = "rigbalance", about = "CPU/GPU pairing analysis over a PassMark catalog")]
pub struct Options {
    /// PassMark catalog snapshot (JSON)
    #[structopt(long, short, parse(from_os_str))]
    pub catalog: PathBuf,

    /// Settings file (TOML); built-in defaults when omitted
    #[structopt(long, parse(from_os_str))]
    pub config: Option<PathBuf>,

    #[structopt(subcommand)]
    pub command: Command,
}

impl Options {
    pub async fn advisor(&self) -> anyhow::Result<Advisor> {
        let settings = match &self.config {
            Some(path) => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("could not read settings {}", path.display()))?;
                AdvisorSettings::from_toml_str(&text)
                    .with_context(|| format!("invalid settings {}", path.display()))?
            }
            None => AdvisorSettings::default(),
        };
        let catalog = MemoryCatalog::load(&self.catalog).await?;
        debug!("Catalog holds {} components", catalog.len());
        Ok(Advisor::with_settings(catalog, settings)?)
    }
}

#[derive(StructOpt)]
pub enum Command {
    /// Assess a CPU + GPU pairing in every game category
    Analyze(Analyze),
    /// Find the best partners for a known component
    Recommend(Recommend),
    /// Per-category FPS ranges and settings for a pairing
    Profile(Profile),
    /// Frame-rate estimate for one component
    Estimate(Estimate),
    /// PSU sizing and energy cost for a pairing
    Power(Power),
    /// List the game categories in force
    Categories(Categories),
}

run_impl_enum!(Command, self, advisor, ser, {
    match self {
        Self::Analyze(c) => c.run(advisor, ser).await?,
        Self::Recommend(c) => c.run(advisor, ser).await?,
        Self::Profile(c) => c.run(advisor, ser).await?,
        Self::Estimate(c) => c.run(advisor, ser).await?,
        Self::Power(c) => c.run(advisor, ser).await?,
        Self::Categories(c) => c.run(advisor, ser).await?,
    }
});

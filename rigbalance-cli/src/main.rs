pub(crate) mod common;
mod modules;
mod options;

use std::io::{stderr, stdout};

use erased_serde::Serializer;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use crate::common::Run;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rigbalance=info")),
        )
        .with_writer(stderr)
        .init();

    let opt = options::Options::from_args();
    let advisor = opt.advisor().await?;

    opt.command
        .run(
            &advisor,
            &mut <dyn Serializer>::erase(&mut serde_json::Serializer::pretty(stdout())),
        )
        .await?;

    println!();
    Ok(())
}

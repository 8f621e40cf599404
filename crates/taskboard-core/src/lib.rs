pub mod assignees;
pub mod board;
pub mod cache;
pub mod card;
pub mod cli;
pub mod commands;
pub mod config;
pub mod draft;
pub mod drag;
pub mod error;
pub mod popup;
pub mod render;
pub mod session;
pub mod store;
pub mod workspace;

use std::ffi::OsString;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use error::{
  BoardError,
  BoardResult
};
pub use store::{
  HttpTaskStore,
  TaskStore
};
pub use workspace::{
  Feedback,
  Workspace
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting taskboard CLI"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.taskboardrc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let store =
    store::HttpTaskStore::from_config(
      &cfg
    )
    .with_context(|| {
      format!(
        "failed to build client for \
         {}",
        cfg.api_url()
      )
    })?;
  info!(
    api = store.base_url(),
    "task backend configured"
  );

  let mut renderer =
    render::Renderer::new(&cfg)?;
  let command = cli::resolve_command(
    &cfg,
    cli.command
  )?;

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async \
         runtime"
      )?;

  let mut workspace =
    Workspace::new(Arc::new(store));
  runtime.block_on(commands::dispatch(
    &mut workspace,
    &mut renderer,
    command
  ))?;

  info!("done");
  Ok(())
}

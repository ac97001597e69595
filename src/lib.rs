//! Duplexer webhook — approval gate for queued document jobs.
//!
//! Reviewers approve or reject a job by token over HTTP; the decision is
//! recorded as a marker file that the rest of the pipeline polls.

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod store;
pub mod telemetry;

use store::marker::MarkerStore;
use telemetry::Logger;

/// Shared application state passed to handlers and middleware.
#[derive(Debug)]
pub struct AppState {
    pub config: config::Config,
    pub store: MarkerStore,
    pub logger: Logger,
}

impl AppState {
    pub fn new(config: config::Config, logger: Logger) -> Self {
        let store = MarkerStore::new(config.pending_dir.clone());
        Self {
            config,
            store,
            logger,
        }
    }
}

//! JSON HTTP API for Cohort.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`ContactSource`] and [`GroupStore`]. Auth and TLS are the caller's
//! responsibility.

pub mod error;
pub mod groups;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use cohort_core::{
  options::GroupingOptions,
  store::{ContactSource, GroupStore},
};
use cohort_engine::GroupingService;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `cohort.toml` and
/// `COHORT_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// Used when a request does not carry its own options.
  #[serde(default)]
  pub default_options: GroupingOptions,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:   Arc<S>,
  pub service: GroupingService<S, S>,
  pub config:  Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      service: self.service.clone(),
      config:  Arc::clone(&self.config),
    }
  }
}

impl<S> AppState<S>
where
  S: ContactSource + GroupStore,
{
  /// One store backs both the contact fetch and the group collection.
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    Self {
      service: GroupingService::new(Arc::clone(&store), Arc::clone(&store)),
      store,
      config: Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ContactSource + GroupStore + 'static,
{
  Router::new()
    .route("/users/{user_id}/groups", get(groups::list::<S>))
    .route("/users/{user_id}/groups/generate", post(groups::generate::<S>))
    .route("/groups/preview", post(groups::preview::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

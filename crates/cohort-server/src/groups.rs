//! Handlers for the group endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/{user_id}/groups` | Persisted collection; empty for unknown users |
//! | `POST` | `/users/{user_id}/groups/generate` | Body: `{"options":{..},"replace_types":["time"]}` |
//! | `POST` | `/groups/preview` | Body: `{"contacts":[..],"options":{..}}`; nothing is stored |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
};
use cohort_core::{
  contact::Contact,
  group::{Group, GroupType},
  merge::MergePolicy,
  options::GroupingOptions,
  store::{ContactSource, GroupStore},
};
use cohort_engine::{GroupingOutcome, GroupingRun, generate_groups};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

fn check_user(user_id: &str) -> Result<(), ApiError> {
  if user_id.trim().is_empty() {
    return Err(ApiError::BadRequest("user id must not be blank".into()));
  }
  Ok(())
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /users/{user_id}/groups`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Path(user_id): Path<String>,
) -> Result<Json<Vec<Group>>, ApiError>
where
  S: ContactSource + GroupStore,
{
  check_user(&user_id)?;
  let groups = state
    .store
    .list_groups(&user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(groups))
}

// ─── Generate ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateBody {
  /// Falls back to the server's configured defaults.
  pub options:       Option<GroupingOptions>,
  pub replace_types: Vec<GroupType>,
}

/// `POST /users/{user_id}/groups/generate`
pub async fn generate<S>(
  State(state): State<AppState<S>>,
  Path(user_id): Path<String>,
  body: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Json<GroupingRun>, ApiError>
where
  S: ContactSource + GroupStore,
{
  check_user(&user_id)?;
  let Json(body) = body?;
  let options = body
    .options
    .unwrap_or_else(|| state.config.default_options.clone());
  let policy = MergePolicy::replacing(body.replace_types);

  let run = state.service.run(&user_id, &options, &policy).await?;
  Ok(Json(run))
}

// ─── Preview ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PreviewBody {
  pub contacts: Vec<Contact>,
  #[serde(default)]
  pub options:  Option<GroupingOptions>,
}

/// `POST /groups/preview`
pub async fn preview<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<PreviewBody>, JsonRejection>,
) -> Result<Json<GroupingOutcome>, ApiError>
where
  S: ContactSource + GroupStore,
{
  let Json(body) = body?;
  let options = body
    .options
    .unwrap_or_else(|| state.config.default_options.clone());
  let outcome = generate_groups(&body.contacts, &options)?;
  Ok(Json(outcome))
}

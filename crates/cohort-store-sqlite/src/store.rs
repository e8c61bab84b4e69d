//! [`SqliteStore`], the SQLite implementation of [`ContactSource`] and
//! [`GroupStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use cohort_core::{
  contact::Contact,
  group::Group,
  merge::{MergePolicy, MergeReport, merge_groups},
  store::{ContactSource, GroupStore},
};
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use crate::{
  Result,
  encode::{
    RawContact, decode_dt, decode_groups, encode_dt, encode_groups, encode_offset_dt,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A contact and group store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Bookkeeping written alongside every group collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionStats {
  pub total_groups:  usize,
  pub last_modified: DateTime<Utc>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert or update contacts for `user_id`. An updated contact keeps its
/// place in [`ContactSource::list_contacts`] order. Returns the number written.
  pub async fn put_contacts(&self, user_id: &str, contacts: &[Contact]) -> Result<usize> {
    let user = user_id.to_owned();
    let rows: Vec<_> = contacts
      .iter()
      .map(|c| {
        (
          c.id.clone(),
          c.name.clone(),
          c.email.clone(),
          c.company.clone(),
          c.location.map(|l| l.latitude),
          c.location.map(|l| l.longitude),
          c.submitted_at.map(encode_offset_dt),
          c.created_at.map(encode_offset_dt),
        )
      })
      .collect();

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO contacts (
               user_id, contact_id, name, email, company,
               latitude, longitude, submitted_at, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(user_id, contact_id) DO UPDATE SET
               name         = excluded.name,
               email        = excluded.email,
               company      = excluded.company,
               latitude     = excluded.latitude,
               longitude    = excluded.longitude,
               submitted_at = excluded.submitted_at,
               created_at   = excluded.created_at",
          )?;
          for (id, name, email, company, lat, lng, submitted, created) in &rows {
            stmt.execute(rusqlite::params![
              user, id, name, email, company, lat, lng, submitted, created,
            ])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;

    Ok(written)
  }

  /// Total group count and last-modified time of the user's collection, if
  /// one has been written.
  pub async fn collection_stats(&self, user_id: &str) -> Result<Option<CollectionStats>> {
    let user = user_id.to_owned();
    let raw: Option<(i64, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT total_groups, last_modified FROM group_collections WHERE user_id = ?1",
              rusqlite::params![user],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(total, at)| {
        Ok(CollectionStats {
          total_groups:  total.max(0) as usize,
          last_modified: decode_dt(&at)?,
        })
      })
      .transpose()
  }
}

/// Load, merge, and write back one user's collection inside a single
/// `IMMEDIATE` transaction. Any error drops the transaction, rolling it back.
fn merge_in_transaction(
  conn: &mut rusqlite::Connection,
  user_id: &str,
  candidates: Vec<Group>,
  policy: &MergePolicy,
) -> Result<MergeReport> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let existing_json: Option<String> = tx
    .query_row(
      "SELECT groups_json FROM group_collections WHERE user_id = ?1",
      rusqlite::params![user_id],
      |row| row.get(0),
    )
    .optional()?;
  let existing = match existing_json {
    Some(json) => decode_groups(&json)?,
    None => Vec::new(),
  };

  let (merged, report) = merge_groups(existing, candidates, policy)?;

  tx.execute(
    "INSERT INTO group_collections (user_id, groups_json, total_groups, last_modified)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT(user_id) DO UPDATE SET
       groups_json   = excluded.groups_json,
       total_groups  = excluded.total_groups,
       last_modified = excluded.last_modified",
    rusqlite::params![
      user_id,
      encode_groups(&merged)?,
      report.total_groups as i64,
      encode_dt(Utc::now()),
    ],
  )?;
  tx.commit()?;

  Ok(report)
}

// ─── ContactSource impl ──────────────────────────────────────────────────────

impl ContactSource for SqliteStore {
  type Error = crate::Error;

  async fn list_contacts(&self, user_id: &str) -> Result<Vec<Contact>> {
    let user = user_id.to_owned();

    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT contact_id, name, email, company, latitude, longitude,
                  submitted_at, created_at
           FROM contacts
           WHERE user_id = ?1
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user], |row| {
            Ok(RawContact {
              contact_id:   row.get(0)?,
              name:         row.get(1)?,
              email:        row.get(2)?,
              company:      row.get(3)?,
              latitude:     row.get(4)?,
              longitude:    row.get(5)?,
              submitted_at: row.get(6)?,
              created_at:   row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }
}

// ─── GroupStore impl ─────────────────────────────────────────────────────────

impl GroupStore for SqliteStore {
  type Error = crate::Error;

  async fn list_groups(&self, user_id: &str) -> Result<Vec<Group>> {
    let user = user_id.to_owned();

    let json: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT groups_json FROM group_collections WHERE user_id = ?1",
              rusqlite::params![user],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    match json {
      Some(json) => decode_groups(&json),
      None => Ok(Vec::new()),
    }
  }

  async fn merge_groups(
    &self,
    user_id: &str,
    groups:  Vec<Group>,
    policy:  &MergePolicy,
  ) -> Result<MergeReport> {
    let user = user_id.to_owned();
    let policy = policy.clone();
    let candidates = groups.len();

    let report = self
      .conn
      .call(move |conn| Ok(merge_in_transaction(conn, &user, groups, &policy)))
      .await??;

    tracing::debug!(
      user_id,
      candidates,
      saved = report.saved,
      skipped = report.duplicates_skipped,
      "merged group collection"
    );
    Ok(report)
  }
}

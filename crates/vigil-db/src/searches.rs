//! Saved-search records and their CRUD operations.
//!
//! Saved searches are authored by the configuration UI and read by the
//! acquisition engine to drive each poll cycle. The engine treats them as
//! read-only.

use crate::error::{DatabaseError, Result};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Row, Sqlite};
use url::Url;
use vigil_core::{sections, VigilError};

/// A user-defined marketplace search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSearch {
    /// Store-assigned surrogate id
    pub id: i64,
    /// Geographic area code (site subdomain)
    pub area: String,
    /// Section label, resolved through the fixed vocabulary
    pub section: String,
    /// Free-text search string
    pub query: String,
    /// Whether new listings should raise the desktop alarm
    pub notify_alarm: bool,
    /// Whether new listings should be emailed
    pub notify_email: bool,
}

impl SavedSearch {
    /// Build the canonical search URL for this saved search.
    ///
    /// The URL is deterministic in area, section code, and the URL-encoded
    /// search string, and is the stable key under which discovered listings
    /// are associated.
    ///
    /// # Errors
    /// Returns `VigilError::Validation` if the section label is outside the
    /// fixed vocabulary or the area does not form a valid host.
    pub fn canonical_url(&self) -> vigil_core::Result<String> {
        let code = sections::section_code(&self.section).ok_or_else(|| {
            VigilError::Validation(format!("unknown section label '{}'", self.section))
        })?;

        let mut url = Url::parse(&format!(
            "https://{}.craigslist.org/search/{code}",
            self.area
        ))
        .map_err(|e| VigilError::Validation(format!("invalid search URL: {e}")))?;
        url.query_pairs_mut().append_pair("query", &self.query);

        Ok(url.into())
    }

    /// Whether the search string is effectively empty.
    ///
    /// Blank searches are skipped by the engine without any network
    /// activity.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.query.trim().is_empty()
    }
}

/// List all saved searches in store order (ascending id).
///
/// This is the iteration order the engine crawls in.
pub async fn list_searches(pool: &Pool<Sqlite>) -> Result<Vec<SavedSearch>> {
    let rows = sqlx::query(
        "SELECT id, area, section, query, notify_alarm, notify_email
         FROM saved_searches
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(|row| search_from_row(&row)).collect()
}

/// Get a saved search by id, or `None` if it does not exist.
pub async fn get_search(pool: &Pool<Sqlite>, id: i64) -> Result<Option<SavedSearch>> {
    let row = sqlx::query(
        "SELECT id, area, section, query, notify_alarm, notify_email
         FROM saved_searches
         WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(|row| search_from_row(&row)).transpose()
}

/// Add a saved search, returning it with its store-assigned id.
pub async fn add_search(
    pool: &Pool<Sqlite>,
    area: &str,
    section: &str,
    query: &str,
    notify_alarm: bool,
    notify_email: bool,
) -> Result<SavedSearch> {
    let result = sqlx::query(
        "INSERT INTO saved_searches (area, section, query, notify_alarm, notify_email)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(area)
    .bind(section)
    .bind(query)
    .bind(notify_alarm)
    .bind(notify_email)
    .execute(pool)
    .await?;

    Ok(SavedSearch {
        id: result.last_insert_rowid(),
        area: area.to_string(),
        section: section.to_string(),
        query: query.to_string(),
        notify_alarm,
        notify_email,
    })
}

/// Update a saved search's fields by id.
pub async fn update_search(pool: &Pool<Sqlite>, search: &SavedSearch) -> Result<()> {
    let result = sqlx::query(
        "UPDATE saved_searches
         SET area = ?, section = ?, query = ?, notify_alarm = ?, notify_email = ?
         WHERE id = ?",
    )
    .bind(&search.area)
    .bind(&search.section)
    .bind(&search.query)
    .bind(search.notify_alarm)
    .bind(search.notify_email)
    .bind(search.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFoundWithMessage(format!(
            "saved search {} not found",
            search.id
        )));
    }

    Ok(())
}

/// Delete a saved search by id.
pub async fn delete_search(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM saved_searches WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

fn search_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<SavedSearch> {
    let notify_alarm: i64 = row.try_get("notify_alarm")?;
    let notify_email: i64 = row.try_get("notify_email")?;

    Ok(SavedSearch {
        id: row.try_get("id")?,
        area: row.try_get("area")?,
        section: row.try_get("section")?,
        query: row.try_get("query")?,
        notify_alarm: notify_alarm != 0,
        notify_email: notify_email != 0,
    })
}

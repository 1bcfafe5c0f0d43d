//! Discovered listings and their insert-or-touch persistence.
//!
//! Listings are keyed by the site-assigned id alone. Seeing a known id
//! again only advances its `seen_at` timestamp; the original discovery
//! record (including which search found it first) is never overwritten.

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Row, Sqlite};

/// A discovered marketplace listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Site-assigned listing id, globally unique per listing
    pub id: String,
    /// Display name/title
    pub name: String,
    /// Detail-page URL
    pub url: String,
    /// Canonical URL of the saved search that first found this listing
    pub search_url: String,
    /// When this listing was first detected
    pub found_at: DateTime<Utc>,
    /// When this listing was most recently seen in results
    pub seen_at: DateTime<Utc>,
}

/// Get a listing by its site-assigned id, or `None` if it is unknown.
pub async fn get_listing(pool: &Pool<Sqlite>, site_id: &str) -> Result<Option<Listing>> {
    let row = sqlx::query(
        "SELECT id, name, url, search_url, found_at, seen_at
         FROM listings
         WHERE id = ?",
    )
    .bind(site_id)
    .fetch_optional(pool)
    .await?;

    row.map(|row| listing_from_row(&row)).transpose()
}

/// Insert a listing, or touch its `seen_at` if the id is already stored.
///
/// On first sight the row is created with `found_at = seen_at = now`. On
/// re-detection only `seen_at` advances; name, URL, and the owning search
/// URL keep their first-writer values. Returns the stored record.
pub async fn upsert_listing(
    pool: &Pool<Sqlite>,
    site_id: &str,
    name: &str,
    url: &str,
    search_url: &str,
) -> Result<Listing> {
    let now = Utc::now();

    if let Some(mut existing) = get_listing(pool, site_id).await? {
        sqlx::query("UPDATE listings SET seen_at = ? WHERE id = ?")
            .bind(now.to_rfc3339())
            .bind(site_id)
            .execute(pool)
            .await?;

        existing.seen_at = now;
        return Ok(existing);
    }

    sqlx::query(
        "INSERT INTO listings (id, name, url, search_url, found_at, seen_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(site_id)
    .bind(name)
    .bind(url)
    .bind(search_url)
    .bind(now.to_rfc3339())
    .bind(now.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(Listing {
        id: site_id.to_string(),
        name: name.to_string(),
        url: url.to_string(),
        search_url: search_url.to_string(),
        found_at: now,
        seen_at: now,
    })
}

/// List all listings associated with a search URL, oldest discovery first.
pub async fn list_for_search(pool: &Pool<Sqlite>, search_url: &str) -> Result<Vec<Listing>> {
    let rows = sqlx::query(
        "SELECT id, name, url, search_url, found_at, seen_at
         FROM listings
         WHERE search_url = ?
         ORDER BY found_at",
    )
    .bind(search_url)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(|row| listing_from_row(&row)).collect()
}

/// Count the listings associated with a search URL.
pub async fn count_for_search(pool: &Pool<Sqlite>, search_url: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(id) FROM listings WHERE search_url = ?")
        .bind(search_url)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Delete listings whose `seen_at` is at least `days` days in the past.
///
/// Returns the number of purged rows. Run at the start of each poll cycle
/// before any fetch.
pub async fn purge_older_than(pool: &Pool<Sqlite>, days: i64) -> Result<u64> {
    let cutoff = Utc::now() - Duration::days(days);

    let result = sqlx::query("DELETE FROM listings WHERE seen_at <= ?")
        .bind(cutoff.to_rfc3339())
        .execute(pool)
        .await?;

    let purged = result.rows_affected();
    if purged > 0 {
        tracing::info!("Purged {} listing(s) not seen in {} days", purged, days);
    }

    Ok(purged)
}

fn listing_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Listing> {
    let found_at_str: String = row.try_get("found_at")?;
    let found_at = DateTime::parse_from_rfc3339(&found_at_str)
        .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

    let seen_at_str: String = row.try_get("seen_at")?;
    let seen_at = DateTime::parse_from_rfc3339(&seen_at_str)
        .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

    Ok(Listing {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        url: row.try_get("url")?,
        search_url: row.try_get("search_url")?,
        found_at,
        seen_at,
    })
}

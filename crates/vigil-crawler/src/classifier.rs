//! New-vs-seen classification against the listing store.

use crate::error::Result;
use crate::parser::ListingRow;
use sqlx::{Pool, Sqlite};
use vigil_db::listings;
use vigil_db::Listing;

/// Classify an extracted row and record it in the store.
///
/// Returns `Some(listing)` with the freshly stored record when the site id
/// was unknown, `None` when the listing had been seen before (its `seen_at`
/// is advanced either way). This is the sole mutation path from the crawl
/// into the listing store.
pub async fn classify_and_upsert(
    pool: &Pool<Sqlite>,
    row: &ListingRow,
    search_url: &str,
) -> Result<Option<Listing>> {
    let already_known = listings::get_listing(pool, &row.site_id).await?.is_some();

    let stored =
        listings::upsert_listing(pool, &row.site_id, &row.name, &row.url, search_url).await?;

    if already_known {
        Ok(None)
    } else {
        tracing::info!("New listing {}: {}", stored.id, stored.name);
        Ok(Some(stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_db::Database;

    fn row(id: &str) -> ListingRow {
        ListingRow {
            site_id: id.to_string(),
            name: format!("Listing {id}"),
            url: format!("https://seattle.craigslist.org/see/bik/{id}.html"),
        }
    }

    #[tokio::test]
    async fn test_first_sight_is_new_second_is_not() {
        let db = Database::in_memory().await.expect("open store");
        db.run_migrations().await.expect("run migrations");

        let first = classify_and_upsert(db.pool(), &row("42"), "search-a")
            .await
            .expect("classify first sight");
        assert!(first.is_some());
        let first = first.expect("new listing");
        let found_at = first.found_at;

        let second = classify_and_upsert(db.pool(), &row("42"), "search-a")
            .await
            .expect("classify second sight");
        assert!(second.is_none());

        // found_at unchanged, seen_at advanced
        let stored = listings::get_listing(db.pool(), "42")
            .await
            .expect("get listing")
            .expect("listing exists");
        assert_eq!(stored.found_at, found_at);
        assert!(stored.seen_at >= found_at);
    }

    #[tokio::test]
    async fn test_same_id_under_second_search_is_not_new() {
        let db = Database::in_memory().await.expect("open store");
        db.run_migrations().await.expect("run migrations");

        let first = classify_and_upsert(db.pool(), &row("77"), "search-a")
            .await
            .expect("classify under first search");
        assert!(first.is_some());

        let second = classify_and_upsert(db.pool(), &row("77"), "search-b")
            .await
            .expect("classify under second search");
        assert!(second.is_none());

        // First-writer search association wins
        let stored = listings::get_listing(db.pool(), "77")
            .await
            .expect("get listing")
            .expect("listing exists");
        assert_eq!(stored.search_url, "search-a");
    }
}

//! Vigil Crawler - Listing acquisition and change-detection engine.
//!
//! This crate runs poll cycles over a set of saved marketplace searches:
//! it paginates through each search's result pages (across the two layouts
//! the site has served), extracts listing rows, classifies each as
//! new-or-seen against the listing store, and folds everything into one
//! per-cycle aggregate with per-search failure isolation.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vigil_browser::ChromeFetcher;
//! use vigil_crawler::AcquisitionEngine;
//!
//! let engine = AcquisitionEngine::new(Arc::new(db), ChromeFetcher::new(true));
//! let result = engine.run_cycle().await;
//! for (search_id, found) in &result.new_listings {
//!     println!("search {search_id}: {} new", found.len());
//! }
//! engine.shutdown().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod classifier;
pub mod crawler;
#[allow(missing_docs)]
pub mod error;
pub mod layout;
pub mod orchestrator;
#[allow(missing_docs)]
pub mod parser;

// Re-export commonly used types
pub use classifier::classify_and_upsert;
pub use crawler::crawl_search;
pub use error::{CrawlError, Result};
pub use layout::Layout;
pub use orchestrator::{AcquisitionEngine, CycleOutcome, PollCycleResult, SearchOutcome};
pub use parser::{extract_page, ListingRow, PageAdvance, PageExtraction, RowError};

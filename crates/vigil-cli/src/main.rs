use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vigil_browser::ChromeFetcher;
use vigil_core::{sections, AppConfig};
use vigil_crawler::{AcquisitionEngine, CycleOutcome, SearchOutcome};
use vigil_db::{listings, searches, Database};

#[derive(Parser)]
#[command(author, version, about = "Saved-search watcher for classifieds listings")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one poll cycle and print newly discovered listings
    Run,
    /// List saved searches and their stored listing counts
    List,
    /// Add a saved search
    Add {
        /// Geographic area code (site subdomain)
        area: String,
        /// Section label from the fixed vocabulary
        section: String,
        /// Free-text search string
        query: String,
        /// Raise the desktop alarm for new listings
        #[arg(long)]
        alarm: bool,
        /// Email new listings
        #[arg(long)]
        email: bool,
    },
    /// Remove a saved search by id
    Remove {
        /// Saved-search id as shown by `list`
        id: i64,
    },
    /// Print the section vocabulary
    Sections,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::load_with_env().context("failed to load configuration")?;

    let db_path = config.resolved_db_path()?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::open(&db_path).await?;
    db.run_migrations().await?;
    let db = Arc::new(db);

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run_cycle(db, &config).await,
        Command::List => list_saved_searches(&db).await,
        Command::Add {
            area,
            section,
            query,
            alarm,
            email,
        } => add_saved_search(&db, &area, &section, &query, alarm, email).await,
        Command::Remove { id } => remove_saved_search(&db, id).await,
        Command::Sections => {
            for label in sections::section_labels() {
                println!("{label}");
            }
            Ok(())
        }
    }
}

async fn run_cycle(db: Arc<Database>, config: &AppConfig) -> Result<()> {
    let fetcher = ChromeFetcher::new(config.browser.headless);
    let engine = AcquisitionEngine::new(db.clone(), fetcher)
        .with_settle_delay(Duration::from_millis(config.browser.settle_delay_ms))
        .with_max_pages(config.browser.max_pages);

    info!("Starting poll cycle");
    let result = engine.run_cycle().await;
    engine.shutdown().await;

    for search in searches::list_searches(db.pool()).await? {
        let Some(found) = result.new_listings.get(&search.id) else {
            continue;
        };
        println!(
            "{} new listing(s) for {}/{}/{}",
            found.len(),
            search.area,
            search.section,
            search.query
        );
        for listing in found {
            println!("  {} - {}", listing.name, listing.url);
        }
    }
    if result.new_listings.is_empty() {
        println!("No new listings");
    }

    for (url, outcome) in &result.search_outcomes {
        if *outcome == SearchOutcome::Failed {
            eprintln!("search failed: {url}");
        }
    }

    if result.outcome == CycleOutcome::Failed {
        bail!("poll cycle completed with failures");
    }
    Ok(())
}

async fn list_saved_searches(db: &Database) -> Result<()> {
    let all = searches::list_searches(db.pool()).await?;
    if all.is_empty() {
        println!("No saved searches");
        return Ok(());
    }

    for search in all {
        let stored = match search.canonical_url() {
            Ok(url) => listings::count_for_search(db.pool(), &url).await?.to_string(),
            Err(_) => "?".to_string(),
        };
        println!(
            "[{}] {}/{}/{} ({} stored) alarm={} email={}",
            search.id,
            search.area,
            search.section,
            search.query,
            stored,
            search.notify_alarm,
            search.notify_email
        );
    }
    Ok(())
}

async fn add_saved_search(
    db: &Database,
    area: &str,
    section: &str,
    query: &str,
    alarm: bool,
    email: bool,
) -> Result<()> {
    if sections::section_code(section).is_none() {
        bail!("unknown section '{section}'; run `vigil sections` for the vocabulary");
    }

    let search = searches::add_search(db.pool(), area, section, query, alarm, email).await?;
    println!("Added saved search {}", search.id);
    Ok(())
}

async fn remove_saved_search(db: &Database, id: i64) -> Result<()> {
    searches::delete_search(db.pool(), id).await?;
    println!("Removed saved search {id}");
    Ok(())
}

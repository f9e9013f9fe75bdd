//! Search indexer binary.
//!
//! Indexes the fixture entities of `SEARCH_DATA_PATH` with the mapping of
//! `SEARCH_MAPPING_PATH` for every website of `SEARCH_WEBSITE_IDS`, then
//! prints the resulting indexes as JSON.

use search_indexer::{telemetry, Dependencies, IndexingError, Settings};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    if let Err(e) = run().await {
        error!(error = %e, "Indexing failed");
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), IndexingError> {
    let settings = Settings::from_env()?;
    telemetry::init_tracing(settings.log_format)?;

    let Dependencies {
        mut orchestrator,
        index,
        request,
    } = Dependencies::new(&settings).await?;

    let report = orchestrator.run(request).await?;

    let mut output = serde_json::Map::new();
    for name in index.index_names().await {
        let snapshot = index.to_json(&name).await?;
        output.insert(name, snapshot);
    }
    println!("{}", serde_json::to_string_pretty(&output)?);

    info!(
        indexes = report.indexes.len(),
        indexed = report.indexed(),
        failed = report.failed(),
        "Done"
    );
    Ok(())
}

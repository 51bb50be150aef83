use std::sync::Arc;

use agrosense_core::logging;
use agrosense_store::{DocumentStore, FirestoreStore, MemoryStore};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use sensor_ingest::{Config, IngestSettings, IngestionLoop, StoreSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init(config.log_format);

    let store: Arc<dyn DocumentStore> = match &config.store {
        StoreSettings::Firestore(firestore) => {
            info!(
                project = %firestore.project_id,
                collection = %firestore.collection,
                emulator = ?firestore.emulator_host,
                "using firestore store"
            );
            Arc::new(FirestoreStore::new(firestore.clone())?)
        }
        StoreSettings::Memory => {
            warn!("using in-memory store, readings will not be persisted");
            Arc::new(MemoryStore::new())
        }
    };

    info!(
        source = %config.source_identifier,
        interval = ?config.tick_interval,
        "agricultural data generator started"
    );

    let cancel = CancellationToken::new();
    let stop = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("stop requested");
                stop.cancel();
            }
            Err(e) => error!(error = %e, "cannot listen for ctrl-c"),
        }
    });

    let mut ingest = IngestionLoop::new(
        store,
        IngestSettings {
            source_identifier: config.source_identifier.clone(),
            tick_interval: config.tick_interval,
            store_timeout: config.store_timeout,
        },
    );
    let report = ingest.run(cancel).await;

    info!(
        final_sequence = report.final_sequence,
        total_iterations = report.stats.readings,
        "data generation stopped"
    );
    Ok(())
}

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::Context;
use signal_hook::consts::TERM_SIGNALS;

use statekeeper_infra::listeners::{PersistenceListener, StateLogListener};
use statekeeper_infra::state_store::{InMemoryStateStore, StateStore, restore_or_default};
use statekeeper_infra::{AgentConfig, JsonLinesSource, ObservationLoop, PersistenceBackend};
use statekeeper_observability::LogFormat;
use statekeeper_sync::{QueueHandle, QueuedListener, SyncEngine};

fn main() -> anyhow::Result<()> {
    let format = std::env::var("STATEKEEPER_LOG_FORMAT")
        .map(|v| LogFormat::parse(&v))
        .unwrap_or_default();
    statekeeper_observability::init_with(format, "info");

    let config = AgentConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        persistence = ?config.persistence,
        interval_ms = config.capture_interval.as_millis() as u64,
        queue_capacity = config.queue_capacity,
        "starting statekeeper agent"
    );

    let store = open_store(&config)?;
    let engine = Arc::new(SyncEngine::with_initial_state(restore_or_default(&store)));

    let persistence = PersistenceListener::new(store);
    let queue: Option<QueueHandle> = if config.queue_capacity > 0 {
        let (listener, handle) = QueuedListener::spawn("persistence", config.queue_capacity, persistence)
            .context("failed to spawn persistence worker")?;
        engine.add_listener(listener);
        Some(handle)
    } else {
        engine.add_listener(persistence);
        None
    };
    engine.add_listener(StateLogListener::new());

    let input: Box<dyn BufRead> = match std::env::args().nth(1) {
        Some(path) => {
            let file = File::open(&path).with_context(|| format!("failed to open {path}"))?;
            tracing::info!(%path, "reading updates from file");
            Box::new(BufReader::new(file))
        }
        None => {
            tracing::info!("reading updates from stdin");
            Box::new(BufReader::new(std::io::stdin()))
        }
    };

    let stop = install_stop_flag().context("failed to install signal handlers")?;
    let stats = ObservationLoop::new(engine.clone(), JsonLinesSource::new(input), config.capture_interval)
        .run(&stop);

    if let Some(handle) = queue {
        let persisted = handle.shutdown();
        tracing::info!(persisted, "persistence queue drained");
    }

    let summary = engine.summary();
    tracing::info!(
        cycles = stats.cycles,
        changes = stats.changes,
        source_errors = stats.source_errors,
        location = %summary.location,
        inventory_count = summary.inventory_count,
        last_update = summary.last_update.as_deref().unwrap_or("never"),
        "agent finished"
    );

    Ok(())
}

/// First SIGINT/SIGTERM raises the flag so the loop ends and queues drain.
/// A second one while stopping terminates at once.
fn install_stop_flag() -> std::io::Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    for &signal in TERM_SIGNALS {
        signal_hook::flag::register_conditional_shutdown(signal, 1, Arc::clone(&stop))?;
        signal_hook::flag::register(signal, Arc::clone(&stop))?;
    }
    Ok(stop)
}

fn open_store(config: &AgentConfig) -> anyhow::Result<Arc<dyn StateStore>> {
    match config.persistence {
        PersistenceBackend::Memory => Ok(Arc::new(InMemoryStateStore::new())),
        #[cfg(feature = "redis")]
        PersistenceBackend::Redis => {
            let store = statekeeper_infra::state_store::RedisStateStore::from_settings(&config.redis)
                .context("failed to configure redis state store")?;
            tracing::info!(key = store.key(), "using redis state store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        PersistenceBackend::Redis => {
            anyhow::bail!("redis persistence requested but the `redis` feature is disabled")
        }
    }
}

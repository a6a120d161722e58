use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{Level, debug, info, warn};

use statekeeper_core::StateUpdate;
use statekeeper_sync::SyncEngine;

use crate::listeners::{STATE_LOG_TARGET, StateLogRecord};
use crate::source::UpdateSource;

const STOP_POLL: Duration = Duration::from_millis(50);

/// Counters accumulated over one [`ObservationLoop::run`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    /// Updates pulled from the source and handed to the engine.
    pub cycles: u64,
    /// Cycles whose update changed the state.
    pub changes: u64,
    pub source_errors: u64,
}

/// Drives an [`UpdateSource`] into a [`SyncEngine`] at a fixed pace.
///
/// - one update per cycle, `interval` apart
/// - a failed read is logged and counted; the loop keeps going
/// - stops when the source is exhausted or `stop` is raised
/// - at `debug` on the state target, every cycle (noops included) also logs
///   the full state record
pub struct ObservationLoop<S> {
    engine: Arc<SyncEngine>,
    source: S,
    interval: Duration,
}

impl<S> core::fmt::Debug for ObservationLoop<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObservationLoop")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl<S: UpdateSource> ObservationLoop<S> {
    pub fn new(engine: Arc<SyncEngine>, source: S, interval: Duration) -> Self {
        Self {
            engine,
            source,
            interval,
        }
    }

    pub fn run(&mut self, stop: &AtomicBool) -> LoopStats {
        let mut stats = LoopStats::default();

        while !stop.load(Ordering::Relaxed) {
            let started = Instant::now();

            match self.source.next_update() {
                Ok(Some(update)) => {
                    let kind = update.kind();
                    let traced = tracing::enabled!(target: STATE_LOG_TARGET, Level::DEBUG)
                        .then(|| update.clone());
                    let changed = self.engine.process_update(update);
                    stats.cycles += 1;
                    if changed {
                        stats.changes += 1;
                    }
                    info!(
                        cycle = stats.cycles,
                        kind = %kind,
                        changed,
                        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                        "frame processed"
                    );
                    if let Some(update) = traced {
                        self.trace_state(&update);
                    }
                }
                Ok(None) => {
                    info!(cycles = stats.cycles, "update source exhausted");
                    break;
                }
                Err(err) => {
                    stats.source_errors += 1;
                    warn!(error = %err, "failed to read update; continuing");
                }
            }

            self.pause(stop);
        }

        stats
    }

    fn trace_state(&self, update: &StateUpdate) {
        let record = StateLogRecord::new(&self.engine.current_state(), Some(update));
        match record.to_json() {
            Ok(json) => debug!(target: STATE_LOG_TARGET, record = %json, "game state after cycle"),
            Err(err) => warn!(error = %err, "failed to encode state record"),
        }
    }

    fn pause(&self, stop: &AtomicBool) {
        let deadline = Instant::now() + self.interval;
        loop {
            let now = Instant::now();
            if now >= deadline || stop.load(Ordering::Relaxed) {
                return;
            }
            thread::sleep(STOP_POLL.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::Cursor;

    use statekeeper_core::{GameState, InventoryItem};

    use super::*;
    use crate::source::{JsonLinesSource, SourceError};

    struct Scripted(VecDeque<Result<Option<StateUpdate>, SourceError>>);

    impl UpdateSource for Scripted {
        fn next_update(&mut self) -> Result<Option<StateUpdate>, SourceError> {
            self.0.pop_front().unwrap_or(Ok(None))
        }
    }

    struct Endless;

    impl UpdateSource for Endless {
        fn next_update(&mut self) -> Result<Option<StateUpdate>, SourceError> {
            Ok(Some(StateUpdate::noop("nothing on screen")))
        }
    }

    #[test]
    fn runs_until_exhausted() {
        let engine = Arc::new(SyncEngine::new());
        let lines = [
            r#"{"update_type":"location","new_location":"Limgrave"}"#,
            r#"{"update_type":"noop"}"#,
            r#"{"update_type":"location","new_location":"Limgrave"}"#,
            r#"{"update_type":"inventory","inventory_items":[{"name":"Rune Arc","quantity":2}]}"#,
        ]
        .join("\n");
        let source = JsonLinesSource::new(Cursor::new(lines.into_bytes()));

        let stats = ObservationLoop::new(engine.clone(), source, Duration::ZERO).run(&AtomicBool::new(false));

        assert_eq!(
            stats,
            LoopStats {
                cycles: 4,
                changes: 2,
                source_errors: 0
            }
        );
        let state = engine.current_state();
        assert_eq!(state.location(), "Limgrave");
        assert_eq!(state.inventory(), &[InventoryItem::new("Rune Arc", 2).unwrap()]);
    }

    #[test]
    fn source_errors_do_not_stop_the_loop() {
        let engine = Arc::new(SyncEngine::new());
        let source = Scripted(VecDeque::from(vec![
            Err(SourceError::Decode {
                line: 1,
                message: "expected value".into(),
            }),
            Ok(Some(StateUpdate::location("Caelid", ""))),
        ]));

        let stats = ObservationLoop::new(engine.clone(), source, Duration::ZERO).run(&AtomicBool::new(false));

        assert_eq!(stats.source_errors, 1);
        assert_eq!(stats.cycles, 1);
        assert_eq!(engine.current_state().location(), "Caelid");
    }

    #[test]
    fn raised_stop_flag_prevents_any_cycle() {
        let engine = Arc::new(SyncEngine::new());
        let stats = ObservationLoop::new(engine, Endless, Duration::ZERO).run(&AtomicBool::new(true));
        assert_eq!(stats, LoopStats::default());
    }

    #[test]
    fn stop_flag_interrupts_a_long_interval() {
        let engine = Arc::new(SyncEngine::new());
        let stop = Arc::new(AtomicBool::new(false));

        let flag = stop.clone();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            flag.store(true, Ordering::Relaxed);
        });

        let started = Instant::now();
        let stats = ObservationLoop::new(engine, Endless, Duration::from_secs(60)).run(&stop);
        stopper.join().unwrap();

        assert_eq!(stats.cycles, 1);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn every_cycle_records_state_at_debug() {
        let engine = Arc::new(SyncEngine::with_initial_state(GameState::new("Limgrave", vec![])));
        let source = Scripted(VecDeque::from(vec![
            Ok(Some(StateUpdate::noop("menu open"))),
            Ok(Some(StateUpdate::noop("loading screen"))),
        ]));

        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let stats = tracing::subscriber::with_default(subscriber, || {
            ObservationLoop::new(engine, source, Duration::ZERO).run(&AtomicBool::new(false))
        });
        assert_eq!(stats.changes, 0);

        let logs = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        let records: Vec<_> = logs.lines().filter(|l| l.contains("game state after cycle")).collect();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|l| l.contains("Limgrave")));
        assert!(records[1].contains("loading screen"));
    }
}

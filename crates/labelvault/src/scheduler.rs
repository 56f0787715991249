//! Recurring triggers.
//!
//! Each installed trigger owns a background thread running a current-thread
//! tokio runtime. The job runs on every interval tick or on a manual trigger;
//! runs of one trigger are sequential and never overlap.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use crate::error::{ArchiverError, Result};

/// Name under which the archival run is installed.
pub const RUN_HANDLER: &str = "run_all_labels";

/// Default period between two archival runs.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

type Job = Arc<dyn Fn() + Send + Sync>;

/// Result of [`TriggerScheduler::install`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Created,
    AlreadyExists,
}

struct Trigger {
    interval: Duration,
    shutdown: Arc<AtomicBool>,
    trigger_tx: broadcast::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Trigger {
    fn stop(mut self) {
        self.shutdown.store(true, Ordering::Release);
        // Wake the select loop so it sees the shutdown flag.
        let _ = self.trigger_tx.send(());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Trigger thread panicked");
            }
        }
    }
}

/// Registry of recurring triggers keyed by handler name.
#[derive(Default)]
pub struct TriggerScheduler {
    triggers: Mutex<HashMap<String, Trigger>>,
}

impl TriggerScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `job` to run every `interval` under `handler`.
    ///
    /// Installing a handler name that already exists leaves the existing
    /// trigger untouched and returns [`InstallOutcome::AlreadyExists`].
    pub fn install<F>(&self, handler: &str, interval: Duration, job: F) -> Result<InstallOutcome>
    where
        F: Fn() + Send + Sync + 'static,
    {
        if interval.is_zero() {
            return Err(ArchiverError::Scheduler(
                "trigger interval must be greater than zero".to_string(),
            ));
        }

        let mut triggers = self.lock()?;
        if triggers.contains_key(handler) {
            log::debug!("Trigger '{}' already installed", handler);
            return Ok(InstallOutcome::AlreadyExists);
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let (trigger_tx, trigger_rx) = broadcast::channel(16);
        let handle = spawn_trigger(
            handler.to_string(),
            interval,
            Arc::new(job),
            Arc::clone(&shutdown),
            trigger_rx,
        )?;

        triggers.insert(
            handler.to_string(),
            Trigger {
                interval,
                shutdown,
                trigger_tx,
                handle: Some(handle),
            },
        );
        log::info!(
            "Installed trigger '{}' every {}s",
            handler,
            interval.as_secs()
        );
        Ok(InstallOutcome::Created)
    }

    pub fn is_installed(&self, handler: &str) -> bool {
        self.lock()
            .map(|t| t.contains_key(handler))
            .unwrap_or(false)
    }

    /// Installed handler names, sorted.
    pub fn handlers(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .lock()
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn interval_of(&self, handler: &str) -> Option<Duration> {
        self.lock().ok()?.get(handler).map(|t| t.interval)
    }

    /// Requests an immediate run. Returns false when no such trigger exists.
    pub fn trigger_now(&self, handler: &str) -> Result<bool> {
        let triggers = self.lock()?;
        match triggers.get(handler) {
            Some(trigger) => {
                let _ = trigger.trigger_tx.send(());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Stops one trigger and waits for its thread. An in-flight run finishes first.
    pub fn stop(&self, handler: &str) -> Result<bool> {
        let removed = self.lock()?.remove(handler);
        match removed {
            Some(trigger) => {
                trigger.stop();
                log::info!("Stopped trigger '{}'", handler);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn stop_all(&self) -> Result<()> {
        let drained: Vec<(String, Trigger)> = self.lock()?.drain().collect();
        for (handler, trigger) in drained {
            trigger.stop();
            log::info!("Stopped trigger '{}'", handler);
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Trigger>>> {
        self.triggers
            .lock()
            .map_err(|_| ArchiverError::Scheduler("trigger registry lock poisoned".to_string()))
    }
}

impl Drop for TriggerScheduler {
    fn drop(&mut self) {
        if let Ok(triggers) = self.triggers.get_mut() {
            for (_, trigger) in triggers.drain() {
                trigger.stop();
            }
        }
    }
}

fn spawn_trigger(
    handler: String,
    interval: Duration,
    job: Job,
    shutdown: Arc<AtomicBool>,
    mut trigger_rx: broadcast::Receiver<()>,
) -> Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name(format!("trigger-{}", handler))
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("Failed to start runtime for trigger '{}': {}", handler, e);
                    return;
                }
            };

            rt.block_on(async {
                let mut timer = tokio::time::interval(interval);
                timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
                timer.tick().await; // skip immediate first tick

                loop {
                    if shutdown.load(Ordering::Acquire) {
                        break;
                    }

                    tokio::select! {
                        _ = timer.tick() => {},
                        Ok(()) = trigger_rx.recv() => {
                            log::info!("Manual run of '{}' triggered", handler);
                        },
                    }

                    if shutdown.load(Ordering::Acquire) {
                        break;
                    }

                    job();
                }
            });
        })
        .map_err(|e| ArchiverError::Scheduler(format!("failed to spawn trigger thread: {}", e)))
}

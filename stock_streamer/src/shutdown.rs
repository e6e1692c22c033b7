//! Cooperative shutdown and worker supervision.
//!
//! Workers check a [`ShutdownToken`] at loop boundaries only; an in-flight
//! request or sleep is never interrupted. Each worker reports its exit on a
//! crossbeam channel so the main thread can wait for them in bounded slices
//! and abandon the ones still busy once the grace period is over.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, warn};

/// Wait slice used while watching the token, keeps Ctrl+C responsive.
const WAIT_SLICE: Duration = Duration::from_millis(200);

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    flag: Arc<AtomicBool>,
}

impl ShutdownToken {
    /// New, not cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder to stop at its next loop boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether [`ShutdownToken::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Spawn a named worker thread that reports on `done_tx` when `work` returns.
pub fn spawn_worker<F>(name: &str, done_tx: Sender<String>, work: F) -> std::io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    let worker_name = name.to_string();
    thread::Builder::new().name(worker_name.clone()).spawn(move || {
        work();
        debug!("Worker {} finished", worker_name);
        if done_tx.send(worker_name).is_err() {
            debug!("Supervisor gone before worker exit was reported");
        }
    })
}

/// Block until `token` is cancelled or every worker in `workers` has reported,
/// then give the rest at most `grace` to finish. Returns the names of workers
/// that did not finish in time; their threads are left running and end with
/// the process.
pub fn wait_for_workers(
    done_rx: &Receiver<String>,
    workers: &[String],
    token: &ShutdownToken,
    grace: Duration,
) -> Vec<String> {
    let mut pending: Vec<String> = workers.to_vec();

    while !pending.is_empty() && !token.is_cancelled() {
        match done_rx.recv_timeout(WAIT_SLICE) {
            Ok(name) => mark_finished(&mut pending, &name),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                error!("Worker channel closed with {} worker(s) unreported", pending.len());
                return pending;
            }
        }
    }
    token.cancel();

    let deadline = Instant::now() + grace;
    while !pending.is_empty() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        match done_rx.recv_timeout((deadline - now).min(WAIT_SLICE)) {
            Ok(name) => mark_finished(&mut pending, &name),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if !pending.is_empty() {
        warn!("Still busy after {:?}, abandoning: {}", grace, pending.join(", "));
    }
    pending
}

fn mark_finished(pending: &mut Vec<String>, name: &str) {
    info!("Worker {} stopped", name);
    pending.retain(|w| w != name);
}

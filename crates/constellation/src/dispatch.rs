//! Fan-out of ephemeris queries.
//!
//! Each unique key gets its own worker thread. Workers report `(index, result)` over a
//! channel and the caller slots results back by index, so output order is the key
//! order no matter which query finishes first.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use solar_config::DispatchMode;
use solar_ephem::{Ephemeris, EphemerisError, HeliographicPosition};
use tracing::{debug, warn};

pub type Resolution = Result<HeliographicPosition, EphemerisError>;

/// Resolve `keys` at `epoch`, returning one result per key in the same order.
///
/// In concurrent mode any key still outstanding when `timeout` elapses is reported as
/// [`EphemerisError::Unavailable`]. Its worker is left to finish on its own.
pub fn resolve_all(
    ephemeris: &Arc<dyn Ephemeris>,
    keys: &[String],
    epoch: DateTime<Utc>,
    mode: DispatchMode,
    timeout: Duration,
) -> Vec<Resolution> {
    match mode {
        DispatchMode::Sequential => keys
            .iter()
            .map(|key| {
                debug!(body = %key, "resolving");
                ephemeris.resolve(key, epoch)
            })
            .collect(),
        DispatchMode::Concurrent => resolve_concurrent(ephemeris, keys, epoch, timeout),
    }
}

fn resolve_concurrent(
    ephemeris: &Arc<dyn Ephemeris>,
    keys: &[String],
    epoch: DateTime<Utc>,
    timeout: Duration,
) -> Vec<Resolution> {
    let (tx, rx) = mpsc::channel::<(usize, Resolution)>();
    let mut slots: Vec<Option<Resolution>> = vec![None; keys.len()];
    let mut outstanding = 0usize;

    for (index, key) in keys.iter().enumerate() {
        let tx = tx.clone();
        let ephemeris = Arc::clone(ephemeris);
        let worker_key = key.clone();
        let spawned = thread::Builder::new()
            .name(format!("ephem-{index}"))
            .spawn(move || {
                let result = ephemeris.resolve(&worker_key, epoch);
                // The receiver is gone once the deadline has passed.
                let _ = tx.send((index, result));
            });
        match spawned {
            Ok(_) => {
                debug!(body = %key, index, "dispatched");
                outstanding += 1;
            }
            Err(err) => {
                slots[index] = Some(Err(EphemerisError::unavailable(
                    key,
                    epoch,
                    format!("could not start worker: {err}"),
                )));
            }
        }
    }
    drop(tx);

    // An unrepresentable deadline means waiting for every worker.
    let deadline = Instant::now().checked_add(timeout);
    while outstanding > 0 {
        let remaining = deadline.map_or(timeout, |d| d.saturating_duration_since(Instant::now()));
        match rx.recv_timeout(remaining) {
            Ok((index, result)) => {
                slots[index] = Some(result);
                outstanding -= 1;
            }
            Err(_) => break,
        }
    }

    slots
        .into_iter()
        .zip(keys)
        .map(|(slot, key)| {
            slot.unwrap_or_else(|| {
                warn!(body = %key, ?timeout, "ephemeris query timed out");
                Err(EphemerisError::unavailable(
                    key,
                    epoch,
                    format!("timed out after {:.1} s", timeout.as_secs_f64()),
                ))
            })
        })
        .collect()
}

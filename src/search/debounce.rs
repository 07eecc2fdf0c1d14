//! Debounced values.
//!
//! A [`Debouncer`] holds the latest pushed value and releases it only once
//! `delay` has elapsed without another push. Every push re-arms the deadline.
//! [`debounce`] wraps the same logic around a channel so a stream of raw
//! values becomes a stream of settled ones.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    /// Drops the pending value without releasing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolves with the pending value once its deadline passes.
    ///
    /// Never resolves while nothing is pending. Cancel safe: dropping the
    /// future before it completes leaves the pending value in place.
    pub async fn settled(&mut self) -> T {
        let deadline = match &self.pending {
            Some((_, deadline)) => *deadline,
            None => std::future::pending().await,
        };

        sleep_until(deadline).await;

        match self.pending.take() {
            Some((value, _)) => value,
            None => std::future::pending().await,
        }
    }
}

/// Turns a stream of raw values into a stream of settled values.
///
/// When the input closes, a value still inside its quiet period is dropped
/// and the output closes.
pub fn debounce<T>(mut input: mpsc::Receiver<T>, delay: Duration) -> mpsc::Receiver<T>
where
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        let mut debouncer = Debouncer::new(delay);

        loop {
            tokio::select! {
                received = input.recv() => match received {
                    Some(value) => debouncer.push(value),
                    None => break,
                },
                value = debouncer.settled() => {
                    if tx.send(value).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    rx
}

use std::fmt::Debug;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::debug;

use crate::error::RelayError;
use crate::shutdown::ShutdownSignal;
use crate::statistics::RelayStatistics;

/// Starts a latest value relay reading from the given source.
///
/// A background task takes every value produced on `source` as soon as it
/// arrives and places it in the relay's single slot, replacing any value
/// the consumer has not read yet. A value counts as pending once the task
/// has taken it from `source`.
///
/// When `source` is closed the last pending value is still delivered before
/// the returned receiver reports the end of the stream. When `shutdown`
/// fires the relay stops immediately and the receiver goes permanently idle.
///
/// This must be called from within a tokio runtime.
pub fn relay<T>(source: flume::Receiver<T>, shutdown: ShutdownSignal) -> LatestReceiver<T>
where
    T: Debug + Send + 'static,
{
    let (tx, rx) = latest_value_channel(shutdown.clone());
    tokio::spawn(run_relay(source, tx, shutdown));
    rx
}

/// Creates a producer handle and a receiver sharing a single value slot.
///
/// Sending places the value in the slot directly, so it is pending by the
/// time [LatestSender::send] returns. Dropping every [LatestSender] is an
/// orderly close.
pub fn latest_value_channel<T>(
    shutdown: ShutdownSignal,
) -> (LatestSender<T>, LatestReceiver<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot {
            pending: None,
            num_senders: 1,
            stopped: false,
        }),
        notify: Notify::new(),
        shutdown,
        statistics: RelayStatistics::default(),
    });

    let tx = LatestSender {
        shared: shared.clone(),
    };
    (tx, LatestReceiver { shared })
}

/// The producing side of a relay created with [latest_value_channel].
pub struct LatestSender<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for LatestSender<T> {
    fn clone(&self) -> Self {
        self.shared.slot.lock().num_senders += 1;
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Drop for LatestSender<T> {
    fn drop(&mut self) {
        let closed = {
            let mut slot = self.shared.slot.lock();
            slot.num_senders -= 1;
            slot.num_senders == 0
        };

        if closed {
            self.shared.notify.notify_one();
        }
    }
}

impl<T: Debug> LatestSender<T> {
    /// Makes `value` the pending value of the relay.
    ///
    /// Any value the consumer has not read yet is discarded. This never
    /// waits, however far behind the consumer is.
    ///
    /// Fails once the shutdown signal has fired or the receiver is gone.
    pub fn send(&self, value: T) -> Result<(), RelayError<T>> {
        if self.shared.shutdown.is_fired() {
            self.shared.stop();
            return Err(RelayError::Closed(value));
        }

        {
            let mut slot = self.shared.slot.lock();
            if slot.stopped {
                return Err(RelayError::Closed(value));
            }

            self.shared
                .statistics
                .num_received
                .fetch_add(1, Ordering::Relaxed);

            if slot.pending.replace(value).is_some() {
                debug!("Discarding stale value in favour of a newer one.");
                self.shared
                    .statistics
                    .num_coalesced
                    .fetch_add(1, Ordering::Relaxed);
            }
        }

        self.shared.notify.notify_one();
        Ok(())
    }

    /// Closes this producer handle.
    ///
    /// Once every handle is closed the relay flushes any pending value and
    /// ends the stream.
    pub fn close(self) {
        drop(self);
    }
}

/// The consuming side of a relay.
pub struct LatestReceiver<T> {
    shared: Arc<Shared<T>>,
}

impl<T> LatestReceiver<T> {
    /// Waits for the most recent value.
    ///
    /// Returns `None` once the relay has been closed and the final value
    /// has been read. After the shutdown signal fires this never resolves.
    pub async fn recv(&self) -> Option<T> {
        let mut shutdown = self.shared.shutdown.clone();

        tokio::select! {
            biased;

            _ = shutdown.fired() => {
                self.shared.stop();
                futures::future::pending().await
            },
            value = self.shared.next() => value,
        }
    }

    /// Takes the pending value if there is one.
    pub fn try_recv(&self) -> Option<T> {
        if self.shared.shutdown.is_fired() {
            self.shared.stop();
            return None;
        }

        self.shared.take().ok()
    }

    #[inline]
    /// Gets the live relay statistics.
    pub fn statistics(&self) -> RelayStatistics {
        self.shared.statistics.clone()
    }

    /// Converts the receiver into a stream of the latest values.
    pub fn into_stream(self) -> impl Stream<Item = T> {
        futures::stream::unfold(self, |rx| async move {
            let value = rx.recv().await?;
            Some((value, rx))
        })
    }
}

impl<T> Drop for LatestReceiver<T> {
    fn drop(&mut self) {
        self.shared.stop();
    }
}

/// The single value holding cell.
struct Slot<T> {
    pending: Option<T>,
    num_senders: usize,
    /// Set once the relay can no longer deliver values.
    stopped: bool,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    notify: Notify,
    shutdown: ShutdownSignal,
    statistics: RelayStatistics,
}

/// Why the slot had no value to take.
enum Empty {
    Waiting,
    Closed,
}

impl<T> Shared<T> {
    fn take(&self) -> Result<T, Empty> {
        let mut slot = self.slot.lock();
        match slot.pending.take() {
            Some(value) => {
                self.statistics.num_forwarded.fetch_add(1, Ordering::Relaxed);
                Ok(value)
            },
            None if slot.num_senders == 0 || slot.stopped => Err(Empty::Closed),
            None => Err(Empty::Waiting),
        }
    }

    async fn next(&self) -> Option<T> {
        loop {
            // A notification sent between `take` and the await is kept as a
            // permit by `notify_one`, so it cannot be missed.
            let notified = self.notify.notified();

            match self.take() {
                Ok(value) => return Some(value),
                Err(Empty::Closed) => return None,
                Err(Empty::Waiting) => notified.await,
            }
        }
    }

    fn stop(&self) {
        let mut slot = self.slot.lock();
        if !slot.stopped {
            slot.stopped = true;
            slot.pending = None;
        }
    }
}

async fn run_relay<T: Debug>(
    source: flume::Receiver<T>,
    tx: LatestSender<T>,
    mut shutdown: ShutdownSignal,
) {
    debug!("Latest value relay is running.");

    loop {
        let value = tokio::select! {
            biased;

            _ = shutdown.fired() => {
                tx.shared.stop();
                debug!("Received a shutdown signal. Stopping.");
                return;
            },
            msg = source.recv_async() => match msg {
                Ok(value) => value,
                Err(_) => {
                    // Dropping the sender ends the stream once the pending
                    // value has been read.
                    debug!("Relay source has been closed. Stopping.");
                    return;
                },
            },
        };

        if tx.send(value).is_err() {
            debug!("Relay receiver is gone. Stopping.");
            return;
        }
    }
}

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
/// The firing side of a shutdown signal.
///
/// This handle is cheap to clone, any clone may fire the signal.
/// Dropping every handle without calling [Shutdown::fire] leaves the
/// signal unfired forever.
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    /// Creates a new shutdown handle and the signal it controls.
    pub fn new() -> (Self, ShutdownSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx: Arc::new(tx) }, ShutdownSignal { rx })
    }

    /// Fires the signal, waking every task waiting on it.
    pub fn fire(&self) {
        // `send_replace` does not care whether any receivers are still alive.
        self.tx.send_replace(true);
    }

    /// Creates another signal bound to this handle.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }
}

#[derive(Debug, Clone)]
/// A signal which resolves once the matching [Shutdown] has been fired.
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// A signal which never fires.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        Self { rx }
    }

    #[inline]
    /// Returns if the signal has already been fired.
    pub fn is_fired(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits until the signal is fired.
    ///
    /// If every [Shutdown] handle is dropped without firing, this future
    /// never resolves.
    pub async fn fired(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }

            if self.rx.changed().await.is_err() {
                futures::future::pending::<()>().await;
            }
        }
    }
}

//! # Beacon Signal
//! Coalescing signal plumbing for notifying listeners of the current state
//! of the cluster without ever blocking the notifier.
//!
//! A latest value relay sits between a producer which may emit values in
//! fast bursts (leadership changes, membership updates) and a consumer which
//! reads at its own pace. Only the most recent value is kept, so the memory
//! used by a relay never grows, and the final value before the producer
//! closes is always delivered.
//!
//! ```rust
//! use beacon_signal::{latest_value_channel, Shutdown};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (_shutdown, signal) = Shutdown::new();
//!     let (tx, rx) = latest_value_channel::<&'static str>(signal);
//!
//!     tx.send("leader elected").expect("Relay is running.");
//!     tx.close();
//!
//!     assert_eq!(rx.recv().await, Some("leader elected"));
//!     assert_eq!(rx.recv().await, None);
//! }
//! ```

mod error;
mod relay;
mod shutdown;
mod statistics;

pub use error::RelayError;
pub use relay::{latest_value_channel, relay, LatestReceiver, LatestSender};
pub use shutdown::{Shutdown, ShutdownSignal};
pub use statistics::RelayStatistics;

//! # Beacon
//! Server discovery and control-plane signalling for cluster orchestrators.
//!
//! This is a convenience package which includes all of the sub-projects within
//! Beacon, realistically you probably only want some of these projects:
//!
//! ### Features
//! - `beacon_node` - Classification of gossip members into control-plane servers,
//!   minimum version gating and RPC fan out ordering.
//! - `beacon_signal` - A coalescing latest value relay for notifying listeners
//!   without ever blocking the notifier.

#[cfg(feature = "beacon-node")]
pub use beacon_node as node;
#[cfg(feature = "beacon-signal")]
pub use beacon_signal as signal;

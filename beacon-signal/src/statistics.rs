use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type Counter = AtomicU64;

#[derive(Debug, Clone, Default)]
/// Live metrics around a single relay.
pub struct RelayStatistics(Arc<RelayStatisticsInner>);

impl Deref for RelayStatistics {
    type Target = RelayStatisticsInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Default)]
pub struct RelayStatisticsInner {
    /// The number of values handed to the relay.
    pub(crate) num_received: Counter,
    /// The number of values replaced by a newer value before being read.
    pub(crate) num_coalesced: Counter,
    /// The number of values read by the consumer.
    pub(crate) num_forwarded: Counter,
}

impl RelayStatisticsInner {
    /// The number of values handed to the relay.
    pub fn num_received(&self) -> u64 {
        self.num_received.load(Ordering::Relaxed)
    }

    /// The number of values replaced by a newer value before being read.
    pub fn num_coalesced(&self) -> u64 {
        self.num_coalesced.load(Ordering::Relaxed)
    }

    /// The number of values read by the consumer.
    pub fn num_forwarded(&self) -> u64 {
        self.num_forwarded.load(Ordering::Relaxed)
    }
}

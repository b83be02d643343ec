use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type Counter = AtomicU64;

#[derive(Debug, Clone, Default)]
/// Live metrics around the known control-plane servers.
pub struct RegistryStatistics(Arc<RegistryStatisticsInner>);

impl Deref for RegistryStatistics {
    type Target = RegistryStatisticsInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Default)]
pub struct RegistryStatisticsInner {
    /// The number of valid servers in the gossip pool.
    pub(crate) num_servers: Counter,
    /// The number of servers which take part in raft votes.
    pub(crate) num_voters: Counter,
    /// The number of servers currently alive.
    pub(crate) num_alive: Counter,
    /// The number of servers the gossip layer believes have failed.
    pub(crate) num_failed: Counter,
    /// The number of members announcing the server role with malformed tags.
    pub(crate) num_rejected: Counter,
}

impl RegistryStatisticsInner {
    /// The number of valid servers in the gossip pool.
    pub fn num_servers(&self) -> u64 {
        self.num_servers.load(Ordering::Relaxed)
    }

    /// The number of servers which take part in raft votes.
    pub fn num_voters(&self) -> u64 {
        self.num_voters.load(Ordering::Relaxed)
    }

    /// The number of servers currently alive.
    pub fn num_alive(&self) -> u64 {
        self.num_alive.load(Ordering::Relaxed)
    }

    /// The number of servers the gossip layer believes have failed.
    pub fn num_failed(&self) -> u64 {
        self.num_failed.load(Ordering::Relaxed)
    }

    /// The number of members announcing the server role with malformed tags.
    pub fn num_rejected(&self) -> u64 {
        self.num_rejected.load(Ordering::Relaxed)
    }
}

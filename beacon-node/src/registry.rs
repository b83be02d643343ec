use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use beacon_signal::{latest_value_channel, LatestReceiver, LatestSender, ShutdownSignal};
use parking_lot::RwLock;
use rand::Rng;
use tracing::{debug, info};

use crate::error::MemberRejection;
use crate::fanout::{max_u64, partition_all, shuffle};
use crate::member::{Member, MemberStatus};
use crate::server::{classify, log_rejection, ServerDescriptor};
use crate::statistics::RegistryStatistics;
use crate::version::VersionGate;

pub type ServerSet = BTreeMap<String, ServerDescriptor>;

#[derive(Default)]
struct RegistryState {
    members: Vec<Member>,
    servers: ServerSet,
}

#[derive(Clone)]
/// The set of control-plane servers currently known to the node.
///
/// This handle is cheap to clone.
pub struct ServerRegistry {
    state: Arc<RwLock<RegistryState>>,
    statistics: RegistryStatistics,
    changes: LatestSender<ServerSet>,
}

impl ServerRegistry {
    /// Creates a new, empty registry.
    ///
    /// The returned receiver observes the latest server set every time it
    /// changes.
    pub fn new(shutdown: ShutdownSignal) -> (Self, LatestReceiver<ServerSet>) {
        let (changes, rx) = latest_value_channel(shutdown);
        let registry = Self {
            state: Arc::new(RwLock::new(RegistryState::default())),
            statistics: RegistryStatistics::default(),
            changes,
        };

        (registry, rx)
    }

    /// Replaces the known gossip pool with `members`.
    ///
    /// Every member is classified and the valid servers become the new
    /// server set, watchers are notified if the set changed.
    pub fn apply_members(&self, members: Vec<Member>) {
        let mut num_rejected = 0;
        let mut servers = ServerSet::new();
        for member in members.iter() {
            match classify(member) {
                Ok(server) => {
                    servers.insert(server.name.clone(), server);
                },
                Err(MemberRejection::NotAServer) => {},
                Err(error) => {
                    log_rejection(member, &error);
                    num_rejected += 1;
                },
            }
        }

        // Publishing under the write lock keeps the order of published sets
        // the same as the order the state was replaced in.
        let previous = {
            let mut state = self.state.write();
            state.members = members;
            let previous = std::mem::replace(&mut state.servers, servers.clone());

            if previous != servers && self.changes.send(servers.clone()).is_err() {
                debug!("Server set watcher has stopped, change was not published.");
            }

            previous
        };

        for name in previous.keys().filter(|name| !servers.contains_key(*name)) {
            info!(server = %name, "Server is no longer part of the cluster.");
        }
        for server in servers.values().filter(|s| !previous.contains_key(&s.name)) {
            info!(
                server = %server,
                region = %server.region,
                build = %server.build,
                non_voter = server.non_voter,
                "Server has joined the cluster."
            );
        }

        self.update_statistics(&servers, num_rejected);
    }

    fn update_statistics(&self, servers: &ServerSet, num_rejected: u64) {
        let count = |f: fn(&ServerDescriptor) -> bool| {
            servers.values().filter(|s| f(s)).count() as u64
        };

        self.statistics
            .num_servers
            .store(servers.len() as u64, Ordering::Relaxed);
        self.statistics
            .num_voters
            .store(count(ServerDescriptor::is_voter), Ordering::Relaxed);
        self.statistics.num_alive.store(
            count(|s| s.status == MemberStatus::Alive),
            Ordering::Relaxed,
        );
        self.statistics.num_failed.store(
            count(|s| s.status == MemberStatus::Failed),
            Ordering::Relaxed,
        );
        self.statistics
            .num_rejected
            .store(num_rejected, Ordering::Relaxed);
    }

    /// Returns a snapshot of the current server set.
    pub fn servers(&self) -> ServerSet {
        self.state.read().servers.clone()
    }

    /// Gets a single server by its member name.
    pub fn get(&self, name: &str) -> Option<ServerDescriptor> {
        self.state.read().servers.get(name).cloned()
    }

    /// Returns the RPC addresses of every alive server.
    pub fn alive_rpc_addrs(&self) -> Vec<SocketAddr> {
        self.state
            .read()
            .servers
            .values()
            .filter(|s| s.status == MemberStatus::Alive)
            .map(|s| s.rpc_addr)
            .collect()
    }

    /// The largest bootstrap expect hint announced by any server.
    pub fn max_expect(&self) -> u64 {
        self.state
            .read()
            .servers
            .values()
            .fold(0, |acc, s| max_u64(acc, s.expect as u64))
    }

    /// Orders the alive servers for an RPC fan out.
    ///
    /// The RPC addresses are shuffled so load is spread across the servers
    /// and then split into batches of at most `batch_size` addresses,
    /// a `batch_size` of `0` produces a single batch.
    pub fn fanout_batches<R>(&self, batch_size: usize, rng: &mut R) -> Vec<Vec<SocketAddr>>
    where
        R: Rng + ?Sized,
    {
        let mut addrs = self.alive_rpc_addrs();
        if addrs.is_empty() {
            return Vec::new();
        }

        shuffle(&mut addrs, rng);
        partition_all(batch_size, &addrs)
            .into_iter()
            .map(<[SocketAddr]>::to_vec)
            .collect()
    }

    /// Applies a version gate to the last gossip pool applied.
    pub fn meets_minimum_version(&self, gate: &VersionGate) -> bool {
        gate.check(self.state.read().members.iter())
    }

    #[inline]
    /// Gets the live registry statistics.
    pub fn statistics(&self) -> RegistryStatistics {
        self.statistics.clone()
    }
}

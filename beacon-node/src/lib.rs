//! # Beacon Node
//! Server discovery for the control plane on top of a gossip membership pool.
//!
//! Every process in the cluster, servers and clients alike, announces itself
//! to the gossip pool along with a set of string tags. This crate turns
//! those loosely typed records into validated [ServerDescriptor]s, decides
//! if the servers of the pool satisfy a minimum software version before a
//! version sensitive operation is allowed, and orders servers for RPC fan out.
//!
//! ```rust
//! use std::net::IpAddr;
//!
//! use beacon_node::{is_server, servers_meet_minimum_version, Member, MemberStatus};
//! use semver::Version;
//!
//! let addr: IpAddr = [10, 0, 0, 1].into();
//! let member = Member::new("server-1.global", addr, MemberStatus::Alive)
//!     .with_tag("role", "nomad")
//!     .with_tag("region", "global")
//!     .with_tag("dc", "dc1")
//!     .with_tag("port", "4647")
//!     .with_tag("vsn", "1")
//!     .with_tag("build", "1.6.2+ent");
//!
//! let server = is_server(&member).expect("Member is a server.");
//! assert_eq!(server.rpc_addr.to_string(), "10.0.0.1:4647");
//!
//! let members = [member];
//! assert!(servers_meet_minimum_version(&members, &Version::new(1, 6, 0), false));
//! ```

mod error;
mod fanout;
mod member;
mod registry;
mod server;
mod statistics;
mod version;

pub use error::{MemberRejection, UnknownStatus};
pub use fanout::{max_u64, partition_all, shuffle, shuffle_strings};
pub use member::{Member, MemberStatus};
pub use registry::{ServerRegistry, ServerSet};
pub use server::{
    classify,
    is_server,
    parse_build,
    ServerDescriptor,
    ServerTags,
    BOOTSTRAP_KEY,
    BUILD_KEY,
    DATACENTER_KEY,
    DEFAULT_PROTOCOL_VERSION,
    DEFAULT_RAFT_VERSION,
    EXPECT_KEY,
    ID_KEY,
    NON_VOTER_KEY,
    PORT_KEY,
    PROTOCOL_VERSION_KEY,
    RAFT_VERSION_KEY,
    REGION_KEY,
    ROLE_KEY,
    RPC_ADDR_KEY,
    SERVER_ROLE,
};
pub use statistics::RegistryStatistics;
pub use version::{meets_version, servers_meet_minimum_version, VersionGate};

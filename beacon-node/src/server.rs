use std::collections::HashMap;
use std::fmt::{self, Display};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use semver::Version;
use tracing::trace;

use crate::error::MemberRejection;
use crate::member::{Member, MemberStatus};

/// The value of the role tag announced by control-plane servers.
pub static SERVER_ROLE: &str = "nomad";

pub static ROLE_KEY: &str = "role";
pub static ID_KEY: &str = "id";
pub static REGION_KEY: &str = "region";
pub static DATACENTER_KEY: &str = "dc";
pub static PORT_KEY: &str = "port";
pub static RPC_ADDR_KEY: &str = "rpc_addr";
pub static PROTOCOL_VERSION_KEY: &str = "vsn";
pub static RAFT_VERSION_KEY: &str = "raft_vsn";
pub static BUILD_KEY: &str = "build";
pub static BOOTSTRAP_KEY: &str = "bootstrap";
pub static EXPECT_KEY: &str = "expect";
pub static NON_VOTER_KEY: &str = "nonvoter";

pub const DEFAULT_PROTOCOL_VERSION: u32 = 1;
pub const DEFAULT_RAFT_VERSION: u32 = 3;

static FLAG_SET: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq)]
/// The validated view of a gossip member which is a control-plane server.
pub struct ServerDescriptor {
    /// The gossip name of the member.
    pub name: String,
    /// The server ID, empty if the server did not announce one.
    pub id: String,
    pub region: String,
    pub datacenter: String,
    /// The port the server accepts RPC connections on.
    pub port: u16,
    /// The gossip address of the member paired with the RPC port.
    pub addr: SocketAddr,
    /// The address other servers should use for RPC.
    ///
    /// This is the advertised RPC address if the member set one, otherwise
    /// it is the same as `addr`.
    pub rpc_addr: SocketAddr,
    /// The major version of the coordination protocol.
    pub protocol_version: u32,
    pub raft_version: u32,
    /// The software version the server is running.
    pub build: Version,
    /// If the server was started in bootstrap mode.
    pub bootstrap: bool,
    /// The number of servers the server expects before bootstrapping.
    pub expect: u32,
    pub non_voter: bool,
    pub status: MemberStatus,
}

impl ServerDescriptor {
    #[inline]
    /// Returns if the server takes part in raft votes.
    pub fn is_voter(&self) -> bool {
        !self.non_voter
    }
}

impl Display for ServerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Addr: {}) (DC: {})",
            self.name, self.addr, self.datacenter
        )
    }
}

/// Classifies a gossip member, producing its server descriptor if the
/// member is a well formed control-plane server.
pub fn classify(member: &Member) -> Result<ServerDescriptor, MemberRejection> {
    if member.tag(ROLE_KEY) != Some(SERVER_ROLE) {
        return Err(MemberRejection::NotAServer);
    }

    let region = required_tag(member, REGION_KEY)?;
    let datacenter = required_tag(member, DATACENTER_KEY)?;
    let port = parse_number::<u16>(PORT_KEY, required_tag(member, PORT_KEY)?)?;
    let protocol_version = parse_number::<u32>(
        PROTOCOL_VERSION_KEY,
        required_tag(member, PROTOCOL_VERSION_KEY)?,
    )?;

    let raw_build = required_tag(member, BUILD_KEY)?;
    let build = parse_build(raw_build).map_err(|e| MemberRejection::InvalidTag {
        key: BUILD_KEY,
        value: raw_build.to_string(),
        reason: e.to_string(),
    })?;

    let raft_version = member
        .tag(RAFT_VERSION_KEY)
        .and_then(|raw| raw.parse::<u32>().ok())
        .unwrap_or(0);

    let expect = match member.tag(EXPECT_KEY) {
        Some(raw) => parse_number::<u32>(EXPECT_KEY, raw)?,
        None => 0,
    };

    let rpc_ip = match member.tag(RPC_ADDR_KEY) {
        Some(raw) if !raw.is_empty() => {
            raw.parse::<IpAddr>()
                .map_err(|e| MemberRejection::InvalidTag {
                    key: RPC_ADDR_KEY,
                    value: raw.to_string(),
                    reason: e.to_string(),
                })?
        },
        _ => member.addr,
    };

    Ok(ServerDescriptor {
        name: member.name.clone(),
        id: member.tag(ID_KEY).unwrap_or_default().to_string(),
        region: region.to_string(),
        datacenter: datacenter.to_string(),
        port,
        addr: SocketAddr::new(member.addr, port),
        rpc_addr: SocketAddr::new(rpc_ip, port),
        protocol_version,
        raft_version,
        build,
        bootstrap: member.tag(BOOTSTRAP_KEY) == Some(FLAG_SET),
        expect,
        non_voter: member.tag(NON_VOTER_KEY) == Some(FLAG_SET),
        status: member.status,
    })
}

/// Returns the server descriptor of the member if it is a valid server.
///
/// Malformed server members are logged and treated as not being servers.
pub fn is_server(member: &Member) -> Option<ServerDescriptor> {
    match classify(member) {
        Ok(server) => Some(server),
        Err(MemberRejection::NotAServer) => None,
        Err(error) => {
            log_rejection(member, &error);
            None
        },
    }
}

pub(crate) fn log_rejection(member: &Member, error: &MemberRejection) {
    trace!(
        member = %member.name,
        error = %error,
        "Ignoring malformed server member."
    );
}

/// Parses a build string into a semantic version.
///
/// A leading `v` is accepted and missing minor or patch components are
/// treated as zero. Pre-release and build metadata suffixes are kept.
pub fn parse_build(raw: &str) -> Result<Version, semver::Error> {
    let raw = raw.trim();
    let raw = raw.strip_prefix('v').unwrap_or(raw);

    let suffix_start = raw.find(['-', '+']).unwrap_or(raw.len());
    let (core, suffix) = raw.split_at(suffix_start);

    match core.matches('.').count() {
        0 => Version::parse(&format!("{core}.0.0{suffix}")),
        1 => Version::parse(&format!("{core}.0{suffix}")),
        _ => Version::parse(raw),
    }
}

fn required_tag<'a>(
    member: &'a Member,
    key: &'static str,
) -> Result<&'a str, MemberRejection> {
    member
        .tag(key)
        .ok_or(MemberRejection::MissingTag { key })
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, MemberRejection>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>().map_err(|e| MemberRejection::InvalidTag {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Debug, Clone)]
/// Builds the tags a server announces to the gossip pool.
///
/// The produced tags are exactly what [classify] expects.
pub struct ServerTags {
    id: Option<String>,
    region: String,
    datacenter: String,
    port: u16,
    rpc_addr: Option<IpAddr>,
    protocol_version: u32,
    raft_version: u32,
    build: Version,
    bootstrap: bool,
    expect: u32,
    non_voter: bool,
}

impl ServerTags {
    /// Create a new set of server tags.
    pub fn new(
        region: impl Display,
        datacenter: impl Display,
        port: u16,
        build: Version,
    ) -> Self {
        Self {
            id: None,
            region: region.to_string(),
            datacenter: datacenter.to_string(),
            port,
            rpc_addr: None,
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            raft_version: DEFAULT_RAFT_VERSION,
            build,
            bootstrap: false,
            expect: 0,
            non_voter: false,
        }
    }

    /// Set the server ID.
    pub fn with_id(mut self, id: impl Display) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Set the address other servers should use for RPC.
    pub fn with_rpc_addr(mut self, addr: IpAddr) -> Self {
        self.rpc_addr = Some(addr);
        self
    }

    /// Set the coordination protocol version.
    pub fn with_protocol_version(mut self, version: u32) -> Self {
        self.protocol_version = version;
        self
    }

    /// Set the raft protocol version.
    pub fn with_raft_version(mut self, version: u32) -> Self {
        self.raft_version = version;
        self
    }

    /// Marks the server as running in bootstrap mode.
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Set the number of servers expected before bootstrapping.
    pub fn with_expect(mut self, expect: u32) -> Self {
        self.expect = expect;
        self
    }

    /// Marks the server as a non-voting member of raft.
    pub fn with_non_voter(mut self, non_voter: bool) -> Self {
        self.non_voter = non_voter;
        self
    }

    /// Produces the gossip tag map.
    ///
    /// Optional tags are omitted while they hold their default value.
    pub fn into_tags(self) -> HashMap<String, String> {
        let mut tags = HashMap::from([
            (ROLE_KEY.to_string(), SERVER_ROLE.to_string()),
            (REGION_KEY.to_string(), self.region),
            (DATACENTER_KEY.to_string(), self.datacenter),
            (PORT_KEY.to_string(), self.port.to_string()),
            (
                PROTOCOL_VERSION_KEY.to_string(),
                self.protocol_version.to_string(),
            ),
            (RAFT_VERSION_KEY.to_string(), self.raft_version.to_string()),
            (BUILD_KEY.to_string(), self.build.to_string()),
        ]);

        if let Some(id) = self.id {
            tags.insert(ID_KEY.to_string(), id);
        }
        if let Some(addr) = self.rpc_addr {
            tags.insert(RPC_ADDR_KEY.to_string(), addr.to_string());
        }
        if self.bootstrap {
            tags.insert(BOOTSTRAP_KEY.to_string(), FLAG_SET.to_string());
        }
        if self.expect > 0 {
            tags.insert(EXPECT_KEY.to_string(), self.expect.to_string());
        }
        if self.non_voter {
            tags.insert(NON_VOTER_KEY.to_string(), FLAG_SET.to_string());
        }

        tags
    }
}

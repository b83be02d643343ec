use std::collections::HashMap;
use std::fmt::{self, Display};
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::UnknownStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// The liveness of a member as seen by the gossip layer.
pub enum MemberStatus {
    None,
    Alive,
    Leaving,
    Left,
    Failed,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Alive => "alive",
            Self::Leaving => "leaving",
            Self::Left => "left",
            Self::Failed => "failed",
        }
    }
}

impl Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "alive" => Ok(Self::Alive),
            "leaving" => Ok(Self::Leaving),
            "left" => Ok(Self::Left),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single entry of the gossip membership pool.
pub struct Member {
    /// The unique name of the member within the pool.
    pub name: String,
    /// The address the member advertises to the pool.
    pub addr: IpAddr,
    /// The gossip port of the member.
    ///
    /// This is not the port servers accept RPC on, that is carried in the tags.
    pub port: u16,
    /// The liveness of the member.
    pub status: MemberStatus,
    /// The metadata the member announced about itself.
    pub tags: HashMap<String, String>,
}

impl Member {
    /// Creates a new member without any tags.
    pub fn new(name: impl Into<String>, addr: IpAddr, status: MemberStatus) -> Self {
        Self {
            name: name.into(),
            addr,
            port: 0,
            status,
            tags: HashMap::new(),
        }
    }

    /// Set the gossip port of the member.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Adds a single tag to the member.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Replaces the member's tags.
    pub fn with_tags(mut self, tags: HashMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    #[inline]
    /// Gets the value of a tag if it is set.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

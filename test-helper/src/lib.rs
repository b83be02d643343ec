use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicU32, Ordering};

use beacon_node::{Member, MemberStatus, ServerTags};
use semver::Version;

pub static TEST_REGION: &str = "global";
pub static TEST_DATACENTER: &str = "dc1";
pub const TEST_RPC_PORT: u16 = 4647;

/// Gets a new loopback style address which is unique within the test binary.
///
/// Addresses are handed out from `127.1.0.1` upwards across the lower three
/// octets.
pub fn get_unused_ip() -> IpAddr {
    static NEXT_HOST: AtomicU32 = AtomicU32::new(1);
    let host = NEXT_HOST.fetch_add(1, Ordering::Relaxed);
    let base = u32::from(Ipv4Addr::new(127, 1, 0, 0));
    IpAddr::V4(Ipv4Addr::from(base + host))
}

/// Creates a well formed server member running the given build.
pub fn server_member(name: &str, build: &str, status: MemberStatus) -> Member {
    let build = Version::parse(build).expect("Test builds should be valid versions");
    server_member_with_tags(
        name,
        status,
        ServerTags::new(TEST_REGION, TEST_DATACENTER, TEST_RPC_PORT, build),
    )
}

/// Creates a server member announcing the given tags.
pub fn server_member_with_tags(name: &str, status: MemberStatus, tags: ServerTags) -> Member {
    Member::new(name, get_unused_ip(), status)
        .with_port(4648)
        .with_tags(tags.into_tags())
}

/// Creates a member which does not announce the server role.
pub fn client_member(name: &str) -> Member {
    Member::new(name, get_unused_ip(), MemberStatus::Alive)
        .with_port(4648)
        .with_tag("region", TEST_REGION)
        .with_tag("dc", TEST_DATACENTER)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_get_unused_ip() {
        assert_ne!(get_unused_ip(), get_unused_ip());

        let ips = (0..1_000).map(|_| get_unused_ip()).collect::<HashSet<_>>();
        assert_eq!(ips.len(), 1_000, "Addresses must not repeat past 255 calls.");
    }
}

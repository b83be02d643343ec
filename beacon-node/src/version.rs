use std::fmt::Display;

use semver::{Prerelease, Version};
use tracing::debug;

use crate::member::{Member, MemberStatus};
use crate::server::{is_server, ServerDescriptor};

/// Returns if every server in the pool runs at least `min_version`.
///
/// Members which are not servers are ignored, as are failed servers unless
/// `include_failed` is set. Servers which have left or are leaving never
/// count towards the check.
pub fn servers_meet_minimum_version<'a, I>(
    members: I,
    min_version: &Version,
    include_failed: bool,
) -> bool
where
    I: IntoIterator<Item = &'a Member>,
{
    VersionGate::new(min_version.clone())
        .include_failed(include_failed)
        .check(members)
}

/// Returns if `build` is at least `min_version` by semver precedence.
///
/// Build metadata is ignored while a pre-release sorts before its release.
pub fn meets_version(build: &Version, min_version: &Version) -> bool {
    precedence(build) >= precedence(min_version)
}

fn precedence(version: &Version) -> (u64, u64, u64, &Prerelease) {
    (version.major, version.minor, version.patch, &version.pre)
}

#[derive(Debug, Clone)]
/// A configurable minimum version check over the gossip pool.
///
/// ```rust
/// use beacon_node::{Member, VersionGate};
/// use semver::Version;
///
/// let gate = VersionGate::new(Version::new(1, 4, 0))
///     .include_failed(true)
///     .in_region("global");
///
/// let members: Vec<Member> = Vec::new();
/// assert!(gate.check(&members));
/// ```
pub struct VersionGate {
    min_version: Version,
    include_failed: bool,
    region: Option<String>,
}

impl VersionGate {
    /// Creates a new gate requiring `min_version`.
    ///
    /// Only alive servers are considered by default.
    pub fn new(min_version: Version) -> Self {
        Self {
            min_version,
            include_failed: false,
            region: None,
        }
    }

    /// Sets if failed servers must also meet the minimum version.
    pub fn include_failed(mut self, include_failed: bool) -> Self {
        self.include_failed = include_failed;
        self
    }

    /// Only consider servers within the given region.
    pub fn in_region(mut self, region: impl Display) -> Self {
        self.region = Some(region.to_string());
        self
    }

    #[inline]
    pub fn min_version(&self) -> &Version {
        &self.min_version
    }

    /// Returns if every qualifying server meets the minimum version.
    ///
    /// This is vacuously true if no server qualifies.
    pub fn check<'a, I>(&self, members: I) -> bool
    where
        I: IntoIterator<Item = &'a Member>,
    {
        for server in members.into_iter().filter_map(|m| self.qualify(m)) {
            if !meets_version(&server.build, &self.min_version) {
                debug!(
                    server = %server,
                    build = %server.build,
                    min_version = %self.min_version,
                    "Server does not meet the minimum version."
                );
                return false;
            }
        }

        true
    }

    /// Returns every qualifying server below the minimum version.
    pub fn laggards<'a, I>(&self, members: I) -> Vec<ServerDescriptor>
    where
        I: IntoIterator<Item = &'a Member>,
    {
        members
            .into_iter()
            .filter_map(|m| self.qualify(m))
            .filter(|server| !meets_version(&server.build, &self.min_version))
            .collect()
    }

    fn qualify(&self, member: &Member) -> Option<ServerDescriptor> {
        let server = is_server(member)?;

        if let Some(region) = self.region.as_ref() {
            if &server.region != region {
                return None;
            }
        }

        match server.status {
            MemberStatus::Alive => Some(server),
            MemberStatus::Failed if self.include_failed => Some(server),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::IpAddr;

    use super::*;

    fn make_member(name: &str, build: &str, status: MemberStatus) -> Member {
        let addr: IpAddr = [127, 0, 0, 1].into();
        Member::new(name, addr, status)
            .with_tag("role", "nomad")
            .with_tag("region", "aws")
            .with_tag("dc", "east-aws")
            .with_tag("port", "10000")
            .with_tag("build", build)
            .with_tag("vsn", "1")
    }

    fn v(raw: &str) -> Version {
        Version::parse(raw).unwrap()
    }

    #[test]
    fn test_meets_version_precedence() {
        assert!(meets_version(&v("0.7.5"), &v("0.7.5")));
        assert!(meets_version(&v("0.8.5-dev"), &v("0.7.5")));
        assert!(meets_version(&v("0.7.5+ent"), &v("0.7.5")));
        assert!(meets_version(&v("0.7.5"), &v("0.7.5+ent")));
        assert!(!meets_version(&v("0.7.5"), &v("0.8.0")));
        assert!(!meets_version(&v("0.7.5-dev"), &v("0.7.5")));
        assert!(meets_version(&v("0.7.5-rc2"), &v("0.7.5-rc1")));
    }

    #[test]
    fn test_single_alive_server() {
        let cases = [
            ("0.7.5", "0.7.5", true),
            ("0.8.5-dev", "0.7.5", true),
            ("0.7.0+ent", "0.7.0", true),
            ("0.7.5", "0.8.0", false),
        ];

        for (build, min, expected) in cases {
            let members = [make_member("foo", build, MemberStatus::Alive)];
            assert_eq!(
                servers_meet_minimum_version(&members, &v(min), false),
                expected,
                "build {build} against floor {min}",
            );
        }
    }

    #[test]
    fn test_failed_servers() {
        let members = [
            make_member("a", "0.7.5", MemberStatus::Alive),
            make_member("b", "0.8.0", MemberStatus::Alive),
            make_member("c", "0.7.0", MemberStatus::Failed),
        ];

        assert!(servers_meet_minimum_version(&members, &v("0.7.5"), false));
        assert!(!servers_meet_minimum_version(&members, &v("0.7.5"), true));
    }

    #[test]
    fn test_ignored_members() {
        let client = Member::new("client", [10, 0, 0, 9].into(), MemberStatus::Alive)
            .with_tag("build", "0.1.0");
        let malformed = make_member("broken", "garbage", MemberStatus::Alive);
        let left = make_member("left", "0.1.0", MemberStatus::Left);
        let leaving = make_member("leaving", "0.1.0", MemberStatus::Leaving);
        let members = [client, malformed, left, leaving];

        assert!(servers_meet_minimum_version(&members, &v("1.0.0"), true));
        assert!(servers_meet_minimum_version(
            std::iter::empty::<&Member>(),
            &v("1.0.0"),
            true
        ));
    }

    #[test]
    fn test_region_scope_and_laggards() {
        let members = [
            make_member("a", "1.5.0", MemberStatus::Alive),
            make_member("b", "1.2.0", MemberStatus::Alive).with_tag("region", "eu"),
            make_member("c", "1.1.0", MemberStatus::Failed),
        ];

        let gate = VersionGate::new(v("1.4.0"));
        assert!(!gate.check(&members));
        assert!(gate.clone().in_region("aws").check(&members));
        assert!(!gate.clone().in_region("aws").include_failed(true).check(&members));

        let laggards = gate.include_failed(true).laggards(&members);
        let names: Vec<&str> = laggards.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }
}

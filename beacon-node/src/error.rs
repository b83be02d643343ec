use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
/// The reason a gossip member was not accepted as a control-plane server.
///
/// Rejection is an ordinary outcome, clients share the gossip pool with
/// the servers and are rejected with [MemberRejection::NotAServer].
pub enum MemberRejection {
    #[error("Member does not carry the server role marker.")]
    NotAServer,

    #[error("Member is missing the required tag `{key}`.")]
    MissingTag { key: &'static str },

    #[error("Member tag `{key}` has invalid value {value:?}: {reason}")]
    InvalidTag {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown member status {0:?}")]
/// A member status name which is not part of the gossip status set.
pub struct UnknownStatus(pub String);

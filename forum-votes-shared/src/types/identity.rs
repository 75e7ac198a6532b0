use serde::{Deserialize, Serialize};
use crate::types::UserId;

/// A verified user identity as supplied by the identity provider.
///
/// The voting engine trusts this value unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
}

impl From<UserId> for UserIdentity {
    fn from(id: UserId) -> Self {
        Self { id }
    }
}

//! The capability every resource kind implements, and the outcome of a write.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A server-side entity addressed by `(owner, name)`.
///
/// `KIND` is the singular noun used in action names (`add-group`,
/// `get-groups`). Owner defaulting is per kind: most kinds take the client's
/// organization, applications take the built-in `admin` owner.
pub trait Resource: Serialize + DeserializeOwned {
    const KIND: &'static str;

    fn owner(&self) -> &str;

    fn name(&self) -> &str;

    fn set_owner(&mut self, owner: String);

    /// Owner written into a resource whose owner is empty at dispatch time.
    fn default_owner(organization: &str) -> String {
        organization.to_string()
    }

    /// Owner used to address resources of this kind in reads.
    fn query_owner(organization: &str) -> String {
        Self::default_owner(organization)
    }

    /// `"<owner>/<name>"`.
    fn id(&self) -> String {
        format!("{}/{}", self.owner(), self.name())
    }

    /// `"<verb>-<kind>"`, e.g. `action("delete")` on a group is
    /// `"delete-group"`.
    fn action(verb: &str) -> String {
        format!("{verb}-{}", Self::KIND)
    }

    /// `"get-<kind>s"`.
    fn list_action() -> String {
        format!("get-{}s", Self::KIND)
    }

    /// `"get-global-<kind>s"`, the listing across every owner.
    fn global_list_action() -> String {
        format!("get-global-{}s", Self::KIND)
    }
}

/// Result of a write that reached the server and was accepted.
///
/// `NotAffected` is not a failure: the server ran the write but nothing
/// matched or changed (for example deleting an already-deleted resource).
/// Rejections come back as `Err(SdkError::Remote)` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Affected,
    NotAffected,
}

impl WriteOutcome {
    pub fn is_affected(self) -> bool {
        self == WriteOutcome::Affected
    }
}

impl From<bool> for WriteOutcome {
    fn from(affected: bool) -> Self {
        if affected {
            WriteOutcome::Affected
        } else {
            WriteOutcome::NotAffected
        }
    }
}

//! The shared write path behind every add, update and delete.
//!
//! # Design
//! One generic routine serves all resource kinds. Per-kind differences (the
//! action noun and the owner default) come from the `Resource` impl, so a
//! new kind needs no dispatch code of its own.

use tracing::debug;

use crate::body::BodyMode;
use crate::client::Client;
use crate::error::SdkError;
use crate::resource::{Resource, WriteOutcome};

impl Client {
    /// Run `action` against `resource`, addressed by its `(owner, name)`.
    ///
    /// `columns` restricts an update to the listed fields; empty means all.
    /// An empty owner is filled in on `resource` itself before it is sent.
    pub fn modify<R: Resource>(
        &self,
        action: &str,
        resource: &mut R,
        columns: &[&str],
    ) -> Result<WriteOutcome, SdkError> {
        let id = resource.id();
        self.modify_by_id(action, &id, resource, columns)
    }

    /// Like `modify` but addressed by an explicit identifier, for resources
    /// whose server-side id differs from `owner/name`.
    pub fn modify_by_id<R: Resource>(
        &self,
        action: &str,
        id: &str,
        resource: &mut R,
        columns: &[&str],
    ) -> Result<WriteOutcome, SdkError> {
        let mut query = vec![("id", id.to_string())];
        if !columns.is_empty() {
            query.push(("columns", columns.join(",")));
        }

        if resource.owner().is_empty() {
            resource.set_owner(R::default_owner(self.organization_name()));
        }
        let payload =
            serde_json::to_vec(resource).map_err(|e| SdkError::Encoding(e.to_string()))?;

        let response = self.do_post(action, &query, &payload, BodyMode::Raw)?;
        let outcome = WriteOutcome::from(response.is_affected());
        debug!(action, id, ?outcome, "write dispatched");
        Ok(outcome)
    }

    pub fn add<R: Resource>(&self, resource: &mut R) -> Result<WriteOutcome, SdkError> {
        self.modify(&R::action("add"), resource, &[])
    }

    pub fn update<R: Resource>(&self, resource: &mut R) -> Result<WriteOutcome, SdkError> {
        self.modify(&R::action("update"), resource, &[])
    }

    /// Update only `columns` of `resource`.
    pub fn update_columns<R: Resource>(
        &self,
        resource: &mut R,
        columns: &[&str],
    ) -> Result<WriteOutcome, SdkError> {
        self.modify(&R::action("update"), resource, columns)
    }

    /// Update the resource stored under `id`, which may differ from the
    /// resource's current `owner/name` (for example when renaming).
    pub fn update_by_id<R: Resource>(
        &self,
        id: &str,
        resource: &mut R,
    ) -> Result<WriteOutcome, SdkError> {
        self.modify_by_id(&R::action("update"), id, resource, &[])
    }

    pub fn delete<R: Resource>(&self, resource: &mut R) -> Result<WriteOutcome, SdkError> {
        self.modify(&R::action("delete"), resource, &[])
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::http::HttpMethod;
    use crate::testing::{client, RecordingSender, AFFECTED_BODY, UNAFFECTED_BODY};
    use crate::types::{Application, Group, User};

    fn group(owner: &str, name: &str) -> Group {
        Group {
            owner: owner.to_string(),
            name: name.to_string(),
            display_name: "Group-Test1".to_string(),
            ..Default::default()
        }
    }

    fn body_json(sender: &RecordingSender) -> Value {
        serde_json::from_slice(sender.last().body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn add_group_reports_affected() {
        let sender = RecordingSender::replying(&[AFFECTED_BODY]);
        let mut g = group("casbin-forum", "g1");
        let outcome = client(&sender).modify("add-group", &mut g, &[]).unwrap();
        assert_eq!(outcome, WriteOutcome::Affected);

        let req = sender.last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:8000/api/add-group?id=casbin-forum%2Fg1");
        assert_eq!(req.header("content-type"), Some("text/plain;charset=UTF-8"));
        assert!(req.header("authorization").is_some());
    }

    #[test]
    fn body_is_the_whole_resource_as_json() {
        let sender = RecordingSender::replying(&[AFFECTED_BODY]);
        let mut g = group("casbin-forum", "test-group1");
        client(&sender).add(&mut g).unwrap();
        let body = body_json(&sender);
        assert_eq!(body["owner"], "casbin-forum");
        assert_eq!(body["name"], "test-group1");
        assert_eq!(body["displayName"], "Group-Test1");
    }

    #[test]
    fn columns_are_comma_joined() {
        let sender = RecordingSender::replying(&[AFFECTED_BODY]);
        let mut g = group("casbin-forum", "g1");
        client(&sender)
            .update_columns(&mut g, &["displayName", "users"])
            .unwrap();
        assert_eq!(
            sender.last().url,
            "http://localhost:8000/api/update-group?id=casbin-forum%2Fg1&columns=displayName%2Cusers"
        );
    }

    #[test]
    fn empty_owner_defaults_to_organization() {
        let sender = RecordingSender::replying(&[AFFECTED_BODY]);
        let mut g = group("", "g1");
        client(&sender).add(&mut g).unwrap();
        assert_eq!(g.owner, "casbin-forum");
        assert_eq!(body_json(&sender)["owner"], "casbin-forum");
    }

    #[test]
    fn identifier_is_taken_before_owner_defaulting() {
        let sender = RecordingSender::replying(&[AFFECTED_BODY]);
        let mut g = group("", "g1");
        client(&sender).add(&mut g).unwrap();
        assert_eq!(sender.last().url, "http://localhost:8000/api/add-group?id=%2Fg1");
    }

    #[test]
    fn empty_application_owner_defaults_to_admin() {
        let sender = RecordingSender::replying(&[AFFECTED_BODY]);
        let mut app = Application {
            name: "test-app1".to_string(),
            organization: "casbin-forum".to_string(),
            ..Default::default()
        };
        client(&sender).add(&mut app).unwrap();
        assert_eq!(app.owner, "admin");
        assert_eq!(body_json(&sender)["owner"], "admin");
    }

    #[test]
    fn explicit_owner_is_kept() {
        let sender = RecordingSender::replying(&[AFFECTED_BODY]);
        let mut g = group("built-in", "g1");
        client(&sender).add(&mut g).unwrap();
        assert_eq!(g.owner, "built-in");
    }

    #[test]
    fn non_sentinel_data_is_not_affected() {
        for body in [
            UNAFFECTED_BODY,
            r#"{"status":"ok","msg":"","data":1,"data2":null}"#,
            r#"{"status":"ok","msg":"","data":null,"data2":null}"#,
        ] {
            let sender = RecordingSender::replying(&[body]);
            let mut g = group("casbin-forum", "g1");
            let outcome = client(&sender).delete(&mut g).unwrap();
            assert_eq!(outcome, WriteOutcome::NotAffected, "{body}");
        }
    }

    #[test]
    fn deleting_twice_is_affected_then_not_affected() {
        let sender = RecordingSender::replying(&[AFFECTED_BODY, UNAFFECTED_BODY]);
        let c = client(&sender);
        let mut g = group("casbin-forum", "g1");
        assert_eq!(c.delete(&mut g).unwrap(), WriteOutcome::Affected);
        assert_eq!(c.delete(&mut g).unwrap(), WriteOutcome::NotAffected);
        assert_eq!(sender.requests().len(), 2);
    }

    #[test]
    fn rejection_is_remote_error_not_outcome() {
        let sender =
            RecordingSender::replying(&[r#"{"status":"error","msg":"group already exists"}"#]);
        let mut g = group("casbin-forum", "g1");
        let err = client(&sender).add(&mut g).unwrap_err();
        assert_eq!(err.remote_message(), Some("group already exists"));
    }

    #[test]
    fn garbage_response_is_decode_error() {
        let sender = RecordingSender::replying(&["502 Bad Gateway"]);
        let mut g = group("casbin-forum", "g1");
        let err = client(&sender).add(&mut g).unwrap_err();
        assert!(matches!(err, SdkError::Decode(_)));
    }

    #[test]
    fn update_by_id_addresses_the_old_identifier() {
        let sender = RecordingSender::replying(&[AFFECTED_BODY]);
        let mut user = User {
            owner: "casbin-forum".to_string(),
            name: "alice-renamed".to_string(),
            ..Default::default()
        };
        client(&sender)
            .update_by_id("casbin-forum/alice", &mut user)
            .unwrap();
        assert_eq!(
            sender.last().url,
            "http://localhost:8000/api/update-user?id=casbin-forum%2Falice"
        );
        assert_eq!(body_json(&sender)["name"], "alice-renamed");
    }
}

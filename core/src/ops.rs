//! Typed reads and the endpoints that need form or multipart bodies.

use std::collections::BTreeMap;

use crate::body::BodyMode;
use crate::client::Client;
use crate::error::SdkError;
use crate::resource::Resource;

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub items: Vec<R>,
    /// Total number of matching resources across all pages.
    pub total: u64,
}

impl Client {
    /// Fetch one resource by name. `Ok(None)` when the server has no such
    /// resource.
    pub fn get<R: Resource>(&self, name: &str) -> Result<Option<R>, SdkError> {
        let id = format!("{}/{name}", R::query_owner(self.organization_name()));
        let url = self.get_url(&R::action("get"), &[("id", id)]);
        let response = self.do_get_response(&url)?;
        if response.data.is_null() {
            return Ok(None);
        }
        response.data_as().map(Some)
    }

    /// Fetch every resource of this kind owned by the client's organization.
    pub fn list<R: Resource>(&self) -> Result<Vec<R>, SdkError> {
        let owner = R::query_owner(self.organization_name());
        let url = self.get_url(&R::list_action(), &[("owner", owner)]);
        let response = self.do_get_response(&url)?;
        if response.data.is_null() {
            return Ok(Vec::new());
        }
        response.data_as()
    }

    /// Fetch every resource of this kind regardless of owner.
    pub fn list_global<R: Resource>(&self) -> Result<Vec<R>, SdkError> {
        let url = self.get_url(&R::global_list_action(), &[]);
        let response = self.do_get_response(&url)?;
        if response.data.is_null() {
            return Ok(Vec::new());
        }
        response.data_as()
    }

    /// Fetch one page. `page` is 1-based; `query` adds server-side filters
    /// such as `field`/`value` or `sortField`/`sortOrder`.
    pub fn list_paginated<R: Resource>(
        &self,
        page: u32,
        page_size: u32,
        query: &[(&str, String)],
    ) -> Result<Page<R>, SdkError> {
        let mut params = vec![
            ("owner", R::query_owner(self.organization_name())),
            ("p", page.to_string()),
            ("pageSize", page_size.to_string()),
        ];
        params.extend(query.iter().cloned());

        let url = self.get_url(&R::list_action(), &params);
        let response = self.do_get_response(&url)?;
        let items: Vec<R> = if response.data.is_null() {
            Vec::new()
        } else {
            response.data_as()?
        };
        let total = match response.data2.as_u64() {
            Some(total) => total,
            None => items.len() as u64,
        };
        Ok(Page { items, total })
    }

    /// Change a user's password. The endpoint only accepts form bodies.
    pub fn set_password(
        &self,
        user_owner: &str,
        user_name: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), SdkError> {
        let fields = BTreeMap::from([
            ("userOwner", user_owner),
            ("userName", user_name),
            ("oldPassword", old_password),
            ("newPassword", new_password),
        ]);
        let payload =
            serde_json::to_vec(&fields).map_err(|e| SdkError::Encoding(e.to_string()))?;
        self.do_post("set-password", &[], &payload, BodyMode::Form)?;
        Ok(())
    }

    /// Upload `file` and return `(file_url, file_name)` as stored by the
    /// server.
    pub fn upload_resource(
        &self,
        user: &str,
        tag: &str,
        parent: &str,
        full_file_path: &str,
        file: &[u8],
    ) -> Result<(String, String), SdkError> {
        let query = [
            ("owner", self.organization_name().to_string()),
            ("user", user.to_string()),
            ("application", self.application_name().to_string()),
            ("tag", tag.to_string()),
            ("parent", parent.to_string()),
            ("fullFilePath", full_file_path.to_string()),
        ];
        let response = self.do_post("upload-resource", &query, file, BodyMode::MultipartFile)?;
        Ok((response.data_as()?, response.data2_as()?))
    }
}

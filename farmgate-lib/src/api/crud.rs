//! Create, Read, Update, Delete operations
//!
//! Every dashboard resource (`orders`, `farmers`, `admin/invitations`, ...)
//! follows the same REST shape:
//!
//! | Operation | Request                          | Response                      |
//! |-----------|----------------------------------|-------------------------------|
//! | list      | `GET /{resource}?page&limit&...` | `{ data: [...], total }`      |
//! | retrieve  | `GET /{resource}/{id}`           | object or `{ data: object }`  |
//! | create    | `POST /{resource}`               | created object (optional)     |
//! | update    | `PATCH /{resource}/{id}`         | updated object (optional)     |
//! | delete    | `DELETE /{resource}/{id}`        | empty                         |
//!
//! # Example
//!
//! ```ignore
//! let page = client.list("orders", &PageRequest::new(1, 10).filter("status", "pending")).await?;
//! let order = client.retrieve("orders", "o-17").await?;
//! client.update("orders", "o-17", Record::new("orders").set("status", "confirmed")).await?;
//! ```

use reqwest::Method;
use serde::Deserialize;

use crate::MarketplaceClient;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::Record;
use crate::validation::Validator;

use super::query::Page;
use super::query::PageRequest;

// =============================================================================
// Response envelopes
// =============================================================================

/// Body of a list response.
///
/// Accepts `{ "data": [...], "total": N }`, the nested
/// `{ "data": [...], "pagination": { "total": N } }` and a bare array. When
/// no total is given the length of `data` is used.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListResponse {
    /// Enveloped list.
    Envelope {
        /// Rows of the requested page.
        data: Vec<Record>,
        /// Total rows across all pages.
        #[serde(default)]
        total: Option<usize>,
        /// Pagination block used by some endpoints.
        #[serde(default)]
        pagination: Option<Pagination>,
    },
    /// Unpaginated list.
    Bare(Vec<Record>),
}

/// Nested pagination block.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    /// Total rows across all pages.
    #[serde(default)]
    pub total: Option<usize>,
}

impl ListResponse {
    /// Converts into a [`Page`] for `request`, tagging rows with `resource`.
    pub fn into_page(self, resource: &str, request: &PageRequest) -> Page<Record> {
        let (mut data, total) = match self {
            ListResponse::Envelope {
                data,
                total,
                pagination,
            } => {
                let total = total.or_else(|| pagination.and_then(|p| p.total));
                (data, total)
            }
            ListResponse::Bare(data) => (data, None),
        };

        for record in &mut data {
            record.set_resource(resource);
        }

        let total = total.unwrap_or(data.len());
        Page::new(data, total).for_request(request)
    }

    /// All rows, tagged with `resource`. Used for exported dumps.
    pub fn into_records(self, resource: &str) -> Vec<Record> {
        let mut data = match self {
            ListResponse::Envelope { data, .. } | ListResponse::Bare(data) => data,
        };
        for record in &mut data {
            record.set_resource(resource);
        }
        data
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SingleResponse {
    Wrapped { data: Record },
    Plain(Record),
}

impl SingleResponse {
    fn into_record(self) -> Record {
        match self {
            SingleResponse::Wrapped { data } => data,
            SingleResponse::Plain(record) => record,
        }
    }
}

// =============================================================================
// Client operations
// =============================================================================

impl MarketplaceClient {
    /// Fetches one page of `resource`.
    pub async fn list(&self, resource: &str, request: &PageRequest) -> Result<Page<Record>, Error> {
        let mut url = self.endpoint(&[resource])?;
        url.query_pairs_mut().extend_pairs(request.query_pairs());

        let response = self.request(Method::GET, url, None).await?;
        let body = read_body(response).await?;

        let list: ListResponse = serde_json::from_str(&body).map_err(|e| {
            ApiError::parse_with_body(format!("Failed to parse {} list: {}", resource, e), body.clone())
        })?;

        let page = list.into_page(resource, request);
        log::debug!(
            "[crud] {} page {}/{} ({} rows, total {})",
            resource,
            page.page(),
            page.total_pages(),
            page.len(),
            page.total()
        );
        Ok(page)
    }

    /// Fetches a single record by identity.
    pub async fn retrieve(&self, resource: &str, id: &str) -> Result<Record, Error> {
        let url = self.endpoint(&[resource, id])?;
        let response = self.request(Method::GET, url, None).await?;
        let body = read_body(response).await?;

        let mut record = parse_record(&body, resource)?
            .ok_or_else(|| ApiError::parse(format!("Empty body for {}/{}", resource, id)))?;
        if record.id().is_none() {
            record.set_id(id);
        }
        Ok(record)
    }

    /// Creates a record. Returns the created record when the backend echoes
    /// it, otherwise the submitted one.
    pub async fn create(&self, resource: &str, record: Record) -> Result<Record, Error> {
        let url = self.endpoint(&[resource])?;
        let payload = serde_json::to_value(&record)?;
        let response = self.request(Method::POST, url, Some(&payload)).await?;
        let body = read_body(response).await?;

        let created = parse_record(&body, resource)?.unwrap_or(record);
        log::info!("[crud] created {} {}", resource, created.id().unwrap_or("?"));
        Ok(created)
    }

    /// Applies a partial update. Only the fields present on `changes` are
    /// sent.
    pub async fn update(&self, resource: &str, id: &str, changes: Record) -> Result<Record, Error> {
        let url = self.endpoint(&[resource, id])?;
        let payload = serde_json::to_value(&changes)?;
        let response = self.request(Method::PATCH, url, Some(&payload)).await?;
        let body = read_body(response).await?;

        let mut updated = parse_record(&body, resource)?.unwrap_or(changes);
        if updated.id().is_none() {
            updated.set_id(id);
        }
        log::info!("[crud] updated {} {}", resource, id);
        Ok(updated)
    }

    /// Deletes a record.
    pub async fn delete(&self, resource: &str, id: &str) -> Result<(), Error> {
        let url = self.endpoint(&[resource, id])?;
        self.request(Method::DELETE, url, None).await?;
        log::info!("[crud] deleted {} {}", resource, id);
        Ok(())
    }

    /// Validates `record`, then creates it.
    ///
    /// Nothing is sent when validation fails. Runs under the action key
    /// `create:{resource}`, so a second submit while the first is pending
    /// returns [`Error::Busy`].
    pub async fn submit(
        &self,
        resource: &str,
        record: Record,
        validator: &Validator,
    ) -> Result<Record, Error> {
        validator.validate(&record)?;
        self.actions()
            .run(format!("create:{}", resource), self.create(resource, record))
            .await
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, Error> {
    response
        .text()
        .await
        .map_err(|e| Error::Api(ApiError::Network(e)))
}

/// Parses a single record; `Ok(None)` for an empty body.
fn parse_record(body: &str, resource: &str) -> Result<Option<Record>, Error> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let single: SingleResponse = serde_json::from_str(body).map_err(|e| {
        ApiError::parse_with_body(format!("Failed to parse {} record: {}", resource, e), body)
    })?;
    let mut record = single.into_record();
    record.set_resource(resource);
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_list(json: &str, request: &PageRequest) -> Page<Record> {
        serde_json::from_str::<ListResponse>(json)
            .unwrap()
            .into_page("orders", request)
    }

    #[test]
    fn test_list_envelope_with_total() {
        let page = parse_list(
            r#"{"data":[{"id":"o-1","status":"pending"}],"total":42}"#,
            &PageRequest::new(2, 10),
        );
        assert_eq!(page.total(), 42);
        assert_eq!(page.total_pages(), 5);
        assert_eq!(page.page(), 2);
        assert_eq!(page.data()[0].resource(), "orders");
        assert_eq!(page.data()[0].id(), Some("o-1"));
    }

    #[test]
    fn test_into_records_bare_array() {
        let response: ListResponse = serde_json::from_str(r#"[{"id":1},{"id":2}]"#).unwrap();
        let records = response.into_records("farmers");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id(), Some("2"));
        assert_eq!(records[1].resource(), "farmers");
    }

    #[test]
    fn test_list_nested_pagination_total() {
        let page = parse_list(
            r#"{"data":[{"_id":"a"},{"_id":"b"}],"pagination":{"total":7}}"#,
            &PageRequest::new(1, 2),
        );
        assert_eq!(page.total(), 7);
        assert_eq!(page.data()[1].id(), Some("b"));
    }

    #[test]
    fn test_list_missing_total_uses_len() {
        let page = parse_list(r#"{"data":[{"id":1},{"id":2},{"id":3}]}"#, &PageRequest::new(1, 10));
        assert_eq!(page.total(), 3);

        let bare = parse_list(r#"[{"id":1}]"#, &PageRequest::new(1, 10));
        assert_eq!(bare.total(), 1);
    }

    #[test]
    fn test_parse_record_wrapped_and_plain() {
        let wrapped = parse_record(r#"{"data":{"id":"f-1","name":"Green Acres"}}"#, "farmers")
            .unwrap()
            .unwrap();
        assert_eq!(wrapped.id(), Some("f-1"));
        assert_eq!(wrapped.get_string("name").unwrap(), Some("Green Acres"));

        let plain = parse_record(r#"{"_id":"f-2","name":"Sunny Hill"}"#, "farmers")
            .unwrap()
            .unwrap();
        assert_eq!(plain.id(), Some("f-2"));
        assert_eq!(plain.resource(), "farmers");
    }

    #[test]
    fn test_parse_record_empty_body() {
        assert!(parse_record("  ", "farmers").unwrap().is_none());
    }

    #[test]
    fn test_parse_record_garbage_keeps_body() {
        let err = parse_record("<html>", "farmers").unwrap_err();
        assert!(matches!(
            err,
            Error::Api(ApiError::Parse { body: Some(ref b), .. }) if b == "<html>"
        ));
    }
}

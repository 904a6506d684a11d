//! Page sources for server-side tables.

use std::future::Future;

use async_trait::async_trait;

use crate::MarketplaceClient;
use crate::error::Error;
use crate::model::Record;

use super::query::Page;
use super::query::PageRequest;

/// Something that can answer a [`PageRequest`].
///
/// # Example
///
/// ```ignore
/// let source = client.resource("orders");
/// let page = source.fetch_page(PageRequest::new(1, 10)).await?;
/// println!("{} of {}", page.len(), page.total());
/// ```
#[async_trait]
pub trait PageSource<R>: Send + Sync {
    /// Fetches one page of rows and the total count.
    async fn fetch_page(&self, request: PageRequest) -> Result<Page<R>, Error>;
}

/// A backend resource (`/orders`, `/farmers`, ...) as a page source.
#[derive(Clone)]
pub struct ResourceSource {
    client: MarketplaceClient,
    resource: String,
}

impl ResourceSource {
    pub(crate) fn new(client: MarketplaceClient, resource: impl Into<String>) -> Self {
        Self {
            client,
            resource: resource.into(),
        }
    }

    /// Returns the resource path.
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

#[async_trait]
impl PageSource<Record> for ResourceSource {
    async fn fetch_page(&self, request: PageRequest) -> Result<Page<Record>, Error> {
        self.client.list(&self.resource, &request).await
    }
}

/// Adapts an async closure into a [`PageSource`].
///
/// # Example
///
/// ```
/// use farmgate_lib::api::{FnPageSource, PageSource};
/// use farmgate_lib::api::query::{Page, PageRequest};
/// use farmgate_lib::error::Error;
///
/// let source = FnPageSource::new(|request: PageRequest| async move {
///     let rows: Vec<u32> = (0..42).collect();
///     Ok::<_, Error>(Page::from_slice(&rows, &request))
/// });
/// # let _ = source;
/// ```
pub struct FnPageSource<F> {
    f: F,
}

impl<F> FnPageSource<F> {
    /// Wraps the closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<R, F, Fut> PageSource<R> for FnPageSource<F>
where
    R: Send + 'static,
    F: Fn(PageRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Page<R>, Error>> + Send,
{
    async fn fetch_page(&self, request: PageRequest) -> Result<Page<R>, Error> {
        (self.f)(request).await
    }
}

/// Serves pages out of an in-memory vector, ignoring search, filters and
/// sort. Used for fixtures and offline demos.
#[derive(Debug, Clone)]
pub struct VecPageSource<R> {
    rows: Vec<R>,
}

impl<R> VecPageSource<R> {
    /// Creates a source over `rows`.
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl<R: Clone + Send + Sync + 'static> PageSource<R> for VecPageSource<R> {
    async fn fetch_page(&self, request: PageRequest) -> Result<Page<R>, Error> {
        Ok(Page::from_slice(&self.rows, &request))
    }
}

// Copyright 2017 Dmitry Tantsur <divius.inside@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Generic paginated listing.

use std::marker::PhantomData;
use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};

use super::ServerSideFilters;
use crate::{Error, ErrorKind, Result};

/// Something that has an ID usable as a pagination marker.
pub trait ResourceId {
    /// Resource ID.
    fn resource_id(&self) -> String;
}

/// A source of resources of type `R`.
///
/// Implemented by [`Cloud`](../struct.Cloud.html) for every queryable
/// resource. Other implementations can serve resources from memory.
#[async_trait]
pub trait ResourceSource<R>: Send + Sync {
    /// Fetch one chunk of resources matching the filters.
    ///
    /// `limit` and `marker` are only provided for resources that support
    /// pagination.
    async fn fetch_chunk(
        &self,
        filters: &ServerSideFilters,
        limit: Option<usize>,
        marker: Option<String>,
    ) -> Result<Vec<R>>;
}

/// Paginated listing of resources with bounded retries.
#[derive(Debug)]
pub struct ResourceIterator<'src, R, S> {
    source: &'src S,
    filters: ServerSideFilters,
    page_size: Option<usize>,
    max_retries: usize,
    retry_delay: Duration,
    _resource: PhantomData<fn() -> R>,
}

fn is_transient(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::InternalServerError | ErrorKind::ProtocolError | ErrorKind::OperationTimedOut
    )
}

impl<'src, R, S> ResourceIterator<'src, R, S>
where
    R: ResourceId + Send + 'src,
    S: ResourceSource<R>,
{
    /// Create a listing that fetches everything in one request.
    pub fn new(source: &'src S, filters: ServerSideFilters) -> ResourceIterator<'src, R, S> {
        ResourceIterator {
            source,
            filters,
            page_size: None,
            max_retries: 0,
            retry_delay: Duration::ZERO,
            _resource: PhantomData,
        }
    }

    /// Paginate with the given page size (`None` disables pagination).
    pub fn with_page_size(mut self, page_size: Option<usize>) -> Self {
        self.page_size = page_size.map(|size| size.max(1));
        self
    }

    /// Retry failed page requests.
    pub fn with_retries(mut self, max_retries: usize, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    async fn fetch_page(&self, marker: Option<&str>) -> Result<Vec<R>> {
        let mut attempt = 0;
        loop {
            let result = self
                .source
                .fetch_chunk(&self.filters, self.page_size, marker.map(String::from))
                .await;
            let failure = match result {
                Ok(page) => match (marker, page.last()) {
                    (Some(current), Some(last)) if last.resource_id() == current => Error::new(
                        ErrorKind::OperationFailed,
                        format!("Pagination did not advance past marker {}", current),
                    ),
                    _ => return Ok(page),
                },
                Err(err) if is_transient(&err) => err,
                Err(err) => return Err(err),
            };

            if attempt >= self.max_retries {
                return Err(failure);
            }
            attempt += 1;
            warn!(
                "Retrying page request with {} ({}/{}): {}",
                self.filters, attempt, self.max_retries, failure
            );
            if !self.retry_delay.is_zero() {
                tokio::time::sleep(self.retry_delay).await;
            }
        }
    }

    /// Convert this listing into a stream of resources.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<R>> + 'src {
        try_stream! {
            let mut marker: Option<String> = None;
            loop {
                let page = self.fetch_page(marker.as_deref()).await?;
                trace!("Received a page of {} resources after marker {:?}", page.len(), marker);
                let exhausted = match self.page_size {
                    Some(size) => page.len() < size,
                    None => true,
                };
                let last = page.last().map(ResourceId::resource_id);

                for item in page {
                    yield item;
                }

                if exhausted {
                    break;
                }
                marker = last;
            }
        }
    }

    /// Fetch all resources.
    ///
    /// A convenience shortcut for `self.into_stream().try_collect().await`.
    #[inline]
    pub async fn all(self) -> Result<Vec<R>> {
        self.into_stream().try_collect().await
    }
}

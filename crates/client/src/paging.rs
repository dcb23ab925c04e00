//! Paged iteration over get and query results
//!
//! The API returns results one page at a time; [`QueryPager`] walks the
//! pages by issuing the same request at increasing offsets until the
//! reported total is reached. Each page's own `totalResultSetSize` is
//! trusted, so a result set that grows or shrinks mid-scan simply moves the
//! finish line rather than breaking the walk.
//!
//! A pager does not resume after an error: the failed offset was never
//! consumed, and silently continuing past it would hand the caller a result
//! set with a hole in it. Callers that want to continue build a fresh pager.

use std::marker::PhantomData;

use futures::stream::Stream;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::awql;
use crate::error::ClientResult;
use crate::selector::{Page, Selector};
use crate::service::ServiceProxy;

enum PageSource {
    /// A selector whose paging block is rewritten for every page
    Selector(Selector),
    /// A query statement that gets `LIMIT`/`OFFSET` appended per page
    Query(String),
}

/// Walks a result set page by page through a service proxy
pub struct QueryPager<'a, T> {
    proxy: &'a ServiceProxy,
    source: PageSource,
    page_size: u32,
    offset: u32,
    finished: bool,
    _entity: PhantomData<fn() -> T>,
}

impl<'a, T: DeserializeOwned> QueryPager<'a, T> {
    /// Page through the entities a selector matches
    ///
    /// Any paging block already on the selector is ignored; the pager owns
    /// the offsets. The page size comes from the proxy's session.
    pub fn for_selector(proxy: &'a ServiceProxy, selector: Selector) -> Self {
        let page_size = proxy.session().page_size();
        Self {
            proxy,
            source: PageSource::Selector(selector),
            page_size,
            offset: 0,
            finished: false,
            _entity: PhantomData,
        }
    }

    /// Page through the entities a query statement matches
    ///
    /// The statement must not already carry `LIMIT`/`OFFSET`; the pager
    /// appends its own.
    pub fn for_query(proxy: &'a ServiceProxy, query: impl Into<String>) -> Self {
        let page_size = proxy.session().page_size();
        Self {
            proxy,
            source: PageSource::Query(query.into()),
            page_size,
            offset: 0,
            finished: false,
            _entity: PhantomData,
        }
    }

    /// Override the page size for this pager
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Offset the next page will be requested at
    pub fn current_offset(&self) -> u32 {
        self.offset
    }

    /// Whether the walk has reached the end (or stopped on an error)
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fetch the next page, or `None` once the result set is exhausted
    ///
    /// # Errors
    /// Propagates the proxy's error for the failed page and marks the pager
    /// finished; subsequent calls return `Ok(None)`.
    pub async fn next_page(&mut self) -> ClientResult<Option<Page<T>>> {
        if self.finished {
            return Ok(None);
        }

        let page = match self.fetch_at(self.offset).await {
            Ok(page) => page,
            Err(err) => {
                self.finished = true;
                return Err(err);
            }
        };

        debug!(
            offset = self.offset,
            entries = page.len(),
            total = page.total_result_set_size,
            "Fetched result page"
        );

        if page.is_empty() {
            self.finished = true;
            return Ok(None);
        }

        self.offset += page.len() as u32;
        // The total reported by the page just fetched is authoritative.
        if self.offset >= page.total_result_set_size {
            self.finished = true;
        }

        Ok(Some(page))
    }

    /// Turn the pager into a stream of pages
    ///
    /// Useful with the `futures` stream combinators when pages should be
    /// processed as they arrive instead of collected. The stream ends after
    /// the last page, or after yielding the first error.
    pub fn into_stream(self) -> impl Stream<Item = ClientResult<Page<T>>> + 'a
    where
        T: 'a,
    {
        futures::stream::try_unfold(self, |mut pager| async move {
            Ok(pager.next_page().await?.map(|page| (page, pager)))
        })
    }

    /// Drain every remaining page into one vector
    ///
    /// # Errors
    /// Returns the first page fetch error; entries from earlier pages are
    /// discarded with it.
    pub async fn try_collect(mut self) -> ClientResult<Vec<T>> {
        let mut entities = Vec::new();
        while let Some(page) = self.next_page().await? {
            entities.extend(page.entries);
        }
        Ok(entities)
    }

    async fn fetch_at(&self, offset: u32) -> ClientResult<Page<T>> {
        match &self.source {
            PageSource::Selector(selector) => {
                let paged = selector.with_paging(offset, self.page_size);
                self.proxy.get(&paged).await
            }
            PageSource::Query(query) => {
                let statement = awql::paged(query, offset, self.page_size);
                self.proxy.query(&statement).await
            }
        }
    }
}

impl<T> std::fmt::Debug for QueryPager<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryPager")
            .field("page_size", &self.page_size)
            .field("offset", &self.offset)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

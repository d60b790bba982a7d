//! Draining every page of a search result.
//!
//! The cursor always advances by the number of records the last page actually
//! returned, so consecutive pages neither overlap nor leave gaps.

use futures::stream::{self, Stream, TryStreamExt};
use tracing::{info, warn};

use crate::query::Query;
use crate::request::SearchClient;
use crate::response::{Page, Record};
use crate::{Error, Result};

/// Paging state of one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationCursor {
    /// Index of the next record to request.
    pub offset: u64,
    /// Records retrieved so far. Never exceeds `hits` once that is known.
    pub processed: u64,
    /// Total matches, fixed by the first page.
    pub hits: Option<u64>,
}

impl PaginationCursor {
    pub fn is_exhausted(&self) -> bool {
        matches!(self.hits, Some(hits) if self.processed >= hits)
    }

    /// Records a page of `returned` records out of `hits` total.
    /// Returns how many of those records belong to the result; anything past `hits` is cut off.
    fn advance(&mut self, hits: u64, returned: usize) -> usize {
        let hits = *self.hits.get_or_insert(hits);
        let remaining = hits.saturating_sub(self.processed);
        let taken = (returned as u64).min(remaining);
        self.processed += taken;
        self.offset += taken;
        taken as usize
    }
}

/// Fetches the pages of a single query on demand.
/// Finite and not restartable: once drained (or failed) it yields nothing more.
pub struct PaginatedFetcher<'a> {
    client: &'a SearchClient,
    query: &'a Query,
    rows: u32,
    cursor: PaginationCursor,
    done: bool,
}

impl<'a> PaginatedFetcher<'a> {
    /// Uses the page size from the client's config.
    pub fn new(client: &'a SearchClient, query: &'a Query) -> Self {
        Self::with_page_size(client, query, client.config().rows)
    }

    pub fn with_page_size(client: &'a SearchClient, query: &'a Query, rows: u32) -> Self {
        Self {
            client,
            query,
            rows: rows.max(1),
            cursor: PaginationCursor::default(),
            done: false,
        }
    }

    pub fn cursor(&self) -> PaginationCursor {
        self.cursor
    }

    /// Fetches the next page. `Ok(None)` once every hit has been retrieved.
    /// After an error the fetcher is finished as well.
    pub async fn next_page(&mut self) -> Result<Option<Page>> {
        if self.done || self.cursor.is_exhausted() {
            self.done = true;
            return Ok(None);
        }

        let mut page = match self.client.search(self.query, self.cursor.offset, self.rows).await {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };

        let returned = page.returned();
        let taken = self.cursor.advance(page.hits, returned);
        page.records.truncate(taken);
        let hits = self.cursor.hits.unwrap_or(page.hits);

        info!(
            "status: processed {} of {} results for {}",
            self.cursor.processed, hits, self.query
        );

        if returned == 0 && !self.cursor.is_exhausted() {
            // Offset can't move, asking again would return the same empty page.
            warn!(
                query = %self.query,
                offset = self.cursor.offset,
                "upstream returned an empty page before all {hits} hits were retrieved, stopping"
            );
            self.done = true;
        }
        if self.cursor.is_exhausted() {
            self.done = true;
        }

        Ok(Some(page))
    }

    /// All records of the query as a lazy stream, pages fetched as the stream is polled.
    pub fn records(self) -> impl Stream<Item = Result<Record>> + 'a {
        stream::try_unfold(self, |mut fetcher| async move {
            Ok::<_, Error>(fetcher.next_page().await?.map(|page| (page, fetcher)))
        })
        .map_ok(|page| stream::iter(page.records.into_iter().map(Ok::<Record, Error>)))
        .try_flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_advances_by_returned_count() {
        let mut cursor = PaginationCursor::default();
        assert!(!cursor.is_exhausted());

        assert_eq!(cursor.advance(250, 100), 100);
        assert_eq!(cursor.offset, 100);
        assert_eq!(cursor.advance(250, 100), 100);
        assert_eq!(cursor.offset, 200);
        assert!(!cursor.is_exhausted());
        assert_eq!(cursor.advance(250, 50), 50);
        assert_eq!(cursor.processed, 250);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn cursor_keeps_first_hits_and_caps_processed() {
        let mut cursor = PaginationCursor::default();
        cursor.advance(3, 2);
        // Late arrivals don't move the goalposts.
        assert_eq!(cursor.advance(10, 5), 1);
        assert_eq!(cursor.hits, Some(3));
        assert_eq!(cursor.processed, 3);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn zero_hits_is_exhausted_after_first_page() {
        let mut cursor = PaginationCursor::default();
        assert_eq!(cursor.advance(0, 0), 0);
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.offset, 0);
    }
}

//! Draining cursor-based ARM list responses.
//!
//! ARM list calls return an envelope of `{"value": [...], "nextLink": "..."}`.
//! [`page_stream`] turns an initial page plus a fetch-next capability into a
//! lazy stream of item batches; [`drain`] materializes the whole walk. Order
//! is preserved and nothing is deduplicated; if the service hands back
//! overlapping pages, the duplicates reach the caller.

use crate::blueprint::error::Result;
use futures::stream::{self, Stream, TryStreamExt};
use serde_json::Value;
use std::future::Future;

/// One page of a list response.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Value>,
    pub next_link: Option<String>,
}

impl Page {
    /// Parse an ARM list envelope. A missing or non-array `value` is an empty
    /// page; an empty-string `nextLink` counts as absent.
    pub fn from_envelope(body: &Value) -> Self {
        let items = body
            .get("value")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let next_link = body
            .get("nextLink")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self { items, next_link }
    }

    /// A terminal page with the given items and no continuation.
    pub fn last(items: Vec<Value>) -> Self {
        Self {
            items,
            next_link: None,
        }
    }
}

/// Lazily walk from `first` through every continuation page.
///
/// Each stream element is one page's items. A failed continuation fetch ends
/// the stream with that error; partial accumulation is the consumer's to
/// discard (and [`drain`] does).
pub fn page_stream<F, Fut>(
    first: Page,
    fetch_next: F,
) -> impl Stream<Item = Result<Vec<Value>>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page>>,
{
    stream::try_unfold(
        (Some(first), fetch_next),
        |(pending, mut fetch_next)| async move {
            let Some(page) = pending else {
                return Ok(None);
            };
            let following = match page.next_link {
                Some(link) => Some(fetch_next(link).await?),
                None => None,
            };
            Ok(Some((page.items, (following, fetch_next))))
        },
    )
}

/// Walk every page and collect the items into one ordered collection.
/// All-or-nothing: any continuation failure discards what was gathered.
pub async fn drain<F, Fut>(first: Page, fetch_next: F) -> Result<Vec<Value>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page>>,
{
    page_stream(first, fetch_next).try_concat().await
}

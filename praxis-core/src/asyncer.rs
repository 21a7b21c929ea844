//! Bounded-concurrency mapping.
//!
//! The one concurrency primitive actions and enhancers build on: run a
//! future per item with at most `max_concurrency` in flight, preserving
//! input order in the output.

use futures_util::{stream, StreamExt};
use std::future::Future;

pub async fn parallel_map<T, U, F, Fut>(
    items: impl IntoIterator<Item = T>,
    max_concurrency: usize,
    f: F,
) -> Vec<U>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = U>,
{
    stream::iter(items)
        .map(f)
        .buffered(max_concurrency.max(1))
        .collect()
        .await
}

// Order-preserving concurrent join.

use std::future::Future;

use futures_util::future::try_join_all;

/// Drive every future concurrently and collect the outputs in input order.
///
/// `output[i]` is the result of `futures[i]` whatever order they complete
/// in. The first failure observed wins: the remaining futures are dropped
/// and no partial output is returned.
pub async fn join_ordered<I, F, T, E>(futures: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    try_join_all(futures).await
}

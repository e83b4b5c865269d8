// File: src/services/concurrent.rs

use std::future::Future;
use futures_util::future::join_all;

/// Runs `f` for every item at once and waits for all of them.
///
/// There is no per-item timeout; a slow lookup delays the whole join.
/// Outputs that come back `None` are dropped and the rest keep input order.
pub async fn join_successes<I, T, F, Fut, U>(items: I, f: F) -> Vec<U>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Option<U>>,
{
    join_all(items.into_iter().map(f))
        .await
        .into_iter()
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn keeps_successes_in_input_order() {
        let out = join_successes(vec![30u64, 10, 20, 0], |ms| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            (ms != 20).then_some(ms)
        })
        .await;
        assert_eq!(out, vec![30, 10, 0]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let out: Vec<u8> = tokio_test::block_on(join_successes(Vec::<u8>::new(), |x| async move { Some(x) }));
        assert!(out.is_empty());
    }
}

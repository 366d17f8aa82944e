//! Bounded-concurrency task pool.

use std::future::Future;

use futures_util::StreamExt;
use futures_util::future::join_all;
use futures_util::stream;

/// How a [`TaskPool`] admits new tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pacing {
    /// Run `limit` tasks, wait for all of them to settle, then start the next
    /// `limit`.
    #[default]
    Waves,
    /// Keep up to `limit` tasks in flight, starting a new one as soon as any
    /// finishes.
    Window,
}

/// Runs futures with at most `limit` of them in flight.
///
/// Tasks are polled on the caller's task; nothing is spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPool {
    limit: usize,
    pacing: Pacing,
}

impl TaskPool {
    /// A `limit` of 0 is treated as 1.
    pub fn new(limit: usize, pacing: Pacing) -> Self {
        Self {
            limit: limit.max(1),
            pacing,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Runs every task to completion and returns their outputs in input order.
    ///
    /// Futures are created lazily from `tasks`, so a task is not constructed
    /// before a slot is free for it.
    pub async fn run_all<I, Fut>(&self, tasks: I) -> Vec<Fut::Output>
    where
        I: IntoIterator<Item = Fut>,
        Fut: Future,
    {
        match self.pacing {
            Pacing::Waves => {
                let mut tasks = tasks.into_iter();
                let mut out = Vec::new();
                loop {
                    let wave: Vec<Fut> = tasks.by_ref().take(self.limit).collect();
                    if wave.is_empty() {
                        break;
                    }
                    out.extend(join_all(wave).await);
                }
                out
            }
            Pacing::Window => {
                let mut indexed: Vec<(usize, Fut::Output)> =
                    stream::iter(tasks.into_iter().enumerate().map(|(i, task)| async move {
                        (i, task.await)
                    }))
                    .buffer_unordered(self.limit)
                    .collect()
                    .await;
                indexed.sort_by_key(|(i, _)| *i);
                indexed.into_iter().map(|(_, output)| output).collect()
            }
        }
    }
}

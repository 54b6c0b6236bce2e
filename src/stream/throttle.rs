//! Rate limiting for sample streams.
//!
//! Render consumers rarely want every frame the sensor produces; the
//! combinator here caps a stream's emission rate with latest-wins semantics,
//! so a slow consumer always sees the freshest batch instead of a backlog.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use tokio::time::{Instant, Sleep, sleep};

/// Extension trait adding rate limiting to any Stream.
pub trait SampleStreamExt: Stream {
    /// Emit at most one item per `period`, keeping only the latest when
    /// several arrive within one period.
    fn latest_every(self, period: Duration) -> LatestEvery<Self>
    where
        Self: Sized,
    {
        LatestEvery::new(self, period)
    }
}

impl<S: Stream> SampleStreamExt for S {}

pin_project! {
    /// Stream combinator that forwards the most recent item once per period.
    pub struct LatestEvery<S: Stream> {
        #[pin]
        inner: S,
        #[pin]
        deadline: Sleep,
        period: Duration,
        latest: Option<S::Item>,
        exhausted: bool,
    }
}

impl<S: Stream> LatestEvery<S> {
    fn new(inner: S, period: Duration) -> Self {
        Self {
            inner,
            // First item passes through immediately.
            deadline: sleep(Duration::ZERO),
            period,
            latest: None,
            exhausted: false,
        }
    }
}

impl<S: Stream> Stream for LatestEvery<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        // Drain whatever the inner stream has ready, keeping the newest.
        while !*this.exhausted {
            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => *this.latest = Some(item),
                Poll::Ready(None) => *this.exhausted = true,
                Poll::Pending => break,
            }
        }

        if this.latest.is_some() {
            ready!(this.deadline.as_mut().poll(cx));
            this.deadline.as_mut().reset(Instant::now() + *this.period);
            return Poll::Ready(this.latest.take());
        }

        if *this.exhausted {
            return Poll::Ready(None);
        }

        Poll::Pending
    }
}

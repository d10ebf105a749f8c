//! Response body wrapper that reports when the response is done.
//!
//! The handler returning is not the end of a request: the body is streamed
//! afterwards. `CompletionBody` fires its callback exactly once, at the first
//! of these:
//! - the inner body reports end-of-stream (`Completed`),
//! - the inner body yields an error (`Failed`),
//! - the wrapper is dropped before either (`Aborted`, e.g. client hung up).
//!
//! Responses that carry no body on the wire (HEAD, 204, 304) are dropped
//! unpolled by the server; [`CompletionBody::bodiless`] reports those drops
//! as `Completed`.
//!
//! The callback is stored in an `Option` and taken on first use, which is the
//! single-fire guard.

use std::pin::Pin;
use std::task::{Context, Poll};

use http_body::{Body, Frame, SizeHint};
use pin_project::{pin_project, pinned_drop};

/// How the response body finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
    Aborted,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::Failed => "failed",
            Outcome::Aborted => "aborted",
        }
    }
}

#[pin_project(PinnedDrop)]
pub struct CompletionBody<B, F>
where
    B: Body,
    F: FnOnce(Outcome),
{
    #[pin]
    inner: B,
    on_complete: Option<F>,
    bodiless: bool,
}

impl<B, F> CompletionBody<B, F>
where
    B: Body,
    F: FnOnce(Outcome),
{
    pub fn new(inner: B, on_complete: F) -> Self {
        Self::build(inner, on_complete, false)
    }

    /// Wrapper for a response whose body is never written: dropping it
    /// counts as completion.
    pub fn bodiless(inner: B, on_complete: F) -> Self {
        Self::build(inner, on_complete, true)
    }

    fn build(inner: B, on_complete: F, bodiless: bool) -> Self {
        Self {
            inner,
            on_complete: Some(on_complete),
            bodiless,
        }
    }
}

impl<B, F> Body for CompletionBody<B, F>
where
    B: Body,
    F: FnOnce(Outcome),
{
    type Data = B::Data;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let mut this = self.project();
        let polled = this.inner.as_mut().poll_frame(cx);

        let outcome = match &polled {
            Poll::Pending => None,
            Poll::Ready(None) => Some(Outcome::Completed),
            Poll::Ready(Some(Err(_))) => Some(Outcome::Failed),
            // Sized bodies are not polled again after their last frame.
            Poll::Ready(Some(Ok(_))) => this.inner.is_end_stream().then_some(Outcome::Completed),
        };

        if let Some(outcome) = outcome {
            if let Some(f) = this.on_complete.take() {
                f(outcome);
            }
        }

        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

#[pinned_drop]
impl<B, F> PinnedDrop for CompletionBody<B, F>
where
    B: Body,
    F: FnOnce(Outcome),
{
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();
        if let Some(f) = this.on_complete.take() {
            // An empty body may be written without ever being polled.
            let outcome = if *this.bodiless || this.inner.is_end_stream() {
                Outcome::Completed
            } else {
                Outcome::Aborted
            };
            f(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    use futures_util::stream;

    use axum::body::{to_bytes, Body as AxumBody};

    fn recorder() -> (Arc<Mutex<Vec<Outcome>>>, impl FnOnce(Outcome) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |o| sink.lock().unwrap().push(o))
    }

    #[tokio::test]
    async fn fires_once_when_fully_read() {
        let (seen, cb) = recorder();
        let body = AxumBody::new(CompletionBody::new(AxumBody::from("hello"), cb));

        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"hello");
        assert_eq!(*seen.lock().unwrap(), vec![Outcome::Completed]);
    }

    #[test]
    fn drop_before_read_is_aborted() {
        let (seen, cb) = recorder();
        drop(CompletionBody::new(AxumBody::from("never sent"), cb));
        assert_eq!(*seen.lock().unwrap(), vec![Outcome::Aborted]);
    }

    #[tokio::test]
    async fn body_error_fires_failed_once() {
        let (seen, cb) = recorder();
        let chunks = stream::iter(vec![
            Ok::<_, io::Error>("partial"),
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "upstream gone")),
        ]);
        let body = AxumBody::new(CompletionBody::new(AxumBody::from_stream(chunks), cb));

        assert!(to_bytes(body, usize::MAX).await.is_err());
        assert_eq!(*seen.lock().unwrap(), vec![Outcome::Failed]);
    }

    #[test]
    fn bodiless_drop_is_completed() {
        let (seen, cb) = recorder();
        drop(CompletionBody::bodiless(AxumBody::from("stripped"), cb));
        assert_eq!(*seen.lock().unwrap(), vec![Outcome::Completed]);
    }

    #[test]
    fn drop_of_empty_body_is_completed() {
        let (seen, cb) = recorder();
        drop(CompletionBody::new(AxumBody::empty(), cb));
        assert_eq!(*seen.lock().unwrap(), vec![Outcome::Completed]);
    }
}

//! Test utilities for simulating streaming completion response bodies.
//!
//! These helpers build fake byte streams shaped like the Server-Sent-Events
//! bodies the API produces, with control over chunk boundaries, the `[DONE]`
//! sentinel, injected read errors, and drop tracking for resource-release
//! assertions.

use crate::error::PerplexityError;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::task::{Context, Poll};

/// Configuration for fake SSE response generation
#[derive(Debug, Clone, Default)]
pub struct FakeSseConfig {
    /// Whether to append a final `data: [DONE]` line
    pub include_done: bool,
    /// Split the body across multiple chunks to test partial-frame handling
    pub chunk_size: Option<usize>,
}

/// A fake response body yielding the given raw bytes in one chunk
pub fn fake_byte_stream(raw: &str) -> FakeByteStream {
    FakeByteStream::new(raw.to_string(), None, None)
}

/// A fake response body yielding the given raw bytes split into fixed-size
/// chunks
pub fn fake_byte_stream_chunked(raw: &str, chunk_size: usize) -> FakeByteStream {
    FakeByteStream::new(raw.to_string(), Some(chunk_size), None)
}

/// A fake streaming body carrying one `data: <event>` line per event,
/// separated by blank keep-alive lines
pub fn fake_sse_response(events: &[&str], config: Option<FakeSseConfig>) -> FakeByteStream {
    let config = config.unwrap_or_default();

    let mut body = String::new();
    for event in events {
        body.push_str(&format!("data: {event}\n\n"));
    }
    if config.include_done {
        body.push_str("data: [DONE]\n\n");
    }

    FakeByteStream::new(body, config.chunk_size, None)
}

/// Like [`fake_sse_response`], terminated by the `[DONE]` sentinel
pub fn fake_sse_response_with_done(events: &[&str]) -> FakeByteStream {
    fake_sse_response(
        events,
        Some(FakeSseConfig {
            include_done: true,
            ..Default::default()
        }),
    )
}

/// Like [`fake_sse_response`], split into fixed-size chunks
pub fn fake_sse_response_chunked(events: &[&str], chunk_size: usize) -> FakeByteStream {
    fake_sse_response(
        events,
        Some(FakeSseConfig {
            chunk_size: Some(chunk_size),
            ..Default::default()
        }),
    )
}

/// A body that yields the given events and then fails with a stream read
/// error instead of terminating
pub fn fake_sse_response_with_read_error(
    events: &[&str],
) -> impl Stream<Item = Result<Bytes, PerplexityError>> + Unpin {
    let mut body = String::new();
    for event in events {
        body.push_str(&format!("data: {event}\n\n"));
    }

    futures::stream::iter(vec![
        Ok(Bytes::from(body)),
        Err(PerplexityError::stream("connection reset by peer")),
    ])
}

/// Fake body stream with configurable chunking and an optional drop counter.
///
/// The counter is incremented when the stream is dropped, letting tests
/// assert the transport resource was released exactly once.
pub struct FakeByteStream {
    data: Vec<u8>,
    position: usize,
    chunk_size: Option<usize>,
    drop_counter: Option<Arc<AtomicUsize>>,
}

impl FakeByteStream {
    fn new(body: String, chunk_size: Option<usize>, drop_counter: Option<Arc<AtomicUsize>>) -> Self {
        Self {
            data: body.into_bytes(),
            position: 0,
            chunk_size,
            drop_counter,
        }
    }

    /// Attach a drop counter to an existing fake stream
    pub fn with_drop_counter(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.drop_counter = Some(counter);
        self
    }
}

impl Stream for FakeByteStream {
    type Item = Result<Bytes, PerplexityError>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.position >= self.data.len() {
            return Poll::Ready(None);
        }

        let chunk_size = self.chunk_size.unwrap_or(self.data.len() - self.position);
        let end_pos = std::cmp::min(self.position + chunk_size, self.data.len());

        let chunk = self.data[self.position..end_pos].to_vec();
        self.position = end_pos;

        Poll::Ready(Some(Ok(Bytes::from(chunk))))
    }
}

impl Drop for FakeByteStream {
    fn drop(&mut self) {
        if let Some(counter) = &self.drop_counter {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }
}

use crate::error::PerplexityError;
use bytes::Bytes;
use futures::Stream;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Splits a byte stream into newline-delimited lines, as used by the
/// Server-Sent-Events framing of streaming completion responses.
///
/// Lines are yielded without their terminator; a trailing `\r` is stripped so
/// CRLF input behaves like LF. Blank keep-alive lines are yielded as empty
/// strings; a final unterminated line is yielded when the stream ends.
pub fn sse_lines<S>(stream: S) -> impl Stream<Item = Result<String, PerplexityError>>
where
    S: Stream<Item = Result<Bytes, PerplexityError>> + Unpin,
{
    SseLineReader::new(stream)
}

struct SseLineReader<S> {
    stream: S,
    buffer: String,
    lines: VecDeque<String>,
}

impl<S> SseLineReader<S>
where
    S: Stream<Item = Result<Bytes, PerplexityError>> + Unpin,
{
    fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: String::new(),
            lines: VecDeque::new(),
        }
    }

    fn split_lines(&mut self) {
        while let Some(newline_pos) = self.buffer.find('\n') {
            let mut line = self.buffer[..newline_pos].to_string();
            self.buffer.drain(..newline_pos + 1);

            // Strip per line rather than normalizing whole chunks, so a CRLF
            // split across two chunks is still handled.
            if line.ends_with('\r') {
                line.pop();
            }
            self.lines.push_back(line);
        }
    }
}

impl<S> Stream for SseLineReader<S>
where
    S: Stream<Item = Result<Bytes, PerplexityError>> + Unpin,
{
    type Item = Result<String, PerplexityError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(line) = self.lines.pop_front() {
                return Poll::Ready(Some(Ok(line)));
            }

            match Pin::new(&mut self.stream).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => match std::str::from_utf8(&bytes) {
                    Ok(text) => {
                        self.buffer.push_str(text);
                        self.split_lines();
                        // Loop to drain any complete lines
                    }
                    Err(e) => {
                        return Poll::Ready(Some(Err(PerplexityError::serialization(
                            "Invalid UTF-8 in SSE stream",
                            Box::new(e),
                        ))));
                    }
                },
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    // Stream ended; flush a final unterminated line
                    if self.buffer.is_empty() {
                        return Poll::Ready(None);
                    }
                    let line = std::mem::take(&mut self.buffer);
                    return Poll::Ready(Some(Ok(line)));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

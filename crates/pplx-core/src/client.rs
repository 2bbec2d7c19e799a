//! The Perplexity API client and the response-delivery protocol handler.

use crate::config::PerplexityConfig;
use crate::error::PerplexityError;
use crate::types::{ChatCompletionRequest, ChatCompletionResponse, OnUpdateHandler};
use crate::utils::sse::sse_lines;
use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt};
use serde::Deserialize;
use std::time::Instant;

/// Prefix of a significant streaming line
const DATA_PREFIX: &str = "data: ";
/// Literal line that ends the event stream
const DONE_SENTINEL: &str = "data: [DONE]";

/// Structured error payload returned on non-2xx responses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// A client for the Perplexity AI API
#[derive(Clone)]
pub struct Client {
    config: PerplexityConfig,
    http: reqwest::Client,
}

impl Client {
    /// Create a client with default configuration for the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, PerplexityError> {
        Self::with_config(PerplexityConfig::new(api_key))
    }

    /// Create a client from an explicit configuration, building a transport
    /// with the configured connect timeout. No overall request deadline is
    /// set; wrap the call future to impose one.
    pub fn with_config(config: PerplexityConfig) -> Result<Self, PerplexityError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| PerplexityError::network_with_source("failed to build HTTP client", e))?;

        Ok(Self { config, http })
    }

    /// Create a client with a caller-supplied `reqwest::Client`, overriding
    /// the default transport settings entirely
    pub fn with_http_client(
        config: PerplexityConfig,
        http: reqwest::Client,
    ) -> Result<Self, PerplexityError> {
        config.validate()?;
        Ok(Self { config, http })
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self, PerplexityError> {
        Self::with_config(PerplexityConfig::from_env()?)
    }

    /// Send a chat completion request.
    ///
    /// Returns `Ok(Some(response))` for a buffered completion. When the
    /// request carries an `on_update` handler the service streams events to
    /// that handler instead and the call returns `Ok(None)` once the stream
    /// is exhausted.
    pub async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<Option<ChatCompletionResponse>, PerplexityError> {
        request.validate()?;

        let url = format!("{}/chat/completions", self.config.base_url());
        let started = Instant::now();

        let mut req = self.http.post(&url);
        for (key, value) in self.config.headers() {
            req = req.header(key, value);
        }

        log::debug!(
            "POST {url} model={} stream={}",
            request.model,
            request.on_update.is_some()
        );
        metrics::counter!("pplx_requests_total").increment(1);

        let response = req.json(&request.to_wire()).send().await?;

        let status = response.status();
        if !status.is_success() {
            metrics::counter!("pplx_request_errors_total").increment(1);
            let body = response.bytes().await.unwrap_or_default();
            return Err(decode_error_body(status, &body));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if is_event_stream(content_type) {
            // The precondition comes before any read of the body; the
            // response is dropped unconsumed on failure.
            let Some(on_update) = request.on_update.as_ref() else {
                return Err(PerplexityError::MissingHandler);
            };

            let byte_stream = response.bytes_stream().map_err(|e| {
                PerplexityError::stream_with_source("error reading streaming response", e)
            });
            drive_stream(byte_stream, on_update).await?;

            metrics::histogram!("pplx_request_duration_seconds")
                .record(started.elapsed().as_secs_f64());
            return Ok(None);
        }

        let body = response.bytes().await?;
        let completion: ChatCompletionResponse = serde_json::from_slice(&body)
            .map_err(|e| PerplexityError::serialization("failed to decode completion response", e))?;

        metrics::histogram!("pplx_request_duration_seconds").record(started.elapsed().as_secs_f64());
        Ok(Some(completion))
    }
}

/// Whether the declared content type denotes a Server-Sent-Events stream
fn is_event_stream(content_type: &str) -> bool {
    content_type == "text/event-stream" || content_type.starts_with("text/event-stream;")
}

/// Decode a non-2xx response body into an API error, preferring the
/// service-reported message over the generic status line
fn decode_error_body(status: reqwest::StatusCode, body: &[u8]) -> PerplexityError {
    if let Ok(api_error) = serde_json::from_slice::<ApiErrorBody>(body) {
        if !api_error.error.is_empty() {
            return PerplexityError::api(status.as_u16(), api_error.error);
        }
    }
    PerplexityError::api(status.as_u16(), format!("unexpected status code: {status}"))
}

/// The streaming read loop.
///
/// Reads the body line by line: blank keep-alive lines are skipped, the
/// `[DONE]` sentinel (or end of stream) terminates the loop, `data: ` lines
/// are decoded and handed to the callback in arrival order, and anything
/// else is ignored for forward compatibility. A line that fails to decode
/// aborts the stream; events already delivered stay delivered.
pub(crate) async fn drive_stream<S>(
    byte_stream: S,
    on_update: &OnUpdateHandler,
) -> Result<(), PerplexityError>
where
    S: Stream<Item = Result<Bytes, PerplexityError>> + Unpin,
{
    let mut lines = sse_lines(byte_stream);

    while let Some(line) = lines.next().await {
        let line = line?;

        if line.is_empty() {
            continue;
        }

        if line == DONE_SENTINEL {
            break;
        }

        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            // Unrecognized framing, skip
            continue;
        };

        let event: ChatCompletionResponse = serde_json::from_str(payload)
            .map_err(|e| PerplexityError::serialization("failed to decode streaming event", e))?;

        metrics::counter!("pplx_stream_events_total").increment(1);
        on_update(event);
    }

    log::debug!("stream finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_helpers::{
        fake_byte_stream, fake_sse_response_chunked, fake_sse_response_with_done,
        fake_sse_response_with_read_error,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn collecting_handler() -> (OnUpdateHandler, Arc<Mutex<Vec<ChatCompletionResponse>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler: OnUpdateHandler = Arc::new(move |event| {
            sink.lock().unwrap().push(event);
        });
        (handler, seen)
    }

    fn delta_event(content: &str) -> String {
        format!(r#"{{"id":"ev-1","choices":[{{"index":0,"delta":{{"role":"assistant","content":"{content}"}}}}]}}"#)
    }

    #[tokio::test]
    async fn test_stream_terminates_on_done_sentinel() {
        let events = [delta_event("Hello"), delta_event(" world"), delta_event("!")];
        let event_refs: Vec<&str> = events.iter().map(String::as_str).collect();
        let stream = fake_sse_response_with_done(&event_refs);

        let (handler, seen) = collecting_handler();
        drive_stream(stream, &handler).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        let text: String = seen
            .iter()
            .filter_map(|event| event.choices.first())
            .filter_map(|choice| choice.delta.as_ref())
            .map(|delta| delta.content.as_str())
            .collect();
        assert_eq!(text, "Hello world!");
    }

    #[tokio::test]
    async fn test_stream_terminates_on_end_of_data() {
        // No [DONE] sentinel; end of stream is a clean termination too
        let events = [delta_event("only")];
        let event_refs: Vec<&str> = events.iter().map(String::as_str).collect();
        let stream = fake_sse_response_chunked(&event_refs, 7);

        let (handler, seen) = collecting_handler();
        drive_stream(stream, &handler).await.unwrap();

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stream_decode_failure_aborts_after_delivered_events() {
        let good = delta_event("Good");
        let events = [good.as_str(), r#"{"invalid json"#, r#"{"id":"never"}"#];
        let stream = fake_sse_response_with_done(&events);

        let (handler, seen) = collecting_handler();
        let err = drive_stream(stream, &handler).await.unwrap_err();

        // Exactly the events before the malformed line were delivered
        assert_eq!(seen.lock().unwrap().len(), 1);
        match err {
            PerplexityError::Serialization { message, .. } => {
                assert!(message.contains("streaming event"));
            }
            other => panic!("expected Serialization error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stream_read_error_is_distinct_from_decode_error() {
        let event = delta_event("partial");
        let binding = [event.as_str()];
        let stream = fake_sse_response_with_read_error(&binding);

        let (handler, seen) = collecting_handler();
        let err = drive_stream(stream, &handler).await.unwrap_err();

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(matches!(err, PerplexityError::Stream { .. }));
    }

    #[tokio::test]
    async fn test_stream_ignores_blank_and_unrecognized_lines() {
        let event = delta_event("kept");
        let body = format!(": comment\nevent: message\n\ndata: {event}\n\ndata: [DONE]\n");
        let stream = fake_byte_stream(&body);

        let (handler, seen) = collecting_handler();
        drive_stream(stream, &handler).await.unwrap();

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stream_stops_reading_after_sentinel() {
        // Lines after [DONE] must not be decoded or delivered
        let before = delta_event("before");
        let body = format!(
            "data: {before}\n\ndata: [DONE]\n\ndata: {{\"invalid json\n",
        );
        let stream = fake_byte_stream(&body);

        let (handler, seen) = collecting_handler();
        drive_stream(stream, &handler).await.unwrap();

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_released_exactly_once_on_success() {
        let event = delta_event("x");
        let event_refs = [event.as_str()];
        let counter = Arc::new(AtomicUsize::new(0));
        let stream = fake_sse_response_with_done(&event_refs).with_drop_counter(counter.clone());

        let (handler, _seen) = collecting_handler();
        drive_stream(stream, &handler).await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_released_exactly_once_on_decode_error() {
        let counter = Arc::new(AtomicUsize::new(0));
        let stream = fake_byte_stream("data: {broken\n").with_drop_counter(counter.clone());

        let (handler, _seen) = collecting_handler();
        drive_stream(stream, &handler).await.unwrap_err();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_decode_error_body_with_api_message() {
        let err = decode_error_body(
            reqwest::StatusCode::BAD_REQUEST,
            br#"{"error":"bad request"}"#,
        );
        match err {
            PerplexityError::Api { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("bad request"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_error_body_falls_back_to_status_text() {
        for body in [&b""[..], b"not json", br#"{"error":""}"#, br#"{"detail":"x"}"#] {
            let err = decode_error_body(reqwest::StatusCode::INTERNAL_SERVER_ERROR, body);
            match err {
                PerplexityError::Api { status, message } => {
                    assert_eq!(status, 500);
                    assert!(message.contains("unexpected status code"));
                }
                other => panic!("expected Api error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_is_event_stream_classification() {
        assert!(is_event_stream("text/event-stream"));
        assert!(is_event_stream("text/event-stream; charset=utf-8"));
        assert!(!is_event_stream("application/json"));
        assert!(!is_event_stream(""));
    }
}

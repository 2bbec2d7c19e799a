//! # pplx-core - Perplexity AI client
//!
//! A Rust client for the Perplexity AI chat completions API, supporting both
//! buffered responses and incremental streaming delivery over Server-Sent
//! Events.
//!
//! The library ends at the network boundary: it builds and validates a
//! request, sends one POST, and decodes the reply. It does not manage
//! conversation state, retry failed calls, or rate limit; those remain
//! caller policy.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pplx_core::{ChatCompletionRequest, Client, Message, SonarModel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::from_env()?; // PERPLEXITY_API_KEY
//!
//!     let request = ChatCompletionRequest::new(
//!         SonarModel::SonarSmallOnline,
//!         vec![
//!             Message::system("Be precise and concise."),
//!             Message::user("How many stars are there in our galaxy?"),
//!         ],
//!     );
//!
//!     let response = client.chat_completion(request).await?.unwrap();
//!     if let Some(message) = response.choices[0].message.as_ref() {
//!         println!("{}", message.content);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! Supplying an `on_update` handler switches the request to streaming: the
//! service replies with an event stream, each event is decoded into a full
//! [`ChatCompletionResponse`] whose choices carry `delta` fragments, and the
//! handler is invoked once per event, in order, on the task driving the read
//! loop. The call itself returns `Ok(None)` once the stream ends.
//!
//! ```rust,no_run
//! use pplx_core::{ChatCompletionRequest, Client, SonarModel};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::from_env()?;
//!
//! let request = ChatCompletionRequest::builder(SonarModel::SonarSmallOnline)
//!     .user("Tell me a short story.")
//!     .on_update(|event| {
//!         for choice in &event.choices {
//!             if let Some(delta) = &choice.delta {
//!                 print!("{}", delta.content);
//!             }
//!         }
//!     })
//!     .build();
//!
//! let streamed = client.chat_completion(request).await?;
//! assert!(streamed.is_none());
//! # Ok(())
//! # }
//! ```
//!
//! Backpressure is implicit: the connection is only read as fast as the
//! handler returns, and events already delivered before a mid-stream failure
//! stay delivered.
//!
//! ## Cancellation
//!
//! The client imposes no request deadline of its own (the default transport
//! only carries a connect timeout). To bound a call, wrap it:
//!
//! ```rust,no_run
//! # use pplx_core::{ChatCompletionRequest, Client, Message};
//! # async fn example(client: Client, request: ChatCompletionRequest) {
//! let result = tokio::time::timeout(
//!     std::time::Duration::from_secs(300),
//!     client.chat_completion(request),
//! )
//! .await;
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, PerplexityError>`](PerplexityError):
//!
//! - [`PerplexityError::Validation`]: the request broke an invariant; no
//!   network activity happened.
//! - [`PerplexityError::Api`]: the service answered non-2xx, with its own
//!   error message when the body carried one.
//! - [`PerplexityError::Serialization`]: a response document or streamed
//!   event failed to decode.
//! - [`PerplexityError::Stream`]: the streaming body itself failed to read.
//! - [`PerplexityError::MissingHandler`]: the service streamed but the
//!   request had no `on_update` handler.

pub mod client;
pub mod config;
pub mod error;
pub mod types;
pub mod utils;


pub use client::Client;
pub use config::{DEFAULT_BASE_URL, PerplexityConfig};
pub use error::PerplexityError;
pub use types::{
    ChatCompletionRequest, ChatCompletionRequestBuilder, ChatCompletionResponse, Choice,
    FinishReason, Message, OnUpdateHandler, RecencyFilter, Role, SonarModel, Usage,
};
pub use utils::sse::sse_lines;

// Re-export commonly used types
pub use serde::{Deserialize, Serialize};

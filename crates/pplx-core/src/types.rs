//! Request and response types for the Perplexity chat completions API.

use crate::error::PerplexityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// Role of the speaker in a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Models offered by the API.
///
/// Requests carry a plain string identifier, so models released after this
/// list was written remain usable; the enum exists for the common case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
pub enum SonarModel {
    #[strum(serialize = "llama-3.1-sonar-small-128k-online")]
    SonarSmallOnline,
    #[strum(serialize = "llama-3.1-sonar-large-128k-online")]
    SonarLargeOnline,
    #[strum(serialize = "llama-3.1-sonar-huge-128k-online")]
    SonarHugeOnline,
    #[strum(serialize = "llama-3.1-sonar-small-128k-chat")]
    SonarSmallChat,
    #[strum(serialize = "llama-3.1-sonar-large-128k-chat")]
    SonarLargeChat,
    #[strum(serialize = "llama-3.1-8b-instruct")]
    Instruct8b,
    #[strum(serialize = "llama-3.1-70b-instruct")]
    Instruct70b,
}

impl From<SonarModel> for String {
    fn from(model: SonarModel) -> Self {
        model.to_string()
    }
}

/// Restricts search results to the given time interval. Does not apply to
/// images.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecencyFilter {
    Hour,
    Day,
    Week,
    Month,
}

/// The reason the model stopped generating tokens
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    /// The model hit a natural stopping point
    Stop,
    /// The requested maximum number of tokens was reached
    Length,
}

/// Callback invoked synchronously for each streamed completion event.
///
/// Events are delivered in arrival order on the task driving the read loop;
/// the remote peer is only read as fast as the callback returns.
pub type OnUpdateHandler = Arc<dyn Fn(ChatCompletionResponse) + Send + Sync>;

/// A chat completion request.
///
/// `model` and `messages` are required; every other parameter is optional and
/// omitted from the wire form when unset, except the explicit boolean flags
/// which are always sent. Supplying `on_update` switches the request to
/// streaming delivery.
#[derive(Clone, Default)]
pub struct ChatCompletionRequest {
    /// Name of the model that will complete the prompt. Required.
    pub model: String,

    /// The conversation so far. Required; the last message must be from the
    /// user.
    pub messages: Vec<Message>,

    /// Maximum number of completion tokens returned by the API. Unset means
    /// the model generates until a stop token or the end of its context
    /// window.
    pub max_tokens: Option<u32>,

    /// Amount of randomness in the response, between 0 (inclusive) and 2
    /// (exclusive). API default: 0.2.
    pub temperature: Option<f64>,

    /// Nucleus sampling threshold, between 0 and 1. Adjust either `top_p` or
    /// `top_k`, not both. API default: 0.9.
    pub top_p: Option<f64>,

    /// Whether the response should include citations.
    pub return_citations: bool,

    /// Limits citations to URLs from the given domains (at most 3). Prefix a
    /// domain with "-" to blocklist it instead.
    pub search_domain_filter: Option<Vec<String>>,

    /// Whether the response should include images.
    pub return_images: bool,

    /// Whether the response should include related questions.
    pub return_related_questions: bool,

    /// Restricts search results to the given time interval.
    pub search_recency_filter: Option<RecencyFilter>,

    /// Number of tokens kept for top-k filtering, between 0 and 2048. Adjust
    /// either `top_p` or `top_k`, not both.
    pub top_k: Option<u32>,

    /// Penalizes tokens that already appeared in the text so far, between
    /// -2.0 and 2.0. Incompatible with `frequency_penalty`.
    pub presence_penalty: Option<f64>,

    /// Multiplicative penalty on token frequency; 1.0 means no penalty.
    /// Incompatible with `presence_penalty`.
    pub frequency_penalty: Option<f64>,

    /// Callback for streamed events. When set, the response is streamed
    /// incrementally and the call itself returns no response value. Never
    /// serialized; the wire form carries a derived `stream` flag instead.
    pub on_update: Option<OnUpdateHandler>,
}

impl fmt::Debug for ChatCompletionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionRequest")
            .field("model", &self.model)
            .field("messages", &self.messages)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("return_citations", &self.return_citations)
            .field("search_domain_filter", &self.search_domain_filter)
            .field("return_images", &self.return_images)
            .field("return_related_questions", &self.return_related_questions)
            .field("search_recency_filter", &self.search_recency_filter)
            .field("top_k", &self.top_k)
            .field("presence_penalty", &self.presence_penalty)
            .field("frequency_penalty", &self.frequency_penalty)
            .field("on_update", &self.on_update.as_ref().map(|_| "<handler>"))
            .finish()
    }
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Self::default()
        }
    }

    pub fn builder(model: impl Into<String>) -> ChatCompletionRequestBuilder {
        ChatCompletionRequestBuilder::new(model)
    }

    /// Check the cross-field invariants. Called before any network activity.
    pub fn validate(&self) -> Result<(), PerplexityError> {
        if self.model.is_empty() {
            return Err(PerplexityError::validation("model is required"));
        }
        if self.messages.is_empty() {
            return Err(PerplexityError::validation(
                "at least one message is required",
            ));
        }
        if self.messages.last().map(|m| m.role) != Some(Role::User) {
            return Err(PerplexityError::validation(
                "the last message must be from the user",
            ));
        }
        if self.presence_penalty.is_some() && self.frequency_penalty.is_some() {
            return Err(PerplexityError::validation(
                "presence_penalty and frequency_penalty are incompatible; set only one",
            ));
        }
        Ok(())
    }

    /// Build the wire representation.
    ///
    /// The callback is replaced by a derived `stream` flag; unset optional
    /// parameters are dropped from the payload.
    pub(crate) fn to_wire(&self) -> WireChatCompletionRequest<'_> {
        WireChatCompletionRequest {
            model: &self.model,
            messages: &self.messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            return_citations: self.return_citations,
            search_domain_filter: self.search_domain_filter.as_deref(),
            return_images: self.return_images,
            return_related_questions: self.return_related_questions,
            search_recency_filter: self.search_recency_filter,
            top_k: self.top_k,
            stream: self.on_update.is_some().then_some(true),
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
        }
    }
}

/// Plain data-transfer form of [`ChatCompletionRequest`] that maps one-to-one
/// onto the documented wire keys.
#[derive(Debug, Serialize)]
pub(crate) struct WireChatCompletionRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) top_p: Option<f64>,
    pub(crate) return_citations: bool,
    pub(crate) search_domain_filter: Option<&'a [String]>,
    pub(crate) return_images: bool,
    pub(crate) return_related_questions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) search_recency_filter: Option<RecencyFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) frequency_penalty: Option<f64>,
}

/// A response from the chat completion API.
///
/// Non-streaming calls produce one of these; while streaming, every event is
/// itself a full response value whose choices carry `delta` fragments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionResponse {
    /// ID generated uniquely for each response
    #[serde(default)]
    pub id: String,

    /// The model used to generate the response
    #[serde(default)]
    pub model: String,

    /// Object type tag, `chat.completion`
    #[serde(default)]
    pub object: String,

    /// Unix timestamp (in seconds) of when the completion was created
    #[serde(default)]
    pub created: i64,

    /// Completion choices the model generated for the input prompt
    #[serde(default)]
    pub choices: Vec<Choice>,

    /// Usage statistics. Present on the final non-streaming response;
    /// streaming events generally omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// A single completion choice generated by the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    /// Index of this completion in the list
    #[serde(default)]
    pub index: u32,

    /// Why the model stopped generating; absent while streaming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,

    /// The complete generated message (non-streaming)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    /// The incrementally streamed next tokens (streaming)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Message>,
}

/// Token usage statistics for a completion request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// Tokens provided in the request prompt
    pub prompt_tokens: u32,
    /// Tokens generated in the response output
    pub completion_tokens: u32,
    /// Total tokens used (prompt + completion)
    pub total_tokens: u32,
}

/// Builder pattern for chat completion requests
#[derive(Default)]
pub struct ChatCompletionRequestBuilder {
    request: ChatCompletionRequest,
}

impl ChatCompletionRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            request: ChatCompletionRequest {
                model: model.into(),
                ..ChatCompletionRequest::default()
            },
        }
    }

    pub fn add_message(mut self, role: Role, content: impl Into<String>) -> Self {
        self.request.messages.push(Message {
            role,
            content: content.into(),
        });
        self
    }

    pub fn system(self, content: impl Into<String>) -> Self {
        self.add_message(Role::System, content)
    }

    pub fn user(self, content: impl Into<String>) -> Self {
        self.add_message(Role::User, content)
    }

    pub fn assistant(self, content: impl Into<String>) -> Self {
        self.add_message(Role::Assistant, content)
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.request.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.request.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.request.top_p = Some(top_p);
        self
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.request.top_k = Some(top_k);
        self
    }

    pub fn return_citations(mut self, return_citations: bool) -> Self {
        self.request.return_citations = return_citations;
        self
    }

    pub fn return_images(mut self, return_images: bool) -> Self {
        self.request.return_images = return_images;
        self
    }

    pub fn return_related_questions(mut self, return_related_questions: bool) -> Self {
        self.request.return_related_questions = return_related_questions;
        self
    }

    pub fn search_domain_filter(mut self, domains: Vec<String>) -> Self {
        self.request.search_domain_filter = Some(domains);
        self
    }

    pub fn search_recency_filter(mut self, filter: RecencyFilter) -> Self {
        self.request.search_recency_filter = Some(filter);
        self
    }

    pub fn presence_penalty(mut self, penalty: f64) -> Self {
        self.request.presence_penalty = Some(penalty);
        self
    }

    pub fn frequency_penalty(mut self, penalty: f64) -> Self {
        self.request.frequency_penalty = Some(penalty);
        self
    }

    pub fn on_update(
        mut self,
        handler: impl Fn(ChatCompletionResponse) + Send + Sync + 'static,
    ) -> Self {
        self.request.on_update = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> ChatCompletionRequest {
        self.request
    }
}

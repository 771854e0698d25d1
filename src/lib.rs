//! grok-client - async client for the Grok chat-completion API
//!
//! Typed access to account metadata, the model catalogue, buffered and
//! tool-enabled chat completions, and completions streamed over
//! Server-Sent Events.
//!
//! ```no_run
//! use futures::StreamExt;
//! use grok_client::{ChatCompletionRequest, ChatMessage, GrokClient};
//!
//! # async fn run() -> grok_client::Result<()> {
//! let client = GrokClient::new("xai-...")?;
//! let request = ChatCompletionRequest::new("grok-beta", vec![ChatMessage::user("Hello")]);
//!
//! let mut fragments = client.stream_completion(request);
//! while let Some(fragment) = fragments.next().await {
//!     print!("{}", fragment?);
//! }
//! # Ok(())
//! # }
//! ```

use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::pin::Pin;

pub mod api;
pub mod client;
pub mod config;
pub mod error;

pub use api::{
    ApiKeyInfo, ChatChoice, ChatChunkChoice, ChatCompletionChunk, ChatCompletionRequest,
    ChatCompletionResponse, ChatDelta, ChatMessage, FunctionCallDetails, FunctionDefinition,
    FunctionParameter, FunctionParameters, JsonSchema, LanguageModel, LanguageModelList, Model,
    ModelList, ResponseFormat, SchemaDetails, SchemaProperty, StreamAccumulator, Tool, ToolCall,
    ToolChoice, Usage,
};
pub use client::HttpClient;
pub use config::{ClientConfig, ConfigLoader};
pub use error::{GrokError, Result};

use api::{ChunkStream, ContentStream};

const API_KEY: &str = "api-key";
const MODELS: &str = "models";
const LANGUAGE_MODELS: &str = "language-models";
const CHAT_COMPLETIONS: &str = "chat/completions";

/// Lazy stream of content fragments
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Lazy stream of decoded chunks
pub type CompletionChunkStream = Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk>> + Send>>;

/// The API client.
///
/// Holds no per-call state, so one instance (or its clones) can serve any
/// number of concurrent operations.
#[derive(Debug, Clone)]
pub struct GrokClient {
    http: HttpClient,
}

impl GrokClient {
    /// Create a client for the default API root
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(&ClientConfig::new(api_key))
    }

    /// Create a client with the key taken from the environment (and `.env`)
    pub fn from_env() -> Result<Self> {
        Self::from_config(ConfigLoader::from_env().config())
    }

    /// Create a client from a JSON config file
    pub fn with_config_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(ConfigLoader::from_path(path)?.config())
    }

    /// Create a client from a config object
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }

    /// Sets a custom reqwest client.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = self.http.with_client(client);
        self
    }

    /// GET any endpoint under the API root and decode the reply
    pub async fn fetch<R>(&self, endpoint: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        self.http.get_json(endpoint).await
    }

    /// Metadata for the key this client authenticates with
    pub async fn get_api_key_info(&self) -> Result<ApiKeyInfo> {
        self.fetch(API_KEY).await
    }

    /// Models available to the key
    pub async fn list_models(&self) -> Result<ModelList> {
        self.fetch(MODELS).await
    }

    /// A single model by id
    pub async fn get_model(&self, id: &str) -> Result<Model> {
        self.fetch(&format!("{}/{}", MODELS, id)).await
    }

    /// Language models with pricing and modalities
    pub async fn list_language_models(&self) -> Result<LanguageModelList> {
        self.fetch(LANGUAGE_MODELS).await
    }

    /// Request a buffered completion.
    ///
    /// Streaming is always turned off for this call.
    pub async fn create_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let request = request.with_stream(false);
        let response: ChatCompletionResponse =
            self.http.post_json(CHAT_COMPLETIONS, &request).await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion finished"
            );
        }
        Ok(response)
    }

    /// Request a buffered completion with `tools` available to the model.
    ///
    /// Tool calls in the reply are not executed: the caller runs them, appends
    /// one `tool` message per call and invokes this again for the follow-up.
    pub async fn create_completion_with_tools(
        &self,
        request: ChatCompletionRequest,
        tools: Vec<Tool>,
    ) -> Result<ChatCompletionResponse> {
        let request = request.with_tools(tools);

        let duplicates = request.duplicate_tool_names();
        if !duplicates.is_empty() {
            tracing::warn!(?duplicates, "tool names are not unique");
        }

        self.create_completion(request).await
    }

    /// Stream the completion as text fragments.
    ///
    /// Nothing is sent until the stream is first polled. A failure to open the
    /// stream is its first and only item; dropping the stream closes the
    /// connection.
    pub fn stream_completion(&self, request: ChatCompletionRequest) -> CompletionStream {
        Box::pin(open_content_stream(
            self.http.clone(),
            request.with_stream(true),
        ))
    }

    /// Stream the completion as decoded chunks
    pub fn stream_completion_chunks(&self, request: ChatCompletionRequest) -> CompletionChunkStream {
        Box::pin(open_chunk_stream(
            self.http.clone(),
            request.with_stream(true),
        ))
    }
}

fn open_content_stream(
    http: HttpClient,
    request: ChatCompletionRequest,
) -> impl Stream<Item = Result<String>> + Send + 'static {
    async_stream::try_stream! {
        let bytes = http.post_stream(CHAT_COMPLETIONS, &request).await?;
        let mut fragments = ContentStream::new(bytes);
        while let Some(fragment) = fragments.next().await {
            yield fragment?;
        }
    }
}

fn open_chunk_stream(
    http: HttpClient,
    request: ChatCompletionRequest,
) -> impl Stream<Item = Result<ChatCompletionChunk>> + Send + 'static {
    async_stream::try_stream! {
        let bytes = http.post_stream(CHAT_COMPLETIONS, &request).await?;
        let mut chunks = ChunkStream::new(bytes);
        while let Some(chunk) = chunks.next().await {
            yield chunk?;
        }
    }
}

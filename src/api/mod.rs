//! API Module
//!
//! Wire types for every endpoint and streaming support.

pub mod account;
pub mod completion;
pub mod schema;
pub mod streaming;
pub mod tools;

pub use account::{ApiKeyInfo, LanguageModel, LanguageModelList, Model, ModelList};
pub use completion::{ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Usage};
pub use schema::{JsonSchema, ResponseFormat, SchemaDetails, SchemaProperty};
pub use streaming::{
    parse_sse_frame, ChatChunkChoice, ChatCompletionChunk, ChatDelta, ChunkStream, ContentStream,
    SseDecoder, SseFrame, StreamAccumulator, DONE_SENTINEL,
};
pub use tools::{
    FunctionCallDetails, FunctionDefinition, FunctionParameter, FunctionParameters, Tool, ToolCall,
    ToolChoice, ToolChoiceFunction,
};

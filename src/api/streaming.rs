//! Streaming Support
//!
//! Handles Server-Sent Events (SSE) streaming for chat completions.
//!
//! Bytes from the transport are fed into an [`SseDecoder`], which reassembles
//! frames split across reads. [`ChunkStream`] decodes each `data:` payload
//! into a [`ChatCompletionChunk`] and [`ContentStream`] narrows that to the
//! first choice's text fragments.

use crate::api::completion::{ChatMessage, Usage};
use crate::error::{GrokError, Result};
use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Payload that ends a completion stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// A streaming chunk from the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    /// Chunk ID
    pub id: String,

    /// Object type
    pub object: String,

    /// Creation timestamp
    pub created: u64,

    /// Model name
    pub model: String,

    /// Choices with deltas
    pub choices: Vec<ChatChunkChoice>,

    /// Usage info (only in final chunk)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_fingerprint: Option<String>,
}

impl ChatCompletionChunk {
    /// Content of the first choice's delta, if any
    pub fn content(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.delta.content.as_deref())
    }

    fn into_content(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.delta.content)
    }
}

/// A choice in a streaming chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatChunkChoice {
    /// Choice index
    pub index: u32,

    /// The delta (partial message)
    pub delta: ChatDelta,

    /// Finish reason (set in final chunk)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Delta content in a streaming chunk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatDelta {
    /// Role (usually only in first chunk)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Content delta
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A meaningful SSE frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// Payload of the frame's `data:` lines
    Data(String),

    /// The terminal sentinel
    Done,
}

/// Parse one complete SSE frame.
///
/// Returns `None` for frames without a `data:` line (comments, keep-alives,
/// `event:`/`id:`/`retry:` only).
pub fn parse_sse_frame(frame: &str) -> Option<SseFrame> {
    let mut data: Option<String> = None;

    for line in frame.lines() {
        let line = line.trim_end_matches('\r');
        let Some(rest) = line.strip_prefix("data:") else {
            continue;
        };
        let rest = rest.strip_prefix(' ').unwrap_or(rest);

        match data.as_mut() {
            Some(buf) => {
                buf.push('\n');
                buf.push_str(rest);
            }
            None => data = Some(rest.to_string()),
        }
    }

    let data = data?;
    if data.trim() == DONE_SENTINEL {
        Some(SseFrame::Done)
    } else {
        Some(SseFrame::Data(data))
    }
}

/// Incremental SSE frame splitter.
///
/// Buffers raw bytes so that frames (and UTF-8 sequences) split across
/// reads are only parsed once complete.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,

    /// Prefix of `buffer` already known to hold no separator
    scanned: usize,
}

impl SseDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes received from the transport
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Number of bytes held back waiting for a frame separator
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Drop everything still buffered
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
    }

    /// Take the next complete, meaningful frame.
    ///
    /// `Ok(None)` means more bytes are needed. A frame that is not valid
    /// UTF-8 is a decoding error.
    pub fn next_frame(&mut self) -> Result<Option<SseFrame>> {
        while let Some((end, separator_len)) = find_separator(&self.buffer, self.scanned) {
            let raw: Vec<u8> = self.buffer.drain(..end + separator_len).collect();
            self.scanned = 0;
            let text = std::str::from_utf8(&raw[..end])
                .map_err(|e| GrokError::decoding(format!("SSE frame is not valid UTF-8: {}", e)))?;

            if let Some(frame) = parse_sse_frame(text) {
                return Ok(Some(frame));
            }
        }

        // A separator may straddle the next read by up to three bytes.
        self.scanned = self.buffer.len().saturating_sub(3);
        Ok(None)
    }
}

/// Position and length of the first blank-line separator at or after `from`
fn find_separator(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    (from..buf.len()).find_map(|i| {
        let rest = &buf[i..];
        if rest.starts_with(b"\n\n") {
            Some((i, 2))
        } else if rest.starts_with(b"\r\n\r\n") {
            Some((i, 4))
        } else {
            None
        }
    })
}

pin_project! {
    /// Stream of decoded chunks over a raw SSE byte stream.
    ///
    /// Ends on the `[DONE]` sentinel, on transport end-of-stream, or after
    /// yielding the first error. The transport stream is dropped as soon as
    /// the stream ends; dropping this stream early drops it too.
    pub struct ChunkStream<S> {
        #[pin]
        inner: Option<S>,
        decoder: SseDecoder,
    }
}

impl<S> ChunkStream<S>
where
    S: Stream<Item = Result<Bytes>>,
{
    /// Wrap a transport byte stream
    pub fn new(inner: S) -> Self {
        Self {
            inner: Some(inner),
            decoder: SseDecoder::new(),
        }
    }

    /// Narrow to content fragments
    pub fn content(self) -> ContentStream<S> {
        ContentStream { chunks: self }
    }
}

impl<S> Stream for ChunkStream<S>
where
    S: Stream<Item = Result<Bytes>>,
{
    type Item = Result<ChatCompletionChunk>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            let Some(inner) = this.inner.as_mut().as_pin_mut() else {
                return Poll::Ready(None);
            };

            let item = match this.decoder.next_frame() {
                Ok(Some(SseFrame::Done)) => {
                    tracing::debug!("completion stream finished");
                    None
                }
                Ok(Some(SseFrame::Data(payload))) => {
                    tracing::trace!(payload = %payload, "sse frame");
                    match serde_json::from_str::<ChatCompletionChunk>(&payload) {
                        Ok(chunk) => return Poll::Ready(Some(Ok(chunk))),
                        Err(e) => Some(Err(GrokError::from(e))),
                    }
                }
                Err(e) => Some(Err(e)),
                Ok(None) => match ready!(inner.poll_next(cx)) {
                    Some(Ok(bytes)) => {
                        this.decoder.feed(&bytes);
                        continue;
                    }
                    Some(Err(e)) => Some(Err(e)),
                    None => {
                        if this.decoder.buffered() > 0 {
                            tracing::debug!(
                                bytes = this.decoder.buffered(),
                                "stream closed with an unterminated frame, discarding it"
                            );
                        }
                        None
                    }
                },
            };

            // Terminal: release the transport before reporting the outcome.
            this.inner.set(None);
            this.decoder.clear();
            return Poll::Ready(item);
        }
    }
}

pin_project! {
    /// Stream of text fragments from the first choice of each chunk.
    ///
    /// Chunks whose delta carries no content (e.g. role-only deltas) yield
    /// nothing; an empty-string content is yielded as is.
    pub struct ContentStream<S> {
        #[pin]
        chunks: ChunkStream<S>,
    }
}

impl<S> ContentStream<S>
where
    S: Stream<Item = Result<Bytes>>,
{
    /// Wrap a transport byte stream
    pub fn new(inner: S) -> Self {
        ChunkStream::new(inner).content()
    }
}

impl<S> Stream for ContentStream<S>
where
    S: Stream<Item = Result<Bytes>>,
{
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            match ready!(this.chunks.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => {
                    if let Some(content) = chunk.into_content() {
                        return Poll::Ready(Some(Ok(content)));
                    }
                }
                Some(Err(e)) => return Poll::Ready(Some(Err(e))),
                None => return Poll::Ready(None),
            }
        }
    }
}

/// Accumulator for streaming chunks
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    /// Accumulated content
    pub content: String,

    /// Role from first chunk
    pub role: Option<String>,

    /// Finish reason from last chunk
    pub finish_reason: Option<String>,

    /// Response ID
    pub id: Option<String>,

    /// Model name
    pub model: Option<String>,

    /// Usage from final chunk
    pub usage: Option<Usage>,
}

impl StreamAccumulator {
    /// Create a new accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one chunk; only the first choice is tracked
    pub fn process_chunk(&mut self, chunk: &ChatCompletionChunk) {
        if self.id.is_none() {
            self.id = Some(chunk.id.clone());
            self.model = Some(chunk.model.clone());
        }

        if chunk.usage.is_some() {
            self.usage = chunk.usage;
        }

        let Some(choice) = chunk.choices.first() else {
            return;
        };

        if self.role.is_none() {
            self.role = choice.delta.role.clone();
        }
        if let Some(content) = &choice.delta.content {
            self.content.push_str(content);
        }
        if let Some(reason) = &choice.finish_reason {
            self.finish_reason = Some(reason.clone());
        }
    }

    /// Convert to a final message
    pub fn into_message(self) -> ChatMessage {
        ChatMessage::new(
            self.role.unwrap_or_else(|| ChatMessage::ASSISTANT.to_string()),
            self.content,
        )
    }
}

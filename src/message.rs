//! Chat messages in the shape a chat-completion endpoint accepts.
//!
//! Assistant and system content is always a single string; only user turns carry a list of
//! parts. Keeping that split in [`MessageContent`] means a multi-part assistant message cannot
//! be constructed by accident.

use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Author of a message.
pub enum Role {
    /// Fixed instructions opening every conversation.
    System,
    /// A turn written by the person.
    User,
    /// A turn previously produced by the model.
    Assistant,
}

impl Role {
    #[must_use]
    /// Classifies a heading title.
    ///
    /// The upper-cased title starting with `AI` or `ASSISTANT` makes an assistant turn. This is
    /// a plain prefix test, so "Aiden's question" is an assistant turn too.
    pub fn for_heading(title: &str) -> Self {
        let upper = title.to_uppercase();
        if upper.starts_with("AI") || upper.starts_with("ASSISTANT") {
            Self::Assistant
        } else {
            Self::User
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
/// Body of a message: a flat string or an ordered list of parts.
pub enum MessageContent {
    /// Serialised as a JSON string.
    Text(String),
    /// Serialised as a JSON array of typed parts.
    Parts(Vec<ContentPart>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// One role-tagged turn of the conversation.
pub struct Message {
    /// Who authored the turn.
    pub role: Role,
    /// What was said.
    pub content: MessageContent,
}

impl Message {
    #[must_use]
    /// System message with plain text content.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    #[must_use]
    /// Assistant message with plain text content.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    #[must_use]
    /// User message made of content parts.
    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Reference to an image the endpoint should fetch or decode inline.
pub struct ImageUrl {
    /// A `data:` URL carrying the encoded image.
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// One atomic unit of a multi-modal user message.
pub enum ContentPart {
    /// Literal text.
    Text {
        /// Trimmed text.
        text: String,
    },
    /// A downsized, re-encoded image.
    ImageUrl {
        /// Inline image payload.
        image_url: ImageUrl,
    },
    /// Unmodified image bytes for upload-style APIs.
    ImageBuffer {
        /// MIME type derived from the file extension.
        mime_type: String,
        /// Base name of the source file.
        file_name: String,
        /// Raw file content, base64 encoded on the wire.
        #[serde(serialize_with = "serialize_base64")]
        data: Vec<u8>,
    },
}

impl ContentPart {
    #[must_use]
    /// Text part from anything string-like.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    #[must_use]
    /// The text of a text part, `None` for images.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::ImageUrl { .. } | Self::ImageBuffer { .. } => None,
        }
    }
}

fn serialize_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64_STANDARD.encode(bytes))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Request body for a streaming chat completion.
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Full conversation, system message first.
    pub messages: Vec<Message>,
    /// Whether the reply should be streamed.
    pub stream: bool,
}

#[cfg(test)]
#[path = "tests/message.rs"]
mod tests;

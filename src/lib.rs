//! mdthread: turn a cursor position inside nested markdown headings into a chat conversation.
//!
//! Headings whose title starts with `AI` or `ASSISTANT` are assistant turns, every other
//! heading is a user turn. The chain of headings enclosing the cursor becomes the message
//! list, with embeds inside user turns resolved into text and image content parts.

pub mod config;
pub mod edit_plan;
pub mod error;
pub mod formats;
pub mod heading_index;
pub mod input;
pub mod message;
pub mod parts;
pub mod range;
pub mod raster;
pub mod section;
pub mod thread;
pub mod vault;

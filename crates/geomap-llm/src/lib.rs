//! GeoMap LLM - Generation port, Gemini adapter and query intent resolution
//!
//! This crate defines the port for text generation, the Gemini adapter
//! implementing it, and the resolver that turns a chat message into a
//! structured intent.

pub mod gemini;
pub mod intent;
pub mod ports;

// Re-export main types
pub use gemini::GeminiGenerator;
pub use intent::{build_prompt, parse_reply, IntentResolver};
pub use ports::Generator;

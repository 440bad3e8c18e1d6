//! Shared request/response types for gemexec.
//!
//! `request` holds the outbound generation request, `response` the parsed
//! Gemini `generateContent` payload and the closed `Part` sum type the
//! renderer consumes.

mod request;
mod response;

pub use request::{Capability, GenerationRequest};
pub use response::{
    Candidate, CodeExecutionResult, Content, ExecutableCode, GenerationResponse, Language,
    Outcome, Part, PartError, WirePart,
};

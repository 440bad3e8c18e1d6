//! Core library for gemexec: configuration, the Gemini client, the markdown
//! renderer and the request driver that ties them together.

pub mod config;
pub mod core;
pub mod logging;
pub mod providers;
pub mod render;

//! Session manager for the MRT Moratuwa campus and city assistant.
//!
//! A `ChatSession` keeps an append-only transcript of user and
//! assistant turns and forwards each user message to a hosted text
//! generation service, reconciling the reply (or failure) back into the
//! transcript. The `api` and `cli` modules put it behind HTTP and a
//! terminal REPL.
pub mod ai;
pub mod api;
pub mod cli;
pub mod core;
pub mod gemini;

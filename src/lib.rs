//! hvac-assistant: question answering over HVAC field-service records
//!
//! Sample business records live in SQLite, every row is rendered into a
//! self-contained text chunk, embedded, and stored in a vector index that a
//! retrieval chain searches before asking a language model.

pub mod chain;
pub mod commands;
pub mod config;
pub mod db;
pub mod embed;
pub mod error;
pub mod extract;
pub mod llm;
pub mod progress;
pub mod seed;
pub mod server;
pub mod store;

pub use error::{Error, Result};

//! Gemini API cookbook client.
//!
//! A small async client for the Files, Caches and Models endpoints, a generic
//! readiness poller for resources that process asynchronously, and the
//! runnable cookbook snippets built on top of them.

pub mod caches;
pub mod chats;
pub mod client;
pub mod error;
pub mod files;
pub mod models;
pub mod poller;
mod request;
pub mod snippets;
mod upload;

#[cfg(test)]
mod test_support;

pub use genai_cookbook_types as types;

pub use client::{Client, ClientBuilder, HttpOptions};
pub use error::{Error, Result};
pub use poller::{
    Clock, PollDecision, PollOptions, PollTracker, ProcessingResource, Readiness,
    ReadinessPoller, StatusSource, TokioClock,
};
pub use snippets::Snippets;

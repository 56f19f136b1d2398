//! Shared wire types for the Gemini API cookbook.

mod base64_serde;

pub mod caches;
pub mod config;
pub mod content;
pub mod enums;
pub mod files;
pub mod http;
pub mod models;
pub mod response;

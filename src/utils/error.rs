//! Error types for the lodestone acquisition engine
//!
//! This module defines custom error types used throughout the application.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server error with status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Rate limited (HTTP 429) on every attempt against one crawler backend
    #[error("Retry attempts exhausted while rate limited")]
    RetryExhausted,

    /// Content decoding error
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors that can occur during parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    /// Document could not be classified as any known content kind
    #[error("Unknown or unsupported format")]
    UnknownFormat,

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to extract a site-local identifier from a URL
    #[error("Failed to extract resource code from URL")]
    CodeExtractionFailed,

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),
}

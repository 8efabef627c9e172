// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum EdgarError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode), // e.g., 404 Not Found

    #[error("Request rejected (403) - check that SEC_USER_AGENT is a descriptive identification string")]
    IdentificationRejected, // SEC refuses unidentified or generic clients

    #[error("Retries exhausted after {attempts} attempts for {url}: last status {status}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        status: reqwest::StatusCode,
    },

    #[error("Failed to parse EDGAR response: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("EDGAR interaction failed: {0}")]
    Edgar(#[from] EdgarError), // Automatically convert Edgar errors
}

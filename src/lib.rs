//! Storefront Dashboard Service
//!
//! Back-office revenue reporting for the storefront admin.
//!
//! ## Features
//! - Time-bucketed revenue aggregation (day/week/month/year)
//! - Mixed VND/JPY revenue totals
//! - Locale-aware chart labels (vi/ja)
//! - Validated order-listing client
//! - Domain event channel for snapshot invalidation

use thiserror::Error;

pub mod client;
pub mod domain;
pub mod report;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Order API request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Invalid order API response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

//! Thin client for the external order-listing endpoint.
//!
//! The endpoint is a black box returning JSON; everything it serves goes
//! through the [`parse_orders`] validation boundary before any other code
//! sees it.

use serde_json::Value;

use crate::domain::order::{parse_orders, OrderRecord};
use crate::Result;

/// The caller fetches at most one page of orders per pass.
pub const ORDER_PAGE_LIMIT: u32 = 1000;

#[derive(Clone, Debug)]
pub struct OrderApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl OrderApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch one page of up to [`ORDER_PAGE_LIMIT`] orders.
    pub async fn fetch_orders(&self) -> Result<Vec<OrderRecord>> {
        let url = format!("{}/orders", self.base_url.trim_end_matches('/'));
        let body: Value = self
            .http
            .get(&url)
            .query(&[("limit", ORDER_PAGE_LIMIT)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let orders = parse_orders(&body)?;
        tracing::debug!(count = orders.len(), "Fetched order page");
        Ok(orders)
    }
}

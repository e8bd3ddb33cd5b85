//! Token sources feeding column refreshes.
//!
//! The dashboard has no backend; `MockTokenSource` stands in for one by
//! waiting out a fixed latency and generating a fresh collection.

use crate::feed::generator::generate_tokens;
use crate::feed::types::FeedConfig;
use crate::types::Token;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Loads a full replacement collection for a column.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn load(&self, count: usize) -> Result<Vec<Token>>;
}

/// Generated tokens after a simulated network delay. Never fails.
#[derive(Debug, Clone)]
pub struct MockTokenSource {
    latency: Duration,
}

impl MockTokenSource {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(config.refresh_latency())
    }
}

#[async_trait]
impl TokenSource for MockTokenSource {
    #[instrument(skip(self))]
    async fn load(&self, count: usize) -> Result<Vec<Token>> {
        tokio::time::sleep(self.latency).await;
        let tokens = generate_tokens(count);
        debug!("Generated {} tokens", tokens.len());
        Ok(tokens)
    }
}

//! PulseGrid - the three side-by-side columns of the dashboard.

use crate::feed::column::{ColumnSession, ColumnView};
use crate::feed::types::FeedConfig;
use crate::types::ColumnKind;
use anyhow::Result;
use serde::Serialize;
use tracing::info;

/// Connectivity badge shown in the grid header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Live,
    Disconnected,
}

impl ConnectionStatus {
    pub fn from_connected(connected: bool) -> Self {
        if connected {
            ConnectionStatus::Live
        } else {
            ConnectionStatus::Disconnected
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Live => "Live",
            ConnectionStatus::Disconnected => "Disconnected",
        }
    }

    pub fn tooltip(&self) -> &'static str {
        match self {
            ConnectionStatus::Live => "Receiving real-time price updates",
            ConnectionStatus::Disconnected => "Connection lost. Click refresh to reconnect.",
        }
    }
}

/// New Pairs, Final Stretch and Migrated, each fully independent.
pub struct PulseGrid {
    new_pairs: ColumnSession,
    final_stretch: ColumnSession,
    migrated: ColumnSession,
}

impl PulseGrid {
    pub fn new(config: FeedConfig) -> Result<Self> {
        Ok(Self {
            new_pairs: ColumnSession::new(ColumnKind::NewPairs, config.clone())?,
            final_stretch: ColumnSession::new(ColumnKind::FinalStretch, config.clone())?,
            migrated: ColumnSession::new(ColumnKind::Migrated, config)?,
        })
    }

    pub fn from_columns(
        new_pairs: ColumnSession,
        final_stretch: ColumnSession,
        migrated: ColumnSession,
    ) -> Self {
        Self {
            new_pairs,
            final_stretch,
            migrated,
        }
    }

    pub fn column(&self, kind: ColumnKind) -> &ColumnSession {
        match kind {
            ColumnKind::NewPairs => &self.new_pairs,
            ColumnKind::FinalStretch => &self.final_stretch,
            ColumnKind::Migrated => &self.migrated,
        }
    }

    pub fn column_mut(&mut self, kind: ColumnKind) -> &mut ColumnSession {
        match kind {
            ColumnKind::NewPairs => &mut self.new_pairs,
            ColumnKind::FinalStretch => &mut self.final_stretch,
            ColumnKind::Migrated => &mut self.migrated,
        }
    }

    pub async fn start(&mut self) {
        self.new_pairs.start().await;
        self.final_stretch.start().await;
        self.migrated.start().await;
        info!("Pulse grid started");
    }

    /// Kick off a refresh in every column. Returns once all are loading.
    pub async fn refresh_all(&mut self) {
        tokio::join!(
            self.new_pairs.refresh(),
            self.final_stretch.refresh(),
            self.migrated.refresh(),
        );
    }

    /// Wait for every column's in-flight refresh to land.
    pub async fn wait_for_refresh(&mut self) {
        tokio::join!(
            self.new_pairs.wait_for_refresh(),
            self.final_stretch.wait_for_refresh(),
            self.migrated.wait_for_refresh(),
        );
    }

    /// Connected only while every column's simulator is.
    pub fn is_connected(&self) -> bool {
        self.new_pairs.is_connected()
            && self.final_stretch.is_connected()
            && self.migrated.is_connected()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        ConnectionStatus::from_connected(self.is_connected())
    }

    pub async fn views(&self) -> Vec<ColumnView> {
        vec![
            self.new_pairs.view().await,
            self.final_stretch.view().await,
            self.migrated.view().await,
        ]
    }

    pub async fn shutdown(&mut self) {
        self.new_pairs.shutdown().await;
        self.final_stretch.shutdown().await;
        self.migrated.shutdown().await;
        info!("Pulse grid shut down");
    }
}

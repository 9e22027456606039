use crate::types::{ClusterLabel, ZoneId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CorridorError>;

#[derive(Error, Debug)]
pub enum CorridorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Label space exhausted: {clusters} clusters but only {capacity} labels available")]
    LabelSpaceExhausted { clusters: usize, capacity: usize },

    #[error("Invalid zone {zone}: {reason}")]
    InvalidZone { zone: ZoneId, reason: String },

    #[error("Duplicate zone identifier: {0}")]
    DuplicateZone(ZoneId),

    #[error("Unknown zone: {0}")]
    UnknownZone(ZoneId),

    #[error("Cluster network is disconnected into {} components: {}", components.len(), render_components(components))]
    Disconnected { components: Vec<Vec<ClusterLabel>> },

    #[error("Path {pair} references a cluster outside the registry of {clusters} clusters")]
    ForeignPair { pair: String, clusters: usize },

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CorridorError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn invalid_zone(zone: ZoneId, reason: impl Into<String>) -> Self {
        Self::InvalidZone {
            zone,
            reason: reason.into(),
        }
    }

    /// Configuration-class failures abort the pipeline before any work starts.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_)
                | Self::LabelSpaceExhausted { .. }
                | Self::InvalidZone { .. }
                | Self::DuplicateZone(_)
        )
    }
}

fn render_components(components: &[Vec<ClusterLabel>]) -> String {
    components
        .iter()
        .map(|component| {
            let labels: Vec<&str> = component.iter().map(ClusterLabel::as_str).collect();
            format!("{{{}}}", labels.join(", "))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

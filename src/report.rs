//! JSON statistics document embedded by the dashboard.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use oceanwatch_types::{current_timestamp_ms, SCHEMA_VERSION};

use crate::engine::Inference;

/// Active component counts and identities for one inference run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub active_wavys: usize,
    pub active_aggregators: usize,
    pub active_wavys_list: Vec<String>,
    pub active_aggregators_list: Vec<String>,
    /// Which path produced the result ("management-api", "direct-probe" or
    /// "unavailable").
    pub tier: String,
    /// Unix timestamp in milliseconds.
    pub last_updated: u64,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackReasons>,
}

/// Why tiers were skipped on the way to the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackReasons {
    pub management: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe: Option<String>,
}

impl StatisticsReport {
    pub fn from_inference(inference: &Inference) -> Self {
        Self::at(inference, current_timestamp_ms())
    }

    fn at(inference: &Inference, last_updated: u64) -> Self {
        let result = &inference.result;
        let fallback = inference
            .management_error
            .as_ref()
            .map(|management| FallbackReasons {
                management: management.to_string(),
                probe: inference.probe_error.as_ref().map(ToString::to_string),
            });

        Self {
            active_wavys: result.sensor_unit_count(),
            active_aggregators: result.aggregator_count(),
            active_wavys_list: result.active_sensor_units.iter().cloned().collect(),
            active_aggregators_list: result.active_aggregators.iter().cloned().collect(),
            tier: result.tier.label().to_string(),
            last_updated,
            version: SCHEMA_VERSION,
            fallback,
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Write the report to `path`, replacing any existing file.
    pub fn export(&self, path: &Path, pretty: bool) -> Result<()> {
        let mut file = std::fs::File::create(path)?;
        writeln!(file, "{}", self.to_json(pretty)?)?;
        Ok(())
    }
}

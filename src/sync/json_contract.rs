use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

use super::Envelope;

pub const SYNC_ENVELOPE_JSON_SCHEMA_V1: u32 = 1;

/// Versioned wire form of [`Envelope`] for relays across process or frame
/// boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEnvelopeJsonContractV1 {
    pub schema_version: u32,
    pub envelope: Envelope,
}

impl Envelope {
    pub fn to_json_contract_v1(&self) -> ChartResult<String> {
        let payload = SyncEnvelopeJsonContractV1 {
            schema_version: SYNC_ENVELOPE_JSON_SCHEMA_V1,
            envelope: self.clone(),
        };
        serde_json::to_string(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize sync envelope contract v1: {e}"))
        })
    }

    /// Accepts a bare envelope or a versioned v1 contract.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if let Ok(envelope) = serde_json::from_str::<Envelope>(input) {
            return Ok(envelope);
        }
        let payload: SyncEnvelopeJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse sync envelope json payload: {e}"))
        })?;
        if payload.schema_version != SYNC_ENVELOPE_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported sync envelope schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.envelope)
    }
}

//! Feed Types
//!
//! Data structures shared by every pipeline stage. No pipeline logic here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rules::{ProtocolCategory, RiskTier};
use crate::constants::{BLACKLISTED_MARKER, UNSPECIFIED_REASON};

// ============================================================================
// RAW FLOW (wire format)
// ============================================================================

/// One object of the upstream JSON array, exactly as delivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFlow {
    pub source_ip: Option<String>,
    pub dest_ip: Option<String>,
    pub protocol: Option<String>,
    pub port: Option<PortToken>,
    pub packets: Option<u64>,
    pub bytes: Option<u64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub action: String,
    pub is_malicious: Option<bool>,
    pub malicious_reason: Option<String>,
    pub blacklisted: Option<BlacklistValue>,
}

/// Upstream sends ports either as numbers or as composite text ("80,443").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortToken {
    Number(u64),
    Text(String),
}

impl PortToken {
    pub fn into_text(self) -> String {
        match self {
            PortToken::Number(n) => n.to_string(),
            PortToken::Text(s) => s.trim().to_string(),
        }
    }
}

/// `blacklisted` is either a free-text annotation or a bare flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlacklistValue {
    Flag(bool),
    Note(String),
}

impl BlacklistValue {
    pub fn into_marker(self) -> Option<String> {
        match self {
            BlacklistValue::Flag(true) => Some(BLACKLISTED_MARKER.to_string()),
            BlacklistValue::Flag(false) => None,
            BlacklistValue::Note(note) => {
                let note = note.trim();
                (!note.is_empty()).then(|| note.to_string())
            }
        }
    }
}

// ============================================================================
// VERDICT
// ============================================================================

/// Malicious verdict. The reason cannot exist without the flag, nor the
/// flag without a reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "VerdictWire", from = "VerdictWire")]
pub enum Verdict {
    Benign,
    Malicious { reason: String },
}

impl Verdict {
    pub fn is_malicious(&self) -> bool {
        matches!(self, Verdict::Malicious { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Benign => None,
            Verdict::Malicious { reason } => Some(reason),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct VerdictWire {
    is_malicious: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    malicious_reason: Option<String>,
}

impl From<Verdict> for VerdictWire {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Benign => VerdictWire {
                is_malicious: false,
                malicious_reason: None,
            },
            Verdict::Malicious { reason } => VerdictWire {
                is_malicious: true,
                malicious_reason: Some(reason),
            },
        }
    }
}

impl From<VerdictWire> for Verdict {
    fn from(wire: VerdictWire) -> Self {
        if !wire.is_malicious {
            return Verdict::Benign;
        }
        let reason = wire
            .malicious_reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| UNSPECIFIED_REASON.to_string());
        Verdict::Malicious { reason }
    }
}

// ============================================================================
// FLOW RECORD
// ============================================================================

/// A validated, classified flow. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub source_ip: String,
    pub dest_ip: String,
    pub protocol: String,
    pub port: String,
    pub packets: u64,
    pub bytes: u64,
    pub status: String,
    pub action: String,
    pub category: ProtocolCategory,
    pub risk_tier: RiskTier,
    #[serde(flatten)]
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blacklisted: Option<String>,
}

impl FlowRecord {
    pub fn is_malicious(&self) -> bool {
        self.verdict.is_malicious()
    }
}

/// A flow with its position in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedFlow {
    pub sequence_id: u64,
    #[serde(flatten)]
    pub record: FlowRecord,
}

impl IdentifiedFlow {
    pub fn is_malicious(&self) -> bool {
        self.record.is_malicious()
    }
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Every flow known at one instant, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedSnapshot {
    /// 0 for the initial empty snapshot, +1 per refresh
    pub generation: u64,
    /// When the poll that produced this snapshot completed
    pub refreshed_at: Option<DateTime<Utc>>,
    pub flows: Vec<IdentifiedFlow>,
}

impl FeedSnapshot {
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn get(&self, sequence_id: u64) -> Option<&IdentifiedFlow> {
        self.flows.iter().find(|f| f.sequence_id == sequence_id)
    }

    pub fn malicious_count(&self) -> usize {
        self.flows.iter().filter(|f| f.is_malicious()).count()
    }
}

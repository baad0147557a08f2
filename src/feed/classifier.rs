//! Flow Classifier
//!
//! Only classify logic - types live in `types`, thresholds in `rules`.
//! Input: RawFlow
//! Output: Classification, or a validated FlowRecord

use serde::Serialize;

use super::rules::{ProtocolCategory, RiskThresholds, RiskTier};
use super::types::{FlowRecord, RawFlow, Verdict};
use crate::constants::UNSPECIFIED_REASON;
use crate::error::ClassificationError;

/// Result of classifying one flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: ProtocolCategory,
    pub risk_tier: RiskTier,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    thresholds: RiskThresholds,
}

impl Classifier {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    /// Deterministic and side-effect free.
    pub fn classify(&self, raw: &RawFlow) -> Classification {
        Classification {
            category: categorize(raw.protocol.as_deref().unwrap_or_default()),
            risk_tier: self.thresholds.tier_for(raw.packets.unwrap_or(0)),
            verdict: verdict_for(raw.is_malicious, raw.malicious_reason.as_deref()),
        }
    }

    /// Validate required fields and attach the classification.
    pub fn build(&self, raw: RawFlow) -> Result<FlowRecord, ClassificationError> {
        let Classification { category, risk_tier, verdict } = self.classify(&raw);

        Ok(FlowRecord {
            source_ip: required_text(raw.source_ip, "source_ip")?,
            dest_ip: required_text(raw.dest_ip, "dest_ip")?,
            protocol: required_text(raw.protocol, "protocol")?.to_uppercase(),
            port: raw
                .port
                .map(|p| p.into_text())
                .filter(|p| !p.is_empty())
                .ok_or(ClassificationError::MissingField("port"))?,
            packets: raw.packets.ok_or(ClassificationError::MissingField("packets"))?,
            bytes: raw.bytes.ok_or(ClassificationError::MissingField("bytes"))?,
            status: raw.status,
            action: raw.action,
            category,
            risk_tier,
            verdict,
            blacklisted: raw.blacklisted.and_then(|b| b.into_marker()),
        })
    }
}

/// Protocol token -> category. Tolerates decorated tokens like "TCP (ack)".
pub fn categorize(protocol: &str) -> ProtocolCategory {
    let upper = protocol.trim().to_uppercase();
    let token = upper.split(' ').next().unwrap_or_default();
    ProtocolCategory::from_token(token)
}

fn verdict_for(flag: Option<bool>, reason: Option<&str>) -> Verdict {
    if flag != Some(true) {
        return Verdict::Benign;
    }
    let reason = reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(UNSPECIFIED_REASON);
    Verdict::Malicious {
        reason: reason.to_string(),
    }
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, ClassificationError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ClassificationError::MissingField(field))
}

// ============================================================================
// TESTS
// ============================================================================

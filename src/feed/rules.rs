//! Classification Rules & Thresholds
//!
//! Closed protocol mapping, risk tiers and their configurable thresholds.
//! No classify logic here - only types and config.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RISK_HIGH_PACKETS, DEFAULT_RISK_MODERATE_PACKETS};
use crate::error::ConfigError;

// ============================================================================
// PROTOCOL CATEGORY
// ============================================================================

/// Protocol grouping of a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolCategory {
    Tcp,
    Udp,
    Icmp,
    Dns,
    Http,
    Https,
    Ssh,
    Arp,
    Unclassified,
}

impl ProtocolCategory {
    pub const ALL: [ProtocolCategory; 9] = [
        ProtocolCategory::Tcp,
        ProtocolCategory::Udp,
        ProtocolCategory::Icmp,
        ProtocolCategory::Dns,
        ProtocolCategory::Http,
        ProtocolCategory::Https,
        ProtocolCategory::Ssh,
        ProtocolCategory::Arp,
        ProtocolCategory::Unclassified,
    ];

    /// Map an upper-cased protocol token. Unknown tokens are `Unclassified`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "TCP" => ProtocolCategory::Tcp,
            "UDP" => ProtocolCategory::Udp,
            "ICMP" | "ICMPV6" => ProtocolCategory::Icmp,
            "DNS" => ProtocolCategory::Dns,
            "HTTP" => ProtocolCategory::Http,
            "HTTPS" | "TLS" => ProtocolCategory::Https,
            "SSH" => ProtocolCategory::Ssh,
            "ARP" => ProtocolCategory::Arp,
            _ => ProtocolCategory::Unclassified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolCategory::Tcp => "tcp",
            ProtocolCategory::Udp => "udp",
            ProtocolCategory::Icmp => "icmp",
            ProtocolCategory::Dns => "dns",
            ProtocolCategory::Http => "http",
            ProtocolCategory::Https => "https",
            ProtocolCategory::Ssh => "ssh",
            ProtocolCategory::Arp => "arp",
            ProtocolCategory::Unclassified => "unclassified",
        }
    }
}

impl std::fmt::Display for ProtocolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RISK TIER
// ============================================================================

/// Coarse severity bucket derived from packet volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    Normal,
    Moderate,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Normal, RiskTier::Moderate, RiskTier::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Normal => "Normal",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CONFIGURABLE THRESHOLDS
// ============================================================================

/// Packet-count thresholds for risk tiers. Both bounds are exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Above this = High
    pub high_above: u64,
    /// Above this = Moderate, otherwise Normal
    pub moderate_above: u64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high_above: DEFAULT_RISK_HIGH_PACKETS,
            moderate_above: DEFAULT_RISK_MODERATE_PACKETS,
        }
    }
}

impl RiskThresholds {
    /// High sensitivity - lower thresholds, more flows flagged
    pub fn high_sensitivity() -> Self {
        Self {
            high_above: 500,
            moderate_above: 200,
        }
    }

    /// Low sensitivity - higher thresholds, fewer flows flagged
    pub fn low_sensitivity() -> Self {
        Self {
            high_above: 5_000,
            moderate_above: 2_000,
        }
    }

    /// Named preset: `default`, `high` or `low` (case-insensitive).
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" | "" => Some(Self::default()),
            "high" => Some(Self::high_sensitivity()),
            "low" => Some(Self::low_sensitivity()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.moderate_above >= self.high_above {
            return Err(ConfigError::RiskThresholds {
                moderate: self.moderate_above,
                high: self.high_above,
            });
        }
        Ok(())
    }

    pub fn tier_for(&self, packets: u64) -> RiskTier {
        if packets > self.high_above {
            RiskTier::High
        } else if packets > self.moderate_above {
            RiskTier::Moderate
        } else {
            RiskTier::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_are_exclusive() {
        let t = RiskThresholds::default();
        assert_eq!(t.tier_for(1001), RiskTier::High);
        assert_eq!(t.tier_for(1000), RiskTier::Moderate);
        assert_eq!(t.tier_for(501), RiskTier::Moderate);
        assert_eq!(t.tier_for(500), RiskTier::Normal);
        assert_eq!(t.tier_for(0), RiskTier::Normal);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(RiskThresholds::default().validate().is_ok());
        assert!(RiskThresholds::high_sensitivity().validate().is_ok());
        assert!(RiskThresholds::low_sensitivity().validate().is_ok());
    }

    #[test]
    fn test_named_presets() {
        assert_eq!(RiskThresholds::preset("High"), Some(RiskThresholds::high_sensitivity()));
        assert_eq!(RiskThresholds::preset(" low "), Some(RiskThresholds::low_sensitivity()));
        assert_eq!(RiskThresholds::preset("default"), Some(RiskThresholds::default()));
        assert_eq!(RiskThresholds::preset("paranoid"), None);
    }

    #[test]
    fn test_unknown_token_is_unclassified() {
        assert_eq!(ProtocolCategory::from_token("QUIC"), ProtocolCategory::Unclassified);
        assert_eq!(ProtocolCategory::from_token(""), ProtocolCategory::Unclassified);
    }
}

//! View Query Engine
//!
//! Read-only projection of a snapshot: text filter, malicious-only toggle,
//! malicious-first ordering and a pagination window.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rules::{ProtocolCategory, RiskTier};
use super::types::{FeedSnapshot, IdentifiedFlow};
use crate::constants::DEFAULT_PAGE_SIZE;
use crate::error::QuerySpecError;

// ============================================================================
// QUERY SPEC
// ============================================================================

/// One view request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuerySpec {
    pub filter_text: String,
    pub malicious_only: bool,
    pub offset: i64,
    pub limit: i64,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            filter_text: String::new(),
            malicious_only: false,
            offset: 0,
            limit: DEFAULT_PAGE_SIZE as i64,
        }
    }
}

impl QuerySpec {
    /// 1-based page number window
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            offset: i64::from(page.saturating_sub(1)) * i64::from(per_page),
            limit: i64::from(per_page),
            ..Default::default()
        }
    }

    /// "Show the first `count`" window, grown by load-more
    pub fn visible(count: u32) -> Self {
        Self {
            offset: 0,
            limit: i64::from(count),
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, text: impl Into<String>) -> Self {
        self.filter_text = text.into();
        self
    }

    pub fn malicious_only(mut self, on: bool) -> Self {
        self.malicious_only = on;
        self
    }

    fn window(&self, max_limit: usize) -> Result<(usize, usize), QuerySpecError> {
        if self.offset < 0 {
            return Err(QuerySpecError::NegativeOffset(self.offset));
        }
        if self.limit < 1 {
            return Err(QuerySpecError::LimitTooSmall(self.limit));
        }
        if self.limit as u64 > max_limit as u64 {
            return Err(QuerySpecError::LimitTooLarge {
                requested: self.limit,
                max: max_limit,
            });
        }
        Ok((self.offset as usize, self.limit as usize))
    }
}

// ============================================================================
// QUERY PAGE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPage {
    pub items: Vec<IdentifiedFlow>,
    pub total_matched: usize,
    pub has_more: bool,
    pub offset: usize,
    /// Offset of the following page, for load-more
    pub next_offset: Option<usize>,
    /// Snapshot the page was cut from
    pub generation: u64,
}

// ============================================================================
// ENGINE
// ============================================================================

#[derive(Debug, Clone)]
pub struct QueryEngine {
    max_limit: usize,
}

impl QueryEngine {
    pub fn new(max_limit: usize) -> Self {
        Self { max_limit }
    }

    pub fn run(&self, snapshot: &FeedSnapshot, spec: &QuerySpec) -> Result<QueryPage, QuerySpecError> {
        let (offset, limit) = spec.window(self.max_limit)?;
        let needle = spec.filter_text.trim().to_lowercase();

        let mut matched: Vec<&IdentifiedFlow> = snapshot
            .flows
            .iter()
            .filter(|flow| matches_text(flow, &needle))
            .filter(|flow| !spec.malicious_only || flow.is_malicious())
            .collect();

        if !spec.malicious_only {
            // Stable: recency order survives among equal keys
            matched.sort_by_key(|flow| !flow.is_malicious());
        }

        let total_matched = matched.len();
        let items: Vec<IdentifiedFlow> = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        let end = offset.saturating_add(items.len());
        let has_more = end < total_matched;

        Ok(QueryPage {
            items,
            total_matched,
            has_more,
            offset,
            next_offset: has_more.then_some(end),
            generation: snapshot.generation,
        })
    }
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_MAX_PAGE_SIZE)
    }
}

/// Case-insensitive substring over source ip, dest ip, protocol and port.
/// `needle` must already be lower-cased; empty matches everything.
fn matches_text(flow: &IdentifiedFlow, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let record = &flow.record;
    [&record.source_ip, &record.dest_ip, &record.protocol, &record.port]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Aggregate counts for dashboard cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub generation: u64,
    pub total: usize,
    pub malicious: usize,
    pub blacklisted: usize,
    pub by_category: BTreeMap<ProtocolCategory, usize>,
    pub by_risk_tier: BTreeMap<RiskTier, usize>,
}

pub fn summarize(snapshot: &FeedSnapshot) -> SnapshotSummary {
    let mut by_category: BTreeMap<ProtocolCategory, usize> =
        ProtocolCategory::ALL.iter().map(|category| (*category, 0)).collect();
    let mut by_risk_tier: BTreeMap<RiskTier, usize> =
        RiskTier::ALL.iter().map(|tier| (*tier, 0)).collect();

    for flow in &snapshot.flows {
        *by_category.entry(flow.record.category).or_insert(0) += 1;
        *by_risk_tier.entry(flow.record.risk_tier).or_insert(0) += 1;
    }

    SnapshotSummary {
        generation: snapshot.generation,
        total: snapshot.len(),
        malicious: snapshot.malicious_count(),
        blacklisted: snapshot.flows.iter().filter(|f| f.record.blacklisted.is_some()).count(),
        by_category,
        by_risk_tier,
    }
}

// ============================================================================
// TESTS
// ============================================================================

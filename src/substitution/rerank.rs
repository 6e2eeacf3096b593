//! Optional re-ranking of already valid candidates by an injected collaborator
//! (typically a language model). Best effort: it may reorder and annotate, it
//! never adds or removes candidates.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{MacroProfile, Portion, SubstitutionCandidate, UserPreferences};
use crate::substitution::constants::RERANK_MAX_BOOST;

/// One candidate as the re-ranker sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankItem {
    pub index: usize,
    pub food_id: String,
    pub name: String,
    pub suggested_portion: Portion,
    pub macros: MacroProfile,
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankRequest {
    pub original_name: String,
    pub original_portion: Portion,
    pub original_macros: MacroProfile,
    pub preferences: UserPreferences,
    pub candidates: Vec<RerankItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankEntry {
    /// 1-based rank the re-ranker assigns.
    pub position: usize,
    /// Index into `RerankRequest::candidates`.
    pub original_index: usize,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RerankResponse {
    pub order: Vec<RerankEntry>,
    #[serde(default)]
    pub insights: Option<String>,
}

#[async_trait]
pub trait Reranker: Send + Sync {
    async fn rerank(&self, request: RerankRequest) -> Result<RerankResponse>;
}

/// Build the request for the first `top_n` candidates.
pub fn build_request(
    original_name: &str,
    original_portion: Portion,
    original_macros: MacroProfile,
    preferences: UserPreferences,
    candidates: &[SubstitutionCandidate],
    top_n: usize,
) -> RerankRequest {
    RerankRequest {
        original_name: original_name.to_string(),
        original_portion,
        original_macros,
        preferences,
        candidates: candidates
            .iter()
            .take(top_n)
            .enumerate()
            .map(|(index, c)| RerankItem {
                index,
                food_id: c.food.id.clone(),
                name: c.food.name.clone(),
                suggested_portion: c.suggested_portion,
                macros: c.macros,
                score: c.score,
                reason: c.reason.clone(),
            })
            .collect(),
    }
}

/// Boost for a 1-based position among `ranked` valid entries.
fn position_boost(position: usize, ranked: usize) -> f64 {
    if ranked == 0 || position == 0 {
        return 0.0;
    }
    RERANK_MAX_BOOST * (ranked + 1 - position.min(ranked)) as f64 / ranked as f64
}

/// Fold a re-ranker response into the candidates.
///
/// Entries pointing outside `sent` candidates, repeating an index, or with a
/// zero position are ignored. Valid entries are ordered by position and
/// boosted by rank, their reasoning is appended to the reason, and the list is
/// stably re-sorted by score. Returns how many candidates were boosted.
pub fn apply_response(
    candidates: &mut [SubstitutionCandidate],
    sent: usize,
    response: &RerankResponse,
) -> usize {
    let sent = sent.min(candidates.len());
    let mut seen = HashSet::new();
    let mut valid: Vec<&RerankEntry> = response
        .order
        .iter()
        .filter(|e| e.position > 0 && e.original_index < sent)
        .filter(|e| seen.insert(e.original_index))
        .collect();
    valid.sort_by_key(|e| e.position);

    let ranked = valid.len();
    for (rank, entry) in valid.iter().enumerate() {
        let boost = position_boost(rank + 1, ranked);
        let candidate = &mut candidates[entry.original_index];
        candidate.breakdown.rerank_boost = boost;
        candidate.score += boost;
        let reasoning = entry.reasoning.trim();
        if !reasoning.is_empty() {
            candidate.reason = format!("{}; {}", candidate.reason, reasoning);
        }
    }

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

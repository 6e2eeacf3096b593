use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{Result, SwapError};
use crate::models::{
    FoodItem, MacroProfile, Portion, SubstitutionCandidate, SubstitutionConstraints,
    SubstitutionMetadata, SubstitutionResult, UserPreferences,
};
use crate::nutrition::macros_for_portion;
use crate::resolver::FoodResolver;
use crate::substitution::constants::{DEFAULT_RERANK_TIMEOUT, DEFAULT_RERANK_TOP_N};
use crate::substitution::filters::rejection_reason;
use crate::substitution::rerank::{Reranker, apply_response, build_request};
use crate::substitution::scoring::{build_reason, compare_macros, optimize_portion, score_candidate};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound for the re-ranker call.
    pub rerank_timeout: Duration,
    /// Candidates sent to the re-ranker, best first.
    pub rerank_top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rerank_timeout: DEFAULT_RERANK_TIMEOUT,
            rerank_top_n: DEFAULT_RERANK_TOP_N,
        }
    }
}

/// Finds foods that can replace a given portion of another food.
///
/// Pipeline: discover, filter, size the portion, gate on macro deviation,
/// score, sort, truncate, then optionally re-rank.
pub struct SubstitutionEngine {
    resolver: Arc<FoodResolver>,
    reranker: Option<Arc<dyn Reranker>>,
    config: EngineConfig,
}

impl SubstitutionEngine {
    pub fn new(resolver: Arc<FoodResolver>) -> Self {
        Self {
            resolver,
            reranker: None,
            config: EngineConfig::default(),
        }
    }

    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Ranked substitutions for `portion` of `food_id`.
    ///
    /// Fails with `Validation` for bad constraints or portion, `NotFound` when
    /// the original cannot be resolved and `UnitConversion` when its portion
    /// cannot be converted. Individual candidates that fail are skipped.
    pub async fn find_substitutions(
        &self,
        food_id: &str,
        portion: Portion,
        constraints: Option<SubstitutionConstraints>,
    ) -> Result<SubstitutionResult> {
        let started = Instant::now();
        let constraints = constraints.unwrap_or_default();
        constraints.validate()?;
        portion.validate()?;

        let original = self
            .resolver
            .get_by_id(food_id)
            .await?
            .ok_or_else(|| SwapError::NotFound(food_id.to_string()))?;
        let original_macros = macros_for_portion(&original, &portion)?;
        let prefs = constraints.preferences();

        debug!(
            food_id,
            portion = %portion,
            macros = %original_macros.debug_string(),
            "searching substitutions"
        );

        let pool = self
            .resolver
            .all_foods(constraints.include_external_sources, Some(&original.name))
            .await;
        let original_key = original.key();

        let mut evaluated = 0;
        let mut candidates: Vec<SubstitutionCandidate> = pool
            .into_iter()
            .filter(|f| f.id != original.id && f.key() != original_key)
            .inspect(|_| evaluated += 1)
            .filter_map(|food| self.evaluate(food, &original_macros, &constraints, &prefs))
            .collect();

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(constraints.max_suggestions);

        let (reranked, rerank_insights) = self
            .rerank(&original, portion, original_macros, prefs, &mut candidates)
            .await;

        let elapsed = started.elapsed().as_millis();
        let processing_time_ms = u64::try_from(elapsed).unwrap_or(u64::MAX);
        info!(
            food_id,
            evaluated,
            suggestions = candidates.len(),
            reranked,
            processing_time_ms,
            "substitution search finished"
        );

        Ok(SubstitutionResult {
            has_viable_substitutions: !candidates.is_empty(),
            original_food: original,
            original_portion: portion,
            original_macros,
            candidates,
            metadata: SubstitutionMetadata {
                total_candidates_evaluated: evaluated,
                processing_time_ms,
                constraints_applied: constraints,
                reranked,
                rerank_insights,
            },
        })
    }

    /// Filter, size and score a single food; `None` when it does not qualify.
    fn evaluate(
        &self,
        food: FoodItem,
        original_macros: &MacroProfile,
        constraints: &SubstitutionConstraints,
        prefs: &UserPreferences,
    ) -> Option<SubstitutionCandidate> {
        if let Some(reason) = rejection_reason(&food, constraints.min_confidence, prefs) {
            debug!(food_id = %food.id, reason = %reason, "candidate filtered");
            return None;
        }

        let suggested_portion = optimize_portion(&food, original_macros.calories_kcal);
        let macros = match macros_for_portion(&food, &suggested_portion) {
            Ok(macros) => macros,
            Err(e) => {
                debug!(food_id = %food.id, error = %e, "candidate skipped");
                return None;
            }
        };

        let comparison = compare_macros(original_macros, &macros);
        if comparison.overall > constraints.macro_tolerance_percent {
            debug!(
                food_id = %food.id,
                overall = comparison.overall,
                tolerance = constraints.macro_tolerance_percent,
                "candidate outside tolerance"
            );
            return None;
        }

        let (score, breakdown) = score_candidate(&food, &comparison, prefs);
        let reason = build_reason(&food, &comparison);
        Some(SubstitutionCandidate {
            food,
            suggested_portion,
            macros,
            comparison,
            score,
            breakdown,
            reason,
        })
    }

    /// Run the re-ranker, if any, leaving `candidates` untouched on failure.
    async fn rerank(
        &self,
        original: &FoodItem,
        portion: Portion,
        original_macros: MacroProfile,
        prefs: UserPreferences,
        candidates: &mut [SubstitutionCandidate],
    ) -> (bool, Option<String>) {
        let Some(reranker) = &self.reranker else {
            return (false, None);
        };
        if candidates.is_empty() || self.config.rerank_top_n == 0 {
            return (false, None);
        }

        let request = build_request(
            &original.name,
            portion,
            original_macros,
            prefs,
            candidates,
            self.config.rerank_top_n,
        );
        let sent = request.candidates.len();

        let call = reranker.rerank(request);
        match tokio::time::timeout(self.config.rerank_timeout, call).await {
            Ok(Ok(response)) => {
                let boosted = apply_response(candidates, sent, &response);
                debug!(sent, boosted, "re-ranking applied");
                (boosted > 0, response.insights)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "re-ranker failed, keeping deterministic order");
                (false, None)
            }
            Err(_) => {
                warn!(
                    timeout = ?self.config.rerank_timeout,
                    "re-ranker timed out, keeping deterministic order"
                );
                (false, None)
            }
        }
    }
}

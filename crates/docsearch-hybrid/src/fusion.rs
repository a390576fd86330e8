//! Result fusion algorithms.
//!
//! Every function here is pure: it consumes ranked lists and returns a new
//! list sorted by non-increasing score with ranks 1..N assigned.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use docsearch_config::{FusionConfig, FusionMethod};
use docsearch_protocols::{ChunkKey, DocumentChunk, SearchResult, assign_ranks};

/// A chunk seen in either input list, with its 1-based position and score
/// on each side.
struct Candidate {
    chunk: Arc<DocumentChunk>,
    dense: Option<(usize, f32)>,
    sparse: Option<(usize, f32)>,
}

/// Merge both lists by chunk identity, in first-encountered order (dense
/// list first). A chunk repeated within one list counts once, at its first
/// position.
fn collect_candidates(dense: &[SearchResult], sparse: &[SearchResult]) -> Vec<Candidate> {
    let mut positions: HashMap<ChunkKey, usize> = HashMap::new();
    let mut candidates: Vec<Candidate> = Vec::with_capacity(dense.len() + sparse.len());

    for (from_dense, list) in [(true, dense), (false, sparse)] {
        for (position, result) in list.iter().enumerate() {
            let slot = *positions.entry(result.key()).or_insert_with(|| {
                candidates.push(Candidate {
                    chunk: result.chunk.clone(),
                    dense: None,
                    sparse: None,
                });
                candidates.len() - 1
            });

            let side = if from_dense {
                &mut candidates[slot].dense
            } else {
                &mut candidates[slot].sparse
            };
            if side.is_none() {
                *side = Some((position + 1, result.score));
            }
        }
    }

    candidates
}

/// NaN orders below every real score.
fn sort_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

/// Stable sort by descending score, cap, then assign ranks.
fn finish(mut results: Vec<SearchResult>, max_results: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| sort_key(b.score).total_cmp(&sort_key(a.score)));
    results.truncate(max_results);
    assign_ranks(&mut results);
    results
}

/// Reciprocal Rank Fusion.
///
/// Each item at 1-based position `r` in a list contributes `1 / (k + r)`;
/// contributions are summed across both lists. Scores are ignored, so the
/// lists need not be on a common scale. Equal fused scores keep the order
/// in which chunks were first seen, dense list first.
pub fn reciprocal_rank_fusion(
    dense: &[SearchResult],
    sparse: &[SearchResult],
    config: &FusionConfig,
) -> Vec<SearchResult> {
    let k = config.rrf_k;
    let fused = collect_candidates(dense, sparse)
        .into_iter()
        .map(|candidate| {
            let mut score = 0.0;
            let mut terms = Vec::with_capacity(2);
            if let Some((rank, _)) = candidate.dense {
                score += 1.0 / (k + rank as f32);
                terms.push(format!("dense#{}", rank));
            }
            if let Some((rank, _)) = candidate.sparse {
                score += 1.0 / (k + rank as f32);
                terms.push(format!("sparse#{}", rank));
            }
            SearchResult::new(candidate.chunk, score)
                .with_explanation(format!("rrf(k={}): {}", k, terms.join(" + ")))
        })
        .collect();

    finish(fused, config.max_results)
}

/// Weighted score fusion.
///
/// `dense_weight * dense_score + sparse_weight * sparse_score`, where a chunk
/// missing from a list contributes 0 for that term. Only meaningful when both
/// retrievers score on comparable scales.
pub fn weighted_score_fusion(
    dense: &[SearchResult],
    sparse: &[SearchResult],
    config: &FusionConfig,
) -> Vec<SearchResult> {
    let fused = collect_candidates(dense, sparse)
        .into_iter()
        .map(|candidate| {
            let mut score = 0.0;
            let mut terms = Vec::with_capacity(2);
            if let Some((_, dense_score)) = candidate.dense {
                score += config.dense_weight * dense_score;
                terms.push(format!("{:.2}*{:.3} (dense)", config.dense_weight, dense_score));
            }
            if let Some((_, sparse_score)) = candidate.sparse {
                score += config.sparse_weight * sparse_score;
                terms.push(format!(
                    "{:.2}*{:.3} (sparse)",
                    config.sparse_weight, sparse_score
                ));
            }
            SearchResult::new(candidate.chunk, score)
                .with_explanation(format!("weighted: {}", terms.join(" + ")))
        })
        .collect();

    finish(fused, config.max_results)
}

/// Fuse with the given method.
pub fn fuse(
    method: FusionMethod,
    dense: &[SearchResult],
    sparse: &[SearchResult],
    config: &FusionConfig,
) -> Vec<SearchResult> {
    match method {
        FusionMethod::ReciprocalRank => reciprocal_rank_fusion(dense, sparse, config),
        FusionMethod::Weighted => weighted_score_fusion(dense, sparse, config),
    }
}

/// Keep the first occurrence of each chunk, in input order.
pub fn deduplicate_results(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen: HashSet<ChunkKey> = HashSet::with_capacity(results.len());
    results
        .into_iter()
        .filter(|result| seen.insert(result.key()))
        .collect()
}

/// Min-max rescale scores into `[0, 1]` and recompute distances.
///
/// An empty list, or one where every score is equal, is returned unchanged.
pub fn normalize_scores(mut results: Vec<SearchResult>) -> Vec<SearchResult> {
    let Some(min) = results.iter().map(|r| r.score).reduce(f32::min) else {
        return results;
    };
    let max = results.iter().map(|r| r.score).fold(min, f32::max);

    let range = max - min;
    if range == 0.0 {
        return results;
    }

    for result in &mut results {
        result.set_score((result.score - min) / range);
    }
    results
}

#[cfg(test)]
#[path = "fusion_tests.rs"]
mod tests;

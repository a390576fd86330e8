//! Hybrid dense + sparse search.
//!
//! Runs a dense (embedding similarity) retriever and a sparse (lexical)
//! retriever for the same query and merges their ranked lists.
//!
//! ## How It Works
//!
//! 1. The query goes to both retrievers, in parallel or one after the other
//! 2. Each list is cut at its own score threshold and deduplicated
//! 3. The lists are fused with Reciprocal Rank Fusion or weighted scores
//! 4. The fused list is truncated to the requested top-k
//!
//! With a single retriever enabled, fusion is skipped.

mod fusion;
mod searcher;

pub use fusion::{
    deduplicate_results, fuse, normalize_scores, reciprocal_rank_fusion, weighted_score_fusion,
};
pub use searcher::{HybridSearcher, RetrieverStatus};

pub use docsearch_config::{FusionConfig, FusionMethod, HybridSearchConfig};

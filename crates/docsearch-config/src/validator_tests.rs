use super::*;
use crate::schema::RemoteCacheConfig;

#[test]
fn test_default_config_is_valid() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_unknown_fusion_method() {
    let mut config = Config::default();
    config.search.hybrid.fusion_method = "borda".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.has_error("search.hybrid.fusion_method"));
}

#[test]
fn test_zero_limits_are_errors() {
    let mut config = Config::default();
    config.search.hybrid.top_k_final = 0;
    config.search.fusion.max_results = 0;
    config.cache.memory.max_size = 0;

    let result = ConfigValidator::validate(&config);
    assert!(result.has_error("search.hybrid.top_k_final"));
    assert!(result.has_error("search.fusion.max_results"));
    assert!(result.has_error("cache.memory.max_size"));
}

#[test]
fn test_threshold_out_of_range() {
    let mut config = Config::default();
    config.search.hybrid.dense_threshold = 1.5;
    config.search.hybrid.sparse_threshold = -0.1;

    let result = ConfigValidator::validate(&config);
    assert!(result.has_error("search.hybrid.dense_threshold"));
    assert!(result.has_error("search.hybrid.sparse_threshold"));
}

#[test]
fn test_negative_weight_and_bad_rrf_k() {
    let mut config = Config::default();
    config.search.fusion.dense_weight = -0.5;
    config.search.fusion.rrf_k = 0.0;

    let result = ConfigValidator::validate(&config);
    assert!(result.has_error("search.fusion.dense_weight"));
    assert!(result.has_error("search.fusion.rrf_k"));
    assert!(!result.has_error("search.fusion.sparse_weight"));
}

#[test]
fn test_both_retrievers_disabled_warns() {
    let mut config = Config::default();
    config.search.hybrid.enable_dense = false;
    config.search.hybrid.enable_sparse = false;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.has_warning("search.hybrid"));
}

#[test]
fn test_parallel_with_single_retriever_warns() {
    let mut config = Config::default();
    config.search.hybrid.enable_sparse = false;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.has_warning("search.hybrid.parallel_execution"));
}

#[test]
fn test_remote_cache_validation() {
    let mut config = Config::default();
    config.cache.remote = Some(
        RemoteCacheConfig::new("")
            .with_key_prefix(" ")
            .with_scan_batch_size(0),
    );

    let result = ConfigValidator::validate(&config);
    assert!(result.has_error("cache.remote.endpoint"));
    assert!(result.has_error("cache.remote.key_prefix"));
    assert!(result.has_error("cache.remote.scan_batch_size"));
}

#[test]
fn test_unknown_log_format() {
    let mut config = Config::default();
    config.logging.format = "xml".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.has_error("logging.format"));
}

#[test]
fn test_validation_error_display() {
    let err = ValidationError::new("cache.memory.max_size", "must be greater than 0");
    assert_eq!(err.to_string(), "cache.memory.max_size: must be greater than 0");
}

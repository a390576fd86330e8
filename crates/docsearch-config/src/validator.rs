//! Configuration validation.

use crate::schema::{CacheConfig, Config, FusionMethod, LoggingConfig, SearchConfig};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Whether an error was recorded for `path`.
    pub fn has_error(&self, path: &str) -> bool {
        self.errors.iter().any(|e| e.path == path)
    }

    /// Whether a warning was recorded for `path`.
    pub fn has_warning(&self, path: &str) -> bool {
        self.warnings.iter().any(|w| w.path == path)
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_cache(&config.cache, &mut result);
        Self::validate_search(&config.search, &mut result);
        Self::validate_logging(&config.logging, &mut result);

        result
    }

    fn validate_cache(cache: &CacheConfig, result: &mut ValidationResult) {
        if cache.default_ttl_seconds == 0 {
            result.add_error(ValidationError::new(
                "cache.default_ttl_seconds",
                "default_ttl_seconds must be greater than 0",
            ));
        }

        if cache.batch_concurrency == 0 {
            result.add_error(ValidationError::new(
                "cache.batch_concurrency",
                "batch_concurrency must be greater than 0",
            ));
        }

        if cache.memory.max_size == 0 {
            result.add_error(ValidationError::new(
                "cache.memory.max_size",
                "max_size must be greater than 0",
            ));
        }

        if cache.memory.max_memory_bytes == 0 {
            result.add_error(ValidationError::new(
                "cache.memory.max_memory_bytes",
                "max_memory_bytes must be greater than 0",
            ));
        }

        if let Some(ref remote) = cache.remote {
            if remote.endpoint.trim().is_empty() {
                result.add_error(ValidationError::new(
                    "cache.remote.endpoint",
                    "endpoint cannot be empty",
                ));
            }

            // An empty prefix would let clear() scan the whole keyspace
            if remote.key_prefix.trim().is_empty() {
                result.add_error(ValidationError::new(
                    "cache.remote.key_prefix",
                    "key_prefix cannot be empty",
                ));
            }

            if remote.default_ttl_seconds == 0 {
                result.add_error(ValidationError::new(
                    "cache.remote.default_ttl_seconds",
                    "default_ttl_seconds must be greater than 0",
                ));
            }

            if remote.scan_batch_size == 0 {
                result.add_error(ValidationError::new(
                    "cache.remote.scan_batch_size",
                    "scan_batch_size must be greater than 0",
                ));
            }

            if remote.operation_timeout_ms == 0 {
                result.add_warning(ValidationWarning::new(
                    "cache.remote.operation_timeout_ms",
                    "operation_timeout_ms is 0, every remote call will read as a miss",
                ));
            }
        }
    }

    fn validate_search(search: &SearchConfig, result: &mut ValidationResult) {
        let hybrid = &search.hybrid;
        let fusion = &search.fusion;

        if hybrid.fusion_method.parse::<FusionMethod>().is_err() {
            result.add_error(ValidationError::new(
                "search.hybrid.fusion_method",
                format!(
                    "Unknown fusion method '{}', valid values: {:?}",
                    hybrid.fusion_method,
                    FusionMethod::NAMES
                ),
            ));
        }

        for (path, value) in [
            ("search.hybrid.top_k_dense", hybrid.top_k_dense),
            ("search.hybrid.top_k_sparse", hybrid.top_k_sparse),
            ("search.hybrid.top_k_final", hybrid.top_k_final),
            ("search.fusion.max_results", fusion.max_results),
        ] {
            if value == 0 {
                result.add_error(ValidationError::new(path, "must be greater than 0"));
            }
        }

        for (path, value) in [
            ("search.hybrid.dense_threshold", hybrid.dense_threshold),
            ("search.hybrid.sparse_threshold", hybrid.sparse_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                result.add_error(ValidationError::new(path, "must be within [0.0, 1.0]"));
            }
        }

        if !hybrid.enable_dense && !hybrid.enable_sparse {
            result.add_warning(ValidationWarning::new(
                "search.hybrid",
                "Both retrievers are disabled, every search will return no results",
            ));
        } else if hybrid.parallel_execution && (hybrid.enable_dense != hybrid.enable_sparse) {
            result.add_warning(ValidationWarning::new(
                "search.hybrid.parallel_execution",
                "parallel_execution has no effect with a single retriever enabled",
            ));
        }

        if hybrid.top_k_final > hybrid.top_k_dense + hybrid.top_k_sparse {
            result.add_warning(ValidationWarning::new(
                "search.hybrid.top_k_final",
                "top_k_final exceeds the combined retriever limits and can never be reached",
            ));
        }

        if fusion.rrf_k <= 0.0 || !fusion.rrf_k.is_finite() {
            result.add_error(ValidationError::new(
                "search.fusion.rrf_k",
                "rrf_k must be a positive number",
            ));
        }

        if fusion.dense_weight < 0.0 {
            result.add_error(ValidationError::new(
                "search.fusion.dense_weight",
                "dense_weight cannot be negative",
            ));
        }

        if fusion.sparse_weight < 0.0 {
            result.add_error(ValidationError::new(
                "search.fusion.sparse_weight",
                "sparse_weight cannot be negative",
            ));
        }

        if fusion.dense_weight == 0.0 && fusion.sparse_weight == 0.0 {
            result.add_warning(ValidationWarning::new(
                "search.fusion",
                "Both fusion weights are 0, weighted fusion will score everything 0",
            ));
        }
    }

    fn validate_logging(logging: &LoggingConfig, result: &mut ValidationResult) {
        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&logging.format.as_str()) {
            result.add_error(ValidationError::new(
                "logging.format",
                format!(
                    "Unknown log format '{}', valid values: {:?}",
                    logging.format, valid_formats
                ),
            ));
        }

        if logging.level.trim().is_empty() {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                "Log level is empty, falling back to \"info\"",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

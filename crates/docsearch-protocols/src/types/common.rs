//! Common utility types.

use std::collections::HashMap;

/// Metadata map type.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Embedding vector.
pub type Embedding = Vec<f32>;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("collection error: {0}")]
    Collection(String),
    #[error("upsert error: {0}")]
    Upsert(String),
    #[error("search error: {0}")]
    Search(String),
    #[error("count error: {0}")]
    Count(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Distance function of a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cosine,
    Dot,
    Euclid,
}

impl Metric {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Dot => "dot",
            Self::Euclid => "euclid",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: HashMap<String, serde_json::Value>,
}

/// Conjunction of equality conditions over payload fields.
#[derive(Debug, Clone, Default)]
pub struct VectorFilter {
    pub must: Vec<FieldCondition>,
}

impl VectorFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal the string `value`.
    #[must_use]
    pub fn must_eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.must.push(FieldCondition {
            field: field.into(),
            value: FieldValue::Text(value.into()),
        });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
    }

    /// `true` when every condition holds for `payload`. Missing fields never match.
    #[must_use]
    pub fn matches(&self, payload: &HashMap<String, serde_json::Value>) -> bool {
        self.must.iter().all(|cond| {
            payload
                .get(&cond.field)
                .is_some_and(|val| cond.value.matches(val))
        })
    }
}

#[derive(Debug, Clone)]
pub struct FieldCondition {
    pub field: String,
    pub value: FieldValue,
}

#[derive(Debug, Clone)]
pub enum FieldValue {
    Text(String),
}

impl FieldValue {
    #[must_use]
    pub fn matches(&self, val: &serde_json::Value) -> bool {
        match self {
            Self::Text(s) => val.as_str() == Some(s.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoredVectorPoint {
    pub id: String,
    pub score: f32,
    pub payload: HashMap<String, serde_json::Value>,
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait VectorStore: Send + Sync {
    /// Create `collection` unless it already exists.
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
        metric: Metric,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, VectorStoreError>>;

    fn delete_collection(&self, collection: &str) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    /// Nearest `limit` points to `vector`, best first, restricted to `filter`.
    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        filter: Option<VectorFilter>,
    ) -> BoxFuture<'_, Result<Vec<ScoredVectorPoint>, VectorStoreError>>;

    fn count(&self, collection: &str) -> BoxFuture<'_, Result<u64, VectorStoreError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(pairs: &[(&str, serde_json::Value)]) -> HashMap<String, serde_json::Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(VectorFilter::new().matches(&HashMap::new()));
        assert!(VectorFilter::new().is_empty());
    }

    #[test]
    fn all_conditions_required() {
        let filter = VectorFilter::new()
            .must_eq("type", "question_paper")
            .must_eq("paper_number", "1");
        let hit = payload(&[
            ("type", serde_json::json!("question_paper")),
            ("paper_number", serde_json::json!("1")),
        ]);
        let miss = payload(&[
            ("type", serde_json::json!("question_paper")),
            ("paper_number", serde_json::json!("2")),
        ]);
        assert!(filter.matches(&hit));
        assert!(!filter.matches(&miss));
    }

    #[test]
    fn missing_field_never_matches() {
        let filter = VectorFilter::new().must_eq("variation", "Variation1");
        assert!(!filter.matches(&payload(&[("type", serde_json::json!("x"))])));
    }

    #[test]
    fn text_condition_does_not_match_number() {
        let filter = VectorFilter::new().must_eq("paper_number", "1");
        assert!(!filter.matches(&payload(&[("paper_number", serde_json::json!(1))])));
    }

    #[test]
    fn metric_serde_lowercase() {
        let m: Metric = serde_json::from_str("\"euclid\"").unwrap();
        assert_eq!(m, Metric::Euclid);
        assert_eq!(Metric::default().to_string(), "cosine");
    }
}

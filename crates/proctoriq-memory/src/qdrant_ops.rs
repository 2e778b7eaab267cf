//! Qdrant-backed [`VectorStore`](crate::VectorStore).

use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, Distance, Filter, PointStruct,
    ScoredPoint, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder, value::Kind,
};

use crate::vector_store::{
    FieldCondition, FieldValue, Metric, ScoredVectorPoint, VectorFilter, VectorPoint,
    VectorStoreError,
};

type QdrantResult<T> = Result<T, Box<qdrant_client::QdrantError>>;

/// Thin wrapper over [`Qdrant`] client encapsulating the collection operations we need.
#[derive(Clone)]
pub struct QdrantOps {
    client: Qdrant,
}

impl std::fmt::Debug for QdrantOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantOps").finish_non_exhaustive()
    }
}

impl QdrantOps {
    /// Create a new `QdrantOps` for the given URL, authenticating with `api_key` if set.
    ///
    /// # Errors
    ///
    /// Returns an error if the Qdrant client cannot be created.
    pub fn new(url: &str, api_key: Option<&str>) -> QdrantResult<Self> {
        let mut builder = Qdrant::from_url(url);
        if let Some(key) = api_key {
            builder = builder.api_key(key.to_owned());
        }
        let client = builder.build().map_err(Box::new)?;
        Ok(Self { client })
    }

    /// Ensure a collection exists with the given distance function.
    ///
    /// Idempotent: no-op if the collection already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if Qdrant cannot be reached or collection creation fails.
    pub async fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
        metric: Metric,
    ) -> QdrantResult<()> {
        if self
            .client
            .collection_exists(collection)
            .await
            .map_err(Box::new)?
        {
            return Ok(());
        }
        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(vector_size, distance(metric))),
            )
            .await
            .map_err(Box::new)?;
        tracing::info!("created Qdrant collection {collection} ({vector_size}d, {metric})");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if Qdrant cannot be reached.
    pub async fn collection_exists(&self, collection: &str) -> QdrantResult<bool> {
        self.client
            .collection_exists(collection)
            .await
            .map_err(Box::new)
    }

    /// # Errors
    ///
    /// Returns an error if the collection cannot be deleted.
    pub async fn delete_collection(&self, collection: &str) -> QdrantResult<()> {
        self.client
            .delete_collection(collection)
            .await
            .map_err(Box::new)?;
        Ok(())
    }

    /// Upsert points and wait until they are searchable.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn upsert(&self, collection: &str, points: Vec<PointStruct>) -> QdrantResult<()> {
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(Box::new)?;
        Ok(())
    }

    /// Search for similar vectors, returning scored points with payloads.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    pub async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        filter: Option<Filter>,
    ) -> QdrantResult<Vec<ScoredPoint>> {
        let mut builder = SearchPointsBuilder::new(collection, vector, limit).with_payload(true);
        if let Some(f) = filter {
            builder = builder.filter(f);
        }
        let results = self.client.search_points(builder).await.map_err(Box::new)?;
        Ok(results.result)
    }

    /// Exact number of points in a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the count request fails.
    pub async fn count(&self, collection: &str) -> QdrantResult<u64> {
        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(Box::new)?;
        Ok(response.result.map_or(0, |r| r.count))
    }

    /// Convert a JSON value to a Qdrant payload map.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if deserialization fails.
    pub fn json_to_payload(
        value: serde_json::Value,
    ) -> Result<HashMap<String, qdrant_client::qdrant::Value>, serde_json::Error> {
        serde_json::from_value(value)
    }
}

impl crate::vector_store::VectorStore for QdrantOps {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
        metric: Metric,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), VectorStoreError>> + Send + '_>>
    {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.ensure_collection(&collection, vector_size, metric)
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))
        })
    }

    fn collection_exists(
        &self,
        collection: &str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<bool, VectorStoreError>> + Send + '_>>
    {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.collection_exists(&collection)
                .await
                .map_err(|e| VectorStoreError::Connection(e.to_string()))
        })
    }

    fn delete_collection(
        &self,
        collection: &str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), VectorStoreError>> + Send + '_>>
    {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.delete_collection(&collection)
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))
        })
    }

    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), VectorStoreError>> + Send + '_>>
    {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut qdrant_points = Vec::with_capacity(points.len());
            for p in points {
                let payload = Self::json_to_payload(serde_json::Value::Object(
                    p.payload.into_iter().collect(),
                ))
                .map_err(|e| VectorStoreError::Serialization(e.to_string()))?;
                qdrant_points.push(PointStruct::new(p.id, p.vector, payload));
            }
            self.upsert(&collection, qdrant_points)
                .await
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))
        })
    }

    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        filter: Option<VectorFilter>,
    ) -> std::pin::Pin<
        Box<
            dyn std::future::Future<Output = Result<Vec<ScoredVectorPoint>, VectorStoreError>>
                + Send
                + '_,
        >,
    > {
        let collection = collection.to_owned();
        Box::pin(async move {
            let qdrant_filter = filter
                .filter(|f| !f.is_empty())
                .map(vector_filter_to_qdrant);
            let results = self
                .search(&collection, vector, limit, qdrant_filter)
                .await
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;
            Ok(results.into_iter().map(scored_point_to_vector).collect())
        })
    }

    fn count(
        &self,
        collection: &str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<u64, VectorStoreError>> + Send + '_>>
    {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.count(&collection)
                .await
                .map_err(|e| VectorStoreError::Count(e.to_string()))
        })
    }
}

fn distance(metric: Metric) -> Distance {
    match metric {
        Metric::Cosine => Distance::Cosine,
        Metric::Dot => Distance::Dot,
        Metric::Euclid => Distance::Euclid,
    }
}

fn vector_filter_to_qdrant(filter: VectorFilter) -> Filter {
    Filter::must(filter.must.into_iter().map(field_condition_to_qdrant))
}

fn field_condition_to_qdrant(cond: FieldCondition) -> Condition {
    match cond.value {
        FieldValue::Text(v) => Condition::matches(cond.field, v),
    }
}

fn scored_point_to_vector(point: ScoredPoint) -> ScoredVectorPoint {
    let payload: HashMap<String, serde_json::Value> = point
        .payload
        .into_iter()
        .filter_map(|(k, v)| {
            let json_val = match v.kind? {
                Kind::StringValue(s) => serde_json::Value::String(s),
                Kind::IntegerValue(i) => serde_json::Value::Number(i.into()),
                Kind::DoubleValue(d) => {
                    serde_json::Number::from_f64(d).map(serde_json::Value::Number)?
                }
                Kind::BoolValue(b) => serde_json::Value::Bool(b),
                _ => return None,
            };
            Some((k, json_val))
        })
        .collect();

    let id = match point.id.and_then(|pid| pid.point_id_options) {
        Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(u)) => u,
        Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    };

    ScoredVectorPoint {
        id,
        score: point.score,
        payload,
    }
}

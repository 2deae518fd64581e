//! ChromaDB REST client backend.
//!
//! Talks to the vector-store backend over its HTTP API: collections are
//! resolved by name to an id, created lazily with a cosine-space hint on
//! first store, and read through `get`/`query` with explicit include
//! lists. Response shapes are validated at this boundary; the rest of the
//! crate never sees a raw backend payload.

use super::{CollectionInfo, MemoryStore, QueryHit, StoredEntry};
use crate::models::{Collection, MemoryMetadata, MemoryRecord};
use crate::transport::{RetryPolicy, build_http_client};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// ChromaDB-backed memory store.
pub struct ChromaStore {
    /// Backend base URL, e.g. `http://192.168.64.1:8000`.
    base_url: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
    /// Retry policy for transport failures.
    retry: RetryPolicy,
}

impl ChromaStore {
    /// Creates a store client for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: build_http_client(crate::transport::HttpConfig::default()),
            retry: RetryPolicy::default(),
        }
    }

    /// Creates a store client from configuration.
    #[must_use]
    pub fn from_config(config: &crate::MemoryConfig) -> Self {
        Self {
            base_url: config.chroma_url(),
            client: build_http_client(config.http),
            retry: config.retry,
        }
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    /// Resolves a collection name to its backend id, or `None` if the
    /// collection has never been created.
    fn find_collection(&self, name: &str) -> Result<Option<ChromaCollection>> {
        let response = self
            .client
            .get(self.url(&format!("/collections/{name}")))
            .send()
            .map_err(|e| transport_error("chroma_get_collection", &e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            // Older backends report a missing collection as a 500 with an
            // error body rather than a 404.
            return Ok(None);
        }

        let collection = response.json().map_err(|e| Error::OperationFailed {
            operation: "chroma_get_collection".to_string(),
            cause: e.to_string(),
        })?;
        Ok(Some(collection))
    }

    /// Creates the collection if needed and returns it.
    fn get_or_create_collection(&self, name: &str) -> Result<ChromaCollection> {
        let request = CreateCollectionRequest {
            name: name.to_string(),
            metadata: CollectionMetadata {
                hnsw_space: "cosine".to_string(),
            },
            get_or_create: true,
        };

        let response = self
            .client
            .post(self.url("/collections"))
            .json(&request)
            .send()
            .map_err(|e| transport_error("chroma_create_collection", &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::OperationFailed {
                operation: "chroma_create_collection".to_string(),
                cause: format!("backend returned status: {status} - {body}"),
            });
        }

        response.json().map_err(|e| Error::OperationFailed {
            operation: "chroma_create_collection".to_string(),
            cause: e.to_string(),
        })
    }

    fn collection_count(&self, id: &str) -> Result<usize> {
        let response = self
            .client
            .get(self.url(&format!("/collections/{id}/count")))
            .send()
            .map_err(|e| transport_error("chroma_count", &e))?;

        if !response.status().is_success() {
            return Err(Error::OperationFailed {
                operation: "chroma_count".to_string(),
                cause: format!("backend returned status: {}", response.status()),
            });
        }

        response.json().map_err(|e| Error::OperationFailed {
            operation: "chroma_count".to_string(),
            cause: e.to_string(),
        })
    }
}

impl MemoryStore for ChromaStore {
    fn upsert(&self, record: &MemoryRecord) -> Result<()> {
        self.retry.run("chroma_upsert", || {
            let collection = self.get_or_create_collection(record.collection.as_str())?;

            let request = UpsertRequest {
                ids: vec![record.id.as_str().to_string()],
                documents: vec![record.text.clone()],
                embeddings: vec![record.embedding.clone()],
                metadatas: vec![record.metadata.clone()],
            };

            let response = self
                .client
                .post(self.url(&format!("/collections/{}/upsert", collection.id)))
                .json(&request)
                .send()
                .map_err(|e| transport_error("chroma_upsert", &e))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().unwrap_or_default();
                return Err(Error::OperationFailed {
                    operation: "chroma_upsert".to_string(),
                    cause: format!("backend returned status: {status} - {body}"),
                });
            }

            Ok(())
        })
    }

    fn query(
        &self,
        collection: Collection,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<QueryHit>> {
        let Some(found) = self.find_collection(collection.as_str())? else {
            // Lazily created collections may simply not exist yet.
            return Ok(Vec::new());
        };

        let request = QueryRequest {
            query_embeddings: vec![query_embedding.to_vec()],
            n_results: k,
            include: vec![
                "documents".to_string(),
                "metadatas".to_string(),
                "distances".to_string(),
            ],
        };

        let response: QueryResponse = self.retry.run("chroma_query", || {
            let response = self
                .client
                .post(self.url(&format!("/collections/{}/query", found.id)))
                .json(&request)
                .send()
                .map_err(|e| transport_error("chroma_query", &e))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().unwrap_or_default();
                return Err(Error::OperationFailed {
                    operation: "chroma_query".to_string(),
                    cause: format!("backend returned status: {status} - {body}"),
                });
            }

            response.json().map_err(|e| Error::OperationFailed {
                operation: "chroma_query".to_string(),
                cause: e.to_string(),
            })
        })?;

        Ok(response.into_hits())
    }

    fn entries(&self, collection: Collection, limit: usize) -> Result<Vec<StoredEntry>> {
        let Some(found) = self.find_collection(collection.as_str())? else {
            return Ok(Vec::new());
        };

        let request = GetRequest {
            limit,
            include: vec!["documents".to_string(), "metadatas".to_string()],
        };

        let response: GetResponse = self.retry.run("chroma_get", || {
            let response = self
                .client
                .post(self.url(&format!("/collections/{}/get", found.id)))
                .json(&request)
                .send()
                .map_err(|e| transport_error("chroma_get", &e))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().unwrap_or_default();
                return Err(Error::OperationFailed {
                    operation: "chroma_get".to_string(),
                    cause: format!("backend returned status: {status} - {body}"),
                });
            }

            response.json().map_err(|e| Error::OperationFailed {
                operation: "chroma_get".to_string(),
                cause: e.to_string(),
            })
        })?;

        Ok(response.into_entries())
    }

    fn collections(&self) -> Result<Vec<CollectionInfo>> {
        let collections: Vec<ChromaCollection> = self.retry.run("chroma_list_collections", || {
            let response = self
                .client
                .get(self.url("/collections"))
                .send()
                .map_err(|e| transport_error("chroma_list_collections", &e))?;

            if !response.status().is_success() {
                return Err(Error::OperationFailed {
                    operation: "chroma_list_collections".to_string(),
                    cause: format!("backend returned status: {}", response.status()),
                });
            }

            response.json().map_err(|e| Error::OperationFailed {
                operation: "chroma_list_collections".to_string(),
                cause: e.to_string(),
            })
        })?;

        let mut infos = Vec::with_capacity(collections.len());
        for collection in collections {
            let count = self.collection_count(&collection.id)?;
            infos.push(CollectionInfo {
                name: collection.name,
                count,
            });
        }
        Ok(infos)
    }
}

fn transport_error(operation: &str, e: &reqwest::Error) -> Error {
    let error_kind = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_request() {
        "request"
    } else {
        "unknown"
    };
    tracing::error!(
        backend = "chroma",
        error = %e,
        error_kind = error_kind,
        "vector store request failed"
    );
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: format!("{error_kind} error: {e}"),
    }
}

/// A collection descriptor as the backend reports it.
#[derive(Debug, Deserialize)]
struct ChromaCollection {
    id: String,
    name: String,
}

/// Collection metadata carrying the similarity-space hint.
#[derive(Debug, Serialize)]
struct CollectionMetadata {
    #[serde(rename = "hnsw:space")]
    hnsw_space: String,
}

/// Request to create or fetch a collection.
#[derive(Debug, Serialize)]
struct CreateCollectionRequest {
    name: String,
    metadata: CollectionMetadata,
    get_or_create: bool,
}

/// Upsert request: all arrays are parallel and equal length.
#[derive(Debug, Serialize)]
struct UpsertRequest {
    ids: Vec<String>,
    documents: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    metadatas: Vec<MemoryMetadata>,
}

/// Get request with selectable included fields.
#[derive(Debug, Serialize)]
struct GetRequest {
    limit: usize,
    include: Vec<String>,
}

/// Get response: flat arrays, optional per included-field selection.
#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    ids: Vec<String>,
    #[serde(default)]
    documents: Option<Vec<Option<String>>>,
    #[serde(default)]
    metadatas: Option<Vec<Option<MemoryMetadata>>>,
}

impl GetResponse {
    fn into_entries(self) -> Vec<StoredEntry> {
        let documents = self.documents.unwrap_or_default();
        let metadatas = self.metadatas.unwrap_or_default();

        self.ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| StoredEntry {
                id,
                document: documents.get(i).cloned().flatten(),
                metadata: metadatas.get(i).cloned().flatten(),
            })
            .collect()
    }
}

/// Query request against one or more query embeddings.
#[derive(Debug, Serialize)]
struct QueryRequest {
    query_embeddings: Vec<Vec<f32>>,
    n_results: usize,
    include: Vec<String>,
}

/// Query response: arrays nested per query embedding.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<MemoryMetadata>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
}

impl QueryResponse {
    /// Flattens the first (and only) query's row into hits.
    fn into_hits(self) -> Vec<QueryHit> {
        let ids = self.ids.into_iter().next().unwrap_or_default();
        let documents = self
            .documents
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default();
        let metadatas = self
            .metadatas
            .and_then(|m| m.into_iter().next())
            .unwrap_or_default();
        let distances = self
            .distances
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default();

        ids.into_iter()
            .enumerate()
            .map(|(i, id)| QueryHit {
                id,
                document: documents.get(i).cloned().flatten(),
                metadata: metadatas.get(i).cloned().flatten(),
                distance: distances.get(i).copied(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_response_flattens_first_row() {
        let json = r#"{
            "ids": [["a", "b"]],
            "documents": [["doc a", null]],
            "metadatas": [[{"importance": 0.8}, null]],
            "distances": [[0.1, 0.4]]
        }"#;
        let response: QueryResponse =
            serde_json::from_str(json).unwrap_or_else(|e| panic!("parse: {e}"));
        let hits = response.into_hits();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[0].document.as_deref(), Some("doc a"));
        assert_eq!(hits[0].distance, Some(0.1));
        assert_eq!(
            hits[0].metadata.as_ref().and_then(|m| m.importance),
            Some(0.8)
        );
        assert_eq!(hits[1].document, None);
        assert_eq!(hits[1].metadata, None);
    }

    #[test]
    fn test_query_response_tolerates_missing_includes() {
        let response: QueryResponse =
            serde_json::from_str(r#"{"ids": [["a"]]}"#).unwrap_or_else(|e| panic!("parse: {e}"));
        let hits = response.into_hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document, None);
        assert_eq!(hits[0].distance, None);
    }

    #[test]
    fn test_query_response_empty() {
        let response: QueryResponse =
            serde_json::from_str("{}").unwrap_or_else(|e| panic!("parse: {e}"));
        assert!(response.into_hits().is_empty());
    }

    #[test]
    fn test_get_response_pairs_rows() {
        let json = r#"{
            "ids": ["x"],
            "documents": ["stored text"],
            "metadatas": [{"timestamp": 1700000000, "tags": "a,b"}]
        }"#;
        let response: GetResponse =
            serde_json::from_str(json).unwrap_or_else(|e| panic!("parse: {e}"));
        let entries = response.into_entries();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].document.as_deref(), Some("stored text"));
        assert_eq!(
            entries[0].metadata.as_ref().and_then(|m| m.tags.as_deref()),
            Some("a,b")
        );
    }

    #[test]
    fn test_upsert_request_arrays_stay_parallel() {
        let request = UpsertRequest {
            ids: vec!["id1".to_string()],
            documents: vec!["text".to_string()],
            embeddings: vec![vec![0.1, 0.2]],
            metadatas: vec![MemoryMetadata::default()],
        };
        let json = serde_json::to_value(&request).unwrap_or_default();
        assert_eq!(json["ids"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["embeddings"][0].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_create_collection_request_carries_space_hint() {
        let request = CreateCollectionRequest {
            name: "knowledge".to_string(),
            metadata: CollectionMetadata {
                hnsw_space: "cosine".to_string(),
            },
            get_or_create: true,
        };
        let json = serde_json::to_value(&request).unwrap_or_default();
        assert_eq!(json["metadata"]["hnsw:space"], "cosine");
        assert_eq!(json["get_or_create"], true);
    }
}

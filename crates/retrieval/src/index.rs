//! Index construction and similarity retrieval.

use crate::loader::load_documents;
use crate::splitter::CharacterTextSplitter;
use crate::store::{IndexStore, StoredChunk};
use crate::vector;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use supportdesk_config::{CorpusConfig, RetrievalConfig};
use supportdesk_core::Provider;
use supportdesk_core::error::RetrievalError;
use supportdesk_core::provider::EmbeddingRequest;
use tracing::{debug, info, warn};

/// A chunk returned by a retriever, with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub source: PathBuf,
    pub content: String,
    pub score: f32,
}

/// Finds the chunks most relevant to a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> supportdesk_core::Result<Vec<RetrievedChunk>>;
}

/// Brute-force cosine retriever over a loaded [`IndexStore`].
pub struct VectorRetriever {
    name: String,
    store: IndexStore,
    provider: Arc<dyn Provider>,
    top_k: usize,
}

impl VectorRetriever {
    pub fn new(
        name: impl Into<String>,
        store: IndexStore,
        provider: Arc<dyn Provider>,
        top_k: usize,
    ) -> Self {
        Self {
            name: name.into(),
            store,
            provider,
            top_k,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn retrieve(&self, query: &str) -> supportdesk_core::Result<Vec<RetrievedChunk>> {
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.store.model.clone(),
                inputs: vec![query.to_string()],
            })
            .await?;

        let query_vec = response.embeddings.into_iter().next().ok_or_else(|| {
            RetrievalError::Embedding("provider returned no vector for the query".into())
        })?;

        let rows = self.store.chunks.iter().map(|c| c.embedding.as_slice());
        let hits = vector::top_k(rows, &query_vec, self.top_k);

        debug!(index = %self.name, hits = hits.len(), "Retrieved chunks");
        Ok(hits
            .into_iter()
            .map(|(i, score)| {
                let chunk = &self.store.chunks[i];
                RetrievedChunk {
                    source: chunk.source.clone(),
                    content: chunk.content.clone(),
                    score,
                }
            })
            .collect())
    }
}

/// Build the index for a corpus, or load it if the store already exists.
pub async fn build_index(
    corpus: &CorpusConfig,
    retrieval: &RetrievalConfig,
    embedding_model: &str,
    provider: Arc<dyn Provider>,
) -> supportdesk_core::Result<VectorRetriever> {
    if let Some(store) = IndexStore::load(&corpus.store)?
        && !store.is_empty()
    {
        if store.model != embedding_model {
            warn!(
                corpus = %corpus.name,
                stored = %store.model,
                configured = %embedding_model,
                "Index was built with a different embedding model; run `index --rebuild`"
            );
        }
        info!(corpus = %corpus.name, chunks = store.len(), "Loaded existing index");
        return Ok(VectorRetriever::new(&corpus.name, store, provider, retrieval.top_k));
    }

    rebuild_index(corpus, retrieval, embedding_model, provider).await
}

/// Build the index for a corpus from its documents, replacing any stored copy.
pub async fn rebuild_index(
    corpus: &CorpusConfig,
    retrieval: &RetrievalConfig,
    embedding_model: &str,
    provider: Arc<dyn Provider>,
) -> supportdesk_core::Result<VectorRetriever> {
    let docs = load_documents(&corpus.folder, corpus.recursive)?;

    let splitter = CharacterTextSplitter::new(
        retrieval.separator.as_str(),
        retrieval.chunk_size,
        retrieval.chunk_overlap,
    );

    let mut pieces: Vec<(PathBuf, usize, String)> = Vec::new();
    for doc in &docs {
        for (i, chunk) in splitter.split(&doc.content).into_iter().enumerate() {
            pieces.push((doc.source.clone(), i, chunk));
        }
    }

    if pieces.is_empty() {
        return Err(RetrievalError::EmptyCorpus {
            path: corpus.folder.clone(),
        }
        .into());
    }

    info!(
        corpus = %corpus.name,
        documents = docs.len(),
        chunks = pieces.len(),
        "Embedding corpus"
    );

    let mut chunks = Vec::with_capacity(pieces.len());
    for batch in pieces.chunks(retrieval.embed_batch_size.max(1)) {
        let inputs: Vec<String> = batch.iter().map(|(_, _, text)| text.clone()).collect();
        let response = provider
            .embed(EmbeddingRequest {
                model: embedding_model.to_string(),
                inputs,
            })
            .await?;

        if response.embeddings.len() != batch.len() {
            return Err(RetrievalError::Embedding(format!(
                "expected {} vectors, got {}",
                batch.len(),
                response.embeddings.len()
            ))
            .into());
        }

        for ((source, chunk_index, content), embedding) in batch.iter().zip(response.embeddings) {
            chunks.push(StoredChunk {
                source: source.clone(),
                chunk_index: *chunk_index,
                content: content.clone(),
                embedding,
            });
        }
    }

    let store = IndexStore::new(embedding_model, chunks);
    store.save(&corpus.store)?;
    info!(corpus = %corpus.name, chunks = store.len(), store = %corpus.store.display(), "Index built");

    Ok(VectorRetriever::new(&corpus.name, store, provider, retrieval.top_k))
}

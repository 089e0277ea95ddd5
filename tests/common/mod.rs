//! Test doubles shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use bikehero::embeddings::Embedder;
use bikehero::knowledge::ContextRetriever;
use bikehero::knowledge::DocumentBuilder;
use bikehero::knowledge::KnowledgeStore;
use bikehero::knowledge::MemoryVectorIndex;
use bikehero::knowledge::TextChunker;
use bikehero::llm::CompletionRequest;
use bikehero::llm::CompletionService;
use bikehero::BikeHeroError;
use bikehero::Result;

pub const BOOKING_URL: &str = "https://bikehero.sg/goifnmnf";

const DIM: usize = 256;

/// Bag-of-words embedder: texts sharing words get similar vectors
pub struct WordHashEmbedder;

fn bucket(word: &str) -> usize {
    word.bytes()
        .fold(7usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
        % DIM
}

#[async_trait]
impl Embedder for WordHashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; DIM];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[bucket(&word.to_lowercase())] += 1.0;
        }
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Knowledge store over the in-memory index
pub fn memory_store() -> KnowledgeStore {
    KnowledgeStore::new(
        "bikehero_pricing",
        DocumentBuilder::new(TextChunker::default(), BOOKING_URL),
        Arc::new(WordHashEmbedder),
        Arc::new(MemoryVectorIndex::new()),
    )
}

/// Replies with scripted answers in order and records every request
pub struct ScriptedCompletion {
    replies: Mutex<Vec<Result<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new(replies: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().rev().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(replies: &[&str]) -> Arc<Self> {
        Self::new(replies.iter().map(|r| Ok((*r).to_string())).collect())
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(BikeHeroError::LlmError("no scripted reply".to_string())))
    }
}

/// Wraps a retriever and counts calls
pub struct CountingRetriever {
    inner: Arc<dyn ContextRetriever>,
    calls: AtomicUsize,
}

impl CountingRetriever {
    pub fn new(inner: Arc<dyn ContextRetriever>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContextRetriever for CountingRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.retrieve(query, k).await
    }
}

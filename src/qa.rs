//! Question answering over one PDF.
//!
//! Retrieval is hybrid: embedding similarity and BM25 keyword scores are
//! merged, deduplicated by chunk text, and handed to the model as context.
//! Questions the model judges complex are split into sub-questions first,
//! each retrieved separately, and the union reranked by word overlap.

use std::collections::HashSet;

use crate::bm25::Bm25;
use crate::documents::DocumentError;
use crate::embedding_cache::{CacheError, EmbeddingCache};
use crate::models::{Answer, Chunk};
use crate::ollama::{LanguageModel, ModelError};

pub const NO_RELEVANT_INFORMATION: &str = "No relevant information found.";
const SIMPLE_K: usize = 8;
const SUB_QUESTION_K: usize = 5;
const CITED_CHUNKS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum QaError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

// ============================================================================
// Prompts
// ============================================================================

fn complexity_prompt(question: &str) -> String {
    format!(
        "Decide whether this question is complex and needs sub-questions. \
Reply with exactly \"Complex\" or \"Simple\".\n\n\
Complex when it:\n\
- needs several steps or concepts\n\
- compares different approaches\n\
- asks for a detailed explanation with several aspects\n\
- needs analysis across different sections\n\n\
Simple when it:\n\
- asks for one definition or concept\n\
- needs a direct factual answer\n\
- can be answered in a single response\n\n\
Question: {question}\n"
    )
}

fn sub_question_prompt(question: &str) -> String {
    format!(
        "You break complex questions into clear, relevant, non-overlapping sub-questions.\n\n\
List 2-3 distinct sub-questions needed to fully answer the main question below. Each sub-question should:\n\
- target one concept or step\n\
- be answerable on its own without overlapping the others\n\
- together with the others cover the whole main question\n\n\
Main question: {question}\n\n\
Write only the sub-questions, one per line, with no other text:\n"
    )
}

fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "Answer the question using only the context below, accurately and completely.\n\
If the context does not contain enough information, say so.\n\n\
Context: {context}\n\
Question: {question}\n\n\
Answer:\n"
    )
}

// ============================================================================
// Helpers
// ============================================================================

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

/// Keep the first occurrence of each distinct chunk text.
fn dedupe<'a>(chunks: impl IntoIterator<Item = &'a Chunk>) -> Vec<&'a Chunk> {
    let mut seen = HashSet::new();
    chunks
        .into_iter()
        .filter(|c| seen.insert(c.text.as_str()))
        .collect()
}

/// Order chunks by the share of question words they contain, best first.
/// Equal scores keep their input order.
pub fn rerank<'a>(question: &str, chunks: Vec<&'a Chunk>) -> Vec<&'a Chunk> {
    let lowered = question.to_lowercase();
    let question_words: HashSet<&str> = lowered.split_whitespace().collect();
    if question_words.is_empty() {
        return chunks;
    }

    let mut scored: Vec<(f64, &Chunk)> = chunks
        .into_iter()
        .map(|chunk| {
            let text = chunk.text.to_lowercase();
            let chunk_words: HashSet<&str> = text.split_whitespace().collect();
            let overlap = question_words.intersection(&chunk_words).count();
            (overlap as f64 / question_words.len() as f64, chunk)
        })
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, c)| c).collect()
}

/// Whether a reply to the complexity prompt says "complex".
pub fn says_complex(reply: &str) -> bool {
    reply.trim().to_lowercase().replace('*', "").contains("complex")
}

/// One sub-question per non-blank line.
pub fn parse_sub_questions(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Engine
// ============================================================================

pub struct QaEngine<M> {
    model: M,
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
    bm25: Bm25,
}

impl<M: LanguageModel> QaEngine<M> {
    /// Embed every chunk (reusing cached vectors) and build the keyword index.
    pub async fn build(
        model: M,
        chunks: Vec<Chunk>,
        cache: Option<&EmbeddingCache>,
    ) -> Result<Self, QaError> {
        let embed_model = model.embedding_model().to_string();
        let mut embeddings: Vec<Option<Vec<f32>>> = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let cached = match cache {
                Some(c) => c.get(&embed_model, &chunk.text)?,
                None => None,
            };
            embeddings.push(cached);
        }

        let missing: Vec<usize> = embeddings
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_none())
            .map(|(i, _)| i)
            .collect();
        tracing::info!(
            chunks = chunks.len(),
            cached = chunks.len() - missing.len(),
            "Embedding document chunks"
        );

        if !missing.is_empty() {
            let texts: Vec<String> = missing.iter().map(|&i| chunks[i].text.clone()).collect();
            let vectors = model.embed(&texts).await?;
            for (&i, vector) in missing.iter().zip(vectors) {
                if let Some(c) = cache {
                    c.put(&embed_model, &chunks[i].text, &vector)?;
                }
                embeddings[i] = Some(vector);
            }
            if let Some(c) = cache {
                c.flush()?;
            }
        }

        let embeddings = embeddings.into_iter().map(Option::unwrap_or_default).collect();
        let bm25 = Bm25::new(&chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>());
        tracing::info!("Vector and keyword indexes ready");

        Ok(Self {
            model,
            chunks,
            embeddings,
            bm25,
        })
    }

    pub async fn is_complex(&self, question: &str) -> Result<bool, QaError> {
        let reply = self.model.generate(&complexity_prompt(question)).await?;
        let complex = says_complex(&reply);
        tracing::info!(complex, "Complexity: {}", reply.trim());
        Ok(complex)
    }

    pub async fn sub_questions(&self, question: &str) -> Result<Vec<String>, QaError> {
        let reply = self.model.generate(&sub_question_prompt(question)).await?;
        let subs = parse_sub_questions(&reply);
        tracing::info!("Generated {} sub-questions", subs.len());
        for (i, sub) in subs.iter().enumerate() {
            tracing::info!("Sub-question {}: {}", i + 1, sub);
        }
        Ok(subs)
    }

    async fn vector_search(&self, question: &str, k: usize) -> Result<Vec<&Chunk>, QaError> {
        if self.chunks.is_empty() {
            return Ok(Vec::new());
        }
        let query = self
            .model
            .embed(&[question.to_string()])
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();

        let mut scored: Vec<(f32, usize)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(i, e)| (cosine(&query, e), i))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, i)| &self.chunks[i])
            .collect())
    }

    /// Embedding hits first, then BM25 hits; deduplicated and capped at `k`.
    pub async fn hybrid_retrieval(&self, question: &str, k: usize) -> Result<Vec<&Chunk>, QaError> {
        let vector_hits = self.vector_search(question, k).await?;
        let keyword_hits = self
            .bm25
            .top_k(question, k)
            .into_iter()
            .map(|i| &self.chunks[i]);

        let mut merged = dedupe(vector_hits.into_iter().chain(keyword_hits));
        merged.truncate(k);
        Ok(merged)
    }

    pub async fn answer(&self, question: &str) -> Result<Answer, QaError> {
        tracing::info!("Processing: {}", question);

        let subs = if self.is_complex(question).await? {
            let subs = self.sub_questions(question).await?;
            tracing::info!("Complex question, {} sub-questions", subs.len());
            subs
        } else {
            tracing::info!("Simple question, no sub-questions needed");
            vec![question.to_string()]
        };

        let final_chunks = if subs.len() > 1 {
            let mut gathered = Vec::new();
            for sub in &subs {
                gathered.extend(self.hybrid_retrieval(sub, SUB_QUESTION_K).await?);
            }
            rerank(question, dedupe(gathered))
        } else {
            self.hybrid_retrieval(question, SIMPLE_K).await?
        };

        if final_chunks.is_empty() {
            return Ok(Answer {
                text: NO_RELEVANT_INFORMATION.to_string(),
                sources: Vec::new(),
            });
        }

        let context = final_chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let text = self.model.generate(&answer_prompt(&context, question)).await?;
        let sources = final_chunks
            .iter()
            .take(CITED_CHUNKS)
            .map(|c| c.page_label())
            .collect();

        Ok(Answer { text, sources })
    }
}

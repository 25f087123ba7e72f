//! NGO matching against a program description.
//!
//! Semantic path: embed the program and every NGO, rank by cosine
//! similarity. Lexical path (fallback): shared content tokens between the
//! program and each NGO's description plus focus areas.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{require_text, OracleError, OracleResult, Result};
use crate::fallback::FallbackPolicy;
use crate::oracle::Oracle;
use crate::scale;
use crate::text;
use crate::types::entity::Ngo;
use crate::types::results::{MatchResult, NgoMatch, Provenance};

/// Cache key: the NGO id plus a hash of the text that was embedded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub id: Uuid,
    pub content_hash: String,
}

#[derive(Debug)]
struct CachedEmbedding {
    content_hash: String,
    vector: Arc<Vec<f32>>,
}

/// Lazily populated NGO embedding cache.
///
/// Holds at most one vector per NGO id. A lookup only hits when the stored
/// content hash matches, so an edited description never reuses a stale
/// vector. Each key is written once; the first completed write wins. A
/// write for new content replaces the NGO's old vector.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    entries: DashMap<Uuid, CachedEmbedding>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(ngo: &Ngo) -> CacheKey {
        CacheKey {
            id: ngo.id,
            content_hash: text::content_hash(&embedding_input(ngo)),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<Vec<f32>>> {
        self.entries
            .get(&key.id)
            .filter(|entry| entry.content_hash == key.content_hash)
            .map(|entry| Arc::clone(&entry.vector))
    }

    /// Insert unless present. Returns the stored vector either way.
    pub fn insert(&self, key: CacheKey, embedding: Vec<f32>) -> Arc<Vec<f32>> {
        match self.entries.entry(key.id) {
            Entry::Occupied(entry) if entry.get().content_hash == key.content_hash => {
                Arc::clone(&entry.get().vector)
            }
            Entry::Occupied(mut entry) => {
                debug!(ngo_id = %key.id, "Replacing embedding for edited NGO");
                let vector = Arc::new(embedding);
                entry.insert(CachedEmbedding {
                    content_hash: key.content_hash,
                    vector: Arc::clone(&vector),
                });
                vector
            }
            Entry::Vacant(entry) => {
                let vector = Arc::new(embedding);
                entry.insert(CachedEmbedding {
                    content_hash: key.content_hash,
                    vector: Arc::clone(&vector),
                });
                vector
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Text submitted for an NGO's embedding; the name stands in when an NGO
/// has neither focus areas nor a description.
fn embedding_input(ngo: &Ngo) -> String {
    let text = ngo.embedding_text();
    if text.is_empty() {
        ngo.name.clone()
    } else {
        text
    }
}

/// Cosine similarity between two vectors. Mismatched or zero vectors give 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Similarity above which two entities count as the same record.
pub const DUPLICATE_THRESHOLD: f32 = 0.92;

/// First entry in `existing` whose similarity to `embedding` is strictly
/// above `threshold`.
pub fn find_duplicate(embedding: &[f32], existing: &[(Uuid, Vec<f32>)], threshold: f32) -> Option<Uuid> {
    existing
        .iter()
        .find(|(_, candidate)| cosine_similarity(embedding, candidate) > threshold)
        .map(|(id, _)| *id)
}

/// Share of the program's content tokens that appear in the NGO text.
pub fn lexical_alignment(program_tokens: &BTreeSet<String>, ngo: &Ngo) -> u8 {
    if program_tokens.is_empty() {
        return 0;
    }
    let ngo_text = format!("{} {}", ngo.description, ngo.focus_areas.join(" "));
    let ngo_tokens = text::content_tokens(&ngo_text);
    let shared = program_tokens.intersection(&ngo_tokens).count();
    scale::clamp_score(shared as f64 / program_tokens.len() as f64 * 100.0)
}

fn lexical_scores(program: &str, corpus: &[Ngo]) -> Vec<u8> {
    let program_tokens = text::content_tokens(program);
    corpus
        .iter()
        .map(|ngo| lexical_alignment(&program_tokens, ngo))
        .collect()
}

/// Pair scores with NGOs, sort by score desc then name asc, apply limit.
fn rank(corpus: &[Ngo], scores: Vec<u8>, limit: Option<usize>) -> Vec<NgoMatch> {
    let mut matches: Vec<NgoMatch> = corpus
        .iter()
        .zip(scores)
        .map(|(ngo, alignment_score)| NgoMatch {
            ngo: ngo.clone(),
            alignment_score,
        })
        .collect();

    matches.sort_by(|a, b| {
        b.alignment_score
            .cmp(&a.alignment_score)
            .then_with(|| a.ngo.name.cmp(&b.ngo.name))
    });
    if let Some(limit) = limit {
        matches.truncate(limit);
    }
    matches
}

/// Ranks an NGO corpus against a program description.
pub struct MatchingService<O: Oracle> {
    oracle: O,
    policy: FallbackPolicy,
    cache: Arc<EmbeddingCache>,
    limit: Option<usize>,
}

impl<O: Oracle> MatchingService<O> {
    pub fn new(oracle: O, policy: FallbackPolicy) -> Self {
        Self {
            oracle,
            policy,
            cache: Arc::new(EmbeddingCache::new()),
            limit: None,
        }
    }

    /// Share an embedding cache across services.
    pub fn with_cache(mut self, cache: Arc<EmbeddingCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Keep only the top `limit` matches.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn cache(&self) -> &Arc<EmbeddingCache> {
        &self.cache
    }

    /// Rank `corpus` against `program`.
    ///
    /// Errors only on a blank program. An empty corpus gives an empty result.
    pub async fn match_ngos(&self, program: &str, corpus: &[Ngo]) -> Result<MatchResult> {
        let program = require_text("program description", program)?;

        if corpus.is_empty() {
            debug!("Empty NGO corpus, nothing to match");
            return Ok(MatchResult::empty(Provenance::Local));
        }

        let sourced = self
            .policy
            .run(
                "match_ngos",
                self.semantic_scores(program, corpus),
                || lexical_scores(program, corpus),
            )
            .await;

        let matches = rank(corpus, sourced.value, self.limit);
        info!(
            corpus = corpus.len(),
            returned = matches.len(),
            provenance = %sourced.provenance,
            "Matched NGOs"
        );

        Ok(MatchResult {
            matches,
            provenance: sourced.provenance,
        })
    }

    /// Existing entity that `text` duplicates, judged by embedding similarity.
    ///
    /// Without an embedding the check cannot run and reports no duplicate.
    pub async fn check_duplicate(&self, text: &str, existing: &[(Uuid, Vec<f32>)]) -> Result<Option<Uuid>> {
        let text = require_text("entity text", text)?;
        if existing.is_empty() {
            return Ok(None);
        }

        let sourced = self
            .policy
            .run(
                "check_duplicate",
                async {
                    let embedding = self.oracle.embed(text).await?;
                    Ok::<_, OracleError>(find_duplicate(&embedding, existing, DUPLICATE_THRESHOLD))
                },
                || None,
            )
            .await;

        if let Some(id) = sourced.value {
            info!(duplicate_of = %id, "Duplicate entity detected");
        }
        Ok(sourced.value)
    }

    async fn semantic_scores(&self, program: &str, corpus: &[Ngo]) -> OracleResult<Vec<u8>> {
        let program_embedding = self.oracle.embed(program).await?;
        if program_embedding.is_empty() {
            return Err(OracleError::MalformedResponse("empty program embedding".into()));
        }

        let embeddings = self.corpus_embeddings(corpus).await?;
        embeddings
            .iter()
            .map(|embedding| {
                if embedding.len() != program_embedding.len() {
                    return Err(OracleError::MalformedResponse(format!(
                        "embedding dimension mismatch: {} vs {}",
                        embedding.len(),
                        program_embedding.len()
                    )));
                }
                Ok(scale::from_similarity(cosine_similarity(
                    &program_embedding,
                    embedding,
                )))
            })
            .collect()
    }

    /// Cached vectors for every NGO, embedding the misses in one batch.
    async fn corpus_embeddings(&self, corpus: &[Ngo]) -> OracleResult<Vec<Arc<Vec<f32>>>> {
        let keys: Vec<CacheKey> = corpus.iter().map(EmbeddingCache::key).collect();
        let mut resolved: Vec<Option<Arc<Vec<f32>>>> =
            keys.iter().map(|key| self.cache.get(key)).collect();

        let missing: Vec<usize> = resolved
            .iter()
            .enumerate()
            .filter(|(_, cached)| cached.is_none())
            .map(|(i, _)| i)
            .collect();

        debug!(
            cached = corpus.len() - missing.len(),
            missing = missing.len(),
            "NGO embedding cache lookup"
        );

        if !missing.is_empty() {
            let texts: Vec<String> = missing.iter().map(|&i| embedding_input(&corpus[i])).collect();
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            let computed = self.oracle.embed_batch(&refs).await?;

            if computed.len() != refs.len() {
                return Err(OracleError::MalformedResponse(format!(
                    "expected {} embeddings, got {}",
                    refs.len(),
                    computed.len()
                )));
            }

            for (&i, embedding) in missing.iter().zip(computed) {
                if embedding.is_empty() {
                    return Err(OracleError::MalformedResponse(format!(
                        "empty embedding for NGO '{}'",
                        corpus[i].name
                    )));
                }
                resolved[i] = Some(self.cache.insert(keys[i].clone(), embedding));
            }
        }

        resolved
            .into_iter()
            .map(|v| v.ok_or_else(|| OracleError::MalformedResponse("embedding missing".into())))
            .collect()
    }
}

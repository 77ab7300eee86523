//! textsim.rs — per-request TF-IDF text similarity.
//!
//! Builds one synthetic query document from the user profile plus one
//! document per candidate program, vectorizes the whole batch as a single
//! corpus (unigrams + bigrams, capped vocabulary, smoothed IDF, L2-normalized
//! vectors) and returns the query↔program cosine similarity on a 0–100 scale.
//!
//! The corpus is the current candidate set plus the current query, so the
//! model is re-fit per request. That is deliberate: sharing a fitted model
//! across calls would change relative term weights between requests and
//! break the closed-world interpretation. The scorer holds only
//! configuration, never fitted state, so one instance is safe to share.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::config::TextConfig;
use crate::model::{Program, UserProfile};

/// Seam between the combiner and the text-similarity implementation.
/// Returns one score per program, aligned by index, scale 0–100. Takes
/// references so the combiner can hand over its filtered candidate list
/// without cloning program snapshots.
pub trait TextScorer {
    fn score_batch(&self, user: &UserProfile, programs: &[&Program]) -> Vec<f32>;
}

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]+").expect("normalizer regex"));
static MULTI_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Identical normalization for every document: lowercase, strip everything
/// outside letters/digits/whitespace, collapse runs of whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, " ");
    MULTI_WS.replace_all(&stripped, " ").trim().to_string()
}

/// Term sequence of a normalized document: unigrams plus adjacent-pair
/// bigrams (joined with a single space).
fn terms(normalized: &str) -> Vec<String> {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let mut out: Vec<String> = Vec::with_capacity(tokens.len().saturating_mul(2));
    for t in &tokens {
        out.push((*t).to_string());
    }
    for pair in tokens.windows(2) {
        out.push(format!("{} {}", pair[0], pair[1]));
    }
    out
}

/// TF-IDF implementation of [`TextScorer`].
#[derive(Debug, Clone, Default)]
pub struct TfidfScorer {
    cfg: TextConfig,
}

impl TfidfScorer {
    pub fn new(cfg: TextConfig) -> Self {
        Self { cfg }
    }

    /// Synthetic query document: departments + interest tags + free-text
    /// interest fields.
    fn user_query(&self, user: &UserProfile) -> String {
        let mut parts: Vec<&str> = Vec::new();
        parts.extend(user.departments.iter().map(String::as_str));
        parts.extend(user.interests.iter().map(String::as_str));
        parts.extend(user.interest_fields.iter().map(String::as_str));
        normalize(&parts.join(" "))
    }

    /// Program document: title, a length-capped content prefix, categories
    /// and departments. The char-based cap bounds vectorization cost and
    /// keeps one long notice from dominating the vocabulary.
    fn program_text(&self, program: &Program) -> String {
        let prefix: String = program
            .content
            .chars()
            .take(self.cfg.content_prefix_chars)
            .collect();
        let mut parts: Vec<&str> = vec![program.title.as_str(), prefix.as_str()];
        parts.extend(program.categories.iter().map(String::as_str));
        parts.extend(program.departments.iter().map(String::as_str));
        normalize(&parts.join(" "))
    }
}

impl TextScorer for TfidfScorer {
    fn score_batch(&self, user: &UserProfile, programs: &[&Program]) -> Vec<f32> {
        if programs.is_empty() {
            return Vec::new();
        }

        // Corpus: query document first, then one document per program.
        let mut docs: Vec<Vec<String>> = Vec::with_capacity(programs.len() + 1);
        docs.push(terms(&self.user_query(user)));
        for p in programs {
            docs.push(terms(&self.program_text(p)));
        }

        // Document frequencies (for the IDF weights) and total corpus counts
        // (for vocabulary selection) over the whole batch, min_df = 1.
        let mut df: HashMap<&str, usize> = HashMap::new();
        let mut corpus_count: HashMap<&str, usize> = HashMap::new();
        for doc in &docs {
            for term in doc {
                *corpus_count.entry(term.as_str()).or_insert(0) += 1;
            }
            let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        if df.is_empty() {
            // Every document emptied out under normalization. Text similarity
            // is an enhancement, not a required signal: recover locally.
            warn!(
                programs = programs.len(),
                "degenerate text corpus, returning zero similarity for all candidates"
            );
            return vec![0.0; programs.len()];
        }

        // Vocabulary: top terms by total corpus count (the usual
        // `max_features` semantic — ranking by document frequency would
        // preferentially keep the least discriminative terms under a small
        // cap), lexicographic tie-break so the selection is deterministic.
        // Each entry keeps its DF for the IDF weights.
        let mut ranked: Vec<(&str, usize)> = df.into_iter().collect();
        ranked.sort_by(|a, b| {
            corpus_count[b.0]
                .cmp(&corpus_count[a.0])
                .then_with(|| a.0.cmp(b.0))
        });
        ranked.truncate(self.cfg.max_features);

        let n = docs.len() as f32;
        let vocab_index: HashMap<&str, usize> = ranked
            .iter()
            .enumerate()
            .map(|(idx, (term, _))| (*term, idx))
            .collect();
        // Smoothed IDF: ln((1 + n) / (1 + df)) + 1.
        let idf: Vec<f32> = ranked
            .iter()
            .map(|(_, df)| ((1.0 + n) / (1.0 + *df as f32)).ln() + 1.0)
            .collect();

        // TF-IDF vector per document, L2-normalized so cosine is a dot product.
        let vectorize = |doc: &[String]| -> Vec<f32> {
            let mut v = vec![0.0f32; idf.len()];
            for term in doc {
                if let Some(&idx) = vocab_index.get(term.as_str()) {
                    v[idx] += 1.0;
                }
            }
            let mut norm = 0.0f32;
            for (slot, w) in v.iter_mut().zip(idf.iter()) {
                *slot *= w;
                norm += *slot * *slot;
            }
            let norm = norm.sqrt();
            if norm > 0.0 {
                for slot in &mut v {
                    *slot /= norm;
                }
            }
            v
        };

        let query_vec = vectorize(&docs[0]);
        if query_vec.iter().all(|&x| x == 0.0) {
            warn!("query document empty after normalization, text similarity is zero");
            return vec![0.0; programs.len()];
        }

        docs[1..]
            .iter()
            .map(|doc| {
                let v = vectorize(doc);
                let cos: f32 = query_vec.iter().zip(v.iter()).map(|(a, b)| a * b).sum();
                cos.clamp(0.0, 1.0) * 100.0
            })
            .collect()
    }
}

//! Okapi BM25 keyword index over whitespace tokens.

use rayon::prelude::*;
use std::collections::HashMap;

const K1: f64 = 1.5;
const B: f64 = 0.75;
/// Negative IDF values are floored to `EPSILON * average_idf`.
const EPSILON: f64 = 0.25;

pub struct Bm25 {
    doc_freqs: Vec<HashMap<String, usize>>,
    doc_lens: Vec<usize>,
    avgdl: f64,
    idf: HashMap<String, f64>,
}

pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

impl Bm25 {
    pub fn new<S: AsRef<str>>(corpus: &[S]) -> Self {
        let mut doc_freqs = Vec::with_capacity(corpus.len());
        let mut doc_lens = Vec::with_capacity(corpus.len());
        let mut containing: HashMap<String, usize> = HashMap::new();
        let mut total_len = 0usize;

        for doc in corpus {
            let tokens = tokenize(doc.as_ref());
            total_len += tokens.len();
            doc_lens.push(tokens.len());

            let mut freqs: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *freqs.entry(token.to_string()).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *containing.entry(term.clone()).or_insert(0) += 1;
            }
            doc_freqs.push(freqs);
        }

        let n = corpus.len() as f64;
        let avgdl = if corpus.is_empty() {
            0.0
        } else {
            total_len as f64 / n
        };

        let mut idf = HashMap::with_capacity(containing.len());
        let mut idf_sum = 0.0;
        let mut negative = Vec::new();
        for (term, count) in containing {
            let count = count as f64;
            let value = (n - count + 0.5).ln() - (count + 0.5).ln();
            idf_sum += value;
            if value < 0.0 {
                negative.push(term.clone());
            }
            idf.insert(term, value);
        }
        if !idf.is_empty() {
            let floor = EPSILON * idf_sum / idf.len() as f64;
            for term in negative {
                idf.insert(term, floor);
            }
        }

        Self {
            doc_freqs,
            doc_lens,
            avgdl,
            idf,
        }
    }

    pub fn len(&self) -> usize {
        self.doc_lens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lens.is_empty()
    }

    /// One score per document, in corpus order.
    pub fn scores(&self, query: &str) -> Vec<f64> {
        let terms = tokenize(query);
        self.doc_freqs
            .par_iter()
            .zip(self.doc_lens.par_iter())
            .map(|(freqs, &len)| {
                let norm = if self.avgdl > 0.0 {
                    1.0 - B + B * len as f64 / self.avgdl
                } else {
                    1.0
                };
                terms
                    .iter()
                    .map(|term| {
                        let tf = freqs.get(*term).copied().unwrap_or(0) as f64;
                        let idf = self.idf.get(*term).copied().unwrap_or(0.0);
                        idf * (tf * (K1 + 1.0)) / (tf + K1 * norm)
                    })
                    .sum::<f64>()
            })
            .collect()
    }

    /// Indices of the `k` best documents, best first. Ties keep corpus order.
    pub fn top_k(&self, query: &str, k: usize) -> Vec<usize> {
        let scores = self.scores(query);
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        order.truncate(k);
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<&'static str> {
        vec![
            "the pump must be primed before first use",
            "warranty covers parts for two years",
            "clean the filter every month",
            "the display shows error codes",
        ]
    }

    #[test]
    fn test_matching_document_scores_highest() {
        let index = Bm25::new(&corpus());
        let best = index.top_k("primed pump", 1);
        assert_eq!(best, vec![0]);
    }

    #[test]
    fn test_unknown_terms_score_zero() {
        let index = Bm25::new(&corpus());
        assert!(index.scores("zebra").iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_common_term_idf_is_floored_positive() {
        // "the" appears in 3 of 4 documents, which gives a negative raw IDF
        let index = Bm25::new(&corpus());
        assert!(index.idf["the"] > 0.0);
    }

    #[test]
    fn test_top_k_caps_results() {
        let index = Bm25::new(&corpus());
        assert_eq!(index.top_k("the", 2).len(), 2);
        assert_eq!(index.top_k("the", 10).len(), 4);
    }

    #[test]
    fn test_empty_corpus() {
        let index = Bm25::new::<&str>(&[]);
        assert!(index.is_empty());
        assert!(index.top_k("anything", 3).is_empty());
    }
}

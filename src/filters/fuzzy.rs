//! Fuzzy key matching
//!
//! Keys are scored with nucleo's path-aware matcher. Scores are normalized
//! against the score of the term matched with itself, which turns the
//! caller's `[0, 1]` threshold into a cut-off on match quality.

use crate::PhotoRecord;
use nucleo::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo::{Config, Matcher, Utf32Str};

/// Highest quality a key without a verbatim match can reach
const NEAR_EXACT: f64 = 1.0 - f64::EPSILON;

/// Scores keys against one search term
pub struct FuzzyScorer {
    term: String,
    matcher: Matcher,
    pattern: Pattern,
    perfect: u32,
    buf: Vec<char>,
}

impl FuzzyScorer {
    /// Prepare a scorer for `term`
    ///
    /// Whitespace separates atoms; every atom must match.
    #[must_use]
    pub fn new(term: &str) -> Self {
        let mut matcher = Matcher::new(Config::DEFAULT.match_paths());
        let pattern = Pattern::new(term, CaseMatching::Smart, Normalization::Smart, AtomKind::Fuzzy);
        let mut buf = Vec::new();
        let perfect = pattern
            .score(Utf32Str::new(term, &mut buf), &mut matcher)
            .unwrap_or(0)
            .max(1);

        Self {
            term: term.to_string(),
            matcher,
            pattern,
            perfect,
            buf,
        }
    }

    /// Raw matcher score, `None` when the key does not match at all
    pub fn score(&mut self, key: &str) -> Option<u32> {
        self.pattern
            .score(Utf32Str::new(key, &mut self.buf), &mut self.matcher)
    }

    /// Match quality in `[0, 1]`
    ///
    /// Only a key containing the term verbatim has quality 1; every other key,
    /// including case variants, stays strictly below it.
    pub fn quality(&mut self, key: &str) -> f64 {
        self.rank(key).0
    }

    /// Quality and raw score of `key`
    fn rank(&mut self, key: &str) -> (f64, u32) {
        let score = self.score(key).unwrap_or(0);
        if key.contains(self.term.as_str()) {
            return (1.0, score);
        }
        let quality = (f64::from(score) / f64::from(self.perfect)).min(NEAR_EXACT);
        (quality, score)
    }
}

/// Keep records whose key is within `threshold` of `term`, best match first
///
/// Distance is `1 - quality`; a record is kept when its distance does not
/// exceed the threshold. Results are ordered by quality, then raw score;
/// records equal on both keep their input order.
#[must_use]
pub fn search<'a>(photos: Vec<&'a PhotoRecord>, term: &str, threshold: f64) -> Vec<&'a PhotoRecord> {
    let threshold = threshold.clamp(0.0, 1.0);
    let mut scorer = FuzzyScorer::new(term);

    let mut ranked: Vec<(f64, u32, &PhotoRecord)> = photos
        .into_iter()
        .filter_map(|photo| {
            let (quality, score) = scorer.rank(&photo.key);
            (1.0 - quality <= threshold).then_some((quality, score, photo))
        })
        .collect();

    // Stable: ties keep input order
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(b.1.cmp(&a.1)));
    ranked.into_iter().map(|(_, _, photo)| photo).collect()
}

use strsim::levenshtein;
use tracing::trace;

use crate::model::Candidate;
use crate::normalize::{NormalizedNames, PreparedQuery};

/// Winkler prefix bonus applies to at most this many leading characters.
const WINKLER_MAX_PREFIX: usize = 4;
const WINKLER_PREFIX_SCALE: f64 = 0.1;

/// Edit-distance floors for the fuzzy tier.
const NEAR_TYPO_DISTANCE: usize = 2;
const NEAR_TYPO_FLOOR: f64 = 0.75;
const FAR_TYPO_DISTANCE: usize = 3;
const FAR_TYPO_FLOOR: f64 = 0.60;

/// Which tier of the name comparison produced the score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchTier {
    ExactDisplay,
    ExactPrimary,
    DisplayPrefix,
    PrimaryPrefix,
    DisplayContains,
    PrimaryContains,
    Fuzzy,
    EmptyQuery,
}

impl MatchTier {
    /// Fixed score for the deterministic tiers; `None` for the fuzzy tier.
    pub fn fixed_score(self) -> Option<f64> {
        match self {
            Self::ExactDisplay => Some(1.0),
            Self::ExactPrimary => Some(0.95),
            Self::DisplayPrefix => Some(0.85),
            Self::PrimaryPrefix => Some(0.80),
            Self::DisplayContains => Some(0.70),
            Self::PrimaryContains => Some(0.65),
            Self::EmptyQuery => Some(0.0),
            Self::Fuzzy => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NameMatch {
    pub tier: MatchTier,
    pub score: f64,
}

/// Jaro similarity of `shorter` against `longer` (by character count).
///
/// Transpositions are halved as a real number, so an odd count of
/// out-of-order matches is not rounded down. The match window is clamped at
/// zero for single-character strings.
fn jaro(shorter: &[char], longer: &[char]) -> f64 {
    if longer.is_empty() {
        return 1.0;
    }
    let window = (longer.len() / 2).saturating_sub(1);

    let mut shorter_matched = vec![false; shorter.len()];
    let mut longer_matched = vec![false; longer.len()];
    let mut matches = 0usize;
    for (i, c) in shorter.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(longer.len());
        for j in lo..hi {
            if !longer_matched[j] && longer[j] == *c {
                shorter_matched[i] = true;
                longer_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }
    if matches == 0 {
        return 0.0;
    }

    let from_shorter = shorter
        .iter()
        .zip(&shorter_matched)
        .filter_map(|(c, hit)| hit.then_some(c));
    let from_longer = longer
        .iter()
        .zip(&longer_matched)
        .filter_map(|(c, hit)| hit.then_some(c));
    let transpositions = from_shorter
        .zip(from_longer)
        .filter(|(a, b)| a != b)
        .count();

    let m = matches as f64;
    let t = transpositions as f64 / 2.0;
    (m / shorter.len() as f64 + m / longer.len() as f64 + (m - t) / m) / 3.0
}

/// Jaro-Winkler similarity in [0, 1].
///
/// Each leading character the two strings share (up to four) adds
/// `0.1 * (1 - jaro)` on top of the Jaro score.
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let base = if a_chars.len() <= b_chars.len() {
        jaro(&a_chars, &b_chars)
    } else {
        jaro(&b_chars, &a_chars)
    };

    let mut score = base;
    for (x, y) in a_chars.iter().zip(&b_chars).take(WINKLER_MAX_PREFIX) {
        if x != y {
            break;
        }
        score += WINKLER_PREFIX_SCALE * (1.0 - base);
    }
    score.min(1.0)
}

/// Levenshtein edit distance, counted in characters.
pub fn edit_distance(a: &str, b: &str) -> usize {
    levenshtein(a, b)
}

/// Compare a prepared query against a candidate's normalized names.
/// Tiers are tried in order and the first hit wins.
pub fn name_match(query: &PreparedQuery, names: &NormalizedNames) -> NameMatch {
    if query.is_empty() {
        return tier_match(MatchTier::EmptyQuery);
    }
    let q = query.as_str();

    let tier = if names.display == q {
        Some(MatchTier::ExactDisplay)
    } else if names.primary == q {
        Some(MatchTier::ExactPrimary)
    } else if names.display.starts_with(q) {
        Some(MatchTier::DisplayPrefix)
    } else if names.primary.starts_with(q) {
        Some(MatchTier::PrimaryPrefix)
    } else if names.display.contains(q) {
        Some(MatchTier::DisplayContains)
    } else if names.primary.contains(q) {
        Some(MatchTier::PrimaryContains)
    } else {
        None
    };

    match tier {
        Some(tier) => tier_match(tier),
        None => NameMatch {
            tier: MatchTier::Fuzzy,
            score: fuzzy_score(q, names),
        },
    }
}

/// Name-similarity signal for a raw query and candidate.
pub fn similarity(query: &str, candidate: &Candidate) -> f64 {
    name_match(&PreparedQuery::new(query), &NormalizedNames::of(candidate)).score
}

fn tier_match(tier: MatchTier) -> NameMatch {
    NameMatch {
        tier,
        score: tier.fixed_score().unwrap_or(0.0),
    }
}

/// Best Jaro-Winkler over both names, lifted by a floor when either name is a
/// small edit away from the query.
fn fuzzy_score(q: &str, names: &NormalizedNames) -> f64 {
    let jw = jaro_winkler(q, &names.display).max(jaro_winkler(q, &names.primary));
    let dist = edit_distance(q, &names.display).min(edit_distance(q, &names.primary));
    trace!(jw, dist, "name fell through to fuzzy tier");

    if dist <= NEAR_TYPO_DISTANCE {
        jw.max(NEAR_TYPO_FLOOR)
    } else if dist <= FAR_TYPO_DISTANCE {
        jw.max(FAR_TYPO_FLOOR)
    } else {
        jw
    }
}

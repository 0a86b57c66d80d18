//! Independent [0,1] calculators for the non-name signals.
//!
//! Each calculator degrades to a documented default when the candidate lacks
//! the field it reads; none of them can fail.

use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Duration, Utc};

use crate::model::{Candidate, RankingHints};
use crate::normalize::{NormalizedNames, PreparedKeywords};

/// Score returned when a signal has nothing to judge.
pub const NEUTRAL: f64 = 0.5;

const DAYS_PER_YEAR: i64 = 365;

// === ACCOUNT TRUST ===

const VERIFIED_TRUST: f64 = 0.4;
const AGE_UNKNOWN_TRUST: f64 = 0.15;
const LONG_BIO_TRUST: f64 = 0.3;
const SHORT_BIO_TRUST: f64 = 0.15;

/// Trust bonus for account age, oldest bracket first.
fn age_trust(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(created_at) = created_at else {
        return AGE_UNKNOWN_TRUST;
    };
    let age = now.signed_duration_since(created_at);
    if age >= Duration::days(3 * DAYS_PER_YEAR) {
        0.3
    } else if age >= Duration::days(DAYS_PER_YEAR) {
        0.2
    } else if age >= Duration::days(90) {
        0.1
    } else {
        0.0
    }
}

/// Account trust: verification, age and whether a bio was written.
pub fn account_signal(candidate: &Candidate, now: DateTime<Utc>) -> f64 {
    let mut score = 0.0;
    if candidate.verified {
        score += VERIFIED_TRUST;
    }
    score += age_trust(candidate.created_at, now);
    if let Some(bio) = candidate.bio_text() {
        score += if bio.chars().count() > 10 {
            LONG_BIO_TRUST
        } else {
            SHORT_BIO_TRUST
        };
    }
    score.min(1.0)
}

// === KEYWORD HITS ===

/// Fraction of hint keywords found in the bio, case-insensitively.
///
/// Neutral when no keywords were supplied, zero when there is no bio to
/// search.
pub fn keyword_signal(candidate: &Candidate, keywords: Option<&PreparedKeywords>) -> f64 {
    let Some(keywords) = keywords.map(PreparedKeywords::as_slice) else {
        return NEUTRAL;
    };
    let Some(bio) = candidate.bio_text() else {
        return 0.0;
    };

    let bio = bio.to_lowercase();
    let hits = keywords.iter().filter(|kw| bio.contains(kw.as_str())).count();
    ratio(hits, keywords.len()).min(1.0)
}

// === GROUP OVERLAP ===

/// Strategy for the group-overlap signal.
///
/// Implementations must not reach out to the network; memberships have to be
/// fetched by the caller before ranking.
pub trait GroupOverlap: Send + Sync {
    fn score(&self, candidate: &Candidate, hints: Option<&RankingHints>) -> f64;
}

/// Always neutral. Used when no membership data is available.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeutralGroupOverlap;

impl GroupOverlap for NeutralGroupOverlap {
    fn score(&self, _candidate: &Candidate, _hints: Option<&RankingHints>) -> f64 {
        NEUTRAL
    }
}

/// Overlap against pre-fetched group memberships, keyed by candidate id.
#[derive(Clone, Debug, Default)]
pub struct MembershipOverlap {
    memberships: AHashMap<u64, AHashSet<String>>,
}

impl MembershipOverlap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the groups a candidate belongs to. Repeated calls accumulate.
    pub fn insert<I, S>(&mut self, candidate_id: u64, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.memberships
            .entry(candidate_id)
            .or_default()
            .extend(groups.into_iter().map(Into::into));
    }
}

impl<S: Into<String>> FromIterator<(u64, Vec<S>)> for MembershipOverlap {
    fn from_iter<T: IntoIterator<Item = (u64, Vec<S>)>>(iter: T) -> Self {
        let mut overlap = Self::new();
        for (id, groups) in iter {
            overlap.insert(id, groups);
        }
        overlap
    }
}

impl GroupOverlap for MembershipOverlap {
    /// Fraction of distinct hinted groups the candidate belongs to. Neutral
    /// when there are no hinted groups or no membership data for the candidate.
    fn score(&self, candidate: &Candidate, hints: Option<&RankingHints>) -> f64 {
        let Some(group_ids) = hints.and_then(RankingHints::group_id_list) else {
            return NEUTRAL;
        };
        let Some(groups) = self.memberships.get(&candidate.id) else {
            return NEUTRAL;
        };

        let wanted: AHashSet<&str> = group_ids.iter().map(String::as_str).collect();
        let shared = wanted.iter().filter(|g| groups.contains(**g)).count();
        ratio(shared, wanted.len())
    }
}

// === PROFILE COMPLETENESS ===

const DISTINCT_DISPLAY_NAME: f64 = 0.3;
const VERIFIED_COMPLETENESS: f64 = 0.3;

fn bio_completeness(bio: Option<&str>) -> f64 {
    match bio.map(|b| b.chars().count()) {
        Some(len) if len > 50 => 0.4,
        Some(len) if len > 10 => 0.3,
        Some(_) => 0.1,
        None => 0.0,
    }
}

/// How filled-in the profile looks.
pub fn completeness_signal(candidate: &Candidate, names: &NormalizedNames) -> f64 {
    let mut score = 0.0;
    if names.differ() {
        score += DISTINCT_DISPLAY_NAME;
    }
    score += bio_completeness(candidate.bio_text());
    if candidate.verified {
        score += VERIFIED_COMPLETENESS;
    }
    score.min(1.0)
}

/// `part / whole` as f64; zero when `whole` is zero.
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64
}

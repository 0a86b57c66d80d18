use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::debug;

use crate::explain::breakdown;
use crate::model::{Candidate, RankingHints, ScoredCandidate, SignalVector};
use crate::normalize::{NormalizedNames, PreparedKeywords, PreparedQuery};
use crate::signals::{
    account_signal, completeness_signal, keyword_signal, GroupOverlap, NeutralGroupOverlap,
};
use crate::similarity::name_match;
use crate::weights::WeightVector;

/// Default truncation for `top_suggestions`.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Scores and orders candidates for a query.
///
/// A `Ranker` holds only configuration: weights, the group-overlap strategy
/// and an optional pinned reference time. Nothing is mutated while ranking,
/// so one instance can be shared across threads.
#[derive(Clone)]
pub struct Ranker {
    weights: WeightVector,
    group_overlap: Arc<dyn GroupOverlap>,
    reference_time: Option<DateTime<Utc>>,
}

impl fmt::Debug for Ranker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ranker")
            .field("weights", &self.weights)
            .field("reference_time", &self.reference_time)
            .finish_non_exhaustive()
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self {
            weights: WeightVector::DEFAULT,
            group_overlap: Arc::new(NeutralGroupOverlap),
            reference_time: None,
        }
    }
}

impl Ranker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(mut self, weights: WeightVector) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_group_overlap(mut self, strategy: impl GroupOverlap + 'static) -> Self {
        self.group_overlap = Arc::new(strategy);
        self
    }

    /// Pin "now" for account-age scoring. Without it the clock is read once
    /// per call.
    pub fn with_reference_time(mut self, at: DateTime<Utc>) -> Self {
        self.reference_time = Some(at);
        self
    }

    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }

    /// Score a single candidate.
    pub fn score<'a>(
        &self,
        query: &str,
        candidate: &'a Candidate,
        hints: Option<&RankingHints>,
    ) -> ScoredCandidate<'a> {
        let keywords = PreparedKeywords::from_hints(hints);
        self.score_prepared(
            &PreparedQuery::new(query),
            keywords.as_ref(),
            candidate,
            hints,
            self.now(),
        )
    }

    fn score_prepared<'a>(
        &self,
        query: &PreparedQuery,
        keywords: Option<&PreparedKeywords>,
        candidate: &'a Candidate,
        hints: Option<&RankingHints>,
        now: DateTime<Utc>,
    ) -> ScoredCandidate<'a> {
        let names = NormalizedNames::of(candidate);
        let signals = SignalVector {
            name: name_match(query, &names).score,
            account: account_signal(candidate, now),
            keyword: keyword_signal(candidate, keywords),
            group: self.group_overlap.score(candidate, hints),
            completeness: completeness_signal(candidate, &names),
        };

        ScoredCandidate {
            candidate,
            confidence: signals.confidence(&self.weights),
            breakdown: breakdown(candidate, &signals, keywords),
            signals,
        }
    }

    /// Score every candidate and order by confidence, highest first.
    ///
    /// Candidates with equal confidence keep their input order. Nothing is
    /// dropped, however low it scores.
    pub fn rank<'a>(
        &self,
        query: &str,
        candidates: &'a [Candidate],
        hints: Option<&RankingHints>,
    ) -> Vec<ScoredCandidate<'a>> {
        let query = PreparedQuery::new(query);
        let keywords = PreparedKeywords::from_hints(hints);
        let now = self.now();
        debug!(
            candidates = candidates.len(),
            has_hints = hints.is_some(),
            "ranking candidates"
        );
        if query.is_empty() {
            debug!("empty query, name similarity is zero for every candidate");
        }

        // Collect preserves input order, which the stable sort below relies on.
        let mut scored: Vec<ScoredCandidate<'a>> = candidates
            .par_iter()
            .map(|candidate| {
                self.score_prepared(&query, keywords.as_ref(), candidate, hints, now)
            })
            .collect();
        scored.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        scored
    }

    /// The first `limit` entries of `rank`.
    pub fn top_suggestions<'a>(
        &self,
        query: &str,
        candidates: &'a [Candidate],
        limit: usize,
        hints: Option<&RankingHints>,
    ) -> Vec<ScoredCandidate<'a>> {
        let mut ranked = self.rank(query, candidates, hints);
        ranked.truncate(limit);
        ranked
    }

    /// Rank several queries against the same candidate list, in parallel.
    /// Results come back in query order.
    pub fn rank_batch<'a, Q>(
        &self,
        queries: &[Q],
        candidates: &'a [Candidate],
        hints: Option<&RankingHints>,
    ) -> Vec<Vec<ScoredCandidate<'a>>>
    where
        Q: AsRef<str> + Sync,
    {
        queries
            .par_iter()
            .map(|query| self.rank(query.as_ref(), candidates, hints))
            .collect()
    }
}

/// Rank with an optional weight override and the neutral group strategy.
pub fn rank<'a>(
    query: &str,
    candidates: &'a [Candidate],
    hints: Option<&RankingHints>,
    weights: Option<WeightVector>,
) -> Vec<ScoredCandidate<'a>> {
    Ranker::new()
        .with_weights(weights.unwrap_or_default())
        .rank(query, candidates, hints)
}

/// `rank` truncated to `limit` entries.
pub fn top_suggestions<'a>(
    query: &str,
    candidates: &'a [Candidate],
    limit: usize,
    hints: Option<&RankingHints>,
    weights: Option<WeightVector>,
) -> Vec<ScoredCandidate<'a>> {
    Ranker::new()
        .with_weights(weights.unwrap_or_default())
        .top_suggestions(query, candidates, limit, hints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::Reason;
    use crate::signals::MembershipOverlap;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap()
    }

    fn ranker() -> Ranker {
        Ranker::new().with_reference_time(now())
    }

    #[test]
    fn test_rank_empty_candidates() {
        assert!(ranker().rank("anyone", &[], None).is_empty());
        assert!(ranker().top_suggestions("anyone", &[], 5, None).is_empty());
    }

    #[test]
    fn test_rank_orders_by_confidence() {
        let candidates = vec![
            Candidate::new(1, "zzzzzz", "qqqqqq"),
            Candidate::new(2, "BuilderBob", "Bob"),
            Candidate::new(3, "bob_the_builder", "BuilderBob"),
        ];
        let ranked = ranker().rank("builderbob", &candidates, None);
        let ids: Vec<u64> = ranked.iter().map(ScoredCandidate::id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let candidates: Vec<Candidate> = (10..20)
            .map(|id| Candidate::new(id, "twin", "Twin"))
            .collect();
        let ranked = ranker().rank("twin", &candidates, None);
        let ids: Vec<u64> = ranked.iter().map(ScoredCandidate::id).collect();
        assert_eq!(ids, (10..20).collect::<Vec<u64>>());
    }

    #[test]
    fn test_score_full_profile() {
        let candidate = Candidate::new(9, "RobloxUser", "Player123")
            .with_verified(true)
            .with_created_at(now() - Duration::days(4 * 365))
            .with_bio("join my discord server and say hi to everyone who plays here daily");
        let hints = RankingHints::with_keywords(["discord", "server"]);
        let scored = ranker().score("robloxuser", &candidate, Some(&hints));

        assert!((scored.signals.name - 0.95).abs() < 1e-9);
        assert!((scored.signals.account - 1.0).abs() < 1e-9);
        assert!((scored.signals.keyword - 1.0).abs() < 1e-9);
        assert!((scored.signals.group - 0.5).abs() < 1e-9);
        assert!((scored.signals.completeness - 1.0).abs() < 1e-9);
        // 0.38 + 0.25 + 0.15 + 0.05 + 0.10 = 0.93
        assert_eq!(scored.confidence, 93);
        assert_eq!(
            scored.breakdown,
            vec![
                Reason::ExactNameMatch,
                Reason::VerifiedBadge,
                Reason::EstablishedAccount,
                Reason::CompleteProfile,
                Reason::KeywordMatches,
            ]
        );
    }

    #[test]
    fn test_weight_override_changes_order() {
        let candidates = vec![
            Candidate::new(1, "gamer", "Gamer"),
            Candidate::new(2, "xqzvw", "Someone")
                .with_verified(true)
                .with_created_at(now() - Duration::days(2000))
                .with_bio("long enough biography text to count"),
        ];
        let only = |name, account| WeightVector {
            name,
            account,
            keyword: 0.0,
            group: 0.0,
            completeness: 0.0,
        };

        let by_name = ranker()
            .with_weights(only(1.0, 0.0))
            .rank("gamer", &candidates, None);
        assert_eq!(by_name[0].id(), 1);
        assert_eq!(by_name[0].confidence, 100);

        let by_trust = ranker()
            .with_weights(only(0.0, 1.0))
            .rank("gamer", &candidates, None);
        assert_eq!(by_trust[0].id(), 2);
        assert_eq!(by_trust[0].confidence, 100);
    }

    #[test]
    fn test_membership_strategy_feeds_group_signal() {
        let candidates = vec![Candidate::new(1, "a", "a"), Candidate::new(2, "a", "a")];
        let overlap: MembershipOverlap = [(2_u64, vec!["club"])].into_iter().collect();
        let hints = RankingHints::default().with_group_ids(["club"]);
        let ranked = ranker()
            .with_group_overlap(overlap)
            .rank("a", &candidates, Some(&hints));
        assert_eq!(ranked[0].id(), 2);
        assert!((ranked[0].signals.group - 1.0).abs() < 1e-9);
        assert!((ranked[1].signals.group - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_rank_batch_matches_rank() {
        let candidates = vec![
            Candidate::new(1, "alpha", "Alpha"),
            Candidate::new(2, "beta", "Beta"),
        ];
        let ranker = ranker();
        let batch = ranker.rank_batch(&["beta", "alpha"], &candidates, None);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], ranker.rank("beta", &candidates, None));
        assert_eq!(batch[1][0].id(), 1);
    }

    #[test]
    fn test_free_functions_use_defaults() {
        let candidates = vec![
            Candidate::new(1, "one", "One"),
            Candidate::new(2, "two", "Two"),
            Candidate::new(3, "three", "Three"),
        ];
        let top = top_suggestions("two", &candidates, 1, None, None);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id(), 2);
        assert_eq!(rank("two", &candidates, None, None).len(), 3);
    }
}

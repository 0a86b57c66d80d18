use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::explain::Reason;
use crate::weights::WeightVector;

/// A raw account record returned by the identity lookup service.
///
/// Field names follow the lookup service's camelCase JSON so records can be
/// deserialized as they arrive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: u64,
    pub primary_name: String,
    pub display_name: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl Candidate {
    pub fn new(
        id: u64,
        primary_name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            primary_name: primary_name.into(),
            display_name: display_name.into(),
            verified: false,
            created_at: None,
            bio: None,
        }
    }

    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    /// The bio, with an empty string treated as absent.
    pub fn bio_text(&self) -> Option<&str> {
        self.bio.as_deref().filter(|b| !b.is_empty())
    }
}

/// Optional caller-supplied context used to bias ranking.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingHints {
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub group_ids: Option<Vec<String>>,
}

impl RankingHints {
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: Some(keywords.into_iter().map(Into::into).collect()),
            group_ids: None,
        }
    }

    pub fn with_group_ids<I, S>(mut self, group_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_ids = Some(group_ids.into_iter().map(Into::into).collect());
        self
    }

    /// Keywords, or `None` when absent or empty.
    pub fn keyword_list(&self) -> Option<&[String]> {
        self.keywords.as_deref().filter(|k| !k.is_empty())
    }

    /// Group ids, or `None` when absent or empty.
    pub fn group_id_list(&self) -> Option<&[String]> {
        self.group_ids.as_deref().filter(|g| !g.is_empty())
    }
}

/// The five [0,1] sub-scores behind a confidence value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SignalVector {
    pub name: f64,
    pub account: f64,
    pub keyword: f64,
    pub group: f64,
    pub completeness: f64,
}

impl SignalVector {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.name,
            self.account,
            self.keyword,
            self.group,
            self.completeness,
        ]
    }

    /// Σ weight_i · signal_i
    pub fn weighted_sum(&self, weights: &WeightVector) -> f64 {
        self.as_array()
            .iter()
            .zip(weights.as_array())
            .map(|(signal, weight)| signal * weight)
            .sum()
    }

    /// round(100 · Σ weight_i · signal_i), floored at zero.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn confidence(&self, weights: &WeightVector) -> u32 {
        (self.weighted_sum(weights) * 100.0).round().max(0.0) as u32
    }
}

/// One ranked result. Borrows the candidate from the caller's input slice.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredCandidate<'a> {
    pub candidate: &'a Candidate,
    pub confidence: u32,
    pub signals: SignalVector,
    pub breakdown: Vec<Reason>,
}

impl ScoredCandidate<'_> {
    pub fn id(&self) -> u64 {
        self.candidate.id
    }

    /// Breakdown rendered as display strings.
    pub fn breakdown_labels(&self) -> Vec<&'static str> {
        self.breakdown.iter().map(Reason::label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_from_lookup_json() {
        let json = r#"{
            "id": 42,
            "primaryName": "RobloxUser",
            "displayName": "Player123",
            "verified": true,
            "createdAt": "2021-03-04T05:06:07Z"
        }"#;
        let candidate: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.id, 42);
        assert_eq!(candidate.primary_name, "RobloxUser");
        assert!(candidate.verified);
        assert!(candidate.created_at.is_some());
        assert_eq!(candidate.bio, None);
    }

    #[test]
    fn test_empty_bio_is_absent() {
        let candidate = Candidate::new(1, "a", "b").with_bio("");
        assert_eq!(candidate.bio_text(), None);
    }

    #[test]
    fn test_empty_hint_lists_are_absent() {
        let hints = RankingHints::with_keywords(Vec::<String>::new()).with_group_ids(["g1"]);
        assert!(hints.keyword_list().is_none());
        assert_eq!(hints.group_id_list().map(<[String]>::len), Some(1));
    }

    #[test]
    fn test_confidence_rounds_weighted_sum() {
        let signals = SignalVector {
            name: 1.0,
            account: 0.5,
            keyword: 0.5,
            group: 0.5,
            completeness: 0.0,
        };
        // 0.40 + 0.125 + 0.075 + 0.05 = 0.65
        assert_eq!(signals.confidence(&WeightVector::default()), 65);
    }

    #[test]
    fn test_confidence_floors_negative_sums() {
        let weights = WeightVector {
            name: -1.0,
            ..WeightVector::default()
        };
        let signals = SignalVector {
            name: 1.0,
            ..SignalVector::default()
        };
        assert_eq!(signals.confidence(&weights), 0);
    }
}

use std::fmt;

use serde::Serialize;

use crate::model::{Candidate, SignalVector};
use crate::normalize::PreparedKeywords;

const EXACT_NAME_THRESHOLD: f64 = 0.9;
const STRONG_NAME_THRESHOLD: f64 = 0.8;
const MODERATE_NAME_THRESHOLD: f64 = 0.6;
const ESTABLISHED_THRESHOLD: f64 = 0.7;
const COMPLETE_THRESHOLD: f64 = 0.7;
const KEYWORD_THRESHOLD: f64 = 0.5;

/// Why a candidate scored the way it did. Rendered to text only for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    ExactNameMatch,
    StrongNameSimilarity,
    ModerateNameSimilarity,
    VerifiedBadge,
    EstablishedAccount,
    CompleteProfile,
    KeywordMatches,
}

impl Reason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ExactNameMatch => "Exact name match",
            Self::StrongNameSimilarity => "Strong name similarity",
            Self::ModerateNameSimilarity => "Moderate name similarity",
            Self::VerifiedBadge => "Verified badge",
            Self::EstablishedAccount => "Established account",
            Self::CompleteProfile => "Complete profile",
            Self::KeywordMatches => "Keyword matches",
        }
    }

    /// At most one name tier applies.
    fn for_name(similarity: f64) -> Option<Self> {
        if similarity >= EXACT_NAME_THRESHOLD {
            Some(Self::ExactNameMatch)
        } else if similarity >= STRONG_NAME_THRESHOLD {
            Some(Self::StrongNameSimilarity)
        } else if similarity >= MODERATE_NAME_THRESHOLD {
            Some(Self::ModerateNameSimilarity)
        } else {
            None
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Breakdown tags in display order. Categories are independent of each other.
pub fn breakdown(
    candidate: &Candidate,
    signals: &SignalVector,
    keywords: Option<&PreparedKeywords>,
) -> Vec<Reason> {
    let mut reasons = Vec::with_capacity(5);
    reasons.extend(Reason::for_name(signals.name));
    if candidate.verified {
        reasons.push(Reason::VerifiedBadge);
    }
    if signals.account >= ESTABLISHED_THRESHOLD {
        reasons.push(Reason::EstablishedAccount);
    }
    if signals.completeness >= COMPLETE_THRESHOLD {
        reasons.push(Reason::CompleteProfile);
    }
    if keywords.is_some() && signals.keyword >= KEYWORD_THRESHOLD {
        reasons.push(Reason::KeywordMatches);
    }
    reasons
}

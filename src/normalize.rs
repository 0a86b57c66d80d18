use crate::model::{Candidate, RankingHints};

/// Canonical form used for every name comparison: trimmed and lowercased.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// A query normalized once per ranking call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedQuery {
    normalized: String,
}

impl PreparedQuery {
    pub fn new(query: &str) -> Self {
        Self {
            normalized: normalize(query),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

/// Hint keywords lowercased once per ranking call.
///
/// Blank entries are dropped; they would otherwise match every bio.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedKeywords {
    keywords: Vec<String>,
}

impl PreparedKeywords {
    /// `None` when no usable keyword was supplied.
    pub fn from_hints(hints: Option<&RankingHints>) -> Option<Self> {
        let keywords: Vec<String> = hints?
            .keyword_list()?
            .iter()
            .filter(|kw| !kw.trim().is_empty())
            .map(|kw| kw.to_lowercase())
            .collect();
        if keywords.is_empty() {
            return None;
        }
        Some(Self { keywords })
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }
}

/// Normalized copies of a candidate's two name fields.
/// The candidate record itself is never touched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedNames {
    pub display: String,
    pub primary: String,
}

impl NormalizedNames {
    pub fn of(candidate: &Candidate) -> Self {
        Self {
            display: normalize(&candidate.display_name),
            primary: normalize(&candidate.primary_name),
        }
    }

    pub fn differ(&self) -> bool {
        self.display != self.primary
    }
}

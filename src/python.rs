//! Python extension surface. Built with `--features python`.

use chrono::{DateTime, Utc};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::model::{Candidate, RankingHints, ScoredCandidate};
use crate::ranker::{self, DEFAULT_SUGGESTION_LIMIT};
use crate::similarity;
use crate::weights::WeightVector;

/// Input data for a single candidate record.
///
/// `verified`, `created_at` and `bio` may be left out of the dict; a missing
/// key reads the same as `False` or `None`.
#[derive(Debug, FromPyObject)]
#[pyo3(from_item_all)]
struct CandidateData {
    id: u64,
    primary_name: String,
    display_name: String,
    #[pyo3(default)]
    verified: bool,
    #[pyo3(default)]
    created_at: Option<String>,
    #[pyo3(default)]
    bio: Option<String>,
}

impl CandidateData {
    fn into_candidate(self) -> PyResult<Candidate> {
        let created_at = self
            .created_at
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|at| at.with_timezone(&Utc))
                    .map_err(|e| {
                        PyValueError::new_err(format!(
                            "candidate {}: bad created_at '{raw}': {e}",
                            self.id
                        ))
                    })
            })
            .transpose()?;

        Ok(Candidate {
            id: self.id,
            primary_name: self.primary_name,
            display_name: self.display_name,
            verified: self.verified,
            created_at,
            bio: self.bio,
        })
    }
}

/// Signal weights, passed as a dict from Python.
#[derive(Clone, Copy, Debug, FromPyObject)]
#[pyo3(from_item_all)]
struct WeightsData {
    name: f64,
    account: f64,
    keyword: f64,
    group: f64,
    completeness: f64,
}

impl From<WeightsData> for WeightVector {
    fn from(w: WeightsData) -> Self {
        Self {
            name: w.name,
            account: w.account,
            keyword: w.keyword,
            group: w.group,
            completeness: w.completeness,
        }
    }
}

/// One ranked candidate, returned to Python as a dict
#[derive(Clone, Debug, IntoPyObject)]
struct ScoredData {
    candidate_id: u64,
    confidence: u32,
    name: f64,
    account: f64,
    keyword: f64,
    group: f64,
    completeness: f64,
    breakdown: Vec<String>,
}

impl From<&ScoredCandidate<'_>> for ScoredData {
    fn from(scored: &ScoredCandidate<'_>) -> Self {
        Self {
            candidate_id: scored.id(),
            confidence: scored.confidence,
            name: scored.signals.name,
            account: scored.signals.account,
            keyword: scored.signals.keyword,
            group: scored.signals.group,
            completeness: scored.signals.completeness,
            breakdown: scored
                .breakdown_labels()
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

fn convert(
    candidates: Vec<CandidateData>,
    keywords: Option<Vec<String>>,
    group_ids: Option<Vec<String>>,
) -> PyResult<(Vec<Candidate>, RankingHints)> {
    let candidates = candidates
        .into_iter()
        .map(CandidateData::into_candidate)
        .collect::<PyResult<Vec<_>>>()?;
    Ok((candidates, RankingHints { keywords, group_ids }))
}

/// Rank all candidates for a query, highest confidence first.
#[pyfunction]
#[pyo3(signature = (query, candidates, keywords=None, group_ids=None, weights=None))]
fn rank(
    py: Python<'_>,
    query: &str,
    candidates: Vec<CandidateData>,
    keywords: Option<Vec<String>>,
    group_ids: Option<Vec<String>>,
    weights: Option<WeightsData>,
) -> PyResult<Vec<ScoredData>> {
    let (candidates, hints) = convert(candidates, keywords, group_ids)?;
    let weights = weights.map(WeightVector::from);
    Ok(py.allow_threads(|| {
        ranker::rank(query, &candidates, Some(&hints), weights)
            .iter()
            .map(ScoredData::from)
            .collect()
    }))
}

/// The best `limit` candidates for a query.
#[pyfunction]
#[pyo3(signature = (query, candidates, limit=DEFAULT_SUGGESTION_LIMIT, keywords=None, group_ids=None, weights=None))]
fn top_suggestions(
    py: Python<'_>,
    query: &str,
    candidates: Vec<CandidateData>,
    limit: usize,
    keywords: Option<Vec<String>>,
    group_ids: Option<Vec<String>>,
    weights: Option<WeightsData>,
) -> PyResult<Vec<ScoredData>> {
    let (candidates, hints) = convert(candidates, keywords, group_ids)?;
    let weights = weights.map(WeightVector::from);
    Ok(py.allow_threads(|| {
        ranker::top_suggestions(query, &candidates, limit, Some(&hints), weights)
            .iter()
            .map(ScoredData::from)
            .collect()
    }))
}

/// Jaro-Winkler similarity for Python: returns float 0.0-1.0
#[pyfunction]
fn jaro_winkler(a: &str, b: &str) -> f64 {
    similarity::jaro_winkler(a, b)
}

#[pymodule]
fn identity_ranker(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(rank, m)?)?;
    m.add_function(wrap_pyfunction!(top_suggestions, m)?)?;
    m.add_function(wrap_pyfunction!(jaro_winkler, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyo3::types::PyDict;

    fn record<'py>(py: Python<'py>, id: u64, name: &str) -> Bound<'py, PyDict> {
        let dict = PyDict::new(py);
        dict.set_item("id", id).unwrap();
        dict.set_item("primary_name", name).unwrap();
        dict.set_item("display_name", name).unwrap();
        dict
    }

    #[test]
    fn test_candidate_without_optional_keys() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let data: CandidateData = record(py, 1, "Sky").extract().unwrap();
            let candidate = data.into_candidate().unwrap();
            assert!(!candidate.verified);
            assert_eq!(candidate.created_at, None);
            assert_eq!(candidate.bio, None);
        });
    }

    #[test]
    fn test_rank_accepts_sparse_records() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let sparse = record(py, 1, "sky");
            sparse.set_item("verified", false).unwrap();
            let full = record(py, 2, "nobody");
            full.set_item("created_at", "2020-01-01T00:00:00Z").unwrap();
            full.set_item("bio", "builds things in the sky").unwrap();

            let candidates = vec![
                sparse.extract::<CandidateData>().unwrap(),
                full.extract::<CandidateData>().unwrap(),
            ];
            let ranked = rank(py, "sky", candidates, None, None, None).unwrap();
            assert_eq!(ranked.len(), 2);
            assert_eq!(ranked[0].candidate_id, 1);
            // 0.40 name + 0.0375 account + 0.075 keyword + 0.05 group
            assert_eq!(ranked[0].confidence, 56);
        });
    }

    #[test]
    fn test_bad_timestamp_is_a_value_error() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let dict = record(py, 7, "sky");
            dict.set_item("created_at", "yesterday").unwrap();
            let data: CandidateData = dict.extract().unwrap();
            let err = data.into_candidate().unwrap_err();
            assert!(err.is_instance_of::<PyValueError>(py));
        });
    }
}

//! Quiz response validation and RIASEC score derivation.
//!
//! Clients compute scores locally while the user answers; the server still
//! derives its own sums from the raw responses and rejects submissions where
//! the two disagree.

use thiserror::Error;

use crate::models::riasec::{ResponseMap, RiasecCategory, RiasecScores};

/// Likert scale bounds for a single answer.
const ANSWER_MIN: u8 = 1;
const ANSWER_MAX: u8 = 5;

#[derive(Debug, Error, PartialEq)]
pub enum ResponseError {
    #[error("responses must not be empty")]
    Empty,

    #[error("response key '{0}' is not of the form category-questionIndex")]
    BadKey(String),

    #[error("response key '{0}' names an unknown category")]
    UnknownCategory(String),

    #[error("answer {value} for '{key}' is outside the 1-5 Likert scale")]
    OutOfScale { key: String, value: u8 },

    #[error(
        "submitted scores disagree with responses for {category}: submitted {submitted}, derived {derived}"
    )]
    ScoreMismatch {
        category: &'static str,
        submitted: u32,
        derived: u32,
    },
}

/// Validates the raw responses map: known category prefixes, numeric
/// question indices, Likert values 1–5, at least one answer.
pub fn validate_responses(responses: &ResponseMap) -> Result<(), ResponseError> {
    if responses.is_empty() {
        return Err(ResponseError::Empty);
    }
    for (key, &value) in responses {
        let Some((category, index)) = key.split_once('-') else {
            return Err(ResponseError::BadKey(key.clone()));
        };
        if RiasecCategory::parse(category).is_none() {
            return Err(ResponseError::UnknownCategory(key.clone()));
        }
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ResponseError::BadKey(key.clone()));
        }
        if !(ANSWER_MIN..=ANSWER_MAX).contains(&value) {
            return Err(ResponseError::OutOfScale {
                key: key.clone(),
                value,
            });
        }
    }
    Ok(())
}

/// Sums answers per category. Only categories that appear in the responses
/// appear in the result.
pub fn derive_scores(responses: &ResponseMap) -> RiasecScores {
    let mut scores = RiasecScores::new();
    for (key, &value) in responses {
        if let Some((category, _)) = key.split_once('-') {
            if let Some(category) = RiasecCategory::parse(category) {
                *scores.entry(category).or_insert(0) += u32::from(value);
            }
        }
    }
    scores
}

/// Cross-checks client-computed scores against server-derived sums. Absent
/// categories count as zero on both sides, since clients commonly submit
/// explicit zeros for categories the user never reached.
pub fn check_submitted_scores(
    submitted: &RiasecScores,
    responses: &ResponseMap,
) -> Result<(), ResponseError> {
    let derived = derive_scores(responses);
    for category in RiasecCategory::ALL {
        let s = submitted.get(&category).copied().unwrap_or(0);
        let d = derived.get(&category).copied().unwrap_or(0);
        if s != d {
            return Err(ResponseError::ScoreMismatch {
                category: category.as_str(),
                submitted: s,
                derived: d,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responses(pairs: &[(&str, u8)]) -> ResponseMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn test_derive_sums_per_category() {
        let r = responses(&[
            ("realistic-0", 4),
            ("realistic-1", 5),
            ("investigative-0", 3),
        ]);
        let scores = derive_scores(&r);
        assert_eq!(scores[&RiasecCategory::Realistic], 9);
        assert_eq!(scores[&RiasecCategory::Investigative], 3);
        assert!(!scores.contains_key(&RiasecCategory::Artistic));
    }

    #[test]
    fn test_validate_accepts_well_formed_responses() {
        let r = responses(&[("social-12", 1), ("enterprising-3", 5)]);
        assert_eq!(validate_responses(&r), Ok(()));
    }

    #[test]
    fn test_validate_rejects_empty_map() {
        assert_eq!(validate_responses(&ResponseMap::new()), Err(ResponseError::Empty));
    }

    #[test]
    fn test_validate_rejects_answer_below_scale() {
        let r = responses(&[("realistic-0", 0)]);
        assert!(matches!(
            validate_responses(&r),
            Err(ResponseError::OutOfScale { value: 0, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_answer_above_scale() {
        let r = responses(&[("realistic-0", 6)]);
        assert!(matches!(
            validate_responses(&r),
            Err(ResponseError::OutOfScale { value: 6, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_key_without_index() {
        let r = responses(&[("realistic", 3)]);
        assert_eq!(
            validate_responses(&r),
            Err(ResponseError::BadKey("realistic".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_non_numeric_index() {
        let r = responses(&[("realistic-x", 3)]);
        assert_eq!(
            validate_responses(&r),
            Err(ResponseError::BadKey("realistic-x".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_unknown_category() {
        let r = responses(&[("plumbing-1", 3)]);
        assert_eq!(
            validate_responses(&r),
            Err(ResponseError::UnknownCategory("plumbing-1".to_string()))
        );
    }

    #[test]
    fn test_cross_check_accepts_matching_scores_with_explicit_zeros() {
        let r = responses(&[("realistic-0", 4), ("realistic-1", 2)]);
        let submitted = RiasecScores::from([
            (RiasecCategory::Realistic, 6),
            (RiasecCategory::Artistic, 0),
        ]);
        assert_eq!(check_submitted_scores(&submitted, &r), Ok(()));
    }

    #[test]
    fn test_cross_check_rejects_mismatched_sum() {
        let r = responses(&[("realistic-0", 4)]);
        let submitted = RiasecScores::from([(RiasecCategory::Realistic, 7)]);
        assert!(matches!(
            check_submitted_scores(&submitted, &r),
            Err(ResponseError::ScoreMismatch {
                category: "realistic",
                submitted: 7,
                derived: 4,
            })
        ));
    }
}

//! Typed analysis contracts and the validator that guards them.
//!
//! Every JSON object recovered from the model passes through here before any
//! other code may touch it. Range violations are hard failures, never
//! clamped — a `match_percentage` of 150 means the upstream call went wrong,
//! and repairing it silently would mask that.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Upper bound on how much of an offending value is echoed in a violation.
const ACTUAL_MAX_CHARS: usize = 80;

// ────────────────────────────────────────────────────────────────────────────
// Validated output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityTrait {
    pub r#trait: String,
    /// 0–100, enforced by the validator.
    pub score: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerMatch {
    pub career_name: String,
    /// 0–100, enforced by the validator.
    pub match_percentage: f64,
    pub reasoning: String,
    pub required_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub salary_range: SalaryRange,
    pub outlook: String,
}

/// The full career analysis contract. Models sometimes return `top_careers`
/// as an array of bare strings — that shape is rejected, not coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerAnalysis {
    pub user_profile_summary: String,
    pub personality_analysis: Vec<PersonalityTrait>,
    pub top_careers: Vec<CareerMatch>,
    pub suggested_learning_path: Vec<String>,
}

/// Sibling contract for the detailed personality analysis mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedPersonalityAnalysis {
    pub holland_code: String,
    pub dominant_traits: Vec<String>,
    pub work_environment: String,
    pub recommended_career_categories: Vec<String>,
    pub strengths: Vec<String>,
    pub blind_spots: Vec<String>,
    pub summary_paragraph: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Violations
// ────────────────────────────────────────────────────────────────────────────

/// A single schema violation: where it happened, what the contract requires,
/// and a bounded rendering of what actually arrived.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub path: String,
    pub expected: String,
    pub actual: String,
}

/// All violations found in one pass. Validation does not stop at the first
/// problem — diagnosing a bad model response needs the full list.
#[derive(Debug, Error)]
#[error("schema validation failed: {}", self.describe())]
pub struct SchemaError {
    pub violations: Vec<Violation>,
}

impl SchemaError {
    fn describe(&self) -> String {
        let shown: Vec<String> = self
            .violations
            .iter()
            .take(5)
            .map(|v| format!("{}: expected {}, got {}", v.path, v.expected, v.actual))
            .collect();
        let rest = self.violations.len().saturating_sub(5);
        if rest > 0 {
            format!("{} (+{rest} more)", shown.join("; "))
        } else {
            shown.join("; ")
        }
    }
}

fn render_actual(value: &Value) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() > ACTUAL_MAX_CHARS {
        let truncated: String = rendered.chars().take(ACTUAL_MAX_CHARS).collect();
        format!("{truncated}…")
    } else {
        rendered
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

#[derive(Default)]
struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    fn fail(&mut self, path: String, expected: &str, actual: &Value) {
        self.violations.push(Violation {
            path,
            expected: expected.to_string(),
            actual: render_actual(actual),
        });
    }

    fn fail_missing(&mut self, path: String, expected: &str) {
        self.violations.push(Violation {
            path,
            expected: expected.to_string(),
            actual: "missing".to_string(),
        });
    }

    fn object<'a>(
        &mut self,
        value: &'a Value,
        path: &str,
    ) -> Option<&'a serde_json::Map<String, Value>> {
        match value.as_object() {
            Some(map) => Some(map),
            None => {
                self.fail(path.to_string(), "object", value);
                None
            }
        }
    }

    fn field<'a>(
        &mut self,
        obj: &'a serde_json::Map<String, Value>,
        key: &str,
        parent: &str,
        expected: &str,
    ) -> Option<&'a Value> {
        match obj.get(key) {
            Some(value) => Some(value),
            None => {
                self.fail_missing(join_path(parent, key), expected);
                None
            }
        }
    }

    fn string(
        &mut self,
        obj: &serde_json::Map<String, Value>,
        key: &str,
        parent: &str,
    ) -> Option<String> {
        let value = self.field(obj, key, parent, "string")?;
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.fail(join_path(parent, key), "string", value);
                None
            }
        }
    }

    fn non_empty_string(
        &mut self,
        obj: &serde_json::Map<String, Value>,
        key: &str,
        parent: &str,
    ) -> Option<String> {
        let value = self.field(obj, key, parent, "non-empty string")?;
        match value.as_str() {
            Some(s) if !s.trim().is_empty() => Some(s.to_string()),
            _ => {
                self.fail(join_path(parent, key), "non-empty string", value);
                None
            }
        }
    }

    fn number(
        &mut self,
        obj: &serde_json::Map<String, Value>,
        key: &str,
        parent: &str,
    ) -> Option<f64> {
        let value = self.field(obj, key, parent, "number")?;
        match value.as_f64() {
            Some(n) => Some(n),
            None => {
                self.fail(join_path(parent, key), "number", value);
                None
            }
        }
    }

    fn number_in_range(
        &mut self,
        obj: &serde_json::Map<String, Value>,
        key: &str,
        parent: &str,
        min: f64,
        max: f64,
    ) -> Option<f64> {
        let expected = format!("number in [{min}, {max}]");
        let value = self.field(obj, key, parent, &expected)?;
        match value.as_f64() {
            Some(n) if n >= min && n <= max => Some(n),
            _ => {
                self.fail(join_path(parent, key), &expected, value);
                None
            }
        }
    }

    fn array<'a>(
        &mut self,
        obj: &'a serde_json::Map<String, Value>,
        key: &str,
        parent: &str,
    ) -> Option<&'a Vec<Value>> {
        let value = self.field(obj, key, parent, "array")?;
        match value.as_array() {
            Some(items) => Some(items),
            None => {
                self.fail(join_path(parent, key), "array", value);
                None
            }
        }
    }

    fn string_array(
        &mut self,
        obj: &serde_json::Map<String, Value>,
        key: &str,
        parent: &str,
    ) -> Option<Vec<String>> {
        let items = self.array(obj, key, parent)?;
        let path = join_path(parent, key);
        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item.as_str() {
                Some(s) => Some(s.to_string()),
                None => {
                    self.fail(format!("{path}[{i}]"), "string", item);
                    None
                }
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validators
// ────────────────────────────────────────────────────────────────────────────

/// Validates an untrusted, already-parsed JSON value against the
/// `CareerAnalysis` contract. Collects every violation before failing.
pub fn validate_career_analysis(value: &Value) -> Result<CareerAnalysis, SchemaError> {
    let mut c = Checker::default();
    let Some(root) = c.object(value, "(root)") else {
        return Err(SchemaError {
            violations: c.violations,
        });
    };

    let summary = c.non_empty_string(root, "user_profile_summary", "");

    let personality = c.array(root, "personality_analysis", "").and_then(|items| {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| check_trait(&mut c, item, &format!("personality_analysis[{i}]")))
            .collect::<Option<Vec<_>>>()
    });

    let careers = c.array(root, "top_careers", "").and_then(|items| {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| check_career(&mut c, item, &format!("top_careers[{i}]")))
            .collect::<Option<Vec<_>>>()
    });

    let learning_path = c.string_array(root, "suggested_learning_path", "");

    match (summary, personality, careers, learning_path) {
        (Some(user_profile_summary), Some(personality_analysis), Some(top_careers), Some(path))
            if c.violations.is_empty() =>
        {
            Ok(CareerAnalysis {
                user_profile_summary,
                personality_analysis,
                top_careers,
                suggested_learning_path: path,
            })
        }
        _ => Err(SchemaError {
            violations: c.violations,
        }),
    }
}

/// Validates the detailed personality analysis shape (`holland_code`,
/// `dominant_traits`, ...). Same discipline as the career validator.
pub fn validate_personality_analysis(
    value: &Value,
) -> Result<DetailedPersonalityAnalysis, SchemaError> {
    let mut c = Checker::default();
    let Some(root) = c.object(value, "(root)") else {
        return Err(SchemaError {
            violations: c.violations,
        });
    };

    let holland_code = c.string(root, "holland_code", "");
    let dominant_traits = c.string_array(root, "dominant_traits", "");
    let work_environment = c.string(root, "work_environment", "");
    let categories = c.string_array(root, "recommended_career_categories", "");
    let strengths = c.string_array(root, "strengths", "");
    let blind_spots = c.string_array(root, "blind_spots", "");
    let summary_paragraph = c.string(root, "summary_paragraph", "");

    match (
        holland_code,
        dominant_traits,
        work_environment,
        categories,
        strengths,
        blind_spots,
        summary_paragraph,
    ) {
        (Some(hc), Some(dt), Some(we), Some(rc), Some(st), Some(bs), Some(sp))
            if c.violations.is_empty() =>
        {
            Ok(DetailedPersonalityAnalysis {
                holland_code: hc,
                dominant_traits: dt,
                work_environment: we,
                recommended_career_categories: rc,
                strengths: st,
                blind_spots: bs,
                summary_paragraph: sp,
            })
        }
        _ => Err(SchemaError {
            violations: c.violations,
        }),
    }
}

fn check_trait(c: &mut Checker, value: &Value, path: &str) -> Option<PersonalityTrait> {
    let obj = c.object(value, path)?;
    let name = c.string(obj, "trait", path);
    let score = c.number_in_range(obj, "score", path, 0.0, 100.0);
    let description = c.string(obj, "description", path);
    Some(PersonalityTrait {
        r#trait: name?,
        score: score?,
        description: description?,
    })
}

fn check_career(c: &mut Checker, value: &Value, path: &str) -> Option<CareerMatch> {
    let obj = c.object(value, path)?;
    let career_name = c.string(obj, "career_name", path);
    let match_percentage = c.number_in_range(obj, "match_percentage", path, 0.0, 100.0);
    let reasoning = c.string(obj, "reasoning", path);
    let required_skills = c.string_array(obj, "required_skills", path);
    let missing_skills = c.string_array(obj, "missing_skills", path);
    let salary_range = match obj.get("salary_range") {
        Some(v) => check_salary(c, v, &join_path(path, "salary_range")),
        None => {
            c.fail_missing(join_path(path, "salary_range"), "object");
            None
        }
    };
    let outlook = c.string(obj, "outlook", path);
    Some(CareerMatch {
        career_name: career_name?,
        match_percentage: match_percentage?,
        reasoning: reasoning?,
        required_skills: required_skills?,
        missing_skills: missing_skills?,
        salary_range: salary_range?,
        outlook: outlook?,
    })
}

fn check_salary(c: &mut Checker, value: &Value, path: &str) -> Option<SalaryRange> {
    let obj = c.object(value, path)?;
    let min = c.number(obj, "min", path);
    let max = c.number(obj, "max", path);
    // Currency defaults to USD when absent — part of the contract, not a repair.
    let currency = match obj.get("currency") {
        None => Some("USD".to_string()),
        Some(v) => match v.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                c.fail(join_path(path, "currency"), "string", v);
                None
            }
        },
    };
    Some(SalaryRange {
        min: min?,
        max: max?,
        currency: currency?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_analysis() -> Value {
        json!({
            "user_profile_summary": "Based on your responses, I see a strong analytical streak.",
            "personality_analysis": [
                {"trait": "Investigative", "score": 85, "description": "You enjoy digging into problems."}
            ],
            "top_careers": [
                {
                    "career_name": "Data Scientist",
                    "match_percentage": 91,
                    "reasoning": "You'll excel here because you like evidence.",
                    "required_skills": ["Python", "Statistics"],
                    "missing_skills": ["MLOps"],
                    "salary_range": {"min": 90000, "max": 180000, "currency": "KES"},
                    "outlook": "Strong growth"
                }
            ],
            "suggested_learning_path": ["You should start with a statistics course."]
        })
    }

    #[test]
    fn test_valid_analysis_passes() {
        let analysis = validate_career_analysis(&valid_analysis()).unwrap();
        assert_eq!(analysis.top_careers.len(), 1);
        assert_eq!(analysis.top_careers[0].career_name, "Data Scientist");
        assert_eq!(analysis.personality_analysis[0].score, 85.0);
    }

    #[test]
    fn test_rejects_top_careers_of_bare_strings() {
        let mut value = valid_analysis();
        value["top_careers"] = json!(["Doctor", "Engineer"]);
        let err = validate_career_analysis(&value).unwrap_err();
        assert!(err.violations.iter().any(|v| v.path == "top_careers[0]"));
        assert!(err.violations.iter().any(|v| v.expected == "object"));
    }

    #[test]
    fn test_rejects_match_percentage_over_100() {
        let mut value = valid_analysis();
        value["top_careers"][0]["match_percentage"] = json!(150);
        let err = validate_career_analysis(&value).unwrap_err();
        let violation = &err.violations[0];
        assert_eq!(violation.path, "top_careers[0].match_percentage");
        assert!(violation.expected.contains("[0, 100]"));
        assert_eq!(violation.actual, "150");
    }

    #[test]
    fn test_rejects_negative_trait_score() {
        let mut value = valid_analysis();
        value["personality_analysis"][0]["score"] = json!(-3);
        let err = validate_career_analysis(&value).unwrap_err();
        assert_eq!(err.violations[0].path, "personality_analysis[0].score");
    }

    #[test]
    fn test_rejects_missing_summary() {
        let mut value = valid_analysis();
        value.as_object_mut().unwrap().remove("user_profile_summary");
        let err = validate_career_analysis(&value).unwrap_err();
        assert_eq!(err.violations[0].path, "user_profile_summary");
        assert_eq!(err.violations[0].actual, "missing");
    }

    #[test]
    fn test_rejects_empty_summary() {
        let mut value = valid_analysis();
        value["user_profile_summary"] = json!("   ");
        assert!(validate_career_analysis(&value).is_err());
    }

    #[test]
    fn test_rejects_non_object_salary_range() {
        let mut value = valid_analysis();
        value["top_careers"][0]["salary_range"] = json!(120000);
        let err = validate_career_analysis(&value).unwrap_err();
        assert_eq!(err.violations[0].path, "top_careers[0].salary_range");
        assert_eq!(err.violations[0].expected, "object");
    }

    #[test]
    fn test_currency_defaults_to_usd() {
        let mut value = valid_analysis();
        value["top_careers"][0]["salary_range"] = json!({"min": 1, "max": 2});
        let analysis = validate_career_analysis(&value).unwrap();
        assert_eq!(analysis.top_careers[0].salary_range.currency, "USD");
    }

    #[test]
    fn test_collects_all_violations() {
        let mut value = valid_analysis();
        value["top_careers"][0]["match_percentage"] = json!(150);
        value["personality_analysis"][0]["score"] = json!(101);
        let err = validate_career_analysis(&value).unwrap_err();
        assert_eq!(err.violations.len(), 2);
    }

    #[test]
    fn test_rejects_non_object_root() {
        let err = validate_career_analysis(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.violations[0].path, "(root)");
    }

    #[test]
    fn test_rejects_out_of_range_scores_without_clamping() {
        // 100.5 is barely out of range and must still be a hard failure.
        let mut value = valid_analysis();
        value["top_careers"][0]["match_percentage"] = json!(100.5);
        assert!(validate_career_analysis(&value).is_err());
    }

    #[test]
    fn test_actual_rendering_is_bounded() {
        let mut value = valid_analysis();
        value["top_careers"][0]["match_percentage"] = json!("x".repeat(500));
        let err = validate_career_analysis(&value).unwrap_err();
        assert!(err.violations[0].actual.chars().count() <= ACTUAL_MAX_CHARS + 1);
    }

    fn valid_personality() -> Value {
        json!({
            "holland_code": "RIA",
            "dominant_traits": ["Curious", "Hands-on"],
            "work_environment": "Structured and distinct",
            "recommended_career_categories": ["Engineering", "Research"],
            "strengths": ["Persistence"],
            "blind_spots": ["Delegation"],
            "summary_paragraph": "You combine practical and analytical instincts."
        })
    }

    #[test]
    fn test_valid_personality_passes() {
        let analysis = validate_personality_analysis(&valid_personality()).unwrap();
        assert_eq!(analysis.holland_code, "RIA");
        assert_eq!(analysis.dominant_traits.len(), 2);
    }

    #[test]
    fn test_personality_rejects_missing_holland_code() {
        let mut value = valid_personality();
        value.as_object_mut().unwrap().remove("holland_code");
        let err = validate_personality_analysis(&value).unwrap_err();
        assert_eq!(err.violations[0].path, "holland_code");
    }

    #[test]
    fn test_personality_rejects_non_string_trait_element() {
        let mut value = valid_personality();
        value["dominant_traits"] = json!(["Curious", 42]);
        let err = validate_personality_analysis(&value).unwrap_err();
        assert_eq!(err.violations[0].path, "dominant_traits[1]");
    }

    #[test]
    fn test_schema_error_display_lists_violations() {
        let mut value = valid_analysis();
        value["top_careers"][0]["match_percentage"] = json!(150);
        let err = validate_career_analysis(&value).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("top_careers[0].match_percentage"));
        assert!(message.contains("expected number in [0, 100]"));
    }
}

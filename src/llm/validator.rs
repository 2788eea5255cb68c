//! Validation of the backend's structured response
//!
//! The backend is untrusted: its raw text is parsed into a JSON value and
//! every field is checked by hand, so a failure can name the offending field.
//! Nothing is clamped or defaulted; a result is either complete or rejected.

use crate::error::{Result, ResumeLensError};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub score: u8,
    pub missing_keywords: Vec<String>,
    pub weak_bullet_points: Vec<WeakBulletPoint>,
    pub ats_friendliness: String,
    pub skills_found: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeakBulletPoint {
    pub original: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, raw: &str) -> Result<AnalysisResult> {
        let value: Value = serde_json::from_str(raw).map_err(|e| {
            debug!("Response is not JSON: {}", e);
            ResumeLensError::validation("$", "malformed payload")
        })?;

        let object = value
            .as_object()
            .ok_or_else(|| ResumeLensError::validation("$", "expected a JSON object"))?;

        Ok(AnalysisResult {
            score: score(object)?,
            missing_keywords: string_array(object, "missingKeywords")?,
            weak_bullet_points: bullet_points(object)?,
            ats_friendliness: non_blank_string(object, "atsFriendliness", "atsFriendliness")?,
            skills_found: string_array(object, "skillsFound")?,
        })
    }
}

fn required<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a Value> {
    object
        .get(field)
        .ok_or_else(|| ResumeLensError::validation(field, "missing required field"))
}

fn score(object: &Map<String, Value>) -> Result<u8> {
    let value = required(object, "score")?;
    let score = value
        .as_i64()
        .ok_or_else(|| ResumeLensError::validation("score", format!("expected an integer, got {}", value)))?;

    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(ResumeLensError::validation(
            "score",
            format!("{} is outside [{}, {}]", score, MIN_SCORE, MAX_SCORE),
        ));
    }

    u8::try_from(score).map_err(|_| ResumeLensError::validation("score", "out of range"))
}

fn string_array(object: &Map<String, Value>, field: &str) -> Result<Vec<String>> {
    let items = required(object, field)?
        .as_array()
        .ok_or_else(|| ResumeLensError::validation(field, "expected an array of strings"))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| ResumeLensError::validation(format!("{}[{}]", field, i), "expected a string"))
        })
        .collect()
}

fn bullet_points(object: &Map<String, Value>) -> Result<Vec<WeakBulletPoint>> {
    let field = "weakBulletPoints";
    let items = required(object, field)?
        .as_array()
        .ok_or_else(|| ResumeLensError::validation(field, "expected an array of objects"))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let path = format!("{}[{}]", field, i);
            let bullet = item
                .as_object()
                .ok_or_else(|| ResumeLensError::validation(path.as_str(), "expected an object"))?;

            Ok(WeakBulletPoint {
                original: non_blank_string(bullet, "original", &format!("{}.original", path))?,
                suggestion: non_blank_string(bullet, "suggestion", &format!("{}.suggestion", path))?,
            })
        })
        .collect()
}

fn non_blank_string(object: &Map<String, Value>, key: &str, path: &str) -> Result<String> {
    let value = object
        .get(key)
        .ok_or_else(|| ResumeLensError::validation(path, "missing required field"))?;
    let text = value
        .as_str()
        .ok_or_else(|| ResumeLensError::validation(path, "expected a string"))?;

    if text.trim().is_empty() {
        return Err(ResumeLensError::validation(path, "must not be empty"));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EXAMPLE: &str = r#"{"score":72,"missingKeywords":["python","tableau"],"weakBulletPoints":[{"original":"Built dashboards using SQL","suggestion":"Engineered interactive SQL-driven dashboards improving reporting efficiency by 30%"}],"atsFriendliness":"Moderate","skillsFound":["SQL"]}"#;

    fn field_of(err: ResumeLensError) -> String {
        match err {
            ResumeLensError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    fn validate_value(value: Value) -> Result<AnalysisResult> {
        ResponseValidator::new().validate(&value.to_string())
    }

    #[test]
    fn test_example_roundtrips_exactly() {
        let result = ResponseValidator::new().validate(EXAMPLE).unwrap();
        assert_eq!(result.score, 72);
        assert_eq!(result.missing_keywords, vec!["python", "tableau"]);
        assert_eq!(result.skills_found, vec!["SQL"]);

        let original: Value = serde_json::from_str(EXAMPLE).unwrap();
        assert_eq!(serde_json::to_value(&result).unwrap(), original);
    }

    #[test]
    fn test_casing_passes_through() {
        let mut value: Value = serde_json::from_str(EXAMPLE).unwrap();
        value["missingKeywords"] = json!(["PyThOn", "tableau", "Tableau"]);
        let result = validate_value(value).unwrap();
        assert_eq!(result.missing_keywords, vec!["PyThOn", "tableau", "Tableau"]);
    }

    #[test]
    fn test_malformed_payload() {
        for raw in ["", "not json", "{\"score\": 72", "```json\n{}\n```"] {
            let err = ResponseValidator::new().validate(raw).unwrap_err();
            assert!(err.to_string().contains("malformed payload"), "{}", raw);
        }
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(field_of(validate_value(json!([1, 2])).unwrap_err()), "$");
    }

    #[test]
    fn test_each_missing_field_is_named() {
        for field in crate::llm::schema::REQUIRED_FIELDS {
            let mut value: Value = serde_json::from_str(EXAMPLE).unwrap();
            value.as_object_mut().unwrap().remove(field);
            assert_eq!(field_of(validate_value(value).unwrap_err()), field);
        }
    }

    #[test]
    fn test_score_out_of_range_is_rejected_not_clamped() {
        for bad in [json!(101), json!(-1), json!(1000)] {
            let mut value: Value = serde_json::from_str(EXAMPLE).unwrap();
            value["score"] = bad;
            assert_eq!(field_of(validate_value(value).unwrap_err()), "score");
        }
    }

    #[test]
    fn test_score_bounds_are_inclusive() {
        for good in [0, 100] {
            let mut value: Value = serde_json::from_str(EXAMPLE).unwrap();
            value["score"] = json!(good);
            assert_eq!(validate_value(value).unwrap().score as i64, good);
        }
    }

    #[test]
    fn test_score_must_be_integer() {
        for bad in [json!(72.5), json!("72"), json!(null)] {
            let mut value: Value = serde_json::from_str(EXAMPLE).unwrap();
            value["score"] = bad;
            assert_eq!(field_of(validate_value(value).unwrap_err()), "score");
        }
    }

    #[test]
    fn test_bad_array_item_names_index() {
        let mut value: Value = serde_json::from_str(EXAMPLE).unwrap();
        value["skillsFound"] = json!(["SQL", 3]);
        assert_eq!(field_of(validate_value(value).unwrap_err()), "skillsFound[1]");
    }

    #[test]
    fn test_empty_suggestion_rejected() {
        let mut value: Value = serde_json::from_str(EXAMPLE).unwrap();
        value["weakBulletPoints"] = json!([
            { "original": "a", "suggestion": "b" },
            { "original": "c", "suggestion": "  " }
        ]);
        assert_eq!(
            field_of(validate_value(value).unwrap_err()),
            "weakBulletPoints[1].suggestion"
        );
    }

    #[test]
    fn test_empty_collections_are_valid() {
        let value = json!({
            "score": 0,
            "missingKeywords": [],
            "weakBulletPoints": [],
            "atsFriendliness": "Poor",
            "skillsFound": []
        });
        let result = validate_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&result).unwrap(), value);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let mut value: Value = serde_json::from_str(EXAMPLE).unwrap();
        value["confidence"] = json!("high");
        assert!(validate_value(value).is_ok());
    }
}

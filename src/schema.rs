use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use validator::Validate;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Text cannot be empty")]
    EmptyText,
    #[error("Response is not a JSON object")]
    NotAnObject,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Field is not a string: {0}")]
    NotAString(&'static str),
}

/// Input shape for one analysis run. The webview sends `{ text: "..." }`.
#[derive(Serialize, Deserialize, Validate, Clone, Debug)]
pub struct AnalysisRequest {
    #[validate(length(min = 1, message = "Text cannot be empty"))]
    pub text: String,
}

/// The five-field feedback object produced for one submitted text.
/// Field names are camelCase on the wire to match the webview payloads.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub grammar_feedback: String,
    pub style_feedback: String,
    pub clarity_feedback: String,
    pub overall_feedback: String,
    pub improvement_tips: String,
}

/// Output shape of the tips-only template.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementTips {
    pub improvement_tips: String,
}

pub const ANALYSIS_FIELDS: [&str; 5] = [
    "grammarFeedback",
    "styleFeedback",
    "clarityFeedback",
    "overallFeedback",
    "improvementTips",
];

/// Request-side predicate: text must contain at least one
/// non-whitespace character. Whitespace-only submissions count as empty.
pub fn validate_request(text: &str) -> Result<(), SchemaError> {
    if text.trim().is_empty() {
        return Err(SchemaError::EmptyText);
    }
    Ok(())
}

/// Boundary check for a model-produced analysis object. Every one of the
/// five fields must be present and a string; anything else is rejected
/// before a single field is trusted downstream.
pub fn validate_analysis_value(value: &Value) -> Result<AnalysisResult, SchemaError> {
    let obj = value.as_object().ok_or(SchemaError::NotAnObject)?;

    let mut fields = [""; 5];
    for (i, name) in ANALYSIS_FIELDS.into_iter().enumerate() {
        let entry = obj.get(name).ok_or(SchemaError::MissingField(name))?;
        fields[i] = entry.as_str().ok_or(SchemaError::NotAString(name))?;
    }

    Ok(AnalysisResult {
        grammar_feedback: fields[0].to_string(),
        style_feedback: fields[1].to_string(),
        clarity_feedback: fields[2].to_string(),
        overall_feedback: fields[3].to_string(),
        improvement_tips: fields[4].to_string(),
    })
}

/// Same check for the single-field tips schema.
pub fn validate_tips_value(value: &Value) -> Result<ImprovementTips, SchemaError> {
    let obj = value.as_object().ok_or(SchemaError::NotAnObject)?;
    let tips = obj
        .get("improvementTips")
        .ok_or(SchemaError::MissingField("improvementTips"))?
        .as_str()
        .ok_or(SchemaError::NotAString("improvementTips"))?;

    Ok(ImprovementTips {
        improvement_tips: tips.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_validation() {
        assert!(validate_request("teh cat sat").is_ok());
        assert!(validate_request("").is_err());
        assert!(validate_request("   \n\t ").is_err());
    }

    #[test]
    fn test_request_validator_derive() {
        let req = AnalysisRequest {
            text: String::new(),
        };
        assert!(req.validate().is_err());

        let req = AnalysisRequest {
            text: "some text".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_valid_analysis_value() {
        let value = json!({
            "grammarFeedback": "g",
            "styleFeedback": "s",
            "clarityFeedback": "c",
            "overallFeedback": "o",
            "improvementTips": "1. t",
        });
        let result = validate_analysis_value(&value).unwrap();
        assert_eq!(result.grammar_feedback, "g");
        assert_eq!(result.improvement_tips, "1. t");
    }

    #[test]
    fn test_missing_field_rejected() {
        let value = json!({
            "grammarFeedback": "g",
            "styleFeedback": "s",
            "clarityFeedback": "c",
            "overallFeedback": "o",
        });
        let err = validate_analysis_value(&value).unwrap_err();
        assert!(matches!(err, SchemaError::MissingField("improvementTips")));
    }

    #[test]
    fn test_non_string_field_rejected() {
        let value = json!({
            "grammarFeedback": "g",
            "styleFeedback": 42,
            "clarityFeedback": "c",
            "overallFeedback": "o",
            "improvementTips": "t",
        });
        assert!(matches!(
            validate_analysis_value(&value),
            Err(SchemaError::NotAString("styleFeedback"))
        ));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(validate_analysis_value(&json!("just a string")).is_err());
        assert!(validate_tips_value(&json!(null)).is_err());
    }

    #[test]
    fn test_tips_value() {
        let tips = validate_tips_value(&json!({ "improvementTips": "1. Fix spelling" })).unwrap();
        assert_eq!(tips.improvement_tips, "1. Fix spelling");
        assert!(validate_tips_value(&json!({})).is_err());
    }

    #[test]
    fn test_result_wire_shape_is_camel_case() {
        let result = AnalysisResult {
            grammar_feedback: "g".into(),
            style_feedback: "s".into(),
            clarity_feedback: "c".into(),
            overall_feedback: "o".into(),
            improvement_tips: "t".into(),
        };
        let wire = serde_json::to_value(&result).unwrap();
        for field in ANALYSIS_FIELDS {
            assert!(wire.get(field).is_some(), "missing wire field {}", field);
        }
    }
}

use serde_json::{Map, Value};

use super::prompt::REQUIRED_FIELDS;
use super::AnalysisError;
use crate::models::AnalysisResult;

/// Validate the model's reply against the seven-field shape.
///
/// Every field must be present with the declared type; `null` counts as a
/// wrong type. Unknown extra fields are ignored. Any violation fails the
/// whole reply.
pub fn parse_analysis_reply(reply: &str) -> Result<AnalysisResult, AnalysisError> {
    let body = strip_code_fence(reply.trim());
    if body.is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| AnalysisError::InvalidJson(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| AnalysisError::MalformedResponse("reply is not a JSON object".into()))?;

    let extra = obj
        .keys()
        .filter(|k| !REQUIRED_FIELDS.contains(&k.as_str()))
        .count();
    if extra > 0 {
        tracing::debug!(extra, "Ignoring unexpected fields in analysis reply");
    }

    Ok(AnalysisResult {
        summary_en: string_field(obj, "summary_en")?,
        summary_ur: string_field(obj, "summary_ur")?,
        abnormalities: string_list_field(obj, "abnormalities")?,
        doctor_questions: string_list_field(obj, "doctor_questions")?,
        diet_advice: string_field(obj, "diet_advice")?,
        home_remedies: string_field(obj, "home_remedies")?,
        disclaimer: string_field(obj, "disclaimer")?,
    })
}

/// Unwrap a ```json fenced block if the model added one.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn string_field(obj: &Map<String, Value>, field: &'static str) -> Result<String, AnalysisError> {
    match obj.get(field) {
        None => Err(AnalysisError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(AnalysisError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

fn string_list_field(
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, AnalysisError> {
    let invalid = || AnalysisError::InvalidField {
        field,
        expected: "a list of strings",
    };
    match obj.get(field) {
        None => Err(AnalysisError::MissingField(field)),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        Some(_) => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"summary_en":"Normal results","summary_ur":"Aapki report normal hai","abnormalities":[],"doctor_questions":["Kya mujhe dobara test karana chahiye?"],"diet_advice":"Balanced diet lein","home_remedies":"Paani zyada piyen","disclaimer":"Yeh AI hai, doctor ka mashwara zaroor lein"}"#;

    fn sample_value() -> Value {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn parses_complete_reply() {
        let result = parse_analysis_reply(SAMPLE).unwrap();
        assert_eq!(result.summary_en, "Normal results");
        assert_eq!(result.summary_ur, "Aapki report normal hai");
        assert!(result.abnormalities.is_empty());
        assert_eq!(
            result.doctor_questions,
            vec!["Kya mujhe dobara test karana chahiye?".to_string()]
        );
        assert_eq!(result.diet_advice, "Balanced diet lein");
        assert_eq!(result.home_remedies, "Paani zyada piyen");
        assert_eq!(result.disclaimer, "Yeh AI hai, doctor ka mashwara zaroor lein");
    }

    #[test]
    fn each_missing_field_is_rejected() {
        for field in REQUIRED_FIELDS {
            let mut value = sample_value();
            value.as_object_mut().unwrap().remove(field);
            let err = parse_analysis_reply(&value.to_string()).unwrap_err();
            assert!(
                matches!(err, AnalysisError::MissingField(f) if f == field),
                "field {field}: {err:?}"
            );
        }
    }

    #[test]
    fn null_field_is_rejected() {
        let mut value = sample_value();
        value["disclaimer"] = Value::Null;
        let err = parse_analysis_reply(&value.to_string()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidField {
                field: "disclaimer",
                ..
            }
        ));
    }

    #[test]
    fn string_in_place_of_list_is_rejected() {
        let mut value = sample_value();
        value["abnormalities"] = Value::String("High sugar".into());
        let err = parse_analysis_reply(&value.to_string()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidField {
                field: "abnormalities",
                expected: "a list of strings"
            }
        ));
    }

    #[test]
    fn non_string_list_item_is_rejected() {
        let mut value = sample_value();
        value["doctor_questions"] = serde_json::json!(["ok", 3]);
        let err = parse_analysis_reply(&value.to_string()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidField {
                field: "doctor_questions",
                ..
            }
        ));
    }

    #[test]
    fn non_json_text_is_invalid_json() {
        let err = parse_analysis_reply("Sorry, I cannot read this image.").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidJson(_)));
    }

    #[test]
    fn truncated_json_is_invalid_json() {
        let err = parse_analysis_reply(&SAMPLE[..40]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidJson(_)));
    }

    #[test]
    fn empty_reply_is_rejected() {
        assert!(matches!(
            parse_analysis_reply("   \n"),
            Err(AnalysisError::EmptyResponse)
        ));
        assert!(matches!(
            parse_analysis_reply("```json\n```"),
            Err(AnalysisError::EmptyResponse)
        ));
    }

    #[test]
    fn array_root_is_malformed() {
        let err = parse_analysis_reply("[1, 2]").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }

    #[test]
    fn fenced_reply_is_unwrapped() {
        let fenced = format!("```json\n{SAMPLE}\n```");
        let result = parse_analysis_reply(&fenced).unwrap();
        assert_eq!(result.summary_en, "Normal results");
    }

    #[test]
    fn extra_fields_are_ignored() {
        let mut value = sample_value();
        value["confidence"] = serde_json::json!(0.9);
        let result = parse_analysis_reply(&value.to_string()).unwrap();
        assert_eq!(result.disclaimer, "Yeh AI hai, doctor ka mashwara zaroor lein");
    }

    #[test]
    fn empty_strings_and_lists_are_valid() {
        let reply = r#"{"summary_en":"","summary_ur":"","abnormalities":[],"doctor_questions":[],"diet_advice":"","home_remedies":"","disclaimer":""}"#;
        let result = parse_analysis_reply(reply).unwrap();
        assert!(result.summary_en.is_empty());
        assert!(result.doctor_questions.is_empty());
    }
}

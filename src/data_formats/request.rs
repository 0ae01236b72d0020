use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::RequestError;

const MAX_OPTIONS: usize = 10;
const MAX_DEMOGRAPHIC_LEN: usize = 64;
const MAX_COMMENT_LEN: usize = 1000;

// ----------------- User Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(mut self) -> Result<Self, RequestError> {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        if self.name.is_empty() {
            return Err(RequestError::BadRequest("Name is required"));
        }
        if !self.email.contains('@') {
            return Err(RequestError::BadRequest("A valid email is required"));
        }
        if self.password.len() < 6 {
            return Err(RequestError::BadRequest(
                "Password must be at least 6 characters",
            ));
        }
        Ok(self)
    }
}

// ----------------- Question Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateQuestionRequest {
    pub title: String,
    pub content: String,
    pub options: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreateQuestionRequest {
    pub title: String,
    pub content: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

/// Absent fields keep their stored value. `startDate` and `endDate` may also be
/// sent as `null` to clear the bound.
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateQuestionRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub options: Option<Vec<String>>,
    #[serde(deserialize_with = "present_or_null")]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(deserialize_with = "present_or_null")]
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
}

/// Only called when the key is present, so `null` becomes `Some(None)`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Normalised question fields, shared by the author and admin create paths.
#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub title: String,
    pub content: String,
    pub options: Vec<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl QuestionDraft {
    pub fn new(
        title: &str,
        content: &str,
        options: &[String],
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Self, RequestError> {
        let title = title.trim().to_string();
        let content = content.trim().to_string();
        if title.is_empty() || content.is_empty() {
            return Err(RequestError::BadRequest("Title and content are required"));
        }
        let options = validate_options(options)?;
        validate_window(start_date, end_date)?;
        Ok(QuestionDraft {
            title,
            content,
            options,
            start_date,
            end_date,
        })
    }
}

pub fn validate_options(options: &[String]) -> Result<Vec<String>, RequestError> {
    let options: Vec<String> = options.iter().map(|o| o.trim().to_string()).collect();
    if options.len() < 2 || options.len() > MAX_OPTIONS {
        return Err(RequestError::BadRequest(
            "A question needs between 2 and 10 options",
        ));
    }
    if options.iter().any(String::is_empty) {
        return Err(RequestError::BadRequest("Options cannot be empty"));
    }
    Ok(options)
}

pub fn validate_window(
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> Result<(), RequestError> {
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err(RequestError::BadRequest("startDate must be before endDate"));
        }
    }
    Ok(())
}

// ----------------- Answer Request -----------------
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub question_id: i64,
    pub option_index: i64,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default, alias = "ageGroup")]
    pub age_range: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Demographics {
    pub education: Option<String>,
    pub age_range: Option<String>,
    pub region: Option<String>,
}

impl Demographics {
    pub fn new(
        education: Option<String>,
        age_range: Option<String>,
        region: Option<String>,
    ) -> Result<Self, RequestError> {
        Ok(Demographics {
            education: clean_demographic(education)?,
            age_range: clean_demographic(age_range)?,
            region: clean_demographic(region)?,
        })
    }
}

fn clean_demographic(value: Option<String>) -> Result<Option<String>, RequestError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Ok(None),
        Some(v) if v.chars().count() > MAX_DEMOGRAPHIC_LEN => Err(RequestError::BadRequest(
            "Demographic values must be at most 64 characters",
        )),
        other => Ok(other),
    }
}

// ----------------- Comment Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentRequest {
    pub question_id: i64,
    pub content: String,
}

pub fn validate_comment(content: &str) -> Result<String, RequestError> {
    let content = content.trim();
    if content.is_empty() || content.chars().count() > MAX_COMMENT_LEN {
        return Err(RequestError::BadRequest(
            "Comment must be between 1 and 1000 characters",
        ));
    }
    Ok(content.to_string())
}

// ----------------- Subscription Request -----------------
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub plan_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_group_is_accepted_as_age_range() {
        let request: SubmitAnswerRequest = serde_json::from_str(
            r#"{"questionId": 1, "optionIndex": 0, "ageGroup": "18-24"}"#,
        )
        .unwrap();
        assert_eq!(request.age_range.as_deref(), Some("18-24"));
        assert_eq!(request.education, None);
    }

    #[test]
    fn blank_demographics_become_absent() {
        let demographics =
            Demographics::new(Some("  ".into()), Some(" 25-34 ".into()), None).unwrap();
        assert_eq!(demographics.education, None);
        assert_eq!(demographics.age_range.as_deref(), Some("25-34"));
    }

    #[test]
    fn options_must_be_between_two_and_ten() {
        assert!(validate_options(&["only".into()]).is_err());
        assert!(validate_options(&vec!["x".to_string(); 11]).is_err());
        assert!(validate_options(&["A".into(), " ".into()]).is_err());
        assert_eq!(
            validate_options(&[" A ".into(), "B".into()]).unwrap(),
            vec!["A", "B"]
        );
    }

    #[test]
    fn window_must_be_ordered() {
        let now = Utc::now();
        assert!(validate_window(Some(now), Some(now - chrono::Duration::hours(1))).is_err());
        assert!(validate_window(Some(now), None).is_ok());
    }

    #[test]
    fn update_tells_missing_dates_from_null_dates() {
        let request: UpdateQuestionRequest =
            serde_json::from_str(r#"{"title": "T", "endDate": null}"#).unwrap();
        assert_eq!(request.start_date, None);
        assert_eq!(request.end_date, Some(None));

        let request: UpdateQuestionRequest =
            serde_json::from_str(r#"{"startDate": "2024-06-01T00:00:00Z"}"#).unwrap();
        assert!(matches!(request.start_date, Some(Some(_))));
        assert_eq!(request.end_date, None);
    }
}

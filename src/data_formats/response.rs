use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AdminQuestion, Answer, Comment, Question, User};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_premium: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub options: Vec<String>,
    pub is_active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub author_id: i64,
    pub is_premium: bool,
    pub created_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub answer_count: Option<i64>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AuthorResponse {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdminQuestionResponse {
    #[serde(flatten)]
    pub question: QuestionResponse,
    pub author: AuthorResponse,
    pub comment_count: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub id: i64,
    pub question_id: i64,
    pub option_index: i64,
    pub education: Option<String>,
    pub age_range: Option<String>,
    pub region: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CommentAuthorResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub question_id: i64,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub author: CommentAuthorResponse,
    pub like_count: i64,
    pub is_liked: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LikeResponse {
    pub liked: bool,
    pub message: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct WebhookResponse {
    pub received: bool,
}

impl From<User> for UserResponse {
    fn from(
        User {
            id,
            name,
            email,
            is_admin,
            is_premium,
            created_at,
            ..
        }: User,
    ) -> Self {
        UserResponse {
            id,
            name,
            email,
            is_admin,
            is_premium,
            created_at,
        }
    }
}

impl QuestionResponse {
    pub fn new(
        Question {
            id,
            title,
            content,
            options,
            is_active,
            start_date,
            end_date,
            author_id,
            is_premium,
            created_at,
            ..
        }: Question,
        answer_count: Option<i64>,
    ) -> Self {
        QuestionResponse {
            id,
            title,
            content,
            options: options.0,
            is_active,
            start_date,
            end_date,
            author_id,
            is_premium,
            created_at,
            answer_count,
        }
    }
}

impl From<AdminQuestion> for AdminQuestionResponse {
    fn from(
        AdminQuestion {
            question,
            author_name,
            author_email,
            answer_count,
            comment_count,
        }: AdminQuestion,
    ) -> Self {
        AdminQuestionResponse {
            question: QuestionResponse::new(question, Some(answer_count)),
            author: AuthorResponse {
                name: author_name,
                email: author_email,
            },
            comment_count,
        }
    }
}

impl From<Answer> for AnswerResponse {
    fn from(
        Answer {
            id,
            question_id,
            option_index,
            education,
            age_range,
            region,
            created_at,
        }: Answer,
    ) -> Self {
        AnswerResponse {
            id,
            question_id,
            option_index,
            education,
            age_range,
            region,
            created_at,
        }
    }
}

impl From<Comment> for CommentResponse {
    fn from(
        Comment {
            id,
            question_id,
            user_id,
            content,
            created_at,
            author_name,
            like_count,
            is_liked,
        }: Comment,
    ) -> Self {
        CommentResponse {
            id,
            question_id,
            content,
            created_at,
            author: CommentAuthorResponse {
                id: user_id,
                name: author_name,
            },
            like_count,
            is_liked,
        }
    }
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        MessageResponse {
            message: message.to_string(),
        }
    }
}

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::types::Json;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
    pub is_premium: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub options: Json<Vec<String>>,
    pub is_active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub author_id: i64,
    pub is_premium: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: NaiveDateTime,
}

impl Question {
    pub fn option_count(&self) -> usize {
        self.options.0.len()
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Both bounds must be set; an open-ended window never accepts answers.
    pub fn accepts_answers_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active || self.is_archived() {
            return false;
        }
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= now && now <= end,
            _ => false,
        }
    }
}

/// A question as listed in the admin panel.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminQuestion {
    #[sqlx(flatten)]
    pub question: Question,
    pub author_name: String,
    pub author_email: String,
    pub answer_count: i64,
    pub comment_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub option_index: i64,
    pub education: Option<String>,
    pub age_range: Option<String>,
    pub region: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OptionCount {
    pub option_index: i64,
    pub count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SliceCount {
    pub value: Option<String>,
    pub option_index: i64,
    pub count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub question_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub author_name: String,
    pub like_count: i64,
    pub is_liked: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Subscription {
    pub id: i64,
    pub plan_type: String,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

use serde::{Deserialize, Serialize};

use super::response::{AnswerResponse, UserResponse};
use crate::stats::{OptionStat, SliceStat};

#[derive(Debug, Deserialize, Serialize)]
pub struct AuthWrapper {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SubmitAnswerWrapper {
    pub answer: AnswerResponse,
    pub stats: Vec<OptionStat>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAnswerWrapper {
    pub has_answered: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stats: Option<Vec<OptionStat>>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStatsWrapper {
    pub total_answers: i64,
    pub overall: Vec<OptionStat>,
    pub by_education: Vec<SliceStat>,
    pub by_age_range: Vec<SliceStat>,
    pub by_region: Vec<SliceStat>,
}

impl AuthWrapper {
    pub fn wrap_with_user_data(user: UserResponse, token: String) -> AuthWrapper {
        AuthWrapper { user, token }
    }
}

//! Response types for user profile pages and follow actions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::handlers::posts::types::PostResponse;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserSummary {
    pub id: Uuid,
    pub handle: String,
    pub nickname: String,
    pub avatar_url: Option<String>,
    pub follower_count: i64,
    pub following_count: i64,
    pub post_count: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserProfileResponse {
    pub user: UserSummary,
    /// Whether the logged-in viewer follows this user; absent for anonymous
    /// viewers and on one's own page.
    pub viewer_following: Option<bool>,
    pub posts: Vec<PostResponse>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct FollowResponse {
    pub follower_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_response_round_trips() {
        let response = FollowResponse { follower_count: 3 };
        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(
            value.get("follower_count").and_then(serde_json::Value::as_i64),
            Some(3)
        );
    }
}

use serde::{Deserialize, Serialize};

/// Body of the create-user and generate-token requests.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    #[serde(rename = "userName")]
    pub user_name: &'a str,
    pub password: &'a str,
}

/// A user account as returned on creation and lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserResponse {
    /// `userID` on creation, `userId` on lookup.
    #[serde(rename = "userID", alias = "userId")]
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub books: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateTokenResponse {
    /// Null when authorization failed.
    pub token: Option<String>,
    pub expires: Option<String>,
    pub status: String,
    pub result: String,
}

use serde::{Deserialize, Serialize};

/// Request body for create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub age: i64,
}

/// Response returned after a soft delete.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
    pub id: i64,
}

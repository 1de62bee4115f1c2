use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub otp: Option<String>,
    /// Unix millis after which `otp` is no longer accepted
    #[serde(default)]
    pub otp_expires_at: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl User {
    pub fn new_unverified(username: String, email: String, password_hash: String) -> Self {
        User {
            id: None,
            username,
            email,
            password_hash,
            role: Role::User,
            is_verified: false,
            otp: None,
            otp_expires_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn set_otp(&mut self, otp: String, expires_at: i64) {
        self.otp = Some(otp);
        self.otp_expires_at = Some(expires_at);
    }

    pub fn clear_otp(&mut self) {
        self.otp = None;
        self.otp_expires_at = None;
    }
}

//! Demo account inserted by `SessionStore::seed_if_empty` in development mode.

use crate::model::{StoredUser, User};

pub const DEMO_USER_ID: &str = "demo-user";
pub const DEMO_EMAIL: &str = "demo@visionsync.com";
pub const DEMO_PASSWORD: &str = "demo123";

pub fn demo_user() -> StoredUser {
    StoredUser {
        user: User {
            id: DEMO_USER_ID.to_string(),
            email: DEMO_EMAIL.to_string(),
            first_name: "Demo".to_string(),
            last_name: "User".to_string(),
            phone: Some("+27 12 345 6789".to_string()),
            created_at: None,
        },
        password: DEMO_PASSWORD.to_string(),
    }
}

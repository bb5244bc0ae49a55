//! User preferences seam.
//!
//! The current user's identity comes from locally persisted preferences,
//! not from authentication. The repository resolves it through this trait
//! whenever it stamps an author on a write.

use async_trait::async_trait;

/// Locally persisted preference snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialPreferences {
    /// Id of the user this device writes as.
    pub current_user_id: String,
}

/// Source of locally persisted user preferences.
#[async_trait]
pub trait Preferences: Send + Sync {
    /// Fetch the persisted preference snapshot.
    async fn fetch_initial_preferences(&self) -> InitialPreferences;
}

/// Fixed preferences, for tests and single-identity deployments.
#[derive(Debug, Clone)]
pub struct StaticPreferences {
    current_user_id: String,
}

impl StaticPreferences {
    /// Preferences that always resolve to the given user id.
    pub fn new(current_user_id: impl Into<String>) -> Self {
        Self { current_user_id: current_user_id.into() }
    }
}

#[async_trait]
impl Preferences for StaticPreferences {
    async fn fetch_initial_preferences(&self) -> InitialPreferences {
        InitialPreferences { current_user_id: self.current_user_id.clone() }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims used to create or refresh a user row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Subject id issued by the identity provider
    pub subject_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// A conversation and its optional owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    /// Absent for anonymous sessions; never changes once set
    pub owner: Option<Uuid>,
    pub title: String,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn is_accessible_by(&self, user: Option<Uuid>) -> bool {
        can_access(self.owner, user)
    }
}

/// Anonymous sessions are open to anyone holding the id; owned sessions only
/// to their owner.
pub fn can_access(owner: Option<Uuid>, user: Option<Uuid>) -> bool {
    match owner {
        None => true,
        Some(owner) => user == Some(owner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(owner: Option<Uuid>) -> Session {
        Session {
            id: Uuid::new_v4(),
            owner,
            title: "New Chat".to_string(),
            started_at: Utc::now(),
        }
    }

    #[test]
    fn test_anonymous_session_is_open() {
        let session = session(None);
        assert!(session.is_accessible_by(None));
        assert!(session.is_accessible_by(Some(Uuid::new_v4())));
    }

    #[test]
    fn test_owned_session_requires_owner() {
        let owner = Uuid::new_v4();
        let session = session(Some(owner));
        assert!(session.is_accessible_by(Some(owner)));
        assert!(!session.is_accessible_by(Some(Uuid::new_v4())));
        assert!(!session.is_accessible_by(None));
    }

    #[test]
    fn test_can_access() {
        let owner = Uuid::new_v4();
        assert!(can_access(None, None));
        assert!(can_access(Some(owner), Some(owner)));
        assert!(!can_access(Some(owner), None));
    }
}

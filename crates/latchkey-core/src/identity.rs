//! Resolved authentication identity

use latchkey_db::LocalUser;

/// The resolution of a client token: either no authenticated user, or a
/// valid local user. Derived per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    User(LocalUser),
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::User(_))
    }

    pub fn user(&self) -> Option<&LocalUser> {
        match self {
            Identity::Anonymous => None,
            Identity::User(user) => Some(user),
        }
    }

    /// Raw user id, for hosts keying extension tables by `user_id`.
    pub fn user_id(&self) -> Option<i64> {
        self.user().map(|u| u.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_accessors() {
        assert!(!Identity::Anonymous.is_authenticated());
        assert!(Identity::Anonymous.user().is_none());
        assert_eq!(Identity::Anonymous.user_id(), None);

        let identity = Identity::User(LocalUser {
            id: 3,
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            enabled: true,
        });
        assert!(identity.is_authenticated());
        assert_eq!(identity.user_id(), Some(3));
        assert_eq!(identity.user().map(|u| u.username.as_str()), Some("alice"));
    }
}

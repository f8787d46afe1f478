//! User Authorization Policy
//!
//! Decides what the current user may do with a user record.

use crate::error::AuthError;
use crate::extractors::CurrentUser;

use uuid::Uuid;

/// Which users an actor may list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserScope {
    All,
    Only(Uuid),
}

/// Rules for acting on user records
#[derive(Debug, Clone, Copy)]
pub struct UserPolicy<'a> {
    actor: &'a CurrentUser,
}

impl<'a> UserPolicy<'a> {
    pub fn new(actor: &'a CurrentUser) -> Self {
        Self { actor }
    }

    fn is_self(&self, record: Uuid) -> bool {
        self.actor.user.id == record
    }

    pub fn scope(&self) -> UserScope {
        if self.actor.is_admin() {
            UserScope::All
        } else {
            UserScope::Only(self.actor.user.id)
        }
    }

    pub fn me(&self) -> bool {
        true
    }

    pub fn show(&self, record: Uuid) -> bool {
        self.actor.is_admin() || self.is_self(record)
    }

    pub fn update(&self, record: Uuid) -> bool {
        self.show(record)
    }

    pub fn update_password(&self, record: Uuid) -> bool {
        self.show(record)
    }

    /// Nobody deletes their own account through this API
    pub fn destroy(&self, record: Uuid) -> bool {
        !self.is_self(record) && self.actor.is_admin()
    }

    pub fn manage_roles(&self) -> bool {
        self.actor.is_admin()
    }
}

/// Turn a policy decision into `Forbidden`
pub fn authorize(allowed: bool) -> Result<(), AuthError> {
    if allowed {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample_user, Role};

    fn actor(roles: Vec<Role>) -> CurrentUser {
        CurrentUser {
            user: sample_user(),
            roles,
        }
    }

    #[test]
    fn test_regular_user() {
        let me = actor(vec![Role::User]);
        let policy = UserPolicy::new(&me);
        let other = Uuid::new_v4();

        assert!(policy.me());
        assert!(policy.show(me.user.id));
        assert!(policy.update(me.user.id));
        assert!(policy.update_password(me.user.id));
        assert!(!policy.show(other));
        assert!(!policy.update(other));
        assert!(!policy.destroy(other));
        assert!(!policy.destroy(me.user.id));
        assert!(!policy.manage_roles());
        assert_eq!(policy.scope(), UserScope::Only(me.user.id));
    }

    #[test]
    fn test_admin() {
        let admin = actor(vec![Role::User, Role::Admin]);
        let policy = UserPolicy::new(&admin);
        let other = Uuid::new_v4();

        assert!(policy.show(other));
        assert!(policy.update_password(other));
        assert!(policy.destroy(other));
        assert!(!policy.destroy(admin.user.id));
        assert!(policy.manage_roles());
        assert_eq!(policy.scope(), UserScope::All);
    }

    #[test]
    fn test_authorize() {
        assert!(authorize(true).is_ok());
        assert_eq!(authorize(false), Err(AuthError::Forbidden));
    }
}

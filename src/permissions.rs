//! Pure permission evaluation used to gate UI affordances.
//!
//! Deterministic functions of their inputs: no network, no side effects.
//! Denials here resolve before any request is issued.

use serde::{Deserialize, Serialize};

/// Closed role set; immutable for the lifetime of the client-side model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

/// Client-side view of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub is_active: bool,
    pub role: Role,
}

/// Closed permission universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ProfileRead,
    ProfileUpdate,
    PasswordChange,
    SessionCreate,
    SessionRead,
    SessionStop,
    SessionDelete,
    SessionShare,
    FileUpload,
    FileRead,
    FileDelete,
    UserManage,
}

/// Fixed allow-list for the plain `user` role. Anything absent is denied.
const USER_ALLOWED: &[Permission] = &[
    Permission::ProfileRead,
    Permission::ProfileUpdate,
    Permission::PasswordChange,
    Permission::SessionCreate,
    Permission::SessionRead,
    Permission::SessionStop,
    Permission::SessionDelete,
    Permission::SessionShare,
    Permission::FileUpload,
    Permission::FileRead,
    Permission::FileDelete,
];

/// Returns whether `user` holds `permission`.
///
/// Missing and inactive users hold nothing; admins hold everything.
#[must_use]
pub fn has_permission(user: Option<&User>, permission: Permission) -> bool {
    let Some(user) = user else {
        return false;
    };
    if !user.is_active {
        return false;
    }
    match user.role {
        Role::Admin => true,
        Role::User => USER_ALLOWED.contains(&permission),
    }
}

/// A user may view their own record unconditionally; only admins view
/// others.
#[must_use]
pub fn can_view_user(actor: Option<&User>, target_id: &str) -> bool {
    match actor {
        Some(actor) if actor.is_active => actor.id == target_id || actor.role == Role::Admin,
        _ => false,
    }
}

/// Same relationship rule as viewing: self always, others admin-only.
#[must_use]
pub fn can_edit_user(actor: Option<&User>, target_id: &str) -> bool {
    can_view_user(actor, target_id)
}

/// Self-deletion is always denied; only admins delete other accounts.
#[must_use]
pub fn can_delete_user(actor: Option<&User>, target_id: &str) -> bool {
    match actor {
        Some(actor) if actor.is_active => actor.id != target_id && actor.role == Role::Admin,
        _ => false,
    }
}

/// User administration is admin-only.
#[must_use]
pub fn can_manage_users(actor: Option<&User>) -> bool {
    has_permission(actor, Permission::UserManage)
}

#[cfg(test)]
mod tests {
    use super::{
        can_delete_user, can_edit_user, can_manage_users, can_view_user, has_permission,
        Permission, Role, User,
    };

    const UNIVERSE: &[Permission] = &[
        Permission::ProfileRead,
        Permission::ProfileUpdate,
        Permission::PasswordChange,
        Permission::SessionCreate,
        Permission::SessionRead,
        Permission::SessionStop,
        Permission::SessionDelete,
        Permission::SessionShare,
        Permission::FileUpload,
        Permission::FileRead,
        Permission::FileDelete,
        Permission::UserManage,
    ];

    fn admin() -> User {
        User {
            id: "u-admin".to_string(),
            is_active: true,
            role: Role::Admin,
        }
    }

    fn plain_user() -> User {
        User {
            id: "u-1".to_string(),
            is_active: true,
            role: Role::User,
        }
    }

    fn inactive_user() -> User {
        User {
            is_active: false,
            ..plain_user()
        }
    }

    #[test]
    fn missing_user_holds_nothing() {
        for permission in UNIVERSE {
            assert!(!has_permission(None, *permission));
        }
    }

    #[test]
    fn inactive_user_holds_nothing() {
        let user = inactive_user();
        for permission in UNIVERSE {
            assert!(!has_permission(Some(&user), *permission));
        }
    }

    #[test]
    fn admin_satisfies_every_permission() {
        let user = admin();
        for permission in UNIVERSE {
            assert!(has_permission(Some(&user), *permission));
        }
    }

    #[test]
    fn plain_user_is_limited_to_the_allow_list() {
        let user = plain_user();
        assert!(has_permission(Some(&user), Permission::SessionCreate));
        assert!(has_permission(Some(&user), Permission::FileUpload));
        assert!(!has_permission(Some(&user), Permission::UserManage));
    }

    #[test]
    fn users_view_and_edit_themselves_unconditionally() {
        let user = plain_user();
        assert!(can_view_user(Some(&user), "u-1"));
        assert!(can_edit_user(Some(&user), "u-1"));
        assert!(!can_view_user(Some(&user), "u-2"));
        assert!(!can_edit_user(Some(&user), "u-2"));
    }

    #[test]
    fn admins_view_and_edit_anyone() {
        let user = admin();
        assert!(can_view_user(Some(&user), "u-2"));
        assert!(can_edit_user(Some(&user), "u-2"));
    }

    #[test]
    fn self_deletion_is_always_denied() {
        let user = plain_user();
        let boss = admin();
        assert!(!can_delete_user(Some(&user), "u-1"));
        assert!(!can_delete_user(Some(&boss), "u-admin"));
    }

    #[test]
    fn only_admins_delete_other_accounts() {
        let user = plain_user();
        let boss = admin();
        assert!(can_delete_user(Some(&boss), "u-2"));
        assert!(!can_delete_user(Some(&user), "u-2"));
        assert!(!can_delete_user(None, "u-2"));
    }

    #[test]
    fn inactive_users_fail_every_derived_check() {
        let user = inactive_user();
        assert!(!can_view_user(Some(&user), "u-1"));
        assert!(!can_edit_user(Some(&user), "u-1"));
        assert!(!can_delete_user(Some(&user), "u-2"));
        assert!(!can_manage_users(Some(&user)));
    }

    #[test]
    fn user_management_is_admin_only() {
        assert!(can_manage_users(Some(&admin())));
        assert!(!can_manage_users(Some(&plain_user())));
        assert!(!can_manage_users(None));
    }
}

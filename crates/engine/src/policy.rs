//! Access scoping policy.
//!
//! Pure functions over the caller's role: which subset of an entity kind the
//! caller can see ([`scope`]) and which mutations the role allows
//! ([`can_mutate`]). The engine turns a [`Scope`] into query conditions and
//! adds object-level checks on top (e.g. "is this my order").

use uuid::Uuid;

use crate::util::choice_enum;

choice_enum!(
    /// Role tag carried by every principal.
    Role, "role" {
        Admin => ("admin", "Admin"),
        Owner => ("owner", "Owner"),
        Driver => ("driver", "Driver"),
    }
);

/// An authenticated caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub const fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Truck,
    Order,
    Expense,
    Transfer,
    Timeline,
    User,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
    UpdateStatus,
    AssignDriver,
    AttachDocument,
}

/// Visible subset of an entity kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    All,
    Nothing,
    /// Rows belonging to orders/trucks owned by the user.
    OwnedBy(Uuid),
    /// Rows on orders/trucks the user drives.
    AssignedTo(Uuid),
    /// Rows recorded by the user.
    AuthoredBy(Uuid),
    /// Transfers on orders the user drives, plus every driver-directed transfer.
    DriverTransfers(Uuid),
    /// The owner and driver directory.
    Directory,
    /// Only the user's own record.
    Myself(Uuid),
}

/// Computes the visible subset of `kind` for `principal`.
///
/// An absent principal sees nothing.
#[must_use]
pub fn scope(principal: Option<&Principal>, kind: EntityKind) -> Scope {
    let Some(principal) = principal else {
        return Scope::Nothing;
    };
    let me = principal.user_id;
    match (principal.role, kind) {
        (Role::Admin, _) => Scope::All,

        (Role::Owner, EntityKind::User) => Scope::Directory,
        (Role::Owner, _) => Scope::OwnedBy(me),

        (Role::Driver, EntityKind::Truck | EntityKind::Order | EntityKind::Timeline) => {
            Scope::AssignedTo(me)
        }
        (Role::Driver, EntityKind::Expense) => Scope::AuthoredBy(me),
        (Role::Driver, EntityKind::Transfer) => Scope::DriverTransfers(me),
        (Role::Driver, EntityKind::User) => Scope::Myself(me),
    }
}

/// Whether the principal's role allows `action` on `kind` at all.
///
/// Object-level checks (ownership, assignment) still apply afterwards.
#[must_use]
pub fn can_mutate(principal: Option<&Principal>, kind: EntityKind, action: Action) -> bool {
    let Some(principal) = principal else {
        return false;
    };
    match (kind, action) {
        (
            EntityKind::Truck,
            Action::Create | Action::Update | Action::Delete | Action::AssignDriver,
        ) => principal.is_admin(),

        (EntityKind::Order, Action::Create | Action::Update) => {
            matches!(principal.role, Role::Admin | Role::Owner)
        }
        (EntityKind::Order, Action::Delete) => principal.is_admin(),
        (EntityKind::Order, Action::UpdateStatus | Action::AttachDocument) => true,

        (EntityKind::Expense, Action::Create) => matches!(principal.role, Role::Driver),
        (EntityKind::Expense, Action::Delete) => principal.is_admin(),

        (EntityKind::Transfer, Action::Create | Action::Delete) => principal.is_admin(),

        (EntityKind::User, Action::Create | Action::Delete) => principal.is_admin(),

        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal::new(Uuid::new_v4(), role)
    }

    #[test]
    fn admin_sees_everything() {
        let admin = principal(Role::Admin);
        for kind in [
            EntityKind::Truck,
            EntityKind::Order,
            EntityKind::Expense,
            EntityKind::Transfer,
            EntityKind::Timeline,
            EntityKind::User,
        ] {
            assert_eq!(scope(Some(&admin), kind), Scope::All);
        }
    }

    #[test]
    fn owner_is_scoped_to_own_rows() {
        let owner = principal(Role::Owner);
        let me = owner.user_id;
        assert_eq!(scope(Some(&owner), EntityKind::Truck), Scope::OwnedBy(me));
        assert_eq!(scope(Some(&owner), EntityKind::Order), Scope::OwnedBy(me));
        assert_eq!(scope(Some(&owner), EntityKind::Expense), Scope::OwnedBy(me));
        assert_eq!(scope(Some(&owner), EntityKind::Transfer), Scope::OwnedBy(me));
        assert_eq!(scope(Some(&owner), EntityKind::Timeline), Scope::OwnedBy(me));
        assert_eq!(scope(Some(&owner), EntityKind::User), Scope::Directory);
    }

    #[test]
    fn driver_is_scoped_to_assignments_and_own_records() {
        let driver = principal(Role::Driver);
        let me = driver.user_id;
        assert_eq!(scope(Some(&driver), EntityKind::Truck), Scope::AssignedTo(me));
        assert_eq!(scope(Some(&driver), EntityKind::Order), Scope::AssignedTo(me));
        assert_eq!(scope(Some(&driver), EntityKind::Expense), Scope::AuthoredBy(me));
        assert_eq!(
            scope(Some(&driver), EntityKind::Transfer),
            Scope::DriverTransfers(me)
        );
        assert_eq!(scope(Some(&driver), EntityKind::Timeline), Scope::AssignedTo(me));
        assert_eq!(scope(Some(&driver), EntityKind::User), Scope::Myself(me));
    }

    #[test]
    fn anonymous_sees_nothing_and_mutates_nothing() {
        assert_eq!(scope(None, EntityKind::Order), Scope::Nothing);
        assert!(!can_mutate(None, EntityKind::Order, Action::UpdateStatus));
    }

    #[test]
    fn mutation_table() {
        let admin = principal(Role::Admin);
        let owner = principal(Role::Owner);
        let driver = principal(Role::Driver);

        assert!(can_mutate(Some(&admin), EntityKind::Truck, Action::Create));
        assert!(!can_mutate(Some(&owner), EntityKind::Truck, Action::Update));
        assert!(!can_mutate(Some(&driver), EntityKind::Truck, Action::AssignDriver));

        assert!(can_mutate(Some(&owner), EntityKind::Order, Action::Create));
        assert!(can_mutate(Some(&owner), EntityKind::Order, Action::Update));
        assert!(!can_mutate(Some(&owner), EntityKind::Order, Action::Delete));
        assert!(!can_mutate(Some(&driver), EntityKind::Order, Action::Update));
        assert!(can_mutate(Some(&driver), EntityKind::Order, Action::UpdateStatus));

        assert!(can_mutate(Some(&driver), EntityKind::Expense, Action::Create));
        assert!(!can_mutate(Some(&admin), EntityKind::Expense, Action::Create));
        assert!(can_mutate(Some(&admin), EntityKind::Expense, Action::Delete));

        assert!(can_mutate(Some(&admin), EntityKind::Transfer, Action::Create));
        assert!(!can_mutate(Some(&owner), EntityKind::Transfer, Action::Create));

        assert!(!can_mutate(Some(&admin), EntityKind::Timeline, Action::Delete));
    }
}

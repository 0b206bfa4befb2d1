use sea_orm::{
    Condition, ConnectionTrait, QueryFilter, prelude::*,
    sea_query::{Expr, Query, SelectStatement},
};
use uuid::Uuid;

use crate::{
    EngineError, Principal, ResultEngine, Role, TransferKind, expenses, orders,
    policy::{Action, EntityKind, Scope, can_mutate, scope},
    timeline, transfers, trucks, users,
};

use super::Engine;

/// Matches no row.
fn nothing() -> Condition {
    Condition::all().add(Expr::val(1).eq(0))
}

/// Ids of the orders where `column` references `user_id`.
fn order_ids_where(column: orders::Column, user_id: Uuid) -> SelectStatement {
    Query::select()
        .column(orders::Column::Id)
        .from(orders::Entity)
        .and_where(column.eq(user_id.to_string()))
        .to_owned()
}

pub(super) fn truck_scope(principal: &Principal) -> Condition {
    match scope(Some(principal), EntityKind::Truck) {
        Scope::All => Condition::all(),
        Scope::OwnedBy(id) => Condition::all().add(trucks::Column::OwnerId.eq(id.to_string())),
        Scope::AssignedTo(id) => {
            Condition::all().add(trucks::Column::AssignedDriverId.eq(id.to_string()))
        }
        _ => nothing(),
    }
}

pub(super) fn order_scope(principal: &Principal) -> Condition {
    match scope(Some(principal), EntityKind::Order) {
        Scope::All => Condition::all(),
        Scope::OwnedBy(id) => Condition::all().add(orders::Column::OwnerId.eq(id.to_string())),
        Scope::AssignedTo(id) => Condition::all().add(orders::Column::DriverId.eq(id.to_string())),
        _ => nothing(),
    }
}

pub(super) fn expense_scope(principal: &Principal) -> Condition {
    match scope(Some(principal), EntityKind::Expense) {
        Scope::All => Condition::all(),
        Scope::OwnedBy(id) => Condition::all().add(
            expenses::Column::OrderId.in_subquery(order_ids_where(orders::Column::OwnerId, id)),
        ),
        Scope::AuthoredBy(id) => {
            Condition::all().add(expenses::Column::AddedBy.eq(id.to_string()))
        }
        _ => nothing(),
    }
}

pub(super) fn transfer_scope(principal: &Principal) -> Condition {
    match scope(Some(principal), EntityKind::Transfer) {
        Scope::All => Condition::all(),
        Scope::OwnedBy(id) => Condition::all().add(
            transfers::Column::OrderId.in_subquery(order_ids_where(orders::Column::OwnerId, id)),
        ),
        // Driver-directed transfers are visible to every driver, not only the
        // one on the order.
        Scope::DriverTransfers(id) => Condition::any()
            .add(
                transfers::Column::OrderId
                    .in_subquery(order_ids_where(orders::Column::DriverId, id)),
            )
            .add(
                transfers::Column::Kind
                    .is_in(TransferKind::DRIVER_FACING.iter().map(|kind| kind.as_str())),
            ),
        _ => nothing(),
    }
}

pub(super) fn timeline_scope(principal: &Principal) -> Condition {
    match scope(Some(principal), EntityKind::Timeline) {
        Scope::All => Condition::all(),
        Scope::OwnedBy(id) => Condition::all().add(
            timeline::Column::OrderId.in_subquery(order_ids_where(orders::Column::OwnerId, id)),
        ),
        Scope::AssignedTo(id) => Condition::all().add(
            timeline::Column::OrderId.in_subquery(order_ids_where(orders::Column::DriverId, id)),
        ),
        _ => nothing(),
    }
}

pub(super) fn user_scope(principal: &Principal) -> Condition {
    match scope(Some(principal), EntityKind::User) {
        Scope::All => Condition::all(),
        Scope::Directory => Condition::all().add(
            users::Column::Role.is_in([Role::Owner.as_str(), Role::Driver.as_str()]),
        ),
        Scope::Myself(id) => Condition::all().add(users::Column::Id.eq(id.to_string())),
        _ => nothing(),
    }
}

/// Rejects the call when the role may not perform `action` on `kind`.
///
/// Runs before anything is read, so a denial never leaks whether the target
/// exists.
pub(super) fn ensure_can(principal: &Principal, kind: EntityKind, action: Action) -> ResultEngine<()> {
    if can_mutate(Some(principal), kind, action) {
        return Ok(());
    }
    Err(EngineError::Forbidden(
        "you do not have permission to perform this action".to_string(),
    ))
}

/// Generates a `require_*` lookup that finds a row by id inside the
/// principal's scope and reports anything else as missing.
macro_rules! impl_require_in_scope {
    ($require_fn:ident, $entity:path, $model:path, $scope_fn:ident, $err_msg:literal) => {
        pub(super) async fn $require_fn<C>(
            &self,
            db: &C,
            principal: &Principal,
            id: Uuid,
        ) -> ResultEngine<$model>
        where
            C: ConnectionTrait,
        {
            <$entity>::find_by_id(id.to_string())
                .filter($scope_fn(principal))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_in_scope!(
        require_truck,
        trucks::Entity,
        trucks::Model,
        truck_scope,
        "truck not exists"
    );

    impl_require_in_scope!(
        require_order,
        orders::Entity,
        orders::Model,
        order_scope,
        "order not exists"
    );

    impl_require_in_scope!(
        require_expense,
        expenses::Entity,
        expenses::Model,
        expense_scope,
        "expense not exists"
    );

    impl_require_in_scope!(
        require_transfer,
        transfers::Entity,
        transfers::Model,
        transfer_scope,
        "transfer not exists"
    );

    impl_require_in_scope!(
        require_event,
        timeline::Entity,
        timeline::Model,
        timeline_scope,
        "timeline event not exists"
    );

    /// Loads a user that must carry `role`; any other user is reported as
    /// missing under the role's name.
    pub(super) async fn require_user_with_role<C>(
        &self,
        db: &C,
        user_id: Uuid,
        role: Role,
    ) -> ResultEngine<users::Model>
    where
        C: ConnectionTrait,
    {
        users::Entity::find_by_id(user_id.to_string())
            .filter(users::Column::Role.eq(role.as_str()))
            .one(db)
            .await?
            .ok_or_else(|| {
                EngineError::KeyNotFound(format!("{} not exists", role.as_str()))
            })
    }

    /// Any existing truck, regardless of scope. Used when wiring references.
    pub(super) async fn require_truck_ref<C>(&self, db: &C, truck_id: Uuid) -> ResultEngine<()>
    where
        C: ConnectionTrait,
    {
        trucks::Entity::find_by_id(truck_id.to_string())
            .one(db)
            .await?
            .map(|_| ())
            .ok_or_else(|| EngineError::KeyNotFound("truck not exists".to_string()))
    }

    /// Display name of `user_id`, or "None" when there is no user.
    pub(super) async fn display_name<C>(&self, db: &C, user_id: Option<Uuid>) -> ResultEngine<String>
    where
        C: ConnectionTrait,
    {
        let Some(user_id) = user_id else {
            return Ok("None".to_string());
        };
        let model = users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        Ok(display_name_of(&model))
    }
}

pub(super) fn display_name_of(model: &users::Model) -> String {
    let full = format!("{} {}", model.first_name, model.last_name);
    let full = full.trim();
    if full.is_empty() {
        model.email.clone()
    } else {
        full.to_string()
    }
}

use chrono::Utc;
use sea_orm::{
    ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::{Expr, Query},
};
use uuid::Uuid;

use crate::{
    EngineError, NewUser, Principal, ResultEngine, Role, User, expenses, orders,
    policy::{Action, EntityKind},
    timeline, transfers, trucks, users,
    util::normalize_required_text,
};

use super::{
    Engine,
    access::{ensure_can, user_scope},
    with_tx,
};

/// A user together with the stored password hash, for credential checks.
#[derive(Clone, Debug)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = normalize_required_text(value, "email")?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(EngineError::Validation(format!("invalid email: {email}"))),
    }
}

/// Counts rows of `entity` whose `column` equals `user_id`.
async fn references<E, C>(db: &C, column: E::Column, user_id: &str) -> ResultEngine<u64>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    Ok(E::find()
        .filter(column.eq(user_id.to_string()))
        .count(db)
        .await?)
}

impl Engine {
    /// Store a new user without an acting principal. Used to bootstrap the
    /// first admin from the command line.
    pub async fn provision_user(&self, cmd: NewUser) -> ResultEngine<User> {
        let email = normalize_email(&cmd.email)?;
        if cmd.password_hash.is_empty() {
            return Err(EngineError::Validation(
                "password must not be empty".to_string(),
            ));
        }
        let user = User {
            id: Uuid::new_v4(),
            email,
            first_name: cmd.first_name.trim().to_string(),
            last_name: cmd.last_name.trim().to_string(),
            phone: cmd.phone.trim().to_string(),
            role: cmd.role,
            is_active: true,
            created_at: Utc::now(),
        };

        with_tx!(self, |db_tx| {
            let taken = users::Entity::find()
                .filter(users::Column::Email.eq(user.email.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(user.email.clone()));
            }
            users::ActiveModel::new_user(&user, cmd.password_hash)
                .insert(&db_tx)
                .await?;

            tracing::info!(user = %user.id, role = user.role.as_str(), "user created");
            Ok(user)
        })
    }

    /// Create a user (admin).
    pub async fn create_user(&self, principal: &Principal, cmd: NewUser) -> ResultEngine<User> {
        ensure_can(principal, EntityKind::User, Action::Create)?;
        self.provision_user(cmd).await
    }

    /// Looks a user up by email for authentication.
    pub async fn user_credentials(&self, email: &str) -> ResultEngine<Option<UserCredentials>> {
        let Some(model) = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };
        let password_hash = model.password_hash.clone();
        Ok(Some(UserCredentials {
            user: User::try_from(model)?,
            password_hash,
        }))
    }

    /// Users visible to the principal: everyone for an admin, owners and
    /// drivers for an owner, only themselves for a driver.
    pub async fn list_users(
        &self,
        principal: &Principal,
        role: Option<Role>,
    ) -> ResultEngine<Vec<User>> {
        let mut select = users::Entity::find().filter(user_scope(principal));
        if let Some(role) = role {
            select = select.filter(users::Column::Role.eq(role.as_str()));
        }
        select
            .order_by_asc(users::Column::Email)
            .all(&self.database)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn directory(&self, principal: &Principal, role: Role) -> ResultEngine<Vec<User>> {
        if !matches!(principal.role, Role::Admin | Role::Owner) {
            return Err(EngineError::Forbidden(
                "you do not have permission to perform this action".to_string(),
            ));
        }
        self.list_users(principal, Some(role)).await
    }

    /// Every driver (admin or owner).
    pub async fn drivers(&self, principal: &Principal) -> ResultEngine<Vec<User>> {
        self.directory(principal, Role::Driver).await
    }

    /// Every owner (admin or owner).
    pub async fn owners(&self, principal: &Principal) -> ResultEngine<Vec<User>> {
        self.directory(principal, Role::Owner).await
    }

    pub async fn profile(&self, principal: &Principal) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(principal.user_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        User::try_from(model)
    }

    /// Delete a user (admin).
    ///
    /// Fails with `InUse` while the user owns orders or authored any ledger
    /// or timeline record. Otherwise the user's trucks go away (their orders
    /// lose the truck), and orders and trucks they drive lose their driver.
    pub async fn delete_user(&self, principal: &Principal, user_id: Uuid) -> ResultEngine<()> {
        ensure_can(principal, EntityKind::User, Action::Delete)?;
        with_tx!(self, |db_tx| {
            let id = user_id.to_string();
            users::Entity::find_by_id(id.clone())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;

            let referenced = references::<orders::Entity, _>(&db_tx, orders::Column::OwnerId, &id)
                .await?
                + references::<orders::Entity, _>(&db_tx, orders::Column::CreatedBy, &id).await?
                + references::<expenses::Entity, _>(&db_tx, expenses::Column::AddedBy, &id)
                    .await?
                + references::<transfers::Entity, _>(&db_tx, transfers::Column::CreatedBy, &id)
                    .await?
                + references::<timeline::Entity, _>(&db_tx, timeline::Column::CreatedBy, &id)
                    .await?;
            if referenced > 0 {
                return Err(EngineError::InUse(
                    "user is referenced by orders or ledger records".to_string(),
                ));
            }

            let no_ref = || Expr::value(Option::<String>::None);
            orders::Entity::update_many()
                .col_expr(orders::Column::TruckId, no_ref())
                .filter(
                    orders::Column::TruckId.in_subquery(
                        Query::select()
                            .column(trucks::Column::Id)
                            .from(trucks::Entity)
                            .and_where(trucks::Column::OwnerId.eq(id.clone()))
                            .to_owned(),
                    ),
                )
                .exec(&db_tx)
                .await?;
            trucks::Entity::delete_many()
                .filter(trucks::Column::OwnerId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            orders::Entity::update_many()
                .col_expr(orders::Column::DriverId, no_ref())
                .filter(orders::Column::DriverId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            trucks::Entity::update_many()
                .col_expr(trucks::Column::AssignedDriverId, no_ref())
                .filter(trucks::Column::AssignedDriverId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(id).exec(&db_tx).await?;

            tracing::info!(user = %user_id, "user deleted");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  Ravi@Example.COM ").unwrap(),
            "ravi@example.com"
        );
        assert!(normalize_email("ravi").is_err());
        assert!(normalize_email("@example.com").is_err());
    }
}

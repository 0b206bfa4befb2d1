use chrono::Utc;
use sea_orm::{Order, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    EventKind, Expense, ExpenseCategory, Money, NewExpense, Principal, ResultEngine,
    expenses,
    policy::{Action, EntityKind},
    timeline::{self, NewEvent},
    util::{normalize_optional_text, normalize_required_text, require_positive},
};

use super::{
    Engine,
    access::{ensure_can, expense_scope},
    listing, with_tx,
};

/// Filters for listing expenses.
#[derive(Clone, Debug, Default)]
pub struct ExpenseListFilter {
    pub category: Option<ExpenseCategory>,
    pub order_id: Option<Uuid>,
    pub added_by: Option<Uuid>,
    /// Matches the description.
    pub search: Option<String>,
    /// `created_at` or `amount`, optionally prefixed by `-`.
    pub ordering: Option<String>,
    pub limit: Option<u64>,
}

impl Engine {
    /// Record an expense (driver) on an order the driver is assigned to.
    pub async fn create_expense(
        &self,
        principal: &Principal,
        cmd: NewExpense,
    ) -> ResultEngine<Expense> {
        ensure_can(principal, EntityKind::Expense, Action::Create)?;
        require_positive(cmd.amount_minor, "amount")?;
        let description = normalize_required_text(&cmd.description, "description")?;

        with_tx!(self, |db_tx| {
            self.require_order(&db_tx, principal, cmd.order_id).await?;

            let expense = Expense {
                id: Uuid::new_v4(),
                order_id: cmd.order_id,
                category: cmd.category,
                description,
                amount_minor: cmd.amount_minor,
                bill_photo: normalize_optional_text(cmd.bill_photo.as_deref()),
                added_by: principal.user_id,
                created_at: Utc::now(),
            };
            let model: expenses::ActiveModel = (&expense).into();
            model.insert(&db_tx).await?;

            self.record(
                &db_tx,
                principal,
                NewEvent::new(
                    Some(expense.order_id),
                    EventKind::ExpenseAdded,
                    format!("Expense Added: {}", expense.category),
                    format!(
                        "{} - {}",
                        Money::new(expense.amount_minor),
                        expense.description
                    ),
                )
                .expense(expense.id),
            )
            .await?;

            tracing::info!(expense = %expense.id, order = %expense.order_id, "expense recorded");
            Ok(expense)
        })
    }

    pub async fn list_expenses(
        &self,
        principal: &Principal,
        filter: &ExpenseListFilter,
    ) -> ResultEngine<Vec<Expense>> {
        let mut select = expenses::Entity::find().filter(expense_scope(principal));
        if let Some(category) = filter.category {
            select = select.filter(expenses::Column::Category.eq(category.as_str()));
        }
        if let Some(order_id) = filter.order_id {
            select = select.filter(expenses::Column::OrderId.eq(order_id.to_string()));
        }
        if let Some(user_id) = filter.added_by {
            select = select.filter(expenses::Column::AddedBy.eq(user_id.to_string()));
        }
        if let Some(cond) =
            listing::search(filter.search.as_deref(), &[expenses::Column::Description])
        {
            select = select.filter(cond);
        }
        let select = listing::apply_ordering(
            select,
            filter.ordering.as_deref(),
            &[
                ("created_at", expenses::Column::CreatedAt),
                ("amount", expenses::Column::AmountMinor),
            ],
            (expenses::Column::CreatedAt, Order::Desc),
        )?;
        listing::limit(select, filter.limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    pub async fn expense(&self, principal: &Principal, expense_id: Uuid) -> ResultEngine<Expense> {
        let model = self
            .require_expense(&self.database, principal, expense_id)
            .await?;
        Expense::try_from(model)
    }

    /// Delete an expense (admin). Timeline events pointing at it keep
    /// existing with the reference cleared.
    pub async fn delete_expense(&self, principal: &Principal, expense_id: Uuid) -> ResultEngine<()> {
        ensure_can(principal, EntityKind::Expense, Action::Delete)?;
        with_tx!(self, |db_tx| {
            self.require_expense(&db_tx, principal, expense_id).await?;
            let id = expense_id.to_string();

            timeline::Entity::update_many()
                .col_expr(
                    timeline::Column::RelatedExpenseId,
                    Expr::value(Option::<String>::None),
                )
                .filter(timeline::Column::RelatedExpenseId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_by_id(id).exec(&db_tx).await?;

            tracing::info!(expense = %expense_id, "expense deleted");
            Ok(())
        })
    }
}

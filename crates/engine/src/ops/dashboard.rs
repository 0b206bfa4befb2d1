//! Read-only rollups for the dashboards.
//!
//! Every figure is computed inside the caller's visible scope; sums over an
//! empty set are zero.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Utc};
use sea_orm::{
    ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    prelude::*, sea_query::Expr,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, Expense, Order, OrderStatus, Principal, ResultEngine, Role, TruckStatus, User,
    expenses, orders, trucks,
};

use super::{
    Engine,
    access::{expense_scope, order_scope},
};

const RECENT_ITEMS: u64 = 5;
const REVENUE_WINDOW_DAYS: i64 = 365;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_orders: u64,
    pub active_orders: u64,
    pub total_revenue_minor: i64,
    pub pending_amount_minor: i64,
    pub total_expenses_minor: i64,
    pub total_profit_minor: i64,
    pub recent_orders: Vec<Order>,
    pub upcoming_deliveries: Vec<Order>,
    pub recent_expenses: Vec<Expense>,
}

/// Revenue of the orders created in one calendar month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub total_minor: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OwnerDashboard {
    pub owner: User,
    pub truck_count: u64,
    /// Trucks currently available for a trip.
    pub active_trucks: u64,
    /// Order count per status; statuses without orders are omitted.
    pub orders_by_status: Vec<(OrderStatus, u64)>,
    pub total_orders: u64,
    pub total_revenue_minor: i64,
    /// Trailing twelve months, oldest first.
    pub revenue_by_month: Vec<MonthlyRevenue>,
}

async fn sum_of<E, C>(db: &C, select: Select<E>, column: E::Column) -> ResultEngine<i64>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let sum: Option<Option<i64>> = select
        .select_only()
        .column_as(Expr::col(column).sum(), "sum")
        .into_tuple()
        .one(db)
        .await?;
    Ok(sum.flatten().unwrap_or(0))
}

/// Buckets `(created_at, amount)` pairs by calendar month.
fn revenue_by_month(rows: impl IntoIterator<Item = (DateTime<Utc>, i64)>) -> Vec<MonthlyRevenue> {
    rows.into_iter()
        .fold(BTreeMap::<(i32, u32), i64>::new(), |mut acc, (at, amount)| {
            *acc.entry((at.year(), at.month())).or_default() += amount;
            acc
        })
        .into_iter()
        .map(|((year, month), total_minor)| MonthlyRevenue {
            year,
            month,
            total_minor,
        })
        .collect()
}

impl Engine {
    /// Totals, counts and recent items within the principal's scope.
    pub async fn stats(&self, principal: &Principal) -> ResultEngine<DashboardStats> {
        let db = &self.database;
        let visible_orders = || orders::Entity::find().filter(order_scope(principal));
        let visible_expenses = || expenses::Entity::find().filter(expense_scope(principal));
        let active: Vec<&str> = OrderStatus::ACTIVE.iter().map(|s| s.as_str()).collect();

        let total_orders = visible_orders().count(db).await?;
        let active_orders = visible_orders()
            .filter(orders::Column::Status.is_in(active.clone()))
            .count(db)
            .await?;
        let total_revenue_minor =
            sum_of(db, visible_orders(), orders::Column::TotalAmountMinor).await?;
        let pending_amount_minor =
            sum_of(db, visible_orders(), orders::Column::BalanceAmountMinor).await?;
        let total_expenses_minor =
            sum_of(db, visible_expenses(), expenses::Column::AmountMinor).await?;

        let recent_orders = visible_orders()
            .order_by_desc(orders::Column::CreatedAt)
            .limit(RECENT_ITEMS)
            .all(db)
            .await?
            .into_iter()
            .map(Order::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        let upcoming_deliveries = visible_orders()
            .filter(orders::Column::EstimatedDeliveryDate.gt(Utc::now()))
            .filter(orders::Column::Status.is_in(active))
            .order_by_asc(orders::Column::EstimatedDeliveryDate)
            .limit(RECENT_ITEMS)
            .all(db)
            .await?
            .into_iter()
            .map(Order::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        let recent_expenses = visible_expenses()
            .order_by_desc(expenses::Column::CreatedAt)
            .limit(RECENT_ITEMS)
            .all(db)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(DashboardStats {
            total_orders,
            active_orders,
            total_revenue_minor,
            pending_amount_minor,
            total_expenses_minor,
            total_profit_minor: total_revenue_minor - total_expenses_minor,
            recent_orders,
            upcoming_deliveries,
            recent_expenses,
        })
    }

    /// Fleet and revenue overview of one owner (admin or that owner).
    ///
    /// `owner_id` defaults to the caller.
    pub async fn owner_dashboard(
        &self,
        principal: &Principal,
        owner_id: Option<Uuid>,
    ) -> ResultEngine<OwnerDashboard> {
        let owner_id = owner_id.unwrap_or(principal.user_id);
        match principal.role {
            Role::Admin => {}
            Role::Owner if owner_id == principal.user_id => {}
            _ => {
                return Err(EngineError::Forbidden(
                    "you do not have permission to perform this action".to_string(),
                ));
            }
        }

        let db = &self.database;
        let owner = self
            .require_user_with_role(db, owner_id, Role::Owner)
            .await?;
        let owner = User::try_from(owner)?;
        let owner_key = owner.id.to_string();

        let owned_trucks =
            || trucks::Entity::find().filter(trucks::Column::OwnerId.eq(owner_key.clone()));
        let owned_orders =
            || orders::Entity::find().filter(orders::Column::OwnerId.eq(owner_key.clone()));

        let truck_count = owned_trucks().count(db).await?;
        let active_trucks = owned_trucks()
            .filter(trucks::Column::Status.eq(TruckStatus::Available.as_str()))
            .count(db)
            .await?;

        let status_counts: Vec<(String, i64)> = owned_orders()
            .select_only()
            .column(orders::Column::Status)
            .column_as(Expr::col(orders::Column::Id).count(), "count")
            .group_by(orders::Column::Status)
            .into_tuple()
            .all(db)
            .await?;
        let mut orders_by_status = status_counts
            .into_iter()
            .map(|(status, count)| {
                Ok((
                    OrderStatus::try_from(status.as_str())?,
                    u64::try_from(count).unwrap_or_default(),
                ))
            })
            .collect::<ResultEngine<Vec<_>>>()?;
        orders_by_status.sort_by_key(|(status, _)| OrderStatus::ALL.iter().position(|s| s == status));

        let total_orders = owned_orders().count(db).await?;
        let total_revenue_minor =
            sum_of(db, owned_orders(), orders::Column::TotalAmountMinor).await?;

        let since = Utc::now() - Duration::days(REVENUE_WINDOW_DAYS);
        let window: Vec<(DateTime<Utc>, i64)> = owned_orders()
            .filter(orders::Column::CreatedAt.gte(since))
            .select_only()
            .column(orders::Column::CreatedAt)
            .column(orders::Column::TotalAmountMinor)
            .into_tuple()
            .all(db)
            .await?;

        Ok(OwnerDashboard {
            owner,
            truck_count,
            active_trucks,
            orders_by_status,
            total_orders,
            total_revenue_minor,
            revenue_by_month: revenue_by_month(window),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn revenue_is_bucketed_by_calendar_month() {
        let at = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
        let buckets = revenue_by_month([
            (at(2026, 3, 31), 100),
            (at(2026, 2, 1), 50),
            (at(2026, 3, 1), 25),
            (at(2025, 12, 15), 10),
        ]);
        assert_eq!(
            buckets,
            vec![
                MonthlyRevenue { year: 2025, month: 12, total_minor: 10 },
                MonthlyRevenue { year: 2026, month: 2, total_minor: 50 },
                MonthlyRevenue { year: 2026, month: 3, total_minor: 125 },
            ]
        );
    }

    #[test]
    fn no_orders_no_buckets() {
        assert!(revenue_by_month(Vec::new()).is_empty());
    }
}

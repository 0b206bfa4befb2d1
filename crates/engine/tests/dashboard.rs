mod common;

use chrono::{Datelike, Utc};

use common::{fleet, order_for, truck_for};
use engine::{EngineError, ExpenseCategory, NewExpense, OrderStatus, TruckStatus};

#[tokio::test]
async fn empty_dashboard_is_all_zero() {
    let f = fleet().await;

    let stats = f.engine.stats(&f.owner).await.unwrap();

    assert_eq!(stats.total_orders, 0);
    assert_eq!(stats.total_revenue_minor, 0);
    assert_eq!(stats.total_expenses_minor, 0);
    assert_eq!(stats.total_profit_minor, 0);
    assert!(stats.recent_orders.is_empty());
}

#[tokio::test]
async fn stats_are_computed_within_scope() {
    let f = fleet().await;
    let mine = f
        .engine
        .create_order(
            &f.admin,
            order_for(&f.owner)
                .amounts(30_000_00, 5_000_00)
                .driver(f.driver.user_id),
        )
        .await
        .unwrap();
    let delivered = f
        .engine
        .create_order(&f.admin, order_for(&f.owner).amounts(20_000_00, 20_000_00))
        .await
        .unwrap();
    f.engine
        .update_order_status(&f.admin, delivered.id, "delivered")
        .await
        .unwrap();
    f.engine
        .create_order(&f.admin, order_for(&f.other_owner).amounts(99_000_00, 0))
        .await
        .unwrap();
    f.engine
        .create_expense(
            &f.driver,
            NewExpense::new(mine.id, ExpenseCategory::Fuel, 6_000_00, "Diesel"),
        )
        .await
        .unwrap();

    let stats = f.engine.stats(&f.owner).await.unwrap();
    assert_eq!(stats.total_orders, 2);
    assert_eq!(stats.active_orders, 1);
    assert_eq!(stats.total_revenue_minor, 50_000_00);
    assert_eq!(stats.pending_amount_minor, 25_000_00);
    assert_eq!(stats.total_expenses_minor, 6_000_00);
    assert_eq!(stats.total_profit_minor, 44_000_00);
    assert_eq!(stats.recent_orders.len(), 2);
    assert_eq!(stats.upcoming_deliveries.len(), 1);
    assert_eq!(stats.upcoming_deliveries[0].id, mine.id);
    assert_eq!(stats.recent_expenses.len(), 1);

    let admin = f.engine.stats(&f.admin).await.unwrap();
    assert_eq!(admin.total_orders, 3);
    assert_eq!(admin.total_revenue_minor, 149_000_00);

    let driver = f.engine.stats(&f.driver).await.unwrap();
    assert_eq!(driver.total_orders, 1);
    assert_eq!(driver.total_revenue_minor, 30_000_00);
}

#[tokio::test]
async fn owner_dashboard_summarises_fleet_and_revenue() {
    let f = fleet().await;
    f.engine
        .create_truck(&f.admin, truck_for("MH12AB1234", &f.owner))
        .await
        .unwrap();
    f.engine
        .create_truck(
            &f.admin,
            truck_for("MH12AB9999", &f.owner).status(TruckStatus::Maintenance),
        )
        .await
        .unwrap();
    let first = f
        .engine
        .create_order(&f.owner, order_for(&f.owner).amounts(10_000_00, 0))
        .await
        .unwrap();
    f.engine
        .create_order(&f.owner, order_for(&f.owner).amounts(15_000_00, 0))
        .await
        .unwrap();
    f.engine
        .update_order_status(&f.owner, first.id, "cancelled")
        .await
        .unwrap();

    let dashboard = f.engine.owner_dashboard(&f.owner, None).await.unwrap();

    assert_eq!(dashboard.owner.id, f.owner.user_id);
    assert_eq!(dashboard.truck_count, 2);
    assert_eq!(dashboard.active_trucks, 1);
    assert_eq!(dashboard.total_orders, 2);
    assert_eq!(dashboard.total_revenue_minor, 25_000_00);
    assert_eq!(
        dashboard.orders_by_status,
        vec![(OrderStatus::Pending, 1), (OrderStatus::Cancelled, 1)]
    );
    let now = Utc::now();
    assert_eq!(dashboard.revenue_by_month.len(), 1);
    assert_eq!(dashboard.revenue_by_month[0].year, now.year());
    assert_eq!(dashboard.revenue_by_month[0].month, now.month());
    assert_eq!(dashboard.revenue_by_month[0].total_minor, 25_000_00);

    let via_admin = f
        .engine
        .owner_dashboard(&f.admin, Some(f.owner.user_id))
        .await
        .unwrap();
    assert_eq!(via_admin.total_orders, 2);
}

#[tokio::test]
async fn owner_dashboard_access() {
    let f = fleet().await;

    let err = f
        .engine
        .owner_dashboard(&f.owner, Some(f.other_owner.user_id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = f.engine.owner_dashboard(&f.driver, None).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = f
        .engine
        .owner_dashboard(&f.admin, Some(f.driver.user_id))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("owner not exists".to_string()));

    let err = f.engine.owner_dashboard(&f.admin, None).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("owner not exists".to_string()));
}

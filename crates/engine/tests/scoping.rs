mod common;

use common::{fleet, order_for, truck_for};
use engine::{
    EngineError, ExpenseCategory, ExpenseListFilter, NewExpense, NewTransfer, OrderListFilter,
    OrderUpdate, Role, TimelineListFilter, TransferKind, TransferListFilter, TruckListFilter,
};

#[tokio::test]
async fn owners_see_only_their_orders() {
    let f = fleet().await;
    let mine = f
        .engine
        .create_order(&f.admin, order_for(&f.owner))
        .await
        .unwrap();
    let theirs = f
        .engine
        .create_order(&f.admin, order_for(&f.other_owner))
        .await
        .unwrap();

    let visible = f
        .engine
        .list_orders(&f.owner, &OrderListFilter::default())
        .await
        .unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, mine.id);

    assert_eq!(
        f.engine.order(&f.owner, theirs.id).await.unwrap_err(),
        EngineError::KeyNotFound("order not exists".to_string())
    );
    let err = f
        .engine
        .update_order(&f.owner, theirs.id, OrderUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("order not exists".to_string()));
}

#[tokio::test]
async fn drivers_see_and_move_only_assigned_orders() {
    let f = fleet().await;
    let assigned = f
        .engine
        .create_order(&f.admin, order_for(&f.owner).driver(f.driver.user_id))
        .await
        .unwrap();
    let elsewhere = f
        .engine
        .create_order(&f.admin, order_for(&f.owner).driver(f.other_driver.user_id))
        .await
        .unwrap();

    let visible = f
        .engine
        .list_orders(&f.driver, &OrderListFilter::default())
        .await
        .unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, assigned.id);

    let err = f
        .engine
        .update_order_status(&f.driver, elsewhere.id, "in_transit")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("order not exists".to_string()));

    let err = f
        .engine
        .update_order(&f.driver, assigned.id, OrderUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn trucks_are_scoped_by_owner_and_driver() {
    let f = fleet().await;
    let driven = f
        .engine
        .create_truck(&f.admin, truck_for("MH12AB1234", &f.owner).driver(f.driver.user_id))
        .await
        .unwrap();
    f.engine
        .create_truck(&f.admin, truck_for("KA01CD5678", &f.other_owner))
        .await
        .unwrap();

    let owner_view = f
        .engine
        .list_trucks(&f.owner, &TruckListFilter::default())
        .await
        .unwrap();
    assert_eq!(owner_view.len(), 1);
    assert_eq!(owner_view[0].id, driven.id);

    let driver_view = f
        .engine
        .list_trucks(&f.driver, &TruckListFilter::default())
        .await
        .unwrap();
    assert_eq!(driver_view.len(), 1);

    let other_driver_view = f
        .engine
        .list_trucks(&f.other_driver, &TruckListFilter::default())
        .await
        .unwrap();
    assert!(other_driver_view.is_empty());

    let all = f
        .engine
        .list_trucks(
            &f.admin,
            &TruckListFilter {
                search: Some("ka01".to_string()),
                ..TruckListFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn drivers_see_only_their_own_expenses() {
    let f = fleet().await;
    let order = f
        .engine
        .create_order(&f.admin, order_for(&f.owner).driver(f.driver.user_id))
        .await
        .unwrap();
    let other = f
        .engine
        .create_order(&f.admin, order_for(&f.owner).driver(f.other_driver.user_id))
        .await
        .unwrap();
    f.engine
        .create_expense(
            &f.driver,
            NewExpense::new(order.id, ExpenseCategory::Toll, 350_00, "Expressway toll"),
        )
        .await
        .unwrap();
    f.engine
        .create_expense(
            &f.other_driver,
            NewExpense::new(other.id, ExpenseCategory::Food, 200_00, "Dhaba lunch"),
        )
        .await
        .unwrap();

    let mine = f
        .engine
        .list_expenses(&f.driver, &ExpenseListFilter::default())
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].category, ExpenseCategory::Toll);

    let owner_view = f
        .engine
        .list_expenses(&f.owner, &ExpenseListFilter::default())
        .await
        .unwrap();
    assert_eq!(owner_view.len(), 2);

    let other_owner_view = f
        .engine
        .list_expenses(&f.other_owner, &ExpenseListFilter::default())
        .await
        .unwrap();
    assert!(other_owner_view.is_empty());
}

#[tokio::test]
async fn drivers_see_every_driver_facing_transfer() {
    let f = fleet().await;
    let mine = f
        .engine
        .create_order(&f.admin, order_for(&f.owner).driver(f.driver.user_id))
        .await
        .unwrap();
    let not_mine = f
        .engine
        .create_order(&f.admin, order_for(&f.other_owner).driver(f.other_driver.user_id))
        .await
        .unwrap();

    f.engine
        .create_transfer(&f.admin, NewTransfer::new(mine.id, TransferKind::ToOwner, 1_00))
        .await
        .unwrap();
    let leaked = f
        .engine
        .create_transfer(
            &f.admin,
            NewTransfer::new(not_mine.id, TransferKind::ToDriver, 2_00),
        )
        .await
        .unwrap();
    let hidden = f
        .engine
        .create_transfer(
            &f.admin,
            NewTransfer::new(not_mine.id, TransferKind::FromOwner, 3_00),
        )
        .await
        .unwrap();

    let visible = f
        .engine
        .list_transfers(&f.driver, &TransferListFilter::default())
        .await
        .unwrap();
    let ids: Vec<_> = visible.iter().map(|t| t.id).collect();
    assert_eq!(visible.len(), 2);
    assert!(ids.contains(&leaked.id));
    assert!(!ids.contains(&hidden.id));

    let owner_view = f
        .engine
        .list_transfers(&f.owner, &TransferListFilter::default())
        .await
        .unwrap();
    assert_eq!(owner_view.len(), 1);
    assert_eq!(owner_view[0].kind, TransferKind::ToOwner);
}

#[tokio::test]
async fn timeline_follows_order_visibility() {
    let f = fleet().await;
    f.engine
        .create_truck(&f.admin, truck_for("MH12AB1234", &f.owner))
        .await
        .unwrap();
    let mine = f
        .engine
        .create_order(&f.admin, order_for(&f.owner).driver(f.driver.user_id))
        .await
        .unwrap();
    f.engine
        .create_order(&f.admin, order_for(&f.other_owner))
        .await
        .unwrap();

    let admin_view = f
        .engine
        .list_timeline(&f.admin, &TimelineListFilter::default())
        .await
        .unwrap();
    assert_eq!(admin_view.len(), 3);
    assert!(admin_view.iter().any(|e| e.order_id.is_none()));

    for principal in [&f.owner, &f.driver] {
        let events = f
            .engine
            .list_timeline(principal, &TimelineListFilter::default())
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].order_id, Some(mine.id));
    }

    let err = f
        .engine
        .order_timeline(&f.other_driver, mine.id)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("order not exists".to_string()));
}

#[tokio::test]
async fn user_directory_depends_on_role() {
    let f = fleet().await;

    let everyone = f.engine.list_users(&f.admin, None).await.unwrap();
    assert_eq!(everyone.len(), 5);

    let directory = f.engine.list_users(&f.owner, None).await.unwrap();
    assert_eq!(directory.len(), 4);
    assert!(directory.iter().all(|u| u.role != Role::Admin));

    let drivers = f.engine.drivers(&f.owner).await.unwrap();
    assert_eq!(drivers.len(), 2);
    let owners = f.engine.owners(&f.admin).await.unwrap();
    assert_eq!(owners.len(), 2);

    let myself = f.engine.list_users(&f.driver, None).await.unwrap();
    assert_eq!(myself.len(), 1);
    assert_eq!(myself[0].id, f.driver.user_id);

    assert!(matches!(
        f.engine.drivers(&f.driver).await,
        Err(EngineError::Forbidden(_))
    ));
    let profile = f.engine.profile(&f.driver).await.unwrap();
    assert_eq!(profile.email, "driver@haulage.test");
}

mod common;

use chrono::{Duration, Utc};

use common::{fleet, order_for, truck_for};
use engine::{
    BankDetails, EngineError, EventKind, ExpenseCategory, ExpenseListFilter, NewExpense,
    NewTransfer, NewUser, OrderListFilter, Role, TimelineListFilter, TransferKind,
    TransferStatus, TruckStatus, TruckUpdate,
};

#[tokio::test]
async fn driver_expense_records_timeline_event() {
    let f = fleet().await;
    let order = f
        .engine
        .create_order(&f.admin, order_for(&f.owner).driver(f.driver.user_id))
        .await
        .unwrap();

    let expense = f
        .engine
        .create_expense(
            &f.driver,
            NewExpense::new(order.id, ExpenseCategory::Fuel, 4_500_50, "  Diesel refill ")
                .bill_photo("bills/fuel-1.jpg"),
        )
        .await
        .unwrap();

    assert_eq!(expense.description, "Diesel refill");
    assert_eq!(expense.added_by, f.driver.user_id);
    let events = f
        .engine
        .list_timeline(
            &f.admin,
            &TimelineListFilter {
                kind: Some(EventKind::ExpenseAdded),
                ..TimelineListFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Expense Added: Fuel");
    assert_eq!(events[0].description, "₹4500.50 - Diesel refill");
    assert_eq!(events[0].related_expense_id, Some(expense.id));
    assert_eq!(events[0].created_by, f.driver.user_id);

    let on_order = f.engine.order_expenses(&f.owner, order.id).await.unwrap();
    assert_eq!(on_order.len(), 1);
}

#[tokio::test]
async fn expense_rules() {
    let f = fleet().await;
    let order = f
        .engine
        .create_order(&f.admin, order_for(&f.owner).driver(f.driver.user_id))
        .await
        .unwrap();

    let err = f
        .engine
        .create_expense(
            &f.admin,
            NewExpense::new(order.id, ExpenseCategory::Toll, 100, "toll"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = f
        .engine
        .create_expense(
            &f.driver,
            NewExpense::new(order.id, ExpenseCategory::Toll, 0, "toll"),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Validation("amount must be > 0".to_string()));

    let err = f
        .engine
        .create_expense(
            &f.other_driver,
            NewExpense::new(order.id, ExpenseCategory::Toll, 100, "toll"),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("order not exists".to_string()));
}

#[tokio::test]
async fn deleting_an_expense_keeps_its_event() {
    let f = fleet().await;
    let order = f
        .engine
        .create_order(&f.admin, order_for(&f.owner).driver(f.driver.user_id))
        .await
        .unwrap();
    let expense = f
        .engine
        .create_expense(
            &f.driver,
            NewExpense::new(order.id, ExpenseCategory::Maintenance, 1_200_00, "Tyre"),
        )
        .await
        .unwrap();

    f.engine.delete_expense(&f.admin, expense.id).await.unwrap();

    let remaining = f
        .engine
        .list_expenses(&f.admin, &ExpenseListFilter::default())
        .await
        .unwrap();
    assert!(remaining.is_empty());
    let events = f
        .engine
        .list_timeline(
            &f.admin,
            &TimelineListFilter {
                kind: Some(EventKind::ExpenseAdded),
                ..TimelineListFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].related_expense_id, None);
}

#[tokio::test]
async fn transfers_complete_and_reference_their_event() {
    let f = fleet().await;
    let order = f
        .engine
        .create_order(&f.admin, order_for(&f.owner).driver(f.driver.user_id))
        .await
        .unwrap();

    let transfer = f
        .engine
        .create_transfer(
            &f.admin,
            NewTransfer::new(order.id, TransferKind::ToDriver, 2_500_00)
                .description("Trip advance")
                .bank(BankDetails {
                    transaction_ref: Some("UTR123".to_string()),
                    bank_name: Some("  SBI ".to_string()),
                    ..BankDetails::default()
                }),
        )
        .await
        .unwrap();

    assert_eq!(transfer.status, TransferStatus::Completed);
    assert_eq!(transfer.bank.bank_name.as_deref(), Some("SBI"));
    let stored = f.engine.transfer(&f.admin, transfer.id).await.unwrap();
    assert_eq!(stored.status, TransferStatus::Completed);

    let events = f
        .engine
        .list_timeline(
            &f.admin,
            &TimelineListFilter {
                kind: Some(EventKind::MoneyTransferred),
                ..TimelineListFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Money Transfer: To Driver");
    assert_eq!(
        events[0].description,
        format!("₹2500.00 - {} (Trip advance)", order.code)
    );
    assert_eq!(events[0].related_transfer_id, Some(transfer.id));

    f.engine.delete_transfer(&f.admin, transfer.id).await.unwrap();
    let events = f.engine.order_timeline(&f.admin, order.id).await.unwrap();
    assert!(
        events
            .iter()
            .all(|e| e.related_transfer_id.is_none())
    );
}

#[tokio::test]
async fn transfer_to_driver_needs_a_driver() {
    let f = fleet().await;
    let order = f
        .engine
        .create_order(&f.admin, order_for(&f.owner))
        .await
        .unwrap();

    let err = f
        .engine
        .create_transfer(
            &f.admin,
            NewTransfer::new(order.id, TransferKind::ToDriver, 1_00),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("No driver assigned to this order.".to_string())
    );

    let err = f
        .engine
        .create_transfer(
            &f.owner,
            NewTransfer::new(order.id, TransferKind::ToOwner, 1_00),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = f
        .engine
        .create_transfer(
            &f.admin,
            NewTransfer::new(order.id, TransferKind::ToOwner, -5),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Validation("amount must be > 0".to_string()));
}

#[tokio::test]
async fn truck_registration_rules() {
    let f = fleet().await;

    let mut expired = truck_for("MH12AB1234", &f.owner);
    expired.insurance_expiry = Utc::now().date_naive() - Duration::days(1);
    let err = f.engine.create_truck(&f.admin, expired).await.unwrap_err();
    assert_eq!(err, EngineError::Validation("Insurance has expired.".to_string()));

    let err = f
        .engine
        .create_truck(&f.admin, truck_for("MH12AB1234", &f.owner).axle_count(1))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("axle count must be at least 2".to_string())
    );

    let err = f
        .engine
        .create_truck(&f.owner, truck_for("MH12AB1234", &f.owner))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let truck = f
        .engine
        .create_truck(&f.admin, truck_for("MH12AB1234", &f.owner))
        .await
        .unwrap();
    assert_eq!(truck.status, TruckStatus::Available);
    assert_eq!(truck.fuel_type, "diesel");

    let err = f
        .engine
        .create_truck(&f.admin, truck_for("MH12AB1234", &f.other_owner))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("MH12AB1234".to_string()));

    let err = f
        .engine
        .create_truck(&f.admin, truck_for("GJ05XY0001", &f.driver))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("owner not exists".to_string()));
}

#[tokio::test]
async fn truck_updates_and_driver_assignment() {
    let f = fleet().await;
    let truck = f
        .engine
        .create_truck(&f.admin, truck_for("MH12AB1234", &f.owner))
        .await
        .unwrap();

    let err = f
        .engine
        .update_truck(
            &f.admin,
            truck.id,
            TruckUpdate {
                rc_expiry: Some(Utc::now().date_naive() - Duration::days(3)),
                ..TruckUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Validation("RC has expired.".to_string()));

    let updated = f
        .engine
        .update_truck(
            &f.admin,
            truck.id,
            TruckUpdate {
                status: Some(TruckStatus::Maintenance),
                current_mileage_km: Some(120_500),
                ..TruckUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TruckStatus::Maintenance);
    assert_eq!(updated.current_mileage_km, 120_500);

    let err = f
        .engine
        .assign_driver(&f.admin, truck.id, f.owner.user_id)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("driver not exists".to_string()));

    let assigned = f
        .engine
        .assign_driver(&f.admin, truck.id, f.driver.user_id)
        .await
        .unwrap();
    assert_eq!(assigned.assigned_driver_id, Some(f.driver.user_id));

    let events = f
        .engine
        .list_timeline(
            &f.admin,
            &TimelineListFilter {
                kind: Some(EventKind::OrderAssigned),
                ..TimelineListFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Driver Assigned to Truck MH12AB1234");
    assert_eq!(events[0].order_id, None);
}

#[tokio::test]
async fn deleting_a_truck_detaches_its_orders() {
    let f = fleet().await;
    let truck = f
        .engine
        .create_truck(&f.admin, truck_for("MH12AB1234", &f.owner))
        .await
        .unwrap();
    let order = f
        .engine
        .create_order(&f.admin, order_for(&f.owner).truck(truck.id))
        .await
        .unwrap();
    assert_eq!(order.truck_id, Some(truck.id));

    f.engine.delete_truck(&f.admin, truck.id).await.unwrap();

    let order = f.engine.order(&f.admin, order.id).await.unwrap();
    assert_eq!(order.truck_id, None);
    assert!(matches!(
        f.engine.truck(&f.admin, truck.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn users_referenced_by_orders_cannot_be_deleted() {
    let f = fleet().await;
    f.engine
        .create_order(&f.admin, order_for(&f.owner).driver(f.driver.user_id))
        .await
        .unwrap();

    let err = f
        .engine
        .delete_user(&f.admin, f.owner.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)));

    // Driving an order is not authorship: the driver goes, the order stays.
    f.engine.delete_user(&f.admin, f.driver.user_id).await.unwrap();
    let orders = f
        .engine
        .list_orders(&f.admin, &OrderListFilter::default())
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].driver_id, None);
}

#[tokio::test]
async fn deleting_an_owner_removes_their_trucks() {
    let f = fleet().await;
    let truck = f
        .engine
        .create_truck(
            &f.admin,
            truck_for("MH12AB1234", &f.other_owner).driver(f.other_driver.user_id),
        )
        .await
        .unwrap();

    f.engine
        .delete_user(&f.admin, f.other_owner.user_id)
        .await
        .unwrap();

    assert!(matches!(
        f.engine.truck(&f.admin, truck.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    let err = f
        .engine
        .delete_user(&f.owner, f.driver.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn user_creation_is_admin_only_and_unique() {
    let f = fleet().await;

    let user = f
        .engine
        .create_user(
            &f.admin,
            NewUser::new(" New.Driver@Haulage.TEST ", Role::Driver, "$2b$04$x").phone("+91 1"),
        )
        .await
        .unwrap();
    assert_eq!(user.email, "new.driver@haulage.test");
    assert!(user.is_active);

    let err = f
        .engine
        .create_user(
            &f.admin,
            NewUser::new("new.driver@haulage.test", Role::Owner, "$2b$04$x"),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ExistingKey("new.driver@haulage.test".to_string())
    );

    let err = f
        .engine
        .create_user(&f.owner, NewUser::new("x@haulage.test", Role::Owner, "h"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let creds = f
        .engine
        .user_credentials("NEW.DRIVER@haulage.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(creds.user.id, user.id);
    assert_eq!(creds.password_hash, "$2b$04$x");
    assert!(
        f.engine
            .user_credentials("nobody@haulage.test")
            .await
            .unwrap()
            .is_none()
    );
}

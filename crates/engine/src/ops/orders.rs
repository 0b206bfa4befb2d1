use chrono::Utc;
use rand::Rng;
use sea_orm::{
    DatabaseTransaction, Order as SortOrder, QueryFilter, QueryOrder, SqlErr,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, EventKind, Expense, MoneyTransfer, NewOrder, Order, OrderDocument, OrderStatus,
    OrderUpdate, Principal, ResultEngine, Role, Stop, expenses,
    orders::{self, ORDER_CODE_PREFIX, OrderDocuments},
    policy::{Action, EntityKind},
    timeline::{self, NewEvent},
    transfers,
    util::{
        normalize_optional_text, normalize_required_text, require_non_negative, require_positive,
    },
};

use super::{
    Engine,
    access::{ensure_can, order_scope},
    listing, with_tx,
};

/// Source of candidate order codes.
///
/// Candidates may collide; the engine checks them against the unique index
/// and draws again.
pub trait OrderCodeSource: std::fmt::Debug + Send + Sync {
    fn next_code(&self) -> String;
}

/// `TRANS` followed by a random number in `100000..=999999`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomOrderCodes;

impl OrderCodeSource for RandomOrderCodes {
    fn next_code(&self) -> String {
        let n: u32 = rand::thread_rng().gen_range(100_000..=999_999);
        format!("{ORDER_CODE_PREFIX}{n}")
    }
}

/// Filters for listing orders.
#[derive(Clone, Debug, Default)]
pub struct OrderListFilter {
    pub status: Option<OrderStatus>,
    pub owner_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub truck_id: Option<Uuid>,
    /// Matches order code, load type, pickup and delivery location.
    pub search: Option<String>,
    /// One of `created_at`, `pickup_date`, `estimated_delivery_date`,
    /// `total_amount`, optionally prefixed by `-`.
    pub ordering: Option<String>,
    pub limit: Option<u64>,
}

fn normalize_stop(stop: &Stop, which: &str) -> ResultEngine<Stop> {
    Ok(Stop {
        location: normalize_required_text(&stop.location, &format!("{which} location"))?,
        contact: normalize_required_text(&stop.contact, &format!("{which} contact"))?,
        phone: normalize_required_text(&stop.phone, &format!("{which} phone"))?,
    })
}

fn validate_amounts(total_minor: i64, advance_minor: i64) -> ResultEngine<()> {
    require_non_negative(total_minor, "total amount")?;
    require_non_negative(advance_minor, "advance amount")?;
    Ok(())
}

impl Engine {
    /// Insert `order` under a fresh code.
    ///
    /// Each candidate is inserted under a savepoint. The unique index on
    /// `code` decides: a violation rolls the savepoint back and draws again.
    async fn insert_with_code(
        &self,
        db_tx: &DatabaseTransaction,
        order: &mut Order,
    ) -> ResultEngine<()> {
        for attempt in 1..=self.max_code_attempts {
            order.code = self.order_codes.next_code();
            let model: orders::ActiveModel = (&*order).into();
            let savepoint = db_tx.begin().await?;
            match model.insert(&savepoint).await {
                Ok(_) => {
                    savepoint.commit().await?;
                    return Ok(());
                }
                Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    savepoint.rollback().await?;
                    tracing::debug!(attempt, code = %order.code, "order code already taken");
                }
                Err(err) => return Err(err.into()),
            }
        }
        tracing::warn!(attempts = self.max_code_attempts, "order codes exhausted");
        Err(EngineError::OrderCodeExhausted(self.max_code_attempts))
    }

    /// Create an order (admin or owner).
    ///
    /// Fails when the advance exceeds the total or the estimated delivery is
    /// not after pickup. An owner can only create orders for themselves.
    /// Records exactly one `order_created` event.
    pub async fn create_order(&self, principal: &Principal, cmd: NewOrder) -> ResultEngine<Order> {
        ensure_can(principal, EntityKind::Order, Action::Create)?;
        if principal.role == Role::Owner && cmd.owner_id != principal.user_id {
            return Err(EngineError::Forbidden(
                "owners can only create their own orders".to_string(),
            ));
        }

        validate_amounts(cmd.total_amount_minor, cmd.advance_amount_minor)?;
        if cmd.advance_amount_minor > cmd.total_amount_minor {
            return Err(EngineError::Validation(
                "Advance amount cannot be greater than total amount.".to_string(),
            ));
        }
        if cmd.estimated_delivery_date <= cmd.pickup_date {
            return Err(EngineError::Validation(
                "Estimated delivery date must be after pickup date.".to_string(),
            ));
        }
        require_positive(cmd.weight_kg, "weight")?;
        if let Some(volume) = cmd.volume_litres {
            require_non_negative(volume, "volume")?;
        }

        let now = Utc::now();
        let mut order = Order {
            id: Uuid::new_v4(),
            code: String::new(),
            description: normalize_optional_text(cmd.description.as_deref()).unwrap_or_default(),
            pickup: normalize_stop(&cmd.pickup, "pickup")?,
            delivery: normalize_stop(&cmd.delivery, "delivery")?,
            pickup_date: cmd.pickup_date,
            estimated_delivery_date: cmd.estimated_delivery_date,
            actual_delivery_date: None,
            load_type: normalize_required_text(&cmd.load_type, "load type")?,
            weight_kg: cmd.weight_kg,
            volume_litres: cmd.volume_litres,
            total_amount_minor: cmd.total_amount_minor,
            advance_amount_minor: cmd.advance_amount_minor,
            balance_amount_minor: 0,
            status: OrderStatus::Pending,
            truck_id: cmd.truck_id,
            driver_id: cmd.driver_id,
            owner_id: cmd.owner_id,
            created_by: principal.user_id,
            documents: OrderDocuments::default(),
            created_at: now,
            updated_at: now,
        };
        order.recompute_balance();

        with_tx!(self, |db_tx| {
            self.require_user_with_role(&db_tx, order.owner_id, Role::Owner)
                .await?;
            if let Some(driver_id) = order.driver_id {
                self.require_user_with_role(&db_tx, driver_id, Role::Driver)
                    .await?;
            }
            if let Some(truck_id) = order.truck_id {
                self.require_truck_ref(&db_tx, truck_id).await?;
            }

            self.insert_with_code(&db_tx, &mut order).await?;

            let creator = self.display_name(&db_tx, Some(principal.user_id)).await?;
            self.record(
                &db_tx,
                principal,
                NewEvent::new(
                    Some(order.id),
                    EventKind::OrderCreated,
                    format!("New Order Created: {}", order.code),
                    format!("Order {} created by {creator}", order.code),
                ),
            )
            .await?;

            tracing::info!(order = %order.id, code = %order.code, "order created");
            Ok(order)
        })
    }

    pub async fn list_orders(
        &self,
        principal: &Principal,
        filter: &OrderListFilter,
    ) -> ResultEngine<Vec<Order>> {
        let mut select = orders::Entity::find().filter(order_scope(principal));
        if let Some(status) = filter.status {
            select = select.filter(orders::Column::Status.eq(status.as_str()));
        }
        if let Some(owner_id) = filter.owner_id {
            select = select.filter(orders::Column::OwnerId.eq(owner_id.to_string()));
        }
        if let Some(driver_id) = filter.driver_id {
            select = select.filter(orders::Column::DriverId.eq(driver_id.to_string()));
        }
        if let Some(truck_id) = filter.truck_id {
            select = select.filter(orders::Column::TruckId.eq(truck_id.to_string()));
        }
        if let Some(cond) = listing::search(
            filter.search.as_deref(),
            &[
                orders::Column::Code,
                orders::Column::LoadType,
                orders::Column::PickupLocation,
                orders::Column::DeliveryLocation,
            ],
        ) {
            select = select.filter(cond);
        }
        let select = listing::apply_ordering(
            select,
            filter.ordering.as_deref(),
            &[
                ("created_at", orders::Column::CreatedAt),
                ("pickup_date", orders::Column::PickupDate),
                ("estimated_delivery_date", orders::Column::EstimatedDeliveryDate),
                ("total_amount", orders::Column::TotalAmountMinor),
            ],
            (orders::Column::CreatedAt, SortOrder::Desc),
        )?;
        listing::limit(select, filter.limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Order::try_from)
            .collect()
    }

    pub async fn order(&self, principal: &Principal, order_id: Uuid) -> ResultEngine<Order> {
        let model = self
            .require_order(&self.database, principal, order_id)
            .await?;
        Order::try_from(model)
    }

    /// Update an order (admin, or the owning owner).
    ///
    /// The balance is recomputed on every write. Advance and date ordering
    /// are not re-validated here; a resulting advance above the total is only
    /// logged. A changed driver records `order_assigned`.
    pub async fn update_order(
        &self,
        principal: &Principal,
        order_id: Uuid,
        update: OrderUpdate,
    ) -> ResultEngine<Order> {
        ensure_can(principal, EntityKind::Order, Action::Update)?;
        with_tx!(self, |db_tx| {
            let model = self.require_order(&db_tx, principal, order_id).await?;
            let mut order = Order::try_from(model)?;
            let previous_driver = order.driver_id;

            if let Some(owner_id) = update.owner_id
                && owner_id != order.owner_id
            {
                if !principal.is_admin() {
                    return Err(EngineError::Forbidden(
                        "owners cannot hand orders to another owner".to_string(),
                    ));
                }
                self.require_user_with_role(&db_tx, owner_id, Role::Owner)
                    .await?;
                order.owner_id = owner_id;
            }
            if let Some(description) = update.description.as_deref() {
                order.description = description.trim().to_string();
            }
            if let Some(pickup) = &update.pickup {
                order.pickup = normalize_stop(pickup, "pickup")?;
            }
            if let Some(delivery) = &update.delivery {
                order.delivery = normalize_stop(delivery, "delivery")?;
            }
            if let Some(date) = update.pickup_date {
                order.pickup_date = date;
            }
            if let Some(date) = update.estimated_delivery_date {
                order.estimated_delivery_date = date;
            }
            if let Some(load_type) = update.load_type.as_deref() {
                order.load_type = normalize_required_text(load_type, "load type")?;
            }
            if let Some(weight) = update.weight_kg {
                require_positive(weight, "weight")?;
                order.weight_kg = weight;
            }
            if let Some(volume) = update.volume_litres {
                if let Some(volume) = volume {
                    require_non_negative(volume, "volume")?;
                }
                order.volume_litres = volume;
            }
            if let Some(total) = update.total_amount_minor {
                order.total_amount_minor = total;
            }
            if let Some(advance) = update.advance_amount_minor {
                order.advance_amount_minor = advance;
            }
            validate_amounts(order.total_amount_minor, order.advance_amount_minor)?;
            if let Some(truck_id) = update.truck_id {
                if let Some(truck_id) = truck_id {
                    self.require_truck_ref(&db_tx, truck_id).await?;
                }
                order.truck_id = truck_id;
            }
            if let Some(driver_id) = update.driver_id {
                if let Some(driver_id) = driver_id {
                    self.require_user_with_role(&db_tx, driver_id, Role::Driver)
                        .await?;
                }
                order.driver_id = driver_id;
            }

            order.recompute_balance();
            if order.advance_amount_minor > order.total_amount_minor {
                tracing::warn!(
                    order = %order.id,
                    balance = order.balance_amount_minor,
                    "order update leaves advance above total"
                );
            }
            if order.estimated_delivery_date <= order.pickup_date {
                tracing::warn!(order = %order.id, "order update leaves delivery before pickup");
            }
            order.updated_at = Utc::now();

            let model: orders::ActiveModel = (&order).into();
            model.update(&db_tx).await?;

            if order.driver_id != previous_driver {
                let from = self.display_name(&db_tx, previous_driver).await?;
                let to = self.display_name(&db_tx, order.driver_id).await?;
                self.record(
                    &db_tx,
                    principal,
                    NewEvent::new(
                        Some(order.id),
                        EventKind::OrderAssigned,
                        format!("Driver Changed for Order: {}", order.code),
                        format!("Driver changed from {from} to {to}"),
                    ),
                )
                .await?;
            }

            tracing::info!(order = %order.id, "order updated");
            Ok(order)
        })
    }

    /// Move an order to `status` (any role, within scope).
    ///
    /// Any transition between the five states is accepted, including out of
    /// delivered or cancelled. A real change records `order_status_changed`,
    /// plus `trip_started` when entering in_transit and `trip_completed` when
    /// entering delivered.
    pub async fn update_order_status(
        &self,
        principal: &Principal,
        order_id: Uuid,
        status: &str,
    ) -> ResultEngine<Order> {
        ensure_can(principal, EntityKind::Order, Action::UpdateStatus)?;
        let status = OrderStatus::try_from(status.trim())?;
        with_tx!(self, |db_tx| {
            let model = self.require_order(&db_tx, principal, order_id).await?;
            let mut order = Order::try_from(model)?;
            let previous = order.transition(status, Utc::now());
            if previous.is_terminal() && previous != status {
                tracing::warn!(
                    order = %order.id,
                    from = previous.as_str(),
                    to = status.as_str(),
                    "order left a terminal status"
                );
            }

            let model: orders::ActiveModel = (&order).into();
            model.update(&db_tx).await?;

            if previous != status {
                self.record(
                    &db_tx,
                    principal,
                    NewEvent::new(
                        Some(order.id),
                        EventKind::OrderStatusChanged,
                        format!("Order Status Changed: {}", order.code),
                        format!("Status changed from {previous} to {status}"),
                    ),
                )
                .await?;

                let trip_event = match status {
                    OrderStatus::InTransit => Some((
                        EventKind::TripStarted,
                        format!("Trip Started: {}", order.code),
                        format!("Order {} is now in transit", order.code),
                    )),
                    OrderStatus::Delivered => Some((
                        EventKind::TripCompleted,
                        format!("Trip Completed: {}", order.code),
                        format!("Order {} has been delivered", order.code),
                    )),
                    _ => None,
                };
                if let Some((kind, title, description)) = trip_event {
                    self.record(
                        &db_tx,
                        principal,
                        NewEvent::new(Some(order.id), kind, title, description),
                    )
                    .await?;
                }
            }

            tracing::info!(order = %order.id, from = previous.as_str(), to = status.as_str(), "order status updated");
            Ok(order)
        })
    }

    /// Attach a stored document key to one of the order's document slots.
    pub async fn attach_order_document(
        &self,
        principal: &Principal,
        order_id: Uuid,
        kind: OrderDocument,
        key: &str,
    ) -> ResultEngine<Order> {
        ensure_can(principal, EntityKind::Order, Action::AttachDocument)?;
        let key = normalize_required_text(key, "document")?;
        with_tx!(self, |db_tx| {
            let model = self.require_order(&db_tx, principal, order_id).await?;
            let mut order = Order::try_from(model)?;
            order.documents.set(kind, key);
            order.updated_at = Utc::now();

            let model: orders::ActiveModel = (&order).into();
            model.update(&db_tx).await?;

            self.record(
                &db_tx,
                principal,
                NewEvent::new(
                    Some(order.id),
                    EventKind::DocumentUploaded,
                    format!("Document Uploaded: {}", kind.label()),
                    format!("{} attached to order {}", kind.label(), order.code),
                ),
            )
            .await?;
            Ok(order)
        })
    }

    /// Delete an order (admin) together with its expenses, transfers and
    /// timeline events. Its truck is left alone.
    pub async fn delete_order(&self, principal: &Principal, order_id: Uuid) -> ResultEngine<()> {
        ensure_can(principal, EntityKind::Order, Action::Delete)?;
        with_tx!(self, |db_tx| {
            self.require_order(&db_tx, principal, order_id).await?;
            let id = order_id.to_string();

            timeline::Entity::delete_many()
                .filter(timeline::Column::OrderId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_many()
                .filter(expenses::Column::OrderId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            transfers::Entity::delete_many()
                .filter(transfers::Column::OrderId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            orders::Entity::delete_by_id(id).exec(&db_tx).await?;

            tracing::info!(order = %order_id, "order deleted");
            Ok(())
        })
    }

    /// Expenses recorded on a visible order, newest first.
    pub async fn order_expenses(
        &self,
        principal: &Principal,
        order_id: Uuid,
    ) -> ResultEngine<Vec<Expense>> {
        self.require_order(&self.database, principal, order_id)
            .await?;
        expenses::Entity::find()
            .filter(expenses::Column::OrderId.eq(order_id.to_string()))
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    /// Transfers recorded on a visible order, newest first.
    pub async fn order_transfers(
        &self,
        principal: &Principal,
        order_id: Uuid,
    ) -> ResultEngine<Vec<MoneyTransfer>> {
        self.require_order(&self.database, principal, order_id)
            .await?;
        transfers::Entity::find()
            .filter(transfers::Column::OrderId.eq(order_id.to_string()))
            .order_by_desc(transfers::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(MoneyTransfer::try_from)
            .collect()
    }
}

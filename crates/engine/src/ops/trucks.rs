use chrono::Utc;
use sea_orm::{ActiveValue, Order, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    EngineError, EventKind, NewTruck, Principal, ResultEngine, Role, Truck, TruckStatus,
    TruckUpdate, orders,
    policy::{Action, EntityKind},
    timeline::NewEvent,
    trucks::{self, Certificate},
    util::{normalize_optional_text, normalize_required_text, require_non_negative},
};

use super::{
    Engine,
    access::{display_name_of, ensure_can, truck_scope},
    listing, with_tx,
};

const MIN_AXLES: i32 = 2;

/// Filters for listing trucks.
#[derive(Clone, Debug, Default)]
pub struct TruckListFilter {
    pub status: Option<TruckStatus>,
    pub owner_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    /// Matches number, model and make.
    pub search: Option<String>,
    /// One of `number`, `created_at`, `status`, optionally prefixed by `-`.
    pub ordering: Option<String>,
    pub limit: Option<u64>,
}

fn validate_axles(axle_count: i32) -> ResultEngine<()> {
    if axle_count < MIN_AXLES {
        return Err(EngineError::Validation(format!(
            "axle count must be at least {MIN_AXLES}"
        )));
    }
    Ok(())
}

fn validate_certificates(truck: &Truck) -> ResultEngine<()> {
    match truck.expired_certificate(Utc::now().date_naive()) {
        Some(label) => Err(EngineError::Validation(format!("{label} has expired."))),
        None => Ok(()),
    }
}

impl Engine {
    /// Register a truck (admin).
    ///
    /// Rejects expired documents, fewer than two axles and a taken
    /// registration number. Records a truck-level timeline event.
    pub async fn create_truck(&self, principal: &Principal, cmd: NewTruck) -> ResultEngine<Truck> {
        ensure_can(principal, EntityKind::Truck, Action::Create)?;

        let now = Utc::now();
        let truck = Truck {
            id: Uuid::new_v4(),
            number: normalize_required_text(&cmd.number, "truck number")?,
            make: normalize_required_text(&cmd.make, "make")?,
            model: normalize_required_text(&cmd.model, "model")?,
            year: cmd.year,
            axle_count: cmd.axle_count,
            capacity_kg: cmd.capacity_kg,
            fuel_type: normalize_optional_text(cmd.fuel_type.as_deref())
                .unwrap_or_else(|| "diesel".to_string()),
            current_mileage_km: cmd.current_mileage_km,
            registration: Certificate {
                expires_on: cmd.rc_expiry,
                document: normalize_optional_text(cmd.rc_document.as_deref()),
            },
            insurance: Certificate {
                expires_on: cmd.insurance_expiry,
                document: normalize_optional_text(cmd.insurance_document.as_deref()),
            },
            pollution: Certificate {
                expires_on: cmd.pollution_expiry,
                document: normalize_optional_text(cmd.pollution_document.as_deref()),
            },
            status: cmd.status.unwrap_or(TruckStatus::Available),
            owner_id: cmd.owner_id,
            assigned_driver_id: cmd.assigned_driver_id,
            created_at: now,
            updated_at: now,
        };
        validate_axles(truck.axle_count)?;
        require_non_negative(truck.capacity_kg, "capacity")?;
        require_non_negative(truck.current_mileage_km, "mileage")?;
        validate_certificates(&truck)?;

        with_tx!(self, |db_tx| {
            let taken = trucks::Entity::find()
                .filter(trucks::Column::Number.eq(truck.number.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(truck.number.clone()));
            }
            self.require_user_with_role(&db_tx, truck.owner_id, Role::Owner)
                .await?;
            if let Some(driver_id) = truck.assigned_driver_id {
                self.require_user_with_role(&db_tx, driver_id, Role::Driver)
                    .await?;
            }

            let model: trucks::ActiveModel = (&truck).into();
            model.insert(&db_tx).await?;

            self.record(
                &db_tx,
                principal,
                NewEvent::new(
                    None,
                    EventKind::OrderCreated,
                    "New Truck Added",
                    format!(
                        "Truck {} ({} {}) added to the fleet",
                        truck.number, truck.make, truck.model
                    ),
                ),
            )
            .await?;

            tracing::info!(truck = %truck.id, number = %truck.number, "truck created");
            Ok(truck)
        })
    }

    pub async fn list_trucks(
        &self,
        principal: &Principal,
        filter: &TruckListFilter,
    ) -> ResultEngine<Vec<Truck>> {
        let mut select = trucks::Entity::find().filter(truck_scope(principal));
        if let Some(status) = filter.status {
            select = select.filter(trucks::Column::Status.eq(status.as_str()));
        }
        if let Some(owner_id) = filter.owner_id {
            select = select.filter(trucks::Column::OwnerId.eq(owner_id.to_string()));
        }
        if let Some(driver_id) = filter.driver_id {
            select = select.filter(trucks::Column::AssignedDriverId.eq(driver_id.to_string()));
        }
        if let Some(cond) = listing::search(
            filter.search.as_deref(),
            &[
                trucks::Column::Number,
                trucks::Column::Model,
                trucks::Column::Make,
            ],
        ) {
            select = select.filter(cond);
        }
        let select = listing::apply_ordering(
            select,
            filter.ordering.as_deref(),
            &[
                ("number", trucks::Column::Number),
                ("created_at", trucks::Column::CreatedAt),
                ("status", trucks::Column::Status),
            ],
            (trucks::Column::CreatedAt, Order::Desc),
        )?;
        listing::limit(select, filter.limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Truck::try_from)
            .collect()
    }

    pub async fn truck(&self, principal: &Principal, truck_id: Uuid) -> ResultEngine<Truck> {
        let model = self
            .require_truck(&self.database, principal, truck_id)
            .await?;
        Truck::try_from(model)
    }

    /// Update a truck (admin). Expiry dates and axle count are re-checked
    /// when they are part of the update.
    pub async fn update_truck(
        &self,
        principal: &Principal,
        truck_id: Uuid,
        update: TruckUpdate,
    ) -> ResultEngine<Truck> {
        ensure_can(principal, EntityKind::Truck, Action::Update)?;
        with_tx!(self, |db_tx| {
            let model = self.require_truck(&db_tx, principal, truck_id).await?;
            let mut truck = Truck::try_from(model)?;

            if let Some(make) = update.make.as_deref() {
                truck.make = normalize_required_text(make, "make")?;
            }
            if let Some(model) = update.model.as_deref() {
                truck.model = normalize_required_text(model, "model")?;
            }
            if let Some(year) = update.year {
                truck.year = year;
            }
            if let Some(axle_count) = update.axle_count {
                validate_axles(axle_count)?;
                truck.axle_count = axle_count;
            }
            if let Some(capacity) = update.capacity_kg {
                require_non_negative(capacity, "capacity")?;
                truck.capacity_kg = capacity;
            }
            if let Some(fuel_type) = normalize_optional_text(update.fuel_type.as_deref()) {
                truck.fuel_type = fuel_type;
            }
            if let Some(km) = update.current_mileage_km {
                require_non_negative(km, "mileage")?;
                truck.current_mileage_km = km;
            }
            let dates_changed = update.rc_expiry.is_some()
                || update.insurance_expiry.is_some()
                || update.pollution_expiry.is_some();
            if let Some(date) = update.rc_expiry {
                truck.registration.expires_on = date;
            }
            if let Some(date) = update.insurance_expiry {
                truck.insurance.expires_on = date;
            }
            if let Some(date) = update.pollution_expiry {
                truck.pollution.expires_on = date;
            }
            if dates_changed {
                validate_certificates(&truck)?;
            }
            if let Some(key) = normalize_optional_text(update.rc_document.as_deref()) {
                truck.registration.document = Some(key);
            }
            if let Some(key) = normalize_optional_text(update.insurance_document.as_deref()) {
                truck.insurance.document = Some(key);
            }
            if let Some(key) = normalize_optional_text(update.pollution_document.as_deref()) {
                truck.pollution.document = Some(key);
            }
            if let Some(status) = update.status {
                truck.status = status;
            }
            truck.updated_at = Utc::now();

            let model: trucks::ActiveModel = (&truck).into();
            model.update(&db_tx).await?;
            Ok(truck)
        })
    }

    /// Attach a driver to a truck (admin). The driver must be a role=driver
    /// user.
    pub async fn assign_driver(
        &self,
        principal: &Principal,
        truck_id: Uuid,
        driver_id: Uuid,
    ) -> ResultEngine<Truck> {
        ensure_can(principal, EntityKind::Truck, Action::AssignDriver)?;
        with_tx!(self, |db_tx| {
            let model = self.require_truck(&db_tx, principal, truck_id).await?;
            let driver = self
                .require_user_with_role(&db_tx, driver_id, Role::Driver)
                .await?;

            let mut truck = Truck::try_from(model)?;
            truck.assigned_driver_id = Some(driver_id);
            truck.updated_at = Utc::now();
            let model = trucks::ActiveModel {
                id: ActiveValue::Unchanged(truck.id.to_string()),
                assigned_driver_id: ActiveValue::Set(Some(driver_id.to_string())),
                updated_at: ActiveValue::Set(truck.updated_at),
                ..Default::default()
            };
            model.update(&db_tx).await?;

            self.record(
                &db_tx,
                principal,
                NewEvent::new(
                    None,
                    EventKind::OrderAssigned,
                    format!("Driver Assigned to Truck {}", truck.number),
                    format!(
                        "Driver {} assigned to truck {}",
                        display_name_of(&driver),
                        truck.number
                    ),
                ),
            )
            .await?;

            tracing::info!(truck = %truck.id, driver = %driver_id, "driver assigned to truck");
            Ok(truck)
        })
    }

    /// Delete a truck (admin). Orders keep existing with their truck cleared.
    pub async fn delete_truck(&self, principal: &Principal, truck_id: Uuid) -> ResultEngine<()> {
        ensure_can(principal, EntityKind::Truck, Action::Delete)?;
        with_tx!(self, |db_tx| {
            self.require_truck(&db_tx, principal, truck_id).await?;

            orders::Entity::update_many()
                .col_expr(orders::Column::TruckId, Expr::value(Option::<String>::None))
                .filter(orders::Column::TruckId.eq(truck_id.to_string()))
                .exec(&db_tx)
                .await?;
            trucks::Entity::delete_by_id(truck_id.to_string())
                .exec(&db_tx)
                .await?;

            tracing::info!(truck = %truck_id, "truck deleted");
            Ok(())
        })
    }
}

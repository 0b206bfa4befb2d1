//! The module contains the `Truck` struct and its table.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    util::{choice_enum, parse_optional_uuid, parse_uuid},
};

choice_enum!(
    /// Operational status of a truck.
    TruckStatus, "truck status" {
        Available => ("available", "Available"),
        OnTrip => ("on_trip", "On Trip"),
        Maintenance => ("maintenance", "Maintenance"),
        OutOfService => ("out_of_service", "Out of Service"),
    }
);

/// A regulatory document: its expiry date and the storage key of the scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub expires_on: NaiveDate,
    pub document: Option<String>,
}

impl Certificate {
    #[must_use]
    pub fn expiring(expires_on: NaiveDate) -> Self {
        Self {
            expires_on,
            document: None,
        }
    }
}

/// A truck of the fleet.
///
/// A truck always belongs to one owner. Drivers are attached through
/// `assigned_driver_id`, which is detached (not deleted) when the driver goes
/// away.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truck {
    pub id: Uuid,
    /// Registration number, unique across the fleet.
    pub number: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub axle_count: i32,
    pub capacity_kg: i64,
    pub fuel_type: String,
    pub current_mileage_km: i64,
    pub registration: Certificate,
    pub insurance: Certificate,
    pub pollution: Certificate,
    pub status: TruckStatus,
    pub owner_id: Uuid,
    pub assigned_driver_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Truck {
    /// Names the first certificate already expired on `today`.
    pub(crate) fn expired_certificate(&self, today: NaiveDate) -> Option<&'static str> {
        [
            (&self.registration, "RC"),
            (&self.insurance, "Insurance"),
            (&self.pollution, "Pollution certificate"),
        ]
        .into_iter()
        .find_map(|(cert, label)| (cert.expires_on < today).then_some(label))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "trucks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub number: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub axle_count: i32,
    pub capacity_kg: i64,
    pub fuel_type: String,
    pub current_mileage_km: i64,
    pub rc_expiry: Date,
    pub rc_document: Option<String>,
    pub insurance_expiry: Date,
    pub insurance_document: Option<String>,
    pub pollution_expiry: Date,
    pub pollution_document: Option<String>,
    pub status: String,
    pub owner_id: String,
    pub assigned_driver_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Truck> for ActiveModel {
    fn from(truck: &Truck) -> Self {
        Self {
            id: ActiveValue::Set(truck.id.to_string()),
            number: ActiveValue::Set(truck.number.clone()),
            make: ActiveValue::Set(truck.make.clone()),
            model: ActiveValue::Set(truck.model.clone()),
            year: ActiveValue::Set(truck.year),
            axle_count: ActiveValue::Set(truck.axle_count),
            capacity_kg: ActiveValue::Set(truck.capacity_kg),
            fuel_type: ActiveValue::Set(truck.fuel_type.clone()),
            current_mileage_km: ActiveValue::Set(truck.current_mileage_km),
            rc_expiry: ActiveValue::Set(truck.registration.expires_on),
            rc_document: ActiveValue::Set(truck.registration.document.clone()),
            insurance_expiry: ActiveValue::Set(truck.insurance.expires_on),
            insurance_document: ActiveValue::Set(truck.insurance.document.clone()),
            pollution_expiry: ActiveValue::Set(truck.pollution.expires_on),
            pollution_document: ActiveValue::Set(truck.pollution.document.clone()),
            status: ActiveValue::Set(truck.status.as_str().to_string()),
            owner_id: ActiveValue::Set(truck.owner_id.to_string()),
            assigned_driver_id: ActiveValue::Set(
                truck.assigned_driver_id.map(|id| id.to_string()),
            ),
            created_at: ActiveValue::Set(truck.created_at),
            updated_at: ActiveValue::Set(truck.updated_at),
        }
    }
}

impl TryFrom<Model> for Truck {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "truck")?,
            number: model.number,
            make: model.make,
            model: model.model,
            year: model.year,
            axle_count: model.axle_count,
            capacity_kg: model.capacity_kg,
            fuel_type: model.fuel_type,
            current_mileage_km: model.current_mileage_km,
            registration: Certificate {
                expires_on: model.rc_expiry,
                document: model.rc_document,
            },
            insurance: Certificate {
                expires_on: model.insurance_expiry,
                document: model.insurance_document,
            },
            pollution: Certificate {
                expires_on: model.pollution_expiry,
                document: model.pollution_document,
            },
            status: TruckStatus::try_from(model.status.as_str())?,
            owner_id: parse_uuid(&model.owner_id, "owner")?,
            assigned_driver_id: parse_optional_uuid(
                model.assigned_driver_id.as_deref(),
                "driver",
            )?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

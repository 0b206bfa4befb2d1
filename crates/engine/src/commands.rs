//! Command structs for engine operations.
//!
//! These types group parameters for write operations (trucks, orders,
//! expenses, transfers, users), keeping call sites readable and avoiding long
//! argument lists.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{BankDetails, ExpenseCategory, Role, Stop, TransferKind, TruckStatus};

/// Register a truck.
#[derive(Clone, Debug)]
pub struct NewTruck {
    pub number: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub axle_count: i32,
    pub capacity_kg: i64,
    pub fuel_type: Option<String>,
    pub current_mileage_km: i64,
    pub rc_expiry: NaiveDate,
    pub insurance_expiry: NaiveDate,
    pub pollution_expiry: NaiveDate,
    pub rc_document: Option<String>,
    pub insurance_document: Option<String>,
    pub pollution_document: Option<String>,
    pub status: Option<TruckStatus>,
    pub owner_id: Uuid,
    pub assigned_driver_id: Option<Uuid>,
}

impl NewTruck {
    /// Starts a truck with the required identity and the three expiry dates.
    #[must_use]
    pub fn new(
        number: impl Into<String>,
        owner_id: Uuid,
        rc_expiry: NaiveDate,
        insurance_expiry: NaiveDate,
        pollution_expiry: NaiveDate,
    ) -> Self {
        Self {
            number: number.into(),
            make: String::new(),
            model: String::new(),
            year: 0,
            axle_count: 2,
            capacity_kg: 0,
            fuel_type: None,
            current_mileage_km: 0,
            rc_expiry,
            insurance_expiry,
            pollution_expiry,
            rc_document: None,
            insurance_document: None,
            pollution_document: None,
            status: None,
            owner_id,
            assigned_driver_id: None,
        }
    }

    #[must_use]
    pub fn vehicle(mut self, make: impl Into<String>, model: impl Into<String>, year: i32) -> Self {
        self.make = make.into();
        self.model = model.into();
        self.year = year;
        self
    }

    #[must_use]
    pub fn axle_count(mut self, axle_count: i32) -> Self {
        self.axle_count = axle_count;
        self
    }

    #[must_use]
    pub fn capacity_kg(mut self, capacity_kg: i64) -> Self {
        self.capacity_kg = capacity_kg;
        self
    }

    #[must_use]
    pub fn fuel_type(mut self, fuel_type: impl Into<String>) -> Self {
        self.fuel_type = Some(fuel_type.into());
        self
    }

    #[must_use]
    pub fn current_mileage_km(mut self, km: i64) -> Self {
        self.current_mileage_km = km;
        self
    }

    #[must_use]
    pub fn status(mut self, status: TruckStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn driver(mut self, driver_id: Uuid) -> Self {
        self.assigned_driver_id = Some(driver_id);
        self
    }
}

/// Partial truck update. `None` leaves the field untouched.
#[derive(Clone, Debug, Default)]
pub struct TruckUpdate {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub axle_count: Option<i32>,
    pub capacity_kg: Option<i64>,
    pub fuel_type: Option<String>,
    pub current_mileage_km: Option<i64>,
    pub rc_expiry: Option<NaiveDate>,
    pub insurance_expiry: Option<NaiveDate>,
    pub pollution_expiry: Option<NaiveDate>,
    pub rc_document: Option<String>,
    pub insurance_document: Option<String>,
    pub pollution_document: Option<String>,
    pub status: Option<TruckStatus>,
}

/// Create a transportation order.
#[derive(Clone, Debug)]
pub struct NewOrder {
    pub owner_id: Uuid,
    pub description: Option<String>,
    pub pickup: Stop,
    pub delivery: Stop,
    pub pickup_date: DateTime<Utc>,
    pub estimated_delivery_date: DateTime<Utc>,
    pub load_type: String,
    pub weight_kg: i64,
    pub volume_litres: Option<i64>,
    pub total_amount_minor: i64,
    pub advance_amount_minor: i64,
    pub truck_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
}

impl NewOrder {
    #[must_use]
    pub fn new(
        owner_id: Uuid,
        pickup: Stop,
        delivery: Stop,
        pickup_date: DateTime<Utc>,
        estimated_delivery_date: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id,
            description: None,
            pickup,
            delivery,
            pickup_date,
            estimated_delivery_date,
            load_type: String::new(),
            weight_kg: 0,
            volume_litres: None,
            total_amount_minor: 0,
            advance_amount_minor: 0,
            truck_id: None,
            driver_id: None,
        }
    }

    #[must_use]
    pub fn load(mut self, load_type: impl Into<String>, weight_kg: i64) -> Self {
        self.load_type = load_type.into();
        self.weight_kg = weight_kg;
        self
    }

    #[must_use]
    pub fn volume_litres(mut self, volume: i64) -> Self {
        self.volume_litres = Some(volume);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn amounts(mut self, total_minor: i64, advance_minor: i64) -> Self {
        self.total_amount_minor = total_minor;
        self.advance_amount_minor = advance_minor;
        self
    }

    #[must_use]
    pub fn truck(mut self, truck_id: Uuid) -> Self {
        self.truck_id = Some(truck_id);
        self
    }

    #[must_use]
    pub fn driver(mut self, driver_id: Uuid) -> Self {
        self.driver_id = Some(driver_id);
        self
    }
}

/// Partial order update.
///
/// The order code and status are not part of it: codes are immutable and
/// status moves only through `update_order_status`. The nested options on
/// `truck_id`, `driver_id` and `volume_litres` distinguish "leave" (`None`)
/// from "clear" (`Some(None)`).
#[derive(Clone, Debug, Default)]
pub struct OrderUpdate {
    pub owner_id: Option<Uuid>,
    pub description: Option<String>,
    pub pickup: Option<Stop>,
    pub delivery: Option<Stop>,
    pub pickup_date: Option<DateTime<Utc>>,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    pub load_type: Option<String>,
    pub weight_kg: Option<i64>,
    pub volume_litres: Option<Option<i64>>,
    pub total_amount_minor: Option<i64>,
    pub advance_amount_minor: Option<i64>,
    pub truck_id: Option<Option<Uuid>>,
    pub driver_id: Option<Option<Uuid>>,
}

/// Record a trip expense.
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub order_id: Uuid,
    pub category: ExpenseCategory,
    pub amount_minor: i64,
    pub description: String,
    pub bill_photo: Option<String>,
}

impl NewExpense {
    #[must_use]
    pub fn new(
        order_id: Uuid,
        category: ExpenseCategory,
        amount_minor: i64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            order_id,
            category,
            amount_minor,
            description: description.into(),
            bill_photo: None,
        }
    }

    #[must_use]
    pub fn bill_photo(mut self, key: impl Into<String>) -> Self {
        self.bill_photo = Some(key.into());
        self
    }
}

/// Record a money transfer.
#[derive(Clone, Debug)]
pub struct NewTransfer {
    pub order_id: Uuid,
    pub kind: TransferKind,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub bank: BankDetails,
    pub receipt: Option<String>,
}

impl NewTransfer {
    #[must_use]
    pub fn new(order_id: Uuid, kind: TransferKind, amount_minor: i64) -> Self {
        Self {
            order_id,
            kind,
            amount_minor,
            description: None,
            bank: BankDetails::default(),
            receipt: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn bank(mut self, bank: BankDetails) -> Self {
        self.bank = bank;
        self
    }

    #[must_use]
    pub fn receipt(mut self, key: impl Into<String>) -> Self {
        self.receipt = Some(key.into());
        self
    }
}

/// Create a user. The password arrives already hashed.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub role: Role,
    pub password_hash: String,
}

impl NewUser {
    #[must_use]
    pub fn new(email: impl Into<String>, role: Role, password_hash: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            role,
            password_hash: password_hash.into(),
        }
    }

    #[must_use]
    pub fn name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }
}

//! Request and response bodies of the Haulage HTTP API.
//!
//! Choice fields (statuses, categories, kinds, roles) travel as their
//! snake_case value; responses pair each one with a `*_display` label.
//! Amounts are integer paise in `*_minor` fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in partial updates.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Wraps list responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct Listing<T> {
    pub count: usize,
    pub results: Vec<T>,
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(results: Vec<T>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

pub mod truck {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TruckNew {
        pub number: String,
        pub make: String,
        pub model: String,
        pub year: i32,
        pub axle_count: i32,
        pub capacity_kg: i64,
        pub fuel_type: Option<String>,
        #[serde(default)]
        pub current_mileage_km: i64,
        pub rc_expiry: NaiveDate,
        pub insurance_expiry: NaiveDate,
        pub pollution_expiry: NaiveDate,
        pub rc_document: Option<String>,
        pub insurance_document: Option<String>,
        pub pollution_document: Option<String>,
        pub status: Option<String>,
        pub owner_id: Uuid,
        pub assigned_driver_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
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
        pub status: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssignDriver {
        pub driver_id: Uuid,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TruckListQuery {
        pub status: Option<String>,
        pub owner: Option<Uuid>,
        pub driver: Option<Uuid>,
        pub search: Option<String>,
        pub ordering: Option<String>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TruckView {
        pub id: Uuid,
        pub number: String,
        pub make: String,
        pub model: String,
        pub year: i32,
        pub axle_count: i32,
        pub capacity_kg: i64,
        pub fuel_type: String,
        pub current_mileage_km: i64,
        pub rc_expiry: NaiveDate,
        pub rc_document: Option<String>,
        pub insurance_expiry: NaiveDate,
        pub insurance_document: Option<String>,
        pub pollution_expiry: NaiveDate,
        pub pollution_document: Option<String>,
        pub status: String,
        pub status_display: String,
        pub owner_id: Uuid,
        pub assigned_driver_id: Option<Uuid>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod order {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct StopBody {
        pub location: String,
        pub contact: String,
        pub phone: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderNew {
        /// Defaults to the caller when the caller is an owner.
        pub owner_id: Option<Uuid>,
        pub description: Option<String>,
        pub pickup: StopBody,
        pub delivery: StopBody,
        pub pickup_date: DateTime<Utc>,
        pub estimated_delivery_date: DateTime<Utc>,
        pub load_type: String,
        pub weight_kg: i64,
        pub volume_litres: Option<i64>,
        pub total_amount_minor: i64,
        #[serde(default)]
        pub advance_amount_minor: i64,
        pub truck_id: Option<Uuid>,
        pub driver_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OrderUpdate {
        pub owner_id: Option<Uuid>,
        pub description: Option<String>,
        pub pickup: Option<StopBody>,
        pub delivery: Option<StopBody>,
        pub pickup_date: Option<DateTime<Utc>>,
        pub estimated_delivery_date: Option<DateTime<Utc>>,
        pub load_type: Option<String>,
        pub weight_kg: Option<i64>,
        #[serde(default, deserialize_with = "double_option")]
        pub volume_litres: Option<Option<i64>>,
        pub total_amount_minor: Option<i64>,
        pub advance_amount_minor: Option<i64>,
        #[serde(default, deserialize_with = "double_option")]
        pub truck_id: Option<Option<Uuid>>,
        #[serde(default, deserialize_with = "double_option")]
        pub driver_id: Option<Option<Uuid>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusUpdate {
        pub status: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DocumentAttach {
        /// `waybill`, `lr_copy` or `other`.
        pub kind: String,
        pub key: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OrderListQuery {
        pub status: Option<String>,
        pub owner: Option<Uuid>,
        pub driver: Option<Uuid>,
        pub truck: Option<Uuid>,
        pub search: Option<String>,
        pub ordering: Option<String>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DocumentsView {
        pub waybill: Option<String>,
        pub lr_copy: Option<String>,
        pub other: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderView {
        pub id: Uuid,
        pub order_number: String,
        pub description: String,
        pub pickup: StopBody,
        pub delivery: StopBody,
        pub pickup_date: DateTime<Utc>,
        pub estimated_delivery_date: DateTime<Utc>,
        pub actual_delivery_date: Option<DateTime<Utc>>,
        pub load_type: String,
        pub weight_kg: i64,
        pub volume_litres: Option<i64>,
        pub total_amount_minor: i64,
        pub advance_amount_minor: i64,
        pub balance_amount_minor: i64,
        pub status: String,
        pub status_display: String,
        pub truck_id: Option<Uuid>,
        pub driver_id: Option<Uuid>,
        pub owner_id: Uuid,
        pub created_by: Uuid,
        pub documents: DocumentsView,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub order_id: Uuid,
        pub category: String,
        pub amount_minor: i64,
        pub description: String,
        pub bill_photo: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseListQuery {
        pub category: Option<String>,
        pub order: Option<Uuid>,
        pub added_by: Option<Uuid>,
        pub search: Option<String>,
        pub ordering: Option<String>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub order_id: Uuid,
        pub category: String,
        pub category_display: String,
        pub description: String,
        pub amount_minor: i64,
        pub bill_photo: Option<String>,
        pub added_by: Uuid,
        pub created_at: DateTime<Utc>,
    }
}

pub mod transfer {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub order_id: Uuid,
        pub transfer_type: String,
        pub amount_minor: i64,
        pub description: Option<String>,
        pub transaction_ref: Option<String>,
        pub bank_name: Option<String>,
        pub account_number: Option<String>,
        pub ifsc_code: Option<String>,
        pub receipt: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransferListQuery {
        pub transfer_type: Option<String>,
        pub status: Option<String>,
        pub order: Option<Uuid>,
        pub search: Option<String>,
        pub ordering: Option<String>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferView {
        pub id: Uuid,
        pub order_id: Uuid,
        pub transfer_type: String,
        pub transfer_type_display: String,
        pub amount_minor: i64,
        pub description: String,
        pub status: String,
        pub status_display: String,
        pub transaction_ref: Option<String>,
        pub bank_name: Option<String>,
        pub account_number: Option<String>,
        pub ifsc_code: Option<String>,
        pub receipt: Option<String>,
        pub created_by: Uuid,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod timeline {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TimelineListQuery {
        pub event_type: Option<String>,
        pub order: Option<Uuid>,
        pub created_by: Option<Uuid>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TimelineEventView {
        pub id: Uuid,
        pub order_id: Option<Uuid>,
        pub event_type: String,
        pub event_type_display: String,
        pub title: String,
        pub description: String,
        pub related_expense_id: Option<Uuid>,
        pub related_transfer_id: Option<Uuid>,
        pub created_by: Uuid,
        pub created_at: DateTime<Utc>,
    }
}

pub mod dashboard {
    use super::*;
    use crate::{expense::ExpenseView, order::OrderView, user::UserView};

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Stats {
        pub total_orders: u64,
        pub active_orders: u64,
        pub total_revenue_minor: i64,
        pub pending_amount_minor: i64,
        pub total_expenses_minor: i64,
        pub total_profit_minor: i64,
        pub recent_orders: Vec<OrderView>,
        pub upcoming_deliveries: Vec<OrderView>,
        pub recent_expenses: Vec<ExpenseView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OwnerQuery {
        pub owner_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusCount {
        pub status: String,
        pub status_display: String,
        pub count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthRevenue {
        /// `YYYY-MM`.
        pub month: String,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OwnerDashboard {
        pub owner: UserView,
        pub truck_count: u64,
        pub active_trucks: u64,
        pub total_orders: u64,
        pub total_revenue_minor: i64,
        pub orders_by_status: Vec<StatusCount>,
        pub revenue_by_month: Vec<MonthRevenue>,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub email: String,
        pub password: String,
        pub role: String,
        #[serde(default)]
        pub first_name: String,
        #[serde(default)]
        pub last_name: String,
        #[serde(default)]
        pub phone: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserListQuery {
        pub role: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
        pub full_name: String,
        pub phone: String,
        pub role: String,
        pub role_display: String,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
    }
}

#[cfg(test)]
mod tests {
    use super::order::OrderUpdate;

    #[test]
    fn absent_and_null_are_distinct_in_updates() {
        let absent: OrderUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.driver_id, None);

        let cleared: OrderUpdate = serde_json::from_str(r#"{"driver_id": null}"#).unwrap();
        assert_eq!(cleared.driver_id, Some(None));

        let set: OrderUpdate = serde_json::from_str(
            r#"{"driver_id": "67e55044-10b1-426f-9247-bb680e5fe0c8", "volume_litres": 900}"#,
        )
        .unwrap();
        assert!(matches!(set.driver_id, Some(Some(_))));
        assert_eq!(set.volume_litres, Some(Some(900)));
    }
}

//! Trip expenses recorded by drivers against an order.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    util::{choice_enum, parse_uuid},
};

choice_enum!(
    ExpenseCategory, "expense category" {
        Fuel => ("fuel", "Fuel"),
        Toll => ("toll", "Toll"),
        Maintenance => ("maintenance", "Maintenance"),
        Food => ("food", "Food"),
        Accommodation => ("accommodation", "Accommodation"),
        Other => ("other", "Other"),
    }
);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub order_id: Uuid,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount_minor: i64,
    pub bill_photo: Option<String>,
    pub added_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub order_id: String,
    pub category: String,
    pub description: String,
    pub amount_minor: i64,
    pub bill_photo: Option<String>,
    pub added_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            order_id: ActiveValue::Set(expense.order_id.to_string()),
            category: ActiveValue::Set(expense.category.as_str().to_string()),
            description: ActiveValue::Set(expense.description.clone()),
            amount_minor: ActiveValue::Set(expense.amount_minor),
            bill_photo: ActiveValue::Set(expense.bill_photo.clone()),
            added_by: ActiveValue::Set(expense.added_by.to_string()),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            order_id: parse_uuid(&model.order_id, "order")?,
            category: ExpenseCategory::try_from(model.category.as_str())?,
            description: model.description,
            amount_minor: model.amount_minor,
            bill_photo: model.bill_photo,
            added_by: parse_uuid(&model.added_by, "user")?,
            created_at: model.created_at,
        })
    }
}

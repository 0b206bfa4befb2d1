//! Money transfers between the business and the order's participants.
//!
//! Transfers are recorded, not settled: a transfer is completed as soon as it
//! is stored.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    util::{choice_enum, parse_uuid},
};

choice_enum!(
    /// Direction of a transfer relative to the order's participants.
    TransferKind, "transfer type" {
        ToDriver => ("to_driver", "To Driver"),
        FromDriver => ("from_driver", "From Driver"),
        ToOwner => ("to_owner", "To Owner"),
        FromOwner => ("from_owner", "From Owner"),
    }
);

impl TransferKind {
    /// Kinds visible to every driver, whatever order they belong to.
    pub const DRIVER_FACING: [TransferKind; 2] = [Self::ToDriver, Self::FromDriver];
}

choice_enum!(
    TransferStatus, "transfer status" {
        Pending => ("pending", "Pending"),
        Completed => ("completed", "Completed"),
        Failed => ("failed", "Failed"),
    }
);

/// Optional bank metadata attached to a transfer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub transaction_ref: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyTransfer {
    pub id: Uuid,
    pub order_id: Uuid,
    pub kind: TransferKind,
    pub amount_minor: i64,
    pub description: String,
    pub status: TransferStatus,
    pub bank: BankDetails,
    pub receipt: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub order_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub description: String,
    pub status: String,
    pub transaction_ref: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub receipt: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&MoneyTransfer> for ActiveModel {
    fn from(transfer: &MoneyTransfer) -> Self {
        Self {
            id: ActiveValue::Set(transfer.id.to_string()),
            order_id: ActiveValue::Set(transfer.order_id.to_string()),
            kind: ActiveValue::Set(transfer.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(transfer.amount_minor),
            description: ActiveValue::Set(transfer.description.clone()),
            status: ActiveValue::Set(transfer.status.as_str().to_string()),
            transaction_ref: ActiveValue::Set(transfer.bank.transaction_ref.clone()),
            bank_name: ActiveValue::Set(transfer.bank.bank_name.clone()),
            account_number: ActiveValue::Set(transfer.bank.account_number.clone()),
            ifsc_code: ActiveValue::Set(transfer.bank.ifsc_code.clone()),
            receipt: ActiveValue::Set(transfer.receipt.clone()),
            created_by: ActiveValue::Set(transfer.created_by.to_string()),
            created_at: ActiveValue::Set(transfer.created_at),
            updated_at: ActiveValue::Set(transfer.updated_at),
        }
    }
}

impl TryFrom<Model> for MoneyTransfer {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transfer")?,
            order_id: parse_uuid(&model.order_id, "order")?,
            kind: TransferKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            description: model.description,
            status: TransferStatus::try_from(model.status.as_str())?,
            bank: BankDetails {
                transaction_ref: model.transaction_ref,
                bank_name: model.bank_name,
                account_number: model.account_number,
                ifsc_code: model.ifsc_code,
            },
            receipt: model.receipt,
            created_by: parse_uuid(&model.created_by, "user")?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

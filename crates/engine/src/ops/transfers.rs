use chrono::Utc;
use sea_orm::{
    ActiveValue, Order, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    BankDetails, EngineError, EventKind, Money, MoneyTransfer, NewTransfer, Principal,
    ResultEngine, TransferKind, TransferStatus,
    policy::{Action, EntityKind},
    timeline::{self, NewEvent},
    transfers,
    util::{normalize_optional_text, require_positive},
};

use super::{
    Engine,
    access::{ensure_can, transfer_scope},
    listing, with_tx,
};

/// Filters for listing transfers.
#[derive(Clone, Debug, Default)]
pub struct TransferListFilter {
    pub kind: Option<TransferKind>,
    pub status: Option<TransferStatus>,
    pub order_id: Option<Uuid>,
    /// Matches the description and the bank transaction reference.
    pub search: Option<String>,
    /// `created_at` or `amount`, optionally prefixed by `-`.
    pub ordering: Option<String>,
    pub limit: Option<u64>,
}

fn normalize_bank(bank: &BankDetails) -> BankDetails {
    BankDetails {
        transaction_ref: normalize_optional_text(bank.transaction_ref.as_deref()),
        bank_name: normalize_optional_text(bank.bank_name.as_deref()),
        account_number: normalize_optional_text(bank.account_number.as_deref()),
        ifsc_code: normalize_optional_text(bank.ifsc_code.as_deref()),
    }
}

impl Engine {
    /// Record a transfer (admin).
    ///
    /// A `to_driver` transfer needs a driver on the order. The row is stored
    /// pending, the `money_transferred` event is recorded, then the transfer
    /// is marked completed, all in the same transaction.
    pub async fn create_transfer(
        &self,
        principal: &Principal,
        cmd: NewTransfer,
    ) -> ResultEngine<MoneyTransfer> {
        ensure_can(principal, EntityKind::Transfer, Action::Create)?;
        require_positive(cmd.amount_minor, "amount")?;

        with_tx!(self, |db_tx| {
            let order = self.require_order(&db_tx, principal, cmd.order_id).await?;
            if cmd.kind == TransferKind::ToDriver && order.driver_id.is_none() {
                return Err(EngineError::Validation(
                    "No driver assigned to this order.".to_string(),
                ));
            }

            let now = Utc::now();
            let mut transfer = MoneyTransfer {
                id: Uuid::new_v4(),
                order_id: cmd.order_id,
                kind: cmd.kind,
                amount_minor: cmd.amount_minor,
                description: normalize_optional_text(cmd.description.as_deref())
                    .unwrap_or_default(),
                status: TransferStatus::Pending,
                bank: normalize_bank(&cmd.bank),
                receipt: normalize_optional_text(cmd.receipt.as_deref()),
                created_by: principal.user_id,
                created_at: now,
                updated_at: now,
            };
            let model: transfers::ActiveModel = (&transfer).into();
            model.insert(&db_tx).await?;

            let mut description = format!("{} - {}", Money::new(transfer.amount_minor), order.code);
            if !transfer.description.is_empty() {
                description.push_str(&format!(" ({})", transfer.description));
            }
            self.record(
                &db_tx,
                principal,
                NewEvent::new(
                    Some(transfer.order_id),
                    EventKind::MoneyTransferred,
                    format!("Money Transfer: {}", transfer.kind),
                    description,
                )
                .transfer(transfer.id),
            )
            .await?;

            transfer.status = TransferStatus::Completed;
            transfer.updated_at = Utc::now();
            transfers::ActiveModel {
                id: ActiveValue::Unchanged(transfer.id.to_string()),
                status: ActiveValue::Set(transfer.status.as_str().to_string()),
                updated_at: ActiveValue::Set(transfer.updated_at),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            tracing::info!(
                transfer = %transfer.id,
                order = %transfer.order_id,
                kind = transfer.kind.as_str(),
                "transfer completed"
            );
            Ok(transfer)
        })
    }

    pub async fn list_transfers(
        &self,
        principal: &Principal,
        filter: &TransferListFilter,
    ) -> ResultEngine<Vec<MoneyTransfer>> {
        let mut select = transfers::Entity::find().filter(transfer_scope(principal));
        if let Some(kind) = filter.kind {
            select = select.filter(transfers::Column::Kind.eq(kind.as_str()));
        }
        if let Some(status) = filter.status {
            select = select.filter(transfers::Column::Status.eq(status.as_str()));
        }
        if let Some(order_id) = filter.order_id {
            select = select.filter(transfers::Column::OrderId.eq(order_id.to_string()));
        }
        if let Some(cond) = listing::search(
            filter.search.as_deref(),
            &[
                transfers::Column::Description,
                transfers::Column::TransactionRef,
            ],
        ) {
            select = select.filter(cond);
        }
        let select = listing::apply_ordering(
            select,
            filter.ordering.as_deref(),
            &[
                ("created_at", transfers::Column::CreatedAt),
                ("amount", transfers::Column::AmountMinor),
            ],
            (transfers::Column::CreatedAt, Order::Desc),
        )?;
        listing::limit(select, filter.limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(MoneyTransfer::try_from)
            .collect()
    }

    pub async fn transfer(
        &self,
        principal: &Principal,
        transfer_id: Uuid,
    ) -> ResultEngine<MoneyTransfer> {
        let model = self
            .require_transfer(&self.database, principal, transfer_id)
            .await?;
        MoneyTransfer::try_from(model)
    }

    /// Delete a transfer (admin). Timeline events pointing at it keep
    /// existing with the reference cleared.
    pub async fn delete_transfer(
        &self,
        principal: &Principal,
        transfer_id: Uuid,
    ) -> ResultEngine<()> {
        ensure_can(principal, EntityKind::Transfer, Action::Delete)?;
        with_tx!(self, |db_tx| {
            self.require_transfer(&db_tx, principal, transfer_id).await?;
            let id = transfer_id.to_string();

            timeline::Entity::update_many()
                .col_expr(
                    timeline::Column::RelatedTransferId,
                    Expr::value(Option::<String>::None),
                )
                .filter(timeline::Column::RelatedTransferId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            transfers::Entity::delete_by_id(id).exec(&db_tx).await?;

            tracing::info!(transfer = %transfer_id, "transfer deleted");
            Ok(())
        })
    }
}

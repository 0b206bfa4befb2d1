use api_types::{
    Listing,
    transfer::{TransferListQuery, TransferNew, TransferView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    Action, BankDetails, EntityKind, NewTransfer, Principal, TransferKind, TransferListFilter, TransferStatus,
};
use uuid::Uuid;

use crate::{ServerError, authorize, server::ServerState, views};

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Query(query): Query<TransferListQuery>,
) -> Result<Json<Listing<TransferView>>, ServerError> {
    let filter = TransferListFilter {
        kind: views::choice::<TransferKind>(query.transfer_type.as_deref())?,
        status: views::choice::<TransferStatus>(query.status.as_deref())?,
        order_id: query.order,
        search: query.search,
        ordering: query.ordering,
        limit: query.limit,
    };
    let transfers = state.engine.list_transfers(&principal, &filter).await?;
    Ok(Json(
        transfers.into_iter().map(views::transfer).collect::<Vec<_>>().into(),
    ))
}

pub async fn create(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<TransferView>), ServerError> {
    authorize(&principal, EntityKind::Transfer, Action::Create)?;
    let kind = TransferKind::try_from(payload.transfer_type.trim())?;
    let mut cmd = NewTransfer::new(payload.order_id, kind, payload.amount_minor).bank(
        BankDetails {
            transaction_ref: payload.transaction_ref,
            bank_name: payload.bank_name,
            account_number: payload.account_number,
            ifsc_code: payload.ifsc_code,
        },
    );
    cmd.description = payload.description;
    cmd.receipt = payload.receipt;

    let transfer = state.engine.create_transfer(&principal, cmd).await?;
    Ok((StatusCode::CREATED, Json(views::transfer(transfer))))
}

pub async fn get(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(transfer_id): Path<Uuid>,
) -> Result<Json<TransferView>, ServerError> {
    let transfer = state.engine.transfer(&principal, transfer_id).await?;
    Ok(Json(views::transfer(transfer)))
}

pub async fn delete(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(transfer_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transfer(&principal, transfer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

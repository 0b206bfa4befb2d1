use api_types::{
    Listing,
    expense::{ExpenseListQuery, ExpenseNew, ExpenseView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Action, EntityKind, ExpenseCategory, ExpenseListFilter, NewExpense, Principal};
use uuid::Uuid;

use crate::{ServerError, authorize, server::ServerState, views};

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<Listing<ExpenseView>>, ServerError> {
    let filter = ExpenseListFilter {
        category: views::choice::<ExpenseCategory>(query.category.as_deref())?,
        order_id: query.order,
        added_by: query.added_by,
        search: query.search,
        ordering: query.ordering,
        limit: query.limit,
    };
    let expenses = state.engine.list_expenses(&principal, &filter).await?;
    Ok(Json(
        expenses.into_iter().map(views::expense).collect::<Vec<_>>().into(),
    ))
}

pub async fn create(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    authorize(&principal, EntityKind::Expense, Action::Create)?;
    let category = ExpenseCategory::try_from(payload.category.trim())?;
    let mut cmd = NewExpense::new(
        payload.order_id,
        category,
        payload.amount_minor,
        payload.description,
    );
    cmd.bill_photo = payload.bill_photo;

    let expense = state.engine.create_expense(&principal, cmd).await?;
    Ok((StatusCode::CREATED, Json(views::expense(expense))))
}

pub async fn get(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(&principal, expense_id).await?;
    Ok(Json(views::expense(expense)))
}

pub async fn delete(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(&principal, expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

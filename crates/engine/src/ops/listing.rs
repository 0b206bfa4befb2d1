//! Shared pieces of the list operations: ordering keys and substring search.

use sea_orm::{ColumnTrait, Condition, EntityTrait, Order, QueryOrder, QuerySelect, Select};

use crate::{EngineError, ResultEngine, util::normalize_optional_text};

/// Applies a `field` / `-field` ordering key picked from `allowed`.
///
/// Without a key the list falls back to `default`.
pub(super) fn apply_ordering<E>(
    select: Select<E>,
    raw: Option<&str>,
    allowed: &[(&str, E::Column)],
    default: (E::Column, Order),
) -> ResultEngine<Select<E>>
where
    E: EntityTrait,
{
    let Some(raw) = normalize_optional_text(raw) else {
        return Ok(select.order_by(default.0, default.1));
    };
    let (field, order) = match raw.strip_prefix('-') {
        Some(field) => (field, Order::Desc),
        None => (raw.as_str(), Order::Asc),
    };
    let column = allowed
        .iter()
        .find_map(|(name, column)| (*name == field).then_some(*column))
        .ok_or_else(|| EngineError::Validation(format!("invalid ordering: {raw}")))?;
    Ok(select.order_by(column, order))
}

/// Case-insensitive substring match on any of `columns`.
pub(super) fn search<C>(term: Option<&str>, columns: &[C]) -> Option<Condition>
where
    C: ColumnTrait,
{
    let term = normalize_optional_text(term)?;
    Some(
        columns
            .iter()
            .fold(Condition::any(), |cond, column| cond.add(column.contains(&term))),
    )
}

pub(super) fn limit<E>(select: Select<E>, limit: Option<u64>) -> Select<E>
where
    E: EntityTrait,
{
    match limit {
        Some(limit) => select.limit(limit),
        None => select,
    }
}

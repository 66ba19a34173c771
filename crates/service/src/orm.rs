//! Apply order/filter specs to sea-orm selects.
//!
//! Field names are parsed into the entity's columns; names without a column
//! are skipped, as are filter values that are arrays or objects.

use std::str::FromStr;

use sea_orm::{ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, Select};
use serde_json::Value as Json;
use tracing::debug;

use crate::query::{Direction, FilterSpec, OrderSpec};

impl From<Direction> for Order {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => Order::Asc,
            Direction::Desc => Order::Desc,
        }
    }
}

pub fn apply_order<E>(select: Select<E>, order: &OrderSpec) -> Select<E>
where
    E: EntityTrait,
    E::Column: FromStr,
{
    order.iter().fold(select, |select, (field, direction)| match <E::Column as FromStr>::from_str(field) {
        Ok(column) => select.order_by(column, direction.into()),
        Err(_) => {
            debug!(%field, "order field has no column; skipped");
            select
        }
    })
}

pub fn apply_filter<E>(select: Select<E>, filter: &FilterSpec) -> Select<E>
where
    E: EntityTrait,
    E::Column: FromStr,
{
    filter.iter().fold(select, |select, (field, value)| {
        let Ok(column) = <E::Column as FromStr>::from_str(field) else {
            debug!(%field, "filter field has no column; skipped");
            return select;
        };
        if value.is_null() {
            return select.filter(column.is_null());
        }
        match scalar(value) {
            Some(v) => select.filter(ColumnTrait::eq(&column, v)),
            None => {
                debug!(%field, "filter value is not a scalar; skipped");
                select
            }
        }
    })
}

fn scalar(value: &Json) -> Option<sea_orm::Value> {
    match value {
        Json::String(s) => Some(s.clone().into()),
        Json::Bool(b) => Some((*b).into()),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Some(i.into()),
            None => n.as_f64().map(Into::into),
        },
        _ => None,
    }
}

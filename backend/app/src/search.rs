//! Generic search, filter, sort and pagination over any sea-orm entity.

pub mod filter;

use sea_orm::{
    Condition, ConnectionTrait, EntityTrait, IdenStatic, Iterable, Order,
    PaginatorTrait, PrimaryKeyToColumn, QueryFilter, QueryOrder, QuerySelect, Select,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};

use crate::{
    common::{ApiError, ApiResult},
    params::{CommonParams, Page},
};

/// An entity that can be listed through [`search_filter_sort_paginate`].
pub trait Searchable: EntityTrait {
    /// Columns matched by `q`, each with its relevance weight (higher ranks first).
    fn search_columns() -> &'static [(Self::Column, i32)];

    /// Resolves a client supplied column name, snake_case or camelCase.
    fn column(name: &str) -> Option<Self::Column> {
        Self::Column::iter().find(|column| {
            let snake = column.as_str();
            snake == name || snake_to_camel(snake) == name
        })
    }
}

pub async fn search_filter_sort_paginate<E, C>(
    db: &C,
    select: Select<E>,
    params: &CommonParams,
) -> ApiResult<Page<E::Model>>
where
    E: Searchable,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let mut select = select;
    let pattern = params.search_term().map(like_pattern);

    if let Some(pattern) = pattern.as_ref() {
        select = select.filter(search_condition::<E>(pattern));
    }

    if let Some(raw) = params.filter.as_deref().filter(|raw| !raw.trim().is_empty()) {
        select = select.filter(filter::parse::<E>(raw)?);
    }

    let ordering = sort_columns::<E>(params)?;

    let total = select.clone().count(db).await?;

    if ordering.is_empty() {
        if let Some(pattern) = pattern.as_ref() {
            select = select.order_by(relevance::<E>(pattern), Order::Desc);
        }
    }
    for (column, order) in ordering {
        select = select.order_by(column, order);
    }
    for key in E::PrimaryKey::iter() {
        select = select.order_by(key.into_column(), Order::Asc);
    }

    if let Some(limit) = params.limit() {
        select = select.offset(params.offset()).limit(limit);
    }

    let items = select.all(db).await?;

    Ok(Page::from_params(params, total, items))
}

fn sort_columns<E: Searchable>(params: &CommonParams) -> ApiResult<Vec<(E::Column, Order)>> {
    params
        .sort_by
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let column = E::column(name).ok_or_else(|| {
                ApiError::field("sortBy", format!("Unknown sort field: {name}"), "value_error")
            })?;
            let order = if params.descending.get(index).copied().unwrap_or(false) {
                Order::Desc
            } else {
                Order::Asc
            };
            Ok((column, order))
        })
        .collect()
}

const LIKE_ESCAPE: char = '\\';

/// Substring pattern for `q`; `%`, `_` and the escape character match literally.
fn like_pattern(term: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');

    LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

pub(crate) fn lower<E: EntityTrait>(column: E::Column) -> Expr {
    Expr::expr(Func::lower(Expr::col((E::default(), column))))
}

fn search_condition<E: Searchable>(pattern: &LikeExpr) -> Condition {
    E::search_columns()
        .iter()
        .fold(Condition::any(), |condition, (column, _)| {
            condition.add(lower::<E>(*column).like(pattern.clone()))
        })
}

/// Sum of the weights of every search column that matches.
fn relevance<E: Searchable>(pattern: &LikeExpr) -> SimpleExpr {
    E::search_columns()
        .iter()
        .map(|(column, weight)| -> SimpleExpr {
            Expr::case(lower::<E>(*column).like(pattern.clone()), Expr::val(*weight))
                .finally(Expr::val(0))
                .into()
        })
        .reduce(|acc, score| acc.add(score))
        .unwrap_or_else(|| Expr::val(0).into())
}

fn snake_to_camel(snake: &str) -> String {
    let mut camel = String::with_capacity(snake.len());
    let mut upper = false;
    for ch in snake.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            camel.extend(ch.to_uppercase());
            upper = false;
        } else {
            camel.push(ch);
        }
    }
    camel
}

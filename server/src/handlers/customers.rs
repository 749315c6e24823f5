use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::{json, Value};

use super::parse_id;
use crate::api::AppState;
use crate::error::ApiError;
use crate::models::{CreateCustomer, Customer, NewCustomer, UpdateCustomer};
use crate::schema::customers;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Customer>>, ApiError> {
    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;
    let rows = customers::table
        .filter(customers::active.eq(true))
        .order(customers::updated_at.desc())
        .load::<Customer>(&mut conn)
        .await?;
    Ok(Json(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateCustomer>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let Some(name) = body.name.filter(|n| !n.is_empty()) else {
        return Err(ApiError::bad_request("Name is required"));
    };
    let Some(phone) = body.phone.filter(|p| !p.is_empty()) else {
        return Err(ApiError::bad_request("Phone is required"));
    };

    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;

    let existing = customers::table
        .filter(customers::name.eq(&name))
        .filter(customers::phone.eq(&phone))
        .first::<Customer>(&mut conn)
        .await
        .optional()?;
    if existing.is_some() {
        return Err(ApiError::conflict(
            "Customer with this name and phone already exists",
        ));
    }

    let row = diesel::insert_into(customers::table)
        .values(&NewCustomer {
            name,
            phone,
            active: Some(true),
        })
        .get_result::<Customer>(&mut conn)
        .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    let id = parse_id(&id, "customer")?;
    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;

    // inactive customers stay addressable by id
    let row = customers::table
        .find(id)
        .first::<Customer>(&mut conn)
        .await
        .optional()?;

    row.map(Json)
        .ok_or_else(|| ApiError::not_found("Customer not found"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCustomer>,
) -> Result<Json<Customer>, ApiError> {
    let id = parse_id(&id, "customer")?;
    let Some(name) = body.name.filter(|n| !n.is_empty()) else {
        return Err(ApiError::bad_request("Name is required"));
    };

    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;

    let mut duplicates = customers::table
        .filter(customers::name.eq(name.clone()))
        .filter(customers::id.ne(id))
        .into_boxed();
    if let Some(phone) = body.phone.clone() {
        duplicates = duplicates.filter(customers::phone.eq(phone));
    }
    if duplicates
        .first::<Customer>(&mut conn)
        .await
        .optional()?
        .is_some()
    {
        return Err(ApiError::conflict(
            "Customer with this name and phone already exists",
        ));
    }

    let updated = if let Some(phone) = body.phone {
        diesel::update(customers::table.find(id))
            .set((
                customers::name.eq(name),
                customers::phone.eq(phone),
                customers::updated_at.eq(Utc::now()),
            ))
            .get_result::<Customer>(&mut conn)
            .await
            .optional()?
    } else {
        diesel::update(customers::table.find(id))
            .set((
                customers::name.eq(name),
                customers::updated_at.eq(Utc::now()),
            ))
            .get_result::<Customer>(&mut conn)
            .await
            .optional()?
    };

    updated
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Customer not found"))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "customer")?;
    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;

    let deleted = diesel::update(customers::table.find(id))
        .set(customers::active.eq(false))
        .get_result::<Customer>(&mut conn)
        .await
        .optional()?;

    if deleted.is_none() {
        return Err(ApiError::not_found("Customer not found"));
    }

    Ok(Json(json!({ "message": "Customer successfully deleted" })))
}

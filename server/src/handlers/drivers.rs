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
use crate::models::{CreateDriver, Driver, DriverChanges, NewDriver, UpdateDriver};
use crate::schema::drivers;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Driver>>, ApiError> {
    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;
    let rows = drivers::table
        .filter(drivers::active.eq(true))
        .order(drivers::updated_at.desc())
        .load::<Driver>(&mut conn)
        .await?;
    Ok(Json(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateDriver>,
) -> Result<(StatusCode, Json<Driver>), ApiError> {
    let Some(name) = body.name.filter(|n| !n.is_empty()) else {
        return Err(ApiError::bad_request("Driver name is required"));
    };

    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;
    let row = diesel::insert_into(drivers::table)
        .values(&NewDriver {
            name,
            phone: body.phone,
            image_url: body.image_url,
            active: Some(true),
        })
        .get_result::<Driver>(&mut conn)
        .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Driver>, ApiError> {
    let id = parse_id(&id, "driver")?;
    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;
    let row = active_driver(&mut conn, id).await?;
    Ok(Json(row))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateDriver>,
) -> Result<Json<Driver>, ApiError> {
    let id = parse_id(&id, "driver")?;
    let Some(name) = body.name.clone().filter(|n| !n.is_empty()) else {
        return Err(ApiError::bad_request("Driver name is required"));
    };

    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;
    let existing = active_driver(&mut conn, id).await?;
    let changes = merge_driver(&existing, name, body);

    let updated = diesel::update(drivers::table.find(id))
        .set(&changes)
        .get_result::<Driver>(&mut conn)
        .await?;

    Ok(Json(updated))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "driver")?;
    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;
    active_driver(&mut conn, id).await?;

    diesel::update(drivers::table.find(id))
        .set((
            drivers::active.eq(false),
            drivers::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .await?;

    Ok(Json(json!({ "message": "Driver deleted successfully" })))
}

/// Drivers behave as if soft-deleted rows were gone: every by-id
/// operation 404s unless the row exists and is active.
async fn active_driver(
    conn: &mut diesel_async::AsyncPgConnection,
    id: i32,
) -> Result<Driver, ApiError> {
    let row = drivers::table
        .find(id)
        .first::<Driver>(conn)
        .await
        .optional()?;
    row.filter(|d| d.active.unwrap_or(false))
        .ok_or_else(|| ApiError::not_found("Driver not found"))
}

fn merge_driver(existing: &Driver, name: String, upd: UpdateDriver) -> DriverChanges {
    DriverChanges {
        name,
        phone: upd.phone.unwrap_or_else(|| existing.phone.clone()),
        image_url: upd.image_url.unwrap_or_else(|| existing.image_url.clone()),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn existing() -> Driver {
        Driver {
            id: 5,
            name: "Prasert".to_string(),
            phone: Some("081-000-0000".to_string()),
            active: Some(true),
            image_url: Some("https://img.example/p.jpg".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn merge_keeps_absent_fields() {
        let upd: UpdateDriver = serde_json::from_str(r#"{"name": "Prasert J."}"#).unwrap();
        let name = upd.name.clone().unwrap();
        let changes = merge_driver(&existing(), name, upd);
        assert_eq!(changes.name, "Prasert J.");
        assert_eq!(changes.phone.as_deref(), Some("081-000-0000"));
        assert_eq!(changes.image_url.as_deref(), Some("https://img.example/p.jpg"));
    }

    #[test]
    fn merge_clears_on_explicit_null() {
        let upd: UpdateDriver =
            serde_json::from_str(r#"{"name": "Prasert", "imageUrl": null}"#).unwrap();
        let name = upd.name.clone().unwrap();
        let changes = merge_driver(&existing(), name, upd);
        assert_eq!(changes.image_url, None);
        assert_eq!(changes.phone.as_deref(), Some("081-000-0000"));
    }
}

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
use crate::models::{CreateVehicle, NewVehicle, UpdateVehicle, Vehicle, VehicleChanges};
use crate::schema::vehicles;

// Vehicle responses are wrapped ({"vehicle": ...} / {"vehicles": ...}),
// unlike the other resources. The admin UI depends on the shape.

pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;
    let rows = vehicles::table
        .filter(vehicles::active.eq(true))
        .load::<Vehicle>(&mut conn)
        .await?;
    Ok(Json(json!({ "vehicles": rows })))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateVehicle>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(license_plate), Some(brand), Some(vehicle_type)) = (
        body.license_plate.filter(|v| !v.is_empty()),
        body.brand.filter(|v| !v.is_empty()),
        body.vehicle_type.filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;
    let row = diesel::insert_into(vehicles::table)
        .values(&NewVehicle {
            license_plate,
            brand,
            vehicle_type,
            model: body.model,
            variant: body.variant,
            image_url: body.image_url,
            active: Some(true),
        })
        .get_result::<Vehicle>(&mut conn)
        .await
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => ApiError::conflict("License plate already exists"),
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(json!({ "vehicle": row }))))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "vehicle")?;
    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;

    let row = vehicles::table
        .find(id)
        .first::<Vehicle>(&mut conn)
        .await
        .optional()?;

    row.map(|v| Json(json!({ "vehicle": v })))
        .ok_or_else(|| ApiError::not_found("Vehicle not found"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateVehicle>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "vehicle")?;
    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;

    let existing = vehicles::table
        .find(id)
        .first::<Vehicle>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("Vehicle not found"))?;

    let changes = merge_vehicle(&existing, body);
    let updated = diesel::update(vehicles::table.find(id))
        .set(&changes)
        .get_result::<Vehicle>(&mut conn)
        .await?;

    Ok(Json(json!({ "vehicle": updated })))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "vehicle")?;
    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;

    let deleted = diesel::update(vehicles::table.find(id))
        .set((
            vehicles::active.eq(false),
            vehicles::updated_at.eq(Utc::now()),
        ))
        .get_result::<Vehicle>(&mut conn)
        .await
        .optional()?;

    if deleted.is_none() {
        return Err(ApiError::not_found("Vehicle not found"));
    }

    Ok(Json(json!({ "success": true })))
}

/// A PUT without an `active` field reactivates the vehicle; the edit
/// dialog relies on that to restore soft-deleted rows. Model and
/// variant are never touched by updates.
fn merge_vehicle(existing: &Vehicle, upd: UpdateVehicle) -> VehicleChanges {
    VehicleChanges {
        license_plate: upd
            .license_plate
            .unwrap_or_else(|| existing.license_plate.clone()),
        brand: upd.brand.unwrap_or_else(|| existing.brand.clone()),
        vehicle_type: upd
            .vehicle_type
            .unwrap_or_else(|| existing.vehicle_type.clone()),
        image_url: upd.image_url.unwrap_or_else(|| existing.image_url.clone()),
        active: Some(upd.active.unwrap_or(true)),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn existing() -> Vehicle {
        Vehicle {
            id: 3,
            license_plate: "2ขค 5678".to_string(),
            brand: "Isuzu".to_string(),
            vehicle_type: "pickup".to_string(),
            model: Some("D-Max".to_string()),
            variant: Some("4x4".to_string()),
            active: Some(false),
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn merge_defaults_active_to_true() {
        let upd: UpdateVehicle = serde_json::from_str(r#"{"brand": "Toyota"}"#).unwrap();
        let changes = merge_vehicle(&existing(), upd);
        assert_eq!(changes.brand, "Toyota");
        assert_eq!(changes.active, Some(true));
        assert_eq!(changes.license_plate, "2ขค 5678");
    }

    #[test]
    fn merge_respects_explicit_active() {
        let upd: UpdateVehicle = serde_json::from_str(r#"{"active": false}"#).unwrap();
        let changes = merge_vehicle(&existing(), upd);
        assert_eq!(changes.active, Some(false));
    }

    #[test]
    fn merge_renames_type_key() {
        let upd: UpdateVehicle = serde_json::from_str(r#"{"type": "van"}"#).unwrap();
        let changes = merge_vehicle(&existing(), upd);
        assert_eq!(changes.vehicle_type, "van");
    }
}

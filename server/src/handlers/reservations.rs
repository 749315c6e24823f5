use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde_json::{json, Value};

use super::parse_id;
use crate::api::AppState;
use crate::error::ApiError;
use crate::models::{
    CreateReservation, Customer, Driver, Reservation, ReservationChanges, ReservationDetail,
    UpdateReservation, Vehicle,
};
use crate::schema::{customers, drivers, reservations, vehicles};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub include_inactive: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuery {
    pub hard_delete: Option<String>,
}

// Query string flags arrive as literal "true"/"false" text.
fn flag(value: &Option<String>) -> bool {
    value.as_deref() == Some("true")
}

type JoinedRow = (
    Reservation,
    Option<Customer>,
    Option<Vehicle>,
    Option<Driver>,
);

fn into_detail(row: JoinedRow) -> ReservationDetail {
    let (reservation, customer, vehicle, driver) = row;
    ReservationDetail {
        reservation,
        customer,
        vehicle,
        driver,
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ReservationDetail>>, ApiError> {
    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;

    let mut rows = reservations::table
        .left_join(customers::table)
        .left_join(vehicles::table)
        .left_join(drivers::table)
        .order(reservations::created_at.desc())
        .select((
            reservations::all_columns,
            customers::all_columns.nullable(),
            vehicles::all_columns.nullable(),
            drivers::all_columns.nullable(),
        ))
        .into_boxed();

    if !flag(&query.include_inactive) {
        rows = rows.filter(reservations::active.eq(true));
    }

    let rows = rows.load::<JoinedRow>(&mut conn).await?;
    Ok(Json(rows.into_iter().map(into_detail).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateReservation>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    let new_reservation = body.into_new().map_err(ApiError::bad_request)?;

    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;
    let row = diesel::insert_into(reservations::table)
        .values(&new_reservation)
        .get_result::<Reservation>(&mut conn)
        .await?;

    tracing::info!("created reservation {}", row.id);
    if let Some(notifier) = &state.notifier {
        notifier.reservation_created(&row);
    }

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ReservationDetail>, ApiError> {
    let id = parse_id(&id, "reservation")?;
    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;

    let mut row = reservations::table
        .left_join(customers::table)
        .left_join(vehicles::table)
        .left_join(drivers::table)
        .filter(reservations::id.eq(id))
        .select((
            reservations::all_columns,
            customers::all_columns.nullable(),
            vehicles::all_columns.nullable(),
            drivers::all_columns.nullable(),
        ))
        .into_boxed();

    if !flag(&query.include_inactive) {
        row = row.filter(reservations::active.eq(true));
    }

    let row = row.first::<JoinedRow>(&mut conn).await.optional()?;
    row.map(into_detail)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Reservation not found"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateReservation>,
) -> Result<Json<Reservation>, ApiError> {
    let id = parse_id(&id, "reservation")?;
    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;

    let mut existing = reservations::table
        .find(id)
        .first::<Reservation>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("Reservation not found"))?;

    let status_before = existing.status.clone();
    existing
        .apply_update(body)
        .map_err(|raw| ApiError::bad_request(format!("Invalid status: {raw}")))?;

    let changes = ReservationChanges::from(&existing);
    let updated = diesel::update(reservations::table.find(id))
        .set(&changes)
        .get_result::<Reservation>(&mut conn)
        .await?;

    if updated.status != status_before {
        tracing::info!(
            "reservation {} status {} -> {}",
            id,
            status_before,
            updated.status
        );
        if let Some(notifier) = &state.notifier {
            notifier.reservation_status_changed(&updated);
        }
    }

    Ok(Json(updated))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "reservation")?;
    let mut conn = state.pool.get().await.map_err(ApiError::pool)?;

    let existing = reservations::table
        .find(id)
        .first::<Reservation>(&mut conn)
        .await
        .optional()?;
    if existing.is_none() {
        return Err(ApiError::not_found("Reservation not found"));
    }

    let message = if flag(&query.hard_delete) {
        diesel::delete(reservations::table.find(id))
            .execute(&mut conn)
            .await?;
        "Reservation permanently deleted"
    } else {
        diesel::update(reservations::table.find(id))
            .set((
                reservations::active.eq(false),
                reservations::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await?;
        "Reservation deleted successfully (soft delete)"
    };

    Ok(Json(json!({ "success": true, "message": message })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_flags_require_literal_true() {
        assert!(flag(&Some("true".to_string())));
        assert!(!flag(&Some("TRUE".to_string())));
        assert!(!flag(&Some("1".to_string())));
        assert!(!flag(&None));
    }
}

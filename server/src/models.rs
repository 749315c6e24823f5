use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle of a booking. Stored as a lowercase string in the
/// `reservations.status` column (CHECK-constrained in the migration).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        }
    }

    /// Lenient mapping for status strings coming from the admin UI.
    /// The edit dialog historically sent "success" for a confirmed
    /// booking, so that alias is accepted alongside the canonical
    /// names (case-insensitive). Anything else is rejected.
    pub fn normalize(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "pending" => Some(ReservationStatus::Pending),
            "confirmed" | "success" => Some(ReservationStatus::Confirmed),
            "cancelled" => Some(ReservationStatus::Cancelled),
            "completed" => Some(ReservationStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::customers)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub active: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::customers)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::drivers)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub active: Option<bool>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::drivers)]
pub struct NewDriver {
    pub name: String,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::vehicles)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: i32,
    pub license_plate: String,
    pub brand: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub model: Option<String>,
    pub variant: Option<String>,
    pub active: Option<bool>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::vehicles)]
pub struct NewVehicle {
    pub license_plate: String,
    pub brand: String,
    pub vehicle_type: String,
    pub model: Option<String>,
    pub variant: Option<String>,
    pub image_url: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::reservations)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: i32,
    pub customer_id: i32,
    pub reserved_by_name: String,
    pub date: NaiveDate,
    pub time_start: String,
    pub time_end: String,
    pub purpose: Option<String>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub vehicle_id: Option<i32>,
    pub driver_id: Option<i32>,
    pub passenger_count: Option<i32>,
    pub passenger_info: Option<String>,
    pub status: String,
    pub active: Option<bool>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::reservations)]
pub struct NewReservation {
    pub customer_id: i32,
    pub reserved_by_name: String,
    pub date: NaiveDate,
    pub time_start: String,
    pub time_end: String,
    pub purpose: Option<String>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub vehicle_id: Option<i32>,
    pub driver_id: Option<i32>,
    pub passenger_count: Option<i32>,
    pub passenger_info: Option<String>,
    pub status: String,
    pub active: Option<bool>,
    pub image_url: Option<String>,
}

/// A reservation row with its customer, vehicle, and driver embedded,
/// as returned by the list and detail endpoints.
#[derive(Debug, Serialize)]
pub struct ReservationDetail {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub customer: Option<Customer>,
    pub vehicle: Option<Vehicle>,
    pub driver: Option<Driver>,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = crate::schema::sessions)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::sessions)]
pub struct NewSession {
    pub id: String,
    pub user_id: String,
}

// --- Request payloads ---------------------------------------------------
//
// Required fields are deserialized as Option and checked in the handlers
// so that a missing field produces the API's own 400 JSON body rather
// than a framework rejection.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomer {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriver {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDriver {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicle {
    pub license_plate: Option<String>,
    pub brand: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
    pub model: Option<String>,
    pub variant: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicle {
    pub license_plate: Option<String>,
    pub brand: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservation {
    pub customer_id: Option<i32>,
    pub reserved_by_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    pub purpose: Option<String>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub vehicle_id: Option<i32>,
    pub driver_id: Option<i32>,
    pub passenger_count: Option<i32>,
    pub passenger_info: Option<String>,
    pub image_url: Option<String>,
}

impl CreateReservation {
    /// Checks the required fields and builds the insertable row.
    /// Returns the API's missing-fields message on failure.
    pub fn into_new(self) -> Result<NewReservation, &'static str> {
        const MISSING: &str = "Missing required fields, including customerId";
        let customer_id = self.customer_id.ok_or(MISSING)?;
        let reserved_by_name = self.reserved_by_name.filter(|s| !s.is_empty()).ok_or(MISSING)?;
        let date = self.date.ok_or(MISSING)?;
        let time_start = self.time_start.filter(|s| !s.is_empty()).ok_or(MISSING)?;
        let time_end = self.time_end.filter(|s| !s.is_empty()).ok_or(MISSING)?;

        Ok(NewReservation {
            customer_id,
            reserved_by_name,
            date,
            time_start,
            time_end,
            purpose: self.purpose,
            pickup_location: self.pickup_location,
            dropoff_location: self.dropoff_location,
            vehicle_id: self.vehicle_id,
            driver_id: self.driver_id,
            passenger_count: self.passenger_count,
            passenger_info: self.passenger_info,
            status: ReservationStatus::Pending.to_string(),
            active: Some(true),
            image_url: self.image_url,
        })
    }
}

/// Partial update for a reservation. Absent fields are left alone;
/// an explicit JSON `null` clears a nullable field (this is how a
/// vehicle or driver gets unassigned).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservation {
    pub customer_id: Option<i32>,
    pub reserved_by_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub purpose: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub pickup_location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub dropoff_location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub vehicle_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub driver_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub passenger_count: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub passenger_info: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    pub status: Option<String>,
}

impl Reservation {
    /// Merges a partial update into the row. Returns the offending
    /// string when the status is not recognized.
    pub fn apply_update(&mut self, upd: UpdateReservation) -> Result<(), String> {
        if let Some(v) = upd.customer_id {
            self.customer_id = v;
        }
        if let Some(v) = upd.reserved_by_name {
            self.reserved_by_name = v;
        }
        if let Some(v) = upd.date {
            self.date = v;
        }
        if let Some(v) = upd.time_start {
            self.time_start = v;
        }
        if let Some(v) = upd.time_end {
            self.time_end = v;
        }
        if let Some(v) = upd.purpose {
            self.purpose = v;
        }
        if let Some(v) = upd.pickup_location {
            self.pickup_location = v;
        }
        if let Some(v) = upd.dropoff_location {
            self.dropoff_location = v;
        }
        if let Some(v) = upd.vehicle_id {
            self.vehicle_id = v;
        }
        if let Some(v) = upd.driver_id {
            self.driver_id = v;
        }
        if let Some(v) = upd.passenger_count {
            self.passenger_count = v;
        }
        if let Some(v) = upd.passenger_info {
            self.passenger_info = v;
        }
        if let Some(v) = upd.image_url {
            self.image_url = v;
        }
        if let Some(raw) = upd.status {
            let status = ReservationStatus::normalize(&raw).ok_or(raw)?;
            self.status = status.to_string();
        }
        Ok(())
    }
}

/// Full-row changeset written back after a merge.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::reservations)]
#[diesel(treat_none_as_null = true)]
pub struct ReservationChanges {
    pub customer_id: i32,
    pub reserved_by_name: String,
    pub date: NaiveDate,
    pub time_start: String,
    pub time_end: String,
    pub purpose: Option<String>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub vehicle_id: Option<i32>,
    pub driver_id: Option<i32>,
    pub passenger_count: Option<i32>,
    pub passenger_info: Option<String>,
    pub status: String,
    pub image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Reservation> for ReservationChanges {
    fn from(r: &Reservation) -> Self {
        Self {
            customer_id: r.customer_id,
            reserved_by_name: r.reserved_by_name.clone(),
            date: r.date,
            time_start: r.time_start.clone(),
            time_end: r.time_end.clone(),
            purpose: r.purpose.clone(),
            pickup_location: r.pickup_location.clone(),
            dropoff_location: r.dropoff_location.clone(),
            vehicle_id: r.vehicle_id,
            driver_id: r.driver_id,
            passenger_count: r.passenger_count,
            passenger_info: r.passenger_info.clone(),
            status: r.status.clone(),
            image_url: r.image_url.clone(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::vehicles)]
#[diesel(treat_none_as_null = true)]
pub struct VehicleChanges {
    pub license_plate: String,
    pub brand: String,
    pub vehicle_type: String,
    pub image_url: Option<String>,
    pub active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::drivers)]
#[diesel(treat_none_as_null = true)]
pub struct DriverChanges {
    pub name: String,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_reservation() -> Reservation {
        Reservation {
            id: 1,
            customer_id: 7,
            reserved_by_name: "Somchai".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            time_start: "08:30".to_string(),
            time_end: "17:00".to_string(),
            purpose: Some("site visit".to_string()),
            pickup_location: None,
            dropoff_location: None,
            vehicle_id: Some(3),
            driver_id: None,
            passenger_count: Some(2),
            passenger_info: None,
            status: "pending".to_string(),
            active: Some(true),
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn status_normalize_accepts_canonical_names() {
        assert_eq!(
            ReservationStatus::normalize("pending"),
            Some(ReservationStatus::Pending)
        );
        assert_eq!(
            ReservationStatus::normalize("Completed"),
            Some(ReservationStatus::Completed)
        );
        assert_eq!(
            ReservationStatus::normalize("CANCELLED"),
            Some(ReservationStatus::Cancelled)
        );
    }

    #[test]
    fn status_normalize_maps_success_alias() {
        assert_eq!(
            ReservationStatus::normalize("success"),
            Some(ReservationStatus::Confirmed)
        );
    }

    #[test]
    fn status_normalize_rejects_unknown() {
        assert_eq!(ReservationStatus::normalize("approved"), None);
        assert_eq!(ReservationStatus::normalize(""), None);
    }

    #[test]
    fn create_reservation_requires_core_fields() {
        let body: CreateReservation = serde_json::from_str(
            r#"{"reservedByName": "A", "date": "2025-06-01", "timeStart": "08:00", "timeEnd": "09:00"}"#,
        )
        .unwrap();
        assert!(body.into_new().is_err());

        let body: CreateReservation = serde_json::from_str(
            r#"{"customerId": 1, "reservedByName": "A", "date": "2025-06-01", "timeStart": "08:00", "timeEnd": "09:00"}"#,
        )
        .unwrap();
        let row = body.into_new().unwrap();
        assert_eq!(row.customer_id, 1);
        assert_eq!(row.status, "pending");
        assert_eq!(row.active, Some(true));
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let upd: UpdateReservation =
            serde_json::from_str(r#"{"vehicleId": null, "driverId": 9}"#).unwrap();
        assert_eq!(upd.vehicle_id, Some(None));
        assert_eq!(upd.driver_id, Some(Some(9)));
        assert_eq!(upd.purpose, None);

        let mut row = sample_reservation();
        row.apply_update(upd).unwrap();
        assert_eq!(row.vehicle_id, None);
        assert_eq!(row.driver_id, Some(9));
        assert_eq!(row.purpose.as_deref(), Some("site visit"));
    }

    #[test]
    fn update_normalizes_status() {
        let mut row = sample_reservation();
        row.apply_update(UpdateReservation {
            status: Some("SUCCESS".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(row.status, "confirmed");
    }

    #[test]
    fn update_rejects_unknown_status() {
        let mut row = sample_reservation();
        let err = row
            .apply_update(UpdateReservation {
                status: Some("done".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err, "done");
        assert_eq!(row.status, "pending");
    }

    #[test]
    fn vehicle_serializes_with_type_key() {
        let vehicle = Vehicle {
            id: 1,
            license_plate: "1กข 1234".to_string(),
            brand: "Toyota".to_string(),
            vehicle_type: "sedan".to_string(),
            model: Some("Altis".to_string()),
            variant: None,
            active: Some(true),
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(json["type"], "sedan");
        assert_eq!(json["licensePlate"], "1กข 1234");
        assert!(json.get("vehicleType").is_none());
    }
}

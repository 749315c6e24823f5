diesel::table! {
    customers (id) {
        id -> Int4,
        #[max_length = 100]
        name -> Varchar,
        #[max_length = 20]
        phone -> Varchar,
        active -> Nullable<Bool>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    drivers (id) {
        id -> Int4,
        #[max_length = 100]
        name -> Varchar,
        #[max_length = 20]
        phone -> Nullable<Varchar>,
        active -> Nullable<Bool>,
        #[max_length = 255]
        image_url -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    vehicles (id) {
        id -> Int4,
        #[max_length = 20]
        license_plate -> Varchar,
        #[max_length = 50]
        brand -> Varchar,
        #[sql_name = "type"]
        #[max_length = 50]
        vehicle_type -> Varchar,
        #[max_length = 50]
        model -> Nullable<Varchar>,
        #[max_length = 50]
        variant -> Nullable<Varchar>,
        active -> Nullable<Bool>,
        #[max_length = 255]
        image_url -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    reservations (id) {
        id -> Int4,
        customer_id -> Int4,
        #[max_length = 100]
        reserved_by_name -> Varchar,
        date -> Date,
        #[max_length = 10]
        time_start -> Varchar,
        #[max_length = 10]
        time_end -> Varchar,
        purpose -> Nullable<Text>,
        pickup_location -> Nullable<Text>,
        dropoff_location -> Nullable<Text>,
        vehicle_id -> Nullable<Int4>,
        driver_id -> Nullable<Int4>,
        passenger_count -> Nullable<Int4>,
        passenger_info -> Nullable<Text>,
        status -> Varchar,
        active -> Nullable<Bool>,
        #[max_length = 255]
        image_url -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    users (id) {
        #[max_length = 255]
        id -> Varchar,
        #[max_length = 255]
        email -> Varchar,
        #[max_length = 255]
        password -> Varchar,
        role -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    sessions (id) {
        #[max_length = 255]
        id -> Varchar,
        #[max_length = 255]
        user_id -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(reservations -> customers (customer_id));
diesel::joinable!(reservations -> vehicles (vehicle_id));
diesel::joinable!(reservations -> drivers (driver_id));

diesel::allow_tables_to_appear_in_same_query!(
    customers,
    drivers,
    vehicles,
    reservations,
    users,
    sessions,
);

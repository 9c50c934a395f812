use axum::{
    extract::{Query, State},
    response::Json,
    Extension,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::Collection;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::attendance::{AttendanceQuery, AttendanceRecord, CreateAttendanceRecord};
use crate::models::child::{Child, CreateChild};
use crate::models::kindergarten::{CreateKindergarten, Kindergarten};
use crate::models::payment::{CreatePayment, Payment};
use crate::models::staff::{CreateStaffMember, StaffMember};
use crate::models::user::{Claims, User};
use crate::state::AppState;

/// The kindergarten every owner-dashboard query is scoped to.
pub async fn owner_kindergarten_id(state: &AppState, claims: &Claims) -> Result<ObjectId> {
    let user_id = ObjectId::parse_str(&claims.sub)?;

    let users: Collection<User> = state.db.collection("users");
    let user = users
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or(AppError::AuthError)?;

    user.kindergarten_id
        .ok_or_else(|| AppError::invalid_data("No kindergarten profile yet"))
}

// Owner creates (or replaces nothing: one per account) their kindergarten
// profile and gets linked to it.
pub async fn create_my_kindergarten(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateKindergarten>,
) -> Result<Json<Kindergarten>> {
    payload
        .validate()
        .map_err(|e| AppError::invalid_data(e.to_string()))?;

    let user_id = ObjectId::parse_str(&claims.sub)?;
    let users: Collection<User> = state.db.collection("users");
    let user = users
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or(AppError::AuthError)?;

    if user.kindergarten_id.is_some() {
        return Err(AppError::invalid_data(
            "This account already manages a kindergarten",
        ));
    }
    if payload.max_age_months < payload.min_age_months {
        return Err(AppError::invalid_data("Age range is inverted"));
    }

    let collection: Collection<Kindergarten> = state.db.collection("kindergartens");
    let kindergarten_id = ObjectId::new();

    let kindergarten = Kindergarten {
        _id: Some(kindergarten_id),
        name: payload.name,
        description: payload.description,
        neighborhood: payload.neighborhood,
        monthly_fee: payload.monthly_fee,
        min_age_months: payload.min_age_months,
        max_age_months: payload.max_age_months,
        services: payload.services,
        has_transport: payload.has_transport,
        open_weekends: payload.open_weekends,
        capacity: payload.capacity,
        phone: payload.phone,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    collection.insert_one(&kindergarten).await?;

    let now = Utc::now();
    users
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": {
                "kindergarten_id": kindergarten_id,
                "updated_at": DateTime::from_millis(now.timestamp_millis()),
            }},
        )
        .await?;

    tracing::info!("✅ Owner {} now manages kindergarten {}", claims.email, kindergarten.name);
    Ok(Json(kindergarten))
}

pub async fn get_my_kindergarten(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Kindergarten>> {
    let kindergarten_id = owner_kindergarten_id(&state, &claims).await?;

    let collection: Collection<Kindergarten> = state.db.collection("kindergartens");
    let kindergarten = collection
        .find_one(doc! { "_id": kindergarten_id })
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    Ok(Json(kindergarten))
}

// ----- Children -----

pub async fn get_children(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Child>>> {
    let kindergarten_id = owner_kindergarten_id(&state, &claims).await?;

    let collection: Collection<Child> = state.db.collection("children");
    let cursor = collection
        .find(doc! { "kindergarten_id": kindergarten_id })
        .await?;
    let mut children: Vec<Child> = cursor.try_collect().await?;
    children.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(children))
}

pub async fn create_child(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateChild>,
) -> Result<Json<Child>> {
    payload
        .validate()
        .map_err(|e| AppError::invalid_data(e.to_string()))?;

    let kindergarten_id = owner_kindergarten_id(&state, &claims).await?;
    let collection: Collection<Child> = state.db.collection("children");

    let child = Child {
        _id: Some(ObjectId::new()),
        kindergarten_id,
        name: payload.name,
        age_months: payload.age_months,
        parent_name: payload.parent_name,
        parent_phone: payload.parent_phone,
        allergies: payload.allergies.filter(|a| !a.trim().is_empty()),
        created_at: Utc::now(),
    };

    collection.insert_one(&child).await?;
    Ok(Json(child))
}

// ----- Staff -----

pub async fn get_staff(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<StaffMember>>> {
    let kindergarten_id = owner_kindergarten_id(&state, &claims).await?;

    let collection: Collection<StaffMember> = state.db.collection("staff");
    let cursor = collection
        .find(doc! { "kindergarten_id": kindergarten_id })
        .await?;
    let mut staff: Vec<StaffMember> = cursor.try_collect().await?;
    staff.sort_by(|a, b| a.full_name.cmp(&b.full_name));

    Ok(Json(staff))
}

pub async fn create_staff_member(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateStaffMember>,
) -> Result<Json<StaffMember>> {
    payload
        .validate()
        .map_err(|e| AppError::invalid_data(e.to_string()))?;

    let kindergarten_id = owner_kindergarten_id(&state, &claims).await?;
    let collection: Collection<StaffMember> = state.db.collection("staff");

    let member = StaffMember {
        _id: Some(ObjectId::new()),
        kindergarten_id,
        full_name: payload.full_name,
        position: payload.position,
        phone: payload.phone,
        created_at: Utc::now(),
    };

    collection.insert_one(&member).await?;
    Ok(Json(member))
}

// ----- Attendance -----

pub async fn get_attendance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<AttendanceQuery>,
) -> Result<Json<Vec<AttendanceRecord>>> {
    let kindergarten_id = owner_kindergarten_id(&state, &claims).await?;

    let mut filter = doc! { "kindergarten_id": kindergarten_id };
    if let Some(date) = &query.date {
        filter.insert("date", date.as_str());
    }
    if let Some(child_id) = &query.child_id {
        filter.insert("child_id", ObjectId::parse_str(child_id)?);
    }

    let collection: Collection<AttendanceRecord> = state.db.collection("attendance");
    let cursor = collection.find(filter).await?;
    let mut records: Vec<AttendanceRecord> = cursor.try_collect().await?;
    records.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(Json(records))
}

pub async fn create_attendance_record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateAttendanceRecord>,
) -> Result<Json<AttendanceRecord>> {
    let kindergarten_id = owner_kindergarten_id(&state, &claims).await?;
    let child_id = ObjectId::parse_str(&payload.child_id)?;

    // The child must belong to this kindergarten
    let children: Collection<Child> = state.db.collection("children");
    children
        .find_one(doc! { "_id": child_id, "kindergarten_id": kindergarten_id })
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    let collection: Collection<AttendanceRecord> = state.db.collection("attendance");

    let record = AttendanceRecord {
        _id: Some(ObjectId::new()),
        kindergarten_id,
        child_id,
        date: payload.date,
        present: payload.present,
        created_at: Utc::now(),
    };

    collection.insert_one(&record).await?;
    Ok(Json(record))
}

// ----- Payments -----

pub async fn get_payments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Payment>>> {
    let kindergarten_id = owner_kindergarten_id(&state, &claims).await?;

    let collection: Collection<Payment> = state.db.collection("payments");
    let cursor = collection
        .find(doc! { "kindergarten_id": kindergarten_id })
        .await?;
    let mut payments: Vec<Payment> = cursor.try_collect().await?;
    payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(payments))
}

pub async fn create_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePayment>,
) -> Result<Json<Payment>> {
    payload
        .validate()
        .map_err(|e| AppError::invalid_data(e.to_string()))?;

    let kindergarten_id = owner_kindergarten_id(&state, &claims).await?;
    let child_id = ObjectId::parse_str(&payload.child_id)?;

    let children: Collection<Child> = state.db.collection("children");
    children
        .find_one(doc! { "_id": child_id, "kindergarten_id": kindergarten_id })
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    let collection: Collection<Payment> = state.db.collection("payments");

    let payment = Payment {
        _id: Some(ObjectId::new()),
        kindergarten_id,
        child_id,
        amount: payload.amount,
        month: payload.month,
        method: payload.method,
        created_at: Utc::now(),
    };

    collection.insert_one(&payment).await?;
    Ok(Json(payment))
}

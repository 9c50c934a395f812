use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::Collection;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::handlers::owner_dashboard::owner_kindergarten_id;
use crate::models::kindergarten::Kindergarten;
use crate::models::registration::{
    CreateRegistrationRequest, DecideRegistration, RegistrationRequest, RegistrationStatus,
};
use crate::models::user::Claims;
use crate::state::AppState;

// Parent submits an enrollment request; it starts pending. A failed insert
// is a real error, never reported as success.
pub async fn create_registration(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateRegistrationRequest>,
) -> Result<Json<RegistrationRequest>> {
    payload
        .validate()
        .map_err(|e| AppError::invalid_data(e.to_string()))?;

    let kindergarten_id = ObjectId::parse_str(&payload.kindergarten_id)?;
    let parent_id = ObjectId::parse_str(&claims.sub)?;

    let kindergartens: Collection<Kindergarten> = state.db.collection("kindergartens");
    kindergartens
        .find_one(doc! { "_id": kindergarten_id })
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    let collection: Collection<RegistrationRequest> =
        state.db.collection("registration_requests");

    let request = RegistrationRequest {
        _id: Some(ObjectId::new()),
        kindergarten_id,
        parent_id,
        parent_name: payload.parent_name,
        parent_phone: payload.parent_phone,
        parent_email: claims.email.clone(),
        child_name: payload.child_name,
        child_age_months: payload.child_age_months,
        medical_notes: payload.medical_notes.filter(|n| !n.trim().is_empty()),
        status: RegistrationStatus::Pending,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    collection.insert_one(&request).await?;
    tracing::info!("New registration request for child: {}", request.child_name);
    Ok(Json(request))
}

// Parent's own requests
pub async fn get_my_registrations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<RegistrationRequest>>> {
    let parent_id = ObjectId::parse_str(&claims.sub)?;

    let collection: Collection<RegistrationRequest> =
        state.db.collection("registration_requests");
    let cursor = collection.find(doc! { "parent_id": parent_id }).await?;
    let mut requests: Vec<RegistrationRequest> = cursor.try_collect().await?;
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(requests))
}

// Requests addressed to the owner's kindergarten
pub async fn get_owner_registrations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<RegistrationRequest>>> {
    let kindergarten_id = owner_kindergarten_id(&state, &claims).await?;

    let collection: Collection<RegistrationRequest> =
        state.db.collection("registration_requests");
    let cursor = collection
        .find(doc! { "kindergarten_id": kindergarten_id })
        .await?;
    let mut requests: Vec<RegistrationRequest> = cursor.try_collect().await?;
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(requests))
}

/// A decided request is immutable: approving or rejecting twice conflicts.
/// Returns the stored form of the new status when the transition is allowed.
fn check_decidable(
    request: &RegistrationRequest,
    status: RegistrationStatus,
    scope: Option<ObjectId>,
) -> Result<&'static str> {
    if let Some(kindergarten_id) = scope {
        if request.kindergarten_id != kindergarten_id {
            return Err(AppError::DocumentNotFound);
        }
    }

    if request.status != RegistrationStatus::Pending {
        return Err(AppError::AlreadyDecided);
    }

    match status {
        RegistrationStatus::Approved => Ok("approved"),
        RegistrationStatus::Rejected => Ok("rejected"),
        RegistrationStatus::Pending => Err(AppError::invalid_data(
            "A decision must be approved or rejected",
        )),
    }
}

async fn apply_decision(
    state: &AppState,
    request_id: ObjectId,
    status: RegistrationStatus,
    scope: Option<ObjectId>,
) -> Result<RegistrationRequest> {
    let collection: Collection<RegistrationRequest> =
        state.db.collection("registration_requests");

    let request = collection
        .find_one(doc! { "_id": request_id })
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    let status_str = check_decidable(&request, status, scope)?;

    let now = Utc::now();
    let result = collection
        .update_one(
            doc! { "_id": request_id, "status": "pending" },
            doc! { "$set": {
                "status": status_str,
                "updated_at": DateTime::from_millis(now.timestamp_millis()),
            }},
        )
        .await?;

    // A concurrent decision between the read and the update leaves nothing
    // to modify; the stored decision wins.
    if result.modified_count == 0 {
        return Err(AppError::AlreadyDecided);
    }

    Ok(RegistrationRequest {
        status,
        updated_at: now,
        ..request
    })
}

pub async fn decide_registration(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<DecideRegistration>,
) -> Result<Json<RegistrationRequest>> {
    let request_id = ObjectId::parse_str(&id)?;
    let kindergarten_id = owner_kindergarten_id(&state, &claims).await?;

    let decided = apply_decision(&state, request_id, payload.status, Some(kindergarten_id)).await?;
    Ok(Json(decided))
}

// Admin surface: every request, any kindergarten
pub async fn get_all_registrations(
    State(state): State<AppState>,
) -> Result<Json<Vec<RegistrationRequest>>> {
    let collection: Collection<RegistrationRequest> =
        state.db.collection("registration_requests");
    let cursor = collection.find(doc! {}).await?;
    let mut requests: Vec<RegistrationRequest> = cursor.try_collect().await?;
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(requests))
}

pub async fn admin_decide_registration(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<DecideRegistration>,
) -> Result<Json<RegistrationRequest>> {
    let request_id = ObjectId::parse_str(&id)?;
    let decided = apply_decision(&state, request_id, payload.status, None).await?;
    Ok(Json(decided))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(status: RegistrationStatus, kindergarten_id: ObjectId) -> RegistrationRequest {
        RegistrationRequest {
            _id: Some(ObjectId::new()),
            kindergarten_id,
            parent_id: ObjectId::new(),
            parent_name: "Amina B.".to_string(),
            parent_phone: "0550 00 00 00".to_string(),
            parent_email: "amina@test.com".to_string(),
            child_name: "Yanis".to_string(),
            child_age_months: 30,
            medical_notes: None,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn pending_request_accepts_one_decision() {
        let kid = ObjectId::new();
        let req = request(RegistrationStatus::Pending, kid);

        let stored = check_decidable(&req, RegistrationStatus::Approved, Some(kid)).unwrap();
        assert_eq!(stored, "approved");
    }

    #[test]
    fn decided_request_refuses_any_further_decision() {
        let kid = ObjectId::new();
        let approved = request(RegistrationStatus::Approved, kid);
        let rejected = request(RegistrationStatus::Rejected, kid);

        assert!(matches!(
            check_decidable(&approved, RegistrationStatus::Rejected, Some(kid)),
            Err(AppError::AlreadyDecided)
        ));
        assert!(matches!(
            check_decidable(&rejected, RegistrationStatus::Approved, None),
            Err(AppError::AlreadyDecided)
        ));
    }

    #[test]
    fn a_decision_cannot_be_pending() {
        let kid = ObjectId::new();
        let req = request(RegistrationStatus::Pending, kid);

        assert!(check_decidable(&req, RegistrationStatus::Pending, Some(kid)).is_err());
    }

    #[test]
    fn request_outside_the_owner_scope_is_hidden() {
        let req = request(RegistrationStatus::Pending, ObjectId::new());

        assert!(matches!(
            check_decidable(&req, RegistrationStatus::Approved, Some(ObjectId::new())),
            Err(AppError::DocumentNotFound)
        ));
    }
}

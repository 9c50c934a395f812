use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Extension,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Collection;

use crate::errors::AppError;
use crate::models::user::{Claims, Role, User};
use crate::state::AppState;

/// Role a guarded route group requires, attached as an extension by the
/// router setup.
#[derive(Debug, Clone, Copy)]
pub struct RequiredRole(pub Role);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Authorized,
    Unauthenticated,
    WrongRole,
}

/// Gatekeeping decision. `stored` is the role currently on record for the
/// user; `None` covers both a missing user and a failed lookup (fail closed).
pub fn evaluate_gate(claimed: Role, stored: Option<Role>, required: Role) -> GateOutcome {
    if claimed != required {
        return GateOutcome::WrongRole;
    }
    match stored {
        Some(role) if role == required => GateOutcome::Authorized,
        Some(_) => GateOutcome::WrongRole,
        None => GateOutcome::Unauthenticated,
    }
}

/// Decode the bearer token and stash the claims for downstream handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = headers
        .get("authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(AppError::AuthError)?;

    let decoding_key = DecodingKey::from_secret(state.config.jwt_secret.as_ref());

    let token_data = decode::<Claims>(token, &decoding_key, &Validation::new(Algorithm::HS256))
        .map_err(|_| AppError::AuthError)?;

    request.extensions_mut().insert(token_data.claims);

    Ok(next.run(request).await)
}

/// Re-check the stored role on every request, not just the claim in the
/// token, so a session that loses its role mid-visit is caught. A wrong role
/// forces a sign-out: the 403 body carries the role's login path.
pub async fn role_guard(
    State(state): State<AppState>,
    Extension(RequiredRole(required)): Extension<RequiredRole>,
    Extension(claims): Extension<Claims>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let stored = match ObjectId::parse_str(&claims.sub) {
        Ok(user_id) => {
            let users: Collection<User> = state.db.collection("users");
            match users.find_one(doc! { "_id": user_id }).await {
                Ok(user) => user.map(|u| u.role),
                Err(e) => {
                    tracing::error!("Role check failed, treating as unauthenticated: {}", e);
                    None
                }
            }
        }
        Err(_) => None,
    };

    match evaluate_gate(claims.role, stored, required) {
        GateOutcome::Authorized => Ok(next.run(request).await),
        GateOutcome::Unauthenticated => Err(AppError::AuthError),
        GateOutcome::WrongRole => Err(AppError::AccessDenied(required.login_path())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_claim_and_stored_role_is_authorized() {
        let outcome = evaluate_gate(Role::Owner, Some(Role::Owner), Role::Owner);
        assert_eq!(outcome, GateOutcome::Authorized);
    }

    #[test]
    fn non_owner_visiting_owner_dashboard_is_wrong_role() {
        let outcome = evaluate_gate(Role::Parent, Some(Role::Parent), Role::Owner);
        assert_eq!(outcome, GateOutcome::WrongRole);
    }

    #[test]
    fn stale_claim_is_caught_by_the_stored_role() {
        // Token still says owner but the stored role changed mid-visit.
        let outcome = evaluate_gate(Role::Owner, Some(Role::Parent), Role::Owner);
        assert_eq!(outcome, GateOutcome::WrongRole);
    }

    #[test]
    fn failed_role_lookup_fails_closed() {
        let outcome = evaluate_gate(Role::Admin, None, Role::Admin);
        assert_eq!(outcome, GateOutcome::Unauthenticated);
    }
}

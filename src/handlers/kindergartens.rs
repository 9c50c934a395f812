use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Collection;
use serde::Deserialize;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::filters::{apply_filters, FilterState, RangeFilter};
use crate::models::kindergarten::{CreateKindergarten, Kindergarten};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub neighborhood: Option<String>,
    /// Comma-separated list; an entry must offer every one of them.
    pub services: Option<String>,
    pub fee_min: Option<f64>,
    pub fee_max: Option<f64>,
    pub age_months: Option<i32>,
    pub has_transport: Option<bool>,
    pub open_weekends: Option<bool>,
}

impl SearchParams {
    fn into_filter_state(self) -> FilterState {
        let services = self
            .services
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let monthly_fee = match (self.fee_min, self.fee_max) {
            (None, None) => None,
            (min, max) => Some(RangeFilter {
                min: min.unwrap_or(0.0),
                max: max.unwrap_or(f64::MAX),
            }),
        };

        FilterState {
            query: self.q,
            neighborhood: self.neighborhood,
            services,
            monthly_fee,
            child_age_months: self.age_months,
            has_transport: self.has_transport,
            open_weekends: self.open_weekends,
        }
    }
}

async fn load_catalog(state: &AppState) -> Result<Vec<Kindergarten>> {
    let collection: Collection<Kindergarten> = state.db.collection("kindergartens");
    let cursor = collection.find(doc! {}).await?;
    let mut catalog: Vec<Kindergarten> = cursor.try_collect().await?;
    catalog.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(catalog)
}

// Get the full catalog
pub async fn get_kindergartens(State(state): State<AppState>) -> Result<Json<Vec<Kindergarten>>> {
    let catalog = load_catalog(&state).await?;
    Ok(Json(catalog))
}

// Filtered search over the fully loaded catalog. The catalog is small, so
// filtering is recomputed in memory on every request.
pub async fn search_kindergartens(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Kindergarten>>> {
    let catalog = load_catalog(&state).await?;
    let filters = params.into_filter_state();

    if filters.is_empty() {
        return Ok(Json(catalog));
    }

    let matched = apply_filters(&catalog, &filters);
    tracing::debug!("Search matched {} of {} kindergartens", matched.len(), catalog.len());
    Ok(Json(matched))
}

pub async fn get_kindergarten(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Kindergarten>> {
    let object_id = ObjectId::parse_str(&id)?;

    let collection: Collection<Kindergarten> = state.db.collection("kindergartens");
    let kindergarten = collection
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    Ok(Json(kindergarten))
}

// Admin-only catalog entry creation
pub async fn create_kindergarten(
    State(state): State<AppState>,
    Json(payload): Json<CreateKindergarten>,
) -> Result<Json<Kindergarten>> {
    payload
        .validate()
        .map_err(|e| AppError::invalid_data(e.to_string()))?;

    if payload.max_age_months < payload.min_age_months {
        return Err(AppError::invalid_data("Age range is inverted"));
    }

    let collection: Collection<Kindergarten> = state.db.collection("kindergartens");

    let kindergarten = Kindergarten {
        _id: Some(ObjectId::new()),
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
    tracing::info!("✅ New kindergarten listed: {}", kindergarten.name);
    Ok(Json(kindergarten))
}

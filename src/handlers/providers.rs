use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Collection;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::provider::{CreateProvider, Provider, ProviderQuery};
use crate::state::AppState;

// Pediatricians, speech therapists and clothing stores, with optional
// category/city narrowing
pub async fn get_providers(
    State(state): State<AppState>,
    Query(query): Query<ProviderQuery>,
) -> Result<Json<Vec<Provider>>> {
    let collection: Collection<Provider> = state.db.collection("providers");

    let mut filter = doc! {};
    if let Some(category) = &query.category {
        filter.insert("category", category.as_str());
    }
    if let Some(city) = &query.city {
        filter.insert("city", city.as_str());
    }

    let cursor = collection.find(filter).await?;
    let mut providers: Vec<Provider> = cursor.try_collect().await?;
    providers.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(providers))
}

// Admin-only catalog entry creation
pub async fn create_provider(
    State(state): State<AppState>,
    Json(payload): Json<CreateProvider>,
) -> Result<Json<Provider>> {
    payload
        .validate()
        .map_err(|e| AppError::invalid_data(e.to_string()))?;

    let collection: Collection<Provider> = state.db.collection("providers");

    let provider = Provider {
        _id: Some(ObjectId::new()),
        name: payload.name,
        category: payload.category,
        city: payload.city,
        address: payload.address,
        phone: payload.phone,
        description: payload.description,
        created_at: Utc::now(),
    };

    collection.insert_one(&provider).await?;
    tracing::info!("✅ New {} listed: {}", provider.category.as_str(), provider.name);
    Ok(Json(provider))
}

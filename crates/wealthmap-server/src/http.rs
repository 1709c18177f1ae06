//! HTTP endpoint handlers

use std::sync::{Arc, MutexGuard};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use wealthmap_core::{
    Address, ExpandedBookmark, GeoPoint, ListParams, OwnerDetails, Property, PropertyId,
    Repository, Sex, StoreError,
};
use wealthmap_core::{query, BookmarkId};

use crate::AppState;

type ApiError = (StatusCode, Json<serde_json::Value>);

/// Map a store error onto its HTTP status
///
/// Validation and conflict errors report their message; storage failures are
/// logged and surfaced as a generic server error without internal detail.
fn api_error(err: StoreError) -> ApiError {
    match err {
        StoreError::Validation(msg) => (StatusCode::BAD_REQUEST, Json(json!({ "message": msg }))),
        StoreError::NotFound(msg) => (StatusCode::NOT_FOUND, Json(json!({ "message": msg }))),
        StoreError::Conflict(msg) => (StatusCode::BAD_REQUEST, Json(json!({ "message": msg }))),
        StoreError::Storage(msg) => {
            tracing::error!("storage failure: {msg}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Server error" })),
            )
        }
    }
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": message })),
    )
}

fn repo(state: &AppState) -> Result<MutexGuard<'_, Repository>, ApiError> {
    state
        .repository
        .lock()
        .map_err(|_| api_error(StoreError::Storage("store mutex poisoned".to_string())))
}

// ============================================================================
// Property Endpoints
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDetailsResponse {
    pub owner_name: String,
    pub age: u32,
    pub sex: String,
    pub email: String,
    pub mobile_number: String,
    pub occupation: String,
    pub monthly_income: f64,
    pub total_wealth: f64,
    pub owner_image: String,
}

/// A property snapshot with its derived read-time fields
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResponse {
    pub id: String,
    pub name: String,
    pub address: AddressResponse,
    pub location: LocationResponse,
    pub property_image: String,
    pub owner_details: OwnerDetailsResponse,
    pub created_at: String,
    pub formatted_address: String,
    pub income_tier: String,
}

impl PropertyResponse {
    /// Build the wire form of a property, computing derived fields here at
    /// the serialization boundary
    fn from_property(p: &Property) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            address: AddressResponse {
                street: p.address.street.clone(),
                city: p.address.city.clone(),
                state: p.address.state.clone(),
                zip_code: p.address.zip_code.clone(),
            },
            location: LocationResponse {
                longitude: p.location.longitude,
                latitude: p.location.latitude,
            },
            property_image: p.property_image.clone(),
            owner_details: OwnerDetailsResponse {
                owner_name: p.owner_details.owner_name.clone(),
                age: p.owner_details.age,
                sex: p.owner_details.sex.to_string(),
                email: p.owner_details.email.clone(),
                mobile_number: p.owner_details.mobile_number.clone(),
                occupation: p.owner_details.occupation.clone(),
                monthly_income: p.owner_details.monthly_income,
                total_wealth: p.owner_details.total_wealth,
                owner_image: p.owner_details.owner_image.clone(),
            },
            created_at: p.created_at.to_rfc3339(),
            formatted_address: p.formatted_address(),
            income_tier: p.income_tier().to_string(),
        }
    }
}

/// Query parameters for listing properties
///
/// Everything arrives as optional text; the filter compiler decides what is
/// usable and what is silently ignored.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListPropertiesQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub min_income: Option<String>,
    pub max_income: Option<String>,
    pub near: Option<String>,
    pub sort: Option<String>,
}

/// Response for property listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertiesResponse {
    pub properties: Vec<PropertyResponse>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total: u64,
}

/// List properties with pagination and filtering
pub async fn list_properties(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListPropertiesQuery>,
) -> Result<Json<PropertiesResponse>, ApiError> {
    let list_params = ListParams {
        page: params.page,
        page_size: params.page_size,
        name: params.name,
        city: params.city,
        state: params.state,
        min_income: params.min_income,
        max_income: params.max_income,
        near: params.near,
        sort: params.sort,
    };
    let (filter, spec) = query::compile(&list_params).map_err(api_error)?;

    let page = repo(&state)?
        .search_properties(&filter, &spec)
        .map_err(api_error)?;

    Ok(Json(PropertiesResponse {
        properties: page.items.iter().map(PropertyResponse::from_property).collect(),
        total_pages: page.total_pages,
        current_page: page.current_page,
        total: page.total,
    }))
}

/// Get a property by ID
pub async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PropertyResponse>, ApiError> {
    let id = PropertyId::parse(&id).map_err(api_error)?;

    let property = repo(&state)?
        .get_property(id)
        .map_err(api_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, Json(json!({ "message": "Property not found" }))))?;

    Ok(Json(PropertyResponse::from_property(&property)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDetailsRequest {
    pub owner_name: String,
    pub age: u32,
    pub sex: String,
    pub email: String,
    pub mobile_number: String,
    pub occupation: String,
    pub monthly_income: f64,
    pub total_wealth: f64,
    pub owner_image: Option<String>,
}

/// Request to create a property (administration path)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    pub name: String,
    pub address: AddressRequest,
    pub location: LocationRequest,
    pub property_image: Option<String>,
    pub owner_details: OwnerDetailsRequest,
}

/// Create a property
pub async fn create_property(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePropertyRequest>,
) -> Result<(StatusCode, Json<PropertyResponse>), ApiError> {
    let sex = Sex::parse(&request.owner_details.sex).map_err(api_error)?;

    let property = Property::new(
        request.name,
        Address {
            street: request.address.street,
            city: request.address.city,
            state: request.address.state,
            zip_code: request.address.zip_code,
        },
        GeoPoint {
            longitude: request.location.longitude,
            latitude: request.location.latitude,
        },
        request.property_image,
        OwnerDetails {
            owner_name: request.owner_details.owner_name,
            age: request.owner_details.age,
            sex,
            email: request.owner_details.email,
            mobile_number: request.owner_details.mobile_number,
            occupation: request.owner_details.occupation,
            monthly_income: request.owner_details.monthly_income,
            total_wealth: request.owner_details.total_wealth,
            owner_image: request.owner_details.owner_image.unwrap_or_default(),
        },
    );

    repo(&state)?.insert_property(&property).map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(PropertyResponse::from_property(&property)),
    ))
}

/// Delete a property, cascading to its bookmarks
pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = PropertyId::parse(&id).map_err(api_error)?;

    repo(&state)?.delete_property(id).map_err(api_error)?;

    Ok(Json(json!({ "message": "Property removed successfully" })))
}

// ============================================================================
// Bookmark Endpoints
// ============================================================================

/// A bookmark expanded with its property snapshot
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkResponse {
    pub id: String,
    pub user_email: String,
    pub property: PropertyResponse,
    pub created_at: String,
}

impl BookmarkResponse {
    fn from_expanded(expanded: &ExpandedBookmark) -> Self {
        Self {
            id: expanded.bookmark.id.to_string(),
            user_email: expanded.bookmark.user_email.clone(),
            property: PropertyResponse::from_property(&expanded.property),
            created_at: expanded.bookmark.created_at.to_rfc3339(),
        }
    }
}

/// Query parameters for listing bookmarks
#[derive(Debug, Deserialize)]
pub struct ListBookmarksQuery {
    pub email: Option<String>,
}

/// List a user's bookmarks, newest first
pub async fn list_bookmarks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListBookmarksQuery>,
) -> Result<Json<Vec<BookmarkResponse>>, ApiError> {
    let email = params
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| bad_request("Email is required"))?;

    let bookmarks = repo(&state)?.list_bookmarks(&email).map_err(api_error)?;

    Ok(Json(
        bookmarks.iter().map(BookmarkResponse::from_expanded).collect(),
    ))
}

/// Request to create a bookmark
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookmarkRequest {
    pub property_id: Option<String>,
    pub user_email: Option<String>,
}

/// Bookmark a property for a user
pub async fn create_bookmark(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateBookmarkRequest>,
) -> Result<(StatusCode, Json<BookmarkResponse>), ApiError> {
    let (Some(property_id), Some(user_email)) = (request.property_id, request.user_email) else {
        return Err(bad_request("Property ID and user email are required"));
    };
    let property_id = PropertyId::parse(&property_id).map_err(api_error)?;

    let expanded = repo(&state)?
        .add_bookmark(&user_email, property_id)
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(BookmarkResponse::from_expanded(&expanded)),
    ))
}

/// Remove a bookmark
pub async fn delete_bookmark(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = BookmarkId::parse(&id).map_err(api_error)?;

    repo(&state)?.remove_bookmark(id).map_err(api_error)?;

    Ok(Json(json!({ "message": "Bookmark removed successfully" })))
}

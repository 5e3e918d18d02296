use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::venue::{NewVenue, Venue, VenueId};
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVenueRequest {
    pub name: String,
    /// Degrees, -90 to 90
    pub latitude: f64,
    /// Degrees, -180 to 180
    pub longitude: f64,
    /// Identity of the registering owner
    pub owner_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VenueResponse {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_id: String,
}

impl From<Venue> for VenueResponse {
    fn from(v: Venue) -> Self {
        Self {
            id: v.id.as_str().to_string(),
            name: v.name,
            latitude: v.latitude,
            longitude: v.longitude,
            owner_id: v.owner_id,
        }
    }
}

fn venue_list(venues: Vec<Venue>) -> Vec<VenueResponse> {
    venues.into_iter().map(VenueResponse::from).collect()
}

/// POST /venues
#[utoipa::path(
    post,
    path = "/venues",
    request_body = CreateVenueRequest,
    responses(
        (status = 201, description = "Venue registered", body = VenueResponse),
        (status = 400, description = "Blank name or coordinates out of range"),
    ),
    tag = "venues"
)]
pub async fn create_venue(
    state: web::Data<AppState>,
    body: web::Json<CreateVenueRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let venue = NewVenue {
        name: body.name,
        latitude: body.latitude,
        longitude: body.longitude,
        owner_id: body.owner_id,
    };

    let venues = state.venues.clone();
    let venue = web::block(move || venues.register_venue(venue))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(VenueResponse::from(venue)))
}

/// GET /venues
///
/// Every venue, ordered by name.
#[utoipa::path(
    get,
    path = "/venues",
    responses(
        (status = 200, description = "All venues", body = [VenueResponse]),
    ),
    tag = "venues"
)]
pub async fn list_venues(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let venues = state.venues.clone();
    let venues = web::block(move || venues.venues())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(venue_list(venues)))
}

/// GET /venues/{venue_id}
#[utoipa::path(
    get,
    path = "/venues/{venue_id}",
    params(
        ("venue_id" = String, Path, description = "Venue id"),
    ),
    responses(
        (status = 200, description = "Venue found", body = VenueResponse),
        (status = 404, description = "Venue not found"),
    ),
    tag = "venues"
)]
pub async fn get_venue(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let venue_id = VenueId::new(path.into_inner());
    let venues = state.venues.clone();
    let venue = web::block(move || venues.get_venue(&venue_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(VenueResponse::from(venue)))
}

/// GET /owners/{owner_id}/venues
#[utoipa::path(
    get,
    path = "/owners/{owner_id}/venues",
    params(
        ("owner_id" = String, Path, description = "Owner identity"),
    ),
    responses(
        (status = 200, description = "Venues of the owner", body = [VenueResponse]),
    ),
    tag = "venues"
)]
pub async fn list_owner_venues(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let owner_id = path.into_inner();
    let venues = state.venues.clone();
    let venues = web::block(move || venues.venues_for_owner(&owner_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(venue_list(venues)))
}

//! Offer endpoints
//!
//! Handlers only translate HTTP into activity calls: extract the viewer,
//! parse inputs, map errors. All rules live in the activities.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::{ImageId, OfferId, PaymentId, UserId};
use crate::domains::offers::activities;
use crate::domains::offers::data::{
    CreateOfferInput, ImageData, OfferView, PromotionInfo, PromotionPurchase, ToggleResult,
    UpdateOfferInput, Viewer,
};
use crate::domains::offers::models::{Offer, OfferFilter};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};
use crate::server::middleware::{AuthUser, ClientIp};

fn viewer(auth: &Option<Extension<AuthUser>>, ip: &Option<Extension<ClientIp>>) -> Viewer {
    match (auth, ip) {
        (Some(Extension(user)), _) => Viewer::user(user.user_id),
        (None, Some(Extension(ClientIp(addr)))) => Viewer::anonymous(addr.to_string()),
        (None, None) => Viewer::anonymous("unknown"),
    }
}

fn require_user(auth: Option<Extension<AuthUser>>) -> ApiResult<UserId> {
    auth.map(|Extension(user)| user.user_id)
        .ok_or(ApiError::Unauthorized)
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: OfferId,
}

#[derive(Debug, Deserialize)]
pub struct AddImageRequest {
    pub image_key: String,
}

#[derive(Debug, Deserialize)]
pub struct PromotionRequest {
    pub tariff: String,
}

pub async fn list_offers(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    ip: Option<Extension<ClientIp>>,
    Query(filter): Query<OfferFilter>,
) -> ApiResult<Json<Vec<OfferView>>> {
    let viewer = viewer(&auth, &ip);
    let views = activities::get_offers(Some(&filter), &viewer, &state.deps).await?;
    Ok(Json(views))
}

pub async fn get_offer(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    ip: Option<Extension<ClientIp>>,
    Path(offer_id): Path<OfferId>,
) -> ApiResult<Json<OfferView>> {
    let viewer = viewer(&auth, &ip);
    let view = activities::get_offer(offer_id, &viewer, &state.deps).await?;
    Ok(Json(view))
}

pub async fn create_offer(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(input): Json<CreateOfferInput>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let seller_id = require_user(auth)?;
    let id = activities::create_offer(input, seller_id, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn update_offer(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(offer_id): Path<OfferId>,
    Json(input): Json<UpdateOfferInput>,
) -> ApiResult<Json<Offer>> {
    let actor = require_user(auth)?;
    let offer = activities::update_offer(offer_id, input, actor, &state.deps).await?;
    Ok(Json(offer))
}

pub async fn delete_offer(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(offer_id): Path<OfferId>,
) -> ApiResult<StatusCode> {
    let actor = require_user(auth)?;
    activities::delete_offer(offer_id, actor, &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn publish_offer(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(offer_id): Path<OfferId>,
) -> ApiResult<Json<Offer>> {
    let actor = require_user(auth)?;
    let offer = activities::publish_offer(offer_id, actor, &state.deps).await?;
    Ok(Json(offer))
}

pub async fn toggle_like(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(offer_id): Path<OfferId>,
) -> ApiResult<Json<ToggleResult>> {
    let user_id = require_user(auth)?;
    let result = activities::toggle_like(user_id, offer_id, &state.deps).await?;
    Ok(Json(result))
}

pub async fn toggle_favorite(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(offer_id): Path<OfferId>,
) -> ApiResult<Json<ToggleResult>> {
    let user_id = require_user(auth)?;
    let result = activities::toggle_favorite(user_id, offer_id, &state.deps).await?;
    Ok(Json(result))
}

pub async fn add_image(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(offer_id): Path<OfferId>,
    Json(body): Json<AddImageRequest>,
) -> ApiResult<(StatusCode, Json<ImageData>)> {
    let actor = require_user(auth)?;
    let image = activities::add_offer_image(offer_id, &body.image_key, actor, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

pub async fn delete_image(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(image_id): Path<ImageId>,
) -> ApiResult<StatusCode> {
    let actor = require_user(auth)?;
    activities::delete_offer_image(image_id, actor, &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn purchase_promotion(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(offer_id): Path<OfferId>,
    Json(body): Json<PromotionRequest>,
) -> ApiResult<Json<PromotionPurchase>> {
    let actor = require_user(auth)?;
    let purchase =
        activities::purchase_promotion(offer_id, &body.tariff, actor, &state.deps).await?;
    Ok(Json(purchase))
}

pub async fn confirm_promotion(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path((offer_id, payment_id)): Path<(OfferId, PaymentId)>,
) -> ApiResult<Json<PromotionInfo>> {
    let actor = require_user(auth)?;
    let info = activities::confirm_promotion(offer_id, payment_id, actor, &state.deps).await?;
    Ok(Json(info))
}

pub async fn my_likes(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> ApiResult<Json<Vec<OfferView>>> {
    let user_id = require_user(auth)?;
    Ok(Json(activities::liked_offers(user_id, &state.deps).await?))
}

pub async fn my_favorites(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> ApiResult<Json<Vec<OfferView>>> {
    let user_id = require_user(auth)?;
    Ok(Json(activities::favorite_offers(user_id, &state.deps).await?))
}

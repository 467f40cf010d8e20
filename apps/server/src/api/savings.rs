use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};
use nestegg_core::{
    events::NotificationEvent,
    savings::{
        AllocationRequest, Asset, AssetUpdate, HouseChoice, HouseSelection, NewAsset,
        RetirementPlan, RetirementPlanInput, RetirementProjection, SavingsOutcome,
        SavingsTarget, TargetKind, TransferRequest, UserTargets,
    },
    utils::time_utils::today,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CloseAssetBody {
    #[serde(default)]
    transfers: Vec<TransferRequest>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecalculateQuery {
    as_of: Option<NaiveDate>,
}

async fn get_targets(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<UserTargets>> {
    let targets = state.savings_service.get_user_targets(&user_id)?;
    Ok(Json(targets))
}

async fn get_target(
    Path((user_id, kind, name)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SavingsTarget>> {
    let kind: TargetKind = kind.parse()?;
    let target = state.savings_service.get_target(&user_id, kind, &name)?;
    Ok(Json(target))
}

async fn list_assets(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Asset>>> {
    let assets = state.savings_service.list_assets(&user_id)?;
    Ok(Json(assets))
}

async fn create_asset(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(new_asset): Json<NewAsset>,
) -> ApiResult<(StatusCode, Json<Asset>)> {
    let asset = state.savings_service.create_asset(&user_id, new_asset).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

async fn update_asset(
    Path((user_id, asset_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<AssetUpdate>,
) -> ApiResult<Json<Asset>> {
    let asset = state
        .savings_service
        .update_asset(&user_id, &asset_id, update)
        .await?;
    Ok(Json(asset))
}

async fn close_asset(
    Path((user_id, asset_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CloseAssetBody>,
) -> ApiResult<Json<SavingsOutcome>> {
    let outcome = state
        .savings_service
        .delete_asset_with_transfers(&user_id, &asset_id, body.transfers)
        .await?;
    Ok(Json(outcome))
}

async fn upsert_plan(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<RetirementPlanInput>,
) -> ApiResult<Json<RetirementPlan>> {
    let plan = state
        .savings_service
        .upsert_retirement_plan(&user_id, input)
        .await?;
    Ok(Json(plan))
}

async fn get_projection(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RetirementProjection>> {
    let projection = state
        .savings_service
        .calculate_retirement_projection(&user_id)?;
    Ok(Json(projection))
}

async fn select_house(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(choice): Json<HouseChoice>,
) -> ApiResult<Json<HouseSelection>> {
    let house = state.savings_service.select_house(&user_id, choice).await?;
    Ok(Json(house))
}

async fn clear_house(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<HouseSelection>> {
    let house = state.savings_service.clear_house_selection(&user_id).await?;
    Ok(Json(house))
}

async fn deposit(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<AllocationRequest>,
) -> ApiResult<Json<SavingsOutcome>> {
    let outcome = state.savings_service.deposit(&user_id, request).await?;
    Ok(Json(outcome))
}

async fn withdraw(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<AllocationRequest>,
) -> ApiResult<Json<SavingsOutcome>> {
    let outcome = state.savings_service.withdraw(&user_id, request).await?;
    Ok(Json(outcome))
}

async fn recalculate(
    Path(user_id): Path<String>,
    Query(query): Query<RecalculateQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SavingsOutcome>> {
    let as_of = query.as_of.unwrap_or_else(today);
    let outcome = state
        .savings_service
        .recalculate_all_for_user(&user_id, as_of)
        .await?;
    Ok(Json(outcome))
}

async fn list_notifications(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<NotificationEvent>>> {
    let events = state.notification_repository.list_for_user(&user_id)?;
    Ok(Json(events))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/targets", get(get_targets))
        .route("/targets/{kind}/{name}", get(get_target))
        .route("/assets", get(list_assets).post(create_asset))
        .route("/assets/{asset_id}", put(update_asset))
        .route("/assets/{asset_id}/close", post(close_asset))
        .route("/plan", put(upsert_plan))
        .route("/plan/projection", get(get_projection))
        .route("/house", put(select_house).delete(clear_house))
        .route("/deposit", post(deposit))
        .route("/withdraw", post(withdraw))
        .route("/recalculate", post(recalculate))
        .route("/notifications", get(list_notifications))
}

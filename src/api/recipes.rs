//! Recipe and production handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiResult;
use crate::domain::{Actor, RecipeFilter, RecipeInput};
use crate::infrastructure::AppState;
use crate::services::recipe_service::{self, LogProduction, ProductionFilter};

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(RecipeFilter),
    responses(
        (status = 200, description = "Recipes visible to the caller")
    )
)]
pub async fn list_recipes(
    actor: Actor,
    State(state): State<AppState>,
    Query(filter): Query<RecipeFilter>,
) -> ApiResult<impl IntoResponse> {
    let recipes = recipe_service::list_recipes(state.recipe_repo.as_ref(), &actor, filter).await?;
    Ok(Json(json!({ "recipes": recipes, "total": recipes.len() })))
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = RecipeInput,
    responses(
        (status = 201, description = "Recipe created"),
        (status = 400, description = "Invalid recipe")
    )
)]
pub async fn create_recipe(
    actor: Actor,
    State(state): State<AppState>,
    Json(payload): Json<RecipeInput>,
) -> ApiResult<impl IntoResponse> {
    let recipe = recipe_service::create_recipe(state.recipe_repo.as_ref(), &actor, payload).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe"),
        (status = 404, description = "Recipe not found")
    )
)]
pub async fn get_recipe(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        recipe_service::get_recipe(state.recipe_repo.as_ref(), &actor, id).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe id")),
    request_body = RecipeInput,
    responses(
        (status = 200, description = "Updated recipe"),
        (status = 404, description = "Recipe not found")
    )
)]
pub async fn update_recipe(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<RecipeInput>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        recipe_service::update_recipe(state.recipe_repo.as_ref(), &actor, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 404, description = "Recipe not found")
    )
)]
pub async fn delete_recipe(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    recipe_service::delete_recipe(state.recipe_repo.as_ref(), &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CostQuery {
    pub dining_unit_id: i32,
    /// Defaults to the recipe yield
    pub servings: Option<f64>,
}

/// Cost at yield, or a production plan when `servings` is given
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/cost",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe id"), CostQuery),
    responses(
        (status = 200, description = "Recipe priced against the unit's inventory", body = recipe_service::ProductionPlan)
    )
)]
pub async fn cost_recipe(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<CostQuery>,
) -> ApiResult<impl IntoResponse> {
    let repo = state.recipe_repo.as_ref();
    let plan = match query.servings {
        Some(servings) => {
            recipe_service::plan_production(
                state.db(),
                repo,
                &actor,
                id,
                query.dining_unit_id,
                servings,
            )
            .await?
        }
        None => {
            recipe_service::cost_recipe(state.db(), repo, &actor, id, query.dining_unit_id).await?
        }
    };
    Ok(Json(plan))
}

#[utoipa::path(
    post,
    path = "/api/production",
    tag = "production",
    request_body = LogProduction,
    responses(
        (status = 201, description = "Production logged"),
        (status = 409, description = "Ingredients short, nothing deducted")
    )
)]
pub async fn log_production(
    actor: Actor,
    State(state): State<AppState>,
    Json(payload): Json<LogProduction>,
) -> ApiResult<impl IntoResponse> {
    let log = recipe_service::log_production(
        state.db(),
        state.recipe_repo.as_ref(),
        &actor,
        payload,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[utoipa::path(
    get,
    path = "/api/production",
    tag = "production",
    params(ProductionFilter),
    responses(
        (status = 200, description = "Production history")
    )
)]
pub async fn list_production(
    actor: Actor,
    State(state): State<AppState>,
    Query(filter): Query<ProductionFilter>,
) -> ApiResult<impl IntoResponse> {
    let logs = recipe_service::list_production(state.db(), &actor, filter).await?;
    Ok(Json(json!({ "production": logs, "total": logs.len() })))
}

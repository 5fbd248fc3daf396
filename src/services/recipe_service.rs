//! Recipe Service - recipe maintenance, costing and production logging
//!
//! Recipe quantities are expressed in the counting unit of the matching
//! inventory item; the `unit` on a recipe line is informational.

use sea_orm::*;

use crate::domain::{
    Actor, DomainError, InventoryAction, Recipe, RecipeFilter, RecipeInput, RecipeItem,
    RecipeRepository, Role,
};
use crate::models::production_log::{self, Entity as ProductionLog};
use crate::services::inventory_service;
use crate::services::unit_service::require_active_unit;
use crate::utils::{dates, money};

/// One ingredient line of a costed recipe
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct CostLine {
    pub sku: String,
    pub item_name: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: f64,
    pub line_cost: f64,
    pub on_hand: f64,
    /// Quantity missing from stock to cover this line
    pub shortfall: f64,
}

/// Recipe scaled to a serving count and priced against one unit's inventory
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct ProductionPlan {
    pub recipe_id: i32,
    pub recipe_name: String,
    pub dining_unit_id: i32,
    pub servings: f64,
    pub lines: Vec<CostLine>,
    pub total_cost: f64,
    pub cost_per_serving: f64,
    /// SKUs the unit does not stock; they contribute zero cost
    pub missing_skus: Vec<String>,
    pub can_produce: bool,
}

#[derive(Debug, Clone, serde::Deserialize, utoipa::ToSchema)]
pub struct LogProduction {
    pub recipe_id: i32,
    pub dining_unit_id: i32,
    pub servings_prepared: f64,
    pub production_date: Option<String>,
    /// Check the ingredients out of inventory
    #[serde(default)]
    pub deduct_inventory: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Clone, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductionFilter {
    pub dining_unit_id: Option<i32>,
    pub recipe_id: Option<i32>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

/// Trim and check a recipe before it is stored
pub fn validate_recipe(input: RecipeInput) -> Result<RecipeInput, DomainError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::validation("recipe name is required"));
    }
    if !input.yield_servings.is_finite() || input.yield_servings <= 0.0 {
        return Err(DomainError::validation("yield must be greater than zero"));
    }
    if input.items.is_empty() {
        return Err(DomainError::validation("a recipe needs at least one item"));
    }

    let mut items = Vec::with_capacity(input.items.len());
    for item in input.items {
        let sku = item.sku.trim().to_string();
        if sku.is_empty() {
            return Err(DomainError::validation("every recipe item needs a sku"));
        }
        if !item.quantity.is_finite() || item.quantity <= 0.0 {
            return Err(DomainError::validation(format!(
                "quantity for {} must be greater than zero",
                sku
            )));
        }
        items.push(RecipeItem {
            sku,
            quantity: item.quantity,
            unit: item.unit.trim().to_string(),
        });
    }

    Ok(RecipeInput {
        name,
        items,
        ..input
    })
}

/// Ingredient quantities for `servings`, from a recipe written for its yield
pub fn scale_recipe(recipe: &Recipe, servings: f64) -> Vec<RecipeItem> {
    let factor = servings / recipe.yield_servings;
    recipe
        .items
        .iter()
        .map(|item| RecipeItem {
            sku: item.sku.clone(),
            quantity: item.quantity * factor,
            unit: item.unit.clone(),
        })
        .collect()
}

fn ensure_recipe_access(actor: &Actor, recipe: &Recipe) -> Result<(), DomainError> {
    match recipe.dining_unit_id {
        Some(unit_id) => actor.ensure_unit(unit_id),
        None => Ok(()),
    }
}

/// Shared recipes belong to admins; unit recipes to that unit's manager
fn ensure_recipe_owner(actor: &Actor, unit_id: Option<i32>) -> Result<(), DomainError> {
    match unit_id {
        Some(unit_id) => {
            actor.ensure_role(&[Role::Admin, Role::Manager])?;
            actor.ensure_unit(unit_id)
        }
        None => actor.ensure_role(&[Role::Admin]),
    }
}

pub async fn list_recipes(
    repo: &dyn RecipeRepository,
    actor: &Actor,
    filter: RecipeFilter,
) -> Result<Vec<Recipe>, DomainError> {
    let dining_unit_id = actor.unit_filter(filter.dining_unit_id)?;
    repo.find_all(RecipeFilter {
        dining_unit_id,
        ..filter
    })
    .await
}

pub async fn get_recipe(
    repo: &dyn RecipeRepository,
    actor: &Actor,
    id: i32,
) -> Result<Recipe, DomainError> {
    let recipe = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Recipe"))?;
    ensure_recipe_access(actor, &recipe)?;
    Ok(recipe)
}

pub async fn create_recipe(
    repo: &dyn RecipeRepository,
    actor: &Actor,
    input: RecipeInput,
) -> Result<Recipe, DomainError> {
    ensure_recipe_owner(actor, input.dining_unit_id)?;
    let recipe = repo.create(validate_recipe(input)?).await?;
    tracing::info!("{} created recipe '{}'", actor.username, recipe.name);
    Ok(recipe)
}

pub async fn update_recipe(
    repo: &dyn RecipeRepository,
    actor: &Actor,
    id: i32,
    input: RecipeInput,
) -> Result<Recipe, DomainError> {
    let existing = get_recipe(repo, actor, id).await?;
    ensure_recipe_owner(actor, existing.dining_unit_id)?;
    ensure_recipe_owner(actor, input.dining_unit_id)?;
    repo.update(id, validate_recipe(input)?).await
}

pub async fn delete_recipe(
    repo: &dyn RecipeRepository,
    actor: &Actor,
    id: i32,
) -> Result<(), DomainError> {
    let existing = get_recipe(repo, actor, id).await?;
    ensure_recipe_owner(actor, existing.dining_unit_id)?;
    repo.delete(id).await
}

async fn cost_plan<C: ConnectionTrait>(
    conn: &C,
    recipe: &Recipe,
    unit_id: i32,
    servings: f64,
) -> Result<ProductionPlan, DomainError> {
    let mut lines = Vec::with_capacity(recipe.items.len());
    let mut missing_skus = Vec::new();

    for item in scale_recipe(recipe, servings) {
        let stocked = inventory_service::item_by_sku(conn, unit_id, &item.sku).await?;
        let (item_name, unit_price, on_hand) = match &stocked {
            Some(row) => (Some(row.name.clone()), row.unit_price, row.qty_on_hand),
            None => {
                missing_skus.push(item.sku.clone());
                (None, 0.0, 0.0)
            }
        };

        lines.push(CostLine {
            line_cost: money::round_cents(item.quantity * unit_price),
            shortfall: (item.quantity - on_hand).max(0.0),
            sku: item.sku,
            item_name,
            quantity: item.quantity,
            unit: item.unit,
            unit_price,
            on_hand,
        });
    }

    let total_cost = money::round_cents(lines.iter().map(|l| l.line_cost).sum());
    let can_produce = missing_skus.is_empty() && lines.iter().all(|l| l.shortfall <= 1e-9);

    Ok(ProductionPlan {
        recipe_id: recipe.id,
        recipe_name: recipe.name.clone(),
        dining_unit_id: unit_id,
        servings,
        cost_per_serving: if servings > 0.0 {
            money::round_cents(total_cost / servings)
        } else {
            0.0
        },
        lines,
        total_cost,
        missing_skus,
        can_produce,
    })
}

/// Price a recipe at its own yield against a unit's stock
pub async fn cost_recipe(
    db: &DatabaseConnection,
    repo: &dyn RecipeRepository,
    actor: &Actor,
    recipe_id: i32,
    unit_id: i32,
) -> Result<ProductionPlan, DomainError> {
    actor.ensure_unit(unit_id)?;
    let recipe = get_recipe(repo, actor, recipe_id).await?;
    cost_plan(db, &recipe, unit_id, recipe.yield_servings).await
}

/// Scale a recipe to `servings` and price it against a unit's stock
pub async fn plan_production(
    db: &DatabaseConnection,
    repo: &dyn RecipeRepository,
    actor: &Actor,
    recipe_id: i32,
    unit_id: i32,
    servings: f64,
) -> Result<ProductionPlan, DomainError> {
    actor.ensure_unit(unit_id)?;
    if !servings.is_finite() || servings <= 0.0 {
        return Err(DomainError::validation("servings must be greater than zero"));
    }
    let recipe = get_recipe(repo, actor, recipe_id).await?;
    cost_plan(db, &recipe, unit_id, servings).await
}

/// Record a production run, optionally checking the ingredients out
pub async fn log_production(
    db: &DatabaseConnection,
    repo: &dyn RecipeRepository,
    actor: &Actor,
    request: LogProduction,
) -> Result<production_log::Model, DomainError> {
    actor.ensure_unit(request.dining_unit_id)?;
    if !request.servings_prepared.is_finite() || request.servings_prepared <= 0.0 {
        return Err(DomainError::validation(
            "servings_prepared must be greater than zero",
        ));
    }
    let production_date = dates::date_or_today(request.production_date.as_deref())?;
    let recipe = get_recipe(repo, actor, request.recipe_id).await?;

    let txn = db.begin().await?;
    require_active_unit(&txn, request.dining_unit_id).await?;
    let plan = cost_plan(&txn, &recipe, request.dining_unit_id, request.servings_prepared).await?;

    if request.deduct_inventory {
        if let Some(sku) = plan.missing_skus.first() {
            return Err(DomainError::InvalidState(format!(
                "{} is not stocked in dining unit {}",
                sku, request.dining_unit_id
            )));
        }
        let note = format!("Production: {}", recipe.name);
        for line in &plan.lines {
            inventory_service::consume(
                &txn,
                &actor.username,
                request.dining_unit_id,
                &line.sku,
                line.quantity,
                InventoryAction::CheckOut,
                production_date.clone(),
                Some(note.clone()),
            )
            .await?;
        }
    }

    let log = production_log::ActiveModel {
        recipe_id: Set(Some(recipe.id)),
        recipe_name: Set(recipe.name.clone()),
        servings_prepared: Set(request.servings_prepared),
        dining_unit_id: Set(request.dining_unit_id),
        production_date: Set(production_date),
        prepared_by: Set(actor.username.clone()),
        total_cost: Set(plan.total_cost),
        inventory_deducted: Set(request.deduct_inventory),
        notes: Set(request.notes),
        created_at: Set(dates::now_rfc3339()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    tracing::info!(
        "{} logged {} servings of '{}' at unit {}",
        actor.username,
        log.servings_prepared,
        log.recipe_name,
        log.dining_unit_id
    );
    Ok(log)
}

pub async fn list_production(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: ProductionFilter,
) -> Result<Vec<production_log::Model>, DomainError> {
    let mut condition = Condition::all();

    if let Some(unit_id) = actor.unit_filter(filter.dining_unit_id)? {
        condition = condition.add(production_log::Column::DiningUnitId.eq(unit_id));
    }
    if let Some(recipe_id) = filter.recipe_id {
        condition = condition.add(production_log::Column::RecipeId.eq(recipe_id));
    }
    if let Some(from) = filter.from_date {
        condition =
            condition.add(production_log::Column::ProductionDate.gte(dates::parse_date(&from)?));
    }
    if let Some(to) = filter.to_date {
        condition =
            condition.add(production_log::Column::ProductionDate.lte(dates::parse_date(&to)?));
    }

    Ok(ProductionLog::find()
        .filter(condition)
        .order_by_desc(production_log::Column::ProductionDate)
        .order_by_desc(production_log::Column::Id)
        .all(db)
        .await?)
}

/// Σ servings prepared by a unit in the month
pub async fn servings_for_unit<C: ConnectionTrait>(
    conn: &C,
    unit_id: i32,
    month: u32,
    year: i32,
) -> Result<f64, DomainError> {
    let (start, end) = dates::month_bounds(month, year)?;
    let logs = ProductionLog::find()
        .filter(production_log::Column::DiningUnitId.eq(unit_id))
        .filter(production_log::Column::ProductionDate.gte(start))
        .filter(production_log::Column::ProductionDate.lt(end))
        .all(conn)
        .await?;
    Ok(logs.iter().map(|l| l.servings_prepared).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chili() -> Recipe {
        Recipe {
            id: 1,
            name: "Chili".to_string(),
            yield_servings: 50.0,
            dining_unit_id: None,
            items: vec![
                RecipeItem {
                    sku: "BEEF-80".to_string(),
                    quantity: 10.0,
                    unit: "lb".to_string(),
                },
                RecipeItem {
                    sku: "BEAN-KID".to_string(),
                    quantity: 2.0,
                    unit: "can".to_string(),
                },
            ],
            notes: None,
        }
    }

    #[test]
    fn scaling_is_proportional_to_yield() {
        let scaled = scale_recipe(&chili(), 125.0);
        assert_eq!(scaled[0].quantity, 25.0);
        assert_eq!(scaled[1].quantity, 5.0);
        assert_eq!(scaled[1].unit, "can");
    }

    #[test]
    fn validation_trims_and_rejects() {
        let input = RecipeInput {
            name: "  Chili ".to_string(),
            yield_servings: 50.0,
            dining_unit_id: Some(2),
            items: vec![RecipeItem {
                sku: " BEEF-80 ".to_string(),
                quantity: 10.0,
                unit: "lb".to_string(),
            }],
            notes: None,
        };
        let clean = validate_recipe(input.clone()).unwrap();
        assert_eq!(clean.name, "Chili");
        assert_eq!(clean.items[0].sku, "BEEF-80");

        let zero_yield = RecipeInput {
            yield_servings: 0.0,
            ..input.clone()
        };
        assert!(validate_recipe(zero_yield).is_err());

        let no_items = RecipeInput {
            items: vec![],
            ..input
        };
        assert!(validate_recipe(no_items).is_err());
    }

    #[test]
    fn shared_recipes_are_admin_only() {
        let manager = Actor::new("mgr", Role::Manager, Some(2));
        assert!(ensure_recipe_owner(&manager, Some(2)).is_ok());
        assert!(ensure_recipe_owner(&manager, Some(3)).is_err());
        assert!(ensure_recipe_owner(&manager, None).is_err());
        let admin = Actor::new("root", Role::Admin, None);
        assert!(ensure_recipe_owner(&admin, None).is_ok());
    }
}

//! Request bodies for creating and updating recipes, their validation, and the
//! association writes they share.

use crate::error::ApiError;
use crate::models::{NewRecipeIngredient, NewRecipeTag};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, tags};
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use foodgram_core::DomainError;
use serde::Deserialize;
use std::collections::HashSet;
use utoipa::ToSchema;

pub const MAX_NAME_LEN: usize = 200;
/// Largest value a NUMERIC(10, 2) column holds without overflow.
pub const MAX_AMOUNT: i64 = 99_999_999;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientAmount {
    /// Ingredient ID
    pub id: i32,
    pub amount: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    /// Tag IDs
    pub tags: Vec<i32>,
    pub ingredients: Vec<IngredientAmount>,
    pub name: String,
    /// Image reference, stored as given
    pub image: String,
    pub text: String,
    /// Minutes, at least 1
    pub cooking_time: i32,
}

/// Partial update. `tags` and `ingredients`, when present, replace the
/// recipe's current sets entirely.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
}

fn validate_tags(ids: &[i32]) -> Result<(), DomainError> {
    if ids.is_empty() {
        return Err(DomainError::validation("At least one tag is required"));
    }
    let mut seen = HashSet::new();
    if !ids.iter().all(|id| seen.insert(*id)) {
        return Err(DomainError::validation("Tags must not repeat"));
    }
    Ok(())
}

fn validate_ingredients(items: &[IngredientAmount]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::validation("At least one ingredient is required"));
    }
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.id) {
            return Err(DomainError::validation("Ingredients must not repeat"));
        }
        if !(1..=MAX_AMOUNT).contains(&item.amount) {
            return Err(DomainError::validation(format!(
                "Ingredient amount must be between 1 and {MAX_AMOUNT}"
            )));
        }
    }
    Ok(())
}

fn validate_cooking_time(minutes: i32) -> Result<(), DomainError> {
    if minutes < 1 {
        return Err(DomainError::validation("cooking_time must be at least 1"));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "name must be 1 to {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_non_empty(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

impl CreateRecipeRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_tags(&self.tags)?;
        validate_ingredients(&self.ingredients)?;
        validate_name(&self.name)?;
        validate_non_empty("text", &self.text)?;
        validate_non_empty("image", &self.image)?;
        validate_cooking_time(self.cooking_time)
    }
}

impl UpdateRecipeRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(tags) = &self.tags {
            validate_tags(tags)?;
        }
        if let Some(ingredients) = &self.ingredients {
            validate_ingredients(ingredients)?;
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(text) = &self.text {
            validate_non_empty("text", text)?;
        }
        if let Some(image) = &self.image {
            validate_non_empty("image", image)?;
        }
        if let Some(minutes) = self.cooking_time {
            validate_cooking_time(minutes)?;
        }
        Ok(())
    }
}

/// Replace the recipe's tags with `tag_ids`. Unknown ids are a 404.
pub fn replace_tags(conn: &mut PgConnection, recipe_id: i32, tag_ids: &[i32]) -> Result<(), ApiError> {
    let found: i64 = tags::table
        .filter(tags::id.eq_any(tag_ids))
        .count()
        .get_result(conn)?;
    if found != tag_ids.len() as i64 {
        return Err(ApiError::not_found("Tag not found"));
    }

    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id))).execute(conn)?;

    let rows: Vec<NewRecipeTag> = tag_ids
        .iter()
        .map(|&tag_id| NewRecipeTag { recipe_id, tag_id })
        .collect();
    diesel::insert_into(recipe_tags::table)
        .values(&rows)
        .execute(conn)?;

    Ok(())
}

/// Replace the recipe's ingredient rows, keeping the request order. Unknown
/// ingredient ids are a 404.
pub fn replace_ingredients(
    conn: &mut PgConnection,
    recipe_id: i32,
    items: &[IngredientAmount],
) -> Result<(), ApiError> {
    let ids: Vec<i32> = items.iter().map(|i| i.id).collect();
    let found: i64 = ingredients::table
        .filter(ingredients::id.eq_any(&ids))
        .count()
        .get_result(conn)?;
    if found != ids.len() as i64 {
        return Err(ApiError::not_found("Ingredient not found"));
    }

    diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)))
        .execute(conn)?;

    let rows: Vec<NewRecipeIngredient> = items
        .iter()
        .map(|item| NewRecipeIngredient {
            recipe_id,
            ingredient_id: item.id,
            amount: BigDecimal::from(item.amount),
        })
        .collect();
    diesel::insert_into(recipe_ingredients::table)
        .values(&rows)
        .execute(conn)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateRecipeRequest {
        CreateRecipeRequest {
            tags: vec![1, 2],
            ingredients: vec![
                IngredientAmount { id: 10, amount: 200 },
                IngredientAmount { id: 11, amount: 1 },
            ],
            name: "Pancakes".to_string(),
            image: "pancakes.png".to_string(),
            text: "Mix and fry.".to_string(),
            cooking_time: 20,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_requires_tags_and_ingredients() {
        let req = CreateRecipeRequest {
            tags: vec![],
            ..request()
        };
        assert_eq!(
            req.validate(),
            Err(DomainError::validation("At least one tag is required"))
        );

        let req = CreateRecipeRequest {
            ingredients: vec![],
            ..request()
        };
        assert_eq!(
            req.validate(),
            Err(DomainError::validation("At least one ingredient is required"))
        );
    }

    #[test]
    fn test_amount_bounds() {
        for amount in [0, -3, MAX_AMOUNT + 1] {
            let req = CreateRecipeRequest {
                ingredients: vec![IngredientAmount { id: 10, amount }],
                ..request()
            };
            assert!(req.validate().is_err(), "accepted amount {amount}");
        }
    }

    #[test]
    fn test_duplicates_rejected() {
        let req = CreateRecipeRequest {
            ingredients: vec![
                IngredientAmount { id: 10, amount: 1 },
                IngredientAmount { id: 10, amount: 2 },
            ],
            ..request()
        };
        assert_eq!(
            req.validate(),
            Err(DomainError::validation("Ingredients must not repeat"))
        );

        let req = CreateRecipeRequest {
            tags: vec![3, 3],
            ..request()
        };
        assert_eq!(req.validate(), Err(DomainError::validation("Tags must not repeat")));
    }

    #[test]
    fn test_cooking_time_minimum() {
        let req = CreateRecipeRequest {
            cooking_time: 0,
            ..request()
        };
        assert!(matches!(req.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_blank_fields() {
        let req = CreateRecipeRequest {
            name: "  ".to_string(),
            ..request()
        };
        assert!(req.validate().is_err());
        let req = CreateRecipeRequest {
            text: String::new(),
            ..request()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_checks_only_present_fields() {
        assert!(UpdateRecipeRequest::default().validate().is_ok());

        let req = UpdateRecipeRequest {
            tags: Some(vec![]),
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let req = UpdateRecipeRequest {
            cooking_time: Some(5),
            name: Some("Soup".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }
}

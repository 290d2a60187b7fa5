//! Shopping list aggregation.
//!
//! Merges the ingredient rows of every recipe in a user's cart into one list
//! keyed by ingredient name. Keys are names rather than ingredient ids, so two
//! ingredient records sharing a name collapse into one line.

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::store::EntityStore;
use crate::types::UserId;

/// One recipe ingredient row joined with its ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub name: String,
    pub unit: String,
    pub amount: BigDecimal,
}

impl IngredientLine {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, amount: BigDecimal) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListEntry {
    pub name: String,
    pub total_amount: BigDecimal,
    pub unit: String,
}

/// Name-keyed totals in first-encounter order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingList {
    entries: Vec<ShoppingListEntry>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `line` to the running totals.
    ///
    /// The unit recorded for a name is the one from its first line. A later
    /// line with a different unit is summed anyway; no conversion happens.
    pub fn add(&mut self, line: IngredientLine) {
        match self.index.get(&line.name) {
            Some(&position) => {
                let entry = &mut self.entries[position];
                if entry.unit != line.unit {
                    tracing::warn!(
                        ingredient = %line.name,
                        recorded_unit = %entry.unit,
                        line_unit = %line.unit,
                        "summing ingredient amounts with mismatched units"
                    );
                }
                entry.total_amount += line.amount;
            }
            None => {
                self.index.insert(line.name.clone(), self.entries.len());
                self.entries.push(ShoppingListEntry {
                    name: line.name,
                    total_amount: line.amount,
                    unit: line.unit,
                });
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ShoppingListEntry> {
        self.index.get(name).map(|&position| &self.entries[position])
    }

    pub fn entries(&self) -> &[ShoppingListEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<IngredientLine> for ShoppingList {
    fn from_iter<I: IntoIterator<Item = IngredientLine>>(iter: I) -> Self {
        let mut list = ShoppingList::new();
        for line in iter {
            list.add(line);
        }
        list
    }
}

pub fn aggregate(lines: impl IntoIterator<Item = IngredientLine>) -> ShoppingList {
    lines.into_iter().collect()
}

/// Aggregate every ingredient reachable through `user_id`'s shopping cart.
pub fn build_shopping_list<S: EntityStore + ?Sized>(
    store: &mut S,
    user_id: UserId,
) -> Result<ShoppingList, DomainError> {
    let lines = store.cart_lines(user_id)?;
    let line_count = lines.len();
    let list = aggregate(lines);

    tracing::debug!(
        user_id,
        lines = line_count,
        entries = list.len(),
        "built shopping list"
    );

    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_empty() {
        let list = aggregate(Vec::new());
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_sums_same_name_exactly() {
        let list = aggregate(vec![
            IngredientLine::new("flour", "g", dec("200")),
            IngredientLine::new("flour", "g", dec("150")),
        ]);
        assert_eq!(list.len(), 1);
        let flour = list.get("flour").unwrap();
        assert_eq!(flour.total_amount, dec("350"));
        assert_eq!(flour.unit, "g");
    }

    #[test]
    fn test_decimal_sum_has_no_float_drift() {
        let list = aggregate((0..10).map(|_| IngredientLine::new("salt", "g", dec("1.10"))));
        assert_eq!(list.get("salt").unwrap().total_amount, dec("11.00"));
    }

    #[test]
    fn test_first_encounter_order() {
        let list = aggregate(vec![
            IngredientLine::new("sugar", "g", dec("10")),
            IngredientLine::new("eggs", "pcs", dec("2")),
            IngredientLine::new("sugar", "g", dec("5")),
            IngredientLine::new("butter", "g", dec("50")),
        ]);
        let names: Vec<&str> = list.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["sugar", "eggs", "butter"]);
        assert_eq!(list.get("sugar").unwrap().total_amount, dec("15"));
    }

    #[test]
    fn test_unit_mismatch_keeps_first_unit() {
        // Same name, different units: summed without conversion.
        let list = aggregate(vec![
            IngredientLine::new("milk", "ml", dec("200")),
            IngredientLine::new("milk", "cup", dec("1")),
        ]);
        let milk = list.get("milk").unwrap();
        assert_eq!(milk.unit, "ml");
        assert_eq!(milk.total_amount, dec("201"));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let list = aggregate(vec![
            IngredientLine::new("Flour", "g", dec("1")),
            IngredientLine::new("flour", "g", dec("1")),
        ]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_serializes_entries_only() {
        let list = aggregate(vec![IngredientLine::new("rice", "g", dec("300"))]);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["entries"][0]["name"], "rice");
        assert!(json.get("index").is_none());
    }
}

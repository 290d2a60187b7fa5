//! Plain-text rendering of an aggregated shopping list.

use crate::shopping_list::ShoppingList;

/// Filename offered in the download's `Content-Disposition` header.
pub const SHOPPING_LIST_FILENAME: &str = "ShoppingCart.txt";

/// Render one `name: amount unit` line per entry, in list order.
pub fn render_text(list: &ShoppingList) -> String {
    list.entries()
        .iter()
        .map(|entry| format!("{}: {} {}", entry.name, entry.total_amount, entry.unit))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopping_list::{aggregate, IngredientLine};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    #[test]
    fn test_render_empty() {
        assert_eq!(render_text(&ShoppingList::new()), "");
    }

    #[test]
    fn test_render_lines_in_order() {
        let list = aggregate(vec![
            IngredientLine::new("flour", "g", BigDecimal::from_str("200").unwrap()),
            IngredientLine::new("eggs", "pcs", BigDecimal::from_str("3").unwrap()),
            IngredientLine::new("flour", "g", BigDecimal::from_str("150").unwrap()),
        ]);
        assert_eq!(render_text(&list), "flour: 350 g\neggs: 3 pcs");
    }
}

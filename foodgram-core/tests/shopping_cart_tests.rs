//! Cart-to-shopping-list flow: markers, aggregation and text export.

use bigdecimal::BigDecimal;
use foodgram_core::{
    add_marker, build_shopping_list, remove_marker, render_text, DomainError, MarkerRelation,
    MemoryStore,
};
use std::str::FromStr;

const USER: i32 = 1;
const AUTHOR: i32 = 2;

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn seeded() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.add_user(USER);
    store.add_recipe(10, AUTHOR, &["breakfast"]);
    store.add_ingredient(10, "flour", "g", dec("200.00"));
    store.add_ingredient(10, "milk", "ml", dec("250.00"));
    store.add_recipe(20, AUTHOR, &["dinner"]);
    store.add_ingredient(20, "eggs", "pcs", dec("2.00"));
    store.add_ingredient(20, "flour", "g", dec("150.00"));
    store
}

#[test]
fn test_empty_cart_is_empty_list() {
    let mut store = seeded();
    let list = build_shopping_list(&mut store, USER).unwrap();
    assert!(list.is_empty());
    assert_eq!(render_text(&list), "");
}

#[test]
fn test_two_recipes_sum_flour() {
    let mut store = seeded();
    add_marker(&mut store, MarkerRelation::ShoppingCart, USER, 10).unwrap();
    add_marker(&mut store, MarkerRelation::ShoppingCart, USER, 20).unwrap();

    let list = build_shopping_list(&mut store, USER).unwrap();
    let flour = list.get("flour").unwrap();
    assert_eq!(flour.total_amount, dec("350"));
    assert_eq!(flour.unit, "g");

    let names: Vec<&str> = list.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["flour", "milk", "eggs"]);
    assert_eq!(
        render_text(&list),
        "flour: 350.00 g\nmilk: 250.00 ml\neggs: 2.00 pcs"
    );
}

#[test]
fn test_order_follows_cart_order() {
    let mut store = seeded();
    add_marker(&mut store, MarkerRelation::ShoppingCart, USER, 20).unwrap();
    add_marker(&mut store, MarkerRelation::ShoppingCart, USER, 10).unwrap();

    let list = build_shopping_list(&mut store, USER).unwrap();
    let names: Vec<&str> = list.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["eggs", "flour", "milk"]);
}

#[test]
fn test_removed_recipe_leaves_list() {
    let mut store = seeded();
    add_marker(&mut store, MarkerRelation::ShoppingCart, USER, 10).unwrap();
    add_marker(&mut store, MarkerRelation::ShoppingCart, USER, 20).unwrap();
    remove_marker(&mut store, MarkerRelation::ShoppingCart, USER, 10).unwrap();

    let list = build_shopping_list(&mut store, USER).unwrap();
    assert_eq!(list.get("flour").unwrap().total_amount, dec("150"));
    assert!(list.get("milk").is_none());
}

#[test]
fn test_other_users_cart_is_separate() {
    let mut store = seeded();
    store.add_user(3);
    add_marker(&mut store, MarkerRelation::ShoppingCart, 3, 10).unwrap();
    assert!(build_shopping_list(&mut store, USER).unwrap().is_empty());
    assert_eq!(build_shopping_list(&mut store, 3).unwrap().len(), 2);
}

#[test]
fn test_same_name_different_unit_is_not_reconciled() {
    let mut store = seeded();
    store.add_recipe(30, AUTHOR, &[]);
    store.add_ingredient(30, "flour", "cup", dec("1.00"));
    add_marker(&mut store, MarkerRelation::ShoppingCart, USER, 10).unwrap();
    add_marker(&mut store, MarkerRelation::ShoppingCart, USER, 30).unwrap();

    // Known gap: grams and cups are added as if they were the same unit.
    let list = build_shopping_list(&mut store, USER).unwrap();
    let flour = list.get("flour").unwrap();
    assert_eq!(flour.unit, "g");
    assert_eq!(flour.total_amount, dec("201"));
}

#[test]
fn test_adding_same_recipe_twice_conflicts() {
    let mut store = seeded();
    add_marker(&mut store, MarkerRelation::ShoppingCart, USER, 10).unwrap();
    let err = add_marker(&mut store, MarkerRelation::ShoppingCart, USER, 10).unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    let list = build_shopping_list(&mut store, USER).unwrap();
    assert_eq!(list.get("flour").unwrap().total_amount, dec("200"));
}

#[test]
fn test_storage_failure_propagates() {
    let mut store = seeded();
    store.fail_with("timeout");
    let err = build_shopping_list(&mut store, USER).unwrap_err();
    assert!(matches!(err, DomainError::Storage(_)));
}

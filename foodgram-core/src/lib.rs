pub mod error;
pub mod export;
pub mod filter;
pub mod markers;
pub mod shopping_list;
pub mod store;
pub mod types;

pub use error::{DomainError, StoreError};
pub use export::{render_text, SHOPPING_LIST_FILENAME};
pub use filter::{find_recipes, FilterScope, Page, RecipeFilter, RecipePage};
pub use markers::{add_marker, remove_marker, MarkerRelation, TargetKind};
pub use shopping_list::{aggregate, build_shopping_list, IngredientLine, ShoppingList, ShoppingListEntry};
pub use store::{EntityStore, InsertOutcome, MemoryStore};
pub use types::{RecipeId, UserId, Viewer};

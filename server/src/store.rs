//! Postgres-backed [`EntityStore`].

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use foodgram_core::{
    EntityStore, FilterScope, IngredientLine, InsertOutcome, MarkerRelation, Page, RecipePage,
    StoreError, TargetKind, UserId,
};

use crate::raw_sql::{contains_pattern, count_over};
use crate::schema::{
    favorites, ingredients, recipe_ingredients, recipe_tags, recipes, shopping_cart_entries,
    subscriptions, tags, users,
};

fn store_err(err: DieselError) -> StoreError {
    StoreError::new(err.to_string())
}

fn filtered_recipes(scope: &FilterScope) -> recipes::BoxedQuery<'_, Pg> {
    let mut query = recipes::table.into_boxed();

    if let Some(author) = scope.author {
        query = query.filter(recipes::author_id.eq(author));
    }

    if let Some(user_id) = scope.favorited_by {
        query = query.filter(
            recipes::id.eq_any(
                favorites::table
                    .filter(favorites::user_id.eq(user_id))
                    .select(favorites::recipe_id),
            ),
        );
    }

    if let Some(user_id) = scope.in_cart_of {
        query = query.filter(
            recipes::id.eq_any(
                shopping_cart_entries::table
                    .filter(shopping_cart_entries::user_id.eq(user_id))
                    .select(shopping_cart_entries::recipe_id),
            ),
        );
    }

    // Any of the requested tags. A subquery keeps recipes with several
    // matching tags from showing up twice.
    if !scope.tag_slugs.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .inner_join(tags::table)
                    .filter(tags::slug.eq_any(&scope.tag_slugs))
                    .select(recipe_tags::recipe_id),
            ),
        );
    }

    if let Some(term) = &scope.name_contains {
        query = query.filter(recipes::name.ilike(contains_pattern(term)));
    }

    query
}

/// Runs the core queries on a single borrowed connection.
pub struct PgStore<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> PgStore<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }
}

impl EntityStore for PgStore<'_> {
    fn find_recipes(&mut self, scope: &FilterScope, page: Page) -> Result<RecipePage, StoreError> {
        let rows: Vec<(i32, i64)> = filtered_recipes(scope)
            .select((recipes::id, count_over()))
            .order(recipes::id.desc())
            .limit(page.limit)
            .offset(page.offset)
            .load(self.conn)
            .map_err(store_err)?;

        // The window count rides on the returned rows, so a page past the end
        // needs its own count.
        let total = match rows.first() {
            Some((_, total)) => *total,
            None if page.offset > 0 => filtered_recipes(scope)
                .count()
                .get_result(self.conn)
                .map_err(store_err)?,
            None => 0,
        };
        let ids = rows.into_iter().map(|(id, _)| id).collect();

        Ok(RecipePage { ids, total })
    }

    fn cart_lines(&mut self, user_id: UserId) -> Result<Vec<IngredientLine>, StoreError> {
        let rows: Vec<(String, String, bigdecimal::BigDecimal)> = shopping_cart_entries::table
            .inner_join(
                recipe_ingredients::table
                    .on(recipe_ingredients::recipe_id.eq(shopping_cart_entries::recipe_id)),
            )
            .inner_join(
                ingredients::table.on(ingredients::id.eq(recipe_ingredients::ingredient_id)),
            )
            .filter(shopping_cart_entries::user_id.eq(user_id))
            .order((shopping_cart_entries::id.asc(), recipe_ingredients::id.asc()))
            .select((
                ingredients::name,
                ingredients::measurement_unit,
                recipe_ingredients::amount,
            ))
            .load(self.conn)
            .map_err(store_err)?;

        Ok(rows
            .into_iter()
            .map(|(name, unit, amount)| IngredientLine::new(name, unit, amount))
            .collect())
    }

    fn target_exists(&mut self, kind: TargetKind, id: i32) -> Result<bool, StoreError> {
        let exists = match kind {
            TargetKind::Recipe => diesel::select(diesel::dsl::exists(
                recipes::table.filter(recipes::id.eq(id)),
            ))
            .get_result(self.conn),
            TargetKind::User => diesel::select(diesel::dsl::exists(
                users::table.filter(users::id.eq(id)),
            ))
            .get_result(self.conn),
        };
        exists.map_err(store_err)
    }

    fn insert_marker(
        &mut self,
        relation: MarkerRelation,
        actor: UserId,
        target: i32,
    ) -> Result<InsertOutcome, StoreError> {
        // ON CONFLICT DO NOTHING leans on the unique constraint, so two racing
        // inserts cannot both report success. A foreign key violation means the
        // target was deleted after the existence check.
        let inserted = match relation {
            MarkerRelation::Favorite => diesel::insert_into(favorites::table)
                .values((favorites::user_id.eq(actor), favorites::recipe_id.eq(target)))
                .on_conflict_do_nothing()
                .execute(self.conn),
            MarkerRelation::ShoppingCart => diesel::insert_into(shopping_cart_entries::table)
                .values((
                    shopping_cart_entries::user_id.eq(actor),
                    shopping_cart_entries::recipe_id.eq(target),
                ))
                .on_conflict_do_nothing()
                .execute(self.conn),
            MarkerRelation::Subscription => diesel::insert_into(subscriptions::table)
                .values((
                    subscriptions::subscriber_id.eq(actor),
                    subscriptions::target_id.eq(target),
                ))
                .on_conflict_do_nothing()
                .execute(self.conn),
        };

        match inserted {
            Ok(0) => Ok(InsertOutcome::AlreadyExists),
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
                Ok(InsertOutcome::TargetMissing)
            }
            Err(e) => Err(store_err(e)),
        }
    }

    fn delete_marker(
        &mut self,
        relation: MarkerRelation,
        actor: UserId,
        target: i32,
    ) -> Result<bool, StoreError> {
        let deleted = match relation {
            MarkerRelation::Favorite => diesel::delete(
                favorites::table
                    .filter(favorites::user_id.eq(actor))
                    .filter(favorites::recipe_id.eq(target)),
            )
            .execute(self.conn),
            MarkerRelation::ShoppingCart => diesel::delete(
                shopping_cart_entries::table
                    .filter(shopping_cart_entries::user_id.eq(actor))
                    .filter(shopping_cart_entries::recipe_id.eq(target)),
            )
            .execute(self.conn),
            MarkerRelation::Subscription => diesel::delete(
                subscriptions::table
                    .filter(subscriptions::subscriber_id.eq(actor))
                    .filter(subscriptions::target_id.eq(target)),
            )
            .execute(self.conn),
        }
        .map_err(store_err)?;

        Ok(deleted > 0)
    }
}

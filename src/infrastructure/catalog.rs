use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogLookup;
use crate::domain::pricing::DishRef;
use crate::schema::dishes;

use super::models::DishRow;

/// Reads current dish prices straight from the `dishes` table.
pub struct DieselCatalog {
    pool: DbPool,
}

impl DieselCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogLookup for DieselCatalog {
    fn find_dish(&self, dish_id: i32) -> Result<Option<DishRef>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = dishes::table
            .find(dish_id)
            .select(DishRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(DishRef::from))
    }
}

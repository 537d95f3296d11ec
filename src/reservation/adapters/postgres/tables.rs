//! `PostgreSQL` table-catalog store.

use super::{
    models::{TableRow, row_to_table, table_to_row},
    schema::dining_tables,
    ReservationPgPool,
};
use crate::reservation::{
    domain::{Table, TableId, TableNumber},
    ports::{StoreError, StoreResult, TableStore},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed table store.
#[derive(Debug, Clone)]
pub struct PostgresTableStore {
    pool: ReservationPgPool,
}

impl PostgresTableStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ReservationPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(StoreError::persistence)?
    }
}

#[async_trait]
impl TableStore for PostgresTableStore {
    async fn insert(&self, table: &Table) -> StoreResult<()> {
        let table_id = table.id();
        let number = table.number().clone();
        let new_row = table_to_row(table)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(dining_tables::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_number_unique_violation(info.as_ref()) =>
                    {
                        StoreError::DuplicateTableNumber(number.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        StoreError::DuplicateTable(table_id)
                    }
                    _ => StoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, table: &Table) -> StoreResult<()> {
        let table_id = table.id();
        let number = table.number().clone();
        let row = table_to_row(table)?;

        self.run_blocking(move |connection| {
            let affected = diesel::update(dining_tables::table.find(table_id.into_inner()))
                .set(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_number_unique_violation(info.as_ref()) =>
                    {
                        StoreError::DuplicateTableNumber(number.clone())
                    }
                    _ => StoreError::persistence(err),
                })?;
            if affected == 0 {
                return Err(StoreError::TableNotFound(table_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TableId) -> StoreResult<Option<Table>> {
        self.run_blocking(move |connection| {
            let row = dining_tables::table
                .find(id.into_inner())
                .select(TableRow::as_select())
                .first::<TableRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_table).transpose()
        })
        .await
    }

    async fn find_by_number(&self, number: &TableNumber) -> StoreResult<Option<Table>> {
        let label = number.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = dining_tables::table
                .filter(dining_tables::table_number.eq(label))
                .select(TableRow::as_select())
                .first::<TableRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_table).transpose()
        })
        .await
    }

    async fn list_active(&self) -> StoreResult<Vec<Table>> {
        self.run_blocking(move |connection| {
            let rows = dining_tables::table
                .filter(dining_tables::active.eq(true))
                .order(dining_tables::table_number.asc())
                .select(TableRow::as_select())
                .load::<TableRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(row_to_table).collect()
        })
        .await
    }

    async fn list_all(&self) -> StoreResult<Vec<Table>> {
        self.run_blocking(move |connection| {
            let rows = dining_tables::table
                .order(dining_tables::table_number.asc())
                .select(TableRow::as_select())
                .load::<TableRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(row_to_table).collect()
        })
        .await
    }

    async fn delete(&self, id: TableId) -> StoreResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(dining_tables::table.find(id.into_inner()))
                .execute(connection)
                .map_err(StoreError::persistence)?;
            if affected == 0 {
                return Err(StoreError::TableNotFound(id));
            }
            Ok(())
        })
        .await
    }
}

fn is_number_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "idx_dining_tables_number_unique")
}

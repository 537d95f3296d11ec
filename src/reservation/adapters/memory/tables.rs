//! In-memory table-catalog store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::reservation::{
    domain::{Table, TableId, TableNumber},
    ports::{StoreError, StoreResult, TableStore},
};

/// Thread-safe in-memory table store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTableStore {
    state: Arc<RwLock<InMemoryTableState>>,
}

#[derive(Debug, Default)]
struct InMemoryTableState {
    tables: HashMap<TableId, Table>,
    number_index: HashMap<TableNumber, TableId>,
}

impl InMemoryTableStore {
    /// Creates an empty in-memory table store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_number(mut tables: Vec<Table>) -> Vec<Table> {
    tables.sort_by(|a, b| a.number().as_str().cmp(b.number().as_str()));
    tables
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn insert(&self, table: &Table) -> StoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        if state.tables.contains_key(&table.id()) {
            return Err(StoreError::DuplicateTable(table.id()));
        }
        if state.number_index.contains_key(table.number()) {
            return Err(StoreError::DuplicateTableNumber(table.number().clone()));
        }
        state.number_index.insert(table.number().clone(), table.id());
        state.tables.insert(table.id(), table.clone());
        Ok(())
    }

    async fn update(&self, table: &Table) -> StoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let previous = state
            .tables
            .get(&table.id())
            .ok_or(StoreError::TableNotFound(table.id()))?
            .clone();
        let number_taken = state
            .number_index
            .get(table.number())
            .is_some_and(|owner| *owner != table.id());
        if number_taken {
            return Err(StoreError::DuplicateTableNumber(table.number().clone()));
        }
        state.number_index.remove(previous.number());
        state.number_index.insert(table.number().clone(), table.id());
        state.tables.insert(table.id(), table.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TableId) -> StoreResult<Option<Table>> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(state.tables.get(&id).cloned())
    }

    async fn find_by_number(&self, number: &TableNumber) -> StoreResult<Option<Table>> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let table = state
            .number_index
            .get(number)
            .and_then(|id| state.tables.get(id))
            .cloned();
        Ok(table)
    }

    async fn list_active(&self) -> StoreResult<Vec<Table>> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let active = state
            .tables
            .values()
            .filter(|table| table.is_active())
            .cloned()
            .collect();
        Ok(sorted_by_number(active))
    }

    async fn list_all(&self) -> StoreResult<Vec<Table>> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(sorted_by_number(state.tables.values().cloned().collect()))
    }

    async fn delete(&self, id: TableId) -> StoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let removed = state.tables.remove(&id).ok_or(StoreError::TableNotFound(id))?;
        state.number_index.remove(removed.number());
        Ok(())
    }
}

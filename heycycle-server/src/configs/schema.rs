use crate::models::{PowerStatusTable, Table};

pub struct SchemaManager {
    tables: Vec<Box<dyn Table + Send + Sync>>,
}

impl SchemaManager {
    /// Tables are created in the given order and disposed in reverse.
    pub fn new(tables: Vec<Box<dyn Table + Send + Sync>>) -> Self {
        Self { tables }
    }

    pub fn create_schema(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.create()).collect()
    }

    pub fn dispose_schema(&self) -> Vec<String> {
        self.tables.iter().rev().map(|table| table.dispose()).collect()
    }

    pub fn table_names(&self) -> Vec<&'static str> {
        self.tables.iter().map(|table| table.name()).collect()
    }
}

impl Default for SchemaManager {
    fn default() -> Self {
        SchemaManager::new(vec![Box::new(PowerStatusTable)])
    }
}

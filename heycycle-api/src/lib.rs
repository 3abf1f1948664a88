pub mod models;
pub mod restful;

//! Data models shared across the query execution layer.

pub mod datatypes;
pub mod names;
pub mod rows;
pub mod schemas;
pub mod values;

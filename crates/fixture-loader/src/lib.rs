//! # Fixture Loader
//!
//! Resolves a scenario tag to the fixture row that parameterizes it.
//!
//! - `FixtureBook` holds the sheets of a workbook as string tables
//! - `DataFixtureLoader` looks up the scenario sheet, then the chained
//!   registration sheet through the row's mass id
//! - `RANDOM` cells are replaced with fresh synthetic values when read

pub mod book;
pub mod loader;
pub mod synthetic;

pub use book::{FixtureBook, FixtureSource, SheetTable};
pub use loader::{sheets, DataFixtureLoader, RANDOM_SENTINEL};

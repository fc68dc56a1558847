mod batch;
mod database;
mod loader;

pub use batch::{compile_item_scripts, describe_script, BatchReport, ItemDescription};
pub use database::{DatabaseSource, GameDatabase};
pub use loader::load_database;

//! SeaORM migrations
//!
//! Database-agnostic migrations covering SQLite and PostgreSQL; column types
//! differ per backend where the backends disagree (uuid/timestamp columns).

use sea_orm_migration::prelude::*;

pub mod m20260820_000001_initial_schema;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260820_000001_initial_schema::Migration)]
    }
}

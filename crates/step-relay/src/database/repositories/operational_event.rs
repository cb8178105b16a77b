//! SeaORM-based OperationalEvent repository implementation
//!
//! Process-wide append-only event log, independent of attempt records.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{operational_events, prelude::OperationalEvents};
use crate::errors::RepositoryResult;
use crate::models::{EventLevel, OperationalEvent};

#[derive(Clone)]
pub struct OperationalEventSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl OperationalEventSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Append one event
    pub async fn append(
        &self,
        level: EventLevel,
        message: &str,
    ) -> RepositoryResult<OperationalEvent> {
        let active_model = operational_events::ActiveModel {
            id: Set(Uuid::new_v4()),
            level: Set(level.to_string()),
            message: Set(message.to_string()),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(&*self.connection).await?;
        Ok(Self::to_domain(model))
    }

    /// Page through events, newest first, optionally restricted to one level
    pub async fn find_paginated(
        &self,
        page: u64,
        per_page: u64,
        level: Option<EventLevel>,
    ) -> RepositoryResult<(Vec<OperationalEvent>, u64)> {
        let mut query =
            OperationalEvents::find().order_by_desc(operational_events::Column::CreatedAt);
        if let Some(level) = level {
            query = query.filter(operational_events::Column::Level.eq(level.to_string()));
        }

        let paginator = query.paginate(&*self.connection, per_page.max(1));
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(Self::to_domain).collect(), total))
    }

    pub async fn count_by_level(&self, level: EventLevel) -> RepositoryResult<u64> {
        Ok(OperationalEvents::find()
            .filter(operational_events::Column::Level.eq(level.to_string()))
            .count(&*self.connection)
            .await?)
    }

    fn to_domain(model: operational_events::Model) -> OperationalEvent {
        OperationalEvent {
            id: model.id,
            level: EventLevel::from_str(&model.level).unwrap_or(EventLevel::Info),
            message: model.message,
            created_at: model.created_at,
        }
    }
}

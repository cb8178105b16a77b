//! SeaORM-based Account repository implementation

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{accounts, prelude::Accounts};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{Account, AccountCreateRequest, AccountUpdateRequest};

/// SeaORM-based repository for Account operations
#[derive(Clone)]
pub struct AccountSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl AccountSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Create a new account
    ///
    /// Auth/time token defaults are resolved by the service layer; unset
    /// numeric fields fall back to the stock submission profile.
    pub async fn create(&self, request: &AccountCreateRequest) -> RepositoryResult<Account> {
        let now = chrono::Utc::now();
        let id = Uuid::new_v4();

        let active_model = accounts::ActiveModel {
            id: Set(id),
            phone: Set(request.phone.clone()),
            password: Set(request.password.clone()),
            steps: Set(request.steps.unwrap_or(89888)),
            hour: Set(request.hour.unwrap_or(0)),
            minute: Set(request.minute.unwrap_or(5)),
            enabled: Set(request.enabled.unwrap_or(true)),
            auth_token: Set(request.auth_token.clone().unwrap_or_default()),
            time_token: Set(request.time_token.clone().unwrap_or_default()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&*self.connection).await?;
        Ok(Self::to_domain(model))
    }

    pub async fn find_by_id(&self, id: &Uuid) -> RepositoryResult<Option<Account>> {
        let model = Accounts::find_by_id(*id).one(&*self.connection).await?;
        Ok(model.map(Self::to_domain))
    }

    pub async fn find_all(&self) -> RepositoryResult<Vec<Account>> {
        let models = Accounts::find().all(&*self.connection).await?;
        Ok(models.into_iter().map(Self::to_domain).collect())
    }

    /// Apply a partial update; absent fields keep their stored value
    pub async fn update(
        &self,
        id: &Uuid,
        request: &AccountUpdateRequest,
    ) -> RepositoryResult<Account> {
        let model = Accounts::find_by_id(*id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| RepositoryError::RecordNotFound {
                table: "accounts".to_string(),
                id: id.to_string(),
            })?;

        let mut active_model: accounts::ActiveModel = model.into();
        if let Some(phone) = &request.phone {
            active_model.phone = Set(phone.clone());
        }
        if let Some(password) = &request.password {
            active_model.password = Set(password.clone());
        }
        if let Some(steps) = request.steps {
            active_model.steps = Set(steps);
        }
        if let Some(hour) = request.hour {
            active_model.hour = Set(hour);
        }
        if let Some(minute) = request.minute {
            active_model.minute = Set(minute);
        }
        if let Some(enabled) = request.enabled {
            active_model.enabled = Set(enabled);
        }
        if let Some(auth_token) = &request.auth_token {
            active_model.auth_token = Set(auth_token.clone());
        }
        if let Some(time_token) = &request.time_token {
            active_model.time_token = Set(time_token.clone());
        }
        active_model.updated_at = Set(chrono::Utc::now());

        let model = active_model.update(&*self.connection).await?;
        Ok(Self::to_domain(model))
    }

    /// Delete an account; attempt records cascade at the schema level
    pub async fn delete(&self, id: &Uuid) -> RepositoryResult<bool> {
        let result = Accounts::delete_by_id(*id).exec(&*self.connection).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> RepositoryResult<u64> {
        Ok(Accounts::find().count(&*self.connection).await?)
    }

    pub async fn count_enabled(&self) -> RepositoryResult<u64> {
        Ok(Accounts::find()
            .filter(accounts::Column::Enabled.eq(true))
            .count(&*self.connection)
            .await?)
    }

    fn to_domain(model: accounts::Model) -> Account {
        Account {
            id: model.id,
            phone: model.phone,
            password: model.password,
            steps: model.steps,
            hour: model.hour,
            minute: model.minute,
            enabled: model.enabled,
            auth_token: model.auth_token,
            time_token: model.time_token,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

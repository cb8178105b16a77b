use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub phone: String,
    pub password: String,
    pub steps: i32,
    pub hour: i32,
    pub minute: i32,
    pub enabled: bool,
    pub auth_token: String,
    pub time_token: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::submission_attempts::Entity")]
    SubmissionAttempts,
}

impl Related<super::submission_attempts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubmissionAttempts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

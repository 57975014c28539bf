use sea_orm::entity::prelude::*;

/// Append-only security event. Rows are never updated or deleted by the
/// application; `user_id` is null for events with no resolved actor
/// (e.g. a failed sign-in for an unknown username).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub ip: String,
    pub user_agent: String,
    pub device: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub metadata: Option<Json>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

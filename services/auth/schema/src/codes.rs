use sea_orm::entity::prelude::*;

/// One-time verification code scoped to (username, purpose).
/// Generation replaces any prior code for the pair; expiry is 10 minutes.
/// For signup-purpose codes the username column holds the email address.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub username: String,
    pub code: String,
    /// `signup` or `recovery`.
    pub purpose: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

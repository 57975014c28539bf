use sea_orm_migration::prelude::*;

mod m20260401_000001_create_users;
mod m20260401_000002_create_profiles;
mod m20260401_000003_create_codes;
mod m20260401_000004_create_tokens;
mod m20260401_000005_create_audit_logs;
mod m20260401_000006_create_outbox_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260401_000001_create_users::Migration),
            Box::new(m20260401_000002_create_profiles::Migration),
            Box::new(m20260401_000003_create_codes::Migration),
            Box::new(m20260401_000004_create_tokens::Migration),
            Box::new(m20260401_000005_create_audit_logs::Migration),
            Box::new(m20260401_000006_create_outbox_events::Migration),
        ]
    }
}

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}

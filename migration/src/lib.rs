pub use sea_orm_migration::prelude::*;

mod m20250910_082455_create_tasks_table;
mod m20250910_090310_create_events_table;
mod m20250910_093722_create_journal_entries_table;
mod m20250921_141205_add_recurrence_group_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250910_082455_create_tasks_table::Migration),
            Box::new(m20250910_090310_create_events_table::Migration),
            Box::new(m20250910_093722_create_journal_entries_table::Migration),
            Box::new(m20250921_141205_add_recurrence_group_index::Migration),
        ]
    }
}

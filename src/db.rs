use std::str::FromStr;

use migration::{Migrator, MigratorTrait};
use sea_orm::{
    DatabaseConnection, SqlxSqliteConnector,
    sqlx::sqlite::{
        SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
    },
};

use crate::error::AppResult;

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    // Connection options rather than one-shot PRAGMA statements: these are
    // per-connection settings, and a statement would only reach whichever
    // pooled connection happened to execute it. foreign_keys in particular
    // is what makes the schema's cascade and set-null rules hold.
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(anyhow::Error::new)?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .map_err(anyhow::Error::new)?;
    let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);

    Migrator::up(&db, None).await?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectionTrait, EntityName, Statement};

    use super::*;
    use crate::entities::{
        actor, category, genre, movie, movie_actor, movie_director, movie_genre, movie_shot,
        rating, rating_star, review,
    };

    #[tokio::test]
    async fn migration_creates_the_tables_the_entities_declare() {
        let db = connect_and_migrate("sqlite::memory:").await.unwrap();

        let tables = [
            category::Entity.table_name(),
            genre::Entity.table_name(),
            actor::Entity.table_name(),
            movie::Entity.table_name(),
            movie_genre::Entity.table_name(),
            movie_actor::Entity.table_name(),
            movie_director::Entity.table_name(),
            movie_shot::Entity.table_name(),
            rating_star::Entity.table_name(),
            rating::Entity.table_name(),
            review::Entity.table_name(),
        ];
        for table in tables {
            let row = db
                .query_one(Statement::from_string(
                    db.get_database_backend(),
                    format!(
                        "SELECT count(*) FROM sqlite_master \
                         WHERE type = 'table' AND name = '{table}'"
                    ),
                ))
                .await
                .unwrap()
                .unwrap();
            let count: i64 = row.try_get_by_index(0).unwrap();
            assert_eq!(count, 1, "table {table} missing from migrated schema");
        }
    }

    #[tokio::test]
    async fn foreign_keys_are_on_for_pooled_connections() {
        let db = connect_and_migrate("sqlite::memory:").await.unwrap();
        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                "PRAGMA foreign_keys".to_string(),
            ))
            .await
            .unwrap()
            .unwrap();
        let enabled: i64 = row.try_get_by_index(0).unwrap();
        assert_eq!(enabled, 1);
    }
}

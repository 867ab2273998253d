use kmedia_orm::{OrmError, OrmResult};
use tokio::sync::OnceCell;
use tokio_postgres::{Client, NoTls, Transaction};

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connect and migrate, or `None` when no database is configured.
pub async fn connect(test: &str) -> OrmResult<Option<Client>> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            return Ok(None);
        }
    };

    let (mut client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(OrmError::from_db_error)?;
    tokio::spawn(async move {
        let _ = connection.await;
    });

    let migrating = &mut client;
    MIGRATED
        .get_or_try_init(|| async move {
            kmedia_models::migrations::run(migrating).await.map(|_| ())
        })
        .await?;
    Ok(Some(client))
}

pub async fn begin(client: &mut Client) -> OrmResult<Transaction<'_>> {
    client.transaction().await.map_err(OrmError::from_db_error)
}

pub async fn rollback(tx: Transaction<'_>) -> OrmResult<()> {
    tx.rollback().await.map_err(OrmError::from_db_error)
}

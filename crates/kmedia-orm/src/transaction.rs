//! Transaction helpers.
//!
//! Every model operation accepts a [`GenericClient`](crate::GenericClient), so a
//! transaction can be passed wherever a connection is expected. Association writes
//! that touch several tables (for example `set_containers` on a catalog) should
//! run inside one.
//!
//! ```ignore
//! kmedia_orm::transaction!(&mut client, tx, {
//!     catalog.insert(&tx, &[]).await?;
//!     catalog.add_containers(&tx, true, &mut containers).await?;
//!     Ok(())
//! })?;
//! ```

/// Run a block inside a transaction: commit on `Ok`, roll back on `Err`.
#[macro_export]
macro_rules! transaction {
    ($client:expr, $tx:ident, $body:block) => {{
        let $tx = ($client)
            .transaction()
            .await
            .map_err($crate::OrmError::from_db_error)?;

        let __kmedia_tx_body_result = async { $body }.await;
        match __kmedia_tx_body_result {
            Ok(value) => {
                $tx.commit()
                    .await
                    .map_err($crate::OrmError::from_db_error)?;
                Ok(value)
            }
            Err(error) => match $tx.rollback().await {
                Ok(()) => Err(error),
                Err(rollback_err) => Err($crate::OrmError::Other(format!(
                    "{error} (rollback failed: {rollback_err})"
                ))),
            },
        }
    }};
}

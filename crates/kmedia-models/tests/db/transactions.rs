use crate::common::connect;
use kmedia_models::Lecturer;
use kmedia_orm::{GenericClient, OrmError, OrmResult};

async fn named(conn: &impl GenericClient, name: &str) -> OrmResult<i64> {
    Lecturer::query().where_eq("name", name.to_string()).count(conn).await
}

#[tokio::test]
async fn failing_block_rolls_back() -> OrmResult<()> {
    let Some(mut client) = connect("failing_block_rolls_back").await? else {
        return Ok(());
    };

    let outcome: OrmResult<i32> = kmedia_orm::transaction!(&mut client, tx, {
        let mut lecturer = Lecturer {
            name: "qtx-rolled-back".into(),
            ..Default::default()
        };
        lecturer.insert(&tx, &[]).await?;
        assert_eq!(named(&tx, "qtx-rolled-back").await?, 1);
        Err::<i32, _>(OrmError::validation("abandon lecturer"))
    });

    let err = outcome.unwrap_err();
    assert!(err.to_string().contains("abandon lecturer"));
    assert_eq!(named(&client, "qtx-rolled-back").await?, 0);
    Ok(())
}

#[tokio::test]
async fn successful_block_commits() -> OrmResult<()> {
    let Some(mut client) = connect("successful_block_commits").await? else {
        return Ok(());
    };

    let id = kmedia_orm::transaction!(&mut client, tx, {
        let mut lecturer = Lecturer {
            name: "qtx-committed".into(),
            ..Default::default()
        };
        lecturer.insert(&tx, &[]).await?;
        Ok::<_, OrmError>(lecturer.id)
    })?;

    let stored = Lecturer::find(&client, id).await?;
    assert_eq!(stored.name, "qtx-committed");
    assert_eq!(stored.delete(&client).await?, 1);
    assert_eq!(named(&client, "qtx-committed").await?, 0);
    Ok(())
}

use crate::common::{begin, connect, rollback};
use kmedia_models::{Lecturer, LecturerDescription};
use kmedia_orm::{Condition, GenericClient, ModelSlice, OrmResult, column, sql};

async fn seed(conn: &impl GenericClient, prefix: &str, ordnums: &[i32]) -> OrmResult<Vec<Lecturer>> {
    let mut out = Vec::new();
    for (i, ordnum) in ordnums.iter().enumerate() {
        let mut lecturer = Lecturer {
            name: format!("{prefix}-{i}"),
            ordnum: *ordnum,
            ..Default::default()
        };
        lecturer.insert(conn, &[]).await?;
        out.push(lecturer);
    }
    Ok(out)
}

#[tokio::test]
async fn filter_order_and_page() -> OrmResult<()> {
    let Some(mut client) = connect("filter_order_and_page").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;
    seed(&tx, "qpage", &[5, 1, 4, 2, 3]).await?;

    let mine = || Lecturer::query().filter(Condition::like("name", "qpage-%").unwrap());
    assert_eq!(mine().count(&tx).await?, 5);

    let page = mine()
        .order_by("\"ordnum\" DESC")
        .limit(2)
        .offset(1)
        .all(&tx)
        .await?;
    let ordnums: Vec<i32> = page.iter().map(|l| l.ordnum).collect();
    assert_eq!(ordnums, vec![4, 3]);

    let high = mine().filter(Condition::gt("ordnum", 3)?).count(&tx).await?;
    assert_eq!(high, 2);

    let mut fragment = sql("\"ordnum\" IN (");
    fragment.push_bind_list([1, 2]).push(")");
    assert_eq!(mine().where_sql(fragment).count(&tx).await?, 2);

    rollback(tx).await
}

#[tokio::test]
async fn one_and_exists() -> OrmResult<()> {
    let Some(mut client) = connect("one_and_exists").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;
    let seeded = seed(&tx, "qone", &[7]).await?;

    let found = Lecturer::query().where_eq("name", "qone-0").one(&tx).await?;
    assert_eq!(found.id, seeded[0].id);
    assert!(Lecturer::query().where_eq("name", "qone-0").exists(&tx).await?);

    let missing = Lecturer::query().where_eq("name", "qone-missing");
    assert!(!missing.exists(&tx).await?);
    assert!(missing.one(&tx).await.unwrap_err().is_not_found());

    rollback(tx).await
}

#[tokio::test]
async fn query_mutations() -> OrmResult<()> {
    let Some(mut client) = connect("query_mutations").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;
    seed(&tx, "qmut", &[1, 2, 3]).await?;

    let mine = || Lecturer::query().filter(Condition::like("name", "qmut-%").unwrap());
    let updated = mine()
        .filter(Condition::gte("ordnum", 2)?)
        .update_all(&tx, &[column("ordnum", 10)])
        .await?;
    assert_eq!(updated, 2);
    assert_eq!(mine().filter(Condition::eq("ordnum", 10)?).count(&tx).await?, 2);

    assert_eq!(mine().delete_all(&tx).await?, 3);
    assert_eq!(mine().count(&tx).await?, 0);

    rollback(tx).await
}

#[tokio::test]
async fn slice_operations() -> OrmResult<()> {
    let Some(mut client) = connect("slice_operations").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;
    let mut rows = seed(&tx, "qslice", &[1, 2, 3]).await?;

    assert_eq!(rows.update_all(&tx, &[column("ordnum", 42)]).await?, 3);
    rows[1].delete(&tx).await?;

    rows.reload_all(&tx).await?;
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|l| l.ordnum == 42));
    assert_eq!(rows[0].name, "qslice-0");
    assert_eq!(rows[1].name, "qslice-2");

    let err = rows.update_all(&tx, &[column("no_such_column", 1)]).await.unwrap_err();
    assert!(err.to_string().contains("no_such_column"));

    assert_eq!(rows.delete_all(&tx).await?, 2);
    assert_eq!(Lecturer::query().where_eq("name", "qslice-0").count(&tx).await?, 0);

    rollback(tx).await
}

#[tokio::test]
async fn filter_on_reserved_word_column() -> OrmResult<()> {
    let Some(mut client) = connect("filter_on_reserved_word_column").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut described = LecturerDescription {
        desc: Some("qdesc-teaches".into()),
        lang: Some("ENG".into()),
        ..Default::default()
    };
    described.insert(&tx, &[]).await?;

    let found = LecturerDescription::query()
        .filter(Condition::eq("desc", "qdesc-teaches")?)
        .one(&tx)
        .await?;
    assert_eq!(found.id, described.id);

    let n = LecturerDescription::query()
        .filter(Condition::like("desc", "qdesc-%")?)
        .update_all(&tx, &[column("desc", "qdesc-renamed")])
        .await?;
    assert_eq!(n, 1);
    assert_eq!(
        LecturerDescription::find(&tx, described.id).await?.desc.as_deref(),
        Some("qdesc-renamed")
    );

    let gone = LecturerDescription::query()
        .filter(Condition::eq("desc", "qdesc-renamed")?)
        .delete_all(&tx)
        .await?;
    assert_eq!(gone, 1);

    rollback(tx).await
}

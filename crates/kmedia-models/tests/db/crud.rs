use crate::common::{begin, connect, rollback};
use kmedia_models::{Catalog, FileType, Lecturer, Role, RolesUser, User};
use kmedia_orm::{OrmResult, UpsertOptions};

#[tokio::test]
async fn lecturer_round_trip() -> OrmResult<()> {
    let Some(mut client) = connect("lecturer_round_trip").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut lecturer = Lecturer {
        name: "Rav Test".into(),
        ..Default::default()
    };
    lecturer.insert(&tx, &[]).await?;
    assert!(lecturer.id > 0);
    assert_eq!(lecturer.ordnum, 0);
    assert!(lecturer.created_at.is_some());
    assert_eq!(lecturer.created_at, lecturer.updated_at);

    let found = Lecturer::find(&tx, lecturer.id).await?;
    assert_eq!(found.name, "Rav Test");
    assert!(Lecturer::exists(&tx, lecturer.id).await?);

    lecturer.name = "Rav Renamed".into();
    assert_eq!(lecturer.update(&tx, &["name"]).await?, 1);
    assert_eq!(Lecturer::find(&tx, lecturer.id).await?.name, "Rav Renamed");

    assert_eq!(lecturer.delete(&tx).await?, 1);
    let err = Lecturer::find(&tx, lecturer.id).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!Lecturer::exists(&tx, lecturer.id).await?);

    rollback(tx).await
}

#[tokio::test]
async fn insert_reads_back_database_defaults() -> OrmResult<()> {
    let Some(mut client) = connect("insert_reads_back_database_defaults").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut catalog = Catalog {
        name: "defaults".into(),
        catorder: 4,
        ..Default::default()
    };
    catalog.insert(&tx, &[]).await?;
    assert_eq!(catalog.catorder, 4);
    assert_eq!(catalog.secure, 0);
    assert_eq!(catalog.visible, Some(true));
    assert_eq!(catalog.open, Some(false));

    rollback(tx).await
}

#[tokio::test]
async fn insert_whitelist_skips_other_columns() -> OrmResult<()> {
    let Some(mut client) = connect("insert_whitelist_skips_other_columns").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut role = Role {
        name: Some("editor".into()),
        description: Some("not written".into()),
        ..Default::default()
    };
    role.insert(&tx, &["name"]).await?;
    assert!(role.id > 0);

    let found = Role::find(&tx, role.id).await?;
    assert_eq!(found.name.as_deref(), Some("editor"));
    assert_eq!(found.description, None);
    assert_eq!(found.created_at, None);

    rollback(tx).await
}

#[tokio::test]
async fn find_with_leaves_unselected_fields_default() -> OrmResult<()> {
    let Some(mut client) = connect("find_with_leaves_unselected_fields_default").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut lecturer = Lecturer {
        name: "partial".into(),
        ordnum: 9,
        ..Default::default()
    };
    lecturer.insert(&tx, &[]).await?;

    let partial = Lecturer::find_with(&tx, lecturer.id, &["id", "name"]).await?;
    assert_eq!(partial.name, "partial");
    assert_eq!(partial.ordnum, 0);
    assert_eq!(partial.created_at, None);

    rollback(tx).await
}

#[tokio::test]
async fn upsert_updates_or_ignores_conflicts() -> OrmResult<()> {
    let Some(mut client) = connect("upsert_updates_or_ignores_conflicts").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut video = FileType {
        name: "kmedia-test-video".into(),
        extlist: Some("mp4".into()),
        ..Default::default()
    };
    video.upsert(&tx, &UpsertOptions::do_update()).await?;

    video.extlist = Some("mp4,mkv".into());
    video.upsert(&tx, &UpsertOptions::do_update()).await?;
    let found = FileType::find(&tx, "kmedia-test-video").await?;
    assert_eq!(found.extlist.as_deref(), Some("mp4,mkv"));

    let mut ignored = FileType {
        name: "kmedia-test-video".into(),
        extlist: Some("avi".into()),
        ..Default::default()
    };
    ignored.upsert(&tx, &UpsertOptions::do_nothing()).await?;
    let found = FileType::find(&tx, "kmedia-test-video").await?;
    assert_eq!(found.extlist.as_deref(), Some("mp4,mkv"));

    rollback(tx).await
}

#[tokio::test]
async fn upsert_with_update_column_list() -> OrmResult<()> {
    let Some(mut client) = connect("upsert_with_update_column_list").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut doc = FileType {
        name: "kmedia-test-doc".into(),
        extlist: Some("doc".into()),
        pic: Some("doc.png".into()),
        ..Default::default()
    };
    doc.insert(&tx, &[]).await?;

    let mut changed = FileType {
        name: "kmedia-test-doc".into(),
        extlist: Some("doc,docx".into()),
        pic: Some("other.png".into()),
        ..Default::default()
    };
    changed
        .upsert(&tx, &UpsertOptions::do_update().update(&["extlist"]))
        .await?;

    let found = FileType::find(&tx, "kmedia-test-doc").await?;
    assert_eq!(found.extlist.as_deref(), Some("doc,docx"));
    assert_eq!(found.pic.as_deref(), Some("doc.png"));

    rollback(tx).await
}

#[tokio::test]
async fn composite_key_rows() -> OrmResult<()> {
    let Some(mut client) = connect("composite_key_rows").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut user = User {
        email: "composite@example.com".into(),
        ..Default::default()
    };
    user.insert(&tx, &[]).await?;
    assert_eq!(user.sign_in_count, 0);

    let mut grant = RolesUser {
        role_id: 3,
        user_id: user.id,
        ..Default::default()
    };
    grant.insert(&tx, &[]).await?;
    assert!(RolesUser::exists(&tx, 3, user.id).await?);
    assert_eq!(RolesUser::find(&tx, 3, user.id).await?.user_id, user.id);

    assert_eq!(grant.delete(&tx).await?, 1);
    assert!(RolesUser::find(&tx, 3, user.id).await.unwrap_err().is_not_found());

    rollback(tx).await
}

#[tokio::test]
async fn reload_keeps_relationships() -> OrmResult<()> {
    let Some(mut client) = connect("reload_keeps_relationships").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut parent = Catalog {
        name: "parent".into(),
        ..Default::default()
    };
    parent.insert(&tx, &[]).await?;
    let mut child = Catalog {
        name: "child".into(),
        ..Default::default()
    };
    parent.add_children(&tx, true, std::slice::from_mut(&mut child)).await?;

    Catalog::query()
        .where_eq("id", parent.id)
        .update_all(&tx, &[kmedia_orm::column("label", "relabeled")])
        .await?;
    parent.reload(&tx).await?;

    assert_eq!(parent.label.as_deref(), Some("relabeled"));
    assert_eq!(parent.r.children.len(), 1);
    assert_eq!(parent.r.children[0].id, child.id);

    rollback(tx).await
}

#[tokio::test]
async fn foreign_key_violation_is_classified() -> OrmResult<()> {
    let Some(mut client) = connect("foreign_key_violation_is_classified").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut orphan = Catalog {
        name: "orphan".into(),
        parent_id: Some(i32::MAX),
        ..Default::default()
    };
    let err = orphan.insert(&tx, &[]).await.unwrap_err();
    assert!(err.is_foreign_key_violation());
    assert!(err.to_string().contains("kmodels: unable to insert into catalogs"));

    rollback(tx).await
}

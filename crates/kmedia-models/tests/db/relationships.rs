use crate::common::{begin, connect, rollback};
use kmedia_models::{
    Catalog, CatalogDescription, Container, ContentType, FileAsset, Label, Language, RolesUser,
    Server, User, VirtualLesson,
};
use kmedia_orm::{Model, OrmResult};

fn catalog(name: &str) -> Catalog {
    Catalog {
        name: name.into(),
        ..Default::default()
    }
}

fn container(name: &str) -> Container {
    Container {
        name: Some(name.into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn to_one_set_and_remove() -> OrmResult<()> {
    let Some(mut client) = connect("to_one_set_and_remove").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut cat = catalog("owned");
    cat.insert(&tx, &[]).await?;
    let mut user = User {
        email: "owner@example.com".into(),
        ..Default::default()
    };
    cat.set_user(&tx, true, &mut user).await?;

    assert!(user.id > 0);
    assert_eq!(cat.user_id, Some(user.id));
    assert_eq!(cat.r.user.as_ref().map(|u| u.id), Some(user.id));
    assert_eq!(user.r.catalogs.len(), 1);
    assert_eq!(Catalog::find(&tx, cat.id).await?.user_id, Some(user.id));
    assert_eq!(cat.user().one(&tx).await?.email, "owner@example.com");

    cat.remove_user(&tx, &mut user).await?;
    assert_eq!(cat.user_id, None);
    assert!(cat.r.user.is_none());
    assert!(user.r.catalogs.is_empty());
    assert_eq!(Catalog::find(&tx, cat.id).await?.user_id, None);
    assert!(cat.user().one(&tx).await.unwrap_err().is_not_found());

    rollback(tx).await
}

#[tokio::test]
async fn to_one_keyed_by_language_code() -> OrmResult<()> {
    let Some(mut client) = connect("to_one_keyed_by_language_code").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut lang = Language {
        code3: Some("zqa".into()),
        language: Some("Test".into()),
        ..Default::default()
    };
    lang.insert(&tx, &[]).await?;

    let mut cat = catalog("described");
    cat.insert(&tx, &[]).await?;
    let mut desc = CatalogDescription {
        name: Some("hello".into()),
        ..Default::default()
    };
    cat.add_catalog_descriptions(&tx, true, std::slice::from_mut(&mut desc))
        .await?;
    assert_eq!(desc.catalog_id, cat.id);

    desc.set_lang(&tx, false, &mut lang).await?;
    assert_eq!(desc.lang_id.as_deref(), Some("zqa"));
    assert_eq!(lang.lang_catalog_descriptions().count(&tx).await?, 1);

    let mut loaded = vec![CatalogDescription::find(&tx, desc.id).await?];
    CatalogDescription::load_lang(&tx, &mut loaded).await?;
    let lang_back = loaded[0].r.lang.as_ref().map(|l| l.id);
    assert_eq!(lang_back, Some(lang.id));

    rollback(tx).await
}

#[tokio::test]
async fn to_many_add_set_remove() -> OrmResult<()> {
    let Some(mut client) = connect("to_many_add_set_remove").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut kind = ContentType {
        name: Some("lesson".into()),
        ..Default::default()
    };
    kind.insert(&tx, &[]).await?;

    let mut first = vec![container("a"), container("b")];
    kind.add_containers(&tx, true, &mut first).await?;
    assert_eq!(kind.containers().count(&tx).await?, 2);
    assert_eq!(kind.r.containers.len(), 2);
    assert!(first.iter().all(|c| c.content_type_id == Some(kind.id)));
    assert!(first.iter().all(|c| c.r.content_type.is_some()));

    let mut second = vec![container("c")];
    kind.set_containers(&tx, true, &mut second).await?;
    assert_eq!(kind.containers().count(&tx).await?, 1);
    assert_eq!(kind.r.containers.len(), 1);
    assert_eq!(Container::find(&tx, first[0].id).await?.content_type_id, None);

    let mut existing = vec![first[0].clone()];
    kind.add_containers(&tx, false, &mut existing).await?;
    assert_eq!(kind.containers().count(&tx).await?, 2);

    kind.remove_containers(&tx, &mut second).await?;
    assert_eq!(kind.containers().count(&tx).await?, 1);
    assert_eq!(kind.r.containers.len(), 1);
    assert!(kind.r.containers[0].same_pk(&first[0]));
    assert_eq!(second[0].content_type_id, None);
    assert!(second[0].r.content_type.is_none());

    rollback(tx).await
}

#[tokio::test]
async fn to_many_keyed_by_server_name() -> OrmResult<()> {
    let Some(mut client) = connect("to_many_keyed_by_server_name").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut server = Server {
        servername: "kmedia-test-files".into(),
        ..Default::default()
    };
    server.insert(&tx, &[]).await?;

    let mut files = vec![
        FileAsset {
            name: Some("one.mp4".into()),
            ..Default::default()
        },
        FileAsset {
            name: Some("two.mp4".into()),
            ..Default::default()
        },
    ];
    server.add_servername_file_assets(&tx, true, &mut files).await?;
    assert!(
        files
            .iter()
            .all(|f| f.servername_id.as_deref() == Some("kmedia-test-files"))
    );

    let mut loaded = vec![Server::find(&tx, server.id).await?];
    Server::load_servername_file_assets(&tx, &mut loaded).await?;
    assert_eq!(loaded[0].r.servername_file_assets.len(), 2);

    let mut assets = FileAsset::query()
        .where_eq("servername_id", "kmedia-test-files")
        .all(&tx)
        .await?;
    FileAsset::load_servername(&tx, &mut assets).await?;
    assert!(assets.iter().all(|f| f.r.servername.as_ref().map(|s| s.id) == Some(server.id)));

    rollback(tx).await
}

#[tokio::test]
async fn many_to_many_add_set_remove() -> OrmResult<()> {
    let Some(mut client) = connect("many_to_many_add_set_remove").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut cat = catalog("lessons");
    cat.insert(&tx, &[]).await?;
    let mut members = vec![container("x"), container("y"), container("z")];
    cat.add_containers(&tx, true, &mut members).await?;

    assert_eq!(cat.containers().count(&tx).await?, 3);
    assert_eq!(members[0].catalogs().count(&tx).await?, 1);
    assert!(members.iter().all(|c| c.r.catalogs.len() == 1));

    cat.remove_containers(&tx, &mut members[..2]).await?;
    assert_eq!(cat.containers().count(&tx).await?, 1);
    assert_eq!(cat.r.containers.len(), 1);
    assert!(cat.r.containers[0].same_pk(&members[2]));
    assert!(members[0].r.catalogs.is_empty());
    assert_eq!(members[0].catalogs().count(&tx).await?, 0);

    let mut other = catalog("other");
    other.insert(&tx, &[]).await?;
    members[2].set_catalogs(&tx, false, std::slice::from_mut(&mut other)).await?;
    assert_eq!(cat.containers().count(&tx).await?, 0);
    assert_eq!(other.containers().count(&tx).await?, 1);

    rollback(tx).await
}

#[tokio::test]
async fn eager_loading_sets_back_references() -> OrmResult<()> {
    let Some(mut client) = connect("eager_loading_sets_back_references").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut parent = catalog("root");
    parent.insert(&tx, &[]).await?;
    let mut kids = vec![catalog("kid-1"), catalog("kid-2")];
    parent.add_children(&tx, true, &mut kids).await?;

    let mut lonely = catalog("lonely");
    lonely.insert(&tx, &[]).await?;

    let mut parents = vec![Catalog::find(&tx, parent.id).await?, lonely.clone()];
    Catalog::load_children(&tx, &mut parents).await?;
    assert_eq!(parents[0].r.children.len(), 2);
    assert!(parents[1].r.children.is_empty());
    for kid in &parents[0].r.children {
        assert_eq!(kid.r.parent.as_ref().map(|p| p.id), Some(parent.id));
    }

    let mut children = Catalog::query().where_eq("parent_id", parent.id).all(&tx).await?;
    Catalog::load_parent(&tx, &mut children).await?;
    assert!(children.iter().all(|c| c.r.parent.as_ref().map(|p| p.id) == Some(parent.id)));

    let mut label = Label {
        suid: Some("lbl".into()),
        ..Default::default()
    };
    label.insert(&tx, &[]).await?;
    let mut boxed = container("labelled");
    boxed.insert(&tx, &[]).await?;
    boxed.add_labels(&tx, false, std::slice::from_mut(&mut label)).await?;

    let mut containers = vec![Container::find(&tx, boxed.id).await?];
    Container::load_labels(&tx, &mut containers).await?;
    assert_eq!(containers[0].r.labels.len(), 1);
    assert_eq!(containers[0].r.labels[0].id, label.id);
    assert_eq!(containers[0].r.labels[0].r.containers.len(), 1);

    let mut labels = vec![Label::find(&tx, label.id).await?];
    Label::load_containers(&tx, &mut labels).await?;
    assert_eq!(labels[0].r.containers.len(), 1);

    rollback(tx).await
}

#[tokio::test]
async fn eager_loading_without_keys_is_a_no_op() -> OrmResult<()> {
    let Some(mut client) = connect("eager_loading_without_keys_is_a_no_op").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut rows = vec![container("no-lang")];
    Container::load_lang(&tx, &mut rows).await?;
    assert!(rows[0].r.lang.is_none());

    let mut empty: Vec<Catalog> = Vec::new();
    Catalog::load_containers(&tx, &mut empty).await?;

    rollback(tx).await
}

fn asset(name: &str) -> FileAsset {
    FileAsset {
        name: Some(name.into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn grants_move_between_users() -> OrmResult<()> {
    let Some(mut client) = connect("grants_move_between_users").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut alice = User {
        email: "grant-a@example.com".into(),
        ..Default::default()
    };
    alice.insert(&tx, &[]).await?;
    let mut grants = vec![
        RolesUser {
            role_id: 1,
            ..Default::default()
        },
        RolesUser {
            role_id: 2,
            ..Default::default()
        },
    ];
    alice.add_roles_users(&tx, true, &mut grants).await?;
    assert_eq!(alice.roles_users().count(&tx).await?, 2);
    assert_eq!(alice.r.roles_users.len(), 2);
    assert!(grants.iter().all(|g| g.user_id == alice.id));
    assert!(grants.iter().all(|g| g.r.user.as_ref().map(|u| u.id) == Some(alice.id)));

    let mut bob = User {
        email: "grant-b@example.com".into(),
        ..Default::default()
    };
    grants[0].set_user(&tx, true, &mut bob).await?;
    assert!(bob.id > 0);
    assert_eq!(grants[0].user_id, bob.id);
    assert_eq!(bob.r.roles_users.len(), 1);
    assert_eq!(bob.roles_users().count(&tx).await?, 1);
    assert_eq!(alice.roles_users().count(&tx).await?, 1);
    assert_eq!(RolesUser::find(&tx, 1, bob.id).await?.role_id, 1);

    alice.add_roles_users(&tx, false, &mut grants[..1]).await?;
    assert_eq!(grants[0].user_id, alice.id);
    assert_eq!(alice.roles_users().count(&tx).await?, 2);
    assert_eq!(bob.roles_users().count(&tx).await?, 0);

    rollback(tx).await
}

#[tokio::test]
async fn virtual_lesson_containers() -> OrmResult<()> {
    let Some(mut client) = connect("virtual_lesson_containers").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut lesson = VirtualLesson::default();
    lesson.insert(&tx, &[]).await?;
    assert!(lesson.created_at.is_some());

    let mut first = vec![container("vl-a"), container("vl-b")];
    lesson.add_containers(&tx, true, &mut first).await?;
    assert_eq!(lesson.containers().count(&tx).await?, 2);
    assert!(first.iter().all(|c| c.virtual_lesson_id == Some(lesson.id)));
    assert!(first.iter().all(|c| c.r.virtual_lesson.is_some()));

    let mut second = vec![container("vl-c")];
    lesson.set_containers(&tx, true, &mut second).await?;
    assert_eq!(lesson.containers().count(&tx).await?, 1);
    assert_eq!(lesson.r.containers.len(), 1);
    assert_eq!(Container::find(&tx, first[0].id).await?.virtual_lesson_id, None);

    lesson.add_containers(&tx, false, &mut first[..1]).await?;
    assert_eq!(lesson.containers().count(&tx).await?, 2);

    lesson.remove_containers(&tx, &mut second).await?;
    assert_eq!(lesson.containers().count(&tx).await?, 1);
    assert_eq!(lesson.r.containers.len(), 1);
    assert!(lesson.r.containers[0].same_pk(&first[0]));
    assert_eq!(second[0].virtual_lesson_id, None);
    assert!(second[0].r.virtual_lesson.is_none());
    assert_eq!(Container::find(&tx, second[0].id).await?.virtual_lesson_id, None);

    rollback(tx).await
}

#[tokio::test]
async fn container_file_assets_replace_links() -> OrmResult<()> {
    let Some(mut client) = connect("container_file_assets_replace_links").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut boxed = container("with-files");
    boxed.insert(&tx, &[]).await?;
    let mut first = vec![asset("cf-1.mp4"), asset("cf-2.mp4")];
    boxed.add_file_assets(&tx, true, &mut first).await?;
    assert_eq!(boxed.file_assets().count(&tx).await?, 2);

    let mut second = vec![asset("cf-3.mp4")];
    boxed.set_file_assets(&tx, true, &mut second).await?;
    assert_eq!(boxed.file_assets().count(&tx).await?, 1);
    assert_eq!(boxed.r.file_assets.len(), 1);
    assert!(boxed.r.file_assets[0].same_pk(&second[0]));
    assert_eq!(second[0].r.containers.len(), 1);
    assert_eq!(second[0].containers().count(&tx).await?, 1);
    assert_eq!(first[0].containers().count(&tx).await?, 0);
    assert!(FileAsset::find(&tx, first[0].id).await.is_ok());

    rollback(tx).await
}

#[tokio::test]
async fn language_file_assets_replace_links() -> OrmResult<()> {
    let Some(mut client) = connect("language_file_assets_replace_links").await? else {
        return Ok(());
    };
    let tx = begin(&mut client).await?;

    let mut lang = Language {
        code3: Some("zqb".into()),
        language: Some("Other".into()),
        ..Default::default()
    };
    lang.insert(&tx, &[]).await?;

    let mut first = vec![asset("lf-1.mp4")];
    lang.add_lang_file_assets(&tx, true, &mut first).await?;
    assert_eq!(first[0].lang_id.as_deref(), Some("zqb"));

    let mut second = vec![asset("lf-2.mp4"), asset("lf-3.mp4")];
    lang.set_lang_file_assets(&tx, true, &mut second).await?;
    assert_eq!(lang.lang_file_assets().count(&tx).await?, 2);
    assert_eq!(lang.r.lang_file_assets.len(), 2);
    assert!(second.iter().all(|f| f.r.lang.as_ref().map(|l| l.id) == Some(lang.id)));
    assert_eq!(FileAsset::find(&tx, first[0].id).await?.lang_id, None);

    let mut loaded = lang.lang_file_assets().all(&tx).await?;
    FileAsset::load_lang(&tx, &mut loaded).await?;
    assert!(loaded.iter().all(|f| f.r.lang.as_ref().map(|l| l.id) == Some(lang.id)));

    rollback(tx).await
}

use chrono::Duration;
use litepolis_db::configuration::{Configuration, DatabaseUrl};
use litepolis_db::prelude::*;
use litepolis_db::storage::Dialect;
use litepolis_db::Error;
use uuid::Uuid;

mod common;

#[test]
fn user_lifecycle() {
    for dialect in [Dialect::SQLITE, Dialect::STARROCKS] {
        let (_dir, db) = common::actor(dialect);
        let username = common::random_username();

        let user = db
            .create_user(NewUser::new(&username, common::HASHED_PASSWORD))
            .unwrap()
            .unwrap();
        assert_eq!(db.read_user(user.id).unwrap().unwrap(), user);
        assert_eq!(
            db.read_user_by_username(&username).unwrap().unwrap().id,
            user.id
        );

        let updated = db
            .update_user(
                user.id,
                UserUpdate {
                    username: None,
                    hashed_password: Some("bda53c18bdbf90dc4221f8209fcb3bda".into()),
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.username, username);
        assert_eq!(updated.hashed_password, "bda53c18bdbf90dc4221f8209fcb3bda");

        assert!(db.delete_user(user.id).unwrap());
        assert!(db.read_user(user.id).unwrap().is_none());
    }
}

#[test]
fn duplicate_username_is_refused_on_every_dialect() {
    for dialect in [Dialect::SQLITE, Dialect::STARROCKS] {
        let (_dir, db) = common::actor(dialect);
        let user = common::create_user(&db);
        let again = db
            .create_user(NewUser::new(&user.username, "other"))
            .unwrap();
        assert!(again.is_none(), "{dialect} accepted a duplicate");
        assert_eq!(db.count_users().unwrap(), 1);
    }
}

#[test]
fn file_cannot_be_reopened_under_another_dialect() {
    let (dir, starrocks) = common::actor(Dialect::STARROCKS);
    let user = common::create_user(&starrocks);

    let config = Configuration::new(DatabaseUrl {
        path: dir.path().join("litepolis.db"),
        dialect: Dialect::SQLITE,
    });
    let err = DatabaseActor::connect(&config)
        .and_then(|sqlite| sqlite.create_user(NewUser::new(&user.username, "other")))
        .expect_err("dialect switch must be refused");
    assert!(matches!(err, Error::DialectMismatch { .. }), "{err}");
    assert_eq!(starrocks.count_users().unwrap(), 1);
}

#[test]
fn list_users_pages_and_date_range() {
    let (_dir, db) = common::actor(Dialect::SQLITE);
    let users: Vec<_> = (0..12).map(|_| common::create_user(&db)).collect();

    let first = db.list_users(Page::new(1, 10)).unwrap();
    let second = db.list_users(Page::new(2, 10)).unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(second.len(), 2);
    assert!(first.iter().all(|u| !second.iter().any(|s| s.id == u.id)));

    let start = users[0].created;
    let end = users[11].created;
    let in_range = db.list_users_created_in_date_range(start, end).unwrap();
    assert_eq!(in_range.len(), 12);

    let future = end + Duration::days(1);
    assert!(db
        .list_users_created_in_date_range(future, future + Duration::days(1))
        .unwrap()
        .is_empty());
}

#[test]
fn operations_on_missing_users_are_quiet() {
    let (_dir, db) = common::actor(Dialect::SQLITE);
    let ghost = Uuid::new_v4();
    assert!(db.read_user(ghost).unwrap().is_none());
    assert!(db.update_user(ghost, UserUpdate::default()).unwrap().is_none());
    assert!(!db.delete_user(ghost).unwrap());
}

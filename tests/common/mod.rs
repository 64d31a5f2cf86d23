#![allow(dead_code)]

use litepolis_db::configuration::{Configuration, DatabaseUrl};
use litepolis_db::prelude::*;
use litepolis_db::storage::Dialect;
use rand::{distributions::Alphanumeric, Rng};
use tempfile::TempDir;

pub const HASHED_PASSWORD: &str = "8dd10c7e99d90a2d66b532fb921e40fb";

pub fn actor(dialect: Dialect) -> (TempDir, DatabaseActor) {
    let dir = TempDir::new().expect("temp dir");
    let config = Configuration::new(DatabaseUrl {
        path: dir.path().join("litepolis.db"),
        dialect,
    });
    let actor = DatabaseActor::connect(&config).expect("connect");
    (dir, actor)
}

pub fn random_username() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    format!("user_{suffix}")
}

pub fn create_user(db: &DatabaseActor) -> litepolis_db::model::User {
    db.create_user(NewUser::new(random_username(), HASHED_PASSWORD))
        .expect("create user")
        .expect("fresh username")
}

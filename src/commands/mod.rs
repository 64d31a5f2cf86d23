use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::actor::DatabaseActor;
use crate::cli::Command;
use crate::model::{NewUser, MAX_USERNAME_LEN};
use crate::query::{Page, Sort};
use crate::storage::{ConversationManager, UserManager};

#[derive(Debug, Serialize)]
pub struct Stats {
    pub users: u64,
    pub conversations: u64,
}

impl Command {
    pub fn run(&self, db: &DatabaseActor) -> Result<()> {
        match self {
            Command::Init => {
                log::info!("✅ Schema ready");
                Ok(())
            }
            Command::Stats => {
                let stats = Stats {
                    users: db.count_users().context("counting users")?,
                    conversations: db
                        .count_conversations()
                        .context("counting conversations")?,
                };
                print_json(&stats)
            }
            Command::Users { page, page_size } => {
                let users = db
                    .list_users(Page::new(*page, *page_size))
                    .context("listing users")?;
                print_json(&users)
            }
            Command::Conversations {
                page,
                page_size,
                order_by,
                order_direction,
            } => {
                let conversations = db
                    .list_conversations(
                        Page::new(*page, *page_size),
                        Sort::parse(order_by, order_direction),
                    )
                    .context("listing conversations")?;
                print_json(&conversations)
            }
            Command::CreateUser {
                username,
                hashed_password,
            } => {
                if username.chars().count() > MAX_USERNAME_LEN {
                    bail!("username is longer than {MAX_USERNAME_LEN} characters");
                }
                match db
                    .create_user(NewUser::new(username.as_str(), hashed_password.as_str()))
                    .context("creating user")?
                {
                    Some(user) => print_json(&user),
                    None => bail!("username '{username}' is already taken"),
                }
            }
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{out}");
    Ok(())
}

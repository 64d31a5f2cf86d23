use clap::Subcommand;

use crate::query::DEFAULT_PAGE_SIZE;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(
        about = "Create the schema if absent",
        long_about = "Open the database, create every table and index that does not exist yet and record the schema version."
    )]
    Init,
    #[command(
        about = "Print row counts",
        long_about = "Print the number of users and conversations as a JSON object."
    )]
    Stats,
    #[command(about = "List users, oldest first")]
    Users {
        #[arg(long, default_value_t = 1, value_name = "N", help = "1-based page number")]
        page: i64,
        #[arg(long = "page-size", default_value_t = DEFAULT_PAGE_SIZE, value_name = "N")]
        page_size: i64,
    },
    #[command(
        about = "List conversations",
        long_about = "List conversations ordered by one of created, modified, title, is_archived or display_unmoderated. Unknown columns fall back to created."
    )]
    Conversations {
        #[arg(long, default_value_t = 1, value_name = "N", help = "1-based page number")]
        page: i64,
        #[arg(long = "page-size", default_value_t = DEFAULT_PAGE_SIZE, value_name = "N")]
        page_size: i64,
        #[arg(long = "order-by", default_value = "created", value_name = "COLUMN")]
        order_by: String,
        #[arg(
            long = "order-direction",
            default_value = "desc",
            value_name = "asc|desc"
        )]
        order_direction: String,
    },
    #[command(
        about = "Create a user",
        long_about = "Create a user with an already-hashed password. Prints the stored user, or fails if the username is taken."
    )]
    CreateUser {
        #[arg(long, value_name = "NAME")]
        username: String,
        #[arg(long = "hashed-password", value_name = "HASH")]
        hashed_password: String,
    },
}

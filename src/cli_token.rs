//! Issues a bearer token for the bookshelf API.

use anyhow::Result;
use clap::Parser;

use bookshelf_server::auth::{issue_token, validity_days};
use bookshelf_server::config::normalize_jwt_secret;

#[derive(Parser, Debug)]
struct CliArgs {
    /// Secret the server validates tokens with (same as its --jwt-secret).
    #[clap(long)]
    pub jwt_secret: String,

    /// Id of the user the token is issued to.
    pub user_id: String,

    /// Email address of the user.
    pub email: String,

    /// Number of days the token stays valid.
    #[clap(long, default_value_t = 30)]
    pub days: i64,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let secret = normalize_jwt_secret(&args.jwt_secret)?;
    let valid_for = validity_days(args.days)?;

    let token = issue_token(&secret, &args.user_id, &args.email, valid_for)?;
    println!("{}", token);
    Ok(())
}

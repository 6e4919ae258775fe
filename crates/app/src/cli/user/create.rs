use clap::Args;
use jiff::Timestamp;
use storefront_app::{
    auth::PgAuthService,
    database::Db,
    domain::users::{PgUsersService, UsersService, data::NewUser, records::UserUuid},
};

use crate::cli::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// Email address, unique across users
    #[arg(long)]
    email: String,

    /// Grant access to the admin discount routes
    #[arg(long)]
    admin: bool,

    /// Optional session expiration timestamp (RFC 3339)
    #[arg(long)]
    session_expires_at: Option<String>,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    let session_expires_at = parse_session_expires_at(args.session_expires_at.as_deref())?;

    if let Some(expires_at) = session_expires_at.as_ref()
        && *expires_at <= Timestamp::now()
    {
        return Err("session-expires-at must be in the future".to_string());
    }

    let db = Db::new(args.database.connect().await?);

    let user = PgUsersService::new(db.clone())
        .create_user(NewUser {
            uuid: UserUuid::new(),
            email: args.email,
            is_admin: args.admin,
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    let session = PgAuthService::new(db)
        .issue_session(user.uuid, session_expires_at)
        .await
        .map_err(|error| format!("failed to issue session: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("email: {}", user.email);
    println!("is_admin: {}", user.is_admin);
    if let Some(expires_at) = session.expires_at {
        println!("session_expires_at: {expires_at}");
    }
    println!("session_token: {}", session.token);
    println!("store this token now; it is only shown once");

    Ok(())
}

fn parse_session_expires_at(raw: Option<&str>) -> Result<Option<Timestamp>, String> {
    raw.map(|value| {
        value
            .parse::<Timestamp>()
            .map_err(|error| format!("invalid session-expires-at timestamp: {error}"))
    })
    .transpose()
}

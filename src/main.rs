//! fare command line: serve the site and administer accounts.

use std::path::PathBuf;

use anyhow::{Context as _, bail};
use clap::{Args, Parser, Subcommand};
use fare::config::{ConfigLoader, Overrides};
use fare::permission::StaffGrant;
use fare::users::{User, store};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "fare", version, about = "Document sharing and staff permission management")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "FARE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: OverrideArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Highest-precedence config layer.
#[derive(Args, Debug)]
struct OverrideArgs {
    /// Address to bind
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, global = true)]
    port: Option<u16>,

    /// libsql database URL or file path
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Directory uploaded documents are written under
    #[arg(long, global = true)]
    media_root: Option<PathBuf>,

    /// Secret used to sign and verify identity tokens
    #[arg(long, global = true)]
    jwt_secret: Option<String>,
}

impl From<OverrideArgs> for Overrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            database_url: args.database_url,
            media_root: args.media_root,
            jwt_secret: args.jwt_secret,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create or upgrade the database schema
    Migrate,
    /// Add an account
    Createuser {
        username: String,
        /// Display name
        #[arg(long, default_value = "")]
        name: String,
        /// Allow the account to change other users' staff flag
        #[arg(long)]
        staff: bool,
        /// Make the account unreachable by the staff permission page
        #[arg(long)]
        superuser: bool,
    },
    /// List accounts with their flags
    Users,
    /// Set an account's staff flag without going through the web gate
    SetStaff {
        username: String,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    /// Print an identity token for an account
    Token { username: String },
}

impl Command {
    /// Commands that sign or verify tokens cannot run without a secret.
    fn needs_secret(&self) -> bool {
        matches!(self, Command::Serve | Command::Token { .. })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve);

    let loader = ConfigLoader {
        require_jwt_secret: command.needs_secret(),
        ..ConfigLoader::default()
    };
    let config = loader
        .load(cli.config.as_deref(), &cli.overrides.into())
        .context("Failed to load configuration")?;

    fare::logging::init(&config.log)?;

    let db = fare::db::connect(&config.database.url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    let conn = fare::db::connection(&db)?;
    fare::db::migrate(&conn).await.context("Failed to migrate database")?;

    match command {
        Command::Serve => {
            drop(conn);
            fare::server::run(config, db, fare::app()?).await?;
        }
        Command::Migrate => {
            info!(url = %config.database.url, "Database schema is up to date");
        }
        Command::Createuser {
            username,
            name,
            staff,
            superuser,
        } => {
            let user = User {
                name,
                staff_member: staff,
                is_superuser: superuser,
                ..User::new(username)
            };
            store::create(&conn, &user).await?;
            println!("Created {}", user.username);
        }
        Command::Users => {
            println!("{:<30} {:<6} {:<10} name", "username", "staff", "superuser");
            for user in store::list(&conn).await? {
                println!(
                    "{:<30} {:<6} {:<10} {}",
                    user.username, user.staff_member, user.is_superuser, user.name
                );
            }
        }
        Command::SetStaff { username, value } => {
            if store::get(&conn, &username).await?.is_none() {
                bail!("No user named {username}");
            }
            store::set_staff_member(&conn, StaffGrant::administrative(&username), value).await?;
            println!("{username}: staff_member = {value}");
        }
        Command::Token { username } => {
            store::require(&conn, &username)
                .await
                .with_context(|| format!("No user named {username}"))?;
            println!("{}", fare::auth::create_token(&config.auth, &username)?);
        }
    }

    Ok(())
}

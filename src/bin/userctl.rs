use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_records::{
    config::AppConfig,
    models::{NewUser, User, UserChanges},
    services::UserService,
    AppState,
};

#[derive(Parser)]
#[command(name = "userctl")]
#[command(about = "Manage user records and their stored credentials", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new user
    Create {
        /// Display name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// List users
    List {
        /// Maximum number of users to display
        #[arg(short, long, default_value_t = 100)]
        limit: i64,

        /// Offset for pagination
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: i64,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Change a user's username or email
    Update {
        /// Current email address of the user
        #[arg(short, long)]
        email: String,

        #[arg(long)]
        new_username: Option<String>,

        #[arg(long)]
        new_email: Option<String>,
    },

    /// Set a new password for a user
    SetPassword {
        /// Email address of the user
        #[arg(short, long)]
        email: String,

        /// New password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Check a password against the stored hash
    CheckPassword {
        #[arg(short, long)]
        email: String,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Delete a user
    Delete {
        /// Email address of the user to delete
        #[arg(short, long)]
        email: String,
    },
}

fn get_password(prompt: &str) -> anyhow::Result<String> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

fn password_or_prompt(password: Option<String>, confirm: bool) -> anyhow::Result<String> {
    if let Some(pw) = password {
        return Ok(pw);
    }
    let password = get_password("Password")?;
    if confirm && password != get_password("Confirm password")? {
        bail!("Passwords do not match");
    }
    Ok(password)
}

async fn require_user(service: &UserService, email: &str) -> anyhow::Result<User> {
    service
        .find_user_by_email(email)
        .await
        .context("Failed to find user")?
        .with_context(|| format!("User '{}' not found", email))
}

fn print_table(users: &[User]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }
    println!("{:<6} {:<24} {:<40}", "ID", "Username", "Email");
    println!("{}", "-".repeat(70));
    for user in users {
        println!("{:<6} {:<24} {:<40}", user.id, user.username, user.email);
    }
}

async fn run(cli: Cli, user_service: Arc<UserService>) -> anyhow::Result<()> {
    match cli.command {
        Commands::Create {
            username,
            email,
            password,
        } => {
            let password = password_or_prompt(password, true)?;
            let user = user_service
                .create_user(NewUser::new(username, email, password))
                .await
                .context("Failed to create user")?;
            println!("✅ User created successfully!");
            println!("  ID: {}", user.id);
            println!("  Username: {}", user.username);
            println!("  Email: {}", user.email);
        }

        Commands::List {
            limit,
            offset,
            json,
        } => {
            let users = user_service
                .list_users(Some(limit), Some(offset))
                .await
                .context("Failed to list users")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else {
                print_table(&users);
            }
        }

        Commands::Update {
            email,
            new_username,
            new_email,
        } => {
            let user = require_user(&user_service, &email).await?;
            let changes = UserChanges {
                username: new_username,
                email: new_email,
                password: None,
            };
            if changes.is_empty() {
                bail!("Nothing to update; pass --new-username and/or --new-email");
            }
            let user = user_service
                .update_user(user.id, changes)
                .await
                .context("Failed to update user")?;
            println!("✅ User {} updated ({} <{}>)", user.id, user.username, user.email);
        }

        Commands::SetPassword { email, password } => {
            let user = require_user(&user_service, &email).await?;
            let password = password_or_prompt(password, true)?;
            user_service
                .update_password(user.id, &password)
                .await
                .context("Failed to update password")?;
            println!("✅ Password updated successfully for '{}'!", email);
        }

        Commands::CheckPassword { email, password } => {
            let user = require_user(&user_service, &email).await?;
            let password = password_or_prompt(password, false)?;
            if user_service
                .verify_password(&password, &user.password)
                .await
                .context("Failed to verify password")?
            {
                println!("✅ Password matches");
            } else {
                bail!("Password does not match");
            }
        }

        Commands::Delete { email } => {
            let user = require_user(&user_service, &email).await?;
            user_service
                .delete_user(user.id)
                .await
                .context("Failed to delete user")?;
            println!("✅ User '{}' deleted successfully!", email);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_records=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    let config = AppConfig::from_env()?;
    let state = AppState::init(&config).await?;

    run(cli, state.user_service).await
}

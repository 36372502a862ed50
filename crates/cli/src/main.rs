//! Order Desk CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run schema and session-store migrations
//! od-cli migrate
//!
//! # Create the `customer` and `admin` role groups
//! od-cli groups init
//!
//! # Create a user (with customer profile); --admin also grants the admin group
//! od-cli users create -u alice -p 'correct horse battery' -e alice@example.com --admin
//!
//! # Add a role group to an existing user
//! od-cli users grant -u bob -r admin
//!
//! # Insert the demo catalogue
//! od-cli seed products
//! ```
//!
//! # Environment Variables
//!
//! - `ORDER_DESK_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "od-cli")]
#[command(author, version, about = "Order Desk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (schema and session store)
    Migrate,
    /// Manage role groups
    Groups {
        #[command(subcommand)]
        action: GroupsAction,
    },
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Insert demo data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum GroupsAction {
    /// Create the `customer` and `admin` groups if missing
    Init,
}

#[derive(Subcommand)]
enum UsersAction {
    /// Create a user through the normal signup path
    Create {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password (same rules as the signup form)
        #[arg(short, long)]
        password: String,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,

        /// Also grant the `admin` group
        #[arg(long)]
        admin: bool,
    },
    /// Add a role group to an existing user
    Grant {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Role group (`customer` or `admin`)
        #[arg(short, long)]
        role: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Demo product catalogue with tags
    Products,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "od_cli=info,order_desk_web=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let pool = commands::connect().await?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await?,
        Commands::Groups {
            action: GroupsAction::Init,
        } => commands::groups::init(&pool).await?,
        Commands::Users { action } => match action {
            UsersAction::Create {
                username,
                password,
                email,
                admin,
            } => {
                commands::users::create(&pool, &username, &password, email.as_deref(), admin)
                    .await?;
            }
            UsersAction::Grant { username, role } => {
                commands::users::grant(&pool, &username, &role).await?;
            }
        },
        Commands::Seed {
            target: SeedTarget::Products,
        } => commands::seed::products(&pool).await?,
    }
    Ok(())
}

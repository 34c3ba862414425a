use admin::commands;
use clap::{Parser, Subcommand};
use storage::{
    Database,
    dto::{qr_code::GenerateQrCodesRequest, user::CreateUserRequest},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "qr-admin")]
#[command(about = "QR ledger operator tooling", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create a batch of QR codes and print them as JSON
    Generate {
        #[arg(long, default_value_t = 10)]
        count: u32,

        #[arg(long, default_value = "")]
        prefix: String,

        #[arg(long, default_value_t = 10)]
        initial_points: i32,
    },
    /// Provision a user account
    CreateUser {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,
    },
    /// Check every user's total against their scan history
    Reconcile,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("qr_admin={},admin={},storage={}", log_level, log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Connecting to database...");
    let db = Database::with_max_connections(&cli.database_url, 2).await?;

    match cli.command {
        Commands::Migrate => {
            commands::migrate(&db).await?;
        }
        Commands::Generate {
            count,
            prefix,
            initial_points,
        } => {
            let request = GenerateQrCodesRequest {
                count,
                prefix,
                initial_points,
            };
            let response = commands::generate(db.pool(), request).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::CreateUser { email, username } => {
            let request = CreateUserRequest { email, username };
            let user = commands::create_user(db.pool(), request).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Commands::Reconcile => {
            commands::reconcile(db.pool()).await?;
        }
    }

    Ok(())
}

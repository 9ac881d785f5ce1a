use std::path::PathBuf;

use chrono::{Duration, SecondsFormat, Utc};
use clap::Parser;
use fake::{Fake, faker::lorem::en::{Paragraph, Sentence}};
use rand::Rng;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use musiqhub::{
    auth,
    domain::{Announcement, CreateUserRequest, GENRES},
    error::AppError,
    repository::{
        AnnouncementRepository, SqliteAnnouncementRepository,
        SqliteUserRepository, UserRepository,
    },
};

/// Fill a MusiqHub store with demo accounts and announcements.
#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(version)]
struct Args {
    /// SQLite database to seed
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://musiqhub.db?mode=rwc")]
    database_url: String,

    /// Write announcements to this JSON file instead of the database
    #[arg(long)]
    json: Option<PathBuf>,

    /// Announcements generated per genre
    #[arg(long, default_value_t = 4)]
    per_genre: usize,

    /// Password for the AdminMusiq account (random when omitted)
    #[arg(long, env = "MUSIQHUB_SEED_ADMIN_PASSWORD")]
    admin_password: Option<String>,

    /// Password for the MusicFan account (random when omitted)
    #[arg(long, env = "MUSIQHUB_SEED_USER_PASSWORD")]
    user_password: Option<String>,
}

const ADMIN: &str = "AdminMusiq";
const FAN: &str = "MusicFan";

fn demo_announcements(per_genre: usize) -> Vec<Announcement> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    GENRES
        .iter()
        .flat_map(|genre| std::iter::repeat(genre).take(per_genre))
        .map(|genre| {
            let title: String = Sentence(3..7).fake();
            let content: String = Paragraph(2..4).fake();
            let posted = now - Duration::minutes(rng.gen_range(5..60 * 24 * 30));
            Announcement {
                id: Uuid::new_v4().to_string(),
                title: title.trim_end_matches('.').to_string(),
                content,
                genre: genre.key.to_string(),
                author: if rng.gen_bool(0.5) { ADMIN } else { FAN }.to_string(),
                timestamp: posted.to_rfc3339_opts(SecondsFormat::Micros, true),
                image: None,
            }
        })
        .collect()
}

fn password_or_random(given: Option<String>, who: &str) -> String {
    given.unwrap_or_else(|| {
        let generated = auth::generate_token()[..16].to_string();
        println!("  🔑 Generated password for {}: {}", who, generated);
        generated
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    println!("🌱 Starting seeding...");

    let announcements = demo_announcements(args.per_genre);

    if let Some(path) = args.json {
        let json = serde_json::to_string_pretty(&announcements)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, json)?;
        println!("✅ Wrote {} announcements to {}", announcements.len(), path.display());
        return Ok(());
    }

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&args.database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let user_repo = SqliteUserRepository::new(db_pool.clone());
    let announcement_repo = SqliteAnnouncementRepository::new(db_pool.clone());

    println!("👥 Creating accounts...");
    let accounts = [
        (ADMIN, password_or_random(args.admin_password, ADMIN), true),
        (FAN, password_or_random(args.user_password, FAN), false),
    ];
    for (identifier, password, is_admin) in accounts {
        let created = user_repo
            .create(CreateUserRequest {
                identifier: identifier.to_string(),
                display_name: None,
                password_hash: auth::hash_password(&password)?,
                is_admin,
            })
            .await;
        match created {
            Ok(_) => println!("  ✅ {}{}", identifier, if is_admin { " (admin)" } else { "" }),
            Err(AppError::DuplicateIdentifier(_)) => println!("  ↪️  {} already exists, skipped", identifier),
            Err(e) => return Err(e.into()),
        }
    }

    println!("📰 Creating announcements...");
    let count = announcements.len();
    for announcement in announcements {
        announcement_repo.create(announcement).await?;
    }
    println!("  ✅ {} announcements across {} genres", count, GENRES.len());

    println!("🎉 Seeding complete");
    Ok(())
}

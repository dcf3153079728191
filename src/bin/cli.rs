use clap::{Parser, Subcommand};
use pairglide_match::{
    chat::SqliteChatStore,
    providers::{CandidateRepository, SqliteRepository},
    ranking::distance_km,
    EngineConfig, MatchEngine, ProfileDocument, ScoreAgainst, SearchRequest, Session,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pairglide-cli")]
#[command(about = "PairGlide matching engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database path (overrides config)
    #[arg(short, long)]
    db: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a JSON array of profile documents
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Rank candidates for a stored user
    Rank {
        /// Searching user id
        #[arg(short, long)]
        user: String,

        /// Required skills (defaults to the user's own)
        #[arg(short, long, value_delimiter = ',')]
        skills: Vec<String>,

        /// Score against the requested skills instead of the profile's
        #[arg(long)]
        by_request: bool,
    },

    /// Get or create the chat room for two users
    Room {
        user_a: String,
        user_b: String,
    },

    /// Truncated great-circle distance in km
    Distance {
        lon1: f64,
        lat1: f64,
        lon2: f64,
        lat2: f64,
    },
}

/// Profile store plus an engine over it, both on `config.database_path`
async fn open(config: EngineConfig) -> anyhow::Result<(Arc<SqliteRepository>, MatchEngine)> {
    let profiles = Arc::new(SqliteRepository::new(&config.database_path).await?);
    let chat = Arc::new(SqliteChatStore::new(&config.database_path, config.message_buffer).await?);
    let engine = MatchEngine::new(profiles.clone(), chat, config);
    Ok((profiles, engine))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pairglide_match=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_yaml_file(path).await?,
        None => EngineConfig::default(),
    }
    .apply_env()?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }

    match cli.command {
        Commands::Import { file } => {
            let (profiles, _) = open(config).await?;
            let content = tokio::fs::read_to_string(&file).await?;
            let docs: Vec<ProfileDocument> = serde_json::from_str(&content)?;

            let mut imported = 0usize;
            for doc in &docs {
                match profiles.upsert(doc).await {
                    Ok(_) => imported += 1,
                    Err(e) => eprintln!("⚠️  Skipped document: {}", e),
                }
            }

            println!("✅ Imported {}/{} profiles ({} stored)", imported, docs.len(), profiles.count().await?);
        }

        Commands::Rank { user, skills, by_request } => {
            let (profiles, engine) = open(config).await?;
            let me = profiles
                .get(&user)
                .await?
                .ok_or_else(|| anyhow::anyhow!("unknown user: {}", user))?;

            let skills = if skills.is_empty() {
                me.skills.iter().cloned().collect()
            } else {
                skills
            };
            let mut request = SearchRequest::new(skills);
            if by_request {
                request = request.scored_against(ScoreAgainst::RequestedSkills);
            }

            println!("🔍 Ranking for {} on {:?}", me.display_name(), request.skills);
            let ranked = engine.search(&Session::new(me), &request).await?;

            if ranked.is_empty() {
                println!("No matches found");
            }
            for (i, candidate) in ranked.iter().enumerate() {
                println!(
                    "{:>3}. {:<30} score {:>7}  {:>2} shared  {:>6} km",
                    i + 1,
                    candidate.profile.display_name(),
                    candidate.composite_score,
                    candidate.shared_skills,
                    candidate.physical_distance_km
                );
            }
        }

        Commands::Room { user_a, user_b } => {
            let (_, engine) = open(config).await?;
            let room = engine.resolver().get_or_create_room(&user_a, &user_b).await?;
            println!("💬 {}", room);
        }

        Commands::Distance { lon1, lat1, lon2, lat2 } => {
            println!("{} km", distance_km(lon1, lat1, lon2, lat2));
        }
    }

    Ok(())
}

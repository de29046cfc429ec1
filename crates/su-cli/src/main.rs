use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use serde::Serialize;
use su_common::{
    config::MatcherConfig,
    embedding::{create_provider, regenerate_embeddings, RegenerationItem},
    logging::{init_tracing_subscriber, install_tracing_panic_hook},
    matching::{
        pipeline::fill_missing_embeddings, rank_candidates, recommend_clubs,
        weights::WeightOverrides, ClubPool, UserPreferences, Weights,
    },
    records::{load_json, load_profiles, ProfileRecord},
    search::{expand_query, search_profiles, KeywordQueryExpander, QueryExpansion},
    MatchError,
};
use tracing::{info, warn};

const APP_NAME: &str = "su-cli";

#[derive(Debug, Parser)]
#[command(name = "su-cli", about = "Colleague and club matching for sureUs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank colleague candidates for a viewer
    Match {
        /// Viewer profile record (JSON object)
        #[arg(long)]
        viewer: PathBuf,

        /// Candidate profile records (JSON array)
        #[arg(long)]
        candidates: PathBuf,

        /// Viewer preferences (JSON object)
        #[arg(long)]
        preferences: Option<PathBuf>,

        /// Per-request weight overrides (JSON object); applied on top of defaults
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Results to return (defaults to SU_MATCH_PAGE_SIZE)
        #[arg(long)]
        limit: Option<usize>,

        /// Generate embeddings for profiles that have none before scoring
        #[arg(long, default_value_t = false)]
        embed_missing: bool,
    },

    /// Recommend clubs for a user
    Clubs {
        /// Club pool (JSON object with user, clubs, member_profiles, memberships, recommended_user_ids)
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        limit: Option<usize>,

        /// Keep clubs the user already belongs to
        #[arg(long, default_value_t = false)]
        include_joined: bool,
    },

    /// Search profiles with a natural-language query
    Search {
        #[arg(long)]
        query: String,

        /// Candidate profile records (JSON array)
        #[arg(long)]
        candidates: PathBuf,

        /// Structured hints from the query-expansion service; keyword split when absent
        #[arg(long)]
        expansion: Option<PathBuf>,

        /// Searcher's user id, excluded from results
        #[arg(long)]
        exclude_user: Option<String>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Regenerate profile embeddings with the configured provider
    Embed {
        /// Profile records (JSON array)
        #[arg(long)]
        input: PathBuf,

        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), MatchError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run() -> Result<(), MatchError> {
    dotenv().ok();
    init_tracing_subscriber(APP_NAME);
    install_tracing_panic_hook(APP_NAME);

    let cli = Cli::parse();
    let config = MatcherConfig::from_env()?;
    let dimension = config.embedding.dimension;

    match cli.command {
        Command::Match {
            viewer,
            candidates,
            preferences,
            weights,
            limit,
            embed_missing,
        } => {
            // the viewer sees their own private fields
            let mut viewer_record: ProfileRecord = load_json(&viewer)?;
            viewer_record.visibility.clear();
            let mut viewer = viewer_record.into_profile(dimension);

            let mut candidates = load_profiles(&candidates, dimension)?;
            let preferences: Option<UserPreferences> =
                preferences.map(|path| load_json(&path)).transpose()?;
            let weights = match weights {
                Some(path) => {
                    let overrides: WeightOverrides = load_json(&path)?;
                    Weights::resolve(Some(&overrides))?
                }
                None => config.weights,
            };

            if embed_missing {
                match create_provider(&config.embedding) {
                    Ok(provider) => {
                        fill_missing_embeddings(provider.as_ref(), std::slice::from_mut(&mut viewer))
                            .await;
                        let filled = fill_missing_embeddings(provider.as_ref(), &mut candidates).await;
                        info!(provider = provider.name(), filled, "missing embeddings generated");
                    }
                    Err(err) if err.is_unavailable() => {
                        warn!(error = %err, "embedding provider unavailable; missing slots stay empty");
                    }
                    Err(err) => return Err(err.into()),
                }
            }

            let mut options = config.ranking();
            if let Some(limit) = limit {
                options.page_size = limit;
            }

            let ranked = rank_candidates(&viewer, &candidates, preferences.as_ref(), &weights, options);
            print_json(&ranked)
        }

        Command::Clubs {
            input,
            limit,
            include_joined,
        } => {
            let pool: ClubPool = load_json(&input)?;
            let recommendations = recommend_clubs(
                &pool,
                &config.club_weights,
                !include_joined,
                limit.unwrap_or(config.page_size),
            );
            print_json(&recommendations)
        }

        Command::Search {
            query,
            candidates,
            expansion,
            exclude_user,
            limit,
        } => {
            let profiles = load_profiles(&candidates, dimension)?;
            let expansion: QueryExpansion = match expansion {
                Some(path) => load_json(&path)?,
                None => expand_query(&KeywordQueryExpander, &query).await,
            };
            let results = search_profiles(
                &profiles,
                &expansion,
                exclude_user.as_deref(),
                limit.unwrap_or(config.page_size),
            );
            print_json(&results)
        }

        Command::Embed { input, output } => {
            // private text stays out of vectors other users are scored against
            let provider = create_provider(&config.embedding)?;
            let records: Vec<ProfileRecord> = load_json(&input)?;
            let items: Vec<RegenerationItem> = records
                .into_iter()
                .map(|record| RegenerationItem::from_profile(&record.into_profile(dimension)))
                .collect();

            let report =
                regenerate_embeddings(provider.as_ref(), &items, config.embedding.batch_delay()).await;

            match output {
                Some(path) => {
                    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
                    info!(path = %path.display(), run_id = %report.run_id, "embedding report written");
                    Ok(())
                }
                None => print_json(&report),
            }
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!(error = %err, "su-cli failed");
        eprintln!("su-cli failed: {err}");
        std::process::exit(1);
    }
}

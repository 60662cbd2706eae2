use analytics::{render_delimited, render_json, Analytics};
use clap::{Parser, Subcommand};
use database::Database;
use mock_source::MockSource;
use platewatch_core::AppConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "platewatch", about = "Restaurant social-media engagement analytics")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "platewatch.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Track a restaurant handle
    Add { handle: String },
    /// Stop tracking a restaurant handle
    Remove { handle: String },
    /// List tracked handles
    List,
    /// Top restaurants by engagement rate
    Top {
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },
    /// Top restaurants by growth rate
    Trending {
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },
    /// Most used hashtags across tracked restaurants
    Hashtags {
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },
    /// Detailed summary for one restaurant
    Summary { handle: String },
    /// Dump the full analytics table
    Export {
        /// Emit JSON instead of delimited text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "platewatch=info".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    let db = Database::connect(&config.database_url).await?;

    match cli.command {
        Command::Add { handle } => {
            let stored = db.add_restaurant(&handle).await?;
            println!("Tracking {stored}");
        }
        Command::Remove { handle } => {
            if db.remove_restaurant(&handle).await? {
                println!("Stopped tracking {handle}");
            } else {
                println!("{handle} was not tracked");
            }
        }
        Command::List => {
            for handle in db.list_restaurants().await? {
                println!("{handle}");
            }
        }
        command => {
            let analytics = build_analytics(&config, db).await?;
            run_analytics_command(command, &config, analytics).await?;
        }
    }

    Ok(())
}

/// Seed the registry on first run, snapshot it, and wire the analytics
/// context over the mock post source.
async fn build_analytics(
    config: &AppConfig,
    db: Database,
) -> anyhow::Result<Analytics<MockSource, Database>> {
    if db.list_restaurants().await?.is_empty() {
        tracing::info!("Registry is empty, seeding from configuration");
        for handle in &config.restaurants {
            db.add_restaurant(handle).await?;
        }
    }

    let tracked = db.list_restaurants().await?;
    let store = MockSource::new(&tracked, chrono::Utc::now());
    Ok(Analytics::new(store, db).with_trend_window(config.trend_window_days))
}

async fn run_analytics_command(
    command: Command,
    config: &AppConfig,
    analytics: Analytics<MockSource, Database>,
) -> anyhow::Result<()> {
    match command {
        Command::Top { count } => {
            for record in analytics.top_restaurants(count).await? {
                println!(
                    "{:<24} {:>8.2}%  {:>7} followers  {:>4} posts",
                    record.restaurant,
                    record.engagement_rate,
                    record.follower_count,
                    record.post_count
                );
            }
        }
        Command::Trending { count } => {
            for trend in analytics.trending_restaurants(count).await? {
                println!("{:<24} {:>+8.2}%", trend.restaurant, trend.growth_rate);
            }
        }
        Command::Hashtags { count } => {
            for (tag, uses) in analytics.top_hashtags(count).await? {
                println!("{tag:<24} {uses:>5}");
            }
        }
        Command::Summary { handle } => match analytics.summary(&handle).await? {
            Some(summary) => {
                println!("Followers:        {}", summary.follower_count);
                println!("Total posts:      {}", summary.post_count);
                println!("Average likes:    {:.2}", summary.avg_likes);
                println!("Average comments: {:.2}", summary.avg_comments);
                let tags: Vec<String> = summary
                    .top_tags
                    .iter()
                    .map(|(tag, uses)| format!("{tag} ({uses})"))
                    .collect();
                println!("Top tags:         {}", tags.join(", "));
            }
            None => anyhow::bail!("no data for {handle}; is it tracked?"),
        },
        Command::Export { json } => {
            let rows = analytics.export().await?;
            if json {
                println!("{}", render_json(&rows)?);
            } else {
                print!("{}", render_delimited(&rows, config.export_delimiter));
            }
        }
        // Registry commands are handled before analytics wiring
        Command::Add { .. } | Command::Remove { .. } | Command::List => unreachable!(),
    }
    Ok(())
}

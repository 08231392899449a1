use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use persona_map::app::heatmap_use_case::{HeatmapSearch, MapSession};
use persona_map::app::persona_search_use_case::{PersonaBoard, PersonaSearch};
use persona_map::app::resolve_use_case::LocationResolver;
use persona_map::config::Config;
use persona_map::infra::{HttpDirectoryFeed, HttpMapPointFeed, NominatimGeocoder};
use persona_map::logging;
use persona_map::pipeline::filter::filter;
use persona_map::pipeline::normalize::normalize_batch;
use persona_map::{classify, CategoryFilter, FilterState, MapError, Persona, RawRecord};

#[derive(Parser)]
#[command(name = "persona_map")]
#[command(about = "Discover local creative professionals and their density on a map")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $PERSONA_MAP_CONFIG or ./persona_map.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and list professionals for a postal code
    Personas {
        #[arg(long)]
        postal_code: String,
        /// all, architect, designer, photographer, influencer, furnishing or other
        #[arg(long, default_value = "all")]
        category: CategoryFilter,
        /// Minimum rating; 0 means any
        #[arg(long, default_value_t = 0.0)]
        min_rating: f64,
        /// Print map pins instead of the persona list
        #[arg(long)]
        pins: bool,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Ask the directory backend to rescan a postal code
    Scrape {
        #[arg(long)]
        postal_code: String,
    },
    /// Resolve a location and load the heat layer for it
    Heatmap {
        /// Pincode or address
        location: String,
        #[arg(long)]
        json: bool,
    },
    /// Normalize a JSON array of raw records from a file
    Normalize {
        input: PathBuf,
        #[arg(long, default_value = "all")]
        category: CategoryFilter,
        #[arg(long, default_value_t = 0.0)]
        min_rating: f64,
    },
    /// Show the category a label classifies as
    Classify { label: String },
}

fn print_personas(heading: &str, personas: &[Persona]) {
    println!("\n{} ({} found)", heading, personas.len());
    for persona in personas {
        println!(
            "   ★ {:.1}  {:<32} {:<13} {} reviews  {}",
            persona.rating,
            persona.name,
            persona.category,
            persona.review_count,
            persona.location
        );
        if !persona.contact.is_empty() {
            println!("          contact: {}", persona.contact);
        }
        if let Some(portfolio) = &persona.portfolio_url {
            println!("          portfolio: {}", portfolio);
        }
    }
}

/// User-input errors get a hint instead of a failure banner.
fn report(err: &MapError) {
    if err.is_user_input() {
        println!("⚠️  {}", err);
    } else {
        error!("{}", err);
        println!("❌ {}", err);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_from(cli.config.as_deref())?;
    logging::init_logging(&config.logging);

    match cli.command {
        Commands::Personas {
            postal_code,
            category,
            min_rating,
            pins,
            json,
        } => {
            let directory = Arc::new(HttpDirectoryFeed::new(&config.directory)?);
            let search = PersonaSearch::new(directory.clone(), directory);
            let mut board = PersonaBoard::new();
            board.set_filter(FilterState::new(category, min_rating));

            if let Err(e) = search.search_into(&mut board, &postal_code).await {
                report(&e);
                return Ok(());
            }
            if board.personas.is_empty() {
                println!("⚠️  No professionals found. Try a different pincode");
                return Ok(());
            }

            info!("Personas generated for {}", postal_code);
            match (pins, json) {
                (true, true) => println!("{}", serde_json::to_string_pretty(&board.pins())?),
                (true, false) => {
                    for pin in board.pins() {
                        println!(
                            "📍 {}  {} ({}, {})  {}",
                            pin.coordinates,
                            pin.name,
                            pin.category,
                            pin.category.map_color().unwrap_or("gray"),
                            pin.location
                        );
                    }
                }
                (false, true) => println!("{}", serde_json::to_string_pretty(&board.visible())?),
                (false, false) => print_personas(category.heading(), &board.visible()),
            }
        }
        Commands::Scrape { postal_code } => {
            let directory = Arc::new(HttpDirectoryFeed::new(&config.directory)?);
            let search = PersonaSearch::new(directory.clone(), directory);

            println!("🔄 Scraping started for {}...", postal_code.trim());
            match search.refresh(&postal_code).await {
                Ok(message) => println!("✅ Scraping completed: {}", message),
                Err(e) => report(&e),
            }
        }
        Commands::Heatmap { location, json } => {
            let geocoder = Arc::new(NominatimGeocoder::new(&config.geocoder)?);
            let points = Arc::new(HttpMapPointFeed::new(&config.map_points)?);
            let heatmap = HeatmapSearch::new(
                LocationResolver::new(geocoder),
                points,
                config.heatmap.clone(),
                config.map.search_zoom,
            );
            let mut session = MapSession::from_config(&config.map);

            if let Err(e) = heatmap.search_into(&mut session, &location).await {
                report(&e);
                return Ok(());
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&session)?);
            } else if let Some(layer) = session.heat_layer() {
                println!("🗺️  Center {} zoom {}", session.center, session.zoom);
                println!("🔥 {} heat points for {}", layer.points.len(), layer.label);
                for point in &layer.points {
                    println!(
                        "   {:>9.4} {:>9.4}  {:.2} {}",
                        point.lat,
                        point.lng,
                        point.intensity,
                        layer.options.color_for(point.intensity).unwrap_or("-")
                    );
                }
            }
        }
        Commands::Normalize {
            input,
            category,
            min_rating,
        } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let records: Vec<RawRecord> = serde_json::from_str(&content)
                .with_context(|| format!("{} is not a JSON array of records", input.display()))?;

            let personas = filter(&normalize_batch(&records), &FilterState::new(category, min_rating));
            println!("{}", serde_json::to_string_pretty(&personas)?);
        }
        Commands::Classify { label } => {
            println!("{}", classify(&label));
        }
    }

    Ok(())
}

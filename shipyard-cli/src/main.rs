#![deny(missing_docs)]
//! Shipyard command-line interface.
//!
//! Administers the ship catalog through the Shipyard server's REST API.

mod client;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use client::{CatalogClient, DEFAULT_SERVER_URL};
use shipyard_core::{
    PageParams, Ship, ShipFilter, ShipPatch, ShipType, SortField, parse_ship_id, start_of_year,
};
use std::fmt::Write;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "shipyard", version, about = "Shipyard catalog CLI")]
struct Cli {
    /// Base URL of the Shipyard server.
    #[arg(long, global = true, env = "SHIPYARD_API_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Clone, Debug, Default)]
struct FilterArgs {
    /// Name substring, case-insensitive.
    #[arg(long)]
    name: Option<String>,
    /// Planet substring, case-insensitive.
    #[arg(long)]
    planet: Option<String>,
    /// Ship type (TRANSPORT, MILITARY, MERCHANT).
    #[arg(long)]
    ship_type: Option<ShipType>,
    /// Earliest production instant, epoch milliseconds.
    #[arg(long)]
    after: Option<i64>,
    /// Production instant upper bound, epoch milliseconds.
    #[arg(long)]
    before: Option<i64>,
    /// Usage flag.
    #[arg(long)]
    used: Option<bool>,
    /// Minimum speed.
    #[arg(long)]
    min_speed: Option<f64>,
    /// Maximum speed.
    #[arg(long)]
    max_speed: Option<f64>,
    /// Minimum crew size.
    #[arg(long)]
    min_crew_size: Option<i32>,
    /// Maximum crew size.
    #[arg(long)]
    max_crew_size: Option<i32>,
    /// Minimum rating.
    #[arg(long)]
    min_rating: Option<f64>,
    /// Maximum rating.
    #[arg(long)]
    max_rating: Option<f64>,
}

impl FilterArgs {
    fn into_filter(self) -> ShipFilter {
        ShipFilter {
            name: self.name,
            planet: self.planet,
            ship_type: self.ship_type,
            after: self.after,
            before: self.before,
            is_used: self.used,
            min_speed: self.min_speed,
            max_speed: self.max_speed,
            min_crew_size: self.min_crew_size,
            max_crew_size: self.max_crew_size,
            min_rating: self.min_rating,
            max_rating: self.max_rating,
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
struct PageArgs {
    /// Sort field (ID, SPEED, CREW_SIZE, RATING, PROD_DATE).
    #[arg(long)]
    order: Option<SortField>,
    /// Zero-based page number.
    #[arg(long)]
    page_number: Option<u32>,
    /// Ships per page.
    #[arg(long)]
    page_size: Option<u32>,
}

#[derive(Args, Clone, Debug, Default)]
struct ShipArgs {
    /// Ship name.
    #[arg(long)]
    name: Option<String>,
    /// Home planet.
    #[arg(long)]
    planet: Option<String>,
    /// Ship type (TRANSPORT, MILITARY, MERCHANT).
    #[arg(long)]
    ship_type: Option<ShipType>,
    /// Production instant, epoch milliseconds.
    #[arg(long, conflicts_with = "prod_year")]
    prod_date: Option<i64>,
    /// Production year, stored as January 1st UTC.
    #[arg(long)]
    prod_year: Option<i32>,
    /// Whether the ship has been used before.
    #[arg(long)]
    used: Option<bool>,
    /// Maximum speed.
    #[arg(long)]
    speed: Option<f64>,
    /// Number of crew members.
    #[arg(long)]
    crew_size: Option<i32>,
}

impl ShipArgs {
    fn into_patch(self) -> CliResult<ShipPatch> {
        let prod_date = match (self.prod_date, self.prod_year) {
            (Some(millis), _) => Some(millis_to_date(millis)?),
            (None, Some(year)) => Some(
                start_of_year(year).ok_or_else(|| format!("year {year} is out of range"))?,
            ),
            (None, None) => None,
        };
        Ok(ShipPatch {
            name: self.name,
            planet: self.planet,
            ship_type: self.ship_type,
            prod_date,
            is_used: self.used,
            speed: self.speed,
            crew_size: self.crew_size,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of ships matching the filters.
    List {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Count ships matching the filters.
    Count {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show one ship.
    Get {
        /// Ship identifier.
        id: String,
    },
    /// Create a ship; every field except --used is required.
    Create {
        #[command(flatten)]
        ship: ShipArgs,
    },
    /// Overwrite the given fields of a ship.
    Update {
        /// Ship identifier.
        id: String,
        #[command(flatten)]
        ship: ShipArgs,
    },
    /// Delete a ship.
    Delete {
        /// Ship identifier.
        id: String,
    },
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let output = run(cli).await?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

#[cfg(test)]
fn main() {}

async fn run(cli: Cli) -> CliResult<String> {
    let client = CatalogClient::new(&cli.server_url)?;
    let format = cli.format;
    match cli.command {
        Commands::List { filter, page } => {
            let page = PageParams {
                order: page.order,
                page_number: page.page_number,
                page_size: page.page_size,
            };
            let ships = client.list(&filter.into_filter(), &page).await?;
            render_ships(&ships, format)
        }
        Commands::Count { filter } => {
            let count = client.count(&filter.into_filter()).await?;
            Ok(count.to_string())
        }
        Commands::Get { id } => {
            let ship = client.get(parse_ship_id(&id)?).await?;
            render_ship(&ship, format)
        }
        Commands::Create { ship } => {
            let ship = client.create(&ship.into_patch()?).await?;
            render_ship(&ship, format)
        }
        Commands::Update { id, ship } => {
            let id = parse_ship_id(&id)?;
            let patch = ship.into_patch()?;
            if patch.is_empty() {
                return Err("nothing to update, pass at least one field".into());
            }
            let ship = client.update(id, &patch).await?;
            render_ship(&ship, format)
        }
        Commands::Delete { id } => {
            let id = parse_ship_id(&id)?;
            client.delete(id).await?;
            Ok(format!("Deleted ship {id}."))
        }
    }
}

fn millis_to_date(millis: i64) -> CliResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| format!("{millis} is not a valid timestamp").into())
}

fn render_ship(ship: &Ship, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(ship)?),
        OutputFormat::Text => Ok(ship_line(ship)),
    }
}

fn render_ships(ships: &[Ship], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(ships)?),
        OutputFormat::Text => {
            if ships.is_empty() {
                return Ok("No ships found.".to_string());
            }
            let mut out = String::new();
            for ship in ships {
                let _ = writeln!(out, "{}", ship_line(ship));
            }
            Ok(out.trim_end().to_string())
        }
    }
}

fn ship_line(ship: &Ship) -> String {
    format!(
        "#{} {} ({}) {} year {} {} speed {} crew {} rating {}",
        ship.id,
        ship.name,
        ship.planet,
        ship.ship_type,
        ship.prod_year(),
        if ship.is_used { "used" } else { "new" },
        ship.speed,
        ship.crew_size,
        ship.rating
    )
}

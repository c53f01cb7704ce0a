use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use neowatch::data::{filter, loader, writer};
use neowatch::{limit, NeoDatabase, QueryCriteria};

// ---------------------------------------------------------------------------
// Command-line interface
// ---------------------------------------------------------------------------

/// Explore close approaches of near-Earth objects.
#[derive(Debug, Parser)]
#[command(name = "neowatch", version)]
struct Cli {
    #[command(flatten)]
    data: DataPaths,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct DataPaths {
    /// Path to the NEO catalog CSV file.
    #[arg(long, global = true, default_value = "data/neos.csv")]
    neofile: PathBuf,

    /// Path to the close-approach JSON file.
    #[arg(long, global = true, default_value = "data/cad.json")]
    cadfile: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print details of a single NEO, found by designation or by name.
    Inspect {
        /// Primary designation to look up.
        #[arg(long, conflicts_with = "name")]
        pdes: Option<String>,

        /// IAU name to look up.
        #[arg(long)]
        name: Option<String>,

        /// Also list the NEO's close approaches.
        #[arg(long, short)]
        verbose: bool,
    },

    /// Query close approaches matching the given criteria.
    Query {
        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Maximum number of results (0 means unlimited).
        #[arg(long)]
        limit: Option<usize>,

        /// Write results to this file (.csv or .json) instead of printing.
        #[arg(long)]
        outfile: Option<PathBuf>,
    },
}

/// One CLI flag per query criterion; unset flags leave the attribute
/// unconstrained. Dates are `YYYY-MM-DD`.
#[derive(Debug, Args)]
struct CriteriaArgs {
    /// Only approaches on exactly this date.
    #[arg(long, conflicts_with_all = ["start_date", "end_date"])]
    date: Option<NaiveDate>,

    /// Only approaches on or after this date.
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Only approaches on or before this date.
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Minimum approach distance in astronomical units.
    #[arg(long)]
    min_distance: Option<f64>,

    /// Maximum approach distance in astronomical units.
    #[arg(long)]
    max_distance: Option<f64>,

    /// Minimum relative velocity in km/s.
    #[arg(long)]
    min_velocity: Option<f64>,

    /// Maximum relative velocity in km/s.
    #[arg(long)]
    max_velocity: Option<f64>,

    /// Minimum NEO diameter in kilometers.
    #[arg(long)]
    min_diameter: Option<f64>,

    /// Maximum NEO diameter in kilometers.
    #[arg(long)]
    max_diameter: Option<f64>,

    /// Only approaches of hazardous NEOs.
    #[arg(long, conflicts_with = "not_hazardous")]
    hazardous: bool,

    /// Only approaches of non-hazardous NEOs.
    #[arg(long)]
    not_hazardous: bool,
}

impl CriteriaArgs {
    fn into_criteria(self) -> QueryCriteria {
        QueryCriteria {
            date: self.date,
            start_date: self.start_date,
            end_date: self.end_date,
            distance_min: self.min_distance,
            distance_max: self.max_distance,
            velocity_min: self.min_velocity,
            velocity_max: self.max_velocity,
            diameter_min: self.min_diameter,
            diameter_max: self.max_diameter,
            hazardous: match (self.hazardous, self.not_hazardous) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let neos = loader::load_neos(&cli.data.neofile)?;
    let approaches = loader::load_approaches(&cli.data.cadfile)?;
    let db = NeoDatabase::new(neos, approaches);

    match cli.command {
        Command::Inspect { pdes, name, verbose } => inspect(&db, pdes, name, verbose),
        Command::Query {
            criteria,
            limit: max_results,
            outfile,
        } => query(&db, criteria.into_criteria(), max_results, outfile),
    }
}

fn inspect(db: &NeoDatabase, pdes: Option<String>, name: Option<String>, verbose: bool) -> Result<()> {
    let neo = match (&pdes, &name) {
        (Some(pdes), _) => db.get_neo_by_designation(pdes),
        (None, Some(name)) => db.get_neo_by_name(name),
        (None, None) => bail!("inspect needs --pdes or --name"),
    };
    let Some(neo) = neo else {
        bail!("no matching NEO found");
    };

    println!("{neo}");
    if verbose {
        for approach in db.approaches_of(neo) {
            println!("- {approach}");
        }
    }
    Ok(())
}

fn query(
    db: &NeoDatabase,
    criteria: QueryCriteria,
    max_results: Option<usize>,
    outfile: Option<PathBuf>,
) -> Result<()> {
    let filters = filter::create_filters(&criteria);
    let results = limit(db.query(&filters), max_results);

    match outfile {
        None => {
            for approach in results {
                println!("{approach}");
            }
        }
        Some(path) => {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_ascii_lowercase();
            match ext.as_str() {
                "csv" => writer::write_csv(db, results, &path)?,
                "json" => writer::write_json(db, results, &path)?,
                other => bail!("unsupported output extension: .{other}"),
            }
            println!("Results written to {}", path.display());
        }
    }
    Ok(())
}

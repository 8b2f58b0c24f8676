use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use skyvault::healpix::{Frame, Ordering, PixelIndexConfig};
use skyvault::store::MemoryStore;
use skyvault::{CatalogRecord, ConeSearcher, Coordinate, SearchRequest, Strategy};

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, ValueEnum)]
enum StrategyArg {
    Ellipsoid,
    Pixel,
}

#[derive(Parser)]
#[command(name = "skyvault-query")]
#[command(about = "Cone searches over a JSON catalog file")]
struct Cli {
    /// Path to a JSON array of catalog records
    #[arg(long)]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print catalog and index information
    Info,
    /// Perform a cone search
    Search {
        /// Right ascension of the cone center, in degrees
        #[arg(allow_negative_numbers = true)]
        ra: f64,
        /// Declination of the cone center, in degrees
        #[arg(allow_negative_numbers = true)]
        dec: f64,
        /// Search radius in degrees
        #[arg(long, default_value = "0.1", conflicts_with = "radius_arcsec")]
        radius: f64,
        /// Search radius in arcseconds (alternative to --radius)
        #[arg(long)]
        radius_arcsec: Option<f64>,
        /// Index strategy
        #[arg(long, value_enum, default_value = "pixel")]
        strategy: StrategyArg,
        /// Pixelization resolution in arcseconds
        #[arg(long, default_value = "10.0")]
        resolution_arcsec: f64,
        /// Pixel-strategy radius cap in degrees
        #[arg(long, default_value = "0.5")]
        max_radius: f64,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
        /// Print query timing
        #[arg(long)]
        timing: bool,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

fn load_records(path: &PathBuf) -> anyhow::Result<Vec<CatalogRecord>> {
    let data = std::fs::read_to_string(path)?;
    let records: Vec<CatalogRecord> = serde_json::from_str(&data)?;
    Ok(records)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let records = load_records(&cli.catalog)?;

    match cli.command {
        Commands::Info => {
            let config =
                PixelIndexConfig::for_resolution(10.0, Ordering::Nested, Frame::Icrs)?;
            println!("Records: {}", records.len());
            println!("Pixel config: {}", config.fingerprint());
            println!("Pixel edge: {:.2}\"", config.pixel_edge_arcsec());
            println!("npix: {}", config.npix());
        }
        Commands::Search {
            ra,
            dec,
            radius,
            radius_arcsec,
            strategy,
            resolution_arcsec,
            max_radius,
            limit,
            timing,
            format,
        } => {
            let radius_deg = match radius_arcsec {
                Some(arcsec) => arcsec / 3600.0,
                None => radius,
            };

            let store = MemoryStore::new();
            let config = PixelIndexConfig::for_resolution(
                resolution_arcsec,
                Ordering::Nested,
                Frame::Icrs,
            )?;
            let searcher = ConeSearcher::new(&store, config).with_max_radius(max_radius);
            searcher.index_records(&records)?;

            let mut request =
                SearchRequest::new(Coordinate::new(ra, dec)?, radius_deg);
            request.limit = limit;

            let strategy = match strategy {
                StrategyArg::Ellipsoid => Strategy::EllipsoidIndex,
                StrategyArg::Pixel => Strategy::PixelIndex,
            };

            let start = Instant::now();
            let matches = searcher.search(&request, strategy)?;
            let elapsed = start.elapsed();

            match format {
                OutputFormat::Json => {
                    let rows: Vec<serde_json::Value> = matches
                        .iter()
                        .map(|m| {
                            serde_json::json!({
                                "designation": m.record.designation,
                                "ra": m.record.coord.ra_deg(),
                                "dec": m.record.coord.dec_deg(),
                                "separation_deg": m.separation_deg,
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                }
                OutputFormat::Table => {
                    println!(
                        "{} records within {:.4}° of ({:.4}, {:+.4}):\n",
                        matches.len(),
                        radius_deg,
                        ra,
                        dec
                    );
                    for m in &matches {
                        println!(
                            "  {:<28}  RA {:>10.6}°  Dec {:>+10.6}°  sep {:.4}°",
                            m.record.designation,
                            m.record.coord.ra_deg(),
                            m.record.coord.dec_deg(),
                            m.separation_deg,
                        );
                    }
                }
            }

            if timing {
                println!("\nQuery time: {:?}", elapsed);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_accepts_negative_declination() {
        let cli = Cli::try_parse_from([
            "skyvault-query",
            "--catalog",
            "catalog.json",
            "search",
            "181.9",
            "-39.5",
            "--radius-arcsec",
            "180",
        ])
        .unwrap();
        match cli.command {
            Commands::Search { ra, dec, .. } => {
                assert_eq!(ra, 181.9);
                assert_eq!(dec, -39.5);
            }
            _ => panic!("expected search subcommand"),
        }
    }

    #[test]
    fn test_radius_flags_conflict() {
        let result = Cli::try_parse_from([
            "skyvault-query",
            "--catalog",
            "catalog.json",
            "search",
            "10.0",
            "20.0",
            "--radius",
            "0.2",
            "--radius-arcsec",
            "180",
        ]);
        assert!(result.is_err());
    }
}

use clap::Parser;
use geoload::geocode::{GeocodeClient, DEFAULT_SERVICE_URL};
use geoload::loader::Loader;
use geoload::store::LocationStore;

/// geoload — batch geocoding loader with a persistent SQLite cache.
///
/// Reads one place name per line from the input file, fetches geodata for
/// each from the geocoding service, and stores the raw response in the
/// `Locations` table of the database file. Addresses already present are
/// reported as cache hits and skipped without a network call.
///
/// Examples:
///   geoload
///   geoload places.txt --db cache.sqlite
///   geoload --api-key YOUR_KEY
#[derive(Parser)]
#[command(name = "geoload", version, about, long_about = None)]
struct Cli {
    /// Input file, one address per line.
    #[arg(index = 1, default_value = "where.data")]
    input: String,

    /// SQLite database file holding the cache.
    #[arg(long, default_value = "geodata.sqlite")]
    db: String,

    /// Geocoding API key. The sandbox endpoint accepts a fixed placeholder
    /// when this is not set.
    #[arg(long)]
    api_key: Option<String>,

    /// Geocoding service endpoint.
    #[arg(long, default_value = DEFAULT_SERVICE_URL)]
    service_url: String,
}

fn main() {
    let cli = Cli::parse();

    let input = std::fs::read_to_string(&cli.input).unwrap_or_else(|e| {
        eprintln!("Error: cannot read input file '{}': {}", cli.input, e);
        std::process::exit(1);
    });

    let store = LocationStore::open(&cli.db).unwrap_or_else(|e| {
        eprintln!("Error: cannot open store '{}': {}", cli.db, e);
        std::process::exit(1);
    });

    let client = GeocodeClient::new(&cli.service_url, cli.api_key.as_deref())
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let loader = Loader::new(&store, &client);
    let summary = loader.run(input.lines()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    // Progress went to stderr; the machine-readable summary goes to stdout.
    println!("{}", serde_json::to_string_pretty(&summary).unwrap());
}

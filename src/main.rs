//! Premier League Prediction CLI
//!
//! Cleans historical season data and compares prediction accuracy across
//! training-history lengths.

use clap::{Parser, Subcommand};
use footy::{Config, Result};

#[derive(Parser)]
#[command(name = "footy")]
#[command(about = "Premier League match prediction from historical seasons", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Data management commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// Merge duplicate referee names interactively and write the alias table
    Resolve,
    /// Evaluate every history length over the configured season range
    Sweep {
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Evaluate the configured history length and record per-season results
    Results,
    /// Summarize a recorded results file
    Report,
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Show per-season row counts and completeness
    Status,
    /// List teams and the seasons they appear in
    Teams,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Run command
    let result = match cli.command {
        Commands::Data { action } => match action {
            DataCommands::Status => commands::data_status(&config),
            DataCommands::Teams => commands::data_teams(&config),
        },
        Commands::Resolve => commands::resolve(&config),
        Commands::Sweep { format } => commands::sweep(&config, format),
        Commands::Results => commands::results(&config),
        Commands::Report => commands::report(&config),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use footy::data::{alias_table, season::season_range, SeasonStore};
    use footy::eval::report::ranked_means;
    use footy::resolve::{CanonicalMap, ConsolePrompt, NameResolver};
    use footy::train::LinearTrainer;
    use footy::FootyError;
    use std::collections::BTreeMap;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all(&config.data.data_dir)?;
        println!("Created {}/ directory", config.data.data_dir);

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!(
            "  2. Drop season files (pl08.csv, pl09.csv, ...) into {}/",
            config.data.data_dir
        );
        println!("  3. Run 'footy resolve' to merge duplicate referee names");
        println!("  4. Run 'footy sweep' to compare history lengths");

        Ok(())
    }

    /// Store for commands that only scan raw columns
    fn raw_store(config: &Config) -> SeasonStore {
        SeasonStore::new(&config.data.data_dir, CanonicalMap::new())
    }

    /// Store for commands that need canonical referee names
    fn clean_store(config: &Config) -> Result<SeasonStore> {
        SeasonStore::open(&config.data.data_dir, &config.data.alias_table)
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let store = raw_store(config);
        let first = config.seasons.first_season();
        let last = config.seasons.last_season();

        println!("Season Status");
        println!("───────────────────────────────");
        for season in season_range(first, last) {
            match store.load_season(season) {
                Ok(records) => println!("  {}  {:>4} matches", season, records.len()),
                Err(FootyError::IncompleteData { missing }) => {
                    println!("  {}  {:>4} missing entries", season, missing)
                }
                Err(FootyError::Csv(e)) => println!("  {}  unreadable ({})", season, e),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub fn data_teams(config: &Config) -> Result<()> {
        let store = raw_store(config);
        let roster = store.team_roster(
            config.seasons.first_season(),
            config.seasons.last_season(),
        )?;

        for (team, seasons) in &roster {
            let spans: Vec<String> = seasons.iter().map(|s| s.to_string()).collect();
            println!("{:<18} {}", team, spans.join(" "));
        }
        println!("\n{} teams. Check for redundant names before continuing.", roster.len());
        Ok(())
    }

    pub fn resolve(config: &Config) -> Result<()> {
        let store = raw_store(config);
        let first = config.seasons.first_season();
        let last = config.seasons.last_season();

        println!("Scanning referees for seasons {} to {}...", first, last);
        let names = store.referee_names(first, last)?;
        println!("Found {} raw referee names", names.len());

        let resolver = NameResolver::new();
        let mut prompt = ConsolePrompt;
        let mapping = resolver.build_canonical_mapping(&names, &mut prompt)?;

        println!("\nHere is the thinned list of referees.");
        for referee in resolver.roster(&mapping) {
            println!("{}", referee);
        }
        println!("Any other duplicates should be removed manually.");

        alias_table::write(&config.data.alias_table, &mapping)?;
        println!(
            "Wrote {} aliases to {}",
            mapping.len(),
            config.data.alias_table
        );
        Ok(())
    }

    pub fn sweep(config: &Config, format: OutputFormat) -> Result<()> {
        let store = clean_store(config)?;
        let mut trainer = LinearTrainer::new(&store, config.eval.goal);

        let results = footy::eval::sweep(
            config.seasons.first_season(),
            config.seasons.last_season(),
            &mut trainer,
        )?;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&results).map_err(|e| {
                    FootyError::Parse(format!("Failed to serialize sweep results: {}", e))
                })?);
            }
            OutputFormat::Table => print_sweep_table(&results, config),
        }
        Ok(())
    }

    fn print_sweep_table(results: &BTreeMap<u16, Vec<f64>>, config: &Config) {
        println!(
            "\n{:>7} {:>6} {:>12}",
            "Window",
            "Cases",
            format!("Mean {}", config.eval.goal.measured_value())
        );
        println!("{}", "-".repeat(28));

        let mut best: Option<(u16, f64)> = None;
        for (window, scores) in results {
            let mean = scores.iter().sum::<f64>() / scores.len().max(1) as f64;
            println!("{:>7} {:>6} {:>12.4}", window, scores.len(), mean);
            if best.map_or(true, |(_, b)| mean > b) {
                best = Some((*window, mean));
            }
        }

        if let Some((window, mean)) = best {
            println!(
                "\nBest history length: {} ({} {:.4})",
                window,
                config.eval.goal.measured_value(),
                mean
            );
        }
    }

    pub fn results(config: &Config) -> Result<()> {
        let store = clean_store(config)?;
        let mut trainer = LinearTrainer::new(&store, config.eval.goal);

        let evaluations = footy::eval::evaluate_fixed_window(
            config.seasons.first_season(),
            config.seasons.last_season(),
            config.eval.history_length,
            &mut trainer,
        )?;

        for (season, evaluation) in &evaluations {
            footy::eval::append_result(&config.data.results_file, *season, evaluation)?;
            println!(
                "Season {}: {} {:.4}, MSE {:.4}",
                season,
                config.eval.goal.measured_value(),
                evaluation.score,
                evaluation.mse
            );
        }
        println!(
            "\nRecorded {} seasons to {}",
            evaluations.len(),
            config.data.results_file
        );
        Ok(())
    }

    pub fn report(config: &Config) -> Result<()> {
        let summary = footy::eval::read_results(&config.data.results_file)?;

        println!("Mean squared error by season:");
        for (season, mse) in &summary.errors {
            println!("  {}  {:.4}", season, mse);
        }

        let groups = [
            ("Home team influence", &summary.coefficients.home_teams),
            ("Away team influence", &summary.coefficients.away_teams),
            ("Referee influence", &summary.coefficients.referees),
            ("Match statistics", &summary.coefficients.stats),
        ];
        for (title, series) in groups {
            println!("\n{}:", title);
            for (name, mean) in ranked_means(series) {
                println!("  {:<30} {:>+9.4}", name, mean);
            }
        }
        Ok(())
    }
}

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use country_quiz::content::{CatalogRepository, JsonCatalogRepository, SqliteCatalogRepository};
use country_quiz::data::settings::load_settings;
use country_quiz::ui::render::render_snapshot;
use country_quiz::{CountryCatalog, Game, QuizIntent, QuizSettings, Snapshot};

const DEFAULT_CATALOG: &str = "assets/data/catalog.json";
const COMMANDS: &str = "Commands: type <field> <text> | pick <field> <name> | blur <field> | suggest <prefix> | wait <ms> | next | skip | answers | restart | stats | status | help | quit";

/// Country Quiz - name the highlighted countries on each map
#[derive(Parser, Debug)]
#[command(name = "country-quiz")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Catalog JSON file (default: assets/data/catalog.json)
    #[arg(short, long, conflicts_with = "db")]
    catalog: Option<PathBuf>,

    /// SQLite catalog database
    #[arg(long)]
    db: Option<PathBuf>,

    /// Settings JSON file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Random seed (default: random)
    #[arg(long)]
    seed: Option<u64>,

    /// Write the loaded catalog into a SQLite database and exit
    #[arg(long)]
    export_db: Option<PathBuf>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();

    let catalog = match load_catalog(&args) {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("Failed to load catalog: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &args.export_db {
        return match export_catalog(&catalog, path) {
            Ok(()) => {
                println!("Wrote {} clusters to {}", catalog.len(), path.display());
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("Failed to write catalog DB: {}", err);
                ExitCode::FAILURE
            }
        };
    }

    let settings = match &args.settings {
        Some(path) => match load_settings(path) {
            Ok(settings) => settings,
            Err(err) => {
                eprintln!("Failed to load settings: {}", err);
                return ExitCode::FAILURE;
            }
        },
        None => QuizSettings::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    println!("Country Quiz (seed {})", seed);
    println!("{}", catalog.stats());

    let mut game = Game::new(settings, catalog, seed);
    print_snapshot(&game.snapshot());
    println!("{}", COMMANDS);

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or("").to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" => break,
            "help" => println!("{}", COMMANDS),
            "type" => match parse_field(parts.next()) {
                Some(slot) => {
                    let text = parts.collect::<Vec<_>>().join(" ");
                    let snapshot = game.tick(vec![QuizIntent::TextChanged { slot, text }], 0);
                    print_snapshot(&snapshot);
                }
                None => println!("Usage: type <field> <text>"),
            },
            "pick" => match parse_field(parts.next()) {
                Some(slot) => {
                    let selection = parts.collect::<Vec<_>>().join(" ");
                    let snapshot = game.tick(vec![QuizIntent::Commit { slot, selection }], 0);
                    print_snapshot(&snapshot);
                }
                None => println!("Usage: pick <field> <name>"),
            },
            "blur" => match parse_field(parts.next()) {
                Some(slot) => {
                    game.tick(vec![QuizIntent::FocusLost { slot }], 0);
                    println!("Suggestions for field {} will close shortly.", slot + 1);
                }
                None => println!("Usage: blur <field>"),
            },
            "suggest" => {
                let prefix = parts.collect::<Vec<_>>().join(" ");
                print_suggestions(&game, &prefix);
            }
            "wait" => match parts.next().map(str::parse::<u64>) {
                Some(Ok(ms)) => print_snapshot(&game.tick(Vec::new(), ms)),
                _ => println!("Usage: wait <ms>"),
            },
            "next" => print_snapshot(&game.tick(vec![QuizIntent::AdvanceRound], 0)),
            "skip" => print_snapshot(&game.tick(vec![QuizIntent::SkipRound], 0)),
            "restart" => print_snapshot(&game.tick(vec![QuizIntent::RestartGame], 0)),
            "answers" => print_answers(&game),
            "stats" => print_stats(&game),
            "status" => print_snapshot(&game.snapshot()),
            _ => println!("Unknown command: {}", cmd),
        }
    }

    ExitCode::SUCCESS
}

fn load_catalog(args: &Args) -> Result<CountryCatalog, Box<dyn std::error::Error>> {
    let repo: Box<dyn CatalogRepository> = match (&args.db, &args.catalog) {
        (Some(db), _) => Box::new(SqliteCatalogRepository::open(db)?),
        (None, Some(path)) => Box::new(JsonCatalogRepository::new(path)),
        (None, None) => Box::new(JsonCatalogRepository::new(DEFAULT_CATALOG)),
    };
    println!("Loading catalog from {}", repo.describe());
    repo.load_catalog()
}

fn export_catalog(catalog: &CountryCatalog, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut repo = SqliteCatalogRepository::create(path)?;
    repo.store_catalog(&catalog.to_file())?;
    Ok(())
}

/// Fields are numbered from 1 on screen.
fn parse_field(raw: Option<&str>) -> Option<usize> {
    raw?.parse::<usize>().ok()?.checked_sub(1)
}

fn print_snapshot(snapshot: &Snapshot) {
    for event in &snapshot.events {
        println!("* {}", event);
    }
    print!("{}", render_snapshot(snapshot));
}

fn print_suggestions(game: &Game, prefix: &str) {
    let matches = game.suggest(prefix);
    if matches.is_empty() {
        println!("No countries start with '{}'.", prefix);
        return;
    }
    for record in matches {
        match &record.flag {
            Some(flag) => println!("  {} ({})", record.name, flag),
            None => println!("  {}", record.name),
        }
    }
}

fn print_answers(game: &Game) {
    let answers = game.round().revealed_answers();
    if answers.is_empty() {
        println!("No round in progress.");
        return;
    }
    println!("Answers for round {}:", game.round().round_number());
    for name in answers {
        match game.catalog().flag_for(name) {
            Some(flag) => println!("  {} ({})", name, flag),
            None => println!("  {}", name),
        }
    }
}

fn print_stats(game: &Game) {
    let round = game.round();
    let settings = game.settings();
    println!("{}", game.catalog().stats());
    println!(
        "Round {}/{} | Correct: {} | Attempts used: {}/{} | Seed: {}",
        round.round_number(),
        settings.max_rounds,
        round.total_correct(),
        round.attempts_used(),
        settings.max_attempts,
        game.seed()
    );
}

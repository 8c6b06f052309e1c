mod catalog;
mod index;
mod output;
mod search;
mod utils;

use anyhow::Result;
use catalog::{CatalogSource, DirResolver};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use index::SnapshotStore;
use search::{SearchEngine, SearchOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bookdex")]
#[command(about = "Fuzzy-search engine for book catalog exports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog export: a section file or a directory of *.inp files
    #[arg(long, global = true, default_value = "catalog")]
    catalog: PathBuf,

    /// Directory holding the extracted book files (<id>.fb2)
    #[arg(long, global = true, default_value = "books")]
    books_dir: PathBuf,

    /// Index snapshot location
    #[arg(long, global = true, default_value = ".book-index.json")]
    snapshot: PathBuf,

    /// Skip the snapshot cache entirely
    #[arg(long, global = true)]
    no_snapshot: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the catalog and build the index
    Index {
        /// Rebuild even if a fresh snapshot exists
        #[arg(short, long)]
        force: bool,
    },
    /// Search the catalog
    Search {
        /// Free-text query (matches titles and authors)
        #[arg(trailing_var_arg = true)]
        query: Vec<String>,

        /// Title-only query
        #[arg(long)]
        title: Option<String>,

        /// Author-only query
        #[arg(long)]
        author: Option<String>,

        /// Exact genre tag
        #[arg(long)]
        genre: Option<String>,

        /// Language code (e.g. ru, en)
        #[arg(long)]
        language: Option<String>,

        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        offset: Option<usize>,
    },
    /// Show index statistics
    Stats,
    /// List genres with book counts
    Genres,
    /// List languages with book counts
    Languages,
    /// List series, or the books of one series
    Series {
        /// Show the books of this series in reading order
        #[arg(long)]
        books: Option<String>,

        #[arg(long)]
        limit: Option<usize>,
    },
    /// List books by an author's last name
    Author {
        last_name: String,

        #[arg(long)]
        limit: Option<usize>,
    },
    /// Pick random books for discovery
    Random {
        #[arg(default_value_t = 5)]
        count: usize,

        #[arg(long)]
        genre: Option<String>,

        #[arg(long)]
        language: Option<String>,
    },
    /// List top-rated books
    Top {
        #[arg(default_value_t = 10)]
        limit: usize,

        #[arg(long)]
        genre: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let color = !cli.no_color;

    let snapshot = if cli.no_snapshot {
        None
    } else {
        Some(SnapshotStore::new(&cli.snapshot))
    };
    let engine = SearchEngine::new(
        CatalogSource::new(&cli.catalog),
        Arc::new(DirResolver::new(&cli.books_dir)),
        snapshot,
    );

    match cli.command {
        Commands::Index { force } => {
            if force && !cli.no_snapshot && cli.snapshot.exists() {
                std::fs::remove_file(&cli.snapshot)?;
            }

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")
                    .unwrap(),
            );
            spinner.set_message("Building catalog index...");
            spinner.enable_steady_tick(std::time::Duration::from_millis(80));

            engine.initialize()?;

            let stats = engine.get_stats()?;
            spinner.finish_with_message(format!(
                "Indexed {} books, {} authors, {} genres",
                stats.total_books, stats.total_authors, stats.total_genres
            ));
        }

        Commands::Search {
            query,
            title,
            author,
            genre,
            language,
            limit,
            offset,
        } => {
            let options = SearchOptions {
                query: (!query.is_empty()).then(|| query.join(" ")),
                title,
                author,
                genre,
                language,
                limit,
                offset,
            };
            let response = engine.search(&options)?;
            output::print_search_results(&response, options.offset.unwrap_or(0), color)?;
        }

        Commands::Stats => {
            let stats = engine.get_stats()?;
            println!("Index Statistics");
            println!("================");
            println!();
            println!("Books:     {}", stats.total_books);
            println!("Authors:   {}", stats.total_authors);
            println!("Genres:    {}", stats.total_genres);
            println!("Built at:  {}", stats.built_at);
            println!();
            println!("Books by language:");
            for row in engine.get_languages()? {
                println!("  {:8} {}", row.count, row.language);
            }
        }

        Commands::Genres => {
            output::print_genres(&engine.get_genres()?)?;
        }

        Commands::Languages => {
            output::print_languages(&engine.get_languages()?)?;
        }

        Commands::Series { books, limit } => match books {
            Some(name) => {
                output::print_books(&engine.get_series_books(&name)?, color)?;
            }
            None => {
                output::print_series(&engine.get_series(limit)?)?;
            }
        },

        Commands::Author { last_name, limit } => {
            output::print_books(&engine.get_author_books(&last_name, limit, None)?, color)?;
        }

        Commands::Random {
            count,
            genre,
            language,
        } => {
            let books = engine.get_random_books(count, genre.as_deref(), language.as_deref())?;
            output::print_books(&books, color)?;
        }

        Commands::Top { limit, genre } => {
            let books = engine.get_top_rated(limit, genre.as_deref())?;
            output::print_books(&books, color)?;
        }
    }

    Ok(())
}

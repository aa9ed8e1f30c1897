//! Libris CLI - command-line interface for the library catalog and lending engine

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use libris::config::{self, LibrisConfig};
use libris::ui::{self, Icons};
use libris::{BookColumn, BookInfo, BookQuery, BorrowOutcome, CardInfo, CardType, Library, Range, SortOrder, SqliteStore};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "libris")]
#[command(version)]
#[command(about = "Library catalog, membership cards and book lending")]
#[command(long_about = r#"
Libris keeps a library's catalog, cards and loans in SQLite:
  • Search books by title, author, press, category, year and price
  • Lend and take back books atomically, even with many desks at once
  • Issue and withdraw membership cards

Example usage:
  libris init
  libris add-manager --name cobalt --password 12345678
  libris import-books books.json
  libris search --title Rust --price-max 40
  libris borrow --card 1 --book 3 --manager cobalt --password 12345678
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create the database
    Init {
        /// Days between borrow date and due date
        #[arg(long, default_value = "60")]
        loan_days: i64,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Register a staff member who can issue loans
    AddManager {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        password: String,
    },

    /// Add copies of one title to the catalog
    AddBook {
        #[arg(long)]
        title: String,

        #[arg(long)]
        author: String,

        #[arg(long)]
        press: String,

        #[arg(long)]
        category: String,

        #[arg(long)]
        year: i64,

        #[arg(long)]
        price: f64,

        /// Number of copies
        #[arg(long, default_value = "1")]
        count: i64,
    },

    /// Add every book in a JSON array file
    ImportBooks {
        /// JSON file with a list of books
        file: PathBuf,
    },

    /// Issue a membership card
    AddCard {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        address: Option<String>,

        /// teacher or student
        #[arg(short = 't', long = "type", default_value = "student")]
        card_type: String,
    },

    /// Withdraw a membership card
    DeleteCard {
        #[arg(long)]
        id: i64,
    },

    /// List all membership cards
    Cards,

    /// Search the catalog
    Search {
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        press: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        year_min: Option<i64>,

        #[arg(long)]
        year_max: Option<i64>,

        #[arg(long)]
        price_min: Option<f64>,

        #[arg(long)]
        price_max: Option<f64>,

        /// Column to sort by
        #[arg(short, long, default_value = "title")]
        sort: String,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Lend a book to a card
    Borrow {
        #[arg(long)]
        card: i64,

        #[arg(long)]
        book: i64,

        /// Manager name issuing the loan
        #[arg(short, long)]
        manager: String,

        #[arg(short, long)]
        password: String,
    },

    /// Take a book back from a card
    Return {
        #[arg(long)]
        card: i64,

        #[arg(long)]
        book: i64,
    },

    /// Check whether a card holds a book
    Status {
        #[arg(long)]
        card: i64,

        #[arg(long)]
        book: i64,
    },

    /// List the books a card currently holds
    Borrowed {
        #[arg(long)]
        card: i64,
    },

    /// Serve the lending API over HTTP
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

fn open_library(database: &Path, config: &LibrisConfig) -> anyhow::Result<Library> {
    config::ensure_db_dir(database)?;
    let store = SqliteStore::open(database)?;
    Ok(Library::new(store, config.library_options()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::error(&format!("{:#}", err));
            if err.downcast_ref::<libris::Error>().is_some_and(libris::Error::is_not_found) {
                eprintln!("  {}", ui::dim("List ids with `libris cards` or `libris search`"));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let config = config::load_config(Some(&config_path))?.unwrap_or_default();
    let database = config.database_path(cli.database.as_deref());

    match cli.command {
        Commands::Init { loan_days, force } => {
            if loan_days <= 0 {
                anyhow::bail!("--loan-days must be positive");
            }
            let new_config = LibrisConfig {
                database: Some(database.display().to_string()),
                loan_duration_days: Some(loan_days),
                port: config.port,
            };
            config::write_config(&config_path, &new_config, force)?;
            open_library(&database, &new_config)?.close()?;

            ui::header(Icons::DATABASE, "Library initialized");
            ui::summary_row("Config:", &config_path.display().to_string());
            ui::summary_row("Database:", &database.display().to_string());
            ui::summary_row("Loan duration:", &format!("{} days", loan_days));
        }

        Commands::AddManager { name, password } => {
            let library = open_library(&database, &config)?;
            let id = library.add_manager(&name, &password)?;
            ui::success(&format!("Manager {} registered with id {}", name, id));
        }

        Commands::AddBook { title, author, press, category, year, price, count } => {
            let mut library = open_library(&database, &config)?;
            let info = BookInfo { title, author, press, category, year, price, count };
            let ids = library.add_books(std::slice::from_ref(&info))?;
            ui::success(&format!("Added \"{}\" ({} copies) as book {}", info.title, info.count, ids[0]));
        }

        Commands::ImportBooks { file } => {
            let contents = std::fs::read_to_string(&file)?;
            let books: Vec<BookInfo> = serde_json::from_str(&contents)?;
            if books.is_empty() {
                println!("{} No books in {}.", Icons::EMPTY, file.display());
                return Ok(());
            }

            let mut library = open_library(&database, &config)?;
            let ids = library.add_books(&books)?;
            ui::success(&format!("Imported {} books from {}", ids.len(), file.display()));
        }

        Commands::AddCard { name, address, card_type } => {
            let card_type: CardType = card_type.parse()?;
            let library = open_library(&database, &config)?;
            let id = library.add_card(&CardInfo { name: name.clone(), address, card_type })?;
            ui::success(&format!("{} card {} issued to {}", card_type, id, name));
        }

        Commands::DeleteCard { id } => {
            let mut library = open_library(&database, &config)?;
            if library.delete_card(id)? {
                ui::success(&format!("Card {} withdrawn", id));
            } else {
                ui::warn(&format!("No card with id {}", id));
            }
        }

        Commands::Cards => {
            let library = open_library(&database, &config)?;
            let cards = library.list_cards()?;
            ui::header(Icons::CARD, &format!("{} card(s)", cards.len()));
            if !cards.is_empty() {
                println!("{}", ui::card_table(&cards));
            }
        }

        Commands::Search {
            title,
            author,
            press,
            category,
            year_min,
            year_max,
            price_min,
            price_max,
            sort,
            desc,
            format,
        } => {
            let sort: BookColumn = sort.parse()?;
            let query = BookQuery {
                title,
                author,
                press,
                category,
                year: Range::from_bounds(year_min, year_max),
                price: Range::from_bounds(price_min, price_max),
            };
            let library = open_library(&database, &config)?;
            let books = library.search_books(&query, sort, SortOrder::from_descending(desc))?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&books)?);
            } else if books.is_empty() {
                println!("{} No books found.", Icons::EMPTY);
            } else {
                ui::header(Icons::SEARCH, &format!("{} book(s), sorted by {}", books.len(), sort));
                println!("{}", ui::book_table(&books));
            }
        }

        Commands::Borrow { card, book, manager, password } => {
            let mut library = open_library(&database, &config)?;
            let Some(manager) = library.authenticate_manager(&manager, &password)? else {
                anyhow::bail!("Invalid manager credentials for {}", manager);
            };

            match library.borrow_book(card, book, manager.id) {
                Ok(BorrowOutcome::Granted { loan }) => ui::granted(&loan),
                Ok(BorrowOutcome::Denied { estimated_available }) => {
                    ui::denied(book, estimated_available.as_ref())
                }
                Err(e) if e.is_conflict() => ui::denied(book, None),
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Return { card, book } => {
            let mut library = open_library(&database, &config)?;
            if library.return_book(card, book)? {
                ui::success(&format!("{} Book {} returned by card {}", Icons::RETURN, book, card));
            } else {
                ui::warn(&format!("Card {} does not hold book {}", card, book));
            }
        }

        Commands::Status { card, book } => {
            let library = open_library(&database, &config)?;
            match library.loan(card, book)? {
                Some(loan) => {
                    ui::info("Status", &format!("card {} holds book {}", card, book));
                    ui::summary_row("Due:", &ui::due_date(&loan, Utc::now()));
                }
                None => ui::info("Status", &format!("card {} does not hold book {}", card, book)),
            }
        }

        Commands::Borrowed { card } => {
            let library = open_library(&database, &config)?;
            if !library.card_exists(card)? {
                anyhow::bail!("No card with id {}", card);
            }
            let books = library.borrowed_books(card)?;
            ui::header(Icons::BOOKS, &format!("Card {} holds {} book(s)", card, books.len()));
            if !books.is_empty() {
                println!("{}", ui::book_table(&books));
                let now = Utc::now();
                for book in &books {
                    if let Some(loan) = library.loan(card, book.id)? {
                        ui::summary_row(&format!("{} due:", book.title), &ui::due_date(&loan, now));
                    }
                }
            }
        }

        Commands::Serve { port } => {
            config::ensure_db_dir(&database)?;
            SqliteStore::open(&database)?.close()?;

            let port = config.port(port);
            ui::info("Database", &database.display().to_string());
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(libris::server::start_server(port, database, config.library_options()))?;
        }
    }

    Ok(())
}

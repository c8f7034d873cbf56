use std::sync::Arc;

use anyhow::Context;
use bookbank_app::books::models::{AddBook, RequestBook};
use bookbank_app::books::{catalog, AvailabilityTracker, Book, NewCopies};
use bookbank_kernel::settings::{DatabaseBackend, Settings};
use bookbank_kernel::SystemClock;
use clap::{Args, Parser, Subcommand};

/// Command-line front end for the bookbank lending service
#[derive(Parser, Debug)]
#[command(name = "bookbank", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service
    Serve,
    /// Work with the book catalog directly
    #[command(subcommand)]
    Books(BooksCommand),
}

#[derive(Subcommand, Debug)]
enum BooksCommand {
    /// List every book
    List,
    /// Show one book
    Show { title: String },
    /// Add copies of a book, creating it when needed
    Add(AddArgs),
    /// Request to borrow a book
    Request { title: String },
    /// Insert the starter catalog titles that are missing
    Seed,
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    author: String,
    #[arg(long)]
    category: String,
    #[arg(long, allow_negative_numbers = true)]
    copies: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookbank settings")?;
    bookbank_telemetry::init(&settings.telemetry)?;

    tracing::debug!(env = ?settings.environment, command = ?cli.command, "bookbank CLI starting");

    match cli.command {
        Command::Serve => bookbank_app::run(settings).await,
        Command::Books(command) => {
            ensure_persistent(&settings)?;
            let app = bookbank_app::build(&settings, Arc::new(SystemClock)).await?;
            run_books(&app.tracker, command).await
        }
    }
}

/// Catalog commands run in a short-lived process, so an in-memory store would
/// drop every write on exit.
fn ensure_persistent(settings: &Settings) -> anyhow::Result<()> {
    if settings.database.backend == DatabaseBackend::Memory {
        anyhow::bail!(
            "`bookbank books` needs a persistent catalog; set database.backend = \"file\" \
             (or BOOKBANK_DATABASE__BACKEND=file)"
        );
    }
    Ok(())
}

async fn run_books(tracker: &AvailabilityTracker, command: BooksCommand) -> anyhow::Result<()> {
    match command {
        BooksCommand::List => {
            for book in tracker.catalog().await? {
                println!(
                    "{} | {} | {} | copies: {}",
                    book.title, book.author, book.category, book.copies
                );
            }
        }
        BooksCommand::Show { title } => print_book(&tracker.find(&title).await?)?,
        BooksCommand::Add(args) => {
            let input = NewCopies::try_from(AddBook {
                title: Some(args.title),
                author: Some(args.author),
                category: Some(args.category),
                copies: Some(args.copies),
            })?;
            let outcome = tracker.add_copies(input).await?;
            println!("{}", outcome.message);
            print_book(&outcome.book)?;
        }
        BooksCommand::Request { title } => {
            let title = RequestBook { title: Some(title) }.title()?;
            let outcome = tracker.request_book(&title).await?;
            println!("{}", outcome.message);
        }
        BooksCommand::Seed => {
            let inserted = tracker.seed(catalog::starter_catalog()).await?;
            println!("Seeded {} books", inserted);
        }
    }
    Ok(())
}

fn print_book(book: &Book) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(book)?);
    Ok(())
}

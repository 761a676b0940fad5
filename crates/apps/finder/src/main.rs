//! Finder - command-line search over chat conversations
//!
//! Reads conversations from a directory of `<conversation>.json` files and
//! keeps search history in a SQLite database under the data directory.
//!
//! ```bash
//! finder search --messages-dir ./chats --conversation order-1001 refund
//! finder search -c order-1001 --own --sort time --order asc 退款
//! finder suggest -c order-1001 ref
//! finder history
//! finder clear-history
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use msgsearch::{
    ConversationId, DatePhrase, HighlightFragment, JsonMessageSource, MessageSource, MessageType,
    SearchConfig, SearchEngine, SearchFilters, SearchOptions, SearchResponse, SortBy, SortOrder,
    SqliteKvStore, people_from_messages,
};

const HISTORY_DB: &str = "history.db";

#[derive(Parser)]
#[command(name = "finder", version, about = "Search chat conversations by keyword")]
struct Cli {
    /// Directory holding `<conversation>.json` message files
    #[arg(long, global = true, default_value = ".")]
    messages_dir: PathBuf,

    /// History database path. Defaults to the data directory.
    #[arg(long, global = true)]
    history_db: Option<PathBuf>,

    /// Search config file. Defaults to `search.json` in the config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search one conversation for a keyword
    Search {
        #[arg(short, long)]
        conversation: String,

        keyword: String,

        /// Only these message types (repeatable)
        #[arg(long = "type", value_enum)]
        types: Vec<TypeArg>,

        /// Only messages from these sender ids (repeatable)
        #[arg(long = "sender")]
        senders: Vec<String>,

        /// Only messages sent by the current user
        #[arg(long)]
        own: bool,

        #[arg(long)]
        include_recalled: bool,

        /// Restrict to a relative date (today, yesterday, this week)
        #[arg(long)]
        date: Option<String>,

        #[arg(long, value_enum, default_value = "relevance")]
        sort: SortArg,

        #[arg(long, value_enum, default_value = "desc")]
        order: OrderArg,

        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: usize,

        #[arg(long)]
        page_size: Option<usize>,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest completions for a partial keyword
    Suggest {
        /// Conversation whose senders are offered as people
        #[arg(short, long)]
        conversation: Option<String>,

        partial: String,
    },

    /// Show recent searches
    History {
        #[arg(long)]
        json: bool,
    },

    /// Delete all search history
    ClearHistory,

    /// Write a default `search.json` to the config directory
    InitConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Text,
    Image,
    File,
    Emoji,
}

impl From<TypeArg> for MessageType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Text => MessageType::Text,
            TypeArg::Image => MessageType::Image,
            TypeArg::File => MessageType::File,
            TypeArg::Emoji => MessageType::Emoji,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Relevance,
    Time,
    Sender,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Relevance => SortBy::Relevance,
            SortArg::Time => SortBy::Time,
            SortArg::Sender => SortBy::Sender,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let search_config = match &cli.config {
        Some(path) => SearchConfig::from_file_or_default(path),
        None => SearchConfig::load(),
    }
    .context("Failed to load search config")?;
    let db_path = match cli.history_db {
        Some(path) => path,
        None => config::data_path(HISTORY_DB)
            .ok_or_else(|| anyhow!("Could not determine data directory"))?,
    };
    let kv = Arc::new(SqliteKvStore::open(&db_path)?);
    let source = Arc::new(JsonMessageSource::new(&cli.messages_dir));
    let engine = SearchEngine::new(source.clone(), kv, search_config);

    match cli.command {
        Commands::Search {
            conversation,
            keyword,
            types,
            senders,
            own,
            include_recalled,
            date,
            sort,
            order,
            page,
            page_size,
            json,
        } => {
            let mut filters = SearchFilters::keyword(keyword)
                .own_messages_only(own)
                .include_recalled(include_recalled);
            for t in types {
                filters = filters.with_message_type(t.into());
            }
            for s in senders {
                filters = filters.with_sender(s);
            }
            if let Some(phrase) = date {
                let phrase = DatePhrase::from_text(&phrase)
                    .ok_or_else(|| anyhow!("Unknown date phrase: {}", phrase))?;
                filters = filters.with_date_range(phrase.range(chrono::Utc::now()));
            }

            let mut options =
                SearchOptions::from_config(engine.config()).sorted(sort.into(), order.into());
            if let Some(size) = page_size {
                options = options.with_page_size(size);
            }
            let request = engine
                .request(ConversationId::new(conversation), filters)
                .with_options(options)
                .with_page(page);

            let response = engine.execute(&request)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_response(&response);
            }
        }
        Commands::Suggest {
            conversation,
            partial,
        } => {
            let engine = match conversation {
                Some(id) => {
                    let messages = source.fetch_messages(&ConversationId::new(id))?;
                    engine.with_people(people_from_messages(&messages))
                }
                None => engine,
            };
            for suggestion in engine.suggest(&partial) {
                let description = suggestion.description.unwrap_or_default();
                println!(
                    "{:<10} {}  {}",
                    format!("{:?}", suggestion.kind),
                    suggestion.text,
                    description
                );
            }
        }
        Commands::History { json } => {
            let history = engine.history();
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else {
                for entry in history {
                    println!(
                        "{}  {}  ({} results)",
                        entry.searched_at.format("%Y-%m-%d %H:%M"),
                        entry.keyword,
                        entry.result_count
                    );
                }
                let stats = engine.history_stats();
                println!(
                    "{} searches, {} without results",
                    stats.total_searches, stats.zero_result_searches
                );
            }
        }
        Commands::ClearHistory => {
            engine.clear_history();
            info!("Search history cleared");
        }
        Commands::InitConfig => init_config()?,
    }

    Ok(())
}

fn init_config() -> Result<()> {
    if SearchConfig::exists() {
        info!("search.json already exists, leaving it unchanged");
        return Ok(());
    }
    SearchConfig::default().save()?;
    info!("Wrote default search.json");
    Ok(())
}

fn print_response(response: &SearchResponse) {
    for result in &response.results {
        println!(
            "[{}] {} ({}, {:.2}): {}",
            result.sent_at.format("%Y-%m-%d %H:%M"),
            result.sender.name,
            result.sender.role.label(),
            result.relevance,
            render_highlights(&result.highlights)
        );
    }

    let p = &response.pagination;
    println!(
        "page {}/{} - {} matches in {:.1}ms",
        if p.total_pages == 0 { 0 } else { p.page + 1 },
        p.total_pages,
        p.total,
        response.statistics.search_time_ms
    );
}

/// Wrap matched fragments in brackets
fn render_highlights(fragments: &[HighlightFragment]) -> String {
    fragments
        .iter()
        .map(|f| {
            if f.is_match {
                format!("[{}]", f.text)
            } else {
                f.text.clone()
            }
        })
        .collect()
}

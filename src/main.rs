//! hatedma CLI
//!
//! Command-line interface for the diary manager:
//! - Analyze an export stream
//! - Look up tags and search articles
//! - Print statistics and product information

use anyhow::Context;
use clap::{Parser, Subcommand};
use hatedma::config::{generate_default_config, LoggingConfig};
use hatedma::{
    render_product, ArticleRepository, CatalogSettings, Config, HttpProductLookup, Ingestor, Layout,
    OutputMode, ProductCache, ProductCatalog, QueryEngine, QueryError, TagIndexStore,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "hatedma")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hatena Diary Manager")]
#[command(long_about = "Split a Hatena Diary export into per-article files, index their tags,\nand search the result.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Hatena user name
    #[arg(short, long, global = true)]
    pub name: Option<String>,

    /// Data directory
    #[arg(short, long, global = true)]
    pub dir: Option<String>,

    /// Config file (default: <config dir>/hatedma/config.toml or ./hatedma.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print URLs (default)
    #[arg(short, long, global = true, conflicts_with_all = ["file", "body"])]
    pub url: bool,

    /// Print file paths
    #[arg(short, long, global = true, conflicts_with = "body")]
    pub file: bool,

    /// Print body texts
    #[arg(short, long, global = true)]
    pub body: bool,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        if self.body {
            OutputMode::Body
        } else if self.file {
            OutputMode::File
        } else {
            OutputMode::Url
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze the export file
    Analyze,

    /// Search article bodies
    Search {
        /// Word to look for (case-sensitive)
        word: String,
        /// Scope of search: YYYY, YYYYMM or YYYY/MM
        #[arg(short = 'r', long)]
        date: Option<String>,
    },

    /// Search by tag (exact, then prefix, then isbn:/asin:)
    Tag {
        tag: String,
    },

    /// Print all tags
    Tags,

    /// Print statistics of articles
    Stats,

    /// Examine every isbn:/asin: tag through the product endpoint
    Products,

    /// Look up one product code
    Lookup {
        code: String,
        /// Skip the cache
        #[arg(long)]
        force: bool,
    },

    /// Print directory and file names
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.logging);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<QueryError>() {
            Some(q) if q.is_usage() => {
                eprintln!("Ignored. {}.", q);
                ExitCode::from(2)
            }
            _ => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(name) = &cli.name {
        config.diary.username = name.clone();
    }
    if let Some(dir) = &cli.dir {
        config.diary.data_dir = dir.clone();
    }
    Ok(config)
}

/// `RUST_LOG` wins over the configured level; logs go to stderr
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let layout = Layout::new(&config);
    let mode = cli.output_mode();
    let repo = ArticleRepository::new(
        &layout.diary_dir,
        &config.diary.username,
        &config.diary.url_base,
        config.utc_offset()?,
    );

    match cli.command {
        Commands::Analyze => {
            layout.ensure_dirs()?;
            let report = Ingestor::new(&layout, &repo)
                .run()
                .with_context(|| format!("analyzing {:?}", layout.export_file))?;
            println!("{}", report);
        }

        Commands::Search { word, date } => {
            let engine = QueryEngine::new(&repo, Default::default());
            for article in engine.search(&word, date.as_deref())? {
                print!("{}", mode.render(&article));
            }
        }

        Commands::Tag { tag } => {
            let engine = QueryEngine::open(&repo, &TagIndexStore::new(&layout.tag_file))?;
            for hit in engine.find_tag(&tag)? {
                if hit.show_tag {
                    println!("[{}]", hit.tag);
                }
                for article in engine.resolve(&hit, mode.needs_body())? {
                    print!("{}", mode.render(&article));
                }
            }
        }

        Commands::Tags => {
            let engine = QueryEngine::open(&repo, &TagIndexStore::new(&layout.tag_file))?;
            for hit in engine.all_tags() {
                println!("[{}]", hit.tag);
                for article in engine.resolve(&hit, mode.needs_body())? {
                    print!("{}", mode.render(&article));
                }
            }
        }

        Commands::Stats => {
            let engine = QueryEngine::new(&repo, Default::default());
            println!("files lines byte_size char_size tag");
            for stat in engine.article_stats()? {
                println!("{} {} {} {} {}", stat.entries, stat.lines, stat.bytes, stat.chars, stat.tag);
            }
        }

        Commands::Products => {
            let tags = TagIndexStore::new(&layout.tag_file).load()?;
            if tags.is_empty() {
                println!("No tags; run `hatedma analyze` first");
                return Ok(());
            }
            let mut catalog = product_catalog(&config, &layout)?;
            let report = catalog.sync(&tags).await?;
            println!("{}", report);
        }

        Commands::Lookup { code, force } => {
            let mut catalog = product_catalog(&config, &layout)?;
            let record = catalog.lookup_one(&code, force, true).await?;
            println!("<begin search:{}>", code);
            print!("{}", render_product(&record));
            println!("<end search:{}>", code);
        }

        Commands::Status => {
            for (description, path) in layout.describe() {
                println!("{:<36} {}", format!("{}:", description), path);
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn product_catalog(config: &Config, layout: &Layout) -> anyhow::Result<ProductCatalog<HttpProductLookup>> {
    let lookup = HttpProductLookup::from_config(&config.products)?;
    layout.ensure_dirs()?;
    let cache = ProductCache::open(&layout.product_file)?;
    Ok(ProductCatalog::new(cache, lookup, CatalogSettings::from_config(&config.products)))
}

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use portfolio::arrears::{export_csv, ArrearsTable, ViewMode};
use portfolio::config::{config_dir, init_config_dir, load_config, load_config_or_default, Config};
use portfolio::error::Result;
use portfolio::filter::{
    self, parse_query, Dimension, FilterState, RawValue, INDEXABLE_KEY, SEARCH_KEY,
};
use portfolio::gateway::{load_options, load_overview, load_receivables, Page, PostgrestClient};
use portfolio::logging::init_tracing;
use portfolio::render::{render_error, render_overview, render_receivables};

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(version, about = "Real-estate portfolio and receivables dashboard", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config or ~/.portfolio)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Increase log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Show the portfolio overview page
    Overview {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show the receivables page
    Receivables {
        #[command(flatten)]
        filters: FilterArgs,

        /// Arrears table layout
        #[arg(long, value_enum, default_value_t = ViewMode::Grouped)]
        view: ViewMode,

        /// Also write the displayed arrears view to a CSV file
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },

    /// List the filter choices the backend offers
    Options {
        #[command(flatten)]
        filters: FilterArgs,

        /// Page whose options procedure to query
        #[arg(long, value_enum, default_value_t = Page::Overview)]
        page: Page,

        /// Only list this dimension
        #[arg(short, long, value_enum)]
        dimension: Option<Dimension>,

        /// Case-insensitive substring to narrow the choices
        #[arg(short, long = "match", value_name = "TEXT")]
        matching: Option<String>,

        /// Print the options as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the shareable dashboard URL for a filter selection
    Link {
        #[arg(value_enum)]
        page: Page,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Filter selection shared by every page command
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Start from a dashboard query string, e.g. "fund=Core,Value&q=acme"
    #[arg(long, value_name = "QUERY")]
    query: Option<String>,

    /// Restrict to funds (repeatable or comma-separated)
    #[arg(long, value_name = "NAME")]
    fund: Vec<String>,

    /// Restrict to legal entities
    #[arg(long, value_name = "NAME")]
    entity: Vec<String>,

    /// Restrict to countries
    #[arg(long, value_name = "NAME")]
    country: Vec<String>,

    /// Restrict to cities
    #[arg(long, value_name = "NAME")]
    city: Vec<String>,

    /// Only indexable leases (overview page)
    #[arg(long)]
    indexable: bool,

    /// Free-text search
    #[arg(short = 'q', long = "search", value_name = "TEXT")]
    search: Option<String>,
}

impl FilterArgs {
    fn values(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::Fund => &self.fund,
            Dimension::Entity => &self.entity,
            Dimension::Country => &self.country,
            Dimension::City => &self.city,
        }
    }

    /// Flags replace the same key from `--query`
    fn to_state(&self) -> FilterState {
        let mut raw = self.query.as_deref().map(parse_query).unwrap_or_default();
        for dimension in Dimension::ALL {
            let values = self.values(dimension);
            if !values.is_empty() {
                raw.insert(dimension.key().to_string(), RawValue::Many(values.to_vec()));
            }
        }
        if self.indexable {
            raw.insert(INDEXABLE_KEY.to_string(), RawValue::from("1"));
        }
        if let Some(search) = &self.search {
            raw.insert(SEARCH_KEY.to_string(), RawValue::One(search.clone()));
        }
        filter::parse(&raw)
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Overview { filters } => cmd_overview(&cfg_dir, &filters.to_state()),
        Commands::Receivables {
            filters,
            view,
            export,
        } => cmd_receivables(&cfg_dir, &filters.to_state(), view, export.as_deref()),
        Commands::Options {
            filters,
            page,
            dimension,
            matching,
            json,
        } => cmd_options(
            &cfg_dir,
            &filters.to_state(),
            page,
            dimension,
            matching.as_deref().unwrap_or(""),
            json,
        ),
        Commands::Link { page, filters } => cmd_link(&cfg_dir, page, &filters.to_state()),
    }
}

fn cmd_init(cfg_dir: &Path) -> Result<()> {
    init_config_dir(cfg_dir)?;

    println!("Initialized portfolio config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Point it at your backend:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!();
    println!("Then open the dashboard:");
    println!("  portfolio overview");

    Ok(())
}

fn apply_color_setting(config: &Config) {
    if !config.display.color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
}

fn share_link(config: &Config, page: Page, filters: &FilterState) -> String {
    let base = config.display.base_url.trim_end_matches('/');
    let query = filter::to_query_string(filters);
    if query.is_empty() {
        format!("{base}{}", page.path())
    } else {
        format!("{base}{}?{query}", page.path())
    }
}

fn cmd_overview(cfg_dir: &Path, filters: &FilterState) -> Result<()> {
    let config = load_config(cfg_dir)?;
    apply_color_setting(&config);
    let client = PostgrestClient::new(&config.backend)?;

    let data = match load_overview(&client, filters, &config.overview) {
        Ok(data) => data,
        Err(e) => {
            print!("{}", render_error(Page::Overview, &e));
            return Err(e);
        }
    };

    print!("{}", render_overview(&data, filters, Utc::now()));
    println!();
    println!("Share: {}", share_link(&config, Page::Overview, filters));
    Ok(())
}

fn cmd_receivables(
    cfg_dir: &Path,
    filters: &FilterState,
    view: ViewMode,
    export: Option<&Path>,
) -> Result<()> {
    let config = load_config(cfg_dir)?;
    apply_color_setting(&config);
    let client = PostgrestClient::new(&config.backend)?;

    let data = match load_receivables(&client, filters, &config.receivables) {
        Ok(data) => data,
        Err(e) => {
            print!("{}", render_error(Page::Receivables, &e));
            return Err(e);
        }
    };

    // pages open on the consolidated view; --view toggles from there
    let mut table = ArrearsTable::new(data.rows.clone(), ViewMode::default());
    table.set_mode(view);
    print!("{}", render_receivables(&data, &table, filters));
    println!();
    println!("Share: {}", share_link(&config, Page::Receivables, filters));

    if let Some(path) = export {
        export_csv(table.view(), path)?;
        println!("Exported {} rows to {}", table.view().len(), path.display());
    }
    Ok(())
}

fn cmd_options(
    cfg_dir: &Path,
    filters: &FilterState,
    page: Page,
    dimension: Option<Dimension>,
    matching: &str,
    json: bool,
) -> Result<()> {
    let config = load_config(cfg_dir)?;
    apply_color_setting(&config);
    let client = PostgrestClient::new(&config.backend)?;
    let options = load_options(&client, filters, page)?;

    let dimensions: Vec<Dimension> = match dimension {
        Some(d) => vec![d],
        None => Dimension::ALL.to_vec(),
    };

    if json {
        let listed: serde_json::Map<String, serde_json::Value> = dimensions
            .iter()
            .map(|d| (d.key().to_string(), options.search(*d, matching).into()))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&listed).unwrap_or_else(|_| "{}".to_string())
        );
        return Ok(());
    }

    for d in dimensions {
        let matches = options.search(d, matching);
        info!(dimension = %d, shown = matches.len(), "listed filter options");
        println!("{} ({}):", d.label(), matches.len());
        if matches.is_empty() {
            println!("  (no matches)");
        }
        for value in matches {
            println!("  {value}");
        }
    }
    Ok(())
}

fn cmd_link(cfg_dir: &Path, page: Page, filters: &FilterState) -> Result<()> {
    let config = load_config_or_default(cfg_dir)?;
    println!("{}", share_link(&config, page, filters));
    Ok(())
}

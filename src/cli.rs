use clap::Parser;

pub const DEFAULT_OUTPUT: &str = "results/hreflang-results.csv";
pub const DEFAULT_FORMAT: &str = "text";
pub const DEFAULT_CONCURRENCY: usize = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug, Clone)]
#[command(name = "hreflint")]
#[command(about = "A CLI auditor for hreflang, canonical and Open Graph markup", long_about = None)]
pub struct Cli {
    /// The URLs to audit (replaces URLs from the config file)
    #[arg(value_name = "URLS")]
    pub urls: Vec<String>,

    /// Path of the CSV report
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: String,

    /// Also save the full report as JSON
    #[arg(long, value_name = "PATH")]
    pub json: Option<String>,

    /// Console summary format: text or json
    #[arg(short, long, default_value = DEFAULT_FORMAT)]
    pub format: String,

    /// Report pages without a canonical link as failures
    #[arg(long)]
    pub require_canonical: bool,

    /// Report pages without an og:url meta tag as failures
    #[arg(long)]
    pub require_og_url: bool,

    /// Number of pages loaded at once (default: 1, one after another)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Rate limit for requests per second (optional, e.g., 1.0 for 1 req/s)
    #[arg(short = 'r', long)]
    pub rate_limit: Option<f64>,

    /// Page load timeout in seconds (default: 30)
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to configuration file (JSON, TOML, or YAML)
    #[arg(long)]
    pub config: Option<String>,
}

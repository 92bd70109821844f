use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::browser::session::BrowserOptions;
use crate::scanner::scan_model::ScanMode;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "dashboard-e2e",
    version,
    about = "Declarative browser end-to-end tests with collection scanning"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: dashboard-e2e.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Append a JSONL trace of every executed step to this file
    #[arg(long, global = true)]
    pub trace: Option<String>,

    /// Path to the Node.js browser server script
    #[arg(long, global = true)]
    pub server_script: Option<String>,

    /// Show the browser window
    #[arg(long, global = true)]
    pub headed: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run test specs from YAML files
    Run {
        /// Path to test spec YAML file or directory of YAML files
        #[arg(long)]
        spec: String,

        /// Output format: console, html, junit
        #[arg(long)]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Default scan mode for scan steps that do not set one: first or all
        #[arg(long)]
        mode: Option<ScanMode>,
    },

    /// Parse test specs and report structural problems without a browser
    Validate {
        /// Path to test spec YAML file or directory of YAML files
        #[arg(long)]
        spec: String,
    },

    /// Open a page and list the collection items whose label matches
    Scan {
        /// Page to open
        #[arg(long)]
        url: String,

        /// CSS selector of the collection container
        #[arg(long)]
        container: String,

        /// Item selector among the container's children
        #[arg(long, default_value = "div")]
        item: String,

        /// Selector of the label element inside each item
        #[arg(long)]
        label: Option<String>,

        /// Selector of the status element inside each item
        #[arg(long)]
        status: Option<String>,

        /// Attribute read as the item's status
        #[arg(long, default_value = "class")]
        status_attribute: String,

        /// Text the label must contain
        #[arg(long)]
        contains: String,

        /// Scan mode: first or all
        #[arg(long, default_value = "all")]
        mode: ScanMode,

        /// Click each matched item
        #[arg(long)]
        activate: bool,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `dashboard-e2e.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_server_script")]
    pub server_script: String,

    #[serde(default = "default_true")]
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            server_script: default_server_script(),
            headless: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_console")]
    pub format: String,

    pub output: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            format: default_console(),
            output: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScanConfig {
    #[serde(default)]
    pub default_mode: ScanMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceConfig {
    pub path: Option<String>,
}

// Serde default helpers
fn default_server_script() -> String { "node/browser_server.js".to_string() }
fn default_true() -> bool { true }
fn default_console() -> String { "console".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("dashboard-e2e.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => match serde_yaml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = config_path, error = %e, "ignoring malformed config file");
                AppConfig::default()
            }
        },
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Resolve browser launch options: CLI > config > defaults.
pub fn build_browser_options(
    server_script: Option<&str>,
    headed: bool,
    config: &AppConfig,
) -> BrowserOptions {
    BrowserOptions {
        server_script: server_script
            .unwrap_or(&config.browser.server_script)
            .to_string(),
        headless: config.browser.headless && !headed,
    }
}

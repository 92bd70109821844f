use clap::Parser;
use dashboard_e2e::browser::driver::CollectionQuery;
use dashboard_e2e::cli::commands::{cmd_run, cmd_scan, cmd_validate};
use dashboard_e2e::cli::config::{Cli, Commands, build_browser_options, load_config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());
    let browser = build_browser_options(cli.server_script.as_deref(), cli.headed, &config);

    // Resolve trace path: CLI > config
    let trace_path = cli.trace.as_deref().or(config.trace.path.as_deref());

    match cli.command {
        Commands::Run {
            spec,
            format,
            output,
            mode,
        } => {
            let format = format.as_deref().unwrap_or(&config.run.format);
            let output = output.as_deref().or(config.run.output.as_deref());
            let mode = mode.unwrap_or(config.scan.default_mode);

            let all_passed = cmd_run(&spec, format, output, mode, &browser, trace_path)?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::Validate { spec } => {
            if !cmd_validate(&spec)? {
                std::process::exit(1);
            }
        }
        Commands::Scan {
            url,
            container,
            item,
            label,
            status,
            status_attribute,
            contains,
            mode,
            activate,
        } => {
            let query = CollectionQuery {
                container,
                item,
                label,
                status,
                status_attribute,
            };
            cmd_scan(&url, &query, &contains, mode, activate, &browser)?;
        }
    }

    Ok(())
}

/// Map `-v` counts to a log level; `RUST_LOG` wins when set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

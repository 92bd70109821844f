use tracing::{debug, info};

use crate::browser::driver::{CollectionQuery, PageDriver};
use crate::browser::session::{BrowserOptions, BrowserSession};
use crate::report::console::format_console_report;
use crate::report::html::generate_html_report;
use crate::report::junit::generate_junit_xml;
use crate::report::report_model::TestSuiteReport;
use crate::scanner::scan::scan;
use crate::scanner::scan_model::{LabelMatcher, ScanMode};
use crate::spec::runner::TestRunner;
use crate::spec::spec_model::TestSpec;
use crate::trace::logger::TraceLogger;

// ============================================================================
// run subcommand
// ============================================================================

/// Run test specs and return whether all passed.
pub fn cmd_run(
    spec_path: &str,
    format: &str,
    output: Option<&str>,
    mode: ScanMode,
    browser: &BrowserOptions,
    trace_path: Option<&str>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let specs = load_specs(spec_path)?;

    if specs.is_empty() {
        tracing::warn!(path = spec_path, "no test specs found");
        return Ok(true);
    }

    info!(count = specs.len(), "running test specs");

    let trace = trace_path.and_then(|path| match TraceLogger::create(path) {
        Ok(logger) => {
            info!(path = %logger.path().display(), "writing step trace");
            Some(logger)
        }
        Err(e) => {
            tracing::warn!(path, error = %e, "could not open trace file, tracing disabled");
            None
        }
    });
    let mut runner = TestRunner::new().with_default_mode(mode);
    if let Some(trace) = &trace {
        runner = runner.with_trace(trace);
    }

    let mut session = BrowserSession::launch(browser)?;
    let start = std::time::Instant::now();

    let mut results = Vec::new();
    for spec in &specs {
        results.push(runner.run(spec, &mut session));
    }

    let duration = start.elapsed().as_millis();
    session.quit()?;

    let report = TestSuiteReport::from_results("CLI Run", results).with_duration(duration);
    let all_passed = report.all_passed();

    let output_content = render_report(&report, format);

    match output {
        Some(path) => std::fs::write(path, &output_content)?,
        None => print!("{}", output_content),
    }

    Ok(all_passed)
}

/// Render a report in the named format; unknown names fall back to console.
pub fn render_report(report: &TestSuiteReport, format: &str) -> String {
    match format {
        "html" => generate_html_report(report),
        "junit" => generate_junit_xml(report),
        _ => format_console_report(report),
    }
}

/// Load test specs from a single YAML file or a directory of YAML files.
pub fn load_specs(path: &str) -> Result<Vec<TestSpec>, Box<dyn std::error::Error>> {
    let metadata = std::fs::metadata(path)?;
    if metadata.is_dir() {
        let mut specs = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let p = entry.path();
            if p.extension().is_some_and(|e| e == "yaml" || e == "yml") {
                debug!(file = %p.display(), "loading spec");
                let content = std::fs::read_to_string(&p)?;
                let spec: TestSpec = serde_yaml::from_str(&content)
                    .map_err(|e| format!("{}: {}", p.display(), e))?;
                specs.push(spec);
            }
        }
        // Sort by name for deterministic order
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(specs)
    } else {
        let content = std::fs::read_to_string(path)?;
        let spec: TestSpec = serde_yaml::from_str(&content)?;
        Ok(vec![spec])
    }
}

// ============================================================================
// validate subcommand
// ============================================================================

/// Parse specs and print their problems. Returns whether all were clean.
pub fn cmd_validate(spec_path: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let specs = load_specs(spec_path)?;
    let mut clean = true;

    for spec in &specs {
        let problems = spec.problems();
        if problems.is_empty() {
            println!("ok    {} ({} steps)", spec.name, spec.steps.len());
        } else {
            clean = false;
            println!("error {}", spec.name);
            for problem in problems {
                println!("    {}", problem);
            }
        }
    }

    Ok(clean)
}

// ============================================================================
// scan subcommand
// ============================================================================

/// Open `url`, scan a collection and print every match.
/// Returns the number of matched items.
pub fn cmd_scan(
    url: &str,
    query: &CollectionQuery,
    contains: &str,
    mode: ScanMode,
    activate: bool,
    browser: &BrowserOptions,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut session = BrowserSession::launch(browser)?;
    session.navigate(url)?;

    let matched = scan_and_print(&mut session, query, contains, mode, activate)?;

    session.quit()?;
    Ok(matched)
}

/// The driver-agnostic part of `cmd_scan`.
pub fn scan_and_print<D: PageDriver + ?Sized>(
    driver: &mut D,
    query: &CollectionQuery,
    contains: &str,
    mode: ScanMode,
    activate: bool,
) -> Result<usize, Box<dyn std::error::Error>> {
    let items = driver.collect_items(query)?;
    let matcher = LabelMatcher::Contains(contains.to_string());

    let outcome = scan(&items, |label| matcher.matches(label), mode, |index, item| {
        println!(
            "#{:<3} {}  [{}]",
            index,
            item.label,
            item.status.as_deref().unwrap_or("-")
        );
        if activate {
            driver.activate_item(query, item)?;
        }
        Ok::<(), crate::error::DriverError>(())
    })?;

    println!(
        "{} of {} item(s) matched {} (fingerprint {})",
        outcome.match_count(),
        outcome.scanned,
        matcher,
        outcome.fingerprint(&items)
    );

    Ok(outcome.match_count())
}

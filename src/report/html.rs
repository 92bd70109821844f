use crate::report::report_model::TestSuiteReport;
use crate::spec::spec_model::{ScanRecord, TestResult};

/// Leading fingerprint characters shown in the scan table.
const FINGERPRINT_PREFIX: usize = 12;

const STYLE: &str = "\
body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 960px; color: #222; }
header.pass { border-bottom: 4px solid #2e7d32; }
header.fail { border-bottom: 4px solid #c62828; }
section { margin: 1.5rem 0; padding-left: 1rem; border-left: 3px solid #ccc; }
section.pass { border-left-color: #2e7d32; }
section.fail { border-left-color: #c62828; }
.error, .failures li { color: #c62828; }
table.scans { border-collapse: collapse; width: 100%; font-size: 0.9rem; }
table.scans th, table.scans td { border: 1px solid #ddd; padding: 4px 8px; text-align: left; }
tr.empty td { background: #fff3e0; color: #ef6c00; }
code { font-size: 0.85rem; }
";

/// Render the suite as a single HTML page.
///
/// Each spec gets a section listing its failures and a table of the scans
/// it ran: matcher, mode, items scanned, matched labels and fingerprint.
/// Scans that matched nothing are highlighted.
pub fn generate_html_report(report: &TestSuiteReport) -> String {
    let verdict = if report.all_passed() { "pass" } else { "fail" };
    let duration = report
        .duration_ms
        .map(|ms| format!(", {:.1}s", ms as f64 / 1000.0))
        .unwrap_or_default();

    let sections: String = report.test_results.iter().map(spec_section).collect();

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
<title>{suite} | dashboard-e2e</title>\n<style>\n{style}</style>\n</head>\n<body>\n\
<header class=\"{verdict}\">\n<h1>{suite}</h1>\n\
<p>{passed} passed, {failed} failed of {total}; {empty} empty scan(s){duration}</p>\n\
</header>\n{sections}</body>\n</html>\n",
        suite = escape_html(&report.suite_name),
        style = STYLE,
        verdict = verdict,
        passed = report.passed,
        failed = report.failed,
        total = report.total,
        empty = report.empty_scan_count(),
        duration = duration,
        sections = sections,
    )
}

fn spec_section(result: &TestResult) -> String {
    let verdict = if result.passed { "pass" } else { "fail" };
    let mut out = format!(
        "<section class=\"{}\">\n<h2>{}</h2>\n<p>{} step(s), {} assertion(s), {} scan(s)</p>\n",
        verdict,
        escape_html(&result.spec_name),
        result.steps_run,
        result.assertion_results.len(),
        result.scans.len()
    );

    if let Some(error) = &result.error {
        out.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(error)));
    }

    let failures: Vec<String> = result
        .assertion_results
        .iter()
        .filter(|ar| !ar.passed)
        .map(|ar| {
            format!(
                "<li>Step {} {}: {}</li>\n",
                ar.step_index,
                ar.kind,
                escape_html(ar.message.as_deref().unwrap_or("assertion failed"))
            )
        })
        .collect();
    if !failures.is_empty() {
        out.push_str("<ul class=\"failures\">\n");
        out.extend(failures);
        out.push_str("</ul>\n");
    }

    if !result.scans.is_empty() {
        out.push_str(&scan_table(&result.scans));
    }

    out.push_str("</section>\n");
    out
}

fn scan_table(scans: &[ScanRecord]) -> String {
    let mut out = String::from(
        "<table class=\"scans\">\n<tr><th>Step</th><th>Matcher</th><th>Mode</th>\
<th>Scanned</th><th>Matched</th><th>Fingerprint</th></tr>\n",
    );

    for scan in scans {
        let (row_class, matched) = if scan.is_empty() {
            (" class=\"empty\"", "none".to_string())
        } else {
            ("", escape_html(&scan.matched.join(", ")))
        };
        let fingerprint: String = scan.fingerprint.chars().take(FINGERPRINT_PREFIX).collect();

        out.push_str(&format!(
            "<tr{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><code>{}</code></td></tr>\n",
            row_class,
            scan.step_index,
            escape_html(&scan.description),
            scan.mode,
            scan.scanned,
            matched,
            fingerprint
        ));
    }

    out.push_str("</table>\n");
    out
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

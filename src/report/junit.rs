use crate::report::report_model::TestSuiteReport;
use crate::spec::spec_model::TestResult;

// ============================================================================
// JUnit XML reporter for CI systems
// ============================================================================

/// Generate a JUnit XML report for CI systems (Jenkins, GitHub Actions, GitLab CI).
///
/// Produces standard JUnit XML:
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <testsuite name="..." tests="3" failures="1" time="1.234">
///   <testcase name="Test 1" classname="dashboard-e2e" />
///   <testcase name="Test 2" classname="dashboard-e2e">
///     <failure message="1 assertion(s) failed" type="AssertionFailure">
///       Step 1: Element '.popup' is not visible
///     </failure>
///   </testcase>
/// </testsuite>
/// ```
pub fn generate_junit_xml(report: &TestSuiteReport) -> String {
    let time_attr = report
        .duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut cases = String::new();
    for result in &report.test_results {
        let name = escape_xml(&result.spec_name);
        let failure = failure_element(result);
        let scan_log = scan_summary(result);

        if failure.is_none() && scan_log.is_none() {
            cases.push_str(&format!(
                "  <testcase name=\"{}\" classname=\"dashboard-e2e\" />\n",
                name
            ));
            continue;
        }

        cases.push_str(&format!(
            "  <testcase name=\"{}\" classname=\"dashboard-e2e\">\n",
            name
        ));
        if let Some(failure) = failure {
            cases.push_str(&failure);
        }
        if let Some(log) = scan_log {
            cases.push_str(&format!(
                "    <system-out>{}</system-out>\n",
                escape_xml(&log)
            ));
        }
        cases.push_str("  </testcase>\n");
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\"{time}>\n{cases}</testsuite>\n",
        name = escape_xml(&report.suite_name),
        tests = report.total,
        failures = report.failed,
        time = time_attr,
        cases = cases,
    )
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// `<failure>` element for a failed test, `None` when it passed.
fn failure_element(result: &TestResult) -> Option<String> {
    if result.passed {
        return None;
    }

    let mut body_parts: Vec<String> = result
        .assertion_results
        .iter()
        .filter(|ar| !ar.passed)
        .map(|ar| {
            let msg = ar.message.as_deref().unwrap_or("assertion failed");
            format!("Step {}: {}", ar.step_index, msg)
        })
        .collect();

    let failure_count = body_parts.len();
    if let Some(error) = &result.error {
        body_parts.push(format!("Error: {}", error));
    }

    let failure_message = if failure_count > 0 {
        format!("{} assertion(s) failed", failure_count)
    } else {
        "execution error".to_string()
    };

    Some(format!(
        "    <failure message=\"{}\" type=\"AssertionFailure\">{}</failure>\n",
        escape_xml(&failure_message),
        escape_xml(&body_parts.join("\n")),
    ))
}

/// One line per scan, e.g. `Step 1: label contains 'Contact 4' -> 1 of 9`.
fn scan_summary(result: &TestResult) -> Option<String> {
    if result.scans.is_empty() {
        return None;
    }
    let lines: Vec<String> = result
        .scans
        .iter()
        .map(|scan| {
            format!(
                "Step {}: {} -> {} of {}",
                scan.step_index,
                scan.description,
                scan.matched.len(),
                scan.scanned
            )
        })
        .collect();
    Some(lines.join("\n"))
}

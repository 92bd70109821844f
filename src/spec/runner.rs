use thiserror::Error;
use tracing::{debug, info, warn};

use crate::browser::driver::{CollectionQuery, PageDriver, RenderedItem};
use crate::error::DriverError;
use crate::scanner::scan::scan;
use crate::scanner::scan_model::{
    Item, LabelMatcher, ScanError, ScanExpectation, ScanMode, ScanOutcome,
};
use crate::spec::context::TestContext;
use crate::spec::spec_model::{
    AssertionResult, AssertionSpec, MatchCheck, ScanRecord, TestResult, TestSpec, TestStep,
};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

/// Why a step stopped the test.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("'{step}' only works inside a scan's on_match steps")]
    NoActiveMatch { step: &'static str },

    #[error("{kind} failed on item '{label}': {message}")]
    MatchCheckFailed {
        kind: &'static str,
        label: String,
        message: String,
    },

    #[error("{kind} failed while handling a match: {message}")]
    AssertionFailed { kind: String, message: String },
}

/// Executes a TestSpec step-by-step against any `PageDriver`.
pub struct TestRunner<'a> {
    default_mode: ScanMode,
    trace: Option<&'a TraceLogger>,
}

impl<'a> TestRunner<'a> {
    pub fn new() -> Self {
        TestRunner {
            default_mode: ScanMode::default(),
            trace: None,
        }
    }

    /// Mode used by scan steps that do not name one.
    pub fn with_default_mode(mut self, mode: ScanMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn with_trace(mut self, trace: &'a TraceLogger) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Run a complete test spec.
    ///
    /// Returns a TestResult with pass/fail status, assertion results, scan
    /// records and any error that stopped execution.
    pub fn run<D: PageDriver + ?Sized>(&self, spec: &TestSpec, driver: &mut D) -> TestResult {
        let mut ctx = TestContext::new();
        info!(spec = %spec.name, url = %spec.start_url, "running test spec");

        if let Err(e) = driver.navigate(&spec.start_url) {
            self.log(TraceEvent::now(&spec.name, 0, "navigate").with_error(&e));
            return TestResult {
                spec_name: spec.name.clone(),
                passed: false,
                steps_run: 0,
                assertion_results: ctx.assertion_results,
                scans: ctx.scans,
                error: Some(format!("Failed to navigate to start_url: {}", e)),
            };
        }

        for (i, step) in spec.steps.iter().enumerate() {
            ctx.current_step = i;
            let scans_before = ctx.scans.len();

            let outcome = self.execute_step(step, i, driver, &mut ctx);

            let mut event = TraceEvent::now(&spec.name, i, step.kind());
            if let Some(record) = ctx.scans[scans_before..].last() {
                event = event.with_scan(record);
            }

            if let Err(e) = outcome {
                warn!(spec = %spec.name, step = i, error = %e, "step failed");
                self.log(event.with_error(&e));
                return TestResult {
                    spec_name: spec.name.clone(),
                    passed: false,
                    steps_run: i + 1,
                    assertion_results: ctx.assertion_results,
                    scans: ctx.scans,
                    error: Some(format!("Step {} failed: {}", i, e)),
                };
            }
            self.log(event);
        }

        let passed = ctx.all_passed();
        info!(
            spec = %spec.name,
            passed,
            assertions = ctx.total_count(),
            failures = ctx.fail_count(),
            "test spec finished"
        );

        TestResult {
            spec_name: spec.name.clone(),
            passed,
            steps_run: spec.steps.len(),
            assertion_results: ctx.assertion_results,
            scans: ctx.scans,
            error: None,
        }
    }

    fn log(&self, event: TraceEvent) {
        if let Some(trace) = self.trace {
            trace.log(&event);
        }
    }

    /// Execute a single step. Nested `on_match` steps report the index of
    /// the enclosing top-level step.
    fn execute_step<D: PageDriver + ?Sized>(
        &self,
        step: &TestStep,
        step_index: usize,
        driver: &mut D,
        ctx: &mut TestContext,
    ) -> Result<(), StepError> {
        debug!(step = step_index, kind = step.kind(), "executing step");

        match step {
            TestStep::Navigate { url } => driver.navigate(url)?,

            TestStep::Type { selector, value } => driver.type_text(selector, value)?,

            TestStep::Click { selector } => driver.click(selector)?,

            TestStep::ClickText { selector, text } => driver.click_text(selector, text)?,

            TestStep::Check { selector } => driver.set_checked(selector, true)?,

            TestStep::Uncheck { selector } => driver.set_checked(selector, false)?,

            TestStep::Select { selector, value } => driver.select_option(selector, value)?,

            TestStep::Wait { duration_ms } => driver.wait_idle(*duration_ms)?,

            TestStep::Assert { assertions } => {
                let results = Self::evaluate_assertions(assertions, step_index, driver);
                let failure = results
                    .iter()
                    .find(|r| !r.passed)
                    .map(|r| StepError::AssertionFailed {
                        kind: r.kind.clone(),
                        message: r.message.clone().unwrap_or_default(),
                    });
                ctx.record_assertions(results);

                // A failed assertion inside on_match aborts the enclosing scan
                if ctx.active_match().is_some() {
                    if let Some(e) = failure {
                        return Err(e);
                    }
                }
            }

            TestStep::Scan {
                collection,
                matcher,
                mode,
                expect,
                on_match,
            } => {
                let mode = mode.unwrap_or(self.default_mode);
                self.execute_scan(
                    collection, matcher, mode, expect.as_ref(), on_match, step_index, driver, ctx,
                )?;
            }

            TestStep::Activate => {
                let active = ctx
                    .active_match()
                    .ok_or(StepError::NoActiveMatch { step: "activate" })?;
                driver.activate_item(&active.query, &active.item)?;
            }

            TestStep::AssertMatch { checks } => {
                let item = ctx
                    .active_match()
                    .map(|m| m.item.clone())
                    .ok_or(StepError::NoActiveMatch {
                        step: "assert_match",
                    })?;

                let results: Vec<AssertionResult> = checks
                    .iter()
                    .map(|check| Self::evaluate_check(check, &item, step_index))
                    .collect();

                let failure = checks.iter().zip(&results).find(|(_, r)| !r.passed).map(
                    |(check, r)| StepError::MatchCheckFailed {
                        kind: check_kind(check),
                        label: item.label.clone(),
                        message: r.message.clone().unwrap_or_default(),
                    },
                );
                ctx.record_assertions(results);

                if let Some(e) = failure {
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_scan<D: PageDriver + ?Sized>(
        &self,
        collection: &CollectionQuery,
        matcher: &LabelMatcher,
        mode: ScanMode,
        expect: Option<&ScanExpectation>,
        on_match: &[TestStep],
        step_index: usize,
        driver: &mut D,
        ctx: &mut TestContext,
    ) -> Result<(), StepError> {
        let items = driver.collect_items(collection)?;
        let description = matcher.to_string();
        debug!(
            container = %collection.container,
            items = items.len(),
            %description,
            %mode,
            "scanning collection"
        );

        // Matches entered so far, so a failing on_match still leaves a record
        let mut entered = Vec::new();
        let result = scan(
            &items,
            |label| matcher.matches(label),
            mode,
            |index, item: &RenderedItem| {
                entered.push(index);
                ctx.enter_match(collection, item);
                let result = on_match
                    .iter()
                    .try_for_each(|step| self.execute_step(step, step_index, driver, ctx));
                ctx.leave_match();
                result
            },
        );

        let outcome = match &result {
            Ok(outcome) => outcome.clone(),
            Err(_) => ScanOutcome {
                scanned: entered.last().map_or(0, |&index| index + 1),
                matched: entered,
            },
        };

        if result.is_ok() && outcome.is_empty() && expect.is_none() {
            warn!(
                container = %collection.container,
                %description,
                scanned = outcome.scanned,
                "scan matched no items"
            );
        }

        ctx.record_scan(ScanRecord {
            step_index,
            description: description.clone(),
            mode,
            scanned: outcome.scanned,
            matched: outcome
                .matched
                .iter()
                .filter_map(|&i| items.get(i).map(|item| item.label().to_string()))
                .collect(),
            fingerprint: outcome.fingerprint(&items),
        });
        result?;

        if let Some(expectation) = expect {
            expectation.check(&outcome, &description)?;
        }

        Ok(())
    }

    /// Evaluate a list of assertions against the current page state.
    fn evaluate_assertions<D: PageDriver + ?Sized>(
        assertions: &[AssertionSpec],
        step_index: usize,
        driver: &mut D,
    ) -> Vec<AssertionResult> {
        assertions
            .iter()
            .map(|spec| Self::evaluate_one(spec, step_index, driver))
            .collect()
    }

    /// Evaluate a single assertion.
    fn evaluate_one<D: PageDriver + ?Sized>(
        spec: &AssertionSpec,
        step_index: usize,
        driver: &mut D,
    ) -> AssertionResult {
        let verdict = Self::judge(spec, driver);
        let kind = spec.kind_name().to_string();

        match verdict {
            Ok(v) => AssertionResult {
                step_index,
                kind,
                passed: v.passed,
                actual: v.actual,
                message: if v.passed { None } else { Some(v.failure) },
            },
            Err(e) => AssertionResult {
                step_index,
                kind,
                passed: false,
                actual: None,
                message: Some(format!("Failed to query page: {}", e)),
            },
        }
    }

    fn judge<D: PageDriver + ?Sized>(
        spec: &AssertionSpec,
        driver: &mut D,
    ) -> Result<Verdict, DriverError> {
        let verdict = match spec {
            AssertionSpec::UrlContains { expected } => {
                let url = driver.current_url()?;
                Verdict::new(
                    url.contains(expected.as_str()),
                    Some(url),
                    format!("URL does not contain '{}'", expected),
                )
            }

            AssertionSpec::UrlEquals { expected } => {
                let url = driver.current_url()?;
                Verdict::new(
                    url == *expected,
                    Some(url),
                    format!("URL does not equal '{}'", expected),
                )
            }

            AssertionSpec::TitleContains { expected } => {
                let title = driver.title()?;
                Verdict::new(
                    title.contains(expected.as_str()),
                    Some(title),
                    format!("Title does not contain '{}'", expected),
                )
            }

            AssertionSpec::TextPresent { expected } => {
                let text = driver.page_text()?.to_lowercase();
                Verdict::new(
                    text.contains(&expected.to_lowercase()),
                    Some(format!("(page text, {} chars)", text.len())),
                    format!("Text '{}' not found on page", expected),
                )
            }

            AssertionSpec::TextAbsent { expected } => {
                let text = driver.page_text()?.to_lowercase();
                Verdict::new(
                    !text.contains(&expected.to_lowercase()),
                    Some(format!("(page text, {} chars)", text.len())),
                    format!("Text '{}' was found on page but should be absent", expected),
                )
            }

            AssertionSpec::ElementText { selector, expected } => match driver.query_text(selector)? {
                Some(text) => Verdict::new(
                    text.contains(expected.as_str()),
                    Some(text),
                    format!("Element '{}' text does not contain '{}'", selector, expected),
                ),
                None => Verdict::not_found(selector),
            },

            AssertionSpec::ElementVisible { selector } => {
                let visible = driver.query_visible(selector)?;
                Verdict::new(
                    visible,
                    Some(visible.to_string()),
                    format!("Element '{}' is not visible", selector),
                )
            }

            AssertionSpec::ElementCount { selector, expected } => {
                let count = driver.query_count(selector)?;
                Verdict::new(
                    count == *expected,
                    Some(count.to_string()),
                    format!(
                        "Element '{}' count is {} but expected {}",
                        selector, count, expected
                    ),
                )
            }

            AssertionSpec::ElementValue { selector, expected } => {
                match driver.query_value(selector)? {
                    Some(value) => Verdict::new(
                        value == *expected,
                        Some(value),
                        format!("Element '{}' value is not '{}'", selector, expected),
                    ),
                    None => Verdict::not_found(selector),
                }
            }

            AssertionSpec::ElementChecked { selector } => match driver.query_checked(selector)? {
                Some(checked) => Verdict::new(
                    checked,
                    Some(checked.to_string()),
                    format!("Element '{}' is not checked", selector),
                ),
                None => Verdict::not_found(selector),
            },

            AssertionSpec::ElementUnchecked { selector } => {
                match driver.query_checked(selector)? {
                    Some(checked) => Verdict::new(
                        !checked,
                        Some(checked.to_string()),
                        format!("Element '{}' is checked", selector),
                    ),
                    None => Verdict::not_found(selector),
                }
            }

            AssertionSpec::ElementHasClass { selector, class } => {
                match driver.query_attribute(selector, "class")? {
                    Some(classes) => Verdict::new(
                        classes.split_whitespace().any(|c| c == class),
                        Some(classes),
                        format!("Element '{}' does not have class '{}'", selector, class),
                    ),
                    None => Verdict::not_found(selector),
                }
            }

            AssertionSpec::TextNear {
                within,
                anchor,
                expected,
            } => match driver.query_text_near(within, anchor)? {
                Some(text) => Verdict::new(
                    text.contains(expected.as_str()),
                    Some(text),
                    format!("Text next to '{}' does not contain '{}'", anchor, expected),
                ),
                None => Verdict::new(
                    false,
                    None,
                    format!("No element containing '{}' inside '{}'", anchor, within),
                ),
            },
        };

        Ok(verdict)
    }

    /// Evaluate a check against a matched item.
    fn evaluate_check(check: &MatchCheck, item: &RenderedItem, step_index: usize) -> AssertionResult {
        let status = item.status().unwrap_or("");
        let verdict = match check {
            MatchCheck::StatusContains { expected } => Verdict::new(
                status.contains(expected.as_str()),
                item.status.clone(),
                format!("Status of '{}' does not contain '{}'", item.label, expected),
            ),
            MatchCheck::StatusEquals { expected } => Verdict::new(
                status.trim() == expected,
                item.status.clone(),
                format!("Status of '{}' is not '{}'", item.label, expected),
            ),
            MatchCheck::LabelContains { expected } => Verdict::new(
                item.label.contains(expected.as_str()),
                Some(item.label.clone()),
                format!("Label '{}' does not contain '{}'", item.label, expected),
            ),
        };

        AssertionResult {
            step_index,
            kind: check_kind(check).to_string(),
            passed: verdict.passed,
            actual: verdict.actual,
            message: if verdict.passed { None } else { Some(verdict.failure) },
        }
    }
}

impl Default for TestRunner<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_kind(check: &MatchCheck) -> &'static str {
    match check {
        MatchCheck::StatusContains { .. } => "StatusContains",
        MatchCheck::StatusEquals { .. } => "StatusEquals",
        MatchCheck::LabelContains { .. } => "LabelContains",
    }
}

/// Outcome of one comparison before it becomes an `AssertionResult`.
struct Verdict {
    passed: bool,
    actual: Option<String>,
    failure: String,
}

impl Verdict {
    fn new(passed: bool, actual: Option<String>, failure: String) -> Self {
        Verdict {
            passed,
            actual,
            failure,
        }
    }

    fn not_found(selector: &str) -> Self {
        Verdict::new(false, None, format!("Element '{}' not found on page", selector))
    }
}

use dashboard_e2e::{
    Item, LabelMatcher, ScanError, ScanExpectation, ScanMode, ScanOutcome, find_matches, scan,
};

// =========================================================================
// Helpers
// =========================================================================

#[derive(Debug, Clone, PartialEq)]
struct Card {
    label: String,
    status: Option<String>,
}

impl Item for Card {
    fn label(&self) -> &str {
        &self.label
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

fn card(label: &str) -> Card {
    Card {
        label: label.into(),
        status: None,
    }
}

fn cards(labels: &[&str]) -> Vec<Card> {
    labels.iter().map(|l| card(l)).collect()
}

fn contains(text: &'static str) -> impl Fn(&str) -> bool {
    move |label: &str| label.contains(text)
}

/// Run a scan and return the indices the action was invoked with.
fn invocations(
    items: &[Card],
    predicate: impl Fn(&str) -> bool,
    mode: ScanMode,
) -> (Vec<usize>, ScanOutcome) {
    let mut seen = Vec::new();
    let outcome = scan(items, predicate, mode, |index, _| {
        seen.push(index);
        Ok::<(), String>(())
    })
    .expect("action never fails");
    (seen, outcome)
}

// =========================================================================
// Match counts
// =========================================================================

#[test]
fn no_match_invokes_nothing_and_is_not_an_error() {
    let items = cards(&["Contact 1", "Contact 2"]);
    let (seen, outcome) = invocations(&items, contains("Contact 7"), ScanMode::FindAll);

    assert!(seen.is_empty());
    assert!(outcome.is_empty());
    assert_eq!(outcome.scanned, 2);
}

#[test]
fn single_match_invokes_once_on_that_item() {
    let items = cards(&["Contact 1", "Contact 4", "Contact 9"]);
    let mut hits = Vec::new();

    let outcome = scan(&items, contains("Contact 4"), ScanMode::FindAll, |index, item| {
        hits.push((index, item.label().to_string()));
        Ok::<(), String>(())
    })
    .unwrap();

    assert_eq!(hits, vec![(1, "Contact 4".to_string())]);
    assert_eq!(outcome.match_count(), 1);
    assert_eq!(outcome.first(), Some(1));
}

#[test]
fn multiple_matches_invoke_in_collection_order() {
    let items = cards(&["Contact 1", "Contact 10", "Contact 2", "Contact 11"]);
    let (seen, outcome) = invocations(&items, contains("Contact 1"), ScanMode::FindAll);

    assert_eq!(seen, vec![0, 1, 3]);
    assert_eq!(outcome.matched, seen);
}

#[test]
fn find_all_keeps_scanning_after_a_match() {
    let items = cards(&["Contact 4", "Contact 5", "Contact 6"]);
    let (_, outcome) = invocations(&items, contains("Contact 4"), ScanMode::FindAll);
    assert_eq!(outcome.scanned, 3);
}

#[test]
fn find_first_stops_after_first_match() {
    let items = cards(&["Contact 1", "Contact 10", "Contact 11"]);
    let (seen, outcome) = invocations(&items, contains("Contact 1"), ScanMode::FindFirst);

    assert_eq!(seen, vec![0]);
    assert_eq!(outcome.scanned, 1);
}

#[test]
fn default_mode_is_find_all() {
    assert_eq!(ScanMode::default(), ScanMode::FindAll);
}

// =========================================================================
// Behavioural scenarios
// =========================================================================

#[test]
fn scenario_contact_4_in_three_cards() {
    let items = cards(&["Contact 1", "Contact 4", "Contact 9"]);
    let (seen, _) = invocations(&items, contains("Contact 4"), ScanMode::FindAll);
    assert_eq!(seen, vec![1], "exactly one invocation, on the second item");
}

#[test]
fn scenario_empty_collection() {
    let items: Vec<Card> = Vec::new();
    let (seen, outcome) = invocations(&items, contains("Contact 4"), ScanMode::FindAll);
    assert!(seen.is_empty());
    assert_eq!(outcome.scanned, 0);
}

#[test]
fn scenario_inactive_contact_status_checked_in_action() {
    let items = vec![Card {
        label: "Contact 8".into(),
        status: Some("inactive".into()),
    }];
    let mut checked = 0;

    let outcome = scan(&items, contains("Contact 8"), ScanMode::FindAll, |_, item| {
        checked += 1;
        if item.status() == Some("inactive") {
            Ok(())
        } else {
            Err(format!("expected inactive, got {:?}", item.status()))
        }
    });

    assert!(outcome.is_ok());
    assert_eq!(checked, 1);
}

// =========================================================================
// Action failures
// =========================================================================

#[test]
fn action_error_propagates_unchanged_and_stops_scan() {
    #[derive(Debug, PartialEq)]
    struct Boom(usize);

    let items = cards(&["Contact 1", "Contact 1b", "Contact 1c"]);
    let mut calls = 0;

    let result = scan(&items, contains("Contact 1"), ScanMode::FindAll, |index, _| {
        calls += 1;
        if index == 1 { Err(Boom(index)) } else { Ok(()) }
    });

    assert_eq!(result, Err(Boom(1)));
    assert_eq!(calls, 2, "third match must not be visited after the failure");
}

#[test]
fn predicate_sees_labels_not_statuses() {
    let items = vec![Card {
        label: "Contact 3".into(),
        status: Some("Contact 4".into()),
    }];
    let outcome = find_matches(&items, contains("Contact 4"), ScanMode::FindAll);
    assert!(outcome.is_empty());
}

// =========================================================================
// Idempotence and fingerprints
// =========================================================================

#[test]
fn repeated_scans_over_unchanged_collection_agree() {
    let items = cards(&["Contact 1", "Contact 4", "Contact 14", "Contact 9"]);

    let first = find_matches(&items, contains("Contact 4"), ScanMode::FindAll);
    let second = find_matches(&items, contains("Contact 4"), ScanMode::FindAll);

    assert_eq!(first, second);
    assert_eq!(first.fingerprint(&items), second.fingerprint(&items));
}

#[test]
fn fingerprint_changes_when_matches_change() {
    let before = cards(&["Contact 4", "Contact 5"]);
    let after = cards(&["Contact 5", "Contact 4"]);

    let a = find_matches(&before, contains("Contact 4"), ScanMode::FindAll);
    let b = find_matches(&after, contains("Contact 4"), ScanMode::FindAll);

    assert_ne!(a.fingerprint(&before), b.fingerprint(&after));
}

#[test]
fn fingerprint_is_hex_sha1() {
    let items = cards(&["Contact 4"]);
    let outcome = find_matches(&items, contains("Contact"), ScanMode::FindAll);
    let fp = outcome.fingerprint(&items);
    assert_eq!(fp.len(), 40);
    assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn scan_does_not_touch_the_collection() {
    let items = cards(&["Contact 2", "Contact 4"]);
    let snapshot = items.clone();
    let _ = find_matches(&items, contains("Contact"), ScanMode::FindAll);
    assert_eq!(items, snapshot);
}

// =========================================================================
// LabelMatcher
// =========================================================================

#[test]
fn label_matcher_variants() {
    let contains = LabelMatcher::Contains("Contact 4".into());
    assert!(contains.matches("Contact 4"));
    assert!(contains.matches("Contact 42"));
    assert!(!contains.matches("contact 4"), "contains is case-sensitive");

    let equals = LabelMatcher::Equals("Contact 4".into());
    assert!(equals.matches("  Contact 4 "));
    assert!(!equals.matches("Contact 42"));

    let prefix = LabelMatcher::StartsWith("Contact".into());
    assert!(prefix.matches(" Contact 9"));
    assert!(!prefix.matches("My Contact"));
}

#[test]
fn label_matcher_display() {
    assert_eq!(
        LabelMatcher::Contains("Contact 4".into()).to_string(),
        "label contains 'Contact 4'"
    );
}

#[test]
fn label_matcher_yaml_map_form() {
    let matcher: LabelMatcher = serde_yaml::from_str("contains: \"Contact 4\"").unwrap();
    assert_eq!(matcher, LabelMatcher::Contains("Contact 4".into()));
}

#[test]
fn scan_mode_from_str() {
    assert_eq!("first".parse::<ScanMode>().unwrap(), ScanMode::FindFirst);
    assert_eq!("ALL".parse::<ScanMode>().unwrap(), ScanMode::FindAll);
    assert_eq!("find_first".parse::<ScanMode>().unwrap(), ScanMode::FindFirst);
    assert!("sometimes".parse::<ScanMode>().is_err());
}

// =========================================================================
// Expectations
// =========================================================================

fn outcome_with(matched: Vec<usize>, scanned: usize) -> ScanOutcome {
    ScanOutcome { scanned, matched }
}

#[test]
fn expectation_exactly_one() {
    let exp = ScanExpectation::Exactly(1);
    assert!(exp.check(&outcome_with(vec![2], 5), "x").is_ok());

    assert_eq!(
        exp.check(&outcome_with(vec![], 5), "label contains 'Contact 4'"),
        Err(ScanError::NoMatch {
            description: "label contains 'Contact 4'".into(),
            scanned: 5,
        })
    );

    assert_eq!(
        exp.check(&outcome_with(vec![1, 3], 5), "dup"),
        Err(ScanError::UnexpectedCount {
            description: "dup".into(),
            expected: ScanExpectation::Exactly(1),
            actual: 2,
        })
    );
}

#[test]
fn expectation_bounds() {
    assert!(ScanExpectation::AtLeast(2).check(&outcome_with(vec![0, 1, 2], 3), "x").is_ok());
    assert!(ScanExpectation::AtLeast(2).check(&outcome_with(vec![0], 3), "x").is_err());
    assert!(ScanExpectation::AtMost(1).check(&outcome_with(vec![], 3), "x").is_ok());
    assert!(ScanExpectation::AtMost(1).check(&outcome_with(vec![0, 1], 3), "x").is_err());
}

#[test]
fn expectation_error_messages() {
    let err = ScanExpectation::Exactly(1)
        .check(&outcome_with(vec![], 9), "label contains 'Contact 4'")
        .unwrap_err();
    assert_eq!(err.to_string(), "no item matched label contains 'Contact 4' (9 scanned)");

    let err = ScanExpectation::Exactly(1)
        .check(&outcome_with(vec![0, 1], 9), "label contains 'Contact 1'")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "label contains 'Contact 1': expected exactly 1 match(es), found 2"
    );
}

#[test]
fn expectation_reachability_with_find_first() {
    assert!(ScanExpectation::Exactly(1).reachable_with_first());
    assert!(ScanExpectation::AtMost(3).reachable_with_first());
    assert!(!ScanExpectation::Exactly(2).reachable_with_first());
    assert!(!ScanExpectation::AtLeast(2).reachable_with_first());
}

use crate::scanner::scan_model::{Item, ScanMode, ScanOutcome};

/// Walk `items` in order and invoke `action` on every item whose label
/// satisfies `predicate`.
///
/// The action runs before the next item is examined. An action error is
/// returned as-is and the rest of the collection is left unscanned. With
/// `ScanMode::FindFirst` the walk ends after the first successful action;
/// with `ScanMode::FindAll` every item is visited.
///
/// A scan that matches nothing is not an error: the returned outcome carries
/// the match count so the caller decides what "nothing found" means.
pub fn scan<T, P, F, E>(
    items: &[T],
    predicate: P,
    mode: ScanMode,
    mut action: F,
) -> Result<ScanOutcome, E>
where
    T: Item,
    P: Fn(&str) -> bool,
    F: FnMut(usize, &T) -> Result<(), E>,
{
    let mut outcome = ScanOutcome::default();

    for (index, item) in items.iter().enumerate() {
        outcome.scanned += 1;

        if !predicate(item.label()) {
            continue;
        }

        action(index, item)?;
        outcome.matched.push(index);

        if mode == ScanMode::FindFirst {
            break;
        }
    }

    Ok(outcome)
}

/// Locate matches without acting on them.
pub fn find_matches<T, P>(items: &[T], predicate: P, mode: ScanMode) -> ScanOutcome
where
    T: Item,
    P: Fn(&str) -> bool,
{
    let result: Result<ScanOutcome, std::convert::Infallible> =
        scan(items, predicate, mode, |_, _| Ok(()));
    match result {
        Ok(outcome) => outcome,
        Err(never) => match never {},
    }
}

//! Declarative browser end-to-end tests for rendered collections.
//!
//! Test specs are YAML files of steps executed against a [`PageDriver`].
//! The piece with real logic is the collection scanner in [`scanner`]: it
//! walks the items of a rendered collection, matches each label against a
//! predicate and hands every hit to a caller-supplied action.
//!
//! [`PageDriver`]: browser::driver::PageDriver

pub mod browser;
pub mod cli;
pub mod error;
pub mod report;
pub mod scanner;
pub mod spec;
pub mod trace;

pub use browser::driver::{CollectionQuery, PageDriver, RenderedItem};
pub use error::DriverError;
pub use scanner::scan::{find_matches, scan};
pub use scanner::scan_model::{
    Item, LabelMatcher, ScanError, ScanExpectation, ScanMode, ScanOutcome,
};

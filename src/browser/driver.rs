use serde::{Deserialize, Serialize};

use crate::error::DriverError;
use crate::scanner::scan_model::Item;

/// Where a collection lives on the page and how to read each item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionQuery {
    /// CSS selector of the element holding the collection
    pub container: String,

    /// Selector for the item elements, relative to the container's direct children
    #[serde(default = "default_item_selector")]
    pub item: String,

    /// Selector inside each item whose text is the item's label.
    /// When absent the item's own text is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Selector inside each item carrying the status attribute.
    /// When absent the item element itself is read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Attribute read as the item's status
    #[serde(default = "default_status_attribute")]
    pub status_attribute: String,
}

fn default_item_selector() -> String {
    "div".to_string()
}

fn default_status_attribute() -> String {
    "class".to_string()
}

impl CollectionQuery {
    pub fn new(container: &str) -> Self {
        Self {
            container: container.to_string(),
            item: default_item_selector(),
            label: None,
            status: None,
            status_attribute: default_status_attribute(),
        }
    }

    pub fn with_item(mut self, item: &str) -> Self {
        self.item = item.to_string();
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_status(mut self, status: &str, attribute: &str) -> Self {
        self.status = Some(status.to_string());
        self.status_attribute = attribute.to_string();
        self
    }
}

/// One item as the driver saw it when the collection was fetched.
///
/// `index` is the item's position among the container's items and is the
/// handle used to activate it later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderedItem {
    pub index: usize,
    pub label: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl Item for RenderedItem {
    fn label(&self) -> &str {
        &self.label
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

/// Capabilities the runner needs from a browser automation backend.
///
/// Waiting, retries and DOM querying all live behind this trait; nothing
/// above it knows which automation library is in use.
pub trait PageDriver {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    /// Type text into an input, appending to what is already there.
    fn type_text(&mut self, selector: &str, value: &str) -> Result<(), DriverError>;

    fn click(&mut self, selector: &str) -> Result<(), DriverError>;

    /// Click the first element matching `selector` whose text contains `text`.
    fn click_text(&mut self, selector: &str, text: &str) -> Result<(), DriverError>;

    fn set_checked(&mut self, selector: &str, checked: bool) -> Result<(), DriverError>;

    fn select_option(&mut self, selector: &str, value: &str) -> Result<(), DriverError>;

    fn wait_idle(&mut self, ms: u64) -> Result<(), DriverError>;

    fn current_url(&mut self) -> Result<String, DriverError>;

    fn title(&mut self) -> Result<String, DriverError>;

    /// All visible text on the page.
    fn page_text(&mut self) -> Result<String, DriverError>;

    /// Text content of the first element matching `selector`; `None` if absent.
    fn query_text(&mut self, selector: &str) -> Result<Option<String>, DriverError>;

    /// Text of the parent of the element inside `within` that contains `anchor`.
    fn query_text_near(
        &mut self,
        within: &str,
        anchor: &str,
    ) -> Result<Option<String>, DriverError>;

    fn query_visible(&mut self, selector: &str) -> Result<bool, DriverError>;

    fn query_count(&mut self, selector: &str) -> Result<u32, DriverError>;

    fn query_value(&mut self, selector: &str) -> Result<Option<String>, DriverError>;

    fn query_checked(&mut self, selector: &str) -> Result<Option<bool>, DriverError>;

    fn query_attribute(
        &mut self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    /// Fetch the items currently rendered in a collection, in DOM order.
    fn collect_items(&mut self, query: &CollectionQuery) -> Result<Vec<RenderedItem>, DriverError>;

    /// Simulate a user click on a previously collected item.
    fn activate_item(
        &mut self,
        query: &CollectionQuery,
        item: &RenderedItem,
    ) -> Result<(), DriverError>;

    fn quit(&mut self) -> Result<(), DriverError>;
}

use std::collections::HashMap;

use crate::browser::driver::{CollectionQuery, PageDriver, RenderedItem};
use crate::error::DriverError;

/// A change applied to the page when something is clicked.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Show(String),
    Hide(String),
    SetText { selector: String, text: String },
    /// Move the pager one page forward, staying on the last page
    NextPage,
    /// Move the pager one page back, staying on the first page
    PreviousPage,
}

/// A single element of the in-memory page, keyed by its selector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureElement {
    pub text: String,
    pub visible: bool,
    pub value: Option<String>,
    pub checked: Option<bool>,
    pub attributes: HashMap<String, String>,
    /// Option values for `<select>` elements
    pub options: Vec<String>,
    pub on_click: Vec<Effect>,
}

impl FixtureElement {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            visible: true,
            ..Default::default()
        }
    }

    pub fn hidden(text: &str) -> Self {
        Self {
            text: text.to_string(),
            visible: false,
            ..Default::default()
        }
    }

    pub fn input(value: &str) -> Self {
        Self {
            visible: true,
            value: Some(value.to_string()),
            ..Default::default()
        }
    }

    pub fn checkbox(checked: bool) -> Self {
        Self {
            visible: true,
            value: Some("on".to_string()),
            checked: Some(checked),
            ..Default::default()
        }
    }

    pub fn select(options: &[&str]) -> Self {
        Self {
            visible: true,
            value: options.first().map(|o| o.to_string()),
            options: options.iter().map(|o| o.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn on_click(mut self, effect: Effect) -> Self {
        self.on_click.push(effect);
        self
    }
}

/// An entry of an in-memory collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureItem {
    pub label: String,
    pub status: Option<String>,
    pub on_activate: Vec<Effect>,
}

impl FixtureItem {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn on_activate(mut self, effect: Effect) -> Self {
        self.on_activate.push(effect);
        self
    }
}

/// Paged collection: the container shows one page of items at a time and
/// the indicator element reads "Page {current} of {total}".
#[derive(Debug, Clone, Default)]
struct Pager {
    container: String,
    indicator: String,
    pages: Vec<Vec<FixtureItem>>,
    /// 1-based
    current: usize,
}

impl Pager {
    fn indicator_text(&self) -> String {
        format!("Page {} of {}", self.current, self.pages.len())
    }
}

/// In-memory `PageDriver` for tests.
///
/// Selectors are matched by exact string; there is no CSS engine. Clicking
/// an element or activating an item applies its effects, which is enough to
/// model popups, filters and pagination.
#[derive(Debug, Clone, Default)]
pub struct FixturePage {
    url: String,
    title: String,
    elements: HashMap<String, FixtureElement>,
    /// Clickable text inside elements, keyed by (selector, text)
    buttons: HashMap<(String, String), Vec<Effect>>,
    collections: HashMap<String, Vec<FixtureItem>>,
    pager: Option<Pager>,
    log: Vec<String>,
}

impl FixturePage {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn with_element(mut self, selector: &str, element: FixtureElement) -> Self {
        self.elements.insert(selector.to_string(), element);
        self
    }

    pub fn with_button(mut self, selector: &str, text: &str, effects: Vec<Effect>) -> Self {
        self.buttons
            .insert((selector.to_string(), text.to_string()), effects);
        self
    }

    pub fn with_collection(mut self, container: &str, items: Vec<FixtureItem>) -> Self {
        self.collections.insert(container.to_string(), items);
        self
    }

    /// Page `container` through `pages`, starting on the first one, and keep
    /// the `indicator` element's text in step with the current page.
    pub fn with_pager(
        mut self,
        container: &str,
        indicator: &str,
        pages: Vec<Vec<FixtureItem>>,
    ) -> Self {
        let pager = Pager {
            container: container.to_string(),
            indicator: indicator.to_string(),
            pages,
            current: 1,
        };
        self.show_page(&pager);
        self.pager = Some(pager);
        self
    }

    /// Current page number, if the page has a pager.
    pub fn current_page(&self) -> Option<usize> {
        self.pager.as_ref().map(|p| p.current)
    }

    /// Every interaction performed so far, oldest first.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn element(&self, selector: &str) -> Option<&FixtureElement> {
        self.elements.get(selector)
    }

    fn element_mut(&mut self, selector: &str, context: &str) -> Result<&mut FixtureElement, DriverError> {
        self.elements
            .get_mut(selector)
            .ok_or_else(|| DriverError::ElementNotFound {
                selector: selector.to_string(),
                context: context.to_string(),
            })
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Show(selector) => {
                    self.elements.entry(selector).or_default().visible = true;
                }
                Effect::Hide(selector) => {
                    if let Some(el) = self.elements.get_mut(&selector) {
                        el.visible = false;
                    }
                }
                Effect::SetText { selector, text } => {
                    let el = self.elements.entry(selector).or_default();
                    el.text = text;
                    el.visible = true;
                }
                Effect::NextPage => self.turn_page(|current, total| (current + 1).min(total)),
                Effect::PreviousPage => self.turn_page(|current, _| current.saturating_sub(1).max(1)),
            }
        }
    }

    fn turn_page(&mut self, step: impl FnOnce(usize, usize) -> usize) {
        let Some(mut pager) = self.pager.take() else {
            return;
        };
        pager.current = step(pager.current, pager.pages.len());
        self.show_page(&pager);
        self.pager = Some(pager);
    }

    fn show_page(&mut self, pager: &Pager) {
        let items = pager
            .pages
            .get(pager.current.saturating_sub(1))
            .cloned()
            .unwrap_or_default();
        self.collections.insert(pager.container.clone(), items);
        let indicator = self.elements.entry(pager.indicator.clone()).or_default();
        indicator.text = pager.indicator_text();
        indicator.visible = true;
    }

    fn items(&self, container: &str) -> Result<&Vec<FixtureItem>, DriverError> {
        self.collections
            .get(container)
            .ok_or_else(|| DriverError::ElementNotFound {
                selector: container.to_string(),
                context: "collection container".into(),
            })
    }
}

impl PageDriver for FixturePage {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.log.push(format!("navigate {}", url));
        self.url = url.to_string();
        Ok(())
    }

    fn type_text(&mut self, selector: &str, value: &str) -> Result<(), DriverError> {
        self.log.push(format!("type {} {}", selector, value));
        let el = self.element_mut(selector, "type")?;
        el.value.get_or_insert_with(String::new).push_str(value);
        Ok(())
    }

    fn click(&mut self, selector: &str) -> Result<(), DriverError> {
        self.log.push(format!("click {}", selector));
        let el = self.element_mut(selector, "click")?;
        if !el.visible {
            return Err(DriverError::ElementNotFound {
                selector: selector.to_string(),
                context: "element is not visible".into(),
            });
        }
        let effects = el.on_click.clone();
        self.apply(effects);
        Ok(())
    }

    fn click_text(&mut self, selector: &str, text: &str) -> Result<(), DriverError> {
        self.log.push(format!("click_text {} {}", selector, text));
        let effects = self
            .buttons
            .get(&(selector.to_string(), text.to_string()))
            .cloned()
            .ok_or_else(|| DriverError::ElementNotFound {
                selector: selector.to_string(),
                context: format!("no element containing '{}'", text),
            })?;
        self.apply(effects);
        Ok(())
    }

    fn set_checked(&mut self, selector: &str, checked: bool) -> Result<(), DriverError> {
        self.log.push(format!("set_checked {} {}", selector, checked));
        let el = self.element_mut(selector, "set_checked")?;
        match el.checked {
            Some(_) => {
                el.checked = Some(checked);
                Ok(())
            }
            None => Err(DriverError::Unsupported(format!(
                "'{}' is not a checkbox",
                selector
            ))),
        }
    }

    fn select_option(&mut self, selector: &str, value: &str) -> Result<(), DriverError> {
        self.log.push(format!("select {} {}", selector, value));
        let el = self.element_mut(selector, "select")?;
        if !el.options.iter().any(|o| o == value) {
            return Err(DriverError::ElementNotFound {
                selector: selector.to_string(),
                context: format!("no option '{}'", value),
            });
        }
        el.value = Some(value.to_string());
        Ok(())
    }

    fn wait_idle(&mut self, ms: u64) -> Result<(), DriverError> {
        self.log.push(format!("wait {}", ms));
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, DriverError> {
        Ok(self.url.clone())
    }

    fn title(&mut self) -> Result<String, DriverError> {
        Ok(self.title.clone())
    }

    fn page_text(&mut self) -> Result<String, DriverError> {
        let mut texts: Vec<&str> = self
            .elements
            .values()
            .filter(|el| el.visible && !el.text.is_empty())
            .map(|el| el.text.as_str())
            .collect();
        for items in self.collections.values() {
            texts.extend(items.iter().map(|i| i.label.as_str()));
        }
        texts.sort_unstable();
        Ok(texts.join(" "))
    }

    fn query_text(&mut self, selector: &str) -> Result<Option<String>, DriverError> {
        Ok(self.elements.get(selector).map(|el| el.text.clone()))
    }

    fn query_text_near(
        &mut self,
        within: &str,
        anchor: &str,
    ) -> Result<Option<String>, DriverError> {
        // Without a tree the container text stands in for the anchor's parent
        Ok(self
            .elements
            .get(within)
            .filter(|el| el.visible && el.text.contains(anchor))
            .map(|el| el.text.clone()))
    }

    fn query_visible(&mut self, selector: &str) -> Result<bool, DriverError> {
        Ok(self.elements.get(selector).is_some_and(|el| el.visible))
    }

    fn query_count(&mut self, selector: &str) -> Result<u32, DriverError> {
        if let Some(items) = self.collections.get(selector) {
            return Ok(items.len() as u32);
        }
        Ok(u32::from(self.elements.contains_key(selector)))
    }

    fn query_value(&mut self, selector: &str) -> Result<Option<String>, DriverError> {
        Ok(self.elements.get(selector).and_then(|el| el.value.clone()))
    }

    fn query_checked(&mut self, selector: &str) -> Result<Option<bool>, DriverError> {
        Ok(self.elements.get(selector).and_then(|el| el.checked))
    }

    fn query_attribute(
        &mut self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        Ok(self
            .elements
            .get(selector)
            .and_then(|el| el.attributes.get(name).cloned()))
    }

    fn collect_items(&mut self, query: &CollectionQuery) -> Result<Vec<RenderedItem>, DriverError> {
        let items = self.items(&query.container)?;
        Ok(items
            .iter()
            .enumerate()
            .map(|(index, item)| RenderedItem {
                index,
                label: item.label.clone(),
                status: item.status.clone(),
            })
            .collect())
    }

    fn activate_item(
        &mut self,
        query: &CollectionQuery,
        item: &RenderedItem,
    ) -> Result<(), DriverError> {
        self.log.push(format!("activate {} #{}", query.container, item.index));
        let effects = self
            .items(&query.container)?
            .get(item.index)
            .map(|i| i.on_activate.clone())
            .ok_or_else(|| DriverError::ElementNotFound {
                selector: format!("{} > {}:nth({})", query.container, query.item, item.index),
                context: "item is no longer rendered".into(),
            })?;
        self.apply(effects);
        Ok(())
    }

    fn quit(&mut self) -> Result<(), DriverError> {
        self.log.push("quit".to_string());
        Ok(())
    }
}

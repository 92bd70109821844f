use dashboard_e2e::browser::fixture::{Effect, FixtureElement, FixtureItem, FixturePage};
use dashboard_e2e::spec::spec_model::TestSpec;

pub const GRID: &str = "div[class='grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4']";
pub const POPUP: &str = "div[class='bg-white p-6 rounded shadow-lg max-w-lg w-full relative']";
pub const CLOSE: &str = "button[class='absolute top-2 right-2 text-gray-500 hover:text-gray-700']";
pub const SEARCH: &str = "input[placeholder='Search by name or email']";
pub const PAGER: &str = "div[class='mt-4 flex justify-between items-center'] span";

pub const PAGES: usize = 8;

const ACTIVE: &str = "w-3 h-3 rounded-full bg-green-500";
const INACTIVE: &str = "w-3 h-3 rounded-full bg-red-500";

/// Contacts on a given page, six per page, every fourth one inactive.
pub fn contacts_page(page: usize) -> Vec<FixtureItem> {
    (1..=6)
        .map(|n| {
            let number = (page - 1) * 6 + n;
            let status = if number % 4 == 0 { INACTIVE } else { ACTIVE };
            FixtureItem::new(&format!("Contact {}", number))
                .with_status(status)
                .on_activate(Effect::SetText {
                    selector: POPUP.to_string(),
                    text: format!(
                        "Contact {} Email: c{}@example.com Phone: 123-456-789{}",
                        number,
                        number,
                        (number - 1) % 10
                    ),
                })
        })
        .collect()
}

/// In-memory stand-in for the contacts dashboard: eight pages of contacts
/// behind a "Previous" / "Next" pager.
pub fn dashboard() -> FixturePage {
    FixturePage::new("Contacts Dashboard")
        .with_element(SEARCH, FixtureElement::input(""))
        .with_element(POPUP, FixtureElement::hidden(""))
        .with_element(
            CLOSE,
            FixtureElement::text("x").on_click(Effect::Hide(POPUP.to_string())),
        )
        .with_element("input[type='checkbox']", FixtureElement::checkbox(false))
        .with_element("select", FixtureElement::select(&["All", "Engineering", "Sales"]))
        .with_pager(GRID, PAGER, (1..=PAGES).map(contacts_page).collect())
        .with_button("button", "Next", vec![Effect::NextPage])
        .with_button("button", "Previous", vec![Effect::PreviousPage])
}

pub fn load_scenario(yaml: &str) -> TestSpec {
    serde_yaml::from_str(yaml).expect("shipped scenario must parse")
}

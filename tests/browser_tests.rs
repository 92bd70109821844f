use dashboard_e2e::{
    DriverError,
    browser::{
        driver::{CollectionQuery, PageDriver, RenderedItem},
        fixture::{Effect, FixtureElement, FixtureItem, FixturePage},
        session::{BrowserOptions, BrowserRequest, BrowserResponse},
    },
};

// =========================================================================
// BrowserRequest serialization
// =========================================================================

#[test]
fn request_is_tagged_by_cmd() {
    let json = serde_json::to_value(BrowserRequest::Navigate {
        url: "https://example.com".into(),
    })
    .unwrap();
    assert_eq!(json["cmd"], "navigate");
    assert_eq!(json["url"], "https://example.com");
}

#[test]
fn unit_requests_carry_only_cmd() {
    let json = serde_json::to_value(BrowserRequest::CurrentUrl).unwrap();
    assert_eq!(json, serde_json::json!({ "cmd": "current_url" }));

    let json = serde_json::to_value(BrowserRequest::Quit).unwrap();
    assert_eq!(json, serde_json::json!({ "cmd": "quit" }));
}

#[test]
fn request_names_match_wire_tags() {
    let requests = vec![
        BrowserRequest::ClickText {
            selector: "button".into(),
            text: "Next".into(),
        },
        BrowserRequest::SetChecked {
            selector: "input".into(),
            checked: true,
        },
        BrowserRequest::QueryTextNear {
            within: ".popup".into(),
            anchor: "Phone:".into(),
        },
        BrowserRequest::PageText,
        BrowserRequest::Wait { duration_ms: 10 },
    ];

    for request in requests {
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["cmd"], request.name(), "mismatch for {:?}", request);
    }
}

#[test]
fn collect_items_request_embeds_query() {
    let query = CollectionQuery::new(".grid")
        .with_label("h2")
        .with_status("span.dot", "data-state");
    let json = serde_json::to_value(BrowserRequest::CollectItems { query }).unwrap();

    assert_eq!(json["cmd"], "collect_items");
    assert_eq!(json["query"]["container"], ".grid");
    assert_eq!(json["query"]["item"], "div");
    assert_eq!(json["query"]["label"], "h2");
    assert_eq!(json["query"]["status"], "span.dot");
    assert_eq!(json["query"]["status_attribute"], "data-state");
}

#[test]
fn activate_item_request_carries_index() {
    let json = serde_json::to_value(BrowserRequest::ActivateItem {
        query: CollectionQuery::new(".grid"),
        index: 3,
    })
    .unwrap();
    assert_eq!(json["index"], 3);
    assert!(json["query"].get("label").is_none(), "unset label is omitted");
}

// =========================================================================
// BrowserResponse parsing
// =========================================================================

#[test]
fn ready_signal_parses() {
    let response: BrowserResponse = serde_json::from_str(r#"{"ok":true,"ready":true}"#).unwrap();
    assert!(response.ok);
    assert_eq!(response.ready, Some(true));
}

#[test]
fn items_response_parses_into_rendered_items() {
    let line = r#"{"ok":true,"items":[
        {"index":0,"label":"Contact 7","status":"bg-green-500"},
        {"index":1,"label":"Contact 8","status":null},
        {"index":2,"label":"Contact 9"}
    ]}"#;
    let response: BrowserResponse = serde_json::from_str(line).unwrap();
    let items = response.items.unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(items[1].label, "Contact 8");
    assert_eq!(items[1].status, None);
    assert_eq!(items[2].status, None);
    assert_eq!(items[0].status.as_deref(), Some("bg-green-500"));
}

#[test]
fn failure_response_becomes_protocol_error() {
    let response: BrowserResponse =
        serde_json::from_str(r#"{"ok":false,"error":"container not found: .grid"}"#).unwrap();
    let err = response.into_result("collect_items").unwrap_err();

    match &err {
        DriverError::SessionProtocol { command, error } => {
            assert_eq!(command, "collect_items");
            assert_eq!(error, "container not found: .grid");
        }
        other => panic!("Expected SessionProtocol, got {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "Browser command 'collect_items' failed: container not found: .grid"
    );
}

#[test]
fn failure_without_message_uses_placeholder() {
    let response: BrowserResponse = serde_json::from_str(r#"{"ok":false}"#).unwrap();
    let err = response.into_result("click").unwrap_err();
    assert!(err.to_string().contains("Unknown error"));
}

#[test]
fn browser_options_default_to_bundled_script() {
    let options = BrowserOptions::default();
    assert_eq!(options.server_script, "node/browser_server.js");
    assert!(options.headless);
}

// =========================================================================
// CollectionQuery serde defaults
// =========================================================================

#[test]
fn collection_query_yaml_defaults() {
    let query: CollectionQuery = serde_yaml::from_str("container: \".grid\"").unwrap();
    assert_eq!(query.item, "div");
    assert_eq!(query.label, None);
    assert_eq!(query.status, None);
    assert_eq!(query.status_attribute, "class");
}

// =========================================================================
// FixturePage behaviour
// =========================================================================

#[test]
fn fixture_collects_items_in_order_with_indices() {
    let mut page = FixturePage::new("t").with_collection(
        ".grid",
        vec![
            FixtureItem::new("Contact 1").with_status("active"),
            FixtureItem::new("Contact 2"),
        ],
    );

    let items = page.collect_items(&CollectionQuery::new(".grid")).unwrap();

    assert_eq!(
        items,
        vec![
            RenderedItem {
                index: 0,
                label: "Contact 1".into(),
                status: Some("active".into()),
            },
            RenderedItem {
                index: 1,
                label: "Contact 2".into(),
                status: None,
            },
        ]
    );
}

#[test]
fn fixture_activation_applies_effects() {
    let mut page = FixturePage::new("t")
        .with_element(".popup", FixtureElement::hidden(""))
        .with_collection(
            ".grid",
            vec![FixtureItem::new("Contact 4").on_activate(Effect::SetText {
                selector: ".popup".into(),
                text: "Phone: 123-456-7893".into(),
            })],
        );
    let query = CollectionQuery::new(".grid");
    let items = page.collect_items(&query).unwrap();

    assert!(!page.query_visible(".popup").unwrap());
    page.activate_item(&query, &items[0]).unwrap();
    assert!(page.query_visible(".popup").unwrap());
    assert_eq!(
        page.query_text_near(".popup", "Phone:").unwrap().as_deref(),
        Some("Phone: 123-456-7893")
    );
}

#[test]
fn fixture_activation_of_vanished_item_fails() {
    let mut page = FixturePage::new("t").with_collection(".grid", vec![FixtureItem::new("A")]);
    let query = CollectionQuery::new(".grid");
    let stale = RenderedItem {
        index: 5,
        label: "Z".into(),
        status: None,
    };

    let err = page.activate_item(&query, &stale).unwrap_err();
    assert!(matches!(err, DriverError::ElementNotFound { .. }));
}

#[test]
fn fixture_click_on_hidden_element_fails() {
    let mut page = FixturePage::new("t").with_element(".close", FixtureElement::hidden("x"));
    assert!(page.click(".close").is_err());
}

#[test]
fn fixture_checkbox_and_select() {
    let mut page = FixturePage::new("t")
        .with_element("input", FixtureElement::checkbox(false))
        .with_element("select", FixtureElement::select(&["All", "Engineering"]))
        .with_element("h1", FixtureElement::text("Title"));

    page.set_checked("input", true).unwrap();
    assert_eq!(page.query_checked("input").unwrap(), Some(true));
    assert_eq!(page.query_value("input").unwrap().as_deref(), Some("on"));

    page.select_option("select", "Engineering").unwrap();
    assert_eq!(page.query_value("select").unwrap().as_deref(), Some("Engineering"));

    assert!(matches!(
        page.set_checked("h1", true),
        Err(DriverError::Unsupported(_))
    ));
}

#[test]
fn fixture_type_appends_to_value() {
    let mut page = FixturePage::new("t").with_element("input.search", FixtureElement::input("c"));
    page.type_text("input.search", "o").unwrap();
    assert_eq!(page.query_value("input.search").unwrap().as_deref(), Some("co"));
}

#[test]
fn fixture_attribute_and_count_queries() {
    let mut page = FixturePage::new("t")
        .with_element("span.dot", FixtureElement::text("").with_attribute("class", "dot bg-red-500"))
        .with_collection(".grid", vec![FixtureItem::new("A"), FixtureItem::new("B")]);

    assert_eq!(
        page.query_attribute("span.dot", "class").unwrap().as_deref(),
        Some("dot bg-red-500")
    );
    assert_eq!(page.query_attribute("span.dot", "id").unwrap(), None);
    assert_eq!(page.query_count(".grid").unwrap(), 2);
    assert_eq!(page.query_count("span.dot").unwrap(), 1);
    assert_eq!(page.query_count(".missing").unwrap(), 0);
}

#[test]
fn fixture_records_interaction_log() {
    let mut page = FixturePage::new("t")
        .with_button("button", "Next", vec![])
        .with_element("h1", FixtureElement::text("Title"));

    page.navigate("https://example.com").unwrap();
    page.click_text("button", "Next").unwrap();
    page.wait_idle(5).unwrap();
    page.quit().unwrap();

    assert_eq!(
        page.log(),
        &[
            "navigate https://example.com".to_string(),
            "click_text button Next".to_string(),
            "wait 5".to_string(),
            "quit".to_string(),
        ]
    );
}

#[test]
fn fixture_pager_turns_pages_and_clamps_at_the_ends() {
    let pages = vec![
        vec![FixtureItem::new("A")],
        vec![FixtureItem::new("B")],
        vec![FixtureItem::new("C")],
    ];
    let mut page = FixturePage::new("t")
        .with_pager(".grid", ".pager", pages)
        .with_button("button", "Next", vec![Effect::NextPage])
        .with_button("button", "Previous", vec![Effect::PreviousPage]);
    let query = CollectionQuery::new(".grid");
    let labels = |page: &mut FixturePage| -> Vec<String> {
        page.collect_items(&query).unwrap().into_iter().map(|i| i.label).collect()
    };

    assert_eq!(page.query_text(".pager").unwrap().as_deref(), Some("Page 1 of 3"));
    assert_eq!(labels(&mut page), vec!["A"]);

    page.click_text("button", "Previous").unwrap();
    assert_eq!(page.current_page(), Some(1));

    page.click_text("button", "Next").unwrap();
    assert_eq!(page.query_text(".pager").unwrap().as_deref(), Some("Page 2 of 3"));
    assert_eq!(labels(&mut page), vec!["B"]);

    page.click_text("button", "Next").unwrap();
    page.click_text("button", "Next").unwrap();
    assert_eq!(page.current_page(), Some(3));
    assert_eq!(page.query_text(".pager").unwrap().as_deref(), Some("Page 3 of 3"));

    page.click_text("button", "Previous").unwrap();
    assert_eq!(labels(&mut page), vec!["B"]);
}

#[test]
fn fixture_without_pager_ignores_page_effects() {
    let mut page = FixturePage::new("t").with_button("button", "Next", vec![Effect::NextPage]);
    page.click_text("button", "Next").unwrap();
    assert_eq!(page.current_page(), None);
}

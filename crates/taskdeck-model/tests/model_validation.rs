// SPDX-License-Identifier: Apache-2.0

use taskdeck_model::{parse_title, Title, TodoId, TodoItem, TITLE_MAX_LEN};

#[test]
fn parse_title_matches_type_constructor() {
    let a = parse_title("Water the plants").expect("title");
    let b = Title::parse("Water the plants").expect("title");
    assert_eq!(a, b);
}

#[test]
fn titles_do_not_deduplicate() {
    let a = Title::parse("same").expect("title");
    let b = Title::parse("same").expect("title");
    assert_eq!(a, b);
}

#[test]
fn validation_error_message_names_the_limit() {
    let long = "y".repeat(TITLE_MAX_LEN + 10);
    let err = Title::parse(&long).expect_err("overlong");
    assert!(err.to_string().contains(&TITLE_MAX_LEN.to_string()));
}

#[test]
fn todo_item_serde_shape_is_flat() {
    let item = TodoItem {
        id: TodoId(7),
        title: Title::parse("Buy milk").expect("title"),
        done: false,
        created_at: "2026-01-01T00:00:00Z".to_string(),
    };
    let value = serde_json::to_value(&item).expect("serialize");
    assert_eq!(value["id"], 7);
    assert_eq!(value["title"], "Buy milk");
    assert_eq!(value["done"], false);
    let back: TodoItem = serde_json::from_value(value).expect("deserialize");
    assert_eq!(back, item);
}

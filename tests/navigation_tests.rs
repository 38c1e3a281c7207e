mod common;

use common::{SITE_ID, harness_at, init_with, three_page_config};
use sitefold::url::{HashData, generate_hash, parse_hash};
use sitefold::StoreInit;

fn production_init() -> StoreInit {
    StoreInit {
        editing: false,
        ..init_with(three_page_config())
    }
}

#[test]
fn test_navigate_in_production_pushes_path() {
    let h = harness_at(production_init(), "/", false);
    assert!(h.editor.navigate_to("/about"));

    assert_eq!(h.editor.snapshot().selected_page_id.as_deref(), Some("b"));
    assert_eq!(h.location.history(), vec!["/about".to_string()]);
}

#[test]
fn test_navigate_in_editing_mode_encodes_fragment() {
    let start = format!(
        "/editor#!{}",
        generate_hash(&HashData {
            site_id: Some("from-fragment".into()),
            path: "/".into(),
        })
    );
    let h = harness_at(init_with(three_page_config()), &start, false);

    assert!(h.editor.navigate_to("/contact"));

    let pushed = h.location.current();
    let (base, fragment) = pushed.split_once('#').unwrap();
    assert_eq!(base, "/editor");
    let data = parse_hash(fragment).unwrap();
    assert_eq!(data.path, "/contact");
    assert_eq!(data.site_id.as_deref(), Some("from-fragment"));
}

#[test]
fn test_navigate_in_dev_mode_uses_fragment_even_when_not_editing() {
    let h = harness_at(production_init(), "/editor", true);
    assert!(h.editor.navigate_to("/about"));

    let pushed = h.location.current();
    let data = parse_hash(pushed.split_once('#').unwrap().1).unwrap();
    assert_eq!(data.path, "/about");
    assert_eq!(data.site_id.as_deref(), Some(SITE_ID));
}

#[test]
fn test_navigate_to_unknown_path_clears_selection() {
    let h = harness_at(production_init(), "/", false);
    assert_eq!(h.editor.snapshot().selected_page_id.as_deref(), Some("a"));

    assert!(!h.editor.navigate_to("/missing"));

    assert_eq!(h.editor.snapshot().selected_page_id, None);
    assert!(h.location.history().is_empty());
    assert_eq!(h.editor.document_title(), "Page not found ← My site");
}

#[test]
fn test_toggles_flip_flags() {
    let h = harness_at(production_init(), "/", false);
    h.editor.toggle_editing();
    h.editor.toggle_previewing();
    h.editor.toggle_settings_menu();
    let state = h.editor.snapshot();
    assert!(state.editing && state.previewing && state.settings_menu_open);

    h.editor.toggle_previewing();
    assert!(!h.editor.snapshot().previewing);
    assert_eq!(h.editor.version(), 4);
}

#[test]
fn test_document_title_follows_navigation_when_not_editing() {
    let h = harness_at(production_init(), "/", false);
    h.editor.navigate_to("/about");

    let title = h.location.title().unwrap();
    assert!(title.starts_with("About ← "));
    assert_eq!(title, h.editor.document_title());
}

#[test]
fn test_document_title_is_left_alone_while_editing() {
    let h = harness_at(production_init(), "/", false);
    h.editor.navigate_to("/about");
    h.editor.toggle_editing();
    h.editor.navigate_to("/contact");

    assert!(h.location.title().unwrap().starts_with("About ← "));

    h.editor.toggle_editing();
    assert!(h.location.title().unwrap().starts_with("Contact ← "));
}

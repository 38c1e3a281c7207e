mod common;

use common::{harness, harness_at, init_with, three_page_config};
use sitefold::url::parse_hash;
use sitefold::{ConfigPatch, MoveTarget, Patch, StorePatch, ThemePatch};

#[test]
fn test_nav_and_hidden_pages() {
    let h = harness(init_with(three_page_config()));
    let nav: Vec<_> = h.editor.nav_pages().iter().map(|p| p.uuid.clone()).collect();
    let hidden: Vec<_> = h.editor.hidden_pages().iter().map(|p| p.uuid.clone()).collect();
    assert_eq!(nav, vec!["a", "b"]);
    assert_eq!(hidden, vec!["c"]);

    h.editor.pages().move_to("c", MoveTarget::after("a", true));
    let nav: Vec<_> = h.editor.nav_pages().iter().map(|p| p.uuid.clone()).collect();
    assert_eq!(nav, vec!["a", "c", "b"]);
    assert!(h.editor.hidden_pages().is_empty());
}

#[test]
fn test_unrelated_patch_does_not_recompute() {
    let h = harness(init_with(three_page_config()));
    h.editor.nav_pages();
    h.editor.config_changed();
    assert_eq!(h.editor.recomputations("nav_pages"), Some(1));

    h.editor.toggle_previewing();
    h.editor.nav_pages();
    h.editor.config_changed();
    assert_eq!(h.editor.recomputations("nav_pages"), Some(1));
    assert_eq!(h.editor.recomputations("config_changed"), Some(1));

    h.editor.pages().add();
    h.editor.nav_pages();
    assert_eq!(h.editor.recomputations("nav_pages"), Some(2));
}

#[test]
fn test_theme_patch_keeps_page_list_shared() {
    let h = harness(init_with(three_page_config()));
    h.editor.nav_pages();

    h.editor.set_theme(ThemePatch {
        color: Some("#000000".into()),
        ..Default::default()
    });

    let state = h.editor.snapshot();
    assert_eq!(state.config.theme.color, "#000000");
    assert_eq!(state.config.theme.pattern, "none");
    h.editor.nav_pages();
    assert_eq!(h.editor.recomputations("nav_pages"), Some(1));
    assert!(h.editor.config_changed());
}

#[test]
fn test_pattern_intensity_patch_and_wire_name() {
    let h = harness(init_with(three_page_config()));
    h.editor.set_theme(ThemePatch {
        pattern_intensity: Some(80),
        ..Default::default()
    });

    let theme = h.editor.snapshot().config.theme.clone();
    assert_eq!(theme.pattern_intensity, 80);
    assert_eq!(theme.pattern, "none");
    let json = serde_json::to_value(&theme).unwrap();
    assert_eq!(json["patternIntensity"], 80);
}

#[test]
fn test_config_changed_is_deep_not_referential() {
    let h = harness(init_with(three_page_config()));
    let same = (*h.editor.snapshot().config).clone();
    h.editor.patch_store(Patch::partial(StorePatch {
        config: Some(std::rc::Rc::new(same)),
        ..Default::default()
    }));
    assert!(!h.editor.config_changed());
    assert!(!h.editor.published_config_is_different());
}

#[test]
fn test_subdomain_changed() {
    let h = harness(init_with(three_page_config()));
    assert!(!h.editor.subdomain_changed());
    h.editor.patch_config(Patch::partial(ConfigPatch {
        subdomain: Some("bakery".into()),
        ..Default::default()
    }));
    assert!(h.editor.subdomain_changed());
}

#[test]
fn test_selected_page_and_title_follow_page_edits() {
    let h = harness(init_with(three_page_config()));
    h.editor.navigate_to("/about");
    assert_eq!(h.editor.selected_page().unwrap().uuid, "b");
    assert_eq!(h.editor.document_title(), "About ← My site");

    h.editor.pages().patch(
        "b",
        sitefold::PagePatch {
            title: Some("Story".into()),
            ..Default::default()
        },
    );
    assert_eq!(h.editor.document_title(), "Story ← My site");
    assert_eq!(h.editor.pathname(), "/story");

    h.editor.pages().remove("b");
    assert_eq!(h.editor.selected_page(), None);
    assert_eq!(h.editor.document_title(), "Page not found ← My site");
}

#[test]
fn test_pathname_falls_back_to_location() {
    let h = harness_at(init_with(three_page_config()), "/somewhere", false);
    h.editor.navigate_to("/missing");
    assert_eq!(h.editor.pathname(), "/somewhere");
}

#[test]
fn test_editor_url_encodes_site_and_path() {
    let h = harness(init_with(three_page_config()));
    h.editor.navigate_to("/contact");
    let url = h.editor.editor_url();
    let data = parse_hash(url.split_once('#').unwrap().1).unwrap();
    assert_eq!(data.site_id.as_deref(), Some(common::SITE_ID));
    assert_eq!(data.path, "/contact");
}

#[tokio::test]
async fn test_page_url_uses_saved_address() {
    let h = harness(init_with(three_page_config()));
    h.editor.navigate_to("/about");
    h.editor.patch_config(Patch::partial(ConfigPatch {
        subdomain: Some("bakery".into()),
        ..Default::default()
    }));
    assert_eq!(
        h.editor.page_url().as_deref(),
        Some("https://.sitefold.page/about")
    );

    h.editor.save_config().await;
    assert_eq!(
        h.editor.page_url().as_deref(),
        Some("https://bakery.sitefold.page/about")
    );
}

#[test]
fn test_unknown_memo_name() {
    let h = harness(init_with(three_page_config()));
    assert_eq!(h.editor.recomputations("nope"), None);
}

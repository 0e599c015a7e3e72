use crossbeam::channel::Receiver;

use super::*;
use crate::classify::ControlIntent;
use crate::config::{ControlRule, RuleTable};
use crate::config::{DarkMode, PartialOptions};
use crate::platform::{FixedClock, FixedGeometry, MemoryStorage, Rect, Storage};
use crate::theme::{DARK_CLASS, STORAGE_KEY};

fn env() -> Environment {
    Environment::default()
        .with_clock(FixedClock::at_hour(13))
        .with_storage(MemoryStorage::new())
}

fn start(html: &str, options: Options) -> Engine {
    let mut engine = Engine::new(options, Document::parse(html), env());
    engine.init();
    engine
}

fn by_id(engine: &Engine, id: &str) -> NodeId {
    engine.document().get_element_by_id(id).unwrap()
}

fn all(engine: &Engine, selector: &str) -> Vec<NodeId> {
    let doc = engine.document();
    doc.query_all(doc.root(), selector)
}

fn drain(rx: &Receiver<EngineEvent>) -> Vec<EngineEvent> {
    rx.try_iter().collect()
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn test_buttons_are_classified_once() {
    let mut engine = start(
        r#"<button id="save">Save</button><button id="delete">Delete Account</button><button id="edit">Edit Profile</button>"#,
        Options::default(),
    );
    let expected = [
        ("save", ControlIntent::Primary),
        ("delete", ControlIntent::Danger),
        ("edit", ControlIntent::Warning),
    ];
    for (id, intent) in expected {
        let button = by_id(&engine, id);
        let doc = engine.document();
        assert!(marker::has(doc, button, marker::Marker::Styled), "{id} unmarked");
        assert!(doc.has_class(button, &intent.class()), "{id} not {intent:?}");
        assert_eq!(
            doc.style(button, "background-color").as_deref(),
            Some(intent.background())
        );
    }

    // Rename the primary control: the marker keeps it from being reclassified
    let save = by_id(&engine, "save");
    engine.document_mut().set_text(save, "Delete").unwrap();
    let before = engine.document().to_html();
    engine.refresh();
    assert_eq!(engine.document().to_html(), before);
    assert!(engine.document().has_class(save, "uac-btn-primary"));
    assert!(!engine.document().has_class(save, "uac-btn-danger"));
}

#[test]
fn test_form_label_and_validation() {
    let mut engine = start(
        r#"<form id="signup"><input required placeholder="Email"></form>"#,
        Options::default(),
    );
    let form = by_id(&engine, "signup");
    let input = engine.document().query(form, "input").unwrap();

    let doc = engine.document();
    assert_eq!(doc.attr(input, "id"), Some("uac-field-1"));
    let children = doc.children(form).to_vec();
    let position = children.iter().position(|&c| c == input).unwrap();
    assert!(position > 0);
    let label = children[position - 1];
    assert_eq!(doc.tag(label), Some("label"));
    assert_eq!(doc.attr(label, "for"), Some("uac-field-1"));
    assert_eq!(doc.text_content(label), "Email");

    // Empty submit is blocked
    let outcome = engine.dispatch(form, EventKind::Submit);
    assert!(outcome.default_prevented);
    let doc = engine.document();
    assert!(doc.has_class(input, validate::INVALID_CLASS));
    assert_eq!(doc.attr(input, "aria-invalid"), Some("true"));
    assert_eq!(doc.style(input, "border-color").as_deref(), Some("#ef4444"));
    assert_eq!(all(&engine, ".uac-form-error").len(), 1);

    // Typing nothing keeps it invalid, typing something clears it
    engine.dispatch(input, EventKind::Input);
    assert!(engine.document().has_class(input, validate::INVALID_CLASS));
    engine
        .document_mut()
        .set_attr(input, "value", "a@b.c")
        .unwrap();
    engine.dispatch(input, EventKind::Input);
    let doc = engine.document();
    assert!(!doc.has_class(input, validate::INVALID_CLASS));
    assert!(!doc.has_attr(input, "aria-invalid"));
    assert_eq!(doc.style(input, "border-color"), None);

    let outcome = engine.dispatch(form, EventKind::Submit);
    assert!(!outcome.default_prevented);
    assert!(all(&engine, ".uac-form-error").is_empty());
}

#[test]
fn test_navigation_from_headings() {
    let html = (1..=5)
        .map(|i| format!("<h2>Section {i}</h2><p>text</p>"))
        .collect::<String>();
    let options = Options {
        create_navigation: true,
        ..Options::default()
    };
    let mut engine = start(&html, options);

    let navs = all(&engine, "nav");
    assert_eq!(navs.len(), 1);
    let links = engine.document().query_all(navs[0], "a");
    assert_eq!(links.len(), 5);

    let headings = all(&engine, "h2");
    for (index, (&link, &heading)) in links.iter().zip(&headings).enumerate() {
        let doc = engine.document();
        let id = format!("uac-heading-{index}");
        assert_eq!(doc.attr(heading, "id"), Some(id.as_str()));
        assert_eq!(doc.attr(link, "href"), Some(format!("#{id}").as_str()));

        let outcome = engine.dispatch(link, EventKind::Click);
        assert!(outcome.default_prevented);
        assert_eq!(outcome.scrolled_to, Some(ScrollTarget::Element(heading)));
    }

    engine.refresh();
    engine.refresh();
    assert_eq!(all(&engine, "nav").len(), 1);
}

#[test]
fn test_navigation_needs_two_headings() {
    let options = Options {
        create_navigation: true,
        ..Options::default()
    };
    let engine = start("<h1>Only</h1>", options);
    assert!(all(&engine, "nav").is_empty());
}

#[test]
fn test_link_text_is_truncated() {
    let long = "A very long heading that keeps on going";
    let options = Options {
        create_navigation: true,
        ..Options::default()
    };
    let engine = start(&format!("<h1>{long}</h1><h2>Short</h2>"), options);
    let links = all(&engine, ".uac-navigation a");
    assert_eq!(engine.document().text_content(links[0]), &long[..30]);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_second_init_is_a_noop() {
    let mut engine = Engine::new(Options::default(), Document::parse("<p>hi</p>"), env());
    let rx = engine.subscribe();
    engine.init();
    let html = engine.document().to_html();
    engine.init();

    assert!(engine.is_initialized());
    assert_eq!(engine.document().to_html(), html);
    let ready = drain(&rx)
        .into_iter()
        .filter(|e| matches!(e, EngineEvent::Ready { .. }))
        .count();
    assert_eq!(ready, 1);
}

#[test]
fn test_ready_carries_snapshot_and_config() {
    let mut engine = Engine::new(
        Options::default(),
        Document::parse("<table><tr><td>1</td></tr></table>"),
        env(),
    );
    let rx = engine.subscribe();
    engine.init();
    match drain(&rx).as_slice() {
        [EngineEvent::Ready { features, config }] => {
            assert!(features.has_tables);
            // The generated scroll-to-top control is already counted
            assert_eq!(features.button_count, 1);
            assert_eq!(config, &Options::default());
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn test_setup_injects_style_and_viewport_once() {
    let mut engine = start("<p>hi</p>", Options::default());
    engine.refresh();
    let doc = engine.document();
    assert_eq!(all(&engine, &format!("#{STYLE_ID}")).len(), 1);
    let metas = all(&engine, r#"meta[name="viewport"]"#);
    assert_eq!(metas.len(), 1);
    assert_eq!(doc.children(doc.head()).first(), Some(&metas[0]));
    assert!(doc.has_class(doc.document_element(), "uac-is-desktop"));
}

#[test]
fn test_destroy_unmarks_and_detaches() {
    let mut engine = start(
        r#"<form id="f"><input required placeholder="Name"><button>Save</button></form>"#,
        Options::default(),
    );
    let form = by_id(&engine, "f");
    engine.destroy();

    assert!(!engine.is_initialized());
    assert!(all(&engine, &format!("#{STYLE_ID}")).is_empty());
    assert!(all(&engine, "[data-uac-styled], [data-uac-enhanced], [data-uac-validated]").is_empty());
    assert!(!engine.dispatch(form, EventKind::Submit).default_prevented);

    // No more callbacks after destroy
    let button = engine.document_mut().create_element("button");
    let body = engine.document().body();
    engine.document_mut().append_child(body, button).unwrap();
    engine.process_mutations();
    engine.scroll_to(1000.0);
    assert!(!engine.document().has_attr(button, "data-uac-styled"));
    assert!(all(&engine, ".uac-scroll-top, [data-uac-generated]").is_empty());
}

#[test]
fn test_init_after_destroy_rebuilds_controls() {
    let options = Options {
        create_navigation: true,
        ..Options::default()
    };
    let mut engine = start("<h2>One</h2><h2>Two</h2>", options);
    engine.destroy();
    engine.init();

    assert!(engine.is_initialized());
    let tops = all(&engine, ".uac-scroll-top");
    assert_eq!(tops.len(), 1);
    assert_eq!(all(&engine, "nav.uac-navigation").len(), 1);
    let link = all(&engine, "nav.uac-navigation a")[0];
    assert!(!engine.document().listeners(link).is_empty());

    engine.scroll_to(500.0);
    let outcome = engine.dispatch(tops[0], EventKind::Click);
    assert_eq!(outcome.scrolled_to, Some(ScrollTarget::Top));
}

#[test]
fn test_update_config_refreshes() {
    let mut engine = start("<main><p>hi</p></main>", Options::default());
    assert!(all(&engine, ".uac-sidebar").is_empty());

    engine.update_config(PartialOptions {
        create_sidebar: Some(true),
        ..PartialOptions::default()
    });
    assert!(engine.config().create_sidebar);
    assert_eq!(all(&engine, ".uac-sidebar").len(), 1);
    let main = all(&engine, "main")[0];
    assert_eq!(
        engine.document().style(main, "margin-left").as_deref(),
        Some("270px")
    );
}

#[test]
fn test_invalid_update_is_rejected() {
    let mut engine = start("<p>hi</p>", Options::default());
    engine.update_config(PartialOptions {
        create_header: Some(true),
        rules: Some(RuleTable::new(vec![ControlRule::new(ControlIntent::Primary, &[])])),
        ..PartialOptions::default()
    });
    assert!(!engine.config().create_header);
    assert_eq!(engine.config().rules, RuleTable::default());
}

#[test]
fn test_custom_rules_drive_classification() {
    let options = Options {
        rules: RuleTable::new(vec![ControlRule::new(ControlIntent::Danger, &["go"])]),
        ..Options::default()
    };
    let engine = start(r#"<button id="b">Go now</button><button id="s">Save</button>"#, options);
    let doc = engine.document();
    assert!(doc.has_class(by_id(&engine, "b"), "uac-btn-danger"));
    assert!(doc.has_class(by_id(&engine, "s"), "uac-btn-secondary"));
}

#[test]
fn test_auto_start_respects_manual_marker() {
    let manual = auto_start(Document::parse("<html data-uac-manual><body></body></html>"), env());
    assert!(!manual.is_initialized());
    assert!(manual.document().get_element_by_id(STYLE_ID).is_none());

    let auto = auto_start(Document::parse("<p>hi</p>"), env());
    assert!(auto.is_initialized());
}

// ============================================================================
// Mutations
// ============================================================================

#[test]
fn test_added_button_gets_scoped_pass_only() {
    let mut engine = start(
        r#"<button id="old">Save</button><div id="app"></div>"#,
        Options::default(),
    );
    let old = by_id(&engine, "old");
    let app = by_id(&engine, "app");
    let buttons_before = engine.features().button_count;

    // Host strips the old styling; a re-run on it would put it back
    engine.document_mut().remove_class(old, "uac-btn-primary").unwrap();

    let doc = engine.document_mut();
    let card = doc.create_element_with("div", &[("class", "card")]);
    let button = doc.create_element("button");
    let label = doc.create_text("Delete");
    doc.append_child(button, label).unwrap();
    doc.append_child(card, button).unwrap();
    doc.append_child(app, card).unwrap();
    engine.process_mutations();

    let doc = engine.document();
    assert!(doc.has_class(button, "uac-btn-danger"));
    assert!(marker::has(doc, button, marker::Marker::Styled));
    assert!(!doc.has_class(old, "uac-btn-primary"));
    assert!(!doc.has_class(card, "uac-card"));
    assert_eq!(engine.features().button_count, buttons_before + 1);
}

#[test]
fn test_field_added_to_form_is_labelled() {
    let mut engine = start(r#"<form id="f"></form>"#, Options::default());
    let form = by_id(&engine, "f");

    let doc = engine.document_mut();
    let input = doc.create_element_with("input", &[("placeholder", "Phone")]);
    doc.append_child(form, input).unwrap();
    engine.process_mutations();

    let doc = engine.document();
    assert!(doc.attr(input, "id").is_some());
    assert_eq!(all(&engine, "label.uac-label").len(), 1);
}

#[test]
fn test_text_only_batch_is_ignored() {
    let mut engine = start(r#"<p id="p"></p>"#, Options::default());
    let p = by_id(&engine, "p");
    let html = engine.document().to_html();
    let doc = engine.document_mut();
    let text = doc.create_text("hello");
    doc.append_child(p, text).unwrap();
    engine.process_mutations();
    assert_eq!(
        engine.document().to_html(),
        html.replace(r#"<p id="p"></p>"#, r#"<p id="p">hello</p>"#)
    );
}

#[test]
fn test_engine_mutations_are_not_recorded() {
    let mut engine = start(r#"<button>Save</button>"#, Options::default());
    assert!(engine.document_mut().take_records().is_empty());
    engine.refresh();
    engine.scroll_to(500.0);
    assert!(engine.document_mut().take_records().is_empty());
}

// ============================================================================
// Host notifications
// ============================================================================

#[test]
fn test_resize_crosses_breakpoint() {
    let mut engine = start("<p>hi</p>", Options::default());
    let rx = engine.subscribe();
    let html = engine.document().document_element();

    engine.resize(500, 800);
    assert_eq!(
        drain(&rx),
        vec![EngineEvent::ResizeClassChanged {
            is_mobile: true,
            is_tablet: false
        }]
    );
    assert!(engine.document().has_class(html, "uac-is-mobile"));
    assert!(!engine.document().has_class(html, "uac-is-desktop"));

    engine.resize(600, 800);
    assert!(drain(&rx).is_empty());

    engine.resize(900, 800);
    assert_eq!(
        drain(&rx),
        vec![EngineEvent::ResizeClassChanged {
            is_mobile: false,
            is_tablet: true
        }]
    );
}

#[test]
fn test_scroll_shows_control_and_moves_parallax() {
    let mut engine = start(
        r#"<div id="a" data-uac-parallax="0.25"></div><div id="b" data-uac-parallax></div>"#,
        Options::default(),
    );
    let top = all(&engine, ".uac-scroll-top")[0];
    engine.scroll_to(400.0);

    let doc = engine.document();
    assert!(doc.has_class(top, "visible"));
    assert_eq!(
        doc.style(by_id(&engine, "a"), "transform").as_deref(),
        Some("translateY(-100px)")
    );
    assert_eq!(
        doc.style(by_id(&engine, "b"), "transform").as_deref(),
        Some("translateY(-200px)")
    );

    let outcome = engine.dispatch(top, EventKind::Click);
    assert_eq!(outcome.scrolled_to, Some(ScrollTarget::Top));
    assert!(!engine.document().has_class(top, "visible"));
    assert_eq!(
        engine.document().style(by_id(&engine, "a"), "transform").as_deref(),
        Some("translateY(0px)")
    );
}

#[test]
fn test_lazy_image_loads_on_scroll() {
    let doc = Document::parse(r#"<img id="hero" data-src="hero.png"><img id="far" data-src="far.png">"#);
    let hero = doc.get_element_by_id("hero").unwrap();
    let far = doc.get_element_by_id("far").unwrap();
    let geometry = FixedGeometry::new()
        .with(hero, Rect::new(0.0, 300.0))
        .with(far, Rect::new(3000.0, 300.0));
    let mut engine = Engine::new(Options::default(), doc, env().with_geometry(geometry));
    engine.init();

    assert_eq!(engine.document().attr(hero, "src"), Some("hero.png"));
    assert_eq!(engine.document().attr(far, "src"), None);

    engine.scroll_to(2500.0);
    let doc = engine.document();
    assert_eq!(doc.attr(far, "src"), Some("far.png"));
    assert!(doc.has_class(far, crate::lazy::LOADED_CLASS));
}

#[test]
fn test_images_get_alt_and_sizing() {
    let engine = start(
        r#"<img id="a" src="/media/red-bike.jpg"><img id="b" src="x.png" alt="Kept"><img id="c" src="d.png" role="presentation">"#,
        Options::default(),
    );
    let doc = engine.document();
    let a = by_id(&engine, "a");
    assert_eq!(doc.attr(a, "alt"), Some("red bike"));
    assert_eq!(doc.style(a, "max-width").as_deref(), Some("100%"));
    assert_eq!(doc.style(a, "min-height").as_deref(), Some("50px"));
    assert_eq!(doc.attr(by_id(&engine, "b"), "alt"), Some("Kept"));
    assert_eq!(doc.attr(by_id(&engine, "c"), "alt"), None);
}

#[test]
fn test_far_images_load_lazily() {
    let doc = Document::parse(r#"<img id="top" src="a.png"><img id="low" src="b.png">"#);
    let top = doc.get_element_by_id("top").unwrap();
    let low = doc.get_element_by_id("low").unwrap();
    let geometry = FixedGeometry::new()
        .with(top, Rect::new(0.0, 100.0))
        .with(low, Rect::new(2000.0, 100.0));
    let mut engine = Engine::new(Options::default(), doc, env().with_geometry(geometry));
    engine.init();
    assert_eq!(engine.document().attr(top, "loading"), None);
    assert_eq!(engine.document().attr(low, "loading"), Some("lazy"));
}

#[test]
fn test_scripts_after_the_first_three_are_deferred() {
    let scripts: String = (0..5)
        .map(|i| format!(r#"<script src="s{i}.js"></script>"#))
        .collect();
    let html = format!(r#"{scripts}<script src="c.js" data-critical></script><script>inline()</script>"#);
    let engine = start(&html, Options::default());
    let deferred = all(&engine, "script[defer]");
    let doc = engine.document();
    let sources: Vec<_> = deferred.iter().filter_map(|&s| doc.attr(s, "src")).collect();
    assert_eq!(sources, vec!["s3.js", "s4.js"]);
}

#[test]
fn test_reduced_motion_class() {
    let mut engine = Engine::new(
        Options::default(),
        Document::parse("<p>hi</p>"),
        env().with_reduced_motion(true),
    );
    engine.init();
    let doc = engine.document();
    assert!(doc.has_class(doc.document_element(), "uac-reduced-motion"));
}

// ============================================================================
// Theme
// ============================================================================

#[test]
fn test_toggle_dark_mode_persists_and_notifies() {
    let mut engine = start("<p>hi</p>", Options::default());
    let rx = engine.subscribe();
    assert!(engine.toggle_dark_mode());
    assert_eq!(drain(&rx), vec![EngineEvent::ThemeChanged { dark: true }]);
    assert_eq!(engine.environment().storage.get(STORAGE_KEY).as_deref(), Some("true"));

    assert!(!engine.toggle_dark_mode());
    let doc = engine.document();
    assert!(!doc.has_class(doc.document_element(), DARK_CLASS));
}

#[test]
fn test_refresh_keeps_toggled_theme() {
    let options = Options {
        dark_mode: DarkMode::Light,
        ..Options::default()
    };
    let mut engine = start("<p>hi</p>", options);
    assert!(engine.toggle_dark_mode());
    engine.refresh();
    let doc = engine.document();
    assert!(doc.has_class(doc.document_element(), DARK_CLASS));

    engine.update_config(PartialOptions {
        dark_mode: Some(DarkMode::Light),
        ..PartialOptions::default()
    });
    let doc = engine.document();
    assert!(doc.has_class(doc.document_element(), DARK_CLASS));

    engine.update_config(PartialOptions {
        dark_mode: Some(DarkMode::Dark),
        ..PartialOptions::default()
    });
    engine.update_config(PartialOptions {
        dark_mode: Some(DarkMode::Light),
        ..PartialOptions::default()
    });
    let doc = engine.document();
    assert!(!doc.has_class(doc.document_element(), DARK_CLASS));
}

#[test]
fn test_off_mode_ignores_persisted_decision() {
    let storage = MemoryStorage::new();
    storage.set(STORAGE_KEY, "true").unwrap();
    let options = Options {
        dark_mode: DarkMode::Off,
        ..Options::default()
    };
    let mut engine = Engine::new(options, Document::parse("<p>hi</p>"), env().with_storage(storage));
    engine.init();
    let doc = engine.document();
    assert!(!doc.has_class(doc.document_element(), DARK_CLASS));
}

#[test]
fn test_system_preference_change() {
    let options = Options {
        dark_mode: DarkMode::System,
        ..Options::default()
    };
    let mut engine = start("<p>hi</p>", options);
    let rx = engine.subscribe();
    engine.set_system_dark(true);
    assert_eq!(drain(&rx), vec![EngineEvent::ThemeChanged { dark: true }]);

    let options = Options {
        dark_mode: DarkMode::Light,
        ..Options::default()
    };
    let mut engine = start("<p>hi</p>", options);
    let rx = engine.subscribe();
    engine.set_system_dark(true);
    assert!(drain(&rx).is_empty());
    let doc = engine.document();
    assert!(!doc.has_class(doc.document_element(), DARK_CLASS));
}

#[test]
fn test_theme_toggle_in_sidebar() {
    let options = Options {
        create_sidebar: true,
        ..Options::default()
    };
    let mut engine = start("<div>content</div>", options);
    let toggle = all(&engine, ".uac-theme-toggle")[0];
    engine.dispatch(toggle, EventKind::Click);
    let doc = engine.document();
    assert!(doc.has_class(doc.document_element(), DARK_CLASS));
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn test_anchor_scrolls_only_to_existing_target() {
    let mut engine = start(
        r##"<a id="good" href="#intro">Intro</a><a id="bad" href="#missing">x</a><section id="intro"></section>"##,
        Options::default(),
    );
    let good = engine.dispatch(by_id(&engine, "good"), EventKind::Click);
    assert!(good.default_prevented);
    assert_eq!(
        good.scrolled_to,
        Some(ScrollTarget::Element(by_id(&engine, "intro")))
    );

    let bad = engine.dispatch(by_id(&engine, "bad"), EventKind::Click);
    assert_eq!(bad, DispatchOutcome::default());
}

#[test]
fn test_modal_toggle_manages_single_backdrop() {
    let mut engine = start(
        r##"<button id="open" data-toggle="modal" data-target="#login">Open</button><div id="login" class="modal"></div>"##,
        Options::default(),
    );
    let open = by_id(&engine, "open");
    let modal = by_id(&engine, "login");
    let body = engine.document().body();

    engine.dispatch(open, EventKind::Click);
    assert!(engine.document().has_class(modal, "active"));
    let backdrops = all(&engine, ".modal-backdrop");
    assert_eq!(backdrops.len(), 1);
    assert_eq!(engine.document().style(body, "overflow").as_deref(), Some("hidden"));

    engine.dispatch(backdrops[0], EventKind::Click);
    assert!(!engine.document().has_class(modal, "active"));
    assert!(all(&engine, ".modal-backdrop").is_empty());
    assert_eq!(engine.document().style(body, "overflow"), None);
}

#[test]
fn test_menu_toggle_falls_back_to_mobile_menu() {
    let mut engine = start(
        r#"<span id="t" data-toggle="menu">Menu</span><ul class="mobile-menu"></ul>"#,
        Options::default(),
    );
    let trigger = by_id(&engine, "t");
    let menu = all(&engine, ".mobile-menu")[0];

    engine.dispatch(trigger, EventKind::Click);
    assert!(engine.document().has_class(menu, "active"));
    assert_eq!(all(&engine, ".menu-overlay").len(), 1);

    engine.dispatch(trigger, EventKind::Click);
    assert!(!engine.document().has_class(menu, "active"));
    assert!(all(&engine, ".menu-overlay").is_empty());
}

#[test]
fn test_header_menu_toggles_navigation() {
    let options = Options {
        create_header: true,
        create_navigation: true,
        ..Options::default()
    };
    let mut engine = start(
        "<html><head><title>Docs</title></head><body><h1>A</h1><h2>B</h2></body></html>",
        options,
    );
    let doc = engine.document();
    let header = all(&engine, ".uac-header")[0];
    assert_eq!(doc.children(doc.body()).first(), Some(&header));
    assert_eq!(doc.text_content(all(&engine, ".uac-logo")[0]), "Docs");

    let toggle = all(&engine, ".uac-menu-toggle")[0];
    let nav = all(&engine, ".uac-navigation")[0];
    engine.dispatch(toggle, EventKind::Click);
    assert!(engine.document().has_class(nav, "visible"));

    // Generated controls are left alone by the button pass
    assert!(!engine.document().has_attr(toggle, "data-uac-styled"));
}

#![cfg(target_arch = "wasm32")]
#![forbid(unsafe_code)]

use js_sys::Reflect;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

const MARKUP: &str = r##"
<head><title>Joey Oyong</title></head>
<body>
  <nav>
    <a class="nav-link active" data-tab="#home" href="#home">Home</a>
    <a class="nav-link" data-tab="#bio" href="#bio">Bio</a>
    <a class="nav-link" data-tab="#contact" href="#contact">Contact</a>
  </nav>
  <section id="home" class="tab-pane active"></section>
  <section id="bio" class="tab-pane"></section>
  <section id="contact" class="tab-pane"></section>
  <section id="website-system" class="tab-pane"></section>
</body>
"##;

fn flag(report: &JsValue, key: &str) -> Option<bool> {
    Reflect::get(report, &JsValue::from_str(key)).ok()?.as_bool()
}

fn has_active(document: &web_sys::Document, id: &str) -> bool {
    document
        .get_element_by_id(id)
        .is_some_and(|el| el.class_list().contains("active"))
}

#[wasm_bindgen_test]
fn boot_attaches_and_activates_without_gtag() {
    let window = web_sys::window().expect("window");
    let document = window.document().expect("document");
    document
        .document_element()
        .expect("root element")
        .set_inner_html(MARKUP);

    let report = folio_web::boot(Some(r#"{"nav":{"dispatch_dom_event":false}}"#.to_owned()))
        .expect("boot succeeds");
    assert_eq!(flag(&report, "tabs"), Some(true));
    assert_eq!(flag(&report, "productClicks"), Some(false));

    assert!(folio_web::activate_pane("website-system"));
    assert_eq!(folio_web::active_pane().as_deref(), Some("website-system"));
    assert!(has_active(&document, "website-system"));
    assert!(!has_active(&document, "home"));
    assert_eq!(window.location().hash().unwrap(), "#website-system");

    assert!(!folio_web::activate_pane("doesNotExist"));
    assert_eq!(folio_web::active_pane().as_deref(), Some("website-system"));
}

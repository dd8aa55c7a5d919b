//! Browser tests for the JS-facing session API
#![cfg(target_arch = "wasm32")]

use anchored_comments_wasm::CommentSession;
use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const TREE: &str = r#"{"type":"element","tag":"p","children":["Hello world"]}"#;

#[wasm_bindgen_test]
fn test_default_session() {
    let session = CommentSession::new(JsValue::UNDEFINED).unwrap();
    assert!(session.active_comment_id().is_none());
}

#[wasm_bindgen_test]
fn test_highlight_html_from_js_tree() {
    let mut session = CommentSession::new(JsValue::UNDEFINED).unwrap();
    session.set_in_progress_selection("doc", 6, 11);

    let tree = js_sys::JSON::parse(TREE).unwrap();
    let html = session.highlight_html("doc", tree).unwrap();
    assert!(html.starts_with("<p>Hello <span"));
    assert!(html.contains("data-comment-id=\"new-comment\""));
    assert!(html.ends_with(">world</span></p>"));
}

#[wasm_bindgen_test]
fn test_container_registry() {
    let mut session = CommentSession::new(JsValue::UNDEFINED).unwrap();
    assert!(session.register_container("doc", JsValue::from_str("first")));
    assert!(!session.register_container("doc", JsValue::from_str("second")));
    assert_eq!(session.get_container("doc").as_string().as_deref(), Some("first"));
    assert!(session.get_container("missing").is_undefined());
}

#[wasm_bindgen_test]
fn test_unsubscribe_unknown_handle() {
    let mut session = CommentSession::new(JsValue::UNDEFINED).unwrap();
    assert!(!session.unsubscribe(42));
}

#[wasm_bindgen_test]
async fn test_subscribers_run_after_the_mutator_returns() {
    let mut session = CommentSession::new(JsValue::UNDEFINED).unwrap();
    let callback = Function::new_with_args(
        "state",
        "globalThis.__deliveredActiveId = state.activeAnnotationId;",
    );
    session.subscribe(callback);

    let global = js_sys::global();
    let key = JsValue::from_str("__deliveredActiveId");
    Reflect::set(&global, &key, &JsValue::from_str("none yet")).unwrap();

    session.set_active_comment_id(Some("c1".to_string()));
    let before = Reflect::get(&global, &key).unwrap();
    assert_eq!(before.as_string().as_deref(), Some("none yet"));

    // Queued behind the delivery
    JsFuture::from(Promise::resolve(&JsValue::NULL)).await.unwrap();

    let after = Reflect::get(&global, &key).unwrap();
    assert_eq!(after.as_string().as_deref(), Some("c1"));
    assert!(session.get_state().is_ok());
}

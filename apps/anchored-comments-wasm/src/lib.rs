//! Anchored comments for the browser
//!
//! A WASM binding that keeps a page's comment state in Rust and highlights
//! rendered trees:
//! - `CommentSession` owns the selection store for one page
//! - trees, comments and configuration cross the boundary as plain JS
//!   values (or JSON strings)
//!
//! The page keeps doing what only it can do: converting markup to a tree,
//! reading DOM selections, persisting comments and laying out comment boxes.

use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use anchored_comments::{
    render_html, Comment, CommentPosition, HighlightConfig, Node, SelectionRange, SelectionStore,
    SubscriptionId,
};

mod error;

pub use error::SessionError;

/// Initialize the WASM module
/// Call this before using any other functions
#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in debug mode
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Comment session - main interface for one page
#[wasm_bindgen]
pub struct CommentSession {
    store: SelectionStore<JsValue>,
    config: HighlightConfig,
    subscriptions: Vec<(u32, SubscriptionId)>,
    next_subscription: u32,
}

#[wasm_bindgen]
impl CommentSession {
    /// Create a session; `config` may be omitted to use defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CommentSession, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            HighlightConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(SessionError::from)?
        };
        config.validate().map_err(SessionError::from)?;
        Ok(Self::with_config(config))
    }

    /// Replace the mirrored comment list
    #[wasm_bindgen(js_name = "setComments")]
    pub fn set_comments(&mut self, comments: JsValue) -> Result<(), JsValue> {
        let comments: Vec<Comment> =
            serde_wasm_bindgen::from_value(comments).map_err(SessionError::from)?;
        self.store.set_annotations(comments);
        Ok(())
    }

    /// Replace the mirrored comment list from JSON text
    #[wasm_bindgen(js_name = "setCommentsJson")]
    pub fn set_comments_json(&mut self, json: &str) -> Result<(), JsValue> {
        Ok(self.load_comments_json(json)?)
    }

    /// Record the selection the user is making in a container
    #[wasm_bindgen(js_name = "setInProgressSelection")]
    pub fn set_in_progress_selection(&mut self, container_id: &str, start: usize, end: usize) {
        self.store
            .set_in_progress_selection(container_id, Some(SelectionRange::new(start, end)));
    }

    /// Drop the in-progress selection (cancelled or committed)
    #[wasm_bindgen(js_name = "clearInProgressSelection")]
    pub fn clear_in_progress_selection(&mut self) {
        let container_id = self
            .store
            .in_progress_selection()
            .map(|s| s.container_id.clone())
            .unwrap_or_default();
        self.store.set_in_progress_selection(&container_id, None);
    }

    /// Track the live selection used to place the comment button
    #[wasm_bindgen(js_name = "setPositionedSelection")]
    pub fn set_positioned_selection(&mut self, container_id: &str, start: usize, end: usize) {
        self.store
            .set_positioned_selection(container_id, Some(SelectionRange::new(start, end)));
    }

    #[wasm_bindgen(js_name = "clearPositionedSelection")]
    pub fn clear_positioned_selection(&mut self) {
        let container_id = self
            .store
            .positioned_selection()
            .map(|s| s.container_id.clone())
            .unwrap_or_default();
        self.store.set_positioned_selection(&container_id, None);
    }

    #[wasm_bindgen(js_name = "setShowNewCommentBox")]
    pub fn set_show_new_comment_box(&mut self, show: bool) {
        self.store.set_show_new_comment_box(show);
    }

    #[wasm_bindgen(js_name = "setSectionOffsets")]
    pub fn set_section_offsets(&mut self, commentable_y: f64, comments_y: f64) {
        self.store.set_section_offsets(commentable_y, comments_y);
    }

    #[wasm_bindgen(js_name = "setActiveCommentId")]
    pub fn set_active_comment_id(&mut self, id: Option<String>) {
        self.store.set_active_annotation_id(id.as_deref());
    }

    #[wasm_bindgen(js_name = "activeCommentId")]
    pub fn active_comment_id(&self) -> Option<String> {
        self.store.active_annotation_id().map(str::to_string)
    }

    /// Register a container element on first mount
    #[wasm_bindgen(js_name = "registerContainer")]
    pub fn register_container(&mut self, container_id: &str, element: JsValue) -> bool {
        self.store.register_container(container_id, element)
    }

    /// Get a registered container element, or undefined
    #[wasm_bindgen(js_name = "getContainer")]
    pub fn get_container(&self, container_id: &str) -> JsValue {
        self.store
            .container(container_id)
            .cloned()
            .unwrap_or(JsValue::UNDEFINED)
    }

    /// Record where a comment box is drawn
    #[wasm_bindgen(js_name = "setCommentPosition")]
    pub fn set_comment_position(&mut self, id: &str, top: f64, height: Option<f64>) {
        let position = CommentPosition { top, height };
        self.store.set_comment_position(id, position);
    }

    /// Number of state transitions so far
    #[wasm_bindgen(js_name = "revision")]
    pub fn revision(&self) -> f64 {
        self.store.revision() as f64
    }

    /// Current state as a plain object
    #[wasm_bindgen(js_name = "getState")]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        Ok(to_js(self.store.snapshot())?)
    }

    /// Call `callback` with the new state after every transition
    ///
    /// Calls are queued as microtasks, so they run once the mutating call
    /// has returned and the callback may call back into the session.
    /// Returns a handle for `unsubscribe`.
    #[wasm_bindgen(js_name = "subscribe")]
    pub fn subscribe(&mut self, callback: Function) -> u32 {
        let id = self.store.subscribe(move |state| {
            let delivered = to_js(state)
                .map_err(JsValue::from)
                .and_then(|value| defer_call(&callback, &value));
            if let Err(err) = delivered {
                web_sys::console::warn_2(&JsValue::from_str("Comment state not delivered:"), &err);
            }
        });

        let handle = self.next_subscription;
        self.next_subscription += 1;
        self.subscriptions.push((handle, id));
        handle
    }

    #[wasm_bindgen(js_name = "unsubscribe")]
    pub fn unsubscribe(&mut self, handle: u32) -> bool {
        let Some(index) = self.subscriptions.iter().position(|(h, _)| *h == handle) else {
            return false;
        };
        let (_, id) = self.subscriptions.swap_remove(index);
        self.store.unsubscribe(id)
    }

    /// Highlight a container's rendered tree
    /// Returns the annotated tree as a plain JS value
    #[wasm_bindgen(js_name = "highlight")]
    pub fn highlight(&self, container_id: &str, tree: JsValue) -> Result<JsValue, JsValue> {
        let tree: Node = serde_wasm_bindgen::from_value(tree).map_err(SessionError::from)?;
        let annotated = self.annotate(container_id, &tree);
        Ok(to_js(&annotated)?)
    }

    /// Highlight a container's rendered tree and serialize it to HTML
    #[wasm_bindgen(js_name = "highlightHtml")]
    pub fn highlight_html(&self, container_id: &str, tree: JsValue) -> Result<String, JsValue> {
        let tree: Node = serde_wasm_bindgen::from_value(tree).map_err(SessionError::from)?;
        let annotated = self.annotate(container_id, &tree);
        Ok(render_html(&annotated, &self.config))
    }

    /// Highlight a tree given as JSON text, returning JSON text
    #[wasm_bindgen(js_name = "highlightJson")]
    pub fn highlight_json(&self, container_id: &str, tree_json: &str) -> Result<String, JsValue> {
        Ok(self.highlight_json_str(container_id, tree_json)?)
    }
}

impl CommentSession {
    /// Create a session with an explicit configuration
    pub fn with_config(config: HighlightConfig) -> Self {
        Self {
            store: SelectionStore::new(),
            config,
            subscriptions: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    pub fn store(&self) -> &SelectionStore<JsValue> {
        &self.store
    }

    /// Replace the comment list from JSON text
    pub fn load_comments_json(&mut self, json: &str) -> Result<(), SessionError> {
        let comments: Vec<Comment> = serde_json::from_str(json)?;
        self.store.set_annotations(comments);
        Ok(())
    }

    /// Highlight a JSON tree and return the annotated tree as JSON
    pub fn highlight_json_str(
        &self,
        container_id: &str,
        tree_json: &str,
    ) -> Result<String, SessionError> {
        let tree = Node::from_json(tree_json)?;
        let annotated = self.annotate(container_id, &tree);
        Ok(serde_json::to_string(&annotated)?)
    }

    fn annotate(&self, container_id: &str, tree: &Node) -> Node {
        self.store
            .annotate_container(container_id, tree, &self.config.annotator())
    }
}

/// Queue `callback(value)` as a microtask
///
/// Exceptions thrown by the callback surface as unhandled rejections.
fn defer_call(callback: &Function, value: &JsValue) -> Result<(), JsValue> {
    let promise = Promise::resolve(value);
    let then: Function = Reflect::get(&promise, &JsValue::from_str("then"))?.dyn_into()?;
    then.call1(&promise, callback)?;
    Ok(())
}

/// Convert to a plain JS value, with maps as objects
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, SessionError> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

//! Selection store
//!
//! All mutation happens on one logical thread (UI event dispatch), so the
//! store takes `&mut self` and holds no locks. Each mutator performs exactly
//! one transition: it bumps the revision and then calls every subscriber
//! with the new state before returning.

use std::collections::HashMap;
use std::fmt;

use super::types::{CommentPosition, SelectionState};
use crate::annotations::{collect_ranges, Comment, PositionedSelectionRange, SelectionRange};
use crate::annotator::Annotator;
use crate::node::Node;
use crate::range::Range;

/// Handle returned by [`SelectionStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&SelectionState)>;

/// Session-scoped comment state
///
/// `H` is the handle type of commentable containers (a DOM element, a layout
/// node id, ...). The store never looks inside handles.
pub struct SelectionStore<H> {
    state: SelectionState,
    revision: u64,
    containers: HashMap<String, H>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<H> Default for SelectionStore<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for SelectionStore<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionStore")
            .field("state", &self.state)
            .field("revision", &self.revision)
            .field("containers", &self.containers.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<H> SelectionStore<H> {
    /// Create an empty store for a new session
    pub fn new() -> Self {
        Self::with_annotations(Vec::new())
    }

    /// Create a store mirroring an initial annotation list
    pub fn with_annotations(annotations: Vec<Comment>) -> Self {
        Self {
            state: SelectionState {
                annotations,
                ..SelectionState::default()
            },
            revision: 0,
            containers: HashMap::new(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn positioned_selection(&self) -> Option<&PositionedSelectionRange> {
        self.state.positioned_selection.as_ref()
    }

    pub fn show_new_comment_box(&self) -> bool {
        self.state.show_new_comment_box
    }

    pub fn in_progress_selection(&self) -> Option<&PositionedSelectionRange> {
        self.state.in_progress_selection.as_ref()
    }

    pub fn active_annotation_id(&self) -> Option<&str> {
        self.state.active_annotation_id.as_deref()
    }

    pub fn annotations(&self) -> &[Comment] {
        &self.state.annotations
    }

    pub fn comment_position(&self, id: &str) -> Option<CommentPosition> {
        self.state.positions.get(id).copied()
    }

    /// Current state, as every subscriber last saw it
    pub fn snapshot(&self) -> &SelectionState {
        &self.state
    }

    /// Number of transitions since the store was created
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Ranges to highlight inside a container, in rendering order
    pub fn ranges_for_container(&self, container_id: &str) -> Vec<Range> {
        collect_ranges(
            &self.state.annotations,
            self.state.in_progress_selection.as_ref(),
            container_id,
        )
    }

    /// Annotate a container's tree against the current state
    pub fn annotate_container(
        &self,
        container_id: &str,
        tree: &Node,
        annotator: &Annotator,
    ) -> Node {
        let ranges = self.ranges_for_container(container_id);
        annotator.annotate(tree, &ranges, self.active_annotation_id())
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    /// Track the live selection; `None` clears it
    ///
    /// Unlike the in-progress selection this is not highlighted.
    pub fn set_positioned_selection(&mut self, container_id: &str, range: Option<SelectionRange>) {
        self.state.positioned_selection =
            range.map(|range| PositionedSelectionRange::new(container_id, range));
        tracing::debug!("Positioned selection in '{}' set to {:?}", container_id, range);
        self.commit();
    }

    /// Open or close the new-comment box
    pub fn set_show_new_comment_box(&mut self, show: bool) {
        self.state.show_new_comment_box = show;
        tracing::debug!("New comment box shown: {}", show);
        self.commit();
    }

    /// Record the vertical offsets of the commentable section and the
    /// comments column
    pub fn set_section_offsets(&mut self, commentable_y: f64, comments_y: f64) {
        self.state.commentable_section_offset_y = commentable_y;
        self.state.comments_section_offset_y = comments_y;
        tracing::debug!("Section offsets set to {} / {}", commentable_y, comments_y);
        self.commit();
    }

    /// Replace the in-progress selection; `None` clears it
    pub fn set_in_progress_selection(&mut self, container_id: &str, range: Option<SelectionRange>) {
        self.state.in_progress_selection =
            range.map(|range| PositionedSelectionRange::new(container_id, range));
        tracing::debug!(
            "In-progress selection in '{}' set to {:?}",
            container_id,
            range
        );
        self.commit();
    }

    /// Make `id` the active annotation; `None` deactivates all
    pub fn set_active_annotation_id(&mut self, id: Option<&str>) {
        self.state.active_annotation_id = id.map(str::to_string);
        tracing::debug!("Active annotation set to {:?}", id);
        self.commit();
    }

    /// Mirror a new version of the externally owned annotation list
    pub fn set_annotations(&mut self, annotations: Vec<Comment>) {
        tracing::debug!("Annotation list replaced ({} entries)", annotations.len());
        self.state.annotations = annotations;
        self.commit();
    }

    /// Record where a comment is drawn
    pub fn set_comment_position(&mut self, id: &str, position: CommentPosition) {
        self.state.positions.insert(id.to_string(), position);
        tracing::debug!("Position of '{}' set to {:?}", id, position);
        self.commit();
    }

    /// Forget where a comment is drawn
    pub fn clear_comment_position(&mut self, id: &str) {
        self.state.positions.remove(id);
        tracing::debug!("Position of '{}' cleared", id);
        self.commit();
    }

    fn commit(&mut self) {
        self.revision += 1;
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.state);
        }
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Call `listener` with the new state after every transition
    pub fn subscribe(&mut self, listener: impl FnMut(&SelectionState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Stop notifying a subscriber; returns whether it was subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    // ------------------------------------------------------------------
    // Container registry
    // ------------------------------------------------------------------

    /// Register a container handle on first mount
    ///
    /// Later registrations under the same id keep the first handle and
    /// return `false`. Entries live for the whole session. Registering is not
    /// a state transition.
    pub fn register_container(&mut self, container_id: &str, handle: H) -> bool {
        if self.containers.contains_key(container_id) {
            return false;
        }
        tracing::debug!("Registered container '{}'", container_id);
        self.containers.insert(container_id.to_string(), handle);
        true
    }

    pub fn container(&self, container_id: &str) -> Option<&H> {
        self.containers.get(container_id)
    }

    pub fn container_ids(&self) -> impl Iterator<Item = &str> {
        self.containers.keys().map(String::as_str)
    }
}

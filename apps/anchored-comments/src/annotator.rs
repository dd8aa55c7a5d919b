//! Range-overlap annotation
//!
//! Markup conversion throws away the flat text offsets that annotations are
//! anchored to. The annotator re-derives them in a single depth-first pass:
//! a running offset starts at zero, each text leaf advances it by its length,
//! and elements, collections and opaque nodes advance it by nothing of their
//! own. Every text leaf that intersects a range is cut at the range
//! boundaries falling inside it, and each resulting run covered by at least
//! one range is wrapped in a [`Node::Highlight`].
//!
//! A leaf split into several runs is replaced by a [`Node::Collection`] of
//! those runs, so parents keep one child slot per original child and
//! inline/block ancestors stay intact.

use crate::node::{Element, Node, Segment};
use crate::range::{OffsetUnit, Range};

/// Annotates trees, counting offsets in a fixed unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Annotator {
    unit: OffsetUnit,
}

impl Annotator {
    pub fn new(unit: OffsetUnit) -> Self {
        Self { unit }
    }

    pub fn unit(&self) -> OffsetUnit {
        self.unit
    }

    /// Annotate `tree` with `ranges`
    ///
    /// `ranges` must not contain empty ranges. Their order is the order of
    /// identifiers on every emitted segment, so the first covering range of a
    /// segment is its primary identifier. A segment is active when
    /// `active_id` is among its covering identifiers.
    ///
    /// Returns a new tree; `tree` is left untouched.
    pub fn annotate(&self, tree: &Node, ranges: &[Range], active_id: Option<&str>) -> Node {
        let pass = Pass {
            unit: self.unit,
            ranges,
            active_id,
        };
        let (node, length) = pass.node(tree, 0);

        tracing::debug!(
            "Annotated {} offsets against {} ranges (active: {:?})",
            length,
            ranges.len(),
            active_id
        );

        node
    }
}

/// Annotate with the default offset unit
pub fn annotate(tree: &Node, ranges: &[Range], active_id: Option<&str>) -> Node {
    Annotator::default().annotate(tree, ranges, active_id)
}

/// State of one traversal; the offset is threaded through return values
struct Pass<'a> {
    unit: OffsetUnit,
    ranges: &'a [Range],
    active_id: Option<&'a str>,
}

impl Pass<'_> {
    fn node(&self, node: &Node, offset: usize) -> (Node, usize) {
        match node {
            Node::Text(content) => self.text(content, offset),
            // Stale styling from an earlier pass is dropped and recomputed
            Node::Highlight(segment) => self.text(&segment.text, offset),
            Node::Element(element) => self.element(element, offset),
            Node::Collection(children) => {
                let (children, offset) = self.children(children, offset);
                (Node::Collection(children), offset)
            }
            Node::Opaque(_) => (node.clone(), offset),
        }
    }

    fn element(&self, element: &Element, offset: usize) -> (Node, usize) {
        let (children, offset) = self.children(&element.children, offset);
        let element = Element {
            tag: element.tag.clone(),
            attributes: element.attributes.clone(),
            children,
        };
        (Node::Element(element), offset)
    }

    fn children(&self, children: &[Node], mut offset: usize) -> (Vec<Node>, usize) {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            let (node, next) = self.node(child, offset);
            out.push(node);
            offset = next;
        }
        (out, offset)
    }

    fn text(&self, content: &str, start: usize) -> (Node, usize) {
        let end = start + self.unit.len(content);

        if !self.ranges.iter().any(|r| r.overlaps(start, end)) {
            return (Node::Text(content.to_string()), end);
        }

        let overlapping: Vec<&Range> = self
            .ranges
            .iter()
            .filter(|r| r.overlaps(start, end))
            .collect();

        let mut cuts = Vec::with_capacity(overlapping.len() * 2 + 2);
        cuts.push(start);
        cuts.push(end);
        for range in &overlapping {
            for boundary in [range.start, range.end] {
                if boundary > start && boundary < end {
                    cuts.push(boundary);
                }
            }
        }
        cuts.sort_unstable();
        cuts.dedup();

        let relative: Vec<usize> = cuts.iter().map(|cut| cut - start).collect();
        let bytes = self.unit.byte_indices(content, &relative);

        let mut segments = Vec::with_capacity(cuts.len() - 1);
        for (window, byte_window) in cuts.windows(2).zip(bytes.windows(2)) {
            let (from, to) = (byte_window[0], byte_window[1]);
            if from == to {
                continue;
            }
            let text = content[from..to].to_string();

            let range_ids: Vec<String> = overlapping
                .iter()
                .filter(|r| r.covers(window[0], window[1]))
                .map(|r| r.id.clone())
                .collect();

            if range_ids.is_empty() {
                segments.push(Node::Text(text));
                continue;
            }

            let active = self
                .active_id
                .is_some_and(|id| range_ids.iter().any(|r| r == id));

            // A cut inside a character was rounded down to its first byte
            let segment_start = start + self.unit.len(&content[..from]);

            segments.push(Node::Highlight(Segment {
                text,
                range_ids,
                active,
                start: segment_start,
            }));
        }

        tracing::trace!(
            "Split text at {}..{} into {} segments ({} ranges)",
            start,
            end,
            segments.len(),
            overlapping.len()
        );

        let node = if segments.len() == 1 {
            segments.swap_remove(0)
        } else {
            Node::Collection(segments)
        };

        (node, end)
    }
}

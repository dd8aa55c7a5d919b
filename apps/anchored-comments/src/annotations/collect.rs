//! Range collection
//!
//! Builds the ordered range list the annotator consumes for one container.

use super::types::{Anchored, PositionedSelectionRange, SelectionRange, NEW_COMMENT_ID};
use crate::range::Range;

/// Collect the ranges to highlight inside `container_id`
///
/// Annotations of the container (and those without a container) come first,
/// in list order. The in-progress selection is appended last under
/// [`NEW_COMMENT_ID`] when it was made in the same container. Empty ranges
/// are dropped.
pub fn collect_ranges<A: Anchored>(
    annotations: &[A],
    selection: Option<&PositionedSelectionRange>,
    container_id: &str,
) -> Vec<Range> {
    let mut ranges = Vec::with_capacity(annotations.len() + 1);

    for annotation in annotations {
        if annotation
            .container_id()
            .is_some_and(|container| container != container_id)
        {
            continue;
        }
        push_range(&mut ranges, annotation.anchor_id(), annotation.selection_range());
    }

    if let Some(selection) = selection.filter(|s| s.container_id == container_id) {
        push_range(&mut ranges, NEW_COMMENT_ID, selection.range);
    }

    ranges
}

fn push_range(ranges: &mut Vec<Range>, id: &str, anchor: SelectionRange) {
    if anchor.is_empty() {
        tracing::debug!(
            "Dropping empty range '{}' at {}..{}",
            id,
            anchor.start_offset,
            anchor.end_offset
        );
        return;
    }
    ranges.push(anchor.to_range(id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::Comment;

    #[test]
    fn test_collect_filters_by_container() {
        let comments = vec![
            Comment::new("a", 0, 4).in_container("one"),
            Comment::new("b", 2, 6).in_container("two"),
            Comment::new("c", 1, 3),
        ];

        let ranges = collect_ranges(&comments, None, "one");
        assert_eq!(ranges, vec![Range::new("a", 0, 4), Range::new("c", 1, 3)]);
    }

    #[test]
    fn test_selection_appended_last_for_its_container() {
        let comments = vec![Comment::new("a", 0, 4).in_container("one")];
        let selection = PositionedSelectionRange::new("one", SelectionRange::new(5, 8));

        let ranges = collect_ranges(&comments, Some(&selection), "one");
        assert_eq!(
            ranges,
            vec![Range::new("a", 0, 4), Range::new(NEW_COMMENT_ID, 5, 8)]
        );

        let elsewhere = collect_ranges(&comments, Some(&selection), "two");
        assert!(elsewhere.is_empty());
    }

    #[test]
    fn test_empty_ranges_are_dropped() {
        let comments = vec![Comment::new("a", 3, 3), Comment::new("b", 5, 2)];
        let selection = PositionedSelectionRange::new("one", SelectionRange::new(4, 4));

        assert!(collect_ranges(&comments, Some(&selection), "one").is_empty());
    }

    #[test]
    fn test_plain_ranges_are_anchored() {
        let ranges = vec![Range::new("x", 0, 2), Range::new("y", 2, 2)];
        assert_eq!(collect_ranges(&ranges, None, "any"), vec![Range::new("x", 0, 2)]);
    }
}

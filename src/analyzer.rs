//! Sibling and array analysis over a freshly built [`Document`].
//!
//! Two passes:
//! 1. every parent's children get a 1-based `sibling_index` and the last one is flagged
//!    `is_last_sibling`;
//! 2. children sharing a name with another sibling become array members. Members that are
//!    not adjacent to the previous member of their group are moved right behind it, so a
//!    group is rendered as one contiguous JSON array at the position of its first member.

use crate::err::{Result, XmlToJsonError};
use crate::model::{Document, ElementId};
use hashbrown::HashMap as FastMap;
use log::{debug, trace};

type NameMap<'a, V> = FastMap<&'a str, V, ahash::RandomState>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    /// Elements in the document, excluding the synthetic root.
    pub elements: usize,
    pub array_groups: usize,
    /// Array members that had to be moved next to their predecessor.
    pub relocations: usize,
}

/// Annotate `doc` with sibling positions and array groups, reordering siblings as needed.
pub fn analyze(doc: &mut Document<'_>) -> Result<AnalysisStats> {
    let parents: Vec<ElementId> = doc
        .root()
        .descendants(doc.arena())
        .filter(|&id| doc.element(id).has_children)
        .collect();

    let mut stats = AnalysisStats {
        elements: doc.len(),
        ..AnalysisStats::default()
    };

    for &parent in &parents {
        index_siblings(doc, parent);
    }

    for &parent in &parents {
        group_arrays(doc, parent, &mut stats)?;
    }

    debug!(
        "analyzed {} elements: {} array groups, {} relocations",
        stats.elements, stats.array_groups, stats.relocations
    );

    Ok(stats)
}

fn index_siblings(doc: &mut Document<'_>, parent: ElementId) {
    let children: Vec<ElementId> = doc.children(parent).collect();
    let count = children.len();

    for (i, &child) in children.iter().enumerate() {
        let element = doc.element_mut(child);
        element.sibling_index = i + 1;
        element.is_last_sibling = i + 1 == count;
        element.array_rank = 0;
        element.is_array_end = false;
    }
}

fn group_arrays<'a>(
    doc: &mut Document<'a>,
    parent: ElementId,
    stats: &mut AnalysisStats,
) -> Result<()> {
    let children: Vec<ElementId> = doc.children(parent).collect();
    if children.len() < 2 {
        return Ok(());
    }

    let mut counts: NameMap<'a, usize> = NameMap::with_hasher(ahash::RandomState::new());
    for &child in &children {
        *counts.entry(doc.element(child).name).or_insert(0) += 1;
    }
    if counts.values().all(|&count| count < 2) {
        return Ok(());
    }

    // Most recently placed member of every group.
    let mut last_member: NameMap<'a, ElementId> = NameMap::with_hasher(ahash::RandomState::new());

    for &child in &children {
        let name = doc.element(child).name;
        if counts.get(name).copied().unwrap_or(0) < 2 {
            continue;
        }

        let rank = match last_member.get(name).copied() {
            None => {
                stats.array_groups += 1;
                1
            }
            Some(prev) => {
                let prev_index = doc.element(prev).sibling_index;
                if doc.element(child).sibling_index != prev_index + 1 {
                    relocate(doc, prev, child)?;
                    stats.relocations += 1;
                }
                doc.element(prev).array_rank + 1
            }
        };

        doc.element_mut(child).array_rank = rank;
        last_member.insert(name, child);
    }

    for &last in last_member.values() {
        doc.element_mut(last).is_array_end = true;
    }

    Ok(())
}

/// Moves `moved` (with its subtree) directly behind `prev`, which precedes it.
fn relocate(doc: &mut Document<'_>, prev: ElementId, moved: ElementId) -> Result<()> {
    let between: Vec<ElementId> = prev
        .following_siblings(doc.arena())
        .skip(1)
        .take_while(|&id| id != moved)
        .collect();

    for &id in &between {
        doc.element_mut(id).sibling_index += 1;
    }

    let arena = doc.arena_mut();
    moved.detach(arena);
    prev.checked_insert_after(moved, arena)
        .map_err(|e| XmlToJsonError::FailedToRelinkNode {
            reason: format!("{e:?}"),
        })?;

    let prev_index = doc.element(prev).sibling_index;
    let element = doc.element_mut(moved);
    element.sibling_index = prev_index + 1;

    if element.is_last_sibling {
        element.is_last_sibling = false;
        if let Some(&new_last) = between.last() {
            doc.element_mut(new_last).is_last_sibling = true;
        }
    }

    trace!(
        "moved <{}> to sibling position {}",
        doc.element(moved).name,
        prev_index + 1
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_builder::build;
    use pretty_assertions::assert_eq;

    /// (name, sibling_index, is_last_sibling, array_rank, is_array_end) for every child.
    fn annotations(doc: &Document<'_>, parent: ElementId) -> Vec<(String, usize, bool, usize, bool)> {
        doc.children(parent)
            .map(|id| {
                let e = doc.element(id);
                (
                    e.name.to_string(),
                    e.sibling_index,
                    e.is_last_sibling,
                    e.array_rank,
                    e.is_array_end,
                )
            })
            .collect()
    }

    fn top(doc: &Document<'_>) -> ElementId {
        doc.children(doc.root()).next().unwrap()
    }

    fn row(name: &str, index: usize, last: bool, rank: usize, end: bool) -> (String, usize, bool, usize, bool) {
        (name.to_string(), index, last, rank, end)
    }

    #[test]
    fn test_sibling_indexes_without_arrays() {
        let mut doc = build("<a><x/><y/><z/></a>");
        let stats = analyze(&mut doc).unwrap();
        assert_eq!(
            stats,
            AnalysisStats {
                elements: 4,
                array_groups: 0,
                relocations: 0
            }
        );

        let a = top(&doc);
        assert_eq!(
            annotations(&doc, a),
            vec![
                row("x", 1, false, 0, false),
                row("y", 2, false, 0, false),
                row("z", 3, true, 0, false),
            ]
        );
        assert_eq!(doc.element(a).sibling_index, 1);
        assert!(doc.element(a).is_last_sibling);
    }

    #[test]
    fn test_contiguous_group_is_not_moved() {
        let mut doc = build("<a><b>1</b><b>2</b><c/></a>");
        let stats = analyze(&mut doc).unwrap();
        assert_eq!(stats.array_groups, 1);
        assert_eq!(stats.relocations, 0);

        assert_eq!(
            annotations(&doc, top(&doc)),
            vec![
                row("b", 1, false, 1, false),
                row("b", 2, false, 2, true),
                row("c", 3, true, 0, false),
            ]
        );
    }

    #[test]
    fn test_non_contiguous_member_is_moved_behind_its_group() {
        let mut doc = build("<a><b>1</b><c/><b>2</b></a>");
        let stats = analyze(&mut doc).unwrap();
        assert_eq!(stats.relocations, 1);

        assert_eq!(
            annotations(&doc, top(&doc)),
            vec![
                row("b", 1, false, 1, false),
                row("b", 2, false, 2, true),
                row("c", 3, true, 0, false),
            ]
        );

        // The moved member keeps its own content.
        let second_b = doc.children(top(&doc)).nth(1).unwrap();
        assert_eq!(doc.element(second_b).values[0].to_string(), "2");
    }

    #[test]
    fn test_interleaved_groups() {
        let mut doc = build("<a><b/><c/><b/><c/></a>");
        let stats = analyze(&mut doc).unwrap();
        assert_eq!(stats.array_groups, 2);
        assert_eq!(stats.relocations, 1);

        assert_eq!(
            annotations(&doc, top(&doc)),
            vec![
                row("b", 1, false, 1, false),
                row("b", 2, false, 2, true),
                row("c", 3, false, 1, false),
                row("c", 4, true, 2, true),
            ]
        );
    }

    #[test]
    fn test_last_sibling_flag_follows_the_list_end() {
        let mut doc = build("<a><b/><x/><b/><y/><b/></a>");
        let stats = analyze(&mut doc).unwrap();
        assert_eq!(stats.relocations, 2);

        assert_eq!(
            annotations(&doc, top(&doc)),
            vec![
                row("b", 1, false, 1, false),
                row("b", 2, false, 2, false),
                row("b", 3, false, 3, true),
                row("x", 4, false, 0, false),
                row("y", 5, true, 0, false),
            ]
        );
    }

    #[test]
    fn test_moved_member_carries_its_subtree() {
        let mut doc = build("<r><item><k>1</k></item><sep/><item><k>2</k><k>3</k></item></r>");
        analyze(&mut doc).unwrap();

        let names: Vec<&str> = doc.preorder().map(|id| doc.element(id).name).collect();
        assert_eq!(names, vec!["r", "item", "k", "item", "k", "k", "sep"]);

        let second = doc.children(top(&doc)).nth(1).unwrap();
        assert_eq!(
            annotations(&doc, second),
            vec![row("k", 1, false, 1, false), row("k", 2, true, 2, true)]
        );
    }

    #[test]
    fn test_top_level_elements_are_grouped_too() {
        let mut doc = build("<a>1</a><b/><a>2</a>");
        let stats = analyze(&mut doc).unwrap();
        assert_eq!(stats.relocations, 1);
        assert_eq!(
            annotations(&doc, doc.root()),
            vec![
                row("a", 1, false, 1, false),
                row("a", 2, false, 2, true),
                row("b", 3, true, 0, false),
            ]
        );
    }

    #[test]
    fn test_second_analysis_moves_nothing() {
        let mut doc = build("<a><b/><c/><b/><d/><c/><b/></a>");
        let first = analyze(&mut doc).unwrap();
        assert!(first.relocations > 0);
        let before = annotations(&doc, top(&doc));

        let second = analyze(&mut doc).unwrap();
        assert_eq!(second.relocations, 0);
        assert_eq!(second.array_groups, first.array_groups);
        assert_eq!(annotations(&doc, top(&doc)), before);
    }

    #[test]
    fn test_empty_document() {
        let mut doc = build("");
        assert_eq!(analyze(&mut doc).unwrap(), AnalysisStats::default());
    }
}

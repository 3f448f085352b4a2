//! Element tree produced by the scanner and annotated by the analyzer.
//!
//! Design notes:
//! - Elements live in an `indextree::Arena`; each element owns an explicit ordered child
//!   list, so array grouping is a sibling move rather than pointer surgery.
//! - A synthetic root (empty name, depth 0) heads the tree. Top-level XML elements are its
//!   children, so a document with several top-level elements needs no special casing.
//! - Names are borrowed from the input text; the tree cannot outlive the input.

use crate::model::value::{Attribute, Value};
use indextree::{Arena, NodeId};
use std::io::{self, Write};

/// Identifier for an element stored in a [`Document`].
pub type ElementId = NodeId;

/// How an element renders in JSON, derived from what it ended up containing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// No attributes, no text and no children.
    Null,
    /// A single text run and nothing else.
    Scalar,
    /// Anything with attributes, children or several text runs.
    Object,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element<'a> {
    pub name: &'a str,
    pub depth: usize,
    pub attributes: Vec<Attribute<'a>>,
    pub values: Vec<Value<'a>>,
    pub has_children: bool,
    /// 1-based position among the parent's children, after array reordering.
    pub sibling_index: usize,
    pub is_last_sibling: bool,
    /// 0 when the name is unique among the siblings, else the position inside its group.
    pub array_rank: usize,
    pub is_array_end: bool,
}

impl<'a> Element<'a> {
    pub fn new(name: &'a str, depth: usize) -> Self {
        Element {
            name,
            depth,
            attributes: Vec::new(),
            values: Vec::new(),
            has_children: false,
            sibling_index: 0,
            is_last_sibling: false,
            array_rank: 0,
            is_array_end: false,
        }
    }

    pub fn shape(&self) -> Shape {
        match (
            self.attributes.is_empty(),
            self.values.len(),
            self.has_children,
        ) {
            (true, 0, false) => Shape::Null,
            (true, 1, false) => Shape::Scalar,
            _ => Shape::Object,
        }
    }

    pub fn is_array_member(&self) -> bool {
        self.array_rank > 0
    }
}

#[derive(Debug, Clone)]
pub struct Document<'a> {
    arena: Arena<Element<'a>>,
    root: ElementId,
}

impl<'a> Document<'a> {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let mut head = Element::new("", 0);
        head.is_last_sibling = true;
        let root = arena.new_node(head);
        Document { arena, root }
    }

    /// The synthetic root. It is never rendered as a member itself.
    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn arena(&self) -> &Arena<Element<'a>> {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut Arena<Element<'a>> {
        &mut self.arena
    }

    pub fn element(&self, id: ElementId) -> &Element<'a> {
        self.arena[id].get()
    }

    pub fn element_mut(&mut self, id: ElementId) -> &mut Element<'a> {
        self.arena[id].get_mut()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.arena[id].parent()
    }

    pub fn children(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        id.children(&self.arena)
    }

    /// Append a new element as the last child of `parent`, marking the parent as such.
    pub fn append_element(&mut self, parent: ElementId, name: &'a str) -> ElementId {
        let depth = self.element(parent).depth + 1;
        let id = self.arena.new_node(Element::new(name, depth));
        parent.append(id, &mut self.arena);
        self.element_mut(parent).has_children = true;
        id
    }

    /// Every element except the synthetic root, parents before children and siblings in
    /// order.
    pub fn preorder(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.root.descendants(&self.arena).skip(1)
    }

    /// Number of elements, excluding the synthetic root.
    pub fn len(&self) -> usize {
        self.preorder().count()
    }

    pub fn is_empty(&self) -> bool {
        !self.element(self.root).has_children
    }

    /// Prints the analyzed annotations of every element in preorder.
    pub fn write_debug_tree<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for id in self.preorder() {
            let element = self.element(id);
            writeln!(out, "{}", element.name)?;

            if let Some(parent) = self.parent(id).filter(|&p| p != self.root) {
                writeln!(out, "  Parent = {}", self.element(parent).name)?;
            }

            writeln!(out, "  depth = {}", element.depth)?;
            writeln!(out, "  has_children = {}", element.has_children)?;
            writeln!(out, "  sibling_index = {}", element.sibling_index)?;
            writeln!(out, "  is_last_sibling = {}", element.is_last_sibling)?;
            writeln!(out, "  array_rank = {}", element.array_rank)?;
            writeln!(out, "  is_array_end = {}", element.is_array_end)?;

            for attribute in &element.attributes {
                writeln!(out, "  @{}={}", attribute.name, attribute.value)?;
            }
            for value in &element.values {
                writeln!(out, "  #text={}", value)?;
            }
        }
        Ok(())
    }
}

impl Default for Document<'_> {
    fn default() -> Self {
        Document::new()
    }
}

//! Generic traversal helpers over a parsed DOM tree
//!
//! Every walk is depth-first pre-order: a node is visited before its
//! children, and children are visited left to right. The tree is borrowed
//! read-only; absence is always reported as `None`/`false`, never an error.

use ego_tree::NodeRef;
use scraper::Node;
use std::ops::ControlFlow;

/// A borrowed node of a parsed document
pub type DomNode<'a> = NodeRef<'a, Node>;

/// Visits `node` and all of its descendants in document order
///
/// The visitor stops the walk early by returning `ControlFlow::Break`;
/// the returned value tells whether that happened.
pub fn visit_all<'a, F>(node: DomNode<'a>, mut visitor: F) -> ControlFlow<()>
where
    F: FnMut(DomNode<'a>) -> ControlFlow<()>,
{
    // `descendants` yields the node itself first, then its subtree in pre-order
    for current in node.descendants() {
        if visitor(current).is_break() {
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}

/// Returns the first node (in document order) matching `predicate`
pub fn find_first<'a, P>(node: DomNode<'a>, mut predicate: P) -> Option<DomNode<'a>>
where
    P: FnMut(DomNode<'a>) -> bool,
{
    let mut found = None;
    let _ = visit_all(node, |current| {
        if predicate(current) {
            found = Some(current);
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    found
}

/// Returns true as soon as any node matches `predicate`
pub fn any<'a, P>(node: DomNode<'a>, predicate: P) -> bool
where
    P: FnMut(DomNode<'a>) -> bool,
{
    find_first(node, predicate).is_some()
}

/// Tag name of an element node, `None` for every other node kind
pub fn element_name<'a>(node: DomNode<'a>) -> Option<&'a str> {
    node.value().as_element().map(|element| element.name())
}

/// Returns true if `node` is an element with the given tag name
pub fn is_element(node: DomNode<'_>, tag: &str) -> bool {
    element_name(node) == Some(tag)
}

/// Looks up an attribute value on an element node
pub fn attribute<'a>(node: DomNode<'a>, key: &str) -> Option<&'a str> {
    node.value().as_element()?.attr(key)
}

/// Concatenated text of every text node under `node`
pub fn text_content(node: DomNode<'_>) -> String {
    let mut text = String::new();
    let _ = visit_all(node, |current| {
        if let Some(chunk) = current.value().as_text() {
            text.push_str(chunk);
        }
        ControlFlow::Continue(())
    });
    text
}

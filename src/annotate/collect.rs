//! This module collects the deck's bibliography entries into a lookup table.
//!
//! The deck's references container holds one entry per cited work, each with
//! a unique id. The table maps those ids to detached deep copies of the
//! entries, so the originals keep rendering at the end of the deck no matter
//! what the slide pass does with the copies.

use crate::config::MarkupConfig;
use crate::dom::{Dom, NodeId};
use slog::debug;
use std::collections::HashMap;

/// The reference lookup table. Built once per pass, read-only afterward.
pub struct RefTable {
    entries: HashMap<String, NodeId>,
}

impl RefTable {
    fn new() -> RefTable {
        RefTable {
            entries: HashMap::new(),
        }
    }

    fn insert(&mut self, id: String, prototype: NodeId) {
        self.entries.insert(id, prototype);
    }

    /// The detached prototype for a reference id, if one was collected.
    pub fn resolve(&self, ref_id: &str) -> Option<NodeId> {
        self.entries.get(ref_id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the reference lookup table from the deck's references container.
///
/// Returns `None` when the deck has no references container, which makes the
/// whole feature a no-op rather than an error. Entries without an id are
/// ignored; entries sharing an id are last-write-wins.
pub fn reference_table(deck: &mut Dom, markup: &MarkupConfig) -> Option<RefTable> {
    let container = deck
        .descendants(Dom::ROOT)
        .into_iter()
        .find(|&n| {
            deck.element(n)
                .map_or(false, |e| e.attr("id") == Some(markup.refs_id))
        })?;

    debug!(slog_scope::logger(), "Collecting reference entries...");

    let entries: Vec<(String, NodeId)> = deck
        .descendants(container)
        .into_iter()
        .filter_map(|n| {
            let element = deck.element(n)?;
            if !element.has_class(markup.entry_class) {
                return None;
            }
            element
                .attr("id")
                .filter(|id| !id.is_empty())
                .map(|id| (id.to_string(), n))
        })
        .collect();

    let mut table = RefTable::new();
    for (id, entry) in entries {
        let prototype = deck.deep_clone(entry);
        table.insert(id, prototype);
    }

    debug!(
        slog_scope::logger(),
        "Collected {} reference entries.",
        table.len()
    );

    Some(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeData;

    fn markup() -> MarkupConfig<'static> {
        MarkupConfig::new("refs", "csl-entry", "slide-references", 2)
    }

    #[test]
    fn builds_table_from_entries() {
        let mut deck = Dom::parse(
            "<div id=\"refs\"><div id=\"ref-a\" class=\"csl-entry\">A</div><div id=\"ref-b\" class=\"csl-entry\">B</div><div class=\"csl-entry\">no id</div></div>",
        )
        .unwrap();
        let table = reference_table(&mut deck, &markup()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.resolve("ref-a").is_some());
        assert!(table.resolve("ref-b").is_some());
        assert!(table.resolve("ref-c").is_none());
    }

    #[test]
    fn missing_container_is_none() {
        let mut deck = Dom::parse("<div id=\"other\"></div>").unwrap();
        assert!(reference_table(&mut deck, &markup()).is_none());
    }

    #[test]
    fn empty_container_is_empty_table() {
        let mut deck = Dom::parse("<div id=\"refs\"></div>").unwrap();
        let table = reference_table(&mut deck, &markup()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn duplicate_ids_are_last_write_wins() {
        let mut deck = Dom::parse(
            "<div id=\"refs\"><div id=\"ref-a\" class=\"csl-entry\">First</div><div id=\"ref-a\" class=\"csl-entry\">Second</div></div>",
        )
        .unwrap();
        let table = reference_table(&mut deck, &markup()).unwrap();
        assert_eq!(table.len(), 1);

        let prototype = table.resolve("ref-a").unwrap();
        let text = deck.node(prototype).children[0];
        match &deck.node(text).data {
            NodeData::Text(t) => assert_eq!(t, "Second"),
            other => panic!("expected a text child, got {:?}", other),
        }
    }

    #[test]
    fn prototypes_are_detached_copies() {
        let mut deck =
            Dom::parse("<div id=\"refs\"><div id=\"ref-a\" class=\"csl-entry\">A</div></div>")
                .unwrap();
        let before = deck.serialize();
        let table = reference_table(&mut deck, &markup()).unwrap();
        assert!(deck.node(table.resolve("ref-a").unwrap()).parent.is_none());
        // Collection never mutates the source container.
        assert_eq!(deck.serialize(), before);
    }
}

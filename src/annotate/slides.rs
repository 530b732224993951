//! This module attaches collected references to the slides that cite them.
//!
//! Only leaf slides are annotated. A marker is attributed to the slide that
//! is its nearest enclosing section, so markers inside a nested slide never
//! leak onto the slide that groups them.

use super::collect::RefTable;
use super::REF_PREFIX;
use crate::config::MarkupConfig;
use crate::dom::{Dom, NodeId};
use crate::report::Summary;
use lazy_static::lazy_static;
use regex::Regex;
use slog::{debug, trace};

lazy_static! {
    /// Regex for splitting a marker's citation-key list
    static ref CITE_KEYS: Regex = Regex::new(r"\s+").unwrap();
}

/// Annotate every leaf slide that cites a collected reference.
pub fn annotate_slides(deck: &mut Dom, refs: &RefTable, markup: &MarkupConfig) -> Summary {
    debug!(slog_scope::logger(), "Annotating slides...");

    let mut summary = Summary::default();
    let slide_class = format!("level{}", markup.slide_level);

    let slides: Vec<NodeId> = deck
        .descendants(Dom::ROOT)
        .into_iter()
        .filter(|&n| {
            deck.element(n)
                .map_or(false, |e| e.name == "section" && e.has_class(&slide_class))
        })
        .collect();

    for slide in slides {
        // A slide holding nested sections is a grouping slide, not content.
        // The check is structural, so markup before a nested section still
        // does not make the parent a content slide.
        if deck
            .descendants(slide)
            .into_iter()
            .any(|n| deck.element(n).map_or(false, |e| e.name == "section"))
        {
            trace!(slog_scope::logger(), "Skipping grouping slide");
            continue;
        }

        // A container left behind by an earlier run is replaced, not kept,
        // so running the tool over its own output stays idempotent.
        let stale: Vec<NodeId> = deck
            .descendants(slide)
            .into_iter()
            .filter(|&n| {
                deck.element(n)
                    .map_or(false, |e| e.has_class(markup.container_class))
            })
            .collect();
        for container in stale {
            deck.detach(container);
        }

        // Citation markers belonging directly to this slide. The key lists
        // are copied out so the tree can be edited below.
        let key_lists: Vec<String> = deck
            .descendants(slide)
            .into_iter()
            .filter(|&n| {
                deck.element(n).map_or(false, |e| {
                    e.has_class("citation") && e.attr("data-cites").is_some()
                })
            })
            .filter(|&n| deck.nearest_ancestor(n, "section") == Some(slide))
            .filter_map(|n| {
                deck.element(n)
                    .and_then(|e| e.attr("data-cites"))
                    .map(str::to_string)
            })
            .collect();
        if key_lists.is_empty() {
            continue;
        }

        // Resolve the keys against the table, keeping first-encounter order
        // and collapsing repeat citations. Keys with no entry are dropped.
        let mut cited: Vec<(String, NodeId)> = Vec::new();
        for list in &key_lists {
            for key in CITE_KEYS.split(list.trim()).filter(|k| !k.is_empty()) {
                let ref_id = format!("{}{}", REF_PREFIX, key);
                match refs.resolve(&ref_id) {
                    Some(prototype) => {
                        if !cited.iter().any(|(id, _)| id == &ref_id) {
                            cited.push((ref_id, prototype));
                        }
                    }
                    None => {
                        debug!(slog_scope::logger(), "No entry for citation key {}", key);
                        if !summary.unresolved_keys.iter().any(|k| k == key) {
                            summary.unresolved_keys.push(key.to_string());
                        }
                    }
                }
            }
        }
        if cited.is_empty() {
            continue;
        }

        // One container per slide, holding a fresh copy of each entry.
        let container = deck.create_element(
            "div",
            vec![("class".to_string(), markup.container_class.to_string())],
        );
        for (_, prototype) in &cited {
            let copy = deck.deep_clone(*prototype);
            deck.append_child(container, copy);
        }

        // Below the slide's footnotes when it has any, otherwise at the end.
        let footnotes = deck
            .descendants(slide)
            .into_iter()
            .find(|&n| deck.element(n).map_or(false, |e| e.name == "aside"));
        match footnotes {
            Some(aside) => deck.insert_after(aside, container),
            None => deck.append_child(slide, container),
        }

        summary.slides_annotated += 1;
        summary.references_attached += cited.len();
    }

    debug!(
        slog_scope::logger(),
        "Annotated {} slides with {} references.",
        summary.slides_annotated,
        summary.references_attached
    );

    summary
}

//! The annotation pass.
//!
//! One pass over a parsed deck: collect the bibliography entries from the
//! references container into a lookup table, then walk the slides and attach
//! a copy of each cited entry to the slide citing it. The original entries
//! are never moved or edited; they keep rendering at the end of the deck.

mod collect;
mod slides;

use crate::config::MarkupConfig;
use crate::dom::Dom;
use crate::report::Summary;
use slog::{debug, o};

/// Reference ids are the citation key behind a fixed prefix.
pub(crate) const REF_PREFIX: &str = "ref-";

/// Run the annotation pass over a deck.
///
/// A deck without a references container is left untouched; that is the
/// feature not applying, not an error.
pub fn annotate(deck: &mut Dom, markup: &MarkupConfig) -> Summary {
    debug!(slog_scope::logger(), "Starting annotation pass...");

    // Build the lookup table
    let table = match slog_scope::scope(
        &slog_scope::logger().new(o!("fn" => "reference_table()")),
        || collect::reference_table(deck, markup),
    ) {
        Some(t) => t,
        None => {
            debug!(
                slog_scope::logger(),
                "No references container; deck left untouched."
            );
            return Summary::default();
        }
    };

    // Annotate the slides from the table
    let summary = slog_scope::scope(
        &slog_scope::logger().new(o!("fn" => "annotate_slides()")),
        || slides::annotate_slides(deck, &table, markup),
    );

    debug!(slog_scope::logger(), "Annotation pass completed.");

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markup() -> MarkupConfig<'static> {
        MarkupConfig::new("refs", "csl-entry", "slide-references", 2)
    }

    fn annotate_deck(html: &str) -> (String, Summary) {
        let mut deck = Dom::parse(html).unwrap();
        let summary = annotate(&mut deck, &markup());
        (deck.serialize(), summary)
    }

    const DECK: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Annotation Test Deck</title>
</head>
<body>
<div class="reveal">
<div class="slides">
<section id="opening" class="level2">
<h2>Opening</h2>
<p>A claim <span class="citation" data-cites="alpha">[1]</span> and one
without an entry <span class="citation" data-cites="gamma">[3]</span>.</p>
</section>
<section id="grouped" class="level2">
<h2>Grouped</h2>
<section id="inner" class="level2">
<p>Nested claim <span class="citation" data-cites="beta">[2]</span>.</p>
</section>
</section>
<section id="noted" class="level2">
<h2>Noted</h2>
<p>Both sources <span class="citation" data-cites="alpha beta">[1, 2]</span> and
one again <span class="citation" data-cites="alpha">[1]</span>.</p>
<aside class="footnotes"><p>A footnote.</p></aside>
</section>
<section id="endmatter" class="level2">
<h2>References</h2>
<div id="refs" class="references csl-bib-body">
<div id="ref-alpha" class="csl-entry">Author A, 2020.</div>
<div id="ref-beta" class="csl-entry">Author B, 2021.</div>
</div>
</section>
</div>
</div>
</body>
</html>
"#;

    mod without_references_container {
        use super::*;

        const BARE_DECK: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="reveal">
<div class="slides">
<section id="only" class="level2">
<p>A claim <span class="citation" data-cites="alpha">[1]</span>.</p>
</section>
</div>
</div>
</body>
</html>
"#;

        #[test]
        fn deck_is_untouched() {
            let (out, summary) = annotate_deck(BARE_DECK);
            assert_eq!(out, BARE_DECK);
            assert_eq!(summary.slides_annotated, 0);
            assert_eq!(summary.references_attached, 0);
            assert!(summary.unresolved_keys.is_empty());
        }
    }

    mod leaf_slides {
        use super::*;

        #[test]
        fn cited_leaf_gets_one_container() {
            let (out, _) = annotate_deck(DECK);
            assert!(out.contains(
                "</p>\n<div class=\"slide-references\"><div id=\"ref-alpha\" class=\"csl-entry\">Author A, 2020.</div></div></section>"
            ));
        }

        #[test]
        fn uncited_leaf_gets_none() {
            // The references slide itself is a leaf with no markers.
            let (out, _) = annotate_deck(DECK);
            assert_eq!(out.matches("<div class=\"slide-references\">").count(), 3);
        }

        #[test]
        fn annotation_counts() {
            let (_, summary) = annotate_deck(DECK);
            assert_eq!(summary.slides_annotated, 3);
            assert_eq!(summary.references_attached, 4);
        }
    }

    mod nested_slides {
        use super::*;

        #[test]
        fn grouping_slide_is_not_annotated() {
            let (out, _) = annotate_deck(DECK);
            // Nothing between the grouping slide's heading and the nested
            // slide it holds.
            assert!(out.contains("<h2>Grouped</h2>\n<section id=\"inner\" class=\"level2\">"));
            // And nothing after the nested slide closes.
            assert!(out.contains("</section>\n</section>\n<section id=\"noted\""));
        }

        #[test]
        fn nested_marker_annotates_the_nested_slide() {
            let (out, _) = annotate_deck(DECK);
            assert!(out.contains(
                "Nested claim <span class=\"citation\" data-cites=\"beta\">[2]</span>.</p>\n<div class=\"slide-references\"><div id=\"ref-beta\" class=\"csl-entry\">Author B, 2021.</div></div></section>"
            ));
        }
    }

    mod key_resolution {
        use super::*;

        #[test]
        fn unresolvable_key_is_dropped_silently() {
            let (out, summary) = annotate_deck(DECK);
            assert!(!out.contains("ref-gamma"));
            assert_eq!(summary.unresolved_keys, vec!["gamma".to_string()]);
        }

        #[test]
        fn repeat_citations_collapse_to_one_copy() {
            let (out, _) = annotate_deck(DECK);
            // The noted slide cites alpha twice but its container holds the
            // pair of entries exactly once, in first-encounter order.
            assert!(out.contains(
                "</aside><div class=\"slide-references\"><div id=\"ref-alpha\" class=\"csl-entry\">Author A, 2020.</div><div id=\"ref-beta\" class=\"csl-entry\">Author B, 2021.</div></div>\n</section>"
            ));
        }
    }

    mod source_entries {
        use super::*;

        #[test]
        fn references_container_is_never_mutated() {
            let (out, _) = annotate_deck(DECK);
            assert!(out.contains(
                "<div id=\"refs\" class=\"references csl-bib-body\">\n<div id=\"ref-alpha\" class=\"csl-entry\">Author A, 2020.</div>\n<div id=\"ref-beta\" class=\"csl-entry\">Author B, 2021.</div>\n</div>"
            ));
        }

        #[test]
        fn each_attachment_is_an_independent_copy() {
            let (out, _) = annotate_deck(DECK);
            // alpha renders three times: the original plus two attachments.
            assert_eq!(out.matches("<div id=\"ref-alpha\"").count(), 3);
            assert_eq!(out.matches("<div id=\"ref-beta\"").count(), 3);
        }
    }

    mod repeat_invocation {
        use super::*;

        #[test]
        fn second_pass_is_idempotent() {
            let (once, first) = annotate_deck(DECK);
            let (twice, second) = annotate_deck(&once);
            assert_eq!(twice, once);
            assert_eq!(second.slides_annotated, first.slides_annotated);
            assert_eq!(second.references_attached, first.references_attached);
        }
    }

    mod duplicate_entry_ids {
        use super::*;

        const DUPLICATED: &str = r#"<section id="one" class="level2">
<p><span class="citation" data-cites="alpha">[1]</span></p>
</section>
<section id="endmatter" class="level2">
<div id="refs">
<div id="ref-alpha" class="csl-entry">First rendering.</div>
<div id="ref-alpha" class="csl-entry">Second rendering.</div>
</div>
</section>
"#;

        #[test]
        fn later_entry_wins() {
            let (out, _) = annotate_deck(DUPLICATED);
            assert!(out.contains(
                "<div class=\"slide-references\"><div id=\"ref-alpha\" class=\"csl-entry\">Second rendering.</div></div>"
            ));
        }
    }
}

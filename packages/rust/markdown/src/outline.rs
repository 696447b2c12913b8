//! Course outline (`index.md`) parsing.
//!
//! The first top-level list of the outline is authoritative:
//!
//! ```text
//! - intro.md
//! - loops
//!     - for.md
//!     - while.md
//! - functions.md
//! ```
//!
//! Item text naming a markdown file becomes a leaf reference. A nested list
//! becomes the children of the text that precedes it in the same item.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use seeder_shared::ExerciseFileRef;
use tracing::warn;

/// Suffix marking a text token as an exercise file reference.
const MARKDOWN_EXT: &str = ".md";

/// Accumulates one top-level list item.
#[derive(Default)]
struct ItemScan {
    /// Text seen since the last flush.
    text: String,
    /// The last non-empty text token of this item.
    preceding: Option<String>,
    /// Children of the nested list currently open.
    children: Vec<String>,
    /// Text of the nested item currently open.
    child_text: String,
}

impl ItemScan {
    /// Close the pending text token, recording a leaf when it names a file.
    fn flush_text(&mut self, refs: &mut Vec<ExerciseFileRef>) {
        let text = std::mem::take(&mut self.text);
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if text.ends_with(MARKDOWN_EXT) {
            refs.push(ExerciseFileRef::leaf(text));
        }
        self.preceding = Some(text.to_string());
    }

    /// Close a nested list as the child set of the preceding text.
    fn flush_children(&mut self, refs: &mut Vec<ExerciseFileRef>) {
        let children = std::mem::take(&mut self.children);
        match self.preceding.clone() {
            Some(file_name) => refs.push(ExerciseFileRef::group(file_name, children)),
            None => warn!(?children, "nested outline list has no parent entry, ignoring"),
        }
    }
}

/// Parse an outline document into exercise file references, in document order.
pub fn parse_outline(content: &str) -> Vec<ExerciseFileRef> {
    let mut refs = Vec::new();
    let mut list_depth = 0usize;
    let mut item = ItemScan::default();

    for event in Parser::new(content) {
        match event {
            Event::Start(Tag::List(_)) => {
                list_depth += 1;
                if list_depth == 2 {
                    item.flush_text(&mut refs);
                    item.children.clear();
                }
            }
            Event::End(TagEnd::List(_)) => {
                if list_depth == 2 {
                    item.flush_children(&mut refs);
                }
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    break;
                }
            }
            Event::Start(Tag::Item) => match list_depth {
                1 => item = ItemScan::default(),
                2 => item.child_text.clear(),
                _ => {}
            },
            Event::End(TagEnd::Item) => match list_depth {
                1 => item.flush_text(&mut refs),
                2 => {
                    let child = std::mem::take(&mut item.child_text);
                    let child = child.trim();
                    if !child.is_empty() {
                        item.children.push(child.to_string());
                    }
                }
                _ => {}
            },
            Event::Text(text) | Event::Code(text) => match list_depth {
                1 => item.text.push_str(&text),
                2 => item.child_text.push_str(&text),
                _ => {}
            },
            Event::SoftBreak => match list_depth {
                1 => item.text.push(' '),
                2 => item.child_text.push(' '),
                _ => {}
            },
            _ => {}
        }
    }

    refs
}

//! Markdown parsing for curriculum content.
//!
//! - [`parse_descriptor`] reads a course descriptor (`info.md`)
//! - [`parse_outline`] reads a course outline (`index.md`)
//! - [`classify`] turns one exercise document into ordered [`ContentBlock`]s

mod descriptor;
mod faq;
mod outline;
mod video;

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use tracing::{instrument, trace};

use seeder_shared::{ContentBlock, CurriculumConfig, FAQ_LANGUAGE, FaqMode, Result};

pub use descriptor::parse_descriptor;
pub use faq::parse_faq;
pub use outline::parse_outline;
pub use video::youtube_id;

/// Paragraph marker for an embedded video.
const YOUTUBE_MARKER: &str = "@[youtube]";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Options for classifying an exercise document.
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    /// Fence language emitted as a code block (e.g. `python`).
    pub code_language: String,
    /// Fence language holding exercise metadata.
    pub meta_language: String,
    pub faq_mode: FaqMode,
}

impl From<&CurriculumConfig> for ClassifyOptions {
    fn from(config: &CurriculumConfig) -> Self {
        Self {
            code_language: config.code_language.clone(),
            meta_language: config.meta_language.clone(),
            faq_mode: config.faq_mode,
        }
    }
}

/// Metadata from an exercise's meta fence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseMeta {
    pub name: Option<String>,
    pub submission_type: Option<String>,
}

impl ExerciseMeta {
    /// Read `name:` and `submission_type:` lines from a meta fence.
    fn parse(text: &str) -> Self {
        let mut meta = Self::default();
        for line in text.lines() {
            if let Some(name) = line.strip_prefix("name: ") {
                meta.name = Some(name.trim().to_string());
            } else if let Some(kind) = line.strip_prefix("submission_type: ") {
                meta.submission_type = Some(kind.trim().to_string());
            }
        }
        meta
    }
}

/// Result of classifying one exercise document.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedDocument {
    /// Non-empty blocks in document order.
    pub blocks: Vec<ContentBlock>,
    /// The last meta fence in the document, if any.
    pub meta: Option<ExerciseMeta>,
}

// ---------------------------------------------------------------------------
// Block sink
// ---------------------------------------------------------------------------

/// Collects blocks while holding back consecutive prose.
///
/// Every special block goes through [`BlockSink::emit`], which flushes the
/// pending prose first.
#[derive(Default)]
struct BlockSink {
    pending: String,
    blocks: Vec<ContentBlock>,
}

impl BlockSink {
    fn prose(&mut self, raw: &str) {
        self.pending.push_str(raw);
        self.pending.push(' ');
    }

    fn flush(&mut self) {
        let prose = std::mem::take(&mut self.pending);
        self.blocks.push(ContentBlock::Markdown(prose));
    }

    fn emit(&mut self, block: ContentBlock) {
        self.flush();
        self.blocks.push(block);
    }

    fn finish(mut self) -> Vec<ContentBlock> {
        if !self.pending.is_empty() {
            self.flush();
        }
        self.blocks.retain(|block| !block.is_empty());
        self.blocks
    }
}

/// A top-level block whose events are still arriving.
enum OpenBlock {
    /// Heading or list, kept verbatim.
    Prose(Range<usize>),
    Paragraph {
        range: Range<usize>,
        href: Option<String>,
    },
    Fence {
        lang: String,
        text: String,
    },
    Ignored,
}

impl OpenBlock {
    fn open(tag: &Tag<'_>, range: Range<usize>) -> Self {
        match tag {
            Tag::Paragraph => Self::Paragraph { range, href: None },
            Tag::Heading { .. } | Tag::List(_) => Self::Prose(range),
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => Self::Fence {
                lang: info.split_whitespace().next().unwrap_or_default().to_string(),
                text: String::new(),
            },
            _ => Self::Ignored,
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Classify an exercise document into ordered content blocks.
///
/// Paragraphs, lists and headings accumulate as prose. A code fence in the
/// target language, a `@[youtube](...)` paragraph or a `faq` fence flushes
/// the prose as a `markdown` block and then emits its own block. Empty
/// markdown and youtube blocks are dropped at the end.
#[instrument(skip_all, fields(len = content.len()))]
pub fn classify(content: &str, opts: &ClassifyOptions) -> Result<ClassifiedDocument> {
    let mut sink = BlockSink::default();
    let mut meta = None;
    let mut depth = 0usize;
    let mut current: Option<OpenBlock> = None;

    for (event, range) in Parser::new_ext(content, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(tag) => {
                if depth == 0 {
                    current = Some(OpenBlock::open(&tag, range));
                } else if let Tag::Link { dest_url, .. } = &tag {
                    // The embed link is the first link of the paragraph.
                    if let Some(OpenBlock::Paragraph { href, .. }) = current.as_mut() {
                        href.get_or_insert_with(|| dest_url.to_string());
                    }
                }
                depth += 1;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(block) = current.take() {
                        close_block(block, content, opts, &mut sink, &mut meta)?;
                    }
                }
            }
            Event::Text(text) => {
                if let Some(OpenBlock::Fence { text: fence, .. }) = current.as_mut() {
                    fence.push_str(&text);
                }
            }
            _ => {}
        }
    }

    Ok(ClassifiedDocument {
        blocks: sink.finish(),
        meta,
    })
}

/// Route a finished top-level block into the sink.
fn close_block(
    block: OpenBlock,
    content: &str,
    opts: &ClassifyOptions,
    sink: &mut BlockSink,
    meta: &mut Option<ExerciseMeta>,
) -> Result<()> {
    match block {
        OpenBlock::Prose(range) => sink.prose(&content[range]),
        OpenBlock::Paragraph { range, href } => {
            let raw = &content[range];
            if raw.contains(YOUTUBE_MARKER) {
                let id = href.as_deref().map(youtube_id).unwrap_or_default();
                sink.emit(ContentBlock::Youtube(id));
            } else {
                sink.prose(raw);
            }
        }
        OpenBlock::Fence { lang, text } => {
            let text = text.strip_suffix('\n').unwrap_or(&text);
            let mut matched = false;

            if lang == opts.code_language {
                matched = true;
                sink.emit(ContentBlock::Code {
                    language: lang.clone(),
                    code: text.to_string(),
                });
            }
            if lang == FAQ_LANGUAGE {
                matched = true;
                sink.emit(ContentBlock::Faq(parse_faq(text, opts.faq_mode)?));
            }
            if lang == opts.meta_language {
                matched = true;
                *meta = Some(ExerciseMeta::parse(text));
            }

            if !matched {
                trace!(%lang, "ignoring code fence");
            }
        }
        OpenBlock::Ignored => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

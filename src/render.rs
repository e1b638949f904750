//! Message rendering pipeline
//!
//! A turn's text is parsed as `CommonMark` and folded into a small tree of
//! [`Block`]s and [`Inline`]s. Everything the model writes is untrusted:
//! raw HTML is kept as literal text, links with unexpected schemes lose
//! their target, and control characters are dropped so nothing can drive
//! the terminal.

mod highlight;
mod terminal;

pub use highlight::Highlighter;
pub use terminal::paint;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Rendered form of one turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Inline>),
    Heading { level: u8, content: Vec<Inline> },
    List { start: Option<u64>, items: Vec<Vec<Block>> },
    Quote(Vec<Block>),
    Code(CodeBlock),
    Rule,
}

/// A fenced or indented code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Language tag from the fence info string, if it is a plain word
    pub language: Option<String>,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Code(String),
    Link {
        /// `None` when the target was dropped as unsafe
        url: Option<String>,
        content: Vec<Inline>,
    },
    SoftBreak,
    HardBreak,
}

impl Rendered {
    /// All code blocks, in document order
    pub fn code_blocks(&self) -> Vec<&CodeBlock> {
        fn walk<'a>(blocks: &'a [Block], out: &mut Vec<&'a CodeBlock>) {
            for block in blocks {
                match block {
                    Block::Code(code) => out.push(code),
                    Block::Quote(inner) => walk(inner, out),
                    Block::List { items, .. } => {
                        for item in items {
                            walk(item, out);
                        }
                    }
                    _ => {}
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.blocks, &mut out);
        out
    }
}

/// Render a turn's text. Pure: the same text always yields the same tree.
pub fn render(text: &str) -> Rendered {
    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(text, Options::empty()) {
        builder.event(event);
    }
    builder.finish()
}

// ============================================================
// Tree construction
// ============================================================

enum Container {
    Root,
    Item,
    Quote,
}

enum Span {
    Paragraph,
    Heading(u8),
    Emphasis,
    Strong,
    Link(Option<String>),
    /// Raw HTML block, shown as text
    Raw,
    /// Constructs we don't model; content is spliced into the parent
    Transparent,
}

enum Frame {
    Blocks {
        kind: Container,
        blocks: Vec<Block>,
        /// Inline content not wrapped in a paragraph (tight list items)
        run: Vec<Inline>,
    },
    Inlines {
        kind: Span,
        inlines: Vec<Inline>,
    },
    List {
        start: Option<u64>,
        items: Vec<Vec<Block>>,
    },
    Code {
        language: Option<String>,
        code: String,
    },
}

struct TreeBuilder {
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame::Blocks {
                kind: Container::Root,
                blocks: Vec::new(),
                run: Vec::new(),
            }],
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(Frame::Code { code, .. }) = self.stack.last_mut() {
                    code.push_str(&neutralize(&text));
                } else {
                    self.push_inline(Inline::Text(neutralize(&text)));
                }
            }
            Event::Code(code) => self.push_inline(Inline::Code(neutralize(&code))),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_inline(Inline::Text(neutralize(&html)));
            }
            Event::SoftBreak => self.push_inline(Inline::SoftBreak),
            Event::HardBreak => self.push_inline(Inline::HardBreak),
            Event::Rule => self.push_block(Block::Rule),
            Event::TaskListMarker(done) => {
                self.push_inline(Inline::Text(if done { "[x] " } else { "[ ] " }.to_string()));
            }
            Event::FootnoteReference(label) => {
                self.push_inline(Inline::Text(format!("[^{}]", neutralize(&label))));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => inlines(Span::Paragraph),
            Tag::Heading { level, .. } => inlines(Span::Heading(heading_level(level))),
            Tag::BlockQuote(_) => blocks(Container::Quote),
            Tag::CodeBlock(kind) => Frame::Code {
                language: match kind {
                    CodeBlockKind::Fenced(info) => fence_language(&info),
                    CodeBlockKind::Indented => None,
                },
                code: String::new(),
            },
            Tag::HtmlBlock => inlines(Span::Raw),
            Tag::List(start) => Frame::List {
                start,
                items: Vec::new(),
            },
            Tag::Item => blocks(Container::Item),
            Tag::Emphasis => inlines(Span::Emphasis),
            Tag::Strong => inlines(Span::Strong),
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                inlines(Span::Link(safe_url(&dest_url)))
            }
            _ => inlines(Span::Transparent),
        };
        self.stack.push(frame);
    }

    fn end(&mut self, _tag: TagEnd) {
        // The root frame is only closed by `finish`
        if self.stack.len() < 2 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };

        match frame {
            Frame::Inlines { kind, inlines } => match kind {
                Span::Raw => {
                    let mut inlines = inlines;
                    if let Some(Inline::Text(last)) = inlines.last_mut() {
                        let trimmed_len = last.trim_end_matches('\n').len();
                        last.truncate(trimmed_len);
                    }
                    if !inlines.is_empty() {
                        self.push_block(Block::Paragraph(inlines));
                    }
                }
                Span::Paragraph => {
                    if !inlines.is_empty() {
                        self.push_block(Block::Paragraph(inlines));
                    }
                }
                Span::Heading(level) => self.push_block(Block::Heading {
                    level,
                    content: inlines,
                }),
                Span::Emphasis => self.push_inline(Inline::Emphasis(inlines)),
                Span::Strong => self.push_inline(Inline::Strong(inlines)),
                Span::Link(url) => self.push_inline(Inline::Link {
                    url,
                    content: inlines,
                }),
                Span::Transparent => {
                    for inline in inlines {
                        self.push_inline(inline);
                    }
                }
            },
            Frame::Blocks {
                kind,
                mut blocks,
                run,
            } => {
                flush_run(&mut blocks, run);
                match kind {
                    Container::Item => {
                        if let Some(Frame::List { items, .. }) = self.stack.last_mut() {
                            items.push(blocks);
                        } else {
                            for block in blocks {
                                self.push_block(block);
                            }
                        }
                    }
                    Container::Quote => self.push_block(Block::Quote(blocks)),
                    Container::Root => {}
                }
            }
            Frame::List { start, items } => self.push_block(Block::List { start, items }),
            Frame::Code { language, code } => {
                let code = code.strip_suffix('\n').map(str::to_string).unwrap_or(code);
                self.push_block(Block::Code(CodeBlock { language, code }));
            }
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        match self.stack.last_mut() {
            Some(Frame::Inlines { inlines, .. }) => append_inline(inlines, inline),
            Some(Frame::Blocks { run, .. }) => append_inline(run, inline),
            Some(Frame::Code { code, .. }) => {
                if let Inline::Text(text) = inline {
                    code.push_str(&text);
                }
            }
            Some(Frame::List { items, .. }) => {
                items.push(vec![Block::Paragraph(vec![inline])]);
            }
            None => {}
        }
    }

    fn push_block(&mut self, block: Block) {
        match self.stack.last_mut() {
            Some(Frame::Blocks { blocks, run, .. }) => {
                flush_run(blocks, std::mem::take(run));
                blocks.push(block);
            }
            Some(Frame::List { items, .. }) => items.push(vec![block]),
            // Blocks never nest inside inline spans or code in CommonMark
            _ => {}
        }
    }

    fn finish(mut self) -> Rendered {
        while self.stack.len() > 1 {
            self.end(TagEnd::Paragraph);
        }
        match self.stack.pop() {
            Some(Frame::Blocks {
                mut blocks, run, ..
            }) => {
                flush_run(&mut blocks, run);
                Rendered { blocks }
            }
            _ => Rendered::default(),
        }
    }
}

fn inlines(kind: Span) -> Frame {
    Frame::Inlines {
        kind,
        inlines: Vec::new(),
    }
}

fn blocks(kind: Container) -> Frame {
    Frame::Blocks {
        kind,
        blocks: Vec::new(),
        run: Vec::new(),
    }
}

fn flush_run(blocks: &mut Vec<Block>, run: Vec<Inline>) {
    if !run.is_empty() {
        blocks.push(Block::Paragraph(run));
    }
}

/// Push an inline, merging adjacent text runs
fn append_inline(inlines: &mut Vec<Inline>, inline: Inline) {
    if let (Some(Inline::Text(last)), Inline::Text(text)) = (inlines.last_mut(), &inline) {
        last.push_str(text);
        return;
    }
    inlines.push(inline);
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// First word of the info string. Whether it names a known language is
/// left to the highlighter.
fn fence_language(info: &str) -> Option<String> {
    let word = info.split_whitespace().next()?;
    (!word.chars().any(char::is_control)).then(|| word.to_string())
}

/// Keep only link targets that cannot execute anything
fn safe_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let relative = match url.find(':') {
        None => true,
        Some(colon) => url.find(|c| matches!(c, '/' | '?' | '#')).is_some_and(|i| i < colon),
    };
    let lower = url.to_ascii_lowercase();
    let allowed = ["http:", "https:", "mailto:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme));

    (relative || allowed).then(|| neutralize(url))
}

/// Drop control characters other than newline and tab
fn neutralize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}

//! Terminal output for rendered messages

use super::{Block, CodeBlock, Highlighter, Inline, Rendered};
use crossterm::style::Stylize;

/// Paint a rendered message for a terminal
pub fn paint(rendered: &Rendered, highlighter: &Highlighter) -> String {
    paint_blocks(&rendered.blocks, highlighter)
}

fn paint_blocks(blocks: &[Block], highlighter: &Highlighter) -> String {
    blocks
        .iter()
        .map(|block| paint_block(block, highlighter))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn paint_block(block: &Block, highlighter: &Highlighter) -> String {
    match block {
        Block::Paragraph(inlines) => paint_inlines(inlines),
        Block::Heading { level, content } => {
            let marker = "#".repeat(usize::from(*level));
            format!("{}", format!("{marker} {}", paint_inlines(content)).bold())
        }
        Block::List { start, items } => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let bullet = match start {
                    Some(n) => format!("{}. ", n + i as u64),
                    None => "- ".to_string(),
                };
                let body = paint_blocks(item, highlighter);
                prefix_lines(&body, &bullet, &" ".repeat(bullet.len()))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Quote(inner) => {
            let body = paint_blocks(inner, highlighter);
            prefix_lines(&body, "│ ", "│ ")
        }
        Block::Code(code) => paint_code(code, highlighter),
        Block::Rule => "────────".dark_grey().to_string(),
    }
}

fn paint_code(block: &CodeBlock, highlighter: &Highlighter) -> String {
    let language = block.language.as_deref().unwrap_or_default();
    let fence_open = format!("```{language}").dark_grey().to_string();
    let fence_close = "```".dark_grey().to_string();

    // Unknown or missing language: a plain code block
    let body = block
        .language
        .as_deref()
        .and_then(|lang| highlighter.highlight(lang, &block.code))
        .unwrap_or_else(|| block.code.clone());

    format!("{fence_open}\n{body}\n{fence_close}")
}

fn paint_inlines(inlines: &[Inline]) -> String {
    inlines.iter().map(paint_inline).collect()
}

fn paint_inline(inline: &Inline) -> String {
    match inline {
        Inline::Text(text) => text.clone(),
        Inline::Emphasis(inner) => paint_inlines(inner).italic().to_string(),
        Inline::Strong(inner) => paint_inlines(inner).bold().to_string(),
        Inline::Code(code) => code.as_str().cyan().to_string(),
        Inline::Link { url, content } => {
            let text = paint_inlines(content).underlined().to_string();
            match url {
                Some(url) => format!("{text} <{url}>"),
                None => text,
            }
        }
        Inline::SoftBreak => " ".to_string(),
        Inline::HardBreak => "\n".to_string(),
    }
}

fn prefix_lines(body: &str, first: &str, rest: &str) -> String {
    // Empty list items still show their bullet
    if body.is_empty() {
        return first.trim_end().to_string();
    }
    body.lines()
        .enumerate()
        .map(|(i, line)| {
            let prefix = if i == 0 { first } else { rest };
            format!("{prefix}{line}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

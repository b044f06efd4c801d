//! Markdown-aware document chunking for knowledge base ingestion.
//!
//! Documents are split by markdown headers first, then oversized sections
//! are packed paragraph by paragraph under a soft character limit. Limits
//! are soft: a single paragraph longer than `max_chars` is emitted whole
//! rather than truncated mid-paragraph.

use std::sync::LazyLock;

use regex::Regex;

use crate::store::{ChunkMetadata, DocumentInput};

/// Lines with 1–6 leading `#` characters, a space, then text.
#[allow(clippy::unwrap_used)]
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+.+$").unwrap());

/// Blank-line paragraph boundaries.
#[allow(clippy::unwrap_used)]
static PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Split markdown content into chunks of at most `max_chars` characters
/// (soft limit), keeping header sections together where possible.
///
/// `chunk_index` runs sequentially across the whole call and
/// `total_chunks` is the final count, identical on every chunk.
pub fn chunk_markdown(content: &str, source: &str, max_chars: usize) -> Vec<DocumentInput> {
    let sections = split_by_headers(content);

    let mut chunks = Vec::new();
    for (section_title, section_content) in &sections {
        let full_section = if section_title.is_empty() {
            section_content.trim().to_string()
        } else {
            format!("{section_title}\n{section_content}").trim().to_string()
        };
        if full_section.is_empty() {
            continue;
        }

        let title_text = extract_title_text(section_title);
        if char_len(&full_section) <= max_chars {
            chunks.push((full_section, title_text));
        } else {
            for piece in split_by_paragraphs(&full_section, &title_text, max_chars) {
                chunks.push((piece, title_text.clone()));
            }
        }
    }

    finalize(chunks, source)
}

/// Chunk plain text by paragraphs under the same soft limit, with no
/// header splitting and an empty section title throughout.
pub fn chunk_plain_text(content: &str, source: &str, max_chars: usize) -> Vec<DocumentInput> {
    let chunks = split_by_paragraphs(content, "", max_chars)
        .into_iter()
        .map(|piece| (piece, String::new()))
        .collect();
    finalize(chunks, source)
}

/// Attach metadata: sequential indices and the uniform total count.
fn finalize(chunks: Vec<(String, String)>, source: &str) -> Vec<DocumentInput> {
    let total_chunks = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(chunk_index, (content, section_title))| DocumentInput {
            content,
            metadata: ChunkMetadata {
                source: source.to_string(),
                section_title,
                chunk_index,
                total_chunks,
            },
        })
        .collect()
}

/// Split content into ordered `(header_line, section_body)` pairs.
///
/// Text preceding the first header forms a leading pseudo-section with an
/// empty header; content without any header is a single such section.
fn split_by_headers(content: &str) -> Vec<(String, String)> {
    let mut sections = Vec::new();
    let mut last_end = 0;
    let mut last_header = String::new();

    for m in HEADER_RE.find_iter(content) {
        if m.start() > last_end {
            let section_content = content[last_end..m.start()].trim();
            if !section_content.is_empty() || !last_header.is_empty() {
                sections.push((last_header.clone(), section_content.to_string()));
            }
        }
        last_header = m.as_str().to_string();
        last_end = m.end();
    }

    let remaining = content[last_end..].trim();
    if !remaining.is_empty() || !last_header.is_empty() {
        sections.push((last_header, remaining.to_string()));
    }

    if sections.is_empty() && !content.trim().is_empty() {
        sections.push((String::new(), content.trim().to_string()));
    }

    sections
}

/// Greedily pack blank-line-delimited paragraphs into chunks of at most
/// `max_chars` characters. When a boundary is forced, the new chunk is
/// seeded with the bracketed section title so continuation chunks keep
/// their topical context.
fn split_by_paragraphs(content: &str, title_text: &str, max_chars: usize) -> Vec<String> {
    let paragraphs: Vec<&str> = PARAGRAPH_RE
        .split(content)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if paragraphs.is_empty() {
        let trimmed = content.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for para in paragraphs {
        // The +2 accounts for the "\n\n" join separator.
        if !current.is_empty() && char_len(&current) + char_len(para) + 2 > max_chars {
            chunks.push(std::mem::take(&mut current));
            if title_text.is_empty() {
                current.push_str(para);
            } else {
                current = format!("[{title_text}]\n{para}");
            }
        } else if current.is_empty() {
            current.push_str(para);
        } else {
            current.push_str("\n\n");
            current.push_str(para);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Plain text of a markdown header line ("## Title" → "Title").
fn extract_title_text(header_line: &str) -> String {
    header_line
        .trim_start_matches('#')
        .trim()
        .to_string()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_headers_single_chunk() {
        let chunks = chunk_markdown("Just a short paragraph of text.", "notes.md", 1000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.section_title, "");
        assert_eq!(chunks[0].metadata.chunk_index, 0);
        assert_eq!(chunks[0].metadata.total_chunks, 1);
        assert_eq!(chunks[0].content, "Just a short paragraph of text.");
    }

    #[test]
    fn test_three_headers_three_chunks() {
        let doc = "# First\n\nIntro text.\n\n## Second\n\nMore text.\n\n### Third\n\nFinal text.";
        let chunks = chunk_markdown(doc, "guide.md", 1000);
        assert_eq!(chunks.len(), 3);

        let titles: Vec<&str> = chunks
            .iter()
            .map(|c| c.metadata.section_title.as_str())
            .collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.chunk_index, i);
            assert_eq!(chunk.metadata.total_chunks, 3);
            assert_eq!(chunk.metadata.source, "guide.md");
        }
        assert!(chunks[0].content.starts_with("# First"));
    }

    #[test]
    fn test_leading_text_before_first_header() {
        let doc = "Preamble without a header.\n\n# Section\n\nBody.";
        let chunks = chunk_markdown(doc, "doc.md", 1000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.section_title, "");
        assert_eq!(chunks[0].content, "Preamble without a header.");
        assert_eq!(chunks[1].metadata.section_title, "Section");
    }

    #[test]
    fn test_oversized_section_splits_with_title_prefix() {
        let max_chars = 120;
        let paragraphs: Vec<String> = (0..12)
            .map(|i| format!("Paragraph number {i} with some filler words in it."))
            .collect();
        let doc = format!("# Boss Guide\n\n{}", paragraphs.join("\n\n"));

        let chunks = chunk_markdown(&doc, "boss.md", max_chars);
        assert!(chunks.len() >= 2);

        for chunk in &chunks {
            // Soft limit: nothing exceeds max_chars here because every
            // individual paragraph fits.
            assert!(chunk.content.chars().count() <= max_chars);
            assert_eq!(chunk.metadata.section_title, "Boss Guide");
        }
        for chunk in &chunks[1..] {
            assert!(chunk.content.starts_with("[Boss Guide]\n"));
        }
        let total = chunks.len();
        assert!(chunks.iter().all(|c| c.metadata.total_chunks == total));
    }

    #[test]
    fn test_single_oversized_paragraph_emitted_whole() {
        let long_para = "word ".repeat(100);
        let doc = format!("# Big\n\n{}", long_para.trim());
        let chunks = chunk_markdown(&doc, "big.md", 50);
        // The header fits one chunk boundary decision, but the paragraph
        // itself is never truncated.
        assert!(chunks.iter().any(|c| c.content.chars().count() > 50));
        assert!(chunks.iter().all(|c| !c.content.ends_with(' ')));
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(chunk_markdown("", "empty.md", 1000).is_empty());
        assert!(chunk_markdown("   \n\n  ", "blank.md", 1000).is_empty());
        assert!(chunk_plain_text("", "empty.txt", 1000).is_empty());
        assert!(chunk_plain_text(" \n ", "blank.txt", 1000).is_empty());
    }

    #[test]
    fn test_trailing_header_without_body() {
        let chunks = chunk_markdown("# Lonely Header", "stub.md", 1000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "# Lonely Header");
        assert_eq!(chunks[0].metadata.section_title, "Lonely Header");
    }

    #[test]
    fn test_plain_text_packs_paragraphs() {
        let doc = "First paragraph here.\n\nSecond paragraph here.\n\nThird paragraph here.";
        let chunks = chunk_plain_text(doc, "notes.txt", 50);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert_eq!(chunk.metadata.section_title, "");
            // Plain text continuation chunks carry no bracketed prefix.
            assert!(!chunk.content.starts_with('['));
        }
        let total = chunks.len();
        assert!(chunks.iter().all(|c| c.metadata.total_chunks == total));
    }

    #[test]
    fn test_plain_text_single_chunk_under_limit() {
        let chunks = chunk_plain_text("Tiny note.", "tiny.txt", 1000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Tiny note.");
        assert_eq!(chunks[0].metadata.total_chunks, 1);
    }

    #[test]
    fn test_header_requires_space_after_hashes() {
        // "#NoSpace" is not a header line.
        let chunks = chunk_markdown("#NoSpace\ncontinues here", "odd.md", 1000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.section_title, "");
    }

    #[test]
    fn test_consecutive_headers_keep_order() {
        let doc = "# One\n# Two\n\nBody of two.";
        let chunks = chunk_markdown(doc, "doc.md", 1000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.section_title, "One");
        assert_eq!(chunks[0].content, "# One");
        assert_eq!(chunks[1].metadata.section_title, "Two");
    }
}

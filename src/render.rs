//! Line-oriented renderer for article bodies.
//!
//! Each line is classified on its own: there is no state carried between
//! lines and no nesting. Consecutive list lines stay separate blocks; grouping
//! them is left to whoever lays the blocks out.
//!
//! Text is never escaped. Bodies come from the single trusted author.

use serde::Serialize;

/// One unit of rendered content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Block {
    Heading1(String),
    Heading2(String),
    Heading3(String),
    ListItem(String),
    Paragraph(String),
}

impl Block {
    /// Classify a single line. Blank lines produce no block.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        if let Some(text) = line.strip_prefix("# ") {
            Some(Self::Heading1(text.to_string()))
        } else if let Some(text) = line.strip_prefix("## ") {
            Some(Self::Heading2(text.to_string()))
        } else if let Some(text) = line.strip_prefix("### ") {
            Some(Self::Heading3(text.to_string()))
        } else if let Some(text) = line.strip_prefix("- ") {
            Some(Self::ListItem(text.to_string()))
        } else if line.trim().is_empty() {
            None
        } else {
            Some(Self::Paragraph(line.to_string()))
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Heading1(text)
            | Self::Heading2(text)
            | Self::Heading3(text)
            | Self::ListItem(text)
            | Self::Paragraph(text) => text,
        }
    }

    /// Element name used for HTML output.
    ///
    /// The article title already owns `h1`, so body headings start at `h2`.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Heading1(_) => "h2",
            Self::Heading2(_) => "h3",
            Self::Heading3(_) => "h4",
            Self::ListItem(_) => "li",
            Self::Paragraph(_) => "p",
        }
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        let tag = self.tag();
        format!("<{tag}>{}</{tag}>", self.text())
    }
}

/// Lazily classify `content` line by line.
pub fn blocks(content: &str) -> impl Iterator<Item = Block> + '_ {
    content.split('\n').filter_map(Block::parse_line)
}

/// Render `content` into its block sequence.
#[must_use]
pub fn render(content: &str) -> Vec<Block> {
    blocks(content).collect()
}

/// Render `content` straight to HTML, one element per line.
#[must_use]
pub fn render_html(content: &str) -> String {
    let mut html = String::new();
    for block in blocks(content) {
        html.push_str(&block.to_html());
        html.push('\n');
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_mixed_content() {
        let blocks = render("# Title\n\nSome text\n- item one\n- item two");
        assert_eq!(
            blocks,
            vec![
                Block::Heading1("Title".into()),
                Block::Paragraph("Some text".into()),
                Block::ListItem("item one".into()),
                Block::ListItem("item two".into()),
            ]
        );
    }

    #[test]
    fn heading_levels() {
        assert_eq!(
            render("## Two\n### Three"),
            vec![
                Block::Heading2("Two".into()),
                Block::Heading3("Three".into())
            ]
        );
    }

    #[test]
    fn prefixes_need_the_trailing_space() {
        assert_eq!(
            render("#hashtag\n-dash\n####  deep"),
            vec![
                Block::Paragraph("#hashtag".into()),
                Block::Paragraph("-dash".into()),
                Block::Paragraph("####  deep".into()),
            ]
        );
    }

    #[test]
    fn paragraphs_are_kept_verbatim() {
        assert_eq!(
            render("   indented <b>text</b>  \n \t \n"),
            vec![Block::Paragraph("   indented <b>text</b>  ".into())]
        );
    }

    #[test]
    fn indented_markers_are_paragraphs() {
        assert_eq!(render("  - not a list"), vec![Block::Paragraph("  - not a list".into())]);
    }

    #[test]
    fn empty_prefix_remainder_still_emits() {
        assert_eq!(render("# "), vec![Block::Heading1(String::new())]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let content = "# A\n- b\n- c\n\nd\n## e";
        assert_eq!(render(content), render(content));
        assert_eq!(render_html(content), render_html(content));
    }

    #[test]
    fn html_output() {
        assert_eq!(
            render_html("# Title\n- one\nplain"),
            "<h2>Title</h2>\n<li>one</li>\n<p>plain</p>\n"
        );
    }

    #[test]
    fn empty_content_has_no_blocks() {
        assert!(render("").is_empty());
        assert!(render("\n\n").is_empty());
    }
}

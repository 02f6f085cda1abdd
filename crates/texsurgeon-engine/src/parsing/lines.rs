use super::span::Span;

/// A reference to a single line of the document with its byte span.
#[derive(Debug, Clone, Copy)]
pub struct LineRef<'a> {
    /// Zero-based line number.
    pub index: usize,
    /// Byte span of this line in the text (includes the newline if present).
    pub span: Span,
    /// The line text, including its terminator.
    pub text: &'a str,
}

impl<'a> LineRef<'a> {
    /// The line without its `\n` / `\r\n` terminator.
    pub fn content(&self) -> &'a str {
        self.text.trim_end_matches(['\r', '\n'])
    }
}

/// Returns an iterator over lines with their byte spans.
///
/// Terminators are kept so that the spans of consecutive lines tile the whole
/// text with no gaps, which boundary math downstream relies on.
pub fn lines_with_spans(text: &str) -> impl Iterator<Item = LineRef<'_>> + '_ {
    let mut offset = 0usize;
    text.split_inclusive('\n')
        .enumerate()
        .map(move |(index, line)| {
            let start = offset;
            offset += line.len();
            LineRef {
                index,
                span: Span { start, end: offset },
                text: line,
            }
        })
}

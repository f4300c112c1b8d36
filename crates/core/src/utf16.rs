//! Byte offset to `(line, UTF-16 column)` conversion.
//!
//! Sourcemap consumers count columns in UTF-16 code units, while everything else in this crate
//! works with byte offsets. [`Utf16Index`] bridges the two.
//!
//! Offsets that fall inside a multi-byte character, and columns that fall inside a surrogate
//! pair, clamp to the start of that character.

/// A line table for one string.
///
/// Lines end before `\n`; a `\r` right before it doesn't count toward columns either.
#[derive(Debug, Clone)]
pub struct Utf16Index<'a> {
    s: &'a str,
    /// `(start, end)` byte range of each line, terminator excluded.
    lines: Vec<(usize, usize)>,
}

impl<'a> Utf16Index<'a> {
    /// Build an index for `s` from the byte offsets where its lines begin.
    ///
    /// `line_starts` must be sorted, start with `0` and lie on character boundaries.
    pub fn new(s: &'a str, line_starts: &[usize]) -> Self {
        let lines = line_starts
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let mut end = line_starts
                    .get(i + 1)
                    .map_or(s.len(), |&next| next.saturating_sub(1));
                if end > start && s.as_bytes()[end - 1] == b'\r' {
                    end -= 1;
                }
                (start, end.max(start))
            })
            .collect();
        Self { s, lines }
    }

    /// 0-based line containing `byte`; offsets past the end belong to the last line.
    pub fn line_for_byte(&self, byte: usize) -> usize {
        self.lines
            .partition_point(|&(start, _)| start <= byte)
            .saturating_sub(1)
    }

    /// Convert a byte offset into a 0-based `(line, utf16_col)` pair.
    pub fn byte_to_line_utf16_col(&self, byte: usize) -> (usize, usize) {
        let line = self.line_for_byte(byte);
        let Some(&(start, end)) = self.lines.get(line) else {
            return (0, 0);
        };
        let target = byte.clamp(start, end);
        let col = self.s[start..end]
            .char_indices()
            .take_while(|&(rel, ch)| start + rel + ch.len_utf8() <= target)
            .map(|(_, ch)| ch.len_utf16())
            .sum();
        (line, col)
    }

    /// Convert a 0-based `(line, utf16_col)` pair into a byte offset.
    ///
    /// Returns `None` for a line past the end; columns past the line end clamp to it.
    pub fn line_utf16_col_to_byte(&self, line: usize, utf16_col: usize) -> Option<usize> {
        let &(start, end) = self.lines.get(line)?;
        let mut col = 0;
        for (rel, ch) in self.s[start..end].char_indices() {
            if col + ch.len_utf16() > utf16_col {
                return Some(start + rel);
            }
            col += ch.len_utf16();
        }
        Some(end)
    }
}

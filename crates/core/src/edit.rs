//! Edits over the input CSS and the sourcemaps that describe them.
//!
//! Every change the transform makes is an [`Edit`]: a byte range of the original source and the
//! text that replaces it. Edits are applied in one pass ([`apply_edits`]), so the input tree is
//! never mutated while it is being walked.
//!
//! Each edit also says where its output bytes came from
//! ([`Edit::output_byte_to_input_byte`]). Generated declarations and rules point at the
//! `text-remove-gap` declaration they replace, so tools reporting on the output land on the
//! directive. Sourcemap columns are UTF-16 code units, as JavaScript consumers expect.
//!
//! Edits must be sorted by `start` and must not overlap (see [`validate_edits`]). Insertions
//! (`start == end`) may share an offset and keep their order.

use std::{cmp::Ordering, ops::Range};

use crate::{GapError, utf16::Utf16Index};

/// A replacement of `input[start..end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Start byte offset (inclusive) in the input.
    pub start: usize,
    /// End byte offset (exclusive) in the input.
    pub end: usize,
    pub replacement: String,
    /// Origin of each byte of `replacement`: an input byte offset, or `None` for unmapped.
    pub output_byte_to_input_byte: Vec<Option<usize>>,
}

impl Edit {
    /// Remove `range` from the input.
    pub fn delete(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            replacement: String::new(),
            output_byte_to_input_byte: Vec::new(),
        }
    }

    /// Replace `range` (possibly empty, i.e. an insertion) with generated `text` whose bytes all
    /// originate from `origin`.
    pub fn synthesize(range: Range<usize>, text: String, origin: usize) -> Self {
        Self {
            start: range.start,
            end: range.end,
            output_byte_to_input_byte: vec![Some(origin); text.len()],
            replacement: text,
        }
    }

    fn len_delta(&self) -> isize {
        self.replacement.len() as isize - (self.end - self.start) as isize
    }
}

/// Apply sorted, non-overlapping `edits` to `input`.
pub fn apply_edits(input: &str, edits: &[Edit]) -> String {
    let delta: isize = edits.iter().map(Edit::len_delta).sum();
    let mut out = String::with_capacity(input.len().saturating_add_signed(delta));

    let mut cursor = 0;
    for edit in edits {
        if cursor < edit.start {
            out.push_str(&input[cursor..edit.start]);
        }
        out.push_str(&edit.replacement);
        cursor = cursor.max(edit.end);
    }
    out.push_str(&input[cursor.min(input.len())..]);
    out
}

/// Check the invariants [`apply_edits`] and the sourcemap writers rely on.
///
/// Rejects reversed or out-of-bounds ranges, overlaps, origin maps whose length differs from the
/// replacement, and origins outside the input.
pub fn validate_edits(input_len: usize, edits: &[Edit]) -> Result<(), GapError> {
    let mut prev: Option<&Edit> = None;
    for (idx, e) in edits.iter().enumerate() {
        if e.start > e.end || e.end > input_len {
            return Err(GapError::InvalidEdit(format!(
                "edit #{idx} has range {}..{} in an input of {input_len} bytes",
                e.start, e.end
            )));
        }
        if let Some(p) = prev
            && e.start < p.end
        {
            return Err(GapError::OverlappingEdits {
                a_start: p.start,
                a_end: p.end,
                b_start: e.start,
                b_end: e.end,
            });
        }
        if e.output_byte_to_input_byte.len() != e.replacement.len() {
            return Err(GapError::InvalidEdit(format!(
                "edit #{idx} maps {} bytes but replaces with {}",
                e.output_byte_to_input_byte.len(),
                e.replacement.len()
            )));
        }
        if let Some(origin) = e.output_byte_to_input_byte.iter().flatten().find(|&&b| b >= input_len) {
            return Err(GapError::InvalidEdit(format!(
                "edit #{idx} points at byte {origin} of an input of {input_len} bytes"
            )));
        }
        prev = Some(e);
    }
    Ok(())
}

/// Create a sourcemap for `output_code` pointing back at `input_code`.
///
/// Points are placed at every output line start and at both ends of every edit. Unchanged text
/// maps to itself; replacement text maps through its origins.
///
/// If `output_code` is not what the edits produce, only the common prefix is mapped.
pub fn create_sourcemap(
    input_code: &str,
    output_code: &str,
    source_filename: &str,
    edits: &[Edit],
) -> Result<String, GapError> {
    let layout = Layout::new(input_code.len(), output_code.len(), edits);
    let in_index = Utf16Index::new(input_code, &compute_line_starts(input_code));
    let out_line_starts = compute_line_starts(output_code);
    let out_index = Utf16Index::new(output_code, &out_line_starts);

    let points = out_line_starts
        .iter()
        .copied()
        .chain(layout.edge_anchors())
        .filter(|&b| b < layout.out_to_in.len())
        .map(|out_byte| Point {
            dst: utf16_point(&out_index, out_byte),
            origin: layout.out_to_in[out_byte].map(|in_byte| {
                let (line, col) = utf16_point(&in_index, in_byte);
                Origin {
                    line,
                    col,
                    source: Some(source_filename),
                    name: None,
                }
            }),
        })
        .collect();

    write_points(points, Some((source_filename, input_code)))
}

/// Carry `input_sourcemap_json`, which maps `input_code` to its own sources, over to
/// `output_code`.
///
/// Upstream points on unchanged text move with it; points inside replaced ranges are dropped.
/// Edit boundaries and lines starting inside a replacement get new points resolved through the
/// upstream map.
pub fn rewrite_sourcemap(
    input_code: &str,
    output_code: &str,
    input_sourcemap_json: &str,
    edits: &[Edit],
) -> Result<String, GapError> {
    let upstream = sourcemap::SourceMap::from_slice(input_sourcemap_json.as_bytes())?;

    let layout = Layout::new(input_code.len(), output_code.len(), edits);
    let in_index = Utf16Index::new(input_code, &compute_line_starts(input_code));
    let out_index = Utf16Index::new(output_code, &compute_line_starts(output_code));

    let moved = upstream.tokens().filter_map(|token| {
        let in_byte = in_index
            .line_utf16_col_to_byte(token.get_dst_line() as usize, token.get_dst_col() as usize)?;
        let out_byte = layout.in_to_out.get(in_byte).copied().flatten()?;
        Some(Point {
            dst: utf16_point(&out_index, out_byte),
            origin: Origin::of(&token),
        })
    });

    let anchors = layout
        .edge_anchors()
        .chain(layout.inner_line_starts())
        .filter(|&b| b < layout.out_to_in.len())
        .map(|out_byte| Point {
            dst: utf16_point(&out_index, out_byte),
            origin: layout.out_to_in[out_byte].and_then(|in_byte| {
                let (line, col) = utf16_point(&in_index, in_byte);
                upstream
                    .lookup_token(line, col)
                    .and_then(|token| Origin::of(&token))
            }),
        });

    write_points(moved.chain(anchors).collect(), None)
}

/// Byte offsets where each line starts: `0`, then `i + 1` for every `\n` at `i`.
pub(crate) fn compute_line_starts(s: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(
            s.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        )
        .collect()
}

/// Where the edits put things in the output, as byte maps in both directions.
struct Layout<'e> {
    /// Each edit with the output range of its replacement.
    spans: Vec<(&'e Edit, Range<usize>)>,
    out_to_in: Vec<Option<usize>>,
    /// `None` for input bytes removed by an edit.
    in_to_out: Vec<Option<usize>>,
}

impl<'e> Layout<'e> {
    fn new(input_len: usize, output_len: usize, edits: &'e [Edit]) -> Self {
        let mut spans = Vec::with_capacity(edits.len());
        let mut out_to_in = Vec::with_capacity(output_len);
        let mut in_to_out = vec![None; input_len];

        let mut keep = |range: Range<usize>, out_to_in: &mut Vec<Option<usize>>| {
            for in_byte in range {
                in_to_out[in_byte] = Some(out_to_in.len());
                out_to_in.push(Some(in_byte));
            }
        };

        let mut cursor = 0;
        for e in edits {
            keep(cursor..e.start, &mut out_to_in);
            let out_start = out_to_in.len();
            out_to_in.extend(
                e.output_byte_to_input_byte
                    .iter()
                    .map(|origin| origin.filter(|&b| b < input_len)),
            );
            spans.push((e, out_start..out_to_in.len()));
            cursor = cursor.max(e.end);
        }
        keep(cursor..input_len, &mut out_to_in);

        // Only the part shared with the real output can be mapped.
        out_to_in.truncate(output_len);
        for out in in_to_out.iter_mut() {
            if out.is_some_and(|o| o >= output_len) {
                *out = None;
            }
        }

        Self {
            spans,
            out_to_in,
            in_to_out,
        }
    }

    /// Output offsets where each replacement starts and ends.
    fn edge_anchors(&self) -> impl Iterator<Item = usize> + '_ {
        self.spans
            .iter()
            .flat_map(|(_, range)| [range.start, range.end])
    }

    /// Output offsets of lines that begin inside a replacement.
    fn inner_line_starts(&self) -> impl Iterator<Item = usize> + '_ {
        self.spans.iter().flat_map(|(e, range)| {
            e.replacement
                .match_indices('\n')
                .map(move |(i, _)| range.start + i + 1)
        })
    }
}

/// One sourcemap entry: output position and, unless unmapped, where it came from.
#[derive(Debug, Clone, Copy)]
struct Point<'a> {
    dst: (u32, u32),
    origin: Option<Origin<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Origin<'a> {
    line: u32,
    col: u32,
    source: Option<&'a str>,
    name: Option<&'a str>,
}

impl<'a> Origin<'a> {
    /// `None` when the upstream token is itself unmapped.
    fn of(token: &sourcemap::Token<'a>) -> Option<Self> {
        let line = token.get_src_line();
        (line != u32::MAX).then(|| Origin {
            line,
            col: token.get_src_col(),
            source: token.get_source(),
            name: token.get_name(),
        })
    }
}

fn utf16_point(index: &Utf16Index<'_>, byte: usize) -> (u32, u32) {
    let (line, col) = index.byte_to_line_utf16_col(byte);
    (line as u32, col as u32)
}

/// Sort by output position and keep one point per position, mapped ones first.
fn sort_and_dedup_points(points: &mut Vec<Point<'_>>) {
    points.sort_by(|a, b| match a.dst.cmp(&b.dst) {
        Ordering::Equal => b.origin.is_some().cmp(&a.origin.is_some()),
        other => other,
    });
    points.dedup_by(|a, b| a.dst == b.dst);
}

/// Serialize `points`, optionally embedding one source's contents.
fn write_points(
    mut points: Vec<Point<'_>>,
    contents: Option<(&str, &str)>,
) -> Result<String, GapError> {
    sort_and_dedup_points(&mut points);

    let mut builder = sourcemap::SourceMapBuilder::new(None);
    if let Some((filename, code)) = contents {
        let id = builder.add_source(filename);
        builder.set_source_contents(id, Some(code));
    }
    for Point { dst: (line, col), origin } in points {
        match origin {
            Some(o) => builder.add(line, col, o.line, o.col, o.source, o.name, false),
            None => builder.add(line, col, u32::MAX, u32::MAX, None, None, false),
        };
    }

    let mut buf = Vec::new();
    builder.into_sourcemap().to_writer(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

//! Line and column lookup for byte offsets.

/// 1-indexed line and column. Columns count bytes; a tab is one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LineColumn {
    pub line: u32,
    pub column: u32,
}

impl core::fmt::Display for LineColumn {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The start offset of every line in a source.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    /// Index the lines of `src`.
    ///
    /// Offsets are 32-bit: lines starting past `u32::MAX` are not indexed,
    /// and their positions land on the last line that is.
    pub fn new(src: &[u8]) -> Self {
        let line_starts = core::iter::once(0)
            .chain(
                src.iter()
                    .enumerate()
                    .filter(|(_, &c)| c == b'\n')
                    .map_while(|(i, _)| line_start_after(i)),
            )
            .collect();
        LineIndex { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Position of `offset`. Offsets past the end land on the last line.
    pub fn line_column(&self, offset: u32) -> LineColumn {
        // Index of the last line starting at or before `offset`.
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        LineColumn {
            line: line as u32 + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }
}

/// Offset of the line that follows a newline at `newline`, if it is addressable.
fn line_start_after(newline: usize) -> Option<u32> {
    newline.checked_add(1).and_then(|i| u32::try_from(i).ok())
}

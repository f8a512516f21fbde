/// Source position map.
///
/// A [`FileSet`] owns the text of every file an analyzed package refers to
/// (its own files and the dependency files its objects are declared in) and
/// translates between analyzer positions ([`Pos`]) and editor positions
/// (file URI + zero-based line + UTF-16 column).
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_lsp::lsp_types::{Position, Url};

use crate::types::Pos;
use crate::util::{byte_col_to_utf16, utf16_to_byte_col};

/// One file registered in a [`FileSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSourceFile", into = "RawSourceFile")]
pub struct SourceFile {
    uri: Url,
    base: u32,
    content: String,
    /// Byte offset of the first character of every line.
    line_starts: Vec<u32>,
}

/// On-disk shape of a [`SourceFile`]; line starts are recomputed on load.
#[derive(Serialize, Deserialize)]
struct RawSourceFile {
    uri: Url,
    base: u32,
    content: String,
}

impl From<RawSourceFile> for SourceFile {
    fn from(raw: RawSourceFile) -> Self {
        SourceFile::new(raw.uri, raw.base, raw.content)
    }
}

impl From<SourceFile> for RawSourceFile {
    fn from(file: SourceFile) -> Self {
        RawSourceFile {
            uri: file.uri,
            base: file.base,
            content: file.content,
        }
    }
}

impl SourceFile {
    pub fn new(uri: Url, base: u32, content: String) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            content
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i as u32 + 1),
        );
        Self {
            uri,
            base,
            content,
            line_starts,
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn size(&self) -> u32 {
        u32::try_from(self.content.len()).unwrap_or(u32::MAX)
    }

    /// The end-of-file position, or `None` when it does not fit in a `u32`.
    pub fn end(&self) -> Option<u32> {
        u32::try_from(self.content.len())
            .ok()
            .and_then(|size| self.base.checked_add(size))
    }

    /// Whether `pos` falls inside this file.  The end-of-file position is
    /// included.
    pub fn contains(&self, pos: Pos) -> bool {
        let end = u64::from(self.base) + self.content.len() as u64;
        pos.0 >= self.base && u64::from(pos.0) <= end
    }

    /// The position of byte `offset` in this file, saturating at
    /// `u32::MAX`.
    pub fn pos(&self, offset: usize) -> Pos {
        let pos = u64::from(self.base) + offset as u64;
        Pos(u32::try_from(pos).unwrap_or(u32::MAX))
    }

    /// Text of line `line` (zero-based), without its terminator.
    fn line_text(&self, line: usize) -> Option<&str> {
        let start = *self.line_starts.get(line)? as usize;
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| *next as usize - 1)
            .unwrap_or(self.content.len());
        let text = self.content.get(start..end)?;
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    /// Convert a byte offset into an editor position.
    fn offset_to_position(&self, offset: usize) -> Position {
        let line = self
            .line_starts
            .partition_point(|start| *start as usize <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line] as usize;
        let character = self
            .line_text(line)
            .map(|text| byte_col_to_utf16(text, offset - line_start))
            .unwrap_or(0);
        Position {
            line: line as u32,
            character,
        }
    }

    /// Convert an editor position into a byte offset.  Returns `None` when
    /// the line is past the end of the file; columns past the end of a line
    /// are clamped to the line end.
    fn position_to_offset(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        let text = self.line_text(line)?;
        let line_start = self.line_starts[line] as usize;
        Some(line_start + utf16_to_byte_col(text, position.character))
    }
}

/// Why a [`FileSet`] read from disk cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileSetError {
    #[error("{uri} has base 0, which is reserved for the invalid position")]
    ZeroBase { uri: Url },
    #[error("{uri} does not fit in the position space (base {base}, {len} bytes)")]
    Overflow { uri: Url, base: u32, len: usize },
    #[error("{first} and {second} have overlapping positions")]
    Overlap { first: Url, second: Url },
}

/// All files known to one analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSet {
    files: Vec<SourceFile>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and return it.  Bases are assigned consecutively,
    /// starting at 1 so that `Pos(0)` stays invalid, with one position of
    /// slack after each file for its end-of-file position.
    pub fn add_file(&mut self, uri: Url, content: impl Into<String>) -> &SourceFile {
        let base = self
            .files
            .last()
            .map(|last| last.end().unwrap_or(u32::MAX).saturating_add(1))
            .unwrap_or(1);
        self.files.push(SourceFile::new(uri, base, content.into()));
        &self.files[self.files.len() - 1]
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Check that every file has a usable base: non-zero, with its whole
    /// range (end-of-file position included) inside `u32`, and disjoint from
    /// every other file's range.
    pub fn validate(&self) -> Result<(), FileSetError> {
        let mut ranges = Vec::with_capacity(self.files.len());
        for file in &self.files {
            if file.base == 0 {
                return Err(FileSetError::ZeroBase {
                    uri: file.uri.clone(),
                });
            }
            let end = file.end().ok_or_else(|| FileSetError::Overflow {
                uri: file.uri.clone(),
                base: file.base,
                len: file.content.len(),
            })?;
            ranges.push((file.base, end, file));
        }

        ranges.sort_by_key(|(base, _, _)| *base);
        for pair in ranges.windows(2) {
            let (_, prev_end, prev) = pair[0];
            let (next_base, _, next) = pair[1];
            if next_base <= prev_end {
                return Err(FileSetError::Overlap {
                    first: prev.uri.clone(),
                    second: next.uri.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn file(&self, pos: Pos) -> Option<&SourceFile> {
        if !pos.is_valid() {
            return None;
        }
        self.files.iter().find(|f| f.contains(pos))
    }

    pub fn file_by_uri(&self, uri: &Url) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.uri == *uri)
    }

    /// Resolve an analyzer position to its file and editor position.
    pub fn position(&self, pos: Pos) -> Option<(&Url, Position)> {
        let file = self.file(pos)?;
        let offset = pos.0.checked_sub(file.base)? as usize;
        Some((&file.uri, file.offset_to_position(offset)))
    }

    /// Resolve an editor position in `uri` to an analyzer position.
    pub fn pos_for(&self, uri: &Url, position: Position) -> Option<Pos> {
        let file = self.file_by_uri(uri)?;
        let offset = file.position_to_offset(position)?;
        Some(file.pos(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(path: &str) -> Url {
        Url::parse(&format!("file://{}", path)).unwrap()
    }

    #[test]
    fn bases_do_not_overlap() {
        let mut fset = FileSet::new();
        let a = fset.add_file(uri("/ws/a.go"), "abc").base();
        let b = fset.add_file(uri("/ws/b.go"), "de").base();
        assert_eq!(a, 1);
        assert_eq!(b, 5);
        assert_eq!(fset.file(Pos(4)).unwrap().uri(), &uri("/ws/a.go"));
        assert_eq!(fset.file(Pos(5)).unwrap().uri(), &uri("/ws/b.go"));
        assert!(fset.file(Pos::NONE).is_none());
    }

    #[test]
    fn position_round_trips_through_lines() {
        let mut fset = FileSet::new();
        fset.add_file(uri("/ws/a.go"), "package a\n\nvar x int\n");
        let pos = fset
            .pos_for(
                &uri("/ws/a.go"),
                Position {
                    line: 2,
                    character: 4,
                },
            )
            .unwrap();
        let (file, position) = fset.position(pos).unwrap();
        assert_eq!(file, &uri("/ws/a.go"));
        assert_eq!(
            position,
            Position {
                line: 2,
                character: 4
            }
        );
    }

    #[test]
    fn columns_are_utf16() {
        let mut fset = FileSet::new();
        fset.add_file(uri("/ws/a.go"), "s := \"é\"; y");
        let file = fset.file_by_uri(&uri("/ws/a.go")).unwrap();
        let y = file.content().find('y').unwrap();
        let (_, position) = fset.position(file.pos(y)).unwrap();
        assert_eq!(position.character, 10);
    }

    #[test]
    fn line_past_end_is_rejected() {
        let mut fset = FileSet::new();
        fset.add_file(uri("/ws/a.go"), "package a\n");
        let pos = fset.pos_for(
            &uri("/ws/a.go"),
            Position {
                line: 7,
                character: 0,
            },
        );
        assert!(pos.is_none());
    }

    fn raw(files: &[(&str, u32, &str)]) -> FileSet {
        FileSet {
            files: files
                .iter()
                .map(|(path, base, content)| SourceFile::new(uri(path), *base, content.to_string()))
                .collect(),
        }
    }

    #[test]
    fn consecutive_files_validate() {
        let mut fset = FileSet::new();
        fset.add_file(uri("/ws/a.go"), "abc");
        fset.add_file(uri("/ws/b.go"), "de");
        assert_eq!(fset.validate(), Ok(()));
    }

    #[test]
    fn shared_end_of_file_position_is_an_overlap() {
        // a.go covers 1..=4 including its end-of-file position.
        let fset = raw(&[("/ws/a.go", 1, "abc"), ("/ws/b.go", 4, "de")]);
        assert!(matches!(
            fset.validate(),
            Err(FileSetError::Overlap { .. })
        ));
    }

    #[test]
    fn positions_near_the_top_do_not_overflow() {
        let file = SourceFile::new(uri("/ws/a.go"), u32::MAX - 5, "package a\n".to_string());
        assert!(file.end().is_none());
        assert!(!file.contains(Pos(1)));
        assert!(file.contains(Pos(u32::MAX)));
        assert_eq!(file.pos(100), Pos(u32::MAX));
    }
}

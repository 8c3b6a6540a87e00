//! Plain-text board layouts.
//!
//! One line per board row with the northmost row first. Symbols: `.` empty,
//! `#` wall, `L` laser tower, `M` mortar tower, `S` spawn point, `D`
//! destination. Blank lines and lines starting with `;` are ignored.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use thiserror::Error;
use tile_defence_core::{BoardSize, TileContent, TowerKind};

const COMMENT_PREFIX: char = ';';

/// Board size and row-major tile roles read from a layout file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LayoutFile {
    pub(crate) size: BoardSize,
    pub(crate) roles: Vec<TileContent>,
}

/// Errors that can occur while parsing a layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LayoutParseError {
    /// The text contained no board rows.
    #[error("layout contains no rows")]
    Empty,
    /// A row's width differs from the first row's.
    #[error("line {line} has {actual} tiles, expected {expected}")]
    RaggedRow {
        /// One-based line number in the source text.
        line: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        actual: usize,
    },
    /// A character is not a known tile symbol.
    #[error("unknown tile symbol '{symbol}' at line {line}, column {column}")]
    UnknownSymbol {
        /// One-based line number in the source text.
        line: usize,
        /// One-based character column in the line.
        column: usize,
        /// Offending character.
        symbol: char,
    },
}

impl LayoutFile {
    /// Reads and parses a layout file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read layout at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid layout at {}", path.display()))
    }

    /// Parses layout text.
    pub(crate) fn parse(text: &str) -> Result<Self, LayoutParseError> {
        let mut rows: Vec<Vec<TileContent>> = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
                continue;
            }

            let row = trimmed
                .chars()
                .enumerate()
                .map(|(column, symbol)| {
                    parse_symbol(symbol).ok_or(LayoutParseError::UnknownSymbol {
                        line: line_number,
                        column: column + 1,
                        symbol,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(LayoutParseError::RaggedRow {
                        line: line_number,
                        expected: first.len(),
                        actual: row.len(),
                    });
                }
            }
            rows.push(row);
        }

        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(LayoutParseError::Empty);
        }

        let size = BoardSize::new(width as u32, rows.len() as u32);
        let roles = rows.into_iter().rev().flatten().collect();
        Ok(Self { size, roles })
    }
}

fn parse_symbol(symbol: char) -> Option<TileContent> {
    let content = match symbol {
        '.' => TileContent::Empty,
        '#' => TileContent::Wall,
        'L' => TileContent::Tower(TowerKind::Laser),
        'M' => TileContent::Tower(TowerKind::Mortar),
        'S' => TileContent::SpawnPoint,
        'D' => TileContent::Destination,
        _ => return None,
    };
    Some(content)
}

/// Symbol used for the content in layout files.
pub(crate) fn symbol_for(content: TileContent) -> char {
    match content {
        TileContent::Empty => '.',
        TileContent::Wall => '#',
        TileContent::Tower(TowerKind::Laser) => 'L',
        TileContent::Tower(TowerKind::Mortar) => 'M',
        TileContent::SpawnPoint => 'S',
        TileContent::Destination => 'D',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_line_is_the_northmost_row() {
        let layout = LayoutFile::parse("D.#\nS.L\n").expect("layout parses");

        assert_eq!(layout.size, BoardSize::new(3, 2));
        assert_eq!(
            layout.roles,
            vec![
                TileContent::SpawnPoint,
                TileContent::Empty,
                TileContent::Tower(TowerKind::Laser),
                TileContent::Destination,
                TileContent::Empty,
                TileContent::Wall,
            ]
        );
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let layout = LayoutFile::parse("; demo\n\n  S.D  \n; trailing\n").expect("layout parses");
        assert_eq!(layout.size, BoardSize::new(3, 1));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert_eq!(
            LayoutFile::parse("S..\n.D\n"),
            Err(LayoutParseError::RaggedRow {
                line: 2,
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn unknown_symbols_report_their_position() {
        let error = LayoutFile::parse("S.\n.x\n").expect_err("x is not a tile");
        assert_eq!(
            error,
            LayoutParseError::UnknownSymbol {
                line: 2,
                column: 2,
                symbol: 'x'
            }
        );
        assert_eq!(
            error.to_string(),
            "unknown tile symbol 'x' at line 2, column 2"
        );
    }

    #[test]
    fn empty_text_is_rejected() {
        assert_eq!(LayoutFile::parse("\n; nothing\n"), Err(LayoutParseError::Empty));
    }

    #[test]
    fn symbols_match_the_parser() {
        for symbol in ['.', '#', 'L', 'M', 'S', 'D'] {
            let content = parse_symbol(symbol).expect("known symbol");
            assert_eq!(symbol_for(content), symbol);
        }
    }
}

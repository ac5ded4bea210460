//! Translation between editor and internal coordinates
//!
//! Both conventions are zero-based line + UTF-16 column pairs; the mapping
//! is a pure field renaming in each direction, and the two functions are
//! exact inverses.

use tower_lsp::lsp_types::{Location, Position, Range, Url};

use crate::schema::location::{ColRow, SourceSpan};

pub fn position_to_col_row(position: Position) -> ColRow {
    ColRow {
        row: position.line,
        col: position.character,
    }
}

pub fn col_row_to_position(col_row: ColRow) -> Position {
    Position {
        line: col_row.row,
        character: col_row.col,
    }
}

/// Convert an internal span into a wire location. Returns `None` when the
/// file path cannot be expressed as a file URI.
pub fn span_to_location(span: &SourceSpan) -> Option<Location> {
    let uri = Url::from_file_path(&span.file).ok()?;
    Some(Location {
        uri,
        range: Range {
            start: col_row_to_position(span.start),
            end: col_row_to_position(span.end),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(0, 17)]
    #[case(42, 0)]
    #[case(1000, 65535)]
    #[case(u32::MAX, u32::MAX)]
    fn editor_to_internal_is_a_field_renaming(#[case] line: u32, #[case] character: u32) {
        let col_row = position_to_col_row(Position { line, character });

        assert_eq!(col_row.row, line);
        assert_eq!(col_row.col, character);
    }

    #[test]
    fn round_trip_is_identity() {
        for line in (0..2048).step_by(37) {
            for character in (0..2048).step_by(53) {
                let position = Position { line, character };
                assert_eq!(
                    col_row_to_position(position_to_col_row(position)),
                    position
                );
            }
        }
    }

    #[test]
    fn span_to_location_renames_both_endpoints() {
        let span = SourceSpan {
            file: PathBuf::from("/p/a.proto"),
            start: ColRow::new(1, 2),
            end: ColRow::new(1, 9),
        };

        let location = span_to_location(&span).unwrap();

        assert_eq!(location.uri, Url::from_file_path("/p/a.proto").unwrap());
        assert_eq!(location.range.start, Position::new(1, 2));
        assert_eq!(location.range.end, Position::new(1, 9));
    }
}

//! ASCII rendering of the board and its flow field.

use glam::Vec3;
use tile_defence_board::Board;
use tile_defence_core::{Direction, TileContent, TileCoord};

use crate::layout::symbol_for;

const UNREACHABLE: char = 'x';
const ENEMY: char = '@';

/// Draws the board with the northmost row on top.
///
/// Walkable tiles show the arrow of their next hop, or `x` when they cannot
/// reach the destination. Enemies are drawn at the tile under their model.
pub(crate) fn render_board(board: &Board, enemies: &[Vec3]) -> String {
    let size = board.size();
    let mut cells: Vec<char> = board
        .tiles()
        .map(|(_, tile)| match tile.content() {
            TileContent::Empty => tile.path_direction().map_or(UNREACHABLE, arrow),
            TileContent::SpawnPoint if !tile.has_path() => UNREACHABLE,
            content => symbol_for(content),
        })
        .collect();

    for position in enemies {
        if let Some(tile) = board.tile_at_world(*position) {
            cells[tile.index()] = ENEMY;
        }
    }

    let width = size.width() as usize;
    let mut out = String::with_capacity(cells.len() + size.height() as usize);
    for y in (0..size.height()).rev() {
        let Some(start) = size.index_of(TileCoord::new(0, y)) else {
            continue;
        };
        out.extend(&cells[start..start + width]);
        out.push('\n');
    }
    out
}

fn arrow(direction: Direction) -> char {
    match direction {
        Direction::North => '^',
        Direction::East => '>',
        Direction::South => 'v',
        Direction::West => '<',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_defence_core::{BlockingContent, BoardSize};

    #[test]
    fn arrows_point_along_the_flow_field() {
        let mut board = Board::new(BoardSize::new(3, 3));
        board.reset_to_default_layout();

        assert_eq!(render_board(&board, &[]), ">v<\n>D<\nS^^\n");
    }

    #[test]
    fn walls_towers_and_stranded_tiles_are_marked() {
        let mut board = Board::new(BoardSize::new(3, 1));
        board
            .set_destination(TileCoord::new(2, 0))
            .expect("destination placed");
        let _ = board
            .toggle_blocking_content(TileCoord::new(1, 0), BlockingContent::Wall)
            .expect("nothing to strand");

        assert_eq!(render_board(&board, &[]), "x#D\n");
    }

    #[test]
    fn enemies_are_drawn_over_tiles() {
        let mut board = Board::new(BoardSize::new(3, 1));
        board
            .set_destination(TileCoord::new(2, 0))
            .expect("destination placed");

        let rendered = render_board(&board, &[Vec3::new(-0.8, 0.0, 0.2), Vec3::new(9.0, 0.0, 0.0)]);
        assert_eq!(rendered, "@>D\n");
    }
}

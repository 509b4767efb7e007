use crate::game::types::{BoardSize, PlayerId, Position, Tile, TileStatus};

/// Hexagonal board surrounded by a one-tile wall border.
///
/// Rows are offset: odd rows are playable on columns `1..=columns`, even rows
/// on `1..=columns - 1`.
#[derive(Debug, Clone)]
pub struct Board {
    tiles: Vec<Vec<Tile>>,
    rows: usize,
    columns: usize,
}

impl Board {
    pub fn new(rows: usize, columns: usize) -> Self {
        let mut board = Self {
            tiles: Vec::new(),
            rows,
            columns,
        };
        board.initialize();
        board
    }

    pub fn with_size(size: BoardSize) -> Self {
        Self::new(size.rows, size.columns)
    }

    pub fn size(&self) -> BoardSize {
        BoardSize {
            rows: self.rows,
            columns: self.columns,
        }
    }

    /// Rebuild every tile: border walls, everything else vacant.
    pub fn initialize(&mut self) {
        let (rows, columns) = (self.rows, self.columns);
        self.tiles = (0..=rows + 1)
            .map(|i| {
                let limit = if i % 2 == 1 { columns + 1 } else { columns };
                (0..=columns + 1)
                    .map(|j| {
                        if i == 0 || i == rows + 1 || j == 0 || j >= limit {
                            Tile::new(TileStatus::Wall)
                        } else {
                            Tile::new(TileStatus::Vacant)
                        }
                    })
                    .collect()
            })
            .collect();
    }

    /// Last playable column of `row`.
    pub fn last_column(&self, row: i32) -> i32 {
        if row.rem_euclid(2) == 0 {
            self.columns as i32 - 1
        } else {
            self.columns as i32
        }
    }

    /// True when `position` lies inside the wall border.
    pub fn is_in_bounds(&self, position: Position) -> bool {
        position.row > 0
            && position.row <= self.rows as i32
            && position.column > 0
            && position.column <= self.last_column(position.row)
    }

    pub fn tile(&self, position: Position) -> Option<&Tile> {
        let row = usize::try_from(position.row).ok()?;
        let column = usize::try_from(position.column).ok()?;
        self.tiles.get(row)?.get(column)
    }

    fn tile_mut(&mut self, position: Position) -> Option<&mut Tile> {
        let row = usize::try_from(position.row).ok()?;
        let column = usize::try_from(position.column).ok()?;
        self.tiles.get_mut(row)?.get_mut(column)
    }

    /// Status of the tile, positions off the array read as walls.
    pub fn status(&self, position: Position) -> TileStatus {
        self.tile(position).map_or(TileStatus::Wall, Tile::status)
    }

    /// Positions outside the array are ignored.
    pub fn set_tile_status(&mut self, position: Position, status: TileStatus) {
        if let Some(tile) = self.tile_mut(position) {
            tile.set_status(status);
        }
    }

    pub fn take_tile(&mut self, position: Position, player_id: &PlayerId) {
        if let Some(tile) = self.tile_mut(position) {
            tile.take(player_id);
        }
    }

    /// A move may land on `position` only if it is inside the border and vacant.
    pub fn check_position_validity(&self, position: Position) -> bool {
        self.is_in_bounds(position) && self.status(position) == TileStatus::Vacant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_has_wall_border() {
        let board = Board::new(9, 16);
        assert!(board.tile(Position::new(10, 17)).is_some());
        assert!(board.tile(Position::new(11, 0)).is_none());
        for column in 0..18 {
            assert_eq!(board.status(Position::new(0, column)), TileStatus::Wall);
            assert_eq!(board.status(Position::new(10, column)), TileStatus::Wall);
        }
        for row in 0..11 {
            assert_eq!(board.status(Position::new(row, 0)), TileStatus::Wall);
        }
    }

    #[test]
    fn even_rows_are_one_column_shorter() {
        let board = Board::new(4, 5);
        assert!(board.check_position_validity(Position::new(1, 5)));
        assert!(!board.check_position_validity(Position::new(2, 5)));
        assert!(board.check_position_validity(Position::new(2, 4)));
        assert_eq!(board.status(Position::new(2, 5)), TileStatus::Wall);
    }

    #[test]
    fn border_positions_are_never_valid() {
        for rows in 1..7 {
            for columns in 2..7 {
                let board = Board::new(rows, columns);
                for column in -1..=columns as i32 + 2 {
                    assert!(!board.check_position_validity(Position::new(0, column)));
                    assert!(!board.check_position_validity(Position::new(rows as i32 + 1, column)));
                }
                for row in -1..=rows as i32 + 2 {
                    assert!(!board.check_position_validity(Position::new(row, 0)));
                    assert!(!board.check_position_validity(Position::new(row, board.last_column(row) + 1)));
                }
            }
        }
    }

    #[test]
    fn taken_tiles_are_invalid_until_reset() {
        let mut board = Board::new(3, 3);
        let position = Position::new(1, 1);
        board.take_tile(position, &"p1".to_string());
        assert!(!board.check_position_validity(position));
        assert_eq!(board.tile(position).unwrap().taken_by(), Ok(Some(&"p1".to_string())));

        board.initialize();
        assert!(board.check_position_validity(position));
    }

    #[test]
    fn set_tile_status_ignores_positions_off_the_board() {
        let mut board = Board::new(2, 2);
        board.set_tile_status(Position::new(-3, 40), TileStatus::Taken);
        board.set_tile_status(Position::new(1, 1), TileStatus::Taken);
        assert_eq!(board.status(Position::new(1, 1)), TileStatus::Taken);
    }
}

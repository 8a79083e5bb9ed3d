use bitflags::bitflags;

use super::{Board, Piece, PlacedPiece, Square};

bitflags! {
    /// Which castling moves are still available.
    ///
    /// A flag stays set while the corresponding rook and its king both remain
    /// on their starting squares; the end-of-turn sweep
    /// ([`Castling::clear_vacated`]) drops it as soon as either home square
    /// no longer holds the expected piece. This is the firmware's stand-in
    /// for per-piece has-moved flags: once a flag is gone it never comes
    /// back, even if the pieces are shuffled back home.
    ///
    /// Whether castling is *currently* playable (both pieces lifted, the
    /// landing squares safe) is the tracker's concern, not tracked here.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Castling: u8 {
        const WHITE_KINGSIDE  = 0b0001;
        const WHITE_QUEENSIDE = 0b0010;
        const BLACK_KINGSIDE  = 0b0100;
        const BLACK_QUEENSIDE = 0b1000;

        const WHITE = Self::WHITE_KINGSIDE.bits() | Self::WHITE_QUEENSIDE.bits();
        const BLACK = Self::BLACK_KINGSIDE.bits() | Self::BLACK_QUEENSIDE.bits();
    }
}

impl Default for Castling {
    fn default() -> Self {
        Self::all()
    }
}

impl Castling {
    /// The right exercised by a rook starting from `square`, if it is one of
    /// the four rook home corners.
    pub fn right_for_rook_home(square: Square) -> Option<Self> {
        match square {
            Square::WHITE_QUEENSIDE_ROOK => Some(Self::WHITE_QUEENSIDE),
            Square::WHITE_KINGSIDE_ROOK => Some(Self::WHITE_KINGSIDE),
            Square::BLACK_QUEENSIDE_ROOK => Some(Self::BLACK_QUEENSIDE),
            Square::BLACK_KINGSIDE_ROOK => Some(Self::BLACK_KINGSIDE),
            _ => None,
        }
    }

    /// Whether this rook/king pair may castle: both must stand on the pair's
    /// shared home row and the right for that corner must still be held.
    ///
    /// Landing-square safety is vetted separately by the check oracle.
    pub fn allows(self, rook: PlacedPiece, king: PlacedPiece) -> bool {
        let home = king.piece.color().home_row();
        if rook.square.row() != home || king.square.row() != home {
            return false;
        }
        match Self::right_for_rook_home(rook.square) {
            Some(right) => self.contains(right),
            None => false,
        }
    }

    /// Drops every right whose home squares no longer hold the expected
    /// pieces. Called once per completed turn; each of the six home squares
    /// is checked independently, so a castle (which vacates a rook corner
    /// and a king square in the same turn) clears both at once.
    pub fn clear_vacated(&mut self, board: &Board) {
        for (right, home, expected) in [
            (Self::WHITE_QUEENSIDE, Square::WHITE_QUEENSIDE_ROOK, Piece::WHITE_ROOK),
            (Self::WHITE_KINGSIDE, Square::WHITE_KINGSIDE_ROOK, Piece::WHITE_ROOK),
            (Self::BLACK_QUEENSIDE, Square::BLACK_QUEENSIDE_ROOK, Piece::BLACK_ROOK),
            (Self::BLACK_KINGSIDE, Square::BLACK_KINGSIDE_ROOK, Piece::BLACK_ROOK),
            (Self::WHITE, Square::WHITE_KING, Piece::WHITE_KING),
            (Self::BLACK, Square::BLACK_KING, Piece::BLACK_KING),
        ] {
            if self.intersects(right) && board.get(home) != Some(expected) {
                self.remove(right);
            }
        }
    }
}

/// The squares a castle ends on, given the rook's home corner: queenside
/// (column 0) puts the king on column 2 and the rook on column 3, kingside
/// (column 7) the king on column 6 and the rook on column 5.
pub fn castle_destinations(rook_home: Square) -> (Square, Square) {
    debug_assert!(rook_home.col() == 0 || rook_home.col() == 7);
    let row = rook_home.row();
    if rook_home.col() == 0 {
        (Square::new_unchecked(row, 2), Square::new_unchecked(row, 3))
    } else {
        (Square::new_unchecked(row, 6), Square::new_unchecked(row, 5))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn white_pair() -> (PlacedPiece, PlacedPiece) {
        (
            PlacedPiece::new(Piece::WHITE_ROOK, Square::WHITE_KINGSIDE_ROOK),
            PlacedPiece::new(Piece::WHITE_KING, Square::WHITE_KING),
        )
    }

    #[test]
    fn default_allows_everything() {
        let (rook, king) = white_pair();
        assert_eq!(Castling::default(), Castling::all());
        assert!(Castling::all().allows(rook, king));
    }

    #[test]
    fn lost_right_blocks_that_corner_only() {
        let (rook, king) = white_pair();
        let rights = Castling::all().difference(Castling::WHITE_KINGSIDE);

        assert!(!rights.allows(rook, king));
        assert!(rights.allows(
            PlacedPiece::new(Piece::WHITE_ROOK, Square::WHITE_QUEENSIDE_ROOK),
            king,
        ));
    }

    #[test]
    fn off_home_row_pieces_cannot_castle() {
        let king = PlacedPiece::new(Piece::WHITE_KING, Square::WHITE_KING);
        let wandered_rook = PlacedPiece::new(Piece::WHITE_ROOK, Square::new_unchecked(3, 7));
        assert!(!Castling::all().allows(wandered_rook, king));

        // not a rook corner at all
        let mid_rook = PlacedPiece::new(Piece::WHITE_ROOK, Square::new_unchecked(0, 3));
        assert!(!Castling::all().allows(mid_rook, king));
    }

    #[test]
    fn clear_vacated_drops_rook_corner() {
        let mut board = Board::starting_position();
        board.set(Square::WHITE_KINGSIDE_ROOK, None);

        let mut rights = Castling::all();
        rights.clear_vacated(&board);
        assert_eq!(rights, Castling::all().difference(Castling::WHITE_KINGSIDE));
    }

    #[test]
    fn clear_vacated_drops_both_sides_of_a_castle() {
        // After a white kingside castle both e1 and h1 hold something else.
        let mut board = Board::starting_position();
        board.set(Square::WHITE_KING, None);
        board.set(Square::WHITE_KINGSIDE_ROOK, None);
        board.set(Square::new_unchecked(0, 6), Some(Piece::WHITE_KING));
        board.set(Square::new_unchecked(0, 5), Some(Piece::WHITE_ROOK));

        let mut rights = Castling::all();
        rights.clear_vacated(&board);
        assert_eq!(rights, Castling::BLACK);
    }

    #[test]
    fn clear_vacated_checks_identity_not_just_presence() {
        // A black piece squatting on h1 does not preserve the right.
        let mut board = Board::starting_position();
        board.set(Square::WHITE_KINGSIDE_ROOK, Some(Piece::BLACK_QUEEN));

        let mut rights = Castling::all();
        rights.clear_vacated(&board);
        assert!(!rights.contains(Castling::WHITE_KINGSIDE));
    }

    #[test]
    fn destinations() {
        assert_eq!(
            castle_destinations(Square::WHITE_QUEENSIDE_ROOK),
            (Square::new_unchecked(0, 2), Square::new_unchecked(0, 3))
        );
        assert_eq!(
            castle_destinations(Square::WHITE_KINGSIDE_ROOK),
            (Square::new_unchecked(0, 6), Square::new_unchecked(0, 5))
        );
        assert_eq!(
            castle_destinations(Square::BLACK_QUEENSIDE_ROOK),
            (Square::new_unchecked(7, 2), Square::new_unchecked(7, 3))
        );
        assert_eq!(
            castle_destinations(Square::BLACK_KINGSIDE_ROOK),
            (Square::new_unchecked(7, 6), Square::new_unchecked(7, 5))
        );
    }
}

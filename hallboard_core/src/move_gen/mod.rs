//! Destination enumeration and move legality.
//!
//! The tracker never generates moves for a whole side; legality questions
//! here are always "where may *this* piece go", asked about the piece a
//! player just lifted.

mod check;

pub use check::would_self_check;

use arrayvec::ArrayVec;

use crate::board::{Board, PieceType, PlacedPiece, Square};

/// Most destinations a single piece can have: a queen in the open sees 14
/// squares along its row and column plus 13 along its diagonals.
pub const MAX_PIECE_MOVES: usize = 27;

/// Destination buffer, inline so legality checks never allocate.
pub type MoveList = ArrayVec<Square, MAX_PIECE_MOVES>;

const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (-1, 2),
    (1, -2),
    (-1, -2),
    (2, 1),
    (-2, 1),
    (2, -1),
    (-2, -1),
];

const KING_STEPS: [(i8, i8); 8] = [
    (1, -1),
    (1, 0),
    (1, 1),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Raw geometric destinations for a piece, before any occupancy filtering.
/// Squares off the board are already discarded.
pub fn candidate_squares(from: PlacedPiece) -> MoveList {
    let mut out = MoveList::new();
    match from.piece.piece_type() {
        PieceType::Pawn => pawn_candidates(from, &mut out),
        PieceType::Knight => offset_candidates(from.square, &KNIGHT_JUMPS, &mut out),
        PieceType::Bishop => diagonal_candidates(from.square, &mut out),
        PieceType::Rook => straight_candidates(from.square, &mut out),
        PieceType::Queen => {
            straight_candidates(from.square, &mut out);
            diagonal_candidates(from.square, &mut out);
        }
        PieceType::King => offset_candidates(from.square, &KING_STEPS, &mut out),
    }
    out
}

fn pawn_candidates(from: PlacedPiece, out: &mut MoveList) {
    let color = from.piece.color();
    let dr = color.forward();
    // one step forward plus the two capture diagonals
    for dc in [-1, 0, 1] {
        if let Some(square) = from.square.offset(dr, dc) {
            out.push(square);
        }
    }
    // the two-step push, only from the pawn's starting row
    if from.square.row() == color.pawn_start_row() {
        if let Some(square) = from.square.offset(2 * dr, 0) {
            out.push(square);
        }
    }
}

fn straight_candidates(from: Square, out: &mut MoveList) {
    for i in 0..8 {
        if i != from.row() {
            out.push(Square::new_unchecked(i, from.col()));
        }
        if i != from.col() {
            out.push(Square::new_unchecked(from.row(), i));
        }
    }
}

fn diagonal_candidates(from: Square, out: &mut MoveList) {
    for (dr, dc) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
        let mut next = from.offset(dr, dc);
        while let Some(square) = next {
            out.push(square);
            next = square.offset(dr, dc);
        }
    }
}

fn offset_candidates(from: Square, offsets: &[(i8, i8)], out: &mut MoveList) {
    for &(dr, dc) in offsets {
        if let Some(square) = from.offset(dr, dc) {
            out.push(square);
        }
    }
}

/// The squares `from` may legally move to on `board`.
///
/// Filters [`candidate_squares`] by: own-side destinations; occupied squares
/// strictly between origin and destination on straight and diagonal rays
/// (knight and king moves have no intermediates); pawn diagonals onto empty
/// squares (pawns only step diagonally to capture); and, when
/// `prune_self_check` is set, moves that would leave the mover's own king
/// attacked. A destination occupied by the enemy never blocks — landing
/// there is how captures are validated.
pub fn legal_squares(board: &Board, from: PlacedPiece, prune_self_check: bool) -> MoveList {
    let mut out = MoveList::new();
    for to in candidate_squares(from) {
        if board.get(to).is_some_and(|p| p.color() == from.piece.color()) {
            continue;
        }
        if is_straight(from.square, to) && ray_blocked(board, from.square, to) {
            continue;
        }
        if is_diagonal(from.square, to) {
            if from.piece.piece_type() == PieceType::Pawn && board.get(to).is_none() {
                continue;
            }
            if ray_blocked(board, from.square, to) {
                continue;
            }
        }
        if prune_self_check && would_self_check(board, from, to) {
            continue;
        }
        out.push(to);
    }
    out
}

fn is_straight(from: Square, to: Square) -> bool {
    from.row() == to.row() || from.col() == to.col()
}

fn is_diagonal(from: Square, to: Square) -> bool {
    let dr = from.row() as i8 - to.row() as i8;
    let dc = from.col() as i8 - to.col() as i8;
    dr.abs() == dc.abs()
}

/// Whether any square strictly between `from` and `to` (stepping one rank
/// and/or file at a time) is occupied.
fn ray_blocked(board: &Board, from: Square, to: Square) -> bool {
    let dr = (to.row() as i8 - from.row() as i8).signum();
    let dc = (to.col() as i8 - from.col() as i8).signum();

    let mut cursor = from.offset(dr, dc);
    while let Some(square) = cursor {
        if square == to {
            return false;
        }
        if board.is_present(square) {
            return true;
        }
        cursor = square.offset(dr, dc);
    }
    false
}

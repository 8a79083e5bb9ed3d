use crate::board::{Board, PlacedPiece, Square};

use super::legal_squares;

/// Whether playing `from` onto `to` would leave the mover's own king
/// attacked.
///
/// Works on a scratch copy of the board: the origin cell is emptied, the
/// piece written at `to`, and every enemy piece is asked where it could move.
/// Enemy replies are generated *without* self-check pruning — whether a reply
/// would expose the enemy's own king is irrelevant to whether ours can be
/// taken, and pruning here would recurse forever.
///
/// If the mover's side has no king on the scratch board (it is lifted off
/// mid-castle), nothing can be attacked and the answer is `false`.
pub fn would_self_check(board: &Board, from: PlacedPiece, to: Square) -> bool {
    let mut scratch = *board;
    scratch.set(from.square, None);
    scratch.set(to, Some(from.piece));

    let mover = from.piece.color();
    let Some(king) = scratch.king(mover) else {
        return false;
    };

    let attacked = scratch
        .side_pieces(mover.flip())
        .any(|enemy| legal_squares(&scratch, enemy, false).contains(&king));
    attacked
}

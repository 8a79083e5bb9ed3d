use crate::board::{Color, PieceType, Square};

use super::IllegalEntry;

/// Out-of-band hooks between the core and the rest of the device — promotion
/// select buttons, audio cues, the external chess clock, a display.
///
/// Every method has a no-op default, so implementors wire only what their
/// hardware has. `()` is the fully unwired channel.
pub trait SideChannel {
    /// A pawn on `square` reached its far row and must be exchanged for a
    /// queen or knight before the turn can end.
    fn on_promotion_required(&mut self, _square: Square) {}

    /// The kind to install when the pending promotion's replacement piece is
    /// set down. Consulted at placement time; any answer other than
    /// [`PieceType::Knight`] is treated as a queen.
    fn promotion_choice(&mut self) -> PieceType {
        PieceType::Queen
    }

    /// A turn completed; `turn` is the side now to move.
    fn on_turn_changed(&mut self, _turn: Color) {}

    /// The reconciliation list grew. `entries` is the full outstanding list,
    /// oldest first, for UIs that highlight the wrong squares.
    fn on_illegal_state(&mut self, _entries: &[IllegalEntry]) {}
}

/// The unwired channel: silent, and promotions always become queens.
impl SideChannel for () {}

//! The transition interpreter: folds sensor edges into chess turns.
//!
//! The tracker is edge-triggered. Each poll sweeps the sensor matrix in
//! hardware order and compares every cell against the logical board; a cell
//! that reads occupied where the model says empty is a PLACE, one that reads
//! empty where the model holds a piece is a PICKUP. Those two events, plus
//! the context accumulated since the turn started (what was lifted last,
//! whether an enemy piece is in the air, whether a castle or promotion is
//! pending), are enough to reconstruct every legal move — and, when the
//! players do something else, to build the list of corrections that must be
//! carried out before the turn may end.

mod channel;
mod illegal;

pub use channel::SideChannel;
pub use illegal::{IllegalEntry, IllegalList, MAX_ILLEGAL_PIECES};

use log::{debug, info, warn};

use crate::board::{
    castle_destinations, Board, Castling, Color, Location, Piece, PieceType, PlacedPiece, Square,
};
use crate::move_gen::{legal_squares, would_self_check};
use crate::sensors::SensorSource;

/// Edge kind reported by the sensor sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Pickup,
    Place,
}

/// The turn state machine. Owns the logical board; everything the outside
/// world learns comes from the read-only queries ([`Tracker::board`],
/// [`Tracker::turn`], [`Tracker::illegal`]) or from [`SideChannel`] calls.
pub struct Tracker<C = ()> {
    board: Board,
    turn: Color,
    castling: Castling,

    last_transition: Transition,
    last_pickup: Option<PlacedPiece>,

    /// A lifted enemy piece awaiting capture completion.
    victim: Option<PlacedPiece>,
    illegal: IllegalList,
    /// Set when a turn's move already happened but the board still needs
    /// reconciling; emptying the list then ends the turn.
    commit_turn_when_clean: bool,

    expected_king_castle: Option<PlacedPiece>,
    expected_rook_castle: Option<PlacedPiece>,

    pawn_to_promote: Option<PlacedPiece>,

    channel: C,
}

impl Tracker<()> {
    /// A tracker on the standard starting position with nothing wired to the
    /// side channel.
    pub fn new() -> Self {
        Self::with_channel(())
    }
}

impl Default for Tracker<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: SideChannel> Tracker<C> {
    /// A tracker on the standard starting position, reporting through
    /// `channel`.
    pub fn with_channel(channel: C) -> Self {
        Self {
            board: Board::starting_position(),
            turn: Color::White,
            castling: Castling::all(),
            last_transition: Transition::Place,
            last_pickup: None,
            victim: None,
            illegal: IllegalList::new(),
            commit_turn_when_clean: false,
            expected_king_castle: None,
            expected_rook_castle: None,
            pawn_to_promote: None,
            channel,
        }
    }

    /// The logical board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side whose move is in progress.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Castling rights still held.
    pub fn castling(&self) -> Castling {
        self.castling
    }

    /// Outstanding reconciliation entries, oldest first. Empty means the
    /// physical board agrees with the model.
    pub fn illegal(&self) -> &[IllegalEntry] {
        &self.illegal
    }

    /// The wired side channel.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Polls every cell in hardware sweep order (columns outer, rows inner)
    /// and dispatches each edge as it is found, so later cells in the same
    /// sweep are compared against the already-updated model. Returns whether
    /// any transition occurred, which is the caller's cue to refresh a
    /// display.
    pub fn poll(&mut self, source: &mut impl SensorSource) -> bool {
        let mut transitioned = false;
        for square in Square::scan_order() {
            let occupied = source.read(square);
            if occupied != self.board.is_present(square) {
                if occupied {
                    self.place(square);
                } else {
                    self.pickup(square);
                }
                transitioned = true;
            }
        }
        transitioned
    }

    /// Feeds one PICKUP edge. No-op if the model has no piece on `square`
    /// (the sweep never produces such an event).
    pub fn pickup(&mut self, square: Square) {
        let Some(lifted) = self.board.placed(square) else {
            warn!("pickup reported on empty square {square}");
            return;
        };
        self.board.set(square, None);
        debug!("pickup: {lifted}");

        if !self.illegal.is_empty() {
            self.pickup_in_illegal_state(lifted);
        } else if lifted.piece.color() != self.turn {
            // an enemy piece leaving the board first: a capture is starting
            self.victim = Some(lifted);
        } else if let Some(victim) = self.victim {
            self.pickup_killer(victim, lifted);
        } else if self.pawn_to_promote.is_some() {
            self.pickup_during_promotion(lifted);
        } else if self.last_transition == Transition::Pickup
            && self
                .last_pickup
                .is_some_and(|p| p.piece.color() == lifted.piece.color())
        {
            // two same-side pickups in a row can only mean a castle
            self.pickup_castle_partner(lifted);
        }
        // plain pickup: nothing to decide until the piece comes down
        // (out-of-turn lifts were already routed to the victim branch above)

        self.last_pickup = Some(lifted);
        self.last_transition = Transition::Pickup;
    }

    /// Feeds one PLACE edge. No-op if the model already has a piece on
    /// `square` (the sweep never produces such an event).
    pub fn place(&mut self, square: Square) {
        if self.board.is_present(square) {
            warn!("place reported on occupied square {square}");
            return;
        }
        debug!("place: {square}");

        if !self.illegal.is_empty() {
            self.place_in_illegal_state(square);
        } else if let Some(last) = self.last_pickup.filter(|p| {
            // Straight back down is not a move — except on a pending
            // promotion square, where this very placement is the replacement
            // piece coming down.
            p.square == square && !self.pawn_to_promote.is_some_and(|pp| pp.square == square)
        }) {
            self.board.set(square, Some(last.piece));
        } else if let Some(victim) = self.victim {
            self.place_killer(victim, square);
        } else if self.expected_king_castle.is_some() || self.expected_rook_castle.is_some() {
            self.place_castle(square);
        } else if let Some(pawn) = self.pawn_to_promote {
            self.place_promotion(pawn, square);
        } else {
            self.place_move(square);
        }

        self.last_transition = Transition::Place;
    }

    /// PICKUP while reconciliation entries are outstanding. Lifting a piece
    /// that has to leave the board discharges its entry; lifting one that
    /// still has to land somewhere changes nothing (the landing will
    /// discharge it); lifting an uninvolved piece obliges putting it back.
    fn pickup_in_illegal_state(&mut self, lifted: PlacedPiece) {
        let position = self.illegal.iter().position(|entry| {
            entry.piece == lifted.piece && entry.current == Location::OnBoard(lifted.square)
        });
        match position {
            Some(i) => {
                if self.illegal[i].destination == Location::Offboard {
                    let entry = self.illegal.remove(i);
                    debug!("discharged: {entry}");
                    self.after_reconciliation();
                }
            }
            None => self.push_illegal(IllegalEntry::put_back(lifted.piece, lifted.square)),
        }
    }

    /// Own piece lifted while an enemy piece is in the air: it has to be able
    /// to take the victim. The victim is restored for the test — a pawn's
    /// capture diagonal only generates when the target square is occupied.
    fn pickup_killer(&mut self, victim: PlacedPiece, killer: PlacedPiece) {
        self.board.set(victim.square, Some(victim.piece));
        let valid = legal_squares(&self.board, killer, true).contains(&victim.square);
        self.board.set(victim.square, None);

        if !valid {
            debug!("{killer} cannot take {victim}; both go back");
            self.push_illegal(IllegalEntry::put_back(victim.piece, victim.square));
            self.push_illegal(IllegalEntry::put_back(killer.piece, killer.square));
            self.victim = None;
        }
    }

    /// During a promotion only the promoting pawn may leave the board.
    fn pickup_during_promotion(&mut self, lifted: PlacedPiece) {
        if Some(lifted) != self.pawn_to_promote {
            self.push_illegal(IllegalEntry::put_back(lifted.piece, lifted.square));
        }
    }

    /// Second same-side pickup in a row: a castle attempt. The pair must be
    /// a king and a rook with their rights intact, and neither landing
    /// square may leave the king attacked; anything else sends both pieces
    /// back where they came from.
    fn pickup_castle_partner(&mut self, lifted: PlacedPiece) {
        let first = self
            .last_pickup
            .expect("castle branch requires a preceding pickup");

        let pair = match (first.piece.piece_type(), lifted.piece.piece_type()) {
            (PieceType::King, PieceType::Rook) => Some((lifted, first)),
            (PieceType::Rook, PieceType::King) => Some((first, lifted)),
            _ => None,
        };

        if let Some((rook, king)) = pair {
            if self.castling.allows(rook, king) {
                let (king_dest, rook_dest) = castle_destinations(rook.square);
                if !would_self_check(&self.board, rook, rook_dest)
                    && !would_self_check(&self.board, king, king_dest)
                {
                    debug!("castle armed: king to {king_dest}, rook to {rook_dest}");
                    self.expected_king_castle = Some(PlacedPiece::new(king.piece, king_dest));
                    self.expected_rook_castle = Some(PlacedPiece::new(rook.piece, rook_dest));
                    return;
                }
            }
        }

        self.push_illegal(IllegalEntry::put_back(lifted.piece, lifted.square));
        self.push_illegal(IllegalEntry::put_back(first.piece, first.square));
    }

    /// PLACE while reconciliation entries are outstanding. Landing on an
    /// entry's destination installs that entry's piece and discharges it;
    /// landing anywhere else adds the placed object to the list as something
    /// that has to leave the board again.
    fn place_in_illegal_state(&mut self, square: Square) {
        let position = self
            .illegal
            .iter()
            .position(|entry| entry.destination == Location::OnBoard(square));
        match position {
            Some(i) => {
                let entry = self.illegal.remove(i);
                self.board.set(square, Some(entry.piece));
                debug!("discharged: {entry}");
                self.after_reconciliation();
            }
            None => self.place_foreign(square),
        }
    }

    /// A placement with no matching expectation. The identity written to the
    /// cell is the best available context — the piece most recently in hand,
    /// else an enemy pawn (a captured piece being returned to the board is
    /// the plausible case). The cell must be written with *something*: an
    /// empty model cell under a raised sensor bit would re-emit this edge on
    /// every sweep, and the object's eventual removal could never produce a
    /// pickup edge to discharge the entry.
    fn place_foreign(&mut self, square: Square) {
        let piece = self
            .last_pickup
            .map(|p| p.piece)
            .unwrap_or_else(|| Piece::new(self.turn.flip(), PieceType::Pawn));
        self.board.set(square, Some(piece));
        self.push_illegal(IllegalEntry::remove_from(piece, square));
    }

    /// PLACE while an enemy piece is in the air. On the victim's square the
    /// capture completes; anywhere else the killer is installed where it
    /// landed with an obligation to move it onto the victim's square, and
    /// the turn commits once the board is clean again.
    fn place_killer(&mut self, victim: PlacedPiece, square: Square) {
        let killer = self
            .last_pickup
            .expect("a capture cannot complete without a pickup");

        self.board.set(square, Some(killer.piece));
        if square == victim.square {
            self.victim = None;
            self.end_turn();
        } else {
            debug!("{killer} landed on {square} instead of {}", victim.square);
            self.push_illegal(IllegalEntry::relocate(killer.piece, square, victim.square));
            self.commit_turn_when_clean = true;
        }
    }

    /// PLACE while a castle is armed. The two expected squares consume the
    /// king and rook in either order; a placement elsewhere turns whatever
    /// is still pending into reconciliation entries (the turn then commits
    /// once they are worked off). When nothing is pending any more the turn
    /// ends.
    fn place_castle(&mut self, square: Square) {
        if let Some(king) = self.expected_king_castle.filter(|k| k.square == square) {
            self.board.set(square, Some(king.piece));
            self.expected_king_castle = None;
        } else if let Some(rook) = self.expected_rook_castle.filter(|r| r.square == square) {
            self.board.set(square, Some(rook.piece));
            self.expected_rook_castle = None;
        } else {
            // Wrong square. The cell gets the pending piece (the rook if
            // both are still in the air) and the expected slots stay armed;
            // the entries pushed here carry the obligation from now on, and
            // end_turn clears the slots once the list is worked off.
            if let Some(king) = self.expected_king_castle {
                self.board.set(square, Some(king.piece));
                self.push_illegal(IllegalEntry::relocate(king.piece, square, king.square));
                self.commit_turn_when_clean = true;
            }
            if let Some(rook) = self.expected_rook_castle {
                self.board.set(square, Some(rook.piece));
                self.push_illegal(IllegalEntry::relocate(rook.piece, square, rook.square));
                self.commit_turn_when_clean = true;
            }
        }

        if self.expected_king_castle.is_none() && self.expected_rook_castle.is_none() {
            self.end_turn();
        }
    }

    /// PLACE while a promotion is pending. On the pawn's square the chosen
    /// replacement (side channel; queen unless knight) is installed and the
    /// turn ends; anywhere else the placement has to be walked back to the
    /// pawn's square first.
    fn place_promotion(&mut self, pawn: PlacedPiece, square: Square) {
        if square == pawn.square {
            let kind = match self.channel.promotion_choice() {
                PieceType::Knight => PieceType::Knight,
                _ => PieceType::Queen,
            };
            let promoted = Piece::new(pawn.piece.color(), kind);
            info!("{} promotes to {promoted} on {square}", pawn.piece.color());
            self.board.set(square, Some(promoted));
            self.pawn_to_promote = None;
            self.end_turn();
        } else {
            self.board.set(square, Some(pawn.piece));
            self.push_illegal(IllegalEntry::relocate(pawn.piece, square, pawn.square));
        }
    }

    /// A plain placement: the lifted piece landing somewhere new. Legal
    /// destinations end the turn (or arm promotion); anything else is
    /// installed where it landed with an obligation to go back.
    fn place_move(&mut self, square: Square) {
        let Some(moved) = self.last_pickup else {
            // nothing was lifted, yet something landed
            self.place_foreign(square);
            return;
        };

        let legal = legal_squares(&self.board, moved, true).contains(&square);
        self.board.set(square, Some(moved.piece));

        if !legal {
            debug!("{moved} may not move to {square}");
            self.push_illegal(IllegalEntry::relocate(moved.piece, square, moved.square));
        } else if moved.piece.is_pawn()
            && moved.piece.color() == self.turn
            && square.row() == self.turn.promotion_row()
        {
            // the pawn has to come back off as a queen or knight before the
            // turn can end
            info!("promotion pending on {square}");
            self.pawn_to_promote = Some(PlacedPiece::new(moved.piece, square));
            self.channel.on_promotion_required(square);
        } else {
            self.end_turn();
        }
    }

    /// Called whenever an entry is discharged: an empty list means the board
    /// is legal again, and ends the turn if one was committed.
    fn after_reconciliation(&mut self) {
        if self.illegal.is_empty() {
            info!("board back in a legal state");
            if self.commit_turn_when_clean {
                self.end_turn();
            }
        }
    }

    fn push_illegal(&mut self, entry: IllegalEntry) {
        debug_assert!(!self.illegal.is_full(), "illegal-piece list overflow");
        if self.illegal.try_push(entry).is_ok() {
            debug!("obligation: {entry}");
            self.channel.on_illegal_state(&self.illegal);
        } else {
            warn!("illegal-piece list full; dropping: {entry}");
        }
    }

    fn end_turn(&mut self) {
        self.castling.clear_vacated(&self.board);

        self.commit_turn_when_clean = false;
        self.last_pickup = None;
        self.victim = None;
        self.expected_king_castle = None;
        self.expected_rook_castle = None;
        self.pawn_to_promote = None;

        self.turn = self.turn.flip();
        info!("{} to move", self.turn);
        self.channel.on_turn_changed(self.turn);
    }
}

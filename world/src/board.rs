//! Registry of the pieces living on a board.

use piece_arena_core::{BoardSize, ConfigError, PieceId};
use tracing::debug;

use crate::Piece;

/// Coordinate space and ordered registry of live pieces.
///
/// Pieces are kept in registration order, which is also the order in which
/// they are ticked.
#[derive(Debug)]
pub struct Board {
    size: BoardSize,
    pieces: Vec<Piece>,
    next_registration: u64,
}

impl Board {
    /// Creates an empty board with the provided dimensions.
    #[must_use]
    pub fn new(size: BoardSize) -> Self {
        Self {
            size,
            pieces: Vec::new(),
            next_registration: 0,
        }
    }

    /// Dimensions of the board.
    #[must_use]
    pub const fn size(&self) -> BoardSize {
        self.size
    }

    /// Number of registered pieces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Reports whether no piece is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Iterates registered pieces in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    /// Looks up a registered piece.
    #[must_use]
    pub fn piece(&self, id: &PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.id() == id)
    }

    /// Looks up a registered piece for mutation.
    #[must_use]
    pub fn piece_mut(&mut self, id: &PieceId) -> Option<&mut Piece> {
        self.pieces.iter_mut().find(|piece| piece.id() == id)
    }

    /// Reports whether a piece with the identifier is registered.
    #[must_use]
    pub fn contains(&self, id: &PieceId) -> bool {
        self.piece(id).is_some()
    }

    /// Registers a piece, returning the registration number it was given.
    ///
    /// Registration numbers are never reused, so they tell apart two pieces
    /// that shared an identifier at different times.
    pub fn add_piece(&mut self, mut piece: Piece) -> Result<u64, ConfigError> {
        if self.contains(piece.id()) {
            return Err(ConfigError::DuplicateId(piece.id().clone()));
        }

        let registration = self.next_registration;
        self.next_registration = self.next_registration.saturating_add(1);
        piece.set_registration(registration);
        debug!(piece = %piece.id(), class = piece.class(), "piece registered");
        self.pieces.push(piece);
        Ok(registration)
    }

    /// Removes a piece, returning it when it was registered.
    ///
    /// Removing an absent identifier is a no-op.
    pub fn remove_piece(&mut self, id: &PieceId) -> Option<Piece> {
        let index = self.pieces.iter().position(|piece| piece.id() == id)?;
        let piece = self.pieces.remove(index);
        debug!(piece = %id, "piece removed");
        Some(piece)
    }

    /// Advances every registered piece one tick in registration order.
    pub fn update_all(&mut self) {
        let bounds = self.size;
        for piece in &mut self.pieces {
            piece.update(bounds);
        }
    }
}

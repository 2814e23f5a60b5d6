#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative arena state management for Piece Arena.

mod board;
mod piece;
mod timers;

use piece_arena_core::{
    Clock, Command, ConfigError, Event, IdSource, PieceConfig, PieceId, Point, Timestamp,
};
use tracing::{debug, warn};

pub use board::Board;
pub use piece::{DeathCallback, Piece};
pub use timers::{DueTimer, LifespanTimers};

/// Represents the authoritative arena: one board, its lifespan timers, and
/// the clock and identifier source its pieces consume.
#[derive(Debug)]
pub struct Arena<C, I> {
    board: Board,
    timers: LifespanTimers,
    clock: C,
    ids: I,
    tick_index: u64,
}

impl<C: Clock, I: IdSource> Arena<C, I> {
    /// Creates an arena around an existing board.
    #[must_use]
    pub fn new(board: Board, clock: C, ids: I) -> Self {
        Self {
            board,
            timers: LifespanTimers::new(),
            clock,
            ids,
            tick_index: 0,
        }
    }

    /// Read-only access to the board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Read-only access to the pending lifespan timers.
    #[must_use]
    pub fn timers(&self) -> &LifespanTimers {
        &self.timers
    }

    /// Current time according to the arena's clock.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub const fn tick_index(&self) -> u64 {
        self.tick_index
    }

    /// Constructs a piece on the board.
    pub fn spawn(&mut self, config: PieceConfig) -> Result<PieceId, ConfigError> {
        self.spawn_with_callback(config, None)
    }

    /// Constructs a piece whose lifespan expiry reports to `death_callback`.
    pub fn spawn_with_callback(
        &mut self,
        config: PieceConfig,
        death_callback: Option<DeathCallback>,
    ) -> Result<PieceId, ConfigError> {
        let now = self.clock.now();
        Piece::construct(
            config,
            death_callback,
            &mut self.board,
            &mut self.timers,
            now,
        )
    }

    /// Removes a piece from the board, reporting whether it was present.
    pub fn deconstruct(&mut self, piece: &PieceId) -> bool {
        self.board.remove_piece(piece).is_some()
    }

    /// Retargets a piece, reporting whether it was present.
    pub fn update_target(&mut self, piece: &PieceId, target: Point) -> bool {
        match self.board.piece_mut(piece) {
            Some(piece) => {
                piece.update_target(target);
                true
            }
            None => false,
        }
    }

    /// Fires `shooter`'s weapon toward `target`.
    ///
    /// Returns the identifier of the spawned projectile, or `None` when the
    /// shooter is missing, unarmed or cooling down.
    pub fn fire(
        &mut self,
        shooter: &PieceId,
        target: Point,
        death_callback: Option<DeathCallback>,
    ) -> Option<PieceId> {
        let now = self.clock.now();
        let config = self
            .board
            .piece_mut(shooter)?
            .fire(target, now, &mut self.ids)?;

        match Piece::construct(
            config,
            death_callback,
            &mut self.board,
            &mut self.timers,
            now,
        ) {
            Ok(projectile) => {
                debug!(shooter = %shooter, projectile = %projectile, "projectile fired");
                Some(projectile)
            }
            Err(error) => {
                warn!(shooter = %shooter, %error, "projectile construction rejected");
                None
            }
        }
    }

    /// Runs every lifespan timer that is due, returning the pieces removed.
    ///
    /// A due piece's death callback runs before the piece leaves the board.
    /// Timers whose piece is already gone, or whose identifier now belongs to
    /// a later registration, are ignored.
    pub fn expire_due(&mut self) -> Vec<PieceId> {
        let now = self.clock.now();
        let mut expired = Vec::new();
        for timer in self.timers.drain_due(now) {
            let Some(piece) = self.board.piece_mut(&timer.piece) else {
                debug!(piece = %timer.piece, "timer fired for absent piece");
                continue;
            };
            if piece.registration() != timer.registration {
                debug!(piece = %timer.piece, "timer fired for replaced piece");
                continue;
            }

            if let Some(callback) = piece.take_death_callback() {
                callback(&timer.piece);
            }
            let _ = self.board.remove_piece(&timer.piece);
            debug!(piece = %timer.piece, due = timer.due.as_millis(), "piece expired");
            expired.push(timer.piece);
        }
        expired
    }

    /// Advances every piece one tick in registration order.
    pub fn tick(&mut self) {
        self.tick_index = self.tick_index.saturating_add(1);
        self.board.update_all();
    }

    /// Expires due timers and then ticks, returning the expired pieces.
    pub fn step(&mut self) -> Vec<PieceId> {
        let expired = self.expire_due();
        self.tick();
        expired
    }
}

/// Applies the provided command to the arena, broadcasting resulting events.
pub fn apply<C: Clock, I: IdSource>(
    arena: &mut Arena<C, I>,
    command: Command,
    out_events: &mut Vec<Event>,
) {
    match command {
        Command::Spawn { config } => match arena.spawn(config) {
            Ok(id) => {
                if let Some(piece) = arena.board.piece(&id) {
                    out_events.push(Event::PieceAdded {
                        options: piece.to_options(),
                    });
                }
            }
            Err(reason) => out_events.push(Event::PieceRejected { reason }),
        },
        Command::UpdateTarget { piece, target } => {
            let _ = arena.update_target(&piece, target);
        }
        Command::Fire { piece, target } => {
            if let Some(projectile) = arena.fire(&piece, target, None) {
                out_events.push(Event::ProjectileFired {
                    shooter: piece,
                    projectile: projectile.clone(),
                });
                if let Some(spawned) = arena.board.piece(&projectile) {
                    out_events.push(Event::PieceAdded {
                        options: spawned.to_options(),
                    });
                }
            }
        }
        Command::Deconstruct { piece } => {
            if arena.deconstruct(&piece) {
                out_events.push(Event::PieceRemoved { piece });
            }
        }
        Command::ExpireDue => {
            for piece in arena.expire_due() {
                out_events.push(Event::PieceExpired { piece });
            }
        }
        Command::Tick => {
            arena.tick();
            out_events.push(Event::Ticked { now: arena.now() });
        }
    }
}

/// Query functions that provide read-only access to the arena state.
pub mod query {
    use piece_arena_core::{BoardSize, Clock, IdSource, PieceId, PieceOptions, PieceUpdate};

    use super::Arena;

    /// Dimensions of the arena's board.
    #[must_use]
    pub fn board_size<C: Clock, I: IdSource>(arena: &Arena<C, I>) -> BoardSize {
        arena.board.size()
    }

    /// Full snapshot of one piece.
    #[must_use]
    pub fn piece_options<C: Clock, I: IdSource>(
        arena: &Arena<C, I>,
        piece: &PieceId,
    ) -> Option<PieceOptions> {
        arena.board.piece(piece).map(|piece| piece.to_options())
    }

    /// Full snapshots of every piece in registration order.
    #[must_use]
    pub fn all_options<C: Clock, I: IdSource>(arena: &Arena<C, I>) -> Vec<PieceOptions> {
        arena.board.iter().map(|piece| piece.to_options()).collect()
    }

    /// Synchronization snapshots of every piece in registration order.
    #[must_use]
    pub fn piece_updates<C: Clock, I: IdSource>(arena: &Arena<C, I>) -> Vec<PieceUpdate> {
        arena.board.iter().map(|piece| piece.to_update()).collect()
    }

    /// Identifiers of every armed piece in registration order.
    #[must_use]
    pub fn armed_pieces<C: Clock, I: IdSource>(arena: &Arena<C, I>) -> Vec<PieceId> {
        arena
            .board
            .iter()
            .filter(|piece| piece.weapon().is_some())
            .map(|piece| piece.id().clone())
            .collect()
    }
}

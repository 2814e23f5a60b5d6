//! Per-piece state and the per-tick movement algorithm.

use std::{fmt, time::Duration};

use piece_arena_core::{
    BoardSize, ConfigError, IdSource, PieceConfig, PieceId, PieceOptions, PieceUpdate, Point,
    Timestamp, Weapon, DEFAULT_CLASS, PROJECTILE_CLASS,
};
use tracing::debug;

use crate::{Board, LifespanTimers};

const DEFAULT_SIZE: f64 = 50.0;
const DEFAULT_BORDER_SIZE: f64 = 3.0;
const DEFAULT_SPEED: f64 = 2.0;

const PROJECTILE_SIZE: f64 = 10.0;
const PROJECTILE_SPEED: f64 = 8.0;
const PROJECTILE_BORDER_SIZE: f64 = 2.0;
const PROJECTILE_LIFESPAN: Duration = Duration::from_millis(500);

/// Callback invoked with a piece's identifier right before its lifespan
/// expiry removes it from the board.
pub type DeathCallback = Box<dyn FnOnce(&PieceId)>;

/// Single mobile entity living on a [`Board`].
pub struct Piece {
    id: PieceId,
    class: String,
    size: f64,
    border_size: f64,
    position: Point,
    target: Point,
    speed: f64,
    weapon: Option<Weapon>,
    death_callback: Option<DeathCallback>,
    registration: u64,
}

impl Piece {
    /// Validates `config`, registers the resulting piece on `board` and arms
    /// its lifespan timer when one is configured.
    ///
    /// Nothing is registered or scheduled when validation fails.
    pub fn construct(
        config: PieceConfig,
        death_callback: Option<DeathCallback>,
        board: &mut Board,
        timers: &mut LifespanTimers,
        now: Timestamp,
    ) -> Result<PieceId, ConfigError> {
        let lifespan = config.lifespan.filter(|millis| *millis != 0);
        let piece = Self::from_config(config, death_callback)?;
        let id = piece.id.clone();
        let registration = board.add_piece(piece)?;

        if let Some(millis) = lifespan {
            let due = timers.schedule_once(
                now,
                Duration::from_millis(millis),
                id.clone(),
                registration,
            );
            debug!(piece = %id, due = due.as_millis(), "lifespan timer armed");
        }

        Ok(id)
    }

    fn from_config(
        config: PieceConfig,
        death_callback: Option<DeathCallback>,
    ) -> Result<Self, ConfigError> {
        let id = config
            .id
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::MissingId)?;
        // Zero or NaN coordinates count as unset, same as a missing position.
        let position = config
            .position
            .filter(|position| is_set(position.x) && is_set(position.y))
            .ok_or(ConfigError::MissingPosition)?;

        Ok(Self {
            id,
            class: config
                .class
                .filter(|class| !class.is_empty())
                .unwrap_or_else(|| DEFAULT_CLASS.to_owned()),
            size: or_default(config.size, DEFAULT_SIZE),
            border_size: or_default(config.border_size, DEFAULT_BORDER_SIZE),
            position,
            target: config.target.unwrap_or(position),
            speed: or_default(config.speed, DEFAULT_SPEED),
            weapon: config
                .weapon
                .map(|weapon| Weapon::new(Duration::from_millis(weapon.cooldown))),
            death_callback,
            registration: 0,
        })
    }

    /// Identifier of the piece.
    #[must_use]
    pub fn id(&self) -> &PieceId {
        &self.id
    }

    /// Class tag of the piece.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Diameter of the piece.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Border width of the piece.
    #[must_use]
    pub fn border_size(&self) -> f64 {
        self.border_size
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Point the piece is seeking.
    #[must_use]
    pub fn target(&self) -> Point {
        self.target
    }

    /// Maximum distance travelled per tick.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Weapon carried by the piece, if any.
    #[must_use]
    pub fn weapon(&self) -> Option<&Weapon> {
        self.weapon.as_ref()
    }

    /// Captures a full descriptive snapshot of the piece.
    #[must_use]
    pub fn to_options(&self) -> PieceOptions {
        PieceOptions {
            id: self.id.clone(),
            position: self.position,
            target: self.target,
            size: self.size,
            border_size: self.border_size,
            speed: self.speed,
            class: self.class.clone(),
        }
    }

    /// Captures the lightweight synchronization snapshot of the piece.
    #[must_use]
    pub fn to_update(&self) -> PieceUpdate {
        PieceUpdate {
            id: self.id.clone(),
            position: self.position,
            target: self.target,
        }
    }

    /// Points the piece at a new target.
    pub fn update_target(&mut self, target: Point) {
        self.target.x = target.x;
        self.target.y = target.y;
    }

    /// Pulls the trigger toward `target`.
    ///
    /// Returns the configuration of the projectile to construct, or `None`
    /// when the piece is unarmed or its weapon is still cooling down. A
    /// successful shot records `now` as the weapon's last firing time.
    pub fn fire(
        &mut self,
        target: Point,
        now: Timestamp,
        ids: &mut dyn IdSource,
    ) -> Option<PieceConfig> {
        let weapon = self.weapon.as_mut()?;
        if !weapon.try_fire(now) {
            return None;
        }

        Some(
            PieceConfig::new(ids.next_id(), self.position)
                .with_target(target)
                .with_size(PROJECTILE_SIZE)
                .with_speed(PROJECTILE_SPEED)
                .with_border_size(PROJECTILE_BORDER_SIZE)
                .with_class(PROJECTILE_CLASS)
                .with_lifespan(PROJECTILE_LIFESPAN),
        )
    }

    /// Advances the piece one tick toward its target and clamps it inside
    /// the board.
    ///
    /// Movement is capped at `speed`; a target closer than that is reached in
    /// a single step. Each axis is clamped against the upper bound first and
    /// the lower bound second, so the lower bound wins on a board narrower
    /// than the piece.
    pub fn update(&mut self, bounds: BoardSize) {
        let mut dx = self.target.x - self.position.x;
        let mut dy = self.target.y - self.position.y;
        if dx != 0.0 || dy != 0.0 {
            let factor = self.speed / (dx * dx + dy * dy).sqrt();
            if factor < 1.0 {
                dx *= factor;
                dy *= factor;
            }
        }

        let half = self.size / 2.0;
        self.position.x = (self.position.x + dx).min(bounds.width - half).max(half);
        self.position.y = (self.position.y + dy).min(bounds.height - half).max(half);
    }

    pub(crate) fn registration(&self) -> u64 {
        self.registration
    }

    pub(crate) fn set_registration(&mut self, registration: u64) {
        self.registration = registration;
    }

    pub(crate) fn take_death_callback(&mut self) -> Option<DeathCallback> {
        self.death_callback.take()
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Piece")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("size", &self.size)
            .field("border_size", &self.border_size)
            .field("position", &self.position)
            .field("target", &self.target)
            .field("speed", &self.speed)
            .field("weapon", &self.weapon)
            .field("death_callback", &self.death_callback.is_some())
            .finish()
    }
}

fn is_set(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

fn or_default(value: Option<f64>, default: f64) -> f64 {
    value.filter(|value| is_set(*value)).unwrap_or(default)
}

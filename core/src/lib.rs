#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Piece Arena engine.
//!
//! This crate defines the value types that flow between the authoritative
//! arena and its adapters. Adapters submit [`Command`] values describing
//! desired mutations, the arena executes them through its `apply` entry point,
//! and then broadcasts [`Event`] values. Rendering and network layers consume
//! the [`PieceOptions`] and [`PieceUpdate`] snapshots, which are owned copies
//! and never alias arena state.

mod clock;
mod ids;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ids::{IdSource, RandomIds};

/// Class tag applied to pieces that do not specify one.
pub const DEFAULT_CLASS: &str = "piece";

/// Class tag applied to projectiles spawned by a weapon.
pub const PROJECTILE_CLASS: &str = "projectile piece";

/// Commands that express all permissible arena mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Constructs a piece from the provided configuration.
    Spawn {
        /// Configuration describing the piece.
        config: PieceConfig,
    },
    /// Points a piece at a new target.
    UpdateTarget {
        /// Piece to retarget.
        piece: PieceId,
        /// Point the piece should seek.
        target: Point,
    },
    /// Asks a piece to fire its weapon toward a point.
    Fire {
        /// Piece pulling the trigger.
        piece: PieceId,
        /// Point the projectile should seek.
        target: Point,
    },
    /// Removes a piece from the board.
    Deconstruct {
        /// Piece to remove.
        piece: PieceId,
    },
    /// Expires every lifespan timer due at the current time.
    ExpireDue,
    /// Moves every registered piece one step toward its target.
    Tick,
}

/// Events broadcast by the arena after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a piece was registered on the board.
    PieceAdded {
        /// Full description of the new piece.
        options: PieceOptions,
    },
    /// Reports that a spawn request carried an invalid configuration.
    PieceRejected {
        /// Reason the configuration was refused.
        reason: ConfigError,
    },
    /// Confirms that a piece was removed from the board on request.
    PieceRemoved {
        /// Identifier of the removed piece.
        piece: PieceId,
    },
    /// Reports that a piece reached the end of its lifespan and was removed.
    PieceExpired {
        /// Identifier of the expired piece.
        piece: PieceId,
    },
    /// Confirms that a weapon fired and spawned a projectile.
    ProjectileFired {
        /// Piece that fired.
        shooter: PieceId,
        /// Identifier assigned to the projectile.
        projectile: PieceId,
    },
    /// Indicates that every piece advanced one step.
    Ticked {
        /// Time at which the step was taken.
        now: Timestamp,
    },
}

/// Reasons a piece configuration is refused at construction time.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No identifier, or an empty one, was supplied.
    #[error("piece id must be specified")]
    MissingId,
    /// No position was supplied, or one of its coordinates is zero or NaN.
    #[error("piece position must be specified with non-zero coordinates")]
    MissingPosition,
    /// Another piece with the same identifier is already registered.
    #[error("piece `{0}` is already registered on the board")]
    DuplicateId(PieceId),
}

/// Opaque identifier of a piece, unique among the pieces on one board.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PieceId(String);

impl PieceId {
    /// Wraps the provided string as a piece identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reports whether the identifier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point on the board measured in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Dimensions of the board's coordinate space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSize {
    /// Extent along the x axis.
    pub width: f64,
    /// Extent along the y axis.
    pub height: f64,
}

impl BoardSize {
    /// Creates a board size from its extents.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Instant measured in whole milliseconds since the Unix epoch.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The Unix epoch.
    pub const EPOCH: Self = Self(0);

    /// Creates a timestamp from milliseconds since the epoch.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds since the epoch.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns the timestamp `delta` later, saturating at the maximum.
    #[must_use]
    pub fn saturating_add(self, delta: Duration) -> Self {
        let millis = u64::try_from(delta.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }
}

/// Weapon carried by a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Weapon {
    cooldown: Duration,
    last: Timestamp,
}

impl Weapon {
    /// Creates a weapon that has never fired.
    #[must_use]
    pub const fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: Timestamp::EPOCH,
        }
    }

    /// Minimum time between successive shots.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Time of the most recent shot, or the epoch if the weapon never fired.
    #[must_use]
    pub const fn last(&self) -> Timestamp {
        self.last
    }

    /// Earliest time at which the next shot is permitted.
    #[must_use]
    pub fn ready_at(&self) -> Timestamp {
        self.last.saturating_add(self.cooldown)
    }

    /// Reports whether a shot is permitted at `now`.
    #[must_use]
    pub fn is_ready(&self, now: Timestamp) -> bool {
        self.ready_at() <= now
    }

    /// Records a shot at `now` when the cooldown allows it.
    ///
    /// Returns `false` and leaves the weapon untouched while cooling down.
    pub fn try_fire(&mut self, now: Timestamp) -> bool {
        if !self.is_ready(now) {
            return false;
        }
        self.last = now;
        true
    }
}

/// Weapon section of a [`PieceConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponConfig {
    /// Minimum milliseconds between shots.
    pub cooldown: u64,
}

/// Construction options for a piece.
///
/// Every field is optional so that configurations can be loaded from loosely
/// specified scenario files; construction validates the required ones.
/// Numeric options that are zero or NaN count as absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PieceConfig {
    /// Identifier of the piece. Required.
    pub id: Option<PieceId>,
    /// Starting position. Required, with non-zero coordinates.
    pub position: Option<Point>,
    /// Class tag consumed by renderers.
    pub class: Option<String>,
    /// Diameter used for boundary clamping.
    pub size: Option<f64>,
    /// Width of the rendered border.
    pub border_size: Option<f64>,
    /// Initial point to seek. Defaults to the starting position.
    pub target: Option<Point>,
    /// Maximum distance travelled per tick.
    pub speed: Option<f64>,
    /// Weapon carried by the piece.
    pub weapon: Option<WeaponConfig>,
    /// Milliseconds after construction at which the piece self-destructs.
    pub lifespan: Option<u64>,
}

impl PieceConfig {
    /// Creates a configuration with the required fields populated.
    #[must_use]
    pub fn new(id: PieceId, position: Point) -> Self {
        Self {
            id: Some(id),
            position: Some(position),
            ..Self::default()
        }
    }

    /// Sets the class tag.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Sets the diameter.
    #[must_use]
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the border width.
    #[must_use]
    pub fn with_border_size(mut self, border_size: f64) -> Self {
        self.border_size = Some(border_size);
        self
    }

    /// Sets the initial target.
    #[must_use]
    pub fn with_target(mut self, target: Point) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the maximum distance travelled per tick.
    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Arms the piece with a weapon using the provided cooldown.
    #[must_use]
    pub fn with_weapon(mut self, cooldown: Duration) -> Self {
        self.weapon = Some(WeaponConfig {
            cooldown: duration_to_millis(cooldown),
        });
        self
    }

    /// Schedules self-destruction `lifespan` after construction.
    #[must_use]
    pub fn with_lifespan(mut self, lifespan: Duration) -> Self {
        self.lifespan = Some(duration_to_millis(lifespan));
        self
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Full descriptive snapshot of a piece.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceOptions {
    /// Identifier of the piece.
    pub id: PieceId,
    /// Position at the time of the snapshot.
    pub position: Point,
    /// Target at the time of the snapshot.
    pub target: Point,
    /// Diameter of the piece.
    pub size: f64,
    /// Border width of the piece.
    pub border_size: f64,
    /// Maximum distance travelled per tick.
    pub speed: f64,
    /// Class tag of the piece.
    pub class: String,
}

/// Lightweight snapshot used for periodic synchronization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceUpdate {
    /// Identifier of the piece.
    pub id: PieceId,
    /// Position at the time of the snapshot.
    pub position: Point,
    /// Target at the time of the snapshot.
    pub target: Point,
}

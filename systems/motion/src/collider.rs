use cellbound_core::{CellCoord, ColliderSpec, Velocity};

use crate::{body::Body, TickContext};

/// Collision response strategy owned by a single object.
///
/// Each variant keeps a little per-tick state that
/// [`Collider::reset_collision`] clears before the next scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Collider {
    /// Zeroes the owner's velocity; a terminal stop also destroys the owner.
    Stop {
        /// Destroys the owner on collision when set.
        terminal: bool,
        /// Collisions handled since the last reset.
        hits: u32,
    },
    /// Reverses the owner's velocity, at most once per tick.
    Bounce {
        /// Set once the velocity was reversed this tick.
        reflected: bool,
    },
    /// Erases struck cells from the owner's shape.
    Damage {
        /// Cells erased since the last reset.
        struck: Vec<CellCoord>,
    },
}

impl Collider {
    /// Collider that halts its owner.
    #[must_use]
    pub const fn stop() -> Self {
        Self::Stop {
            terminal: false,
            hits: 0,
        }
    }

    /// Collider that halts and destroys its owner.
    #[must_use]
    pub const fn terminal_stop() -> Self {
        Self::Stop {
            terminal: true,
            hits: 0,
        }
    }

    /// Collider that reverses its owner's velocity.
    #[must_use]
    pub const fn bounce() -> Self {
        Self::Bounce { reflected: false }
    }

    /// Collider that erases struck cells from its owner.
    #[must_use]
    pub const fn damage() -> Self {
        Self::Damage { struck: Vec::new() }
    }

    /// Self-collision pass: revises the owner's pending velocity.
    pub fn run_collision(&mut self, body: &mut Body, ctx: &mut TickContext<'_>) {
        match self {
            Self::Stop { terminal, hits } => {
                *hits = hits.saturating_add(1);
                body.set_velocity(Velocity::ZERO);
                if *terminal && body.destroy(ctx.grid, ctx.registry) {
                    log::debug!("object {} stopped for good", body.id().get());
                }
            }
            Self::Bounce { reflected } => {
                if !*reflected {
                    *reflected = true;
                    body.set_velocity(body.velocity().reversed());
                }
            }
            Self::Damage { .. } => {}
        }
    }

    /// Damage pass: applies the hit landing on `cell` to the owner.
    pub fn collide(&mut self, body: &mut Body, cell: CellCoord, ctx: &mut TickContext<'_>) {
        let Self::Damage { struck } = self else {
            return;
        };

        match body.remove_cell(cell, ctx.grid) {
            Ok(marker) => {
                log::trace!(
                    "object {} lost '{}' at ({}, {})",
                    body.id().get(),
                    marker.glyph(),
                    cell.column(),
                    cell.row()
                );
                struck.push(cell);
            }
            Err(error) => log::trace!("object {} unharmed: {error}", body.id().get()),
        }

        if body.shape().is_empty() && body.retire(ctx.grid, ctx.registry) {
            log::debug!("object {} destroyed by damage", body.id().get());
        }
    }

    /// Clears the state accumulated during the current tick.
    pub fn reset_collision(&mut self) {
        match self {
            Self::Stop { hits, .. } => *hits = 0,
            Self::Bounce { reflected } => *reflected = false,
            Self::Damage { struck } => struck.clear(),
        }
    }

    /// Number of collisions this collider handled since the last reset.
    #[must_use]
    pub fn hits(&self) -> usize {
        match self {
            Self::Stop { hits, .. } => usize::try_from(*hits).unwrap_or(usize::MAX),
            Self::Bounce { reflected } => usize::from(*reflected),
            Self::Damage { struck } => struck.len(),
        }
    }
}

impl From<ColliderSpec> for Collider {
    fn from(spec: ColliderSpec) -> Self {
        match spec {
            ColliderSpec::Stop => Self::stop(),
            ColliderSpec::TerminalStop => Self::terminal_stop(),
            ColliderSpec::Bounce => Self::bounce(),
            ColliderSpec::Damage => Self::damage(),
        }
    }
}

use cellbound_core::{ModifierSpec, Velocity};

/// Per-tick velocity transform owned by a single object.
///
/// Modifiers only ever see the owner's velocity, never other objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modifier {
    /// Adds a fixed delta on every move.
    Acceleration {
        /// Column delta added per move.
        ddx: i32,
        /// Row delta added per move.
        ddy: i32,
    },
    /// Clamps each component to `[-max, max]`.
    SpeedLimit {
        /// Largest magnitude allowed on either axis.
        max: u32,
    },
}

impl Modifier {
    /// Rewrites the velocity in place.
    pub fn apply(&self, velocity: &mut Velocity) {
        *velocity = match *self {
            Self::Acceleration { ddx, ddy } => Velocity::new(
                velocity.dx().saturating_add(ddx),
                velocity.dy().saturating_add(ddy),
            ),
            Self::SpeedLimit { max } => {
                let max = i32::try_from(max).unwrap_or(i32::MAX);
                Velocity::new(velocity.dx().clamp(-max, max), velocity.dy().clamp(-max, max))
            }
        };
    }
}

impl From<ModifierSpec> for Modifier {
    fn from(spec: ModifierSpec) -> Self {
        match spec {
            ModifierSpec::Acceleration { ddx, ddy } => Self::Acceleration { ddx, ddy },
            ModifierSpec::SpeedLimit { max } => Self::SpeedLimit { max },
        }
    }
}

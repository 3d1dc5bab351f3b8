//! Experimental phases and the behaviour they imply

use crate::particle::ParticleKind;

/// Experiment mode selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Proton,
    LightWave,
    Electron,
    Observer,
}

/// What a particle does when it reaches the detection screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionBehavior {
    /// Freeze in place as a persistent mark
    Mark,
    /// Disappear; the hit is represented by the aggregate pattern instead
    Vanish,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Proton,
        Phase::LightWave,
        Phase::Electron,
        Phase::Observer,
    ];

    /// Species emitted in this phase, `None` if the phase shows a wave instead
    pub fn species(self) -> Option<ParticleKind> {
        match self {
            Phase::Proton => Some(ParticleKind::Proton),
            Phase::LightWave => None,
            Phase::Electron | Phase::Observer => Some(ParticleKind::Electron),
        }
    }

    /// Screen behaviour for a particle of `kind` in this phase.
    ///
    /// Electrons only vanish while the interference pattern is accumulating.
    /// With an observer watching the slits they land as ordinary marks.
    pub fn detection(self, kind: ParticleKind) -> DetectionBehavior {
        match (kind, self) {
            (ParticleKind::Electron, Phase::Electron) => DetectionBehavior::Vanish,
            _ => DetectionBehavior::Mark,
        }
    }

    pub fn shows_light_cone(self) -> bool {
        self == Phase::LightWave
    }

    pub fn shows_trapezoids(self) -> bool {
        self == Phase::LightWave
    }

    pub fn shows_observer(self) -> bool {
        self == Phase::Observer
    }

    /// Whether the screen carries an aggregate texture in this phase.
    /// The observer phase shows the which-path bands instead of fringes.
    pub fn shows_pattern(self) -> bool {
        self != Phase::Proton
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Proton => "Proton",
            Phase::LightWave => "Wave",
            Phase::Electron => "Electron",
            Phase::Observer => "Add an Observer",
        }
    }

    /// Text of the label above the generator
    pub fn generator_label(self) -> &'static str {
        match self {
            Phase::Proton => "Proton Generator",
            Phase::LightWave => "Light Source",
            Phase::Electron | Phase::Observer => "Electron Gun",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Phase::Proton => {
                "Protons pass through two slits, creating random impact points on the screen. \
                 Due to their shorter de Broglie wavelength (λ = h / p) from higher mass, \
                 interference is absent in this scenario."
            }
            Phase::LightWave => {
                "Light passes through both slits at once. The two diffracted waves overlap and \
                 interfere, producing alternating bright and dark fringes on the screen."
            }
            Phase::Electron => {
                "Electrons are fired one at a time. Each one lands at a single point, yet the \
                 hits slowly build up the same interference fringes as the light wave."
            }
            Phase::Observer => {
                "A detector watches which slit each electron takes. The which-path information \
                 collapses the wave function and the interference pattern disappears."
            }
        }
    }
}

/// Capture session state machine.
///
/// State transitions:
/// ```text
/// idle → input-attached → ready ⇄ running
///   ↑          ↑            ↓       ↓
///   └──────────┴─────── destroyed ←─┘
/// ```
///
/// `destroyed` is re-entrant into `input-attached`: the session may be
/// rebuilt from scratch with a new input, which starts a new generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    InputAttached,
    Ready,
    Running,
    Destroyed,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed)
    }

    /// Whether the session currently holds a camera input.
    pub fn has_input(&self) -> bool {
        matches!(self, Self::InputAttached | Self::Ready | Self::Running)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InputAttached => "input-attached",
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Destroyed => "destroyed",
        }
    }
}

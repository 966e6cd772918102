//! Which feature is on screen.

use serde::{Deserialize, Serialize};

/// The five studio features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Unblur & 4K upscale.
    #[default]
    Upscale,
    /// Deep-thinking chat.
    Chat,
    /// Image analysis.
    Analyze,
    /// Text-to-image.
    Generate,
    /// Instruction edits.
    Edit,
}

impl Mode {
    /// Every mode, in navigation order.
    pub const ALL: [Mode; 5] = [
        Self::Upscale,
        Self::Chat,
        Self::Analyze,
        Self::Generate,
        Self::Edit,
    ];

    /// Navigation label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Upscale => "Unblur & 4K",
            Self::Chat => "Deep Chat",
            Self::Analyze => "Analyze",
            Self::Generate => "Generate",
            Self::Edit => "Magic Edit",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Holds the selected mode. Switching has no other effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeRouter {
    current: Mode,
}

impl ModeRouter {
    /// Currently visible mode.
    pub fn current(&self) -> Mode {
        self.current
    }

    /// Switches to `mode`, returning the previous one.
    pub fn select(&mut self, mode: Mode) -> Mode {
        std::mem::replace(&mut self.current, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_upscale() {
        assert_eq!(ModeRouter::default().current(), Mode::Upscale);
    }

    #[test]
    fn test_select_returns_previous() {
        let mut router = ModeRouter::default();
        assert_eq!(router.select(Mode::Chat), Mode::Upscale);
        assert_eq!(router.select(Mode::Chat), Mode::Chat);
        assert_eq!(router.current(), Mode::Chat);
    }

    #[test]
    fn test_labels() {
        let labels: Vec<_> = Mode::ALL.iter().map(Mode::label).collect();
        assert_eq!(
            labels,
            ["Unblur & 4K", "Deep Chat", "Analyze", "Generate", "Magic Edit"]
        );
    }
}

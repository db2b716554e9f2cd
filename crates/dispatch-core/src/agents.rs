//! Pane background colors for known agents.

/// RGB triple.
pub type Rgb = (u8, u8, u8);

/// Fixed agent → color table. Unknown agents get no tint.
#[derive(Debug, Clone)]
pub struct AgentPalette {
    entries: Vec<(String, Rgb)>,
}

impl Default for AgentPalette {
    fn default() -> Self {
        Self {
            entries: vec![
                ("droid".to_string(), (255, 140, 0)),
                ("claude".to_string(), (210, 180, 140)),
                ("codex".to_string(), (30, 30, 30)),
            ],
        }
    }
}

impl AgentPalette {
    pub fn color(&self, agent: &str) -> Option<Rgb> {
        self.entries
            .iter()
            .find(|(name, _)| name == agent)
            .map(|(_, rgb)| *rgb)
    }

    /// Names with a known color, in table order.
    pub fn agents(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

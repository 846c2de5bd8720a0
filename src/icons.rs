use serde::Deserialize;

/// Visual style for the transport buttons. `None` hides the control row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconStyle {
    #[default]
    Filled,
    Outline,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlIcon {
    Previous,
    Play,
    Pause,
    Next,
}

pub const REPEAT_GLYPH: &str = "🔁";
pub const REPEAT_ONE_GLYPH: &str = "🔂";
pub const SHUFFLE_GLYPH: &str = "🔀";

/// Glyph lookup for a transport button, or `None` when controls are hidden.
pub fn glyph(icon: ControlIcon, style: IconStyle) -> Option<&'static str> {
    let glyph = match (icon, style) {
        (_, IconStyle::None) => return None,
        (ControlIcon::Previous, _) => "⏮",
        (ControlIcon::Next, _) => "⏭",
        (ControlIcon::Pause, _) => "⏸",
        (ControlIcon::Play, IconStyle::Filled) => "▶",
        (ControlIcon::Play, IconStyle::Outline) => "⏵",
    };
    Some(glyph)
}

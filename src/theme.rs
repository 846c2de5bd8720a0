use anyhow::{anyhow, Result};
use eframe::egui::Color32;

use crate::palette::PaletteResult;

/// Static theme from user configuration. The dynamic palette overrides these
/// per channel when `dynamic` is set and an extraction result exists.
#[derive(Debug, Clone)]
pub struct ConfiguredTheme {
    pub background: Color32,
    pub text: Color32,
    pub primary: Color32,
    /// Background opacity in percent, 0-100.
    pub background_opacity: u8,
    pub border_radius: f32,
    pub dynamic: bool,
}

impl Default for ConfiguredTheme {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(24, 24, 37),
            text: Color32::from_rgb(230, 230, 230),
            primary: Color32::from_rgb(166, 227, 161),
            background_opacity: 100,
            border_radius: 8.0,
            dynamic: true,
        }
    }
}

/// Colors actually painted this frame. Computed per render, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTheme {
    pub background: Color32,
    pub text: Color32,
    pub primary: Color32,
}

/// Per-channel merge: the dynamic color wins only when dynamic theming is
/// enabled and the color exists.
pub fn resolve_channel(configured: Color32, dynamic: Option<Color32>, use_dynamic: bool) -> Color32 {
    match dynamic {
        Some(color) if use_dynamic => color,
        _ => configured,
    }
}

/// Resolve all three channels against one palette result. The palette is
/// taken as a whole so a half-finished extraction can never mix stale dynamic
/// channels with fresh configured ones.
pub fn resolve_theme(
    configured: &ConfiguredTheme,
    palette: Option<&PaletteResult>,
    use_dynamic: bool,
) -> ResolvedTheme {
    ResolvedTheme {
        background: resolve_channel(
            configured.background,
            palette.map(|p| p.background),
            use_dynamic,
        ),
        text: resolve_channel(configured.text, palette.map(|p| p.text), use_dynamic),
        primary: resolve_channel(configured.primary, palette.map(|p| p.primary), use_dynamic),
    }
}

/// Scale a color's alpha by an opacity percentage (0-100).
pub fn apply_opacity(color: Color32, percent: u8) -> Color32 {
    let percent = percent.min(100) as u32;
    let alpha = (color.a() as u32 * percent / 100) as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Parse `#rrggbb` / `rrggbb` / `#rgb` hex notation into a color.
pub fn parse_hex_color(value: &str) -> Result<Color32> {
    let hex = value.trim().trim_start_matches('#');
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16)?;
            let g = u8::from_str_radix(&hex[2..4], 16)?;
            let b = u8::from_str_radix(&hex[4..6], 16)?;
            Ok(Color32::from_rgb(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16)?;
            let g = u8::from_str_radix(&hex[1..2], 16)?;
            let b = u8::from_str_radix(&hex[2..3], 16)?;
            Ok(Color32::from_rgb(r * 17, g * 17, b * 17))
        }
        _ => Err(anyhow!("Invalid hex color: {value}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_palette() -> PaletteResult {
        PaletteResult {
            background: Color32::from_rgb(10, 20, 30),
            text: Color32::WHITE,
            primary: Color32::from_rgb(200, 120, 40),
        }
    }

    #[test]
    fn disabled_dynamic_theme_always_uses_configured() {
        let configured = Color32::from_rgb(1, 2, 3);
        let dynamic = Some(Color32::from_rgb(9, 9, 9));
        assert_eq!(resolve_channel(configured, dynamic, false), configured);
    }

    #[test]
    fn missing_palette_falls_back_per_channel() {
        let configured = ConfiguredTheme::default();
        let resolved = resolve_theme(&configured, None, true);
        assert_eq!(resolved.background, configured.background);
        assert_eq!(resolved.text, configured.text);
        assert_eq!(resolved.primary, configured.primary);
    }

    #[test]
    fn dynamic_palette_wins_when_enabled() {
        let configured = ConfiguredTheme::default();
        let palette = sample_palette();
        let resolved = resolve_theme(&configured, Some(&palette), true);
        assert_eq!(resolved.background, palette.background);
        assert_eq!(resolved.text, palette.text);
        assert_eq!(resolved.primary, palette.primary);
    }

    #[test]
    fn opacity_scales_alpha() {
        let color = Color32::from_rgb(50, 60, 70);
        assert_eq!(apply_opacity(color, 100).a(), 255);
        assert_eq!(apply_opacity(color, 0).a(), 0);
        assert_eq!(apply_opacity(color, 50).a(), 127);
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(
            parse_hex_color("#1e1e2e").unwrap(),
            Color32::from_rgb(0x1e, 0x1e, 0x2e)
        );
        assert_eq!(
            parse_hex_color("A6E3A1").unwrap(),
            Color32::from_rgb(0xa6, 0xe3, 0xa1)
        );
        assert_eq!(parse_hex_color("#fff").unwrap(), Color32::WHITE);
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("notacolor").is_err());
    }
}

mod artwork;
mod config;
mod icons;
mod palette;
mod position;
mod session;
mod theme;

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
    time::{Duration, Instant},
};

use eframe::egui::{
    self, Align2, Color32, ColorImage, CornerRadius, FontId, RichText, Sense, TextureHandle,
    TextureOptions, ViewportBuilder,
};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Alignment, Config, ConfigWatcher},
    icons::{glyph, ControlIcon, IconStyle, REPEAT_GLYPH, REPEAT_ONE_GLYPH, SHUFFLE_GLYPH},
    palette::PaletteResult,
    position::PositionInterpolator,
    session::{MediaCommand, MediaSnapshot, RepeatMode, SubscriptionHandle},
    theme::{apply_opacity, resolve_theme, ResolvedTheme},
};

const ARTWORK_TEXTURE_NAME: &str = "fono.artwork";
const PROGRESS_BAR_HEIGHT: f32 = 4.0;
const CONTROL_ICON_SIZE: f32 = 22.0;
const PLAY_ICON_SIZE: f32 = 28.0;
const SIDE_ICON_SIZE: f32 = 16.0;

/// Result of one artwork decode + palette extraction, produced off-thread.
/// `hash` carries the thumbnail identity the extraction was started for so
/// results that outlived their thumbnail can be discarded.
struct PaletteMessage {
    request_id: u64,
    hash: u64,
    image: Option<ColorImage>,
    palette: Option<PaletteResult>,
}

fn hash_bytes(data: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    hasher.finish()
}

fn format_timestamp(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Tidy a raw session title for display: drop a leading "Artist - " segment
/// and remove parenthesized qualifiers.
fn format_track_title(title: &str) -> String {
    let main = title.split(" - ").nth(1).unwrap_or(title);
    strip_parenthesized(main).trim().to_string()
}

fn strip_parenthesized(input: &str) -> String {
    let mut rest = input;
    let mut out = String::with_capacity(input.len());
    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')') else {
            break;
        };
        out.push_str(rest[..open].trim_end());
        rest = rest[open + close + 1..].trim_start();
    }
    out.push_str(rest);
    out
}

struct App {
    config: Config,
    config_watcher: Option<ConfigWatcher>,
    /// Last authoritative snapshot; replaced wholesale on every arrival.
    snapshot: MediaSnapshot,
    snapshot_rx: Option<Receiver<MediaSnapshot>>,
    subscription: Option<SubscriptionHandle>,
    channel_closed: bool,
    interpolator: PositionInterpolator,
    palette: Option<PaletteResult>,
    /// Identity (byte hash) of the artwork the current palette/texture
    /// belongs to, or was last requested for.
    thumbnail_identity: Option<u64>,
    thumbnail_texture: Option<TextureHandle>,
    palette_rx: Option<Receiver<PaletteMessage>>,
    palette_inflight: Option<u64>,
    next_palette_request: u64,
}

impl App {
    fn new(config: Config) -> Self {
        let (subscription, snapshot_rx) =
            session::subscribe(config.session.preferred_app.clone());
        let config_watcher = Config::source_path().and_then(|path| {
            ConfigWatcher::watch(path)
                .map_err(|err| tracing::debug!("config watcher unavailable: {err:?}"))
                .ok()
        });

        Self {
            config,
            config_watcher,
            snapshot: MediaSnapshot::default(),
            snapshot_rx: Some(snapshot_rx),
            subscription: Some(subscription),
            channel_closed: false,
            interpolator: PositionInterpolator::new(Instant::now()),
            palette: None,
            thumbnail_identity: None,
            thumbnail_texture: None,
            palette_rx: None,
            palette_inflight: None,
            next_palette_request: 0,
        }
    }

    #[cfg(test)]
    fn headless() -> Self {
        Self {
            config: Config::default(),
            config_watcher: None,
            snapshot: MediaSnapshot::default(),
            snapshot_rx: None,
            subscription: None,
            channel_closed: false,
            interpolator: PositionInterpolator::new(Instant::now()),
            palette: None,
            thumbnail_identity: None,
            thumbnail_texture: None,
            palette_rx: None,
            palette_inflight: None,
            next_palette_request: 0,
        }
    }

    fn poll_config(&mut self) {
        if let Some(watcher) = &self.config_watcher {
            if let Some(config) = watcher.poll() {
                // A changed preferred_app does not retarget the existing
                // subscription; that takes a restart.
                self.config = config;
            }
        }
    }

    fn drain_snapshots(&mut self) {
        let mut arrivals = Vec::new();
        let mut disconnected = false;
        if let Some(rx) = &self.snapshot_rx {
            loop {
                match rx.try_recv() {
                    Ok(snapshot) => arrivals.push(snapshot),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }
        if disconnected {
            // Terminal for the session: the last known snapshot stays on
            // screen, there is no reconnection.
            if !self.channel_closed {
                tracing::warn!("media session channel closed; state frozen");
            }
            self.channel_closed = true;
            self.snapshot_rx = None;
        }

        // Apply in arrival order so the latest writer wins.
        for snapshot in arrivals {
            self.apply_snapshot(snapshot);
        }
    }

    /// Accept one authoritative snapshot: hard-reset the position estimate
    /// (reset wins over any in-flight interpolation drift) and start a
    /// palette extraction if the artwork identity changed.
    fn apply_snapshot(&mut self, snapshot: MediaSnapshot) {
        self.interpolator.reset(
            snapshot.position_ms.unwrap_or(0),
            snapshot.playing,
            Instant::now(),
        );

        let identity = snapshot.thumbnail.as_deref().map(hash_bytes);
        if identity != self.thumbnail_identity {
            self.thumbnail_identity = identity;
            match (&snapshot.thumbnail, identity) {
                (Some(bytes), Some(hash)) => {
                    self.request_palette(bytes.clone(), snapshot.app_id.clone(), hash);
                }
                _ => {
                    self.thumbnail_texture = None;
                    self.palette = None;
                    self.palette_inflight = None;
                    self.palette_rx = None;
                }
            }
        }

        self.snapshot = snapshot;
    }

    fn request_palette(&mut self, bytes: Vec<u8>, app_id: Option<String>, hash: u64) {
        let request_id = self.next_palette_request;
        self.next_palette_request = self.next_palette_request.wrapping_add(1);
        self.palette_inflight = Some(request_id);

        let (tx, rx) = mpsc::channel();
        self.palette_rx = Some(rx);

        thread::spawn(move || {
            let message = match artwork::decode_artwork(&bytes, app_id.as_deref()) {
                Ok(image) => {
                    let palette = palette::extract_palette(&image);
                    PaletteMessage {
                        request_id,
                        hash,
                        image: Some(image),
                        palette,
                    }
                }
                Err(err) => {
                    // Extraction failure is silent: the overlay keeps the
                    // configured colors, no retry.
                    tracing::debug!("artwork decode failed: {err:?}");
                    PaletteMessage {
                        request_id,
                        hash,
                        image: None,
                        palette: None,
                    }
                }
            };
            let _ = tx.send(message);
        });
    }

    fn drain_palette(&mut self, ctx: &egui::Context) {
        let mut applied = None;
        let mut disconnected = false;

        if let Some(rx) = &self.palette_rx {
            loop {
                match rx.try_recv() {
                    Ok(message) => {
                        // Keyed to thumbnail identity: an extraction that was
                        // superseded while in flight is discarded, not applied.
                        if Some(message.request_id) != self.palette_inflight
                            || Some(message.hash) != self.thumbnail_identity
                        {
                            continue;
                        }
                        applied = Some(message);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }

        if let Some(message) = applied {
            self.palette_inflight = None;
            self.palette_rx = None;
            self.palette = message.palette;
            self.thumbnail_texture = message
                .image
                .map(|image| ctx.load_texture(ARTWORK_TEXTURE_NAME, image, TextureOptions::LINEAR));
        } else if disconnected {
            self.palette_rx = None;
        }
    }

    fn dispatch(&self, command: MediaCommand) {
        if let Some(subscription) = &self.subscription {
            subscription.dispatch(command);
        }
    }

    fn resolved_theme(&self) -> ResolvedTheme {
        resolve_theme(&self.config.theme, self.palette.as_ref(), self.config.theme.dynamic)
    }

    fn desired_repaint_interval(&self) -> Duration {
        if self.snapshot.playing {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(200)
        }
    }

    fn handle_window_drag(&self, ctx: &egui::Context) {
        if self.config.ui.lock_widget {
            return;
        }
        let pressed = ctx.input(|i| i.pointer.primary_pressed());
        if pressed && !ctx.is_using_pointer() {
            ctx.send_viewport_cmd(egui::ViewportCommand::StartDrag);
        }
    }

    fn corner_radius(&self) -> CornerRadius {
        CornerRadius::same(
            self.config
                .theme
                .border_radius
                .clamp(0.0, u8::MAX as f32)
                .round() as u8,
        )
    }

    fn render_artwork(&self, ui: &mut egui::Ui, side: f32, resolved: &ResolvedTheme) {
        let size = egui::vec2(side, side);
        let rounding = self.corner_radius();

        if let Some(texture) = &self.thumbnail_texture {
            let widget = egui::Image::new((texture.id(), size))
                .fit_to_exact_size(size)
                .corner_radius(rounding);
            ui.add(widget);
        } else {
            let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
            ui.painter_at(rect)
                .rect_filled(rect, rounding, Color32::from_rgb(75, 85, 99));
            if self.snapshot.app_id.is_some() {
                ui.painter_at(rect).text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    "No artwork",
                    FontId::proportional(12.0),
                    resolved.text,
                );
            }
        }
    }

    fn glyph_button(
        ui: &mut egui::Ui,
        symbol: &str,
        size: f32,
        color: Color32,
    ) -> egui::Response {
        let (rect, response) =
            ui.allocate_exact_size(egui::Vec2::splat(size + 6.0), Sense::click());
        if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }
        ui.painter_at(rect).text(
            rect.center(),
            Align2::CENTER_CENTER,
            symbol,
            FontId::proportional(size),
            color,
        );
        response
    }

    fn render_controls(&mut self, ui: &mut egui::Ui, resolved: &ResolvedTheme) {
        let style = self.config.ui.icon_style;
        if style == IconStyle::None {
            return;
        }

        ui.horizontal(|row| {
            row.spacing_mut().item_spacing.x = 4.0;

            let repeat_engaged = matches!(
                self.snapshot.repeat_mode,
                RepeatMode::Context | RepeatMode::Track
            );
            let repeat_symbol = if self.snapshot.repeat_mode == RepeatMode::Track {
                REPEAT_ONE_GLYPH
            } else {
                REPEAT_GLYPH
            };
            let repeat_color = if repeat_engaged {
                resolved.primary
            } else {
                resolved.text
            };
            if Self::glyph_button(row, repeat_symbol, SIDE_ICON_SIZE, repeat_color).clicked() {
                self.dispatch(MediaCommand::ChangeRepeatMode);
            }

            row.add_space((row.available_width() / 2.0 - 60.0).max(0.0));

            if let Some(symbol) = glyph(ControlIcon::Previous, style) {
                if Self::glyph_button(row, symbol, CONTROL_ICON_SIZE, resolved.text).clicked() {
                    self.dispatch(MediaCommand::SkipPrevious);
                }
            }

            let (play_pause, command) = if self.snapshot.playing {
                (ControlIcon::Pause, MediaCommand::Pause)
            } else {
                (ControlIcon::Play, MediaCommand::Play)
            };
            if let Some(symbol) = glyph(play_pause, style) {
                if Self::glyph_button(row, symbol, PLAY_ICON_SIZE, resolved.text).clicked() {
                    self.dispatch(command);
                }
            }

            if let Some(symbol) = glyph(ControlIcon::Next, style) {
                if Self::glyph_button(row, symbol, CONTROL_ICON_SIZE, resolved.text).clicked() {
                    self.dispatch(MediaCommand::SkipNext);
                }
            }

            row.allocate_ui_with_layout(
                egui::vec2(row.available_width(), 0.0),
                egui::Layout::right_to_left(egui::Align::Center),
                |end| {
                    let shuffle_color = if self.snapshot.shuffle {
                        resolved.primary
                    } else {
                        resolved.text
                    };
                    if Self::glyph_button(end, SHUFFLE_GLYPH, SIDE_ICON_SIZE, shuffle_color)
                        .clicked()
                    {
                        self.dispatch(MediaCommand::ChangeShuffleMode);
                    }
                },
            );
        });
    }

    fn render_progress(&self, ui: &mut egui::Ui, resolved: &ResolvedTheme) {
        let duration_ms = self.snapshot.duration_ms.unwrap_or(0);
        let ratio = self.interpolator.progress_ratio(duration_ms) as f32;

        let width = ui.available_width();
        let (rect, _) = ui.allocate_exact_size(egui::vec2(width, PROGRESS_BAR_HEIGHT), Sense::hover());
        let rounding = CornerRadius::same((PROGRESS_BAR_HEIGHT / 2.0) as u8);
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, rounding, resolved.background);
        if ratio > 0.0 {
            let mut fill = rect;
            fill.set_width(rect.width() * ratio);
            painter.rect_filled(fill, rounding, resolved.primary);
        }

        ui.horizontal(|row| {
            let label = |text: String| RichText::new(text).size(10.0).color(resolved.text);
            row.label(label(format_timestamp(self.interpolator.position_ms())));
            row.allocate_ui_with_layout(
                egui::vec2(row.available_width(), 0.0),
                egui::Layout::right_to_left(egui::Align::Center),
                |end| {
                    end.label(label(format_timestamp(duration_ms)));
                },
            );
        });
    }

    fn render_details(&mut self, ui: &mut egui::Ui, resolved: &ResolvedTheme) {
        ui.vertical_centered(|col| {
            let title = self
                .snapshot
                .title
                .as_deref()
                .map(format_track_title)
                .unwrap_or_default();
            col.add(
                egui::Label::new(
                    RichText::new(title)
                        .size(14.0)
                        .strong()
                        .color(resolved.text),
                )
                .truncate(),
            );
            if let Some(artist) = self.snapshot.artist.as_deref() {
                col.add(
                    egui::Label::new(RichText::new(artist).size(11.0).color(resolved.text))
                        .truncate(),
                );
            }
        });

        self.render_controls(ui, resolved);
        self.render_progress(ui, resolved);
    }

    fn render_empty_state(&self, ui: &mut egui::Ui, resolved: &ResolvedTheme) {
        let side = match self.config.ui.alignment {
            Alignment::Vertical => ui.available_width(),
            Alignment::Horizontal => ui.available_height(),
        };
        self.render_artwork(ui, side.max(48.0), resolved);
        ui.add_space(6.0);
        ui.vertical_centered(|col| {
            col.label(
                RichText::new("No media session")
                    .size(13.0)
                    .strong()
                    .color(resolved.text),
            );
        });
    }

    fn render_body(&mut self, ui: &mut egui::Ui, resolved: &ResolvedTheme) {
        if self.snapshot.app_id.is_none() {
            self.render_empty_state(ui, resolved);
            return;
        }

        match self.config.ui.alignment {
            Alignment::Horizontal => {
                ui.horizontal(|row| {
                    let side = row.available_height();
                    self.render_artwork(row, side, resolved);
                    row.add_space(4.0);
                    row.vertical(|col| self.render_details(col, resolved));
                });
            }
            Alignment::Vertical => {
                ui.vertical(|col| {
                    let side = col.available_width();
                    self.render_artwork(col, side, resolved);
                    col.add_space(4.0);
                    self.render_details(col, resolved);
                });
            }
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_config();
        self.drain_snapshots();
        self.drain_palette(ctx);
        // Render-clock tick, independent of snapshot cadence.
        self.interpolator.tick(Instant::now());

        let resolved = self.resolved_theme();

        let mut panel_frame = egui::Frame::central_panel(&ctx.style());
        panel_frame.fill = apply_opacity(resolved.background, self.config.theme.background_opacity);
        panel_frame.corner_radius = self.corner_radius();

        egui::CentralPanel::default()
            .frame(panel_frame)
            .show(ctx, |ui| {
                ui.spacing_mut().item_spacing.y = 4.0;
                self.render_body(ui, &resolved);
            });

        self.handle_window_drag(ctx);
        ctx.request_repaint_after(self.desired_repaint_interval());
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        // Transparent window; the panel frame paints the real background.
        [0.0, 0.0, 0.0, 0.0]
    }
}

// Subscription and render tick share a lifetime: dropping the app stops the
// tick and the handle's Drop unsubscribes the channel.
impl Drop for App {
    fn drop(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!("falling back to default config: {err:?}");
        Config::default()
    });

    let mut viewport = ViewportBuilder::default()
        .with_inner_size([config.window.width, config.window.height])
        .with_transparent(true)
        .with_decorations(false);
    if config.window.always_on_top {
        viewport = viewport.with_always_on_top();
    }
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let run_res = eframe::run_native(
        "Fono",
        native_options,
        Box::new(
            move |_cc| -> Result<Box<dyn eframe::App>, Box<dyn std::error::Error + Send + Sync>> {
                Ok(Box::new(App::new(config)))
            },
        ),
    );
    if let Err(e) = run_res {
        return Err(Box::new(e));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::Color32;

    fn playing_snapshot(position_ms: u64) -> MediaSnapshot {
        MediaSnapshot {
            app_id: Some("player.exe".to_string()),
            title: Some("Artist - Song".to_string()),
            playing: true,
            position_ms: Some(position_ms),
            duration_ms: Some(200_000),
            ..MediaSnapshot::default()
        }
    }

    #[test]
    fn snapshot_reset_wins_over_interpolation_drift() {
        let mut app = App::headless();
        let t0 = Instant::now();
        app.apply_snapshot(playing_snapshot(1000));

        // Let the estimate drift well past the next snapshot's position.
        app.interpolator.tick(t0 + Duration::from_secs(7));
        assert!(app.interpolator.position_ms() > 5000);

        app.apply_snapshot(playing_snapshot(5000));
        assert_eq!(app.interpolator.position_ms(), 5000);
    }

    #[test]
    fn later_snapshot_wins_by_arrival_order() {
        let mut app = App::headless();
        let first = playing_snapshot(1000);
        let second = MediaSnapshot {
            playing: false,
            ..playing_snapshot(3000)
        };

        app.apply_snapshot(first);
        app.apply_snapshot(second.clone());

        assert_eq!(app.snapshot, second);
        assert_eq!(app.interpolator.position_ms(), 3000);
        assert!(!app.interpolator.is_running());
    }

    #[test]
    fn unchanged_thumbnail_identity_skips_recomputation() {
        let mut app = App::headless();
        let mut snapshot = playing_snapshot(0);
        snapshot.thumbnail = Some(vec![1, 2, 3, 4]);

        app.apply_snapshot(snapshot.clone());
        let requests_after_first = app.next_palette_request;
        assert_eq!(requests_after_first, 1);

        app.apply_snapshot(snapshot);
        assert_eq!(app.next_palette_request, requests_after_first);
    }

    #[test]
    fn changed_thumbnail_identity_triggers_recomputation() {
        let mut app = App::headless();
        let mut snapshot = playing_snapshot(0);
        snapshot.thumbnail = Some(vec![1, 2, 3, 4]);
        app.apply_snapshot(snapshot.clone());

        snapshot.thumbnail = Some(vec![5, 6, 7, 8]);
        app.apply_snapshot(snapshot);
        assert_eq!(app.next_palette_request, 2);
    }

    #[test]
    fn cleared_thumbnail_drops_palette_and_texture() {
        let mut app = App::headless();
        app.thumbnail_identity = Some(42);
        app.palette = Some(PaletteResult {
            background: Color32::BLACK,
            text: Color32::WHITE,
            primary: Color32::RED,
        });

        app.apply_snapshot(playing_snapshot(0));
        assert_eq!(app.thumbnail_identity, None);
        assert!(app.palette.is_none());
    }

    #[test]
    fn stale_palette_result_is_discarded() {
        let ctx = egui::Context::default();
        let mut app = App::headless();
        app.palette_inflight = Some(2);
        app.thumbnail_identity = Some(99);

        let (tx, rx) = mpsc::channel();
        app.palette_rx = Some(rx);
        tx.send(PaletteMessage {
            request_id: 1,
            hash: 50,
            image: None,
            palette: Some(PaletteResult {
                background: Color32::BLACK,
                text: Color32::WHITE,
                primary: Color32::RED,
            }),
        })
        .unwrap();

        app.drain_palette(&ctx);
        assert!(app.palette.is_none());
        assert_eq!(app.palette_inflight, Some(2));
    }

    #[test]
    fn matching_palette_result_is_applied() {
        let ctx = egui::Context::default();
        let mut app = App::headless();
        app.palette_inflight = Some(3);
        app.thumbnail_identity = Some(7);

        let expected = PaletteResult {
            background: Color32::from_rgb(10, 20, 30),
            text: Color32::WHITE,
            primary: Color32::from_rgb(220, 120, 40),
        };
        let (tx, rx) = mpsc::channel();
        app.palette_rx = Some(rx);
        tx.send(PaletteMessage {
            request_id: 3,
            hash: 7,
            image: Some(ColorImage::new([2, 2], vec![Color32::WHITE; 4])),
            palette: Some(expected),
        })
        .unwrap();

        app.drain_palette(&ctx);
        assert_eq!(app.palette, Some(expected));
        assert!(app.thumbnail_texture.is_some());
        assert_eq!(app.palette_inflight, None);
    }

    #[test]
    fn extraction_failure_falls_back_to_configured_colors() {
        let ctx = egui::Context::default();
        let mut app = App::headless();
        app.palette_inflight = Some(0);
        app.thumbnail_identity = Some(11);
        app.palette = Some(PaletteResult {
            background: Color32::BLACK,
            text: Color32::WHITE,
            primary: Color32::RED,
        });

        let (tx, rx) = mpsc::channel();
        app.palette_rx = Some(rx);
        tx.send(PaletteMessage {
            request_id: 0,
            hash: 11,
            image: None,
            palette: None,
        })
        .unwrap();
        app.drain_palette(&ctx);

        assert!(app.palette.is_none());
        let resolved = app.resolved_theme();
        assert_eq!(resolved.background, app.config.theme.background);
        assert_eq!(resolved.text, app.config.theme.text);
        assert_eq!(resolved.primary, app.config.theme.primary);
    }

    #[test]
    fn disabled_dynamic_theme_ignores_the_palette() {
        let mut app = App::headless();
        app.config.theme.dynamic = false;
        app.palette = Some(PaletteResult {
            background: Color32::BLACK,
            text: Color32::WHITE,
            primary: Color32::RED,
        });

        let resolved = app.resolved_theme();
        assert_eq!(resolved.background, app.config.theme.background);
        assert_eq!(resolved.primary, app.config.theme.primary);
    }

    #[test]
    fn titles_are_tidied_for_display() {
        assert_eq!(format_track_title("Artist - Song"), "Song");
        assert_eq!(format_track_title("Song"), "Song");
        assert_eq!(format_track_title("Artist - Song (feat. X)"), "Song");
        assert_eq!(format_track_title("A - B - C"), "B");
        assert_eq!(strip_parenthesized("Song (Live) Tour"), "SongTour");
        assert_eq!(strip_parenthesized("Song (unclosed"), "Song (unclosed");
    }

    #[test]
    fn timestamps_render_like_a_player() {
        assert_eq!(format_timestamp(0), "0:00");
        assert_eq!(format_timestamp(61_000), "1:01");
        assert_eq!(format_timestamp(3_601_000), "1:00:01");
        assert_eq!(format_timestamp(999), "0:00");
    }
}

use std::cmp::Reverse;

use eframe::egui::{Color32, ColorImage};

/// Number of representative colors to quantize the artwork into.
const PALETTE_SIZE: usize = 8;
const MAX_SAMPLES: usize = 6_000;
const MAX_ITER: usize = 10;

/// Minimum euclidean distance (0-255 per-channel space) a palette entry must
/// keep from both the background and the text color to qualify as primary.
const MIN_CONTRAST_DISTANCE: f32 = 50.0;

/// Theme colors derived from one piece of artwork. Either fully populated or
/// absent; extraction never yields a partial result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteResult {
    pub background: Color32,
    pub text: Color32,
    pub primary: Color32,
}

/// Derive background/text/primary colors from decoded artwork pixels.
/// Returns `None` when the image has no usable pixels; the caller falls back
/// to the configured colors without retrying.
pub fn extract_palette(image: &ColorImage) -> Option<PaletteResult> {
    let samples = sample_pixels(image, MAX_SAMPLES);
    if samples.is_empty() {
        return None;
    }

    let k = PALETTE_SIZE.min(samples.len());
    let mut clusters = kmeans_clusters(&samples, k, MAX_ITER);
    if clusters.is_empty() {
        return None;
    }
    clusters.sort_by_key(|cluster| Reverse(cluster.count));

    let palette: Vec<Color32> = clusters
        .iter()
        .filter(|cluster| cluster.count > 0)
        .map(|cluster| color_from_centroid(cluster.centroid))
        .collect();
    let background = *palette.first()?;
    let text = text_color(background);
    let primary = pick_primary(&palette, background, text);

    Some(PaletteResult {
        background,
        text,
        primary,
    })
}

/// Relative luminance of an sRGB color, normalized to `[0, 1]`.
pub(crate) fn relative_luminance(color: Color32) -> f64 {
    (0.299 * color.r() as f64 + 0.587 * color.g() as f64 + 0.114 * color.b() as f64) / 255.0
}

/// Black over light backgrounds, white over dark ones. The boundary value
/// 0.5 resolves to white (strict `>` test).
pub(crate) fn pick_text(luminance: f64) -> Color32 {
    if luminance > 0.5 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

fn text_color(background: Color32) -> Color32 {
    pick_text(relative_luminance(background))
}

fn color_distance(a: Color32, b: Color32) -> f32 {
    let dr = a.r() as f32 - b.r() as f32;
    let dg = a.g() as f32 - b.g() as f32;
    let db = a.b() as f32 - b.b() as f32;
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Choose the palette entry farthest from both background and text among
/// those clearing the contrast threshold. When nothing qualifies, the first
/// entry is used regardless of its contrast.
fn pick_primary(palette: &[Color32], background: Color32, text: Color32) -> Color32 {
    let mut best = palette[0];
    let mut best_score = f32::NEG_INFINITY;

    for &candidate in palette {
        let dist_bg = color_distance(candidate, background);
        let dist_text = color_distance(candidate, text);
        let score = dist_bg + dist_text;
        if score > best_score
            && dist_bg > MIN_CONTRAST_DISTANCE
            && dist_text > MIN_CONTRAST_DISTANCE
        {
            best_score = score;
            best = candidate;
        }
    }

    best
}

#[derive(Clone, Copy)]
struct Cluster {
    centroid: [f32; 3],
    count: usize,
}

fn sample_pixels(image: &ColorImage, max_samples: usize) -> Vec<[f32; 3]> {
    if max_samples == 0 {
        return Vec::new();
    }

    let total = image.pixels.len();
    if total == 0 {
        return Vec::new();
    }

    let step = (total / max_samples).max(1);
    let mut samples = Vec::with_capacity(max_samples.min(total));

    for pixel in image.pixels.iter().step_by(step) {
        // Skip nearly transparent pixels; they carry no theme information.
        if pixel.a() < 16 {
            continue;
        }
        samples.push([pixel.r() as f32, pixel.g() as f32, pixel.b() as f32]);
        if samples.len() >= max_samples {
            break;
        }
    }

    samples
}

fn squared_distance(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

fn kmeans_clusters(samples: &[[f32; 3]], k: usize, max_iter: usize) -> Vec<Cluster> {
    if samples.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut centroids = Vec::with_capacity(k);
    for i in 0..k {
        let idx = (i * samples.len()) / k;
        let idx = idx.min(samples.len() - 1);
        centroids.push(samples[idx]);
    }

    let mut assignments = vec![0usize; samples.len()];

    for iter in 0..max_iter {
        let mut sums = vec![[0f32; 3]; k];
        let mut counts = vec![0usize; k];

        for (sample_idx, sample) in samples.iter().enumerate() {
            let mut best = 0usize;
            let mut best_dist = f32::MAX;
            for (centroid_idx, centroid) in centroids.iter().enumerate() {
                let dist = squared_distance(sample, centroid);
                if dist < best_dist {
                    best_dist = dist;
                    best = centroid_idx;
                }
            }

            assignments[sample_idx] = best;
            for channel in 0..3 {
                sums[best][channel] += sample[channel];
            }
            counts[best] += 1;
        }

        let mut changed = false;
        for i in 0..k {
            if counts[i] == 0 {
                centroids[i] = samples[(i + iter) % samples.len()];
                changed = true;
                continue;
            }
            let new_centroid = [
                sums[i][0] / counts[i] as f32,
                sums[i][1] / counts[i] as f32,
                sums[i][2] / counts[i] as f32,
            ];
            if squared_distance(&centroids[i], &new_centroid) > 1e-2 {
                changed = true;
            }
            centroids[i] = new_centroid;
        }

        if !changed {
            break;
        }
    }

    let mut counts = vec![0usize; k];
    for &assignment in &assignments {
        counts[assignment] += 1;
    }

    centroids
        .into_iter()
        .enumerate()
        .map(|(idx, centroid)| Cluster {
            centroid,
            count: counts[idx],
        })
        .collect()
}

fn color_from_centroid(centroid: [f32; 3]) -> Color32 {
    let r = centroid[0].clamp(0.0, 255.0).round() as u8;
    let g = centroid[1].clamp(0.0, 255.0).round() as u8;
    let b = centroid[2].clamp(0.0, 255.0).round() as u8;
    Color32::from_rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_image(size: usize, color: Color32) -> ColorImage {
        ColorImage::new([size, size], vec![color; size * size])
    }

    #[test]
    fn text_pick_is_strict_at_the_boundary() {
        assert_eq!(pick_text(0.5), Color32::WHITE);
        assert_eq!(pick_text(0.51), Color32::BLACK);
        assert_eq!(pick_text(0.0), Color32::WHITE);
        assert_eq!(pick_text(1.0), Color32::BLACK);
    }

    #[test]
    fn dark_background_gets_white_text() {
        assert_eq!(text_color(Color32::from_rgb(20, 20, 30)), Color32::WHITE);
        assert_eq!(text_color(Color32::from_rgb(240, 240, 230)), Color32::BLACK);
    }

    #[test]
    fn luminance_uses_perceptual_weights() {
        // Pure green reads much brighter than pure blue.
        let green = relative_luminance(Color32::from_rgb(0, 255, 0));
        let blue = relative_luminance(Color32::from_rgb(0, 0, 255));
        assert!((green - 0.587).abs() < 1e-9);
        assert!((blue - 0.114).abs() < 1e-9);
    }

    #[test]
    fn primary_prefers_the_only_eligible_entry() {
        let background = Color32::from_rgb(10, 10, 10);
        let text = Color32::WHITE;
        // A and C hug the background/text; only B clears both thresholds.
        let palette = [
            Color32::from_rgb(20, 20, 20),
            Color32::from_rgb(200, 60, 60),
            Color32::from_rgb(235, 235, 235),
        ];
        assert_eq!(pick_primary(&palette, background, text), palette[1]);
    }

    #[test]
    fn primary_falls_back_to_first_entry() {
        let background = Color32::from_rgb(128, 128, 128);
        let text = Color32::WHITE;
        // Every entry sits within the contrast threshold of the background.
        let palette = [
            Color32::from_rgb(120, 120, 120),
            Color32::from_rgb(140, 140, 140),
            Color32::from_rgb(110, 130, 125),
        ];
        assert_eq!(pick_primary(&palette, background, text), palette[0]);
    }

    #[test]
    fn solid_artwork_yields_its_own_color_as_background() {
        let color = Color32::from_rgb(180, 40, 90);
        let result = extract_palette(&solid_image(16, color)).expect("palette");
        assert_eq!(result.background, color);
        assert_eq!(result.text, Color32::WHITE);
    }

    #[test]
    fn two_tone_artwork_picks_the_dominant_half_plus_a_contrasting_primary() {
        let dark = Color32::from_rgb(15, 15, 40);
        let bright = Color32::from_rgb(230, 180, 40);
        let mut pixels = vec![dark; 256];
        for pixel in pixels.iter_mut().take(64) {
            *pixel = bright;
        }
        let image = ColorImage::new([16, 16], pixels);

        let result = extract_palette(&image).expect("palette");
        assert_eq!(result.background, dark);
        assert_eq!(result.text, Color32::WHITE);
        assert_eq!(result.primary, bright);
    }

    #[test]
    fn empty_or_transparent_artwork_yields_nothing() {
        let empty = ColorImage::new([0, 0], Vec::new());
        assert!(extract_palette(&empty).is_none());

        let transparent = solid_image(8, Color32::TRANSPARENT);
        assert!(extract_palette(&transparent).is_none());
    }
}

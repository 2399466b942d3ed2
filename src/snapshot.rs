use std::path::{Path, PathBuf};
use std::time::Duration;

use ab_glyph::{Font as _, FontRef, PxScale, ScaleFont as _};
use anyhow::{Context as _, anyhow};
use image::{DynamicImage, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

use crate::card::{QR_SIZE, RenderedCard, encode_png};
use crate::color::Color;

pub const SNAPSHOT_FILENAME: &str = "output.png";

/// Fixed wait for drawing to finish before capture.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Background margin around the card content, in pixels.
pub const SNAPSHOT_PADDING: u32 = 20;

pub const TITLE_SCALE: f32 = 24.0;
pub const DESCRIPTION_SCALE: f32 = 16.0;

/// Space below each text line, and between the text and the code.
const LINE_GAP: u32 = 6;

const FONT_DATA: &[u8] = include_bytes!("fonts/DejaVuSans.ttf");

struct TextLine {
    text: String,
    scale: PxScale,
    height: u32,
}

/// Rasterize the card container: title and description stacked above the
/// `QR_SIZE` code, all on a background-colored canvas.
pub fn rasterize(card: &RenderedCard, background: Color) -> anyhow::Result<RgbaImage> {
    let font = FontRef::try_from_slice(FONT_DATA).map_err(|e| anyhow!("load snapshot font: {e}"))?;

    let mut lines = wrap_lines(&font, TITLE_SCALE, &card.title, QR_SIZE);
    lines.extend(wrap_lines(&font, DESCRIPTION_SCALE, &card.description, QR_SIZE));
    let text_height: u32 = lines.iter().map(|line| line.height + LINE_GAP).sum();

    let qr = DynamicImage::ImageLuma8(card.qr.clone()).to_rgba8();
    let width = qr.width() + 2 * SNAPSHOT_PADDING;
    let height = text_height + qr.height() + 2 * SNAPSHOT_PADDING;
    let mut canvas = RgbaImage::from_pixel(width, height, background.to_rgba());

    let ink = background.contrasting().to_rgba();
    let mut y = SNAPSHOT_PADDING;
    for line in &lines {
        draw_text_mut(
            &mut canvas,
            ink,
            SNAPSHOT_PADDING as i32,
            y as i32,
            line.scale,
            &font,
            &line.text,
        );
        y += line.height + LINE_GAP;
    }

    image::imageops::overlay(&mut canvas, &qr, i64::from(SNAPSHOT_PADDING), i64::from(y));
    Ok(canvas)
}

/// Greedy word wrap. A single word wider than `max_width` gets its own line
/// and is clipped when drawn.
fn wrap_lines(font: &FontRef<'_>, scale: f32, text: &str, max_width: u32) -> Vec<TextLine> {
    let scale = PxScale::from(scale);
    let height = font.as_scaled(scale).height().ceil() as u32;
    let line = |text: String| TextLine { text, scale, height };

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if text_size(scale, font, &candidate).0 > max_width {
            lines.push(line(std::mem::replace(&mut current, word.to_string())));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(line(current));
    }
    lines
}

/// Wait [`SETTLE_DELAY`], then write the snapshot as `dir/output.png`.
pub async fn export_snapshot(
    card: &RenderedCard,
    background: Color,
    dir: &Path,
) -> anyhow::Result<PathBuf> {
    tokio::time::sleep(SETTLE_DELAY).await;

    let png = encode_png(&DynamicImage::ImageRgba8(rasterize(card, background)?))?;
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(SNAPSHOT_FILENAME);
    std::fs::write(&path, png).with_context(|| format!("write {}", path.display()))?;

    tracing::info!(path = %path.display(), "exported snapshot");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardPayload, render_card};
    use tempfile::tempdir;

    fn card(title: &str, description: &str) -> RenderedCard {
        render_card(&CardPayload {
            title: title.into(),
            description: description.into(),
            link: "https://example.com".into(),
        })
        .unwrap()
    }

    #[test]
    fn pads_code_with_background() {
        let bg = Color::rgb(0x12, 0x34, 0x56);
        let img = rasterize(&card("", ""), bg).unwrap();
        let side = QR_SIZE + 2 * SNAPSHOT_PADDING;
        assert_eq!(img.dimensions(), (side, side));
        assert_eq!(*img.get_pixel(0, 0), bg.to_rgba());
        assert_eq!(*img.get_pixel(side - 1, side - 1), bg.to_rgba());
        assert_ne!(*img.get_pixel(side / 2, SNAPSHOT_PADDING), bg.to_rgba());
    }

    #[test]
    fn text_sits_above_the_code() {
        let bg = Color::WHITE;
        let plain = rasterize(&card("", ""), bg).unwrap();
        let titled = rasterize(&card("Buildspace", "Scan me"), bg).unwrap();
        assert_eq!(titled.width(), plain.width());
        assert!(titled.height() > plain.height());

        // The code keeps its size and lands at the bottom, under the text.
        let offset = titled.height() - plain.height();
        for (x, y, px) in plain.enumerate_pixels().filter(|(_, y, _)| *y >= SNAPSHOT_PADDING) {
            assert_eq!(titled.get_pixel(x, y + offset), px, "({x}, {y})");
        }

        let text_rows = SNAPSHOT_PADDING..SNAPSHOT_PADDING + offset;
        assert!(
            text_rows
                .flat_map(|y| (0..titled.width()).map(move |x| (x, y)))
                .any(|(x, y)| *titled.get_pixel(x, y) != bg.to_rgba())
        );
    }

    #[test]
    fn different_titles_give_different_rasters() {
        let a = rasterize(&card("BIG TITLE", "desc"), Color::WHITE).unwrap();
        let b = rasterize(&card("other", "desc"), Color::WHITE).unwrap();
        assert_eq!(a.dimensions(), b.dimensions());
        assert_ne!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn long_description_wraps() {
        let short = rasterize(&card("t", "one line"), Color::WHITE).unwrap();
        let long = rasterize(
            &card("t", "a description long enough that it cannot fit on one line of the card"),
            Color::WHITE,
        )
        .unwrap();
        assert_eq!(long.width(), short.width());
        assert!(long.height() > short.height());
    }

    #[tokio::test]
    async fn writes_output_png() {
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("downloads");
        let c = card("t", "d");
        let path = export_snapshot(&c, Color::WHITE, &out).await.unwrap();
        assert_eq!(path, out.join("output.png"));

        let bytes = std::fs::read(&path).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), QR_SIZE + 2 * SNAPSHOT_PADDING);
        assert_eq!(
            decoded.height(),
            rasterize(&c, Color::WHITE).unwrap().height()
        );
    }
}

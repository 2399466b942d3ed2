use std::io::Cursor;

use anyhow::Context as _;
use base64::Engine as _;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use maud::{Markup, html};
use qrcode::QrCode;

/// Edge length of the QR image region.
pub const QR_SIZE: u32 = 200;

#[derive(Debug, Clone, Default)]
pub struct CardPayload {
    pub title: String,
    pub description: String,
    pub link: String,
}

pub struct RenderedCard {
    pub title: String,
    pub description: String,
    /// `<h2>` title and `<p>` description for the text region.
    pub text_html: String,
    /// `QR_SIZE`×`QR_SIZE` code encoding the link.
    pub qr: GrayImage,
    pub qr_png: Vec<u8>,
    pub link: String,
}

impl RenderedCard {
    pub fn qr_data_uri(&self) -> String {
        let b64 = base64::engine::general_purpose::STANDARD.encode(&self.qr_png);
        format!("data:image/png;base64,{}", b64)
    }

    pub fn qr_markup(&self) -> Markup {
        html! {
            img src=(self.qr_data_uri()) width=(QR_SIZE) height=(QR_SIZE) alt=(self.link);
        }
    }
}

pub fn render_card(payload: &CardPayload) -> anyhow::Result<RenderedCard> {
    let text_html = html! {
        h2 { (payload.title) }
        p { (payload.description) }
    }
    .into_string();

    let qr = render_qr(&payload.link)?;
    let qr_png = encode_png(&DynamicImage::ImageLuma8(qr.clone()))?;

    Ok(RenderedCard {
        title: payload.title.clone(),
        description: payload.description.clone(),
        text_html,
        qr,
        qr_png,
        link: payload.link.clone(),
    })
}

/// Draw the code at the largest whole module size that fits, centered on a
/// light square of exactly `QR_SIZE`.
fn render_qr(link: &str) -> anyhow::Result<GrayImage> {
    let code = QrCode::new(link.as_bytes()).context("encode link as qr code")?;
    let drawn = code
        .render::<Luma<u8>>()
        .max_dimensions(QR_SIZE, QR_SIZE)
        .build();

    let mut canvas = GrayImage::from_pixel(QR_SIZE, QR_SIZE, Luma([255]));
    let x = QR_SIZE.saturating_sub(drawn.width()) / 2;
    let y = QR_SIZE.saturating_sub(drawn.height()) / 2;
    image::imageops::overlay(&mut canvas, &drawn, i64::from(x), i64::from(y));
    Ok(canvas)
}

pub(crate) fn encode_png(img: &DynamicImage) -> anyhow::Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).context("encode png")?;
    Ok(buf.into_inner())
}

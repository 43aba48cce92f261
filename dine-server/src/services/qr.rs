//! Session artifacts: guest ordering URL and scannable QR image

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use qrcode::{Color, QrCode};

use crate::utils::AppError;

/// Pixels per QR module
const MODULE_SCALE: u32 = 8;
/// Quiet zone width in modules (QR spec minimum)
const QUIET_ZONE: u32 = 4;

/// Guest ordering URL embedding the table number and session token
pub fn session_url(frontend_url: &str, table_number: u32, token: &str) -> String {
    format!(
        "{}/order?table={}&token={}",
        frontend_url.trim_end_matches('/'),
        table_number,
        token
    )
}

/// Render a URL into a base64 PNG data URL suitable for direct display
pub fn qr_data_url(url: &str) -> Result<String, AppError> {
    let code = QrCode::new(url.as_bytes())
        .map_err(|e| AppError::internal(format!("Failed to encode QR code: {e}")))?;

    let width = code.width() as u32;
    let colors = code.to_colors();

    // Raster the module matrix onto a white canvas with a quiet zone
    let dim = (width + 2 * QUIET_ZONE) * MODULE_SCALE;
    let mut img = image::GrayImage::from_pixel(dim, dim, image::Luma([255u8]));
    for (idx, color) in colors.iter().enumerate() {
        if *color == Color::Dark {
            let mx = (idx as u32 % width + QUIET_ZONE) * MODULE_SCALE;
            let my = (idx as u32 / width + QUIET_ZONE) * MODULE_SCALE;
            for dy in 0..MODULE_SCALE {
                for dx in 0..MODULE_SCALE {
                    img.put_pixel(mx + dx, my + dy, image::Luma([0u8]));
                }
            }
        }
    }

    let mut png = Vec::new();
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| AppError::internal(format!("Failed to render QR image: {e}")))?;

    Ok(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(&png)
    ))
}

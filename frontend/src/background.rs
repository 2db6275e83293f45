//! Image background removal.
//!
//! The backend endpoint is tried first. Deployments that cannot run the model
//! answer 501 (or a message about Vercel); in that case the image is processed
//! locally with a border flood fill and the transparent PNG is uploaded.

use std::collections::VecDeque;
use std::io::Cursor;

use base64::Engine;
use image::{ImageFormat, Rgba, RgbaImage};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiError, ApiResult, SignageBackend};

/// Maximum per-channel difference from the border color still treated as background.
const COLOR_TOLERANCE: u8 = 40;

#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("failed to encode PNG: {0}")]
    Encode(image::ImageError),
}

/// Remove the background of the image at `image_url` and return the URL of
/// the result.
pub async fn remove_background<B>(backend: &B, image_url: &str) -> ApiResult<String>
where
    B: SignageBackend + ?Sized,
{
    match backend.remove_background(image_url).await {
        Ok(result) => {
            if let Some(png) = decode_data_url(&result)? {
                info!("Background removed server-side, uploading result");
                return backend
                    .upload_file("background-removed.png", png, "image/png")
                    .await;
            }
            Ok(result)
        }
        Err(e) if needs_local_fallback(&e) => {
            warn!("Server-side background removal unavailable ({}), using local fallback", e);
            let original = backend.fetch_bytes(image_url).await?;
            let png = tokio::task::spawn_blocking(move || remove_background_locally(&original))
                .await
                .map_err(|e| ApiError::Invalid(e.to_string()))?
                .map_err(|e| ApiError::Decode(e.to_string()))?;
            backend
                .upload_file("background-removed.png", png, "image/png")
                .await
        }
        Err(e) => Err(e),
    }
}

fn needs_local_fallback(error: &ApiError) -> bool {
    match error {
        ApiError::Http(501, _) => true,
        ApiError::Http(_, body) => body.contains("Vercel"),
        _ => false,
    }
}

/// Bytes of a base64 `data:` URL; `None` for ordinary URLs.
fn decode_data_url(url: &str) -> ApiResult<Option<Vec<u8>>> {
    let Some(rest) = url.strip_prefix("data:") else {
        return Ok(None);
    };
    let Some((_, payload)) = rest.split_once(";base64,") else {
        return Err(ApiError::Decode("unsupported data URL encoding".to_string()));
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map(Some)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Make every pixel connected to the image border with a similar color
/// transparent and return the result as PNG.
pub fn remove_background_locally(data: &[u8]) -> Result<Vec<u8>, BackgroundError> {
    let mut img = image::load_from_memory(data)
        .map_err(BackgroundError::Decode)?
        .to_rgba8();

    flood_border(&mut img);

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .map_err(BackgroundError::Encode)?;
    Ok(out.into_inner())
}

fn flood_border(img: &mut RgbaImage) {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let reference = border_color(img);
    let mut visited = vec![false; (width * height) as usize];
    let mut queue = VecDeque::new();

    let mut seed = |x: u32, y: u32, queue: &mut VecDeque<(u32, u32)>| {
        let idx = (y * width + x) as usize;
        if !visited[idx] && similar(img.get_pixel(x, y), &reference) {
            visited[idx] = true;
            queue.push_back((x, y));
        }
    };
    for x in 0..width {
        seed(x, 0, &mut queue);
        seed(x, height - 1, &mut queue);
    }
    for y in 0..height {
        seed(0, y, &mut queue);
        seed(width - 1, y, &mut queue);
    }

    while let Some((x, y)) = queue.pop_front() {
        img.get_pixel_mut(x, y)[3] = 0;

        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in neighbors {
            if nx >= width || ny >= height {
                continue;
            }
            let idx = (ny * width + nx) as usize;
            if !visited[idx] && similar(img.get_pixel(nx, ny), &reference) {
                visited[idx] = true;
                queue.push_back((nx, ny));
            }
        }
    }
}

/// Average color of the border pixels.
fn border_color(img: &RgbaImage) -> Rgba<u8> {
    let (width, height) = img.dimensions();
    let mut sum = [0u64; 4];
    let mut count = 0u64;
    for (x, y, pixel) in img.enumerate_pixels() {
        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
            for (acc, channel) in sum.iter_mut().zip(pixel.0) {
                *acc += channel as u64;
            }
            count += 1;
        }
    }
    let avg = |i: usize| (sum[i] / count.max(1)) as u8;
    Rgba([avg(0), avg(1), avg(2), avg(3)])
}

fn similar(pixel: &Rgba<u8>, reference: &Rgba<u8>) -> bool {
    pixel.0[..3]
        .iter()
        .zip(&reference.0[..3])
        .all(|(a, b)| a.abs_diff(*b) <= COLOR_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// White 8x8 image with a red 4x4 square in the middle.
    fn sample_png() -> Vec<u8> {
        let img = RgbaImage::from_fn(8, 8, |x, y| {
            if (2..6).contains(&x) && (2..6).contains(&y) {
                Rgba([200, 20, 20, 255])
            } else {
                Rgba([250, 250, 250, 255])
            }
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_local_removal_clears_border_keeps_subject() {
        let png = remove_background_locally(&sample_png()).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgba8();

        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(7, 3)[3], 0);
        assert_eq!(img.get_pixel(1, 1)[3], 0);
        assert_eq!(img.get_pixel(3, 3)[3], 255);
        assert_eq!(img.get_pixel(5, 5)[3], 255);
    }

    #[test]
    fn test_local_removal_rejects_garbage() {
        assert!(matches!(
            remove_background_locally(b"definitely not an image"),
            Err(BackgroundError::Decode(_))
        ));
    }

    #[test]
    fn test_fallback_triggers() {
        assert!(needs_local_fallback(&ApiError::Http(501, String::new())));
        assert!(needs_local_fallback(&ApiError::Http(
            500,
            "not supported on Vercel".into()
        )));
        assert!(!needs_local_fallback(&ApiError::Http(500, "model crashed".into())));
        assert!(!needs_local_fallback(&ApiError::Network("refused".into())));
    }

    #[test]
    fn test_data_url_decoding() {
        assert_eq!(decode_data_url("https://cdn/x.png").unwrap(), None);
        assert_eq!(
            decode_data_url("data:image/png;base64,AQID").unwrap(),
            Some(vec![1, 2, 3])
        );
        assert!(decode_data_url("data:text/plain,hello").is_err());
    }
}

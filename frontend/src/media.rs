//! Media inspection: video duration for rotation items.

use std::time::Duration;

use tracing::{debug, warn};

use crate::api::{ApiResult, SignageBackend};

/// Give up reading a clip's duration after this long.
pub const DURATION_TIMEOUT: Duration = Duration::from_secs(15);

/// Largest `moov` box that is downloaded.
const MAX_MOOV_SIZE: u64 = 16 * 1024 * 1024;

/// Top-level boxes skipped before giving up on finding `moov`.
const MAX_TOP_LEVEL_BOXES: usize = 64;

/// Duration of a video in seconds, or 0 when it cannot be determined in time.
pub async fn video_duration<B>(backend: &B, url: &str) -> f64
where
    B: SignageBackend + ?Sized,
{
    match tokio::time::timeout(DURATION_TIMEOUT, read_movie_duration(backend, url)).await {
        Ok(Ok(Some(seconds))) => {
            debug!("Clip {} runs {:.2}s", url, seconds);
            seconds
        }
        Ok(Ok(None)) => {
            warn!("No MP4 movie header in {}, using duration 0", url);
            0.0
        }
        Ok(Err(e)) => {
            warn!("Failed to read {} for its duration: {}", url, e);
            0.0
        }
        Err(_) => {
            warn!("Reading the duration of {} timed out after {:?}", url, DURATION_TIMEOUT);
            0.0
        }
    }
}

/// Walk the top-level boxes with ranged reads and parse only `moov`.
///
/// Media data (`mdat`) is skipped by offset, so a clip with its movie header
/// at the end costs a few small reads instead of a full download.
async fn read_movie_duration<B>(backend: &B, url: &str) -> ApiResult<Option<f64>>
where
    B: SignageBackend + ?Sized,
{
    let mut offset = 0u64;
    for _ in 0..MAX_TOP_LEVEL_BOXES {
        let header = backend.fetch_range(url, offset, 16).await?;
        let Some((kind, total)) = box_header(&header) else {
            return Ok(None);
        };
        if &kind == b"moov" {
            let Some(total) = total.filter(|t| *t <= MAX_MOOV_SIZE) else {
                return Ok(None);
            };
            let moov = backend.fetch_range(url, offset, total).await?;
            return Ok(mp4_duration(&moov));
        }
        // Size 0 runs to the end of the file, so nothing follows it.
        let Some(total) = total else {
            return Ok(None);
        };
        offset += total;
    }
    Ok(None)
}

/// Type and total size of the box starting `data`, `None` size meaning "to end of file".
fn box_header(data: &[u8]) -> Option<([u8; 4], Option<u64>)> {
    let size = read_u32(data, 0)? as u64;
    let kind: [u8; 4] = data.get(4..8)?.try_into().ok()?;
    let total = match size {
        0 => None,
        1 => Some(read_u64(data, 8)?).filter(|t| *t >= 16),
        n if n >= 8 => Some(n),
        _ => return None,
    };
    Some((kind, total))
}

/// Read the duration from the `moov/mvhd` box of an MP4/MOV file.
pub fn mp4_duration(data: &[u8]) -> Option<f64> {
    let moov = find_box(data, b"moov")?;
    let mvhd = find_box(moov, b"mvhd")?;

    let version = *mvhd.first()?;
    // version(1) + flags(3), then creation and modification times.
    let (timescale, duration) = if version == 1 {
        (read_u32(mvhd, 20)?, read_u64(mvhd, 24)?)
    } else {
        (read_u32(mvhd, 12)?, read_u32(mvhd, 16)? as u64)
    };

    if timescale == 0 {
        return None;
    }
    Some(duration as f64 / timescale as f64)
}

/// Payload of the first child box of type `kind`.
fn find_box<'a>(mut data: &'a [u8], kind: &[u8; 4]) -> Option<&'a [u8]> {
    while data.len() >= 8 {
        let size = read_u32(data, 0)? as u64;
        let box_type = &data[4..8];
        let (header, total) = match size {
            0 => (8, data.len() as u64),
            1 => (16, read_u64(data, 8)?),
            n => (8, n),
        };
        if total < header as u64 || total > data.len() as u64 {
            return None;
        }
        let total = total as usize;
        if box_type == kind {
            return Some(&data[header..total]);
        }
        data = &data[total..];
    }
    None
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_be_bytes(bytes.try_into().ok()?))
}

fn read_u64(data: &[u8], offset: usize) -> Option<u64> {
    let bytes = data.get(offset..offset + 8)?;
    Some(u64::from_be_bytes(bytes.try_into().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;

    fn mp4_box(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
        out.extend_from_slice(kind);
        out.extend_from_slice(payload);
        out
    }

    fn mvhd_v0(timescale: u32, duration: u32) -> Vec<u8> {
        let mut payload = vec![0u8; 4 + 4 + 4];
        payload.extend_from_slice(&timescale.to_be_bytes());
        payload.extend_from_slice(&duration.to_be_bytes());
        payload.extend_from_slice(&[0u8; 80]);
        mp4_box(b"mvhd", &payload)
    }

    #[test]
    fn test_reads_mvhd_after_other_boxes() {
        let mut file = mp4_box(b"ftyp", b"isom\0\0\0\0");
        file.extend(mp4_box(b"free", &[0u8; 16]));
        file.extend(mp4_box(b"moov", &mvhd_v0(1000, 12_500)));

        assert_eq!(mp4_duration(&file), Some(12.5));
    }

    #[test]
    fn test_reads_version_one_header() {
        let mut payload = vec![1u8, 0, 0, 0];
        payload.extend_from_slice(&[0u8; 16]);
        payload.extend_from_slice(&600u32.to_be_bytes());
        payload.extend_from_slice(&18_000u64.to_be_bytes());
        let file = mp4_box(b"moov", &mp4_box(b"mvhd", &payload));

        assert_eq!(mp4_duration(&file), Some(30.0));
    }

    #[test]
    fn test_rejects_truncated_and_foreign_data() {
        assert_eq!(mp4_duration(b"not a video"), None);
        assert_eq!(mp4_duration(&mp4_box(b"moov", &[])), None);

        let mut truncated = mp4_box(b"moov", &mvhd_v0(1000, 5000));
        truncated.truncate(20);
        assert_eq!(mp4_duration(&truncated), None);

        assert_eq!(mp4_duration(&mp4_box(b"moov", &mvhd_v0(0, 5000))), None);
    }

    #[tokio::test]
    async fn test_duration_skips_media_data_without_downloading_it() {
        let mut file = mp4_box(b"ftyp", b"isom\0\0\0\0");
        file.extend(mp4_box(b"mdat", &vec![0u8; 512 * 1024]));
        file.extend(mp4_box(b"moov", &mvhd_v0(1000, 8_000)));
        let moov_len = mp4_box(b"moov", &mvhd_v0(1000, 8_000)).len() as u64;

        let backend = FakeBackend::default();
        backend
            .state
            .lock()
            .unwrap()
            .files
            .insert("https://cdn/late-moov.mp4".into(), file);

        assert_eq!(video_duration(&backend, "https://cdn/late-moov.mp4").await, 8.0);

        let state = backend.state.lock().unwrap();
        let read: u64 = state.range_reads.iter().map(|(_, _, len)| len).sum();
        assert_eq!(state.range_reads.len(), 4);
        assert_eq!(read, 3 * 16 + moov_len);
    }

    #[tokio::test]
    async fn test_duration_is_zero_for_unreadable_clips() {
        let backend = FakeBackend::default();
        backend
            .state
            .lock()
            .unwrap()
            .files
            .insert("https://cdn/notes.txt".into(), b"plain text, no boxes".to_vec());

        assert_eq!(video_duration(&backend, "https://cdn/notes.txt").await, 0.0);
        assert_eq!(video_duration(&backend, "https://cdn/missing.mp4").await, 0.0);
    }

    #[test]
    fn test_box_header_sizes() {
        assert_eq!(box_header(&mp4_box(b"free", &[0u8; 8])), Some((*b"free", Some(16))));

        let mut large = 1u32.to_be_bytes().to_vec();
        large.extend_from_slice(b"mdat");
        large.extend_from_slice(&(1u64 << 33).to_be_bytes());
        assert_eq!(box_header(&large), Some((*b"mdat", Some(1 << 33))));

        let mut open_ended = 0u32.to_be_bytes().to_vec();
        open_ended.extend_from_slice(b"mdat");
        assert_eq!(box_header(&open_ended), Some((*b"mdat", None)));

        assert_eq!(box_header(&[0, 0, 0, 4, b'b', b'a', b'd', b'!']), None);
    }
}

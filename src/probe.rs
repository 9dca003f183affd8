//! Measure the motion clip instead of assuming its length.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;

use image::AnimationDecoder as _;
use image::codecs::gif::GifDecoder;

use crate::foundation::core::Millis;
use crate::foundation::error::{IntroError, IntroResult};

/// Frame count and total play time of one loop of an animated GIF.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ClipInfo {
    /// Number of frames.
    pub frames: u32,
    /// Sum of all frame delays.
    pub duration: Millis,
}

/// Decode a GIF from `reader` and sum its frame delays.
pub fn probe_gif<R: BufRead + Seek>(reader: R) -> IntroResult<ClipInfo> {
    let decoder =
        GifDecoder::new(reader).map_err(|e| IntroError::probe(format!("decode gif header: {e}")))?;

    let mut frames = 0u32;
    let mut total_ms = 0f64;
    for frame in decoder.into_frames() {
        let frame = frame.map_err(|e| IntroError::probe(format!("decode gif frame: {e}")))?;
        let (numer, denom) = frame.delay().numer_denom_ms();
        if denom != 0 {
            total_ms += f64::from(numer) / f64::from(denom);
        }
        frames += 1;
    }

    if frames == 0 {
        return Err(IntroError::probe("gif has no frames"));
    }
    Ok(ClipInfo {
        frames,
        duration: Millis(total_ms.round() as u64),
    })
}

/// Probe a GIF on disk.
pub fn probe_clip(path: impl AsRef<Path>) -> IntroResult<ClipInfo> {
    let path = path.as_ref();
    let f = File::open(path)
        .map_err(|e| IntroError::probe(format!("open clip '{}': {e}", path.display())))?;
    probe_gif(BufReader::new(f))
}

/// Clip length to use for `path`, falling back to `default` when the clip cannot be
/// measured or reports no delay at all.
pub fn clip_duration_or(path: impl AsRef<Path>, default: Millis) -> Millis {
    let path = path.as_ref();
    match probe_clip(path) {
        Ok(info) if !info.duration.is_zero() => {
            tracing::debug!(
                path = %path.display(),
                frames = info.frames,
                duration = %info.duration,
                "measured clip duration"
            );
            info.duration
        }
        Ok(_) => {
            tracing::warn!(path = %path.display(), %default, "clip has no frame delays, using default");
            default
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), %default, error = %e, "could not probe clip, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba, RgbaImage};

    use super::*;

    fn gif_bytes(delays_ms: &[u32]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut enc = GifEncoder::new(&mut out);
            for (i, &ms) in delays_ms.iter().enumerate() {
                let shade = (i * 40 % 255) as u8;
                let img = RgbaImage::from_pixel(4, 4, Rgba([shade, 0, 255 - shade, 255]));
                let frame = Frame::from_parts(img, 0, 0, Delay::from_numer_denom_ms(ms, 1));
                enc.encode_frame(frame).unwrap();
            }
        }
        out
    }

    #[test]
    fn sums_frame_delays() {
        let bytes = gif_bytes(&[100, 200, 300]);
        let info = probe_gif(Cursor::new(bytes)).unwrap();
        assert_eq!(info.frames, 3);
        assert_eq!(info.duration, Millis(600));
    }

    #[test]
    fn garbage_is_a_probe_error() {
        let err = probe_gif(Cursor::new(b"not a gif".to_vec())).unwrap_err();
        assert!(matches!(err, IntroError::Probe(_)));
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        assert_eq!(
            clip_duration_or("no/such/clip.gif", Millis(3000)),
            Millis(3000)
        );
    }
}

use thiserror::Error;

/// PNG signature bytes
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Anything smaller than this is a failed capture, not a screen image
pub const MIN_CAPTURE_BYTES: usize = 1024;

const MAX_DIMENSION: u32 = 16_384;

/// How far from the end the IEND chunk may sit (tolerates trailing newlines)
const IEND_SEARCH_WINDOW: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngInfo {
    pub width: u32,
    pub height: u32,
    pub size: usize,
}

#[derive(Debug, Error)]
pub enum PngError {
    #[error("capture is empty")]
    Empty,

    #[error("capture starts with text instead of image data: {0}")]
    TextPrefix(String),

    #[error("missing PNG signature")]
    BadSignature,

    #[error("capture too small ({0} bytes)")]
    TooSmall(usize),

    #[error("bad IHDR chunk: {0}")]
    BadHeader(String),

    #[error("missing IEND chunk, data is truncated")]
    Truncated,
}

/// Check that `data` is a complete PNG and read its dimensions
pub fn validate_png(data: &[u8]) -> Result<PngInfo, PngError> {
    if data.is_empty() {
        return Err(PngError::Empty);
    }

    if !data.starts_with(&PNG_SIGNATURE) {
        // adb prints warnings to stdout on some builds, ahead of the image
        if data[0].is_ascii() {
            return Err(PngError::TextPrefix(text_preview(data)));
        }
        return Err(PngError::BadSignature);
    }

    if data.len() < MIN_CAPTURE_BYTES {
        return Err(PngError::TooSmall(data.len()));
    }

    let (width, height) = read_ihdr(data)?;

    let tail_start = data.len().saturating_sub(IEND_SEARCH_WINDOW);
    if !data[tail_start..].windows(4).any(|w| w == b"IEND") {
        return Err(PngError::Truncated);
    }

    Ok(PngInfo {
        width,
        height,
        size: data.len(),
    })
}

/// Drop anything in front of the PNG signature
pub fn strip_text_prefix(data: &[u8]) -> Option<&[u8]> {
    data.windows(PNG_SIGNATURE.len())
        .position(|w| w == PNG_SIGNATURE)
        .map(|pos| &data[pos..])
}

/// Validate a raw capture, stripping a text prefix first if adb added one
pub fn clean_capture(data: Vec<u8>) -> Result<(Vec<u8>, PngInfo), PngError> {
    match validate_png(&data) {
        Ok(info) => Ok((data, info)),
        Err(PngError::TextPrefix(text)) => {
            tracing::warn!(prefix = %text, "screencap output has a text prefix");
            let stripped = strip_text_prefix(&data)
                .ok_or(PngError::TextPrefix(text))?
                .to_vec();
            let info = validate_png(&stripped)?;
            Ok((stripped, info))
        }
        Err(e) => Err(e),
    }
}

fn read_ihdr(data: &[u8]) -> Result<(u32, u32), PngError> {
    // signature(8) + length(4) + "IHDR"(4) + width(4) + height(4)
    if data.len() < 24 {
        return Err(PngError::BadHeader("too short".into()));
    }
    if &data[12..16] != b"IHDR" {
        return Err(PngError::BadHeader("IHDR is not the first chunk".into()));
    }

    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);

    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(PngError::BadHeader(format!("dimensions {}x{}", width, height)));
    }

    Ok((width, height))
}

fn text_preview(data: &[u8]) -> String {
    data.iter()
        .take(80)
        .take_while(|&&b| b != PNG_SIGNATURE[0])
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Minimal PNG of the given size, padded past [`MIN_CAPTURE_BYTES`]
///
/// Chunk CRCs are zeroed; nothing here decodes pixels.
pub fn synthetic_png(width: u32, height: u32) -> Vec<u8> {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[8, 6, 0, 0, 0]);
    data.extend_from_slice(&[0; 4]);
    // IDAT stand-in so the capture clears the size floor
    let filler = MIN_CAPTURE_BYTES as u32;
    data.extend_from_slice(&filler.to_be_bytes());
    data.extend_from_slice(b"IDAT");
    data.resize(data.len() + filler as usize, 0);
    data.extend_from_slice(&[0; 4]);
    data.extend_from_slice(&0u32.to_be_bytes());
    data.extend_from_slice(b"IEND");
    data.extend_from_slice(&[0xAE, 0x42, 0x60, 0x82]);
    data
}

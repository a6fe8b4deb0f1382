//! Binary sniffing and the two-stage text decode.

use crate::options::BinaryDetection;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Share of control bytes above which [`BinaryDetection::Accurate`] calls a prefix binary.
const CONTROL_RATIO: f64 = 0.30;

/// Result of decoding raw bytes as text.
#[derive(Debug, PartialEq, Eq)]
pub enum Decoded {
    Utf8(String),
    /// Not UTF-8; carries the bytes for the byte-per-char pass.
    NeedsFallback(Vec<u8>),
}

/// What reading a candidate produced.
#[derive(Debug)]
pub enum TextRead {
    Text(String),
    Latin1(String),
    Binary,
    Unreadable(io::Error),
}

pub fn looks_binary(prefix: &[u8], detection: BinaryDetection) -> bool {
    if prefix.is_empty() {
        return false;
    }
    if prefix.contains(&0) {
        return true;
    }
    match detection {
        BinaryDetection::Simple => false,
        BinaryDetection::Accurate => {
            content_inspector::inspect(prefix).is_binary() || control_ratio(prefix) > CONTROL_RATIO
        }
    }
}

fn control_ratio(prefix: &[u8]) -> f64 {
    let control = prefix
        .iter()
        .filter(|&&b| (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c | 0x1b)) || b == 0x7f)
        .count();
    control as f64 / prefix.len() as f64
}

/// Reads at most `window` bytes from `reader` into `prefix` and classifies them.
///
/// The reader is left positioned after the prefix so the caller can keep reading.
pub fn sniff<R: Read>(
    reader: &mut R,
    prefix: &mut Vec<u8>,
    window: usize,
    detection: BinaryDetection,
) -> io::Result<bool> {
    reader.take(window as u64).read_to_end(prefix)?;
    Ok(looks_binary(prefix, detection))
}

pub fn decode_utf8(bytes: Vec<u8>) -> Decoded {
    match String::from_utf8(bytes) {
        Ok(text) => Decoded::Utf8(text),
        Err(e) => Decoded::NeedsFallback(e.into_bytes()),
    }
}

/// Maps every byte to the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Sniffs, then reads the rest of the file through the same handle and decodes it.
///
/// Files that cannot be opened or sniffed count as binary.
pub fn read_text(path: &Path, window: usize, detection: BinaryDetection) -> TextRead {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!("Cannot open {}: {}", path.display(), e);
            return TextRead::Binary;
        }
    };
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::with_capacity(window);
    match sniff(&mut reader, &mut bytes, window, detection) {
        Ok(false) => {}
        Ok(true) => return TextRead::Binary,
        Err(e) => {
            tracing::debug!("Sniff failed for {}: {}", path.display(), e);
            return TextRead::Binary;
        }
    }
    if let Err(e) = reader.read_to_end(&mut bytes) {
        return TextRead::Unreadable(e);
    }
    match decode_utf8(bytes) {
        Decoded::Utf8(text) => TextRead::Text(text),
        Decoded::NeedsFallback(raw) => TextRead::Latin1(decode_latin1(&raw)),
    }
}

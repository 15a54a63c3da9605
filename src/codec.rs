use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use tracing::trace;

/// Output space reserved before the first call into the decoder, and the minimum amount added
/// each time the decoder runs out of room.
const MIN_GROWTH: usize = 256;

/// Errors from the zlib layer.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("compression failed: {0}")]
    Compress(#[source] std::io::Error),

    /// The compressed stream is truncated, has trailing garbage, or is not zlib at all.
    #[error("corrupt compressed data: {0}")]
    CorruptData(String),
}

/// Compress `data` into a zlib stream.
///
/// Output is deterministic for a given input, so storing the same object twice yields
/// byte-identical files.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut e = ZlibEncoder::new(Vec::with_capacity(data.len() / 2 + 16), Compression::fast());
    e.write_all(data).map_err(CodecError::Compress)?;
    e.finish().map_err(CodecError::Compress)
}

/// Decompress a complete zlib stream.
///
/// The size of the output is not known in advance. Whenever the decoder fills the output
/// buffer it is grown and decoding resumes where it stopped, until the stream reports its end.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut d = Decompress::new(true);
    let mut out = Vec::with_capacity(data.len().saturating_mul(2).max(MIN_GROWTH));

    loop {
        if out.len() == out.capacity() {
            out.reserve(out.capacity().max(MIN_GROWTH));
            trace!(capacity = out.capacity(), "Growing decompression buffer");
        }

        let in_before = d.total_in();
        let out_before = d.total_out();
        let input = &data[in_before as usize..];

        let status = d
            .decompress_vec(input, &mut out, FlushDecompress::None)
            .map_err(|e| CodecError::CorruptData(e.to_string()))?;

        if matches!(status, Status::StreamEnd) {
            break;
        }

        // No progress despite free output space: the input ran out mid-stream
        let stalled = d.total_in() == in_before && d.total_out() == out_before;
        if stalled && out.len() < out.capacity() {
            return Err(CodecError::CorruptData(
                "stream ended before the end-of-stream marker".into(),
            ));
        }
    }

    if d.total_in() != data.len() as u64 {
        return Err(CodecError::CorruptData(format!(
            "{} trailing bytes after end of stream",
            data.len() as u64 - d.total_in()
        )));
    }

    Ok(out)
}

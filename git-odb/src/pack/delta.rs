//! Delta instruction application: reconstruct a target object's bytes from a base and a sequence
//! of copy/insert instructions, as produced by git's pack delta encoding.

/// The error returned when delta bytes are structurally invalid.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("delta instruction stream ended unexpectedly")]
    Truncated,
    #[error("delta copy instruction reads past the end of its base object")]
    CopyOutOfRange,
    #[error("delta's reconstructed size ({actual}) doesn't match its declared target size ({expected})")]
    SizeMismatch { expected: u64, actual: u64 },
}

/// Reads the two size varints (source size, target size) at the start of a delta, each encoded as
/// 7 bits per byte, least-significant group first, continuation in the high bit.
fn read_size_varint(delta: &[u8], pos: &mut usize) -> Result<u64, Error> {
    let mut value: u64 = 0;
    let mut shift = 0;
    loop {
        let byte = *delta.get(*pos).ok_or(Error::Truncated)?;
        *pos += 1;
        value |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    Ok(value)
}

/// Apply `delta` to `base`, producing the target object's bytes.
pub fn apply(base: &[u8], delta: &[u8]) -> Result<Vec<u8>, Error> {
    let mut pos = 0;
    let _source_size = read_size_varint(delta, &mut pos)?;
    let target_size = read_size_varint(delta, &mut pos)?;

    let mut out = Vec::with_capacity(target_size as usize);
    while pos < delta.len() {
        let opcode = delta[pos];
        pos += 1;
        if opcode & 0x80 != 0 {
            let mut offset: u64 = 0;
            let mut size: u64 = 0;
            for bit in 0..4 {
                if opcode & (1 << bit) != 0 {
                    let byte = *delta.get(pos).ok_or(Error::Truncated)?;
                    pos += 1;
                    offset |= (byte as u64) << (bit * 8);
                }
            }
            for bit in 0..3 {
                if opcode & (1 << (4 + bit)) != 0 {
                    let byte = *delta.get(pos).ok_or(Error::Truncated)?;
                    pos += 1;
                    size |= (byte as u64) << (bit * 8);
                }
            }
            if size == 0 {
                size = 0x10000;
            }
            let start = offset as usize;
            let end = start + size as usize;
            out.extend_from_slice(base.get(start..end).ok_or(Error::CopyOutOfRange)?);
        } else if opcode != 0 {
            let len = opcode as usize;
            let end = pos + len;
            out.extend_from_slice(delta.get(pos..end).ok_or(Error::Truncated)?);
            pos = end;
        } else {
            // opcode byte 0 is reserved and never produced by a conforming encoder.
            return Err(Error::Truncated);
        }
    }

    if out.len() as u64 != target_size {
        return Err(Error::SizeMismatch {
            expected: target_size,
            actual: out.len() as u64,
        });
    }
    Ok(out)
}

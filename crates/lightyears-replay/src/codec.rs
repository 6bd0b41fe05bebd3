//! Binary encode/decode for trace packets.
//!
//! ```text
//! Packet := len(name):u8 len(payload):u8 name:[u8] payload:[u8]
//! ```
//!
//! All numeric payload fields are little-endian and fixed-width. Payloads
//! carry no type information: the caller supplies the format descriptor on
//! both sides, and a packet only decodes when its name and its payload
//! length agree with what the caller expects.

use std::io::{self, ErrorKind, Read, Write};

use crate::error::TraceError;
use crate::types::{format_width, Packet, Scalar, Value, MAX_FIELD_LEN};

// ── Payload packing ─────────────────────────────────────────────

/// Pack `values` according to `format`.
///
/// `name` is only used for error reporting.
pub fn pack(name: &str, format: &[Scalar], values: &[Value]) -> Result<Vec<u8>, TraceError> {
    if format.len() != values.len() {
        return Err(TraceError::PayloadEncode {
            name: name.to_string(),
            detail: format!(
                "format has {} fields, {} values given",
                format.len(),
                values.len()
            ),
        });
    }

    let mut buf = Vec::with_capacity(format_width(format));
    for (i, (&scalar, value)) in format.iter().zip(values).enumerate() {
        match (scalar, *value) {
            (Scalar::U8, Value::U8(v)) => buf.push(v),
            (Scalar::I32, Value::I32(v)) => buf.extend_from_slice(&v.to_le_bytes()),
            (Scalar::U32, Value::U32(v)) => buf.extend_from_slice(&v.to_le_bytes()),
            (Scalar::F64, Value::F64(v)) => buf.extend_from_slice(&v.to_le_bytes()),
            (expected, got) => {
                return Err(TraceError::PayloadEncode {
                    name: name.to_string(),
                    detail: format!("field {i}: expected {expected:?}, got {got:?}"),
                });
            }
        }
    }
    Ok(buf)
}

/// Unpack a payload according to `format`.
///
/// The payload length must equal the format width exactly; trailing or
/// missing bytes are a decode failure, described by the returned string.
pub fn unpack(format: &[Scalar], payload: &[u8]) -> Result<Vec<Value>, String> {
    let width = format_width(format);
    if payload.len() != width {
        return Err(format!(
            "payload is {} bytes, format needs {width}",
            payload.len()
        ));
    }

    let mut values = Vec::with_capacity(format.len());
    let mut rest = payload;
    for &scalar in format {
        let (head, tail) = rest.split_at(scalar.width());
        let value = match scalar {
            Scalar::U8 => Value::U8(head[0]),
            Scalar::I32 => Value::I32(i32::from_le_bytes(le_array(head))),
            Scalar::U32 => Value::U32(u32::from_le_bytes(le_array(head))),
            Scalar::F64 => Value::F64(f64::from_le_bytes(le_array(head))),
        };
        values.push(value);
        rest = tail;
    }
    Ok(values)
}

/// Copy a slice whose length was already checked into a fixed array.
fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

// ── Packet encode ───────────────────────────────────────────────

/// Frame a name and a packed payload into packet bytes.
pub fn encode_raw(name: &str, payload: &[u8]) -> Result<Vec<u8>, TraceError> {
    let name_bytes = name.as_bytes();
    if name_bytes.len() > MAX_FIELD_LEN {
        return Err(TraceError::NameTooLong {
            len: name_bytes.len(),
        });
    }
    if payload.len() > MAX_FIELD_LEN {
        return Err(TraceError::PayloadTooLong {
            name: name.to_string(),
            len: payload.len(),
        });
    }

    let mut buf = Vec::with_capacity(2 + name_bytes.len() + payload.len());
    buf.push(name_bytes.len() as u8);
    buf.push(payload.len() as u8);
    buf.extend_from_slice(name_bytes);
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Encode a complete packet: `[len(name)][len(payload)][name][payload]`.
pub fn encode_packet(
    name: &str,
    format: &[Scalar],
    values: &[Value],
) -> Result<Vec<u8>, TraceError> {
    let payload = pack(name, format, values)?;
    encode_raw(name, &payload)
}

/// Encode a packet and write it to `w`. Returns the number of bytes written.
pub fn write_packet(
    w: &mut dyn Write,
    name: &str,
    format: &[Scalar],
    values: &[Value],
) -> Result<usize, TraceError> {
    let bytes = encode_packet(name, format, values)?;
    w.write_all(&bytes)?;
    Ok(bytes.len())
}

// ── Packet decode ───────────────────────────────────────────────

/// Read until `buf` is full or the stream ends. Returns bytes read.
fn read_full(r: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Map a read failure at the packet starting at `offset`.
///
/// A decompressor reports input that stops inside a frame as
/// `UnexpectedEof`; that is a cut trace, not an I/O fault.
fn read_error(offset: u64, e: io::Error) -> TraceError {
    if e.kind() == ErrorKind::UnexpectedEof {
        TraceError::Truncated {
            offset,
            detail: format!("stream ended inside a compressed frame: {e}"),
        }
    } else {
        TraceError::Io(e)
    }
}

/// Decode the next packet from `r`.
///
/// `offset` is the stream position of the first header byte and is
/// recorded in the returned packet and in any error.
///
/// Returns `Ok(None)` when the stream is exhausted exactly on a packet
/// boundary, and [`TraceError::Truncated`] when it ends partway through
/// the header, the name, or the payload, or inside a compressed frame.
pub fn decode_next(r: &mut dyn Read, offset: u64) -> Result<Option<Packet>, TraceError> {
    let mut fill = |buf: &mut [u8]| read_full(r, buf).map_err(|e| read_error(offset, e));

    let mut header = [0u8; 2];
    match fill(&mut header)? {
        0 => return Ok(None),
        2 => {}
        n => {
            return Err(TraceError::Truncated {
                offset,
                detail: format!("got {n} of 2 header bytes"),
            })
        }
    }

    let name_len = header[0] as usize;
    let payload_len = header[1] as usize;

    let mut name = vec![0u8; name_len];
    let got = fill(&mut name)?;
    if got != name_len {
        return Err(TraceError::Truncated {
            offset,
            detail: format!("got {got} of {name_len} name bytes"),
        });
    }

    let mut payload = vec![0u8; payload_len];
    let got = fill(&mut payload)?;
    if got != payload_len {
        return Err(TraceError::Truncated {
            offset,
            detail: format!("got {got} of {payload_len} payload bytes"),
        });
    }

    let name = String::from_utf8(name).map_err(|e| TraceError::PayloadDecode {
        offset,
        name: String::from_utf8_lossy(e.as_bytes()).into_owned(),
        detail: format!("packet name is not UTF-8: {e}"),
    })?;

    Ok(Some(Packet {
        name,
        payload,
        offset,
    }))
}

/// Check a decoded packet against the expected name and unpack it.
pub fn check_packet(
    packet: &Packet,
    expected_name: &str,
    format: &[Scalar],
) -> Result<Vec<Value>, TraceError> {
    if packet.name != expected_name {
        return Err(TraceError::NameMismatch {
            offset: packet.offset,
            expected: expected_name.to_string(),
            found: packet.name.clone(),
        });
    }
    unpack(format, &packet.payload).map_err(|detail| TraceError::PayloadDecode {
        offset: packet.offset,
        name: packet.name.clone(),
        detail,
    })
}

/// Decode the next packet, which must be named `expected_name`, and
/// unpack it with `format`.
///
/// A clean end of stream is an error here ([`TraceError::EndOfTrace`]):
/// the caller asked for a specific packet and there is none.
pub fn decode_typed(
    r: &mut dyn Read,
    offset: u64,
    expected_name: &str,
    format: &[Scalar],
) -> Result<Vec<Value>, TraceError> {
    match decode_next(r, offset)? {
        Some(packet) => check_packet(&packet, expected_name, format),
        None => Err(TraceError::EndOfTrace { offset }),
    }
}

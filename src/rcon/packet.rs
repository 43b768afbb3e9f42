//! Wire format of the Source RCON protocol.
//!
//! ```text
//! | size: i32 LE | id: i32 LE | type: i32 LE | body | 0x00 | 0x00 |
//! ```
//!
//! `size` counts every byte after itself.

use std::io::{Read, Write};

use super::Error;

pub const TYPE_AUTH: i32 = 3;
pub const TYPE_AUTH_RESPONSE: i32 = 2;
pub const TYPE_EXEC_COMMAND: i32 = 2;
pub const TYPE_RESPONSE_VALUE: i32 = 0;

/// Id the server answers an authentication request with when the password is
/// wrong.
pub const ID_AUTH_REJECTED: i32 = -1;

/// Limit on the body of packets sent to the server.
pub const BODY_SIZE_MAX: usize = 4096;

/// Limit on the size of packets received. Factorio answers with a single
/// packet however long the response, so this is far above `BODY_SIZE_MAX`.
pub const RECEIVE_SIZE_MAX: usize = 1024 * 1024;

/// id + type + two terminating NULs.
const SIZE_MIN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: i32,
    pub kind: i32,
    pub body: Vec<u8>,
}

impl Packet {
    pub fn new(id: i32, kind: i32, body: impl Into<Vec<u8>>) -> Self {
        return Self {
            id,
            kind,
            body: body.into(),
        };
    }
}

/// Serialize a packet of any body length.
pub fn encode(packet: &Packet) -> Vec<u8> {
    let size: usize = SIZE_MIN + packet.body.len();
    let mut buf: Vec<u8> = Vec::with_capacity(size + 4);
    buf.extend_from_slice(&(size as i32).to_le_bytes());
    buf.extend_from_slice(&packet.id.to_le_bytes());
    buf.extend_from_slice(&packet.kind.to_le_bytes());
    buf.extend_from_slice(&packet.body);
    buf.extend_from_slice(&[0, 0]);
    return buf;
}

/// Send a packet to the server, refusing bodies over [`BODY_SIZE_MAX`].
pub fn write<W: Write>(stream: &mut W, packet: &Packet) -> Result<(), Error> {
    if packet.body.len() > BODY_SIZE_MAX {
        return Err(Error::CommandTooLong {
            len: packet.body.len(),
        });
    }
    stream.write_all(&encode(packet))?;
    stream.flush()?;
    return Ok(());
}

pub fn read<R: Read>(stream: &mut R) -> Result<Packet, Error> {
    let mut size_buf: [u8; 4] = [0; 4];
    stream.read_exact(&mut size_buf)?;
    let size: i32 = i32::from_le_bytes(size_buf);
    let size: usize = match usize::try_from(size) {
        Ok(n) if (SIZE_MIN..=RECEIVE_SIZE_MAX).contains(&n) => n,
        _ => {
            return Err(Error::MalformedPacket(format!(
                "size {size} outside of {SIZE_MIN}..={RECEIVE_SIZE_MAX}"
            )));
        }
    };

    let mut payload: Vec<u8> = vec![0; size];
    stream.read_exact(&mut payload)?;

    if payload[size - 2..] != [0, 0] {
        return Err(Error::MalformedPacket(
            "packet is not terminated with two NUL bytes".into(),
        ));
    }
    let id: i32 = i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
    let kind: i32 = i32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]);
    let body: Vec<u8> = payload[8..size - 2].to_vec();

    return Ok(Packet { id, kind, body });
}

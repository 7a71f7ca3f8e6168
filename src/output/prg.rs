// Anim64 - Delta-compressed animation scripts for C64 playback engines
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! PRG encoding.
//!
//! PRG format is very simple:
//! - 2-byte load address (little-endian)
//! - Program data
//!
//! Raw binaries are the same without the load address.

use std::io;
use std::path::Path;

use crate::layout::Segment;

/// Encode a segment, with its load address in front when `with_address`.
pub fn encode_segment(segment: &Segment, with_address: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(segment.bytes.len() + 2);
    if with_address {
        out.extend_from_slice(&segment.address.to_le_bytes());
    }
    out.extend_from_slice(&segment.bytes);
    out
}

/// Read a PRG file and return the load address and data.
pub fn read_prg(path: &Path) -> io::Result<(u16, Vec<u8>)> {
    let data = std::fs::read(path)?;

    if data.len() < 2 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "PRG file too short",
        ));
    }

    let load_address = u16::from_le_bytes([data[0], data[1]]);
    Ok((load_address, data[2..].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_with_address() {
        let segment = Segment {
            address: 0xC000,
            bytes: vec![0xC0, 0x01, 0x02, 0x80],
        };
        assert_eq!(
            encode_segment(&segment, true),
            vec![0x00, 0xC0, 0xC0, 0x01, 0x02, 0x80]
        );
    }

    #[test]
    fn test_encode_raw() {
        let segment = Segment {
            address: 0xC000,
            bytes: vec![0x80],
        };
        assert_eq!(encode_segment(&segment, false), vec![0x80]);
    }

    #[test]
    fn test_read_prg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.prg");
        std::fs::write(&path, [0x01, 0x08, 0xAA]).unwrap();

        let (address, data) = read_prg(&path).unwrap();
        assert_eq!(address, 0x0801);
        assert_eq!(data, vec![0xAA]);
    }

    #[test]
    fn test_read_short_prg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.prg");
        std::fs::write(&path, [0x01]).unwrap();
        assert!(read_prg(&path).is_err());
    }
}

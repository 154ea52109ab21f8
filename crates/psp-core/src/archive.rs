// Ordered little-endian primitives shared by the embedded binary sub-formats.
use uuid::Uuid;

use crate::error::CodecError;

#[derive(Debug, Clone)]
pub struct ArchiveReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ArchiveReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
    pub fn eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if len > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                pos: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let s = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(s)
    }
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_slice(N)?);
        Ok(out)
    }
    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_array::<1>()?[0])
    }
    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }
    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }
    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }
    pub fn read_f32(&mut self) -> Result<f32, CodecError> {
        Ok(f32::from_bits(self.read_u32()?))
    }
    /// Reader over the next `len` bytes; this reader skips past them.
    pub fn scoped(&mut self, len: usize) -> Result<ArchiveReader<'a>, CodecError> {
        Ok(ArchiveReader::new(self.read_slice(len)?))
    }
    pub fn read_to_end(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }

    /// Unreal FString: i32 count including the NUL terminator, negative for UTF-16.
    pub fn read_fstring(&mut self) -> Result<String, CodecError> {
        let start = self.pos;
        let size = self.read_i32()?;
        if size == 0 {
            return Ok(String::new());
        }
        if size < 0 {
            let units = size.unsigned_abs() as usize;
            let raw = self.read_slice(units * 2)?;
            let mut chars: Vec<u16> = raw
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect();
            if chars.pop() != Some(0) {
                return Err(CodecError::InvalidString {
                    pos: start,
                    reason: "missing terminator",
                });
            }
            String::from_utf16(&chars).map_err(|_| CodecError::InvalidString {
                pos: start,
                reason: "invalid utf-16",
            })
        } else {
            let raw = self.read_slice(size as usize)?;
            let Some((&0, text)) = raw.split_last() else {
                return Err(CodecError::InvalidString {
                    pos: start,
                    reason: "missing terminator",
                });
            };
            std::str::from_utf8(text)
                .map(str::to_owned)
                .map_err(|_| CodecError::InvalidString {
                    pos: start,
                    reason: "invalid utf-8",
                })
        }
    }

    pub fn read_guid(&mut self) -> Result<Uuid, CodecError> {
        Ok(guid_from_wire(self.read_array()?))
    }
}

#[derive(Debug, Default, Clone)]
pub struct ArchiveWriter {
    out: Vec<u8>,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.out.len()
    }
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }
    pub fn into_bytes(self) -> Vec<u8> {
        self.out
    }

    pub fn write_bytes(&mut self, b: &[u8]) {
        self.out.extend_from_slice(b);
    }
    pub fn write_zeros(&mut self, n: usize) {
        self.out.resize(self.out.len() + n, 0);
    }
    pub fn write_u16(&mut self, v: u16) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }
    pub fn write_u32(&mut self, v: u32) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }
    pub fn write_i32(&mut self, v: i32) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }
    pub fn write_f32(&mut self, v: f32) {
        self.out.extend_from_slice(&v.to_bits().to_le_bytes());
    }
    pub fn write_fstring(&mut self, s: &str) {
        if s.is_empty() {
            self.write_i32(0);
        } else if s.is_ascii() {
            self.write_i32(s.len() as i32 + 1);
            self.write_bytes(s.as_bytes());
            self.out.push(0);
        } else {
            let units: Vec<u16> = s.encode_utf16().collect();
            self.write_i32(-(units.len() as i32 + 1));
            for u in units {
                self.write_u16(u);
            }
            self.write_u16(0);
        }
    }
    pub fn write_guid(&mut self, id: Uuid) {
        self.write_bytes(&guid_to_wire(id));
    }
}

// GUIDs travel as four little-endian u32 words; the canonical uuid byte
// order is big-endian per word.
pub fn guid_from_wire(raw: [u8; 16]) -> Uuid {
    Uuid::from_bytes(swap_words(raw))
}

pub fn guid_to_wire(id: Uuid) -> [u8; 16] {
    swap_words(*id.as_bytes())
}

fn swap_words(mut b: [u8; 16]) -> [u8; 16] {
    for word in b.chunks_exact_mut(4) {
        word.reverse();
    }
    b
}

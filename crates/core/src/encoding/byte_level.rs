//! Byte-level alphabet (GPT-2 style).
//!
//! Byte-level models never see raw bytes: every byte is first mapped to a
//! printable unicode character so that vocabulary entries stay valid UTF-8
//! strings. Printable Latin-1 bytes map to themselves, the remaining 68 bytes
//! map to `U+0100..`, so a space becomes `Ġ` and a newline `Ċ`.

use ahash::AHashMap;
use std::sync::OnceLock;

/// Bidirectional byte <-> char table.
pub struct ByteAlphabet {
    /// Byte to unicode mapping
    byte_encoder: [char; 256],
    /// Unicode to byte mapping for decoding
    byte_decoder: AHashMap<char, u8>,
}

impl ByteAlphabet {
    /// The process-wide table, built on first use.
    pub fn get() -> &'static ByteAlphabet {
        static ALPHABET: OnceLock<ByteAlphabet> = OnceLock::new();
        ALPHABET.get_or_init(Self::build)
    }

    fn build() -> Self {
        let byte_encoder = Self::build_byte_encoder();
        let byte_decoder = byte_encoder
            .iter()
            .enumerate()
            .map(|(byte, &ch)| (ch, byte as u8))
            .collect();

        Self {
            byte_encoder,
            byte_decoder,
        }
    }

    /// Build the byte-to-unicode mapping.
    fn build_byte_encoder() -> [char; 256] {
        let mut byte_encoder = ['\0'; 256];
        let mut shifted = 0u32;

        for byte in 0u32..256 {
            let printable = (0x21..=0x7E).contains(&byte)
                || (0xA1..=0xAC).contains(&byte)
                || (0xAE..=0xFF).contains(&byte);
            let codepoint = if printable {
                byte
            } else {
                shifted += 1;
                255 + shifted
            };
            // All codepoints are below 0x200 and therefore valid chars.
            byte_encoder[byte as usize] =
                char::from_u32(codepoint).unwrap_or(char::REPLACEMENT_CHARACTER);
        }

        byte_encoder
    }

    /// Map a single byte to its alphabet character.
    #[inline]
    pub fn encode_byte(&self, byte: u8) -> char {
        self.byte_encoder[byte as usize]
    }

    /// Map every byte of `text` to its alphabet character.
    pub fn encode_str(&self, text: &str) -> String {
        text.bytes().map(|b| self.encode_byte(b)).collect()
    }

    /// Map alphabet characters back to bytes, appending to `out`.
    ///
    /// Characters outside the alphabet are appended as their UTF-8 bytes.
    pub fn decode_into(&self, token: &str, out: &mut Vec<u8>) {
        for ch in token.chars() {
            match self.byte_decoder.get(&ch) {
                Some(&byte) => out.push(byte),
                None => {
                    let mut buf = [0u8; 4];
                    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                }
            }
        }
    }
}

//! Dictionary coder in the LZ78 family.
//!
//! The stream starts with a 4-byte big-endian plaintext length, followed by
//! (index, byte) pairs. Indices are unsigned LEB128; index 0 is the empty
//! phrase, and every emitted pair appends a new phrase to the dictionary.
//! A final prefix left over at end of input is emitted as `(index, 0x00)`;
//! the decoder recognises it because appending the full pair would overshoot
//! the recorded plaintext length.

use std::collections::HashMap;

use crate::error::StegaError;
use crate::result::Result;

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() > u32::MAX as usize {
        return Err(StegaError::CompressionFailed(
            "payload exceeds the 4 GiB dictionary coder limit".into(),
        ));
    }

    let mut out = Vec::with_capacity(data.len() / 2 + 8);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());

    // Phrases are keyed by (parent index, extension byte) so the scan never
    // materialises phrase bytes.
    let mut dict: HashMap<(u32, u8), u32> = HashMap::new();
    let mut next_index: u32 = 1;
    let mut w: u32 = 0;

    for &c in data {
        match dict.get(&(w, c)) {
            Some(&index) => w = index,
            None => {
                write_index(&mut out, w);
                out.push(c);
                dict.insert((w, c), next_index);
                next_index += 1;
                w = 0;
            }
        }
    }

    if w != 0 {
        write_index(&mut out, w);
        out.push(0x00);
    }

    Ok(out)
}

pub fn decompress(body: &[u8]) -> Result<Vec<u8>> {
    if body.len() < 4 {
        return Err(StegaError::CorruptStream("missing length header"));
    }
    let n = u32::from_be_bytes([body[0], body[1], body[2], body[3]]) as usize;

    // Dictionary entries as (parent, byte, phrase length); entry 0 is the
    // empty phrase.
    let mut dict: Vec<(u32, u8, u32)> = vec![(0, 0, 0)];
    let mut out = Vec::with_capacity(n);
    let mut pos = 4;

    while pos < body.len() {
        let (index, advanced) = read_index(&body[pos..])?;
        pos += advanced;
        if pos >= body.len() {
            return Err(StegaError::CorruptStream("truncated pair"));
        }
        let byte = body[pos];
        pos += 1;

        let index = index as usize;
        if index >= dict.len() {
            return Err(StegaError::CorruptStream("dictionary index out of range"));
        }

        let phrase_len = dict[index].2 as usize;
        if out.len() + phrase_len + 1 > n {
            // Trailing pair: the final prefix carries no literal byte.
            if out.len() + phrase_len != n || pos != body.len() {
                return Err(StegaError::CorruptStream("trailing pair overshoots"));
            }
            append_phrase(&mut out, &dict, index);
            break;
        }

        append_phrase(&mut out, &dict, index);
        out.push(byte);
        dict.push((index as u32, byte, phrase_len as u32 + 1));
    }

    if out.len() != n {
        return Err(StegaError::LengthMismatch {
            expected: n,
            got: out.len(),
        });
    }

    Ok(out)
}

fn append_phrase(out: &mut Vec<u8>, dict: &[(u32, u8, u32)], index: usize) {
    let start = out.len();
    let mut i = index;
    while i != 0 {
        let (parent, byte, _) = dict[i];
        out.push(byte);
        i = parent as usize;
    }
    out[start..].reverse();
}

fn write_index(out: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn read_index(buf: &[u8]) -> Result<(u32, usize)> {
    let mut value: u64 = 0;
    for (i, &byte) in buf.iter().enumerate() {
        if i >= 5 {
            return Err(StegaError::CorruptStream("index varint overflow"));
        }
        value |= ((byte & 0x7f) as u64) << (7 * i);
        if byte & 0x80 == 0 {
            if value > u32::MAX as u64 {
                return Err(StegaError::CorruptStream("index varint overflow"));
            }
            return Ok((value as u32, i + 1));
        }
    }
    Err(StegaError::CorruptStream("truncated index varint"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(data: &[u8]) {
        let compressed = compress(data).unwrap();
        let recovered = decompress(&compressed).unwrap();
        assert_eq!(recovered, data);
    }

    #[test]
    fn roundtrips_empty_input() {
        roundtrip(b"");
    }

    #[test]
    fn roundtrips_single_byte() {
        roundtrip(b"x");
    }

    #[test]
    fn roundtrips_text() {
        roundtrip(b"to be or not to be, that is the question");
    }

    #[test]
    fn roundtrips_input_ending_on_a_known_phrase() {
        // "abab" ends while the scanner still holds the phrase "ab",
        // forcing the trailing-pair path.
        roundtrip(b"abab");
        roundtrip(b"aaaa");
        roundtrip(b"abcabcabc");
    }

    #[test]
    fn roundtrips_repetitive_input() {
        roundtrip(&vec![b'a'; 4096]);
    }

    #[test]
    fn roundtrips_all_byte_values() {
        let data: Vec<u8> = (0..=255u8).cycle().take(2048).collect();
        roundtrip(&data);
    }

    #[test]
    fn roundtrips_seeded_random_input() {
        let mut rng = fastrand::Rng::with_seed(7);
        let data: Vec<u8> = (0..10_000).map(|_| rng.u8(..)).collect();
        roundtrip(&data);
    }

    #[test]
    fn compresses_repetitive_input() {
        let data = vec![b'z'; 8192];
        let compressed = compress(&data).unwrap();
        assert!(compressed.len() < data.len() / 4);
    }

    #[test]
    fn rejects_out_of_range_index() {
        let mut stream = 1u32.to_be_bytes().to_vec();
        stream.push(0x09); // index 9 with an empty dictionary
        stream.push(b'a');
        assert!(matches!(
            decompress(&stream),
            Err(StegaError::CorruptStream("dictionary index out of range"))
        ));
    }

    #[test]
    fn rejects_truncated_pair() {
        let mut stream = 2u32.to_be_bytes().to_vec();
        stream.push(0x00); // index with no literal byte following
        assert!(matches!(
            decompress(&stream),
            Err(StegaError::CorruptStream("truncated pair"))
        ));
    }

    #[test]
    fn rejects_length_mismatch() {
        let mut stream = compress(b"hello world").unwrap();
        // Claim one byte more than the pairs reconstruct.
        let n = u32::from_be_bytes([stream[0], stream[1], stream[2], stream[3]]) + 1;
        stream[..4].copy_from_slice(&n.to_be_bytes());
        assert!(matches!(
            decompress(&stream),
            Err(StegaError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn rejects_missing_header() {
        assert!(matches!(
            decompress(&[0x00]),
            Err(StegaError::CorruptStream("missing length header"))
        ));
    }

    #[test]
    fn varint_roundtrip() {
        for value in [0u32, 1, 127, 128, 300, 16_383, 16_384, u32::MAX] {
            let mut buf = Vec::new();
            write_index(&mut buf, value);
            let (read, len) = read_index(&buf).unwrap();
            assert_eq!(read, value);
            assert_eq!(len, buf.len());
        }
    }
}

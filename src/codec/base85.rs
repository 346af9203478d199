//! Base-85 alphabets and group arithmetic
//!
//! RFC 1924 is encoded and decoded here: 4 bytes map to 5 digits in
//! big-endian order, and a trailing group of `n` bytes encodes to `n + 1`
//! digits, padded with the highest digit (84) when decoding. Ascii85 and Z85
//! are decoded by their crates; this module only prechecks their bodies.

use super::errors::{CodecError, CodecResult};

const INVALID: u8 = 0xff;

/// A base-85 symbol table with its reverse lookup
pub(crate) struct Alphabet {
    symbols: [u8; 85],
    lookup: [u8; 256],
}

impl Alphabet {
    const fn new(symbols: &[u8; 85]) -> Self {
        let mut table = [0u8; 85];
        let mut lookup = [INVALID; 256];
        let mut i = 0;
        while i < 85 {
            table[i] = symbols[i];
            lookup[symbols[i] as usize] = i as u8;
            i += 1;
        }
        Self {
            symbols: table,
            lookup,
        }
    }

    const fn contiguous(first: u8) -> Self {
        let mut symbols = [0u8; 85];
        let mut i = 0;
        while i < 85 {
            symbols[i] = first + i as u8;
            i += 1;
        }
        Self::new(&symbols)
    }

    fn value_of(&self, byte: u8) -> Option<u8> {
        match self.lookup[byte as usize] {
            INVALID => None,
            v => Some(v),
        }
    }

    fn symbol(&self, digit: u8) -> char {
        self.symbols[digit as usize] as char
    }

    /// True when `byte` is a digit of this alphabet
    pub(crate) fn contains(&self, byte: u8) -> bool {
        self.lookup[byte as usize] != INVALID
    }
}

/// btoa / Ascii85: `!` through `u`
pub(crate) static ASCII85: Alphabet = Alphabet::contiguous(b'!');

/// RFC 1924 alphabet
pub(crate) static RFC1924: Alphabet = Alphabet::new(
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!#$%&()*+-;<=>?@^_`{|}~",
);

/// ZeroMQ Z85 alphabet
pub(crate) static Z85: Alphabet = Alphabet::new(
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ.-:+=^!/*?&<>()[]{}@%$#",
);

/// Reports the first byte of `body` outside `alphabet`
///
/// `extra` lists additional bytes the caller accepts (the Ascii85 `z`).
pub(crate) fn check_alphabet(body: &str, alphabet: &Alphabet, extra: &[u8]) -> CodecResult<()> {
    match body
        .bytes()
        .position(|b| !alphabet.contains(b) && !extra.contains(&b))
    {
        Some(position) => Err(invalid_character(body, position)),
        None => Ok(()),
    }
}

/// Rejects bodies whose digit count leaves a lone trailing digit
pub(crate) fn check_length(len: usize) -> CodecResult<()> {
    if len % 5 == 1 {
        return Err(CodecError::InvalidLength {
            len,
            reason: "a trailing group of one digit cannot carry a byte",
        });
    }
    Ok(())
}

/// Validates group structure for Ascii85 bodies before the crate decodes them.
///
/// Rejects `z` inside a partial group, groups above `u32::MAX` (a trailing
/// group is padded with `u` first) and a lone trailing digit.
pub(crate) fn check_ascii85_groups(body: &str) -> CodecResult<()> {
    let bytes = body.as_bytes();
    let mut group = [0u8; 5];
    let mut filled = 0;
    let mut group_start = 0;

    for (position, &byte) in bytes.iter().enumerate() {
        if byte == b'z' {
            if filled != 0 {
                return Err(CodecError::MisplacedZero { position });
            }
            continue;
        }
        let digit = ASCII85
            .value_of(byte)
            .ok_or_else(|| invalid_character(body, position))?;
        if filled == 0 {
            group_start = position;
        }
        group[filled] = digit;
        filled += 1;
        if filled == 5 {
            fold(&group, group_start)?;
            filled = 0;
        }
    }

    match filled {
        0 => Ok(()),
        1 => Err(CodecError::InvalidLength {
            len: bytes.len(),
            reason: "a trailing group of one digit cannot carry a byte",
        }),
        n => {
            for slot in &mut group[n..] {
                *slot = 84;
            }
            fold(&group, group_start).map(|_| ())
        }
    }
}

/// Encodes `data` with `alphabet`; a trailing group of `n` bytes gives `n + 1` digits
pub(crate) fn encode(data: &[u8], alphabet: &Alphabet) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(4) * 5);

    for chunk in data.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        let mut value = u32::from_be_bytes(word);

        let mut digits = [0u8; 5];
        for slot in digits.iter_mut().rev() {
            *slot = (value % 85) as u8;
            value /= 85;
        }
        for &digit in &digits[..chunk.len() + 1] {
            out.push(alphabet.symbol(digit));
        }
    }

    out
}

/// Decodes `body` with `alphabet`; the inverse of [`encode`]
pub(crate) fn decode(body: &str, alphabet: &Alphabet) -> CodecResult<Vec<u8>> {
    let bytes = body.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() / 5 * 4 + 4);
    let mut group = [0u8; 5];
    let mut filled = 0;
    let mut group_start = 0;

    for (position, &byte) in bytes.iter().enumerate() {
        let digit = alphabet
            .value_of(byte)
            .ok_or_else(|| invalid_character(body, position))?;
        if filled == 0 {
            group_start = position;
        }
        group[filled] = digit;
        filled += 1;

        if filled == 5 {
            out.extend_from_slice(&fold(&group, group_start)?.to_be_bytes());
            filled = 0;
        }
    }

    match filled {
        0 => {}
        1 => {
            return Err(CodecError::InvalidLength {
                len: bytes.len(),
                reason: "a trailing group of one digit cannot carry a byte",
            })
        }
        n => {
            for slot in &mut group[n..] {
                *slot = 84;
            }
            let word = fold(&group, group_start)?.to_be_bytes();
            out.extend_from_slice(&word[..n - 1]);
        }
    }

    Ok(out)
}

fn fold(group: &[u8; 5], position: usize) -> CodecResult<u32> {
    let value = group
        .iter()
        .fold(0u64, |acc, &digit| acc * 85 + u64::from(digit));
    u32::try_from(value).map_err(|_| CodecError::GroupOverflow { position })
}

fn invalid_character(body: &str, position: usize) -> CodecError {
    // position is always the first byte of a char: every earlier byte was ASCII
    let ch = body
        .get(position..)
        .and_then(|rest| rest.chars().next())
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    CodecError::InvalidCharacter { ch, position }
}

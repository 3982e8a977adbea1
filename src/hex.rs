use std::fmt::Display;

/// A lowercase hexadecimal encoding of binary data.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Hex(String);

impl Hex {
    /// Whether `s` is a non-empty string made only of lowercase hex digits.
    pub fn is_hex(s: &str) -> bool {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }
}

impl Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Hex> for String {
    fn from(hex: Hex) -> Self {
        hex.0
    }
}

impl<'a> From<&'a [u8]> for Hex {
    fn from(bytes: &[u8]) -> Self {
        fn hex_digit(b: u8) -> char {
            if b <= 9 {
                (b + b'0') as char
            } else {
                (b + b'a' - 10) as char
            }
        }

        let mut out = String::with_capacity(bytes.len() * 2);
        for &b in bytes {
            out.push(hex_digit(b >> 4));
            out.push(hex_digit(b & 0b00001111));
        }
        Hex(out)
    }
}

#[test]
fn test_hex_encoding() {
    let example: &[u8] = &[0x00, 0x0f, 0xa5, 0xff];
    assert_eq!(Hex::from(example).to_string(), "000fa5ff");
}

#[test]
fn test_is_hex() {
    assert!(Hex::is_hex("0123456789abcdef"));
    assert!(!Hex::is_hex(""));
    assert!(!Hex::is_hex("ABCDEF"));
    assert!(!Hex::is_hex("../main"));
}

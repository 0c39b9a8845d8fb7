//! utils.rs
//! Small diagnostics helpers used by error paths and tests.

use std::fmt;

use num_enum::TryFromPrimitive;

/// Render a raw enum primitive as its variant name, or as hex when the value
/// is not a known variant.
pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:x}", raw),
    }
}

/// Hexdump with a label, 16 bytes per line. Used in test failure output when
/// tags or buffers mismatch.
pub fn byte_hexdump(label: &str, bytes: &[u8]) -> String {
    let mut out = format!("{}:\n", label);
    for chunk in bytes.chunks(16) {
        out.push_str(&hex::encode(chunk));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::CipherMode;

    #[test]
    fn unknown_id_prints_hex() {
        assert_eq!(enum_name_or_hex::<CipherMode>(0xbeef), "0xbeef");
    }

    #[test]
    fn known_id_prints_name() {
        assert_eq!(enum_name_or_hex::<CipherMode>(CipherMode::Cbc as u16), "Cbc");
    }

    #[test]
    fn hexdump_chunks_lines() {
        let dump = byte_hexdump("iv", &[0u8; 20]);
        assert!(dump.starts_with("iv:\n"));
        assert_eq!(dump.lines().count(), 3); // label + 16 bytes + 4 bytes
    }
}

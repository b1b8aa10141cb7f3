use std::fmt;
use num_enum::TryFromPrimitive;

/// Render a registry value as its variant name, or as hex when unknown.
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

/// Render bytes as a quoted string when printable, hex otherwise.
pub fn fmt_bytes(b: &[u8]) -> String {
    if b.iter().all(|&c| c.is_ascii_graphic() || c == b' ') {
        format!("b\"{}\"", String::from_utf8_lossy(b))
    } else {
        format!("0x{}", hex::encode(b))
    }
}

/// Render a single section tag or field code.
pub fn fmt_code(code: u8) -> String {
    if code.is_ascii_graphic() {
        format!("'{}'", code as char)
    } else {
        format!("0x{:02x}", code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_code_printable_and_binary() {
        assert_eq!(fmt_code(b'F'), "'F'");
        assert_eq!(fmt_code(0x00), "0x00");
    }
}

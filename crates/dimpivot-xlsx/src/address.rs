//! A1-style cell references

use std::fmt;

use crate::error::{XlsxError, XlsxResult};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Zero-based cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellAddress {
    pub row: u32,
    pub col: u16,
}

impl CellAddress {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse an A1-style reference; `$` markers are accepted and ignored
    pub fn parse(s: &str) -> XlsxResult<Self> {
        let s = s.trim();
        let invalid =
            |why: &str| XlsxError::Parse(format!("Invalid cell reference '{}': {}", s, why));

        let bytes = s.as_bytes();
        let mut pos = 0;
        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == col_start {
            return Err(invalid("no column letters"));
        }
        let col = Self::letters_to_column(&s[col_start..pos])
            .ok_or_else(|| invalid("column out of range"))?;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let row: u32 = s[pos..].parse().map_err(|_| invalid("invalid row number"))?;
        if row == 0 || row > MAX_ROWS {
            return Err(invalid("row out of range"));
        }

        Ok(Self { row: row - 1, col })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u16) -> String {
        let mut result = String::new();
        let mut n = col as u32 + 1;

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Option<u16> {
        if letters.is_empty() {
            return None;
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return None;
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
            if col > MAX_COLS as u32 {
                return None;
            }
        }

        Some((col - 1) as u16)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(701), "ZZ");
        assert_eq!(CellAddress::column_to_letters(16383), "XFD");
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(CellAddress::letters_to_column("A"), Some(0));
        assert_eq!(CellAddress::letters_to_column("aa"), Some(26));
        assert_eq!(CellAddress::letters_to_column("XFD"), Some(16383));
        assert_eq!(CellAddress::letters_to_column("XFE"), None);
        assert_eq!(CellAddress::letters_to_column(""), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(CellAddress::parse("A1").unwrap(), CellAddress::new(0, 0));
        assert_eq!(CellAddress::parse("$C$12").unwrap(), CellAddress::new(11, 2));
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("12").is_err());
        assert!(CellAddress::parse("B").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(CellAddress::new(3, 27).to_string(), "AB4");
    }
}

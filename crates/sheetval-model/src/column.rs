//! Spreadsheet column letters and cell coordinates.
//!
//! Column identifiers are spreadsheet letters (`A`, `B`, ..., `Z`, `AA`, ...).
//! Indexes are zero-based, row numbers are one-based.

/// Separator placed between the per-column parts of a multi-cell coordinate.
pub const COORDINATE_SEPARATOR: &str = "+";

/// Convert a zero-based column index to its letter (0 = A, 25 = Z, 26 = AA).
pub fn column_letter(index: usize) -> String {
    let mut letters = String::new();
    let mut n = index;
    loop {
        letters.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters
}

/// Convert a column letter back to its zero-based index.
///
/// Lowercase letters are accepted. Returns `None` for anything that is not a
/// non-empty run of ASCII letters.
pub fn column_index(column: &str) -> Option<usize> {
    let column = column.trim();
    if column.is_empty() || !column.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return None;
    }
    let mut index = 0usize;
    for ch in column.chars() {
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

/// Cell address for a column identifier and a one-based row (`B` + 5 = `B5`).
pub fn cell_address(column: &str, row: u32) -> String {
    format!("{column}{row}")
}

/// Split an address such as `AB12` into its column letters and row number.
pub fn split_address(address: &str) -> Option<(&str, u32)> {
    let split = address.find(|ch: char| ch.is_ascii_digit())?;
    let (column, row) = address.split_at(split);
    if column.is_empty() {
        return None;
    }
    column_index(column)?;
    let row = row.parse::<u32>().ok()?;
    Some((column, row))
}

/// Coordinate string for a set of columns on one row (`A2+B2+C2`).
pub fn coordinate<S: AsRef<str>>(columns: &[S], row: u32) -> String {
    columns
        .iter()
        .map(|column| cell_address(column.as_ref(), row))
        .collect::<Vec<_>>()
        .join(COORDINATE_SEPARATOR)
}

//! Conversions between 0-based cell indexes and A1-style references.

/// Converts a 0-based (row, col) pair to an A1-style reference, e.g. `(1, 27)` to `AB2`.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut reference = index_to_col(col);
    reference.push_str(&(row + 1).to_string());
    reference
}

/// Converts a 0-based column index to its letters, e.g. `0` to `A`, `26` to `AA`.
pub(crate) fn index_to_col(col: usize) -> String {
    let mut column = col + 1;
    let mut letters = Vec::new();
    while column > 0 {
        column -= 1;
        letters.push(b'A' + (column % 26) as u8);
        column /= 26;
    }
    letters.iter().rev().map(|letter| *letter as char).collect()
}

/// Parses an A1-style reference into a 0-based (row, col) pair.
/// Returns None when either part is missing or malformed.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let col = col_to_index(letters)?;
    let row = row_to_index(digits)?;
    Some((row, col))
}

/// Parses column letters (case-insensitive) into a 0-based index.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for letter in letters.chars() {
        if !letter.is_ascii_alphabetic() {
            return None;
        }
        let digit = (letter.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

/// Parses a 1-based row number into a 0-based index.
pub(crate) fn row_to_index(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok()?.checked_sub(1)
}

//! Free-form field normalizers shared by the CSV and PDF ingestors
//!
//! - `amount` - currency strings to exact signed decimals
//! - `date` - numeric and month-name dates to calendar dates

pub mod amount;
pub mod date;

pub use amount::{normalize as normalize_amount, to_storage_scale};
pub use date::normalize as normalize_date;

/// Trim and cap a description at `max_chars` characters
pub fn cap_description(description: &str, max_chars: usize) -> String {
    let trimmed = description.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => trimmed[..idx].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_description() {
        assert_eq!(cap_description("  NETFLIX.COM  ", 500), "NETFLIX.COM");
        assert_eq!(cap_description("abcdef", 3), "abc");
        // Multi-byte characters count once
        assert_eq!(cap_description("CAFÉ ÉCLAIR", 4), "CAFÉ");
        assert_eq!(cap_description("", 10), "");
    }
}

use crate::core::error::ParseError;

/// Pull a day count out of free text such as "45 days"
///
/// Every ASCII digit in the string is concatenated and parsed as base 10,
/// so "1 year 2 days" reads as 12.
pub fn extract_days(raw: &str) -> Result<u32, ParseError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return Err(ParseError::NoDigits(raw.to_string()));
    }

    digits
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidDays(raw.to_string()))
}

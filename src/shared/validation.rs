use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Loose email shape check, intentionally matching the historical intake
    /// form behavior rather than full RFC 5322.
    /// - Valid: "max@example.de", "a.b+c@mail.example.com"
    /// - Invalid: "max@example", "max example@de", "@example.de"
    pub static ref EMAIL_REGEX: Regex = Regex::new(r"^\S+@\S+\.\S+$").unwrap();

    /// German postal code: exactly five digits.
    pub static ref PLZ_REGEX: Regex = Regex::new(r"^[0-9]{5}$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_regex_valid() {
        assert!(EMAIL_REGEX.is_match("max@example.de"));
        assert!(EMAIL_REGEX.is_match("a.b+c@mail.example.com"));
        assert!(EMAIL_REGEX.is_match("x@y.z"));
    }

    #[test]
    fn test_email_regex_invalid() {
        assert!(!EMAIL_REGEX.is_match("max@example")); // no TLD dot
        assert!(!EMAIL_REGEX.is_match("max example@de.de")); // whitespace
        assert!(!EMAIL_REGEX.is_match("@example.de")); // empty local part? kept loose
        assert!(!EMAIL_REGEX.is_match("")); // empty
    }

    #[test]
    fn test_plz_regex() {
        assert!(PLZ_REGEX.is_match("44135"));
        assert!(PLZ_REGEX.is_match("01067"));
        assert!(!PLZ_REGEX.is_match("4413")); // too short
        assert!(!PLZ_REGEX.is_match("441356")); // too long
        assert!(!PLZ_REGEX.is_match("44a35")); // non-digit
        assert!(!PLZ_REGEX.is_match(""));
    }
}

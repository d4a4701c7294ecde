// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone number normalization to the provider wire format.

use wacast_config::model::PhoneConfig;

/// Turns a stored phone number into the digits-only form sent to the provider.
pub trait PhoneNormalizer: Send + Sync {
    fn normalize(&self, raw: &str) -> String;

    /// Digit strings a stored phone could have if it normalizes to
    /// `normalized`. Used to narrow contact lookups; callers still compare
    /// with [`normalize`](Self::normalize).
    fn stored_digit_forms(&self, normalized: &str) -> Vec<String> {
        vec![normalized.to_string()]
    }
}

/// Heuristic normalizer for a single-country contact base.
///
/// Keeps digits only, strips an international `00` prefix, and prepends the
/// country code when what remains has exactly the national number length.
/// Anything else is assumed to already carry a country code. This is not
/// E.164 validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCodeNormalizer {
    country_code: String,
    national_length: usize,
}

impl CountryCodeNormalizer {
    pub fn new(country_code: impl Into<String>, national_length: usize) -> Self {
        Self {
            country_code: country_code.into(),
            national_length,
        }
    }

    pub fn from_config(config: &PhoneConfig) -> Self {
        Self::new(config.default_country_code.clone(), config.national_length)
    }
}

impl Default for CountryCodeNormalizer {
    fn default() -> Self {
        Self::from_config(&PhoneConfig::default())
    }
}

impl PhoneNormalizer for CountryCodeNormalizer {
    fn normalize(&self, raw: &str) -> String {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        let digits = digits.strip_prefix("00").unwrap_or(&digits);
        if digits.len() == self.national_length {
            format!("{}{}", self.country_code, digits)
        } else {
            digits.to_string()
        }
    }

    fn stored_digit_forms(&self, normalized: &str) -> Vec<String> {
        let mut bases = vec![normalized.to_string()];
        if let Some(national) = normalized
            .strip_prefix(self.country_code.as_str())
            .filter(|n| n.len() == self.national_length)
        {
            bases.push(national.to_string());
        }
        let mut forms = bases.clone();
        forms.extend(bases.iter().map(|b| format!("00{b}")));
        forms
    }
}

/// Canonical stored form for manually blocked numbers: `+` followed by the
/// number with spaces and dashes removed.
pub fn blocklist_format(raw: &str) -> String {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    if compact.starts_with('+') {
        compact
    } else {
        format!("+{compact}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepends_country_code_to_national_numbers() {
        let n = CountryCodeNormalizer::new("91", 10);
        assert_eq!(n.normalize("98765 43210"), "919876543210");
        assert_eq!(n.normalize("+91 98765-43210"), "919876543210");
        assert_eq!(n.normalize("0091 9876543210"), "919876543210");
    }

    #[test]
    fn leaves_other_lengths_alone() {
        let n = CountryCodeNormalizer::new("91", 10);
        assert_eq!(n.normalize("+1 (415) 555-0100"), "14155550100");
        assert_eq!(n.normalize("12345"), "12345");
        assert_eq!(n.normalize(""), "");
    }

    #[test]
    fn country_code_comes_from_config() {
        let n = CountryCodeNormalizer::from_config(&PhoneConfig {
            default_country_code: "44".into(),
            national_length: 10,
        });
        assert_eq!(n.normalize("7700900123"), "447700900123");
    }

    #[test]
    fn stored_forms_cover_national_and_international_prefixes() {
        let n = CountryCodeNormalizer::new("91", 10);
        let forms = n.stored_digit_forms("919876543210");
        for raw in ["9876543210", "+91 98765 43210", "0091 9876543210", "00 98765 43210"] {
            let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
            assert!(forms.contains(&digits), "{raw} not covered by {forms:?}");
            assert_eq!(n.normalize(raw), "919876543210");
        }
        assert_eq!(n.stored_digit_forms("14155550100"), ["14155550100", "0014155550100"]);
    }

    #[test]
    fn blocklist_format_strips_separators() {
        assert_eq!(blocklist_format(" 98765-43210 "), "+9876543210");
        assert_eq!(blocklist_format("+91 98765 43210"), "+919876543210");
    }
}

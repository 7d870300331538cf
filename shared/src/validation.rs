//! Input validation functions
//!
//! Range checks mirror the schema's CHECK constraints so callers can reject
//! bad input before a round trip to the store. The store remains the final
//! authority; these exist for friendlier error messages.

use rust_decimal::Decimal;

/// Validate a calendar month (1-12)
pub fn validate_month(month: i32) -> Result<(), String> {
    if !(1..=12).contains(&month) {
        return Err(format!("Month must be between 1 and 12, got {month}"));
    }
    Ok(())
}

/// Validate a planning year
pub fn validate_year(year: i32) -> Result<(), String> {
    if !(2000..=2100).contains(&year) {
        return Err(format!("Year out of range: {year}"));
    }
    Ok(())
}

/// Validate a target headcount (must be positive)
pub fn validate_target_count(count: i32) -> Result<(), String> {
    if count <= 0 {
        return Err("Target count must be greater than zero".to_string());
    }
    Ok(())
}

/// Validate a strictly positive quantity (serving sizes, gram amounts,
/// substitution ratios, unit sizes)
pub fn validate_positive_quantity(value: Decimal) -> Result<(), String> {
    if value <= Decimal::ZERO {
        return Err("Quantity must be greater than zero".to_string());
    }
    Ok(())
}

/// Validate a non-negative money amount (budgets, prices)
pub fn validate_non_negative_amount(value: Decimal) -> Result<(), String> {
    if value < Decimal::ZERO {
        return Err("Amount cannot be negative".to_string());
    }
    Ok(())
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    // Basic email regex check
    let email_regex = regex_lite::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    if !email_regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Normalize an ingredient name for the fuzzy-lookup index
///
/// Lowercases ASCII and strips all whitespace, so "Dae Pa" and "daepa"
/// land on the same `name_normalized` value. Hangul passes through
/// unchanged.
pub fn normalize_ingredient_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_match_check_constraint() {
        assert!(validate_month(1).is_ok());
        assert!(validate_month(12).is_ok());
        assert!(validate_month(0).is_err());
        assert!(validate_month(13).is_err());
    }

    #[test]
    fn target_count_must_be_positive() {
        assert!(validate_target_count(50).is_ok());
        assert!(validate_target_count(0).is_err());
        assert!(validate_target_count(-3).is_err());
    }

    #[test]
    fn quantities_must_be_strictly_positive() {
        assert!(validate_positive_quantity(Decimal::new(10050, 2)).is_ok());
        assert!(validate_positive_quantity(Decimal::ZERO).is_err());
        assert!(validate_positive_quantity(Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn amounts_may_be_zero_but_not_negative() {
        assert!(validate_non_negative_amount(Decimal::ZERO).is_ok());
        assert!(validate_non_negative_amount(Decimal::new(-500, 2)).is_err());
    }

    #[test]
    fn email_validation_basics() {
        assert!(validate_email("planner@school.kr").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@nodot").is_err());
        assert!(validate_email("two words@school.kr").is_err());
        assert!(validate_email("a@b@school.kr").is_err());
    }

    #[test]
    fn normalization_strips_case_and_whitespace() {
        assert_eq!(normalize_ingredient_name("Green Onion"), "greenonion");
        assert_eq!(normalize_ingredient_name("  감자 "), "감자");
        assert_eq!(normalize_ingredient_name("감자"), "감자");
    }
}

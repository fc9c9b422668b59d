//! Normalization of user-facing choice strings
//!
//! The web tool presents human-readable labels; `TopoFlow` configuration
//! files want lowercase underscore-joined tokens and a couple of fixed
//! translations. The lookup tables are read-only static data.

/// Yes/No choice labels and the integer flags `TopoFlow` expects.
const CHOICE_FLAGS: &[(&str, i64)] = &[("Yes", 1), ("No", 0)];

/// Length-unit labels and the area-unit symbols `TopoFlow` expects.
const AREA_UNITS: &[(&str, &str)] = &[("meters", "m^2"), ("kilometers", "km^2")];

/// Format a choice label for consumption by `TopoFlow`.
///
/// Whitespace runs collapse to single underscores and the result is
/// lowercased.
///
/// ```
/// use topoflow_adapter_core::lowercase_choice;
///
/// assert_eq!(lowercase_choice("Kinematic Wave"), "kinematic_wave");
/// ```
#[must_use]
pub fn lowercase_choice(choice: &str) -> String {
    choice
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Integer flag for a Yes/No choice label, if recognized.
#[must_use]
pub fn choice_flag(choice: &str) -> Option<i64> {
    CHOICE_FLAGS
        .iter()
        .find(|(label, _)| *label == choice)
        .map(|&(_, flag)| flag)
}

/// Area-unit symbol for a length-unit label, if recognized.
#[must_use]
pub fn area_unit_symbol(unit: &str) -> Option<&'static str> {
    AREA_UNITS
        .iter()
        .find(|(label, _)| *label == unit)
        .map(|&(_, symbol)| symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_choice() {
        assert_eq!(lowercase_choice("Kinematic Wave"), "kinematic_wave");
        assert_eq!(lowercase_choice("Scalar"), "scalar");
        assert_eq!(lowercase_choice("  Diffusive   Wave  "), "diffusive_wave");
        assert_eq!(lowercase_choice(""), "");
    }

    #[test]
    fn test_choice_flags() {
        assert_eq!(choice_flag("Yes"), Some(1));
        assert_eq!(choice_flag("No"), Some(0));
        assert_eq!(choice_flag("Maybe"), None);
    }

    #[test]
    fn test_area_units() {
        assert_eq!(area_unit_symbol("meters"), Some("m^2"));
        assert_eq!(area_unit_symbol("kilometers"), Some("km^2"));
        assert_eq!(area_unit_symbol("miles"), None);
    }
}

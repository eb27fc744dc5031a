//! Fixed translation tables used when rendering measure logic

/// Display title of a population code
pub fn population_title(code: &str) -> Option<&'static str> {
    match code {
        "IPP" => Some("Initial Patient Population"),
        "DENOM" => Some("Denominator"),
        "NUMER" => Some("Numerator"),
        "NUMEX" => Some("Numerator Exclusions"),
        "DENEXCEP" => Some("Denominator Exceptions"),
        "DENEX" => Some("Denominator Exclusions"),
        "MSRPOPL" => Some("Measure Population"),
        "MSRPOPLEX" => Some("Measure Population Exclusions"),
        "OBSERV" => Some("Measure Observations"),
        "STRAT" => Some("Stratification"),
        _ => None,
    }
}

pub fn aggregator(code: &str) -> Option<&'static str> {
    match code {
        "MEAN" => Some("Mean of"),
        "MEDIAN" => Some("Median of"),
        _ => None,
    }
}

/// Operator joining the children of a derived, non-set criteria
pub fn logic_operator(code: &str) -> Option<&'static str> {
    match code {
        "XPRODUCT" => Some("AND"),
        _ => None,
    }
}

pub fn set_operator(code: &str) -> Option<&'static str> {
    match code {
        "INTERSECT" => Some("Intersection of"),
        "UNION" => Some("Union of"),
        _ => None,
    }
}

pub fn subset(code: &str) -> Option<&'static str> {
    match code {
        "COUNT" => Some("COUNT"),
        "FIRST" => Some("FIRST"),
        "SECOND" => Some("SECOND"),
        "THIRD" => Some("THIRD"),
        "FOURTH" => Some("FOURTH"),
        "FIFTH" => Some("FIFTH"),
        "RECENT" => Some("MOST RECENT"),
        "LAST" => Some("LAST"),
        "MIN" => Some("MIN"),
        "MAX" => Some("MAX"),
        "MEAN" => Some("MEAN"),
        "MEDIAN" => Some("MEDIAN"),
        "TIMEDIFF" => Some("Difference between times"),
        "DATEDIFF" => Some("Difference between dates"),
        "DATETIMEDIFF" => Some("Difference between date/times"),
        _ => None,
    }
}

/// Sentence for a `satisfies_all` / `satisfies_any` definition
pub fn satisfies_operator(definition: &str) -> Option<&'static str> {
    match definition {
        "satisfies_all" => Some("SATISFIES ALL"),
        "satisfies_any" => Some("SATISFIES ANY"),
        _ => None,
    }
}

/// Timing verb of a temporal reference, lowercased
pub fn timing(code: &str) -> Option<String> {
    timing_verb(code).map(str::to_lowercase)
}

fn timing_verb(code: &str) -> Option<&'static str> {
    match code {
        "DURING" => Some("During"),
        "OVERLAP" => Some("Overlaps"),
        "SBS" => Some("Starts Before Start of"),
        "SAS" => Some("Starts After Start of"),
        "SBE" => Some("Starts Before End of"),
        "SAE" => Some("Starts After End of"),
        "EBS" => Some("Ends Before Start of"),
        "EAS" => Some("Ends After Start of"),
        "EBE" => Some("Ends Before End of"),
        "EAE" => Some("Ends After End of"),
        "SDU" => Some("Starts During"),
        "EDU" => Some("Ends During"),
        "ECW" => Some("Ends Concurrent with"),
        "SCW" => Some("Starts Concurrent with"),
        "ECWS" => Some("Ends Concurrent with Start of"),
        "SCWE" => Some("Starts Concurrent with End of"),
        "SBCW" => Some("Starts Before or Concurrent with"),
        "SBCWE" => Some("Starts Before or Concurrent with End of"),
        "SACW" => Some("Starts After or Concurrent with"),
        "SACWE" => Some("Starts After or Concurrent with End of"),
        "SBDU" => Some("Starts Before or During"),
        "EBCW" => Some("Ends Before or Concurrent with"),
        "EBCWS" => Some("Ends Before or Concurrent with Start of"),
        "EACW" => Some("Ends After or Concurrent with"),
        "EACWS" => Some("Ends After or Concurrent with Start of"),
        "EADU" => Some("Ends After or During"),
        "CONCURRENT" => Some("Concurrent with"),
        _ => None,
    }
}

/// Human unit for an abbreviation, pluralized by `value`
///
/// Unknown units are returned unchanged.
pub fn unit(unit: &str, value: &str) -> String {
    let singular = match unit {
        "a" => "year",
        "mo" => "month",
        "wk" => "week",
        "d" => "day",
        "h" => "hour",
        "min" => "minute",
        "s" => "second",
        other => return other.to_string(),
    };
    if leading_integer(value) > 1 {
        format!("{}s", singular)
    } else {
        singular.to_string()
    }
}

pub fn conjunction(code: &str) -> Option<&'static str> {
    match code {
        "allTrue" => Some("AND"),
        "atLeastOneTrue" => Some("OR"),
        _ => None,
    }
}

/// Logical opposite of a rendered conjunction
pub fn flip_conjunction(conjunction: &str) -> Option<&'static str> {
    match conjunction {
        "AND" => Some("OR"),
        "OR" => Some("AND"),
        _ => None,
    }
}

/// Display title of a QDM field; unknown keys render as themselves
pub fn field_title(key: &str) -> &str {
    match key {
        "ABATEMENT_DATETIME" => "Abatement Datetime",
        "ADMISSION_DATETIME" => "Admission Date/Time",
        "ANATOMICAL_APPROACH_SITE" => "Anatomical Approach Site",
        "ANATOMICAL_LOCATION_SITE" => "Anatomical Location Site",
        "ANATOMICAL_STRUCTURE" => "Anatomical Structure",
        "CAUSE" => "Cause",
        "CUMULATIVE_MEDICATION_DURATION" => "Cumulative Medication Duration",
        "DIAGNOSIS" => "Diagnosis",
        "DISCHARGE_DATETIME" => "Discharge Date/Time",
        "DISCHARGE_STATUS" => "Discharge Status",
        "DOSE" => "Dose",
        "FACILITY_LOCATION" => "Facility Location",
        "FACILITY_LOCATION_ARRIVAL_DATETIME" => "Facility Location Arrival Date/Time",
        "FACILITY_LOCATION_DEPARTURE_DATETIME" => "Facility Location Departure Date/Time",
        "FLFS" => "Fulfills",
        "FREQUENCY" => "Frequency",
        "HEALTH_RECORD_FIELD" => "Health Record Field",
        "INCISION_DATETIME" => "Incision Date/Time",
        "LATERALITY" => "Laterality",
        "LENGTH_OF_STAY" => "Length of Stay",
        "METHOD" => "Method",
        "ONSET_AGE" => "Onset Age",
        "ONSET_DATETIME" => "Onset Date/Time",
        "ORDINAL" => "Ordinality",
        "PATIENT_PREFERENCE" => "Patient Preference",
        "PRINCIPAL_DIAGNOSIS" => "Principal Diagnosis",
        "PROVIDER_PREFERENCE" => "Provider Preference",
        "RADIATION_DOSAGE" => "Radiation Dosage",
        "RADIATION_DURATION" => "Radiation Duration",
        "REASON" => "Reason",
        "REFERENCE_RANGE_HIGH" => "Reference Range High",
        "REFERENCE_RANGE_LOW" => "Reference Range Low",
        "REFILLS" => "Refills",
        "REMOVAL_DATETIME" => "Removal Date/Time",
        "RESULT" => "Result",
        "RESULT_DATETIME" => "Result Date/Time",
        "ROUTE" => "Route",
        "SEVERITY" => "Severity",
        "SOURCE" => "Source",
        "START_DATETIME" => "Start Date/Time",
        "STATUS" => "Status",
        "STOP_DATETIME" => "Stop Date/Time",
        "TARGET_OUTCOME" => "Target Outcome",
        "TRANSFER_FROM" => "Transfer From",
        "TRANSFER_FROM_DATETIME" => "Transfer From Date/Time",
        "TRANSFER_TO" => "Transfer To",
        "TRANSFER_TO_DATETIME" => "Transfer To Date/Time",
        other => other,
    }
}

/// Integer prefix of a numeric string: `"2.5"` is 2, `"abc"` is 0
///
/// A digit run too long for `i64` saturates.
pub(crate) fn leading_integer(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return 0;
    }
    digits
        .parse::<i64>()
        .map_or(if sign < 0 { i64::MIN } else { i64::MAX }, |n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a", "18", "years")]
    #[case("a", "1", "year")]
    #[case("d", "1.9", "day")]
    #[case("d", "2.0", "days")]
    #[case("mo", "0", "month")]
    #[case("min", "-5", "minute")]
    #[case("wk", "", "week")]
    #[case("mg", "10", "mg")]
    #[case("%", "2", "%")]
    #[case("d", "99999999999999999999", "days")]
    fn test_unit(#[case] abbreviation: &str, #[case] value: &str, #[case] expected: &str) {
        assert_eq!(unit(abbreviation, value), expected);
    }

    #[rstest]
    #[case("42", 42)]
    #[case(" 7 days", 7)]
    #[case("3.99", 3)]
    #[case("-12", -12)]
    #[case("x1", 0)]
    #[case("", 0)]
    #[case("-", 0)]
    #[case("99999999999999999999", i64::MAX)]
    #[case("-99999999999999999999 days", i64::MIN)]
    fn test_leading_integer(#[case] value: &str, #[case] expected: i64) {
        assert_eq!(leading_integer(value), expected);
    }

    #[test]
    fn test_timing_is_lowercased() {
        assert_eq!(timing("SBS").as_deref(), Some("starts before start of"));
        assert_eq!(timing("CONCURRENT").as_deref(), Some("concurrent with"));
        assert_eq!(timing("NEVER"), None);
    }

    #[test]
    fn test_conjunctions_flip() {
        assert_eq!(conjunction("allTrue").and_then(flip_conjunction), Some("OR"));
        assert_eq!(conjunction("atLeastOneTrue").and_then(flip_conjunction), Some("AND"));
    }

    #[test]
    fn test_field_title_falls_back_to_key() {
        assert_eq!(field_title("LENGTH_OF_STAY"), "Length of Stay");
        assert_eq!(field_title("CUSTOM_FIELD"), "CUSTOM_FIELD");
    }
}

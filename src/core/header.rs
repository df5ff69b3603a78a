//! Header row normalization and alias resolution.

use std::collections::HashMap;
use std::sync::LazyLock;

const BOM: char = '\u{feff}';

// (canonical, aliases in normalized form)
const ALIASES: &[(&str, &[&str])] = &[
    (
        "employee_id",
        &[
            "employee id",
            "emp id",
            "empid",
            "emp no",
            "employee no",
            "employee code",
            "emp code",
        ],
    ),
    (
        "faculty_id",
        &["faculty id", "facultyid", "fac id", "teacher id", "staff id"],
    ),
    (
        "faculty_email",
        &[
            "faculty email",
            "email",
            "email id",
            "e mail",
            "mail",
            "faculty mail",
            "email address",
        ],
    ),
    ("name", &["name", "faculty name", "full name", "teacher name"]),
    ("department", &["department", "dept", "department name"]),
    ("subject", &["subject", "subject name", "course", "course name"]),
    (
        "room",
        &["room", "room no", "room number", "classroom", "hall", "venue"],
    ),
    ("date", &["date", "lecture date", "exam date"]),
    (
        "time",
        &["time", "start time", "lecture time", "slot", "time slot"],
    ),
    ("day", &["day", "weekday", "day of week"]),
    ("exam", &["exam", "exam name", "examination", "paper"]),
    ("academic_year", &["academic year", "acad year", "ay"]),
    ("branch", &["branch", "stream"]),
    ("year", &["year", "class year", "study year"]),
    ("section", &["section", "sec", "division", "div"]),
    (
        "total_leaves",
        &["total leaves", "total leave", "total"],
    ),
    ("cl", &["cl", "casual leave", "casual leaves"]),
    ("el", &["el", "earned leave", "earned leaves"]),
    ("ml", &["ml", "medical leave", "medical leaves"]),
];

static ALIAS_MAP: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    ALIASES
        .iter()
        .flat_map(|(canonical, aliases)| aliases.iter().map(move |alias| (*alias, *canonical)))
        .collect()
});

/// Lowercase, trim, drop a leading BOM, `_`/`-` → space, collapse whitespace.
pub fn normalize_header_text(cell: &str) -> String {
    let without_bom = cell.trim_start().trim_start_matches(BOM);
    without_bom
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves one header cell to its canonical field name. Unknown headers
/// come back as their normalized text.
pub fn canonical_field(cell: &str) -> String {
    let normalized = normalize_header_text(cell);
    match ALIAS_MAP.get(normalized.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => normalized,
    }
}

pub fn normalize_headers<S: AsRef<str>>(cells: &[S]) -> Vec<String> {
    cells.iter().map(|c| canonical_field(c.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_id_variants() {
        for header in ["Employee ID", "emp_id", "EMPID", "Emp-Id", "employee_id", " emp   no "] {
            assert_eq!(canonical_field(header), "employee_id", "header: {:?}", header);
        }
    }

    #[test]
    fn test_bom_is_stripped() {
        assert_eq!(canonical_field("\u{feff}Date"), "date");
        assert_eq!(canonical_field("\u{feff} Faculty_Email "), "faculty_email");
    }

    #[test]
    fn test_unknown_header_passes_through_normalized() {
        assert_eq!(canonical_field("  Extra--Notes_Col "), "extra notes col");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for header in ["\u{feff}Emp_ID", "Room   No", "  A-b_C  ", "total leaves", ""] {
            let once = normalize_header_text(header);
            assert_eq!(normalize_header_text(&once), once);
        }
    }

    #[test]
    fn test_canonical_names_resolve_to_themselves() {
        for (canonical, _) in ALIASES {
            assert_eq!(canonical_field(canonical), *canonical);
        }
    }

    #[test]
    fn test_normalize_headers_keeps_order() {
        let headers = normalize_headers(&["Date", "Time", "Email", "Room No", "Remarks"]);
        assert_eq!(
            headers,
            vec!["date", "time", "faculty_email", "room", "remarks"]
        );
    }
}

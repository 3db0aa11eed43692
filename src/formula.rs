//! Spreadsheet formula text for the lookup key column and dashboard cells.
//!
//! Formulas are produced without the leading `=`, which is how SpreadsheetML
//! stores them. Dashboard formulas read the region from the selector cell and
//! the language from column A of their own row, so one workbook answers for
//! every region.

use crate::catalog::KEY_SEPARATOR;
use crate::error::{Error, Result};
use crate::status::Status;

/// Name of the fact sheet.
pub const INPUT_SHEET: &str = "Service_Input";
/// Absolute reference of the region selector on both dashboards.
pub const SELECTOR_CELL: &str = "$C$4";
/// Dashboard row holding the service or product headers.
pub const HEADER_ROW: u32 = 7;

/// Quote `text` as a formula string literal.
pub fn string_literal(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Composite key of a fact row: `A{r}&"|"&B{r}&"|"&C{r}`.
pub fn lookup_key(row: u32) -> String {
    let sep = string_literal(&KEY_SEPARATOR.to_string());
    format!("A{row}&{sep}&B{row}&{sep}&C{row}")
}

/// INDEX/MATCH of the status column against the key column for a key
/// expression.
fn status_lookup(key: &str) -> String {
    format!(
        "INDEX({sheet}!$D:$D, MATCH({key}, {sheet}!$E:$E, 0))",
        sheet = INPUT_SHEET
    )
}

/// Service dashboard cell: the service is read from the header cell of
/// `column` and the language from column A of `row`.
pub fn service_lookup(column: &str, row: u32) -> String {
    let sep = string_literal(&KEY_SEPARATOR.to_string());
    status_lookup(&format!(
        "{SELECTOR_CELL}&{sep}&{column}${HEADER_ROW}&{sep}&$A{row}"
    ))
}

/// Lookup of one named dependency for the language in column A of `row`.
pub fn dependency_lookup(service: &str, row: u32) -> String {
    let infix = string_literal(&format!("{KEY_SEPARATOR}{service}{KEY_SEPARATOR}"));
    status_lookup(&format!("{SELECTOR_CELL}&{infix}&$A{row}"))
}

/// Product dashboard cell: worst-wins over the dependencies' lookups.
///
/// ```text
/// IF(OR(d1="Not Supported", d2="Not Supported"), "Not Supported",
///    IF(OR(d1="Limited Support", d2="Limited Support"), "Limited Support", "Full Support"))
/// ```
///
/// A single dependency is compared directly, without `OR`.
pub fn product_formula(dependencies: &[String], row: u32) -> Result<String> {
    if dependencies.is_empty() {
        return Err(Error::EmptyDependencySet);
    }

    let lookups: Vec<String> = dependencies
        .iter()
        .map(|service| dependency_lookup(service, row))
        .collect();

    let any_equal = |status: Status| {
        let literal = string_literal(status.as_str());
        let tests: Vec<String> = lookups
            .iter()
            .map(|lookup| format!("{lookup}={literal}"))
            .collect();
        match tests.as_slice() {
            [single] => single.clone(),
            _ => format!("OR({})", tests.join(", ")),
        }
    };

    Ok(format!(
        "IF({}, {}, IF({}, {}, {}))",
        any_equal(Status::NotSupported),
        string_literal(Status::NotSupported.as_str()),
        any_equal(Status::LimitedSupport),
        string_literal(Status::LimitedSupport.as_str()),
        string_literal(Status::FullSupport.as_str()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_key_formula() {
        assert_eq!(lookup_key(2), r#"A2&"|"&B2&"|"&C2"#);
    }

    #[test]
    fn service_lookup_formula() {
        assert_eq!(
            service_lookup("B", 8),
            r#"INDEX(Service_Input!$D:$D, MATCH($C$4&"|"&B$7&"|"&$A8, Service_Input!$E:$E, 0))"#
        );
    }

    #[test]
    fn dependency_lookup_embeds_service_name() {
        assert_eq!(
            dependency_lookup("KaaS/PKaaS", 9),
            r#"INDEX(Service_Input!$D:$D, MATCH($C$4&"|KaaS/PKaaS|"&$A9, Service_Input!$E:$E, 0))"#
        );
    }

    #[test]
    fn quotes_in_names_are_doubled() {
        assert_eq!(string_literal(r#"Say "hi""#), r#""Say ""hi""""#);
        assert!(dependency_lookup(r#"A"B"#, 8).contains(r#""|A""B|""#));
    }

    #[test]
    fn single_dependency_has_no_or() {
        let asr = dependency_lookup("ASR", 8);
        let formula = product_formula(&["ASR".to_string()], 8).unwrap();
        assert_eq!(
            formula,
            format!(
                r#"IF({asr}="Not Supported", "Not Supported", IF({asr}="Limited Support", "Limited Support", "Full Support"))"#
            )
        );
    }

    #[test]
    fn multi_dependency_uses_or() {
        let deps = ["NLP Services".to_string(), "Gen AI Services".to_string()];
        let formula = product_formula(&deps, 10).unwrap();
        let nlp = dependency_lookup("NLP Services", 10);
        let gen_ai = dependency_lookup("Gen AI Services", 10);
        assert!(formula.starts_with(&format!(
            r#"IF(OR({nlp}="Not Supported", {gen_ai}="Not Supported"), "Not Supported", "#
        )));
        assert!(formula.ends_with(r#""Limited Support", "Full Support"))"#));
        assert_eq!(formula.matches("INDEX(").count(), 4);
        assert!(!formula.contains("|ASR|"));
    }

    #[test]
    fn empty_dependencies_rejected() {
        assert!(matches!(
            product_formula(&[], 8),
            Err(Error::EmptyDependencySet)
        ));
    }
}

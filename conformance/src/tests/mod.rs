//! Registered conformance cases.
//!
//! Cases are grouped by the test group in their name: `/TP/GAC/...` lives in
//! `gac`, and so on. Each group exposes a `TESTS` table built with
//! [`define_test!`].

use crate::ConformanceTest;
use crate::config::HarnessConfig;
use crate::driver::run_test_case;
use crate::testcase::TestResult;

/// Build a PDU literal.
macro_rules! raw_pdu {
    ($($byte:expr),* $(,)?) => {
        &[$($byte),*]
    };
}

/// Register one scripted case.
///
/// ```ignore
/// define_test!("/TP/GAC/CL/BV-01-C", ClientUnderTest, None, None, [
///     raw_pdu!(0x02, 0x00, 0x02),
/// ])
/// ```
macro_rules! define_test {
    ($name:expr, $role:ident, $procedure:ident, $filter:expr, [$($pdu:expr),* $(,)?]) => {
        $crate::ConformanceTest {
            name: $name,
            role: $crate::testcase::Role::$role,
            procedure: $crate::testcase::Procedure::$procedure,
            filter: $filter,
            pdus: &[$($pdu),*],
        }
    };
}

pub mod gad;

/// All test categories.
pub const CATEGORIES: &[&str] = &["gac", "gad", "gar"];

fn category_tests(category: &str) -> Option<&'static [ConformanceTest]> {
    match category {
        "gac" => Some(gac::TESTS),
        "gad" => Some(gad::TESTS),
        "gar" => Some(gar::TESTS),
        _ => None,
    }
}

/// Every registered case, in category order.
pub fn all() -> impl Iterator<Item = &'static ConformanceTest> {
    CATEGORIES
        .iter()
        .filter_map(|c| category_tests(c))
        .flat_map(|tests| tests.iter())
}

/// Look a case up by its full name.
pub fn find(name: &str) -> Option<&'static ConformanceTest> {
    all().find(|t| t.name == name)
}

/// Run a case by full name (e.g. "/TP/GAD/CL/BV-01-C").
pub fn run(name: &str, config: &HarnessConfig) -> TestResult {
    match find(name) {
        Some(test) => run_test_case(&test.to_case(), config),
        None => TestResult::fail(format!("unknown test case: {}", name)),
    }
}

/// Names of all cases.
pub fn list_all() -> Vec<&'static str> {
    all().map(|t| t.name).collect()
}

/// Names of the cases in one category; empty for an unknown category.
pub fn list_category(category: &str) -> Vec<&'static str> {
    category_tests(category)
        .map(|tests| tests.iter().map(|t| t.name).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names = list_all();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), unique.len());
    }

    #[test]
    fn names_sit_in_their_category() {
        for category in CATEGORIES {
            for name in list_category(category) {
                let group = name.split('/').nth(2).unwrap_or_default();
                assert_eq!(group.to_ascii_lowercase(), *category, "{}", name);
            }
        }
    }

    #[test]
    fn unknown_names_fail() {
        let result = run("/TP/NOPE/CL/BV-01-C", &HarnessConfig::default());
        assert!(!result.passed);
        assert!(list_category("nope").is_empty());
    }
}

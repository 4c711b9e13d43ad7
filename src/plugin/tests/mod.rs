//! Plugin System Tests


#[cfg(test)]
pub mod report_tests;

//! Loop iteration suffixes on task reference names
//!
//! Tasks inside a loop are re-scheduled under `<reference>__<iteration>`, so
//! callers that know only the logical reference name have to strip the suffix
//! before comparing.

/// Separator between a reference name and its iteration number
pub const ITERATION_DELIMITER: &str = "__";

/// Remove every trailing `__<digits>` segment from a reference name
///
/// Nested loops stack suffixes, so `"poll__1__2"` strips to `"poll"`. A
/// non-numeric segment is part of the name and stays.
pub fn strip_iteration_suffix(reference_task_name: &str) -> &str {
    let mut name = reference_task_name;
    while let Some((base, suffix)) = name.rsplit_once(ITERATION_DELIMITER) {
        if base.is_empty() || suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            break;
        }
        name = base;
    }
    name
}

/// Reference name of the given iteration of a looped task
pub fn append_iteration(reference_task_name: &str, iteration: u32) -> String {
    format!("{reference_task_name}{ITERATION_DELIMITER}{iteration}")
}

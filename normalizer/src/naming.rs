//! Loose-file naming policy.
//!
//! The upstream system names loose uploads as delimiter-separated tokens:
//! `login_id_attempt_filename` for on-time submissions, with one extra numeric
//! token spliced in before the filename when the submission was late
//! (`login_id_attempt_7_filename`). The policy below reproduces that
//! convention exactly, including its known weakness: a filename whose token at
//! the marker position happens to be numeric is misread as a late marker. The
//! convention is externally imposed, so it is matched verbatim rather than
//! "fixed" here.

use util::config::NamingPolicy;

/// Returns the student identifier: the first delimiter-separated token.
///
/// A name with no delimiter is a single token, which is returned whole.
pub fn student_token<'a>(file_name: &'a str, policy: &NamingPolicy) -> &'a str {
    file_name
        .split(&policy.delimiter)
        .next()
        .unwrap_or(file_name)
}

/// Derives the real submitted filename from an upstream loose-file name.
///
/// If the token at `late_marker_index` parses as an integer it is a late
/// marker and the filename starts at the following token; otherwise the
/// filename starts at the marker position itself. Either way the remaining
/// tokens are rejoined with the delimiter.
///
/// The result is empty when the name has too few tokens; callers treat an
/// empty name as a submission-level conflict.
pub fn submitted_file_name(file_name: &str, policy: &NamingPolicy) -> String {
    let tokens: Vec<&str> = file_name.split(&policy.delimiter).collect();
    let idx = policy.late_marker_index;

    let start = match tokens.get(idx) {
        Some(token) if token.parse::<i64>().is_ok() => idx + 1,
        _ => idx,
    };

    if start >= tokens.len() {
        return String::new();
    }
    tokens[start..].join(&policy.delimiter)
}

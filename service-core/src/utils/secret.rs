use subtle::ConstantTimeEq;

/// Compare two secrets without leaking the position of the first mismatch.
///
/// Only the length is observable through timing.
pub fn constant_time_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();

    if provided.len() != expected.len() {
        return false;
    }

    provided.ct_eq(expected).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_secrets_match() {
        assert!(constant_time_eq("mysecret123", "mysecret123"));
    }

    #[test]
    fn different_secrets_do_not_match() {
        assert!(!constant_time_eq("mysecret124", "mysecret123"));
        assert!(!constant_time_eq("mysecret", "mysecret123"));
        assert!(!constant_time_eq("", "mysecret123"));
    }
}

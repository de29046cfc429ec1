//! Run identifiers for bulk jobs.
//!
//! Each embedding regeneration run gets its own ULID; log events and the run report carry it
//! so a batch can be traced end to end.

use ulid::Ulid;

/// Fresh ULID for one run.
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_returns_unique_values() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b);
        assert_eq!(a.len(), 26);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}

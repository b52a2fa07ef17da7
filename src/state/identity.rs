//! Caller identity comparison.
//!
//! Identities are address-shaped strings handed over by the sequencer after
//! signature recovery. Different clients checksum-case them differently, so
//! every ownership guard compares them through [`same_identity`].

/// Check if two identities refer to the same signer (case-insensitive).
pub fn same_identity(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

//! MD5 checksum utilities for content fingerprinting

/// Compute MD5 checksum of bytes
pub fn compute_md5(data: &[u8]) -> String {
    let digest = md5::compute(data);
    format!("{:x}", digest)
}

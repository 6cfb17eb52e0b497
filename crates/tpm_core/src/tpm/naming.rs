//! Joint naming convention.
//!
//! Skins do not reference bones directly. Each skin vertex stores a bone
//! ordinal, and the bone it refers to is the one named
//! `$J<skin name><two-digit ordinal>`.

use thiserror::Error;

/// Highest bone ordinal a joint name can encode.
pub const MAX_JOINT_INDEX: u32 = 99;

/// Joint ordinal outside `[0, MAX_JOINT_INDEX]`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Joint index {index} is out of range [0, {max}]", max = MAX_JOINT_INDEX)]
pub struct RangeError {
    pub index: u32,
}

/// Name of the bone that `index` refers to within the skin `parent`.
pub fn joint_name(parent: &str, index: u32) -> Result<String, RangeError> {
    if index > MAX_JOINT_INDEX {
        return Err(RangeError { index });
    }
    Ok(format!("$J{}{:02}", parent, index))
}

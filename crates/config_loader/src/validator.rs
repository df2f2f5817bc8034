//! Config validation
//!
//! Rules:
//! - every serial maps to a defined profile
//! - serials are non-empty
//! - profile `file` is non-empty
//! - order keys are unique per serial (total canonical order)

use std::collections::HashMap;

use contracts::{ContractError, RigConfig, Serial};

/// Validate a RigConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(rig: &RigConfig) -> Result<(), ContractError> {
    validate_serials(rig)?;
    validate_profile_files(rig)?;
    validate_order_keys(rig)?;
    Ok(())
}

fn validate_serials(rig: &RigConfig) -> Result<(), ContractError> {
    for (serial, profile) in &rig.serials {
        if serial.is_empty() {
            return Err(ContractError::config_validation(
                "serials",
                "serial cannot be empty",
            ));
        }
        if !rig.profiles.contains_key(profile) {
            return Err(ContractError::config_validation(
                format!("serials[{serial}]"),
                format!("profile '{profile}' is not defined"),
            ));
        }
    }
    Ok(())
}

fn validate_profile_files(rig: &RigConfig) -> Result<(), ContractError> {
    for (name, profile) in &rig.profiles {
        if profile.file.as_os_str().is_empty() {
            return Err(ContractError::config_validation(
                format!("profiles[{name}].file"),
                "device config file cannot be empty",
            ));
        }
    }
    Ok(())
}

/// Order keys are compared per serial, so two serials sharing one profile
/// collide as well.
fn validate_order_keys(rig: &RigConfig) -> Result<(), ContractError> {
    let mut seen: HashMap<i64, &Serial> = HashMap::new();

    for (serial, name) in &rig.serials {
        let Some(profile) = rig.profiles.get(name) else {
            continue;
        };
        if let Some(other) = seen.insert(profile.order, serial) {
            return Err(ContractError::config_validation(
                format!("profiles[{name}].order"),
                format!(
                    "duplicate order key {} (serials '{other}' and '{serial}')",
                    profile.order
                ),
            ));
        }
    }
    Ok(())
}

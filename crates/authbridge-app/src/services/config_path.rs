// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware host config file resolution.

use std::path::PathBuf;

/// Environment variable that overrides the host config location.
pub const CONFIG_ENV: &str = "AUTHBRIDGE_CONFIG";

/// Return the path of the host config file.
///
/// On mobile the host passes bundle values directly; on desktop they come
/// from a JSON file in the conventional config directory.
pub fn config_path() -> PathBuf {
    if let Ok(explicit) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(explicit);
    }
    config_dir_fallback().join("authbridge").join("host.json")
}

fn config_dir_fallback() -> PathBuf {
    // Try XDG config dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    // Last resort
    PathBuf::from(".")
}

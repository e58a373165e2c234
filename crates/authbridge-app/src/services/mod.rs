// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: owns the sign-in bridge for the lifetime of the process and
// exposes the two host entry points: method calls and opened URLs.

pub mod auth_services;
pub mod config_path;
pub mod verification;

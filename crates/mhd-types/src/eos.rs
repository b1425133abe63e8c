// ─────────────────────────────────────────────────────────────────────
// SCPN MHD Core — Equation of State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Gamma-law ideal gas.

/// Internal energy density ρe from pressure.
#[inline]
pub fn rhoe(gamma: f64, p: f64) -> f64 {
    p / (gamma - 1.0)
}

/// Total energy density of an ideal MHD cell:
/// `p/(γ−1) + ½(mx² + my²)/ρ + ½(Bx² + By²)`.
#[inline]
pub fn total_energy(gamma: f64, p: f64, dens: f64, xmom: f64, ymom: f64, bx: f64, by: f64) -> f64 {
    rhoe(gamma, p) + 0.5 * (xmom * xmom + ymom * ymom) / dens + 0.5 * (bx * bx + by * by)
}

// ─────────────────────────────────────────────────────────────────────
// SCPN MHD Core — Field Loop Advection
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Weak magnetic field loop advected by a uniform flow.
//!
//! Uniform density and pressure, constant velocity `(v0/√5, v0/√5)`, and a
//! circular field loop of radius `R` centered on the coordinate origin:
//!   B_x = -A0 · y / r
//!   B_y =  A0 · x / r      for r ≤ R, zero outside.
//!
//! The loop is nominally derived from the vector potential `A_z = A0·(R − r)`,
//! but the field written here is the tangential direction scaled by `A0`,
//! not the curl of `A_z`. Both cell centers and the staggered faces are
//! filled from the same closed form.

use log::{debug, info, log_enabled, Level};
use mhd_types::config::{LoopConfig, OriginPolicy, RuntimeParameters};
use mhd_types::eos;
use mhd_types::error::{MhdError, MhdResult};
use mhd_types::state::{CellCenterData2D, FaceAxis, FaceCenterData2D, Grid2D, Variable};
use ndarray::{Array2, ArrayView1, Zip};

/// Uniform background density.
const DENSITY: f64 = 1.0;

/// Uniform background pressure.
const PRESSURE: f64 = 1.0;

/// Cell-centered variables written by [`init_data`].
pub const CELL_VARIABLES: [Variable; 6] = Variable::ALL;

/// Velocity components of the background flow. Both are `v0/√5`.
pub fn advection_velocity(v0: f64) -> (f64, f64) {
    let s = 5.0_f64.sqrt();
    (v0 / s, v0 / s)
}

/// Loop field `(B_x, B_y)` at a single point.
#[inline]
pub fn loop_field(x: f64, y: f64, cfg: &LoopConfig) -> (f64, f64) {
    let r = (x * x + y * y).sqrt();
    if r > cfg.r {
        return (0.0, 0.0);
    }
    if r == 0.0 && cfg.origin == OriginPolicy::Zero {
        return (0.0, 0.0);
    }
    (-cfg.a0 * y / r, cfg.a0 * x / r)
}

/// Sample the component of the loop field normal to `axis` on the tensor
/// product `xs × ys`: `B_x` for [`FaceAxis::X`], `B_y` for [`FaceAxis::Y`].
/// The result has shape `[xs.len(), ys.len()]`.
pub fn sample_loop_field(
    xs: ArrayView1<f64>,
    ys: ArrayView1<f64>,
    axis: FaceAxis,
    cfg: &LoopConfig,
) -> Array2<f64> {
    Array2::from_shape_fn((xs.len(), ys.len()), |(i, j)| {
        let (bx, by) = loop_field(xs[i], ys[j], cfg);
        match axis {
            FaceAxis::X => bx,
            FaceAxis::Y => by,
        }
    })
}

/// Allocate a cell-centered set with every MHD variable and the two face
/// sets with their normal field component, all zero-filled.
pub fn allocate(
    grid: &Grid2D,
) -> MhdResult<(CellCenterData2D, FaceCenterData2D, FaceCenterData2D)> {
    let mut cc = CellCenterData2D::new(grid.clone());
    for var in CELL_VARIABLES {
        cc.register_var(var)?;
    }
    let mut fcx = FaceCenterData2D::new(grid.clone(), FaceAxis::X);
    fcx.register_var(Variable::XMagneticField)?;
    let mut fcy = FaceCenterData2D::new(grid.clone(), FaceAxis::Y);
    fcy.register_var(Variable::YMagneticField)?;
    Ok((cc, fcx, fcy))
}

fn check_face_set(
    cc: &CellCenterData2D,
    fc: &FaceCenterData2D,
    axis: FaceAxis,
    var: Variable,
) -> MhdResult<()> {
    if fc.axis != axis {
        return Err(MhdError::ConfigError(format!(
            "{axis}-face data must be staggered along {axis}, got {}",
            fc.axis
        )));
    }
    let expected = cc.grid.face_shape(axis);
    if fc.shape() != expected {
        return Err(MhdError::ShapeMismatch {
            name: format!("{axis}-face data"),
            expected,
            found: fc.shape(),
        });
    }
    fc.require(&[var])
}

/// Fill the cell-centered state and the face-centered field with the loop
/// advection initial condition.
///
/// All preconditions (registered variables, face staggering and shapes,
/// parameter validity) are checked before anything is written, so on error
/// the containers are left untouched.
pub fn init_data(
    cc: &mut CellCenterData2D,
    fcx: &mut FaceCenterData2D,
    fcy: &mut FaceCenterData2D,
    cfg: &LoopConfig,
) -> MhdResult<()> {
    info!("initializing the loop problem...");

    cc.require(&CELL_VARIABLES)?;
    check_face_set(cc, fcx, FaceAxis::X, Variable::XMagneticField)?;
    check_face_set(cc, fcy, FaceAxis::Y, Variable::YMagneticField)?;
    cfg.validate()?;

    let grid = &cc.grid;
    let shape = grid.shape();

    let dens = Array2::from_elem(shape, DENSITY);
    let (u, v) = advection_velocity(cfg.v0);
    let xmom = dens.mapv(|d| d * u);
    let ymom = dens.mapv(|d| d * v);

    // Cell centers
    let mut bx = Array2::<f64>::zeros(shape);
    let mut by = Array2::<f64>::zeros(shape);
    Zip::from(&mut bx)
        .and(&mut by)
        .and(&grid.x2d)
        .and(&grid.y2d)
        .for_each(|bx, by, &x, &y| {
            (*bx, *by) = loop_field(x, y, cfg);
        });

    // Faces: each normal component at its own face positions
    let x_faces = grid.x_faces();
    let y_faces = grid.y_faces();
    let bx_fc = sample_loop_field(x_faces.view(), grid.y.view(), FaceAxis::X, cfg);
    let by_fc = sample_loop_field(grid.x.view(), y_faces.view(), FaceAxis::Y, cfg);

    let mut ener = Array2::<f64>::zeros(shape);
    Zip::from(&mut ener)
        .and(&dens)
        .and(&xmom)
        .and(&ymom)
        .and(&bx)
        .and(&by)
        .for_each(|e, &rho, &mx, &my, &bx, &by| {
            *e = eos::total_energy(cfg.gamma, PRESSURE, rho, mx, my, bx, by);
        });

    if log_enabled!(Level::Debug) {
        let inside = grid
            .x2d
            .iter()
            .zip(grid.y2d.iter())
            .filter(|&(&x, &y)| (x * x + y * y).sqrt() <= cfg.r)
            .count();
        debug!(
            "loop: v=({u:.6}, {v:.6}), R={}, A0={}, {inside} of {} cells inside the loop",
            cfg.r,
            cfg.a0,
            shape.0 * shape.1
        );
    }

    cc.get_var_mut(Variable::Density)?.assign(&dens);
    cc.get_var_mut(Variable::XMomentum)?.assign(&xmom);
    cc.get_var_mut(Variable::YMomentum)?.assign(&ymom);
    cc.get_var_mut(Variable::XMagneticField)?.assign(&bx);
    cc.get_var_mut(Variable::YMagneticField)?.assign(&by);
    cc.get_var_mut(Variable::Energy)?.assign(&ener);
    fcx.get_var_mut(Variable::XMagneticField)?.assign(&bx_fc);
    fcy.get_var_mut(Variable::YMagneticField)?.assign(&by_fc);

    Ok(())
}

/// Resolve the loop parameters from a runtime table, then run [`init_data`].
pub fn init_from_params(
    cc: &mut CellCenterData2D,
    fcx: &mut FaceCenterData2D,
    fcy: &mut FaceCenterData2D,
    rp: &RuntimeParameters,
) -> MhdResult<()> {
    let cfg = LoopConfig::from_params(rp)?;
    init_data(cc, fcx, fcy, &cfg)
}

/// End-of-run hook.
pub fn finalize() {
    info!("");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn scenario_config(r: f64) -> LoopConfig {
        LoopConfig {
            gamma: 1.4,
            xmin: -1.0,
            xmax: 1.0,
            ymin: -1.0,
            ymax: 1.0,
            v0: 5.0_f64.sqrt(),
            r,
            a0: 0.001,
            origin: OriginPolicy::Propagate,
        }
    }

    fn scenario(cfg: &LoopConfig) -> (CellCenterData2D, FaceCenterData2D, FaceCenterData2D) {
        init_logging();
        let grid = Grid2D::new(4, 4, 0, cfg.xmin, cfg.xmax, cfg.ymin, cfg.ymax).unwrap();
        let (mut cc, mut fcx, mut fcy) = allocate(&grid).unwrap();
        init_data(&mut cc, &mut fcx, &mut fcy, cfg).unwrap();
        (cc, fcx, fcy)
    }

    #[test]
    fn test_velocity_uses_sqrt5() {
        let (u, v) = advection_velocity(1.0);
        assert!((u - 1.0 / 5.0_f64.sqrt()).abs() < 1e-15);
        assert_eq!(u, v);
        assert!((u - 1.0 / 2.0_f64.sqrt()).abs() > 0.1);
    }

    #[test]
    fn test_scenario_4x4_momentum_and_corners() {
        let cfg = scenario_config(0.3);
        let (cc, _, _) = scenario(&cfg);
        let dens = cc.get_var(Variable::Density).unwrap();
        let xmom = cc.get_var(Variable::XMomentum).unwrap();
        let ymom = cc.get_var(Variable::YMomentum).unwrap();
        let bx = cc.get_var(Variable::XMagneticField).unwrap();
        let by = cc.get_var(Variable::YMagneticField).unwrap();
        let ener = cc.get_var(Variable::Energy).unwrap();

        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(dens[[i, j]], 1.0);
                assert!((xmom[[i, j]] - dens[[i, j]]).abs() < 1e-14);
                assert!((ymom[[i, j]] - dens[[i, j]]).abs() < 1e-14);
            }
        }
        for (i, j) in [(0, 0), (0, 3), (3, 0), (3, 3)] {
            assert_eq!(bx[[i, j]], 0.0);
            assert_eq!(by[[i, j]], 0.0);
            assert!((ener[[i, j]] - 3.5).abs() < 1e-12);
        }
        // The nearest cell centers sit at r = √0.125 > 0.3
        assert!(bx.iter().chain(by.iter()).all(|&b| b == 0.0));
    }

    #[test]
    fn test_scenario_4x4_near_origin_cell() {
        let cfg = scenario_config(0.4);
        let (cc, _, _) = scenario(&cfg);
        let bx = cc.get_var(Variable::XMagneticField).unwrap();
        let by = cc.get_var(Variable::YMagneticField).unwrap();
        let grid = &cc.grid;
        for (i, j) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            let (x, y) = (grid.x[i], grid.y[j]);
            let r0 = (x * x + y * y).sqrt();
            assert!(r0 <= 0.4);
            assert!((bx[[i, j]] - (-0.001 * y / r0)).abs() < 1e-18);
            assert!((by[[i, j]] - (0.001 * x / r0)).abs() < 1e-18);
        }
        // Cell (1, 1) is at (-0.25, -0.25): field points along (+1, -1)/√2
        assert!(bx[[1, 1]] > 0.0 && by[[1, 1]] < 0.0);
        assert_eq!(bx[[0, 0]], 0.0);
    }

    #[test]
    fn test_scenario_4x4_face_fields() {
        let cfg = scenario_config(0.3);
        let (_, fcx, fcy) = scenario(&cfg);
        let bx_fc = fcx.get_var(Variable::XMagneticField).unwrap();
        let by_fc = fcy.get_var(Variable::YMagneticField).unwrap();
        assert_eq!(bx_fc.dim(), (5, 4));
        assert_eq!(by_fc.dim(), (4, 5));

        // x-face at x = 0, y = ±0.25 lies inside the loop
        assert!((bx_fc[[2, 2]] + 0.001).abs() < 1e-15);
        assert!((bx_fc[[2, 1]] - 0.001).abs() < 1e-15);
        // y-face at y = 0, x = ±0.25
        assert!((by_fc[[2, 2]] - 0.001).abs() < 1e-15);
        assert!((by_fc[[1, 2]] + 0.001).abs() < 1e-15);

        assert_eq!(bx_fc.iter().filter(|&&b| b != 0.0).count(), 2);
        assert_eq!(by_fc.iter().filter(|&&b| b != 0.0).count(), 2);
    }

    #[test]
    fn test_energy_inside_loop() {
        let cfg = scenario_config(0.4);
        let (cc, _, _) = scenario(&cfg);
        let ener = cc.get_var(Variable::Energy).unwrap();
        // p/(γ-1) + ½(1 + 1)/1 + ½·A0²
        let expected = 2.5 + 1.0 + 0.5 * 0.001 * 0.001;
        assert!((ener[[2, 2]] - expected).abs() < 1e-12);
        assert!((ener[[0, 0]] - 3.5).abs() < 1e-12);
    }

    fn origin_grid() -> Grid2D {
        // Three cells per axis over [-1.5, 1.5]: the middle cell is centered on (0, 0)
        Grid2D::new(3, 3, 0, -1.5, 1.5, -1.5, 1.5).unwrap()
    }

    #[test]
    fn test_origin_cell_propagates_nan() {
        init_logging();
        let grid = origin_grid();
        assert_eq!((grid.x[1], grid.y[1]), (0.0, 0.0));
        let (mut cc, mut fcx, mut fcy) = allocate(&grid).unwrap();
        let cfg = LoopConfig {
            r: 1.2,
            ..LoopConfig::default()
        };
        init_data(&mut cc, &mut fcx, &mut fcy, &cfg).unwrap();

        let bx = cc.get_var(Variable::XMagneticField).unwrap();
        let by = cc.get_var(Variable::YMagneticField).unwrap();
        let ener = cc.get_var(Variable::Energy).unwrap();
        assert!(bx[[1, 1]].is_nan());
        assert!(by[[1, 1]].is_nan());
        assert!(ener[[1, 1]].is_nan());
        // Only the origin cell is affected
        let non_finite = bx.iter().filter(|b| !b.is_finite()).count();
        assert_eq!(non_finite, 1);
        assert!(fcx
            .get_var(Variable::XMagneticField)
            .unwrap()
            .iter()
            .all(|b| b.is_finite()));
    }

    #[test]
    fn test_origin_cell_zero_policy() {
        init_logging();
        let grid = origin_grid();
        let (mut cc, mut fcx, mut fcy) = allocate(&grid).unwrap();
        let cfg = LoopConfig {
            r: 1.2,
            origin: OriginPolicy::Zero,
            ..LoopConfig::default()
        };
        init_data(&mut cc, &mut fcx, &mut fcy, &cfg).unwrap();

        let bx = cc.get_var(Variable::XMagneticField).unwrap();
        let by = cc.get_var(Variable::YMagneticField).unwrap();
        assert_eq!(bx[[1, 1]], 0.0);
        assert_eq!(by[[1, 1]], 0.0);
        // Neighbours at r = 1 keep the tangential field
        assert!((by[[2, 1]] - cfg.a0).abs() < 1e-15);
        assert!((bx[[1, 2]] + cfg.a0).abs() < 1e-15);
        assert!(cc
            .get_var(Variable::Energy)
            .unwrap()
            .iter()
            .all(|e| e.is_finite()));
    }

    #[test]
    fn test_missing_variable_leaves_state_untouched() {
        init_logging();
        let grid = Grid2D::new(8, 8, 2, -1.0, 1.0, -1.0, 1.0).unwrap();
        let mut cc = CellCenterData2D::new(grid.clone());
        for var in [
            Variable::Density,
            Variable::XMomentum,
            Variable::YMomentum,
            Variable::XMagneticField,
            Variable::YMagneticField,
        ] {
            cc.register_var(var).unwrap();
        }
        let (_, mut fcx, mut fcy) = allocate(&grid).unwrap();

        let err = init_data(&mut cc, &mut fcx, &mut fcy, &LoopConfig::default()).unwrap_err();
        assert!(matches!(err, MhdError::MissingVariable("energy")));
        assert!(cc
            .get_var(Variable::Density)
            .unwrap()
            .iter()
            .all(|&d| d == 0.0));
    }

    #[test]
    fn test_missing_face_variable() {
        let grid = Grid2D::new(8, 8, 2, -1.0, 1.0, -1.0, 1.0).unwrap();
        let (mut cc, mut fcx, _) = allocate(&grid).unwrap();
        let mut fcy = FaceCenterData2D::new(grid, FaceAxis::Y);
        let err = init_data(&mut cc, &mut fcx, &mut fcy, &LoopConfig::default()).unwrap_err();
        assert!(matches!(err, MhdError::MissingVariable("y-magnetic-field")));
    }

    #[test]
    fn test_swapped_face_sets_rejected() {
        let grid = Grid2D::new(8, 8, 2, -1.0, 1.0, -1.0, 1.0).unwrap();
        let (mut cc, mut fcx, mut fcy) = allocate(&grid).unwrap();
        let err = init_data(&mut cc, &mut fcy, &mut fcx, &LoopConfig::default()).unwrap_err();
        assert!(matches!(err, MhdError::ConfigError(_)));
    }

    #[test]
    fn test_face_set_on_other_grid_rejected() {
        let grid = Grid2D::new(8, 8, 2, -1.0, 1.0, -1.0, 1.0).unwrap();
        let other = Grid2D::new(16, 8, 2, -1.0, 1.0, -1.0, 1.0).unwrap();
        let (mut cc, _, mut fcy) = allocate(&grid).unwrap();
        let (_, mut fcx, _) = allocate(&other).unwrap();
        let err = init_data(&mut cc, &mut fcx, &mut fcy, &LoopConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            MhdError::ShapeMismatch {
                expected: (13, 12),
                found: (21, 12),
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let grid = Grid2D::new(4, 4, 0, -1.0, 1.0, -1.0, 1.0).unwrap();
        let (mut cc, mut fcx, mut fcy) = allocate(&grid).unwrap();
        let cfg = LoopConfig {
            gamma: 0.5,
            ..LoopConfig::default()
        };
        assert!(init_data(&mut cc, &mut fcx, &mut fcy, &cfg).is_err());
        assert_eq!(cc.max(Variable::Density).unwrap(), 0.0);
    }

    #[test]
    fn test_overwrites_previous_contents() {
        init_logging();
        let grid = Grid2D::new(16, 16, 2, -1.0, 1.0, -1.0, 1.0).unwrap();
        let (mut cc, mut fcx, mut fcy) = allocate(&grid).unwrap();
        for var in CELL_VARIABLES {
            cc.get_var_mut(var).unwrap().fill(7.0);
        }
        fcx.get_var_mut(Variable::XMagneticField).unwrap().fill(7.0);
        fcy.get_var_mut(Variable::YMagneticField).unwrap().fill(7.0);

        init_data(&mut cc, &mut fcx, &mut fcy, &LoopConfig::default()).unwrap();

        assert_eq!(cc.max(Variable::Density).unwrap(), 1.0);
        assert!(cc.max(Variable::XMagneticField).unwrap() <= 1e-3 * (1.0 + 1e-12));
        assert_eq!(fcx.get_var(Variable::XMagneticField).unwrap()[[0, 0]], 0.0);
        assert_eq!(fcy.get_var(Variable::YMagneticField).unwrap()[[0, 0]], 0.0);
    }

    #[test]
    fn test_deterministic() {
        let grid = Grid2D::new(24, 16, 2, -1.0, 1.0, -0.5, 0.5).unwrap();
        let cfg = LoopConfig::default();
        let (mut cc1, mut fcx1, mut fcy1) = allocate(&grid).unwrap();
        let (mut cc2, mut fcx2, mut fcy2) = allocate(&grid).unwrap();
        init_data(&mut cc1, &mut fcx1, &mut fcy1, &cfg).unwrap();
        init_data(&mut cc2, &mut fcx2, &mut fcy2, &cfg).unwrap();
        for var in CELL_VARIABLES {
            assert_eq!(cc1.get_var(var).unwrap(), cc2.get_var(var).unwrap());
        }
        assert_eq!(
            fcx1.get_var(Variable::XMagneticField).unwrap(),
            fcx2.get_var(Variable::XMagneticField).unwrap()
        );
        assert_eq!(
            fcy1.get_var(Variable::YMagneticField).unwrap(),
            fcy2.get_var(Variable::YMagneticField).unwrap()
        );
    }

    #[test]
    fn test_init_from_params() {
        init_logging();
        let grid = Grid2D::new(32, 32, 2, -1.0, 1.0, -1.0, 1.0).unwrap();
        let (mut cc, mut fcx, mut fcy) = allocate(&grid).unwrap();
        let rp = scenario_config(0.3).to_params();
        init_from_params(&mut cc, &mut fcx, &mut fcy, &rp).unwrap();
        assert!((cc.max(Variable::XMomentum).unwrap() - 1.0).abs() < 1e-14);

        let (mut cc, mut fcx, mut fcy) = allocate(&grid).unwrap();
        let mut partial = RuntimeParameters::new();
        for (k, v) in rp.iter().filter(|(k, _)| *k != "eos.gamma") {
            partial.set_param(k, v);
        }
        let err = init_from_params(&mut cc, &mut fcx, &mut fcy, &partial).unwrap_err();
        assert!(matches!(err, MhdError::MissingParameter(ref k) if k == "eos.gamma"));
    }

    #[test]
    fn test_sample_loop_field_picks_normal_component() {
        let cfg = LoopConfig::default();
        let xs = ndarray::Array1::linspace(-0.5, 0.5, 7);
        let ys = ndarray::Array1::linspace(-0.5, 0.5, 5);
        let bx = sample_loop_field(xs.view(), ys.view(), FaceAxis::X, &cfg);
        let by = sample_loop_field(xs.view(), ys.view(), FaceAxis::Y, &cfg);
        assert_eq!(bx.dim(), (7, 5));
        assert_eq!(by.dim(), (7, 5));
        for i in 0..7 {
            for j in 0..5 {
                let (bx0, by0) = loop_field(xs[i], ys[j], &cfg);
                assert_eq!(bx[[i, j]].to_bits(), bx0.to_bits());
                assert_eq!(by[[i, j]].to_bits(), by0.to_bits());
            }
        }
        // (xs[3], ys[1]) ≈ (0, -0.25): purely along +x
        assert!((bx[[3, 1]] - cfg.a0).abs() < 1e-15);
        assert!(by[[3, 1]].abs() < 1e-15);
    }

    #[test]
    fn test_debug_summary_with_logging_enabled() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
        let cfg = scenario_config(0.4);
        let (cc, _, _) = scenario(&cfg);
        assert_eq!(cc.max(Variable::Density).unwrap(), 1.0);
    }

    #[test]
    fn test_finalize_is_noop() {
        init_logging();
        finalize();
    }
}

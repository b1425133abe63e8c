// ─────────────────────────────────────────────────────────────────────
// SCPN MHD Core — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ndarray::{s, Array1, Array2, ArrayView2, ArrayViewMut2};

use crate::error::{MhdError, MhdResult};

/// 2D structured finite-volume grid with ghost cells and precomputed coordinates.
///
/// Arrays are indexed `[i, j]` with `i` along x, so every cell-centered array
/// has shape `(qx, qy)` where `qx = nx + 2·ng` and `qy = ny + 2·ng`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2D {
    pub nx: usize,
    pub ny: usize,
    pub ng: usize,
    pub qx: usize,
    pub qy: usize,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub dx: f64,
    pub dy: f64,
    /// First and last interior index along x.
    pub ilo: usize,
    pub ihi: usize,
    /// First and last interior index along y.
    pub jlo: usize,
    pub jhi: usize,
    pub xl: Array1<f64>, // left edges [qx]
    pub xr: Array1<f64>, // right edges [qx]
    pub x: Array1<f64>,  // centers [qx]
    pub yl: Array1<f64>, // lower edges [qy]
    pub yr: Array1<f64>, // upper edges [qy]
    pub y: Array1<f64>,  // centers [qy]
    pub x2d: Array2<f64>, // meshgrid x [qx, qy]
    pub y2d: Array2<f64>, // meshgrid y [qx, qy]
}

impl Grid2D {
    /// Create a grid of `nx × ny` interior cells over `[xmin, xmax] × [ymin, ymax]`,
    /// padded with `ng` ghost cells on every side.
    pub fn new(
        nx: usize,
        ny: usize,
        ng: usize,
        xmin: f64,
        xmax: f64,
        ymin: f64,
        ymax: f64,
    ) -> MhdResult<Self> {
        if nx == 0 || ny == 0 {
            return Err(MhdError::InvalidGrid(format!(
                "grid needs at least one interior cell per axis, got {nx}×{ny}"
            )));
        }
        if ![xmin, xmax, ymin, ymax].iter().all(|v| v.is_finite()) {
            return Err(MhdError::InvalidGrid(
                "domain extents must be finite".to_string(),
            ));
        }
        if xmax <= xmin || ymax <= ymin {
            return Err(MhdError::InvalidGrid(format!(
                "empty domain [{xmin}, {xmax}] × [{ymin}, {ymax}]"
            )));
        }

        let qx = nx + 2 * ng;
        let qy = ny + 2 * ng;
        let dx = (xmax - xmin) / nx as f64;
        let dy = (ymax - ymin) / ny as f64;

        // Both edges of a cell come from the same expression so that
        // xr[i] and xl[i + 1] are bitwise identical.
        let x_edge = |k: usize| xmin + (k as f64 - ng as f64) * dx;
        let y_edge = |k: usize| ymin + (k as f64 - ng as f64) * dy;

        let xl = Array1::from_shape_fn(qx, x_edge);
        let xr = Array1::from_shape_fn(qx, |i| x_edge(i + 1));
        let x = Array1::from_shape_fn(qx, |i| 0.5 * (xl[i] + xr[i]));

        let yl = Array1::from_shape_fn(qy, y_edge);
        let yr = Array1::from_shape_fn(qy, |j| y_edge(j + 1));
        let y = Array1::from_shape_fn(qy, |j| 0.5 * (yl[j] + yr[j]));

        let x2d = Array2::from_shape_fn((qx, qy), |(i, _)| x[i]);
        let y2d = Array2::from_shape_fn((qx, qy), |(_, j)| y[j]);

        Ok(Grid2D {
            nx,
            ny,
            ng,
            qx,
            qy,
            xmin,
            xmax,
            ymin,
            ymax,
            dx,
            dy,
            ilo: ng,
            ihi: ng + nx - 1,
            jlo: ng,
            jhi: ng + ny - 1,
            xl,
            xr,
            x,
            yl,
            yr,
            y,
            x2d,
            y2d,
        })
    }

    /// Shape of a cell-centered array.
    pub fn shape(&self) -> (usize, usize) {
        (self.qx, self.qy)
    }

    /// Shape of a face-centered array staggered along `axis`.
    pub fn face_shape(&self, axis: FaceAxis) -> (usize, usize) {
        match axis {
            FaceAxis::X => (self.qx + 1, self.qy),
            FaceAxis::Y => (self.qx, self.qy + 1),
        }
    }

    /// x-coordinates of the x-faces: every left edge followed by the last right edge.
    pub fn x_faces(&self) -> Array1<f64> {
        faces(&self.xl, &self.xr)
    }

    /// y-coordinates of the y-faces: every lower edge followed by the last upper edge.
    pub fn y_faces(&self) -> Array1<f64> {
        faces(&self.yl, &self.yr)
    }
}

fn faces(left: &Array1<f64>, right: &Array1<f64>) -> Array1<f64> {
    let n = left.len();
    Array1::from_shape_fn(n + 1, |i| if i < n { left[i] } else { right[n - 1] })
}

/// Axis along which a face-centered set is staggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceAxis {
    X,
    Y,
}

impl fmt::Display for FaceAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceAxis::X => f.write_str("x"),
            FaceAxis::Y => f.write_str("y"),
        }
    }
}

/// Named variables of the ideal MHD state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variable {
    Density,
    XMomentum,
    YMomentum,
    Energy,
    XMagneticField,
    YMagneticField,
}

impl Variable {
    pub const ALL: [Variable; 6] = [
        Variable::Density,
        Variable::XMomentum,
        Variable::YMomentum,
        Variable::Energy,
        Variable::XMagneticField,
        Variable::YMagneticField,
    ];

    /// Canonical name used by inputs files and output snapshots.
    pub const fn name(self) -> &'static str {
        match self {
            Variable::Density => "density",
            Variable::XMomentum => "x-momentum",
            Variable::YMomentum => "y-momentum",
            Variable::Energy => "energy",
            Variable::XMagneticField => "x-magnetic-field",
            Variable::YMagneticField => "y-magnetic-field",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variable {
    type Err = MhdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variable::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| MhdError::UnknownVariable(s.to_string()))
    }
}

/// Named arrays sharing one shape.
#[derive(Debug, Clone)]
struct FieldSet {
    shape: (usize, usize),
    vars: BTreeMap<Variable, Array2<f64>>,
}

impl FieldSet {
    fn new(shape: (usize, usize)) -> Self {
        FieldSet {
            shape,
            vars: BTreeMap::new(),
        }
    }

    fn register(&mut self, var: Variable) -> MhdResult<()> {
        if self.vars.contains_key(&var) {
            return Err(MhdError::DuplicateVariable(var.name()));
        }
        self.vars.insert(var, Array2::zeros(self.shape));
        Ok(())
    }

    fn insert(&mut self, var: Variable, data: Array2<f64>) -> MhdResult<()> {
        if data.dim() != self.shape {
            return Err(MhdError::ShapeMismatch {
                name: var.name().to_string(),
                expected: self.shape,
                found: data.dim(),
            });
        }
        self.vars.insert(var, data);
        Ok(())
    }

    fn get(&self, var: Variable) -> MhdResult<ArrayView2<'_, f64>> {
        self.vars
            .get(&var)
            .map(|a| a.view())
            .ok_or(MhdError::MissingVariable(var.name()))
    }

    fn get_mut(&mut self, var: Variable) -> MhdResult<ArrayViewMut2<'_, f64>> {
        self.vars
            .get_mut(&var)
            .map(|a| a.view_mut())
            .ok_or(MhdError::MissingVariable(var.name()))
    }

    fn require(&self, vars: &[Variable]) -> MhdResult<()> {
        match vars.iter().find(|v| !self.vars.contains_key(*v)) {
            Some(v) => Err(MhdError::MissingVariable(v.name())),
            None => Ok(()),
        }
    }
}

/// Cell-centered data: one `(qx, qy)` array per registered variable.
///
/// Accessors hand out views, so callers can overwrite values in place but
/// never reshape or reallocate the storage.
#[derive(Debug, Clone)]
pub struct CellCenterData2D {
    pub grid: Grid2D,
    fields: FieldSet,
}

impl CellCenterData2D {
    pub fn new(grid: Grid2D) -> Self {
        let fields = FieldSet::new(grid.shape());
        CellCenterData2D { grid, fields }
    }

    /// Register a zero-filled variable.
    pub fn register_var(&mut self, var: Variable) -> MhdResult<()> {
        self.fields.register(var)
    }

    /// Store an existing array, replacing any previous one for `var`.
    pub fn insert_var(&mut self, var: Variable, data: Array2<f64>) -> MhdResult<()> {
        self.fields.insert(var, data)
    }

    pub fn has_var(&self, var: Variable) -> bool {
        self.fields.vars.contains_key(&var)
    }

    /// Registered variables in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.fields.vars.keys().copied()
    }

    pub fn get_var(&self, var: Variable) -> MhdResult<ArrayView2<'_, f64>> {
        self.fields.get(var)
    }

    pub fn get_var_mut(&mut self, var: Variable) -> MhdResult<ArrayViewMut2<'_, f64>> {
        self.fields.get_mut(var)
    }

    pub fn get_var_by_name(&self, name: &str) -> MhdResult<ArrayView2<'_, f64>> {
        self.fields.get(name.parse()?)
    }

    /// View of the interior (non-ghost) cells of `var`.
    pub fn get_var_interior(&self, var: Variable) -> MhdResult<ArrayView2<'_, f64>> {
        let g = &self.grid;
        let (ilo, ihi, jlo, jhi) = (g.ilo, g.ihi, g.jlo, g.jhi);
        Ok(self.fields.get(var)?.slice_move(s![ilo..=ihi, jlo..=jhi]))
    }

    /// Fails with the first of `vars` that is not registered.
    pub fn require(&self, vars: &[Variable]) -> MhdResult<()> {
        self.fields.require(vars)
    }

    /// Smallest value of `var`, ignoring NaN.
    pub fn min(&self, var: Variable) -> MhdResult<f64> {
        Ok(self.fields.get(var)?.fold(f64::INFINITY, |a, &b| a.min(b)))
    }

    /// Largest value of `var`, ignoring NaN.
    pub fn max(&self, var: Variable) -> MhdResult<f64> {
        Ok(self.fields.get(var)?.fold(f64::NEG_INFINITY, |a, &b| a.max(b)))
    }
}

/// Face-centered data staggered along one axis.
///
/// An x-face set stores `(qx + 1, qy)` arrays, a y-face set `(qx, qy + 1)`.
/// Face `i` on the staggered axis sits at the left edge of cell `i`, and the
/// trailing face at the right edge of the last cell.
#[derive(Debug, Clone)]
pub struct FaceCenterData2D {
    pub grid: Grid2D,
    pub axis: FaceAxis,
    fields: FieldSet,
}

impl FaceCenterData2D {
    pub fn new(grid: Grid2D, axis: FaceAxis) -> Self {
        let fields = FieldSet::new(grid.face_shape(axis));
        FaceCenterData2D { grid, axis, fields }
    }

    pub fn register_var(&mut self, var: Variable) -> MhdResult<()> {
        self.fields.register(var)
    }

    pub fn insert_var(&mut self, var: Variable, data: Array2<f64>) -> MhdResult<()> {
        self.fields.insert(var, data)
    }

    pub fn has_var(&self, var: Variable) -> bool {
        self.fields.vars.contains_key(&var)
    }

    pub fn shape(&self) -> (usize, usize) {
        self.fields.shape
    }

    pub fn get_var(&self, var: Variable) -> MhdResult<ArrayView2<'_, f64>> {
        self.fields.get(var)
    }

    pub fn get_var_mut(&mut self, var: Variable) -> MhdResult<ArrayViewMut2<'_, f64>> {
        self.fields.get_mut(var)
    }

    pub fn get_var_by_name(&self, name: &str) -> MhdResult<ArrayView2<'_, f64>> {
        self.fields.get(name.parse()?)
    }

    pub fn require(&self, vars: &[Variable]) -> MhdResult<()> {
        self.fields.require(vars)
    }
}

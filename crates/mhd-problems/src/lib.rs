//! Initial-condition builders for the 2D ideal MHD test problems.
//!
//! Each problem module exposes `init_data` (fills the cell- and
//! face-centered containers once, before time stepping) and `finalize`.

pub mod loop_problem;

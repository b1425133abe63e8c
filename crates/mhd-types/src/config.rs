// ─────────────────────────────────────────────────────────────────────
// SCPN MHD Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MhdError, MhdResult};

/// Flat table of runtime parameters keyed by dotted name (`section.key`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeParameters {
    params: BTreeMap<String, f64>,
}

impl RuntimeParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON object of sections, e.g. `{"eos": {"gamma": 1.4}}`.
    /// Nested objects are flattened into dotted keys.
    pub fn from_json_str(contents: &str) -> MhdResult<Self> {
        let value: Value = serde_json::from_str(contents)?;
        let Value::Object(root) = value else {
            return Err(MhdError::ConfigError(
                "runtime parameters must be a JSON object".to_string(),
            ));
        };
        let mut rp = Self::new();
        for (key, v) in &root {
            rp.flatten_json(key, v)?;
        }
        Ok(rp)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> MhdResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    fn flatten_json(&mut self, prefix: &str, value: &Value) -> MhdResult<()> {
        match value {
            Value::Object(map) => {
                for (key, v) in map {
                    self.flatten_json(&format!("{prefix}.{key}"), v)?;
                }
                Ok(())
            }
            Value::Number(n) => {
                let x = n.as_f64().ok_or_else(|| {
                    MhdError::ConfigError(format!("parameter '{prefix}' is not representable as f64"))
                })?;
                self.set_loaded(prefix, x)
            }
            other => Err(MhdError::ConfigError(format!(
                "parameter '{prefix}' must be numeric, got {other}"
            ))),
        }
    }

    /// Parse a TOML inputs file of numeric sections:
    ///
    /// ```text
    /// [eos]
    /// gamma = 1.4   # adiabatic index
    /// ```
    pub fn from_inputs_str(contents: &str) -> MhdResult<Self> {
        let sections: BTreeMap<String, BTreeMap<String, f64>> = toml::from_str(contents)?;
        let mut rp = Self::new();
        for (section, entries) in &sections {
            for (key, &value) in entries {
                rp.set_loaded(&format!("{section}.{key}"), value)?;
            }
        }
        Ok(rp)
    }

    /// Store a value read from a file. Every dotted segment must be
    /// non-empty and the value finite.
    fn set_loaded(&mut self, name: &str, value: f64) -> MhdResult<()> {
        if name.split('.').any(|seg| seg.trim().is_empty()) {
            return Err(MhdError::ConfigError(format!(
                "parameter name '{name}' has an empty section or key"
            )));
        }
        if !value.is_finite() {
            return Err(MhdError::ConfigError(format!(
                "parameter '{name}' must be finite, got {value}"
            )));
        }
        self.set_param(name, value);
        Ok(())
    }

    pub fn from_inputs_file(path: impl AsRef<Path>) -> MhdResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_inputs_str(&contents)
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: f64) {
        self.params.insert(name.into(), value);
    }

    pub fn get_param(&self, name: &str) -> MhdResult<f64> {
        self.params
            .get(name)
            .copied()
            .ok_or_else(|| MhdError::MissingParameter(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Overlay `other` on top of `self`; entries in `other` win.
    pub fn merge(&mut self, other: &RuntimeParameters) {
        for (k, v) in &other.params {
            self.params.insert(k.clone(), *v);
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.params.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Treatment of the cell sitting exactly on the loop center, where the
/// tangential field `(−y/r, x/r)` is `0/0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginPolicy {
    /// Keep IEEE semantics: the field (and energy) at that cell is NaN.
    #[default]
    Propagate,
    /// Write a zero field at that cell.
    Zero,
}

/// Parameters of the weak magnetic field loop advection problem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Adiabatic index γ.
    pub gamma: f64,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    /// Advection speed; each velocity component is `v0/√5`.
    pub v0: f64,
    /// Loop radius R.
    pub r: f64,
    /// Field amplitude A0.
    pub a0: f64,
    #[serde(default)]
    pub origin: OriginPolicy,
}

impl LoopConfig {
    pub const KEY_GAMMA: &'static str = "eos.gamma";
    pub const KEY_XMIN: &'static str = "mesh.xmin";
    pub const KEY_XMAX: &'static str = "mesh.xmax";
    pub const KEY_YMIN: &'static str = "mesh.ymin";
    pub const KEY_YMAX: &'static str = "mesh.ymax";
    pub const KEY_V0: &'static str = "loop.v0";
    pub const KEY_R: &'static str = "loop.r";
    pub const KEY_A0: &'static str = "loop.a0";

    pub const REQUIRED_KEYS: [&'static str; 8] = [
        Self::KEY_GAMMA,
        Self::KEY_XMIN,
        Self::KEY_XMAX,
        Self::KEY_YMIN,
        Self::KEY_YMAX,
        Self::KEY_V0,
        Self::KEY_R,
        Self::KEY_A0,
    ];

    /// Resolve every required key from a runtime table. A missing key is an
    /// error; nothing is defaulted.
    pub fn from_params(rp: &RuntimeParameters) -> MhdResult<Self> {
        let cfg = LoopConfig {
            gamma: rp.get_param(Self::KEY_GAMMA)?,
            xmin: rp.get_param(Self::KEY_XMIN)?,
            xmax: rp.get_param(Self::KEY_XMAX)?,
            ymin: rp.get_param(Self::KEY_YMIN)?,
            ymax: rp.get_param(Self::KEY_YMAX)?,
            v0: rp.get_param(Self::KEY_V0)?,
            r: rp.get_param(Self::KEY_R)?,
            a0: rp.get_param(Self::KEY_A0)?,
            origin: OriginPolicy::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Inverse of [`LoopConfig::from_params`].
    pub fn to_params(&self) -> RuntimeParameters {
        let mut rp = RuntimeParameters::new();
        rp.set_param(Self::KEY_GAMMA, self.gamma);
        rp.set_param(Self::KEY_XMIN, self.xmin);
        rp.set_param(Self::KEY_XMAX, self.xmax);
        rp.set_param(Self::KEY_YMIN, self.ymin);
        rp.set_param(Self::KEY_YMAX, self.ymax);
        rp.set_param(Self::KEY_V0, self.v0);
        rp.set_param(Self::KEY_R, self.r);
        rp.set_param(Self::KEY_A0, self.a0);
        rp
    }

    /// Load from a JSON file with the field names of this struct.
    pub fn from_file(path: impl AsRef<Path>) -> MhdResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MhdResult<()> {
        let values = [
            ("gamma", self.gamma),
            ("xmin", self.xmin),
            ("xmax", self.xmax),
            ("ymin", self.ymin),
            ("ymax", self.ymax),
            ("v0", self.v0),
            ("r", self.r),
            ("a0", self.a0),
        ];
        if let Some((name, v)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(MhdError::ConfigError(format!(
                "loop parameter '{name}' must be finite, got {v}"
            )));
        }
        if self.gamma <= 1.0 {
            return Err(MhdError::ConfigError(format!(
                "eos.gamma must be > 1, got {}",
                self.gamma
            )));
        }
        if self.r < 0.0 {
            return Err(MhdError::ConfigError(format!(
                "loop.r must be >= 0, got {}",
                self.r
            )));
        }
        Ok(())
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig {
            gamma: 1.4,
            xmin: -1.0,
            xmax: 1.0,
            ymin: -1.0,
            ymax: 1.0,
            v0: 1.0,
            r: 0.3,
            a0: 1.0e-3,
            origin: OriginPolicy::Propagate,
        }
    }
}

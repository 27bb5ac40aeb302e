use std::str::FromStr;

use serde::Deserialize;

use super::TestbenchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Dc,
    Pulse,
}

impl FromStr for SourceKind {
    type Err = TestbenchError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "dc" => Ok(SourceKind::Dc),
            "pulse" => Ok(SourceKind::Pulse),
            _ => Err(TestbenchError::UnknownSourceKind(tag.to_string())),
        }
    }
}

/// Pulse timing, all in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PulseShape {
    pub rise: f64,
    pub fall: f64,
    pub delay: f64,
    pub width: f64,
    #[serde(default)]
    pub period: Option<f64>,
}

/// A voltage source driving one node against ground. Its position in the
/// source list gives its instance name (`V0`, `V1`, ...).
#[derive(Debug, Clone, PartialEq)]
pub enum VoltageSource {
    Dc {
        node: String,
        value: f64,
    },
    Pulse {
        node: String,
        val0: f64,
        val1: f64,
        rise: f64,
        fall: f64,
        delay: f64,
        width: f64,
        period: Option<f64>,
    },
}

impl VoltageSource {
    pub fn dc(node: &str, value: f64) -> Self {
        VoltageSource::Dc {
            node: node.to_owned(),
            value,
        }
    }

    /// DC source at `v_high` for a logic 1 and `v_low` for a logic 0.
    pub fn constant(node: &str, v_high: f64, v_low: f64, level: bool) -> Self {
        Self::dc(node, if level { v_high } else { v_low })
    }

    pub fn pulse(node: &str, val0: f64, val1: f64, shape: PulseShape) -> Self {
        VoltageSource::Pulse {
            node: node.to_owned(),
            val0,
            val1,
            rise: shape.rise,
            fall: shape.fall,
            delay: shape.delay,
            width: shape.width,
            period: shape.period,
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            VoltageSource::Dc { .. } => SourceKind::Dc,
            VoltageSource::Pulse { .. } => SourceKind::Pulse,
        }
    }

    pub fn node(&self) -> &str {
        match self {
            VoltageSource::Dc { node, .. } | VoltageSource::Pulse { node, .. } => node,
        }
    }
}

/// A source as written in a configuration file, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceSpec {
    pub kind: String,
    pub node: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub val0: Option<f64>,
    #[serde(default)]
    pub val1: Option<f64>,
    #[serde(default)]
    pub shape: Option<PulseShape>,
}

impl TryFrom<&SourceSpec> for VoltageSource {
    type Error = TestbenchError;

    fn try_from(spec: &SourceSpec) -> Result<Self, Self::Error> {
        let missing = |field: &str| TestbenchError::InvalidSource {
            node: spec.node.clone(),
            reason: format!("{} source needs `{field}`", spec.kind),
        };

        match spec.kind.parse::<SourceKind>()? {
            SourceKind::Dc => Ok(VoltageSource::dc(
                &spec.node,
                spec.value.ok_or_else(|| missing("value"))?,
            )),
            SourceKind::Pulse => Ok(VoltageSource::pulse(
                &spec.node,
                spec.val0.ok_or_else(|| missing("val0"))?,
                spec.val1.ok_or_else(|| missing("val1"))?,
                spec.shape.ok_or_else(|| missing("shape"))?,
            )),
        }
    }
}

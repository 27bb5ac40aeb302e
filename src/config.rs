//! Run settings, read from an optional TOML file. Every field has a default,
//! so an empty file (or none at all) reproduces the stock XT018 setup.

use std::fs;

use color_eyre::{eyre::WrapErr, Result};
use serde::Deserialize;

use crate::netlist::{PulseShape, SourceSpec, TestbenchError, VoltageSource};

const PDK_MODELS: &str = "/mnt/data/pdk/XKIT/xt018/cadence/v10_0/spectre/v10_0_4/lp5mos";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Logic-high level and supply voltage, volts.
    pub supply_voltage: f64,
    /// Logic-low level, volts.
    pub ground_voltage: f64,
    pub temperature: f64,
    /// Transient analysis stop time, seconds.
    pub tran_stop: f64,
    /// Scale of liberty capacitance values (pF).
    pub capacitance_unit: f64,
    /// Scale of liberty time values (ns).
    pub time_unit: f64,
    /// Output pin of combinational cells.
    pub output_pin: String,
    pub simulator: SimulatorConfig,
    pub combinational: CombinationalConfig,
    pub sequential: SequentialConfig,
    pub analysis: AnalysisConfig,
    /// Additional sources appended to every testbench.
    pub extra_sources: Vec<SourceSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            supply_voltage: 1.8,
            ground_voltage: 0.0,
            temperature: 27.0,
            tran_stop: 12e-9,
            capacitance_unit: 1e-12,
            time_unit: 1e-9,
            output_pin: String::from("Q"),
            simulator: SimulatorConfig::default(),
            combinational: CombinationalConfig::default(),
            sequential: SequentialConfig::default(),
            analysis: AnalysisConfig::default(),
            extra_sources: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(file_path: Option<&str>) -> Result<Config> {
        let Some(file_path) = file_path else {
            return Ok(Config::default());
        };

        let text = fs::read_to_string(file_path)
            .wrap_err_with(|| format!("cannot read config file {file_path}"))?;
        let config = Self::from_toml(&text)
            .wrap_err_with(|| format!("invalid config file {file_path}"))?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Config> {
        let config: Config = toml::from_str(text)?;
        // surface bad source tags before any file is written
        config.extra_sources()?;
        Ok(config)
    }

    pub fn extra_sources(&self) -> Result<Vec<VoltageSource>, TestbenchError> {
        self.extra_sources.iter().map(VoltageSource::try_from).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelInclude {
    pub path: String,
    #[serde(default)]
    pub section: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfig {
    pub model_includes: Vec<ModelInclude>,
    /// Subcircuit library included by combinational testbenches.
    pub combinational_subcircuits: String,
    /// Subcircuit library included by sequential testbenches.
    pub sequential_subcircuits: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        let sections = [
            ("config", "default"),
            ("param", "3s"),
            ("bip", "tm"),
            ("cap", "tm"),
            ("dio", "tm"),
            ("mos", "tm"),
            ("res", "tm"),
        ];
        SimulatorConfig {
            model_includes: sections
                .iter()
                .map(|(file, section)| ModelInclude {
                    path: format!("{PDK_MODELS}/{file}.scs"),
                    section: Some(section.to_string()),
                })
                .collect(),
            combinational_subcircuits: String::from("./../../data/xt018_subcircuits.scs"),
            sequential_subcircuits: String::from("./data/xt018_ff_subcircuits.scs"),
        }
    }
}

/// Stimulus shape for the toggled input. The slow edge uses the cell's
/// `max_transition`; the opposite edge uses `fast_edge`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CombinationalConfig {
    pub delay: f64,
    pub fast_edge: f64,
    pub width: f64,
}

impl Default for CombinationalConfig {
    fn default() -> Self {
        CombinationalConfig {
            delay: 1e-9,
            fast_edge: 1e-9,
            width: 1.0,
        }
    }
}

/// Pin naming conventions (glob patterns) and stimulus for flip-flops.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SequentialConfig {
    pub data_pin: String,
    pub clock_pin: String,
    pub data_pins: String,
    pub control_pins: Vec<String>,
    pub output_pins: String,
    pub data: PulseShape,
    pub clock: PulseShape,
    /// Used when no output pin states a `max_capacitance`.
    pub load_capacitance: f64,
}

impl Default for SequentialConfig {
    fn default() -> Self {
        SequentialConfig {
            data_pin: String::from("D"),
            clock_pin: String::from("C"),
            data_pins: String::from("D*"),
            control_pins: vec![String::from("R*"), String::from("S*")],
            output_pins: String::from("Q*"),
            data: PulseShape {
                rise: 100e-12,
                fall: 100e-12,
                delay: 2e-9,
                width: 5e-9,
                period: Some(10e-9),
            },
            clock: PulseShape {
                rise: 100e-12,
                fall: 100e-12,
                delay: 1e-9,
                width: 2e-9,
                period: Some(4e-9),
            },
            load_capacitance: 10e-15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub time_column: String,
    pub output_column: String,
    /// Samples averaged at each end of a trace to decide whether it switches.
    pub edge_samples: usize,
    /// Volts; smaller start/end differences count as constant.
    pub tolerance: f64,
    /// Extension of waveform files inside the results directory.
    pub extension: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            time_column: String::from("time"),
            output_column: String::from("Q"),
            edge_samples: 5,
            tolerance: 1e-6,
            extension: String::from("csv"),
        }
    }
}

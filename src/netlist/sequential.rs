use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::{eyre::WrapErr, Result};
use globset::{Glob, GlobMatcher, GlobSet, GlobSetBuilder};
use log::debug;

use crate::{
    config::{Config, SequentialConfig},
    liberty::Cell,
};

use super::{
    combinational::pin_number,
    source::VoltageSource,
    template::Testbench,
    TestbenchError, GROUND_NODE, SUPPLY_NODE,
};

/// Pin-name conventions of a flip-flop library. These are naming rules of
/// the target library, not something liberty states.
#[derive(Debug, Clone)]
pub struct PinConventions {
    data: GlobMatcher,
    control: GlobSet,
    output: GlobMatcher,
}

impl PinConventions {
    pub fn new(config: &SequentialConfig) -> Result<Self, globset::Error> {
        let mut control = GlobSetBuilder::new();
        for pattern in &config.control_pins {
            control.add(Glob::new(pattern)?);
        }
        Ok(PinConventions {
            data: Glob::new(&config.data_pins)?.compile_matcher(),
            control: control.build()?,
            output: Glob::new(&config.output_pins)?.compile_matcher(),
        })
    }

    pub fn is_data(&self, pin: &str) -> bool {
        self.data.is_match(pin)
    }

    /// Scan, set and reset pins.
    pub fn is_control(&self, pin: &str) -> bool {
        self.control.is_match(pin)
    }

    pub fn is_output(&self, pin: &str) -> bool {
        self.output.is_match(pin)
    }
}

/// Sources for a clocked capture of `data_in`: a pulse on the data pin, the
/// other data pins and all control pins held high, a clock pulse and the
/// supply.
pub fn create_ff_sources(
    data_in: &str,
    pins: &[String],
    conventions: &PinConventions,
    config: &Config,
) -> Vec<VoltageSource> {
    let v_high = config.supply_voltage;
    let v_low = config.ground_voltage;
    let clock_pin = config.sequential.clock_pin.as_str();

    let mut sources = vec![VoltageSource::pulse(
        data_in,
        v_low,
        v_high,
        config.sequential.data,
    )];

    let constant_inputs = pins
        .iter()
        .filter(|p| conventions.is_data(p) && *p != data_in && *p != clock_pin);
    for p in constant_inputs {
        sources.push(VoltageSource::constant(p, v_high, v_low, true));
    }

    let scan_and_reset = pins.iter().filter(|p| {
        conventions.is_control(p) && !conventions.is_data(p) && *p != data_in && *p != clock_pin
    });
    for p in scan_and_reset {
        sources.push(VoltageSource::constant(p, v_high, v_low, true));
    }

    sources.push(VoltageSource::pulse(
        clock_pin,
        v_low,
        v_high,
        config.sequential.clock,
    ));

    sources.push(VoltageSource::dc(SUPPLY_NODE, v_high));

    sources
}

/// Writes the clocked testbench `{cell}_0.scs`.
pub fn write_ff_testbench(
    cell: &Cell,
    config: &Config,
    conventions: &PinConventions,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let cell_name = cell.name();
    let pins = cell.ff_pins();

    let data_in = pins
        .iter()
        .find(|p| **p == config.sequential.data_pin)
        .or_else(|| pins.iter().find(|p| conventions.is_data(p)))
        .ok_or_else(|| TestbenchError::MissingPin {
            cell: cell_name.clone(),
            pin: config.sequential.data_pin.clone(),
        })?;

    let outputs: Vec<&String> = pins.iter().filter(|p| conventions.is_output(p)).collect();
    if outputs.is_empty() {
        return Err(TestbenchError::MissingPin {
            cell: cell_name,
            pin: config.sequential.output_pins.clone(),
        }
        .into());
    }

    let c_load = outputs
        .iter()
        .filter_map(|p| cell.pin(p))
        .find_map(|pin| pin_number(&cell_name, pin, "max_capacitance").ok())
        .map(|cap| cap * config.capacitance_unit)
        .unwrap_or(config.sequential.load_capacitance);
    let loads: Vec<(String, f64)> = outputs.iter().map(|p| ((*p).clone(), c_load)).collect();

    let mut sources = create_ff_sources(data_in, &pins, conventions, config);
    sources.extend(config.extra_sources()?);

    let mut ports = pins.clone();
    ports.extend([GROUND_NODE.to_owned(), SUPPLY_NODE.to_owned()]);

    let netlist = Testbench {
        cell: &cell_name,
        ports: &ports,
        sources: &sources,
        loads: &loads,
        simulator: &config.simulator,
        subcircuits: &config.simulator.sequential_subcircuits,
        temperature: config.temperature,
        tran_stop: config.tran_stop,
    }
    .render();

    let path = out_dir.join(format!("{cell_name}_0.scs"));
    fs::write(&path, netlist).wrap_err_with(|| format!("cannot write {}", path.display()))?;
    debug!(
        "{}: data {data_in}, {} outputs, c_load={c_load:e}",
        path.display(),
        loads.len()
    );

    Ok(vec![path])
}

use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::{eyre::WrapErr, Result};
use log::debug;

use crate::{
    boolean::{extract_variables, generate_sensitive_vectors, SensitivityVector},
    config::{CombinationalConfig, Config},
    liberty::{Cell, Group, Value},
};

use super::{
    source::{PulseShape, VoltageSource},
    template::Testbench,
    TestbenchError, GROUND_NODE, SUPPLY_NODE,
};

/// Sources for one sensitivity vector: the toggled pin pulses, every other
/// pin is held at its assigned level, then the supply.
///
/// A pin starting low gets a slow rising edge of `tran_time` and a fast
/// fall; a pin starting high gets the mirror image.
pub fn create_voltage_sources(
    vector: &SensitivityVector,
    v_high: f64,
    v_low: f64,
    tran_time: f64,
    stimulus: &CombinationalConfig,
) -> Vec<VoltageSource> {
    let mut sources = Vec::with_capacity(vector.assignment.len() + 1);
    let pulse_pin = vector.toggled.as_str();

    let (val0, val1, rise, fall) = if vector.initial_level() {
        (v_high, v_low, stimulus.fast_edge, tran_time)
    } else {
        (v_low, v_high, tran_time, stimulus.fast_edge)
    };
    sources.push(VoltageSource::pulse(
        pulse_pin,
        val0,
        val1,
        PulseShape {
            rise,
            fall,
            delay: stimulus.delay,
            width: stimulus.width,
            period: None,
        },
    ));

    for (pin, level) in &vector.assignment {
        if pin != pulse_pin {
            sources.push(VoltageSource::constant(pin, v_high, v_low, *level));
        }
    }

    sources.push(VoltageSource::dc(SUPPLY_NODE, v_high));

    sources
}

pub(super) fn pin_number(
    cell: &str,
    pin: &Group,
    attribute: &str,
) -> Result<f64, TestbenchError> {
    pin.attribute(attribute)
        .and_then(Value::as_f64)
        .ok_or_else(|| TestbenchError::MissingAttribute {
            cell: cell.to_owned(),
            pin: pin.name().unwrap_or_default(),
            attribute: attribute.to_owned(),
        })
}

/// Writes `{cell}_{index}.scs` for every sensitivity vector of the cell's
/// output function, in enumeration order.
pub fn write_cell_testbenches(cell: &Cell, config: &Config, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let cell_name = cell.name();

    let q_pin = cell
        .output_pin(&config.output_pin)
        .ok_or_else(|| TestbenchError::MissingPin {
            cell: cell_name.clone(),
            pin: config.output_pin.clone(),
        })?;
    let output = q_pin.name().unwrap_or_else(|| config.output_pin.clone());

    let function = q_pin
        .attribute("function")
        .map(|f| f.to_string().trim().trim_matches('"').to_string())
        .ok_or_else(|| TestbenchError::MissingAttribute {
            cell: cell_name.clone(),
            pin: output.clone(),
            attribute: String::from("function"),
        })?;
    let max_cap = pin_number(&cell_name, q_pin, "max_capacitance")? * config.capacitance_unit;
    let max_tran = pin_number(&cell_name, q_pin, "max_transition")? * config.time_unit;

    let testvectors =
        generate_sensitive_vectors(&function).map_err(|source| TestbenchError::Function {
            cell: cell_name.clone(),
            source,
        })?;

    let mut ports = extract_variables(&function);
    if !ports.contains(&output) {
        ports.push(output.clone());
    }
    ports.extend([GROUND_NODE.to_owned(), SUPPLY_NODE.to_owned()]);
    let loads = vec![(output, max_cap)];
    let extra_sources = config.extra_sources()?;

    debug!(
        "{cell_name}: function {function:?}, {} vectors, c_load={max_cap:e}, tran={max_tran:e}",
        testvectors.len()
    );

    let mut written = Vec::with_capacity(testvectors.len());
    for (i, vector) in testvectors.iter().enumerate() {
        let mut sources = create_voltage_sources(
            vector,
            config.supply_voltage,
            config.ground_voltage,
            max_tran,
            &config.combinational,
        );
        sources.extend(extra_sources.iter().cloned());

        let netlist = Testbench {
            cell: &cell_name,
            ports: &ports,
            sources: &sources,
            loads: &loads,
            simulator: &config.simulator,
            subcircuits: &config.simulator.combinational_subcircuits,
            temperature: config.temperature,
            tran_stop: config.tran_stop,
        }
        .render();

        let path = out_dir.join(format!("{cell_name}_{i}.scs"));
        fs::write(&path, netlist).wrap_err_with(|| format!("cannot write {}", path.display()))?;
        debug!("{}: {vector}", path.display());
        written.push(path);
    }

    Ok(written)
}

use std::{fs, path::Path};

use color_eyre::Result;

use cellbench::{
    analysis::{read_results, DelayReport, SortColumn},
    config::Config,
    liberty::Library,
    netlist::{generate_library, Pipeline},
};

const STEP: f64 = 1e-11;

/// Node driven by the first (stimulus) source of a netlist.
fn stimulus_pin(netlist: &str) -> Option<String> {
    let line = netlist.lines().find(|l| l.starts_with("V0 ("))?;
    let node = line.strip_prefix("V0 (")?.split_whitespace().next()?;
    Some(node.to_string())
}

/// Stands in for the simulator: the stimulus ramps up at sample 20 and the
/// output follows `shift` samples later, inverted if `inverting`.
fn write_waveform(path: &Path, pin: &str, shift: usize, inverting: bool) -> Result<()> {
    let level = |i: usize, begin: usize| -> f64 {
        if i < begin {
            0.0
        } else if i >= begin + 10 {
            1.8
        } else {
            1.8 * (i - begin) as f64 / 10.0
        }
    };

    let mut text = format!("time,{pin},Q,vdd!\n");
    for i in 0..200 {
        let q = level(i, 20 + shift);
        let q = if inverting { 1.8 - q } else { q };
        text.push_str(&format!("{:e},{},{q},1.8\n", i as f64 * STEP, level(i, 20)));
    }
    fs::write(path, text)?;
    Ok(())
}

#[test]
fn generate_then_analyze() -> Result<()> {
    let lib = Library::load("data/sample.lib")?;
    let config = Config::default();
    let netlists = tempfile::tempdir()?;
    let results = tempfile::tempdir()?;

    let report = generate_library(&lib, &config, netlists.path(), Pipeline::Auto, None)?;
    assert_eq!(report.netlist_count(), 11);
    assert!(report.failed.is_empty());

    for (cell, paths) in &report.written {
        let shift = match cell.as_str() {
            "INVX1" => 5,
            "AND2X1" => 8,
            "OR2X1" => 12,
            _ => 20,
        };
        for path in paths {
            let netlist = fs::read_to_string(path)?;
            let pin = stimulus_pin(&netlist).expect("netlist without stimulus");
            let stem = path.file_stem().unwrap().to_str().unwrap();
            write_waveform(
                &results.path().join(format!("{stem}.csv")),
                &pin,
                shift,
                cell == "INVX1",
            )?;
        }
    }

    let summaries = read_results(results.path(), &config.analysis)?;
    let cells: Vec<(&str, usize)> = summaries
        .iter()
        .map(|s| (s.cell.as_str(), s.samples))
        .collect();
    assert_eq!(
        cells,
        vec![("AND2X1", 4), ("DFRX1", 1), ("INVX1", 2), ("OR2X1", 4)]
    );
    for summary in &summaries {
        assert!(summary.min <= summary.mean && summary.mean <= summary.max);
    }
    let inverter = &summaries[2];
    assert!((inverter.mean - 5.0 * STEP).abs() < 1e-15);

    let mut table = DelayReport::new(&summaries);
    table.sort(SortColumn::Mean);
    assert_eq!(table.cells(), vec!["INVX1", "AND2X1", "OR2X1", "DFRX1"]);

    let csv = results.path().join("summary.txt");
    table.write_csv(&csv)?;
    let written = fs::read_to_string(&csv)?;
    assert_eq!(written.lines().count(), 5);

    Ok(())
}

#[test]
fn config_file_changes_netlists() -> Result<()> {
    let config = Config::from_toml(
        r#"
supply_voltage = 3.3
temperature = 85.0

[[extra_sources]]
kind = "dc"
node = "vbias"
value = 0.6
"#,
    )?;
    let lib = Library::load("data/sample.lib")?;
    let dir = tempfile::tempdir()?;

    let report = generate_library(&lib, &config, dir.path(), Pipeline::Auto, None)?;
    assert!(report.failed.is_empty());

    let text = fs::read_to_string(dir.path().join("INVX1_0.scs"))?;
    assert!(text.contains("vsource dc=3.3 type=dc"));
    assert!(text.contains("(vbias 0) vsource dc=600m type=dc"));
    assert!(text.contains("temp=85"));

    Ok(())
}

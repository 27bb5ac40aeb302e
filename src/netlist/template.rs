use crate::config::SimulatorConfig;

use super::{format::eng_format, source::VoltageSource};

/// Everything that varies between two testbench files. The rest of the text
/// is fixed.
#[derive(Debug, Clone)]
pub struct Testbench<'a> {
    pub cell: &'a str,
    /// DUT port connections, in subcircuit port order.
    pub ports: &'a [String],
    pub sources: &'a [VoltageSource],
    /// Load capacitors as (node, farads).
    pub loads: &'a [(String, f64)],
    pub simulator: &'a SimulatorConfig,
    /// Subcircuit library holding the cell definition.
    pub subcircuits: &'a str,
    pub temperature: f64,
    pub tran_stop: f64,
}

impl Testbench<'_> {
    pub fn render(&self) -> String {
        let mut lines = self.header();
        lines.extend(self.body());
        lines.extend(self.footer());
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    fn header(&self) -> Vec<String> {
        let mut header = vec![
            String::from("simulator lang=spectre"),
            String::from("global 0 vdd!"),
        ];
        for include in &self.simulator.model_includes {
            match &include.section {
                Some(section) => {
                    header.push(format!("include \"{}\" section={section}", include.path))
                }
                None => header.push(format!("include \"{}\"", include.path)),
            }
        }
        header.push(format!("include \"{}\"", self.subcircuits));
        header.push(String::new());
        header
    }

    fn body(&self) -> Vec<String> {
        let mut body = vec![format!("I0 ({}) {}", self.ports.join(" "), self.cell)];

        for (i, source) in self.sources.iter().enumerate() {
            body.push(source_line(i, source));
        }

        for (j, (node, c_load)) in self.loads.iter().enumerate() {
            body.push(format!("C{j} ({node} 0) capacitor c={}", eng_format(*c_load)));
        }

        body.push(String::new());
        body
    }

    fn footer(&self) -> Vec<String> {
        vec![
            String::from(
                r#"simulatorOptions options psfversion="1.4.0" reltol=1e-3 vabstol=1e-6 \"#,
            ),
            format!(
                "    iabstol=1e-12 temp={} tnom=27 homotopy=all limit=delta scalem=1.0 \\",
                eng_format(self.temperature)
            ),
            String::from("    scale=1.0 compatible=spice2 gmin=1e-12 rforce=1 \\"),
            String::from("    redefinedparams=warning maxnotes=5 maxwarns=5 digits=5 cols=80 \\"),
            String::from(r#"    pivrel=1e-3 sensfile="../psf/sens.output" checklimitdest=psf"#),
            format!(
                r#"tran tran stop={} errpreset=conservative write="spectre.ic" \"#,
                eng_format(self.tran_stop)
            ),
            String::from(r#"    writefinal="spectre.fc" annotate=status maxiters=5"#),
            String::from("finalTimeOP info what=oppoint where=rawfile"),
            String::from("modelParameter info what=models where=rawfile"),
            String::from("element info what=inst where=rawfile"),
            String::from("outputParameter info what=output where=rawfile"),
            String::from("designParamVals info what=parameters where=rawfile"),
            String::from("primitives info what=primitives where=rawfile"),
            String::from("subckts info what=subckts where=rawfile"),
            String::from("saveOptions options save=allpub"),
        ]
    }
}

fn source_line(index: usize, source: &VoltageSource) -> String {
    match source {
        VoltageSource::Dc { node, value } => {
            format!("V{index} ({node} 0) vsource dc={} type=dc", eng_format(*value))
        }
        VoltageSource::Pulse {
            node,
            val0,
            val1,
            rise,
            fall,
            delay,
            width,
            period,
        } => {
            let mut line = format!(
                "V{index} ({node} 0) vsource type=pulse val0={} val1={} delay={} rise={} fall={} width={}",
                eng_format(*val0),
                eng_format(*val1),
                eng_format(*delay),
                eng_format(*rise),
                eng_format(*fall),
                eng_format(*width),
            );
            if let Some(period) = period {
                line.push_str(&format!(" period={}", eng_format(*period)));
            }
            line
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelInclude, SimulatorConfig};
    use crate::netlist::source::PulseShape;

    #[test]
    fn test_source_lines() {
        assert_eq!(
            source_line(2, &VoltageSource::dc("vdd!", 1.8)),
            "V2 (vdd! 0) vsource dc=1.8 type=dc"
        );

        let shape = PulseShape {
            rise: 1e-9,
            fall: 1e-9,
            delay: 1e-9,
            width: 1.0,
            period: None,
        };
        assert_eq!(
            source_line(0, &VoltageSource::pulse("A", 0.0, 1.8, shape)),
            "V0 (A 0) vsource type=pulse val0=0 val1=1.8 delay=1n rise=1n fall=1n width=1"
        );

        let clocked = PulseShape {
            period: Some(4e-9),
            ..shape
        };
        assert!(source_line(1, &VoltageSource::pulse("C", 0.0, 1.8, clocked))
            .ends_with("width=1 period=4n"));
    }

    #[test]
    fn test_render_layout() {
        let simulator = SimulatorConfig {
            model_includes: vec![
                ModelInclude {
                    path: "models/mos.scs".into(),
                    section: Some("tm".into()),
                },
                ModelInclude {
                    path: "models/extra.scs".into(),
                    section: None,
                },
            ],
            ..Default::default()
        };
        let ports: Vec<String> = ["A", "Q", "0", "vdd!"].iter().map(|s| s.to_string()).collect();
        let sources = vec![VoltageSource::dc("A", 0.0), VoltageSource::dc("vdd!", 1.8)];
        let loads = vec![("Q".to_string(), 2e-12)];

        let text = Testbench {
            cell: "INVX1",
            ports: &ports,
            sources: &sources,
            loads: &loads,
            simulator: &simulator,
            subcircuits: "cells.scs",
            temperature: 27.0,
            tran_stop: 12e-9,
        }
        .render();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "simulator lang=spectre");
        assert_eq!(lines[2], "include \"models/mos.scs\" section=tm");
        assert_eq!(lines[3], "include \"models/extra.scs\"");
        assert_eq!(lines[4], "include \"cells.scs\"");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "I0 (A Q 0 vdd!) INVX1");
        assert_eq!(lines[7], "V0 (A 0) vsource dc=0 type=dc");
        assert_eq!(lines[8], "V1 (vdd! 0) vsource dc=1.8 type=dc");
        assert_eq!(lines[9], "C0 (Q 0) capacitor c=2p");
        assert!(text.contains("temp=27 tnom=27"));
        assert!(text.contains("tran tran stop=12n errpreset=conservative"));
        assert!(text.ends_with("saveOptions options save=allpub\n"));
    }
}

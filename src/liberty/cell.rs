use super::group::{Group, Value};

/// View over a `cell (...)` group.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    pub group: &'a Group,
}

impl<'a> Cell<'a> {
    pub fn new(group: &'a Group) -> Self {
        Cell { group }
    }

    pub fn name(&self) -> String {
        self.group.name().unwrap_or_default()
    }

    pub fn pins(&self) -> impl Iterator<Item = &'a Group> + 'a {
        let group: &'a Group = self.group;
        group
            .groups
            .iter()
            .filter(|g| g.kind == "pin")
            .chain(
                group
                    .groups
                    .iter()
                    .filter(|g| g.kind == "bundle" || g.kind == "bus")
                    .flat_map(|b| b.groups.iter().filter(|g| g.kind == "pin")),
            )
    }

    pub fn pin(&self, name: &str) -> Option<&'a Group> {
        self.pins().find(|p| p.name().as_deref() == Some(name))
    }

    /// The pin named `preferred`, or else the first output pin carrying a
    /// `function`.
    pub fn output_pin(&self, preferred: &str) -> Option<&'a Group> {
        self.pin(preferred).or_else(|| {
            self.pins().find(|p| {
                p.attribute("direction").and_then(Value::as_str) == Some("output")
                    && p.attribute("function").is_some()
            })
        })
    }

    /// Cells with storage elements are characterized with a clocked testbench.
    pub fn is_sequential(&self) -> bool {
        self.group
            .groups
            .iter()
            .any(|g| matches!(g.kind.as_str(), "ff" | "latch" | "ff_bank" | "latch_bank"))
    }

    /// Pin names plus bundle members, sorted to match the subcircuit port
    /// order.
    pub fn ff_pins(&self) -> Vec<String> {
        let mut pins: Vec<String> = self
            .group
            .groups("pin")
            .filter_map(Group::name)
            .collect();

        for bundle in self.group.groups("bundle") {
            if let Some(members) = bundle.complex_attribute("members") {
                pins.extend(
                    members
                        .iter()
                        .map(|m| m.to_string().trim().trim_matches('\'').to_string()),
                );
            }
        }

        pins.sort();
        pins.dedup();
        pins
    }
}

#[cfg(test)]
mod tests {
    use crate::liberty::Library;

    const FLOP: &str = r#"
        library (seq) {
            cell (DFRX1) {
                ff (IQ, IQN) { next_state : "D" ; clocked_on : "C" ; }
                pin (C) { direction : input ; clock : true ; }
                pin (RN) { direction : input ; }
                bundle (D) {
                    members (D1, D0);
                    pin (D0) { direction : input ; }
                    pin (D1) { direction : input ; }
                }
                pin (Q) { direction : output ; function : "IQ" ; max_capacitance : 0.3 ; }
            }
            cell (INVX1) {
                pin (A) { direction : input ; }
                pin (Y) { direction : output ; function : "!A" ; }
            }
        }
    "#;

    #[test]
    fn test_ff_pins_sorted_with_bundle_members() {
        let lib = Library::parse(FLOP).unwrap();
        let cell = lib.cell("DFRX1").unwrap();
        assert!(cell.is_sequential());
        assert_eq!(cell.ff_pins(), vec!["C", "D0", "D1", "Q", "RN"]);
        assert!(cell.pin("D0").is_some());
    }

    #[test]
    fn test_output_pin_fallback() {
        let lib = Library::parse(FLOP).unwrap();
        let inv = lib.cell("INVX1").unwrap();
        assert!(!inv.is_sequential());
        let out = inv.output_pin("Q").unwrap();
        assert_eq!(out.name().as_deref(), Some("Y"));
    }
}

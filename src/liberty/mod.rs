mod nomutil;

mod cell;
mod group;
mod nomliberty;

pub use cell::Cell;
pub use group::{Attribute, AttributeValue, Group, Value};

use std::fs;

use bytesize::ByteSize;
use color_eyre::{eyre::WrapErr, Result};
use log::info;

#[derive(Debug)]
pub struct Library {
    pub file_path: Option<String>,
    pub root: Group,
}

impl Library {
    pub fn load(file_path: &str) -> Result<Library> {
        let size = fs::metadata(file_path)
            .wrap_err_with(|| format!("cannot stat liberty file {file_path}"))?
            .len();
        info!("loading {file_path} ({})", ByteSize(size));

        let data = fs::read_to_string(file_path)
            .wrap_err_with(|| format!("cannot read liberty file {file_path}"))?;
        let mut library =
            Self::parse(&data).wrap_err_with(|| format!("while parsing {file_path}"))?;
        library.file_path = Some(file_path.to_owned());
        Ok(library)
    }

    pub fn parse(text: &str) -> Result<Library> {
        let root = nomliberty::parse_liberty(text)?;
        Ok(Library {
            file_path: None,
            root,
        })
    }

    pub fn name(&self) -> Option<String> {
        self.root.name()
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell<'_>> {
        self.root.groups("cell").map(Cell::new)
    }

    pub fn cell(&self, name: &str) -> Option<Cell<'_>> {
        self.root.group("cell", name).map(Cell::new)
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;

    #[test]
    fn load_sample_library() -> Result<()> {
        let file_path = "data/sample.lib";

        let lib = Library::load(file_path)?;

        assert_eq!(lib.name().as_deref(), Some("cellbench_sample"));
        assert_eq!(lib.file_path.as_deref(), Some(file_path));
        assert!(Library::parse("library (x) { }")?.file_path.is_none());
        assert_eq!(lib.cells().count(), 4);
        let names: Vec<String> = lib.cells().map(|c| c.name()).collect();
        assert_eq!(names, vec!["INVX1", "AND2X1", "OR2X1", "DFRX1"]);

        Ok(())
    }

    #[test]
    fn load_missing_file() {
        assert!(Library::load("data/does_not_exist.lib").is_err());
    }
}

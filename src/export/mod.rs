//! Getting a built diagram out of the process: a JSON plan for drivers, and SVG/PNG
//! stills of any instant for checking the layout by eye.

pub mod raster;
pub mod svg;

use crate::{builder::Diagram, foundation::error::DiagramResult};

pub fn to_json(diagram: &Diagram) -> DiagramResult<String> {
    Ok(serde_json::to_string_pretty(diagram)?)
}

pub fn from_json(s: &str) -> DiagramResult<Diagram> {
    Ok(serde_json::from_str(s)?)
}

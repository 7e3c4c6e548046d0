//! Layout and reveal planning for an animated split keyboard diagram.
//!
//! [`build`] turns a [`LayoutConfig`] into a [`Diagram`]: every shape's initial placement
//! plus an ordered list of [`Phase`]s. Phases run strictly in sequence; operations inside a
//! phase are independent. Drawing them is left to whatever driver consumes the plan;
//! [`Timeline`] replays the plan for drivers that want geometry at a given instant.
#![forbid(unsafe_code)]

pub mod builder;
pub mod config;
pub mod ease;
pub mod export;
pub mod foundation;
pub mod phase;
pub mod shapes;
pub mod timeline;

pub use builder::{Diagram, DiagramBuilder, build};
pub use config::{CableConfig, LayoutConfig, OutlineAnchor};
pub use ease::Ease;
pub use export::raster::{rasterize_svg, write_png};
pub use export::svg::{SvgDocument, SvgOptions, render_svg};
pub use export::{from_json, to_json};
pub use foundation::core::{Affine, CubicBez, Hand, Line, Point, Rect, Units, Vec2};
pub use foundation::error::{DiagramError, DiagramResult};
pub use phase::{OpKind, Operation, Phase, PhaseKind, PhaseOp, RevealStyle};
pub use shapes::{Geometry, Role, Shape, ShapeArena, ShapeId, Style};
pub use timeline::{Cursor, ShapeState, Snapshot, Timeline};

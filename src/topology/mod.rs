//! Static network topology
//!
//! Ports, intra-NE links, inter-NE optical connections, datapath ids and
//! southbound port bindings, all read from descriptor files at startup.

mod bindings;
mod descriptor;
mod link;
mod model;
mod port;

pub use self::bindings::{Binding, SouthboundBindings};
pub use self::descriptor::{parse_boundary, parse_id_mapping, parse_och_links, IdAssertion};
pub use self::link::{Link, OmsConnection};
pub use self::model::{DescriptorPaths, OmsRow, TopologyModel};
pub use self::port::{search_ports, Layer, PortId, PortKind};

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use super::bindings::{Binding, SouthboundBindings};
use super::descriptor::{self, IdAssertion};
use super::link::{Link, OmsConnection};
use super::port::{search_ports, Layer, PortId, PortKind};
use crate::core::{DatapathId, Error, Result};

/// Locations of the four descriptor files
#[derive(Debug, Clone)]
pub struct DescriptorPaths {
    /// The two boundary-link files, read in order
    pub boundary: [PathBuf; 2],
    /// Optical-link file
    pub och_link: PathBuf,
    /// Id mapping file
    pub id_mapping: PathBuf,
}

impl DescriptorPaths {
    /// Standard file names inside a data directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        DescriptorPaths {
            boundary: [dir.join("ll1.txt"), dir.join("ll2.txt")],
            och_link: dir.join("och_link.txt"),
            id_mapping: dir.join("idex.txt"),
        }
    }
}

/// One row of the OMS table shown for an NE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OmsRow {
    pub local_port: String,
    pub remote_ne: String,
    pub remote_port: String,
}

/// Static topology of every simulated network element
///
/// Built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyModel {
    ne_ids: BTreeSet<String>,
    ports: Vec<PortId>,
    port_index: HashSet<PortId>,
    links: BTreeMap<String, Vec<Link>>,
    oms: BTreeMap<String, Vec<OmsConnection>>,
    transponders: BTreeMap<String, String>,
    datapath_ids: BTreeMap<String, DatapathId>,
    bindings: SouthboundBindings,
}

fn read_descriptor(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        error!("File Read Failed: {}", path.display());
        Error::file_parse(format!("{}: {}", path.display(), e))
    })
}

fn with_path<T>(path: &Path, result: Result<T>) -> Result<T> {
    result.map_err(|e| {
        error!("File Read Failed: {}", path.display());
        match e {
            Error::FileParse(msg) => Error::file_parse(format!("{}: {}", path.display(), msg)),
            Error::DatapathIdRange(msg) => {
                Error::datapath_id_range(format!("{}: {}", path.display(), msg))
            }
            other => other,
        }
    })
}

impl TopologyModel {
    /// Reads and links the four descriptor files
    pub fn load(paths: &DescriptorPaths) -> Result<Self> {
        let mut model = TopologyModel::default();

        for path in &paths.boundary {
            let text = read_descriptor(path)?;
            with_path(path, model.ingest_boundary(&text))?;
        }

        let text = read_descriptor(&paths.och_link)?;
        with_path(&paths.och_link, model.ingest_och_links(&text))?;

        let text = read_descriptor(&paths.id_mapping)?;
        with_path(&paths.id_mapping, model.ingest_id_mapping(&text))?;

        model.log_summary();
        Ok(model)
    }

    /// Builds a model from in-memory descriptor contents
    pub fn from_sources(boundary: [&str; 2], och_link: &str, id_mapping: &str) -> Result<Self> {
        let mut model = TopologyModel::default();
        for text in boundary {
            model.ingest_boundary(text)?;
        }
        model.ingest_och_links(och_link)?;
        model.ingest_id_mapping(id_mapping)?;
        Ok(model)
    }

    fn add_port(&mut self, port: &PortId) {
        if self.port_index.insert(port.clone()) {
            self.ports.push(port.clone());
        }
    }

    fn add_link(&mut self, ne: &str, a: PortId, b: PortId) {
        self.ne_ids.insert(ne.to_string());
        let link = Link::new(a, b);
        let links = self.links.entry(ne.to_string()).or_default();
        if !links.contains(&link) {
            links.push(link);
        }
    }

    fn add_oms(&mut self, connection: OmsConnection) {
        let list = self.oms.entry(connection.local.ne().to_string()).or_default();
        if !list.contains(&connection) {
            list.push(connection);
        }
    }

    fn ingest_boundary(&mut self, text: &str) -> Result<()> {
        for (lower, upper) in descriptor::parse_boundary(text)? {
            self.add_port(&lower);
            self.add_port(&upper);

            if lower.is(Layer::Odu, PortKind::Ttp) && upper.is(Layer::Ether, PortKind::Ttp) {
                let previous = self
                    .transponders
                    .insert(lower.ne().to_string(), upper.ne().to_string());
                if let Some(previous) = previous.filter(|p| p != upper.ne()) {
                    warn!(
                        "PT of NE[{}] changed from [{}] to [{}]",
                        lower.ne(),
                        previous,
                        upper.ne()
                    );
                }
            }

            let ne = lower.ne().to_string();
            self.add_link(&ne, lower, upper);
        }
        Ok(())
    }

    fn ingest_och_links(&mut self, text: &str) -> Result<()> {
        for (one, two) in descriptor::parse_och_links(text)? {
            self.add_port(&one);
            self.add_port(&two);
            self.ne_ids.insert(one.ne().to_string());
            self.ne_ids.insert(two.ne().to_string());

            let both_och = one.layer() == Layer::Och && two.layer() == Layer::Och;
            if one.ne() != two.ne() {
                if both_och && one.kind() == PortKind::Ctp && two.kind() == PortKind::Ctp {
                    let connection = OmsConnection::new(one, two);
                    self.add_oms(connection.reversed());
                    self.add_oms(connection);
                }
            } else if both_och && !(one.kind() == PortKind::Ttp && two.kind() == PortKind::Ttp) {
                let ne = one.ne().to_string();
                self.add_link(&ne, one, two);
            }
            // every other combination is dropped
        }
        Ok(())
    }

    fn ingest_id_mapping(&mut self, text: &str) -> Result<()> {
        for IdAssertion {
            port,
            dpid,
            southbound_port,
        } in descriptor::parse_id_mapping(text)?
        {
            let ne = port.ne().to_string();
            match self.datapath_ids.get(&ne) {
                None => {
                    self.datapath_ids.insert(ne.clone(), dpid);
                }
                Some(existing) if *existing != dpid => warn!(
                    "Fail to add DP ID[{}]. The DP ID of NE[{}] is already set(exist DP ID[{}]).",
                    dpid, ne, existing
                ),
                Some(_) => {}
            }

            let binding = self.bindings.bind(port.clone(), southbound_port);
            if let Binding::Conflict { existing } = binding {
                warn!(
                    "Fail to add OpenFlow Port ID[{}]. The OpenFlow Port ID of Port[{}] is already set(exist OpenFlow Port ID[{}]).",
                    southbound_port, port, existing
                );
            }
        }
        Ok(())
    }

    /// NE ids in sorted order
    pub fn ne_ids(&self) -> impl Iterator<Item = &str> {
        self.ne_ids.iter().map(String::as_str)
    }

    /// Whether the NE is part of the topology
    pub fn contains_ne(&self, ne: &str) -> bool {
        self.ne_ids.contains(ne)
    }

    /// Every port, in first-seen order
    pub fn ports(&self) -> &[PortId] {
        &self.ports
    }

    /// Ports of an NE, optionally restricted to a layer and role
    pub fn ports_of(&self, ne: &str, layer: Option<Layer>, kind: Option<PortKind>) -> Vec<PortId> {
        search_ports(&self.ports, Some(ne), layer, kind)
    }

    /// Ports drawn for an NE: its own plus those of its paired transponder
    pub fn view_ports(&self, ne: &str) -> Vec<PortId> {
        let mut ports = self.ports_of(ne, None, None);
        if let Some(pt) = self.transponder_of(ne) {
            ports.extend(self.ports_of(pt, None, None));
        }
        ports
    }

    /// Intra-NE links of an NE
    pub fn links_of(&self, ne: &str) -> &[Link] {
        match self.links.get(ne) {
            Some(links) => links.as_slice(),
            None => {
                warn!("Links of {} are not found.", ne);
                &[]
            }
        }
    }

    /// OMS connections leaving an NE
    pub fn oms_of(&self, ne: &str) -> &[OmsConnection] {
        self.oms.get(ne).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Paired transponder NE of an NE
    pub fn transponder_of(&self, ne: &str) -> Option<&str> {
        self.transponders.get(ne).map(String::as_str)
    }

    /// Datapath id assigned to an NE
    pub fn datapath_id(&self, ne: &str) -> Option<DatapathId> {
        self.datapath_ids.get(ne).copied()
    }

    /// Datapath id of an NE, failing when the mapping file had none
    pub fn require_datapath_id(&self, ne: &str) -> Result<DatapathId> {
        self.datapath_id(ne)
            .ok_or_else(|| Error::topology(format!("DPID of {ne} is not found.")))
    }

    /// Southbound port number bound to a port
    pub fn southbound_port(&self, port: &PortId) -> Option<u32> {
        self.bindings.get(port)
    }

    /// OMS table rows for an NE
    pub fn oms_rows(&self, ne: &str) -> Vec<OmsRow> {
        self.oms_of(ne)
            .iter()
            .map(|c| OmsRow {
                local_port: self.bindings.label(&c.local),
                remote_ne: c.remote.ne().to_string(),
                remote_port: self.bindings.label(&c.remote),
            })
            .collect()
    }

    /// Ports of one layer and role in drawing order
    ///
    /// Sorted by southbound number with unbound ports first, then every port
    /// is followed by the same-class ports it is linked to so links do not
    /// cross.
    pub fn ordered_ports(&self, ne: &str, layer: Layer, kind: PortKind) -> Vec<PortId> {
        let mut candidates = search_ports(&self.view_ports(ne), None, Some(layer), Some(kind));
        candidates.sort_by_key(|p| self.southbound_port(p));

        let links: Vec<&Link> = self
            .links
            .get(ne)
            .map(|l| l.iter().filter(|l| l.is_same_class()).collect())
            .unwrap_or_default();

        let mut ordered: Vec<PortId> = Vec::with_capacity(candidates.len());
        for port in &candidates {
            if ordered.contains(port) {
                continue;
            }
            ordered.push(port.clone());
            for link in &links {
                if let Some(peer) = link.other_end(port) {
                    if candidates.contains(peer) && !ordered.contains(peer) {
                        ordered.push(peer.clone());
                    }
                }
            }
        }
        ordered
    }

    /// Logs what was read
    pub fn log_summary(&self) {
        let ne_ids: Vec<&str> = self.ne_ids().collect();
        info!("Read - NE: {:?}", ne_ids);
        let ports: Vec<String> = self.ports.iter().map(|p| format!("\"{p}\"")).collect();
        info!("Read - Port: [{}]", ports.join(", "));
        for (ne, links) in &self.links {
            let links: Vec<String> = links.iter().map(ToString::to_string).collect();
            info!("Read - Link: {}={}", ne, links.join(", "));
        }
        let pts: Vec<String> = self
            .transponders
            .iter()
            .map(|(ne, pt)| format!("{pt}({ne})"))
            .collect();
        info!("Read - PT: {}", pts.join(", "));
        let dpids: Vec<String> = self
            .datapath_ids
            .iter()
            .map(|(ne, dpid)| format!("{dpid}({ne})"))
            .collect();
        info!("Read - DPID: {}", dpids.join(", "));
    }
}

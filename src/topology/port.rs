use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::core::{Error, Result};

/// Transport layer of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Ethernet client layer (transponder side)
    Ether,
    /// ODU switching layer
    Odu,
    /// Optical channel layer
    Och,
}

impl Layer {
    /// Display priority: Ether > ODU > OCh
    pub fn priority(&self) -> i32 {
        match self {
            Layer::Ether => 2,
            Layer::Odu => 1,
            Layer::Och => 0,
        }
    }

    /// Name used in port identity strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Ether => "Ether",
            Layer::Odu => "ODU",
            Layer::Och => "OCh",
        }
    }
}

impl FromStr for Layer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Ether" => Ok(Layer::Ether),
            "ODU" => Ok(Layer::Odu),
            "OCh" => Ok(Layer::Och),
            other => Err(Error::file_parse(format!("unknown layer [{other}]"))),
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a port within its layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PortKind {
    /// Trail termination point
    Ttp,
    /// Connection termination point
    Ctp,
}

impl PortKind {
    /// Display priority: TTP > CTP
    pub fn priority(&self) -> i32 {
        match self {
            PortKind::Ttp => 2,
            PortKind::Ctp => 1,
        }
    }

    /// Name used in port identity strings
    pub fn as_str(&self) -> &'static str {
        match self {
            PortKind::Ttp => "TTP",
            PortKind::Ctp => "CTP",
        }
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a port in the information model
///
/// Parsed from strings such as `NW=SDN,NE=OPT1,Layer=ODU,CTP=1`. The value is
/// immutable; the southbound port number bound later lives in
/// [`super::SouthboundBindings`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId {
    network: String,
    ne: String,
    layer: Layer,
    kind: PortKind,
    number: u32,
}

impl PortId {
    /// Creates a port identity from its parts
    pub fn new(
        network: impl Into<String>,
        ne: impl Into<String>,
        layer: Layer,
        kind: PortKind,
        number: u32,
    ) -> Self {
        PortId {
            network: network.into(),
            ne: ne.into(),
            layer,
            kind,
            number,
        }
    }

    /// Network id
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Owning NE id
    pub fn ne(&self) -> &str {
        &self.ne
    }

    /// Layer of the port
    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// TTP or CTP
    pub fn kind(&self) -> PortKind {
        self.kind
    }

    /// Port number within the layer
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Whether the port sits on the given layer with the given role
    pub fn is(&self, layer: Layer, kind: PortKind) -> bool {
        self.layer == layer && self.kind == kind
    }

    /// Whether both ports share layer and role
    pub fn same_class(&self, other: &PortId) -> bool {
        self.layer == other.layer && self.kind == other.kind
    }
}

impl FromStr for PortId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut fields: HashMap<&str, &str> = HashMap::new();
        for expression in s.split(',') {
            let (key, value) = expression
                .split_once('=')
                .ok_or_else(|| Error::file_parse(format!("malformed port id [{s}]")))?;
            fields.insert(key.trim(), value.trim());
        }

        let field = |key: &str| {
            fields
                .get(key)
                .copied()
                .ok_or_else(|| Error::file_parse(format!("port id [{s}] has no {key}")))
        };

        let network = field("NW")?;
        let ne = field("NE")?;
        let layer: Layer = field("Layer")?.parse()?;

        let (kind, raw_number) = match (fields.get("TTP"), fields.get("CTP")) {
            (Some(n), None) => (PortKind::Ttp, *n),
            (None, Some(n)) => (PortKind::Ctp, *n),
            _ => {
                return Err(Error::file_parse(format!(
                    "port id [{s}] must carry exactly one of TTP or CTP"
                )))
            }
        };
        let number = raw_number
            .parse::<u32>()
            .map_err(|e| Error::file_parse(format!("port id [{s}]: bad port number: {e}")))?;

        Ok(PortId::new(network, ne, layer, kind, number))
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NW={},NE={},Layer={},{}={}",
            self.network, self.ne, self.layer, self.kind, self.number
        )
    }
}

/// Filters ports by NE, layer and role; `None` matches anything
pub fn search_ports<'a, I>(
    ports: I,
    ne: Option<&str>,
    layer: Option<Layer>,
    kind: Option<PortKind>,
) -> Vec<PortId>
where
    I: IntoIterator<Item = &'a PortId>,
{
    ports
        .into_iter()
        .filter(|p| ne.map_or(true, |ne| p.ne == ne))
        .filter(|p| layer.map_or(true, |layer| p.layer == layer))
        .filter(|p| kind.map_or(true, |kind| p.kind == kind))
        .cloned()
        .collect()
}

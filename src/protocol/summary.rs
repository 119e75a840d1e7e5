use std::fmt;

use super::message::{Action, FlowMod, Instruction, OduSigid, OxmField};
use crate::highlight::LinkPair;

/// Fields of one side (match or actions) of a flow-mod
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldSet {
    /// Ingress port on the match side, egress port on the action side
    pub port: Option<u32>,
    pub odu_sigtype: Option<u8>,
    pub odu_sigid: Option<OduSigid>,
}

impl FieldSet {
    fn render(&self, port_label: &str) -> String {
        let mut parts = Vec::new();
        if let Some(port) = self.port {
            parts.push(format!("{port_label}{port}"));
        }
        if let Some(sigtype) = self.odu_sigtype {
            parts.push(format!("odu_sigtype={sigtype}"));
        }
        if let Some(sigid) = self.odu_sigid {
            parts.push(format!("odu_sigid={sigid}"));
        }
        parts.join(", ")
    }
}

/// What a flow-mod ADD asks the node to cross-connect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowModSummary {
    pub matched: FieldSet,
    pub actions: FieldSet,
}

impl FlowModSummary {
    /// Extracts the match and write-action fields
    ///
    /// Absent fields stay `None`. When an action is repeated the last one
    /// wins. Apply-actions are not interpreted.
    pub fn from_flow_mod(flow_mod: &FlowMod) -> Self {
        let mut summary = FlowModSummary::default();

        for field in &flow_mod.matches {
            match field {
                OxmField::InPort(port) => summary.matched.port = Some(*port),
                OxmField::OduSigtype(sigtype) => summary.matched.odu_sigtype = Some(*sigtype),
                OxmField::OduSigid(sigid) => summary.matched.odu_sigid = Some(*sigid),
                OxmField::Other { .. } => {}
            }
        }

        let write_actions = flow_mod.instructions.iter().filter_map(|i| match i {
            Instruction::WriteActions(actions) => Some(actions),
            _ => None,
        });
        for action in write_actions.flatten() {
            match action {
                Action::Output { port, .. } => summary.actions.port = Some(*port),
                Action::SetField(OxmField::OduSigtype(sigtype)) => {
                    summary.actions.odu_sigtype = Some(*sigtype)
                }
                Action::SetField(OxmField::OduSigid(sigid)) => {
                    summary.actions.odu_sigid = Some(*sigid)
                }
                _ => {}
            }
        }

        summary
    }

    /// The unordered ingress/egress pair, when both ports are known
    pub fn highlight_pair(&self) -> Option<LinkPair> {
        match (self.matched.port, self.actions.port) {
            (Some(ingress), Some(egress)) => Some(LinkPair::new(ingress, egress)),
            _ => None,
        }
    }
}

impl fmt::Display for FlowModSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[match] {}\n[actions] {}",
            self.matched.render("in_port="),
            self.actions.render("output=")
        )
    }
}

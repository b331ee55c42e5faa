//! Pipeline graph structure using daggy.
//!
//! The pipeline exclusively owns its elements, their pads and the links
//! between them. Graph mutation (adding elements, adding dynamic pads,
//! linking) happens on the controller thread only; elements reach the
//! controller through the bus and the signal hub.

use super::bus::Bus;
use super::factory::ElementFactory;
use super::message::Message;
use super::query::{Query, QueryTarget};
use super::state::StateMachine;
use crate::element::{Element, ElementContext, Pad, PadPresence, PadRef, SignalHub, Value};
use crate::error::{Error, Result};
use crate::event::{SeekEvent, StreamKind, TagList};
use crate::observability;
use daggy::petgraph::visit::EdgeRef;
use daggy::{Dag, NodeIndex};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

/// Unique identifier for a node in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) NodeIndex);

/// A node in the pipeline graph.
pub struct Node {
    /// Unique name of this node.
    pub(super) name: String,
    /// Factory kind the element was created from.
    kind: String,
    /// The element wrapped by this node.
    pub(super) element: Box<dyn Element>,
    /// Static and dynamic pads, in creation order.
    pads: Vec<Pad>,
}

impl Node {
    fn new(name: String, kind: String, element: Box<dyn Element>) -> Self {
        let pads = element.pads();
        Self {
            name,
            kind,
            element,
            pads,
        }
    }

    /// Get the node's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the element kind.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// All pads of this node.
    pub fn pads(&self) -> &[Pad] {
        &self.pads
    }

    /// Look up a pad by name.
    pub fn pad(&self, name: &str) -> Option<&Pad> {
        self.pads.iter().find(|p| p.name() == name)
    }

    fn pad_mut(&mut self, name: &str) -> Option<&mut Pad> {
        self.pads.iter_mut().find(|p| p.name() == name)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("pads", &self.pads.len())
            .finish()
    }
}

/// A link between two nodes in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Name of the source pad.
    pub src_pad: String,
    /// Name of the sink pad.
    pub sink_pad: String,
}

impl Link {
    /// Create a link with specific pad names.
    pub fn with_pads(src_pad: impl Into<String>, sink_pad: impl Into<String>) -> Self {
        Self {
            src_pad: src_pad.into(),
            sink_pad: sink_pad.into(),
        }
    }
}

/// A media pipeline represented as a directed acyclic graph.
pub struct Pipeline {
    pub(super) name: String,
    /// The DAG structure.
    pub(super) graph: Dag<Node, Link>,
    /// Name-to-NodeId mapping for quick lookup.
    nodes_by_name: HashMap<String, NodeId>,
    pub(super) bus: Bus,
    signals: SignalHub,
    pub(super) machine: StateMachine,
    /// Elements that took the in-flight step, synchronously or not.
    pub(super) entered: Vec<String>,
    /// Elements that answered `Pending` to the in-flight step.
    pub(super) awaiting: HashSet<String>,
    /// Bumped whenever a step is offered; shared with every element context.
    pub(super) transition: Arc<AtomicU64>,
}

impl Pipeline {
    /// Create a new empty pipeline with its own bus.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: Dag::new(),
            nodes_by_name: HashMap::new(),
            bus: Bus::new(),
            signals: SignalHub::new(),
            machine: StateMachine::new(),
            entered: Vec::new(),
            awaiting: HashSet::new(),
            transition: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Pipeline name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pipeline bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Signal hub shared with all elements.
    pub fn signals(&self) -> &SignalHub {
        &self.signals
    }

    pub(super) fn post(&self, message: Message) {
        if let Err(err) = self.bus.post(message) {
            tracing::debug!(pipeline = %self.name, error = %err, "message not posted");
        }
    }

    /// Add an element under a unique name.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        mut element: Box<dyn Element>,
    ) -> Result<NodeId> {
        let name = name.into();
        if self.nodes_by_name.contains_key(&name) {
            return Err(Error::DuplicateElement(name));
        }

        element.attach(
            ElementContext::new(name.clone(), self.bus.clone(), self.signals.clone())
                .with_transition_counter(Arc::clone(&self.transition)),
        );
        let node = Node::new(name.clone(), kind.into(), element);
        tracing::debug!(pipeline = %self.name, element = %name, kind = %node.kind, "element added");
        let id = NodeId(self.graph.add_node(node));
        self.nodes_by_name.insert(name, id);
        Ok(id)
    }

    /// Create an element through `factory` and add it.
    pub fn make(&mut self, factory: &ElementFactory, kind: &str, name: &str) -> Result<NodeId> {
        let element = factory.make(kind, name)?;
        self.add(name, kind, element)
    }

    fn node_id(&self, name: &str) -> Option<NodeId> {
        self.nodes_by_name.get(name).copied()
    }

    /// Get a node by name.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.node_id(name)
            .and_then(|id| self.graph.node_weight(id.0))
    }

    fn node_mut(&mut self, name: &str) -> Result<&mut Node> {
        let id = self
            .node_id(name)
            .ok_or_else(|| Error::ElementNotFound(name.to_string()))?;
        self.graph
            .node_weight_mut(id.0)
            .ok_or_else(|| Error::ElementNotFound(name.to_string()))
    }

    /// Look up a pad.
    pub fn pad(&self, pad: &PadRef) -> Option<&Pad> {
        self.node(&pad.element).and_then(|n| n.pad(&pad.pad))
    }

    /// Whether a pad is linked. Unknown pads count as unlinked.
    pub fn is_linked(&self, pad: &PadRef) -> bool {
        self.pad(pad).is_some_and(Pad::is_linked)
    }

    /// Register a dynamic pad on an element.
    pub fn add_pad(&mut self, element: &str, pad: Pad) -> Result<PadRef> {
        let node = self.node_mut(element)?;
        if node.pad(pad.name()).is_some() {
            return Err(Error::Pipeline(format!(
                "element '{}' already has a pad '{}'",
                element,
                pad.name()
            )));
        }
        let pad_ref = PadRef::new(element, pad.name());
        node.pads.push(pad);
        Ok(pad_ref)
    }

    /// Remove every dynamic pad of an element, unlinking them first.
    ///
    /// Used when an element is reset for new media.
    pub fn remove_dynamic_pads(&mut self, element: &str) -> Result<usize> {
        let dynamic: Vec<String> = self
            .node(element)
            .ok_or_else(|| Error::ElementNotFound(element.to_string()))?
            .pads()
            .iter()
            .filter(|p| p.presence() == PadPresence::Sometimes)
            .map(|p| p.name().to_string())
            .collect();

        for pad in &dynamic {
            self.unlink(&PadRef::new(element, pad.as_str()));
        }
        let node = self.node_mut(element)?;
        node.pads.retain(|p| p.presence() != PadPresence::Sometimes);
        Ok(dynamic.len())
    }

    /// Link a source pad to a sink pad.
    ///
    /// Fails if either pad is missing, directions do not match, either pad
    /// is already linked, the sink does not accept the source's media type,
    /// or the link would create a cycle.
    pub fn link_pads(&mut self, src: &PadRef, sink: &PadRef) -> Result<()> {
        let link_err = |reason: &str| Error::Link {
            src: src.to_string(),
            sink: sink.to_string(),
            reason: reason.to_string(),
        };

        let src_id = self
            .node_id(&src.element)
            .ok_or_else(|| Error::ElementNotFound(src.element.clone()))?;
        let sink_id = self
            .node_id(&sink.element)
            .ok_or_else(|| Error::ElementNotFound(sink.element.clone()))?;

        let src_pad = self.pad(src).ok_or_else(|| Error::PadNotFound {
            element: src.element.clone(),
            pad: src.pad.clone(),
        })?;
        let sink_pad = self.pad(sink).ok_or_else(|| Error::PadNotFound {
            element: sink.element.clone(),
            pad: sink.pad.clone(),
        })?;

        if !src_pad.is_src() || !sink_pad.is_sink() {
            return Err(link_err("wrong pad direction"));
        }
        if src_pad.is_linked() {
            return Err(link_err("source pad already linked"));
        }
        if sink_pad.is_linked() {
            return Err(link_err("sink pad already linked"));
        }
        if !sink_pad.accepts(src_pad.caps()) {
            return Err(link_err("incompatible media types"));
        }
        let caps = src_pad.caps().cloned();

        // Add edge (daggy ensures no cycles)
        self.graph
            .add_edge(src_id.0, sink_id.0, Link::with_pads(&src.pad, &sink.pad))
            .map_err(|_| link_err("linking would create a cycle"))?;

        if let Some(pad) = self.node_mut(&src.element)?.pad_mut(&src.pad) {
            pad.set_peer(Some(sink.clone()));
        }
        if let Some(pad) = self.node_mut(&sink.element)?.pad_mut(&sink.pad) {
            pad.set_peer(Some(src.clone()));
            pad.set_caps(caps);
        }

        observability::trace_link(&self.name, src, sink);
        Ok(())
    }

    /// Link two elements through their first free compatible pads.
    pub fn link(&mut self, src: &str, sink: &str) -> Result<()> {
        let src_node = self
            .node(src)
            .ok_or_else(|| Error::ElementNotFound(src.to_string()))?;
        let sink_node = self
            .node(sink)
            .ok_or_else(|| Error::ElementNotFound(sink.to_string()))?;

        let pair = src_node
            .pads()
            .iter()
            .filter(|p| p.is_src() && !p.is_linked() && p.presence() == PadPresence::Always)
            .find_map(|sp| {
                sink_node
                    .pads()
                    .iter()
                    .find(|kp| kp.is_sink() && !kp.is_linked() && kp.accepts(sp.caps()))
                    .map(|kp| (PadRef::new(src, sp.name()), PadRef::new(sink, kp.name())))
            });

        match pair {
            Some((src_pad, sink_pad)) => self.link_pads(&src_pad, &sink_pad),
            None => Err(Error::Link {
                src: src.to_string(),
                sink: sink.to_string(),
                reason: "no free compatible pads".to_string(),
            }),
        }
    }

    /// Link a chain of elements in order, stopping at the first failure.
    pub fn link_many(&mut self, names: &[&str]) -> Result<()> {
        for pair in names.windows(2) {
            self.link(pair[0], pair[1])?;
        }
        Ok(())
    }

    /// Remove the link attached to a pad, if any.
    pub fn unlink(&mut self, pad: &PadRef) -> bool {
        let Some(peer) = self.pad(pad).and_then(|p| p.peer()).cloned() else {
            return false;
        };
        let (src, sink) = if self.pad(pad).is_some_and(Pad::is_src) {
            (pad.clone(), peer)
        } else {
            (peer, pad.clone())
        };

        if let (Some(src_id), Some(sink_id)) =
            (self.node_id(&src.element), self.node_id(&sink.element))
        {
            let edge = self
                .graph
                .graph()
                .edges_connecting(src_id.0, sink_id.0)
                .find(|e| e.weight().src_pad == src.pad && e.weight().sink_pad == sink.pad)
                .map(|e| e.id());
            if let Some(edge) = edge {
                self.graph.remove_edge(edge);
            }
        }

        for end in [&src, &sink] {
            if let Ok(node) = self.node_mut(&end.element) {
                if let Some(p) = node.pad_mut(&end.pad) {
                    p.set_peer(None);
                }
            }
        }
        tracing::debug!(pipeline = %self.name, src = %src, sink = %sink, "unlinked");
        true
    }

    /// Set a property on an element.
    pub fn set_property(&mut self, element: &str, name: &str, value: impl Into<Value>) -> Result<()> {
        let node = self.node_mut(element)?;
        node.element
            .set_property(name, value.into())
            .map_err(|source| Error::Property {
                element: element.to_string(),
                name: name.to_string(),
                source,
            })
    }

    /// Read a property from an element.
    pub fn property(&self, element: &str, name: &str) -> Option<Value> {
        self.node(element).and_then(|n| n.element.property(name))
    }

    /// Tags of one stream exposed by an element.
    pub fn stream_tags(&self, element: &str, kind: StreamKind, index: usize) -> Option<TagList> {
        self.node(element)
            .and_then(|n| n.element.stream_tags(kind, index))
    }

    /// Get the number of nodes in the pipeline.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of edges (links) in the pipeline.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes ordered sinks first: every node comes before its upstream peers.
    pub(super) fn state_order(&self) -> Vec<NodeId> {
        let mut order = daggy::petgraph::algo::toposort(self.graph.graph(), None)
            .unwrap_or_else(|_| self.graph.graph().node_indices().collect());
        order.reverse();
        order.into_iter().map(NodeId).collect()
    }
}

impl QueryTarget for Pipeline {
    /// Sinks are asked first; the first element that answers wins.
    fn query(&self, query: &mut Query) -> bool {
        for id in self.state_order() {
            if let Some(node) = self.graph.node_weight(id.0) {
                if node.element.query(query) {
                    return true;
                }
            }
        }
        false
    }

    /// Every element sees the seek; it succeeds if any element handled it.
    fn send_seek(&mut self, event: &SeekEvent) -> bool {
        let mut handled = false;
        for id in self.state_order() {
            if let Some(node) = self.graph.node_weight_mut(id.0) {
                handled |= node.element.seek(event);
            }
        }
        handled
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new("pipeline")
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .field("state", &self.machine.current())
            .finish()
    }
}

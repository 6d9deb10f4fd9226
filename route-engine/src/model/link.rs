//! A road graph and a transit graph joined by link edges.

use std::collections::HashMap;

use tracing::debug;

use super::edge::{CoreEdge, Edge, LinkEdge, RoadEdge, TransitEdge};
use super::graph::{detach, Graph, MutableGraph};
use super::node::{CoreNode, RoadNode, TransitNode};
use super::road::RoadGraph;
use super::transit::TransitGraph;

/// Overlay of a road graph and a transit graph.
///
/// The node set is the union of both sub-graphs. Link edges live in their
/// own table and follow the orientation of the whole graph, so reversing
/// the link graph reverses roads, transit and links together.
///
/// # Examples
///
/// ```
/// use route_engine::model::{
///     CoreNode, Graph, LinkGraph, ModeSet, MutableGraph, RoadEdge, RoadGraph, RoadNode,
///     TransitGraph, TransitNode,
/// };
///
/// let hub = RoadNode::new(0, 48.0, 7.8);
/// let other = RoadNode::new(1, 48.0, 7.81);
/// let mut road = RoadGraph::new();
/// road.add_edge(RoadEdge::new(0, hub, other, 700.0, 50.0, ModeSet::all()));
///
/// let stop = TransitNode::new(0, 48.0, 7.8, 8 * 3600);
/// let mut transit = TransitGraph::new();
/// transit.add_node(stop);
///
/// let mut graph = LinkGraph::new(road, transit);
/// assert_eq!(graph.initialize_hub_connections([(hub, vec![stop])]), 2);
/// assert_eq!(graph.size(), 3);
/// assert_eq!(graph.edge_count(), 3);
/// assert_eq!(graph.outgoing_edges(CoreNode::Road(hub)).count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct LinkGraph {
    road: RoadGraph<RoadNode, RoadEdge>,
    transit: TransitGraph<TransitNode, TransitEdge>,
    /// Links in their original orientation, keyed by original source.
    outgoing_links: HashMap<CoreNode, Vec<LinkEdge>>,
    /// Links in their original orientation, keyed by original destination.
    incoming_links: HashMap<CoreNode, Vec<LinkEdge>>,
    link_count: usize,
    reversed: bool,
}

impl LinkGraph {
    /// Join two graphs. The transit graph is brought into the orientation
    /// of the road graph if they differ.
    pub fn new(
        road: RoadGraph<RoadNode, RoadEdge>,
        mut transit: TransitGraph<TransitNode, TransitEdge>,
    ) -> Self {
        if transit.is_reversed() != road.is_reversed() {
            transit.reverse();
        }
        let reversed = road.is_reversed();
        Self {
            road,
            transit,
            outgoing_links: HashMap::new(),
            incoming_links: HashMap::new(),
            link_count: 0,
            reversed,
        }
    }

    pub fn road_graph(&self) -> &RoadGraph<RoadNode, RoadEdge> {
        &self.road
    }

    pub fn transit_graph(&self) -> &TransitGraph<TransitNode, TransitEdge> {
        &self.transit
    }

    pub fn link_count(&self) -> usize {
        self.link_count
    }

    /// Connect every hub to its transit nodes with one link in each
    /// direction. Returns the number of links that were added.
    pub fn initialize_hub_connections<I, T>(&mut self, mapping: I) -> usize
    where
        I: IntoIterator<Item = (RoadNode, T)>,
        T: IntoIterator<Item = TransitNode>,
    {
        let mut added = 0;
        for (hub, transit_nodes) in mapping {
            let hub = CoreNode::Road(hub);
            for transit_node in transit_nodes {
                let transit_node = CoreNode::Transit(transit_node);
                for link in [
                    LinkEdge::new(hub, transit_node),
                    LinkEdge::new(transit_node, hub),
                ] {
                    if self.add_link(link) {
                        added += 1;
                    }
                }
            }
        }
        debug!(links = added, total = self.link_count, "initialized hub connections");
        added
    }

    fn oriented(&self, link: &LinkEdge) -> LinkEdge {
        if self.reversed {
            link.reversed()
        } else {
            *link
        }
    }

    fn links(&self, node: CoreNode, outgoing: bool) -> impl Iterator<Item = CoreEdge> + '_ {
        let lists = if outgoing != self.reversed {
            &self.outgoing_links
        } else {
            &self.incoming_links
        };
        lists
            .get(&node)
            .into_iter()
            .flatten()
            .map(move |link| CoreEdge::Link(self.oriented(link)))
    }

    fn add_link(&mut self, link: LinkEdge) -> bool {
        let stored = self.oriented(&link);
        if self
            .outgoing_links
            .get(&stored.source)
            .is_some_and(|list| list.contains(&stored))
        {
            return false;
        }
        self.add_node(stored.source);
        self.add_node(stored.destination);
        self.outgoing_links
            .entry(stored.source)
            .or_default()
            .push(stored);
        self.incoming_links
            .entry(stored.destination)
            .or_default()
            .push(stored);
        self.link_count += 1;
        true
    }

    fn remove_link(&mut self, link: &LinkEdge) -> bool {
        let stored = self.oriented(link);
        if !detach(&mut self.outgoing_links, stored.source, &stored) {
            return false;
        }
        detach(&mut self.incoming_links, stored.destination, &stored);
        self.link_count -= 1;
        true
    }

    fn remove_links_of(&mut self, node: CoreNode) {
        for link in self.outgoing_links.remove(&node).unwrap_or_default() {
            detach(&mut self.incoming_links, link.destination, &link);
            self.link_count -= 1;
        }
        for link in self.incoming_links.remove(&node).unwrap_or_default() {
            detach(&mut self.outgoing_links, link.source, &link);
            self.link_count -= 1;
        }
    }
}

impl Graph for LinkGraph {
    type Node = CoreNode;
    type Edge = CoreEdge;

    fn nodes(&self) -> impl Iterator<Item = CoreNode> + '_ {
        self.road
            .nodes()
            .map(CoreNode::Road)
            .chain(self.transit.nodes().map(CoreNode::Transit))
    }

    fn edges(&self) -> impl Iterator<Item = CoreEdge> + '_ {
        self.road
            .edges()
            .map(CoreEdge::Road)
            .chain(self.transit.edges().map(CoreEdge::Transit))
            .chain(self.nodes().flat_map(move |node| self.links(node, true)))
    }

    fn contains_node(&self, node: CoreNode) -> bool {
        match node {
            CoreNode::Road(node) => self.road.contains_node(node),
            CoreNode::Transit(node) => self.transit.contains_node(node),
        }
    }

    fn outgoing_edges(&self, node: CoreNode) -> impl Iterator<Item = CoreEdge> + '_ {
        let road = node
            .as_road()
            .into_iter()
            .flat_map(move |node| self.road.outgoing_edges(node))
            .map(CoreEdge::Road);
        let transit = node
            .as_transit()
            .into_iter()
            .flat_map(move |node| self.transit.outgoing_edges(node))
            .map(CoreEdge::Transit);
        road.chain(transit).chain(self.links(node, true))
    }

    fn incoming_edges(&self, node: CoreNode) -> impl Iterator<Item = CoreEdge> + '_ {
        let road = node
            .as_road()
            .into_iter()
            .flat_map(move |node| self.road.incoming_edges(node))
            .map(CoreEdge::Road);
        let transit = node
            .as_transit()
            .into_iter()
            .flat_map(move |node| self.transit.incoming_edges(node))
            .map(CoreEdge::Transit);
        road.chain(transit).chain(self.links(node, false))
    }

    fn size(&self) -> usize {
        self.road.size() + self.transit.size()
    }

    fn edge_count(&self) -> usize {
        self.road.edge_count() + self.transit.edge_count() + self.link_count
    }

    fn is_reversed(&self) -> bool {
        self.reversed
    }

    fn contains_edge(&self, edge: &CoreEdge) -> bool {
        match edge {
            CoreEdge::Road(edge) => self.road.contains_edge(edge),
            CoreEdge::Transit(edge) => self.transit.contains_edge(edge),
            CoreEdge::Link(link) => {
                let stored = self.oriented(link);
                self.outgoing_links
                    .get(&stored.source)
                    .is_some_and(|list| list.contains(&stored))
            }
        }
    }

    fn size_information(&self) -> String {
        format!(
            "#nodes: {}, #edges: {} (road: {}, transit: {}, links: {})",
            self.size(),
            self.edge_count(),
            self.road.size_information(),
            self.transit.size_information(),
            self.link_count
        )
    }
}

impl MutableGraph for LinkGraph {
    fn add_node(&mut self, node: CoreNode) -> bool {
        match node {
            CoreNode::Road(node) => self.road.add_node(node),
            CoreNode::Transit(node) => self.transit.add_node(node),
        }
    }

    fn add_edge(&mut self, edge: CoreEdge) -> bool {
        match edge {
            CoreEdge::Road(edge) => self.road.add_edge(edge),
            CoreEdge::Transit(edge) => self.transit.add_edge(edge),
            CoreEdge::Link(link) => self.add_link(link),
        }
    }

    fn remove_node(&mut self, node: CoreNode) -> bool {
        let removed = match node {
            CoreNode::Road(node) => self.road.remove_node(node),
            CoreNode::Transit(node) => self.transit.remove_node(node),
        };
        if removed {
            self.remove_links_of(node);
        }
        removed
    }

    fn remove_edge(&mut self, edge: &CoreEdge) -> bool {
        match edge {
            CoreEdge::Road(edge) => self.road.remove_edge(edge),
            CoreEdge::Transit(edge) => self.transit.remove_edge(edge),
            CoreEdge::Link(link) => self.remove_link(link),
        }
    }

    fn reverse(&mut self) {
        self.road.reverse();
        self.transit.reverse();
        self.reversed = !self.reversed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModeSet;

    fn hub() -> RoadNode {
        RoadNode::new(0, 48.0, 7.80)
    }

    fn far() -> RoadNode {
        RoadNode::new(1, 48.0, 7.81)
    }

    fn departure() -> TransitNode {
        TransitNode::new(0, 48.0, 7.80, 3600)
    }

    fn arrival() -> TransitNode {
        TransitNode::new(1, 48.0, 7.81, 3900)
    }

    fn sample() -> LinkGraph {
        let mut road = RoadGraph::new();
        road.add_edge(RoadEdge::new(0, hub(), far(), 740.0, 50.0, ModeSet::all()));

        let mut transit = TransitGraph::new();
        transit.add_edge(TransitEdge::ride(0, departure(), arrival()));

        let mut graph = LinkGraph::new(road, transit);
        graph.initialize_hub_connections([(hub(), vec![departure()]), (far(), vec![arrival()])]);
        graph
    }

    fn link(source: impl Into<CoreNode>, destination: impl Into<CoreNode>) -> CoreEdge {
        CoreEdge::Link(LinkEdge::new(source.into(), destination.into()))
    }

    #[test]
    fn counts_merge_sub_graphs_and_links() {
        let graph = sample();
        assert_eq!(graph.size(), 4);
        assert_eq!(graph.link_count(), 4);
        assert_eq!(graph.edge_count(), 6);
        assert_eq!(graph.edges().count(), 6);
    }

    #[test]
    fn hub_connections_are_idempotent() {
        let mut graph = sample();
        assert_eq!(graph.initialize_hub_connections([(hub(), vec![departure()])]), 0);
        assert_eq!(graph.link_count(), 4);
    }

    #[test]
    fn adjacency_merges_links() {
        let graph = sample();
        let outgoing: Vec<CoreEdge> = graph.outgoing_edges(CoreNode::Road(hub())).collect();
        assert_eq!(outgoing.len(), 2);
        assert!(outgoing.contains(&link(hub(), departure())));

        let incoming: Vec<CoreEdge> = graph
            .incoming_edges(CoreNode::Transit(arrival()))
            .collect();
        assert_eq!(incoming.len(), 2);
        assert!(incoming.contains(&link(far(), arrival())));
    }

    #[test]
    fn reversal_applies_to_links() {
        let mut graph = sample();
        graph.reverse();

        assert!(graph.is_reversed());
        let from_departure: Vec<CoreEdge> = graph
            .outgoing_edges(CoreNode::Transit(departure()))
            .collect();
        // reversed ride back to nothing, reversed link to the hub
        assert!(from_departure.contains(&link(departure(), hub())));
        assert!(from_departure.iter().all(|edge| edge.source() == CoreNode::Transit(departure())));

        let from_arrival: Vec<CoreEdge> = graph
            .outgoing_edges(CoreNode::Transit(arrival()))
            .collect();
        assert_eq!(from_arrival.len(), 2);
        assert!(from_arrival
            .iter()
            .any(|edge| edge.destination() == CoreNode::Transit(departure())));

        graph.reverse();
        assert!(!graph.is_reversed());
        assert!(graph.contains_edge(&link(hub(), departure())));
    }

    #[test]
    fn removing_a_node_removes_its_links() {
        let mut graph = sample();
        assert!(graph.remove_node(CoreNode::Road(hub())));
        assert_eq!(graph.link_count(), 2);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.outgoing_edges(CoreNode::Transit(departure())).count(), 1);
    }

    #[test]
    fn remove_link_edge() {
        let mut graph = sample();
        assert!(graph.remove_edge(&link(hub(), departure())));
        assert!(!graph.contains_edge(&link(hub(), departure())));
        assert!(graph.contains_edge(&link(departure(), hub())));
        assert_eq!(graph.link_count(), 3);
    }
}

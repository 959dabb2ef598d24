//! Layered feed-forward network topologies.
//!
//! Text format: one line of whitespace-separated weights per node, bias
//! first; a `#` line starts the next layer; `=1 i j …` declares an
//! exactly-one group over input nodes (1-based). The first weight line
//! implicitly creates the input layer, one node per non-bias weight.
//!
//! Compilation names the nodes `l<layer>_<node>` (1-based). Input nodes
//! are crisp; every non-input layer gets a pinned bias node `bias_l<k>`
//! sitting at the maximal degree and feeding each node of the next layer
//! with its bias weight.

use gradus_core::{BreakpointTable, DependencyGraph, GraphBuilder, NodeId, Real};

use crate::error::{ModelError, Result};

/// A layered topology under construction or parsed from text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkTopology {
    /// `layers[l][n]` is the node's incoming weight row (empty for inputs).
    layers: Vec<Vec<Vec<Real>>>,
    /// Exactly-one groups over 1-based input node indices.
    exactly_one: Vec<Vec<usize>>,
}

impl NetworkTopology {
    /// Creates an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new layer.
    pub fn add_layer(&mut self) -> &mut Self {
        self.layers.push(Vec::new());
        self
    }

    /// Adds a weightless node to the input layer.
    pub fn add_input_node(&mut self) -> Result<&mut Self> {
        match self.layers.len() {
            0 => Err(ModelError::Shape("add a layer before adding nodes".into())),
            1 => {
                self.layers[0].push(Vec::new());
                Ok(self)
            }
            _ => Err(ModelError::Shape(
                "input nodes belong to the first layer only".into(),
            )),
        }
    }

    /// Adds a weighted node (bias first) to the current non-input layer.
    pub fn add_node(&mut self, weights: Vec<Real>) -> Result<&mut Self> {
        if self.layers.len() < 2 {
            return Err(ModelError::Shape(
                "weighted nodes belong to layers after the first".into(),
            ));
        }
        let previous = self.layers[self.layers.len() - 2].len();
        if weights.len() != previous + 1 {
            return Err(ModelError::Shape(format!(
                "expected {} weights (bias + previous layer), got {}",
                previous + 1,
                weights.len()
            )));
        }
        let last = self.layers.len() - 1;
        self.layers[last].push(weights);
        Ok(self)
    }

    /// Declares an exactly-one group over 1-based input node indices.
    pub fn add_exactly_one(&mut self, nodes: Vec<usize>) -> Result<&mut Self> {
        let inputs = self.layers.first().map_or(0, Vec::len);
        if nodes.is_empty() || nodes.iter().any(|n| *n < 1 || *n > inputs) {
            return Err(ModelError::Shape(format!(
                "exactly-one members must name input nodes 1..={inputs}"
            )));
        }
        self.exactly_one.push(nodes);
        Ok(self)
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Number of nodes in a 0-based layer.
    pub fn node_count(&self, layer: usize) -> usize {
        self.layers[layer].len()
    }

    /// The incoming weight row of a node (bias first), 0-based.
    pub fn weights(&self, layer: usize, node: usize) -> &[Real] {
        &self.layers[layer][node]
    }

    /// The exactly-one groups, as written.
    pub fn exactly_one_groups(&self) -> &[Vec<usize>] {
        &self.exactly_one
    }

    /// Parses the text format.
    pub fn parse(text: &str) -> Result<Self> {
        let mut network = NetworkTopology::new();
        network.add_layer();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let number = index + 1;
            if line == "#" {
                network.add_layer();
                continue;
            }
            if let Some(rest) = line.strip_prefix("=1") {
                let nodes = rest
                    .split_whitespace()
                    .map(|token| {
                        token
                            .parse::<usize>()
                            .map_err(|_| ModelError::parse(number, format!("bad index `{token}`")))
                    })
                    .collect::<Result<Vec<_>>>()?;
                network.add_exactly_one(nodes)?;
                continue;
            }
            let weights = line
                .split_whitespace()
                .map(|token| {
                    token
                        .parse::<Real>()
                        .map_err(|_| ModelError::parse(number, format!("bad weight `{token}`")))
                })
                .collect::<Result<Vec<_>>>()?;
            if network.layer_count() == 1 {
                for _ in 1..weights.len() {
                    network.add_input_node()?;
                }
                network.add_layer();
            }
            network.add_node(weights)?;
        }
        if network.layers[0].is_empty() {
            return Err(ModelError::EmptyNetwork);
        }
        Ok(network)
    }

    /// Compiles into a dependency graph validated against `table`.
    pub fn compile(&self, table: &BreakpointTable) -> Result<DependencyGraph> {
        if self.layers.is_empty() || self.layers[0].is_empty() {
            return Err(ModelError::EmptyNetwork);
        }
        let mut builder = GraphBuilder::new();
        let mut ids: Vec<Vec<NodeId>> = Vec::new();
        for (layer, nodes) in self.layers.iter().enumerate() {
            let row = (0..nodes.len())
                .map(|node| builder.add_node(format!("l{}_{}", layer + 1, node + 1), layer == 0))
                .collect::<gradus_core::Result<Vec<_>>>()?;
            ids.push(row);
        }
        for (layer, nodes) in self.layers.iter().enumerate().skip(1) {
            let bias = builder.add_node(format!("bias_l{layer}"), true)?;
            builder.add_exactly_one(vec![bias]);
            for (node, weights) in nodes.iter().enumerate() {
                let target = ids[layer][node];
                builder.add_edge(target, bias, weights[0])?;
                for (source, weight) in weights[1..].iter().enumerate() {
                    builder.add_edge(target, ids[layer - 1][source], *weight)?;
                }
            }
        }
        for group in &self.exactly_one {
            let members = group.iter().map(|index| ids[0][index - 1]).collect();
            builder.add_exactly_one(members);
        }
        Ok(builder.build(table)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_layers_three_nodes() -> NetworkTopology {
        let mut network = NetworkTopology::new();
        network.add_layer();
        network.add_input_node().unwrap();
        network.add_input_node().unwrap();
        network.add_layer();
        network
            .add_node(vec![
                Real::from_int(10),
                Real::from_int(20),
                Real::from_int(-10),
            ])
            .unwrap();
        network
    }

    #[test]
    fn nodes_need_a_layer_first() {
        assert!(matches!(
            NetworkTopology::new().add_input_node(),
            Err(ModelError::Shape(_))
        ));
        let mut network = NetworkTopology::new();
        network.add_layer();
        network.add_input_node().unwrap();
        assert_eq!(network.layer_count(), 1);
        assert_eq!(network.node_count(0), 1);
    }

    #[test]
    fn builds_two_layers_three_nodes() {
        let network = two_layers_three_nodes();
        assert_eq!(network.layer_count(), 2);
        assert_eq!(network.node_count(0), 2);
        assert_eq!(network.node_count(1), 1);
        assert_eq!(
            network.weights(1, 0),
            &[
                Real::from_int(10),
                Real::from_int(20),
                Real::from_int(-10)
            ]
        );
    }

    #[test]
    fn parses_a_single_weight_line() {
        let network = NetworkTopology::parse("\n10 20 -10\n").unwrap();
        assert_eq!(network, two_layers_three_nodes());
    }

    #[test]
    fn parses_exactly_one_groups() {
        let network = NetworkTopology::parse("10 20 -10\n=1 1 2\n").unwrap();
        let mut expected = two_layers_three_nodes();
        expected.add_exactly_one(vec![1, 2]).unwrap();
        assert_eq!(network, expected);
    }

    #[test]
    fn rejects_bad_weight_rows() {
        let mut network = NetworkTopology::new();
        network.add_layer();
        network.add_input_node().unwrap();
        network.add_layer();
        assert!(matches!(
            network.add_node(vec![Real::from_int(1)]),
            Err(ModelError::Shape(_))
        ));
        assert!(NetworkTopology::parse("nonsense here\n").is_err());
    }

    #[test]
    fn compiles_with_crisp_inputs_and_pinned_bias() {
        let network = NetworkTopology::parse("10 20 -10\n=1 1 2\n").unwrap();
        let table = BreakpointTable::default();
        let graph = network.compile(&table).unwrap();

        let in1 = graph.node("l1_1").unwrap();
        let in2 = graph.node("l1_2").unwrap();
        let out = graph.node("l2_1").unwrap();
        let bias = graph.node("bias_l1").unwrap();
        assert!(graph.is_crisp(in1) && graph.is_crisp(in2) && graph.is_crisp(bias));
        assert!(!graph.is_crisp(out));

        let incoming = graph.incoming(out);
        assert_eq!(incoming.len(), 3);
        assert_eq!(incoming[0].source, bias);
        assert_eq!(incoming[0].weight, Real::from_int(10));
        assert_eq!(incoming[2].weight, Real::from_int(-10));

        // The bias group pins it at the maximal degree; the declared
        // group covers the two inputs.
        assert_eq!(graph.exactly_one_groups(), &[vec![bias], vec![in1, in2]]);
    }
}

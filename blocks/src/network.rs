use std::fmt;

/// A phylogenetic network: labeled nodes joined by weighted, undirected edges.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetworkBlock {
    labels: Vec<Option<String>>,
    edges: Vec<(usize, usize, f64)>,
}

impl NetworkBlock {
    pub fn add_node(&mut self, label: Option<String>) -> usize {
        self.labels.push(label);
        self.labels.len() - 1
    }

    pub fn add_edge(&mut self, a: usize, b: usize, weight: f64) {
        self.edges.push((a, b, weight));
    }

    pub fn num_nodes(&self) -> usize {
        self.labels.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn label(&self, v: usize) -> Option<&str> {
        self.labels[v].as_deref()
    }

    pub fn edges(&self) -> &[(usize, usize, f64)] {
        &self.edges
    }
}

impl fmt::Display for NetworkBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[nnodes={} nedges={}]", self.num_nodes(), self.num_edges())?;
        for (a, b, w) in &self.edges {
            writeln!(f, "{:>4} -- {:<4} {w:.6}", a + 1, b + 1)?;
        }
        Ok(())
    }
}

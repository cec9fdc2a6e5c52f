use std::fmt;

/// A directed, weighted edge of a [`PhyloTree`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeEdge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct TreeNode {
    label: Option<String>,
    taxon: Option<usize>,
    children: Vec<usize>,
}

/// A tree stored as a node arena; edges point away from the root.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhyloTree {
    name: String,
    nodes: Vec<TreeNode>,
    edges: Vec<TreeEdge>,
    root: usize,
}

impl PhyloTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a leaf for the (0-based) taxon `taxon`, labeled `label`.
    pub fn add_leaf(&mut self, taxon: usize, label: impl Into<String>) -> usize {
        self.nodes.push(TreeNode {
            label: Some(label.into()),
            taxon: Some(taxon),
            children: Vec::with_capacity(0),
        });
        self.nodes.len() - 1
    }

    /// Add an unlabeled internal node.
    pub fn add_internal(&mut self) -> usize {
        self.nodes.push(TreeNode::default());
        self.nodes.len() - 1
    }

    pub fn add_edge(&mut self, source: usize, target: usize, weight: f64) {
        self.nodes[source].children.push(target);
        self.edges.push(TreeEdge {
            source,
            target,
            weight,
        });
    }

    pub fn set_root(&mut self, root: usize) {
        self.root = root;
    }

    #[inline]
    pub fn root(&self) -> usize {
        self.root
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges(&self) -> &[TreeEdge] {
        &self.edges
    }

    pub fn children(&self, v: usize) -> &[usize] {
        &self.nodes[v].children
    }

    pub fn taxon(&self, v: usize) -> Option<usize> {
        self.nodes[v].taxon
    }

    /// Taxa (0-based) of all leaves at or below node `v`.
    pub fn taxa_below(&self, v: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![v];
        while let Some(w) = stack.pop() {
            if let Some(t) = self.nodes[w].taxon {
                out.push(t);
            }
            stack.extend_from_slice(&self.nodes[w].children);
        }
        out.sort_unstable();
        out
    }

    /// Newick representation, ending with ';'.
    pub fn to_newick(&self) -> String {
        let mut out = String::with_capacity(16 * self.nodes.len());
        if !self.nodes.is_empty() {
            self.write_newick(self.root, &mut out);
        }
        out.push(';');
        out
    }

    fn write_newick(&self, v: usize, out: &mut String) {
        let node = &self.nodes[v];
        if !node.children.is_empty() {
            out.push('(');
            for (i, &w) in node.children.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                self.write_newick(w, out);
                if let Some(edge) = self.edges.iter().find(|e| e.source == v && e.target == w) {
                    out.push_str(&format!(":{}", format_weight(edge.weight)));
                }
            }
            out.push(')');
        }
        if let Some(label) = &node.label {
            out.push_str(label);
        }
    }
}

// trim trailing zeros so newick output stays readable:
fn format_weight(w: f64) -> String {
    let s = format!("{w:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_owned()
    } else {
        s.to_owned()
    }
}

/// A list of trees over the same taxa.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreesBlock {
    trees: Vec<PhyloTree>,
    rooted: bool,
}

impl TreesBlock {
    pub fn new(trees: Vec<PhyloTree>, rooted: bool) -> Self {
        Self { trees, rooted }
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn is_rooted(&self) -> bool {
        self.rooted
    }

    /// Get the tree at (0-based) index `i`.
    pub fn get(&self, i: usize) -> Option<&PhyloTree> {
        self.trees.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PhyloTree> {
        self.trees.iter()
    }
}

impl fmt::Display for TreesBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[ntrees={} rooted={}]", self.trees.len(), self.rooted)?;
        for tree in &self.trees {
            writeln!(f, "tree '{}' = {}", tree.name, tree.to_newick())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::PhyloTree;

    #[test]
    fn test_newick() {
        let mut tree = PhyloTree::new("t");
        let root = tree.add_internal();
        let a = tree.add_leaf(0, "a");
        let inner = tree.add_internal();
        let b = tree.add_leaf(1, "b");
        let c = tree.add_leaf(2, "c");
        tree.add_edge(root, a, 1.0);
        tree.add_edge(root, inner, 0.5);
        tree.add_edge(inner, b, 0.25);
        tree.add_edge(inner, c, 2.125);
        tree.set_root(root);
        assert_eq!("(a:1,(b:0.25,c:2.125):0.5);", tree.to_newick());
        assert_eq!(vec![1, 2], tree.taxa_below(inner));
    }
}

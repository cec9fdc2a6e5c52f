/// type alias just to make type signatures look more consistent.
pub type Ident<'a> = &'a str;

/// `name: value` pairs given in brackets after an algorithm.
pub type Options<'a> = Vec<(Ident<'a>, &'a str)>;

/// One line of a matrix block: the taxon name, followed by its values.
/// Characters rows may be split into several whitespace-separated chunks.
pub type Row<'a> = (&'a str, Vec<&'a str>);

/// Sets the options of the filter directly below a node, creating the
/// filter if there is none:
///
/// ```text
/// filter input_taxa = TaxaFilter [exclude: C]
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct Filter<'a> {
    /// Node whose filter is configured
    pub target: Ident<'a>,
    /// Algorithm name
    pub algorithm: Ident<'a>,
    pub options: Options<'a>,
}

/// A named analysis step:
///
/// ```text
/// tree = NeighborJoining(dist) [option: value]
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct Step<'a> {
    /// Name of the node this step produces
    pub name: Ident<'a>,
    /// Algorithm name
    pub algorithm: Ident<'a>,
    /// Names of the input nodes; a second parent follows the taxa it reads.
    pub parents: Vec<Ident<'a>>,
    pub options: Options<'a>,
}

/// One high-level item in a document.
#[derive(Debug, PartialEq, Eq)]
pub enum Item<'a> {
    /// `taxa { A B C }`
    Taxa(Vec<&'a str>),
    /// `characters dna { ... }`
    Characters {
        data_type: Ident<'a>,
        rows: Vec<Row<'a>>,
    },
    /// `distances { ... }`, one full matrix row per taxon
    Distances(Vec<Row<'a>>),
    Filter(Filter<'a>),
    Step(Step<'a>),
}

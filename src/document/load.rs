use anyhow::{Context, Result};

use algorithms::{registry, TaxaFilter};
use blocks::{CharactersBlock, DataBlock, DistancesBlock, TaxaBlock};
use syntax::ast::{self, Item, Row};
use workflow::Workflow;

use super::{Document, Error, INPUT_DATA, INPUT_TAXA, WORKING_DATA, WORKING_TAXA};

/// Largest difference tolerated between `d(i, j)` and `d(j, i)`.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

impl Document {
    /// Parse `text` and build its graph in `workflow`, which must be empty.
    ///
    /// Items are applied in order, so a step can only read nodes named
    /// above it. Once the graph is complete, everything is recomputed.
    pub fn load(text: &str, workflow: Workflow) -> Result<Self> {
        let items = syntax::parse(text)?;
        let mut doc = Self::new(workflow);

        let (taxa, data) = input_blocks(&items)?;
        let kind = data.kind();
        doc.workflow.setup_input(
            taxa,
            data,
            Box::new(TaxaFilter::default()),
            registry::top_filter(kind)?,
        )?;
        let roots = [
            (INPUT_TAXA, doc.workflow.input_taxa_node()),
            (WORKING_TAXA, doc.workflow.working_taxa_node()),
            (INPUT_DATA, doc.workflow.input_data_node()),
            (WORKING_DATA, doc.workflow.working_data_node()),
        ];
        for (name, node) in roots {
            if let Some(node) = node {
                doc.insert_name(name, node)?;
            }
        }

        for item in &items {
            match item {
                Item::Filter(filter) => doc
                    .apply_filter(filter)
                    .with_context(|| format!("while configuring filter of \"{}\"", filter.target))?,
                Item::Step(step) => doc
                    .apply_step(step)
                    .with_context(|| format!("while creating step \"{}\"", step.name))?,
                _ => (),
            }
        }

        doc.workflow.recompute_all()?;
        log::info!(
            "loaded workflow with {} data nodes and {} connectors",
            doc.workflow.num_data_nodes(),
            doc.workflow.num_connectors()
        );
        Ok(doc)
    }

    fn apply_filter(&mut self, filter: &ast::Filter) -> Result<()> {
        let node = self.node(filter.target)?;
        let algorithm = registry::create(filter.algorithm)?;
        let connector = self.workflow.find_or_insert_filter(node, || algorithm)?;

        let found = self.workflow.connector(connector)?.algorithm().name();
        if !found.eq_ignore_ascii_case(filter.algorithm) {
            return Err(Error::FilterMismatch {
                node: filter.target.to_owned(),
                expected: filter.algorithm.to_owned(),
                found,
            }
            .into());
        }
        for (name, value) in &filter.options {
            self.workflow.set_option(connector, name, value)?;
        }
        Ok(())
    }

    fn apply_step(&mut self, step: &ast::Step) -> Result<()> {
        if self.names.contains_key(step.name) {
            return Err(Error::DuplicateName(step.name.to_owned()).into());
        }
        let parents = step
            .parents
            .iter()
            .map(|name| self.node(name))
            .collect::<Result<Vec<_>, Error>>()?;

        // options go in before the connector exists, so nothing runs twice:
        let mut algorithm = registry::create(step.algorithm)?;
        for (name, value) in &step.options {
            algorithm.set_option(name, value)?;
        }

        let child = self.workflow.create_pending_node(algorithm.to_kind());
        self.workflow.create_connector(&parents, child, algorithm)?;
        self.insert_name(step.name, child)?;
        Ok(())
    }
}

/// Taxa and data blocks of a document. Without a taxa block, the taxa are
/// the row names of the data matrix, in order.
fn input_blocks(items: &[Item]) -> Result<(TaxaBlock, DataBlock)> {
    let mut taxa = None;
    let mut data = None;
    for item in items {
        match item {
            Item::Taxa(names) => {
                if taxa.replace(names).is_some() {
                    return Err(Error::DuplicateBlock("taxa").into());
                }
            }
            Item::Characters { .. } | Item::Distances(_) => {
                if data.replace(item).is_some() {
                    return Err(Error::DuplicateBlock("data").into());
                }
            }
            _ => (),
        }
    }

    let data = data.ok_or(Error::NoData)?;
    let rows = match data {
        Item::Characters { rows, .. } => rows,
        Item::Distances(rows) => rows,
        _ => return Err(Error::NoData.into()),
    };
    let names: Vec<&str> = match taxa {
        Some(names) => names.clone(),
        None => rows.iter().map(|(name, _)| *name).collect(),
    };
    let rows = ordered_rows(&names, rows)?;

    let block = match data {
        Item::Characters { data_type, .. } => {
            let sequences: Vec<String> = rows.iter().map(|(_, chunks)| chunks.concat()).collect();
            DataBlock::Characters(CharactersBlock::new(data_type.parse()?, sequences)?)
        }
        _ => DataBlock::Distances(distances(&rows)?),
    };
    Ok((TaxaBlock::new(names)?, block))
}

/// Rows of a matrix in the order of `names`.
fn ordered_rows<'r, 'a>(names: &[&str], rows: &'r [Row<'a>]) -> Result<Vec<&'r Row<'a>>, Error> {
    if rows.len() != names.len() {
        return Err(Error::RowCount {
            expected: names.len(),
            found: rows.len(),
        });
    }
    names
        .iter()
        .map(|&name| {
            rows.iter()
                .find(|(row_name, _)| *row_name == name)
                .ok_or_else(|| Error::MissingRow(name.to_owned()))
        })
        .collect()
}

fn distances(rows: &[&Row]) -> Result<DistancesBlock, Error> {
    let ntax = rows.len();
    let mut values = Vec::with_capacity(ntax);
    for (taxon, row) in rows {
        if row.len() != ntax {
            return Err(Error::RowLength {
                taxon: taxon.to_string(),
                expected: ntax,
                found: row.len(),
            });
        }
        let row = row
            .iter()
            .map(|value| {
                value.parse::<f64>().map_err(|_| Error::BadDistance {
                    taxon: taxon.to_string(),
                    value: value.to_string(),
                })
            })
            .collect::<Result<Vec<f64>, Error>>()?;
        values.push(row);
    }

    let mut block = DistancesBlock::new(ntax);
    for i in 0..ntax {
        for j in (i + 1)..ntax {
            if (values[i][j] - values[j][i]).abs() > SYMMETRY_TOLERANCE {
                return Err(Error::Asymmetric(rows[i].0.to_owned(), rows[j].0.to_owned()));
            }
            block.set(i, j, values[i][j]);
        }
    }
    Ok(block)
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::anyhow;
    use workflow::{EngineConfig, EngineContext, UpdateState};

    fn new_workflow() -> Result<Workflow> {
        Ok(Workflow::new(EngineContext::new(
            &EngineConfig::with_worker_threads(2),
        )?))
    }

    const DISTANCES: &str = "distances {
    A 0 3 4 5
    B 3 0 5 6
    C 4 5 0 5
    D 5 6 5 0
}
tree = NeighborJoining(working)
";

    #[test]
    fn test_load_distances() -> Result<()> {
        let mut doc = Document::load(DISTANCES, new_workflow()?)?;
        doc.workflow_mut().wait_until_idle();

        let input = doc.node(INPUT_DATA)?;
        let block = doc.workflow().data_block(input)?.ok_or(anyhow!("no input"))?;
        let matrix = block.as_distances().ok_or(anyhow!("not distances"))?;
        assert_eq!(matrix.ntax(), 4);
        assert_eq!(matrix.get(3, 1), 6.0);

        let tree = doc.node("tree")?;
        assert_eq!(doc.workflow().state(tree)?, UpdateState::Valid);
        assert_eq!(doc.name_of(tree), Some("tree"));
        Ok(())
    }

    #[test]
    fn test_rows_follow_taxa_order() -> Result<()> {
        let text = "taxa { B A }\ncharacters dna {\n A AAAA\n B CCCC\n}\n";
        let doc = Document::load(text, new_workflow()?)?;
        let input = doc.node(INPUT_DATA)?;
        let block = doc.workflow().data_block(input)?.ok_or(anyhow!("no input"))?;
        let chars = block.as_characters().ok_or(anyhow!("not characters"))?;
        assert_eq!(chars.row(0), b"CCCC");
        assert_eq!(chars.row(1), b"AAAA");
        Ok(())
    }

    #[test]
    fn test_load_errors() -> Result<()> {
        let missing = Document::load("taxa { A B }\n", new_workflow()?);
        assert!(missing.is_err());

        let asymmetric = "distances {\n A 0 1\n B 2 0\n}\n";
        assert!(Document::load(asymmetric, new_workflow()?).is_err());

        let unknown_parent = "distances {\n A 0 1\n B 1 0\n}\nt = NeighborJoining(dist)\n";
        let err = Document::load(unknown_parent, new_workflow()?).unwrap_err();
        assert!(format!("{err:#}").contains("Unknown node \"dist\""), "{err:#}");

        let duplicate = "distances {\n A 0 1\n B 1 0\n}\nworking = NeighborJoining(working)\n";
        assert!(Document::load(duplicate, new_workflow()?).is_err());

        let wrong_filter = "distances {\n A 0 1\n B 1 0\n}\nfilter input_taxa = CharactersFilter\n";
        assert!(Document::load(wrong_filter, new_workflow()?).is_err());
        Ok(())
    }

    #[test]
    fn test_root_filter_options() -> Result<()> {
        let text = "distances {\n A 0 1 2\n B 1 0 2\n C 2 2 0\n}\n\
                    filter input_taxa = TaxaFilter [exclude: B]\n";
        let mut doc = Document::load(text, new_workflow()?)?;
        doc.workflow_mut().wait_until_idle();
        let working = doc.node(WORKING_DATA)?;
        let block = doc.workflow().data_block(working)?.ok_or(anyhow!("no data"))?;
        let matrix = block.as_distances().ok_or(anyhow!("not distances"))?;
        assert_eq!(matrix.ntax(), 2);
        assert_eq!(matrix.get(0, 1), 2.0);
        Ok(())
    }

    #[test]
    fn test_filter_below_working_taxa() -> Result<()> {
        let text = "distances {\n A 0 1 2\n B 1 0 2\n C 2 2 0\n}\n\
                    filter taxa = TaxaFilter [exclude: A]\n";
        let mut doc = Document::load(text, new_workflow()?)?;
        doc.workflow_mut().wait_until_idle();
        assert_eq!(doc.workflow().num_connectors(), 3);

        let working = doc.node(WORKING_DATA)?;
        let block = doc.workflow().data_block(working)?.ok_or(anyhow!("no data"))?;
        let matrix = block.as_distances().ok_or(anyhow!("not distances"))?;
        assert_eq!(matrix.ntax(), 2);
        assert_eq!(matrix.get(0, 1), 2.0);
        Ok(())
    }
}

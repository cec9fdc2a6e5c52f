use std::fmt::Write;

use anyhow::Result;

use algorithms::registry;
use blocks::{BlockKind, DataBlock, TaxaBlock};
use util::{HashMap, HashSet};
use workflow::{Algorithm, DataNodeId};

use super::{Document, Error, INPUT_DATA, INPUT_TAXA};

/// Characters that force a value to be quoted.
const NEEDS_QUOTES: [char; 11] = ['(', ')', '[', ']', '{', '}', ',', '=', '#', '"', '\''];

impl Document {
    /// Write the document as `.pf` text: the input blocks, changed options of
    /// the root filters, then every other connector in topological order.
    /// Nodes the document did not name get generated names.
    pub fn write(&self, out: &mut String) -> Result<()> {
        let wf = &self.workflow;
        let mut names: HashMap<DataNodeId, String> = util::map_with_capacity(self.names.len());
        let mut used: HashSet<String> = util::set_with_capacity(self.names.len());
        for (name, &id) in &self.names {
            names.insert(id, name.clone());
            used.insert(name.clone());
        }

        // INPUT //////////////
        let taxa_block = self.source_block(INPUT_TAXA)?;
        let taxa = taxa_block
            .as_taxa()
            .ok_or(Error::UnsavableInput(taxa_block.kind()))?;
        write_taxa(out, taxa)?;
        write_data(out, taxa, self.source_block(INPUT_DATA)?.as_ref())?;

        // ROOT FILTERS ///////
        let filters = [(INPUT_TAXA, wf.taxa_filter()), (INPUT_DATA, wf.top_filter())];
        for (target, filter) in filters {
            let Some(filter) = filter else {
                continue;
            };
            let algorithm = wf.connector(filter)?.algorithm();
            let options = changed_options(algorithm);
            if !options.is_empty() {
                writeln!(
                    out,
                    "filter {target} = {}{}",
                    algorithm.name(),
                    format_options(&options)
                )?;
            }
        }

        // STEPS //////////////
        let roots = [wf.taxa_filter(), wf.top_filter()];
        for id in wf.topological_connectors()? {
            if roots.contains(&Some(id)) {
                continue;
            }
            let connector = wf.connector(id)?;
            let parents = connector
                .parents()
                .iter()
                .map(|parent| {
                    names
                        .get(parent)
                        .map(String::as_str)
                        .ok_or(Error::UnnamedSource(*parent))
                })
                .collect::<Result<Vec<&str>, Error>>()?
                .join(", ");

            let child = connector.child();
            let name = match names.get(&child) {
                Some(name) => name.clone(),
                None => generate_name(wf.data_node(child)?.kind(), &mut used),
            };
            let algorithm = connector.algorithm();
            writeln!(
                out,
                "{name} = {}({parents}){}",
                algorithm.name(),
                format_options(&changed_options(algorithm))
            )?;
            names.insert(child, name);
        }
        Ok(())
    }

    fn source_block(&self, name: &str) -> Result<std::sync::Arc<DataBlock>> {
        let node = self.node(name)?;
        let block = self
            .workflow
            .data_block(node)?
            .ok_or(Error::UnnamedSource(node))?;
        Ok(block)
    }
}

fn write_taxa(out: &mut String, taxa: &TaxaBlock) -> std::fmt::Result {
    write!(out, "taxa {{")?;
    for name in taxa.names() {
        write!(out, " {}", literal(name))?;
    }
    writeln!(out, " }}")
}

fn write_data(out: &mut String, taxa: &TaxaBlock, data: &DataBlock) -> Result<()> {
    match data {
        DataBlock::Characters(chars) => {
            writeln!(out, "characters {} {{", chars.data_type())?;
            for (t, name) in taxa.names().iter().enumerate() {
                let row = String::from_utf8_lossy(chars.row(t));
                writeln!(out, "    {} {}", literal(name), literal(&row))?;
            }
        }
        DataBlock::Distances(matrix) => {
            writeln!(out, "distances {{")?;
            for (row, name) in matrix.rows().zip(taxa.names()) {
                write!(out, "    {}", literal(name))?;
                for value in row {
                    // Display of f64 round-trips exactly:
                    write!(out, " {value}")?;
                }
                writeln!(out)?;
            }
        }
        other => return Err(Error::UnsavableInput(other.kind()).into()),
    }
    writeln!(out, "}}")?;
    Ok(())
}

/// Options whose value differs from a freshly created algorithm's.
/// Algorithms that cannot be created by name keep all their options.
fn changed_options(algorithm: &dyn Algorithm) -> Vec<(&'static str, String)> {
    let options = algorithm.options();
    match registry::create(algorithm.name()) {
        Ok(default) => {
            let defaults = default.options();
            options
                .into_iter()
                .filter(|option| !defaults.contains(option))
                .collect()
        }
        Err(_) => options,
    }
}

fn format_options(options: &[(&'static str, String)]) -> String {
    if options.is_empty() {
        return String::new();
    }
    let inner: Vec<String> = options
        .iter()
        .map(|(name, value)| format!("{name}: {}", literal(value)))
        .collect();
    format!(" [{}]", inner.join(", "))
}

fn generate_name(kind: BlockKind, used: &mut HashSet<String>) -> String {
    let prefix = kind.as_str().to_ascii_lowercase();
    let mut n = 1;
    loop {
        let name = format!("{prefix}{n}");
        if used.insert(name.clone()) {
            return name;
        }
        n += 1;
    }
}

/// `value`, quoted if it would not parse as a bare literal.
fn literal(value: &str) -> std::borrow::Cow<'_, str> {
    let bare = !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_whitespace() || NEEDS_QUOTES.contains(&c));
    if bare {
        value.into()
    } else {
        format!("\"{value}\"").into()
    }
}

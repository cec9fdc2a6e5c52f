#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use blocks::{
    BlockKind, CharactersBlock, CharactersType, DataBlock, DistancesBlock, TaxaBlock, TreesBlock,
};
use phyloflow_workflow::{
    Algorithm, ComputeError, EngineConfig, EngineContext, OptionError, Progress, Workflow,
};

pub fn workflow(threads: usize) -> Result<Workflow> {
    let ctx = EngineContext::new(&EngineConfig::with_worker_threads(threads))?;
    Ok(Workflow::new(ctx))
}

pub fn taxa(n: usize) -> TaxaBlock {
    TaxaBlock::new((1..=n).map(|i| format!("t{i}"))).unwrap()
}

/// `n` DNA rows that differ from each other in a few sites.
pub fn characters(n: usize) -> CharactersBlock {
    let rows: Vec<String> = (0..n)
        .map(|i| {
            (0..12)
                .map(|c| if c < i { 'A' } else { "ACGT".as_bytes()[c % 4] as char })
                .collect()
        })
        .collect();
    CharactersBlock::new(CharactersType::Dna, rows).unwrap()
}

pub fn distances(n: usize) -> DistancesBlock {
    let mut block = DistancesBlock::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            block.set(i, j, (j - i) as f64);
        }
    }
    block
}

pub fn distances_of(wf: &Workflow, node: phyloflow_workflow::DataNodeId) -> Result<DistancesBlock> {
    let block = wf.data_block(node)?.ok_or(anyhow!("no block at {node}"))?;
    block
        .as_distances()
        .cloned()
        .ok_or(anyhow!("{node} does not hold distances"))
}

// ALGORITHMS ////////////////////

/// Taxa filter removing taxa by 1-based index.
#[derive(Debug, Clone, Default)]
pub struct ExcludeTaxa {
    exclude: Vec<usize>,
}

impl Algorithm for ExcludeTaxa {
    fn name(&self) -> &'static str {
        "ExcludeTaxa"
    }

    fn from_kind(&self) -> BlockKind {
        BlockKind::Taxa
    }

    fn to_kind(&self) -> BlockKind {
        BlockKind::Taxa
    }

    fn compute(
        &self,
        _: &Progress,
        taxa: &TaxaBlock,
        _: &DataBlock,
    ) -> Result<DataBlock, ComputeError> {
        let keep: Vec<usize> = (0..taxa.len())
            .filter(|i| !self.exclude.contains(&(i + 1)))
            .collect();
        Ok(DataBlock::Taxa(taxa.restrict(&keep)))
    }

    fn options(&self) -> Vec<(&'static str, String)> {
        let list: Vec<String> = self.exclude.iter().map(|i| i.to_string()).collect();
        vec![("exclude", list.join(","))]
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        if name != "exclude" {
            return Err(OptionError::Unknown(self.name(), name.to_owned()));
        }
        self.exclude = value
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().parse::<usize>().map_err(|e| OptionError::invalid(name, value, e)))
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}

/// Top filter selecting the rows of the working taxa.
#[derive(Debug, Clone, Default)]
pub struct RestrictRows;

impl Algorithm for RestrictRows {
    fn name(&self) -> &'static str {
        "RestrictRows"
    }

    fn from_kind(&self) -> BlockKind {
        BlockKind::Characters
    }

    fn to_kind(&self) -> BlockKind {
        BlockKind::Characters
    }

    fn compute(
        &self,
        _: &Progress,
        taxa: &TaxaBlock,
        parent: &DataBlock,
    ) -> Result<DataBlock, ComputeError> {
        let chars = parent.as_characters().ok_or(anyhow!("expected characters"))?;
        Ok(DataBlock::Characters(chars.select_rows(taxa.origins())))
    }

    fn box_clone(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}

/// Characters filter that passes its input through.
#[derive(Debug, Clone, Default)]
pub struct PassCharacters;

impl Algorithm for PassCharacters {
    fn name(&self) -> &'static str {
        "PassCharacters"
    }

    fn from_kind(&self) -> BlockKind {
        BlockKind::Characters
    }

    fn to_kind(&self) -> BlockKind {
        BlockKind::Characters
    }

    fn compute(
        &self,
        _: &Progress,
        _: &TaxaBlock,
        parent: &DataBlock,
    ) -> Result<DataBlock, ComputeError> {
        Ok(parent.clone())
    }

    fn box_clone(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}

/// Proportion of differing sites.
#[derive(Debug, Clone, Default)]
pub struct Mismatches;

impl Algorithm for Mismatches {
    fn name(&self) -> &'static str {
        "Mismatches"
    }

    fn from_kind(&self) -> BlockKind {
        BlockKind::Characters
    }

    fn to_kind(&self) -> BlockKind {
        BlockKind::Distances
    }

    fn compute(
        &self,
        progress: &Progress,
        _: &TaxaBlock,
        parent: &DataBlock,
    ) -> Result<DataBlock, ComputeError> {
        let chars = parent.as_characters().ok_or(anyhow!("expected characters"))?;
        let n = chars.ntax();
        let mut out = DistancesBlock::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let diff = (0..chars.nchar())
                    .filter(|&c| chars.state(i, c) != chars.state(j, c))
                    .count();
                out.set(i, j, diff as f64 / chars.nchar().max(1) as f64);
            }
            progress.check_for_cancel()?;
        }
        Ok(DataBlock::Distances(out))
    }

    fn box_clone(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}

/// Shared counters for observing how many copies of an algorithm run at once.
#[derive(Debug, Default)]
pub struct Concurrency {
    active: AtomicUsize,
    max_active: AtomicUsize,
    finished: AtomicUsize,
}

impl Concurrency {
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

/// Distances filter that scales every entry, sleeping in small polled steps.
#[derive(Debug, Clone)]
pub struct Scale {
    factor: f64,
    steps: usize,
    counters: Arc<Concurrency>,
}

impl Scale {
    pub fn new(factor: f64, steps: usize) -> Self {
        Self {
            factor,
            steps,
            counters: Arc::default(),
        }
    }

    pub fn counters(&self) -> Arc<Concurrency> {
        Arc::clone(&self.counters)
    }
}

impl Algorithm for Scale {
    fn name(&self) -> &'static str {
        "Scale"
    }

    fn from_kind(&self) -> BlockKind {
        BlockKind::Distances
    }

    fn to_kind(&self) -> BlockKind {
        BlockKind::Distances
    }

    fn compute(
        &self,
        progress: &Progress,
        _: &TaxaBlock,
        parent: &DataBlock,
    ) -> Result<DataBlock, ComputeError> {
        self.counters.enter();
        let result = (|| -> Result<DataBlock, ComputeError> {
            progress.set_maximum(self.steps as u64);
            for _ in 0..self.steps {
                thread::sleep(Duration::from_millis(2));
                progress.increment_progress()?;
            }
            let input = parent.as_distances().ok_or(anyhow!("expected distances"))?;
            let n = input.ntax();
            let mut out = DistancesBlock::new(n);
            for i in 0..n {
                for j in (i + 1)..n {
                    out.set(i, j, input.get(i, j) * self.factor);
                }
            }
            Ok(DataBlock::Distances(out))
        })();
        self.counters.exit();
        result
    }

    fn options(&self) -> Vec<(&'static str, String)> {
        vec![("factor", self.factor.to_string())]
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        match name {
            "factor" => {
                self.factor = value.parse().map_err(|e| OptionError::invalid(name, value, e))?;
                Ok(())
            }
            _ => Err(OptionError::Unknown(self.name(), name.to_owned())),
        }
    }

    fn box_clone(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}

/// Distances filter that blocks until its gate opens.
#[derive(Debug, Clone)]
pub struct Gated {
    gate: Arc<AtomicBool>,
    honor_cancel: bool,
}

impl Gated {
    pub fn new(honor_cancel: bool) -> Self {
        Self {
            gate: Arc::default(),
            honor_cancel,
        }
    }

    pub fn gate(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.gate)
    }
}

impl Algorithm for Gated {
    fn name(&self) -> &'static str {
        "Gated"
    }

    fn from_kind(&self) -> BlockKind {
        BlockKind::Distances
    }

    fn to_kind(&self) -> BlockKind {
        BlockKind::Distances
    }

    fn compute(
        &self,
        progress: &Progress,
        _: &TaxaBlock,
        parent: &DataBlock,
    ) -> Result<DataBlock, ComputeError> {
        while !self.gate.load(Ordering::SeqCst) {
            if self.honor_cancel {
                progress.check_for_cancel()?;
            }
            thread::sleep(Duration::from_millis(1));
        }
        Ok(parent.clone())
    }

    fn box_clone(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}

/// Tree builder that always fails.
#[derive(Debug, Clone, Default)]
pub struct Broken;

impl Algorithm for Broken {
    fn name(&self) -> &'static str {
        "Broken"
    }

    fn from_kind(&self) -> BlockKind {
        BlockKind::Distances
    }

    fn to_kind(&self) -> BlockKind {
        BlockKind::Trees
    }

    fn compute(
        &self,
        _: &Progress,
        _: &TaxaBlock,
        _: &DataBlock,
    ) -> Result<DataBlock, ComputeError> {
        Err(anyhow!("matrix is not additive").into())
    }

    fn box_clone(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}

/// Tree builder that only accepts matrices with more than `min_taxa` taxa.
#[derive(Debug, Clone, Default)]
pub struct NeedsTaxa {
    pub min_taxa: usize,
}

impl Algorithm for NeedsTaxa {
    fn name(&self) -> &'static str {
        "NeedsTaxa"
    }

    fn from_kind(&self) -> BlockKind {
        BlockKind::Distances
    }

    fn to_kind(&self) -> BlockKind {
        BlockKind::Trees
    }

    fn is_applicable(&self, taxa: &TaxaBlock, _: &DataBlock) -> bool {
        taxa.len() > self.min_taxa
    }

    fn compute(
        &self,
        _: &Progress,
        _: &TaxaBlock,
        _: &DataBlock,
    ) -> Result<DataBlock, ComputeError> {
        Ok(DataBlock::Trees(TreesBlock::new(Vec::new(), false)))
    }

    fn options(&self) -> Vec<(&'static str, String)> {
        vec![("min_taxa", self.min_taxa.to_string())]
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        match name {
            "min_taxa" => {
                self.min_taxa = value.parse().map_err(|e| OptionError::invalid(name, value, e))?;
                Ok(())
            }
            _ => Err(OptionError::Unknown(self.name(), name.to_owned())),
        }
    }

    fn box_clone(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}

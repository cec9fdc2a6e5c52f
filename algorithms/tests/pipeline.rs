use anyhow::{anyhow, Result};
use blocks::{BlockKind, CharactersBlock, CharactersType, DataBlock, DistancesBlock, TaxaBlock};
use phyloflow_algorithms::{registry, JukesCantor, NeighborJoining, TaxaFilter, TreeSplits};
use workflow::{
    DataNodeId, EngineConfig, EngineContext, NodeRef, PathStep, UpdateState, Workflow,
    WorkflowEvent,
};

const ROWS: [&str; 6] = [
    "ACGTACGTACGTACGTACGTACGTACGTAC",
    "ACGTACGTACGTACGTACGAACGTACGTAC",
    "ACGTACGAACGTACGTTCGAACGTACGTAC",
    "ACCTACGAACGTACGTTCGAACGAACGTAC",
    "TCGTACGTACCTACGTACGTACGTACGTTC",
    "TCGTAAGTACCTACGTACGTACGTACTTTC",
];

fn new_workflow() -> Result<Workflow> {
    let ctx = EngineContext::new(&EngineConfig::with_worker_threads(4))?;
    Ok(Workflow::new(ctx))
}

fn input() -> Result<(TaxaBlock, DataBlock)> {
    let taxa = TaxaBlock::new(["A", "B", "C", "D", "E", "F"])?;
    let chars = CharactersBlock::new(CharactersType::Dna, ROWS)?;
    Ok((taxa, DataBlock::Characters(chars)))
}

fn distances(wf: &Workflow, node: DataNodeId) -> Result<DistancesBlock> {
    wf.data_block(node)?
        .and_then(|b| b.as_distances().cloned())
        .ok_or(anyhow!("no distances at {node}"))
}

fn analysed() -> Result<(Workflow, DataNodeId, DataNodeId)> {
    let mut wf = new_workflow()?;
    let (taxa, data) = input()?;
    wf.setup_input(
        taxa,
        data,
        Box::new(TaxaFilter::default()),
        registry::top_filter(BlockKind::Characters)?,
    )?;
    let working = wf.working_data_node().ok_or(anyhow!("no working data"))?;
    let steps = vec![
        PathStep::new(JukesCantor, BlockKind::Distances),
        PathStep::new(NeighborJoining, BlockKind::Trees),
        PathStep::new(TreeSplits::default(), BlockKind::Splits),
    ];
    let (_, splits) = wf.find_or_create_path(working, steps)?;
    let dist = wf
        .ancestor_for_kind(splits, BlockKind::Distances)?
        .ok_or(anyhow!("no distances upstream of splits"))?;
    wf.wait_until_idle();
    Ok((wf, dist, splits))
}

#[test]
fn test_full_pipeline() -> Result<()> {
    let (wf, dist, splits) = analysed()?;
    for id in wf.connector_ids() {
        assert_eq!(wf.state(id)?, UpdateState::Valid, "{}", wf.short_description(id)?);
    }
    assert_eq!(distances(&wf, dist)?.ntax(), 6);
    let splits = wf.data_block(splits)?.ok_or(anyhow!("no splits"))?;
    let splits = splits.as_splits().ok_or(anyhow!("not splits"))?;
    assert_eq!(splits.ntax(), 6);
    // an unrooted binary tree on 6 taxa has 9 edges:
    assert_eq!(splits.len(), 9);
    Ok(())
}

#[test]
fn test_recompute_is_bit_identical() -> Result<()> {
    let (mut wf, dist, _) = analysed()?;
    let first = distances(&wf, dist)?;
    let producer = wf
        .data_node(dist)?
        .producer()
        .ok_or(anyhow!("distances have no producer"))?;

    wf.force_recompute(producer)?;
    wf.wait_until_idle();
    let second = distances(&wf, dist)?;

    assert_eq!(wf.connector(producer)?.runs(), 2);
    for i in 0..6 {
        for j in 0..6 {
            assert_eq!(first.get(i, j).to_bits(), second.get(i, j).to_bits());
        }
    }
    Ok(())
}

#[test]
fn test_excluding_a_taxon_shrinks_distances() -> Result<()> {
    let (mut wf, dist, _) = analysed()?;
    let full = distances(&wf, dist)?;
    let input_taxa = wf.input_taxa_node().ok_or(anyhow!("no input taxa"))?;

    let events = wf.subscribe();
    let filter = wf.find_or_insert_filter(input_taxa, || Box::new(TaxaFilter::default()))?;
    assert_eq!(Some(filter), wf.taxa_filter());
    wf.set_option(filter, "exclude", "3")?;
    wf.wait_until_idle();

    let states: Vec<UpdateState> = events
        .try_iter()
        .filter_map(|e| match e {
            WorkflowEvent::StateChanged { node, new, .. } if node == NodeRef::Data(dist) => {
                Some(new)
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![UpdateState::Invalid, UpdateState::Computing, UpdateState::Valid]
    );

    let reduced = distances(&wf, dist)?;
    assert_eq!(reduced.ntax(), 5);
    let kept = [0, 1, 3, 4, 5];
    for (a, &i) in kept.iter().enumerate() {
        for (b, &j) in kept.iter().enumerate() {
            assert_eq!(reduced.get(a, b), full.get(i, j));
        }
    }
    let working_taxa = wf.working_taxa_node().ok_or(anyhow!("no working taxa"))?;
    let taxa = wf.data_block(working_taxa)?.ok_or(anyhow!("no taxa"))?;
    let names = taxa.as_taxa().ok_or(anyhow!("not taxa"))?.names().to_vec();
    assert_eq!(names, vec!["A", "B", "D", "E", "F"]);
    Ok(())
}

#[test]
fn test_protein_data_skips_jukes_cantor() -> Result<()> {
    let mut wf = new_workflow()?;
    let taxa = wf.create_data_node(DataBlock::Taxa(TaxaBlock::new(["A", "B", "C"])?));
    let chars = CharactersBlock::new(CharactersType::Protein, ["MKVL", "MKVI", "MRVI"])?;
    let chars = wf.create_data_node(DataBlock::Characters(chars));
    let dist = wf.create_pending_node(BlockKind::Distances);
    let jc = wf.create_connector(&[taxa, chars], dist, Box::new(JukesCantor))?;
    wf.wait_until_idle();

    assert_eq!(wf.state(jc)?, UpdateState::Valid);
    assert!(!wf.is_applicable(jc)?);
    assert_eq!(distances(&wf, dist)?.ntax(), 0);
    Ok(())
}

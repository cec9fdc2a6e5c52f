use anyhow::{Context, Result};
use colored::Colorize;

use workflow::{EngineConfig, EngineContext, UpdateState, Workflow};

use crate::document::Document;
use crate::settings::Settings;
use crate::ui::Ui;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0} step(s) failed")]
    Failed(usize),
}

/// This struct actually runs the command-line app.
pub struct App {
    /// Interpreted command line settings
    settings: Settings,
    /// User interface
    ui: Ui,
}

impl App {
    /// Create a new `App`.
    pub fn new(settings: Settings) -> Self {
        let ui = Ui::new(&settings);
        Self { settings, ui }
    }

    /// Load the workflow, compute everything, and report the results.
    pub fn run(mut self) -> Result<()> {
        let mut doc = self.load_document()?;
        self.apply_overrides(&mut doc)?;

        self.ui.verbose_progress("Computing");
        self.ui.start_timer();
        log::debug!("{} task(s) running", doc.workflow().running_tasks());
        doc.workflow_mut().wait_until_idle();
        self.ui.done();
        self.ui.print_elapsed("Computing");

        let failed = self.report(&doc)?;

        for name in &self.settings.show {
            let node = doc.node(name)?;
            let block = doc.workflow().data_block(node)?;
            self.ui.print_block(name, block.as_deref());
        }

        if let Some(path) = &self.settings.save {
            self.ui.verbose_progress("Saving workflow");
            doc.save(path)?;
            self.ui.done();
        }

        if failed > 0 {
            return Err(Error::Failed(failed).into());
        }
        Ok(())
    }

    fn load_document(&mut self) -> Result<Document> {
        let ctx = EngineContext::new(&EngineConfig {
            worker_threads: self.settings.threads,
        })?;
        self.ui.verbose_msg(&format!(
            "Using {} worker threads.",
            ctx.worker_threads()
        ));

        self.ui.verbose_progress("Loading workflow");
        self.ui.start_timer();
        let doc = Document::read(&self.settings.workflow, Workflow::new(ctx))?;
        self.ui.done();
        self.ui.print_elapsed("Loading workflow");

        log::debug!(
            "workflow has {} data nodes and {} connectors",
            doc.workflow().num_data_nodes(),
            doc.workflow().num_connectors()
        );
        Ok(doc)
    }

    fn apply_overrides(&self, doc: &mut Document) -> Result<()> {
        for o in &self.settings.overrides {
            log::info!("setting {}.{} = {}", o.node, o.option, o.value);
            doc.set_option(&o.node, &o.option, &o.value)
                .context("while applying command-line overrides")?;
        }
        Ok(())
    }

    /// Print the state of every computed node; returns the number of failures.
    fn report(&self, doc: &Document) -> Result<usize> {
        let wf = doc.workflow();
        let mut failed = 0;
        for id in wf.topological_connectors()? {
            let connector = wf.connector(id)?;
            let child = connector.child();
            let state = connector.state();
            if state == UpdateState::Failed {
                failed += 1;
            }
            self.ui.print_node(
                doc.name_of(child).unwrap_or("-"),
                &connector.short_description(),
                &wf.short_description(child)?,
                state,
                connector.message(),
            );
        }
        if failed == 0 {
            eprintln!("{}", "All steps computed.".green());
        }
        Ok(failed)
    }
}

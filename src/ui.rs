use colored::{ColoredString, Colorize};

use blocks::DataBlock;
use util::Timer;
use workflow::UpdateState;

use crate::settings::Settings;

/// All interactions with the text UI should go through this struct.
pub struct Ui {
    /// -v setting, displays extra text info to user
    pub verbose: bool,
    /// keeps track of time for each phase
    timer: Timer,
}

impl Ui {
    pub fn new(settings: &Settings) -> Self {
        Self {
            verbose: settings.verbose > 0,
            timer: Timer::now(),
        }
    }

    pub fn start_timer(&mut self) {
        if self.verbose {
            self.timer.reset();
        }
    }

    pub fn print_elapsed(&self, what: &str) {
        if self.verbose {
            self.timer.print_elapsed(what);
        }
    }

    pub fn verbose_msg(&self, msg: &str) {
        if self.verbose {
            eprintln!("{}", msg);
        }
    }

    pub fn verbose_progress(&self, msg: &str) {
        if self.verbose {
            eprint!("{}... ", msg.magenta());
        }
    }

    pub fn done(&self) {
        if self.verbose {
            eprintln!("{}.", "done".green());
        }
    }

    /// One line per computed node: its name, the step producing it, and its state.
    pub fn print_node(
        &self,
        name: &str,
        step: &str,
        summary: &str,
        state: UpdateState,
        message: Option<&str>,
    ) {
        eprintln!(
            "{:<14} {:<18} {:<10} {}",
            name.bold(),
            step,
            colored_state(state),
            summary.dimmed()
        );
        if let Some(message) = message {
            eprintln!("{:<14} {}", "", message.red());
        }
    }

    /// Print a node's block to stdout.
    pub fn print_block(&self, name: &str, block: Option<&DataBlock>) {
        println!("{} {}", "##".cyan(), name.cyan().bold());
        match block {
            Some(block) => print!("{}", block),
            None => println!("{}", "(not computed)".yellow()),
        }
    }
}

#[rustfmt::skip]
fn colored_state(state: UpdateState) -> ColoredString {
    let text = state.as_str();
    match state {
        UpdateState::Valid     => text.green(),
        UpdateState::Computing => text.yellow(),
        UpdateState::Invalid   => text.dimmed(),
        UpdateState::Failed    => text.red().bold(),
    }
}

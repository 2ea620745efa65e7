//! Progress reporting for a resolution round

use colored::Colorize;
use ensemble_application::ports::progress::ProgressNotifier;
use ensemble_domain::{Model, Phase, ResolutionResult};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress with one indicatif bar per phase (drawn on stderr)
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn phase_label(phase: &Phase) -> String {
        match phase {
            Phase::Single => phase.display_name().to_string(),
            Phase::Workers => format!("Step 1: {}", phase.display_name()),
            Phase::Judge => format!("Step 2: {}", phase.display_name()),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(Self::phase_label(phase));
        pb.set_message("waiting...");

        if let Ok(mut slot) = self.phase_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_task_complete(&self, _phase: &Phase, model: &Model, success: bool) {
        if let Ok(slot) = self.phase_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), model)
            } else {
                format!("{} {}", "x".red(), model)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_phase_complete(&self, phase: &Phase) {
        if let Ok(mut slot) = self.phase_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(format!("{} done", phase.as_str().green()));
        }
    }

    fn on_cache_hit(&self, result: &ResolutionResult) {
        let _ = self.multi.println(format!(
            "{} answer {} served from cache",
            "->".cyan(),
            result.final_answer.bold()
        ));
    }
}

/// Plain line-based progress on stderr (no redraws)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize) {
        eprintln!(
            "{} {} ({} calls)",
            "->".cyan(),
            ProgressReporter::phase_label(phase).bold(),
            total_tasks
        );
    }

    fn on_task_complete(&self, _phase: &Phase, model: &Model, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), model);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), model);
        }
    }

    fn on_phase_complete(&self, _phase: &Phase) {}

    fn on_cache_hit(&self, result: &ResolutionResult) {
        eprintln!("{} answer {} served from cache", "->".cyan(), result.final_answer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_labels() {
        assert_eq!(ProgressReporter::phase_label(&Phase::Workers), "Step 1: Worker Vote");
        assert_eq!(ProgressReporter::phase_label(&Phase::Judge), "Step 2: Judge Arbitration");
        assert_eq!(ProgressReporter::phase_label(&Phase::Single), "Single Call");
    }

    #[test]
    fn test_reporter_tolerates_out_of_order_events() {
        let reporter = ProgressReporter::new();
        // Completion without a started phase is ignored
        reporter.on_task_complete(&Phase::Workers, &Model::Gpt4o, true);
        reporter.on_phase_complete(&Phase::Workers);

        reporter.on_phase_start(&Phase::Workers, 2);
        reporter.on_task_complete(&Phase::Workers, &Model::Gpt4o, true);
        reporter.on_task_complete(&Phase::Workers, &Model::Gemini25Flash, false);
        reporter.on_phase_complete(&Phase::Workers);
        assert!(reporter.phase_bar.lock().unwrap().is_none());
    }
}

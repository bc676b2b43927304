use std::fmt::Display;
use std::time::Duration;

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TaskKey {
    GenerateVerilog,
    WriteVerilog,
}

#[derive(PartialEq, Eq)]
pub enum StepStatus {
    Done,
    Pending,
    InProgress,
    Skipped,
    Failed,
}

pub struct StepContext {
    step_num: usize,
    steps: Vec<Step>,
}

pub struct Step {
    desc: String,
    key: TaskKey,
    progress_bar: ProgressBar,
}

impl StepContext {
    pub fn new() -> Self {
        println!("Tasks:");

        let mut steps = vec![
            Step {
                desc: "Generate Verilog".to_string(),
                key: TaskKey::GenerateVerilog,
                progress_bar: ProgressBar::new_spinner(),
            },
            Step {
                desc: "Write Verilog".to_string(),
                key: TaskKey::WriteVerilog,
                progress_bar: ProgressBar::new_spinner(),
            },
        ];
        let mp = MultiProgress::new();
        let num_steps = steps.len();
        let width = format!("{}", num_steps).len();
        for (i, step) in steps.iter_mut().enumerate() {
            step.progress_bar = mp.add(step.progress_bar.clone());
            let msg = Some(format!(
                "[{:width$}/{:width$}] {}",
                i + 1,
                num_steps,
                step.desc
            ));
            let status = if i == 0 {
                StepStatus::InProgress
            } else {
                StepStatus::Pending
            };
            step.set_status(status, msg);
        }
        StepContext { step_num: 0, steps }
    }

    #[inline]
    pub fn current_step(&mut self) -> Option<&mut Step> {
        self.steps.get_mut(self.step_num)
    }

    /// Marks the current step failed and every later step skipped if `res` is an error.
    pub fn check<T, E>(&mut self, res: Result<T, E>) -> Result<T, E> {
        if res.is_err() {
            if let Some(current_step) = self.current_step() {
                current_step.set_status(StepStatus::Failed, None);
                self.step_num += 1;
                while let Some(current_step) = self.current_step() {
                    current_step.set_status(StepStatus::Skipped, None);
                    self.step_num += 1;
                }
            }
            println!();
        }

        res
    }

    pub fn finish(&mut self, key: TaskKey) {
        let Some(current_step) = self.current_step() else {
            panic!("A step was completed after all steps were marked completed");
        };
        if current_step.key != key {
            panic!("A step was completed out of order");
        }

        current_step.set_status(StepStatus::Done, None);
        self.step_num += 1;

        if let Some(current_step) = self.current_step() {
            current_step.set_status(StepStatus::InProgress, None);
        } else {
            println!("\nCompleted all tasks");
        }
    }
}

impl Default for StepContext {
    fn default() -> Self {
        Self::new()
    }
}

fn format_template(spinner: bool, status: impl Display) -> String {
    if spinner {
        format!("{{spinner:.green}} {:16} {{msg}}", status)
    } else {
        format!("  {:16} {{msg}}", status)
    }
}

impl Step {
    fn set_status(&mut self, status: StepStatus, msg: Option<String>) {
        let status_template = match status {
            StepStatus::Done => format_template(false, "Done".green().bold()),
            StepStatus::Failed => format_template(false, "Failed".bright_white().on_red().bold()),
            StepStatus::InProgress => format_template(true, "In Progress".bright_white().bold()),
            StepStatus::Pending => format_template(true, "Pending".blue().bold()),
            StepStatus::Skipped => format_template(false, "Skipped".yellow().bold()),
        };
        if let Ok(style) = ProgressStyle::with_template(&status_template) {
            self.progress_bar.set_style(style);
        }

        if let Some(msg) = msg {
            self.progress_bar.set_message(msg);
        }

        if status == StepStatus::InProgress {
            self.progress_bar
                .enable_steady_tick(Duration::from_millis(200));
        } else if status != StepStatus::Pending {
            self.progress_bar.finish();
        }
    }
}

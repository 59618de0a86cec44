//! Terminal rendering of workflow views and events.

use colored::Colorize;
use taxflow_application::WorkflowEvent;
use taxflow_application::view::{Alignment, ChatLine, ChatView, ComparisonView, ReviewFormView};
use taxflow_application::workflow::{StatusLevel, StatusMessage};

const LINE_WIDTH: usize = 78;

/// Prints workflow events as they arrive.
///
/// Chat views are full renders; only lines not already on screen are
/// printed. When the transcript is replaced by one that does not extend
/// what was shown, it is printed again from the top.
#[derive(Default)]
pub struct EventPrinter {
    shown: Vec<ChatLine>,
    shown_errors: usize,
}

impl EventPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print(&mut self, event: &WorkflowEvent) {
        match event {
            WorkflowEvent::StageChanged(stage) => {
                tracing::debug!("[Repl] Stage -> {}", stage);
            }
            WorkflowEvent::Status(Some(status)) => print_status(status),
            WorkflowEvent::Status(None) => {}
            WorkflowEvent::ReviewForm(form) if !form.submitting => print_review(form),
            WorkflowEvent::ReviewForm(_) => {
                println!("{}", "Submitting reviewed data...".bright_black());
            }
            WorkflowEvent::ReviewFormHidden => {}
            WorkflowEvent::Comparison(comparison) => print_comparison(comparison),
            WorkflowEvent::Chat(chat) => self.print_chat(chat),
        }
    }

    fn print_chat(&mut self, chat: &ChatView) {
        if let Some(placeholder) = chat.placeholder {
            println!("{}", placeholder.italic().bright_black());
            self.shown.clear();
        }

        let extends = chat.lines.len() >= self.shown.len()
            && chat.lines[..self.shown.len()] == self.shown[..];
        let start = if extends {
            self.shown.len()
        } else {
            println!("{}", "--- transcript ---".bright_black());
            0
        };
        for line in &chat.lines[start..] {
            print_chat_line(line);
        }
        self.shown = chat.lines.clone();

        if chat.errors.len() < self.shown_errors {
            self.shown_errors = 0;
        }
        for error in &chat.errors[self.shown_errors..] {
            println!("{}", error.red());
        }
        self.shown_errors = chat.errors.len();
    }
}

fn print_chat_line(line: &ChatLine) {
    match line.align {
        Alignment::Right => {
            println!("{}", format!("{:>LINE_WIDTH$}", line.content).green());
        }
        Alignment::Left => {
            for text in line.content.lines() {
                println!("{}", text.bright_blue());
            }
        }
    }
}

pub fn print_status(status: &StatusMessage) {
    match status.level {
        StatusLevel::Error => println!("{}", status.text.red()),
        StatusLevel::Success => println!("{}", status.text.bright_green()),
    }
}

pub fn print_review(form: &ReviewFormView) {
    println!("{}", "Review extracted data".bright_magenta().bold());
    for input in &form.inputs {
        let value = if input.value.is_empty() {
            "(empty)".bright_black().to_string()
        } else {
            input.value.clone()
        };
        println!(
            "  {:<20} {}  {}",
            input.label,
            value,
            format!("[{}]", input.name).bright_black()
        );
    }
    println!("  {:<20} {}", "Tax Regime", form.tax_regime);
    println!(
        "{}",
        "Edit with /set <field> <value> or /regime <old|new>, then /submit.".bright_black()
    );
}

pub fn print_comparison(comparison: &ComparisonView) {
    println!("{}", comparison.title.bright_magenta().bold());
    for card in &comparison.cards {
        println!("  {}", card.title.bold());
        for metric in &card.metrics {
            println!("    {:<18} {}", metric.label, metric.value);
        }
    }
}

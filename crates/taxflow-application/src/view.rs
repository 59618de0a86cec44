//! Pure rendering of workflow state into a target-independent view.
//!
//! Nothing here mutates state or performs IO. A front-end draws whatever
//! [`render`] returns.

use serde::Serialize;
use taxflow_core::extraction::TaxRegime;
use taxflow_core::review::{INPUT_STEP, ReviewForm};
use taxflow_core::session::{ChatMessage, MessageRole, Stage, StageKind};
use taxflow_core::tax::{RegimeSummary, TaxComparison};

use crate::workflow::{StatusMessage, WorkflowState};

/// Placeholder shown while the chat bootstrap is pending.
pub const CHAT_LOADING_PLACEHOLDER: &str = "Loading AI advisor...";

const CURRENCY_SYMBOL: &str = "₹";
const MAX_FRACTION_DIGITS: usize = 3;

/// Everything a front-end needs to draw the workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowView {
    pub stage: StageKind,
    pub status: Option<StatusMessage>,
    pub review: Option<ReviewFormView>,
    pub comparison: Option<ComparisonView>,
    pub chat: Option<ChatView>,
}

/// One numeric input on the review form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputView {
    pub name: String,
    pub label: String,
    pub value: String,
    pub step: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewFormView {
    pub inputs: Vec<InputView>,
    pub tax_regime: TaxRegime,
    /// Submission in flight; inputs should be read-only.
    pub submitting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricView {
    pub label: &'static str,
    pub value: String,
}

/// One regime card of the comparison panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegimeCard {
    pub regime: TaxRegime,
    pub title: &'static str,
    pub metrics: Vec<MetricView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonView {
    pub title: &'static str,
    pub cards: Vec<RegimeCard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Right,
}

/// A rendered transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatLine {
    pub role: MessageRole,
    pub content: String,
    pub align: Alignment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatView {
    pub placeholder: Option<&'static str>,
    pub lines: Vec<ChatLine>,
    pub errors: Vec<String>,
    /// Index of the line to scroll into view after drawing.
    pub scroll_to: Option<usize>,
}

/// Renders the whole workflow.
pub fn render(state: &WorkflowState) -> WorkflowView {
    let displayed = state.displayed_stage();

    let review = match displayed {
        Stage::Reviewing { form } => Some(render_review(form, false)),
        Stage::Submitting { form } => Some(render_review(form, true)),
        _ => None,
    };

    let comparison = displayed.comparison().map(render_comparison);
    let chat = comparison.as_ref().map(|_| render_chat(state));

    WorkflowView {
        stage: state.stage_kind(),
        status: state.status().cloned(),
        review,
        comparison,
        chat,
    }
}

/// Renders the review form inputs in their fixed order.
pub fn render_review(form: &ReviewForm, submitting: bool) -> ReviewFormView {
    let inputs = form
        .fields()
        .iter()
        .map(|entry| InputView {
            name: entry.field.name().to_string(),
            label: entry.label.clone(),
            value: entry.value.clone(),
            step: INPUT_STEP,
        })
        .collect();

    ReviewFormView {
        inputs,
        tax_regime: form.tax_regime(),
        submitting,
    }
}

pub fn render_comparison(comparison: &TaxComparison) -> ComparisonView {
    ComparisonView {
        title: "Tax Regime Comparison",
        cards: [TaxRegime::Old, TaxRegime::New]
            .into_iter()
            .map(|regime| regime_card(regime, comparison.regime(regime)))
            .collect(),
    }
}

fn regime_card(regime: TaxRegime, summary: &RegimeSummary) -> RegimeCard {
    let title = match regime {
        TaxRegime::Old => "Old Regime",
        TaxRegime::New => "New Regime",
    };
    let metrics = [
        ("Taxable Income", summary.taxable_income),
        ("Total Tax", summary.total_tax),
        ("Deductions", summary.deductions),
        ("Net Tax Payable", summary.net_tax_payable),
    ]
    .into_iter()
    .map(|(label, amount)| MetricView {
        label,
        value: format_currency(amount),
    })
    .collect();

    RegimeCard {
        regime,
        title,
        metrics,
    }
}

/// Renders the chat panel.
///
/// While the bootstrap is pending only the placeholder shows; once it has
/// failed the error replaces the placeholder.
pub fn render_chat(state: &WorkflowState) -> ChatView {
    let loading = state.displayed_stage().kind() == StageKind::ChatLoading;
    let placeholder = (loading && state.chat_errors().is_empty()).then_some(CHAT_LOADING_PLACEHOLDER);

    let lines: Vec<ChatLine> = if loading {
        Vec::new()
    } else {
        state.chat_history().iter().filter_map(render_message).collect()
    };
    let scroll_to = lines.len().checked_sub(1);

    ChatView {
        placeholder,
        lines,
        errors: state.chat_errors().to_vec(),
        scroll_to,
    }
}

/// Roles other than user and assistant are not rendered.
fn render_message(message: &ChatMessage) -> Option<ChatLine> {
    let align = match message.role {
        MessageRole::User => Alignment::Right,
        MessageRole::Assistant => Alignment::Left,
        MessageRole::Other(_) => return None,
    };
    Some(ChatLine {
        role: message.role.clone(),
        content: message.content.clone(),
        align,
    })
}

pub fn format_currency(amount: f64) -> String {
    format!("{}{}", CURRENCY_SYMBOL, format_amount(amount))
}

/// Formats an amount with comma thousands separators and at most three
/// fraction digits, trailing zeros dropped.
///
/// ```
/// use taxflow_application::view::format_amount;
/// assert_eq!(format_amount(1234567.5), "1,234,567.5");
/// ```
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

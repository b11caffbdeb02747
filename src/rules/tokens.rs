//! TOKEN_OVERAGE rule: estimates input token usage and cost, and flags a
//! prompt that risks overflowing the target model's context window or a
//! caller-supplied budget (spec.md §4.2, §4.10).
//!
//! Active only when `model` is provided: without a model there is no
//! context window or pricing to measure against.

use crate::model::{
    AnalyzeInput, Confidence, Evidence, Issue, IssueCode, Report, Scope, Severity, Suggestion,
    SuggestionKind,
};
use crate::text::extract_text;
use crate::tokenizer::{estimate_tokens_auto, models, most_conservative, TokenEstimate};
use crate::Result;

const CODE: &str = "TOKEN_OVERAGE";

fn estimated_cost(meta: &models::ModelMeta, tokens: usize) -> Option<f64> {
    if meta.price_per_input_token <= 0.0 {
        return None;
    }
    Some(meta.price_per_input_token * tokens as f64)
}

/// The units to estimate separately: each message's content when
/// `messages` is present, else the whole prompt (spec.md §4.10 step 2).
fn estimation_units(input: &AnalyzeInput) -> Vec<&str> {
    if let Some(messages) = &input.messages {
        if !messages.is_empty() {
            return messages.iter().map(|m| m.content.as_str()).collect();
        }
    }
    input.prompt.as_deref().into_iter().collect()
}

fn trim_context_suggestion(report: &mut Report, issue_id: &str) {
    report.push_suggestion(Suggestion::for_issue(
        SuggestionKind::TrimContext,
        "Trim or summarize the prompt before sending it to the model",
        issue_id,
    ));
}

/// Runs the token-overage rule (spec.md §4.1, §4.2, §4.10).
///
/// # Errors
///
/// Propagates a tokenizer backend failure; in practice the exact-token
/// backend always falls back to a cheap estimate rather than erroring.
pub fn run(input: &AnalyzeInput, report: &mut Report) -> Result<()> {
    if input.options.is_disabled(CODE) {
        return Ok(());
    }
    let Some(model_name) = input.model.as_deref() else {
        return Ok(());
    };

    let model_meta = models::lookup(Some(model_name));
    report.meta.model_hint = Some(model_name.to_string());
    report.meta.context_window = Some(model_meta.context_window);

    let text = extract_text(input);
    let char_count = text.chars().count();
    report.cost.char_count = Some(char_count);

    if char_count > input.options.max_chars {
        let tokens = crate::tokenizer::cheap::cheap_tokens_approx(&text);
        report.cost.est_input_tokens = tokens;
        report.cost.method = Some("char_estimate".to_string());
        report.cost.est_usd = estimated_cost(&model_meta, tokens);

        let id = report.push_issue(Issue {
            id: String::new(),
            code: IssueCode::TokenOverage,
            severity: Severity::Medium,
            detail: format!(
                "prompt text is {char_count} characters, exceeding the {} character cap before exact token estimation was attempted",
                input.options.max_chars
            ),
            evidence: Evidence::Flat(vec![format!("{char_count} characters")]),
            scope: Scope::Prompt,
            confidence: Confidence::Medium,
        });
        trim_context_suggestion(report, &id);
        return Ok(());
    }

    let units = estimation_units(input);
    let mut estimates = Vec::with_capacity(units.len());
    for unit in &units {
        let Some(estimate) =
            estimate_tokens_auto(unit, input.options.token_estimation, model_meta.context_window)?
        else {
            // Off mode: no per-unit estimate, so no aggregate either.
            return Ok(());
        };
        estimates.push(estimate);
    }

    let tokens: usize = estimates.iter().map(|e| e.tokens).sum();
    let TokenEstimate { method, .. } =
        most_conservative(&estimates).unwrap_or(TokenEstimate { tokens: 0, method: crate::tokenizer::EstimationMethod::Cheap });

    report.cost.est_input_tokens = tokens;
    report.cost.method = Some(method.to_string());
    report.cost.est_usd = estimated_cost(&model_meta, tokens);

    let cap = input
        .options
        .max_input_tokens
        .map_or(model_meta.context_window, |max| max.min(model_meta.context_window));

    if tokens > cap {
        let id = report.push_issue(Issue {
            id: String::new(),
            code: IssueCode::TokenOverage,
            severity: Severity::High,
            detail: format!(
                "estimated {tokens} input tokens exceeds the effective cap of {cap} ({method} method)"
            ),
            evidence: Evidence::Flat(vec![format!("{tokens} tokens ({method})")]),
            scope: Scope::Prompt,
            confidence: Confidence::Medium,
        });
        trim_context_suggestion(report, &id);
    }

    if input.options.token_estimation != crate::model::TokenEstimationMode::Off {
        if let (Some(max_cost), Some(est_cost)) = (input.options.max_cost_usd, report.cost.est_usd) {
            if est_cost > max_cost {
                let id = report.push_issue(Issue {
                    id: String::new(),
                    code: IssueCode::TokenOverage,
                    severity: Severity::High,
                    detail: format!(
                        "estimated cost ${est_cost:.4} exceeds the configured cap of ${max_cost:.4}"
                    ),
                    evidence: Evidence::Flat(vec![format!("${est_cost:.4} estimated")]),
                    scope: Scope::Prompt,
                    confidence: Confidence::Medium,
                });
                trim_context_suggestion(report, &id);
            }
        }
    }

    Ok(())
}

//! The fixed set of linting rules (spec.md §4). Each rule is a plain
//! function of `(&AnalyzeInput, &mut Report) -> Result<()>`; the
//! orchestrator decides execution order and timing.

pub mod conflicts;
pub mod pii;
pub mod placeholder;
pub mod reference;
pub mod schema_risk;
pub mod schema_validation;
pub mod security;
pub mod tokens;

/// One entry per rule, in the fixed execution order the orchestrator runs
/// them (spec.md §4.1, §5). The stable rule-code string doubles as the
/// `meta.rule_timings` key and the `AnalyzeOptions::disabled_rules` entry.
pub type RuleFn = fn(&crate::model::AnalyzeInput, &mut crate::model::Report) -> crate::Result<()>;

/// `(rule_code, run_fn)` pairs, in fixed execution order.
#[must_use]
pub fn ordered() -> &'static [(&'static str, RuleFn)] {
    &[
        ("MISSING_PLACEHOLDER", placeholder::run),
        ("MISSING_REFERENCE", reference::run),
        ("CONFLICTING_INSTRUCTION", conflicts::run),
        ("SCHEMA_RISK", schema_risk::run),
        ("INVALID_SCHEMA", schema_validation::run),
        ("TOKEN_OVERAGE", tokens::run),
        ("PII_DETECTED", pii::run),
        ("SECURITY_THREAT", security::run),
    ]
}

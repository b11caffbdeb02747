//! Static per-model metadata: context window size and per-token pricing
//! (spec.md §4.10, §6).

/// Context window and pricing for a known model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelMeta {
    /// Maximum input+output token window.
    pub context_window: usize,
    /// USD per input token.
    pub price_per_input_token: f64,
    /// USD per output token (unused for cost estimation, kept for
    /// completeness of the metadata table).
    pub price_per_output_token: f64,
}

/// Context window used for unrecognized model identifiers.
pub const DEFAULT_CONTEXT_WINDOW: usize = 16_384;

const KNOWN_MODELS: &[(&str, ModelMeta)] = &[
    (
        "gpt-4o",
        ModelMeta {
            context_window: 128_000,
            price_per_input_token: 0.000_0025,
            price_per_output_token: 0.000_010,
        },
    ),
    (
        "gpt-4o-mini",
        ModelMeta {
            context_window: 128_000,
            price_per_input_token: 0.000_000_15,
            price_per_output_token: 0.000_000_6,
        },
    ),
    (
        "gpt-4-turbo",
        ModelMeta {
            context_window: 128_000,
            price_per_input_token: 0.000_010,
            price_per_output_token: 0.000_030,
        },
    ),
    (
        "gpt-4",
        ModelMeta {
            context_window: 8_192,
            price_per_input_token: 0.000_030,
            price_per_output_token: 0.000_060,
        },
    ),
    (
        "gpt-3.5-turbo",
        ModelMeta {
            context_window: 16_384,
            price_per_input_token: 0.000_000_5,
            price_per_output_token: 0.000_001_5,
        },
    ),
    (
        "gpt-3.5-turbo-16k",
        ModelMeta {
            context_window: 16_384,
            price_per_input_token: 0.000_003,
            price_per_output_token: 0.000_004,
        },
    ),
];

/// Looks up metadata for `model`, falling back to
/// [`DEFAULT_CONTEXT_WINDOW`] with no pricing when the model is unknown.
#[must_use]
pub fn lookup(model: Option<&str>) -> ModelMeta {
    model
        .and_then(|name| {
            KNOWN_MODELS
                .iter()
                .find(|(known, _)| *known == name)
                .map(|(_, meta)| *meta)
        })
        .unwrap_or(ModelMeta {
            context_window: DEFAULT_CONTEXT_WINDOW,
            price_per_input_token: 0.0,
            price_per_output_token: 0.0,
        })
}

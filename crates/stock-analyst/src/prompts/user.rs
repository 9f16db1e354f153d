//! User message template

/// The user's question followed by the analysis instruction
pub(crate) const ANALYSIS_REQUEST: &str = "Query: {{ query }}\n\nProvide detailed analysis:";

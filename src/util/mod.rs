//! Miscellaneous utilities.

/// Render an error and its chain of sources, one per line, each source
/// indented one step deeper than the error it caused.
pub fn aggregate_error_tree(error: &(dyn std::error::Error + 'static), indent_step: usize) -> String {
    let mut next: Option<&(dyn std::error::Error + 'static)> = Some(error);
    let mut gen: usize = 0;
    let mut aggregated: String = String::new();
    while let Some(node) = next {
        aggregated.push_str(&" ".repeat(gen * indent_step));
        aggregated.push_str(&node.to_string());
        aggregated.push('\n');
        next = node.source();
        gen = gen + 1;
    }
    return aggregated;
}

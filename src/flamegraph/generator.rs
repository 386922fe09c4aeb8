//! SVG flamegraph generation using the inferno library.

use super::stacks::CollapsedStack;
use crate::utils::error::FlamegraphError;
use inferno::flamegraph::{self, Options};
use log::info;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
    /// Unit shown next to sample counts in tooltips
    pub count_name: String,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Call Tree Profile".to_string(),
            width: 1200,
            count_name: "ns".to_string(),
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Generate SVG flamegraph from collapsed stacks
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - nothing to draw
/// * `FlamegraphError::RenderFailed` - inferno rejected the stacks or failed to write the SVG
pub fn generate_flamegraph(
    stacks: &[CollapsedStack],
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    if stacks.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating flamegraph with {} stacks", stacks.len());

    let lines: Vec<String> = stacks.iter().map(CollapsedStack::to_line).collect();

    // Options is non-exhaustive, so it cannot be built with a struct literal
    let mut options = Options::default();
    options.title = config.title;
    options.count_name = config.count_name;
    options.image_width = Some(config.width);

    let mut svg = Vec::new();
    flamegraph::from_lines(&mut options, lines.iter().map(String::as_str), &mut svg)
        .map_err(|e| FlamegraphError::RenderFailed(e.to_string()))?;

    let svg = String::from_utf8(svg)?;
    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

/// Plain-text listing of the heaviest stacks
pub fn generate_text_summary(stacks: &[CollapsedStack], top_n: usize) -> String {
    let total: u64 = stacks.iter().map(|s| s.weight).fold(0, u64::saturating_add);
    let mut summary = format!("Top {} stacks by self time:", top_n.min(stacks.len()));

    for (i, stack) in stacks.iter().take(top_n).enumerate() {
        let percentage = if total > 0 {
            stack.weight as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        summary.push_str(&format!(
            "\n{:>3}. {:>12} ns ({:>5.1}%)  {}",
            i + 1,
            stack.weight,
            percentage,
            stack.stack
        ));
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stacks() -> Vec<CollapsedStack> {
        vec![
            CollapsedStack::new("root;frame;draw".to_string(), 750),
            CollapsedStack::new("root;frame".to_string(), 250),
        ]
    }

    #[test]
    fn test_generate_flamegraph_renders_svg() {
        let config = FlamegraphConfig::new().with_title("Frame timings");
        let svg = generate_flamegraph(&sample_stacks(), Some(&config)).unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Frame timings"));
        assert!(svg.contains("draw"));
    }

    #[test]
    fn test_generate_flamegraph_zero_weight_fails_to_render() {
        // Zero total weight leaves inferno nothing to draw
        let stacks = vec![CollapsedStack::new("root;frame".to_string(), 0)];

        assert!(matches!(
            generate_flamegraph(&stacks, None),
            Err(FlamegraphError::RenderFailed(_))
        ));
    }

    #[test]
    fn test_generate_flamegraph_empty() {
        assert!(matches!(
            generate_flamegraph(&[], None),
            Err(FlamegraphError::EmptyStacks)
        ));
    }

    #[test]
    fn test_text_summary_lists_heaviest_first() {
        let summary = generate_text_summary(&sample_stacks(), 1);

        assert!(summary.starts_with("Top 1 stacks by self time:"));
        assert!(summary.contains("root;frame;draw"));
        assert!(summary.contains("75.0%"));
        assert!(!summary.contains("\n  2."));
    }
}

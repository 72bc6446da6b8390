//! Calculate performance metrics and hot paths from aggregated trees.
//!
//! Hot paths are the calling contexts that consume the most weight
//! (samples, bytes). These are the primary targets for optimization.

use super::node::CollapsedStack;
use crate::parser::schema::HotPath;
use log::debug;

/// Calculate hot paths from collapsed stacks
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `stacks` - Collapsed stacks derived from the CCT (already sorted)
/// * `total_weight` - Total weight recorded in the stream
/// * `top_n` - Number of top paths to return (e.g., 10)
///
/// # Returns
/// Vector of hot paths, sorted by weight (descending)
pub fn calculate_hot_paths(
    stacks: &[CollapsedStack],
    total_weight: u64,
    top_n: usize,
) -> Vec<HotPath> {
    debug!(
        "Calculating top {} hot paths from {} stacks",
        top_n,
        stacks.len()
    );

    stacks
        .iter()
        .take(top_n)
        .map(|stack| create_hot_path(stack, total_weight))
        .collect()
}

/// Create a HotPath from a CollapsedStack
fn create_hot_path(stack: &CollapsedStack, total_weight: u64) -> HotPath {
    let percentage = if total_weight > 0 {
        (stack.weight as f64 / total_weight as f64) * 100.0
    } else {
        0.0
    };

    HotPath {
        stack: stack.stack.clone(),
        weight: stack.weight,
        percentage,
    }
}

/// Calculate weight distribution statistics
///
/// **Public** - provides summary statistics
pub fn calculate_weight_distribution(stacks: &[CollapsedStack]) -> WeightDistribution {
    if stacks.is_empty() {
        return WeightDistribution::default();
    }

    let total: u64 = stacks.iter().map(|s| s.weight).sum();
    let count = stacks.len();
    let mean = total / count.max(1) as u64;

    let mut weights: Vec<u64> = stacks.iter().map(|s| s.weight).collect();
    weights.sort_unstable();
    let median = weights[weights.len() / 2];

    // Stacks arrive sorted descending, so the head is the top slice
    let top_10_percent_count = (count as f64 * 0.1).ceil() as usize;
    let top_10_percent_weight: u64 = stacks
        .iter()
        .take(top_10_percent_count)
        .map(|s| s.weight)
        .sum();

    WeightDistribution {
        total_weight: total,
        stack_count: count,
        mean_weight_per_stack: mean,
        median_weight_per_stack: median,
        top_10_percent_weight,
        top_10_percent_percentage: if total > 0 {
            (top_10_percent_weight as f64 / total as f64) * 100.0
        } else {
            0.0
        },
    }
}

/// Weight distribution statistics
#[derive(Debug, Clone, Default)]
pub struct WeightDistribution {
    /// Total weight across all stacks
    pub total_weight: u64,

    /// Number of unique stacks
    pub stack_count: usize,

    /// Mean weight per stack
    pub mean_weight_per_stack: u64,

    /// Median weight per stack
    pub median_weight_per_stack: u64,

    /// Weight held by the top 10% of stacks
    pub top_10_percent_weight: u64,

    /// Percentage of total weight in the top 10%
    pub top_10_percent_percentage: f64,
}

impl WeightDistribution {
    /// Check if the distribution is highly concentrated
    ///
    /// Returns true if the top 10% of stacks hold >80% of the weight.
    pub fn is_highly_concentrated(&self) -> bool {
        self.top_10_percent_percentage > 80.0
    }

    /// Get a human-readable summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Total: {} | Stacks: {} | Mean: {} | Median: {} | Top 10%: {:.1}%",
            self.total_weight,
            self.stack_count,
            self.mean_weight_per_stack,
            self.median_weight_per_stack,
            self.top_10_percent_percentage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_hot_paths() {
        let stacks = vec![
            CollapsedStack::new("main;execute".to_string(), 5000),
            CollapsedStack::new("main;storage".to_string(), 3000),
            CollapsedStack::new("main;compute".to_string(), 2000),
        ];

        let hot_paths = calculate_hot_paths(&stacks, 10000, 2);

        assert_eq!(hot_paths.len(), 2);
        assert_eq!(hot_paths[0].stack, "main;execute");
        assert_eq!(hot_paths[0].weight, 5000);
        assert_eq!(hot_paths[0].percentage, 50.0);
    }

    #[test]
    fn test_calculate_weight_distribution() {
        let stacks = vec![
            CollapsedStack::new("stack1".to_string(), 8500),
            CollapsedStack::new("stack2".to_string(), 1000),
            CollapsedStack::new("stack3".to_string(), 250),
            CollapsedStack::new("stack4".to_string(), 250),
        ];

        let dist = calculate_weight_distribution(&stacks);

        assert_eq!(dist.total_weight, 10000);
        assert_eq!(dist.stack_count, 4);
        assert_eq!(dist.mean_weight_per_stack, 2500);
        assert!(dist.is_highly_concentrated());
    }

    #[test]
    fn test_weight_distribution_empty() {
        let stacks: Vec<CollapsedStack> = vec![];
        let dist = calculate_weight_distribution(&stacks);
        assert_eq!(dist.total_weight, 0);
        assert_eq!(dist.stack_count, 0);
    }

    #[test]
    fn test_hot_path_zero_total() {
        let stacks = vec![CollapsedStack::new("main".to_string(), 100)];
        let hot_paths = calculate_hot_paths(&stacks, 0, 5);
        assert_eq!(hot_paths[0].percentage, 0.0);
    }
}

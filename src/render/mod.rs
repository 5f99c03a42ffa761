//! Chart rendering for the sweep's running correctness counts.
//!
//! The charting collaborator sits behind the [`ChartSurface`] trait so the
//! sweep controller never knows what it is drawing on. The built-in
//! implementation draws a two-category bar chart on the terminal; the web
//! dashboard renders the same two categories in the browser from
//! `/api/progress`.

use std::io::IsTerminal;

use colored::Colorize;

use crate::error::StepError;

/// Where the two-category accuracy chart is drawn.
///
/// A missing surface is reported as [`StepError::RenderSurfaceMissing`];
/// the caller logs it and the step continues.
pub trait ChartSurface {
    fn draw(&mut self, correct: u64, incorrect: u64) -> Result<(), StepError>;
}

// ---------------------------------------------------------------------------
// Terminal chart
// ---------------------------------------------------------------------------

/// In-place two-bar chart on stdout.
///
/// Redraws over its previous output on every call, so a 10 ms cadence does
/// not scroll the terminal. Step failures are printed to stderr by the CLI
/// layer and therefore don't fight the chart for lines.
pub struct TerminalChart {
    width: usize,
    drawn_before: bool,
}

impl TerminalChart {
    pub fn new() -> Self {
        Self {
            width: 40,
            drawn_before: false,
        }
    }
}

impl Default for TerminalChart {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartSurface for TerminalChart {
    fn draw(&mut self, correct: u64, incorrect: u64) -> Result<(), StepError> {
        if !std::io::stdout().is_terminal() {
            return Err(StepError::RenderSurfaceMissing);
        }

        if self.drawn_before {
            // Move back up over the two bar lines
            print!("\x1b[2A");
        }
        self.drawn_before = true;

        let correct_bar = bar(bar_len(correct, correct + incorrect, self.width));
        let incorrect_bar = bar(bar_len(incorrect, correct + incorrect, self.width));

        println!(
            "\x1b[2K  {:<9} {} {}",
            "Correct",
            correct_bar.green(),
            correct
        );
        println!(
            "\x1b[2K  {:<9} {} {}",
            "Incorrect",
            incorrect_bar.red(),
            incorrect
        );

        Ok(())
    }
}

/// Proportional bar length for a count within a total, clamped to `width`.
///
/// A non-zero count always gets at least one cell so small categories stay
/// visible next to large ones.
pub fn bar_len(count: u64, total: u64, width: usize) -> usize {
    if count == 0 {
        return 0;
    }
    if total == 0 {
        return 0;
    }
    let scaled = (count as f64 / total as f64 * width as f64).round() as usize;
    scaled.clamp(1, width)
}

fn bar(len: usize) -> String {
    "█".repeat(len)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_len_is_proportional() {
        assert_eq!(bar_len(50, 100, 40), 20);
        assert_eq!(bar_len(100, 100, 40), 40);
        assert_eq!(bar_len(25, 100, 40), 10);
    }

    #[test]
    fn bar_len_zero_count_is_empty() {
        assert_eq!(bar_len(0, 100, 40), 0);
        assert_eq!(bar_len(0, 0, 40), 0);
    }

    #[test]
    fn bar_len_small_nonzero_count_stays_visible() {
        // 1 out of 70000 would round to zero cells; clamp keeps one.
        assert_eq!(bar_len(1, 70_000, 40), 1);
    }

    #[test]
    fn bar_len_never_exceeds_width() {
        assert_eq!(bar_len(100, 100, 40), 40);
        assert_eq!(bar_len(99, 100, 40), 40);
    }
}

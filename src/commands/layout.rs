//! Layout command - pack items into justified rows

use colored::Colorize;

use crate::{
    BucketviewError,
    config::BucketviewConfig,
    layout::{self, LayoutItem, LayoutOptions},
    output,
};

type Result<T> = std::result::Result<T, BucketviewError>;

/// Layout options from config with command-line overrides applied
#[must_use]
pub fn options(config: &BucketviewConfig, gap: Option<f64>, row_height: Option<f64>) -> LayoutOptions {
    LayoutOptions {
        gap: gap.unwrap_or(config.layout.gap),
        target_row_height: row_height.unwrap_or(config.layout.target_row_height),
        ..config.layout
    }
}

/// Execute the layout command
///
/// # Errors
///
/// Returns `BucketviewError::InvalidInput` if the width or row height leave
/// nothing to lay out.
pub fn execute(items: &[LayoutItem], width: f64, options: &LayoutOptions, quiet: bool) -> Result<()> {
    let boxes = layout::layout(items, width, options);
    if boxes.is_empty() {
        return Err(BucketviewError::InvalidInput(format!(
            "cannot lay out {} item(s) at width {width} and row height {}",
            items.len(),
            options.target_row_height
        )));
    }

    if !quiet {
        let rows = layout::rows(&boxes).len();
        println!("{}", format!("{} item(s) in {rows} row(s):", boxes.len()).bold());
    }
    for (index, item) in boxes.iter().enumerate() {
        println!("{}", output::layout_line(index, item, quiet));
    }
    if !quiet {
        println!("Total height: {:.2}", layout::layout_height(&boxes));
    }
    Ok(())
}

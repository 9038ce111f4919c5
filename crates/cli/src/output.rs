use anyhow::Result;
use opchecklist_core::{ChecklistSummary, Section};
use opchecklist_view::ViewOutput;

/// Output format for `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn print_view(output: &ViewOutput, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = match output {
                ViewOutput::Grouped(grouped) => serde_json::to_value(grouped)?,
                ViewOutput::Flat(items) => serde_json::to_value(items)?,
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => print!("{}", render_text(output)),
    }
    Ok(())
}

pub fn render_text(output: &ViewOutput) -> String {
    let mut out = String::new();
    match output {
        ViewOutput::Flat(items) => {
            if items.is_empty() {
                out.push_str("No checklists.\n");
            }
            for checklist in items {
                out.push_str(&checklist_line(checklist));
            }
        }
        ViewOutput::Grouped(grouped) => {
            for section in grouped.sections() {
                out.push_str(&section_block(section));
            }
            out.push_str(&format!("{} checklists\n", grouped.total_checklists));
        }
    }
    out
}

fn section_block(section: &Section) -> String {
    let mut out = format!(
        "{} ({}, avg {:.0}%)\n",
        section.title(),
        section.checklists.len(),
        section.average_progress
    );
    if section.is_empty() {
        out.push_str("  (none)\n");
    }
    for checklist in &section.checklists {
        out.push_str(&checklist_line(checklist));
    }
    out
}

fn checklist_line(checklist: &ChecklistSummary) -> String {
    let mut line = format!(
        "  [{}] {}  {}/{} ({:.0}%)",
        checklist.completion_status().label(),
        checklist.name,
        checklist.completed_items,
        checklist.total_items,
        checklist.progress_percentage
    );
    if !checklist.assigned_positions.trim().is_empty() {
        line.push_str(&format!("  @ {}", checklist.positions().join(", ")));
    }
    if checklist.is_archived {
        line.push_str("  (archived)");
    }
    line.push('\n');
    line
}

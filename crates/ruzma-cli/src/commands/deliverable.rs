//! Deliverable field inspection and legacy-format maintenance.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use ruzma_core::error::AppError;
use ruzma_core::types::MilestoneId;
use ruzma_database::{MilestoneRepository, MilestoneStore};
use ruzma_entity::deliverable::{DecodedField, FieldFormat, RevisionData, SharedLink};
use ruzma_service::{DeliverableService, DeliverableView, DeliverableWriter, NormalizeReport};

use crate::output::{self, OutputFormat};

/// Arguments for the deliverable command
#[derive(Debug, Args)]
pub struct DeliverableArgs {
    /// Deliverable subcommand
    #[command(subcommand)]
    pub command: DeliverableCommand,
}

/// Deliverable subcommands
#[derive(Debug, Subcommand)]
pub enum DeliverableCommand {
    /// Decode a deliverable field and show its links and revision ledger
    Inspect {
        /// Raw column text to decode without touching the database
        #[arg(long, conflicts_with = "milestone", required_unless_present = "milestone")]
        raw: Option<String>,

        /// Milestone whose stored field is decoded
        #[arg(long)]
        milestone: Option<MilestoneId>,
    },
    /// Rewrite legacy deliverable fields into the document format
    Normalize {
        /// Report legacy fields without writing
        #[arg(long)]
        dry_run: bool,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "URL")]
    url: String,
}

#[derive(Tabled)]
struct RequestRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Requested")]
    requested_at: String,
    #[tabled(rename = "Images")]
    images: usize,
    #[tabled(rename = "Feedback")]
    feedback: String,
}

#[derive(Tabled)]
struct NormalizeRow {
    #[tabled(rename = "Milestone")]
    milestone_id: String,
    #[tabled(rename = "Format")]
    format: String,
    #[tabled(rename = "Rewritten")]
    rewritten: String,
}

/// Decoded field shown by `inspect --raw`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawInspection {
    format: FieldFormat,
    links: Vec<SharedLink>,
    revision_data: RevisionData,
    remaining_revisions: Option<u32>,
    can_request_revision: bool,
}

/// Execute deliverable commands
pub async fn execute(
    args: &DeliverableArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        DeliverableCommand::Inspect {
            raw: Some(raw),
            milestone: _,
        } => {
            let decoded = DecodedField::decode(Some(raw));
            let revision_data = decoded.revision_data();
            let inspection = RawInspection {
                format: decoded.format(),
                remaining_revisions: revision_data.remaining_revisions(),
                can_request_revision: revision_data.can_request_revision(),
                links: decoded.into_links(),
                revision_data,
            };
            match format {
                OutputFormat::Json => output::print_json(&inspection),
                OutputFormat::Table => print_field(
                    inspection.format,
                    &inspection.links,
                    &inspection.revision_data,
                ),
            }
            Ok(())
        }
        DeliverableCommand::Inspect {
            raw: None,
            milestone: Some(id),
        } => {
            let view = open_service(config_path).await?.view(*id).await?;
            match format {
                OutputFormat::Json => output::print_json(&view),
                OutputFormat::Table => print_view(&view),
            }
            Ok(())
        }
        DeliverableCommand::Inspect { .. } => Err(AppError::validation(
            "Pass either --raw or --milestone",
        )),
        DeliverableCommand::Normalize { dry_run, yes } => {
            if !dry_run && !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt("Rewrite every legacy deliverable field in place?")
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let report = open_service(config_path).await?.normalize(*dry_run).await?;
            match format {
                OutputFormat::Json => output::print_json(&report),
                OutputFormat::Table => print_report(&report, *dry_run),
            }
            Ok(())
        }
    }
}

async fn open_service(config_path: &str) -> Result<DeliverableService, AppError> {
    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;
    let store: Arc<dyn MilestoneStore> = Arc::new(MilestoneRepository::new(db.pool().clone()));
    let writer = Arc::new(DeliverableWriter::new(
        Arc::clone(&store),
        &config.deliverables,
    ));
    Ok(DeliverableService::new(store, writer))
}

fn print_view(view: &DeliverableView) {
    output::print_kv("Milestone", &view.milestone_id.to_string());
    print_field(view.format, &view.links, &view.revision_data);
}

fn print_field(format: FieldFormat, links: &[SharedLink], ledger: &RevisionData) {
    output::print_kv("Format", format.as_str());
    if format == FieldFormat::Corrupt {
        output::print_warning("Stored value is not a recognised deliverable shape");
    }

    output::print_heading("Shared links");
    let rows: Vec<LinkRow> = links
        .iter()
        .enumerate()
        .map(|(i, link)| LinkRow {
            position: i + 1,
            title: link.title.clone(),
            url: link.url.clone(),
        })
        .collect();
    output::print_table(&rows, "No shared links.");

    output::print_heading("Revisions");
    output::print_kv(
        "Max revisions",
        &ledger
            .max_revisions
            .map_or_else(|| "unlimited".to_string(), |m| m.to_string()),
    );
    output::print_kv("Used revisions", &ledger.used_revisions.to_string());
    output::print_kv(
        "Remaining",
        &ledger
            .remaining_revisions()
            .map_or_else(|| "unlimited".to_string(), |r| r.to_string()),
    );
    output::print_kv("Pending requests", &ledger.pending_count().to_string());

    let rows: Vec<RequestRow> = ledger
        .requests
        .iter()
        .map(|r| RequestRow {
            id: r.id.clone(),
            status: r.status.to_string(),
            requested_at: r.requested_at.format("%Y-%m-%d %H:%M").to_string(),
            images: r.images.len(),
            feedback: r.feedback.clone(),
        })
        .collect();
    output::print_table(&rows, "No revision requests.");
}

fn print_report(report: &NormalizeReport, dry_run: bool) {
    let rows: Vec<NormalizeRow> = report
        .entries
        .iter()
        .map(|e| NormalizeRow {
            milestone_id: e.milestone_id.to_string(),
            format: e.format.to_string(),
            rewritten: if e.rewritten { "yes" } else { "no" }.to_string(),
        })
        .collect();
    output::print_table(&rows, "No legacy fields found.");

    println!();
    output::print_kv("Scanned", &report.scanned.to_string());
    output::print_kv("Legacy", &report.entries.len().to_string());
    output::print_kv("Rewritten", &report.rewritten().to_string());
    if report.corrupt > 0 {
        output::print_warning(&format!(
            "{} field(s) could not be decoded and were left untouched",
            report.corrupt
        ));
    }
    if report.conflicts > 0 {
        output::print_warning(&format!(
            "{} field(s) changed concurrently and were skipped",
            report.conflicts
        ));
    }
    if dry_run {
        output::print_success("Dry run complete; nothing was written.");
    } else {
        output::print_success("Normalization complete.");
    }
}

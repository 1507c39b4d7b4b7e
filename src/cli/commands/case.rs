//! `fleetcare case` command - service case management

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::filters::{PhaseFilter, PriorityFilter};
use crate::cli::helpers::{truncate_str, Workspace};
use crate::cli::output::{effective_format, or_dash, print_rows, print_serialized};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Priority;
use crate::core::lifecycle::TransitionRequest;
use crate::core::service::{CaseFilter, CaseUpdate, NewCase};
use crate::core::vocabulary::{StatusTerm, Target};
use crate::entities::service_case::{AssetDisposition, CaseType, RmaReason, ServiceCase};

#[derive(Subcommand, Debug)]
pub enum CaseCommands {
    /// Open a service case against an asset
    New(NewArgs),

    /// List cases with filtering
    List(ListArgs),

    /// Show a case's details and history
    Show(ShowArgs),

    /// Move a case to another status
    Move(MoveArgs),

    /// Edit a case's attributes
    Edit(EditArgs),

    /// Find RMA cases by carrier tracking number
    Track(TrackArgs),

    /// Case counts by phase and priority
    Stats,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Asset ID, short ID (AST@1) or code
    pub asset: String,

    /// Case type
    #[arg(long = "type", short = 't', default_value = "repair")]
    pub case_type: CaseType,

    /// Priority (low/normal/high/urgent)
    #[arg(long, short = 'p', default_value = "normal")]
    pub priority: Priority,

    /// Title (defaults to the type and asset name)
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Customer or colleague who asked for the work
    #[arg(long)]
    pub requester: Option<String>,

    /// Technician assigned to the case
    #[arg(long)]
    pub technician: Option<String>,

    /// Estimated cost
    #[arg(long)]
    pub estimate: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by phase
    #[arg(long, short = 's', default_value = "active")]
    pub phase: PhaseFilter,

    /// Filter by priority
    #[arg(long, short = 'p', default_value = "all")]
    pub priority: PriorityFilter,

    /// Filter by type
    #[arg(long = "type", short = 't')]
    pub case_type: Option<CaseType>,

    /// Only cases on this asset
    #[arg(long)]
    pub asset: Option<String>,

    /// Filter by assigned technician (substring match)
    #[arg(long)]
    pub technician: Option<String>,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Case ID, short ID (CASE@1) or number
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    /// Case ID, short ID (CASE@1) or number
    pub id: String,

    /// Target status: a phase or a term of the case's vocabulary
    pub status: String,

    /// Note stored in the history (resolution notes when resolving)
    #[arg(long, short = 'm')]
    pub note: Option<String>,

    /// Actual cost, recorded when resolving
    #[arg(long)]
    pub cost: Option<f64>,

    /// What happens to the asset when the case resolves
    #[arg(long)]
    pub disposition: Option<AssetDisposition>,

    /// Fail unless the case is still at this revision
    #[arg(long)]
    pub expect_revision: Option<u32>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Case ID, short ID (CASE@1) or number
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 'p')]
    pub priority: Option<Priority>,

    #[arg(long)]
    pub requester: Option<String>,

    #[arg(long)]
    pub technician: Option<String>,

    #[arg(long)]
    pub estimate: Option<f64>,

    #[arg(long)]
    pub cost: Option<f64>,

    /// Technician diagnosis
    #[arg(long)]
    pub diagnosis: Option<String>,

    /// Work done to fix the fault
    #[arg(long)]
    pub solution: Option<String>,

    /// Parts to order or fit
    #[arg(long)]
    pub parts: Option<String>,

    /// Return reason (RMA)
    #[arg(long)]
    pub reason: Option<RmaReason>,

    /// Carrier handling the return (RMA)
    #[arg(long)]
    pub carrier: Option<String>,

    /// Carrier tracking number (RMA)
    #[arg(long)]
    pub tracking: Option<String>,

    /// Shipping cost (RMA)
    #[arg(long)]
    pub shipping: Option<f64>,

    /// Amount refunded to the customer (RMA)
    #[arg(long)]
    pub refund: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct TrackArgs {
    /// Carrier tracking number
    pub tracking: String,
}

/// Run a case subcommand
pub fn run(cmd: CaseCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CaseCommands::New(args) => run_new(args, global),
        CaseCommands::List(args) => run_list(args, global),
        CaseCommands::Show(args) => run_show(args, global),
        CaseCommands::Move(args) => run_move(args, global),
        CaseCommands::Edit(args) => run_edit(args, global),
        CaseCommands::Track(args) => run_track(args, global),
        CaseCommands::Stats => run_stats(global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open()?;
    let asset = ws.resolve_asset(&args.asset)?;

    let input = NewCase {
        title: args.title,
        requester: args.requester,
        assigned_technician: args.technician,
        estimated_cost: args.estimate,
        description: args.description,
        ..NewCase::new(asset, args.case_type).with_priority(args.priority)
    };
    let case = ws.desk.create_case(input)?;
    ws.remember([case.id]);

    report_case(&ws, &case, global, "Opened")
}

fn report_case(ws: &Workspace, case: &ServiceCase, global: &GlobalOpts, verb: &str) -> Result<()> {
    let format = effective_format(global.output);
    match format {
        OutputFormat::Id => println!("{}", case.id),
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(format, case)?,
        _ => println!(
            "{} {} {} {} [{}] {}",
            style("✓").green(),
            verb,
            style(ws.short(&case.id)).cyan(),
            style(&case.number).yellow(),
            case.status,
            case.title
        ),
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open()?;
    let asset = args
        .asset
        .as_deref()
        .map(|reference| ws.resolve_asset(reference))
        .transpose()?;

    let filter = CaseFilter {
        phase: args.phase.phase(),
        case_type: args.case_type,
        priority: None,
        asset,
        technician: args.technician,
        open_only: args.phase.open_only(),
    };
    let cases: Vec<ServiceCase> = ws
        .desk
        .list_cases(&filter)?
        .into_iter()
        .filter(|c| args.priority.matches(c.priority))
        .collect();

    if args.count {
        println!("{}", cases.len());
        return Ok(());
    }

    ws.remember(cases.iter().map(|c| c.id));

    let format = effective_format(global.output);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(format, &cases)?,
        OutputFormat::Id => {
            for case in &cases {
                println!("{}", case.id);
            }
        }
        _ => {
            if cases.is_empty() {
                println!("No cases found.");
                return Ok(());
            }
            let rows = cases
                .iter()
                .map(|c| {
                    vec![
                        ws.short(&c.id),
                        c.number.clone(),
                        c.case_type.to_string(),
                        c.status.to_string(),
                        c.priority.to_string(),
                        truncate_str(&c.title, 35),
                        or_dash(c.assigned_technician.as_deref()),
                    ]
                })
                .collect();
            print_rows(
                format,
                &["ID", "NUMBER", "TYPE", "STATUS", "PRIORITY", "TITLE", "TECHNICIAN"],
                rows,
            )?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct CaseDetail<'a> {
    #[serde(flatten)]
    case: &'a ServiceCase,
    next_statuses: &'a [StatusTerm],
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open()?;
    let id = ws.resolve_case(&args.id)?;
    let case = ws.desk.get_case(&id)?;
    let next = ws.desk.engine().next_statuses(&case);
    ws.remember([case.id, case.asset]);

    let format = effective_format(global.output);
    match format {
        OutputFormat::Id => println!("{}", case.id),
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(
            format,
            &CaseDetail {
                case: &case,
                next_statuses: &next,
            },
        )?,
        _ => print_case_summary(&ws, &case, &next),
    }
    Ok(())
}

fn print_case_summary(ws: &Workspace, case: &ServiceCase, next: &[StatusTerm]) {
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {} ({})",
        style("ID").bold(),
        style(case.id.to_string()).cyan(),
        ws.short(&case.id)
    );
    println!("{}: {}", style("Number").bold(), style(&case.number).yellow());
    println!("{}: {}", style("Title").bold(), case.title);
    println!("{}: {}", style("Type").bold(), case.case_type);
    println!(
        "{}: {} ({})",
        style("Status").bold(),
        case.status.label(),
        case.phase
    );
    println!("{}: {}", style("Priority").bold(), case.priority);
    println!("{}: {}", style("Asset").bold(), ws.short(&case.asset));
    if let Some(tech) = &case.assigned_technician {
        println!("{}: {}", style("Technician").bold(), tech);
    }
    if let Some(requester) = &case.requester {
        println!("{}: {}", style("Requester").bold(), requester);
    }
    if case.warranty_covered {
        println!("{}: yes", style("Warranty").bold());
    }
    println!("{}", style("─".repeat(60)).dim());

    if let Some(description) = &case.description {
        if !description.is_empty() {
            println!();
            println!("{}", style("Description:").bold());
            println!("{}", description);
        }
    }

    if !case.costs.is_empty() {
        println!();
        println!("{}", style("Costs").bold());
        println!("  Estimated: {}", or_dash(case.costs.estimated.map(|c| format!("{:.2}", c))));
        println!("  Actual: {}", or_dash(case.costs.actual.map(|c| format!("{:.2}", c))));
        if let Some(shipping) = case.costs.shipping {
            println!("  Shipping: {:.2}", shipping);
        }
        if let Some(refund) = case.costs.refund {
            println!("  Refund: {:.2}", refund);
        }
    }

    if !case.shipment.is_empty() {
        println!();
        println!("{}", style("Return").bold());
        println!("  Reason: {}", or_dash(case.shipment.reason));
        println!("  Carrier: {}", or_dash(case.shipment.carrier.as_deref()));
        println!("  Tracking: {}", or_dash(case.shipment.tracking_number.as_deref()));
    }

    let report = &case.report;
    for (label, text) in [
        ("Diagnosis", &report.diagnosis),
        ("Solution", &report.solution),
        ("Parts needed", &report.parts_needed),
    ] {
        if let Some(text) = text {
            println!();
            println!("{}", style(format!("{}:", label)).bold());
            println!("{}", text);
        }
    }

    if let Some(notes) = &case.resolution_notes {
        println!();
        println!("{}", style("Resolution:").bold());
        println!("{}", notes);
    }
    if let Some(disposition) = case.disposition {
        println!("{}: {}", style("Disposition").bold(), disposition);
    }

    if !case.history.is_empty() {
        println!();
        println!("{} ({}):", style("History").bold(), case.history.len());
        for record in &case.history {
            print!(
                "  {} {} → {}",
                style(record.at.format("%Y-%m-%d %H:%M")).dim(),
                record.from,
                record.to
            );
            match &record.note {
                Some(note) => println!("  {}", style(note).dim()),
                None => println!(),
            }
        }
    }

    println!();
    if next.is_empty() {
        println!("{}", style("No further transitions").dim());
    } else {
        let names: Vec<&str> = next.iter().map(|t| t.as_str()).collect();
        println!("{}: {}", style("Next").bold(), names.join(", "));
    }

    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {} | {}: {} | {}: {}",
        style("Author").dim(),
        case.author,
        style("Created").dim(),
        case.created.format("%Y-%m-%d %H:%M"),
        style("Revision").dim(),
        case.entity_revision
    );
}

fn run_move(args: MoveArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open()?;
    let id = ws.resolve_case(&args.id)?;
    let case = ws.desk.get_case(&id)?;
    let target =
        Target::parse(case.vocabulary(), &args.status).map_err(|e| miette::miette!("{}", e))?;

    let mut request = TransitionRequest::to(target);
    if let Some(note) = args.note {
        request = request.with_note(note);
    }
    if let Some(cost) = args.cost {
        request = request.with_actual_cost(cost);
    }
    if let Some(disposition) = args.disposition {
        request = request.with_disposition(disposition);
    }
    if let Some(revision) = args.expect_revision {
        request = request.expecting(revision);
    }

    let from = case.status;
    let moved = ws.desk.transition_with(&id, request)?;

    let format = effective_format(global.output);
    match format {
        OutputFormat::Id => println!("{}", moved.id),
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(format, &moved)?,
        _ => {
            println!(
                "{} {} {} → {}",
                style("✓").green(),
                style(&moved.number).yellow(),
                from,
                style(moved.status).cyan()
            );
            if moved.phase.is_settled() {
                let asset = ws.desk.get_asset(&moved.asset)?;
                println!("  Asset {} is now {}", ws.short(&asset.id), asset.status);
            }
        }
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open()?;
    let id = ws.resolve_case(&args.id)?;
    let update = CaseUpdate {
        title: args.title,
        description: args.description,
        priority: args.priority,
        requester: args.requester,
        assigned_technician: args.technician,
        estimated_cost: args.estimate,
        actual_cost: args.cost,
        diagnosis: args.diagnosis,
        solution: args.solution,
        parts_needed: args.parts,
        rma_reason: args.reason,
        carrier: args.carrier,
        tracking_number: args.tracking,
        shipping_cost: args.shipping,
        refund_amount: args.refund,
    };
    if update.is_empty() {
        return Err(miette::miette!("Nothing to change; pass at least one field"));
    }
    let case = ws.desk.update_case(&id, update)?;
    report_case(&ws, &case, global, "Updated")
}

fn run_track(args: TrackArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open()?;
    let cases = ws.desk.find_cases_by_tracking(&args.tracking)?;
    ws.remember(cases.iter().map(|c| c.id));

    let format = effective_format(global.output);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(format, &cases)?,
        OutputFormat::Id => {
            for case in &cases {
                println!("{}", case.id);
            }
        }
        _ => {
            if cases.is_empty() {
                println!("No cases shipped under {}", args.tracking);
                return Ok(());
            }
            let rows = cases
                .iter()
                .map(|c| {
                    vec![
                        ws.short(&c.id),
                        c.number.clone(),
                        c.status.to_string(),
                        or_dash(c.shipment.carrier.as_deref()),
                        ws.short(&c.asset),
                    ]
                })
                .collect();
            print_rows(format, &["ID", "NUMBER", "STATUS", "CARRIER", "ASSET"], rows)?;
        }
    }
    Ok(())
}

fn run_stats(global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open()?;
    let stats = ws.desk.case_stats()?;

    let format = effective_format(global.output);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(format, &stats)?,
        _ => {
            let mut rows: Vec<Vec<String>> = stats
                .by_phase
                .iter()
                .map(|(phase, n)| vec!["phase".to_string(), phase.to_string(), n.to_string()])
                .collect();
            rows.extend(stats.by_priority.iter().map(|(priority, n)| {
                vec!["priority".to_string(), priority.to_string(), n.to_string()]
            }));
            print_rows(format, &["GROUP", "VALUE", "COUNT"], rows)?;
            if !matches!(format, OutputFormat::Csv) {
                println!(
                    "{} cases, {} high/urgent still open",
                    style(stats.total).bold(),
                    style(stats.urgent_open).red()
                );
            }
        }
    }
    Ok(())
}

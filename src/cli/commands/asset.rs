//! `fleetcare asset` command - equipment and vehicle registry

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{confirm, truncate_str, Workspace};
use crate::cli::output::{effective_format, or_dash, print_rows, print_serialized};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::scanner::{Alert, AlertSet, Expiry};
use crate::core::service::NewAsset;
use crate::entities::asset::{Asset, AssetKind, AssetStatus, MaintenanceInterval};
use crate::entities::service_case::ServiceCase;

#[derive(Subcommand, Debug)]
pub enum AssetCommands {
    /// Register a new asset
    New(NewArgs),

    /// List assets with filtering
    List(ListArgs),

    /// Show an asset's details, alerts and cases
    Show(ShowArgs),

    /// Override an asset's status
    SetStatus(SetStatusArgs),

    /// Record a preventive maintenance
    Maintain(MaintainArgs),

    /// Record a vehicle's odometer reading
    Mileage(MileageArgs),

    /// Show maintenance and compliance alerts
    Alerts(AlertsArgs),

    /// Retire equipment (soft delete)
    Retire(RetireArgs),

    /// Delete an asset
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Display name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Equipment or vehicle
    #[arg(long, short = 'k', default_value = "equipment")]
    pub kind: AssetKind,

    /// Serial number, internal reference or licence plate
    #[arg(long)]
    pub code: Option<String>,

    /// Initial status (default: available)
    #[arg(long)]
    pub status: Option<AssetStatus>,

    /// Date of the last maintenance (YYYY-MM-DD)
    #[arg(long)]
    pub last_maintenance: Option<NaiveDate>,

    /// Date of the next maintenance (YYYY-MM-DD); derived from the interval if omitted
    #[arg(long)]
    pub next_maintenance: Option<NaiveDate>,

    /// Days between maintenances
    #[arg(long)]
    pub interval_days: Option<u32>,

    /// Kilometres between maintenances (vehicles)
    #[arg(long)]
    pub interval_km: Option<u32>,

    /// Current odometer reading in km (vehicles)
    #[arg(long)]
    pub mileage: Option<u32>,

    /// Odometer reading at the last maintenance (vehicles)
    #[arg(long)]
    pub mileage_at_last_maintenance: Option<u32>,

    #[arg(long)]
    pub insurance_expiry: Option<NaiveDate>,

    /// Technical control expiry (vehicles)
    #[arg(long)]
    pub technical_control_expiry: Option<NaiveDate>,

    #[arg(long)]
    pub warranty_expiry: Option<NaiveDate>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Tags (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by kind
    #[arg(long, short = 'k')]
    pub kind: Option<AssetKind>,

    /// Filter by status
    #[arg(long, short = 's')]
    pub status: Option<AssetStatus>,

    /// Only assets with at least one alert
    #[arg(long)]
    pub alerts: bool,

    /// Search in name, code and location
    #[arg(long)]
    pub search: Option<String>,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Asset ID, short ID (AST@1) or code
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetStatusArgs {
    /// Asset ID, short ID (AST@1) or code
    pub id: String,

    /// New status
    pub status: AssetStatus,
}

#[derive(clap::Args, Debug)]
pub struct MaintainArgs {
    /// Asset ID, short ID (AST@1) or code
    pub id: String,

    /// Date the maintenance was performed (default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Odometer reading at the maintenance (vehicles)
    #[arg(long)]
    pub mileage: Option<u32>,
}

#[derive(clap::Args, Debug)]
pub struct MileageArgs {
    /// Asset ID, short ID (AST@1) or code
    pub id: String,

    /// Current odometer reading in km
    pub km: u32,
}

#[derive(clap::Args, Debug)]
pub struct AlertsArgs {
    /// Asset to evaluate; scans the whole fleet when omitted
    pub id: Option<String>,

    /// Also list documents expiring within this many days
    #[arg(long, default_value_t = 30)]
    pub within: u32,
}

#[derive(clap::Args, Debug)]
pub struct RetireArgs {
    /// Asset ID, short ID (AST@1) or code
    pub id: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Asset ID, short ID (AST@1) or code
    pub id: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run an asset subcommand
pub fn run(cmd: AssetCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        AssetCommands::New(args) => run_new(args, global),
        AssetCommands::List(args) => run_list(args, global),
        AssetCommands::Show(args) => run_show(args, global),
        AssetCommands::SetStatus(args) => run_set_status(args, global),
        AssetCommands::Maintain(args) => run_maintain(args, global),
        AssetCommands::Mileage(args) => run_mileage(args, global),
        AssetCommands::Alerts(args) => run_alerts(args, global),
        AssetCommands::Retire(args) => run_retire(args, global),
        AssetCommands::Delete(args) => run_delete(args),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open()?;

    let input = NewAsset {
        name: args.name,
        kind: args.kind,
        code: args.code,
        status: args.status,
        last_maintenance: args.last_maintenance,
        next_maintenance: args.next_maintenance,
        maintenance_interval: MaintenanceInterval {
            days: args.interval_days,
            distance_km: args.interval_km,
        },
        mileage: args.mileage,
        mileage_at_last_maintenance: args.mileage_at_last_maintenance,
        insurance_expiry: args.insurance_expiry,
        technical_control_expiry: args.technical_control_expiry,
        warranty_expiry: args.warranty_expiry,
        location: args.location,
        notes: args.notes,
        tags: args.tags,
    };
    let asset = ws.desk.register_asset(input)?;
    ws.remember([asset.id]);

    report_asset(&ws, &asset, global, "Registered")
}

fn report_asset(ws: &Workspace, asset: &Asset, global: &GlobalOpts, verb: &str) -> Result<()> {
    let format = effective_format(global.output);
    match format {
        OutputFormat::Id => println!("{}", asset.id),
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(format, asset)?,
        _ => println!(
            "{} {} {} {} ({}) [{}]",
            style("✓").green(),
            verb,
            style(ws.short(&asset.id)).cyan(),
            asset.id,
            asset.display_name(),
            asset.status
        ),
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open()?;
    let today = chrono::Utc::now().date_naive();
    let lookahead = ws.desk.lookahead_days();

    let search = args.search.as_ref().map(|s| s.to_lowercase());
    let assets: Vec<(Asset, AlertSet)> = ws
        .desk
        .list_assets()?
        .into_iter()
        .filter(|a| args.kind.is_none_or(|k| a.kind == k))
        .filter(|a| args.status.is_none_or(|s| a.status == s))
        .filter(|a| {
            search.as_ref().is_none_or(|needle| {
                [Some(&a.name), a.code.as_ref(), a.location.as_ref()]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(needle))
            })
        })
        .map(|a| {
            let alerts = crate::core::scanner::evaluate(&a, today, lookahead);
            (a, alerts)
        })
        .filter(|(_, alerts)| !args.alerts || !alerts.is_empty())
        .collect();

    if args.count {
        println!("{}", assets.len());
        return Ok(());
    }

    ws.remember(assets.iter().map(|(a, _)| a.id));

    let format = effective_format(global.output);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let list: Vec<&Asset> = assets.iter().map(|(a, _)| a).collect();
            print_serialized(format, &list)?;
        }
        OutputFormat::Id => {
            for (asset, _) in &assets {
                println!("{}", asset.id);
            }
        }
        _ => {
            if assets.is_empty() {
                println!("No assets found.");
                return Ok(());
            }
            let rows = assets
                .iter()
                .map(|(a, alerts)| {
                    vec![
                        ws.short(&a.id),
                        or_dash(a.code.as_deref()),
                        truncate_str(&a.name, 30),
                        a.kind.to_string(),
                        a.status.to_string(),
                        or_dash(a.next_maintenance),
                        if alerts.is_empty() {
                            "-".to_string()
                        } else {
                            alerts.to_string()
                        },
                    ]
                })
                .collect();
            print_rows(
                format,
                &["ID", "CODE", "NAME", "KIND", "STATUS", "NEXT MAINT", "ALERTS"],
                rows,
            )?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct AssetDetail<'a> {
    #[serde(flatten)]
    asset: &'a Asset,
    alerts: &'a AlertSet,
    cases: Vec<CaseRef<'a>>,
}

#[derive(Serialize)]
struct CaseRef<'a> {
    number: &'a str,
    status: String,
    title: &'a str,
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open()?;
    let id = ws.resolve_asset(&args.id)?;
    let asset = ws.desk.get_asset(&id)?;
    let alerts = ws.desk.evaluate_alerts(&id)?;
    let cases = ws.desk.list_cases_for_asset(&id)?;
    ws.remember([asset.id]);

    let format = effective_format(global.output);
    match format {
        OutputFormat::Id => println!("{}", asset.id),
        OutputFormat::Json | OutputFormat::Yaml => {
            let detail = AssetDetail {
                asset: &asset,
                alerts: &alerts,
                cases: cases
                    .iter()
                    .map(|c| CaseRef {
                        number: &c.number,
                        status: c.status.to_string(),
                        title: &c.title,
                    })
                    .collect(),
            };
            print_serialized(format, &detail)?;
        }
        _ => print_asset_summary(&ws, &asset, &alerts, &cases),
    }
    Ok(())
}

fn print_asset_summary(ws: &Workspace, asset: &Asset, alerts: &AlertSet, cases: &[ServiceCase]) {
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {} ({})",
        style("ID").bold(),
        style(asset.id.to_string()).cyan(),
        ws.short(&asset.id)
    );
    println!("{}: {}", style("Name").bold(), style(&asset.name).yellow());
    if let Some(code) = &asset.code {
        println!("{}: {}", style("Code").bold(), code);
    }
    println!("{}: {}", style("Kind").bold(), asset.kind);
    println!("{}: {}", style("Status").bold(), asset.status);
    if let Some(location) = &asset.location {
        println!("{}: {}", style("Location").bold(), location);
    }
    println!("{}", style("─".repeat(60)).dim());

    println!();
    println!("{}", style("Maintenance").bold());
    println!("  Last: {}", or_dash(asset.last_maintenance));
    println!("  Next: {}", or_dash(asset.next_maintenance));
    if let Some(days) = asset.maintenance_interval.days {
        println!("  Every {} days", days);
    }
    if let Some(km) = asset.maintenance_interval.distance_km {
        println!("  Every {} km", km);
    }
    if asset.is_vehicle() {
        println!(
            "  Mileage: {} km (at last service: {})",
            or_dash(asset.mileage),
            or_dash(asset.mileage_at_last_maintenance)
        );
    }

    println!();
    println!("{}", style("Documents").bold());
    println!("  Insurance: {}", or_dash(asset.insurance_expiry));
    if asset.is_vehicle() {
        println!("  Technical control: {}", or_dash(asset.technical_control_expiry));
    }
    println!("  Warranty: {}", or_dash(asset.warranty_expiry));

    if !alerts.is_empty() {
        println!();
        println!("{}", style("Alerts").bold().red());
        for alert in alerts.iter() {
            println!("  {} {}", style("!").red(), alert.label());
        }
    }

    if !cases.is_empty() {
        println!();
        println!("{} ({}):", style("Cases").bold(), cases.len());
        for case in cases {
            println!(
                "  {} [{}] {}",
                style(&case.number).cyan(),
                case.status.label(),
                case.title
            );
        }
    }

    if !asset.tags.is_empty() {
        println!();
        println!("{}: {}", style("Tags").bold(), asset.tags.join(", "));
    }
    if let Some(notes) = &asset.notes {
        if !notes.is_empty() {
            println!();
            println!("{}", style("Notes:").bold());
            println!("{}", notes);
        }
    }

    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {} | {}: {} | {}: {}",
        style("Author").dim(),
        asset.author,
        style("Created").dim(),
        asset.created.format("%Y-%m-%d %H:%M"),
        style("Revision").dim(),
        asset.entity_revision
    );
}

fn run_set_status(args: SetStatusArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open()?;
    let id = ws.resolve_asset(&args.id)?;
    let asset = ws.desk.set_asset_status(&id, args.status)?;
    report_asset(&ws, &asset, global, "Updated")
}

fn run_maintain(args: MaintainArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open()?;
    let id = ws.resolve_asset(&args.id)?;
    let date = args
        .date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let asset = ws.desk.record_maintenance(&id, date, args.mileage)?;

    let format = effective_format(global.output);
    match format {
        OutputFormat::Id => println!("{}", asset.id),
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(format, &asset)?,
        _ => {
            println!(
                "{} Recorded maintenance on {} for {}",
                style("✓").green(),
                date,
                style(ws.short(&asset.id)).cyan()
            );
            println!("  Next maintenance: {}", or_dash(asset.next_maintenance));
        }
    }
    Ok(())
}

fn run_mileage(args: MileageArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open()?;
    let id = ws.resolve_asset(&args.id)?;
    let asset = ws.desk.record_mileage(&id, args.km)?;

    let format = effective_format(global.output);
    match format {
        OutputFormat::Id => println!("{}", asset.id),
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(format, &asset)?,
        _ => {
            println!(
                "{} {} now at {} km",
                style("✓").green(),
                style(ws.short(&asset.id)).cyan(),
                args.km
            );
            if let Some(driven) = asset.distance_since_maintenance() {
                println!("  Driven since last maintenance: {} km", driven);
            }
            let alerts = ws.desk.evaluate_alerts(&asset.id)?;
            if alerts.contains(Alert::MaintenanceDue) {
                println!("  {} {}", style("!").red(), Alert::MaintenanceDue.label());
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct AlertReport<'a> {
    asset: String,
    alerts: &'a AlertSet,
    expiring: &'a [Expiry],
}

fn run_alerts(args: AlertsArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open()?;
    let format = effective_format(global.output);

    let Some(reference) = args.id else {
        let scan = ws.desk.scan_fleet()?;
        ws.remember(scan.iter().map(|s| s.asset));
        match format {
            OutputFormat::Json | OutputFormat::Yaml => print_serialized(format, &scan)?,
            OutputFormat::Id => {
                for entry in &scan {
                    println!("{}", entry.asset);
                }
            }
            _ => {
                if scan.is_empty() {
                    println!("{} No alerts", style("✓").green());
                    return Ok(());
                }
                let rows = scan
                    .iter()
                    .map(|s| vec![ws.short(&s.asset), s.name.clone(), s.alerts.to_string()])
                    .collect();
                print_rows(format, &["ID", "ASSET", "ALERTS"], rows)?;
            }
        }
        return Ok(());
    };

    let id = ws.resolve_asset(&reference)?;
    let alerts = ws.desk.evaluate_alerts(&id)?;
    let expiring = ws.desk.upcoming_expiries(&id, args.within)?;

    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(
            format,
            &AlertReport {
                asset: id.to_string(),
                alerts: &alerts,
                expiring: &expiring,
            },
        )?,
        OutputFormat::Id => {
            for alert in alerts.iter() {
                println!("{}", alert);
            }
        }
        _ => {
            if alerts.is_empty() {
                println!("{} No alerts", style("✓").green());
            }
            for alert in alerts.iter() {
                println!("{} {}", style("!").red(), alert.label());
            }
            for e in &expiring {
                println!(
                    "{} {} expires {} ({} days)",
                    style("~").yellow(),
                    e.document,
                    e.date,
                    e.days_left
                );
            }
        }
    }
    Ok(())
}

fn run_retire(args: RetireArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open()?;
    let id = ws.resolve_asset(&args.id)?;
    if !confirm(&format!("Retire {}?", ws.short(&id)), args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }
    let asset = ws.desk.retire_asset(&id)?;
    report_asset(&ws, &asset, global, "Retired")
}

fn run_delete(args: DeleteArgs) -> Result<()> {
    let ws = Workspace::open()?;
    let id = ws.resolve_asset(&args.id)?;
    if !confirm(&format!("Delete {} permanently?", ws.short(&id)), args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }
    ws.desk.delete_asset(&id)?;
    println!("{} Deleted {}", style("✓").green(), id);
    Ok(())
}

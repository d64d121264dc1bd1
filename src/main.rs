use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;

use ospf_sim::config::TopologyConfig;
use ospf_sim::protocol::{elect_area, flood_area, generate_all, is_converged};
use ospf_sim::{
    MultiPathResult, Network, RouterId, RoutingTable, dijkstra, dijkstra_with_multi_path,
};

#[derive(Parser)]
#[command(name = "ospf-sim", about = "Link-state routing simulation")]
struct Cli {
    /// JSON topology file; the built-in sample triangle when omitted.
    #[arg(long)]
    topology: Option<PathBuf>,

    /// Source router, by name or router ID.
    #[arg(long)]
    source: Option<String>,

    /// Area for the multi-path computation; defaults to the source's area.
    #[arg(long)]
    area: Option<String>,

    /// Print the results as JSON.
    #[arg(long)]
    json: bool,

    /// Write the sample topology to this file and exit.
    #[arg(long)]
    write_sample: Option<PathBuf>,
}

#[derive(Serialize)]
struct ElectionReport {
    area: String,
    designated_router: Option<RouterId>,
    backup_designated_router: Option<RouterId>,
}

#[derive(Serialize)]
struct Report {
    source: RouterId,
    elections: Vec<ElectionReport>,
    /// Costs over local links; `null` when unreachable.
    link_costs: BTreeMap<RouterId, Option<f64>>,
    spf: MultiPathResult,
    routing_table: RoutingTable,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Some(path) = &cli.write_sample {
        TopologyConfig::sample().save(path)?;
        info!("Sample topology written to {}", path.display());
        return Ok(());
    }

    let config = match &cli.topology {
        Some(path) => TopologyConfig::load(path)?,
        None => TopologyConfig::sample(),
    };
    let mut network = config.build_network()?;

    let elections = network
        .areas()
        .map(|area| -> Result<ElectionReport> {
            let election = elect_area(&network, &area.id)?;
            Ok(ElectionReport {
                area: area.id.clone(),
                designated_router: election.designated_id().map(str::to_string),
                backup_designated_router: election.backup_id().map(str::to_string),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    generate_all(&mut network);
    let area_ids: Vec<String> = network.areas().map(|a| a.id.clone()).collect();
    for area_id in &area_ids {
        flood_area(&mut network, area_id)?;
        if !is_converged(&network, area_id)? {
            warn!("Area {} did not converge after flooding", area_id);
        }
    }

    let source = select_source(&network, cli.source.as_deref())?;
    let area_id = match cli.area {
        Some(area) => area,
        None => network
            .router(&source)
            .map(|r| r.area().to_string())
            .context("source router vanished")?,
    };

    let link_costs = dijkstra(&network, &source)?
        .into_iter()
        .map(|(id, cost)| (id, cost.is_finite().then_some(cost)))
        .collect();
    let spf = dijkstra_with_multi_path(&network, &source, &area_id)?;
    let routing_table = RoutingTable::from_spf(&network, &spf);

    let report = Report {
        source,
        elections,
        link_costs,
        spf,
        routing_table,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&network, &report);
    }
    Ok(())
}

fn select_source(network: &Network, wanted: Option<&str>) -> Result<RouterId> {
    let router = match wanted {
        Some(wanted) => network
            .router(wanted)
            .or_else(|| network.router_by_name(wanted))
            .with_context(|| format!("no router named or identified '{}'", wanted))?,
        None => network.routers().next().context("topology has no routers")?,
    };
    Ok(router.id().to_string())
}

fn format_cost(cost: Option<f64>) -> String {
    match cost {
        Some(cost) => format!("{:.3}", cost),
        None => "unreachable".to_string(),
    }
}

fn print_report(network: &Network, report: &Report) {
    println!("DR/BDR Election:");
    println!("{:<8} {:<18} {:<18}", "Area", "DR", "BDR");
    println!("{}", "-".repeat(46));
    for election in &report.elections {
        println!(
            "{:<8} {:<18} {:<18}",
            election.area,
            election.designated_router.as_deref().unwrap_or("-"),
            election.backup_designated_router.as_deref().unwrap_or("-")
        );
    }

    println!("\nLink-state databases:");
    for router in network.routers() {
        println!("  {} ({}) - {} LSAs", router.id(), router.name, router.lsdb().len());
    }

    println!("\nCosts from {} over local links:", report.source);
    println!("{:<18} {:<12}", "Router", "Cost");
    println!("{}", "-".repeat(31));
    for (id, cost) in &report.link_costs {
        println!("{:<18} {:<12}", id, format_cost(*cost));
    }

    println!("\nShortest paths from {} in area {}:", report.source, report.spf.area_id);
    println!("{:<18} {:<12} {:<30}", "Destination", "Cost", "Predecessors");
    println!("{}", "-".repeat(62));
    for (id, cost) in &report.spf.costs {
        let preds = report.spf.predecessors(id).join(", ");
        println!(
            "{:<18} {:<12} {:<30}",
            id,
            format_cost(cost.is_finite().then_some(*cost)),
            preds
        );
    }

    println!("\nRouting Table:");
    println!("{:<18} {:<10} {:<30} {:<20}", "Destination", "Cost", "Next Hops", "Network");
    println!("{}", "-".repeat(80));
    if report.routing_table.is_empty() {
        println!("No routes found");
    }
    for entry in report.routing_table.iter() {
        let networks: Vec<String> = entry.networks.iter().map(|n| n.to_string()).collect();
        println!(
            "{:<18} {:<10} {:<30} {:<20}",
            entry.destination,
            format!("{:.3}", entry.cost),
            entry.next_hops.join(", "),
            networks.join(", ")
        );
    }
}

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use vp_admin::catalog::labels::load_reference_data;
use vp_admin::catalog::CatalogClient;
use vp_admin::config;
use vp_admin::http::HttpCore;

#[derive(Parser, Debug)]
struct Args {
    /// Path to YAML config
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Head-office token to inspect
    #[arg(long)]
    token: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    let core = HttpCore::new(cfg.base_url()?, cfg.subscription_key())?;
    let client = CatalogClient::new(core);

    let data = load_reference_data(&client, &args.token).await?;
    let sections = [
        ("Departments", &data.departments),
        ("Tax codes", &data.tax_codes),
        ("Brands", &data.brands),
        ("Report codes", &data.report_codes),
        ("Item types", &data.item_types),
        ("Item statuses", &data.item_statuses),
        ("Price levels", &data.price_levels),
    ];
    for (title, labels) in sections {
        println!("{title}:");
        for l in labels {
            println!("  {} -> {}", l.label, l.value);
        }
    }
    println!("Categories:");
    for dept in &data.categories {
        println!("  department {}:", dept.department_id);
        for c in &dept.categories {
            println!("    {} -> {}", c.label, c.value);
        }
    }
    Ok(())
}

//! Demo entry point.

use order_demo::Config;
use order_facade::OrderFacade;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Run the scenarios against the simulated collaborators
    let facade = OrderFacade::in_memory(&config.facade);
    tracing::info!(?config, "running order scenarios");
    let reports = order_demo::run_scenarios(&facade, &config).await;

    // 4. Print the reports and the metrics they produced
    let json = serde_json::to_string_pretty(&reports).expect("failed to serialize reports");
    println!("{json}");
    println!("{}", metrics_handle.render());

    tracing::info!(
        scenarios = reports.len(),
        active_orders = facade.active_order_count(),
        "demo finished"
    );
}

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use perisai_domain::{
    DomainGateways, InventoryService, RecordGateway, RiskReportService, RiskRegistry, RiskUser,
    TenantContext,
};
use perisai_forecast::ForecastClient;
use perisai_nats::NatsRpcClient;
use perisai_postgres::{
    PostgresAgreementReader, PostgresClient, PostgresInspectionReader, PostgresProductionReader,
    PostgresReceiveReader, PostgresRfqReader, PostgresRiskCatalogRepository,
    PostgresShipmentReader, PostgresTransferReader,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let config = match config::ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("Starting perisai-all-in-one service");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            signal_token.cancel();
        }
    });

    if let Err(e) = run_service(shutdown, config).await {
        error!(error = %e, "service terminated with error");
        std::process::exit(1);
    }

    info!("Service stopped gracefully");
}

async fn run_service(shutdown: CancellationToken, config: config::ServiceConfig) -> Result<()> {
    let rpc = NatsRpcClient::connect(
        &config.nats_url,
        Duration::from_secs(config.nats_connect_timeout_secs),
    )
    .await?;
    let rpc: Arc<dyn perisai_domain::BrokerRpc> = Arc::new(rpc);

    let postgres = PostgresClient::new(
        &config.postgres_host,
        config.postgres_port,
        &config.postgres_database,
        &config.postgres_username,
        &config.postgres_password,
        config.postgres_pool_size,
    )?;
    postgres.ping().await?;

    let gateways = DomainGateways {
        receives: Arc::new(RecordGateway::receives(
            rpc.clone(),
            Arc::new(PostgresReceiveReader::new(postgres.clone())),
        )),
        transfers: Arc::new(RecordGateway::transfers(
            rpc.clone(),
            Arc::new(PostgresTransferReader::new(postgres.clone())),
        )),
        production_requests: Arc::new(RecordGateway::production_requests(
            rpc.clone(),
            Arc::new(PostgresProductionReader::new(postgres.clone())),
        )),
        inspection_products: Arc::new(RecordGateway::inspection_products(
            rpc.clone(),
            Arc::new(PostgresInspectionReader::new(postgres.clone())),
        )),
        rfqs: Arc::new(RecordGateway::rfqs(
            rpc.clone(),
            Arc::new(PostgresRfqReader::new(postgres.clone())),
        )),
        history_shipments: Arc::new(RecordGateway::history_shipments(
            rpc.clone(),
            Arc::new(PostgresShipmentReader::new(postgres.clone())),
        )),
        letters_of_agreement: Arc::new(RecordGateway::letters_of_agreement(
            rpc.clone(),
            Arc::new(PostgresAgreementReader::new(postgres.clone())),
        )),
    };

    let registry = Arc::new(RiskRegistry::standard(&gateways));
    let report_service = RiskReportService::new(
        Arc::new(PostgresRiskCatalogRepository::new(postgres.clone())),
        registry,
        Arc::new(ForecastClient::new(config.forecast_base_url.clone())?),
    );
    let inventory_service =
        InventoryService::new(gateways.receives.clone(), gateways.transfers.clone());

    let mut tenant = TenantContext::new(config.tenant_id, config.authorization_token.clone());
    if let Some(code) = config.entity_code.clone() {
        tenant = tenant.with_entity_code(code);
    }

    let interval = Duration::from_secs(config.refresh_interval_secs);
    info!(
        tenant_id = tenant.tenant_id,
        interval_secs = config.refresh_interval_secs,
        "entering report refresh loop"
    );

    loop {
        refresh_reports(&report_service, &inventory_service, &tenant).await;

        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Stopping report refresh loop");
                break;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }

    Ok(())
}

async fn refresh_reports(
    report_service: &RiskReportService,
    inventory_service: &InventoryService,
    tenant: &TenantContext,
) {
    for user in [RiskUser::Industry, RiskUser::Supplier, RiskUser::Retail] {
        match report_service.report_for(user, tenant).await {
            Ok(rows) => info!(%user, rows = rows.len(), "refreshed risk report"),
            Err(e) => warn!(%user, error = %e, "risk report refresh failed"),
        }
    }

    match inventory_service.receive_summary(tenant).await {
        Ok(summary) => info!(
            total_quantity = summary.total_quantity,
            accept_rate = summary.accept_rate,
            reject_rate = summary.reject_rate,
            "refreshed receive summary"
        ),
        Err(e) => warn!(error = %e, "receive summary refresh failed"),
    }
}

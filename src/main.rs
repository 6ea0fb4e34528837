//! Railhead demo server
//!
//! 启动演示路由：/ping、/demo1、/demo2

use railhead::config::{load_config, print_config, LogConfig};
use railhead::demo::create_routes;
use railhead::server::HttpServer;
use tracing_subscriber::EnvFilter;

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},railhead={},tower_http=debug", log.level, log.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("Railhead demo server");
    print_config(&config);

    let server = HttpServer::new(config.server.clone(), create_routes());

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

use trip_server::{Config, Server, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志)
    dotenv::dotenv().ok();
    let config = Config::from_env();
    trip_server::init_logger_with_file(None, config.log_dir.as_deref());

    tracing::info!(
        "Trip server starting (environment: {})...",
        config.environment
    );

    // 2. 初始化服务器状态
    let state = ServerState::initialize(&config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to initialize: {e}"))?;

    // 3. 启动 HTTP 服务器
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {e}");
        return Err(e);
    }

    Ok(())
}

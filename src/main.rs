// ==========================================
// 吊索具智能柜管理系统 - 主入口
// ==========================================
// 启动: 日志 → 配置 → 数据库初始化 → 组装 API
// 路由与令牌签发由外部组件承载，这里只做启动自检
// ==========================================

use cmkit::app::AppState;
use cmkit::config::AppConfig;
use cmkit::logging;

fn main() {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", cmkit::APP_NAME);
    tracing::info!("系统版本: {}", cmkit::VERSION);
    tracing::info!("==================================================");

    let config = AppConfig::from_env();
    tracing::info!(
        "配置: db={}, file_dir={}, temp_dir={}, session_ttl={}min",
        config.db_path,
        config.file_dir.display(),
        config.temp_dir.display(),
        config.session_ttl_minutes
    );

    // 数据库连接失败是唯一的致命错误
    let state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("AppState初始化失败: {}", e);
            std::process::exit(1);
        }
    };

    let overview = cmkit::api::ApiResponse::from_result(state.home_api.overview());
    if let Ok(text) = overview.to_json() {
        tracing::debug!("资源总览报文: {}", text);
    }
    match overview.data {
        Some(overview) => tracing::info!(
            "资源总览: 吊索具={}, 智能柜={}, 箱格={}/{}, 未归还={}",
            overview.sling_count,
            overview.cabinet_count,
            overview.grid_used,
            overview.grid_total,
            overview.outstanding_count
        ),
        None => tracing::warn!("资源总览查询失败: {}", overview.message),
    }

    tracing::info!("启动完成: {}", state.get_db_path());
}

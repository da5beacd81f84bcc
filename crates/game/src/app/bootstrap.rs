use engine::LoopConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

const START_STAGE_ENV_VAR: &str = "SPLITJUMP_STAGE";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Split Jump Startup ===");

    let start_stage = parse_start_stage(std::env::var(START_STAGE_ENV_VAR).ok());
    if let Some(stage) = &start_stage {
        info!(
            env_var = START_STAGE_ENV_VAR,
            stage = stage.as_str(),
            "start_stage_override"
        );
    }
    let config = LoopConfig {
        window_title: format!("Split Jump {}", env!("CARGO_PKG_VERSION")),
        start_stage,
        ..LoopConfig::default()
    };

    AppWiring { config }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_start_stage(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

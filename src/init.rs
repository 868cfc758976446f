use env_logger::Env;

/// 初始化日誌；`RUST_LOG` 優先，否則預設 `warn`，`verbose` 時為 `info`
pub fn init(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .try_init();
}

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber. `RUST_LOG` takes precedence over the
/// configured level; chatty dependencies are capped at `warn` either way.
/// `LOG_FORMAT=json` switches to structured output.
pub fn init(log_level: &str) {
    let mut filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    for directive in ["sqlx=warn", "hyper=warn", "reqwest=warn", "tower=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

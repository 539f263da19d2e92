use crate::config::CONFIG;
use std::fs::File;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};
use url::Url;

const WORKSPACE_CRATES: &[&str] = &["common", "mobilox", "persister"];

fn directives(module_name: &str) -> String {
    std::iter::once(module_name)
        .chain(WORKSPACE_CRATES.iter().copied())
        .map(|target| format!("{target}=debug"))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn setup_logging(module_name: &str) {
    let directives = directives(module_name);

    let stdout_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_filter(EnvFilter::new(&directives));

    std::fs::create_dir_all(module_name).expect("failed to create log directory");
    let file = File::create(format!("{module_name}/log.txt")).expect("failed to create log file");
    let file_log = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(EnvFilter::new(&directives));

    let loki = CONFIG.loki.as_ref().map(|loki| {
        let (layer, task) = tracing_loki::builder()
            .label("application", module_name)
            .expect("invalid loki label")
            .extra_field("pid", std::process::id().to_string())
            .expect("invalid loki field")
            .build_url(Url::parse(&loki.url).expect("invalid loki url"))
            .expect("could not build loki");
        (layer.with_filter(EnvFilter::new(&directives)), task)
    });
    let (loki_log, loki_task) = match loki {
        Some((layer, task)) => (Some(layer), Some(task)),
        None => (None, None),
    };

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(stdout_log)
            .with(file_log)
            .with(loki_log),
    )
    .expect("failed to set global default");

    if let Some(task) = loki_task {
        tokio::spawn(task);
    }
}

#[cfg(test)]
mod tests {
    use super::directives;

    #[test]
    fn test_directives_cover_module_and_workspace() {
        assert_eq!(
            directives("api"),
            "api=debug,common=debug,mobilox=debug,persister=debug"
        );
    }
}

use color_eyre::eyre::Context as _;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};
use tracing_tree::HierarchicalLayer;

/// Install the tracing subscriber: `RUST_LOG` controls the filter, with a
/// sensible default when it is unset.
pub fn setup_tracing(service_name: &str) -> color_eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{service_name}=debug")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true),
        )
        .try_init()
        .wrap_err("Failed to initialize tracing subscriber")?;

    Ok(())
}

use tracing::dispatcher::DefaultGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;

pub fn set_default_test_logger() -> DefaultGuard {
    tracing::subscriber::set_default({
        let filter = EnvFilter::new("crforge=trace,test=trace");

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_test_writer())
    })
}

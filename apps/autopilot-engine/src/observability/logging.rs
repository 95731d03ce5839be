//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

/// Initialize the tracing subscriber with environment filter.
///
/// `RUST_LOG` takes precedence; `autopilot_engine=<level>` and
/// `tower_http=info` are added as defaults. An unparseable `level` falls
/// back to `info`.
#[allow(clippy::expect_used)]
pub fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::from_default_env()
        .add_directive(crate_directive(level))
        .add_directive(
            "tower_http=info"
                .parse()
                .expect("static directive 'tower_http=info' is valid"),
        );

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[allow(clippy::expect_used)]
fn crate_directive(level: &str) -> Directive {
    format!("autopilot_engine={}", level.trim().to_ascii_lowercase())
        .parse()
        .unwrap_or_else(|_| {
            "autopilot_engine=info"
                .parse()
                .expect("static directive 'autopilot_engine=info' is valid")
        })
}

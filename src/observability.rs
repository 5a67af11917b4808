//! 可观测性：日志初始化
//!
//! 默认 info；--verbose 提升为 debug（输出中间提示词、响应与裁决），RUST_LOG 仍可覆盖。

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init(verbose: bool) {
    let directive = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(directive.parse().unwrap()))
        .with(fmt::layer())
        .init();
}

// Infrastructure layer modules
pub mod lambda_invoker;
pub mod logging;
pub mod warmup_config;

// Re-exports
pub use lambda_invoker::{
    AwsLambdaInvoker, DryRunInvoker, FunctionInvoker, InvokeSummary, LambdaInvokeError,
};
pub use logging::init_logging;
pub use warmup_config::{EnvSnapshot, WarmupConfig, WarmupConfigError};

// Domain layer modules
pub mod concurrency;
pub mod invoke_request;
pub mod warmup_function;
pub mod warmup_report;

// Re-exports
pub use concurrency::{
    ConcurrencySource, ResolvedConcurrency, function_concurrency_env_var, resolve_concurrency,
};
pub use invoke_request::{WarmupInvokeRequest, encode_client_context, resolve_qualifier};
pub use warmup_function::{
    ClientContextSetting, DEFAULT_CONCURRENCY, DEFAULT_PAYLOAD, WarmupFunction,
    WarmupFunctionConfig,
};
pub use warmup_report::{FunctionOutcome, OutcomeStatus, WarmupReport};

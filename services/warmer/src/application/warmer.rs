/// ウォームアップ実行
///
/// 全ての対象関数を並行に処理し、関数ごとに決定した数だけ同時にInvokeする。
/// ある呼び出しの失敗は他の呼び出し・他の関数の処理を中断しない（エラー継続戦略）。
/// 全ての結果が揃ってからサマリーを出力する。
use std::time::Instant;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::domain::{
    FunctionOutcome, WarmupFunction, WarmupInvokeRequest, WarmupReport, resolve_concurrency,
};
use crate::infrastructure::{EnvSnapshot, FunctionInvoker, LambdaInvokeError, WarmupConfig};

/// ウォームアップ実行器
///
/// Lambdaクライアントと関数リストは呼び出し側から注入する。
pub struct Warmer<I>
where
    I: FunctionInvoker,
{
    /// Invoke実装（全呼び出しで共有）
    invoker: I,
    /// 関数リストとデフォルトのエイリアス
    config: WarmupConfig,
}

impl<I> Warmer<I>
where
    I: FunctionInvoker,
{
    /// 新しいWarmerを作成
    pub fn new(invoker: I, config: WarmupConfig) -> Self {
        Self { invoker, config }
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// ウォームアップを1回実行する
    ///
    /// 呼び出しの失敗はログ出力と結果への記録のみ行い、エラーとしては返さない。
    ///
    /// # 引数
    /// * `env` - 同時呼び出し数の決定に使う環境変数
    pub async fn run(&self, env: &EnvSnapshot) -> WarmupReport {
        let start_time = Instant::now();
        info!(
            function_count = self.config.functions().len(),
            default_alias = ?self.config.default_alias(),
            "Warm Up Start"
        );

        let outcomes = join_all(
            self.config
                .functions()
                .iter()
                .map(|function| self.warm_function(function, env)),
        )
        .await;

        let total_duration = start_time.elapsed().as_millis() as u64;
        let report = WarmupReport::new(chrono::Utc::now().to_rfc3339(), outcomes, total_duration);

        if report.overall_success() {
            info!(
                invoked_count = report.invoked_count,
                skipped_count = report.skipped_count,
                failed_count = report.failed_count,
                total_duration_ms = total_duration,
                "{}",
                report.summary()
            );
        } else {
            warn!(
                invoked_count = report.invoked_count,
                skipped_count = report.skipped_count,
                failed_count = report.failed_count,
                failed_functions = ?report.failed_functions(),
                total_duration_ms = total_duration,
                "{}",
                report.summary()
            );
        }

        report
    }

    /// 1関数分のウォームアップ
    async fn warm_function(&self, function: &WarmupFunction, env: &EnvSnapshot) -> FunctionOutcome {
        if !function.config.enabled {
            info!(function_name = %function.name, "ウォームアップ無効のためスキップ");
            return FunctionOutcome::skipped(&function.name);
        }

        let resolved = resolve_concurrency(function, |key| env.get(key));
        info!(
            function_name = %function.name,
            concurrency = resolved.value,
            source = %resolved.source,
            "Warming up function"
        );

        let request = WarmupInvokeRequest::for_function(function, self.config.default_alias());

        // try_join_allは最初の失敗で残りを破棄するため使わない
        let start_time = Instant::now();
        let results = join_all((0..resolved.value).map(|_| self.invoker.invoke(&request))).await;
        let duration_ms = start_time.elapsed().as_millis() as u64;

        let errors: Vec<LambdaInvokeError> = results.into_iter().filter_map(Result::err).collect();

        match errors.first() {
            None => {
                info!(
                    function_name = %function.name,
                    concurrency = resolved.value,
                    duration_ms = duration_ms,
                    "Warm Up Invoke Success"
                );
                FunctionOutcome::success(&function.name, resolved.value, resolved.source, duration_ms)
            }
            Some(first) => {
                error!(
                    function_name = %function.name,
                    concurrency = resolved.value,
                    failed_invocations = errors.len(),
                    error = %first,
                    duration_ms = duration_ms,
                    "Warm Up Invoke Error"
                );
                FunctionOutcome::failure(
                    &function.name,
                    resolved.value,
                    resolved.source,
                    format!("{}/{} invocations failed: {}", errors.len(), resolved.value, first),
                    duration_ms,
                )
            }
        }
    }
}

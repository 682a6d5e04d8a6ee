/// ウォームアップ結果
///
/// 関数ごとの呼び出し結果と、1回の実行全体のサマリーを保持する。
/// 実行終了時にJSONとしてログ出力される。
use serde::{Deserialize, Serialize};

use super::ConcurrencySource;

/// 関数ごとの結果種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// 全ての同時呼び出しが成功
    Success,
    /// 1つ以上の呼び出しが失敗
    Failure,
    /// enabled=falseのため呼び出しなし
    Skipped,
}

/// 関数ごとのウォームアップ結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionOutcome {
    /// 関数名
    pub function_name: String,
    /// 結果種別
    pub status: OutcomeStatus,
    /// 発行した呼び出し数
    pub concurrency: u32,
    /// 同時呼び出し数の決定元
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency_source: Option<ConcurrencySource>,
    /// 結果メッセージ
    pub message: String,
    /// 実行時間（ミリ秒）
    pub duration_ms: u64,
}

impl FunctionOutcome {
    /// 成功結果を作成
    pub fn success(
        function_name: impl Into<String>,
        concurrency: u32,
        source: ConcurrencySource,
        duration_ms: u64,
    ) -> Self {
        let name = function_name.into();
        Self {
            message: format!("{} warmed ({} invocations)", name, concurrency),
            function_name: name,
            status: OutcomeStatus::Success,
            concurrency,
            concurrency_source: Some(source),
            duration_ms,
        }
    }

    /// 失敗結果を作成
    pub fn failure(
        function_name: impl Into<String>,
        concurrency: u32,
        source: ConcurrencySource,
        error: impl std::fmt::Display,
        duration_ms: u64,
    ) -> Self {
        let name = function_name.into();
        Self {
            message: format!("{} failed: {}", name, error),
            function_name: name,
            status: OutcomeStatus::Failure,
            concurrency,
            concurrency_source: Some(source),
            duration_ms,
        }
    }

    /// スキップ結果を作成
    pub fn skipped(function_name: impl Into<String>) -> Self {
        let name = function_name.into();
        Self {
            message: format!("{} skipped (disabled)", name),
            function_name: name,
            status: OutcomeStatus::Skipped,
            concurrency: 0,
            concurrency_source: None,
            duration_ms: 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == OutcomeStatus::Failure
    }
}

/// 1回のウォームアップ実行全体の結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmupReport {
    /// 結果タイプ
    #[serde(rename = "type")]
    pub result_type: String,
    /// タイムスタンプ（ISO 8601形式）
    pub timestamp: String,
    /// 関数ごとの結果
    pub functions: Vec<FunctionOutcome>,
    /// 呼び出しを行った関数数
    pub invoked_count: usize,
    /// 1つ以上の呼び出しが失敗した関数数
    pub failed_count: usize,
    /// スキップした関数数
    pub skipped_count: usize,
    /// 合計実行時間（ミリ秒）
    ///
    /// 関数は並行に処理されるため、各関数のduration_msの合計ではなく実測値。
    pub total_duration_ms: u64,
}

impl WarmupReport {
    /// 新しいWarmupReportを作成
    pub fn new(timestamp: String, functions: Vec<FunctionOutcome>, total_duration_ms: u64) -> Self {
        let failed_count = functions.iter().filter(|f| f.is_failure()).count();
        let skipped_count = functions
            .iter()
            .filter(|f| f.status == OutcomeStatus::Skipped)
            .count();
        let invoked_count = functions.len() - skipped_count;

        Self {
            result_type: "warmup-result".to_string(),
            timestamp,
            functions,
            invoked_count,
            failed_count,
            skipped_count,
            total_duration_ms,
        }
    }

    /// 全関数が成功（またはスキップ）したかどうか
    pub fn overall_success(&self) -> bool {
        self.failed_count == 0
    }

    /// 失敗した関数名のリスト
    pub fn failed_functions(&self) -> Vec<&str> {
        self.functions
            .iter()
            .filter(|f| f.is_failure())
            .map(|f| f.function_name.as_str())
            .collect()
    }

    /// サマリーメッセージ
    pub fn summary(&self) -> String {
        format!("Warm Up Finished with {} invoke errors", self.failed_count)
    }
}

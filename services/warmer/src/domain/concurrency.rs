// 同時呼び出し数の決定
//
// 関数ごとの環境変数 → グローバル環境変数 → 関数定義の静的な値、
// の順で同時呼び出し数を決定するドメイン層コンポーネント。

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::WarmupFunction;

/// 環境変数名: 全関数共通の同時呼び出し数
pub const ENV_GLOBAL_CONCURRENCY: &str = "WARMUP_CONCURRENCY";

/// 環境変数名プレフィックス: 関数ごとの同時呼び出し数
pub const ENV_FUNCTION_CONCURRENCY_PREFIX: &str = "WARMUP_CONCURRENCY_";

/// 同時呼び出し数の決定元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConcurrencySource {
    /// `WARMUP_CONCURRENCY_<NAME>`
    FunctionEnv,
    /// `WARMUP_CONCURRENCY`
    GlobalEnv,
    /// 関数定義の`concurrency`
    Config,
}

impl ConcurrencySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConcurrencySource::FunctionEnv => "function-specific environment variable",
            ConcurrencySource::GlobalEnv => "global environment variable",
            ConcurrencySource::Config => "configuration",
        }
    }
}

impl std::fmt::Display for ConcurrencySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 決定された同時呼び出し数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedConcurrency {
    pub value: u32,
    pub source: ConcurrencySource,
}

/// 関数ごとの同時呼び出し数を指定する環境変数名を生成する
///
/// 関数名を大文字化し、英数字以外を`_`に置き換える。
/// 例: `svc-dev-api` → `WARMUP_CONCURRENCY_SVC_DEV_API`
pub fn function_concurrency_env_var(function_name: &str) -> String {
    let suffix: String = function_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{}", ENV_FUNCTION_CONCURRENCY_PREFIX, suffix)
}

/// 同時呼び出し数の上限
///
/// Lambdaのリージョンあたり同時実行数のデフォルト上限と同じ値。
/// これを超える値は上限に丸める。
pub const MAX_CONCURRENCY: u32 = 1000;

/// 同時呼び出し数を決定する
///
/// `lookup`は環境変数の取得関数。プロセス環境に依存しないよう呼び出し側から注入する。
/// 値が不正（空・非整数・負数）な環境変数は警告を出して無視し、次の候補を参照する。
/// 決定した値が`MAX_CONCURRENCY`を超える場合は警告を出して上限に丸める。
pub fn resolve_concurrency<F>(function: &WarmupFunction, lookup: F) -> ResolvedConcurrency
where
    F: Fn(&str) -> Option<String>,
{
    let function_var = function_concurrency_env_var(&function.name);
    let (value, source) =
        if let Some(value) = parse_concurrency_var(&function_var, lookup(&function_var)) {
            (value, ConcurrencySource::FunctionEnv)
        } else if let Some(value) =
            parse_concurrency_var(ENV_GLOBAL_CONCURRENCY, lookup(ENV_GLOBAL_CONCURRENCY))
        {
            (value, ConcurrencySource::GlobalEnv)
        } else {
            (function.config.concurrency, ConcurrencySource::Config)
        };

    if value > MAX_CONCURRENCY {
        warn!(
            function_name = %function.name,
            requested = value,
            max = MAX_CONCURRENCY,
            source = %source,
            "同時呼び出し数が上限を超えるため丸める"
        );
    }

    ResolvedConcurrency {
        value: value.min(MAX_CONCURRENCY),
        source,
    }
}

fn parse_concurrency_var(key: &str, raw: Option<String>) -> Option<u32> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        warn!(env_var = key, "同時呼び出し数の環境変数が空のため無視");
        return None;
    }

    match trimmed.parse::<u32>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(
                env_var = key,
                value = trimmed,
                error = %e,
                "同時呼び出し数の環境変数が不正なため無視"
            );
            None
        }
    }
}

/// Warmup Lambda設定
///
/// ウォームアップ対象の関数リストとデフォルトのエイリアスを管理する。
/// 関数リストは環境変数のインラインJSON、またはデプロイパッケージ内のJSONファイルから読み込む。
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::WarmupFunction;

/// 環境変数名: インラインJSONの関数リスト
pub const ENV_FUNCTIONS: &str = "WARMUP_FUNCTIONS";

/// 環境変数名: 関数リストJSONファイルのパス
pub const ENV_FUNCTIONS_FILE: &str = "WARMUP_FUNCTIONS_FILE";

/// 環境変数名: デフォルトのエイリアス
pub const ENV_SERVERLESS_ALIAS: &str = "SERVERLESS_ALIAS";

/// 環境変数名: デプロイパッケージの展開先（Lambdaランタイムが設定）
pub const ENV_LAMBDA_TASK_ROOT: &str = "LAMBDA_TASK_ROOT";

/// 関数リストファイルのデフォルトパス
pub const DEFAULT_FUNCTIONS_FILE: &str = "warmup-functions.json";

/// Warmup設定のエラー型
#[derive(Debug, Error)]
pub enum WarmupConfigError {
    #[error("関数リストファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("関数リストファイルの読み込みに失敗しました: {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("関数リストのJSONが不正です ({origin}): {message}")]
    InvalidJson { origin: String, message: String },
}

/// Warmup Lambda設定
///
/// 以下の環境変数から読み込む:
/// - WARMUP_FUNCTIONS: 関数リスト（JSON配列、設定時はファイルより優先）
/// - WARMUP_FUNCTIONS_FILE: 関数リストJSONファイルのパス（デフォルト: warmup-functions.json）
/// - SERVERLESS_ALIAS: 関数定義にエイリアスがない場合のQualifier
#[derive(Debug, Clone)]
pub struct WarmupConfig {
    /// ウォームアップ対象の関数リスト
    functions: Vec<WarmupFunction>,
    /// デフォルトのエイリアス
    default_alias: Option<String>,
}

impl WarmupConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # エラー
    /// 関数リストが読み込めない、またはJSONが不正な場合はエラーを返す
    pub fn from_env() -> Result<Self, WarmupConfigError> {
        let default_alias = read_optional_env(ENV_SERVERLESS_ALIAS);

        if let Some(inline) = read_optional_env(ENV_FUNCTIONS) {
            let functions = parse_functions(&inline, ENV_FUNCTIONS)?;
            return Ok(Self::new(functions, default_alias));
        }

        let path = resolve_functions_path(
            read_optional_env(ENV_FUNCTIONS_FILE).as_deref(),
            read_optional_env(ENV_LAMBDA_TASK_ROOT).as_deref(),
        );
        Self::from_file(path, default_alias)
    }

    /// JSONファイルから関数リストを読み込む
    pub fn from_file(
        path: impl AsRef<Path>,
        default_alias: Option<String>,
    ) -> Result<Self, WarmupConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WarmupConfigError::FileNotFound(display.clone())
            } else {
                WarmupConfigError::ReadFailed {
                    path: display.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        let functions = parse_functions(&content, &display)?;
        Ok(Self::new(functions, default_alias))
    }

    /// 明示的な値で設定を作成（テスト用）
    pub fn new(functions: Vec<WarmupFunction>, default_alias: Option<String>) -> Self {
        Self {
            functions,
            default_alias: default_alias.filter(|a| !a.trim().is_empty()),
        }
    }

    /// デフォルトのエイリアスを上書きする（CLIの--alias用）
    pub fn with_default_alias(mut self, alias: impl Into<String>) -> Self {
        self.default_alias = Some(alias.into()).filter(|a| !a.trim().is_empty());
        self
    }

    /// ウォームアップ対象の関数リストを取得
    pub fn functions(&self) -> &[WarmupFunction] {
        &self.functions
    }

    /// デフォルトのエイリアスを取得
    pub fn default_alias(&self) -> Option<&str> {
        self.default_alias.as_deref()
    }

    /// 関数名のリストを取得（ログ用）
    pub fn function_names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name.as_str()).collect()
    }
}

/// JSON配列を関数リストとしてパースする
pub fn parse_functions(json: &str, origin: &str) -> Result<Vec<WarmupFunction>, WarmupConfigError> {
    serde_json::from_str(json).map_err(|e| WarmupConfigError::InvalidJson {
        origin: origin.to_string(),
        message: e.to_string(),
    })
}

/// 関数リストファイルのパスを決定する
///
/// 相対パスはLAMBDA_TASK_ROOTが設定されていればその配下として解決する。
pub fn resolve_functions_path(file: Option<&str>, task_root: Option<&str>) -> PathBuf {
    let file = PathBuf::from(file.unwrap_or(DEFAULT_FUNCTIONS_FILE));
    match task_root {
        Some(root) if file.is_relative() => Path::new(root).join(file),
        _ => file,
    }
}

// 空文字はNone扱い
fn read_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

/// 環境変数のスナップショット
///
/// 実行ごとに一度だけ取得し、同時呼び出し数の決定に使う。
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// 現在のプロセス環境変数を取得する（UTF-8でない値は無視）
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

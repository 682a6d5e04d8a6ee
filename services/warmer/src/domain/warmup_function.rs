// ウォームアップ対象関数の定義
//
// デプロイ時に生成される関数リスト（JSON）の1要素を表すドメイン層コンポーネント。
// 実行開始時に一度だけ読み込まれ、実行中に変更されることはない。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ===========================================
// デフォルト値定義
// ===========================================

/// ペイロード未指定時にウォームアップ呼び出しで送るJSON
pub const DEFAULT_PAYLOAD: &str = r#"{"source":"serverless-plugin-warmup"}"#;

/// 同時呼び出し数の未指定時のデフォルト値
pub const DEFAULT_CONCURRENCY: u32 = 1;

// ===========================================
// WarmupFunction構造体
// ===========================================

/// ウォームアップ対象のLambda関数
///
/// JSON形式:
/// ```json
/// {"name": "my-service-dev-api", "config": {"enabled": true, "concurrency": 2}}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WarmupFunction {
    /// Lambda関数名（ARNも可）
    pub name: String,
    /// 関数ごとのウォームアップ設定
    #[serde(default)]
    pub config: WarmupFunctionConfig,
}

impl WarmupFunction {
    /// 関数名と設定から作成
    pub fn new(name: impl Into<String>, config: WarmupFunctionConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

/// 関数ごとのウォームアップ設定
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarmupFunctionConfig {
    /// falseの場合はウォームアップ対象から除外
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 呼び出し時に送るJSON文字列
    #[serde(default = "default_payload", deserialize_with = "deserialize_payload")]
    pub payload: String,
    /// 関数ごとの同時呼び出し数（静的な既定値）
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
    /// 呼び出し対象のエイリアス/バージョン
    #[serde(default)]
    pub alias: Option<String>,
    /// ClientContextとして渡すカスタムデータ
    #[serde(default)]
    pub client_context: ClientContextSetting,
}

impl Default for WarmupFunctionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            payload: default_payload(),
            concurrency: default_concurrency(),
            alias: None,
            client_context: ClientContextSetting::default(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_payload() -> String {
    DEFAULT_PAYLOAD.to_string()
}

fn default_concurrency() -> u32 {
    DEFAULT_CONCURRENCY
}

/// ペイロードはJSON文字列として保持する
///
/// 生成ツールは文字列化済みのJSONを出力するが、手書きの設定ファイルでは
/// オブジェクトをそのまま書けるようにする。
fn deserialize_payload<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(default_payload()),
        Value::String(text) => Ok(text),
        other => Ok(other.to_string()),
    }
}

// ===========================================
// ClientContext設定
// ===========================================

/// ClientContextの指定方法
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClientContextSetting {
    /// 未指定: ペイロードをClientContextとして使う
    #[default]
    Unset,
    /// `false`指定: ClientContextを送らない
    Disabled,
    /// JSON文字列を明示指定
    Custom(String),
}

impl ClientContextSetting {
    /// 実際に送るClientContextの生JSONを決定する
    ///
    /// 空文字列は「ClientContextなし」として扱う。
    pub fn resolve<'a>(&'a self, payload: &'a str) -> Option<&'a str> {
        let raw = match self {
            ClientContextSetting::Unset => payload,
            ClientContextSetting::Disabled => return None,
            ClientContextSetting::Custom(text) => text.as_str(),
        };
        Some(raw).filter(|s| !s.trim().is_empty())
    }
}

impl<'de> Deserialize<'de> for ClientContextSetting {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let setting = match Value::deserialize(deserializer)? {
            Value::Null | Value::Bool(true) => ClientContextSetting::Unset,
            Value::Bool(false) => ClientContextSetting::Disabled,
            Value::String(text) => ClientContextSetting::Custom(text),
            other => ClientContextSetting::Custom(other.to_string()),
        };
        Ok(setting)
    }
}

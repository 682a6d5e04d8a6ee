/// ウォームアップInvokeリクエスト
///
/// 関数定義から、Invoke APIに渡す値（関数名・Qualifier・ペイロード・ClientContext）を組み立てる。
/// InvocationType（RequestResponse）とLogType（None）は固定のため、ここでは保持しない。
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use super::WarmupFunction;

/// 1関数分のInvokeリクエスト
///
/// 同じ関数への同時呼び出しはすべてこの値を共有する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarmupInvokeRequest {
    /// 呼び出し対象の関数名
    pub function_name: String,
    /// エイリアス/バージョン（Noneなら$LATEST）
    pub qualifier: Option<String>,
    /// JSONペイロード
    pub payload: String,
    /// base64エンコード済みClientContext
    pub client_context: Option<String>,
}

impl WarmupInvokeRequest {
    /// 関数定義からリクエストを作成
    ///
    /// # 引数
    /// * `function` - ウォームアップ対象の関数定義
    /// * `default_alias` - 関数定義にエイリアスがない場合に使う値（SERVERLESS_ALIAS）
    pub fn for_function(function: &WarmupFunction, default_alias: Option<&str>) -> Self {
        let config = &function.config;
        let client_context = config
            .client_context
            .resolve(&config.payload)
            .map(encode_client_context);

        Self {
            function_name: function.name.clone(),
            qualifier: resolve_qualifier(config.alias.as_deref(), default_alias),
            payload: config.payload.clone(),
            client_context,
        }
    }
}

/// Qualifierを決定する（関数定義のalias → デフォルト → なし）
pub fn resolve_qualifier(alias: Option<&str>, default_alias: Option<&str>) -> Option<String> {
    alias
        .filter(|a| !a.trim().is_empty())
        .or(default_alias.filter(|a| !a.trim().is_empty()))
        .map(str::to_string)
}

/// ClientContextを`{"custom":<raw>}`で包んでbase64エンコードする
pub fn encode_client_context(raw: &str) -> String {
    BASE64.encode(format!(r#"{{"custom":{}}}"#, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientContextSetting, WarmupFunctionConfig};
    use base64::Engine as _;

    fn decode(encoded: &str) -> String {
        String::from_utf8(BASE64.decode(encoded).unwrap()).unwrap()
    }

    #[test]
    fn test_encode_client_context_wraps_in_custom() {
        let encoded = encode_client_context(r#"{"source":"warmup"}"#);

        assert_eq!(decode(&encoded), r#"{"custom":{"source":"warmup"}}"#);
        let parsed: serde_json::Value = serde_json::from_str(&decode(&encoded)).unwrap();
        assert_eq!(parsed["custom"]["source"], "warmup");
    }

    #[test]
    fn test_request_uses_payload_as_context_by_default() {
        let function = WarmupFunction::new("svc-api", WarmupFunctionConfig::default());

        let request = WarmupInvokeRequest::for_function(&function, None);

        assert_eq!(request.function_name, "svc-api");
        assert_eq!(request.payload, crate::domain::DEFAULT_PAYLOAD);
        assert_eq!(
            decode(request.client_context.as_deref().unwrap()),
            format!(r#"{{"custom":{}}}"#, crate::domain::DEFAULT_PAYLOAD)
        );
        assert!(request.qualifier.is_none());
    }

    #[test]
    fn test_request_with_explicit_client_context() {
        let function = WarmupFunction::new(
            "svc-api",
            WarmupFunctionConfig {
                client_context: ClientContextSetting::Custom(r#"{"k":"v"}"#.to_string()),
                ..WarmupFunctionConfig::default()
            },
        );

        let request = WarmupInvokeRequest::for_function(&function, None);

        assert_eq!(
            decode(request.client_context.as_deref().unwrap()),
            r#"{"custom":{"k":"v"}}"#
        );
    }

    #[test]
    fn test_request_omits_disabled_client_context() {
        let function = WarmupFunction::new(
            "svc-api",
            WarmupFunctionConfig {
                client_context: ClientContextSetting::Disabled,
                ..WarmupFunctionConfig::default()
            },
        );

        let request = WarmupInvokeRequest::for_function(&function, None);

        assert!(request.client_context.is_none());
    }

    #[test]
    fn test_request_omits_context_when_payload_is_empty() {
        let function = WarmupFunction::new(
            "svc-api",
            WarmupFunctionConfig {
                payload: String::new(),
                ..WarmupFunctionConfig::default()
            },
        );

        assert!(WarmupInvokeRequest::for_function(&function, None).client_context.is_none());
    }

    // ==================== Qualifier決定テスト ====================

    #[test]
    fn test_qualifier_prefers_function_alias() {
        assert_eq!(resolve_qualifier(Some("live"), Some("dev")), Some("live".to_string()));
    }

    #[test]
    fn test_qualifier_falls_back_to_default_alias() {
        assert_eq!(resolve_qualifier(None, Some("dev")), Some("dev".to_string()));
        assert_eq!(resolve_qualifier(Some(""), Some("dev")), Some("dev".to_string()));
    }

    #[test]
    fn test_qualifier_unspecified() {
        assert_eq!(resolve_qualifier(None, None), None);
        assert_eq!(resolve_qualifier(None, Some(" ")), None);
    }

    #[test]
    fn test_request_qualifier_from_default_alias() {
        let function = WarmupFunction::new("svc-api", WarmupFunctionConfig::default());

        let request = WarmupInvokeRequest::for_function(&function, Some("staging"));

        assert_eq!(request.qualifier.as_deref(), Some("staging"));
    }
}

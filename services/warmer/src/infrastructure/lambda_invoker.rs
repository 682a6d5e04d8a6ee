//! Lambda Invokeモジュール
//!
//! ウォームアップ対象のLambda関数を同期呼び出し（RequestResponse）する操作を提供する。
//! - 実際のAWS SDKによる呼び出し（AwsLambdaInvoker）
//! - AWSを呼ばずにログだけ出すドライラン（DryRunInvoker）

use async_trait::async_trait;
use aws_sdk_lambda::Client as LambdaClient;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{InvocationType, LogType};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::WarmupInvokeRequest;

/// Invoke操作のエラー型
///
/// 原因（ネットワーク・スロットリング・関数不在など）は区別しない。
#[derive(Debug, Error)]
pub enum LambdaInvokeError {
    /// AWS SDK エラー
    #[error("AWS Lambda Invokeエラー: {0}")]
    AwsSdkError(String),
}

/// Invokeの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeSummary {
    /// HTTPステータスコード
    pub status_code: i32,
    /// 関数内で発生したエラー（X-Amz-Function-Error）
    pub function_error: Option<String>,
}

impl InvokeSummary {
    /// 正常終了した呼び出しの結果を作成
    pub fn ok(status_code: i32) -> Self {
        Self {
            status_code,
            function_error: None,
        }
    }
}

/// Lambda呼び出しトレイト（テスト用の抽象化）
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    /// Lambda関数を1回呼び出す
    ///
    /// # 戻り値
    /// * `Ok(InvokeSummary)` - API呼び出しが成功（関数内エラーを含む）
    /// * `Err(LambdaInvokeError)` - API呼び出し自体が失敗
    async fn invoke(&self, request: &WarmupInvokeRequest)
    -> Result<InvokeSummary, LambdaInvokeError>;
}

/// 実際のAWS Lambda SDKを使用した呼び出し実装
///
/// クライアントは全ての同時呼び出しで共有される（読み取り専用）。
pub struct AwsLambdaInvoker {
    client: LambdaClient,
}

impl AwsLambdaInvoker {
    /// 新しいAwsLambdaInvokerを作成
    pub fn new(client: LambdaClient) -> Self {
        Self { client }
    }

    /// AWS設定からデフォルトのクライアントを作成
    pub async fn from_config() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = LambdaClient::new(&config);
        Self::new(client)
    }
}

#[async_trait]
impl FunctionInvoker for AwsLambdaInvoker {
    async fn invoke(
        &self,
        request: &WarmupInvokeRequest,
    ) -> Result<InvokeSummary, LambdaInvokeError> {
        let result = self
            .client
            .invoke()
            .function_name(&request.function_name)
            .invocation_type(InvocationType::RequestResponse)
            .log_type(LogType::None)
            .set_qualifier(request.qualifier.clone())
            .set_client_context(request.client_context.clone())
            .payload(Blob::new(request.payload.as_bytes()))
            .send()
            .await;

        match result {
            Ok(output) => {
                let summary = InvokeSummary {
                    status_code: output.status_code(),
                    function_error: output.function_error().map(str::to_string),
                };
                if let Some(function_error) = &summary.function_error {
                    // API呼び出しとしては成功しているため失敗扱いにはしない
                    warn!(
                        function_name = %request.function_name,
                        status_code = summary.status_code,
                        function_error = %function_error,
                        "ウォームアップ呼び出しで関数内エラー"
                    );
                } else {
                    debug!(
                        function_name = %request.function_name,
                        status_code = summary.status_code,
                        "Invoke成功"
                    );
                }
                Ok(summary)
            }
            Err(err) => Err(LambdaInvokeError::AwsSdkError(
                DisplayErrorContext(&err).to_string(),
            )),
        }
    }
}

/// AWSを呼ばずにリクエスト内容をログ出力するだけの実装（ローカル確認用）
pub struct DryRunInvoker;

#[async_trait]
impl FunctionInvoker for DryRunInvoker {
    async fn invoke(
        &self,
        request: &WarmupInvokeRequest,
    ) -> Result<InvokeSummary, LambdaInvokeError> {
        info!(
            function_name = %request.function_name,
            qualifier = ?request.qualifier,
            payload = %request.payload,
            has_client_context = request.client_context.is_some(),
            "ドライラン: Invokeをスキップ"
        );
        Ok(InvokeSummary::ok(200))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DEFAULT_PAYLOAD, WarmupFunction, WarmupFunctionConfig, encode_client_context,
    };
    use aws_sdk_lambda::config::{BehaviorVersion, Credentials, Region};
    use aws_smithy_http_client::test_util::{CaptureRequestReceiver, capture_request};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// テスト用のモック呼び出し
    struct MockInvoker {
        /// 失敗させる関数名のリスト
        failing_functions: Vec<String>,
        /// invoke呼び出し回数
        call_count: Arc<AtomicUsize>,
    }

    impl MockInvoker {
        fn new(failing_functions: Vec<String>) -> Self {
            Self {
                failing_functions,
                call_count: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FunctionInvoker for MockInvoker {
        async fn invoke(
            &self,
            request: &WarmupInvokeRequest,
        ) -> Result<InvokeSummary, LambdaInvokeError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);

            if self.failing_functions.contains(&request.function_name) {
                Err(LambdaInvokeError::AwsSdkError("mock error".to_string()))
            } else {
                Ok(InvokeSummary::ok(200))
            }
        }
    }

    fn request(name: &str) -> WarmupInvokeRequest {
        WarmupInvokeRequest::for_function(
            &WarmupFunction::new(name, WarmupFunctionConfig::default()),
            None,
        )
    }

    #[test]
    fn test_invoke_error_display() {
        let error = LambdaInvokeError::AwsSdkError("ResourceNotFoundException".to_string());
        assert_eq!(
            error.to_string(),
            "AWS Lambda Invokeエラー: ResourceNotFoundException"
        );
    }

    #[test]
    fn test_invoke_summary_ok() {
        let summary = InvokeSummary::ok(200);

        assert_eq!(summary.status_code, 200);
        assert!(summary.function_error.is_none());
    }

    #[tokio::test]
    async fn test_mock_invoker_through_trait_object() {
        let mock = MockInvoker::new(vec!["broken".to_string()]);
        let invoker: &dyn FunctionInvoker = &mock;

        assert!(invoker.invoke(&request("healthy")).await.is_ok());
        assert!(invoker.invoke(&request("broken")).await.is_err());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_dry_run_invoker_always_succeeds() {
        let result = DryRunInvoker.invoke(&request("svc-api")).await;

        assert_eq!(result.unwrap(), InvokeSummary::ok(200));
    }

    // ==================== SDKリクエスト形状テスト ====================

    /// 送信したHTTPリクエストを記録するクライアントでAwsLambdaInvokerを作成
    fn capturing_invoker() -> (AwsLambdaInvoker, CaptureRequestReceiver) {
        let (http_client, captured) = capture_request(None);
        let conf = aws_sdk_lambda::Config::builder()
            .http_client(http_client)
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("akid", "secret", None, None, "test"))
            .behavior_version(BehaviorVersion::latest())
            .build();
        (AwsLambdaInvoker::new(LambdaClient::from_conf(conf)), captured)
    }

    #[tokio::test]
    async fn test_aws_invoker_sends_request_response_with_qualifier_and_context() {
        let (invoker, captured) = capturing_invoker();
        let request = WarmupInvokeRequest::for_function(
            &WarmupFunction::new("svc", WarmupFunctionConfig::default()),
            Some("live"),
        );

        // キャプチャ用クライアントは空のレスポンスを返すため、結果の成否は問わない
        let _ = invoker.invoke(&request).await;

        let sent = captured.expect_request();
        assert!(sent.uri().contains("/functions/svc/invocations"));
        assert!(sent.uri().contains("Qualifier=live"));
        assert_eq!(
            sent.headers().get("x-amz-invocation-type"),
            Some("RequestResponse")
        );
        assert_eq!(sent.headers().get("x-amz-log-type"), Some("None"));
        assert_eq!(
            sent.headers().get("x-amz-client-context"),
            Some(encode_client_context(DEFAULT_PAYLOAD).as_str())
        );
        assert_eq!(sent.body().bytes(), Some(DEFAULT_PAYLOAD.as_bytes()));
    }

    #[tokio::test]
    async fn test_aws_invoker_omits_unset_qualifier_and_context() {
        let (invoker, captured) = capturing_invoker();
        let request = WarmupInvokeRequest {
            function_name: "svc".to_string(),
            qualifier: None,
            payload: DEFAULT_PAYLOAD.to_string(),
            client_context: None,
        };

        let _ = invoker.invoke(&request).await;

        let sent = captured.expect_request();
        assert!(!sent.uri().contains("Qualifier"));
        assert!(sent.headers().get("x-amz-client-context").is_none());
    }
}

/// Warmup Lambda関数
///
/// EventBridgeスケジュールから定期的にトリガーされ、設定された関数リストの各関数を
/// 指定数だけ同時に同期呼び出しして実行環境をウォーム状態に保つ。
/// Lambda関数としても、ローカルスクリプトとしても実行可能。
///
/// # 環境変数
/// - WARMUP_FUNCTIONS: 関数リスト（JSON配列、設定時はファイルより優先）
/// - WARMUP_FUNCTIONS_FILE: 関数リストJSONファイル（デフォルト: warmup-functions.json）
/// - WARMUP_CONCURRENCY: 全関数共通の同時呼び出し数
/// - WARMUP_CONCURRENCY_<関数名>: 関数ごとの同時呼び出し数（最優先）
/// - SERVERLESS_ALIAS: 関数定義にエイリアスがない場合のQualifier
///
/// 個々の呼び出しの失敗はログ出力のみで、実行自体は常に成功として完了する。
///
/// # ローカル実行
/// ```bash
/// # 実際にInvokeする
/// cargo run --bin warmup -- --functions-file warmup-functions.json
///
/// # リクエスト内容だけ確認
/// cargo run --bin warmup -- --functions-file warmup-functions.json --dry-run
/// ```
use clap::Parser;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::{error, info};
use warmer::application::Warmer;
use warmer::domain::WarmupReport;
use warmer::infrastructure::{
    AwsLambdaInvoker, DryRunInvoker, EnvSnapshot, FunctionInvoker, WarmupConfig, init_logging,
};

/// コマンドライン引数（ローカル実行用）
#[derive(Parser, Debug)]
#[command(name = "warmup")]
#[command(about = "Lambda関数をウォームアップ呼び出しする")]
struct CliArgs {
    /// 関数リストJSONファイルのパス
    /// 環境変数WARMUP_FUNCTIONS_FILEより優先される
    #[arg(long, short = 'f')]
    functions_file: Option<String>,

    /// デフォルトのエイリアス
    /// 環境変数SERVERLESS_ALIASより優先される
    #[arg(long, short = 'a')]
    alias: Option<String>,

    /// AWSを呼び出さずにリクエスト内容だけをログ出力する
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    if std::env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
        info!("Lambda関数として起動");
        run_lambda().await
    } else {
        info!("ローカルスクリプトとして起動");
        run_local().await
    }
}

/// Lambda環境で実行
///
/// 設定とLambdaクライアントはコールドスタート時に一度だけ作成し、全invocationで共有する。
async fn run_lambda() -> Result<(), Error> {
    let config = load_config(WarmupConfig::from_env())?;
    let warmer = Warmer::new(AwsLambdaInvoker::from_config().await, config);
    let warmer = &warmer;

    info!("コールドスタート完了、Lambdaクライアントを初期化");

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handler(warmer, event).await
    }))
    .await
}

/// Lambda関数のメインハンドラー
///
/// トリガーイベントの内容は使用しない。
///
/// # 戻り値
/// 常にOkを返す（エラー継続戦略のため）
async fn handler<I: FunctionInvoker>(
    warmer: &Warmer<I>,
    event: LambdaEvent<Value>,
) -> Result<(), Error> {
    info!(
        request_id = %event.context.request_id,
        "Warmup Lambdaがトリガーされました"
    );

    let report = warmer.run(&EnvSnapshot::capture()).await;
    log_report(&report);

    Ok(())
}

/// ローカル実行用関数
async fn run_local() -> Result<(), Error> {
    let args = CliArgs::parse();

    info!(
        functions_file = ?args.functions_file,
        alias = ?args.alias,
        dry_run = args.dry_run,
        "コマンドライン引数をパース"
    );

    let mut config = match &args.functions_file {
        Some(path) => load_config(WarmupConfig::from_file(
            path,
            std::env::var("SERVERLESS_ALIAS").ok(),
        ))?,
        None => load_config(WarmupConfig::from_env())?,
    };
    if let Some(alias) = args.alias {
        config = config.with_default_alias(alias);
    }

    let env = EnvSnapshot::capture();
    let report = if args.dry_run {
        Warmer::new(DryRunInvoker, config).run(&env).await
    } else {
        Warmer::new(AwsLambdaInvoker::from_config().await, config)
            .run(&env)
            .await
    };
    log_report(&report);

    Ok(())
}

/// 設定読み込み結果をログ出力し、エラーはLambdaランタイムのエラーに変換する
///
/// 関数リストが読めない場合は呼び出しを一切行えないため、実行を終了する。
fn load_config(
    result: Result<WarmupConfig, warmer::infrastructure::WarmupConfigError>,
) -> Result<WarmupConfig, Error> {
    match result {
        Ok(config) => {
            info!(
                functions = ?config.function_names(),
                default_alias = ?config.default_alias(),
                "Warmup設定を読み込み"
            );
            Ok(config)
        }
        Err(err) => {
            error!(error = %err, "Warmup設定読み込み失敗");
            Err(Error::from(format!("Warmup設定読み込み失敗: {}", err)))
        }
    }
}

/// 実行結果をJSONでログ出力
///
/// サマリー行はWarmer側で出力済みのため、ここでは結果の詳細だけを出す。
fn log_report(report: &WarmupReport) {
    let result_json = serde_json::to_string_pretty(report).unwrap_or_default();
    info!(result = %result_json, "ウォームアップ結果");
}

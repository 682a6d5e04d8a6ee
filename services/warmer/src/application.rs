// アプリケーション層モジュール
pub mod warmer;

// 再エクスポート
pub use warmer::Warmer;

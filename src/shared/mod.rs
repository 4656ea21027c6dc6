/// 共有モジュール
///
/// 機能横断で使用される共通コンポーネント（エラー型、設定、APIクライアント）
/// を提供します。
pub mod api_client;
pub mod config;
pub mod errors;

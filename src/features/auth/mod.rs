/// 認証機能のモジュール
///
/// 認証プロトコルの詳細はバックエンドサービスに委譲されます。
/// このモジュールはサインイン／サインアップの呼び出しと、
/// 各サービスに明示的に渡されるセッションコンテキストを提供します。
pub mod models;
pub mod service;
pub mod session;

pub use models::*;
pub use service::*;
pub use session::*;

/// 通知機能モジュール
///
/// プッシュ通知トークンの登録・解除と、支払いリマインダーの対象抽出を
/// 提供します。通知の実際の配信はバックエンド側の責務です。
pub mod models;
pub mod service;
pub mod store;

pub use models::*;
pub use service::*;
pub use store::*;

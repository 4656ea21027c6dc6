/// サブスクリプション機能モジュール
///
/// このモジュールは、サブスクリプション管理に関連するすべての機能を提供します：
/// - 次回支払日の計算（再発計算エンジン）
/// - サブスクリプションの作成、編集、アーカイブ、再有効化、削除
/// - 有効／アーカイブ済みコレクションへの分割
/// - 月額換算合計などの統計計算
/// - レコードストア境界の定義とAPI実装
pub mod models;
pub mod recurrence;
pub mod service;
pub mod stats;
pub mod store;

// 公開インターフェース
pub use models::{
    CreateSubscriptionDto, Frequency, NewSubscription, Subscription, SubscriptionPatch,
    UpdateSubscriptionDto,
};
pub use recurrence::{advance_one_period, compute_next_payment};
pub use service::SubscriptionService;
pub use stats::{monthly_equivalent, SubscriptionStats, WEEKS_PER_MONTH};
pub use store::{ApiSubscriptionStore, SubscriptionStore};

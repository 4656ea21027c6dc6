/// subsc-note コアライブラリ
///
/// サブスクリプション管理アプリのコアロジックを提供します。
/// データの永続化・認証・プッシュトークン保存はホスティングされた
/// バックエンドサービスに委譲し、このクレートは次回支払日の計算、
/// サブスクリプションのライフサイクル管理、集計処理を担当します。
// 機能モジュール構造
pub mod features;
pub mod shared;

use shared::config::environment::{initialize_logging_system, load_environment_variables};

// 主要な公開インターフェース
pub use features::auth::{AuthService, AuthUser, SessionContext};
pub use features::notifications::{PushPlatform, PushToken, PushTokenService, PushTokenStore};
pub use features::subscriptions::{
    compute_next_payment, CreateSubscriptionDto, Frequency, Subscription, SubscriptionService,
    SubscriptionStats, SubscriptionStore, UpdateSubscriptionDto,
};
pub use shared::api_client::{ApiClient, ApiClientConfig};
pub use shared::errors::{AppError, AppResult};

/// アプリケーションコアを初期化する
///
/// # 処理内容
/// 1. 環境変数を読み込む（開発環境のみ.envファイルを使用）
/// 2. ログシステムを初期化する
///
/// # 注意
/// UIシェルの起動時に一度だけ呼び出してください。
pub fn initialize() {
    load_environment_variables();
    initialize_logging_system();

    log::info!("subsc-noteコアを初期化しました");
}

/// レコードストア境界
///
/// サブスクリプションの永続化はホスティングされたレコードストアに
/// 委譲されます。所有者によるフィルタリングと識別子の一意性の保証は
/// ストア側の責務です。サービス層はこのトレイト経由でのみストアに
/// アクセスするため、テストでは呼び出し回数と順序を検証できる
/// フェイクストアに差し替えられます。
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::subscriptions::models::{NewSubscription, Subscription, SubscriptionPatch};
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;

/// サブスクリプションレコードストアのインターフェース
pub trait SubscriptionStore {
    /// 所有者のサブスクリプション一覧を取得する（作成日時の降順）
    fn list(
        &self,
        owner_id: Uuid,
    ) -> impl std::future::Future<Output = AppResult<Vec<Subscription>>> + Send;

    /// IDでサブスクリプションを取得する
    ///
    /// レコードが存在しない場合、または所有者が異なる場合はNotFoundエラー
    fn get(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> impl std::future::Future<Output = AppResult<Subscription>> + Send;

    /// サブスクリプションを挿入する（識別子はストアが採番する）
    fn insert(
        &self,
        record: NewSubscription,
    ) -> impl std::future::Future<Output = AppResult<Subscription>> + Send;

    /// サブスクリプションを部分更新する
    fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: SubscriptionPatch,
    ) -> impl std::future::Future<Output = AppResult<Subscription>> + Send;

    /// サブスクリプションを削除する（恒久的な削除、復元不可）
    fn delete(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> impl std::future::Future<Output = AppResult<()>> + Send;
}

/// APIサーバーからのサブスクリプション単体レスポンス
#[derive(Debug, Serialize, Deserialize)]
struct SubscriptionResponse {
    success: bool,
    subscription: Subscription,
    timestamp: String,
}

/// APIサーバーからのサブスクリプション一覧レスポンス
#[derive(Debug, Serialize, Deserialize)]
struct SubscriptionListResponse {
    success: bool,
    subscriptions: Vec<Subscription>,
    count: usize,
    timestamp: String,
}

/// API Server経由のサブスクリプションレコードストア
///
/// セッショントークンはストア作成時に受け取り、すべてのリクエストに
/// 付与します。所有者の認可はトークンに基づいてサーバー側で行われます。
pub struct ApiSubscriptionStore {
    client: ApiClient,
    auth_token: Option<String>,
}

impl ApiSubscriptionStore {
    /// 新しいAPIレコードストアを作成する
    ///
    /// # 引数
    /// * `client` - バックエンドAPIクライアント
    /// * `auth_token` - セッショントークン
    pub fn new(client: ApiClient, auth_token: Option<String>) -> Self {
        Self { client, auth_token }
    }

    fn token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }
}

impl SubscriptionStore for ApiSubscriptionStore {
    async fn list(&self, owner_id: Uuid) -> AppResult<Vec<Subscription>> {
        let endpoint = format!("/api/v1/subscriptions?ownerId={owner_id}");
        let response: SubscriptionListResponse =
            self.client.get(&endpoint, self.token()).await?;

        log::info!("サブスクリプション一覧取得成功: count={}", response.count);
        Ok(response.subscriptions)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> AppResult<Subscription> {
        let endpoint = format!("/api/v1/subscriptions/{id}?ownerId={owner_id}");
        let response: SubscriptionResponse = self.client.get(&endpoint, self.token()).await?;

        Ok(response.subscription)
    }

    async fn insert(&self, record: NewSubscription) -> AppResult<Subscription> {
        let response: SubscriptionResponse = self
            .client
            .post("/api/v1/subscriptions", &record, self.token())
            .await?;

        log::info!(
            "サブスクリプション作成成功: subscription_id={}",
            response.subscription.id
        );
        Ok(response.subscription)
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: SubscriptionPatch,
    ) -> AppResult<Subscription> {
        let endpoint = format!("/api/v1/subscriptions/{id}?ownerId={owner_id}");
        let response: SubscriptionResponse =
            self.client.patch(&endpoint, &patch, self.token()).await?;

        log::info!("サブスクリプション更新成功: subscription_id={id}");
        Ok(response.subscription)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> AppResult<()> {
        let endpoint = format!("/api/v1/subscriptions/{id}?ownerId={owner_id}");
        self.client.delete(&endpoint, self.token()).await?;

        log::info!("サブスクリプション削除成功: subscription_id={id}");
        Ok(())
    }
}

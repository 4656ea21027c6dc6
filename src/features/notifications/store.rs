/// プッシュ通知トークンのレコードストア境界
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::notifications::models::{NewPushToken, PushToken};
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;

/// プッシュ通知トークンストアのインターフェース
pub trait PushTokenStore {
    /// トークンを登録する（同一ユーザーの既存トークンは上書きされる）
    fn upsert(
        &self,
        record: NewPushToken,
    ) -> impl std::future::Future<Output = AppResult<PushToken>> + Send;

    /// ユーザーのトークンを解除する
    fn remove(
        &self,
        owner_id: Uuid,
    ) -> impl std::future::Future<Output = AppResult<()>> + Send;
}

/// APIサーバーからのトークン登録レスポンス
#[derive(Debug, Serialize, Deserialize)]
struct PushTokenResponse {
    success: bool,
    push_token: PushToken,
    timestamp: String,
}

/// API Server経由のプッシュ通知トークンストア
pub struct ApiPushTokenStore {
    client: ApiClient,
    auth_token: Option<String>,
}

impl ApiPushTokenStore {
    pub fn new(client: ApiClient, auth_token: Option<String>) -> Self {
        Self { client, auth_token }
    }

    fn token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }
}

impl PushTokenStore for ApiPushTokenStore {
    async fn upsert(&self, record: NewPushToken) -> AppResult<PushToken> {
        let response: PushTokenResponse = self
            .client
            .post("/api/v1/push-tokens", &record, self.token())
            .await?;

        log::info!(
            "プッシュ通知トークン登録成功: platform={}",
            response.push_token.platform
        );
        Ok(response.push_token)
    }

    async fn remove(&self, owner_id: Uuid) -> AppResult<()> {
        let endpoint = format!("/api/v1/push-tokens?ownerId={owner_id}");
        self.client.delete(&endpoint, self.token()).await?;

        log::info!("プッシュ通知トークン解除成功");
        Ok(())
    }
}

/// プッシュ通知トークン管理サービス
///
/// デバイストークンの登録・解除と、支払いリマインダー対象の抽出を
/// 行います。トークンの登録には認証済みセッションが必要です。
use chrono::NaiveDate;
use log::info;

use crate::features::auth::session::SessionContext;
use crate::features::notifications::models::{NewPushToken, PushPlatform, PushToken};
use crate::features::notifications::store::PushTokenStore;
use crate::features::subscriptions::models::Subscription;
use crate::shared::errors::{AppError, AppResult};

pub struct PushTokenService<S: PushTokenStore> {
    store: S,
    session: SessionContext,
}

impl<S: PushTokenStore> PushTokenService<S> {
    pub fn new(store: S, session: SessionContext) -> Self {
        Self { store, session }
    }

    /// デバイストークンを登録する
    ///
    /// 同一ユーザーの既存トークンは上書きされます（1ユーザー1トークン）。
    ///
    /// # 引数
    /// * `token` - デバイストークン文字列
    /// * `platform` - 配信先プラットフォーム
    pub async fn register_token(
        &self,
        token: String,
        platform: PushPlatform,
    ) -> AppResult<PushToken> {
        let owner_id = self.session.owner_id()?;

        if token.trim().is_empty() {
            return Err(AppError::validation("デバイストークンが空です"));
        }

        let registered = self
            .store
            .upsert(NewPushToken {
                user_id: owner_id,
                token,
                platform,
            })
            .await?;

        info!("デバイストークンを登録しました: platform={platform}");
        Ok(registered)
    }

    /// デバイストークンを解除する
    ///
    /// ログアウト時や通知を無効化した際に呼び出します。
    pub async fn unregister_token(&self) -> AppResult<()> {
        let owner_id = self.session.owner_id()?;

        self.store.remove(owner_id).await?;

        info!("デバイストークンを解除しました");
        Ok(())
    }
}

/// 指定日にリマインダー通知の対象となるサブスクリプションを抽出する
///
/// 有効なサブスクリプションのうち、通知予定日（次回支払日 - 事前日数）が
/// 指定日と一致するものを返します。アーカイブ済みのレコードは通知
/// スケジュールから除外されます。
pub fn reminders_due_on(
    subscriptions: &[Subscription],
    date: NaiveDate,
) -> Vec<&Subscription> {
    subscriptions
        .iter()
        .filter(|s| s.is_active && s.reminder_date() == date)
        .collect()
}

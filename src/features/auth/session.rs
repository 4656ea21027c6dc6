use crate::features::auth::models::AuthUser;
use crate::shared::errors::{AppError, AppResult};
use uuid::Uuid;

/// セッションコンテキスト
///
/// 現在のアカウント保有者とアクセストークンを保持します。
/// グローバルな状態としてではなく、各サービスに明示的に渡して使用します。
/// テスト時には認証済みのコンテキストを直接構築できます。
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// 現在のユーザー（未認証の場合はNone）
    user: Option<AuthUser>,
    /// アクセストークン
    access_token: Option<String>,
}

impl SessionContext {
    /// 未認証のセッションコンテキストを作成する
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// 認証済みのセッションコンテキストを作成する
    ///
    /// # 引数
    /// * `user` - 認証されたユーザー
    /// * `access_token` - バックエンドサービスが発行したアクセストークン
    pub fn authenticated(user: AuthUser, access_token: String) -> Self {
        Self {
            user: Some(user),
            access_token: Some(access_token),
        }
    }

    /// 認証済みかどうかを判定
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// 現在のユーザーを取得
    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    /// アカウント保有者のIDを取得する
    ///
    /// # 戻り値
    /// 認証済みの場合はユーザーID、未認証の場合はNotAuthenticatedエラー
    pub fn owner_id(&self) -> AppResult<Uuid> {
        self.user
            .as_ref()
            .map(|u| u.id)
            .ok_or(AppError::NotAuthenticated)
    }

    /// アクセストークンを取得
    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_anonymous_session() {
        let session = SessionContext::anonymous();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(session.token().is_none());

        // 未認証の場合はowner_idがエラーになる
        let result = session.owner_id();
        assert!(matches!(result.unwrap_err(), AppError::NotAuthenticated));
    }

    #[test]
    fn test_authenticated_session() {
        let user = test_user();
        let user_id = user.id;
        let session = SessionContext::authenticated(user, "token-123".to_string());

        assert!(session.is_authenticated());
        assert_eq!(session.owner_id().unwrap(), user_id);
        assert_eq!(session.token(), Some("token-123"));
    }
}

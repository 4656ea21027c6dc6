use crate::features::auth::models::{AckResponse, CredentialsDto, SessionResponse};
use crate::features::auth::session::SessionContext;
use crate::shared::api_client::ApiClient;
use crate::shared::errors::{AppError, AppResult};
use log::info;

/// 認証サービス
///
/// サインアップ・サインイン・サインアウトをバックエンドサービスに
/// 委譲します。パスワードの検証やトークンの発行はバックエンド側の
/// 責務であり、このサービスは呼び出しと結果の変換のみを行います。
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    /// 新しい認証サービスを作成する
    ///
    /// # 引数
    /// * `client` - バックエンドAPIクライアント
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// 資格情報を検証する
    fn validate_credentials(email: &str, password: &str) -> AppResult<()> {
        if email.trim().is_empty() {
            return Err(AppError::validation("メールアドレスを入力してください"));
        }
        if password.is_empty() {
            return Err(AppError::validation("パスワードを入力してください"));
        }
        Ok(())
    }

    /// 新規アカウントを登録する
    ///
    /// # 引数
    /// * `email` - メールアドレス
    /// * `password` - パスワード
    ///
    /// # 戻り値
    /// 認証済みセッションコンテキスト、または失敗時はエラー
    pub async fn sign_up(&self, email: &str, password: &str) -> AppResult<SessionContext> {
        Self::validate_credentials(email, password)?;

        let dto = CredentialsDto {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response: SessionResponse = self.client.post("/api/v1/auth/signup", &dto, None).await?;

        info!("サインアップ成功: user_id={}", response.user.id);
        Ok(SessionContext::authenticated(
            response.user,
            response.access_token,
        ))
    }

    /// サインインする
    ///
    /// # 引数
    /// * `email` - メールアドレス
    /// * `password` - パスワード
    ///
    /// # 戻り値
    /// 認証済みセッションコンテキスト、または失敗時はエラー
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<SessionContext> {
        Self::validate_credentials(email, password)?;

        let dto = CredentialsDto {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response: SessionResponse = self.client.post("/api/v1/auth/signin", &dto, None).await?;

        info!("サインイン成功: user_id={}", response.user.id);
        Ok(SessionContext::authenticated(
            response.user,
            response.access_token,
        ))
    }

    /// サインアウトする
    ///
    /// # 引数
    /// * `session` - 現在のセッションコンテキスト
    ///
    /// # 戻り値
    /// 未認証のセッションコンテキスト、または失敗時はエラー
    pub async fn sign_out(&self, session: &SessionContext) -> AppResult<SessionContext> {
        // 未認証のままサインアウトしても副作用はない
        if !session.is_authenticated() {
            return Ok(SessionContext::anonymous());
        }

        let _response: AckResponse = self
            .client
            .post("/api/v1/auth/signout", &serde_json::json!({}), session.token())
            .await?;

        info!("サインアウト成功");
        Ok(SessionContext::anonymous())
    }

    /// パスワードリセットメールを要求する
    ///
    /// # 引数
    /// * `email` - メールアドレス
    pub async fn reset_password(&self, email: &str) -> AppResult<()> {
        if email.trim().is_empty() {
            return Err(AppError::validation("メールアドレスを入力してください"));
        }

        let _response: AckResponse = self
            .client
            .post(
                "/api/v1/auth/reset-password",
                &serde_json::json!({ "email": email }),
                None,
            )
            .await?;

        info!("パスワードリセットメールを要求しました");
        Ok(())
    }
}

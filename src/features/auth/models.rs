use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// アカウント保有者を表す構造体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// ユーザーID
    pub id: Uuid,
    /// メールアドレス
    pub email: String,
    /// 作成日時
    pub created_at: DateTime<Utc>,
}

/// サインアップ・サインイン用DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialsDto {
    /// メールアドレス
    pub email: String,
    /// パスワード
    pub password: String,
}

/// 認証APIからのセッションレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
    pub user: AuthUser,
    pub access_token: String,
    pub timestamp: String,
}

/// 認証APIからの汎用レスポンス（レスポンスボディを持たない操作用）
#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
    pub timestamp: String,
}

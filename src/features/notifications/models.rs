use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// プッシュ通知の配信先プラットフォーム
///
/// シリアライズ表現はレコードストアに保存される小文字の文字列と一致します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushPlatform {
    Ios,
    Android,
    Web,
}

impl fmt::Display for PushPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PushPlatform::Ios => "ios",
            PushPlatform::Android => "android",
            PushPlatform::Web => "web",
        };
        write!(f, "{name}")
    }
}

/// 登録済みプッシュ通知トークン
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushToken {
    pub id: Uuid,
    pub user_id: Uuid,
    /// デバイストークン（ユーザーごとに一意、再登録時は上書き）
    pub token: String,
    pub platform: PushPlatform,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// プッシュ通知トークン登録用レコード
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPushToken {
    pub user_id: Uuid,
    pub token: String,
    pub platform: PushPlatform,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PushPlatform::Ios).unwrap(),
            "\"ios\""
        );
        assert_eq!(
            serde_json::from_str::<PushPlatform>("\"android\"").unwrap(),
            PushPlatform::Android
        );
        assert_eq!(PushPlatform::Web.to_string(), "web");
    }
}

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::shared::errors::AppError;

/// 支払い周期
///
/// 固定の3種類のみをサポートします。カスタム周期はありません。
/// シリアライズ表現はレコードストアに保存される文字列と一致します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    /// 毎週（7日ごと）
    Weekly,
    /// 毎月（暦月ごと）
    Monthly,
    /// 毎年（暦年ごと）
    Yearly,
}

impl FromStr for Frequency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Weekly" => Ok(Frequency::Weekly),
            "Monthly" => Ok(Frequency::Monthly),
            "Yearly" => Ok(Frequency::Yearly),
            other => Err(AppError::InvalidFrequency(other.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        };
        write!(f, "{name}")
    }
}

/// サブスクリプションデータモデル
///
/// レコードストアに保存される唯一のドメインエンティティ。
/// 各レコードはちょうど一人のアカウント保有者に属します。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Subscription {
    /// 識別子（レコードストアが採番、作成後は不変）
    pub id: Uuid,
    /// 所有者のユーザーID
    pub user_id: Uuid,
    /// サービス名（空文字列不可）
    pub name: String,
    /// 金額（通貨単位、正の数値）
    pub amount: f64,
    /// 支払い周期
    pub frequency: Frequency,
    /// 初回支払日（再発計算の基準日、作成後は不変）
    pub first_payment_date: NaiveDate,
    /// 次回支払日（派生値。有効時は常に今日以降、アーカイブ時は凍結）
    pub next_payment: NaiveDate,
    /// 表示カラー
    pub color: String,
    /// カテゴリ名
    pub category: String,
    /// メモ
    pub note: String,
    /// 通知の事前日数（次回支払日の何日前に通知するか）
    pub reminder_days: u32,
    /// 有効/アーカイブ済み
    pub is_active: bool,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 更新日時（すべての変更操作で更新される）
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// 通知予定日を取得する（次回支払日 - 事前日数）
    pub fn reminder_date(&self) -> NaiveDate {
        self.next_payment - Duration::days(self.reminder_days as i64)
    }
}

/// サブスクリプション作成用DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriptionDto {
    pub name: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub first_payment_date: NaiveDate,
    pub color: String,
    pub category: String,
    pub note: Option<String>,
    pub reminder_days: Option<u32>,
}

/// サブスクリプション更新用DTO
///
/// Noneのフィールドは既存の値を維持します。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSubscriptionDto {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub frequency: Option<Frequency>,
    pub first_payment_date: Option<NaiveDate>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub reminder_days: Option<u32>,
}

/// レコードストアへの挿入用レコード
///
/// 識別子はレコードストアが採番するため含まれません。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubscription {
    pub user_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub first_payment_date: NaiveDate,
    pub next_payment: NaiveDate,
    pub color: String,
    pub category: String,
    pub note: String,
    pub reminder_days: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// レコードストアへの部分更新レコード
///
/// Noneのフィールドはペイロードから省略され、ストア側で変更されません。
/// updated_atはすべての変更操作で必ず送信されます。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_payment: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionPatch {
    /// updated_atのみを持つ空のパッチを作成する
    pub fn empty(updated_at: DateTime<Utc>) -> Self {
        Self {
            name: None,
            amount: None,
            frequency: None,
            first_payment_date: None,
            next_payment: None,
            color: None,
            category: None,
            note: None,
            reminder_days: None,
            is_active: None,
            updated_at,
        }
    }
}

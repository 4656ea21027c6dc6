/// サブスクリプション統計の計算
///
/// 有効なサブスクリプション集合から月額換算の合計支出を導出します。
use serde::{Deserialize, Serialize};

use crate::features::subscriptions::models::{Frequency, Subscription};

/// 月あたりの平均週数（週次金額の月額換算に使用する近似値）
pub const WEEKS_PER_MONTH: f64 = 4.33;

/// サブスクリプション統計
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionStats {
    /// 全サブスクリプション数
    pub total: usize,
    /// 有効なサブスクリプション数
    pub active: usize,
    /// アーカイブ済みサブスクリプション数
    pub inactive: usize,
    /// 月額換算の合計
    pub monthly_total: f64,
    /// 年額換算の合計
    pub yearly_total: f64,
}

/// 1件のサブスクリプションの月額換算金額を計算する
///
/// - 週次: 金額 × 4.33（月平均週数の近似）
/// - 月次: 金額そのまま
/// - 年次: 金額 ÷ 12
pub fn monthly_equivalent(subscription: &Subscription) -> f64 {
    match subscription.frequency {
        Frequency::Weekly => subscription.amount * WEEKS_PER_MONTH,
        Frequency::Monthly => subscription.amount,
        Frequency::Yearly => subscription.amount / 12.0,
    }
}

/// 統計を構築する
///
/// # 引数
/// * `total` - 全サブスクリプション数
/// * `active_subscriptions` - 有効なサブスクリプションのスライス
/// * `inactive_count` - アーカイブ済みサブスクリプション数
///
/// # 戻り値
/// サブスクリプション統計
///
/// # 注意
/// 年額合計は月額合計 × 12として再導出されます。独立に合算しないため、
/// 週次金額の年額換算には4.33の近似が二重に適用されます。これは既知の
/// 精度上の妥協であり、修正対象ではありません。
pub fn build_stats(
    total: usize,
    active_subscriptions: &[Subscription],
    inactive_count: usize,
) -> SubscriptionStats {
    let monthly_total: f64 = active_subscriptions.iter().map(monthly_equivalent).sum();

    SubscriptionStats {
        total,
        active: active_subscriptions.len(),
        inactive: inactive_count,
        monthly_total,
        yearly_total: monthly_total * 12.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn subscription(amount: f64, frequency: Frequency) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "テストサービス".to_string(),
            amount,
            frequency,
            first_payment_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            next_payment: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            color: "#00AAFF".to_string(),
            category: "その他".to_string(),
            note: String::new(),
            reminder_days: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_monthly_equivalent_per_frequency() {
        assert_eq!(
            monthly_equivalent(&subscription(1000.0, Frequency::Weekly)),
            1000.0 * WEEKS_PER_MONTH
        );
        assert_eq!(
            monthly_equivalent(&subscription(1000.0, Frequency::Monthly)),
            1000.0
        );
        assert_eq!(
            monthly_equivalent(&subscription(12000.0, Frequency::Yearly)),
            1000.0
        );
    }

    #[test]
    fn test_build_stats_totals() {
        let active = vec![
            subscription(500.0, Frequency::Weekly),
            subscription(990.0, Frequency::Monthly),
            subscription(6000.0, Frequency::Yearly),
        ];

        let stats = build_stats(5, &active, 2);

        let expected_monthly = 500.0 * WEEKS_PER_MONTH + 990.0 + 6000.0 / 12.0;
        assert_eq!(stats.total, 5);
        assert_eq!(stats.active, 3);
        assert_eq!(stats.inactive, 2);
        assert!((stats.monthly_total - expected_monthly).abs() < 1e-9);

        // 年額合計は月額合計 × 12（再導出）
        assert!((stats.yearly_total - expected_monthly * 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_active_set_yields_zero_totals() {
        let stats = build_stats(0, &[], 0);
        assert_eq!(stats, SubscriptionStats::default());
    }
}

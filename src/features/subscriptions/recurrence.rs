/// 次回支払日の計算エンジン
///
/// 初回支払日（基準日）と支払い周期から、「今日」より後の
/// 次回支払日を計算します。純粋関数のみで構成され、副作用はありません。
use chrono::{Duration, Months, NaiveDate};

use crate::features::subscriptions::models::Frequency;

/// 日付を1周期分進める
///
/// # 引数
/// * `date` - 基準となる日付
/// * `frequency` - 支払い周期
///
/// # 戻り値
/// 1周期後の日付
///
/// # 暦の端数処理
/// 月・年の加算は暦演算に従い、存在しない日付はその月の最終日に
/// 切り詰められます（例: 1月31日 + 1ヶ月 → 2月29日または2月28日）。
pub fn advance_one_period(date: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Weekly => date + Duration::days(7),
        Frequency::Monthly => date
            .checked_add_months(Months::new(1))
            .expect("暦の範囲を超えた日付です"),
        Frequency::Yearly => date
            .checked_add_months(Months::new(12))
            .expect("暦の範囲を超えた日付です"),
    }
}

/// 次回支払日を計算する
///
/// # 引数
/// * `anchor` - 初回支払日（基準日）
/// * `frequency` - 支払い周期
/// * `today` - 今日の日付（深夜0時基準の暦日）
///
/// # 戻り値
/// 次回支払日
///
/// # 仕様
/// - 基準日が今日より後の場合は基準日をそのまま返す（初回支払いがまだ来ていない）
/// - それ以外の場合は、今日より後になるまで基準日を1周期ずつ進める
/// - 戻り値は必ず今日より後になる（今日と等しくなることはない。
///   ただし未来の基準日をそのまま返す場合を除く）
pub fn compute_next_payment(anchor: NaiveDate, frequency: Frequency, today: NaiveDate) -> NaiveDate {
    // 初回支払いがまだ来ていない場合はそのまま返す
    if anchor > today {
        return anchor;
    }

    // 今日より後になるまで1周期ずつ進める
    let mut next = anchor;
    while next <= today {
        next = advance_one_period(next, frequency);
    }
    next
}

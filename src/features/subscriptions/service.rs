/// サブスクリプションライフサイクル管理サービス
///
/// サブスクリプションの作成・編集・アーカイブ・再有効化・削除を行い、
/// メモリ上の有効／アーカイブ済みコレクションを管理します。
///
/// すべての変更操作は、ストアへの書き込みが確認された後に一覧を
/// 再取得して再分割します（差分更新は行いません）。書き込みが失敗した
/// 場合、メモリ上のコレクションは変更前の状態のまま維持されます。
use chrono::{Local, NaiveDate, Utc};
use log::{error, info, warn};
use uuid::Uuid;

use crate::features::auth::session::SessionContext;
use crate::features::subscriptions::models::{
    CreateSubscriptionDto, NewSubscription, Subscription, SubscriptionPatch,
    UpdateSubscriptionDto,
};
use crate::features::subscriptions::recurrence::compute_next_payment;
use crate::features::subscriptions::stats::{build_stats, SubscriptionStats};
use crate::features::subscriptions::store::SubscriptionStore;
use crate::shared::errors::{AppError, AppResult};

pub struct SubscriptionService<S: SubscriptionStore> {
    store: S,
    session: SessionContext,
    subscriptions: Vec<Subscription>,
    active: Vec<Subscription>,
    inactive: Vec<Subscription>,
}

impl<S: SubscriptionStore> SubscriptionService<S> {
    /// 新しいサービスを作成する
    ///
    /// # 引数
    /// * `store` - サブスクリプションレコードストア
    /// * `session` - セッションコンテキスト（明示的に渡す。グローバル状態は使用しない）
    pub fn new(store: S, session: SessionContext) -> Self {
        Self {
            store,
            session,
            subscriptions: Vec::new(),
            active: Vec::new(),
            inactive: Vec::new(),
        }
    }

    /// 今日の日付を取得する（端末ローカルの暦日）
    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// 全サブスクリプションを取得する
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// 有効なサブスクリプションを取得する
    pub fn active_subscriptions(&self) -> &[Subscription] {
        &self.active
    }

    /// アーカイブ済みサブスクリプションを取得する
    pub fn inactive_subscriptions(&self) -> &[Subscription] {
        &self.inactive
    }

    /// セッションコンテキストを取得する
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// セッションコンテキストを差し替える
    ///
    /// 認証状態の変化後は`load_subscriptions`を呼び出してコレクションを
    /// 更新してください。
    pub fn set_session(&mut self, session: SessionContext) {
        self.session = session;
    }

    /// 作成・更新用DTOの入力値を検証する
    fn validate_name(name: &str) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::validation("サービス名を入力してください"));
        }
        Ok(())
    }

    /// ストア操作の失敗をログに記録して伝搬する
    fn log_failure(operation: &str, err: AppError) -> AppError {
        error!(
            "{operation}に失敗しました: severity={:?}, details={}",
            err.severity(),
            err.details()
        );
        err
    }

    fn validate_amount(amount: f64) -> AppResult<()> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::validation(
                "金額は0より大きい数値で入力してください",
            ));
        }
        Ok(())
    }

    /// サブスクリプション一覧を再取得してコレクションを再分割する
    ///
    /// 未認証の場合はコレクションをクリアして正常終了します。
    pub async fn load_subscriptions(&mut self) -> AppResult<()> {
        let owner_id = match self.session.owner_id() {
            Ok(id) => id,
            Err(_) => {
                self.subscriptions.clear();
                self.active.clear();
                self.inactive.clear();
                return Ok(());
            }
        };

        let all = self.store.list(owner_id).await?;

        self.active = all.iter().filter(|s| s.is_active).cloned().collect();
        self.inactive = all.iter().filter(|s| !s.is_active).cloned().collect();
        self.subscriptions = all;

        info!(
            "サブスクリプション一覧を更新しました: total={}, active={}, inactive={}",
            self.subscriptions.len(),
            self.active.len(),
            self.inactive.len()
        );
        Ok(())
    }

    /// サブスクリプションを作成する
    ///
    /// 次回支払日は初回支払日と支払い周期から計算され、有効状態で
    /// 保存されます。
    ///
    /// # 引数
    /// * `dto` - サブスクリプション作成用DTO
    ///
    /// # 戻り値
    /// 作成されたサブスクリプション、または失敗時はエラー
    pub async fn create_subscription(
        &mut self,
        dto: CreateSubscriptionDto,
    ) -> AppResult<Subscription> {
        let owner_id = self.session.owner_id()?;

        Self::validate_name(&dto.name)?;
        Self::validate_amount(dto.amount)?;

        let next_payment = compute_next_payment(dto.first_payment_date, dto.frequency, Self::today());
        let now = Utc::now();

        let record = NewSubscription {
            user_id: owner_id,
            name: dto.name,
            amount: dto.amount,
            frequency: dto.frequency,
            first_payment_date: dto.first_payment_date,
            next_payment,
            color: dto.color,
            category: dto.category,
            note: dto.note.unwrap_or_default(),
            reminder_days: dto.reminder_days.unwrap_or(0),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .store
            .insert(record)
            .await
            .map_err(|e| Self::log_failure("サブスクリプション作成", e))?;
        self.load_subscriptions().await?;

        info!("サブスクリプションを作成しました: subscription_id={}", created.id);
        Ok(created)
    }

    /// サブスクリプションを編集する
    ///
    /// どのフィールドが変更されたかにかかわらず、保存のたびに次回支払日を
    /// 再計算します。
    ///
    /// # 引数
    /// * `id` - サブスクリプションID
    /// * `dto` - サブスクリプション更新用DTO
    ///
    /// # 戻り値
    /// 更新されたサブスクリプション、または失敗時はエラー
    pub async fn edit_subscription(
        &mut self,
        id: Uuid,
        dto: UpdateSubscriptionDto,
    ) -> AppResult<Subscription> {
        let owner_id = self.session.owner_id()?;

        if let Some(name) = &dto.name {
            Self::validate_name(name)?;
        }
        if let Some(amount) = dto.amount {
            Self::validate_amount(amount)?;
        }

        // 既存レコードを取得して再計算の基準値を決定する
        let existing = self.store.get(owner_id, id).await?;
        let anchor = dto.first_payment_date.unwrap_or(existing.first_payment_date);
        let frequency = dto.frequency.unwrap_or(existing.frequency);
        let next_payment = compute_next_payment(anchor, frequency, Self::today());

        let patch = SubscriptionPatch {
            name: dto.name,
            amount: dto.amount,
            frequency: dto.frequency,
            first_payment_date: dto.first_payment_date,
            next_payment: Some(next_payment),
            color: dto.color,
            category: dto.category,
            note: dto.note,
            reminder_days: dto.reminder_days,
            is_active: None,
            updated_at: Utc::now(),
        };

        let updated = self
            .store
            .update(owner_id, id, patch)
            .await
            .map_err(|e| Self::log_failure("サブスクリプション更新", e))?;
        self.load_subscriptions().await?;

        info!("サブスクリプションを更新しました: subscription_id={id}");
        Ok(updated)
    }

    /// 有効/アーカイブ状態を変更する
    ///
    /// 再有効化時のみ次回支払日を現在日基準で再計算します。
    /// アーカイブ時は次回支払日を凍結したまま変更しません。
    async fn set_active_status(&mut self, id: Uuid, is_active: bool) -> AppResult<Subscription> {
        let owner_id = self.session.owner_id()?;

        // 再計算に必要な基準値を取得する（存在確認を兼ねる）
        let existing = self.store.get(owner_id, id).await?;

        let mut patch = SubscriptionPatch {
            is_active: Some(is_active),
            ..SubscriptionPatch::empty(Utc::now())
        };

        if is_active {
            // アーカイブが長期間だった場合、複数周期分ジャンプすることがある
            patch.next_payment = Some(compute_next_payment(
                existing.first_payment_date,
                existing.frequency,
                Self::today(),
            ));
        }

        let updated = self
            .store
            .update(owner_id, id, patch)
            .await
            .map_err(|e| Self::log_failure("サブスクリプション状態変更", e))?;
        self.load_subscriptions().await?;

        Ok(updated)
    }

    /// サブスクリプションをアーカイブする
    ///
    /// 次回支払日は最後に計算された値のまま凍結されます。アーカイブ済みの
    /// レコードは有効コレクションと通知スケジュールから除外されます。
    ///
    /// # 引数
    /// * `id` - サブスクリプションID
    pub async fn archive_subscription(&mut self, id: Uuid) -> AppResult<Subscription> {
        let archived = self.set_active_status(id, false).await?;
        info!("サブスクリプションをアーカイブしました: subscription_id={id}");
        Ok(archived)
    }

    /// アーカイブ済みサブスクリプションを再有効化する
    ///
    /// 次回支払日は初回支払日から現在日基準で再計算されます。
    ///
    /// # 引数
    /// * `id` - サブスクリプションID
    pub async fn reactivate_subscription(&mut self, id: Uuid) -> AppResult<Subscription> {
        let reactivated = self.set_active_status(id, true).await?;
        info!("サブスクリプションを再有効化しました: subscription_id={id}");
        Ok(reactivated)
    }

    /// サブスクリプションを削除する
    ///
    /// 恒久的な削除であり、復元できません。
    ///
    /// # 引数
    /// * `id` - サブスクリプションID
    pub async fn delete_subscription(&mut self, id: Uuid) -> AppResult<()> {
        let owner_id = self.session.owner_id()?;

        self.store
            .delete(owner_id, id)
            .await
            .map_err(|e| Self::log_failure("サブスクリプション削除", e))?;
        self.load_subscriptions().await?;

        info!("サブスクリプションを削除しました: subscription_id={id}");
        Ok(())
    }

    /// IDでサブスクリプションを取得する
    ///
    /// # 引数
    /// * `id` - サブスクリプションID
    ///
    /// # 戻り値
    /// サブスクリプション、存在しない場合はNotFoundエラー
    pub async fn get_subscription(&self, id: Uuid) -> AppResult<Subscription> {
        let owner_id = self.session.owner_id()?;
        self.store.get(owner_id, id).await
    }

    /// サブスクリプション統計を取得する
    ///
    /// 読み込み済みのコレクションから計算します。未認証または未読み込みの
    /// 場合はゼロ値の統計に縮退します（エラーは伝搬しません）。
    pub fn get_stats(&self) -> SubscriptionStats {
        if !self.session.is_authenticated() {
            warn!("未認証のため統計をゼロ値に縮退します");
            return SubscriptionStats::default();
        }

        build_stats(self.subscriptions.len(), &self.active, self.inactive.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::models::AuthUser;
    use crate::features::subscriptions::models::Frequency;
    use crate::features::subscriptions::recurrence::advance_one_period;
    use crate::features::subscriptions::stats::WEEKS_PER_MONTH;
    use chrono::Duration;
    use std::sync::Mutex;

    /// 呼び出し記録付きのインメモリフェイクストア
    ///
    /// 呼び出し回数と順序を検証できるように、各操作の名前を記録します。
    /// `fail_writes`を設定すると書き込み系操作が失敗するようになります。
    struct FakeStore {
        records: Mutex<Vec<Subscription>>,
        calls: Mutex<Vec<&'static str>>,
        fail_writes: Mutex<bool>,
    }

    impl FakeStore {
        fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                calls: Mutex::new(Vec::new()),
                fail_writes: Mutex::new(false),
            }
        }

        fn record_call(&self, name: &'static str) {
            self.calls.lock().unwrap().push(name);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn clear_calls(&self) {
            self.calls.lock().unwrap().clear();
        }

        fn set_fail_writes(&self, fail: bool) {
            *self.fail_writes.lock().unwrap() = fail;
        }

        fn writes_failing(&self) -> bool {
            *self.fail_writes.lock().unwrap()
        }
    }

    impl SubscriptionStore for &FakeStore {
        async fn list(&self, owner_id: Uuid) -> AppResult<Vec<Subscription>> {
            self.record_call("list");
            let records = self.records.lock().unwrap();
            let mut owned: Vec<Subscription> = records
                .iter()
                .filter(|s| s.user_id == owner_id)
                .cloned()
                .collect();
            // 作成日時の降順（ストア契約）
            owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(owned)
        }

        async fn get(&self, owner_id: Uuid, id: Uuid) -> AppResult<Subscription> {
            self.record_call("get");
            let records = self.records.lock().unwrap();
            records
                .iter()
                .find(|s| s.id == id && s.user_id == owner_id)
                .cloned()
                .ok_or_else(|| AppError::not_found("サブスクリプション"))
        }

        async fn insert(&self, record: NewSubscription) -> AppResult<Subscription> {
            self.record_call("insert");
            if self.writes_failing() {
                return Err(AppError::ExternalService("書き込み失敗".to_string()));
            }

            let subscription = Subscription {
                id: Uuid::new_v4(),
                user_id: record.user_id,
                name: record.name,
                amount: record.amount,
                frequency: record.frequency,
                first_payment_date: record.first_payment_date,
                next_payment: record.next_payment,
                color: record.color,
                category: record.category,
                note: record.note,
                reminder_days: record.reminder_days,
                is_active: record.is_active,
                created_at: record.created_at,
                updated_at: record.updated_at,
            };
            self.records.lock().unwrap().push(subscription.clone());
            Ok(subscription)
        }

        async fn update(
            &self,
            owner_id: Uuid,
            id: Uuid,
            patch: SubscriptionPatch,
        ) -> AppResult<Subscription> {
            self.record_call("update");
            if self.writes_failing() {
                return Err(AppError::ExternalService("書き込み失敗".to_string()));
            }

            let mut records = self.records.lock().unwrap();
            let record = records
                .iter_mut()
                .find(|s| s.id == id && s.user_id == owner_id)
                .ok_or_else(|| AppError::not_found("サブスクリプション"))?;

            if let Some(name) = patch.name {
                record.name = name;
            }
            if let Some(amount) = patch.amount {
                record.amount = amount;
            }
            if let Some(frequency) = patch.frequency {
                record.frequency = frequency;
            }
            if let Some(first_payment_date) = patch.first_payment_date {
                record.first_payment_date = first_payment_date;
            }
            if let Some(next_payment) = patch.next_payment {
                record.next_payment = next_payment;
            }
            if let Some(color) = patch.color {
                record.color = color;
            }
            if let Some(category) = patch.category {
                record.category = category;
            }
            if let Some(note) = patch.note {
                record.note = note;
            }
            if let Some(reminder_days) = patch.reminder_days {
                record.reminder_days = reminder_days;
            }
            if let Some(is_active) = patch.is_active {
                record.is_active = is_active;
            }
            record.updated_at = patch.updated_at;

            Ok(record.clone())
        }

        async fn delete(&self, owner_id: Uuid, id: Uuid) -> AppResult<()> {
            self.record_call("delete");
            if self.writes_failing() {
                return Err(AppError::ExternalService("書き込み失敗".to_string()));
            }

            let mut records = self.records.lock().unwrap();
            let before = records.len();
            records.retain(|s| !(s.id == id && s.user_id == owner_id));

            if records.len() == before {
                return Err(AppError::not_found("サブスクリプション"));
            }
            Ok(())
        }
    }

    fn test_session() -> SessionContext {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            created_at: Utc::now(),
        };
        SessionContext::authenticated(user, "token-123".to_string())
    }

    fn create_dto(name: &str, amount: f64, frequency: Frequency) -> CreateSubscriptionDto {
        CreateSubscriptionDto {
            name: name.to_string(),
            amount,
            frequency,
            first_payment_date: SubscriptionService::<&FakeStore>::today()
                - Duration::days(30),
            color: "#FF5500".to_string(),
            category: "エンタメ".to_string(),
            note: None,
            reminder_days: Some(3),
        }
    }

    #[tokio::test]
    async fn test_create_subscription_computes_next_payment() {
        let store = FakeStore::new();
        let mut service = SubscriptionService::new(&store, test_session());

        let created = service
            .create_subscription(create_dto("動画配信", 990.0, Frequency::Monthly))
            .await
            .unwrap();

        // 次回支払日は必ず今日より後
        assert!(created.next_payment > SubscriptionService::<&FakeStore>::today());
        assert!(created.is_active);

        // 書き込み確認後に一覧を再取得する（insert → list の順）
        assert_eq!(store.calls(), vec!["insert", "list"]);
        assert_eq!(service.active_subscriptions().len(), 1);
        assert_eq!(service.inactive_subscriptions().len(), 0);
    }

    #[tokio::test]
    async fn test_create_subscription_with_future_anchor_keeps_anchor() {
        let store = FakeStore::new();
        let mut service = SubscriptionService::new(&store, test_session());

        let future_date = SubscriptionService::<&FakeStore>::today() + Duration::days(10);
        let dto = CreateSubscriptionDto {
            first_payment_date: future_date,
            ..create_dto("新サービス", 500.0, Frequency::Weekly)
        };

        let created = service.create_subscription(dto).await.unwrap();

        // 初回支払いがまだ来ていない場合、次回支払日は初回支払日そのもの
        assert_eq!(created.next_payment, future_date);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let store = FakeStore::new();
        let mut service = SubscriptionService::new(&store, test_session());

        // 空のサービス名
        let result = service
            .create_subscription(create_dto("  ", 990.0, Frequency::Monthly))
            .await;
        assert!(matches!(result.unwrap_err(), AppError::Validation(_)));

        // 0以下の金額
        let result = service
            .create_subscription(create_dto("サービス", 0.0, Frequency::Monthly))
            .await;
        assert!(matches!(result.unwrap_err(), AppError::Validation(_)));

        // バリデーション失敗時はストアに到達しない
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unauthenticated_operations_fail() {
        let store = FakeStore::new();
        let mut service = SubscriptionService::new(&store, SessionContext::anonymous());

        let result = service
            .create_subscription(create_dto("サービス", 990.0, Frequency::Monthly))
            .await;
        assert!(matches!(result.unwrap_err(), AppError::NotAuthenticated));

        let result = service.delete_subscription(Uuid::new_v4()).await;
        assert!(matches!(result.unwrap_err(), AppError::NotAuthenticated));

        // 未認証での一覧読み込みはコレクションをクリアして正常終了する
        service.load_subscriptions().await.unwrap();
        assert!(service.subscriptions().is_empty());
    }

    #[tokio::test]
    async fn test_archive_freezes_next_payment() {
        let store = FakeStore::new();
        let mut service = SubscriptionService::new(&store, test_session());

        let created = service
            .create_subscription(create_dto("音楽配信", 980.0, Frequency::Monthly))
            .await
            .unwrap();
        let next_before_archive = created.next_payment;

        let archived = service.archive_subscription(created.id).await.unwrap();

        // アーカイブは次回支払日を変更しない（凍結）
        assert!(!archived.is_active);
        assert_eq!(archived.next_payment, next_before_archive);

        // コレクションが再分割される
        assert_eq!(service.active_subscriptions().len(), 0);
        assert_eq!(service.inactive_subscriptions().len(), 1);
    }

    #[tokio::test]
    async fn test_reactivate_recomputes_next_payment_after_long_archive() {
        let store = FakeStore::new();
        let mut service = SubscriptionService::new(&store, test_session());
        let today = SubscriptionService::<&FakeStore>::today();

        let created = service
            .create_subscription(create_dto("クラウド", 1200.0, Frequency::Weekly))
            .await
            .unwrap();

        // 長期間アーカイブされていた状態をシミュレートする
        // （凍結された次回支払日が遠い過去になっている）
        {
            let mut records = store.records.lock().unwrap();
            let record = records.iter_mut().find(|s| s.id == created.id).unwrap();
            record.is_active = false;
            record.next_payment = today - Duration::days(365);
        }
        store.clear_calls();

        let reactivated = service.reactivate_subscription(created.id).await.unwrap();

        // 凍結値ではなく、現在日基準で新しく計算される
        assert!(reactivated.is_active);
        assert!(reactivated.next_payment > today);
        assert_eq!((reactivated.next_payment - created.first_payment_date).num_days() % 7, 0);

        // get（基準値取得）→ update → list の順で呼ばれる
        assert_eq!(store.calls(), vec!["get", "update", "list"]);
    }

    #[tokio::test]
    async fn test_archive_then_reactivate_same_window_keeps_next_payment() {
        let store = FakeStore::new();
        let mut service = SubscriptionService::new(&store, test_session());

        let created = service
            .create_subscription(create_dto("電子書籍", 880.0, Frequency::Monthly))
            .await
            .unwrap();

        service.archive_subscription(created.id).await.unwrap();
        let reactivated = service.reactivate_subscription(created.id).await.unwrap();

        // 日数が経過していなければ同じ周期ウィンドウ内なので変わらない
        assert_eq!(reactivated.next_payment, created.next_payment);
    }

    #[tokio::test]
    async fn test_edit_recomputes_next_payment_even_without_date_change() {
        let store = FakeStore::new();
        let mut service = SubscriptionService::new(&store, test_session());
        let today = SubscriptionService::<&FakeStore>::today();

        let created = service
            .create_subscription(create_dto("学習サービス", 1980.0, Frequency::Weekly))
            .await
            .unwrap();

        // 次回支払日が古くなった状態をシミュレートする
        {
            let mut records = store.records.lock().unwrap();
            let record = records.iter_mut().find(|s| s.id == created.id).unwrap();
            record.next_payment = today - Duration::days(14);
        }

        // 名前だけを変更する編集でも次回支払日が再計算される
        let dto = UpdateSubscriptionDto {
            name: Some("学習サービス（改名）".to_string()),
            ..UpdateSubscriptionDto::default()
        };
        let updated = service.edit_subscription(created.id, dto).await.unwrap();

        assert_eq!(updated.name, "学習サービス（改名）");
        assert!(updated.next_payment > today);
    }

    #[tokio::test]
    async fn test_edit_with_new_frequency_recomputes_from_new_cycle() {
        let store = FakeStore::new();
        let mut service = SubscriptionService::new(&store, test_session());
        let today = SubscriptionService::<&FakeStore>::today();

        let created = service
            .create_subscription(create_dto("ニュース購読", 500.0, Frequency::Weekly))
            .await
            .unwrap();

        let dto = UpdateSubscriptionDto {
            frequency: Some(Frequency::Yearly),
            ..UpdateSubscriptionDto::default()
        };
        let updated = service.edit_subscription(created.id, dto).await.unwrap();

        // 新しい周期で初回支払日から再計算される
        assert_eq!(updated.frequency, Frequency::Yearly);
        assert_eq!(
            updated.next_payment,
            compute_next_payment(created.first_payment_date, Frequency::Yearly, today)
        );
    }

    #[tokio::test]
    async fn test_delete_then_get_returns_not_found() {
        let store = FakeStore::new();
        let mut service = SubscriptionService::new(&store, test_session());

        let created = service
            .create_subscription(create_dto("ゲーム", 600.0, Frequency::Monthly))
            .await
            .unwrap();

        service.delete_subscription(created.id).await.unwrap();

        // 削除後の取得はNotFound
        let result = service.get_subscription(created.id).await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
        assert!(service.subscriptions().is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_collections_intact() {
        let store = FakeStore::new();
        let mut service = SubscriptionService::new(&store, test_session());

        let created = service
            .create_subscription(create_dto("保持対象", 990.0, Frequency::Monthly))
            .await
            .unwrap();
        assert_eq!(service.active_subscriptions().len(), 1);

        // 書き込みが失敗する状態にする
        store.set_fail_writes(true);
        store.clear_calls();

        let result = service.archive_subscription(created.id).await;
        assert!(matches!(result.unwrap_err(), AppError::ExternalService(_)));

        // 書き込み失敗時は再取得が行われず、コレクションは変更前のまま
        assert_eq!(store.calls(), vec!["get", "update"]);
        assert_eq!(service.active_subscriptions().len(), 1);
        assert_eq!(service.inactive_subscriptions().len(), 0);
    }

    #[tokio::test]
    async fn test_failed_insert_and_delete_propagate_store_error() {
        let store = FakeStore::new();
        let mut service = SubscriptionService::new(&store, test_session());

        let created = service
            .create_subscription(create_dto("既存サービス", 990.0, Frequency::Monthly))
            .await
            .unwrap();

        store.set_fail_writes(true);

        let result = service
            .create_subscription(create_dto("追加サービス", 500.0, Frequency::Weekly))
            .await;
        assert!(matches!(result.unwrap_err(), AppError::ExternalService(_)));

        let result = service.delete_subscription(created.id).await;
        assert!(matches!(result.unwrap_err(), AppError::ExternalService(_)));

        // 失敗した操作はコレクションに反映されない
        assert_eq!(service.subscriptions().len(), 1);
    }

    #[tokio::test]
    async fn test_every_mutation_reloads_exactly_once() {
        let store = FakeStore::new();
        let mut service = SubscriptionService::new(&store, test_session());

        let created = service
            .create_subscription(create_dto("計測対象", 300.0, Frequency::Weekly))
            .await
            .unwrap();
        assert_eq!(store.calls(), vec!["insert", "list"]);

        store.clear_calls();
        service
            .edit_subscription(
                created.id,
                UpdateSubscriptionDto {
                    amount: Some(350.0),
                    ..UpdateSubscriptionDto::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(store.calls(), vec!["get", "update", "list"]);

        store.clear_calls();
        service.archive_subscription(created.id).await.unwrap();
        assert_eq!(store.calls(), vec!["get", "update", "list"]);

        store.clear_calls();
        service.delete_subscription(created.id).await.unwrap();
        assert_eq!(store.calls(), vec!["delete", "list"]);
    }

    #[tokio::test]
    async fn test_get_stats_over_active_set() {
        let store = FakeStore::new();
        let mut service = SubscriptionService::new(&store, test_session());

        let weekly = service
            .create_subscription(create_dto("週次", 500.0, Frequency::Weekly))
            .await
            .unwrap();
        service
            .create_subscription(create_dto("月次", 990.0, Frequency::Monthly))
            .await
            .unwrap();
        service
            .create_subscription(create_dto("年次", 6000.0, Frequency::Yearly))
            .await
            .unwrap();

        // 1件アーカイブすると有効集計から外れる
        service.archive_subscription(weekly.id).await.unwrap();

        let stats = service.get_stats();
        let expected_monthly = 990.0 + 6000.0 / 12.0;

        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.inactive, 1);
        assert!((stats.monthly_total - expected_monthly).abs() < 1e-9);
        assert!((stats.yearly_total - expected_monthly * 12.0).abs() < 1e-9);

        // 週次を含む場合は4.33の近似が使われる
        service.reactivate_subscription(weekly.id).await.unwrap();
        let stats = service.get_stats();
        assert!(
            (stats.monthly_total - (expected_monthly + 500.0 * WEEKS_PER_MONTH)).abs() < 1e-9
        );
    }

    #[tokio::test]
    async fn test_get_stats_degrades_to_zero_when_unauthenticated() {
        let store = FakeStore::new();
        let service = SubscriptionService::new(&store, SessionContext::anonymous());

        assert_eq!(service.get_stats(), SubscriptionStats::default());
    }

    #[tokio::test]
    async fn test_owner_isolation() {
        let store = FakeStore::new();

        // 別の所有者のレコードを直接投入する
        let mut other_service = SubscriptionService::new(&store, test_session());
        let foreign = other_service
            .create_subscription(create_dto("他人のサブスク", 990.0, Frequency::Monthly))
            .await
            .unwrap();

        // 自分のセッションからは他人のレコードが見えない
        let mut service = SubscriptionService::new(&store, test_session());
        service.load_subscriptions().await.unwrap();
        assert!(service.subscriptions().is_empty());

        let result = service.get_subscription(foreign.id).await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_is_partitioned_by_status() {
        let store = FakeStore::new();
        let mut service = SubscriptionService::new(&store, test_session());

        let first = service
            .create_subscription(create_dto("サービスA", 100.0, Frequency::Monthly))
            .await
            .unwrap();
        service
            .create_subscription(create_dto("サービスB", 200.0, Frequency::Monthly))
            .await
            .unwrap();
        service.archive_subscription(first.id).await.unwrap();

        assert_eq!(service.subscriptions().len(), 2);
        assert_eq!(service.active_subscriptions().len(), 1);
        assert_eq!(service.inactive_subscriptions().len(), 1);
        assert_eq!(service.active_subscriptions()[0].name, "サービスB");
        assert_eq!(service.inactive_subscriptions()[0].name, "サービスA");
    }

    #[test]
    fn test_advance_helper_reachable_from_service_cycle() {
        // サービスが依存する周期計算が暦の切り詰めに従うことを確認する
        let jan31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            advance_one_period(jan31, Frequency::Monthly),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }
}

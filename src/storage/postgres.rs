//! Postgres-backed store. Partial updates use `COALESCE` so that absent
//! fields keep their stored values, and upserts lean on the unique
//! constraints declared in the migrations.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::models::*;
use crate::storage::Storage;

pub struct PgStorage {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

impl PgStorage {
    /// Connects, then brings the schema up to date.
    pub async fn connect(url: &str, cfg: &DatabaseConfig) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
            .connect(url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("database connection established");
        Ok(PgStorage { pool })
    }

    /// Builds a store over a pool that has not been checked for liveness.
    /// Used by tests that need a guaranteed-broken backend.
    pub fn from_pool(pool: PgPool) -> Self {
        PgStorage { pool }
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn create_user(&self, new: NewUser) -> StorageResult<User> {
        let password = match new.password.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => return Err(StorageError::validation("Password is required")),
        };
        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (email, username, name, password_hash, upi_id, total_savings,
                 today_round_up, current_streak, profile_picture)
            VALUES ($1, $2, $3, $4, $5,
                    COALESCE($6, '0.00'), COALESCE($7, '0.00'),
                    COALESCE($8, 0), $9)
            RETURNING *
            "#,
        )
        .bind(&new.email)
        .bind(&new.username)
        .bind(&new.name)
        .bind(&password_hash)
        .bind(&new.upi_id)
        .bind(&new.total_savings)
        .bind(&new.today_round_up)
        .bind(new.current_streak)
        .bind(&new.profile_picture)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::validation("Email already registered"))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get_user(&self, id: i64) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> StorageResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                name = COALESCE($3, name),
                upi_id = COALESCE($4, upi_id),
                total_savings = COALESCE($5, total_savings),
                today_round_up = COALESCE($6, today_round_up),
                current_streak = COALESCE($7, current_streak),
                profile_picture = COALESCE($8, profile_picture),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.username)
        .bind(&update.name)
        .bind(&update.upi_id)
        .bind(&update.total_savings)
        .bind(&update.today_round_up)
        .bind(update.current_streak)
        .bind(&update.profile_picture)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound("user"))
    }

    async fn verify_login(&self, email: &str, password: &str) -> StorageResult<Option<User>> {
        let row = sqlx::query_as::<_, UserWithHash>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else { return Ok(None) };
        if bcrypt::verify(password, &row.password_hash)? {
            Ok(Some(row.user))
        } else {
            Ok(None)
        }
    }

    async fn create_transaction(
        &self,
        user_id: i64,
        new: NewTransaction,
    ) -> StorageResult<Transaction> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions
                (user_id, type, amount, original_amount, round_up_amount,
                 payee, upi_id, note, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, 'completed'))
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&new.r#type)
        .bind(&new.amount)
        .bind(&new.original_amount)
        .bind(&new.round_up_amount)
        .bind(&new.payee)
        .bind(&new.upi_id)
        .bind(&new.note)
        .bind(&new.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn transactions_for_user(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> StorageResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit.unwrap_or(50))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_challenge(&self, user_id: i64, new: NewChallenge) -> StorageResult<Challenge> {
        let row = sqlx::query_as::<_, Challenge>(
            r#"
            INSERT INTO challenges
                (user_id, title, description, target_amount, current_amount,
                 deadline, status, category, is_template, completed_at)
            VALUES ($1, $2, $3, $4, COALESCE($5, '0.00'), $6,
                    COALESCE($7, 'active'), $8, COALESCE($9, FALSE), $10)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.target_amount)
        .bind(&new.current_amount)
        .bind(new.deadline)
        .bind(&new.status)
        .bind(&new.category)
        .bind(new.is_template)
        .bind(new.completed_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn challenges_for_user(&self, user_id: i64) -> StorageResult<Vec<Challenge>> {
        let rows = sqlx::query_as::<_, Challenge>(
            "SELECT * FROM challenges WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_challenge(&self, id: i64) -> StorageResult<Option<Challenge>> {
        let row = sqlx::query_as::<_, Challenge>("SELECT * FROM challenges WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_challenge(&self, id: i64, update: ChallengeUpdate) -> StorageResult<Challenge> {
        sqlx::query_as::<_, Challenge>(
            r#"
            UPDATE challenges SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                target_amount = COALESCE($4, target_amount),
                current_amount = COALESCE($5, current_amount),
                deadline = COALESCE($6, deadline),
                status = COALESCE($7, status),
                category = COALESCE($8, category),
                completed_at = COALESCE($9, completed_at)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.target_amount)
        .bind(&update.current_amount)
        .bind(update.deadline)
        .bind(&update.status)
        .bind(&update.category)
        .bind(update.completed_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound("challenge"))
    }

    async fn create_activity(&self, user_id: i64, new: NewActivity) -> StorageResult<Activity> {
        let row = sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities (user_id, type, amount, description, icon, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&new.r#type)
        .bind(&new.amount)
        .bind(&new.description)
        .bind(&new.icon)
        .bind(&new.metadata)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn activities_for_user(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> StorageResult<Vec<Activity>> {
        let rows = sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit.unwrap_or(20))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn badges_for_user(&self, user_id: i64) -> StorageResult<Vec<UserBadge>> {
        let rows = sqlx::query_as::<_, UserBadge>("SELECT * FROM user_badges WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn set_badge_earned(
        &self,
        user_id: i64,
        badge_id: &str,
        earned: bool,
    ) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_badges (user_id, badge_id, earned, earned_at)
            VALUES ($1, $2, $3, CASE WHEN $3 THEN now() END)
            ON CONFLICT (user_id, badge_id) DO UPDATE SET
                earned = $3,
                earned_at = CASE WHEN $3 THEN now() END
            "#,
        )
        .bind(user_id)
        .bind(badge_id)
        .bind(earned)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_portfolio(&self, user_id: i64, new: NewPortfolio) -> StorageResult<Portfolio> {
        let row = sqlx::query_as::<_, Portfolio>(
            r#"
            INSERT INTO portfolios
                (user_id, name, type, total_invested, current_value,
                 returns, returns_percentage, is_active)
            VALUES ($1, $2, $3, COALESCE($4, '0.00'), COALESCE($5, '0.00'),
                    COALESCE($6, '0.00'), COALESCE($7, '0.00'), COALESCE($8, TRUE))
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&new.name)
        .bind(&new.r#type)
        .bind(&new.total_invested)
        .bind(&new.current_value)
        .bind(&new.returns)
        .bind(&new.returns_percentage)
        .bind(new.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn portfolios_for_user(&self, user_id: i64) -> StorageResult<Vec<Portfolio>> {
        let rows = sqlx::query_as::<_, Portfolio>(
            "SELECT * FROM portfolios WHERE user_id = $1 AND is_active",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_portfolio(&self, id: i64) -> StorageResult<Option<Portfolio>> {
        let row = sqlx::query_as::<_, Portfolio>("SELECT * FROM portfolios WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_portfolio(&self, id: i64, update: PortfolioUpdate) -> StorageResult<Portfolio> {
        sqlx::query_as::<_, Portfolio>(
            r#"
            UPDATE portfolios SET
                name = COALESCE($2, name),
                type = COALESCE($3, type),
                total_invested = COALESCE($4, total_invested),
                current_value = COALESCE($5, current_value),
                returns = COALESCE($6, returns),
                returns_percentage = COALESCE($7, returns_percentage),
                is_active = COALESCE($8, is_active),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.r#type)
        .bind(&update.total_invested)
        .bind(&update.current_value)
        .bind(&update.returns)
        .bind(&update.returns_percentage)
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound("portfolio"))
    }

    async fn create_sip_plan(&self, user_id: i64, new: NewSipPlan) -> StorageResult<SipPlan> {
        let row = sqlx::query_as::<_, SipPlan>(
            r#"
            INSERT INTO sip_plans
                (user_id, portfolio_id, name, monthly_amount, start_date,
                 end_date, next_payment_date, is_active, auto_invest_roundups)
            VALUES ($1, $2, $3, $4, $5, $6, $7,
                    COALESCE($8, TRUE), COALESCE($9, FALSE))
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(new.portfolio_id)
        .bind(&new.name)
        .bind(&new.monthly_amount)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.next_payment_date)
        .bind(new.is_active)
        .bind(new.auto_invest_roundups)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn sip_plans_for_user(&self, user_id: i64) -> StorageResult<Vec<SipPlan>> {
        let rows = sqlx::query_as::<_, SipPlan>(
            "SELECT * FROM sip_plans WHERE user_id = $1 AND is_active",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_sip_plan(&self, id: i64) -> StorageResult<Option<SipPlan>> {
        let row = sqlx::query_as::<_, SipPlan>("SELECT * FROM sip_plans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_sip_plan(&self, id: i64, update: SipPlanUpdate) -> StorageResult<SipPlan> {
        sqlx::query_as::<_, SipPlan>(
            r#"
            UPDATE sip_plans SET
                name = COALESCE($2, name),
                monthly_amount = COALESCE($3, monthly_amount),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                next_payment_date = COALESCE($6, next_payment_date),
                is_active = COALESCE($7, is_active),
                auto_invest_roundups = COALESCE($8, auto_invest_roundups)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.monthly_amount)
        .bind(update.start_date)
        .bind(update.end_date)
        .bind(update.next_payment_date)
        .bind(update.is_active)
        .bind(update.auto_invest_roundups)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound("SIP plan"))
    }

    async fn create_investment(
        &self,
        user_id: i64,
        new: NewInvestment,
    ) -> StorageResult<Investment> {
        let row = sqlx::query_as::<_, Investment>(
            r#"
            INSERT INTO investments
                (user_id, portfolio_id, type, amount, units, price_per_unit,
                 transaction_date, status)
            VALUES ($1, $2, $3, $4, $5, $6,
                    COALESCE($7, now()), COALESCE($8, 'completed'))
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(new.portfolio_id)
        .bind(&new.r#type)
        .bind(&new.amount)
        .bind(&new.units)
        .bind(&new.price_per_unit)
        .bind(new.transaction_date)
        .bind(&new.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn investments_for_user(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> StorageResult<Vec<Investment>> {
        let rows = sqlx::query_as::<_, Investment>(
            "SELECT * FROM investments WHERE user_id = $1 ORDER BY transaction_date DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit.unwrap_or(50))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn investments_for_portfolio(
        &self,
        portfolio_id: i64,
    ) -> StorageResult<Vec<Investment>> {
        let rows = sqlx::query_as::<_, Investment>(
            "SELECT * FROM investments WHERE portfolio_id = $1 ORDER BY transaction_date DESC",
        )
        .bind(portfolio_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_investment_goal(
        &self,
        user_id: i64,
        new: NewInvestmentGoal,
    ) -> StorageResult<InvestmentGoal> {
        let row = sqlx::query_as::<_, InvestmentGoal>(
            r#"
            INSERT INTO investment_goals
                (user_id, portfolio_id, title, description, target_amount,
                 current_amount, target_date, category, is_active, completed_at)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, '0.00'), $7, $8,
                    COALESCE($9, TRUE), $10)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(new.portfolio_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.target_amount)
        .bind(&new.current_amount)
        .bind(new.target_date)
        .bind(&new.category)
        .bind(new.is_active)
        .bind(new.completed_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn investment_goals_for_user(&self, user_id: i64) -> StorageResult<Vec<InvestmentGoal>> {
        let rows = sqlx::query_as::<_, InvestmentGoal>(
            "SELECT * FROM investment_goals WHERE user_id = $1 AND is_active",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_investment_goal(&self, id: i64) -> StorageResult<Option<InvestmentGoal>> {
        let row =
            sqlx::query_as::<_, InvestmentGoal>("SELECT * FROM investment_goals WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn update_investment_goal(
        &self,
        id: i64,
        update: InvestmentGoalUpdate,
    ) -> StorageResult<InvestmentGoal> {
        sqlx::query_as::<_, InvestmentGoal>(
            r#"
            UPDATE investment_goals SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                target_amount = COALESCE($4, target_amount),
                current_amount = COALESCE($5, current_amount),
                target_date = COALESCE($6, target_date),
                category = COALESCE($7, category),
                is_active = COALESCE($8, is_active),
                completed_at = COALESCE($9, completed_at)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.target_amount)
        .bind(&update.current_amount)
        .bind(update.target_date)
        .bind(&update.category)
        .bind(update.is_active)
        .bind(update.completed_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound("investment goal"))
    }

    async fn streaks_for_user(&self, user_id: i64) -> StorageResult<Vec<Streak>> {
        let rows = sqlx::query_as::<_, Streak>("SELECT * FROM streaks WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn upsert_streak(
        &self,
        user_id: i64,
        streak_type: &str,
        update: StreakUpdate,
    ) -> StorageResult<Streak> {
        let row = sqlx::query_as::<_, Streak>(
            r#"
            INSERT INTO streaks
                (user_id, type, current_streak, longest_streak, last_activity_date,
                 streak_multiplier, total_rewards_earned)
            VALUES ($1, $2, COALESCE($3, 0), COALESCE($4, 0), $5,
                    COALESCE($6, '1.00'), COALESCE($7, '0.00'))
            ON CONFLICT (user_id, type) DO UPDATE SET
                current_streak = COALESCE($3, streaks.current_streak),
                longest_streak = COALESCE($4, streaks.longest_streak),
                last_activity_date = COALESCE($5, streaks.last_activity_date),
                streak_multiplier = COALESCE($6, streaks.streak_multiplier),
                total_rewards_earned = COALESCE($7, streaks.total_rewards_earned),
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(streak_type)
        .bind(update.current_streak)
        .bind(update.longest_streak)
        .bind(update.last_activity_date)
        .bind(&update.streak_multiplier)
        .bind(&update.total_rewards_earned)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_seasonal_challenge(
        &self,
        created_by: i64,
        new: NewSeasonalChallenge,
    ) -> StorageResult<SeasonalChallenge> {
        let row = sqlx::query_as::<_, SeasonalChallenge>(
            r#"
            INSERT INTO seasonal_challenges
                (title, description, type, target_amount, target_count,
                 start_date, end_date, reward_points, reward_badges,
                 participant_limit, is_active, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 0), $9, $10,
                    COALESCE($11, TRUE), $12)
            RETURNING *
            "#,
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.r#type)
        .bind(&new.target_amount)
        .bind(new.target_count)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.reward_points)
        .bind(&new.reward_badges)
        .bind(new.participant_limit)
        .bind(new.is_active)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn seasonal_challenges(
        &self,
        active_only: Option<bool>,
    ) -> StorageResult<Vec<SeasonalChallenge>> {
        let rows = sqlx::query_as::<_, SeasonalChallenge>(
            "SELECT * FROM seasonal_challenges WHERE NOT $1 OR is_active ORDER BY start_date DESC",
        )
        .bind(active_only.unwrap_or(false))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn join_seasonal_challenge(
        &self,
        challenge_id: i64,
        user_id: i64,
    ) -> StorageResult<ChallengeParticipant> {
        let mut tx = self.pool.begin().await?;

        let challenge = sqlx::query_as::<_, SeasonalChallenge>(
            "SELECT * FROM seasonal_challenges WHERE id = $1 FOR UPDATE",
        )
        .bind(challenge_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound("seasonal challenge"))?;

        if let Some(limit) = challenge.participant_limit {
            let joined: i64 = sqlx::query_scalar(
                "SELECT count(*) FROM challenge_participants WHERE challenge_id = $1",
            )
            .bind(challenge_id)
            .fetch_one(&mut *tx)
            .await?;
            if joined >= limit as i64 {
                return Err(StorageError::validation("Challenge is full"));
            }
        }

        let participation = sqlx::query_as::<_, ChallengeParticipant>(
            r#"
            INSERT INTO challenge_participants (challenge_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (challenge_id, user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(challenge_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StorageError::validation("Already joined this challenge"))?;

        tx.commit().await?;
        Ok(participation)
    }

    async fn seasonal_challenges_for_user(
        &self,
        user_id: i64,
    ) -> StorageResult<Vec<ChallengeParticipant>> {
        let rows = sqlx::query_as::<_, ChallengeParticipant>(
            "SELECT * FROM challenge_participants WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_challenge_progress(
        &self,
        challenge_id: i64,
        user_id: i64,
        progress: String,
    ) -> StorageResult<ChallengeParticipant> {
        sqlx::query_as::<_, ChallengeParticipant>(
            r#"
            UPDATE challenge_participants SET current_progress = $3
            WHERE challenge_id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(challenge_id)
        .bind(user_id)
        .bind(&progress)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound("challenge participation"))
    }

    async fn achievements(&self, category: Option<&str>) -> StorageResult<Vec<Achievement>> {
        let rows = sqlx::query_as::<_, Achievement>(
            r#"
            SELECT * FROM achievements
            WHERE is_active AND ($1::text IS NULL OR category = $1)
            ORDER BY level, id
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn achievements_for_user(&self, user_id: i64) -> StorageResult<Vec<UserAchievement>> {
        let rows = sqlx::query_as::<_, UserAchievement>(
            "SELECT * FROM user_achievements WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn award_achievement(
        &self,
        user_id: i64,
        achievement_id: i64,
    ) -> StorageResult<UserAchievement> {
        // Awarding twice returns the existing row.
        let inserted = sqlx::query_as::<_, UserAchievement>(
            r#"
            INSERT INTO user_achievements
                (user_id, achievement_id, progress, is_unlocked, unlocked_at,
                 is_completed, completed_at)
            VALUES ($1, $2, '100.00', TRUE, now(), TRUE, now())
            ON CONFLICT (user_id, achievement_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(achievement_id)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(row) = inserted {
            return Ok(row);
        }
        sqlx::query_as::<_, UserAchievement>(
            "SELECT * FROM user_achievements WHERE user_id = $1 AND achievement_id = $2",
        )
        .bind(user_id)
        .bind(achievement_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound("achievement"))
    }

    async fn rewards(&self, category: Option<&str>) -> StorageResult<Vec<Reward>> {
        let rows = sqlx::query_as::<_, Reward>(
            "SELECT * FROM rewards WHERE is_active AND ($1::text IS NULL OR category = $1)",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn rewards_for_user(&self, user_id: i64) -> StorageResult<Vec<UserReward>> {
        let rows = sqlx::query_as::<_, UserReward>(
            "SELECT * FROM user_rewards WHERE user_id = $1 ORDER BY redeemed_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn redeem_reward(
        &self,
        user_id: i64,
        reward_id: i64,
        points_spent: i32,
        coins_spent: i32,
    ) -> StorageResult<UserReward> {
        let code = super::redemption_code();
        let row = sqlx::query_as::<_, UserReward>(
            r#"
            INSERT INTO user_rewards
                (user_id, reward_id, points_spent, coins_spent, redemption_code, expires_at)
            VALUES ($1, $2, $3, $4, $5, now() + interval '30 days')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(reward_id)
        .bind(points_spent)
        .bind(coins_spent)
        .bind(&code)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_team(&self, captain_id: i64, new: NewTeam) -> StorageResult<Team> {
        let mut tx = self.pool.begin().await?;
        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, description, type, captain_id, max_members)
            VALUES ($1, $2, $3, $4, COALESCE($5, 50))
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.r#type)
        .bind(captain_id)
        .bind(new.max_members)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO team_members (team_id, user_id, role) VALUES ($1, $2, 'captain')")
            .bind(team.id)
            .bind(captain_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(team)
    }

    async fn teams(&self, team_type: Option<&str>) -> StorageResult<Vec<Team>> {
        let rows = sqlx::query_as::<_, Team>(
            "SELECT * FROM teams WHERE is_active AND ($1::text IS NULL OR type = $1)",
        )
        .bind(team_type)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn join_team(&self, team_id: i64, user_id: i64) -> StorageResult<TeamMember> {
        let mut tx = self.pool.begin().await?;

        let team =
            sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1 FOR UPDATE")
                .bind(team_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StorageError::NotFound("team"))?;
        if team.member_count >= team.max_members {
            return Err(StorageError::validation("Team is full"));
        }

        let membership = sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (team_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (team_id, user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StorageError::validation("Already a member of this team"))?;

        sqlx::query("UPDATE teams SET member_count = member_count + 1 WHERE id = $1")
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(membership)
    }

    async fn teams_for_user(&self, user_id: i64) -> StorageResult<Vec<Team>> {
        let rows = sqlx::query_as::<_, Team>(
            r#"
            SELECT t.* FROM teams t
            JOIN team_members m ON m.team_id = t.id
            WHERE m.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_community(
        &self,
        created_by: i64,
        new: NewCommunity,
    ) -> StorageResult<Community> {
        let mut tx = self.pool.begin().await?;
        let community = sqlx::query_as::<_, Community>(
            r#"
            INSERT INTO communities
                (name, description, category, created_by, is_public, image_url, rules)
            VALUES ($1, $2, $3, $4, COALESCE($5, TRUE), $6, $7)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.category)
        .bind(created_by)
        .bind(new.is_public)
        .bind(&new.image_url)
        .bind(&new.rules)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO community_members (community_id, user_id, role) VALUES ($1, $2, 'admin')",
        )
        .bind(community.id)
        .bind(created_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(community)
    }

    async fn communities(
        &self,
        category: Option<&str>,
        public_only: Option<bool>,
    ) -> StorageResult<Vec<Community>> {
        let rows = sqlx::query_as::<_, Community>(
            r#"
            SELECT * FROM communities
            WHERE ($1::text IS NULL OR category = $1) AND (NOT $2 OR is_public)
            "#,
        )
        .bind(category)
        .bind(public_only.unwrap_or(false))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn join_community(
        &self,
        community_id: i64,
        user_id: i64,
    ) -> StorageResult<CommunityMember> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM communities WHERE id = $1 FOR UPDATE")
                .bind(community_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(StorageError::NotFound("community"));
        }

        let membership = sqlx::query_as::<_, CommunityMember>(
            r#"
            INSERT INTO community_members (community_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (community_id, user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(community_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StorageError::validation("Already a member of this community"))?;

        sqlx::query("UPDATE communities SET member_count = member_count + 1 WHERE id = $1")
            .bind(community_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(membership)
    }

    async fn create_group_goal(
        &self,
        created_by: i64,
        new: NewGroupGoal,
    ) -> StorageResult<GroupGoal> {
        let mut tx = self.pool.begin().await?;
        let goal = sqlx::query_as::<_, GroupGoal>(
            r#"
            INSERT INTO group_goals
                (name, description, target_amount, target_date, category,
                 created_by, is_public, member_limit)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, FALSE), COALESCE($8, 10))
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.target_amount)
        .bind(new.target_date)
        .bind(&new.category)
        .bind(created_by)
        .bind(new.is_public)
        .bind(new.member_limit)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO group_goal_members (goal_id, user_id) VALUES ($1, $2)")
            .bind(goal.id)
            .bind(created_by)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(goal)
    }

    async fn group_goals(
        &self,
        category: Option<&str>,
        public_only: Option<bool>,
    ) -> StorageResult<Vec<GroupGoal>> {
        let rows = sqlx::query_as::<_, GroupGoal>(
            r#"
            SELECT * FROM group_goals
            WHERE is_active AND ($1::text IS NULL OR category = $1) AND (NOT $2 OR is_public)
            "#,
        )
        .bind(category)
        .bind(public_only.unwrap_or(false))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn join_group_goal(
        &self,
        goal_id: i64,
        user_id: i64,
        contributed: Option<String>,
    ) -> StorageResult<GroupGoalMember> {
        let mut tx = self.pool.begin().await?;

        let goal =
            sqlx::query_as::<_, GroupGoal>("SELECT * FROM group_goals WHERE id = $1 FOR UPDATE")
                .bind(goal_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StorageError::NotFound("group goal"))?;

        let members: i64 =
            sqlx::query_scalar("SELECT count(*) FROM group_goal_members WHERE goal_id = $1")
                .bind(goal_id)
                .fetch_one(&mut *tx)
                .await?;
        if members >= goal.member_limit as i64 {
            return Err(StorageError::validation("Group goal is full"));
        }

        let membership = sqlx::query_as::<_, GroupGoalMember>(
            r#"
            INSERT INTO group_goal_members (goal_id, user_id, contributed_amount)
            VALUES ($1, $2, COALESCE($3, '0.00'))
            ON CONFLICT (goal_id, user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(goal_id)
        .bind(user_id)
        .bind(&contributed)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StorageError::validation("Already joined this goal"))?;

        tx.commit().await?;
        Ok(membership)
    }

    async fn group_goals_for_user(&self, user_id: i64) -> StorageResult<Vec<GroupGoal>> {
        let rows = sqlx::query_as::<_, GroupGoal>(
            r#"
            SELECT g.* FROM group_goals g
            JOIN group_goal_members m ON m.goal_id = g.id
            WHERE m.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_mentorship(
        &self,
        mentor_id: i64,
        new: NewMentorship,
    ) -> StorageResult<Mentorship> {
        if mentor_id == new.mentee_id {
            return Err(StorageError::validation("Cannot mentor yourself"));
        }
        sqlx::query_as::<_, Mentorship>(
            r#"
            INSERT INTO mentorships (mentor_id, mentee_id, specialization)
            VALUES ($1, $2, $3)
            ON CONFLICT (mentor_id, mentee_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(mentor_id)
        .bind(new.mentee_id)
        .bind(&new.specialization)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StorageError::validation("Mentorship already exists"))
    }

    async fn mentorships(&self, status: Option<&str>) -> StorageResult<Vec<Mentorship>> {
        let rows = sqlx::query_as::<_, Mentorship>(
            "SELECT * FROM mentorships WHERE $1::text IS NULL OR status = $1",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn mentorships_for_user(
        &self,
        user_id: i64,
        role: Option<&str>,
    ) -> StorageResult<Vec<Mentorship>> {
        let rows = sqlx::query_as::<_, Mentorship>(
            r#"
            SELECT * FROM mentorships
            WHERE CASE $2::text
                WHEN 'mentor' THEN mentor_id = $1
                WHEN 'mentee' THEN mentee_id = $1
                ELSE mentor_id = $1 OR mentee_id = $1
            END
            "#,
        )
        .bind(user_id)
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn accept_mentorship(
        &self,
        mentorship_id: i64,
        mentee_id: i64,
    ) -> StorageResult<Option<Mentorship>> {
        let accepted = sqlx::query_as::<_, Mentorship>(
            r#"
            UPDATE mentorships SET status = 'active'
            WHERE id = $1 AND mentee_id = $2
            RETURNING *
            "#,
        )
        .bind(mentorship_id)
        .bind(mentee_id)
        .fetch_optional(&self.pool)
        .await?;
        if accepted.is_some() {
            return Ok(accepted);
        }

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM mentorships WHERE id = $1")
            .bind(mentorship_id)
            .fetch_optional(&self.pool)
            .await?;
        match exists {
            Some(_) => Ok(None),
            None => Err(StorageError::NotFound("mentorship")),
        }
    }

    async fn create_budget(&self, user_id: i64, new: NewBudget) -> StorageResult<Budget> {
        let row = sqlx::query_as::<_, Budget>(
            r#"
            INSERT INTO budgets (user_id, category, monthly_limit, alert_threshold)
            VALUES ($1, $2, $3, COALESCE($4, '0.80'))
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&new.category)
        .bind(&new.monthly_limit)
        .bind(&new.alert_threshold)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn budgets_for_user(&self, user_id: i64) -> StorageResult<Vec<Budget>> {
        let rows = sqlx::query_as::<_, Budget>(
            "SELECT * FROM budgets WHERE user_id = $1 AND is_active",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_budget(&self, id: i64) -> StorageResult<Option<Budget>> {
        let row = sqlx::query_as::<_, Budget>("SELECT * FROM budgets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_budget(&self, id: i64, update: BudgetUpdate) -> StorageResult<Budget> {
        sqlx::query_as::<_, Budget>(
            r#"
            UPDATE budgets SET
                monthly_limit = COALESCE($2, monthly_limit),
                current_spent = COALESCE($3, current_spent),
                alert_threshold = COALESCE($4, alert_threshold),
                is_active = COALESCE($5, is_active),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.monthly_limit)
        .bind(&update.current_spent)
        .bind(&update.alert_threshold)
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound("budget"))
    }

    async fn financial_health_for_user(
        &self,
        user_id: i64,
    ) -> StorageResult<Option<FinancialHealth>> {
        let row = sqlx::query_as::<_, FinancialHealth>(
            "SELECT * FROM financial_health WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn upsert_financial_health(
        &self,
        user_id: i64,
        scores: HealthScores,
    ) -> StorageResult<FinancialHealth> {
        let row = sqlx::query_as::<_, FinancialHealth>(
            r#"
            INSERT INTO financial_health
                (user_id, overall_score, savings_score, spending_score,
                 investment_score, budget_score, streak_score, recommendations, trends)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id) DO UPDATE SET
                overall_score = $2,
                savings_score = $3,
                spending_score = $4,
                investment_score = $5,
                budget_score = $6,
                streak_score = $7,
                recommendations = $8,
                trends = $9,
                calculated_at = now()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(scores.overall_score)
        .bind(scores.savings_score)
        .bind(scores.spending_score)
        .bind(scores.investment_score)
        .bind(scores.budget_score)
        .bind(scores.streak_score)
        .bind(&scores.recommendations)
        .bind(&scores.trends)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn education_modules(
        &self,
        category: Option<&str>,
    ) -> StorageResult<Vec<EducationModule>> {
        let rows = sqlx::query_as::<_, EducationModule>(
            "SELECT * FROM education_modules WHERE is_active AND ($1::text IS NULL OR category = $1)",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn education_progress_for_user(
        &self,
        user_id: i64,
    ) -> StorageResult<Vec<EducationProgress>> {
        let rows = sqlx::query_as::<_, EducationProgress>(
            "SELECT * FROM education_progress WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_education_progress(
        &self,
        user_id: i64,
        module_id: i64,
        progress: i32,
    ) -> StorageResult<EducationProgress> {
        let row = sqlx::query_as::<_, EducationProgress>(
            r#"
            INSERT INTO education_progress
                (user_id, module_id, progress, is_completed, completed_at, time_spent)
            VALUES ($1, $2, $3, $3 >= 100, CASE WHEN $3 >= 100 THEN now() END, 1)
            ON CONFLICT (user_id, module_id) DO UPDATE SET
                progress = $3,
                is_completed = $3 >= 100,
                completed_at = CASE WHEN $3 >= 100 THEN now() END,
                last_accessed_at = now(),
                time_spent = education_progress.time_spent + 1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(module_id)
        .bind(progress)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_bank_account(
        &self,
        user_id: i64,
        new: NewBankAccount,
    ) -> StorageResult<BankAccount> {
        let row = sqlx::query_as::<_, BankAccount>(
            r#"
            INSERT INTO bank_accounts
                (user_id, bank_name, account_type, account_number, balance, is_primary)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, FALSE))
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&new.bank_name)
        .bind(&new.account_type)
        .bind(&new.account_number)
        .bind(&new.balance)
        .bind(new.is_primary)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn bank_accounts_for_user(&self, user_id: i64) -> StorageResult<Vec<BankAccount>> {
        let rows = sqlx::query_as::<_, BankAccount>(
            "SELECT * FROM bank_accounts WHERE user_id = $1 AND is_active",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_bill_split(
        &self,
        created_by: i64,
        new: NewBillSplit,
    ) -> StorageResult<BillSplit> {
        let row = sqlx::query_as::<_, BillSplit>(
            r#"
            INSERT INTO bill_splits
                (created_by, title, total_amount, description, type, due_date)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'equal'), $6)
            RETURNING *
            "#,
        )
        .bind(created_by)
        .bind(&new.title)
        .bind(&new.total_amount)
        .bind(&new.description)
        .bind(&new.r#type)
        .bind(new.due_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn bill_splits_for_user(&self, user_id: i64) -> StorageResult<Vec<BillSplit>> {
        let rows = sqlx::query_as::<_, BillSplit>(
            r#"
            SELECT DISTINCT s.* FROM bill_splits s
            LEFT JOIN bill_split_members m ON m.bill_id = s.id
            WHERE s.created_by = $1 OR m.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn join_bill_split(
        &self,
        bill_id: i64,
        user_id: i64,
        owed_amount: String,
    ) -> StorageResult<BillSplitMember> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM bill_splits WHERE id = $1")
            .bind(bill_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(StorageError::NotFound("bill split"));
        }

        sqlx::query_as::<_, BillSplitMember>(
            r#"
            INSERT INTO bill_split_members (bill_id, user_id, owed_amount)
            VALUES ($1, $2, $3)
            ON CONFLICT (bill_id, user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(bill_id)
        .bind(user_id)
        .bind(&owed_amount)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StorageError::validation("Already part of this bill split"))
    }

    async fn create_scheduled_payment(
        &self,
        user_id: i64,
        new: NewScheduledPayment,
    ) -> StorageResult<ScheduledPayment> {
        let row = sqlx::query_as::<_, ScheduledPayment>(
            r#"
            INSERT INTO scheduled_payments
                (user_id, title, amount, recipient_upi, frequency,
                 next_payment_date, end_date, auto_execute)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, FALSE))
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&new.title)
        .bind(&new.amount)
        .bind(&new.recipient_upi)
        .bind(&new.frequency)
        .bind(new.next_payment_date)
        .bind(new.end_date)
        .bind(new.auto_execute)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn scheduled_payments_for_user(
        &self,
        user_id: i64,
    ) -> StorageResult<Vec<ScheduledPayment>> {
        let rows = sqlx::query_as::<_, ScheduledPayment>(
            "SELECT * FROM scheduled_payments WHERE user_id = $1 AND is_active",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

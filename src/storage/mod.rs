pub mod error;
pub mod fallback;
pub mod memory;
pub mod models;
pub mod postgres;

pub use error::{StorageError, StorageResult};
pub use fallback::FallbackStorage;
pub use memory::MemoryStorage;
pub use postgres::PgStorage;

use async_trait::async_trait;
use chrono::Utc;

use models::*;

/// Opaque voucher code derived from the redemption instant.
pub(crate) fn redemption_code() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("RDM-{nanos:X}")
}

/// Persistence backend for every SaveUp entity.
///
/// Implementations return `StorageError::Validation` for bad input,
/// `StorageError::NotFound` when an update targets a missing row, and a
/// backend error (`Sqlx`/`Unavailable`) only when the store itself failed.
/// Getters return `Ok(None)` rather than an error for missing rows so that
/// callers can run ownership checks before deciding on a 404.
#[async_trait]
pub trait Storage: Send + Sync {
    // Users
    async fn create_user(&self, new: NewUser) -> StorageResult<User>;
    async fn get_user(&self, id: i64) -> StorageResult<Option<User>>;
    async fn update_user(&self, id: i64, update: UserUpdate) -> StorageResult<User>;
    /// Checks the password against the stored hash. `Ok(None)` covers both an
    /// unknown email and a wrong password.
    async fn verify_login(&self, email: &str, password: &str) -> StorageResult<Option<User>>;

    // Transactions, challenges, activities, badges
    async fn create_transaction(&self, user_id: i64, new: NewTransaction)
        -> StorageResult<Transaction>;
    async fn transactions_for_user(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> StorageResult<Vec<Transaction>>;

    async fn create_challenge(&self, user_id: i64, new: NewChallenge) -> StorageResult<Challenge>;
    async fn challenges_for_user(&self, user_id: i64) -> StorageResult<Vec<Challenge>>;
    async fn get_challenge(&self, id: i64) -> StorageResult<Option<Challenge>>;
    async fn update_challenge(&self, id: i64, update: ChallengeUpdate) -> StorageResult<Challenge>;

    async fn create_activity(&self, user_id: i64, new: NewActivity) -> StorageResult<Activity>;
    async fn activities_for_user(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> StorageResult<Vec<Activity>>;

    async fn badges_for_user(&self, user_id: i64) -> StorageResult<Vec<UserBadge>>;
    async fn set_badge_earned(&self, user_id: i64, badge_id: &str, earned: bool)
        -> StorageResult<()>;

    // Investing
    async fn create_portfolio(&self, user_id: i64, new: NewPortfolio) -> StorageResult<Portfolio>;
    async fn portfolios_for_user(&self, user_id: i64) -> StorageResult<Vec<Portfolio>>;
    async fn get_portfolio(&self, id: i64) -> StorageResult<Option<Portfolio>>;
    async fn update_portfolio(&self, id: i64, update: PortfolioUpdate) -> StorageResult<Portfolio>;

    async fn create_sip_plan(&self, user_id: i64, new: NewSipPlan) -> StorageResult<SipPlan>;
    async fn sip_plans_for_user(&self, user_id: i64) -> StorageResult<Vec<SipPlan>>;
    async fn get_sip_plan(&self, id: i64) -> StorageResult<Option<SipPlan>>;
    async fn update_sip_plan(&self, id: i64, update: SipPlanUpdate) -> StorageResult<SipPlan>;

    async fn create_investment(&self, user_id: i64, new: NewInvestment)
        -> StorageResult<Investment>;
    async fn investments_for_user(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> StorageResult<Vec<Investment>>;
    async fn investments_for_portfolio(&self, portfolio_id: i64)
        -> StorageResult<Vec<Investment>>;

    async fn create_investment_goal(
        &self,
        user_id: i64,
        new: NewInvestmentGoal,
    ) -> StorageResult<InvestmentGoal>;
    async fn investment_goals_for_user(&self, user_id: i64) -> StorageResult<Vec<InvestmentGoal>>;
    async fn get_investment_goal(&self, id: i64) -> StorageResult<Option<InvestmentGoal>>;
    async fn update_investment_goal(
        &self,
        id: i64,
        update: InvestmentGoalUpdate,
    ) -> StorageResult<InvestmentGoal>;

    // Streaks
    async fn streaks_for_user(&self, user_id: i64) -> StorageResult<Vec<Streak>>;
    /// Creates the row for `(user_id, streak_type)` if it does not exist yet.
    async fn upsert_streak(
        &self,
        user_id: i64,
        streak_type: &str,
        update: StreakUpdate,
    ) -> StorageResult<Streak>;

    // Seasonal challenges
    async fn create_seasonal_challenge(
        &self,
        created_by: i64,
        new: NewSeasonalChallenge,
    ) -> StorageResult<SeasonalChallenge>;
    async fn seasonal_challenges(
        &self,
        active_only: Option<bool>,
    ) -> StorageResult<Vec<SeasonalChallenge>>;
    async fn join_seasonal_challenge(
        &self,
        challenge_id: i64,
        user_id: i64,
    ) -> StorageResult<ChallengeParticipant>;
    async fn seasonal_challenges_for_user(
        &self,
        user_id: i64,
    ) -> StorageResult<Vec<ChallengeParticipant>>;
    async fn update_challenge_progress(
        &self,
        challenge_id: i64,
        user_id: i64,
        progress: String,
    ) -> StorageResult<ChallengeParticipant>;

    // Achievements and rewards
    async fn achievements(&self, category: Option<&str>) -> StorageResult<Vec<Achievement>>;
    async fn achievements_for_user(&self, user_id: i64) -> StorageResult<Vec<UserAchievement>>;
    async fn award_achievement(
        &self,
        user_id: i64,
        achievement_id: i64,
    ) -> StorageResult<UserAchievement>;

    async fn rewards(&self, category: Option<&str>) -> StorageResult<Vec<Reward>>;
    async fn rewards_for_user(&self, user_id: i64) -> StorageResult<Vec<UserReward>>;
    async fn redeem_reward(
        &self,
        user_id: i64,
        reward_id: i64,
        points_spent: i32,
        coins_spent: i32,
    ) -> StorageResult<UserReward>;

    // Teams, communities, group goals, mentorships
    async fn create_team(&self, captain_id: i64, new: NewTeam) -> StorageResult<Team>;
    async fn teams(&self, team_type: Option<&str>) -> StorageResult<Vec<Team>>;
    async fn join_team(&self, team_id: i64, user_id: i64) -> StorageResult<TeamMember>;
    async fn teams_for_user(&self, user_id: i64) -> StorageResult<Vec<Team>>;

    async fn create_community(&self, created_by: i64, new: NewCommunity)
        -> StorageResult<Community>;
    async fn communities(
        &self,
        category: Option<&str>,
        public_only: Option<bool>,
    ) -> StorageResult<Vec<Community>>;
    async fn join_community(
        &self,
        community_id: i64,
        user_id: i64,
    ) -> StorageResult<CommunityMember>;

    async fn create_group_goal(&self, created_by: i64, new: NewGroupGoal)
        -> StorageResult<GroupGoal>;
    async fn group_goals(
        &self,
        category: Option<&str>,
        public_only: Option<bool>,
    ) -> StorageResult<Vec<GroupGoal>>;
    async fn join_group_goal(
        &self,
        goal_id: i64,
        user_id: i64,
        contributed: Option<String>,
    ) -> StorageResult<GroupGoalMember>;
    async fn group_goals_for_user(&self, user_id: i64) -> StorageResult<Vec<GroupGoal>>;

    async fn create_mentorship(&self, mentor_id: i64, new: NewMentorship)
        -> StorageResult<Mentorship>;
    async fn mentorships(&self, status: Option<&str>) -> StorageResult<Vec<Mentorship>>;
    async fn mentorships_for_user(
        &self,
        user_id: i64,
        role: Option<&str>,
    ) -> StorageResult<Vec<Mentorship>>;
    /// Only the mentee named on the mentorship may accept it; anyone else gets
    /// `Ok(None)`.
    async fn accept_mentorship(
        &self,
        mentorship_id: i64,
        mentee_id: i64,
    ) -> StorageResult<Option<Mentorship>>;

    // Budgets and financial health
    async fn create_budget(&self, user_id: i64, new: NewBudget) -> StorageResult<Budget>;
    async fn budgets_for_user(&self, user_id: i64) -> StorageResult<Vec<Budget>>;
    async fn get_budget(&self, id: i64) -> StorageResult<Option<Budget>>;
    async fn update_budget(&self, id: i64, update: BudgetUpdate) -> StorageResult<Budget>;

    async fn financial_health_for_user(&self, user_id: i64)
        -> StorageResult<Option<FinancialHealth>>;
    async fn upsert_financial_health(
        &self,
        user_id: i64,
        scores: HealthScores,
    ) -> StorageResult<FinancialHealth>;

    // Education
    async fn education_modules(&self, category: Option<&str>)
        -> StorageResult<Vec<EducationModule>>;
    async fn education_progress_for_user(
        &self,
        user_id: i64,
    ) -> StorageResult<Vec<EducationProgress>>;
    /// Records progress as a whole percentage and marks the module completed
    /// once it reaches 100.
    async fn update_education_progress(
        &self,
        user_id: i64,
        module_id: i64,
        progress: i32,
    ) -> StorageResult<EducationProgress>;

    // Banking
    async fn create_bank_account(&self, user_id: i64, new: NewBankAccount)
        -> StorageResult<BankAccount>;
    async fn bank_accounts_for_user(&self, user_id: i64) -> StorageResult<Vec<BankAccount>>;

    async fn create_bill_split(&self, created_by: i64, new: NewBillSplit)
        -> StorageResult<BillSplit>;
    async fn bill_splits_for_user(&self, user_id: i64) -> StorageResult<Vec<BillSplit>>;
    async fn join_bill_split(
        &self,
        bill_id: i64,
        user_id: i64,
        owed_amount: String,
    ) -> StorageResult<BillSplitMember>;

    async fn create_scheduled_payment(
        &self,
        user_id: i64,
        new: NewScheduledPayment,
    ) -> StorageResult<ScheduledPayment>;
    async fn scheduled_payments_for_user(
        &self,
        user_id: i64,
    ) -> StorageResult<Vec<ScheduledPayment>>;

    /// Liveness probe for the health endpoint.
    async fn ping(&self) -> StorageResult<()>;
}

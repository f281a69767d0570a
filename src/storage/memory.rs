//! In-process store used when no database is configured and as the fallback
//! target when the database misbehaves.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::models::*;
use crate::storage::Storage;

/// `User` plus the hash that must never appear in a response body.
#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<StoredUser>,
    transactions: Vec<Transaction>,
    challenges: Vec<Challenge>,
    activities: Vec<Activity>,
    user_badges: Vec<UserBadge>,
    portfolios: Vec<Portfolio>,
    sip_plans: Vec<SipPlan>,
    investments: Vec<Investment>,
    investment_goals: Vec<InvestmentGoal>,
    streaks: Vec<Streak>,
    seasonal_challenges: Vec<SeasonalChallenge>,
    challenge_participants: Vec<ChallengeParticipant>,
    teams: Vec<Team>,
    team_members: Vec<TeamMember>,
    achievements: Vec<Achievement>,
    user_achievements: Vec<UserAchievement>,
    rewards: Vec<Reward>,
    user_rewards: Vec<UserReward>,
    budgets: Vec<Budget>,
    financial_health: Vec<FinancialHealth>,
    group_goals: Vec<GroupGoal>,
    group_goal_members: Vec<GroupGoalMember>,
    mentorships: Vec<Mentorship>,
    communities: Vec<Community>,
    community_members: Vec<CommunityMember>,
    bank_accounts: Vec<BankAccount>,
    bill_splits: Vec<BillSplit>,
    bill_split_members: Vec<BillSplitMember>,
    scheduled_payments: Vec<ScheduledPayment>,
    education_modules: Vec<EducationModule>,
    education_progress: Vec<EducationProgress>,
    next_id: i64,
}

impl MemoryState {
    // One counter for every entity type, so ids are unique across the store.
    fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage {
            state: Mutex::new(MemoryState {
                next_id: 1,
                ..MemoryState::default()
            }),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn zero(v: Option<String>) -> String {
    v.unwrap_or_else(|| "0.00".to_owned())
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_user(&self, new: NewUser) -> StorageResult<User> {
        let password = match new.password.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => return Err(StorageError::validation("Password is required")),
        };
        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.user.email == new.email) {
            return Err(StorageError::validation("Email already registered"));
        }
        let now = Utc::now();
        let user = User {
            id: state.next_id(),
            email: new.email,
            username: new.username,
            name: new.name,
            upi_id: new.upi_id,
            total_savings: zero(new.total_savings),
            today_round_up: zero(new.today_round_up),
            current_streak: new.current_streak.unwrap_or(0),
            member_since: now,
            profile_picture: new.profile_picture,
            created_at: now,
            updated_at: now,
        };
        state.users.push(StoredUser {
            user: user.clone(),
            password_hash,
        });
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> StorageResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.user.id == id).map(|u| u.user.clone()))
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> StorageResult<User> {
        let mut state = self.state.lock().await;
        let stored = state
            .users
            .iter_mut()
            .find(|u| u.user.id == id)
            .ok_or(StorageError::NotFound("user"))?;
        let user = &mut stored.user;
        if let Some(v) = update.username {
            user.username = v;
        }
        if let Some(v) = update.name {
            user.name = v;
        }
        if let Some(v) = update.upi_id {
            user.upi_id = Some(v);
        }
        if let Some(v) = update.total_savings {
            user.total_savings = v;
        }
        if let Some(v) = update.today_round_up {
            user.today_round_up = v;
        }
        if let Some(v) = update.current_streak {
            user.current_streak = v;
        }
        if let Some(v) = update.profile_picture {
            user.profile_picture = Some(v);
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn verify_login(&self, email: &str, password: &str) -> StorageResult<Option<User>> {
        let state = self.state.lock().await;
        let Some(stored) = state.users.iter().find(|u| u.user.email == email) else {
            return Ok(None);
        };
        if bcrypt::verify(password, &stored.password_hash)? {
            Ok(Some(stored.user.clone()))
        } else {
            Ok(None)
        }
    }

    async fn create_transaction(
        &self,
        user_id: i64,
        new: NewTransaction,
    ) -> StorageResult<Transaction> {
        let mut state = self.state.lock().await;
        let transaction = Transaction {
            id: state.next_id(),
            user_id,
            r#type: new.r#type,
            amount: new.amount,
            original_amount: new.original_amount,
            round_up_amount: new.round_up_amount,
            payee: new.payee,
            upi_id: new.upi_id,
            note: new.note,
            status: new.status.unwrap_or_else(|| "completed".to_owned()),
            created_at: Utc::now(),
        };
        state.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn transactions_for_user(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> StorageResult<Vec<Transaction>> {
        let state = self.state.lock().await;
        let mut rows: Vec<_> = state
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(limit.unwrap_or(50) as usize);
        Ok(rows)
    }

    async fn create_challenge(&self, user_id: i64, new: NewChallenge) -> StorageResult<Challenge> {
        let mut state = self.state.lock().await;
        let challenge = Challenge {
            id: state.next_id(),
            user_id,
            title: new.title,
            description: new.description,
            target_amount: new.target_amount,
            current_amount: zero(new.current_amount),
            deadline: new.deadline,
            status: new.status.unwrap_or_else(|| "active".to_owned()),
            category: new.category,
            is_template: new.is_template.unwrap_or(false),
            created_at: Utc::now(),
            completed_at: new.completed_at,
        };
        state.challenges.push(challenge.clone());
        Ok(challenge)
    }

    async fn challenges_for_user(&self, user_id: i64) -> StorageResult<Vec<Challenge>> {
        let state = self.state.lock().await;
        Ok(state
            .challenges
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_challenge(&self, id: i64) -> StorageResult<Option<Challenge>> {
        let state = self.state.lock().await;
        Ok(state.challenges.iter().find(|c| c.id == id).cloned())
    }

    async fn update_challenge(&self, id: i64, update: ChallengeUpdate) -> StorageResult<Challenge> {
        let mut state = self.state.lock().await;
        let challenge = state
            .challenges
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StorageError::NotFound("challenge"))?;
        if let Some(v) = update.title {
            challenge.title = v;
        }
        if let Some(v) = update.description {
            challenge.description = Some(v);
        }
        if let Some(v) = update.target_amount {
            challenge.target_amount = v;
        }
        if let Some(v) = update.current_amount {
            challenge.current_amount = v;
        }
        if let Some(v) = update.deadline {
            challenge.deadline = Some(v);
        }
        if let Some(v) = update.status {
            challenge.status = v;
        }
        if let Some(v) = update.category {
            challenge.category = Some(v);
        }
        if let Some(v) = update.completed_at {
            challenge.completed_at = Some(v);
        }
        Ok(challenge.clone())
    }

    async fn create_activity(&self, user_id: i64, new: NewActivity) -> StorageResult<Activity> {
        let mut state = self.state.lock().await;
        let activity = Activity {
            id: state.next_id(),
            user_id,
            r#type: new.r#type,
            amount: new.amount,
            description: new.description,
            icon: new.icon,
            metadata: new.metadata,
            created_at: Utc::now(),
        };
        state.activities.push(activity.clone());
        Ok(activity)
    }

    async fn activities_for_user(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> StorageResult<Vec<Activity>> {
        let state = self.state.lock().await;
        let mut rows: Vec<_> = state
            .activities
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(limit.unwrap_or(20) as usize);
        Ok(rows)
    }

    async fn badges_for_user(&self, user_id: i64) -> StorageResult<Vec<UserBadge>> {
        let state = self.state.lock().await;
        Ok(state
            .user_badges
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn set_badge_earned(
        &self,
        user_id: i64,
        badge_id: &str,
        earned: bool,
    ) -> StorageResult<()> {
        let mut state = self.state.lock().await;
        let earned_at = if earned { Some(Utc::now()) } else { None };
        if let Some(badge) = state
            .user_badges
            .iter_mut()
            .find(|b| b.user_id == user_id && b.badge_id == badge_id)
        {
            badge.earned = earned;
            badge.earned_at = earned_at;
        } else {
            let badge = UserBadge {
                id: state.next_id(),
                user_id,
                badge_id: badge_id.to_owned(),
                earned,
                earned_at,
            };
            state.user_badges.push(badge);
        }
        Ok(())
    }

    async fn create_portfolio(&self, user_id: i64, new: NewPortfolio) -> StorageResult<Portfolio> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let portfolio = Portfolio {
            id: state.next_id(),
            user_id,
            name: new.name,
            r#type: new.r#type,
            total_invested: zero(new.total_invested),
            current_value: zero(new.current_value),
            returns: zero(new.returns),
            returns_percentage: zero(new.returns_percentage),
            is_active: new.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        state.portfolios.push(portfolio.clone());
        Ok(portfolio)
    }

    async fn portfolios_for_user(&self, user_id: i64) -> StorageResult<Vec<Portfolio>> {
        let state = self.state.lock().await;
        Ok(state
            .portfolios
            .iter()
            .filter(|p| p.user_id == user_id && p.is_active)
            .cloned()
            .collect())
    }

    async fn get_portfolio(&self, id: i64) -> StorageResult<Option<Portfolio>> {
        let state = self.state.lock().await;
        Ok(state.portfolios.iter().find(|p| p.id == id).cloned())
    }

    async fn update_portfolio(&self, id: i64, update: PortfolioUpdate) -> StorageResult<Portfolio> {
        let mut state = self.state.lock().await;
        let portfolio = state
            .portfolios
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StorageError::NotFound("portfolio"))?;
        if let Some(v) = update.name {
            portfolio.name = v;
        }
        if let Some(v) = update.r#type {
            portfolio.r#type = v;
        }
        if let Some(v) = update.total_invested {
            portfolio.total_invested = v;
        }
        if let Some(v) = update.current_value {
            portfolio.current_value = v;
        }
        if let Some(v) = update.returns {
            portfolio.returns = v;
        }
        if let Some(v) = update.returns_percentage {
            portfolio.returns_percentage = v;
        }
        if let Some(v) = update.is_active {
            portfolio.is_active = v;
        }
        portfolio.updated_at = Utc::now();
        Ok(portfolio.clone())
    }

    async fn create_sip_plan(&self, user_id: i64, new: NewSipPlan) -> StorageResult<SipPlan> {
        let mut state = self.state.lock().await;
        let plan = SipPlan {
            id: state.next_id(),
            user_id,
            portfolio_id: new.portfolio_id,
            name: new.name,
            monthly_amount: new.monthly_amount,
            start_date: new.start_date,
            end_date: new.end_date,
            next_payment_date: new.next_payment_date,
            is_active: new.is_active.unwrap_or(true),
            auto_invest_roundups: new.auto_invest_roundups.unwrap_or(false),
            created_at: Utc::now(),
        };
        state.sip_plans.push(plan.clone());
        Ok(plan)
    }

    async fn sip_plans_for_user(&self, user_id: i64) -> StorageResult<Vec<SipPlan>> {
        let state = self.state.lock().await;
        Ok(state
            .sip_plans
            .iter()
            .filter(|s| s.user_id == user_id && s.is_active)
            .cloned()
            .collect())
    }

    async fn get_sip_plan(&self, id: i64) -> StorageResult<Option<SipPlan>> {
        let state = self.state.lock().await;
        Ok(state.sip_plans.iter().find(|s| s.id == id).cloned())
    }

    async fn update_sip_plan(&self, id: i64, update: SipPlanUpdate) -> StorageResult<SipPlan> {
        let mut state = self.state.lock().await;
        let plan = state
            .sip_plans
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StorageError::NotFound("SIP plan"))?;
        if let Some(v) = update.name {
            plan.name = v;
        }
        if let Some(v) = update.monthly_amount {
            plan.monthly_amount = v;
        }
        if let Some(v) = update.start_date {
            plan.start_date = v;
        }
        if let Some(v) = update.end_date {
            plan.end_date = Some(v);
        }
        if let Some(v) = update.next_payment_date {
            plan.next_payment_date = v;
        }
        if let Some(v) = update.is_active {
            plan.is_active = v;
        }
        if let Some(v) = update.auto_invest_roundups {
            plan.auto_invest_roundups = v;
        }
        Ok(plan.clone())
    }

    async fn create_investment(
        &self,
        user_id: i64,
        new: NewInvestment,
    ) -> StorageResult<Investment> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let investment = Investment {
            id: state.next_id(),
            user_id,
            portfolio_id: new.portfolio_id,
            r#type: new.r#type,
            amount: new.amount,
            units: new.units,
            price_per_unit: new.price_per_unit,
            transaction_date: new.transaction_date.unwrap_or(now),
            status: new.status.unwrap_or_else(|| "completed".to_owned()),
            created_at: now,
        };
        state.investments.push(investment.clone());
        Ok(investment)
    }

    async fn investments_for_user(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> StorageResult<Vec<Investment>> {
        let state = self.state.lock().await;
        let mut rows: Vec<_> = state
            .investments
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date).then(b.id.cmp(&a.id)));
        rows.truncate(limit.unwrap_or(50) as usize);
        Ok(rows)
    }

    async fn investments_for_portfolio(
        &self,
        portfolio_id: i64,
    ) -> StorageResult<Vec<Investment>> {
        let state = self.state.lock().await;
        Ok(state
            .investments
            .iter()
            .filter(|i| i.portfolio_id == portfolio_id)
            .cloned()
            .collect())
    }

    async fn create_investment_goal(
        &self,
        user_id: i64,
        new: NewInvestmentGoal,
    ) -> StorageResult<InvestmentGoal> {
        let mut state = self.state.lock().await;
        let goal = InvestmentGoal {
            id: state.next_id(),
            user_id,
            portfolio_id: new.portfolio_id,
            title: new.title,
            description: new.description,
            target_amount: new.target_amount,
            current_amount: zero(new.current_amount),
            target_date: new.target_date,
            category: new.category,
            is_active: new.is_active.unwrap_or(true),
            created_at: Utc::now(),
            completed_at: new.completed_at,
        };
        state.investment_goals.push(goal.clone());
        Ok(goal)
    }

    async fn investment_goals_for_user(&self, user_id: i64) -> StorageResult<Vec<InvestmentGoal>> {
        let state = self.state.lock().await;
        Ok(state
            .investment_goals
            .iter()
            .filter(|g| g.user_id == user_id && g.is_active)
            .cloned()
            .collect())
    }

    async fn get_investment_goal(&self, id: i64) -> StorageResult<Option<InvestmentGoal>> {
        let state = self.state.lock().await;
        Ok(state.investment_goals.iter().find(|g| g.id == id).cloned())
    }

    async fn update_investment_goal(
        &self,
        id: i64,
        update: InvestmentGoalUpdate,
    ) -> StorageResult<InvestmentGoal> {
        let mut state = self.state.lock().await;
        let goal = state
            .investment_goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(StorageError::NotFound("investment goal"))?;
        if let Some(v) = update.title {
            goal.title = v;
        }
        if let Some(v) = update.description {
            goal.description = Some(v);
        }
        if let Some(v) = update.target_amount {
            goal.target_amount = v;
        }
        if let Some(v) = update.current_amount {
            goal.current_amount = v;
        }
        if let Some(v) = update.target_date {
            goal.target_date = Some(v);
        }
        if let Some(v) = update.category {
            goal.category = Some(v);
        }
        if let Some(v) = update.is_active {
            goal.is_active = v;
        }
        if let Some(v) = update.completed_at {
            goal.completed_at = Some(v);
        }
        Ok(goal.clone())
    }

    async fn streaks_for_user(&self, user_id: i64) -> StorageResult<Vec<Streak>> {
        let state = self.state.lock().await;
        Ok(state
            .streaks
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert_streak(
        &self,
        user_id: i64,
        streak_type: &str,
        update: StreakUpdate,
    ) -> StorageResult<Streak> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        if state
            .streaks
            .iter()
            .all(|s| !(s.user_id == user_id && s.r#type == streak_type))
        {
            let streak = Streak {
                id: state.next_id(),
                user_id,
                r#type: streak_type.to_owned(),
                current_streak: 0,
                longest_streak: 0,
                last_activity_date: None,
                streak_multiplier: "1.00".to_owned(),
                total_rewards_earned: "0.00".to_owned(),
                created_at: now,
                updated_at: now,
            };
            state.streaks.push(streak);
        }
        let streak = state
            .streaks
            .iter_mut()
            .find(|s| s.user_id == user_id && s.r#type == streak_type)
            .ok_or(StorageError::NotFound("streak"))?;
        if let Some(v) = update.current_streak {
            streak.current_streak = v;
        }
        if let Some(v) = update.longest_streak {
            streak.longest_streak = v;
        }
        if let Some(v) = update.last_activity_date {
            streak.last_activity_date = Some(v);
        }
        if let Some(v) = update.streak_multiplier {
            streak.streak_multiplier = v;
        }
        if let Some(v) = update.total_rewards_earned {
            streak.total_rewards_earned = v;
        }
        streak.updated_at = now;
        Ok(streak.clone())
    }

    async fn create_seasonal_challenge(
        &self,
        created_by: i64,
        new: NewSeasonalChallenge,
    ) -> StorageResult<SeasonalChallenge> {
        let mut state = self.state.lock().await;
        let challenge = SeasonalChallenge {
            id: state.next_id(),
            title: new.title,
            description: new.description,
            r#type: new.r#type,
            target_amount: new.target_amount,
            target_count: new.target_count,
            start_date: new.start_date,
            end_date: new.end_date,
            reward_points: new.reward_points.unwrap_or(0),
            reward_badges: new.reward_badges,
            participant_limit: new.participant_limit,
            is_active: new.is_active.unwrap_or(true),
            created_by: Some(created_by),
            created_at: Utc::now(),
        };
        state.seasonal_challenges.push(challenge.clone());
        Ok(challenge)
    }

    async fn seasonal_challenges(
        &self,
        active_only: Option<bool>,
    ) -> StorageResult<Vec<SeasonalChallenge>> {
        let state = self.state.lock().await;
        Ok(state
            .seasonal_challenges
            .iter()
            .filter(|c| !active_only.unwrap_or(false) || c.is_active)
            .cloned()
            .collect())
    }

    async fn join_seasonal_challenge(
        &self,
        challenge_id: i64,
        user_id: i64,
    ) -> StorageResult<ChallengeParticipant> {
        let mut state = self.state.lock().await;
        let challenge = state
            .seasonal_challenges
            .iter()
            .find(|c| c.id == challenge_id)
            .ok_or(StorageError::NotFound("seasonal challenge"))?;
        if let Some(limit) = challenge.participant_limit {
            let joined = state
                .challenge_participants
                .iter()
                .filter(|p| p.challenge_id == challenge_id)
                .count();
            if joined as i32 >= limit {
                return Err(StorageError::validation("Challenge is full"));
            }
        }
        if state
            .challenge_participants
            .iter()
            .any(|p| p.challenge_id == challenge_id && p.user_id == user_id)
        {
            return Err(StorageError::validation("Already joined this challenge"));
        }
        let participation = ChallengeParticipant {
            id: state.next_id(),
            challenge_id,
            user_id,
            current_progress: "0.00".to_owned(),
            is_completed: false,
            completed_at: None,
            rank: None,
            joined_at: Utc::now(),
        };
        state.challenge_participants.push(participation.clone());
        Ok(participation)
    }

    async fn seasonal_challenges_for_user(
        &self,
        user_id: i64,
    ) -> StorageResult<Vec<ChallengeParticipant>> {
        let state = self.state.lock().await;
        Ok(state
            .challenge_participants
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_challenge_progress(
        &self,
        challenge_id: i64,
        user_id: i64,
        progress: String,
    ) -> StorageResult<ChallengeParticipant> {
        let mut state = self.state.lock().await;
        let participation = state
            .challenge_participants
            .iter_mut()
            .find(|p| p.challenge_id == challenge_id && p.user_id == user_id)
            .ok_or(StorageError::NotFound("challenge participation"))?;
        participation.current_progress = progress;
        Ok(participation.clone())
    }

    async fn achievements(&self, category: Option<&str>) -> StorageResult<Vec<Achievement>> {
        let state = self.state.lock().await;
        Ok(state
            .achievements
            .iter()
            .filter(|a| a.is_active && category.map_or(true, |c| a.category.as_deref() == Some(c)))
            .cloned()
            .collect())
    }

    async fn achievements_for_user(&self, user_id: i64) -> StorageResult<Vec<UserAchievement>> {
        let state = self.state.lock().await;
        Ok(state
            .user_achievements
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn award_achievement(
        &self,
        user_id: i64,
        achievement_id: i64,
    ) -> StorageResult<UserAchievement> {
        let mut state = self.state.lock().await;
        // Awarding twice is a no-op.
        if let Some(existing) = state
            .user_achievements
            .iter()
            .find(|a| a.user_id == user_id && a.achievement_id == achievement_id)
        {
            return Ok(existing.clone());
        }
        let now = Utc::now();
        let awarded = UserAchievement {
            id: state.next_id(),
            user_id,
            achievement_id,
            progress: "100.00".to_owned(),
            is_unlocked: true,
            unlocked_at: Some(now),
            is_completed: true,
            completed_at: Some(now),
        };
        state.user_achievements.push(awarded.clone());
        Ok(awarded)
    }

    async fn rewards(&self, category: Option<&str>) -> StorageResult<Vec<Reward>> {
        let state = self.state.lock().await;
        Ok(state
            .rewards
            .iter()
            .filter(|r| r.is_active && category.map_or(true, |c| r.category.as_deref() == Some(c)))
            .cloned()
            .collect())
    }

    async fn rewards_for_user(&self, user_id: i64) -> StorageResult<Vec<UserReward>> {
        let state = self.state.lock().await;
        Ok(state
            .user_rewards
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn redeem_reward(
        &self,
        user_id: i64,
        reward_id: i64,
        points_spent: i32,
        coins_spent: i32,
    ) -> StorageResult<UserReward> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let redemption = UserReward {
            id: state.next_id(),
            user_id,
            reward_id,
            points_spent,
            coins_spent,
            status: "active".to_owned(),
            redemption_code: super::redemption_code(),
            expires_at: Some(now + Duration::days(30)),
            used_at: None,
            redeemed_at: now,
        };
        state.user_rewards.push(redemption.clone());
        Ok(redemption)
    }

    async fn create_team(&self, captain_id: i64, new: NewTeam) -> StorageResult<Team> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let team = Team {
            id: state.next_id(),
            name: new.name,
            description: new.description,
            r#type: new.r#type,
            captain_id,
            total_savings: "0.00".to_owned(),
            member_count: 1,
            max_members: new.max_members.unwrap_or(50),
            is_active: true,
            created_at: now,
        };
        let membership = TeamMember {
            id: state.next_id(),
            team_id: team.id,
            user_id: captain_id,
            role: "captain".to_owned(),
            joined_at: now,
            contributed_amount: "0.00".to_owned(),
        };
        state.teams.push(team.clone());
        state.team_members.push(membership);
        Ok(team)
    }

    async fn teams(&self, team_type: Option<&str>) -> StorageResult<Vec<Team>> {
        let state = self.state.lock().await;
        Ok(state
            .teams
            .iter()
            .filter(|t| t.is_active && team_type.map_or(true, |ty| t.r#type == ty))
            .cloned()
            .collect())
    }

    async fn join_team(&self, team_id: i64, user_id: i64) -> StorageResult<TeamMember> {
        let mut state = self.state.lock().await;
        let team = state
            .teams
            .iter()
            .find(|t| t.id == team_id)
            .ok_or(StorageError::NotFound("team"))?;
        if team.member_count >= team.max_members {
            return Err(StorageError::validation("Team is full"));
        }
        if state
            .team_members
            .iter()
            .any(|m| m.team_id == team_id && m.user_id == user_id)
        {
            return Err(StorageError::validation("Already a member of this team"));
        }
        let membership = TeamMember {
            id: state.next_id(),
            team_id,
            user_id,
            role: "member".to_owned(),
            joined_at: Utc::now(),
            contributed_amount: "0.00".to_owned(),
        };
        state.team_members.push(membership.clone());
        if let Some(team) = state.teams.iter_mut().find(|t| t.id == team_id) {
            team.member_count += 1;
        }
        Ok(membership)
    }

    async fn teams_for_user(&self, user_id: i64) -> StorageResult<Vec<Team>> {
        let state = self.state.lock().await;
        Ok(state
            .teams
            .iter()
            .filter(|t| {
                state
                    .team_members
                    .iter()
                    .any(|m| m.team_id == t.id && m.user_id == user_id)
            })
            .cloned()
            .collect())
    }

    async fn create_community(
        &self,
        created_by: i64,
        new: NewCommunity,
    ) -> StorageResult<Community> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let community = Community {
            id: state.next_id(),
            name: new.name,
            description: new.description,
            category: new.category,
            created_by,
            member_count: 1,
            is_public: new.is_public.unwrap_or(true),
            image_url: new.image_url,
            rules: new.rules,
            created_at: now,
        };
        let membership = CommunityMember {
            id: state.next_id(),
            community_id: community.id,
            user_id: created_by,
            role: "admin".to_owned(),
            joined_at: now,
        };
        state.communities.push(community.clone());
        state.community_members.push(membership);
        Ok(community)
    }

    async fn communities(
        &self,
        category: Option<&str>,
        public_only: Option<bool>,
    ) -> StorageResult<Vec<Community>> {
        let state = self.state.lock().await;
        Ok(state
            .communities
            .iter()
            .filter(|c| {
                category.map_or(true, |cat| c.category == cat)
                    && (!public_only.unwrap_or(false) || c.is_public)
            })
            .cloned()
            .collect())
    }

    async fn join_community(
        &self,
        community_id: i64,
        user_id: i64,
    ) -> StorageResult<CommunityMember> {
        let mut state = self.state.lock().await;
        if state.communities.iter().all(|c| c.id != community_id) {
            return Err(StorageError::NotFound("community"));
        }
        if state
            .community_members
            .iter()
            .any(|m| m.community_id == community_id && m.user_id == user_id)
        {
            return Err(StorageError::validation(
                "Already a member of this community",
            ));
        }
        let membership = CommunityMember {
            id: state.next_id(),
            community_id,
            user_id,
            role: "member".to_owned(),
            joined_at: Utc::now(),
        };
        state.community_members.push(membership.clone());
        if let Some(community) = state.communities.iter_mut().find(|c| c.id == community_id) {
            community.member_count += 1;
        }
        Ok(membership)
    }

    async fn create_group_goal(
        &self,
        created_by: i64,
        new: NewGroupGoal,
    ) -> StorageResult<GroupGoal> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let goal = GroupGoal {
            id: state.next_id(),
            name: new.name,
            description: new.description,
            target_amount: new.target_amount,
            current_amount: "0.00".to_owned(),
            target_date: new.target_date,
            category: new.category,
            created_by,
            is_active: true,
            is_public: new.is_public.unwrap_or(false),
            member_limit: new.member_limit.unwrap_or(10),
            created_at: now,
            completed_at: None,
        };
        let membership = GroupGoalMember {
            id: state.next_id(),
            goal_id: goal.id,
            user_id: created_by,
            contributed_amount: "0.00".to_owned(),
            target_contribution: None,
            joined_at: now,
        };
        state.group_goals.push(goal.clone());
        state.group_goal_members.push(membership);
        Ok(goal)
    }

    async fn group_goals(
        &self,
        category: Option<&str>,
        public_only: Option<bool>,
    ) -> StorageResult<Vec<GroupGoal>> {
        let state = self.state.lock().await;
        Ok(state
            .group_goals
            .iter()
            .filter(|g| {
                g.is_active
                    && category.map_or(true, |c| g.category.as_deref() == Some(c))
                    && (!public_only.unwrap_or(false) || g.is_public)
            })
            .cloned()
            .collect())
    }

    async fn join_group_goal(
        &self,
        goal_id: i64,
        user_id: i64,
        contributed: Option<String>,
    ) -> StorageResult<GroupGoalMember> {
        let mut state = self.state.lock().await;
        let goal = state
            .group_goals
            .iter()
            .find(|g| g.id == goal_id)
            .ok_or(StorageError::NotFound("group goal"))?;
        let members = state
            .group_goal_members
            .iter()
            .filter(|m| m.goal_id == goal_id)
            .count();
        if members as i32 >= goal.member_limit {
            return Err(StorageError::validation("Group goal is full"));
        }
        if state
            .group_goal_members
            .iter()
            .any(|m| m.goal_id == goal_id && m.user_id == user_id)
        {
            return Err(StorageError::validation("Already joined this goal"));
        }
        let membership = GroupGoalMember {
            id: state.next_id(),
            goal_id,
            user_id,
            contributed_amount: zero(contributed),
            target_contribution: None,
            joined_at: Utc::now(),
        };
        state.group_goal_members.push(membership.clone());
        Ok(membership)
    }

    async fn group_goals_for_user(&self, user_id: i64) -> StorageResult<Vec<GroupGoal>> {
        let state = self.state.lock().await;
        Ok(state
            .group_goals
            .iter()
            .filter(|g| {
                state
                    .group_goal_members
                    .iter()
                    .any(|m| m.goal_id == g.id && m.user_id == user_id)
            })
            .cloned()
            .collect())
    }

    async fn create_mentorship(
        &self,
        mentor_id: i64,
        new: NewMentorship,
    ) -> StorageResult<Mentorship> {
        let mut state = self.state.lock().await;
        if mentor_id == new.mentee_id {
            return Err(StorageError::validation("Cannot mentor yourself"));
        }
        if state
            .mentorships
            .iter()
            .any(|m| m.mentor_id == mentor_id && m.mentee_id == new.mentee_id)
        {
            return Err(StorageError::validation("Mentorship already exists"));
        }
        let mentorship = Mentorship {
            id: state.next_id(),
            mentor_id,
            mentee_id: new.mentee_id,
            status: "pending".to_owned(),
            specialization: new.specialization,
            started_at: Utc::now(),
            ended_at: None,
        };
        state.mentorships.push(mentorship.clone());
        Ok(mentorship)
    }

    async fn mentorships(&self, status: Option<&str>) -> StorageResult<Vec<Mentorship>> {
        let state = self.state.lock().await;
        Ok(state
            .mentorships
            .iter()
            .filter(|m| status.map_or(true, |s| m.status == s))
            .cloned()
            .collect())
    }

    async fn mentorships_for_user(
        &self,
        user_id: i64,
        role: Option<&str>,
    ) -> StorageResult<Vec<Mentorship>> {
        let state = self.state.lock().await;
        Ok(state
            .mentorships
            .iter()
            .filter(|m| match role {
                Some("mentor") => m.mentor_id == user_id,
                Some("mentee") => m.mentee_id == user_id,
                _ => m.mentor_id == user_id || m.mentee_id == user_id,
            })
            .cloned()
            .collect())
    }

    async fn accept_mentorship(
        &self,
        mentorship_id: i64,
        mentee_id: i64,
    ) -> StorageResult<Option<Mentorship>> {
        let mut state = self.state.lock().await;
        let mentorship = state
            .mentorships
            .iter_mut()
            .find(|m| m.id == mentorship_id)
            .ok_or(StorageError::NotFound("mentorship"))?;
        if mentorship.mentee_id != mentee_id {
            return Ok(None);
        }
        mentorship.status = "active".to_owned();
        Ok(Some(mentorship.clone()))
    }

    async fn create_budget(&self, user_id: i64, new: NewBudget) -> StorageResult<Budget> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let budget = Budget {
            id: state.next_id(),
            user_id,
            category: new.category,
            monthly_limit: new.monthly_limit,
            current_spent: "0.00".to_owned(),
            alert_threshold: new.alert_threshold.unwrap_or_else(|| "0.80".to_owned()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.budgets.push(budget.clone());
        Ok(budget)
    }

    async fn budgets_for_user(&self, user_id: i64) -> StorageResult<Vec<Budget>> {
        let state = self.state.lock().await;
        Ok(state
            .budgets
            .iter()
            .filter(|b| b.user_id == user_id && b.is_active)
            .cloned()
            .collect())
    }

    async fn get_budget(&self, id: i64) -> StorageResult<Option<Budget>> {
        let state = self.state.lock().await;
        Ok(state.budgets.iter().find(|b| b.id == id).cloned())
    }

    async fn update_budget(&self, id: i64, update: BudgetUpdate) -> StorageResult<Budget> {
        let mut state = self.state.lock().await;
        let budget = state
            .budgets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StorageError::NotFound("budget"))?;
        if let Some(v) = update.monthly_limit {
            budget.monthly_limit = v;
        }
        if let Some(v) = update.current_spent {
            budget.current_spent = v;
        }
        if let Some(v) = update.alert_threshold {
            budget.alert_threshold = v;
        }
        if let Some(v) = update.is_active {
            budget.is_active = v;
        }
        budget.updated_at = Utc::now();
        Ok(budget.clone())
    }

    async fn financial_health_for_user(
        &self,
        user_id: i64,
    ) -> StorageResult<Option<FinancialHealth>> {
        let state = self.state.lock().await;
        Ok(state
            .financial_health
            .iter()
            .find(|h| h.user_id == user_id)
            .cloned())
    }

    async fn upsert_financial_health(
        &self,
        user_id: i64,
        scores: HealthScores,
    ) -> StorageResult<FinancialHealth> {
        let mut state = self.state.lock().await;
        let id = state
            .financial_health
            .iter()
            .find(|h| h.user_id == user_id)
            .map(|h| h.id);
        let id = match id {
            Some(id) => id,
            None => state.next_id(),
        };
        let health = FinancialHealth {
            id,
            user_id,
            overall_score: scores.overall_score,
            savings_score: scores.savings_score,
            spending_score: scores.spending_score,
            investment_score: scores.investment_score,
            budget_score: scores.budget_score,
            streak_score: scores.streak_score,
            calculated_at: Utc::now(),
            recommendations: scores.recommendations,
            trends: scores.trends,
        };
        state.financial_health.retain(|h| h.user_id != user_id);
        state.financial_health.push(health.clone());
        Ok(health)
    }

    async fn education_modules(
        &self,
        category: Option<&str>,
    ) -> StorageResult<Vec<EducationModule>> {
        let state = self.state.lock().await;
        Ok(state
            .education_modules
            .iter()
            .filter(|m| m.is_active && category.map_or(true, |c| m.category == c))
            .cloned()
            .collect())
    }

    async fn education_progress_for_user(
        &self,
        user_id: i64,
    ) -> StorageResult<Vec<EducationProgress>> {
        let state = self.state.lock().await;
        Ok(state
            .education_progress
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_education_progress(
        &self,
        user_id: i64,
        module_id: i64,
        progress: i32,
    ) -> StorageResult<EducationProgress> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let completed = progress >= 100;
        if let Some(existing) = state
            .education_progress
            .iter_mut()
            .find(|p| p.user_id == user_id && p.module_id == module_id)
        {
            existing.progress = progress;
            existing.is_completed = completed;
            existing.completed_at = if completed { Some(now) } else { None };
            existing.last_accessed_at = now;
            existing.time_spent += 1;
            return Ok(existing.clone());
        }
        let record = EducationProgress {
            id: state.next_id(),
            user_id,
            module_id,
            progress,
            is_completed: completed,
            completed_at: if completed { Some(now) } else { None },
            last_accessed_at: now,
            time_spent: 1,
        };
        state.education_progress.push(record.clone());
        Ok(record)
    }

    async fn create_bank_account(
        &self,
        user_id: i64,
        new: NewBankAccount,
    ) -> StorageResult<BankAccount> {
        let mut state = self.state.lock().await;
        let account = BankAccount {
            id: state.next_id(),
            user_id,
            bank_name: new.bank_name,
            account_type: new.account_type,
            account_number: new.account_number,
            balance: new.balance,
            is_active: true,
            is_primary: new.is_primary.unwrap_or(false),
            last_sync_at: None,
            created_at: Utc::now(),
        };
        state.bank_accounts.push(account.clone());
        Ok(account)
    }

    async fn bank_accounts_for_user(&self, user_id: i64) -> StorageResult<Vec<BankAccount>> {
        let state = self.state.lock().await;
        Ok(state
            .bank_accounts
            .iter()
            .filter(|a| a.user_id == user_id && a.is_active)
            .cloned()
            .collect())
    }

    async fn create_bill_split(
        &self,
        created_by: i64,
        new: NewBillSplit,
    ) -> StorageResult<BillSplit> {
        let mut state = self.state.lock().await;
        let split = BillSplit {
            id: state.next_id(),
            created_by,
            title: new.title,
            total_amount: new.total_amount,
            description: new.description,
            r#type: new.r#type.unwrap_or_else(|| "equal".to_owned()),
            status: "pending".to_owned(),
            due_date: new.due_date,
            created_at: Utc::now(),
        };
        state.bill_splits.push(split.clone());
        Ok(split)
    }

    async fn bill_splits_for_user(&self, user_id: i64) -> StorageResult<Vec<BillSplit>> {
        let state = self.state.lock().await;
        Ok(state
            .bill_splits
            .iter()
            .filter(|s| {
                s.created_by == user_id
                    || state
                        .bill_split_members
                        .iter()
                        .any(|m| m.bill_id == s.id && m.user_id == user_id)
            })
            .cloned()
            .collect())
    }

    async fn join_bill_split(
        &self,
        bill_id: i64,
        user_id: i64,
        owed_amount: String,
    ) -> StorageResult<BillSplitMember> {
        let mut state = self.state.lock().await;
        if state.bill_splits.iter().all(|s| s.id != bill_id) {
            return Err(StorageError::NotFound("bill split"));
        }
        if state
            .bill_split_members
            .iter()
            .any(|m| m.bill_id == bill_id && m.user_id == user_id)
        {
            return Err(StorageError::validation("Already part of this bill split"));
        }
        let member = BillSplitMember {
            id: state.next_id(),
            bill_id,
            user_id,
            owed_amount,
            paid_amount: "0.00".to_owned(),
            status: "pending".to_owned(),
            paid_at: None,
        };
        state.bill_split_members.push(member.clone());
        Ok(member)
    }

    async fn create_scheduled_payment(
        &self,
        user_id: i64,
        new: NewScheduledPayment,
    ) -> StorageResult<ScheduledPayment> {
        let mut state = self.state.lock().await;
        let payment = ScheduledPayment {
            id: state.next_id(),
            user_id,
            title: new.title,
            amount: new.amount,
            recipient_upi: new.recipient_upi,
            frequency: new.frequency,
            next_payment_date: new.next_payment_date,
            end_date: new.end_date,
            is_active: true,
            auto_execute: new.auto_execute.unwrap_or(false),
            created_at: Utc::now(),
        };
        state.scheduled_payments.push(payment.clone());
        Ok(payment)
    }

    async fn scheduled_payments_for_user(
        &self,
        user_id: i64,
    ) -> StorageResult<Vec<ScheduledPayment>> {
        let state = self.state.lock().await;
        Ok(state
            .scheduled_payments
            .iter()
            .filter(|p| p.user_id == user_id && p.is_active)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_owned(),
            username: "tester".to_owned(),
            name: "Test User".to_owned(),
            password: Some("hunter2".to_owned()),
            upi_id: None,
            total_savings: None,
            today_round_up: None,
            current_streak: None,
            profile_picture: None,
        }
    }

    #[tokio::test]
    async fn ids_are_shared_across_entity_types() {
        let store = MemoryStorage::new();
        let user = store.create_user(new_user("a@b.c")).await.unwrap();
        let tx = store
            .create_transaction(
                user.id,
                NewTransaction {
                    r#type: "payment".to_owned(),
                    amount: "10.00".to_owned(),
                    original_amount: None,
                    round_up_amount: None,
                    payee: None,
                    upi_id: None,
                    note: None,
                    status: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(tx.id, 2);
    }

    #[tokio::test]
    async fn create_user_requires_password() {
        let store = MemoryStorage::new();
        let mut user = new_user("a@b.c");
        user.password = None;
        let err = store.create_user(user).await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }

    #[tokio::test]
    async fn login_checks_password_against_hash() {
        let store = MemoryStorage::new();
        store.create_user(new_user("a@b.c")).await.unwrap();

        let ok = store.verify_login("a@b.c", "hunter2").await.unwrap();
        assert!(ok.is_some());
        let bad = store.verify_login("a@b.c", "wrong").await.unwrap();
        assert!(bad.is_none());
        let unknown = store.verify_login("no@such.user", "hunter2").await.unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn badge_put_creates_then_updates() {
        let store = MemoryStorage::new();
        store.set_badge_earned(1, "first_save", true).await.unwrap();
        let badges = store.badges_for_user(1).await.unwrap();
        assert_eq!(badges.len(), 1);
        assert!(badges[0].earned);
        assert!(badges[0].earned_at.is_some());

        store.set_badge_earned(1, "first_save", false).await.unwrap();
        let badges = store.badges_for_user(1).await.unwrap();
        assert_eq!(badges.len(), 1);
        assert!(!badges[0].earned);
        assert!(badges[0].earned_at.is_none());
    }

    #[tokio::test]
    async fn streak_upsert_creates_one_row_per_type() {
        let store = MemoryStorage::new();
        let update = StreakUpdate {
            current_streak: Some(3),
            ..StreakUpdate::default()
        };
        store.upsert_streak(1, "savings", update.clone()).await.unwrap();
        let again = store.upsert_streak(1, "savings", update).await.unwrap();
        assert_eq!(again.current_streak, 3);
        assert_eq!(store.streaks_for_user(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn education_progress_completes_at_hundred() {
        let store = MemoryStorage::new();
        let p1 = store.update_education_progress(1, 7, 40).await.unwrap();
        assert!(!p1.is_completed);
        assert_eq!(p1.time_spent, 1);

        let p2 = store.update_education_progress(1, 7, 100).await.unwrap();
        assert!(p2.is_completed);
        assert!(p2.completed_at.is_some());
        assert_eq!(p2.time_spent, 2);
        assert_eq!(p2.id, p1.id);
    }

    #[tokio::test]
    async fn transactions_listed_newest_first_with_limit() {
        let store = MemoryStorage::new();
        for i in 0..3 {
            store
                .create_transaction(
                    1,
                    NewTransaction {
                        r#type: "payment".to_owned(),
                        amount: format!("{i}.00"),
                        original_amount: None,
                        round_up_amount: None,
                        payee: None,
                        upi_id: None,
                        note: None,
                        status: None,
                    },
                )
                .await
                .unwrap();
        }
        let rows = store.transactions_for_user(1, Some(2)).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].created_at >= rows[1].created_at);
    }

    #[tokio::test]
    async fn team_create_seats_the_captain() {
        let store = MemoryStorage::new();
        let team = store
            .create_team(
                5,
                NewTeam {
                    name: "Savers".to_owned(),
                    r#type: "friends".to_owned(),
                    description: None,
                    max_members: Some(2),
                },
            )
            .await
            .unwrap();
        assert_eq!(team.member_count, 1);
        assert_eq!(store.teams_for_user(5).await.unwrap().len(), 1);

        store.join_team(team.id, 6).await.unwrap();
        let err = store.join_team(team.id, 7).await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }

    #[tokio::test]
    async fn only_the_named_mentee_can_accept() {
        let store = MemoryStorage::new();
        let m = store
            .create_mentorship(
                1,
                NewMentorship {
                    mentee_id: 2,
                    specialization: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(m.status, "pending");

        assert!(store.accept_mentorship(m.id, 3).await.unwrap().is_none());
        let accepted = store.accept_mentorship(m.id, 2).await.unwrap().unwrap();
        assert_eq!(accepted.status, "active");
    }
}

//! Per-action orchestration: optional model call, normalization, record
//! assembly, persistence and the reward credit.
//!
//! Every entry point persists its record before crediting, so a failure in
//! between leaves the user under-credited and never over-credited.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use guardian_ai::prompts::{self, MEDICAL_MAX_TOKENS, MOOD_MAX_TOKENS, WORKOUT_MAX_TOKENS};
use guardian_ai::{AiGateway, GatewayRequest, ImageAttachment, ResponseNormalizer};
use guardian_common::models::{
    AnalysisRecord, CompletionTransition, ExpectedShape, NormalizedPayload, PersonalityTraits,
    RecordKind, RewardReason, StoredRecord,
};
use guardian_common::traits::{RecordRepository, UserStore};
use guardian_common::Error;

use crate::services::archetype::{self, Archetype};
use crate::services::ledger::RewardLedger;
use crate::services::records::{MoodEnrichment, RecordFactory, RecordInput};
use crate::services::rewards::RewardPolicy;
use crate::services::workouts;

pub const MEDICAL_DISCLAIMER: &str = "GuardianChain insights are AI-generated and do not replace professional medical advice. Please consult a healthcare provider.";

pub const MEDICAL_HISTORY_LIMIT: i64 = 10;
pub const MOOD_HISTORY_LIMIT: i64 = 30;
pub const WORKOUT_HISTORY_LIMIT: i64 = 20;
pub const ACTIVITY_HISTORY_LIMIT: i64 = 30;

/// What happens to a unit of work when the model call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiRequirement {
    /// The model output is the product; failure aborts before anything is stored.
    Required,
    /// The model output only enriches the record; failure falls back to defaults.
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    MedicalAnalysis,
    MoodLog,
    WorkoutGeneration,
    WorkoutCompletion,
    StepActivity,
    PersonalityQuiz,
}

impl ActionKind {
    /// `None` for actions that never call the model.
    pub fn ai_requirement(&self) -> Option<AiRequirement> {
        match self {
            ActionKind::MedicalAnalysis => Some(AiRequirement::Required),
            ActionKind::MoodLog | ActionKind::WorkoutGeneration => Some(AiRequirement::Optional),
            ActionKind::WorkoutCompletion | ActionKind::StepActivity | ActionKind::PersonalityQuiz => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::MedicalAnalysis => "medical_analysis",
            ActionKind::MoodLog => "mood_log",
            ActionKind::WorkoutGeneration => "workout_generation",
            ActionKind::WorkoutCompletion => "workout_completion",
            ActionKind::StepActivity => "step_activity",
            ActionKind::PersonalityQuiz => "personality_quiz",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct MedicalImageInput {
    pub image_type: String,
    pub image: Option<ImageAttachment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodInput {
    pub mood: String,
    pub mood_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutRequest {
    pub workout_type: String,
    pub duration_minutes: Option<u32>,
    pub fitness_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityInput {
    pub steps: i64,
    pub date: Option<DateTime<Utc>>,
}

/// Raw quiz scores in question order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAnswers {
    pub answers: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub record_id: Uuid,
    pub record: AnalysisRecord,
    pub coins_earned: i64,
    pub new_balance: i64,
    pub narrative: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub workout_id: Uuid,
    /// False when the workout had already been completed; nothing is credited then.
    pub newly_completed: bool,
    pub coins_earned: i64,
    pub new_balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    pub archetype: Archetype,
    pub traits: PersonalityTraits,
    pub coins_earned: i64,
    pub new_balance: i64,
    pub description: String,
}

pub fn mood_reflection(sentiment: &str, theme: &str) -> String {
    format!(
        "I hear that you are feeling {}. It seems like {} is on your mind.",
        sentiment,
        theme.to_lowercase()
    )
}

pub struct AnalysisPipeline {
    gateway: Arc<dyn AiGateway>,
    records: Arc<dyn RecordRepository>,
    users: Arc<dyn UserStore>,
    ledger: RewardLedger,
    policy: RewardPolicy,
    normalizer: ResponseNormalizer,
    factory: RecordFactory,
}

impl AnalysisPipeline {
    pub fn new(
        gateway: Arc<dyn AiGateway>,
        records: Arc<dyn RecordRepository>,
        users: Arc<dyn UserStore>,
        policy: RewardPolicy,
    ) -> Self {
        Self {
            gateway,
            ledger: RewardLedger::new(users.clone()),
            records,
            users,
            policy,
            normalizer: ResponseNormalizer::new(),
            factory: RecordFactory::new(),
        }
    }

    pub fn ledger(&self) -> &RewardLedger {
        &self.ledger
    }

    pub async fn analyze_medical_image(
        &self,
        user_id: Uuid,
        input: MedicalImageInput,
    ) -> Result<PipelineOutcome, Error> {
        let action = ActionKind::MedicalAnalysis;
        let image_type = self.factory.image_type(&input.image_type)?;
        let Some(image) = input.image else {
            return Err(Error::validation("No image uploaded"));
        };
        self.factory.validate_image(&image)?;
        self.ensure_user(user_id).await?;

        let (prompt, shape) = prompts::medical_prompt(image_type);
        let request = GatewayRequest::with_image(prompt, image, MEDICAL_MAX_TOKENS);

        info!("[{}] user={} analyzing {} image", action, user_id, image_type);
        let payload = self.ask_model(action, user_id, &request, shape).await?;
        if !payload.is_structured() {
            warn!("[{}] user={} storing unstructured model output", action, user_id);
        }

        let coins = self.policy.fixed_award(RewardReason::MedicalAnalysis);
        let record = self.factory.build(
            user_id,
            RecordInput::Medical {
                image_type: image_type.as_str().to_string(),
                payload,
                coins_earned: coins,
            },
        )?;

        self.persist_and_credit(
            action,
            user_id,
            record,
            coins,
            RewardReason::MedicalAnalysis,
            Some(MEDICAL_DISCLAIMER.to_string()),
        )
        .await
    }

    pub async fn log_mood(&self, user_id: Uuid, input: MoodInput) -> Result<PipelineOutcome, Error> {
        let action = ActionKind::MoodLog;
        let (mood, mood_text) = self.factory.validate_mood(&input.mood, &input.mood_text)?;
        self.ensure_user(user_id).await?;

        let (prompt, shape) = prompts::mood_prompt(&mood_text);
        let request = GatewayRequest::text(prompt, MOOD_MAX_TOKENS);
        let enrichment = self
            .enrich_with_model(action, user_id, &request, shape)
            .await?
            .map(|payload| MoodEnrichment::from_payload(&payload))
            .unwrap_or_default();

        let reflection = mood_reflection(&enrichment.sentiment, &enrichment.theme);
        let record = self
            .factory
            .build(user_id, RecordInput::Mood { mood, mood_text, enrichment })?;

        let coins = self.policy.fixed_award(RewardReason::MoodLog);
        self.persist_and_credit(action, user_id, record, coins, RewardReason::MoodLog, Some(reflection))
            .await
    }

    pub async fn generate_workout(
        &self,
        user_id: Uuid,
        request: WorkoutRequest,
    ) -> Result<PipelineOutcome, Error> {
        let action = ActionKind::WorkoutGeneration;
        let workout_type = self.factory.workout_type(&request.workout_type)?;
        self.ensure_user(user_id).await?;

        let (prompt, shape) = prompts::workout_prompt(
            workout_type,
            request.duration_minutes,
            request.fitness_level.as_deref(),
        );
        let gateway_request = GatewayRequest::text(prompt, WORKOUT_MAX_TOKENS);
        let exercises = self
            .enrich_with_model(action, user_id, &gateway_request, shape)
            .await?
            .as_ref()
            .and_then(workouts::exercises_from_payload)
            .unwrap_or_else(|| {
                info!("[{}] user={} using the {} catalog", action, user_id, workout_type);
                workouts::default_exercises(workout_type)
            });

        let record = self.factory.build(
            user_id,
            RecordInput::Workout {
                workout_type: workout_type.as_str().to_string(),
                exercises,
            },
        )?;

        let coins = self.policy.fixed_award(RewardReason::WorkoutGenerated);
        self.persist_and_credit(action, user_id, record, coins, RewardReason::WorkoutGenerated, None)
            .await
    }

    /// Marks a workout done. Only the first completion is credited.
    pub async fn complete_workout(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
    ) -> Result<CompletionOutcome, Error> {
        let action = ActionKind::WorkoutCompletion;
        match self.records.mark_workout_completed(user_id, workout_id).await? {
            CompletionTransition::Completed => {
                let coins = self.policy.fixed_award(RewardReason::WorkoutCompleted);
                let new_balance = self
                    .credit_after_persist(action, user_id, workout_id, coins, RewardReason::WorkoutCompleted)
                    .await?;
                Ok(CompletionOutcome {
                    workout_id,
                    newly_completed: true,
                    coins_earned: coins,
                    new_balance,
                })
            }
            CompletionTransition::AlreadyCompleted => {
                info!("[{}] user={} workout {} was already completed", action, user_id, workout_id);
                Ok(CompletionOutcome {
                    workout_id,
                    newly_completed: false,
                    coins_earned: 0,
                    new_balance: self.ledger.balance(user_id).await?,
                })
            }
            CompletionTransition::NotFound => {
                Err(Error::NotFound(format!("Workout {} not found", workout_id)))
            }
        }
    }

    pub async fn log_activity(
        &self,
        user_id: Uuid,
        input: ActivityInput,
    ) -> Result<PipelineOutcome, Error> {
        let action = ActionKind::StepActivity;
        let steps = self.factory.validate_steps(input.steps)?;
        self.ensure_user(user_id).await?;

        let record = self
            .factory
            .build(user_id, RecordInput::Activity { steps: input.steps, date: input.date })?;
        let coins = self.policy.coins_for_steps(steps);

        self.persist_and_credit(action, user_id, record, coins, RewardReason::StepActivity, None)
            .await
    }

    /// Scores the quiz, stores traits and archetype, then awards the bonus.
    pub async fn submit_quiz(&self, user_id: Uuid, answers: QuizAnswers) -> Result<QuizOutcome, Error> {
        let action = ActionKind::PersonalityQuiz;
        let traits = self.factory.traits_from_answers(&answers.answers)?;
        let archetype = archetype::classify(&traits);

        self.users.record_quiz(user_id, &traits, archetype.tag()).await?;
        info!("[{}] user={} classified as {}", action, user_id, archetype);

        let coins = self.policy.fixed_award(RewardReason::QuizCompleted);
        let new_balance = self
            .credit_after_persist(action, user_id, user_id, coins, RewardReason::QuizCompleted)
            .await?;

        Ok(QuizOutcome {
            archetype,
            traits,
            coins_earned: coins,
            new_balance,
            description: archetype.description().to_string(),
        })
    }

    /// Stored archetype tag and its description, if the quiz was taken.
    pub async fn archetype_of(&self, user_id: Uuid) -> Result<Option<(String, &'static str)>, Error> {
        Ok(self
            .users
            .get_archetype(user_id)
            .await?
            .map(|tag| {
                let description = archetype::describe(&tag);
                (tag, description)
            }))
    }

    pub async fn history(
        &self,
        user_id: Uuid,
        kind: RecordKind,
        limit: i64,
    ) -> Result<Vec<StoredRecord>, Error> {
        self.records.find_by_user(user_id, kind, limit).await
    }

    pub async fn medical_history(&self, user_id: Uuid) -> Result<Vec<StoredRecord>, Error> {
        self.history(user_id, RecordKind::MedicalAnalysis, MEDICAL_HISTORY_LIMIT).await
    }

    pub async fn mood_history(&self, user_id: Uuid) -> Result<Vec<StoredRecord>, Error> {
        self.history(user_id, RecordKind::MoodLog, MOOD_HISTORY_LIMIT).await
    }

    pub async fn workout_history(&self, user_id: Uuid) -> Result<Vec<StoredRecord>, Error> {
        self.history(user_id, RecordKind::WorkoutSession, WORKOUT_HISTORY_LIMIT).await
    }

    pub async fn activity_history(&self, user_id: Uuid) -> Result<Vec<StoredRecord>, Error> {
        self.history(user_id, RecordKind::ActivityEntry, ACTIVITY_HISTORY_LIMIT).await
    }

    /// Unknown users fail here, before the model is called or anything is stored.
    async fn ensure_user(&self, user_id: Uuid) -> Result<(), Error> {
        self.ledger.balance(user_id).await.map(|_| ())
    }

    /// One model round trip whose output the action cannot do without.
    async fn ask_model(
        &self,
        action: ActionKind,
        user_id: Uuid,
        request: &GatewayRequest,
        shape: ExpectedShape,
    ) -> Result<NormalizedPayload, Error> {
        match self.gateway.invoke(request).await {
            Ok(raw) => Ok(self.normalizer.parse(&raw, shape)),
            Err(e) => {
                error!("[{}] user={} model call failed: {}", action, user_id, e);
                Err(e)
            }
        }
    }

    /// Like `ask_model`, but a gateway failure on an optional action yields
    /// `Ok(None)` so the caller can use its defaults. Other errors propagate.
    async fn enrich_with_model(
        &self,
        action: ActionKind,
        user_id: Uuid,
        request: &GatewayRequest,
        shape: ExpectedShape,
    ) -> Result<Option<NormalizedPayload>, Error> {
        match self.gateway.invoke(request).await {
            Ok(raw) => Ok(Some(self.normalizer.parse(&raw, shape))),
            Err(e)
                if e.is_gateway_failure()
                    && action.ai_requirement() == Some(AiRequirement::Optional) =>
            {
                warn!("[{}] user={} model call skipped: {}", action, user_id, e);
                Ok(None)
            }
            Err(e) => {
                error!("[{}] user={} model call failed: {}", action, user_id, e);
                Err(e)
            }
        }
    }

    async fn persist_and_credit(
        &self,
        action: ActionKind,
        user_id: Uuid,
        record: AnalysisRecord,
        coins: i64,
        reason: RewardReason,
        narrative: Option<String>,
    ) -> Result<PipelineOutcome, Error> {
        let record_id = self.records.insert(&record).await.map_err(|e| {
            error!("[{}] user={} failed to store {}: {}", action, user_id, record.kind().as_str(), e);
            e
        })?;
        info!("[{}] user={} stored {} {}", action, user_id, record.kind().as_str(), record_id);

        let new_balance = self
            .credit_after_persist(action, user_id, record_id, coins, reason)
            .await?;

        Ok(PipelineOutcome {
            record_id,
            record,
            coins_earned: coins,
            new_balance,
            narrative,
        })
    }

    async fn credit_after_persist(
        &self,
        action: ActionKind,
        user_id: Uuid,
        record_id: Uuid,
        coins: i64,
        reason: RewardReason,
    ) -> Result<i64, Error> {
        self.ledger.credit(user_id, coins, reason).await.map_err(|e| {
            error!(
                "[{}] user={} {} is stored but the {} coin credit failed: {}",
                action, user_id, record_id, coins, e
            );
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_per_action() {
        assert_eq!(ActionKind::MedicalAnalysis.ai_requirement(), Some(AiRequirement::Required));
        assert_eq!(ActionKind::MoodLog.ai_requirement(), Some(AiRequirement::Optional));
        assert_eq!(ActionKind::WorkoutGeneration.ai_requirement(), Some(AiRequirement::Optional));
        assert_eq!(ActionKind::StepActivity.ai_requirement(), None);
    }

    #[test]
    fn reflection_lowercases_theme() {
        assert_eq!(
            mood_reflection("neutral", "General wellbeing"),
            "I hear that you are feeling neutral. It seems like general wellbeing is on your mind."
        );
    }
}

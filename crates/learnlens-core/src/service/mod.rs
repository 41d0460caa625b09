//! Response composition
//!
//! Ties the classifier, the analytics engine, and the LLM client together:
//! classify the query, run the selected aggregation, embed the results in a
//! prompt, and return the model's prose answer next to the raw aggregate data.

use crate::analytics::charts::ChartGroup;
use crate::analytics::{AnalyticsEngine, DatabaseStats};
use crate::error::{Error, Result};
use crate::intent::{IntentClassifier, IntentKind, QueryIntent};
use crate::llm::{LlmClient, Message};
use crate::storage::Database;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Default bound on the conversation turn history
pub const DEFAULT_MAX_TURNS: usize = 20;

/// One completed query/reply exchange
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub query: String,
    pub reply: String,
}

/// Size-bounded conversation history, owned by the caller
///
/// Pushing beyond the bound evicts the oldest turn, so the history cannot
/// grow without limit across a long session.
#[derive(Debug, Clone)]
pub struct TurnHistory {
    max_turns: usize,
    turns: VecDeque<Turn>,
}

impl Default for TurnHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

impl TurnHistory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns: max_turns.max(1),
            turns: VecDeque::new(),
        }
    }

    /// Append a turn, evicting the oldest when at capacity
    pub fn push(&mut self, turn: Turn) {
        while self.turns.len() >= self.max_turns {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render the history as alternating user/assistant messages
    pub fn as_messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.turns.len() * 2);
        for turn in &self.turns {
            messages.push(Message::user(&turn.query));
            messages.push(Message::assistant(&turn.reply));
        }
        messages
    }
}

/// Metadata returned with every answer
#[derive(Debug, Clone, Serialize)]
pub struct AnswerMetadata {
    pub database_stats: DatabaseStats,
    pub analytics_data: Value,
}

/// The composed answer to a free-text analytics query
#[derive(Debug, Clone, Serialize)]
pub struct QueryAnswer {
    /// Prose reply from the chat model
    pub response: String,
    /// The aggregate chosen by the classifier (empty object when none matched)
    pub data: Value,
    /// Representative chart for the chosen aggregation, if any ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization: Option<Value>,
    pub metadata: AnswerMetadata,
}

/// Analytics query service
///
/// One instance per process; all handles are cheap to clone.
#[derive(Debug)]
pub struct AnalyticsService {
    engine: AnalyticsEngine,
    classifier: IntentClassifier,
    llm: LlmClient,
}

impl AnalyticsService {
    pub fn new(db: Database, llm: LlmClient) -> Self {
        Self {
            engine: AnalyticsEngine::new(db),
            classifier: IntentClassifier::new(),
            llm,
        }
    }

    /// Access the underlying analytics engine
    pub fn engine(&self) -> &AnalyticsEngine {
        &self.engine
    }

    /// Answer a free-text analytics query
    ///
    /// Rejects empty queries before any processing. On success the completed
    /// turn is appended to `history`.
    pub async fn answer(&self, query: &str, history: &mut TurnHistory) -> Result<QueryAnswer> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("No query provided".to_string()));
        }

        let stats = self.engine.database_stats().await?;
        let intent = self.classifier.classify(query);

        let (data, visualization) = self.run_aggregation(intent.as_ref()).await?;

        let prompt = build_prompt(&stats, &data, query);
        debug!(prompt_chars = prompt.len(), "Composed analytics prompt");

        let mut messages = vec![Message::system(SYSTEM_PROMPT)];
        messages.extend(history.as_messages());
        messages.push(Message::user(prompt));

        let reply = self.llm.complete(messages, None).await?;
        info!(
            model = %reply.model,
            tokens = reply.tokens_used,
            intent = ?intent.as_ref().map(|i| i.kind),
            "Analytics query answered"
        );

        history.push(Turn {
            query: query.to_string(),
            reply: reply.content.clone(),
        });

        Ok(QueryAnswer {
            response: reply.content,
            data: data.clone(),
            visualization,
            metadata: AnswerMetadata {
                database_stats: stats,
                analytics_data: data,
            },
        })
    }

    /// Run the aggregation selected by the classifier, if any
    ///
    /// Returns the serialized aggregate data and the representative chart.
    async fn run_aggregation(
        &self,
        intent: Option<&QueryIntent>,
    ) -> Result<(Value, Option<Value>)> {
        let Some(intent) = intent else {
            return Ok((json!({}), None));
        };

        let parameter = intent.parameter.as_deref();
        match intent.kind {
            IntentKind::BadgeEnrollments => {
                let report = self.engine.badge_enrollments(parameter).await?;
                let chart = report
                    .charts
                    .get(ChartGroup::BadgeEnrollments.representative())
                    .cloned();
                Ok((json!(report.data), chart))
            }
            IntentKind::OrganizationTrends => {
                let report = self.engine.organization_trends(parameter).await?;
                let chart = report
                    .charts
                    .get(ChartGroup::OrganizationTrends.representative())
                    .cloned();
                Ok((json!(report.data), chart))
            }
            IntentKind::CompletionMetrics => {
                let report = self.engine.completion_metrics().await?;
                let chart = report
                    .charts
                    .get(ChartGroup::CompletionMetrics.representative())
                    .cloned();
                Ok((json!(report.data), chart))
            }
            IntentKind::LearningPaths => {
                let report = self.engine.learning_paths().await?;
                let chart = report
                    .charts
                    .get(ChartGroup::LearningPaths.representative())
                    .cloned();
                Ok((json!(report.data), chart))
            }
        }
    }
}

const SYSTEM_PROMPT: &str = "You are an analytics assistant for a badge enrollment platform. \
Answer questions using the aggregate data provided with each query. \
Be concise and cite concrete numbers from the data.";

/// Build the prompt sent to the chat model
fn build_prompt(stats: &DatabaseStats, analytics_data: &Value, query: &str) -> String {
    let data_json =
        serde_json::to_string_pretty(analytics_data).unwrap_or_else(|_| "{}".to_string());

    format!(
        "Based on the following data:\n\
         - Total Users: {}\n\
         - Total Badges: {}\n\
         - Total Enrollments: {}\n\
         - Total Organizations: {}\n\
         \n\
         Analytics Data:\n\
         {}\n\
         \n\
         Please analyze this query: {}",
        stats.total_users,
        stats.total_badges,
        stats.total_enrollments,
        stats.total_organizations,
        data_json,
        query
    )
}

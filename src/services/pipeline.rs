//! Emotion pipeline service.
//!
//! Text in, grounded prompt out: classify, detect crisis, normalize, map the
//! pet affect, build the history window, look up guidance and compose.

use crate::classifier::EmotionClassifier;
use crate::config::AimindConfig;
use crate::crisis::CrisisDetector;
use crate::emotion::{EmotionNormalizer, pet_affect};
use crate::history::{DEFAULT_MAX_PAIRS, build_window};
use crate::models::{
    CriticalEvent, EmotionAnalysis, ExtendedEmotion, Guidance, MessageId, PipelineOutput,
    PromptContext,
};
use crate::storage::{CriticalEventSink, GuidanceStore, MessageStore};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// The three store seams the pipeline talks to.
#[derive(Clone)]
pub struct PipelineStores {
    /// Conversation history.
    pub messages: Arc<dyn MessageStore>,
    /// Techniques and warnings per emotion.
    pub guidance: Arc<dyn GuidanceStore>,
    /// High-severity event sink.
    pub events: Arc<dyn CriticalEventSink>,
}

impl PipelineStores {
    /// Uses one backend for all three seams.
    #[must_use]
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: MessageStore + GuidanceStore + CriticalEventSink + 'static,
    {
        Self {
            messages: Arc::clone(&store) as Arc<dyn MessageStore>,
            guidance: Arc::clone(&store) as Arc<dyn GuidanceStore>,
            events: store,
        }
    }
}

/// Emotion analysis and prompt preparation for one message at a time.
///
/// Stateless between calls; safe to share across threads.
pub struct EmotionPipeline {
    classifier: Arc<dyn EmotionClassifier>,
    detector: CrisisDetector,
    normalizer: EmotionNormalizer,
    stores: PipelineStores,
    max_pairs: usize,
    request_affect_annotation: bool,
}

impl EmotionPipeline {
    /// Creates a pipeline with default detector, normalizer and window size.
    #[must_use]
    pub fn new(classifier: Arc<dyn EmotionClassifier>, stores: PipelineStores) -> Self {
        Self {
            classifier,
            detector: CrisisDetector::new(),
            normalizer: EmotionNormalizer::new(),
            stores,
            max_pairs: DEFAULT_MAX_PAIRS,
            request_affect_annotation: false,
        }
    }

    /// Creates a pipeline tuned by configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a configured threshold is out of range.
    pub fn from_config(
        config: &AimindConfig,
        classifier: Arc<dyn EmotionClassifier>,
        stores: PipelineStores,
    ) -> Result<Self> {
        let detector = CrisisDetector::new()
            .with_similarity_threshold(config.crisis.similarity_threshold)?
            .with_extra_patterns(&config.crisis.extra_patterns);
        let normalizer = EmotionNormalizer::new()
            .with_min_confidence(config.normalizer.min_confidence)?
            .with_combinations_first(config.normalizer.prefer_combinations);

        Ok(Self::new(classifier, stores)
            .with_detector(detector)
            .with_normalizer(normalizer)
            .with_max_pairs(config.history.max_pairs)
            .with_affect_annotation(config.prompt.request_affect_annotation))
    }

    /// Replaces the crisis detector.
    #[must_use]
    pub fn with_detector(mut self, detector: CrisisDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Replaces the emotion normalizer.
    #[must_use]
    pub const fn with_normalizer(mut self, normalizer: EmotionNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Sets the number of user/assistant pairs in the history window.
    #[must_use]
    pub const fn with_max_pairs(mut self, max_pairs: usize) -> Self {
        self.max_pairs = max_pairs;
        self
    }

    /// Appends the response-affect trailer to composed prompts.
    #[must_use]
    pub const fn with_affect_annotation(mut self, enabled: bool) -> Self {
        self.request_affect_annotation = enabled;
        self
    }

    /// Returns the store seams.
    #[must_use]
    pub const fn stores(&self) -> &PipelineStores {
        &self.stores
    }

    /// Classifies a message and normalizes its emotion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for blank text and
    /// [`Error::ClassifierUnavailable`] if the classifier cannot answer.
    #[instrument(skip(self, text), fields(classifier = self.classifier.name(), text_len = text.len()))]
    pub fn analyze(&self, text: &str) -> Result<EmotionAnalysis> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("message text is empty".to_string()));
        }

        let classification = self.classifier.classify(text)?;
        let crisis = self.detector.detect(text);
        let (emotion, rule) = self.normalizer.normalize_with_rule(&classification, crisis, text);
        let pet_affect = pet_affect(&classification);

        tracing::debug!(
            emotion = %emotion,
            rule = rule.as_str(),
            crisis,
            pet_affect = pet_affect.as_str(),
            "Message analyzed"
        );

        Ok(EmotionAnalysis {
            classification,
            crisis,
            emotion,
            rule,
            pet_affect,
        })
    }

    /// Builds the prompt for an analyzed message.
    ///
    /// `message_id` identifies the user message this prompt answers; it is
    /// attached to any critical event raised.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HistoryStore`] if the history cannot be read. Guidance
    /// and critical-event failures are logged and do not fail the call.
    #[instrument(skip_all, fields(user_id = %user_id, message_id = %message_id, emotion = %analysis.emotion))]
    pub fn prepare_with(
        &self,
        user_id: &str,
        analysis: &EmotionAnalysis,
        message_id: MessageId,
    ) -> Result<PipelineOutput> {
        let start = Instant::now();

        let history = build_window(self.stores.messages.as_ref(), user_id, self.max_pairs)?;
        let (techniques, warnings) = Guidance::resolve(self.lookup_guidance(&analysis.emotion));

        let context = PromptContext {
            history,
            emotion: analysis.emotion.clone(),
            techniques,
            warnings,
        };
        let prompt = context.render(self.request_affect_annotation);

        let critical_event = analysis.emotion.is_high_severity()
            && self.emit_critical_event(user_id, &message_id, &analysis.emotion);

        metrics::histogram!("pipeline_prepare_duration_ms")
            .record(start.elapsed().as_secs_f64() * 1000.0);

        Ok(PipelineOutput {
            message_id,
            prompt,
            emotion: context.emotion,
            pet_affect: analysis.pet_affect,
            crisis: analysis.crisis,
            critical_event,
        })
    }

    /// Analyzes a message and builds its prompt.
    ///
    /// The message itself is not part of the history window; callers persist
    /// it afterwards under the returned `message_id`.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::analyze`] and [`Self::prepare_with`] errors.
    pub fn prepare(&self, user_id: &str, text: &str) -> Result<PipelineOutput> {
        let analysis = self.analyze(text)?;
        self.prepare_with(user_id, &analysis, MessageId::generate())
    }

    /// A failed lookup degrades to a miss.
    fn lookup_guidance(&self, emotion: &ExtendedEmotion) -> Option<Guidance> {
        match self.stores.guidance.lookup(emotion) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(emotion = %emotion, error = %e, "Guidance lookup failed, using placeholders");
                None
            },
        }
    }

    /// Fire-and-forget; returns whether the event was recorded.
    fn emit_critical_event(
        &self,
        user_id: &str,
        message_id: &MessageId,
        emotion: &ExtendedEmotion,
    ) -> bool {
        let event = CriticalEvent::new(
            user_id,
            message_id.clone(),
            emotion.as_str(),
            format!("Emoción de alta severidad detectada: {emotion}"),
        );

        match self.stores.events.record(&event) {
            Ok(event_id) => {
                metrics::counter!("critical_events_total", "status" => "recorded").increment(1);
                tracing::warn!(
                    event_id = %event_id,
                    user_id = %user_id,
                    message_id = %message_id,
                    event_type = %emotion,
                    "Critical event recorded"
                );
                true
            },
            Err(e) => {
                metrics::counter!("critical_events_total", "status" => "failed").increment(1);
                tracing::error!(
                    user_id = %user_id,
                    message_id = %message_id,
                    error = %e,
                    "Failed to record critical event"
                );
                false
            },
        }
    }
}
